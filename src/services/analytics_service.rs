// src/services/analytics_service.rs

use chrono::Utc;
use sqlx::PgPool;

use crate::{
    common::{db_utils::start_of_day, error::AppError},
    db::AnalyticsRepository,
    models::analytics::{AnalyticsQuery, AnalyticsSummary, RevenueChart, RevenueChartQuery},
};

#[derive(Clone)]
pub struct AnalyticsService {
    repo: AnalyticsRepository,
    pool: PgPool,
}

impl AnalyticsService {
    pub fn new(repo: AnalyticsRepository, pool: PgPool) -> Self {
        Self { repo, pool }
    }

    pub async fn summary(&self, query: &AnalyticsQuery) -> Result<AnalyticsSummary, AppError> {
        let (start, end) = query.bounds();
        self.repo.summary(&self.pool, start, end).await
    }

    pub async fn revenue_chart(&self, query: &RevenueChartQuery) -> Result<RevenueChart, AppError> {
        let today = Utc::now().date_naive();
        let since = query
            .range
            .and_then(|range| range.start_day(today))
            .map(start_of_day);

        let rows = self.repo.daily_revenue(since).await?;
        Ok(RevenueChart::from(rows))
    }
}
