// src/models/analytics.rs

use chrono::{DateTime, Days, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};

use crate::common::db_utils::start_of_day;

#[derive(Debug, Default, Deserialize, IntoParams)]
pub struct AnalyticsQuery {
    /// Primeiro dia (inclusivo)
    pub from: Option<NaiveDate>,
    /// Último dia (inclusivo até 23:59:59)
    pub to: Option<NaiveDate>,
}

impl AnalyticsQuery {
    /// Converte os dias em um intervalo [início, fim) em UTC.
    pub fn bounds(&self) -> (Option<DateTime<Utc>>, Option<DateTime<Utc>>) {
        let start = self.from.map(start_of_day);
        let end = self
            .to
            .and_then(|d| d.checked_add_days(Days::new(1)))
            .map(start_of_day);
        (start, end)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, FromRow, ToSchema)]
pub struct TopItem {
    pub name: String,
    pub quantity: i64,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticsSummary {
    // Nome histórico: na verdade é o total de pedidos no intervalo
    pub total_orders_today: i64,
    pub pending_count: i64,
    pub completed_count: i64,
    pub total_revenue: Decimal,
    pub top_items: Vec<TopItem>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum RevenueRange {
    Today,
    Yesterday,
    Week,
    Month,
    Custom,
}

impl RevenueRange {
    /// Primeiro dia incluído no gráfico; `None` significa "desde sempre".
    pub fn start_day(&self, today: NaiveDate) -> Option<NaiveDate> {
        let back = match self {
            RevenueRange::Today => 0,
            RevenueRange::Yesterday => 1,
            RevenueRange::Week => 6,
            RevenueRange::Month => 29,
            RevenueRange::Custom => return None,
        };
        today.checked_sub_days(Days::new(back))
    }
}

#[derive(Debug, Default, Deserialize, IntoParams)]
pub struct RevenueChartQuery {
    pub range: Option<RevenueRange>,
}

#[derive(Debug, Clone, FromRow)]
pub struct DailyRevenue {
    pub day: String,
    pub total: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct RevenueChart {
    pub labels: Vec<String>,
    pub values: Vec<String>,
}

impl From<Vec<DailyRevenue>> for RevenueChart {
    fn from(rows: Vec<DailyRevenue>) -> Self {
        let (labels, values) = rows
            .into_iter()
            .map(|r| (r.day, format!("{:.2}", r.total.round_dp(2))))
            .unzip();
        Self { labels, values }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn range_start_days() {
        let today = day(2025, 3, 10);
        assert_eq!(RevenueRange::Today.start_day(today), Some(today));
        assert_eq!(RevenueRange::Yesterday.start_day(today), Some(day(2025, 3, 9)));
        assert_eq!(RevenueRange::Week.start_day(today), Some(day(2025, 3, 4)));
        assert_eq!(RevenueRange::Month.start_day(today), Some(day(2025, 2, 9)));
        assert_eq!(RevenueRange::Custom.start_day(today), None);
    }

    #[test]
    fn analytics_bounds_include_the_whole_last_day() {
        let query = AnalyticsQuery {
            from: Some(day(2025, 1, 1)),
            to: Some(day(2025, 1, 31)),
        };
        let (start, end) = query.bounds();
        assert_eq!(start, Some(start_of_day(day(2025, 1, 1))));
        assert_eq!(end, Some(start_of_day(day(2025, 2, 1))));

        let (start, end) = AnalyticsQuery::default().bounds();
        assert!(start.is_none() && end.is_none());
    }

    #[test]
    fn chart_values_use_two_decimals() {
        let chart = RevenueChart::from(vec![
            DailyRevenue { day: "2025-01-01".into(), total: Decimal::new(1250, 1) },
            DailyRevenue { day: "2025-01-02".into(), total: Decimal::new(3, 0) },
        ]);
        assert_eq!(chart.labels, vec!["2025-01-01", "2025-01-02"]);
        assert_eq!(chart.values, vec!["125.00", "3.00"]);
    }

    #[test]
    fn range_parses_from_query_string_values() {
        let parsed: RevenueRange = serde_json::from_str("\"week\"").unwrap();
        assert_eq!(parsed, RevenueRange::Week);
    }
}
