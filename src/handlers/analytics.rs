// src/handlers/analytics.rs

use axum::{
    extract::{Query, State},
    response::IntoResponse,
    Json,
};

use crate::{
    common::error::ApiError,
    config::AppState,
    middleware::{
        i18n::Locale,
        rbac::{AdminOnly, RequireRole},
    },
    models::analytics::{AnalyticsQuery, AnalyticsSummary, RevenueChart, RevenueChartQuery},
};

#[utoipa::path(
    get,
    path = "/api/orders/analytics",
    tag = "Analytics",
    params(AnalyticsQuery),
    responses((status = 200, description = "Contagens, receita e itens mais vendidos", body = AnalyticsSummary)),
    security(("api_jwt" = []))
)]
pub async fn get_analytics(
    State(app_state): State<AppState>,
    locale: Locale,
    _guard: RequireRole<AdminOnly>,
    Query(query): Query<AnalyticsQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let summary = app_state
        .analytics_service
        .summary(&query)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;
    Ok(Json(summary))
}

#[utoipa::path(
    get,
    path = "/api/orders/revenue-chart",
    tag = "Analytics",
    params(RevenueChartQuery),
    responses((status = 200, description = "Receita por dia (YYYY-MM-DD)", body = RevenueChart)),
    security(("api_jwt" = []))
)]
pub async fn get_revenue_chart(
    State(app_state): State<AppState>,
    locale: Locale,
    _guard: RequireRole<AdminOnly>,
    Query(query): Query<RevenueChartQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let chart = app_state
        .analytics_service
        .revenue_chart(&query)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;
    Ok(Json(chart))
}
