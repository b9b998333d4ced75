// src/handlers/tables.rs

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::error::{ApiError, AppError},
    config::AppState,
    middleware::{
        auth::AuthenticatedUser,
        i18n::Locale,
        rbac::{AllStaff, ManagerOrAdmin, RequireRole},
    },
    models::{
        auth::MessageResponse,
        tables::{AvailableTablesQuery, CreateTablePayload, Table, TableMessageResponse, UpdateTablePayload},
    },
};

#[utoipa::path(
    get,
    path = "/api/tables",
    tag = "Tables",
    responses((status = 200, description = "Mesas ordenadas pelo número", body = Vec<Table>)),
    security(("api_jwt" = []))
)]
pub async fn list_tables(
    State(app_state): State<AppState>,
    locale: Locale,
    _guard: RequireRole<AllStaff>,
) -> Result<impl IntoResponse, ApiError> {
    let tables = app_state
        .table_service
        .list_tables()
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;
    Ok(Json(tables))
}

#[utoipa::path(
    get,
    path = "/api/tables/available",
    tag = "Tables",
    params(AvailableTablesQuery),
    responses((status = 200, description = "Mesas livres ou em limpeza", body = Vec<Table>)),
    security(("api_jwt" = []))
)]
pub async fn available_tables(
    State(app_state): State<AppState>,
    locale: Locale,
    _guard: RequireRole<ManagerOrAdmin>,
    Query(query): Query<AvailableTablesQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let tables = app_state
        .table_service
        .available_tables(&query)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;
    Ok(Json(tables))
}

#[utoipa::path(
    get,
    path = "/api/tables/{id}",
    tag = "Tables",
    params(("id" = Uuid, Path, description = "ID da mesa")),
    responses(
        (status = 200, description = "Mesa", body = Table),
        (status = 404, description = "Mesa não encontrada")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_table(
    State(app_state): State<AppState>,
    locale: Locale,
    _guard: RequireRole<AllStaff>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let table = app_state
        .table_service
        .get_table(id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;
    Ok(Json(table))
}

#[utoipa::path(
    post,
    path = "/api/tables",
    tag = "Tables",
    request_body = CreateTablePayload,
    responses(
        (status = 201, description = "Mesa criada", body = TableMessageResponse),
        (status = 409, description = "Número de mesa repetido")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_table(
    State(app_state): State<AppState>,
    locale: Locale,
    _guard: RequireRole<ManagerOrAdmin>,
    Json(payload): Json<CreateTablePayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let table = app_state
        .table_service
        .create_table(&payload)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((
        StatusCode::CREATED,
        Json(TableMessageResponse {
            message: "Table created".into(),
            table,
        }),
    ))
}

#[utoipa::path(
    patch,
    path = "/api/tables/{id}",
    tag = "Tables",
    params(("id" = Uuid, Path, description = "ID da mesa")),
    request_body = UpdateTablePayload,
    responses(
        (status = 200, description = "Mesa atualizada", body = TableMessageResponse),
        (status = 404, description = "Mesa não encontrada")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_table(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    _guard: RequireRole<AllStaff>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateTablePayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let table = app_state
        .table_service
        .update_table(id, &payload, user.id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(TableMessageResponse {
        message: "Table updated".into(),
        table,
    }))
}

#[utoipa::path(
    delete,
    path = "/api/tables/{id}",
    tag = "Tables",
    params(("id" = Uuid, Path, description = "ID da mesa")),
    responses(
        (status = 200, description = "Mesa removida", body = MessageResponse),
        (status = 404, description = "Mesa não encontrada")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_table(
    State(app_state): State<AppState>,
    locale: Locale,
    _guard: RequireRole<ManagerOrAdmin>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    app_state
        .table_service
        .delete_table(id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;
    Ok(Json(MessageResponse {
        message: "Table deleted".into(),
    }))
}
