// src/handlers/reservations.rs

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
        i18n::Locale,
        rbac::{AllStaff, ManagerOrAdmin, RequireRole},
    },
    models::{
        auth::MessageResponse,
        reservations::{
            CreateReservationPayload, Reservation, ReservationMessageResponse, ReservationQuery,
            UpdateReservationPayload,
        },
    },
};

#[utoipa::path(
    post,
    path = "/api/reservations",
    tag = "Reservations",
    request_body = CreateReservationPayload,
    responses(
        (status = 201, description = "Reserva criada", body = ReservationMessageResponse),
        (status = 400, description = "Dados inválidos")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_reservation(
    State(app_state): State<AppState>,
    locale: Locale,
    _guard: RequireRole<ManagerOrAdmin>,
    Json(payload): Json<CreateReservationPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let reservation = app_state
        .reservation_service
        .create_reservation(&payload)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((
        StatusCode::CREATED,
        Json(ReservationMessageResponse {
            message: "Reservation created".into(),
            reservation,
        }),
    ))
}

#[utoipa::path(
    get,
    path = "/api/reservations",
    tag = "Reservations",
    params(ReservationQuery),
    responses((status = 200, description = "Reservas ordenadas pela data", body = Vec<Reservation>)),
    security(("api_jwt" = []))
)]
pub async fn list_reservations(
    State(app_state): State<AppState>,
    locale: Locale,
    _guard: RequireRole<AllStaff>,
    Query(query): Query<ReservationQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let reservations = app_state
        .reservation_service
        .list_reservations(&query)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;
    Ok(Json(reservations))
}

#[utoipa::path(
    patch,
    path = "/api/reservations/{id}",
    tag = "Reservations",
    params(("id" = Uuid, Path, description = "ID da reserva")),
    request_body = UpdateReservationPayload,
    responses(
        (status = 200, description = "Reserva atualizada", body = ReservationMessageResponse),
        (status = 404, description = "Reserva não encontrada")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_reservation(
    State(app_state): State<AppState>,
    locale: Locale,
    _guard: RequireRole<AllStaff>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateReservationPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let reservation = app_state
        .reservation_service
        .update_reservation(id, &payload)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(ReservationMessageResponse {
        message: "Reservation updated".into(),
        reservation,
    }))
}

#[utoipa::path(
    delete,
    path = "/api/reservations/{id}",
    tag = "Reservations",
    params(("id" = Uuid, Path, description = "ID da reserva")),
    responses(
        (status = 200, description = "Reserva removida", body = MessageResponse),
        (status = 404, description = "Reserva não encontrada")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_reservation(
    State(app_state): State<AppState>,
    locale: Locale,
    _guard: RequireRole<AllStaff>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    app_state
        .reservation_service
        .delete_reservation(id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;
    Ok(Json(MessageResponse {
        message: "Reservation deleted".into(),
    }))
}
