// src/handlers/documents.rs

use axum::{
    extract::{Path, State},
    http::header,
    response::{IntoResponse, Response},
};
use uuid::Uuid;

use crate::{
    common::error::ApiError,
    config::AppState,
    middleware::{
        i18n::Locale,
        rbac::{AllStaff, RequireRole},
    },
};

#[utoipa::path(
    get,
    path = "/api/orders/{id}/receipt",
    tag = "Orders",
    params(("id" = Uuid, Path, description = "ID do pedido")),
    responses(
        (status = 200, description = "Recibo em PDF", content_type = "application/pdf"),
        (status = 404, description = "Pedido não encontrado"),
        (status = 500, description = "Fontes ausentes em FONTS_DIR")
    ),
    security(("api_jwt" = []))
)]
pub async fn generate_receipt(
    State(app_state): State<AppState>,
    locale: Locale,
    _guard: RequireRole<AllStaff>,
    Path(order_id): Path<Uuid>,
) -> Result<Response, ApiError> {
    let (order_code, pdf_bytes) = app_state
        .document_service
        .generate_receipt(order_id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    let disposition = format!("attachment; filename=\"receipt_{}.pdf\"", order_code);
    let headers = [
        (header::CONTENT_TYPE, "application/pdf".to_string()),
        (header::CONTENT_DISPOSITION, disposition),
    ];

    Ok((headers, pdf_bytes).into_response())
}
