// src/common/error.rs

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::{json, Value};
use std::collections::HashMap;
use thiserror::Error;

use crate::{common::i18n::I18nStore, middleware::i18n::Locale};

// Erro de domínio. Cada variante vira uma chave de tradução em `to_api_error`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Erro de validação")]
    ValidationError(#[from] validator::ValidationErrors),

    #[error("Token ausente")]
    MissingToken,

    #[error("Token inválido")]
    InvalidToken,

    #[error("Credenciais inválidas")]
    InvalidCredentials,

    #[error("Acesso negado para o cargo {0}")]
    AccessDenied(String),

    #[error("Apenas admin ou gerente podem acessar o portal")]
    StaffPortalOnly,

    #[error("Cargo não permitido no cadastro")]
    RoleNotAllowed,

    #[error("Username já existe")]
    UsernameAlreadyExists,

    #[error("Número de mesa já existe")]
    TableNumberAlreadyExists,

    #[error("Código de pedido duplicado")]
    OrderCodeConflict,

    #[error("Recurso não encontrado: {0}")]
    ResourceNotFound(String),

    #[error("Item do cardápio não encontrado: {0}")]
    MenuItemNotFound(String),

    #[error("Item {0} não está no pedido")]
    OrderItemNotFound(String),

    #[error("Mesa ocupada")]
    TableOccupied,

    #[error("Nenhum pedido ativo na mesa")]
    NoActiveOrderForTable,

    #[error("Pedido já concluído")]
    OrderAlreadyCompleted,

    #[error("Pedido já pago")]
    OrderAlreadyPaid,

    #[error("Cada item precisa de um itemId")]
    MissingItemId,

    #[error("Status de item inválido")]
    InvalidItemStatus,

    #[error("Informe email ou nome")]
    HistoryFilterRequired,

    #[error("Nenhum pedido encontrado")]
    NoOrdersFound,

    #[error("Dados de checkout incompletos")]
    IncompleteCheckout,

    #[error("Informe itens ou orderId para calcular o valor")]
    PaymentAmountRequired,

    #[error("Gateway {0} não configurado")]
    PaymentGatewayNotConfigured(&'static str),

    #[error("Erro do gateway de pagamento: {0}")]
    PaymentGatewayError(String),

    #[error("Formulário inválido: {0}")]
    InvalidMultipart(String),

    #[error("Fonte não encontrada: {0}")]
    FontNotFound(String),

    #[error("Erro de banco de dados")]
    DatabaseError(#[from] sqlx::Error),

    // `anyhow::Error` captura o contexto de falhas inesperadas
    #[error("Erro interno do servidor")]
    InternalServerError(#[from] anyhow::Error),

    #[error("Erro de Bcrypt: {0}")]
    BcryptError(#[from] bcrypt::BcryptError),

    #[error("Erro de JWT: {0}")]
    JwtError(#[from] jsonwebtoken::errors::Error),

    #[error("Erro HTTP: {0}")]
    HttpClientError(#[from] reqwest::Error),
}

/// Corpo de erro enviado ao cliente: `{"error": "...", "details": {...}}`.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub error: String,
    pub details: Option<Value>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = match self.details {
            Some(details) => json!({ "error": self.error, "details": details }),
            None => json!({ "error": self.error }),
        };
        (self.status, Json(body)).into_response()
    }
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::ValidationError(_)
            | AppError::RoleNotAllowed
            | AppError::OrderAlreadyCompleted
            | AppError::OrderAlreadyPaid
            | AppError::MissingItemId
            | AppError::InvalidItemStatus
            | AppError::HistoryFilterRequired
            | AppError::IncompleteCheckout
            | AppError::PaymentAmountRequired
            | AppError::InvalidMultipart(_) => StatusCode::BAD_REQUEST,

            AppError::MissingToken | AppError::InvalidToken | AppError::InvalidCredentials => {
                StatusCode::UNAUTHORIZED
            }

            AppError::AccessDenied(_) | AppError::StaffPortalOnly => StatusCode::FORBIDDEN,

            AppError::ResourceNotFound(_)
            | AppError::MenuItemNotFound(_)
            | AppError::OrderItemNotFound(_)
            | AppError::NoActiveOrderForTable
            | AppError::NoOrdersFound => StatusCode::NOT_FOUND,

            AppError::UsernameAlreadyExists
            | AppError::TableNumberAlreadyExists
            | AppError::OrderCodeConflict
            | AppError::TableOccupied => StatusCode::CONFLICT,

            AppError::PaymentGatewayNotConfigured(_) => StatusCode::SERVICE_UNAVAILABLE,
            AppError::PaymentGatewayError(_) | AppError::HttpClientError(_) => StatusCode::BAD_GATEWAY,

            AppError::FontNotFound(_)
            | AppError::DatabaseError(_)
            | AppError::InternalServerError(_)
            | AppError::BcryptError(_)
            | AppError::JwtError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Traduz o erro para o idioma pedido no `Accept-Language`.
    pub fn to_api_error(self, locale: &Locale, store: &I18nStore) -> ApiError {
        let status = self.status();
        let lang = locale.0.as_str();

        let (key, params): (&str, Vec<(&str, String)>) = match &self {
            AppError::ValidationError(errors) => {
                let mut details = HashMap::new();
                for (field, field_errors) in errors.field_errors() {
                    let messages: Vec<String> = field_errors
                        .iter()
                        .map(|e| {
                            e.message
                                .as_ref()
                                .map(|m| m.to_string())
                                .unwrap_or_else(|| e.code.to_string())
                        })
                        .collect();
                    details.insert(field.to_string(), messages);
                }
                return ApiError {
                    status,
                    error: store.translate(lang, "validation_error", &[]),
                    details: Some(json!(details)),
                };
            }
            AppError::MissingToken => ("missing_token", vec![]),
            AppError::InvalidToken => ("invalid_token", vec![]),
            AppError::InvalidCredentials => ("invalid_credentials", vec![]),
            AppError::AccessDenied(role) => ("access_denied", vec![("role", role.clone())]),
            AppError::StaffPortalOnly => ("staff_portal_only", vec![]),
            AppError::RoleNotAllowed => ("role_not_allowed", vec![]),
            AppError::UsernameAlreadyExists => ("username_exists", vec![]),
            AppError::TableNumberAlreadyExists => ("table_number_exists", vec![]),
            AppError::OrderCodeConflict => ("order_code_conflict", vec![]),
            AppError::ResourceNotFound(what) => ("not_found", vec![("resource", what.clone())]),
            AppError::MenuItemNotFound(id) => ("menu_item_not_found", vec![("id", id.clone())]),
            AppError::OrderItemNotFound(id) => ("order_item_not_found", vec![("id", id.clone())]),
            AppError::TableOccupied => ("table_occupied", vec![]),
            AppError::NoActiveOrderForTable => ("no_active_order", vec![]),
            AppError::OrderAlreadyCompleted => ("order_completed", vec![]),
            AppError::OrderAlreadyPaid => ("order_already_paid", vec![]),
            AppError::MissingItemId => ("missing_item_id", vec![]),
            AppError::InvalidItemStatus => ("invalid_item_status", vec![]),
            AppError::HistoryFilterRequired => ("history_filter_required", vec![]),
            AppError::NoOrdersFound => ("no_orders_found", vec![]),
            AppError::IncompleteCheckout => ("incomplete_checkout", vec![]),
            AppError::PaymentAmountRequired => ("payment_amount_required", vec![]),
            AppError::PaymentGatewayNotConfigured(gateway) => {
                ("gateway_not_configured", vec![("gateway", gateway.to_string())])
            }
            AppError::PaymentGatewayError(message) => {
                tracing::error!("Erro do gateway de pagamento: {}", message);
                ("gateway_error", vec![])
            }
            AppError::InvalidMultipart(message) => ("invalid_form", vec![("reason", message.clone())]),
            AppError::FontNotFound(dir) => {
                tracing::error!("Fontes do recibo não encontradas em {}", dir);
                ("font_not_found", vec![("dir", dir.clone())])
            }
            // Todo o resto vira 500; o detalhe fica só no log
            e => {
                tracing::error!("Erro Interno do Servidor: {}", e);
                ("internal_error", vec![])
            }
        };

        let params: Vec<(&str, &str)> = params.iter().map(|(k, v)| (*k, v.as_str())).collect();
        ApiError {
            status,
            error: store.translate(lang, key, &params),
            details: None,
        }
    }
}

// Fallback em inglês para quem não tem o Locale à mão (middlewares)
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let store = I18nStore::shared();
        self.to_api_error(&Locale::default(), store).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use validator::{ValidationError, ValidationErrors};

    fn en() -> Locale {
        Locale("en".into())
    }

    #[test]
    fn statuses_follow_the_error_kind() {
        assert_eq!(AppError::MissingToken.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(AppError::AccessDenied("waiter".into()).status(), StatusCode::FORBIDDEN);
        assert_eq!(AppError::TableOccupied.status(), StatusCode::CONFLICT);
        assert_eq!(AppError::HistoryFilterRequired.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            AppError::PaymentGatewayNotConfigured("Stripe").status(),
            StatusCode::SERVICE_UNAVAILABLE
        );
    }

    #[test]
    fn validation_errors_carry_field_details() {
        let mut errors = ValidationErrors::new();
        let mut err = ValidationError::new("length");
        err.message = Some("At least one item is required.".into());
        errors.add("items", err);

        let api = AppError::ValidationError(errors).to_api_error(&en(), I18nStore::shared());
        assert_eq!(api.status, StatusCode::BAD_REQUEST);
        let details = api.details.expect("details");
        assert_eq!(details["items"][0], "At least one item is required.");
    }

    #[test]
    fn messages_are_parameterised() {
        let api = AppError::MenuItemNotFound("abc".into()).to_api_error(&en(), I18nStore::shared());
        assert!(api.error.contains("abc"));

        let api = AppError::AccessDenied("waiter".into())
            .to_api_error(&Locale("pt".into()), I18nStore::shared());
        assert!(api.error.contains("waiter"));
    }
}
