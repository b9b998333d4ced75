// src/handlers/payments.rs

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use uuid::Uuid;

use crate::{
    common::error::ApiError,
    config::AppState,
    middleware::{
        i18n::Locale,
        rbac::{AllStaff, RequireRole},
    },
    models::{
        orders::OrderMessageResponse,
        payments::{
            CardDetailsResponse, CheckoutSessionResponse, ClientSecretResponse,
            CreateCheckoutSessionPayload, CreatePaymentIntentPayload, MarkCashPaidPayload,
            MarkPaidPayload, PaymentMessageResponse, RazorpayCreateOrderPayload,
            RazorpayOrderResponse, SaveOrderPayload, VerifyPaymentPayload, VerifyPaymentResponse,
        },
    },
};

// ---
// Stripe
// ---

#[utoipa::path(
    post,
    path = "/api/payments/stripe/create-checkout-session",
    tag = "Payments",
    request_body = CreateCheckoutSessionPayload,
    responses(
        (status = 200, description = "URL do checkout hospedado", body = CheckoutSessionResponse),
        (status = 503, description = "Stripe não configurado")
    )
)]
pub async fn create_checkout_session(
    State(app_state): State<AppState>,
    locale: Locale,
    Json(payload): Json<CreateCheckoutSessionPayload>,
) -> Result<impl IntoResponse, ApiError> {
    let url = app_state
        .payment_service
        .create_checkout_session(&payload)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;
    Ok(Json(CheckoutSessionResponse { url }))
}

#[utoipa::path(
    get,
    path = "/api/payments/stripe/payment-intent/{id}",
    tag = "Payments",
    params(("id" = String, Path, description = "ID do PaymentIntent")),
    responses(
        (status = 200, description = "Marca e final do cartão", body = CardDetailsResponse),
        (status = 404, description = "PaymentIntent desconhecido")
    )
)]
pub async fn get_payment_intent_card(
    State(app_state): State<AppState>,
    locale: Locale,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let card = app_state
        .payment_service
        .card_details(&id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;
    Ok(Json(CardDetailsResponse {
        card_brand: card.brand,
        last4: card.last4,
    }))
}

#[utoipa::path(
    post,
    path = "/api/payments/stripe/create-payment-intent",
    tag = "Payments",
    request_body = CreatePaymentIntentPayload,
    responses(
        (status = 200, description = "client_secret do PaymentIntent", body = ClientSecretResponse),
        (status = 400, description = "Sem valor para cobrar ou pedido já pago")
    )
)]
pub async fn create_payment_intent(
    State(app_state): State<AppState>,
    locale: Locale,
    Json(payload): Json<CreatePaymentIntentPayload>,
) -> Result<impl IntoResponse, ApiError> {
    let client_secret = app_state
        .payment_service
        .create_payment_intent(&payload)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;
    Ok(Json(ClientSecretResponse { client_secret }))
}

#[utoipa::path(
    post,
    path = "/api/payments/stripe/save-order",
    tag = "Payments",
    request_body = SaveOrderPayload,
    responses(
        (status = 201, description = "Pedido online pago gravado", body = PaymentMessageResponse),
        (status = 400, description = "Cliente ou carrinho ausente")
    )
)]
pub async fn save_order(
    State(app_state): State<AppState>,
    locale: Locale,
    Json(payload): Json<SaveOrderPayload>,
) -> Result<impl IntoResponse, ApiError> {
    app_state
        .payment_service
        .save_paid_order(payload)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((
        StatusCode::CREATED,
        Json(PaymentMessageResponse {
            message: "Order saved successfully.".into(),
        }),
    ))
}

#[utoipa::path(
    patch,
    path = "/api/payments/stripe/mark-paid/{order_id}",
    tag = "Payments",
    params(("order_id" = Uuid, Path, description = "ID do pedido")),
    request_body = MarkPaidPayload,
    responses(
        (status = 200, description = "Pedido pago no cartão e concluído", body = OrderMessageResponse),
        (status = 400, description = "Pedido já pago"),
        (status = 404, description = "Pedido não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn mark_paid(
    State(app_state): State<AppState>,
    locale: Locale,
    _guard: RequireRole<AllStaff>,
    Path(order_id): Path<Uuid>,
    Json(payload): Json<MarkPaidPayload>,
) -> Result<impl IntoResponse, ApiError> {
    let order = app_state
        .payment_service
        .mark_paid(order_id, payload)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(OrderMessageResponse {
        message: "Order marked as paid".into(),
        order,
    }))
}

#[utoipa::path(
    patch,
    path = "/api/payments/stripe/mark-cash-paid/{order_id}",
    tag = "Payments",
    params(("order_id" = Uuid, Path, description = "ID do pedido")),
    request_body = MarkCashPaidPayload,
    responses(
        (status = 200, description = "Pedido pago em dinheiro e concluído", body = OrderMessageResponse),
        (status = 400, description = "Pedido já pago"),
        (status = 404, description = "Pedido não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn mark_cash_paid(
    State(app_state): State<AppState>,
    locale: Locale,
    _guard: RequireRole<AllStaff>,
    Path(order_id): Path<Uuid>,
    Json(payload): Json<MarkCashPaidPayload>,
) -> Result<impl IntoResponse, ApiError> {
    let order = app_state
        .payment_service
        .mark_cash_paid(order_id, payload)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(OrderMessageResponse {
        message: "Order marked as cash paid".into(),
        order,
    }))
}

// ---
// Razorpay
// ---

#[utoipa::path(
    post,
    path = "/api/payments/razorpay/create-order",
    tag = "Payments",
    request_body = RazorpayCreateOrderPayload,
    responses(
        (status = 200, description = "Pedido criado na Razorpay (valor em paise)", body = RazorpayOrderResponse),
        (status = 503, description = "Razorpay não configurada")
    )
)]
pub async fn razorpay_create_order(
    State(app_state): State<AppState>,
    locale: Locale,
    Json(payload): Json<RazorpayCreateOrderPayload>,
) -> Result<impl IntoResponse, ApiError> {
    let order = app_state
        .payment_service
        .razorpay_create_order(&payload)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;
    Ok(Json(order))
}

#[utoipa::path(
    post,
    path = "/api/payments/razorpay/verify-payment",
    tag = "Payments",
    request_body = VerifyPaymentPayload,
    responses(
        (status = 200, description = "Assinatura válida", body = VerifyPaymentResponse),
        (status = 400, description = "Assinatura inválida", body = VerifyPaymentResponse)
    )
)]
pub async fn razorpay_verify_payment(
    State(app_state): State<AppState>,
    locale: Locale,
    Json(payload): Json<VerifyPaymentPayload>,
) -> Result<impl IntoResponse, ApiError> {
    let valid = app_state
        .payment_service
        .verify_razorpay_payment(&payload)
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    let (status, message) = if valid {
        (StatusCode::OK, "Payment verified successfully")
    } else {
        (StatusCode::BAD_REQUEST, "Payment verification failed")
    };
    Ok((
        status,
        Json(VerifyPaymentResponse {
            success: valid,
            message: message.into(),
        }),
    ))
}
