// src/models/payments.rs

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::models::orders::{OrderItemRequest, PaymentStatus};

// --- Stripe ---

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct CheckoutItem {
    pub name: String,
    pub price: Decimal,
    pub quantity: i32,
}

#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct CheckoutCustomer {
    pub name: Option<String>,
    pub email: Option<String>,
    pub notes: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateCheckoutSessionPayload {
    pub items: Vec<CheckoutItem>,
    #[serde(default)]
    pub customer: CheckoutCustomer,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CheckoutSessionResponse {
    pub url: String,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CardDetailsResponse {
    pub card_brand: Option<String>,
    pub last4: Option<String>,
}

#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreatePaymentIntentPayload {
    /// Valor já em centavos
    pub amount: Option<i64>,
    pub items: Option<Vec<OrderItemRequest>>,
    pub order_id: Option<Uuid>,
    pub customer: Option<CheckoutCustomer>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ClientSecretResponse {
    pub client_secret: String,
}

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct SaveOrderForm {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub notes: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SaveOrderPayload {
    #[serde(default)]
    pub form: SaveOrderForm,
    #[serde(default)]
    pub cart_items: Vec<OrderItemRequest>,
    pub payment_intent_id: Option<String>,
    pub payment_status: Option<PaymentStatus>,
    pub card_brand: Option<String>,
    pub last4: Option<String>,
}

#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MarkPaidPayload {
    pub payment_intent_id: Option<String>,
    // Status do gateway, apenas registrado no log
    pub payment_status: Option<String>,
    pub card_brand: Option<String>,
    pub last4: Option<String>,
}

#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MarkCashPaidPayload {
    pub amount_paid: Option<Decimal>,
    pub change_returned: Option<Decimal>,
}

/// Dados do cartão devolvidos pelo gateway.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CardDetails {
    pub brand: Option<String>,
    pub last4: Option<String>,
}

// --- Razorpay ---

#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RazorpayCreateOrderPayload {
    pub items: Option<Vec<OrderItemRequest>>,
    pub order_id: Option<Uuid>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RazorpayOrderResponse {
    pub razor_order_id: String,
    pub amount: i64,
    pub currency: String,
}

// Nomes em snake_case, exatamente como o checkout da Razorpay devolve
#[derive(Debug, Deserialize, ToSchema)]
pub struct VerifyPaymentPayload {
    #[serde(default)]
    pub razorpay_order_id: String,
    #[serde(default)]
    pub razorpay_payment_id: String,
    #[serde(default)]
    pub razorpay_signature: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct VerifyPaymentResponse {
    pub success: bool,
    pub message: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PaymentMessageResponse {
    pub message: String,
}
