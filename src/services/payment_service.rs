// src/services/payment_service.rs

use hmac::{Hmac, Mac};
use rand::Rng;
use rust_decimal::{prelude::ToPrimitive, Decimal, RoundingStrategy};
use serde_json::Value;
use sha2::Sha256;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::{
        orders::{NewOrder, Order, OrderType, PaymentMode, PaymentStatus},
        payments::{
            CardDetails, CreateCheckoutSessionPayload, CreatePaymentIntentPayload,
            MarkCashPaidPayload, MarkPaidPayload, RazorpayCreateOrderPayload,
            RazorpayOrderResponse, SaveOrderPayload, VerifyPaymentPayload,
        },
    },
    services::order_service::OrderService,
};

const STRIPE_API: &str = "https://api.stripe.com/v1";
const RAZORPAY_API: &str = "https://api.razorpay.com/v1";

/// `pi_` seguido só de letras, dígitos ou `_`.
fn is_payment_intent_id(id: &str) -> bool {
    id.strip_prefix("pi_").is_some_and(|rest| {
        !rest.is_empty() && rest.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
    })
}
pub const RAZORPAY_CURRENCY: &str = "INR";

/// Valor em centavos/paise. Zero ou negativo não é cobrável.
pub fn to_minor_units(amount: Decimal) -> Result<i64, AppError> {
    (amount * Decimal::ONE_HUNDRED)
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
        .to_i64()
        .filter(|v| *v > 0)
        .ok_or(AppError::PaymentAmountRequired)
}

/// `rcpt_` + 8 dígitos.
pub fn receipt_id() -> String {
    let n: u32 = rand::thread_rng().gen_range(0..100_000_000);
    format!("rcpt_{:08}", n)
}

/// HMAC-SHA256 de `order_id|payment_id`, comparado em tempo constante.
pub fn verify_razorpay_signature(order_id: &str, payment_id: &str, signature: &str, secret: &str) -> bool {
    let Ok(mut mac) = Hmac::<Sha256>::new_from_slice(secret.as_bytes()) else {
        return false;
    };
    mac.update(format!("{}|{}", order_id, payment_id).as_bytes());

    let Ok(sig_bytes) = hex::decode(signature) else {
        return false;
    };
    mac.verify_slice(&sig_bytes).is_ok()
}

// Erros da API vêm como {"error": {"message": ...}}
fn gateway_field(resp: &Value, field: &str, gateway: &str) -> Result<String, AppError> {
    if let Some(message) = resp["error"]["message"].as_str() {
        return Err(AppError::PaymentGatewayError(message.to_string()));
    }
    if let Some(description) = resp["error"]["description"].as_str() {
        return Err(AppError::PaymentGatewayError(description.to_string()));
    }
    resp[field]
        .as_str()
        .map(String::from)
        .ok_or_else(|| AppError::PaymentGatewayError(format!("{} response without {}", gateway, field)))
}

/// Lê marca e final do cartão da cobrança mais recente.
pub fn card_from_intent(intent: &Value) -> CardDetails {
    let card = &intent["latest_charge"]["payment_method_details"]["card"];
    CardDetails {
        brand: card["brand"].as_str().map(String::from),
        last4: card["last4"].as_str().map(String::from),
    }
}

// ---
// Stripe
// ---

#[derive(Clone)]
pub struct StripeClient {
    http: reqwest::Client,
    secret_key: String,
    currency: String,
}

impl StripeClient {
    pub fn new(secret_key: String, currency: String) -> Self {
        Self {
            http: reqwest::Client::new(),
            secret_key,
            currency,
        }
    }

    pub async fn create_checkout_session(
        &self,
        payload: &CreateCheckoutSessionPayload,
        client_url: &str,
    ) -> Result<String, AppError> {
        let mut form: Vec<(String, String)> = vec![
            ("payment_method_types[0]".into(), "card".into()),
            ("mode".into(), "payment".into()),
            ("success_url".into(), format!("{}/success", client_url)),
            ("cancel_url".into(), format!("{}/cancel", client_url)),
            (
                "metadata[customer_name]".into(),
                payload.customer.name.clone().unwrap_or_default(),
            ),
            (
                "metadata[notes]".into(),
                payload.customer.notes.clone().unwrap_or_default(),
            ),
        ];
        if let Some(email) = payload.customer.email.as_deref().filter(|e| !e.is_empty()) {
            form.push(("customer_email".into(), email.to_string()));
        }

        for (i, item) in payload.items.iter().enumerate() {
            let prefix = format!("line_items[{}]", i);
            form.push((format!("{prefix}[price_data][currency]"), self.currency.clone()));
            form.push((format!("{prefix}[price_data][product_data][name]"), item.name.clone()));
            form.push((
                format!("{prefix}[price_data][unit_amount]"),
                to_minor_units(item.price)?.to_string(),
            ));
            form.push((format!("{prefix}[quantity]"), item.quantity.max(1).to_string()));
        }

        let resp: Value = self
            .http
            .post(format!("{STRIPE_API}/checkout/sessions"))
            .basic_auth(&self.secret_key, None::<&str>)
            .form(&form)
            .send()
            .await?
            .json()
            .await?;

        gateway_field(&resp, "url", "Stripe")
    }

    /// `None` quando o Stripe não conhece o id.
    pub async fn retrieve_card(&self, intent_id: &str) -> Result<Option<CardDetails>, AppError> {
        // O id vai direto no caminho da URL
        if !is_payment_intent_id(intent_id) {
            return Ok(None);
        }
        let resp = self
            .http
            .get(format!("{STRIPE_API}/payment_intents/{intent_id}"))
            .basic_auth(&self.secret_key, None::<&str>)
            .query(&[("expand[]", "latest_charge")])
            .send()
            .await?;

        if resp.status() == reqwest::StatusCode::NOT_FOUND {
            return Ok(None);
        }
        let intent: Value = resp.json().await?;
        if intent["error"].is_object() {
            return Ok(None);
        }
        Ok(Some(card_from_intent(&intent)))
    }

    pub async fn create_payment_intent(
        &self,
        amount: i64,
        metadata: &[(&str, String)],
    ) -> Result<String, AppError> {
        let mut form: Vec<(String, String)> = vec![
            ("amount".into(), amount.to_string()),
            ("currency".into(), self.currency.clone()),
            ("automatic_payment_methods[enabled]".into(), "true".into()),
        ];
        for (key, value) in metadata {
            form.push((format!("metadata[{key}]"), value.clone()));
        }

        let resp: Value = self
            .http
            .post(format!("{STRIPE_API}/payment_intents"))
            .basic_auth(&self.secret_key, None::<&str>)
            .form(&form)
            .send()
            .await?
            .json()
            .await?;

        gateway_field(&resp, "client_secret", "Stripe")
    }
}

// ---
// Razorpay
// ---

#[derive(Clone)]
pub struct RazorpayClient {
    http: reqwest::Client,
    key_id: String,
    key_secret: String,
}

impl RazorpayClient {
    pub fn new(key_id: String, key_secret: String) -> Self {
        Self {
            http: reqwest::Client::new(),
            key_id,
            key_secret,
        }
    }

    pub async fn create_order(&self, amount: i64, receipt: &str) -> Result<RazorpayOrderResponse, AppError> {
        let resp: Value = self
            .http
            .post(format!("{RAZORPAY_API}/orders"))
            .basic_auth(&self.key_id, Some(&self.key_secret))
            .json(&serde_json::json!({
                "amount": amount,
                "currency": RAZORPAY_CURRENCY,
                "receipt": receipt,
            }))
            .send()
            .await?
            .json()
            .await?;

        let id = gateway_field(&resp, "id", "Razorpay")?;
        Ok(RazorpayOrderResponse {
            razor_order_id: id,
            amount: resp["amount"].as_i64().unwrap_or(amount),
            currency: resp["currency"].as_str().unwrap_or(RAZORPAY_CURRENCY).to_string(),
        })
    }

    pub fn verify(&self, payload: &VerifyPaymentPayload) -> bool {
        verify_razorpay_signature(
            &payload.razorpay_order_id,
            &payload.razorpay_payment_id,
            &payload.razorpay_signature,
            &self.key_secret,
        )
    }
}

// ---
// Serviço
// ---

#[derive(Clone)]
pub struct PaymentService {
    stripe: Option<StripeClient>,
    razorpay: Option<RazorpayClient>,
    order_service: OrderService,
    client_url: String,
}

impl PaymentService {
    pub fn new(
        stripe: Option<StripeClient>,
        razorpay: Option<RazorpayClient>,
        order_service: OrderService,
        client_url: String,
    ) -> Self {
        Self {
            stripe,
            razorpay,
            order_service,
            client_url,
        }
    }

    fn stripe(&self) -> Result<&StripeClient, AppError> {
        self.stripe
            .as_ref()
            .ok_or(AppError::PaymentGatewayNotConfigured("Stripe"))
    }

    fn razorpay(&self) -> Result<&RazorpayClient, AppError> {
        self.razorpay
            .as_ref()
            .ok_or(AppError::PaymentGatewayNotConfigured("Razorpay"))
    }

    // Valor devido de um pedido ainda não pago
    async fn unpaid_order_amount(&self, order_id: Uuid) -> Result<Decimal, AppError> {
        let order = self.order_service.get_order(order_id).await?;
        if order.is_paid() {
            return Err(AppError::OrderAlreadyPaid);
        }
        Ok(order.amount_due())
    }

    pub async fn create_checkout_session(&self, payload: &CreateCheckoutSessionPayload) -> Result<String, AppError> {
        if payload.items.is_empty() {
            return Err(AppError::PaymentAmountRequired);
        }
        let url = self
            .stripe()?
            .create_checkout_session(payload, &self.client_url)
            .await?;
        tracing::info!(items = payload.items.len(), "Sessão de checkout criada");
        Ok(url)
    }

    pub async fn card_details(&self, intent_id: &str) -> Result<CardDetails, AppError> {
        self.stripe()?
            .retrieve_card(intent_id)
            .await?
            .ok_or_else(|| AppError::ResourceNotFound("Payment intent".into()))
    }

    /// Valor: `amount` explícito, depois `items` pelo cardápio, depois `orderId`.
    pub async fn create_payment_intent(&self, payload: &CreatePaymentIntentPayload) -> Result<String, AppError> {
        let stripe = self.stripe()?;

        let amount = if let Some(amount) = payload.amount.filter(|a| *a > 0) {
            amount
        } else if let Some(items) = payload.items.as_ref().filter(|i| !i.is_empty()) {
            to_minor_units(self.order_service.price_items(items).await?)?
        } else if let Some(order_id) = payload.order_id {
            to_minor_units(self.unpaid_order_amount(order_id).await?)?
        } else {
            return Err(AppError::PaymentAmountRequired);
        };

        let customer = payload.customer.clone().unwrap_or_default();
        let mut metadata = vec![
            ("customer_name", customer.name.unwrap_or_default()),
            ("customer_email", customer.email.unwrap_or_default()),
            ("notes", customer.notes.unwrap_or_default()),
        ];
        if let Some(order_id) = payload.order_id {
            metadata.push(("order_id", order_id.to_string()));
        }

        let secret = stripe.create_payment_intent(amount, &metadata).await?;
        tracing::info!(amount, "PaymentIntent criado");
        Ok(secret)
    }

    /// Grava o pedido online depois do pagamento confirmado no frontend.
    pub async fn save_paid_order(&self, payload: SaveOrderPayload) -> Result<Order, AppError> {
        let name = payload.form.name.filter(|n| !n.trim().is_empty());
        let email = payload.form.email.filter(|e| !e.trim().is_empty());
        let (Some(name), Some(email)) = (name, email) else {
            return Err(AppError::IncompleteCheckout);
        };
        if payload.cart_items.is_empty() {
            return Err(AppError::IncompleteCheckout);
        }

        let items = self.order_service.resolve_items(&payload.cart_items).await?;
        let draft = NewOrder {
            order_code: String::new(),
            name,
            email: Some(email),
            phone: payload.form.phone,
            items,
            notes: payload.form.notes,
            order_type: OrderType::Online,
            payment_status: payload.payment_status.unwrap_or(PaymentStatus::Succeeded),
            payment_mode: Some(PaymentMode::Online),
            payment_intent_id: payload.payment_intent_id,
            card_brand: payload.card_brand,
            last4: payload.last4,
            discount: Decimal::ZERO,
            tax: Decimal::ZERO,
            split_payment: None,
            table_id: None,
            waiter_id: None,
            waiter_name: None,
            started_at: None,
        };

        let order = self.order_service.create_from_draft(draft).await?;
        tracing::info!(code = %order.order_code, "💳 Pedido online pago gravado");
        self.order_service.notify_confirmation(&order).await;
        Ok(order)
    }

    pub async fn mark_paid(&self, order_id: Uuid, payload: MarkPaidPayload) -> Result<Order, AppError> {
        self.order_service.mark_card_paid(order_id, payload).await
    }

    pub async fn mark_cash_paid(&self, order_id: Uuid, payload: MarkCashPaidPayload) -> Result<Order, AppError> {
        self.order_service.mark_cash_paid(order_id, payload).await
    }

    pub async fn razorpay_create_order(
        &self,
        payload: &RazorpayCreateOrderPayload,
    ) -> Result<RazorpayOrderResponse, AppError> {
        let razorpay = self.razorpay()?;

        let amount = if let Some(order_id) = payload.order_id {
            self.unpaid_order_amount(order_id).await?
        } else if let Some(items) = payload.items.as_ref().filter(|i| !i.is_empty()) {
            self.order_service.price_items(items).await?
        } else {
            return Err(AppError::PaymentAmountRequired);
        };

        let receipt = receipt_id();
        let order = razorpay.create_order(to_minor_units(amount)?, &receipt).await?;
        tracing::info!(razor_order = %order.razor_order_id, %receipt, "Pedido Razorpay criado");
        Ok(order)
    }

    pub fn verify_razorpay_payment(&self, payload: &VerifyPaymentPayload) -> Result<bool, AppError> {
        let valid = self.razorpay()?.verify(payload);
        if !valid {
            tracing::warn!(razor_order = %payload.razorpay_order_id, "Assinatura Razorpay inválida");
        }
        Ok(valid)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn payment_intent_ids_are_checked_before_reaching_stripe() {
        assert!(is_payment_intent_id("pi_3PzK2aLkdIwHu7ix0abc_secret"));
        assert!(!is_payment_intent_id("pi_"));
        assert!(!is_payment_intent_id("cus_123"));
        assert!(!is_payment_intent_id("pi_1/../../customers/cus_x"));
        assert!(!is_payment_intent_id("pi_1?expand[]=customer"));
    }

    fn sign(message: &str, secret: &str) -> String {
        let mut mac = Hmac::<Sha256>::new_from_slice(secret.as_bytes()).unwrap();
        mac.update(message.as_bytes());
        hex::encode(mac.finalize().into_bytes())
    }

    #[test]
    fn valid_razorpay_signature_is_accepted() {
        let sig = sign("order_1|pay_1", "s3cret");
        assert!(verify_razorpay_signature("order_1", "pay_1", &sig, "s3cret"));
    }

    #[test]
    fn tampered_or_malformed_signatures_are_rejected() {
        let sig = sign("order_1|pay_1", "s3cret");
        assert!(!verify_razorpay_signature("order_1", "pay_2", &sig, "s3cret"));
        assert!(!verify_razorpay_signature("order_1", "pay_1", &sig, "other"));
        assert!(!verify_razorpay_signature("order_1", "pay_1", "not-hex", "s3cret"));
        assert!(!verify_razorpay_signature("order_1", "pay_1", "", "s3cret"));
    }

    #[test]
    fn minor_units_round_to_the_nearest_cent() {
        assert_eq!(to_minor_units(Decimal::new(1999, 2)).unwrap(), 1999);
        assert_eq!(to_minor_units(Decimal::new(10005, 3)).unwrap(), 1001);
        assert_eq!(to_minor_units(Decimal::from(7)).unwrap(), 700);
        assert!(matches!(to_minor_units(Decimal::ZERO), Err(AppError::PaymentAmountRequired)));
    }

    #[test]
    fn receipt_has_eight_digits() {
        for _ in 0..20 {
            let r = receipt_id();
            assert!(r.starts_with("rcpt_"));
            assert_eq!(r.len(), 13);
            assert!(r[5..].chars().all(|c| c.is_ascii_digit()));
        }
    }

    #[test]
    fn card_is_read_from_the_latest_charge() {
        let intent = serde_json::json!({
            "id": "pi_1",
            "latest_charge": {
                "payment_method_details": { "card": { "brand": "visa", "last4": "4242" } }
            }
        });
        assert_eq!(
            card_from_intent(&intent),
            CardDetails { brand: Some("visa".into()), last4: Some("4242".into()) }
        );
        assert_eq!(card_from_intent(&serde_json::json!({ "id": "pi_2" })), CardDetails::default());
    }

    #[test]
    fn gateway_errors_surface_their_message() {
        let resp = serde_json::json!({ "error": { "message": "No such payment_intent" } });
        match gateway_field(&resp, "url", "Stripe") {
            Err(AppError::PaymentGatewayError(msg)) => assert_eq!(msg, "No such payment_intent"),
            other => panic!("unexpected: {other:?}"),
        }
        let ok = serde_json::json!({ "url": "https://checkout" });
        assert_eq!(gateway_field(&ok, "url", "Stripe").unwrap(), "https://checkout");
    }
}
