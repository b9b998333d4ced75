// src/services/email_service.rs

use async_trait::async_trait;
use serde::Serialize;
use std::sync::Arc;

use crate::{common::error::AppError, models::orders::Order};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EmailMessage {
    pub from: String,
    pub to: String,
    pub subject: String,
    pub html: String,
}

/// Canal de envio de e-mails. Falhas nunca derrubam a requisição que disparou o envio.
#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, message: &EmailMessage) -> Result<(), AppError>;
}

/// Envia via API HTTP (JSON + bearer token).
pub struct HttpMailer {
    client: reqwest::Client,
    api_url: String,
    api_key: String,
}

impl HttpMailer {
    pub fn new(api_url: String, api_key: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_url,
            api_key,
        }
    }
}

#[async_trait]
impl Mailer for HttpMailer {
    async fn send(&self, message: &EmailMessage) -> Result<(), AppError> {
        self.client
            .post(&self.api_url)
            .bearer_auth(&self.api_key)
            .json(message)
            .send()
            .await?
            .error_for_status()?;
        Ok(())
    }
}

/// Usado quando nenhum provedor está configurado: só registra no log.
pub struct LogMailer;

#[async_trait]
impl Mailer for LogMailer {
    async fn send(&self, message: &EmailMessage) -> Result<(), AppError> {
        tracing::info!(to = %message.to, subject = %message.subject, "E-mail (modo log)");
        Ok(())
    }
}

pub fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

pub fn confirmation_subject(name: &str) -> String {
    format!("Order Confirmation - Thank You, {}!", name)
}

pub fn confirmation_html(restaurant: &str, order: &Order) -> String {
    let rows: String = order
        .items
        .iter()
        .map(|item| {
            format!(
                "<tr><td>{}</td><td style=\"text-align:center\">{}</td><td style=\"text-align:right\">{:.2}</td></tr>",
                escape_html(&item.name),
                item.quantity,
                item.line_total()
            )
        })
        .collect();

    let mut payment = String::new();
    if let Some(tx) = order.payment_intent_id.as_deref() {
        payment.push_str(&format!("<p>Transaction ID: <code>{}</code></p>", escape_html(tx)));
    }
    if let (Some(brand), Some(last4)) = (order.card_brand.as_deref(), order.last4.as_deref()) {
        payment.push_str(&format!(
            "<p>Paid with {} ending in {}</p>",
            escape_html(brand),
            escape_html(last4)
        ));
    }

    format!(
        r#"<div style="font-family: Arial, sans-serif; padding: 20px;">
<h2>{restaurant}</h2>
<p>Hi <strong>{name}</strong>,</p>
<p>We've received your order <strong>#{code}</strong> placed on {date}.</p>
<table style="border-collapse: collapse; width: 100%;">
<thead><tr><th style="text-align:left">Item</th><th>Qty</th><th style="text-align:right">Total</th></tr></thead>
<tbody>{rows}</tbody>
</table>
<p><strong>Total: {total:.2}</strong></p>
{payment}
</div>"#,
        restaurant = escape_html(restaurant),
        name = escape_html(&order.name),
        code = escape_html(&order.order_code),
        date = order.created_at.format("%Y-%m-%d %H:%M"),
        rows = rows,
        total = order.amount_due(),
        payment = payment,
    )
}

pub fn ready_subject(order_code: &str) -> String {
    format!("Order #{} Ready for Pickup!", order_code)
}

pub fn ready_html(restaurant: &str, order_code: &str) -> String {
    format!(
        r#"<div style="font-family: Arial, sans-serif; padding: 20px; background: #f9f9f9;">
<h2 style="color: #27ae60;">{restaurant}</h2>
<p>Hi <strong>Foodie</strong>,</p>
<p>Your order <strong>#{code}</strong> is now <strong>ready for pickup</strong>!</p>
<p>Please visit our counter to collect your food. We hope you enjoy your meal!</p>
<hr/>
<p style="font-size: 14px; color: #888;">Team {restaurant}</p>
</div>"#,
        restaurant = escape_html(restaurant),
        code = escape_html(order_code),
    )
}

#[derive(Clone)]
pub struct EmailService {
    mailer: Arc<dyn Mailer>,
    from: String,
    restaurant_name: String,
}

impl EmailService {
    pub fn new(mailer: Arc<dyn Mailer>, from: String, restaurant_name: String) -> Self {
        Self { mailer, from, restaurant_name }
    }

    pub async fn send_order_confirmation(&self, order: &Order) {
        let Some(to) = order.email.as_deref().filter(|e| !e.is_empty()) else {
            return;
        };
        let message = EmailMessage {
            from: self.from.clone(),
            to: to.to_string(),
            subject: confirmation_subject(&order.name),
            html: confirmation_html(&self.restaurant_name, order),
        };
        self.deliver(&message, &order.order_code).await;
    }

    pub async fn send_order_ready(&self, order: &Order) {
        let Some(to) = order.email.as_deref().filter(|e| !e.is_empty()) else {
            return;
        };
        let message = EmailMessage {
            from: self.from.clone(),
            to: to.to_string(),
            subject: ready_subject(&order.order_code),
            html: ready_html(&self.restaurant_name, &order.order_code),
        };
        self.deliver(&message, &order.order_code).await;
    }

    async fn deliver(&self, message: &EmailMessage, order_code: &str) {
        match self.mailer.send(message).await {
            Ok(()) => tracing::info!(order = %order_code, to = %message.to, "📧 E-mail enviado"),
            Err(e) => tracing::warn!(order = %order_code, "Falha ao enviar e-mail: {}", e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::orders::{ItemStatus, OrderItem, OrderStatus, OrderType, PaymentStatus};
    use chrono::Utc;
    use rust_decimal::Decimal;
    use sqlx::types::Json;
    use std::sync::Mutex;
    use uuid::Uuid;

    #[derive(Default)]
    struct RecordingMailer {
        sent: Mutex<Vec<EmailMessage>>,
        fail: bool,
    }

    #[async_trait]
    impl Mailer for RecordingMailer {
        async fn send(&self, message: &EmailMessage) -> Result<(), AppError> {
            if self.fail {
                return Err(AppError::InternalServerError(anyhow::anyhow!("smtp down")));
            }
            self.sent.lock().unwrap().push(message.clone());
            Ok(())
        }
    }

    fn order(email: Option<&str>) -> Order {
        let now = Utc::now();
        let items = vec![OrderItem {
            item_id: Uuid::new_v4(),
            name: "Dal <Makhani>".into(),
            price: Decimal::new(800, 2),
            quantity: 2,
            status: ItemStatus::Pending,
        }];
        Order {
            id: Uuid::new_v4(),
            order_code: "ORD654321".into(),
            name: "Ana & Bia".into(),
            email: email.map(String::from),
            phone: None,
            items: Json(items.clone()),
            initial_items: Json(items),
            modifications: Json(vec![]),
            notes: None,
            order_type: OrderType::Online,
            status: OrderStatus::Pending,
            payment_status: PaymentStatus::Succeeded,
            payment_mode: None,
            payment_intent_id: Some("pi_123".into()),
            card_brand: Some("visa".into()),
            last4: Some("4242".into()),
            amount_paid: None,
            change_returned: None,
            discount: Decimal::ZERO,
            tax: Decimal::ZERO,
            split_payment: None,
            table_id: None,
            waiter_id: None,
            waiter_name: None,
            started_at: None,
            started_cooking_at: None,
            completed_at: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn confirmation_escapes_user_content() {
        let html = confirmation_html("Kitchen", &order(Some("a@b.com")));
        assert!(html.contains("Ana &amp; Bia"));
        assert!(html.contains("Dal &lt;Makhani&gt;"));
        assert!(html.contains("16.00"));
        assert!(html.contains("pi_123"));
        assert!(html.contains("visa ending in 4242"));
    }

    #[test]
    fn ready_template_mentions_the_code() {
        let html = ready_html("Kitchen", "ORD111111");
        assert!(html.contains("#ORD111111"));
        assert_eq!(ready_subject("ORD111111"), "Order #ORD111111 Ready for Pickup!");
    }

    #[tokio::test]
    async fn sends_only_when_the_order_has_an_email() {
        let mailer = Arc::new(RecordingMailer::default());
        let svc = EmailService::new(mailer.clone(), "noreply@kitchen".into(), "Kitchen".into());

        svc.send_order_confirmation(&order(None)).await;
        assert!(mailer.sent.lock().unwrap().is_empty());

        svc.send_order_ready(&order(Some("a@b.com"))).await;
        let sent = mailer.sent.lock().unwrap();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].to, "a@b.com");
        assert_eq!(sent[0].from, "noreply@kitchen");
    }

    #[tokio::test]
    async fn mailer_failures_are_swallowed() {
        let mailer = Arc::new(RecordingMailer { fail: true, ..Default::default() });
        let svc = EmailService::new(mailer, "x".into(), "Kitchen".into());
        // Não pode entrar em pânico nem propagar o erro
        svc.send_order_confirmation(&order(Some("a@b.com"))).await;
    }
}
