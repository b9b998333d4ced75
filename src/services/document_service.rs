// src/services/document_service.rs

use genpdf::{elements, style, Element};
use image::Luma;
use qrcode::QrCode;
use std::path::{Path, PathBuf};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::orders::Order,
    services::order_service::OrderService,
};

fn pdf_error(e: impl std::fmt::Display) -> AppError {
    AppError::InternalServerError(anyhow::Error::msg(e.to_string()))
}

/// Monta o recibo em memória. Trabalho de CPU puro; chamar fora do executor.
pub fn render_receipt(order: &Order, restaurant_name: &str, fonts_dir: &Path) -> Result<Vec<u8>, AppError> {
    let font_family = genpdf::fonts::from_files(fonts_dir, "Roboto", None)
        .map_err(|_| AppError::FontNotFound(fonts_dir.display().to_string()))?;

    let mut doc = genpdf::Document::new(font_family);
    doc.set_title(format!("Receipt #{}", order.order_code));
    let mut decorator = genpdf::SimplePageDecorator::new();
    decorator.set_margins(10);
    doc.set_page_decorator(decorator);

    doc.push(elements::Paragraph::new(restaurant_name).styled(style::Style::new().bold().with_font_size(18)));
    doc.push(elements::Break::new(1.5));

    doc.push(
        elements::Paragraph::new(format!("RECEIPT #{}", order.order_code))
            .styled(style::Style::new().bold().with_font_size(14)),
    );
    doc.push(elements::Paragraph::new(format!(
        "Date: {}",
        order.created_at.format("%Y-%m-%d %H:%M")
    )));
    doc.push(elements::Paragraph::new(format!("Customer: {}", order.name)));
    doc.push(elements::Paragraph::new(format!("Type: {}", order.order_type.label())));
    if let Some(waiter) = order.waiter_name.as_deref() {
        doc.push(elements::Paragraph::new(format!("Served by: {}", waiter)));
    }

    doc.push(elements::Break::new(2));

    // Pesos: Item (4), Qtd (1), Unitário (2), Total (2)
    let mut table = elements::TableLayout::new(vec![4, 1, 2, 2]);
    table.set_cell_decorator(elements::FrameCellDecorator::new(true, true, false));

    let bold = style::Style::new().bold();
    table
        .row()
        .element(elements::Paragraph::new("Item").styled(bold))
        .element(elements::Paragraph::new("Qty").styled(bold))
        .element(elements::Paragraph::new("Price").styled(bold))
        .element(elements::Paragraph::new("Total").styled(bold))
        .push()
        .map_err(pdf_error)?;

    for item in order.items.iter() {
        table
            .row()
            .element(elements::Paragraph::new(item.name.clone()))
            .element(elements::Paragraph::new(item.quantity.to_string()))
            .element(elements::Paragraph::new(format!("{:.2}", item.price)))
            .element(elements::Paragraph::new(format!("{:.2}", item.line_total())))
            .push()
            .map_err(pdf_error)?;
    }

    doc.push(table);
    doc.push(elements::Break::new(1));

    let totals = [
        ("Subtotal", order.subtotal()),
        ("Discount", order.discount),
        ("Tax", order.tax),
    ];
    for (label, value) in totals {
        let mut line = elements::Paragraph::new(format!("{}: {:.2}", label, value));
        line.set_alignment(genpdf::Alignment::Right);
        doc.push(line);
    }

    let mut total = elements::Paragraph::new(format!("TOTAL: {:.2}", order.amount_due()));
    total.set_alignment(genpdf::Alignment::Right);
    doc.push(total.styled(style::Style::new().bold().with_font_size(12)));

    doc.push(elements::Break::new(2));

    let code = QrCode::new(order.order_code.as_bytes()).map_err(pdf_error)?;
    let image_buffer = code.render::<Luma<u8>>().build();
    let pdf_image = elements::Image::from_dynamic_image(image::DynamicImage::ImageLuma8(image_buffer))
        .map_err(pdf_error)?
        .with_scale(genpdf::Scale::new(0.5, 0.5));
    doc.push(pdf_image);

    doc.push(elements::Break::new(1));
    doc.push(
        elements::Paragraph::new("Thank you for dining with us!")
            .styled(style::Style::new().italic().with_font_size(8)),
    );

    let mut buffer = Vec::new();
    doc.render(&mut buffer).map_err(pdf_error)?;
    Ok(buffer)
}

#[derive(Clone)]
pub struct DocumentService {
    order_service: OrderService,
    restaurant_name: String,
    fonts_dir: PathBuf,
}

impl DocumentService {
    pub fn new(order_service: OrderService, restaurant_name: String, fonts_dir: PathBuf) -> Self {
        Self {
            order_service,
            restaurant_name,
            fonts_dir,
        }
    }

    pub async fn generate_receipt(&self, order_id: Uuid) -> Result<(String, Vec<u8>), AppError> {
        let order = self.order_service.get_order(order_id).await?;
        let restaurant = self.restaurant_name.clone();
        let fonts_dir = self.fonts_dir.clone();
        let code = order.order_code.clone();

        let bytes = tokio::task::spawn_blocking(move || render_receipt(&order, &restaurant, &fonts_dir))
            .await
            .map_err(|e| anyhow::anyhow!("Falha na task do PDF: {}", e))??;

        tracing::info!(%code, size = bytes.len(), "🧾 Recibo gerado");
        Ok((code, bytes))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::orders::{OrderStatus, OrderType, PaymentStatus};
    use chrono::Utc;
    use rust_decimal::Decimal;
    use sqlx::types::Json;

    #[test]
    fn missing_fonts_are_reported_with_the_directory() {
        let now = Utc::now();
        let order = Order {
            id: Uuid::new_v4(),
            order_code: "ORD100200".into(),
            name: "Walk-in".into(),
            email: None,
            phone: None,
            items: Json(vec![]),
            initial_items: Json(vec![]),
            modifications: Json(vec![]),
            notes: None,
            order_type: OrderType::WalkIn,
            status: OrderStatus::Completed,
            payment_status: PaymentStatus::Paid,
            payment_mode: None,
            payment_intent_id: None,
            card_brand: None,
            last4: None,
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
        };

        let err = render_receipt(&order, "Kitchen", Path::new("/definitely/not/here")).unwrap_err();
        match err {
            AppError::FontNotFound(dir) => assert!(dir.contains("/definitely/not/here")),
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
