// src/services/order_service.rs

use chrono::Utc;
use rust_decimal::Decimal;
use sqlx::PgPool;
use std::collections::HashMap;
use uuid::Uuid;
use validator::{ValidationError, ValidationErrors};

use crate::{
    common::error::AppError,
    db::{AuditRepository, MenuRepository, OrderRepository, TableRepository},
    middleware::auth::AuthenticatedUser,
    models::{
        audit::{AuditLogEntry, NewAuditLog, DEFAULT_MODIFY_REASON, MODIFY_ORDER_ACTION},
        orders::{
            diff_items, generate_order_code, items_subtotal, total_pages, CompletedOrdersQuery,
            CompletedOrdersResponse, CreateOrderPayload, DineInOrderPayload, HistoryQuery,
            ItemStatus, ModificationEntry, NewOrder, Order, OrderFilter, OrderItem,
            OrderItemRequest, OrderStatus, OrderType, PaymentMode, PaymentStatus, PaymentUpdate,
            PendingOrdersQuery, RecordPaymentPayload,
        },
        payments::{MarkCashPaidPayload, MarkPaidPayload},
        tables::TableStatus,
    },
    services::email_service::EmailService,
};

pub const DEFAULT_PENDING_LIMIT: i64 = 100;
pub const DEFAULT_COMPLETED_LIMIT: i64 = 5;
pub const DEFAULT_HISTORY_LIMIT: i64 = 50;
pub const MAX_PAGE_LIMIT: i64 = 100;
const MAX_CODE_ATTEMPTS: usize = 5;

/// Interpreta o `itemId` de cada linha e a quantidade (padrão 1).
pub fn parse_item_requests(requests: &[OrderItemRequest]) -> Result<Vec<(Uuid, i32)>, AppError> {
    requests
        .iter()
        .map(|req| {
            let raw = req
                .item_id
                .as_deref()
                .map(str::trim)
                .filter(|id| !id.is_empty())
                .ok_or(AppError::MissingItemId)?;
            let id = Uuid::parse_str(raw).map_err(|_| AppError::MenuItemNotFound(raw.to_string()))?;

            let quantity = req.quantity.unwrap_or(1);
            if quantity < 1 {
                let mut errors = ValidationErrors::new();
                let mut err = ValidationError::new("range");
                err.message = Some("The quantity must be at least 1.".into());
                errors.add("quantity", err);
                return Err(AppError::ValidationError(errors));
            }
            Ok((id, quantity))
        })
        .collect()
}

// Limite informado pelo cliente, sempre dentro de 1..=MAX_PAGE_LIMIT
fn clamp_limit(limit: Option<i64>, default: i64) -> i64 {
    limit
        .filter(|l| *l >= 1)
        .map(|l| l.min(MAX_PAGE_LIMIT))
        .unwrap_or(default)
}

fn page_params(page: Option<i64>, limit: Option<i64>) -> (i64, i64) {
    let page = page.filter(|p| *p >= 1).unwrap_or(1);
    (page, clamp_limit(limit, DEFAULT_COMPLETED_LIMIT))
}

fn page_offset(page: i64, limit: i64) -> i64 {
    (page - 1).saturating_mul(limit)
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

#[derive(Clone)]
pub struct OrderService {
    order_repo: OrderRepository,
    menu_repo: MenuRepository,
    table_repo: TableRepository,
    audit_repo: AuditRepository,
    email_service: EmailService,
    pool: PgPool,
    dine_in_email: String,
}

impl OrderService {
    pub fn new(
        order_repo: OrderRepository,
        menu_repo: MenuRepository,
        table_repo: TableRepository,
        audit_repo: AuditRepository,
        email_service: EmailService,
        pool: PgPool,
        dine_in_email: String,
    ) -> Self {
        Self {
            order_repo,
            menu_repo,
            table_repo,
            audit_repo,
            email_service,
            pool,
            dine_in_email,
        }
    }

    // ---
    // Resolução de itens
    // ---

    /// Busca cada item no cardápio e "fotografa" nome e preço.
    pub async fn resolve_items(&self, requests: &[OrderItemRequest]) -> Result<Vec<OrderItem>, AppError> {
        let parsed = parse_item_requests(requests)?;
        let ids: Vec<Uuid> = parsed.iter().map(|(id, _)| *id).collect();

        let menu: HashMap<Uuid, _> = self
            .menu_repo
            .find_many(&self.pool, &ids)
            .await?
            .into_iter()
            .map(|item| (item.id, item))
            .collect();

        parsed
            .into_iter()
            .map(|(id, quantity)| {
                let menu_item = menu
                    .get(&id)
                    .ok_or_else(|| AppError::MenuItemNotFound(id.to_string()))?;
                Ok(OrderItem {
                    item_id: id,
                    name: menu_item.name.clone(),
                    price: menu_item.price,
                    quantity,
                    status: ItemStatus::Pending,
                })
            })
            .collect()
    }

    /// Soma preço x quantidade direto do cardápio (usado pelos gateways).
    pub async fn price_items(&self, requests: &[OrderItemRequest]) -> Result<Decimal, AppError> {
        let items = self.resolve_items(requests).await?;
        Ok(items_subtotal(&items))
    }

    // ---
    // Criação
    // ---

    /// Insere o pedido gerando um `orderCode` novo a cada colisão.
    pub async fn create_from_draft(&self, mut draft: NewOrder) -> Result<Order, AppError> {
        for attempt in 1..=MAX_CODE_ATTEMPTS {
            draft.order_code = generate_order_code();
            match self.order_repo.insert(&self.pool, &draft).await {
                Err(AppError::OrderCodeConflict) if attempt < MAX_CODE_ATTEMPTS => {
                    tracing::warn!(code = %draft.order_code, "Código de pedido repetido, gerando outro");
                }
                result => return result,
            }
        }
        Err(AppError::OrderCodeConflict)
    }

    /// Checkout público e pedidos de balcão. `forced_type` ignora o tipo do corpo.
    pub async fn place_order(
        &self,
        payload: CreateOrderPayload,
        default_type: OrderType,
        forced_type: Option<OrderType>,
        send_confirmation: bool,
    ) -> Result<Order, AppError> {
        let requests = payload.items.unwrap_or_default();
        let items = self.resolve_items(&requests).await?;
        let order_type = forced_type.or(payload.order_type).unwrap_or(default_type);

        let draft = NewOrder {
            order_code: String::new(),
            name: payload.name.unwrap_or_default(),
            email: non_empty(payload.email),
            phone: non_empty(payload.phone),
            items,
            notes: payload.notes,
            order_type,
            payment_status: payload.payment_status.unwrap_or(PaymentStatus::Pending),
            payment_mode: payload.payment_mode,
            payment_intent_id: payload.transaction_id,
            card_brand: None,
            last4: None,
            discount: payload.discount.unwrap_or(Decimal::ZERO),
            tax: payload.tax.unwrap_or(Decimal::ZERO),
            split_payment: payload.split_payment,
            table_id: None,
            waiter_id: None,
            waiter_name: None,
            started_at: None,
        };

        let order = self.create_from_draft(draft).await?;
        tracing::info!(
            code = %order.order_code,
            order_type = order.order_type.label(),
            total = %order.subtotal(),
            "🛒 Pedido registrado"
        );

        if send_confirmation {
            self.notify_confirmation(&order).await;
        }
        Ok(order)
    }

    pub async fn notify_confirmation(&self, order: &Order) {
        self.email_service.send_order_confirmation(order).await;
    }

    /// Pedido de mesa: cria o pedido e ocupa a mesa na mesma transação.
    pub async fn place_dine_in(
        &self,
        payload: DineInOrderPayload,
        waiter: &AuthenticatedUser,
    ) -> Result<Order, AppError> {
        let items = self.resolve_items(&payload.items).await?;
        let now = Utc::now();

        for attempt in 1..=MAX_CODE_ATTEMPTS {
            let mut tx = self.pool.begin().await?;

            let table = self
                .table_repo
                .find_for_update(&mut *tx, payload.table_id)
                .await?
                .ok_or_else(|| AppError::ResourceNotFound("Table".into()))?;
            if table.status == TableStatus::Occupied {
                return Err(AppError::TableOccupied);
            }

            let draft = NewOrder {
                order_code: generate_order_code(),
                name: format!("Dine-In Table {}", table.table_number),
                email: Some(self.dine_in_email.clone()).filter(|e| !e.is_empty()),
                phone: None,
                items: items.clone(),
                notes: payload.notes.clone(),
                order_type: OrderType::DineIn,
                payment_status: PaymentStatus::Pending,
                payment_mode: None,
                payment_intent_id: None,
                card_brand: None,
                last4: None,
                discount: Decimal::ZERO,
                tax: Decimal::ZERO,
                split_payment: None,
                table_id: Some(table.id),
                waiter_id: Some(waiter.id),
                waiter_name: Some(waiter.username.clone()),
                started_at: Some(now),
            };

            // Colisão de código aborta a transação; descarta e tenta de novo
            let order = match self.order_repo.insert(&mut *tx, &draft).await {
                Err(AppError::OrderCodeConflict) if attempt < MAX_CODE_ATTEMPTS => {
                    tx.rollback().await?;
                    continue;
                }
                other => other?,
            };

            self.table_repo
                .occupy(&mut *tx, table.id, order.id, waiter.id, &waiter.username, now)
                .await?;

            tx.commit().await?;

            tracing::info!(
                code = %order.order_code,
                table = %table.table_number,
                waiter = %waiter.username,
                "🍽️ Pedido de mesa registrado"
            );
            return Ok(order);
        }
        Err(AppError::OrderCodeConflict)
    }

    // ---
    // Consultas
    // ---

    pub async fn list_pending(&self, query: PendingOrdersQuery) -> Result<Vec<Order>, AppError> {
        let filter = OrderFilter {
            status: Some(OrderStatus::Pending),
            name_like: non_empty(query.name),
            email_like: non_empty(query.email),
            day: query.date,
            order_type: query.order_type,
            ..Default::default()
        };
        let limit = clamp_limit(query.limit, DEFAULT_PENDING_LIMIT);
        self.order_repo.list(&filter, limit, 0).await
    }

    pub async fn list_completed(&self, query: CompletedOrdersQuery) -> Result<CompletedOrdersResponse, AppError> {
        let (page, limit) = page_params(query.page, query.limit);
        let filter = OrderFilter {
            status: Some(OrderStatus::Completed),
            name_like: non_empty(query.name),
            email_like: non_empty(query.email),
            day: query.date,
            ..Default::default()
        };

        let total = self.order_repo.count(&filter).await?;
        let orders = self.order_repo.list(&filter, limit, page_offset(page, limit)).await?;

        Ok(CompletedOrdersResponse {
            orders,
            current_page: page,
            total_pages: total_pages(total, limit),
            total_orders: total,
        })
    }

    /// Histórico público por e-mail e/ou nome exatos.
    pub async fn history(&self, query: HistoryQuery) -> Result<Vec<Order>, AppError> {
        let email = non_empty(query.email);
        let name = non_empty(query.name);
        if email.is_none() && name.is_none() {
            return Err(AppError::HistoryFilterRequired);
        }

        let filter = OrderFilter {
            exact_email: email,
            exact_name: name,
            ..Default::default()
        };
        let limit = clamp_limit(query.limit, DEFAULT_HISTORY_LIMIT);
        let orders = self.order_repo.list(&filter, limit, 0).await?;
        if orders.is_empty() {
            return Err(AppError::NoOrdersFound);
        }
        Ok(orders)
    }

    pub async fn get_order(&self, id: Uuid) -> Result<Order, AppError> {
        self.order_repo
            .find_by_id(&self.pool, id)
            .await?
            .ok_or_else(|| AppError::ResourceNotFound("Order".into()))
    }

    pub async fn order_for_table(&self, table_id: Uuid) -> Result<Order, AppError> {
        let order_id = self
            .table_repo
            .find_by_id(&self.pool, table_id)
            .await?
            .and_then(|t| t.current_order_id)
            .ok_or(AppError::NoActiveOrderForTable)?;
        self.get_order(order_id).await
    }

    pub async fn pending_dine_in(&self) -> Result<Vec<Order>, AppError> {
        self.order_repo.list_pending_dine_in().await
    }

    // ---
    // Alterações de itens
    // ---

    /// Troca os itens e registra quem mudou o quê. Pedido e auditoria na mesma transação.
    pub async fn modify_order(
        &self,
        id: Uuid,
        requests: &[OrderItemRequest],
        reason: Option<String>,
        actor: &AuthenticatedUser,
    ) -> Result<Order, AppError> {
        // Todos os itens precisam de itemId antes de tocar no banco
        parse_item_requests(requests)?;

        let mut tx = self.pool.begin().await?;

        let order = self
            .order_repo
            .find_for_update(&mut *tx, id)
            .await?
            .ok_or_else(|| AppError::ResourceNotFound("Order".into()))?;
        if order.status == OrderStatus::Completed {
            return Err(AppError::OrderAlreadyCompleted);
        }

        let new_items = self.resolve_items(requests).await?;
        let reason = non_empty(reason).unwrap_or_else(|| DEFAULT_MODIFY_REASON.to_string());
        let at = Utc::now();

        let entries: Vec<ModificationEntry> = diff_items(&order.items, &new_items)
            .into_iter()
            .map(|(action, before, after)| ModificationEntry {
                performed_by: actor.id,
                performed_by_name: actor.username.clone(),
                action,
                before,
                after,
                reason: reason.clone(),
                at,
            })
            .collect();

        let updated = self
            .order_repo
            .replace_items(&mut *tx, id, &new_items, &entries)
            .await?;

        self.audit_repo
            .insert(
                &mut *tx,
                &NewAuditLog {
                    action: MODIFY_ORDER_ACTION.to_string(),
                    performed_by: actor.id,
                    performed_by_name: actor.username.clone(),
                    order_id: id,
                    table_id: order.table_id,
                    before: order.items.0.clone(),
                    after: new_items,
                    reason,
                    modification_session_id: Uuid::new_v4(),
                },
            )
            .await?;

        tx.commit().await?;

        tracing::info!(
            code = %updated.order_code,
            by = %actor.username,
            changes = entries.len(),
            "✏️ Pedido modificado"
        );
        Ok(updated)
    }

    /// Edição simples (sem auditoria).
    pub async fn edit_order(&self, id: Uuid, requests: &[OrderItemRequest]) -> Result<Order, AppError> {
        self.get_order(id).await?;
        let new_items = self.resolve_items(requests).await?;
        self.order_repo
            .replace_items(&self.pool, id, &new_items, &[])
            .await
    }

    pub async fn update_item_status(
        &self,
        order_id: Uuid,
        item_id: Uuid,
        status: &str,
    ) -> Result<OrderItem, AppError> {
        let status = ItemStatus::parse(status).ok_or(AppError::InvalidItemStatus)?;

        let mut tx = self.pool.begin().await?;
        let order = self
            .order_repo
            .find_for_update(&mut *tx, order_id)
            .await?
            .ok_or_else(|| AppError::ResourceNotFound("Order".into()))?;

        let mut items = order.items.0;
        let item = items
            .iter_mut()
            .find(|i| i.item_id == item_id)
            .ok_or_else(|| AppError::OrderItemNotFound(item_id.to_string()))?;
        item.status = status;
        let updated_item = item.clone();

        self.order_repo.replace_items(&mut *tx, order_id, &items, &[]).await?;
        tx.commit().await?;

        Ok(updated_item)
    }

    pub async fn start_cooking(&self, id: Uuid) -> Result<chrono::DateTime<Utc>, AppError> {
        let at = Utc::now();
        if !self.order_repo.set_started_cooking(id, at).await? {
            return Err(AppError::ResourceNotFound("Order".into()));
        }
        Ok(at)
    }

    // ---
    // Fechamento e pagamento
    // ---

    pub async fn complete_order(&self, id: Uuid) -> Result<Order, AppError> {
        let order = self
            .order_repo
            .mark_completed(id)
            .await?
            .ok_or_else(|| AppError::ResourceNotFound("Order".into()))?;
        tracing::info!(code = %order.order_code, "✅ Pedido concluído");

        self.release_table(&order).await;
        self.email_service.send_order_ready(&order).await;
        Ok(order)
    }

    /// Pagamento no POS (dinheiro ou cartão na maquininha).
    pub async fn record_payment(&self, id: Uuid, payload: RecordPaymentPayload) -> Result<Order, AppError> {
        self.get_order(id).await?;
        let update = PaymentUpdate {
            payment_mode: Some(payload.payment_mode.unwrap_or(PaymentMode::Cash)),
            payment_intent_id: payload.payment_intent_id,
            card_brand: payload.card_brand,
            last4: payload.last4,
            amount_paid: Some(payload.amount_paid.unwrap_or(Decimal::ZERO)),
            change_returned: Some(payload.change_returned.unwrap_or(Decimal::ZERO)),
            mark_completed: false,
        };
        let order = self.order_repo.record_payment(id, PaymentStatus::Paid, &update).await?;
        tracing::info!(code = %order.order_code, mode = ?update.payment_mode, "💳 Pagamento registrado");

        self.release_table(&order).await;
        Ok(order)
    }

    /// Cartão via Stripe: marca pago e conclui.
    pub async fn mark_card_paid(&self, id: Uuid, payload: MarkPaidPayload) -> Result<Order, AppError> {
        let order = self.get_order(id).await?;
        if order.is_paid() {
            return Err(AppError::OrderAlreadyPaid);
        }
        if let Some(gateway_status) = payload.payment_status.as_deref() {
            tracing::info!(code = %order.order_code, gateway_status, "Status informado pelo gateway");
        }

        let update = PaymentUpdate {
            payment_mode: Some(PaymentMode::Card),
            payment_intent_id: non_empty(payload.payment_intent_id),
            card_brand: non_empty(payload.card_brand),
            last4: non_empty(payload.last4),
            amount_paid: None,
            change_returned: None,
            mark_completed: true,
        };
        let order = self.order_repo.record_payment(id, PaymentStatus::Paid, &update).await?;
        tracing::info!(code = %order.order_code, "💳 Pedido pago com cartão");

        self.release_table(&order).await;
        Ok(order)
    }

    pub async fn mark_cash_paid(&self, id: Uuid, payload: MarkCashPaidPayload) -> Result<Order, AppError> {
        let order = self.get_order(id).await?;
        if order.is_paid() {
            return Err(AppError::OrderAlreadyPaid);
        }

        let update = PaymentUpdate {
            payment_mode: Some(PaymentMode::Cash),
            amount_paid: payload.amount_paid,
            change_returned: payload.change_returned,
            mark_completed: true,
            ..Default::default()
        };
        let order = self.order_repo.record_payment(id, PaymentStatus::Paid, &update).await?;
        tracing::info!(code = %order.order_code, "💵 Pedido pago em dinheiro");

        self.release_table(&order).await;
        Ok(order)
    }

    // Falha ao liberar a mesa não desfaz o fechamento do pedido
    async fn release_table(&self, order: &Order) {
        let Some(table_id) = order.table_to_release() else {
            return;
        };
        match self.table_repo.release(table_id, order.id).await {
            Ok(true) => tracing::info!(code = %order.order_code, %table_id, "🪑 Mesa liberada"),
            Ok(false) => tracing::info!(code = %order.order_code, %table_id, "Mesa já está com outro pedido; mantida"),
            Err(e) => tracing::warn!(%table_id, "Falha ao liberar a mesa: {}", e),
        }
    }

    // ---
    // Auditoria
    // ---

    pub async fn all_modifications(&self) -> Result<Vec<AuditLogEntry>, AppError> {
        let rows = self.audit_repo.list_all().await?;
        Ok(rows.into_iter().map(AuditLogEntry::from).collect())
    }

    pub async fn order_modifications(&self, order_id: Uuid) -> Result<Vec<AuditLogEntry>, AppError> {
        let rows = self.audit_repo.list_for_order(order_id).await?;
        Ok(rows.into_iter().map(AuditLogEntry::from).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn req(id: Option<&str>, quantity: Option<i32>) -> OrderItemRequest {
        OrderItemRequest {
            item_id: id.map(String::from),
            quantity,
        }
    }

    #[test]
    fn quantity_defaults_to_one() {
        let id = Uuid::new_v4();
        let parsed = parse_item_requests(&[req(Some(&id.to_string()), None)]).unwrap();
        assert_eq!(parsed, vec![(id, 1)]);
    }

    #[test]
    fn missing_item_id_is_a_bad_request() {
        let err = parse_item_requests(&[req(None, Some(2))]).unwrap_err();
        assert!(matches!(err, AppError::MissingItemId));
        let err = parse_item_requests(&[req(Some("  "), Some(2))]).unwrap_err();
        assert!(matches!(err, AppError::MissingItemId));
    }

    #[test]
    fn malformed_item_id_is_reported_as_not_found() {
        let err = parse_item_requests(&[req(Some("not-a-uuid"), None)]).unwrap_err();
        match err {
            AppError::MenuItemNotFound(id) => assert_eq!(id, "not-a-uuid"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn zero_quantity_is_invalid() {
        let id = Uuid::new_v4().to_string();
        let err = parse_item_requests(&[req(Some(&id), Some(0))]).unwrap_err();
        assert!(matches!(err, AppError::ValidationError(_)));
    }

    #[test]
    fn paging_defaults() {
        assert_eq!(page_params(None, None), (1, DEFAULT_COMPLETED_LIMIT));
        assert_eq!(page_params(Some(0), Some(-3)), (1, DEFAULT_COMPLETED_LIMIT));
        assert_eq!(page_params(Some(3), Some(20)), (3, 20));
    }

    #[test]
    fn huge_paging_values_are_clamped_without_overflow() {
        let (page, limit) = page_params(Some(i64::MAX), Some(i64::MAX));
        assert_eq!((page, limit), (i64::MAX, MAX_PAGE_LIMIT));
        assert_eq!(page_offset(page, limit), i64::MAX);
        assert_eq!(clamp_limit(Some(500), DEFAULT_HISTORY_LIMIT), MAX_PAGE_LIMIT);
        assert_eq!(clamp_limit(None, DEFAULT_PENDING_LIMIT), DEFAULT_PENDING_LIMIT);
    }
}
