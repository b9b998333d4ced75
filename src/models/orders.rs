// src/models/orders.rs

use chrono::{DateTime, NaiveDate, Utc};
use rand::Rng;
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use sqlx::{types::Json, FromRow};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

// --- Enums ---

/// Canal de origem do pedido. Só muda a exibição e o vínculo com mesa.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "order_type")]
pub enum OrderType {
    #[sqlx(rename = "online")]
    #[serde(rename = "online")]
    Online,
    #[sqlx(rename = "dine-in")]
    #[serde(rename = "dine-in", alias = "dinein")]
    DineIn,
    #[sqlx(rename = "walk-in")]
    #[serde(rename = "walk-in", alias = "walkin")]
    WalkIn,
    #[sqlx(rename = "to-go")]
    #[serde(rename = "to-go", alias = "togo")]
    ToGo,
    #[sqlx(rename = "call-in")]
    #[serde(rename = "call-in", alias = "callin")]
    CallIn,
}

impl OrderType {
    pub fn label(&self) -> &'static str {
        match self {
            OrderType::Online => "Online",
            OrderType::DineIn => "Dine-in",
            OrderType::WalkIn => "Walk-in",
            OrderType::ToGo => "To-go",
            OrderType::CallIn => "Call-in",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "order_status")]
pub enum OrderStatus {
    Pending,
    Completed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "payment_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    #[serde(alias = "Pending")]
    Pending,
    Unpaid,
    #[serde(alias = "completed")]
    Paid,
    Succeeded,
    Failed,
    Canceled,
}

impl PaymentStatus {
    /// "paid" e "succeeded" contam como pagamento já liquidado.
    pub fn is_settled(&self) -> bool {
        matches!(self, PaymentStatus::Paid | PaymentStatus::Succeeded)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "payment_mode", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum PaymentMode {
    Cash,
    Card,
    Online,
}

/// Status de preparo de cada item (tela da cozinha).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "kebab-case")]
pub enum ItemStatus {
    #[default]
    Pending,
    InProgress,
    Ready,
}

impl ItemStatus {
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "pending" => Some(ItemStatus::Pending),
            "in-progress" => Some(ItemStatus::InProgress),
            "ready" => Some(ItemStatus::Ready),
            _ => None,
        }
    }
}

// --- Itens embutidos (JSONB) ---

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OrderItem {
    pub item_id: Uuid,
    // Nome e preço são "fotografados" do cardápio no momento do pedido
    #[schema(example = "Butter Naan")]
    pub name: String,
    #[schema(example = "3.50")]
    pub price: Decimal,
    #[schema(example = 2)]
    pub quantity: i32,
    #[serde(default)]
    pub status: ItemStatus,
}

impl OrderItem {
    pub fn line_total(&self) -> Decimal {
        self.price * Decimal::from(self.quantity)
    }
}

pub fn items_subtotal(items: &[OrderItem]) -> Decimal {
    items.iter().map(OrderItem::line_total).sum()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "kebab-case")]
pub enum ModificationAction {
    ItemAdded,
    ItemRemoved,
    QuantityChanged,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ModificationEntry {
    pub performed_by: Uuid,
    pub performed_by_name: String,
    pub action: ModificationAction,
    pub before: Option<OrderItem>,
    pub after: Option<OrderItem>,
    pub reason: String,
    pub at: DateTime<Utc>,
}

/// Compara a lista antiga com a nova, casando itens pelo `item_id`.
/// Itens repetidos são casados na ordem em que aparecem.
pub fn diff_items(
    before: &[OrderItem],
    after: &[OrderItem],
) -> Vec<(ModificationAction, Option<OrderItem>, Option<OrderItem>)> {
    let mut changes = Vec::new();
    let mut matched = vec![false; after.len()];

    for old in before {
        let found = after
            .iter()
            .enumerate()
            .find(|(idx, new)| !matched[*idx] && new.item_id == old.item_id);

        match found {
            Some((idx, new)) => {
                matched[idx] = true;
                if new.quantity != old.quantity {
                    changes.push((
                        ModificationAction::QuantityChanged,
                        Some(old.clone()),
                        Some(new.clone()),
                    ));
                }
            }
            None => changes.push((ModificationAction::ItemRemoved, Some(old.clone()), None)),
        }
    }

    for (idx, new) in after.iter().enumerate() {
        if !matched[idx] {
            changes.push((ModificationAction::ItemAdded, None, Some(new.clone())));
        }
    }

    changes
}

/// Código de exibição: "ORD" + 6 dígitos.
pub fn generate_order_code() -> String {
    let n: u32 = rand::thread_rng().gen_range(100_000..1_000_000);
    format!("ORD{}", n)
}

// --- Documento do pedido ---

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: Uuid,
    #[schema(example = "ORD482913")]
    pub order_code: String,
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    #[schema(value_type = Vec<OrderItem>)]
    pub items: Json<Vec<OrderItem>>,
    #[schema(value_type = Vec<OrderItem>)]
    pub initial_items: Json<Vec<OrderItem>>,
    #[schema(value_type = Vec<ModificationEntry>)]
    pub modifications: Json<Vec<ModificationEntry>>,
    pub notes: Option<String>,
    pub order_type: OrderType,
    pub status: OrderStatus,
    pub payment_status: PaymentStatus,
    pub payment_mode: Option<PaymentMode>,
    pub payment_intent_id: Option<String>,
    pub card_brand: Option<String>,
    pub last4: Option<String>,
    pub amount_paid: Option<Decimal>,
    pub change_returned: Option<Decimal>,
    pub discount: Decimal,
    pub tax: Decimal,
    #[schema(value_type = Option<Object>)]
    pub split_payment: Option<Json<Value>>,
    pub table_id: Option<Uuid>,
    pub waiter_id: Option<Uuid>,
    pub waiter_name: Option<String>,
    pub started_at: Option<DateTime<Utc>>,
    pub started_cooking_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
    // Mantemos o nome "timestamp" no JSON por compatibilidade com o frontend
    #[serde(rename = "timestamp")]
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Order {
    pub fn subtotal(&self) -> Decimal {
        items_subtotal(&self.items)
    }

    /// Valor cobrado: subtotal - desconto + taxa, nunca negativo.
    pub fn amount_due(&self) -> Decimal {
        (self.subtotal() - self.discount + self.tax).max(Decimal::ZERO)
    }

    pub fn is_paid(&self) -> bool {
        self.payment_status.is_settled()
    }

    /// Mesa que deve ser liberada quando o pedido fecha (apenas dine-in).
    pub fn table_to_release(&self) -> Option<Uuid> {
        match self.order_type {
            OrderType::DineIn => self.table_id,
            _ => None,
        }
    }
}

/// Tudo que é necessário para inserir um pedido novo.
#[derive(Debug, Clone)]
pub struct NewOrder {
    pub order_code: String,
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub items: Vec<OrderItem>,
    pub notes: Option<String>,
    pub order_type: OrderType,
    pub payment_status: PaymentStatus,
    pub payment_mode: Option<PaymentMode>,
    pub payment_intent_id: Option<String>,
    pub card_brand: Option<String>,
    pub last4: Option<String>,
    pub discount: Decimal,
    pub tax: Decimal,
    pub split_payment: Option<Value>,
    pub table_id: Option<Uuid>,
    pub waiter_id: Option<Uuid>,
    pub waiter_name: Option<String>,
    pub started_at: Option<DateTime<Utc>>,
}

/// Campos de pagamento gravados ao fechar a conta.
#[derive(Debug, Clone, Default)]
pub struct PaymentUpdate {
    pub payment_mode: Option<PaymentMode>,
    pub payment_intent_id: Option<String>,
    pub card_brand: Option<String>,
    pub last4: Option<String>,
    pub amount_paid: Option<Decimal>,
    pub change_returned: Option<Decimal>,
    pub mark_completed: bool,
}

// --- Payloads ---

// itemId que não é texto vira ausente e cai no erro de itemId obrigatório
fn lenient_item_id<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::String(id) => Some(id),
        _ => None,
    })
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OrderItemRequest {
    // O frontend manda ora `itemId`, ora `_id`
    #[serde(default, alias = "_id", deserialize_with = "lenient_item_id")]
    pub item_id: Option<String>,
    pub quantity: Option<i32>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrderPayload {
    #[validate(required(message = "The customer name is required."), length(min = 1, message = "The customer name is required."))]
    pub name: Option<String>,
    #[validate(email(message = "The e-mail is invalid."))]
    pub email: Option<String>,
    pub phone: Option<String>,
    pub order_type: Option<OrderType>,
    pub payment_status: Option<PaymentStatus>,
    pub payment_mode: Option<PaymentMode>,
    pub discount: Option<Decimal>,
    pub tax: Option<Decimal>,
    #[schema(value_type = Option<Object>)]
    pub split_payment: Option<Value>,
    #[validate(required(message = "At least one item is required."), length(min = 1, message = "At least one item is required."))]
    pub items: Option<Vec<OrderItemRequest>>,
    pub notes: Option<String>,
    pub transaction_id: Option<String>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DineInOrderPayload {
    pub table_id: Uuid,
    #[validate(length(min = 1, message = "At least one item is required."))]
    pub items: Vec<OrderItemRequest>,
    pub notes: Option<String>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ModifyOrderPayload {
    #[serde(default)]
    #[validate(length(min = 1, message = "At least one item is required."))]
    pub updated_items: Vec<OrderItemRequest>,
    pub reason: Option<String>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct EditOrderPayload {
    #[validate(length(min = 1, message = "At least one item is required."))]
    pub items: Vec<OrderItemRequest>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct ItemStatusPayload {
    #[schema(example = "in-progress")]
    pub status: String,
}

#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RecordPaymentPayload {
    pub payment_mode: Option<PaymentMode>,
    pub amount_paid: Option<Decimal>,
    pub change_returned: Option<Decimal>,
    pub card_brand: Option<String>,
    pub last4: Option<String>,
    pub payment_intent_id: Option<String>,
}

// --- Filtros ---

#[derive(Debug, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
pub struct PendingOrdersQuery {
    pub limit: Option<i64>,
    pub name: Option<String>,
    pub email: Option<String>,
    pub date: Option<NaiveDate>,
    pub order_type: Option<OrderType>,
}

#[derive(Debug, Default, Deserialize, IntoParams)]
pub struct CompletedOrdersQuery {
    pub page: Option<i64>,
    pub limit: Option<i64>,
    pub name: Option<String>,
    pub email: Option<String>,
    pub date: Option<NaiveDate>,
}

#[derive(Debug, Default, Deserialize, IntoParams)]
pub struct HistoryQuery {
    pub email: Option<String>,
    pub name: Option<String>,
    pub limit: Option<i64>,
}

/// Filtro comum às listagens de pedidos.
#[derive(Debug, Clone, Default)]
pub struct OrderFilter {
    pub status: Option<OrderStatus>,
    pub name_like: Option<String>,
    pub email_like: Option<String>,
    pub day: Option<NaiveDate>,
    pub order_type: Option<OrderType>,
    pub exact_email: Option<String>,
    pub exact_name: Option<String>,
}

// --- Respostas ---

#[derive(Debug, Serialize, ToSchema)]
pub struct OrdersResponse {
    pub orders: Vec<Order>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct OrderResponse {
    pub order: Order,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct OrderMessageResponse {
    pub message: String,
    pub order: Order,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CompletedOrdersResponse {
    pub orders: Vec<Order>,
    pub current_page: i64,
    pub total_pages: i64,
    pub total_orders: i64,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StartCookingResponse {
    pub message: String,
    pub started_cooking_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ItemStatusResponse {
    pub message: String,
    pub item: OrderItem,
}

pub fn total_pages(total: i64, limit: i64) -> i64 {
    if limit <= 0 {
        return 0;
    }
    total / limit + i64::from(total % limit != 0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dec(s: &str) -> Decimal {
        s.parse().expect("decimal literal")
    }

    fn item(id: Uuid, name: &str, price: &str, quantity: i32) -> OrderItem {
        OrderItem {
            item_id: id,
            name: name.to_string(),
            price: dec(price),
            quantity,
            status: ItemStatus::Pending,
        }
    }

    fn order_with(items: Vec<OrderItem>, discount: &str, tax: &str) -> Order {
        let now = Utc::now();
        Order {
            id: Uuid::new_v4(),
            order_code: "ORD123456".into(),
            name: "Ana".into(),
            email: None,
            phone: None,
            items: Json(items.clone()),
            initial_items: Json(items),
            modifications: Json(vec![]),
            notes: None,
            order_type: OrderType::Online,
            status: OrderStatus::Pending,
            payment_status: PaymentStatus::Pending,
            payment_mode: None,
            payment_intent_id: None,
            card_brand: None,
            last4: None,
            amount_paid: None,
            change_returned: None,
            discount: dec(discount),
            tax: dec(tax),
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
    fn subtotal_sums_price_times_quantity() {
        let items = vec![
            item(Uuid::new_v4(), "Naan", "3.50", 2),
            item(Uuid::new_v4(), "Dal", "8.25", 1),
        ];
        assert_eq!(items_subtotal(&items), dec("15.25"));
    }

    #[test]
    fn amount_due_applies_discount_and_tax_and_never_goes_negative() {
        let items = vec![item(Uuid::new_v4(), "Dal", "10.00", 2)];
        assert_eq!(order_with(items.clone(), "5", "1.60").amount_due(), dec("16.60"));
        assert_eq!(order_with(items, "50", "0").amount_due(), Decimal::ZERO);
    }

    #[test]
    fn only_dine_in_orders_release_tables() {
        let table = Uuid::new_v4();
        let mut order = order_with(vec![], "0", "0");
        order.table_id = Some(table);
        assert_eq!(order.table_to_release(), None);

        order.order_type = OrderType::DineIn;
        assert_eq!(order.table_to_release(), Some(table));
    }

    #[test]
    fn settled_payment_statuses() {
        assert!(PaymentStatus::Paid.is_settled());
        assert!(PaymentStatus::Succeeded.is_settled());
        assert!(!PaymentStatus::Pending.is_settled());
        assert!(!PaymentStatus::Failed.is_settled());
    }

    #[test]
    fn diff_detects_added_removed_and_quantity_changes() {
        let naan = Uuid::new_v4();
        let dal = Uuid::new_v4();
        let lassi = Uuid::new_v4();

        let before = vec![item(naan, "Naan", "3.50", 2), item(dal, "Dal", "8.00", 1)];
        let after = vec![item(naan, "Naan", "3.50", 3), item(lassi, "Lassi", "4.00", 1)];

        let changes = diff_items(&before, &after);
        assert_eq!(changes.len(), 3);

        assert_eq!(changes[0].0, ModificationAction::QuantityChanged);
        assert_eq!(changes[0].1.as_ref().map(|i| i.quantity), Some(2));
        assert_eq!(changes[0].2.as_ref().map(|i| i.quantity), Some(3));

        assert_eq!(changes[1].0, ModificationAction::ItemRemoved);
        assert_eq!(changes[1].1.as_ref().map(|i| i.item_id), Some(dal));
        assert!(changes[1].2.is_none());

        assert_eq!(changes[2].0, ModificationAction::ItemAdded);
        assert_eq!(changes[2].2.as_ref().map(|i| i.item_id), Some(lassi));
    }

    #[test]
    fn diff_of_identical_lists_is_empty() {
        let naan = Uuid::new_v4();
        let items = vec![item(naan, "Naan", "3.50", 2)];
        assert!(diff_items(&items, &items).is_empty());
    }

    #[test]
    fn diff_matches_repeated_items_in_order() {
        let naan = Uuid::new_v4();
        let before = vec![item(naan, "Naan", "3.50", 1), item(naan, "Naan", "3.50", 2)];
        let after = vec![item(naan, "Naan", "3.50", 1)];

        let changes = diff_items(&before, &after);
        assert_eq!(changes.len(), 1);
        assert_eq!(changes[0].0, ModificationAction::ItemRemoved);
        assert_eq!(changes[0].1.as_ref().map(|i| i.quantity), Some(2));
    }

    #[test]
    fn order_code_has_prefix_and_six_digits() {
        for _ in 0..50 {
            let code = generate_order_code();
            assert!(code.starts_with("ORD"));
            assert_eq!(code.len(), 9);
            assert!(code[3..].chars().all(|c| c.is_ascii_digit()));
        }
    }

    #[test]
    fn legacy_order_type_spellings_are_accepted() {
        let parsed: OrderType = serde_json::from_str("\"walkin\"").unwrap();
        assert_eq!(parsed, OrderType::WalkIn);
        let parsed: OrderType = serde_json::from_str("\"to-go\"").unwrap();
        assert_eq!(parsed, OrderType::ToGo);
        assert_eq!(serde_json::to_string(&OrderType::CallIn).unwrap(), "\"call-in\"");
    }

    #[test]
    fn item_status_parsing() {
        assert_eq!(ItemStatus::parse("in-progress"), Some(ItemStatus::InProgress));
        assert_eq!(ItemStatus::parse("done"), None);
        assert_eq!(serde_json::to_string(&ItemStatus::InProgress).unwrap(), "\"in-progress\"");
    }

    #[test]
    fn total_pages_rounds_up() {
        assert_eq!(total_pages(0, 5), 0);
        assert_eq!(total_pages(5, 5), 1);
        assert_eq!(total_pages(6, 5), 2);
        assert_eq!(total_pages(3, 0), 0);
        assert_eq!(total_pages(i64::MAX, i64::MAX), 1);
        assert_eq!(total_pages(2, i64::MAX), 1);
    }

    #[test]
    fn non_string_item_ids_deserialize_as_missing() {
        let req: OrderItemRequest =
            serde_json::from_value(serde_json::json!({ "itemId": 42, "quantity": 1 })).unwrap();
        assert_eq!(req.item_id, None);

        let req: OrderItemRequest = serde_json::from_value(serde_json::json!({ "_id": "abc" })).unwrap();
        assert_eq!(req.item_id.as_deref(), Some("abc"));
    }

    #[test]
    fn modify_payload_without_items_fails_validation() {
        let payload: ModifyOrderPayload =
            serde_json::from_value(serde_json::json!({ "reason": "typo" })).unwrap();
        assert!(payload.updated_items.is_empty());
        assert!(payload.validate().is_err());
    }
}
