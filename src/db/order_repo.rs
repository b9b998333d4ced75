// src/db/order_repo.rs

use chrono::{DateTime, Utc};
use sqlx::{types::Json, Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::{
        db_utils::{day_bounds, is_unique_violation, like_pattern},
        error::AppError,
    },
    models::orders::{
        ModificationEntry, NewOrder, Order, OrderFilter, OrderItem, OrderStatus, OrderType,
        PaymentStatus, PaymentUpdate,
    },
};

const ORDER_COLUMNS: &str = "id, order_code, name, email, phone, items, initial_items, \
    modifications, notes, order_type, status, payment_status, payment_mode, payment_intent_id, \
    card_brand, last4, amount_paid, change_returned, discount, tax, split_payment, table_id, \
    waiter_id, waiter_name, started_at, started_cooking_at, completed_at, created_at, updated_at";

// Mesmo WHERE para listagem e contagem; parâmetros nulos desligam o filtro
const FILTER_CLAUSE: &str = "
    WHERE ($1::order_status IS NULL OR status = $1)
      AND ($2::text IS NULL OR name ILIKE $2)
      AND ($3::text IS NULL OR email ILIKE $3)
      AND ($4::timestamptz IS NULL OR created_at >= $4)
      AND ($5::timestamptz IS NULL OR created_at < $5)
      AND ($6::order_type IS NULL OR order_type = $6)
      AND ($7::text IS NULL OR email = $7)
      AND ($8::text IS NULL OR name = $8)";

struct BoundFilter {
    status: Option<OrderStatus>,
    name_like: Option<String>,
    email_like: Option<String>,
    from: Option<DateTime<Utc>>,
    to: Option<DateTime<Utc>>,
    order_type: Option<OrderType>,
    exact_email: Option<String>,
    exact_name: Option<String>,
}

impl From<&OrderFilter> for BoundFilter {
    fn from(filter: &OrderFilter) -> Self {
        let bounds = filter.day.map(day_bounds);
        Self {
            status: filter.status,
            name_like: filter.name_like.as_deref().map(like_pattern),
            email_like: filter.email_like.as_deref().map(like_pattern),
            from: bounds.map(|(start, _)| start),
            to: bounds.map(|(_, end)| end),
            order_type: filter.order_type,
            exact_email: filter.exact_email.clone(),
            exact_name: filter.exact_name.clone(),
        }
    }
}

#[derive(Clone)]
pub struct OrderRepository {
    pool: PgPool,
}

impl OrderRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn insert<'e, E>(&self, executor: E, order: &NewOrder) -> Result<Order, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!(
            "INSERT INTO orders (
                order_code, name, email, phone, items, initial_items, notes, order_type,
                payment_status, payment_mode, payment_intent_id, card_brand, last4,
                discount, tax, split_payment, table_id, waiter_id, waiter_name, started_at
             )
             VALUES ($1, $2, $3, $4, $5, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17, $18, $19)
             RETURNING {ORDER_COLUMNS}"
        );
        sqlx::query_as::<_, Order>(&sql)
            .bind(&order.order_code)
            .bind(&order.name)
            .bind(order.email.as_deref())
            .bind(order.phone.as_deref())
            .bind(Json(&order.items))
            .bind(order.notes.as_deref())
            .bind(order.order_type)
            .bind(order.payment_status)
            .bind(order.payment_mode)
            .bind(order.payment_intent_id.as_deref())
            .bind(order.card_brand.as_deref())
            .bind(order.last4.as_deref())
            .bind(order.discount)
            .bind(order.tax)
            .bind(order.split_payment.as_ref().map(Json))
            .bind(order.table_id)
            .bind(order.waiter_id)
            .bind(order.waiter_name.as_deref())
            .bind(order.started_at)
            .fetch_one(executor)
            .await
            .map_err(|e| {
                if is_unique_violation(&e, "orders_order_code_key") {
                    AppError::OrderCodeConflict
                } else {
                    e.into()
                }
            })
    }

    pub async fn find_by_id<'e, E>(&self, executor: E, id: Uuid) -> Result<Option<Order>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!("SELECT {ORDER_COLUMNS} FROM orders WHERE id = $1");
        let order = sqlx::query_as::<_, Order>(&sql)
            .bind(id)
            .fetch_optional(executor)
            .await?;
        Ok(order)
    }

    /// Trava a linha até o fim da transação (modificações concorrentes).
    pub async fn find_for_update<'e, E>(&self, executor: E, id: Uuid) -> Result<Option<Order>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!("SELECT {ORDER_COLUMNS} FROM orders WHERE id = $1 FOR UPDATE");
        let order = sqlx::query_as::<_, Order>(&sql)
            .bind(id)
            .fetch_optional(executor)
            .await?;
        Ok(order)
    }

    /// Mais recentes primeiro.
    pub async fn list(
        &self,
        filter: &OrderFilter,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Order>, AppError> {
        let f = BoundFilter::from(filter);
        let sql = format!(
            "SELECT {ORDER_COLUMNS} FROM orders {FILTER_CLAUSE}
             ORDER BY created_at DESC
             LIMIT $9 OFFSET $10"
        );
        let orders = sqlx::query_as::<_, Order>(&sql)
            .bind(f.status)
            .bind(f.name_like)
            .bind(f.email_like)
            .bind(f.from)
            .bind(f.to)
            .bind(f.order_type)
            .bind(f.exact_email)
            .bind(f.exact_name)
            .bind(limit)
            .bind(offset)
            .fetch_all(&self.pool)
            .await?;
        Ok(orders)
    }

    pub async fn count(&self, filter: &OrderFilter) -> Result<i64, AppError> {
        let f = BoundFilter::from(filter);
        let sql = format!("SELECT COUNT(*) FROM orders {FILTER_CLAUSE}");
        let total: i64 = sqlx::query_scalar(&sql)
            .bind(f.status)
            .bind(f.name_like)
            .bind(f.email_like)
            .bind(f.from)
            .bind(f.to)
            .bind(f.order_type)
            .bind(f.exact_email)
            .bind(f.exact_name)
            .fetch_one(&self.pool)
            .await?;
        Ok(total)
    }

    pub async fn list_pending_dine_in(&self) -> Result<Vec<Order>, AppError> {
        let sql = format!(
            "SELECT {ORDER_COLUMNS} FROM orders
             WHERE order_type = 'dine-in' AND status = 'Pending'
             ORDER BY started_at DESC NULLS LAST"
        );
        let orders = sqlx::query_as::<_, Order>(&sql)
            .fetch_all(&self.pool)
            .await?;
        Ok(orders)
    }

    /// Troca os itens e acrescenta entradas ao log embutido.
    pub async fn replace_items<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        items: &[OrderItem],
        new_entries: &[ModificationEntry],
    ) -> Result<Order, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!(
            "UPDATE orders SET
                items = $2,
                modifications = modifications || $3,
                updated_at = NOW()
             WHERE id = $1
             RETURNING {ORDER_COLUMNS}"
        );
        let order = sqlx::query_as::<_, Order>(&sql)
            .bind(id)
            .bind(Json(items))
            .bind(Json(new_entries))
            .fetch_one(executor)
            .await?;
        Ok(order)
    }

    pub async fn mark_completed(&self, id: Uuid) -> Result<Option<Order>, AppError> {
        let sql = format!(
            "UPDATE orders SET status = 'Completed', completed_at = NOW(), updated_at = NOW()
             WHERE id = $1
             RETURNING {ORDER_COLUMNS}"
        );
        let order = sqlx::query_as::<_, Order>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(order)
    }

    pub async fn set_started_cooking(&self, id: Uuid, at: DateTime<Utc>) -> Result<bool, AppError> {
        let result = sqlx::query(
            "UPDATE orders SET started_cooking_at = $2, updated_at = NOW() WHERE id = $1",
        )
        .bind(id)
        .bind(at)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Grava o pagamento. Campos `None` mantêm o valor atual.
    pub async fn record_payment(
        &self,
        id: Uuid,
        status: PaymentStatus,
        update: &PaymentUpdate,
    ) -> Result<Order, AppError> {
        let sql = format!(
            "UPDATE orders SET
                payment_status = $2,
                payment_mode = COALESCE($3, payment_mode),
                payment_intent_id = COALESCE($4, payment_intent_id),
                card_brand = COALESCE($5, card_brand),
                last4 = COALESCE($6, last4),
                amount_paid = COALESCE($7, amount_paid),
                change_returned = COALESCE($8, change_returned),
                status = CASE WHEN $9 THEN 'Completed'::order_status ELSE status END,
                completed_at = NOW(),
                updated_at = NOW()
             WHERE id = $1
             RETURNING {ORDER_COLUMNS}"
        );
        let order = sqlx::query_as::<_, Order>(&sql)
            .bind(id)
            .bind(status)
            .bind(update.payment_mode)
            .bind(update.payment_intent_id.as_deref())
            .bind(update.card_brand.as_deref())
            .bind(update.last4.as_deref())
            .bind(update.amount_paid)
            .bind(update.change_returned)
            .bind(update.mark_completed)
            .fetch_one(&self.pool)
            .await?;
        Ok(order)
    }
}
