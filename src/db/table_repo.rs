// src/db/table_repo.rs

use chrono::{DateTime, Utc};
use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::{
        db_utils::{foreign_key_violation, is_unique_violation},
        error::AppError,
    },
    models::tables::{CreateTablePayload, Table, UpdateTablePayload},
};

const TABLE_COLUMNS: &str = "id, table_number, status, guest_capacity, reserved_for, \
    reservation_status, reservation_notes, reserved_by, position_x, position_y, \
    current_order_id, updated_by, started_at, waiter_id, waiter_name, created_at, updated_at";

/// Recurso referenciado pela mesa, a partir do nome da FOREIGN KEY violada.
fn referenced_resource(constraint: &str) -> &'static str {
    match constraint {
        "restaurant_tables_reserved_by_fkey" => "Reservation",
        "restaurant_tables_current_order_fkey" => "Order",
        "restaurant_tables_waiter_id_fkey" | "restaurant_tables_updated_by_fkey" => "User",
        _ => "Referenced record",
    }
}

fn missing_reference(err: sqlx::Error) -> AppError {
    match foreign_key_violation(&err) {
        Some(constraint) => AppError::ResourceNotFound(referenced_resource(constraint).into()),
        None => err.into(),
    }
}

#[derive(Clone)]
pub struct TableRepository {
    pool: PgPool,
}

impl TableRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Lista ordenada pelo número; `waiter_name` vem do garçom do pedido atual.
    pub async fn list_with_waiters(&self) -> Result<Vec<Table>, AppError> {
        let tables = sqlx::query_as::<_, Table>(
            r#"
            SELECT
                t.id, t.table_number, t.status, t.guest_capacity, t.reserved_for,
                t.reservation_status, t.reservation_notes, t.reserved_by,
                t.position_x, t.position_y, t.current_order_id, t.updated_by,
                t.started_at, t.waiter_id,
                COALESCE(NULLIF(u.full_name, ''), u.username, 'N/A') AS waiter_name,
                t.created_at, t.updated_at
            FROM restaurant_tables t
            LEFT JOIN orders o ON o.id = t.current_order_id
            LEFT JOIN users u ON u.id = o.waiter_id
            ORDER BY t.table_number
            "#,
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(tables)
    }

    pub async fn find_by_id<'e, E>(&self, executor: E, id: Uuid) -> Result<Option<Table>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!("SELECT {TABLE_COLUMNS} FROM restaurant_tables WHERE id = $1");
        let table = sqlx::query_as::<_, Table>(&sql)
            .bind(id)
            .fetch_optional(executor)
            .await?;
        Ok(table)
    }

    pub async fn find_for_update<'e, E>(&self, executor: E, id: Uuid) -> Result<Option<Table>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!("SELECT {TABLE_COLUMNS} FROM restaurant_tables WHERE id = $1 FOR UPDATE");
        let table = sqlx::query_as::<_, Table>(&sql)
            .bind(id)
            .fetch_optional(executor)
            .await?;
        Ok(table)
    }

    pub async fn create(&self, payload: &CreateTablePayload) -> Result<Table, AppError> {
        let sql = format!(
            "INSERT INTO restaurant_tables (table_number, position_x, position_y, guest_capacity)
             VALUES ($1, $2, $3, COALESCE($4, 4))
             RETURNING {TABLE_COLUMNS}"
        );
        sqlx::query_as::<_, Table>(&sql)
            .bind(&payload.table_number)
            .bind(payload.position.x)
            .bind(payload.position.y)
            .bind(payload.guest_capacity)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                if is_unique_violation(&e, "restaurant_tables_table_number_key") {
                    AppError::TableNumberAlreadyExists
                } else {
                    e.into()
                }
            })
    }

    /// Seed: cria a mesa se o número ainda não existir.
    pub async fn create_if_missing(&self, table_number: &str, x: f64, y: f64) -> Result<bool, AppError> {
        let result = sqlx::query(
            "INSERT INTO restaurant_tables (table_number, position_x, position_y)
             VALUES ($1, $2, $3)
             ON CONFLICT ON CONSTRAINT restaurant_tables_table_number_key DO NOTHING",
        )
        .bind(table_number)
        .bind(x)
        .bind(y)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    // Mesa voltando a "available" perde o pedido atual e o cronômetro
    pub async fn update(
        &self,
        id: Uuid,
        payload: &UpdateTablePayload,
        updated_by: Uuid,
    ) -> Result<Option<Table>, AppError> {
        let sql = format!(
            "UPDATE restaurant_tables SET
                status = COALESCE($2, status),
                position_x = COALESCE($3, position_x),
                position_y = COALESCE($4, position_y),
                guest_capacity = COALESCE($5, guest_capacity),
                reserved_for = COALESCE($6, reserved_for),
                reservation_status = COALESCE($7, reservation_status),
                reservation_notes = COALESCE($8, reservation_notes),
                reserved_by = COALESCE($9, reserved_by),
                current_order_id = CASE WHEN $2 = 'available'::table_status THEN NULL
                                        ELSE COALESCE($10, current_order_id) END,
                started_at = CASE WHEN $2 = 'available'::table_status THEN NULL
                                  ELSE COALESCE($13, started_at) END,
                waiter_id = COALESCE($11, waiter_id),
                waiter_name = COALESCE($12, waiter_name),
                updated_by = $14,
                updated_at = NOW()
             WHERE id = $1
             RETURNING {TABLE_COLUMNS}"
        );
        let table = sqlx::query_as::<_, Table>(&sql)
            .bind(id)
            .bind(payload.status)
            .bind(payload.position.map(|p| p.x))
            .bind(payload.position.map(|p| p.y))
            .bind(payload.guest_capacity)
            .bind(payload.reserved_for)
            .bind(payload.reservation_status)
            .bind(payload.reservation_notes.as_deref())
            .bind(payload.reserved_by)
            .bind(payload.current_order_id)
            .bind(payload.waiter_id)
            .bind(payload.waiter_name.as_deref())
            .bind(payload.started_at)
            .bind(updated_by)
            .fetch_optional(&self.pool)
            .await
            .map_err(missing_reference)?;
        Ok(table)
    }

    pub async fn delete(&self, id: Uuid) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM restaurant_tables WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn list_available(&self, guests: Option<i32>) -> Result<Vec<Table>, AppError> {
        let sql = format!(
            "SELECT {TABLE_COLUMNS} FROM restaurant_tables
             WHERE status IN ('available', 'cleaning')
               AND ($1::int IS NULL OR guest_capacity >= $1)
             ORDER BY table_number"
        );
        let tables = sqlx::query_as::<_, Table>(&sql)
            .bind(guests)
            .fetch_all(&self.pool)
            .await?;
        Ok(tables)
    }

    /// Ocupa a mesa com o pedido dine-in recém-criado.
    pub async fn occupy<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        order_id: Uuid,
        waiter_id: Uuid,
        waiter_name: &str,
        started_at: DateTime<Utc>,
    ) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query(
            "UPDATE restaurant_tables SET
                status = 'occupied',
                current_order_id = $2,
                started_at = $5,
                updated_by = $3,
                waiter_id = $3,
                waiter_name = $4,
                updated_at = NOW()
             WHERE id = $1",
        )
        .bind(id)
        .bind(order_id)
        .bind(waiter_id)
        .bind(waiter_name)
        .bind(started_at)
        .execute(executor)
        .await?;
        Ok(())
    }

    /// Libera a mesa: disponível, sem pedido e sem cronômetro.
    /// Libera a mesa só se ela ainda estiver com o pedido informado.
    pub async fn release(&self, id: Uuid, order_id: Uuid) -> Result<bool, AppError> {
        let result = sqlx::query(
            "UPDATE restaurant_tables SET
                status = 'available',
                current_order_id = NULL,
                started_at = NULL,
                updated_at = NOW()
             WHERE id = $1 AND current_order_id = $2",
        )
        .bind(id)
        .bind(order_id)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn foreign_keys_name_the_missing_resource() {
        assert_eq!(referenced_resource("restaurant_tables_reserved_by_fkey"), "Reservation");
        assert_eq!(referenced_resource("restaurant_tables_current_order_fkey"), "Order");
        assert_eq!(referenced_resource("restaurant_tables_waiter_id_fkey"), "User");
        assert_eq!(referenced_resource("restaurant_tables_updated_by_fkey"), "User");
    }

    #[test]
    fn other_errors_pass_through() {
        assert!(matches!(
            missing_reference(sqlx::Error::RowNotFound),
            AppError::DatabaseError(_)
        ));
    }
}
