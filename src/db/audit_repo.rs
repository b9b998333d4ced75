// src/db/audit_repo.rs

use sqlx::{types::Json, Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::audit::{AuditLog, AuditLogRow, NewAuditLog},
};

const AUDIT_COLUMNS: &str = "id, action, performed_by, performed_by_name, order_id, table_id, \
    before, after, reason, modification_session_id, created_at, updated_at";

// SELECT "populado": código do pedido, mesa e autor
const POPULATED_SELECT: &str = r#"
    SELECT
        a.id, a.action, a.performed_by, a.performed_by_name, a.order_id, a.table_id,
        a.before, a.after, a.reason, a.modification_session_id, a.created_at, a.updated_at,
        o.order_code,
        u.full_name AS actor_full_name,
        u.username AS actor_username,
        t.table_number,
        t.position_x AS table_position_x,
        t.position_y AS table_position_y
    FROM audit_logs a
    LEFT JOIN orders o ON o.id = a.order_id
    LEFT JOIN users u ON u.id = a.performed_by
    LEFT JOIN restaurant_tables t ON t.id = a.table_id
"#;

#[derive(Clone)]
pub struct AuditRepository {
    pool: PgPool,
}

impl AuditRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // Sempre chamado dentro da transação que altera o pedido
    pub async fn insert<'e, E>(&self, executor: E, log: &NewAuditLog) -> Result<AuditLog, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!(
            "INSERT INTO audit_logs
                (action, performed_by, performed_by_name, order_id, table_id,
                 before, after, reason, modification_session_id)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
             RETURNING {AUDIT_COLUMNS}"
        );
        let created = sqlx::query_as::<_, AuditLog>(&sql)
            .bind(&log.action)
            .bind(log.performed_by)
            .bind(&log.performed_by_name)
            .bind(log.order_id)
            .bind(log.table_id)
            .bind(Json(&log.before))
            .bind(Json(&log.after))
            .bind(&log.reason)
            .bind(log.modification_session_id)
            .fetch_one(executor)
            .await?;
        Ok(created)
    }

    pub async fn list_all(&self) -> Result<Vec<AuditLogRow>, AppError> {
        let sql = format!("{POPULATED_SELECT} ORDER BY a.created_at DESC");
        let rows = sqlx::query_as::<_, AuditLogRow>(&sql)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    pub async fn list_for_order(&self, order_id: Uuid) -> Result<Vec<AuditLogRow>, AppError> {
        let sql = format!("{POPULATED_SELECT} WHERE a.order_id = $1 ORDER BY a.created_at DESC");
        let rows = sqlx::query_as::<_, AuditLogRow>(&sql)
            .bind(order_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }
}
