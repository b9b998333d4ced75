// src/models/audit.rs

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::{types::Json, FromRow};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::models::{orders::OrderItem, tables::Position};

pub const MODIFY_ORDER_ACTION: &str = "Modify Order";
pub const DEFAULT_MODIFY_REASON: &str = "Edited via admin UI";

/// Registro append-only de quem alterou os itens de um pedido.
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AuditLog {
    pub id: Uuid,
    #[schema(example = "Modify Order")]
    pub action: String,
    pub performed_by: Uuid,
    pub performed_by_name: String,
    pub order_id: Uuid,
    pub table_id: Option<Uuid>,
    #[schema(value_type = Option<Vec<OrderItem>>)]
    pub before: Option<Json<Vec<OrderItem>>>,
    #[schema(value_type = Option<Vec<OrderItem>>)]
    pub after: Option<Json<Vec<OrderItem>>>,
    pub reason: Option<String>,
    pub modification_session_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewAuditLog {
    pub action: String,
    pub performed_by: Uuid,
    pub performed_by_name: String,
    pub order_id: Uuid,
    pub table_id: Option<Uuid>,
    pub before: Vec<OrderItem>,
    pub after: Vec<OrderItem>,
    pub reason: String,
    pub modification_session_id: Uuid,
}

// Linha "populada" (JOIN com users, orders e mesas)
#[derive(Debug, Clone, FromRow)]
pub struct AuditLogRow {
    #[sqlx(flatten)]
    pub log: AuditLog,
    pub order_code: Option<String>,
    pub actor_full_name: Option<String>,
    pub actor_username: Option<String>,
    pub table_number: Option<String>,
    pub table_position_x: Option<f64>,
    pub table_position_y: Option<f64>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AuditActor {
    pub id: Uuid,
    pub full_name: Option<String>,
    pub username: Option<String>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AuditTable {
    pub id: Uuid,
    pub table_number: String,
    pub position: Position,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AuditLogEntry {
    #[serde(flatten)]
    pub log: AuditLog,
    pub order_code: Option<String>,
    pub table: Option<AuditTable>,
    pub actor: AuditActor,
}

impl From<AuditLogRow> for AuditLogEntry {
    fn from(row: AuditLogRow) -> Self {
        let table = match (row.log.table_id, row.table_number) {
            (Some(id), Some(table_number)) => Some(AuditTable {
                id,
                table_number,
                position: Position {
                    x: row.table_position_x.unwrap_or_default(),
                    y: row.table_position_y.unwrap_or_default(),
                },
            }),
            _ => None,
        };

        let actor = AuditActor {
            id: row.log.performed_by,
            full_name: row.actor_full_name,
            username: row.actor_username,
        };

        Self {
            log: row.log,
            order_code: row.order_code,
            table,
            actor,
        }
    }
}
