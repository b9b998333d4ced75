// src/models/tables.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "table_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum TableStatus {
    Available,
    Occupied,
    Reserved,
    Cleaning,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "table_reservation_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum TableReservationStatus {
    None,
    Reserved,
    Seated,
    Cancelled,
}

// Posição da mesa na planta do salão
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Position {
    #[sqlx(rename = "position_x")]
    pub x: f64,
    #[sqlx(rename = "position_y")]
    pub y: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Table {
    pub id: Uuid,
    #[schema(example = "A1")]
    pub table_number: String,
    pub status: TableStatus,
    pub guest_capacity: i32,
    pub reserved_for: Option<DateTime<Utc>>,
    pub reservation_status: TableReservationStatus,
    pub reservation_notes: String,
    pub reserved_by: Option<Uuid>,
    #[sqlx(flatten)]
    pub position: Position,
    pub current_order_id: Option<Uuid>,
    pub updated_by: Option<Uuid>,
    pub started_at: Option<DateTime<Utc>>,
    pub waiter_id: Option<Uuid>,
    pub waiter_name: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateTablePayload {
    #[validate(length(min = 1, message = "The table number is required."))]
    pub table_number: String,
    #[serde(default)]
    pub position: Position,
    #[validate(range(min = 1, message = "The capacity must be at least 1."))]
    pub guest_capacity: Option<i32>,
}

#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTablePayload {
    pub status: Option<TableStatus>,
    pub position: Option<Position>,
    #[validate(range(min = 1, message = "The capacity must be at least 1."))]
    pub guest_capacity: Option<i32>,
    pub reserved_for: Option<DateTime<Utc>>,
    pub reservation_status: Option<TableReservationStatus>,
    pub reservation_notes: Option<String>,
    pub reserved_by: Option<Uuid>,
    pub current_order_id: Option<Uuid>,
    pub waiter_id: Option<Uuid>,
    pub waiter_name: Option<String>,
    pub started_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Default, Deserialize, IntoParams)]
pub struct AvailableTablesQuery {
    // Reservado para filtrar pela agenda no futuro
    pub time: Option<DateTime<Utc>>,
    pub guests: Option<i32>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct TableMessageResponse {
    pub message: String,
    pub table: Table,
}
