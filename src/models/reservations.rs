// src/models/reservations.rs

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "reservation_source", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ReservationSource {
    #[default]
    #[serde(alias = "call-in")]
    Callin,
    Online,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "reservation_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ReservationStatus {
    #[default]
    Reserved,
    Seated,
    Completed,
    Cancelled,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Reservation {
    pub id: Uuid,
    pub name: String,
    pub phone: String,
    pub email: Option<String>,
    pub guest_count: i32,
    pub date: DateTime<Utc>,
    pub table_id: Option<Uuid>,
    pub notes: Option<String>,
    pub source: ReservationSource,
    pub status: ReservationStatus,
    pub reminder_sent: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateReservationPayload {
    #[validate(length(min = 1, message = "The name is required."))]
    pub name: String,
    #[validate(length(min = 1, message = "The phone is required."))]
    pub phone: String,
    #[validate(email(message = "The e-mail is invalid."))]
    pub email: Option<String>,
    #[validate(range(min = 1, message = "At least one guest is required."))]
    pub guest_count: i32,
    pub date: DateTime<Utc>,
    pub table_id: Option<Uuid>,
    pub notes: Option<String>,
    #[serde(default)]
    pub source: ReservationSource,
    #[serde(default)]
    pub status: ReservationStatus,
}

#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateReservationPayload {
    #[validate(length(min = 1, message = "The name cannot be empty."))]
    pub name: Option<String>,
    pub phone: Option<String>,
    #[validate(email(message = "The e-mail is invalid."))]
    pub email: Option<String>,
    #[validate(range(min = 1, message = "At least one guest is required."))]
    pub guest_count: Option<i32>,
    pub date: Option<DateTime<Utc>>,
    pub table_id: Option<Uuid>,
    pub notes: Option<String>,
    pub source: Option<ReservationSource>,
    pub status: Option<ReservationStatus>,
    pub reminder_sent: Option<bool>,
}

#[derive(Debug, Default, Deserialize, IntoParams)]
pub struct ReservationQuery {
    pub status: Option<ReservationStatus>,
    pub date: Option<NaiveDate>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ReservationMessageResponse {
    pub message: String,
    pub reservation: Reservation,
}
