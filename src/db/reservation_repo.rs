// src/db/reservation_repo.rs

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::{db_utils::foreign_key_violation, error::AppError},
    models::reservations::{
        CreateReservationPayload, Reservation, ReservationStatus, UpdateReservationPayload,
    },
};

const RESERVATION_COLUMNS: &str = "id, name, phone, email, guest_count, date, table_id, notes, \
    source, status, reminder_sent, created_at, updated_at";

// Único FK de reservations: table_id
fn missing_table(err: sqlx::Error) -> AppError {
    match foreign_key_violation(&err) {
        Some(_) => AppError::ResourceNotFound("Table".into()),
        None => err.into(),
    }
}

#[derive(Clone)]
pub struct ReservationRepository {
    pool: PgPool,
}

impl ReservationRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create(&self, payload: &CreateReservationPayload) -> Result<Reservation, AppError> {
        let sql = format!(
            "INSERT INTO reservations
                (name, phone, email, guest_count, date, table_id, notes, source, status)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
             RETURNING {RESERVATION_COLUMNS}"
        );
        let reservation = sqlx::query_as::<_, Reservation>(&sql)
            .bind(&payload.name)
            .bind(&payload.phone)
            .bind(payload.email.as_deref())
            .bind(payload.guest_count)
            .bind(payload.date)
            .bind(payload.table_id)
            .bind(payload.notes.as_deref())
            .bind(payload.source)
            .bind(payload.status)
            .fetch_one(&self.pool)
            .await
            .map_err(missing_table)?;
        Ok(reservation)
    }

    /// Ordenadas pela data da reserva.
    pub async fn list(
        &self,
        status: Option<ReservationStatus>,
        range: Option<(DateTime<Utc>, DateTime<Utc>)>,
    ) -> Result<Vec<Reservation>, AppError> {
        let sql = format!(
            "SELECT {RESERVATION_COLUMNS} FROM reservations
             WHERE ($1::reservation_status IS NULL OR status = $1)
               AND ($2::timestamptz IS NULL OR date >= $2)
               AND ($3::timestamptz IS NULL OR date < $3)
             ORDER BY date"
        );
        let reservations = sqlx::query_as::<_, Reservation>(&sql)
            .bind(status)
            .bind(range.map(|(start, _)| start))
            .bind(range.map(|(_, end)| end))
            .fetch_all(&self.pool)
            .await?;
        Ok(reservations)
    }

    pub async fn update(
        &self,
        id: Uuid,
        payload: &UpdateReservationPayload,
    ) -> Result<Option<Reservation>, AppError> {
        let sql = format!(
            "UPDATE reservations SET
                name = COALESCE($2, name),
                phone = COALESCE($3, phone),
                email = COALESCE($4, email),
                guest_count = COALESCE($5, guest_count),
                date = COALESCE($6, date),
                table_id = COALESCE($7, table_id),
                notes = COALESCE($8, notes),
                source = COALESCE($9, source),
                status = COALESCE($10, status),
                reminder_sent = COALESCE($11, reminder_sent),
                updated_at = NOW()
             WHERE id = $1
             RETURNING {RESERVATION_COLUMNS}"
        );
        let reservation = sqlx::query_as::<_, Reservation>(&sql)
            .bind(id)
            .bind(payload.name.as_deref())
            .bind(payload.phone.as_deref())
            .bind(payload.email.as_deref())
            .bind(payload.guest_count)
            .bind(payload.date)
            .bind(payload.table_id)
            .bind(payload.notes.as_deref())
            .bind(payload.source)
            .bind(payload.status)
            .bind(payload.reminder_sent)
            .fetch_optional(&self.pool)
            .await
            .map_err(missing_table)?;
        Ok(reservation)
    }

    pub async fn delete(&self, id: Uuid) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM reservations WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn non_constraint_errors_are_kept_as_database_errors() {
        assert!(matches!(
            missing_table(sqlx::Error::RowNotFound),
            AppError::DatabaseError(_)
        ));
    }
}
