// src/services/reservation_service.rs

use uuid::Uuid;

use crate::{
    common::{db_utils::day_bounds, error::AppError},
    db::ReservationRepository,
    models::reservations::{
        CreateReservationPayload, Reservation, ReservationQuery, UpdateReservationPayload,
    },
};

#[derive(Clone)]
pub struct ReservationService {
    repo: ReservationRepository,
}

impl ReservationService {
    pub fn new(repo: ReservationRepository) -> Self {
        Self { repo }
    }

    pub async fn create_reservation(&self, payload: &CreateReservationPayload) -> Result<Reservation, AppError> {
        let reservation = self.repo.create(payload).await?;
        tracing::info!(
            id = %reservation.id,
            guests = reservation.guest_count,
            date = %reservation.date,
            "📅 Reserva criada"
        );
        Ok(reservation)
    }

    /// `date` restringe ao dia inteiro (UTC).
    pub async fn list_reservations(&self, query: &ReservationQuery) -> Result<Vec<Reservation>, AppError> {
        self.repo.list(query.status, query.date.map(day_bounds)).await
    }

    pub async fn update_reservation(
        &self,
        id: Uuid,
        payload: &UpdateReservationPayload,
    ) -> Result<Reservation, AppError> {
        self.repo
            .update(id, payload)
            .await?
            .ok_or_else(|| AppError::ResourceNotFound("Reservation".into()))
    }

    pub async fn delete_reservation(&self, id: Uuid) -> Result<(), AppError> {
        if !self.repo.delete(id).await? {
            return Err(AppError::ResourceNotFound("Reservation".into()));
        }
        tracing::info!(%id, "Reserva removida");
        Ok(())
    }
}
