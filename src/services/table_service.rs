// src/services/table_service.rs

use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::TableRepository,
    models::tables::{AvailableTablesQuery, CreateTablePayload, Table, UpdateTablePayload},
};

#[derive(Clone)]
pub struct TableService {
    repo: TableRepository,
    pool: PgPool,
}

impl TableService {
    pub fn new(repo: TableRepository, pool: PgPool) -> Self {
        Self { repo, pool }
    }

    pub async fn list_tables(&self) -> Result<Vec<Table>, AppError> {
        self.repo.list_with_waiters().await
    }

    pub async fn get_table(&self, id: Uuid) -> Result<Table, AppError> {
        self.repo
            .find_by_id(&self.pool, id)
            .await?
            .ok_or_else(|| AppError::ResourceNotFound("Table".into()))
    }

    pub async fn create_table(&self, payload: &CreateTablePayload) -> Result<Table, AppError> {
        let table = self.repo.create(payload).await?;
        tracing::info!(table = %table.table_number, "Mesa criada");
        Ok(table)
    }

    /// Atualização parcial; loga o estado anterior e o novo.
    pub async fn update_table(
        &self,
        id: Uuid,
        payload: &UpdateTablePayload,
        updated_by: Uuid,
    ) -> Result<Table, AppError> {
        let before = self.get_table(id).await?;

        let after = self
            .repo
            .update(id, payload, updated_by)
            .await?
            .ok_or_else(|| AppError::ResourceNotFound("Table".into()))?;

        tracing::info!(
            table = %after.table_number,
            %updated_by,
            old_status = ?before.status,
            new_status = ?after.status,
            old_order = ?before.current_order_id,
            new_order = ?after.current_order_id,
            "Mesa atualizada"
        );
        Ok(after)
    }

    pub async fn delete_table(&self, id: Uuid) -> Result<(), AppError> {
        if !self.repo.delete(id).await? {
            return Err(AppError::ResourceNotFound("Table".into()));
        }
        tracing::info!(%id, "Mesa removida");
        Ok(())
    }

    pub async fn available_tables(&self, query: &AvailableTablesQuery) -> Result<Vec<Table>, AppError> {
        self.repo.list_available(query.guests.filter(|g| *g > 0)).await
    }
}
