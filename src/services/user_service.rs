// src/services/user_service.rs

use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::UserRepository,
    models::auth::{CreateUserPayload, UpdateUserPayload, User},
    services::auth::hash_password,
};

/// Gestão de contas da equipe pelo admin.
#[derive(Clone)]
pub struct UserService {
    user_repo: UserRepository,
    pool: PgPool,
}

impl UserService {
    pub fn new(user_repo: UserRepository, pool: PgPool) -> Self {
        Self { user_repo, pool }
    }

    pub async fn list_users(&self) -> Result<Vec<User>, AppError> {
        self.user_repo.list_all().await
    }

    pub async fn create_user(&self, payload: &CreateUserPayload) -> Result<User, AppError> {
        let hashed = hash_password(&payload.password).await?;
        let user = self
            .user_repo
            .create_user(&self.pool, &payload.username, &payload.full_name, &hashed, payload.role)
            .await?;
        tracing::info!(username = %user.username, role = user.role.as_str(), "Usuário criado pelo admin");
        Ok(user)
    }

    pub async fn update_user(&self, id: Uuid, payload: &UpdateUserPayload) -> Result<User, AppError> {
        let hashed = match payload.password.as_deref() {
            Some(password) => Some(hash_password(password).await?),
            None => None,
        };

        self.user_repo
            .update_user(
                id,
                payload.full_name.as_deref(),
                payload.role,
                payload.active,
                hashed.as_deref(),
            )
            .await?
            .ok_or_else(|| AppError::ResourceNotFound("User".into()))
    }

    pub async fn delete_user(&self, id: Uuid) -> Result<(), AppError> {
        if !self.user_repo.delete_user(id).await? {
            return Err(AppError::ResourceNotFound("User".into()));
        }
        tracing::info!(%id, "Usuário removido");
        Ok(())
    }
}
