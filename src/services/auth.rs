// src/services/auth.rs

use bcrypt::{hash, verify};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use sqlx::PgPool;

use crate::{
    common::error::AppError,
    db::UserRepository,
    models::auth::{Claims, RegisterUserPayload, Role, User},
};

pub const BCRYPT_COST: u32 = 10;

/// Login da equipe (POS).
pub fn login_token_ttl() -> Duration {
    Duration::hours(8)
}

/// Login do portal admin.
pub fn admin_token_ttl() -> Duration {
    Duration::days(7)
}

/// Hash bcrypt fora do executor assíncrono.
pub async fn hash_password(password: &str) -> Result<String, AppError> {
    let password = password.to_owned();
    let hashed = tokio::task::spawn_blocking(move || hash(&password, BCRYPT_COST))
        .await
        .map_err(|e| anyhow::anyhow!("Falha na task de hashing: {}", e))??;
    Ok(hashed)
}

async fn verify_password(password: &str, password_hash: &str) -> Result<bool, AppError> {
    let password = password.to_owned();
    let password_hash = password_hash.to_owned();
    let valid = tokio::task::spawn_blocking(move || verify(&password, &password_hash))
        .await
        .map_err(|e| anyhow::anyhow!("Falha na task de verificação de senha: {}", e))??;
    Ok(valid)
}

#[derive(Clone)]
pub struct AuthService {
    user_repo: UserRepository,
    jwt_secret: String,
    pool: PgPool,
}

impl AuthService {
    pub fn new(user_repo: UserRepository, jwt_secret: String, pool: PgPool) -> Self {
        Self { user_repo, jwt_secret, pool }
    }

    // Cadastro aberto: admin só é criado pelo painel ou pelo seed
    pub async fn register_user(&self, payload: &RegisterUserPayload) -> Result<User, AppError> {
        if !matches!(payload.role, Role::Waiter | Role::Manager) {
            return Err(AppError::RoleNotAllowed);
        }

        let hashed_password = hash_password(&payload.password).await?;
        let full_name = payload
            .full_name
            .as_deref()
            .filter(|n| !n.trim().is_empty())
            .unwrap_or(&payload.username);

        let user = self
            .user_repo
            .create_user(
                &self.pool,
                &payload.username,
                full_name,
                &hashed_password,
                payload.role,
            )
            .await?;

        tracing::info!(username = %user.username, role = user.role.as_str(), "Usuário registrado");
        Ok(user)
    }

    pub async fn login_user(&self, username: &str, password: &str) -> Result<(String, Role), AppError> {
        let user = self.authenticate(username, password).await?;
        let token = self.create_token(&user, login_token_ttl())?;
        Ok((token, user.role))
    }

    /// Portal administrativo: apenas admin e gerente.
    pub async fn admin_login(&self, username: &str, password: &str) -> Result<(String, Role), AppError> {
        let user = self.authenticate(username, password).await?;
        if user.role == Role::Waiter {
            return Err(AppError::StaffPortalOnly);
        }
        let token = self.create_token(&user, admin_token_ttl())?;
        Ok((token, user.role))
    }

    async fn authenticate(&self, username: &str, password: &str) -> Result<User, AppError> {
        let user = self
            .user_repo
            .find_by_username(username)
            .await?
            .filter(|u| u.active)
            .ok_or(AppError::InvalidCredentials)?;

        if !verify_password(password, &user.password_hash).await? {
            return Err(AppError::InvalidCredentials);
        }

        Ok(user)
    }

    pub fn create_token(&self, user: &User, ttl: Duration) -> Result<String, AppError> {
        let now = Utc::now();
        let claims = Claims {
            sub: user.id,
            username: user.username.clone(),
            full_name: user.full_name.clone(),
            role: user.role,
            iat: now.timestamp() as usize,
            exp: (now + ttl).timestamp() as usize,
        };

        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.jwt_secret.as_bytes()),
        )?;
        Ok(token)
    }

    /// Decodifica e valida (assinatura + expiração). Sem consulta ao banco.
    pub fn decode_token(&self, token: &str) -> Result<Claims, AppError> {
        decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.jwt_secret.as_bytes()),
            &Validation::default(),
        )
        .map(|data| data.claims)
        .map_err(|_| AppError::InvalidToken)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlx::postgres::PgPoolOptions;
    use uuid::Uuid;

    fn service() -> AuthService {
        let pool = PgPoolOptions::new()
            .connect_lazy("postgres://localhost/unused")
            .expect("lazy pool");
        AuthService::new(UserRepository::new(pool.clone()), "test-secret".into(), pool)
    }

    fn user(role: Role) -> User {
        let now = Utc::now();
        User {
            id: Uuid::new_v4(),
            username: "waiter1".into(),
            full_name: "Waiter One".into(),
            password_hash: String::new(),
            role,
            active: true,
            created_at: now,
            updated_at: now,
        }
    }

    #[tokio::test]
    async fn token_round_trip_keeps_identity() {
        let svc = service();
        let u = user(Role::Manager);
        let token = svc.create_token(&u, login_token_ttl()).unwrap();
        let claims = svc.decode_token(&token).unwrap();
        assert_eq!(claims.sub, u.id);
        assert_eq!(claims.username, "waiter1");
        assert_eq!(claims.full_name, "Waiter One");
        assert_eq!(claims.role, Role::Manager);
        assert_eq!(claims.exp - claims.iat, 8 * 3600);
    }

    #[tokio::test]
    async fn expired_token_is_rejected() {
        let svc = service();
        let token = svc.create_token(&user(Role::Waiter), Duration::hours(-2)).unwrap();
        assert!(matches!(svc.decode_token(&token), Err(AppError::InvalidToken)));
    }

    #[tokio::test]
    async fn token_signed_with_another_secret_is_rejected() {
        let svc = service();
        let other = AuthService::new(svc.user_repo.clone(), "other-secret".into(), svc.pool.clone());
        let token = other.create_token(&user(Role::Admin), admin_token_ttl()).unwrap();
        assert!(matches!(svc.decode_token(&token), Err(AppError::InvalidToken)));
    }

    #[tokio::test]
    async fn password_hash_verifies() {
        let hashed = hash_password("secret123").await.unwrap();
        assert!(verify_password("secret123", &hashed).await.unwrap());
        assert!(!verify_password("wrong", &hashed).await.unwrap());
    }
}
