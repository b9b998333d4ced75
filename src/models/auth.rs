// src/models/auth.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

// Cargos da equipe (enum no Postgres: staff_role)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "staff_role", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Waiter,
    Manager,
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Waiter => "waiter",
            Role::Manager => "manager",
            Role::Admin => "admin",
        }
    }
}

// Representa um usuário vindo do banco de dados
#[derive(Debug, Clone, Serialize, sqlx::FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: Uuid,
    #[schema(example = "waiter1")]
    pub username: String,
    #[schema(example = "João Silva")]
    pub full_name: String,

    #[serde(skip_serializing)] // IMPORTANTE para segurança
    pub password_hash: String,

    pub role: Role,
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// Cadastro aberto: apenas garçons e gerentes
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RegisterUserPayload {
    #[validate(length(min = 3, message = "The username must have at least 3 characters."))]
    #[schema(example = "waiter4")]
    pub username: String,

    pub full_name: Option<String>,

    #[validate(length(min = 6, message = "The password must have at least 6 characters."))]
    pub password: String,

    pub role: Role,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct LoginUserPayload {
    #[validate(length(min = 1, message = "The username is required."))]
    pub username: String,
    #[validate(length(min = 1, message = "The password is required."))]
    pub password: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct AuthResponse {
    pub token: String,
    pub role: Role,
    pub message: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct MessageResponse {
    pub message: String,
}

// Gestão de usuários pelo admin
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateUserPayload {
    #[validate(length(min = 3, message = "The username must have at least 3 characters."))]
    pub username: String,
    #[validate(length(min = 1, message = "The full name is required."))]
    pub full_name: String,
    #[validate(length(min = 6, message = "The password must have at least 6 characters."))]
    pub password: String,
    pub role: Role,
}

#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUserPayload {
    #[validate(length(min = 1, message = "The full name cannot be empty."))]
    pub full_name: Option<String>,
    pub role: Option<Role>,
    pub active: Option<bool>,
    #[validate(length(min = 6, message = "The password must have at least 6 characters."))]
    pub password: Option<String>,
}

// Estrutura de dados ("claims") dentro do JWT
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Claims {
    pub sub: Uuid, // Subject (ID do usuário)
    pub username: String,
    pub full_name: String,
    pub role: Role,
    pub exp: usize,
    pub iat: usize,
}
