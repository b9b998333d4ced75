// src/bin/seed.rs
//
// Popula a equipe inicial e o mapa de mesas. Pode ser executado várias vezes.

use anyhow::Context;
use std::env;
use tracing_subscriber::EnvFilter;

use restaurant_pos::{
    common::error::AppError,
    config::connect_pool,
    db::{table_repo::TableRepository, user_repo::UserRepository},
    models::auth::Role,
    services::auth::hash_password,
};

const STAFF: &[(&str, &str, Role)] = &[
    ("waiter1", "Waiter One", Role::Waiter),
    ("waiter2", "Waiter Two", Role::Waiter),
    ("waiter3", "Waiter Three", Role::Waiter),
    ("parthiv", "Parthiv", Role::Manager),
    ("divya", "Divya", Role::Manager),
];

const SECTIONS: [char; 4] = ['A', 'B', 'C', 'D'];
const TABLES_PER_SECTION: u32 = 4;

fn env_or(key: &str, default: &str) -> String {
    env::var(key)
        .ok()
        .filter(|v| !v.trim().is_empty())
        .unwrap_or_else(|| default.to_string())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .compact()
        .init();

    let database_url = env::var("DATABASE_URL").context("DATABASE_URL deve ser definida")?;
    let admin_password = env::var("ADMIN_PASSWORD").context("ADMIN_PASSWORD deve ser definida")?;
    let admin_username = env_or("ADMIN_USERNAME", "admin");

    let pool = connect_pool(&database_url).await?;
    sqlx::migrate!()
        .run(&pool)
        .await
        .context("Falha ao rodar as migrações do banco de dados")?;

    let users = UserRepository::new(pool.clone());
    let tables = TableRepository::new(pool.clone());

    // --- Equipe ---
    let waiter_password = hash_password(&env_or("SEED_WAITER_PASSWORD", "waiter123")).await?;
    let manager_password = hash_password(&env_or("SEED_MANAGER_PASSWORD", "manager123")).await?;

    for (username, full_name, role) in STAFF {
        let password_hash = match role {
            Role::Waiter => &waiter_password,
            _ => &manager_password,
        };
        match users
            .create_user(&pool, username, full_name, password_hash, *role)
            .await
        {
            Ok(_) => tracing::info!(%username, role = role.as_str(), "Usuário criado"),
            Err(AppError::UsernameAlreadyExists) => {
                tracing::info!(%username, "Usuário já existe, mantido")
            }
            Err(e) => return Err(anyhow::anyhow!("Falha ao criar {}: {}", username, e)),
        }
    }

    // Admin sempre recebe a senha atual do ambiente
    let admin_hash = hash_password(&admin_password).await?;
    users
        .upsert_user(&admin_username, "Administrator", &admin_hash, Role::Admin)
        .await
        .map_err(|e| anyhow::anyhow!("Falha ao gravar o admin: {}", e))?;
    tracing::info!(username = %admin_username, "✅ Admin pronto");

    // --- Mesas A1..D4 em grade ---
    let mut created = 0;
    for (row, section) in SECTIONS.iter().enumerate() {
        for col in 1..=TABLES_PER_SECTION {
            let number = format!("{}{}", section, col);
            let x = f64::from(col) * 120.0;
            let y = (row as f64 + 1.0) * 120.0;
            if tables
                .create_if_missing(&number, x, y)
                .await
                .map_err(|e| anyhow::anyhow!("Falha ao criar a mesa {}: {}", number, e))?
            {
                created += 1;
            }
        }
    }
    tracing::info!(created, "✅ Mesas verificadas");

    Ok(())
}
