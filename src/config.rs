// src/config.rs

use anyhow::Context;
use sqlx::{postgres::PgPoolOptions, PgPool};
use std::{env, path::PathBuf, sync::Arc, time::Duration};

use crate::{
    common::i18n::I18nStore,
    db::{
        AnalyticsRepository, AuditRepository, MenuRepository, OrderRepository,
        ReservationRepository, TableRepository, UserRepository,
    },
    services::{
        analytics_service::AnalyticsService,
        auth::AuthService,
        document_service::DocumentService,
        email_service::{EmailService, HttpMailer, LogMailer, Mailer},
        menu_service::MenuService,
        order_service::OrderService,
        payment_service::{PaymentService, RazorpayClient, StripeClient},
        reservation_service::ReservationService,
        table_service::TableService,
        user_service::UserService,
    },
};

fn optional(key: &str) -> Option<String> {
    env::var(key).ok().map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

fn or_default(key: &str, default: &str) -> String {
    optional(key).unwrap_or_else(|| default.to_string())
}

/// Configuração lida do ambiente (`.env` incluso).
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub jwt_secret: String,
    pub port: u16,
    pub cors_origin: String,
    pub upload_dir: PathBuf,
    pub client_url: String,
    pub stripe_secret_key: Option<String>,
    pub stripe_currency: String,
    pub razorpay_key_id: Option<String>,
    pub razorpay_key_secret: Option<String>,
    pub mail_api_url: Option<String>,
    pub mail_api_key: Option<String>,
    pub mail_from: String,
    pub restaurant_name: String,
    pub dine_in_email: String,
    pub fonts_dir: PathBuf,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = env::var("DATABASE_URL").context("DATABASE_URL deve ser definida")?;
        let jwt_secret = env::var("JWT_SECRET").context("JWT_SECRET deve ser definido")?;
        let port = match optional("PORT") {
            Some(raw) => raw.parse().with_context(|| format!("PORT inválida: {}", raw))?,
            None => 5051,
        };

        Ok(Self {
            database_url,
            jwt_secret,
            port,
            cors_origin: or_default("CORS_ORIGIN", "http://localhost:3009"),
            upload_dir: PathBuf::from(or_default("UPLOAD_DIR", "uploads")),
            client_url: or_default("CLIENT_URL", "http://localhost:3009"),
            stripe_secret_key: optional("STRIPE_SECRET_KEY"),
            stripe_currency: or_default("STRIPE_CURRENCY", "usd"),
            razorpay_key_id: optional("RAZORPAY_KEY_ID"),
            razorpay_key_secret: optional("RAZORPAY_KEY_SECRET"),
            mail_api_url: optional("MAIL_API_URL"),
            mail_api_key: optional("MAIL_API_KEY"),
            mail_from: or_default("MAIL_FROM", "no-reply@restaurant.local"),
            restaurant_name: or_default("RESTAURANT_NAME", "Restaurant"),
            dine_in_email: or_default("DINE_IN_EMAIL", ""),
            fonts_dir: PathBuf::from(or_default("FONTS_DIR", "./fonts")),
        })
    }
}

pub async fn connect_pool(database_url: &str) -> anyhow::Result<PgPool> {
    let pool = PgPoolOptions::new()
        .max_connections(5)
        .acquire_timeout(Duration::from_secs(3))
        .connect(database_url)
        .await
        .context("Falha ao conectar ao banco de dados")?;
    tracing::info!("✅ Conexão com o banco de dados estabelecida com sucesso!");
    Ok(pool)
}

#[derive(Clone)]
pub struct AppState {
    pub db_pool: PgPool,
    pub config: Arc<Config>,
    pub i18n_store: Arc<I18nStore>,
    pub auth_service: AuthService,
    pub user_service: UserService,
    pub menu_service: MenuService,
    pub order_service: OrderService,
    pub table_service: TableService,
    pub reservation_service: ReservationService,
    pub analytics_service: AnalyticsService,
    pub payment_service: PaymentService,
    pub document_service: DocumentService,
}

impl AppState {
    /// Monta o grafo de dependências. Não abre conexões (o pool pode ser lazy).
    pub fn from_config(config: Config, db_pool: PgPool) -> Self {
        let user_repo = UserRepository::new(db_pool.clone());
        let menu_repo = MenuRepository::new(db_pool.clone());
        let order_repo = OrderRepository::new(db_pool.clone());
        let table_repo = TableRepository::new(db_pool.clone());
        let reservation_repo = ReservationRepository::new(db_pool.clone());
        let audit_repo = AuditRepository::new(db_pool.clone());
        let analytics_repo = AnalyticsRepository::new(db_pool.clone());

        let mailer: Arc<dyn Mailer> = match (&config.mail_api_url, &config.mail_api_key) {
            (Some(url), Some(key)) => Arc::new(HttpMailer::new(url.clone(), key.clone())),
            _ => {
                tracing::warn!("MAIL_API_URL/MAIL_API_KEY ausentes; e-mails serão apenas logados");
                Arc::new(LogMailer)
            }
        };
        let email_service = EmailService::new(mailer, config.mail_from.clone(), config.restaurant_name.clone());

        let auth_service = AuthService::new(user_repo.clone(), config.jwt_secret.clone(), db_pool.clone());
        let user_service = UserService::new(user_repo, db_pool.clone());
        let menu_service = MenuService::new(menu_repo.clone(), db_pool.clone(), config.upload_dir.clone());
        let order_service = OrderService::new(
            order_repo,
            menu_repo,
            table_repo.clone(),
            audit_repo,
            email_service,
            db_pool.clone(),
            config.dine_in_email.clone(),
        );
        let table_service = TableService::new(table_repo, db_pool.clone());
        let reservation_service = ReservationService::new(reservation_repo);
        let analytics_service = AnalyticsService::new(analytics_repo, db_pool.clone());

        let stripe = config
            .stripe_secret_key
            .clone()
            .map(|key| StripeClient::new(key, config.stripe_currency.clone()));
        let razorpay = match (&config.razorpay_key_id, &config.razorpay_key_secret) {
            (Some(id), Some(secret)) => Some(RazorpayClient::new(id.clone(), secret.clone())),
            _ => None,
        };
        if stripe.is_none() {
            tracing::warn!("STRIPE_SECRET_KEY ausente; rotas do Stripe responderão 503");
        }
        if razorpay.is_none() {
            tracing::warn!("Chaves da Razorpay ausentes; rotas da Razorpay responderão 503");
        }
        let payment_service = PaymentService::new(stripe, razorpay, order_service.clone(), config.client_url.clone());

        let document_service = DocumentService::new(
            order_service.clone(),
            config.restaurant_name.clone(),
            config.fonts_dir.clone(),
        );

        Self {
            db_pool,
            config: Arc::new(config),
            i18n_store: Arc::new(I18nStore::embedded()),
            auth_service,
            user_service,
            menu_service,
            order_service,
            table_service,
            reservation_service,
            analytics_service,
            payment_service,
            document_service,
        }
    }
}
