// src/lib.rs

pub mod common;
pub mod config;
pub mod db;
pub mod docs;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod services;

use axum::{
    extract::DefaultBodyLimit,
    http::{header, HeaderValue, Method},
    middleware as axum_middleware,
    routing::{get, patch, post, put},
    Router,
};
use tower_http::{cors::CorsLayer, services::ServeDir, trace::TraceLayer};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::config::AppState;
use crate::docs::ApiDoc;
use crate::middleware::auth::auth_guard;

// Imagens do cardápio chegam via multipart
const MAX_BODY_BYTES: usize = 8 * 1024 * 1024;

fn cors_layer(origin: &str) -> CorsLayer {
    let layer = CorsLayer::new()
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE, header::ACCEPT_LANGUAGE])
        .allow_credentials(true);

    match origin.parse::<HeaderValue>() {
        Ok(value) => layer.allow_origin(value),
        Err(_) => {
            tracing::warn!(%origin, "CORS_ORIGIN inválida; nenhuma origem liberada");
            layer
        }
    }
}

/// Monta o roteador completo. Não toca no banco; o estado já chega pronto.
pub fn build_router(app_state: AppState) -> Router {
    // --- Rotas públicas ---
    let auth_routes = Router::new()
        .route("/register", post(handlers::auth::register))
        .route("/login", post(handlers::auth::login));

    let public_routes = Router::new()
        .route("/api/admin/login", post(handlers::auth::admin_login))
        .route("/api/menu", get(handlers::menu::list_menu))
        .route("/api/menu/{id}", get(handlers::menu::get_menu_item))
        .route("/api/orders", post(handlers::orders::create_order))
        .route("/api/orders/history", get(handlers::orders::order_history))
        .route(
            "/api/payments/stripe/create-checkout-session",
            post(handlers::payments::create_checkout_session),
        )
        .route(
            "/api/payments/stripe/payment-intent/{id}",
            get(handlers::payments::get_payment_intent_card),
        )
        .route(
            "/api/payments/stripe/create-payment-intent",
            post(handlers::payments::create_payment_intent),
        )
        .route("/api/payments/stripe/save-order", post(handlers::payments::save_order))
        .route(
            "/api/payments/razorpay/create-order",
            post(handlers::payments::razorpay_create_order),
        )
        .route(
            "/api/payments/razorpay/verify-payment",
            post(handlers::payments::razorpay_verify_payment),
        );

    // --- Rotas protegidas (JWT) ---
    let user_routes = Router::new()
        .route("/me", get(handlers::auth::get_me))
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            auth_guard,
        ));

    let protected_routes = Router::new()
        // Equipe
        .route(
            "/api/admin/users",
            get(handlers::users::list_users).post(handlers::users::create_user),
        )
        .route(
            "/api/admin/users/{id}",
            patch(handlers::users::update_user).delete(handlers::users::delete_user),
        )
        // Cardápio (escrita)
        .route("/api/menu", post(handlers::menu::create_menu_item))
        .route(
            "/api/menu/{id}",
            put(handlers::menu::update_menu_item).delete(handlers::menu::delete_menu_item),
        )
        // Pedidos
        .route("/api/orders", get(handlers::orders::list_pending_orders))
        .route("/api/orders/instore", post(handlers::orders::create_instore_order))
        .route("/api/orders/walkin", post(handlers::orders::create_walkin_order))
        .route("/api/orders/togo", post(handlers::orders::create_togo_order))
        .route("/api/orders/callin", post(handlers::orders::create_callin_order))
        .route("/api/orders/dinein", post(handlers::orders::create_dinein_order))
        .route("/api/orders/dinein/pending", get(handlers::orders::list_pending_dinein))
        .route("/api/orders/completed", get(handlers::orders::list_completed_orders))
        .route("/api/orders/modifications", get(handlers::orders::list_modifications))
        .route("/api/orders/analytics", get(handlers::analytics::get_analytics))
        .route("/api/orders/revenue-chart", get(handlers::analytics::get_revenue_chart))
        .route(
            "/api/orders/by-table/{table_id}",
            get(handlers::orders::get_order_by_table),
        )
        .route("/api/orders/{id}", get(handlers::orders::get_order))
        .route("/api/orders/{id}/modify", patch(handlers::orders::modify_order))
        .route("/api/orders/{id}/edit", patch(handlers::orders::edit_order))
        .route("/api/orders/{id}/complete", patch(handlers::orders::complete_order))
        .route("/api/orders/{id}/start-cooking", patch(handlers::orders::start_cooking))
        .route("/api/orders/{id}/pay", patch(handlers::orders::record_payment))
        .route(
            "/api/orders/{id}/modifications",
            get(handlers::orders::list_order_modifications),
        )
        .route("/api/orders/{id}/receipt", get(handlers::documents::generate_receipt))
        .route(
            "/api/orders/{id}/item/{item_id}/status",
            patch(handlers::orders::update_item_status),
        )
        // Mesas
        .route(
            "/api/tables",
            get(handlers::tables::list_tables).post(handlers::tables::create_table),
        )
        .route("/api/tables/available", get(handlers::tables::available_tables))
        .route(
            "/api/tables/{id}",
            get(handlers::tables::get_table)
                .patch(handlers::tables::update_table)
                .delete(handlers::tables::delete_table),
        )
        // Reservas
        .route(
            "/api/reservations",
            get(handlers::reservations::list_reservations)
                .post(handlers::reservations::create_reservation),
        )
        .route(
            "/api/reservations/{id}",
            patch(handlers::reservations::update_reservation)
                .delete(handlers::reservations::delete_reservation),
        )
        // Baixa de pagamento pela equipe
        .route(
            "/api/payments/stripe/mark-paid/{order_id}",
            patch(handlers::payments::mark_paid),
        )
        .route(
            "/api/payments/stripe/mark-cash-paid/{order_id}",
            patch(handlers::payments::mark_cash_paid),
        )
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            auth_guard,
        ));

    let upload_dir = app_state.config.upload_dir.clone();
    let cors = cors_layer(&app_state.config.cors_origin);

    Router::new()
        .route("/api/health", get(|| async { "OK" }))
        .nest("/api/auth", auth_routes)
        .nest("/api/users", user_routes)
        .merge(public_routes)
        .merge(protected_routes)
        .nest_service("/uploads", ServeDir::new(upload_dir))
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .with_state(app_state)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}
