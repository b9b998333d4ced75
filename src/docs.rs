// src/docs.rs

use utoipa::OpenApi;
use utoipa::openapi::security::{Http, HttpAuthScheme, SecurityScheme};
use crate::handlers;
use crate::middleware;
use crate::models;

#[derive(OpenApi)]
#[openapi(
    paths(
        // --- Auth ---
        handlers::auth::register,
        handlers::auth::login,
        handlers::auth::admin_login,
        handlers::auth::get_me,

        // --- Users ---
        handlers::users::list_users,
        handlers::users::create_user,
        handlers::users::update_user,
        handlers::users::delete_user,

        // --- Menu ---
        handlers::menu::list_menu,
        handlers::menu::get_menu_item,
        handlers::menu::create_menu_item,
        handlers::menu::update_menu_item,
        handlers::menu::delete_menu_item,

        // --- Orders ---
        handlers::orders::create_order,
        handlers::orders::create_instore_order,
        handlers::orders::create_walkin_order,
        handlers::orders::create_togo_order,
        handlers::orders::create_callin_order,
        handlers::orders::create_dinein_order,
        handlers::orders::list_pending_orders,
        handlers::orders::list_completed_orders,
        handlers::orders::order_history,
        handlers::orders::get_order,
        handlers::orders::get_order_by_table,
        handlers::orders::list_pending_dinein,
        handlers::orders::modify_order,
        handlers::orders::edit_order,
        handlers::orders::complete_order,
        handlers::orders::start_cooking,
        handlers::orders::update_item_status,
        handlers::orders::record_payment,
        handlers::orders::list_modifications,
        handlers::orders::list_order_modifications,
        handlers::documents::generate_receipt,

        // --- Analytics ---
        handlers::analytics::get_analytics,
        handlers::analytics::get_revenue_chart,

        // --- Tables ---
        handlers::tables::list_tables,
        handlers::tables::available_tables,
        handlers::tables::get_table,
        handlers::tables::create_table,
        handlers::tables::update_table,
        handlers::tables::delete_table,

        // --- Reservations ---
        handlers::reservations::create_reservation,
        handlers::reservations::list_reservations,
        handlers::reservations::update_reservation,
        handlers::reservations::delete_reservation,

        // --- Payments ---
        handlers::payments::create_checkout_session,
        handlers::payments::get_payment_intent_card,
        handlers::payments::create_payment_intent,
        handlers::payments::save_order,
        handlers::payments::mark_paid,
        handlers::payments::mark_cash_paid,
        handlers::payments::razorpay_create_order,
        handlers::payments::razorpay_verify_payment,
    ),
    components(
        schemas(
            // --- Auth ---
            models::auth::Role,
            models::auth::User,
            models::auth::RegisterUserPayload,
            models::auth::LoginUserPayload,
            models::auth::AuthResponse,
            models::auth::MessageResponse,
            models::auth::CreateUserPayload,
            models::auth::UpdateUserPayload,
            middleware::auth::AuthenticatedUser,

            // --- Menu ---
            models::menu::MenuItem,
            models::menu::MenuItemResponse,
            models::menu::MenuItemForm,

            // --- Orders ---
            models::orders::OrderType,
            models::orders::OrderStatus,
            models::orders::PaymentStatus,
            models::orders::PaymentMode,
            models::orders::ItemStatus,
            models::orders::OrderItem,
            models::orders::ModificationAction,
            models::orders::ModificationEntry,
            models::orders::Order,
            models::orders::OrderItemRequest,
            models::orders::CreateOrderPayload,
            models::orders::DineInOrderPayload,
            models::orders::ModifyOrderPayload,
            models::orders::EditOrderPayload,
            models::orders::ItemStatusPayload,
            models::orders::RecordPaymentPayload,
            models::orders::OrdersResponse,
            models::orders::OrderResponse,
            models::orders::OrderMessageResponse,
            models::orders::CompletedOrdersResponse,
            models::orders::StartCookingResponse,
            models::orders::ItemStatusResponse,

            // --- Audit ---
            models::audit::AuditLog,
            models::audit::AuditActor,
            models::audit::AuditTable,
            models::audit::AuditLogEntry,

            // --- Analytics ---
            models::analytics::TopItem,
            models::analytics::AnalyticsSummary,
            models::analytics::RevenueRange,
            models::analytics::RevenueChart,

            // --- Tables ---
            models::tables::TableStatus,
            models::tables::TableReservationStatus,
            models::tables::Position,
            models::tables::Table,
            models::tables::CreateTablePayload,
            models::tables::UpdateTablePayload,
            models::tables::TableMessageResponse,

            // --- Reservations ---
            models::reservations::ReservationSource,
            models::reservations::ReservationStatus,
            models::reservations::Reservation,
            models::reservations::CreateReservationPayload,
            models::reservations::UpdateReservationPayload,
            models::reservations::ReservationMessageResponse,

            // --- Payments ---
            models::payments::CheckoutItem,
            models::payments::CheckoutCustomer,
            models::payments::CreateCheckoutSessionPayload,
            models::payments::CheckoutSessionResponse,
            models::payments::CardDetailsResponse,
            models::payments::CreatePaymentIntentPayload,
            models::payments::ClientSecretResponse,
            models::payments::SaveOrderForm,
            models::payments::SaveOrderPayload,
            models::payments::MarkPaidPayload,
            models::payments::MarkCashPaidPayload,
            models::payments::RazorpayCreateOrderPayload,
            models::payments::RazorpayOrderResponse,
            models::payments::VerifyPaymentPayload,
            models::payments::VerifyPaymentResponse,
            models::payments::PaymentMessageResponse,
        )
    ),
    tags(
        (name = "Auth", description = "Autenticação e Registro"),
        (name = "Users", description = "Gestão da Equipe (admin)"),
        (name = "Menu", description = "Cardápio"),
        (name = "Orders", description = "Pedidos, Cozinha e Auditoria"),
        (name = "Analytics", description = "Indicadores e Gráfico de Receita"),
        (name = "Tables", description = "Mapa de Mesas"),
        (name = "Reservations", description = "Reservas"),
        (name = "Payments", description = "Stripe e Razorpay")
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "api_jwt",
            SecurityScheme::Http(
                Http::new(HttpAuthScheme::Bearer)
            ),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_route_group_is_documented() {
        let doc = ApiDoc::openapi();
        let paths = &doc.paths.paths;
        for path in [
            "/api/auth/login",
            "/api/admin/users/{id}",
            "/api/menu/{id}",
            "/api/orders/{id}/item/{item_id}/status",
            "/api/tables/available",
            "/api/reservations/{id}",
            "/api/payments/razorpay/verify-payment",
            "/api/orders/{id}/receipt",
        ] {
            assert!(paths.contains_key(path), "faltando {path}");
        }
        let schemes = doc.components.expect("components").security_schemes;
        assert!(schemes.contains_key("api_jwt"));
    }
}
