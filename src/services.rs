pub mod analytics_service;
pub mod auth;
pub mod document_service;
pub mod email_service;
pub mod menu_service;
pub mod order_service;
pub mod payment_service;
pub mod reservation_service;
pub mod table_service;
pub mod user_service;
