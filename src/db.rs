pub mod user_repo;
pub use user_repo::UserRepository;
pub mod menu_repo;
pub use menu_repo::MenuRepository;
pub mod order_repo;
pub use order_repo::OrderRepository;
pub mod table_repo;
pub use table_repo::TableRepository;
pub mod reservation_repo;
pub use reservation_repo::ReservationRepository;
pub mod audit_repo;
pub use audit_repo::AuditRepository;
pub mod analytics_repo;
pub use analytics_repo::AnalyticsRepository;
