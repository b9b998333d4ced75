pub mod analytics;
pub mod audit;
pub mod auth;
pub mod menu;
pub mod orders;
pub mod payments;
pub mod reservations;
pub mod tables;
