pub mod analytics;
pub mod auth;
pub mod documents;
pub mod menu;
pub mod orders;
pub mod payments;
pub mod reservations;
pub mod tables;
pub mod users;
