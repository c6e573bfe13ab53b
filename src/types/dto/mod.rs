// Request/response objects for the API layer
pub mod auth;
pub mod common;
pub mod consultations;
pub mod patients;
pub mod payments;
pub mod tickets;
pub mod users;
