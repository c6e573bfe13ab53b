// Database entities (sea-orm models)
pub mod audit_entry;
pub mod consultation;
pub mod identity;
pub mod patient;
pub mod payment;
pub mod reset_token;
pub mod ticket;
