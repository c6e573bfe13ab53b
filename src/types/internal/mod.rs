pub mod auth;
pub mod payment;
pub mod ticket;

pub use auth::{Claims, Role};
pub use payment::PaymentMethod;
pub use ticket::TicketStatus;
