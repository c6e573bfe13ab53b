// Services layer - business logic and orchestration
pub mod auth_service;
pub mod authorization;
pub mod consultation_service;
pub mod crypto;
pub mod mailer;
pub mod password_reset;
pub mod patient_service;
pub mod payment_service;
pub mod sequence;
pub mod ticket_service;
pub mod token_service;
pub mod user_service;

pub use auth_service::AuthService;
pub use authorization::{AccessControl, Action};
pub use consultation_service::ConsultationService;
pub use mailer::{LogMailer, Mailer};
pub use password_reset::PasswordResetFlow;
pub use patient_service::PatientService;
pub use payment_service::PaymentService;
pub use sequence::SequenceNumberGenerator;
pub use ticket_service::TicketService;
pub use token_service::TokenService;
pub use user_service::UserService;
