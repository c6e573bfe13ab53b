use sea_orm::DatabaseConnection;
use std::sync::Arc;

use crate::config::Settings;
use crate::services::{
    AccessControl, AuthService, ConsultationService, LogMailer, PasswordResetFlow, PatientService,
    PaymentService, SequenceNumberGenerator, TicketService, TokenService, UserService,
};
use crate::stores::{
    AuditStore, ConsultationStore, IdentityStore, PatientStore, PaymentStore, ResetTokenStore,
    TicketStore,
};

/// Centralized application data following the main-owned stores pattern.
///
/// Every store and service is created exactly once here, with explicit
/// constructor wiring, and shared behind Arc with the endpoint impls. The
/// sequence generator in particular is one process-wide instance scoped to
/// this struct, not ambient static state.
pub struct AppData {
    pub db: DatabaseConnection,

    // Stores
    pub identity_store: Arc<IdentityStore>,
    pub reset_token_store: Arc<ResetTokenStore>,
    pub patient_store: Arc<PatientStore>,
    pub ticket_store: Arc<TicketStore>,
    pub payment_store: Arc<PaymentStore>,
    pub consultation_store: Arc<ConsultationStore>,
    pub audit_store: Arc<AuditStore>,

    // Services
    pub sequence: Arc<SequenceNumberGenerator>,
    pub token_service: Arc<TokenService>,
    pub access: Arc<AccessControl>,
    pub auth_service: Arc<AuthService>,
    pub reset_flow: Arc<PasswordResetFlow>,
    pub user_service: Arc<UserService>,
    pub patient_service: Arc<PatientService>,
    pub ticket_service: Arc<TicketService>,
    pub payment_service: Arc<PaymentService>,
    pub consultation_service: Arc<ConsultationService>,
}

impl AppData {
    /// Wire up all stores and services.
    ///
    /// The database should be connected and migrated before calling this.
    pub fn init(db: DatabaseConnection, settings: &Settings) -> Self {
        tracing::info!("Initializing application data...");

        let identity_store = Arc::new(IdentityStore::new(db.clone()));
        let reset_token_store = Arc::new(ResetTokenStore::new(db.clone()));
        let patient_store = Arc::new(PatientStore::new(db.clone()));
        let ticket_store = Arc::new(TicketStore::new(db.clone()));
        let payment_store = Arc::new(PaymentStore::new(db.clone()));
        let consultation_store = Arc::new(ConsultationStore::new(db.clone()));
        let audit_store = Arc::new(AuditStore::new(db.clone()));

        let sequence = Arc::new(SequenceNumberGenerator::new());
        let token_service = Arc::new(TokenService::new(
            settings.jwt_secret.clone(),
            settings.token_lifetime_secs,
        ));
        let access = Arc::new(AccessControl::new(identity_store.clone(), token_service.clone()));

        let auth_service = Arc::new(AuthService::new(
            identity_store.clone(),
            token_service.clone(),
            audit_store.clone(),
        ));
        let reset_flow = Arc::new(PasswordResetFlow::new(
            identity_store.clone(),
            reset_token_store.clone(),
            Arc::new(LogMailer::new(settings.email_enabled)),
            settings.reset_link_base.clone(),
        ));
        let user_service = Arc::new(UserService::new(identity_store.clone(), audit_store.clone()));
        let patient_service = Arc::new(PatientService::new(
            patient_store.clone(),
            sequence.clone(),
            audit_store.clone(),
        ));
        let ticket_service = Arc::new(TicketService::new(
            ticket_store.clone(),
            patient_store.clone(),
            sequence.clone(),
            audit_store.clone(),
        ));
        let payment_service = Arc::new(PaymentService::new(
            payment_store.clone(),
            ticket_store.clone(),
            sequence.clone(),
            audit_store.clone(),
        ));
        let consultation_service = Arc::new(ConsultationService::new(
            consultation_store.clone(),
            patient_store.clone(),
            audit_store.clone(),
        ));

        Self {
            db,
            identity_store,
            reset_token_store,
            patient_store,
            ticket_store,
            payment_store,
            consultation_store,
            audit_store,
            sequence,
            token_service,
            access,
            auth_service,
            reset_flow,
            user_service,
            patient_service,
            ticket_service,
            payment_service,
            consultation_service,
        }
    }
}
