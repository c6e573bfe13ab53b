use std::sync::Arc;

use crate::errors::ApiError;
use crate::services::SequenceNumberGenerator;
use crate::stores::{AuditStore, PatientStore, TicketStore};
use crate::types::db::ticket;
use crate::types::internal::TicketStatus;

/// Ticket lifecycle and per-service FIFO queue.
///
/// Tickets are born Waiting; transitions are caller-directed and
/// unconditional. The queue order is creation time ascending, which the
/// store enforces on every read.
pub struct TicketService {
    tickets: Arc<TicketStore>,
    patients: Arc<PatientStore>,
    sequence: Arc<SequenceNumberGenerator>,
    audit: Arc<AuditStore>,
}

impl TicketService {
    pub fn new(
        tickets: Arc<TicketStore>,
        patients: Arc<PatientStore>,
        sequence: Arc<SequenceNumberGenerator>,
        audit: Arc<AuditStore>,
    ) -> Self {
        Self { tickets, patients, sequence, audit }
    }

    /// Create a Waiting ticket for a patient.
    ///
    /// The generated number is advisory; the exists-check-and-regenerate
    /// loop against the persisted tickets is what actually guarantees
    /// uniqueness.
    pub async fn create(
        &self,
        patient_id: i64,
        service: &str,
        actor_id: &str,
        client_ip: Option<&str>,
    ) -> Result<ticket::Model, ApiError> {
        // Fails NotFound when the patient is unknown
        self.patients.get_by_id(patient_id).await?;

        let number = loop {
            let candidate = self.sequence.ticket_number(service);
            if !self.tickets.exists_by_number(&candidate).await? {
                break candidate;
            }
        };

        let created = self
            .tickets
            .insert(number, patient_id, service.to_string())
            .await?;

        self.audit(
            actor_id,
            "CREATE",
            created.id,
            format!("Created ticket {} for service {}", created.number, service),
            client_ip,
        )
        .await;

        Ok(created)
    }

    /// Overwrite a ticket's status. Any state may be written over any other;
    /// the front desk uses this for manual correction too.
    pub async fn set_status(
        &self,
        ticket_id: i64,
        status: TicketStatus,
        actor_id: &str,
        client_ip: Option<&str>,
    ) -> Result<ticket::Model, ApiError> {
        let updated = self.tickets.set_status(ticket_id, status).await?;

        self.audit(
            actor_id,
            "UPDATE",
            updated.id,
            format!("Ticket {} status set to {}", updated.number, status),
            client_ip,
        )
        .await;

        Ok(updated)
    }

    pub async fn get(&self, ticket_id: i64) -> Result<ticket::Model, ApiError> {
        self.tickets.get_by_id(ticket_id).await
    }

    /// The waiting line for a service, oldest ticket first
    pub async fn queue_for(&self, service: &str) -> Result<Vec<ticket::Model>, ApiError> {
        self.tickets.queue_for(service).await
    }

    /// Head of the waiting line, or NotFound when the queue is empty
    pub async fn next(&self, service: &str) -> Result<ticket::Model, ApiError> {
        self.tickets
            .queue_for(service)
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| ApiError::not_found("Waiting ticket for service", service))
    }

    pub async fn list_by_patient(&self, patient_id: i64) -> Result<Vec<ticket::Model>, ApiError> {
        self.tickets.list_by_patient(patient_id).await
    }

    pub async fn list_by_service(&self, service: &str) -> Result<Vec<ticket::Model>, ApiError> {
        self.tickets.list_by_service(service).await
    }

    pub async fn list_by_status(&self, status: TicketStatus) -> Result<Vec<ticket::Model>, ApiError> {
        self.tickets.list_by_status(status).await
    }

    async fn audit(
        &self,
        actor_id: &str,
        action: &str,
        ticket_id: i64,
        details: String,
        client_ip: Option<&str>,
    ) {
        let result = self
            .audit
            .record(Some(actor_id), action, "Ticket", ticket_id, details, client_ip)
            .await;
        if let Err(e) = result {
            tracing::error!("audit write failed for ticket {}: {}", ticket_id, e);
        }
    }
}
