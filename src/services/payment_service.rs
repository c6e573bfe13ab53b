use std::sync::Arc;

use crate::errors::ApiError;
use crate::services::SequenceNumberGenerator;
use crate::stores::{AuditStore, PaymentStore, TicketStore};
use crate::types::db::payment;
use crate::types::internal::PaymentMethod;

/// Cash-desk payments. Each recorded payment mints a REC- receipt number
/// through the shared generator.
pub struct PaymentService {
    payments: Arc<PaymentStore>,
    tickets: Arc<TicketStore>,
    sequence: Arc<SequenceNumberGenerator>,
    audit: Arc<AuditStore>,
}

impl PaymentService {
    pub fn new(
        payments: Arc<PaymentStore>,
        tickets: Arc<TicketStore>,
        sequence: Arc<SequenceNumberGenerator>,
        audit: Arc<AuditStore>,
    ) -> Self {
        Self { payments, tickets, sequence, audit }
    }

    pub async fn record(
        &self,
        ticket_id: i64,
        amount_cents: i64,
        method: PaymentMethod,
        actor_id: &str,
        client_ip: Option<&str>,
    ) -> Result<payment::Model, ApiError> {
        if amount_cents <= 0 {
            return Err(ApiError::bad_request("Payment amount must be positive"));
        }

        let ticket = self.tickets.get_by_id(ticket_id).await?;

        let receipt_number = loop {
            let candidate = self.sequence.receipt_number();
            if !self.payments.exists_by_receipt(&candidate).await? {
                break candidate;
            }
        };

        let created = self
            .payments
            .insert(receipt_number, ticket.id, ticket.patient_id, amount_cents, method)
            .await?;

        let result = self
            .audit
            .record(
                Some(actor_id),
                "CREATE",
                "Payment",
                created.id,
                format!(
                    "Recorded {} payment, receipt {} against ticket {}",
                    method, created.receipt_number, ticket.number
                ),
                client_ip,
            )
            .await;
        if let Err(e) = result {
            tracing::error!("audit write failed for payment {}: {}", created.id, e);
        }

        Ok(created)
    }

    pub async fn get_by_receipt(&self, receipt_number: &str) -> Result<payment::Model, ApiError> {
        self.payments.get_by_receipt(receipt_number).await
    }

    pub async fn list_by_ticket(&self, ticket_id: i64) -> Result<Vec<payment::Model>, ApiError> {
        self.payments.list_by_ticket(ticket_id).await
    }
}
