use crate::types::db::payment;
use poem_openapi::Object;
use serde::{Deserialize, Serialize};

/// Request model for recording a payment at the cash desk
#[derive(Object, Debug, Serialize, Deserialize)]
pub struct RecordPaymentRequest {
    pub ticket_id: i64,

    /// Amount in integer cents
    pub amount_cents: i64,

    /// Payment method in wire form (cash, card, mobile_money)
    pub method: String,
}

/// Payment as exposed by the API
#[derive(Object, Debug, Serialize, Deserialize)]
pub struct PaymentResponse {
    pub id: i64,

    /// Formatted receipt number (REC-YYYYMMDD-NNNNN), printed on the receipt
    pub receipt_number: String,

    pub ticket_id: i64,
    pub patient_id: i64,
    pub amount_cents: i64,
    pub method: String,
    pub created_at: i64,
}

impl From<payment::Model> for PaymentResponse {
    fn from(model: payment::Model) -> Self {
        Self {
            id: model.id,
            receipt_number: model.receipt_number,
            ticket_id: model.ticket_id,
            patient_id: model.patient_id,
            amount_cents: model.amount_cents,
            method: model.method,
            created_at: model.created_at,
        }
    }
}
