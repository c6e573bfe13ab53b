use crate::types::db::ticket;
use poem_openapi::Object;
use serde::{Deserialize, Serialize};

/// Request model for creating a ticket
#[derive(Object, Debug, Serialize, Deserialize)]
pub struct CreateTicketRequest {
    pub patient_id: i64,

    /// Service the patient is queueing for (e.g. "radiology")
    pub service: String,
}

/// Request model for overwriting a ticket status
#[derive(Object, Debug, Serialize, Deserialize)]
pub struct UpdateTicketStatusRequest {
    /// New status in wire form (waiting, in_progress, done)
    pub status: String,
}

/// Queue ticket as exposed by the API
#[derive(Object, Debug, Serialize, Deserialize)]
pub struct TicketResponse {
    pub id: i64,

    /// Formatted ticket number (TKT-SVC-YYYYMMDD-NNNNN), printed on the slip
    pub number: String,

    pub patient_id: i64,
    pub service: String,
    pub status: String,
    pub created_at: i64,
    pub updated_at: i64,
}

impl From<ticket::Model> for TicketResponse {
    fn from(model: ticket::Model) -> Self {
        Self {
            id: model.id,
            number: model.number,
            patient_id: model.patient_id,
            service: model.service,
            status: model.status,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}
