use crate::types::db::consultation;
use poem_openapi::Object;
use serde::{Deserialize, Serialize};

/// Request model for recording a consultation
#[derive(Object, Debug, Serialize, Deserialize)]
pub struct CreateConsultationRequest {
    pub patient_id: i64,
    pub diagnosis: String,
    pub notes: Option<String>,
}

/// Consultation as exposed by the API
#[derive(Object, Debug, Serialize, Deserialize)]
pub struct ConsultationResponse {
    pub id: i64,
    pub patient_id: i64,

    /// Identity id of the examining physician
    pub physician_id: String,

    pub diagnosis: String,
    pub notes: Option<String>,
    pub created_at: i64,
    pub updated_at: i64,
}

impl From<consultation::Model> for ConsultationResponse {
    fn from(model: consultation::Model) -> Self {
        Self {
            id: model.id,
            patient_id: model.patient_id,
            physician_id: model.physician_id,
            diagnosis: model.diagnosis,
            notes: model.notes,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}
