use crate::types::db::patient;
use poem_openapi::Object;
use serde::{Deserialize, Serialize};

/// Request model for registering a patient
#[derive(Object, Debug, Serialize, Deserialize)]
pub struct CreatePatientRequest {
    pub full_name: String,
    pub phone: Option<String>,
}

/// Patient record as exposed by the API
#[derive(Object, Debug, Serialize, Deserialize)]
pub struct PatientResponse {
    pub id: i64,

    /// Formatted patient number (PAT-YYYYMMDD-NNNNN), printed on documents
    pub number: String,

    pub full_name: String,
    pub phone: Option<String>,
    pub created_at: i64,
    pub updated_at: i64,
}

impl From<patient::Model> for PatientResponse {
    fn from(model: patient::Model) -> Self {
        Self {
            id: model.id,
            number: model.number,
            full_name: model.full_name,
            phone: model.phone,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}
