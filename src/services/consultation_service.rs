use std::sync::Arc;

use crate::errors::ApiError;
use crate::stores::{AuditStore, ConsultationStore, PatientStore};
use crate::types::db::consultation;

/// Consultation records written by the examining physician
pub struct ConsultationService {
    consultations: Arc<ConsultationStore>,
    patients: Arc<PatientStore>,
    audit: Arc<AuditStore>,
}

impl ConsultationService {
    pub fn new(
        consultations: Arc<ConsultationStore>,
        patients: Arc<PatientStore>,
        audit: Arc<AuditStore>,
    ) -> Self {
        Self { consultations, patients, audit }
    }

    pub async fn create(
        &self,
        patient_id: i64,
        physician_id: &str,
        diagnosis: String,
        notes: Option<String>,
        client_ip: Option<&str>,
    ) -> Result<consultation::Model, ApiError> {
        self.patients.get_by_id(patient_id).await?;

        let created = self
            .consultations
            .insert(patient_id, physician_id.to_string(), diagnosis, notes)
            .await?;

        let result = self
            .audit
            .record(
                Some(physician_id),
                "CREATE",
                "Consultation",
                created.id,
                format!("Recorded consultation for patient {}", patient_id),
                client_ip,
            )
            .await;
        if let Err(e) = result {
            tracing::error!("audit write failed for consultation {}: {}", created.id, e);
        }

        Ok(created)
    }

    pub async fn get(&self, id: i64) -> Result<consultation::Model, ApiError> {
        self.consultations.get_by_id(id).await
    }

    pub async fn list_by_patient(&self, patient_id: i64) -> Result<Vec<consultation::Model>, ApiError> {
        self.consultations.list_by_patient(patient_id).await
    }
}
