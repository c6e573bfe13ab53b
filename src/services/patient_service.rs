use std::sync::Arc;

use crate::errors::ApiError;
use crate::services::SequenceNumberGenerator;
use crate::stores::{AuditStore, PatientStore};
use crate::types::db::patient;

/// Patient registry. Registration mints a PAT- number through the shared
/// generator with the same collision-retry loop the other families use.
pub struct PatientService {
    patients: Arc<PatientStore>,
    sequence: Arc<SequenceNumberGenerator>,
    audit: Arc<AuditStore>,
}

impl PatientService {
    pub fn new(
        patients: Arc<PatientStore>,
        sequence: Arc<SequenceNumberGenerator>,
        audit: Arc<AuditStore>,
    ) -> Self {
        Self { patients, sequence, audit }
    }

    pub async fn register(
        &self,
        full_name: String,
        phone: Option<String>,
        actor_id: &str,
        client_ip: Option<&str>,
    ) -> Result<patient::Model, ApiError> {
        let number = loop {
            let candidate = self.sequence.patient_number();
            if !self.patients.exists_by_number(&candidate).await? {
                break candidate;
            }
        };

        let created = self.patients.insert(number, full_name, phone).await?;

        let result = self
            .audit
            .record(
                Some(actor_id),
                "CREATE",
                "Patient",
                created.id,
                format!("Registered patient {}", created.number),
                client_ip,
            )
            .await;
        if let Err(e) = result {
            tracing::error!("audit write failed for patient {}: {}", created.id, e);
        }

        Ok(created)
    }

    pub async fn get(&self, id: i64) -> Result<patient::Model, ApiError> {
        self.patients.get_by_id(id).await
    }

    pub async fn get_by_number(&self, number: &str) -> Result<patient::Model, ApiError> {
        self.patients.get_by_number(number).await
    }

    pub async fn list(&self) -> Result<Vec<patient::Model>, ApiError> {
        self.patients.list_all().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use migration::{Migrator, MigratorTrait};
    use sea_orm::Database;

    async fn setup() -> PatientService {
        let db = Database::connect("sqlite::memory:")
            .await
            .expect("Failed to create test database");
        Migrator::up(&db, None).await.expect("Failed to run migrations");

        PatientService::new(
            Arc::new(PatientStore::new(db.clone())),
            Arc::new(SequenceNumberGenerator::new()),
            Arc::new(AuditStore::new(db)),
        )
    }

    #[tokio::test]
    async fn test_register_mints_patient_number() {
        let patients = setup().await;

        let created = patients
            .register("Awa Diop".to_string(), None, "actor", None)
            .await
            .unwrap();

        assert!(created.number.starts_with("PAT-"));
        assert!(created.number.ends_with("-00001"));
    }

    #[tokio::test]
    async fn test_registrations_get_distinct_numbers() {
        let patients = setup().await;

        let first = patients
            .register("First".to_string(), None, "actor", None)
            .await
            .unwrap();
        let second = patients
            .register("Second".to_string(), None, "actor", None)
            .await
            .unwrap();

        assert_ne!(first.number, second.number);
        assert_eq!(patients.list().await.unwrap().len(), 2);
    }
}
