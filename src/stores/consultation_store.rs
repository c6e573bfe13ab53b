use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
};

use crate::errors::ApiError;
use crate::types::db::consultation::{self, Entity as Consultation};

/// ConsultationStore persists consultation records
pub struct ConsultationStore {
    db: DatabaseConnection,
}

impl ConsultationStore {
    /// Create a new ConsultationStore with the given database connection
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    pub async fn insert(
        &self,
        patient_id: i64,
        physician_id: String,
        diagnosis: String,
        notes: Option<String>,
    ) -> Result<consultation::Model, ApiError> {
        let now = Utc::now().timestamp();
        let record = consultation::ActiveModel {
            id: sea_orm::ActiveValue::NotSet,
            patient_id: Set(patient_id),
            physician_id: Set(physician_id),
            diagnosis: Set(diagnosis),
            notes: Set(notes),
            created_at: Set(now),
            updated_at: Set(now),
        };

        record
            .insert(&self.db)
            .await
            .map_err(|e| ApiError::internal(format!("insert consultation: {}", e)))
    }

    pub async fn get_by_id(&self, id: i64) -> Result<consultation::Model, ApiError> {
        Consultation::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(|e| ApiError::internal(format!("find consultation by id: {}", e)))?
            .ok_or_else(|| ApiError::not_found("Consultation", id))
    }

    pub async fn list_by_patient(&self, patient_id: i64) -> Result<Vec<consultation::Model>, ApiError> {
        Consultation::find()
            .filter(consultation::Column::PatientId.eq(patient_id))
            .order_by_asc(consultation::Column::CreatedAt)
            .all(&self.db)
            .await
            .map_err(|e| ApiError::internal(format!("list consultations by patient: {}", e)))
    }
}
