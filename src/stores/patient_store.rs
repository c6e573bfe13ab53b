use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, Set,
};

use crate::errors::ApiError;
use crate::types::db::patient::{self, Entity as Patient};

/// PatientStore persists the patient registry behind a load/save contract
pub struct PatientStore {
    db: DatabaseConnection,
}

impl PatientStore {
    /// Create a new PatientStore with the given database connection
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    pub async fn insert(
        &self,
        number: String,
        full_name: String,
        phone: Option<String>,
    ) -> Result<patient::Model, ApiError> {
        let now = Utc::now().timestamp();
        let record = patient::ActiveModel {
            id: sea_orm::ActiveValue::NotSet,
            number: Set(number),
            full_name: Set(full_name),
            phone: Set(phone),
            created_at: Set(now),
            updated_at: Set(now),
        };

        record
            .insert(&self.db)
            .await
            .map_err(|e| ApiError::from_db("patient", e))
    }

    pub async fn get_by_id(&self, id: i64) -> Result<patient::Model, ApiError> {
        Patient::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(|e| ApiError::internal(format!("find patient by id: {}", e)))?
            .ok_or_else(|| ApiError::not_found("Patient", id))
    }

    pub async fn get_by_number(&self, number: &str) -> Result<patient::Model, ApiError> {
        Patient::find()
            .filter(patient::Column::Number.eq(number))
            .one(&self.db)
            .await
            .map_err(|e| ApiError::internal(format!("find patient by number: {}", e)))?
            .ok_or_else(|| ApiError::not_found("Patient", number))
    }

    pub async fn exists_by_number(&self, number: &str) -> Result<bool, ApiError> {
        let count = Patient::find()
            .filter(patient::Column::Number.eq(number))
            .count(&self.db)
            .await
            .map_err(|e| ApiError::internal(format!("count patients by number: {}", e)))?;
        Ok(count > 0)
    }

    pub async fn list_all(&self) -> Result<Vec<patient::Model>, ApiError> {
        Patient::find()
            .order_by_asc(patient::Column::Id)
            .all(&self.db)
            .await
            .map_err(|e| ApiError::internal(format!("list patients: {}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use migration::{Migrator, MigratorTrait};
    use sea_orm::Database;

    async fn setup_store() -> PatientStore {
        let db = Database::connect("sqlite::memory:")
            .await
            .expect("Failed to create test database");
        Migrator::up(&db, None).await.expect("Failed to run migrations");
        PatientStore::new(db)
    }

    #[tokio::test]
    async fn test_insert_and_get_by_number() {
        let store = setup_store().await;

        let created = store
            .insert(
                "PAT-20250612-00001".to_string(),
                "Awa Diop".to_string(),
                Some("+221770000000".to_string()),
            )
            .await
            .unwrap();

        let found = store.get_by_number("PAT-20250612-00001").await.unwrap();
        assert_eq!(found.id, created.id);
        assert_eq!(found.full_name, "Awa Diop");
    }

    #[tokio::test]
    async fn test_duplicate_number_is_bad_request() {
        let store = setup_store().await;

        store
            .insert("PAT-20250612-00001".to_string(), "First".to_string(), None)
            .await
            .unwrap();

        let result = store
            .insert("PAT-20250612-00001".to_string(), "Second".to_string(), None)
            .await;

        assert!(matches!(result, Err(ApiError::BadRequest(_))));
    }

    #[tokio::test]
    async fn test_get_by_id_not_found() {
        let store = setup_store().await;
        let result = store.get_by_id(404).await;
        assert!(matches!(result, Err(ApiError::NotFound(_))));
    }
}
