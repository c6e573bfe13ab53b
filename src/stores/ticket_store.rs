use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, Set,
};

use crate::errors::ApiError;
use crate::types::db::ticket::{self, Entity as Ticket};
use crate::types::internal::TicketStatus;

/// TicketStore persists queue tickets.
///
/// Queue order is creation time ascending with the row id as tiebreak, which
/// matches the order the storage layer observed the inserts in.
pub struct TicketStore {
    db: DatabaseConnection,
}

impl TicketStore {
    /// Create a new TicketStore with the given database connection
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    pub async fn insert(
        &self,
        number: String,
        patient_id: i64,
        service: String,
    ) -> Result<ticket::Model, ApiError> {
        let now = Utc::now().timestamp();
        let record = ticket::ActiveModel {
            id: sea_orm::ActiveValue::NotSet,
            number: Set(number),
            patient_id: Set(patient_id),
            service: Set(service),
            status: Set(TicketStatus::Waiting.as_str().to_string()),
            created_at: Set(now),
            updated_at: Set(now),
        };

        record
            .insert(&self.db)
            .await
            .map_err(|e| ApiError::from_db("ticket", e))
    }

    pub async fn get_by_id(&self, id: i64) -> Result<ticket::Model, ApiError> {
        Ticket::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(|e| ApiError::internal(format!("find ticket by id: {}", e)))?
            .ok_or_else(|| ApiError::not_found("Ticket", id))
    }

    pub async fn exists_by_number(&self, number: &str) -> Result<bool, ApiError> {
        let count = Ticket::find()
            .filter(ticket::Column::Number.eq(number))
            .count(&self.db)
            .await
            .map_err(|e| ApiError::internal(format!("count tickets by number: {}", e)))?;
        Ok(count > 0)
    }

    /// Unconditional status overwrite; the queue model does not guard
    /// transitions
    pub async fn set_status(&self, id: i64, status: TicketStatus) -> Result<ticket::Model, ApiError> {
        let existing = self.get_by_id(id).await?;
        let mut record: ticket::ActiveModel = existing.into();
        record.status = Set(status.as_str().to_string());
        record.updated_at = Set(Utc::now().timestamp());
        record
            .update(&self.db)
            .await
            .map_err(|e| ApiError::internal(format!("set ticket status: {}", e)))
    }

    /// Waiting tickets for a service, oldest first
    pub async fn queue_for(&self, service: &str) -> Result<Vec<ticket::Model>, ApiError> {
        Ticket::find()
            .filter(ticket::Column::Service.eq(service))
            .filter(ticket::Column::Status.eq(TicketStatus::Waiting.as_str()))
            .order_by_asc(ticket::Column::CreatedAt)
            .order_by_asc(ticket::Column::Id)
            .all(&self.db)
            .await
            .map_err(|e| ApiError::internal(format!("load service queue: {}", e)))
    }

    pub async fn list_by_service(&self, service: &str) -> Result<Vec<ticket::Model>, ApiError> {
        Ticket::find()
            .filter(ticket::Column::Service.eq(service))
            .order_by_asc(ticket::Column::CreatedAt)
            .order_by_asc(ticket::Column::Id)
            .all(&self.db)
            .await
            .map_err(|e| ApiError::internal(format!("list tickets by service: {}", e)))
    }

    pub async fn list_by_patient(&self, patient_id: i64) -> Result<Vec<ticket::Model>, ApiError> {
        Ticket::find()
            .filter(ticket::Column::PatientId.eq(patient_id))
            .order_by_asc(ticket::Column::CreatedAt)
            .order_by_asc(ticket::Column::Id)
            .all(&self.db)
            .await
            .map_err(|e| ApiError::internal(format!("list tickets by patient: {}", e)))
    }

    pub async fn list_by_status(&self, status: TicketStatus) -> Result<Vec<ticket::Model>, ApiError> {
        Ticket::find()
            .filter(ticket::Column::Status.eq(status.as_str()))
            .order_by_asc(ticket::Column::CreatedAt)
            .order_by_asc(ticket::Column::Id)
            .all(&self.db)
            .await
            .map_err(|e| ApiError::internal(format!("list tickets by status: {}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stores::PatientStore;
    use migration::{Migrator, MigratorTrait};
    use sea_orm::Database;

    async fn setup() -> (TicketStore, i64) {
        let db = Database::connect("sqlite::memory:")
            .await
            .expect("Failed to create test database");
        Migrator::up(&db, None).await.expect("Failed to run migrations");

        let patients = PatientStore::new(db.clone());
        let patient = patients
            .insert("PAT-20250612-00001".to_string(), "Test Patient".to_string(), None)
            .await
            .unwrap();

        (TicketStore::new(db), patient.id)
    }

    #[tokio::test]
    async fn test_insert_starts_in_waiting() {
        let (store, patient_id) = setup().await;

        let ticket = store
            .insert("TKT-RAD-20250612-00001".to_string(), patient_id, "radiology".to_string())
            .await
            .unwrap();

        assert_eq!(ticket.status, "waiting");
        assert_eq!(ticket.created_at, ticket.updated_at);
    }

    #[tokio::test]
    async fn test_duplicate_number_is_bad_request() {
        let (store, patient_id) = setup().await;

        store
            .insert("TKT-LAB-20250612-00001".to_string(), patient_id, "lab".to_string())
            .await
            .unwrap();

        let result = store
            .insert("TKT-LAB-20250612-00001".to_string(), patient_id, "lab".to_string())
            .await;

        assert!(matches!(result, Err(ApiError::BadRequest(_))));
    }

    #[tokio::test]
    async fn test_queue_for_orders_fifo_and_filters_status() {
        let (store, patient_id) = setup().await;

        let first = store
            .insert("TKT-RAD-20250612-00001".to_string(), patient_id, "radiology".to_string())
            .await
            .unwrap();
        let second = store
            .insert("TKT-RAD-20250612-00002".to_string(), patient_id, "radiology".to_string())
            .await
            .unwrap();
        let third = store
            .insert("TKT-RAD-20250612-00003".to_string(), patient_id, "radiology".to_string())
            .await
            .unwrap();
        // A ticket for another service never shows up in this queue
        store
            .insert("TKT-LAB-20250612-00004".to_string(), patient_id, "lab".to_string())
            .await
            .unwrap();

        store.set_status(second.id, TicketStatus::InProgress).await.unwrap();

        let queue = store.queue_for("radiology").await.unwrap();
        let ids: Vec<i64> = queue.iter().map(|t| t.id).collect();
        assert_eq!(ids, vec![first.id, third.id]);
    }

    #[tokio::test]
    async fn test_set_status_allows_any_overwrite() {
        let (store, patient_id) = setup().await;

        let ticket = store
            .insert("TKT-RAD-20250612-00001".to_string(), patient_id, "radiology".to_string())
            .await
            .unwrap();

        let done = store.set_status(ticket.id, TicketStatus::Done).await.unwrap();
        assert_eq!(done.status, "done");

        // Done -> Waiting is deliberately not blocked (manual correction)
        let back = store.set_status(ticket.id, TicketStatus::Waiting).await.unwrap();
        assert_eq!(back.status, "waiting");
    }

    #[tokio::test]
    async fn test_get_by_id_not_found() {
        let (store, _) = setup().await;
        let result = store.get_by_id(999).await;
        assert!(matches!(result, Err(ApiError::NotFound(_))));
    }
}
