use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, Set,
};

use crate::errors::ApiError;
use crate::types::db::payment::{self, Entity as Payment};
use crate::types::internal::PaymentMethod;

/// PaymentStore persists cash-desk payments
pub struct PaymentStore {
    db: DatabaseConnection,
}

impl PaymentStore {
    /// Create a new PaymentStore with the given database connection
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    pub async fn insert(
        &self,
        receipt_number: String,
        ticket_id: i64,
        patient_id: i64,
        amount_cents: i64,
        method: PaymentMethod,
    ) -> Result<payment::Model, ApiError> {
        let record = payment::ActiveModel {
            id: sea_orm::ActiveValue::NotSet,
            receipt_number: Set(receipt_number),
            ticket_id: Set(ticket_id),
            patient_id: Set(patient_id),
            amount_cents: Set(amount_cents),
            method: Set(method.as_str().to_string()),
            created_at: Set(Utc::now().timestamp()),
        };

        record
            .insert(&self.db)
            .await
            .map_err(|e| ApiError::from_db("payment", e))
    }

    pub async fn exists_by_receipt(&self, receipt_number: &str) -> Result<bool, ApiError> {
        let count = Payment::find()
            .filter(payment::Column::ReceiptNumber.eq(receipt_number))
            .count(&self.db)
            .await
            .map_err(|e| ApiError::internal(format!("count payments by receipt: {}", e)))?;
        Ok(count > 0)
    }

    pub async fn get_by_receipt(&self, receipt_number: &str) -> Result<payment::Model, ApiError> {
        Payment::find()
            .filter(payment::Column::ReceiptNumber.eq(receipt_number))
            .one(&self.db)
            .await
            .map_err(|e| ApiError::internal(format!("find payment by receipt: {}", e)))?
            .ok_or_else(|| ApiError::not_found("Payment", receipt_number))
    }

    pub async fn list_by_ticket(&self, ticket_id: i64) -> Result<Vec<payment::Model>, ApiError> {
        Payment::find()
            .filter(payment::Column::TicketId.eq(ticket_id))
            .order_by_asc(payment::Column::Id)
            .all(&self.db)
            .await
            .map_err(|e| ApiError::internal(format!("list payments by ticket: {}", e)))
    }
}
