use chrono::Utc;
use sea_orm::{ActiveModelTrait, DatabaseConnection, Set};

use crate::errors::ApiError;
use crate::types::db::audit_entry;

/// Append-only audit trail.
///
/// Every successful mutation in the system records one entry here. The core
/// never reads the trail back; reporting is an external concern. Call sites
/// log a failed write and carry on with the business result.
pub struct AuditStore {
    db: DatabaseConnection,
}

impl AuditStore {
    /// Create a new AuditStore with the given database connection
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Persist one who-did-what entry.
    ///
    /// `identity_id` is None for actions taken outside an authenticated
    /// context (e.g. a password reset completed from an emailed link).
    pub async fn record(
        &self,
        identity_id: Option<&str>,
        action: &str,
        entity_type: &str,
        entity_id: impl ToString,
        details: impl Into<String>,
        ip_address: Option<&str>,
    ) -> Result<(), ApiError> {
        let entry = audit_entry::ActiveModel {
            id: sea_orm::ActiveValue::NotSet,
            identity_id: Set(identity_id.map(|s| s.to_string())),
            action: Set(action.to_string()),
            entity_type: Set(entity_type.to_string()),
            entity_id: Set(entity_id.to_string()),
            details: Set(details.into()),
            ip_address: Set(ip_address.map(|s| s.to_string())),
            timestamp: Set(Utc::now().to_rfc3339()),
        };

        entry
            .insert(&self.db)
            .await
            .map_err(|e| ApiError::internal(format!("write audit entry: {}", e)))?;

        Ok(())
    }
}
