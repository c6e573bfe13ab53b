use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, Set,
};
use uuid::Uuid;

use crate::errors::ApiError;
use crate::types::db::identity::{self, Entity as Identity};
use crate::types::internal::Role;

/// IdentityStore manages staff credential records.
///
/// Username and email uniqueness is guaranteed by the database constraints;
/// the `exists_*` checks only provide early, friendlier failures.
pub struct IdentityStore {
    db: DatabaseConnection,
}

impl IdentityStore {
    /// Create a new IdentityStore with the given database connection
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Insert a new identity and return the stored record
    ///
    /// # Errors
    /// BadRequest when username or email collides with an existing record
    pub async fn insert(
        &self,
        username: String,
        email: String,
        full_name: String,
        password_hash: String,
        role: Role,
        enabled: bool,
    ) -> Result<identity::Model, ApiError> {
        let now = Utc::now().timestamp();
        let record = identity::ActiveModel {
            id: Set(Uuid::new_v4().to_string()),
            username: Set(username),
            email: Set(email),
            full_name: Set(full_name),
            password_hash: Set(password_hash),
            role: Set(role.as_str().to_string()),
            enabled: Set(enabled),
            created_at: Set(now),
            updated_at: Set(now),
        };

        record
            .insert(&self.db)
            .await
            .map_err(|e| ApiError::from_db("identity", e))
    }

    pub async fn find_by_username(&self, username: &str) -> Result<Option<identity::Model>, ApiError> {
        Identity::find()
            .filter(identity::Column::Username.eq(username))
            .one(&self.db)
            .await
            .map_err(|e| ApiError::internal(format!("find identity by username: {}", e)))
    }

    pub async fn find_by_email(&self, email: &str) -> Result<Option<identity::Model>, ApiError> {
        Identity::find()
            .filter(identity::Column::Email.eq(email))
            .one(&self.db)
            .await
            .map_err(|e| ApiError::internal(format!("find identity by email: {}", e)))
    }

    /// Lookup by id, NotFound when absent
    pub async fn get_by_id(&self, id: &str) -> Result<identity::Model, ApiError> {
        Identity::find_by_id(id.to_string())
            .one(&self.db)
            .await
            .map_err(|e| ApiError::internal(format!("find identity by id: {}", e)))?
            .ok_or_else(|| ApiError::not_found("User", id))
    }

    /// Lookup by username, NotFound when absent
    pub async fn get_by_username(&self, username: &str) -> Result<identity::Model, ApiError> {
        self.find_by_username(username)
            .await?
            .ok_or_else(|| ApiError::not_found("User", username))
    }

    /// Lookup by email, NotFound when absent
    pub async fn get_by_email(&self, email: &str) -> Result<identity::Model, ApiError> {
        self.find_by_email(email)
            .await?
            .ok_or_else(|| ApiError::not_found("User", email))
    }

    pub async fn exists_by_username(&self, username: &str) -> Result<bool, ApiError> {
        let count = Identity::find()
            .filter(identity::Column::Username.eq(username))
            .count(&self.db)
            .await
            .map_err(|e| ApiError::internal(format!("count identities by username: {}", e)))?;
        Ok(count > 0)
    }

    pub async fn exists_by_email(&self, email: &str) -> Result<bool, ApiError> {
        let count = Identity::find()
            .filter(identity::Column::Email.eq(email))
            .count(&self.db)
            .await
            .map_err(|e| ApiError::internal(format!("count identities by email: {}", e)))?;
        Ok(count > 0)
    }

    pub async fn list_all(&self) -> Result<Vec<identity::Model>, ApiError> {
        Identity::find()
            .order_by_asc(identity::Column::Username)
            .all(&self.db)
            .await
            .map_err(|e| ApiError::internal(format!("list identities: {}", e)))
    }

    /// Full replace of the mutable profile fields
    pub async fn update_profile(
        &self,
        id: &str,
        email: String,
        full_name: String,
        role: Role,
    ) -> Result<identity::Model, ApiError> {
        let existing = self.get_by_id(id).await?;
        let mut record: identity::ActiveModel = existing.into();
        record.email = Set(email);
        record.full_name = Set(full_name);
        record.role = Set(role.as_str().to_string());
        record.updated_at = Set(Utc::now().timestamp());
        record
            .update(&self.db)
            .await
            .map_err(|e| ApiError::from_db("identity", e))
    }

    pub async fn set_password_hash(&self, id: &str, password_hash: String) -> Result<(), ApiError> {
        let existing = self.get_by_id(id).await?;
        let mut record: identity::ActiveModel = existing.into();
        record.password_hash = Set(password_hash);
        record.updated_at = Set(Utc::now().timestamp());
        record
            .update(&self.db)
            .await
            .map_err(|e| ApiError::internal(format!("set password hash: {}", e)))?;
        Ok(())
    }

    pub async fn set_enabled(&self, id: &str, enabled: bool) -> Result<identity::Model, ApiError> {
        let existing = self.get_by_id(id).await?;
        let mut record: identity::ActiveModel = existing.into();
        record.enabled = Set(enabled);
        record.updated_at = Set(Utc::now().timestamp());
        record
            .update(&self.db)
            .await
            .map_err(|e| ApiError::internal(format!("set enabled flag: {}", e)))
    }

    /// Physical removal; only reachable through an explicit administrative
    /// delete
    pub async fn delete(&self, id: &str) -> Result<(), ApiError> {
        let existing = self.get_by_id(id).await?;
        let record: identity::ActiveModel = existing.into();
        record
            .delete(&self.db)
            .await
            .map_err(|e| ApiError::internal(format!("delete identity: {}", e)))?;
        Ok(())
    }
}
