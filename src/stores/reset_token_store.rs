use chrono::Utc;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
};

use crate::errors::ApiError;
use crate::types::db::reset_token::{self, Entity as ResetToken};

/// ResetTokenStore persists the single-use password-reset tokens.
///
/// The `used` flag only ever transitions false -> true, and `consume` does so
/// with a conditional UPDATE so that two racing consumers cannot both win.
pub struct ResetTokenStore {
    db: DatabaseConnection,
}

impl ResetTokenStore {
    /// Create a new ResetTokenStore with the given database connection
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    pub async fn insert(
        &self,
        token: String,
        identity_id: String,
        expires_at: i64,
    ) -> Result<reset_token::Model, ApiError> {
        let record = reset_token::ActiveModel {
            id: sea_orm::ActiveValue::NotSet,
            token: Set(token),
            identity_id: Set(identity_id),
            expires_at: Set(expires_at),
            used: Set(false),
            created_at: Set(Utc::now().timestamp()),
        };

        record
            .insert(&self.db)
            .await
            .map_err(|e| ApiError::from_db("reset token", e))
    }

    pub async fn find_by_token(&self, token: &str) -> Result<Option<reset_token::Model>, ApiError> {
        ResetToken::find()
            .filter(reset_token::Column::Token.eq(token))
            .one(&self.db)
            .await
            .map_err(|e| ApiError::internal(format!("find reset token: {}", e)))
    }

    /// Most recently issued unused token for an identity, if any
    pub async fn latest_unused_for(
        &self,
        identity_id: &str,
    ) -> Result<Option<reset_token::Model>, ApiError> {
        ResetToken::find()
            .filter(reset_token::Column::IdentityId.eq(identity_id))
            .filter(reset_token::Column::Used.eq(false))
            .order_by_desc(reset_token::Column::CreatedAt)
            .one(&self.db)
            .await
            .map_err(|e| ApiError::internal(format!("find unused reset token: {}", e)))
    }

    /// Mark every unused token of an identity as used. Called when a new
    /// token is issued, so at most one usable token exists per identity.
    pub async fn supersede_for_identity(&self, identity_id: &str) -> Result<u64, ApiError> {
        let result = ResetToken::update_many()
            .col_expr(reset_token::Column::Used, Expr::value(true))
            .filter(reset_token::Column::IdentityId.eq(identity_id))
            .filter(reset_token::Column::Used.eq(false))
            .exec(&self.db)
            .await
            .map_err(|e| ApiError::internal(format!("supersede reset tokens: {}", e)))?;

        Ok(result.rows_affected)
    }

    /// Compare-and-set consumption of a token.
    ///
    /// Returns true iff this call flipped `used` from false to true. The
    /// WHERE clause on the persisted flag, not any in-memory check, is what
    /// makes concurrent consumption attempts mutually exclusive.
    pub async fn mark_used(&self, token: &str) -> Result<bool, ApiError> {
        let result = ResetToken::update_many()
            .col_expr(reset_token::Column::Used, Expr::value(true))
            .filter(reset_token::Column::Token.eq(token))
            .filter(reset_token::Column::Used.eq(false))
            .exec(&self.db)
            .await
            .map_err(|e| ApiError::internal(format!("mark reset token used: {}", e)))?;

        Ok(result.rows_affected == 1)
    }

    /// Delete all tokens whose expiry has passed, regardless of use state.
    /// Maintenance path only.
    pub async fn delete_expired(&self, now: i64) -> Result<u64, ApiError> {
        let result = ResetToken::delete_many()
            .filter(reset_token::Column::ExpiresAt.lt(now))
            .exec(&self.db)
            .await
            .map_err(|e| ApiError::internal(format!("purge expired reset tokens: {}", e)))?;

        Ok(result.rows_affected)
    }
}
