use std::str::FromStr;
use std::sync::Arc;

use crate::errors::ApiError;
use crate::services::crypto;
use crate::stores::{AuditStore, IdentityStore};
use crate::types::db::identity;
use crate::types::dto::users::{CreateUserRequest, UpdateUserRequest};
use crate::types::internal::Role;

/// Staff identity administration. All operations here are
/// Administrator-gated at the API layer except the self-scoped password
/// change, which any authenticated identity may run against itself.
pub struct UserService {
    identities: Arc<IdentityStore>,
    audit: Arc<AuditStore>,
}

impl UserService {
    pub fn new(identities: Arc<IdentityStore>, audit: Arc<AuditStore>) -> Self {
        Self { identities, audit }
    }

    pub async fn create(
        &self,
        request: CreateUserRequest,
        actor_id: &str,
        client_ip: Option<&str>,
    ) -> Result<identity::Model, ApiError> {
        let role = Self::parse_role(&request.role)?;

        // Early friendly failures; the unique constraints are the backstop
        if self.identities.exists_by_username(&request.username).await? {
            return Err(ApiError::bad_request("A user with this username already exists"));
        }
        if self.identities.exists_by_email(&request.email).await? {
            return Err(ApiError::bad_request("A user with this email already exists"));
        }

        let password_hash = crypto::hash_password(&request.password)?;
        let created = self
            .identities
            .insert(
                request.username,
                request.email,
                request.full_name,
                password_hash,
                role,
                true,
            )
            .await?;

        self.audit(
            actor_id,
            "CREATE",
            &created.id,
            format!("Created user: {}", created.username),
            client_ip,
        )
        .await;

        Ok(created)
    }

    pub async fn update(
        &self,
        id: &str,
        request: UpdateUserRequest,
        actor_id: &str,
        client_ip: Option<&str>,
    ) -> Result<identity::Model, ApiError> {
        let role = Self::parse_role(&request.role)?;
        let existing = self.identities.get_by_id(id).await?;

        if existing.email != request.email && self.identities.exists_by_email(&request.email).await? {
            return Err(ApiError::bad_request("A user with this email already exists"));
        }

        let updated = self
            .identities
            .update_profile(id, request.email, request.full_name, role)
            .await?;

        self.audit(
            actor_id,
            "UPDATE",
            &updated.id,
            format!("Updated user: {}", updated.username),
            client_ip,
        )
        .await;

        Ok(updated)
    }

    /// Administrative password set, no old-password proof required
    pub async fn set_password(
        &self,
        id: &str,
        new_password: &str,
        actor_id: &str,
        client_ip: Option<&str>,
    ) -> Result<(), ApiError> {
        let target = self.identities.get_by_id(id).await?;
        let password_hash = crypto::hash_password(new_password)?;
        self.identities.set_password_hash(id, password_hash).await?;

        self.audit(
            actor_id,
            "UPDATE",
            id,
            format!("Password set for user: {}", target.username),
            client_ip,
        )
        .await;

        Ok(())
    }

    /// Self-scoped password change; the current password must verify first
    pub async fn change_own_password(
        &self,
        username: &str,
        old_password: &str,
        new_password: &str,
        client_ip: Option<&str>,
    ) -> Result<(), ApiError> {
        let identity = self.identities.get_by_username(username).await?;

        if !crypto::verify_password(old_password, &identity.password_hash) {
            return Err(ApiError::bad_request("Current password is incorrect"));
        }

        let password_hash = crypto::hash_password(new_password)?;
        self.identities.set_password_hash(&identity.id, password_hash).await?;

        self.audit(
            &identity.id,
            "UPDATE",
            &identity.id,
            "User changed their own password".to_string(),
            client_ip,
        )
        .await;

        Ok(())
    }

    pub async fn set_enabled(
        &self,
        id: &str,
        enabled: bool,
        actor_id: &str,
        client_ip: Option<&str>,
    ) -> Result<identity::Model, ApiError> {
        let updated = self.identities.set_enabled(id, enabled).await?;

        let verb = if enabled { "Enabled" } else { "Disabled" };
        self.audit(
            actor_id,
            "UPDATE",
            &updated.id,
            format!("{} user: {}", verb, updated.username),
            client_ip,
        )
        .await;

        Ok(updated)
    }

    pub async fn delete(
        &self,
        id: &str,
        actor_id: &str,
        client_ip: Option<&str>,
    ) -> Result<(), ApiError> {
        let target = self.identities.get_by_id(id).await?;
        self.identities.delete(id).await?;

        self.audit(
            actor_id,
            "DELETE",
            id,
            format!("Deleted user: {}", target.username),
            client_ip,
        )
        .await;

        Ok(())
    }

    pub async fn get(&self, id: &str) -> Result<identity::Model, ApiError> {
        self.identities.get_by_id(id).await
    }

    pub async fn list(&self) -> Result<Vec<identity::Model>, ApiError> {
        self.identities.list_all().await
    }

    fn parse_role(raw: &str) -> Result<Role, ApiError> {
        Role::from_str(raw).map_err(ApiError::bad_request)
    }

    async fn audit(
        &self,
        actor_id: &str,
        action: &str,
        target_id: &str,
        details: String,
        client_ip: Option<&str>,
    ) {
        let result = self
            .audit
            .record(Some(actor_id), action, "User", target_id, details, client_ip)
            .await;
        if let Err(e) = result {
            tracing::error!("audit write failed for user {}: {}", target_id, e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use migration::{Migrator, MigratorTrait};
    use sea_orm::Database;

    async fn setup() -> (UserService, Arc<IdentityStore>) {
        let db = Database::connect("sqlite::memory:")
            .await
            .expect("Failed to create test database");
        Migrator::up(&db, None).await.expect("Failed to run migrations");

        let identities = Arc::new(IdentityStore::new(db.clone()));
        let users = UserService::new(identities.clone(), Arc::new(AuditStore::new(db)));
        (users, identities)
    }

    fn request(username: &str, email: &str, role: &str) -> CreateUserRequest {
        CreateUserRequest {
            username: username.to_string(),
            email: email.to_string(),
            full_name: username.to_string(),
            role: role.to_string(),
            password: "initial-pw".to_string(),
        }
    }

    #[tokio::test]
    async fn test_create_user_hashes_password_and_enables() {
        let (users, _) = setup().await;

        let created = users
            .create(request("clerk", "clerk@clinic.local", "front_desk"), "admin-id", None)
            .await
            .unwrap();

        assert!(created.enabled);
        assert_ne!(created.password_hash, "initial-pw");
        assert!(crypto::verify_password("initial-pw", &created.password_hash));
    }

    #[tokio::test]
    async fn test_create_rejects_unknown_role() {
        let (users, _) = setup().await;
        let result = users
            .create(request("odd", "odd@clinic.local", "janitor"), "admin-id", None)
            .await;
        assert!(matches!(result, Err(ApiError::BadRequest(_))));
    }

    #[tokio::test]
    async fn test_create_rejects_duplicate_username() {
        let (users, _) = setup().await;
        users
            .create(request("dup", "a@clinic.local", "cashier"), "admin-id", None)
            .await
            .unwrap();

        let result = users
            .create(request("dup", "b@clinic.local", "cashier"), "admin-id", None)
            .await;
        assert!(matches!(result, Err(ApiError::BadRequest(_))));
    }

    #[tokio::test]
    async fn test_update_keeps_email_uniqueness() {
        let (users, _) = setup().await;
        users
            .create(request("first", "first@clinic.local", "cashier"), "admin-id", None)
            .await
            .unwrap();
        let second = users
            .create(request("second", "second@clinic.local", "cashier"), "admin-id", None)
            .await
            .unwrap();

        let result = users
            .update(
                &second.id,
                UpdateUserRequest {
                    email: "first@clinic.local".to_string(),
                    full_name: "Second".to_string(),
                    role: "cashier".to_string(),
                },
                "admin-id",
                None,
            )
            .await;
        assert!(matches!(result, Err(ApiError::BadRequest(_))));
    }

    #[tokio::test]
    async fn test_change_own_password_requires_current_password() {
        let (users, identities) = setup().await;
        users
            .create(request("self", "self@clinic.local", "physician"), "admin-id", None)
            .await
            .unwrap();

        let wrong = users
            .change_own_password("self", "not-it", "new-pw", None)
            .await;
        assert!(matches!(wrong, Err(ApiError::BadRequest(_))));

        users
            .change_own_password("self", "initial-pw", "new-pw", None)
            .await
            .unwrap();

        let updated = identities.get_by_username("self").await.unwrap();
        assert!(crypto::verify_password("new-pw", &updated.password_hash));
    }

    #[tokio::test]
    async fn test_delete_then_get_is_not_found() {
        let (users, _) = setup().await;
        let created = users
            .create(request("brief", "brief@clinic.local", "cashier"), "admin-id", None)
            .await
            .unwrap();

        users.delete(&created.id, "admin-id", None).await.unwrap();
        let result = users.get(&created.id).await;
        assert!(matches!(result, Err(ApiError::NotFound(_))));
    }
}
