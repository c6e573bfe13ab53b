use std::sync::Arc;

use crate::errors::ApiError;
use crate::services::{crypto, TokenService};
use crate::stores::{AuditStore, IdentityStore};
use crate::types::db::identity;
use crate::types::dto::auth::LoginResponse;

/// Login flow: verify credentials, mint a session token, audit the login
pub struct AuthService {
    identities: Arc<IdentityStore>,
    tokens: Arc<TokenService>,
    audit: Arc<AuditStore>,
}

impl AuthService {
    pub fn new(
        identities: Arc<IdentityStore>,
        tokens: Arc<TokenService>,
        audit: Arc<AuditStore>,
    ) -> Self {
        Self { identities, tokens, audit }
    }

    /// Authenticate a username/password pair.
    ///
    /// Unknown username, wrong password and disabled account all fail with
    /// the same Unauthorized message so the response does not leak which
    /// usernames exist.
    pub async fn login(
        &self,
        username: &str,
        password: &str,
        client_ip: Option<&str>,
    ) -> Result<LoginResponse, ApiError> {
        let identity = self
            .identities
            .find_by_username(username)
            .await?
            .ok_or_else(Self::bad_credentials)?;

        if !identity.enabled {
            return Err(Self::bad_credentials());
        }

        if !crypto::verify_password(password, &identity.password_hash) {
            return Err(Self::bad_credentials());
        }

        let token = self.tokens.issue(&identity)?;

        self.audit_login(&identity, client_ip).await;

        Ok(LoginResponse {
            token,
            identity_id: identity.id,
            username: identity.username,
            email: identity.email,
            role: identity.role,
        })
    }

    fn bad_credentials() -> ApiError {
        ApiError::unauthorized("Invalid username or password")
    }

    async fn audit_login(&self, identity: &identity::Model, client_ip: Option<&str>) {
        let result = self
            .audit
            .record(
                Some(&identity.id),
                "LOGIN",
                "User",
                &identity.id,
                format!("User logged in: {}", identity.username),
                client_ip,
            )
            .await;
        if let Err(e) = result {
            tracing::error!("audit write failed for login: {}", e);
        }
    }
}
