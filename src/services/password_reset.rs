use chrono::{Duration, Utc};
use std::sync::Arc;
use uuid::Uuid;

use crate::errors::ApiError;
use crate::services::{crypto, Mailer};
use crate::stores::{IdentityStore, ResetTokenStore};
use crate::types::db::reset_token;

const TOKEN_EXPIRY_HOURS: i64 = 24;

/// One-time password-reset token lifecycle.
///
/// Per identity the state machine is NoActiveToken -> TokenIssued ->
/// {Consumed | Superseded | Expired}. Requesting again supersedes the
/// previous token, so at most one usable token exists per identity at any
/// time.
pub struct PasswordResetFlow {
    identities: Arc<IdentityStore>,
    tokens: Arc<ResetTokenStore>,
    mailer: Arc<dyn Mailer>,
    reset_link_base: String,
}

impl PasswordResetFlow {
    pub fn new(
        identities: Arc<IdentityStore>,
        tokens: Arc<ResetTokenStore>,
        mailer: Arc<dyn Mailer>,
        reset_link_base: String,
    ) -> Self {
        Self { identities, tokens, mailer, reset_link_base }
    }

    /// Issue a fresh reset token for the account behind `email` and hand the
    /// formatted message to the mail collaborator.
    ///
    /// # Errors
    /// NotFound when no identity has this email. Callers on the public
    /// surface swallow that outcome so the response does not reveal whether
    /// an address is registered.
    pub async fn request_reset(&self, email: &str) -> Result<(), ApiError> {
        let identity = self.identities.get_by_email(email).await?;

        // Supersede any token still outstanding for this identity
        self.tokens.supersede_for_identity(&identity.id).await?;

        let token_value = Uuid::new_v4().to_string();
        let expires_at = (Utc::now() + Duration::hours(TOKEN_EXPIRY_HOURS)).timestamp();
        self.tokens
            .insert(token_value.clone(), identity.id.clone(), expires_at)
            .await?;

        let reset_link = format!("{}?token={}", self.reset_link_base, token_value);
        let subject = "Password reset - Clinic";
        let body = format!(
            "Hello {},\n\n\
             A password reset was requested for your account.\n\
             Follow this link to choose a new password:\n\n\
             {}\n\n\
             The link expires in {} hours. If you did not request a reset,\n\
             ignore this message.\n",
            identity.full_name, reset_link, TOKEN_EXPIRY_HOURS
        );
        self.mailer.send(&identity.email, subject, &body).await?;

        Ok(())
    }

    /// Informational pre-check: does the token currently pass the validity
    /// predicate? Never consumes.
    pub async fn validate(&self, token: &str) -> Result<bool, ApiError> {
        let record = self.tokens.find_by_token(token).await?;
        Ok(record.as_ref().is_some_and(Self::is_live))
    }

    /// Consume a token and set the new credential.
    ///
    /// The used-flag transition goes through a conditional update in the
    /// store, so of two concurrent consumption attempts exactly one wins;
    /// the loser gets BadRequest.
    pub async fn consume(
        &self,
        token: &str,
        new_password: &str,
        confirm_password: &str,
    ) -> Result<(), ApiError> {
        if new_password != confirm_password {
            return Err(ApiError::bad_request("Passwords do not match"));
        }

        let record = self
            .tokens
            .find_by_token(token)
            .await?
            .ok_or_else(|| ApiError::bad_request("Invalid reset token"))?;

        if !Self::is_live(&record) {
            return Err(ApiError::bad_request("Reset token has expired or was already used"));
        }

        if !self.tokens.mark_used(token).await? {
            // Lost the race against a concurrent consumer
            return Err(ApiError::bad_request("Reset token has expired or was already used"));
        }

        let password_hash = crypto::hash_password(new_password)?;
        self.identities
            .set_password_hash(&record.identity_id, password_hash)
            .await?;

        Ok(())
    }

    /// Delete all tokens past expiry, used or not. Periodic hygiene, not a
    /// request-path operation.
    pub async fn purge_expired(&self) -> Result<u64, ApiError> {
        self.tokens.delete_expired(Utc::now().timestamp()).await
    }

    fn is_live(record: &reset_token::Model) -> bool {
        !record.used && Utc::now().timestamp() < record.expires_at
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::LogMailer;
    use crate::types::internal::Role;
    use migration::{Migrator, MigratorTrait};
    use sea_orm::Database;

    async fn setup() -> (PasswordResetFlow, Arc<IdentityStore>, Arc<ResetTokenStore>) {
        let db = Database::connect("sqlite::memory:")
            .await
            .expect("Failed to create test database");
        Migrator::up(&db, None).await.expect("Failed to run migrations");

        let identities = Arc::new(IdentityStore::new(db.clone()));
        let tokens = Arc::new(ResetTokenStore::new(db));
        let flow = PasswordResetFlow::new(
            identities.clone(),
            tokens.clone(),
            Arc::new(LogMailer::new(false)),
            "http://localhost:3000/reset-password".to_string(),
        );
        (flow, identities, tokens)
    }

    async fn seed(identities: &IdentityStore, email: &str) -> crate::types::db::identity::Model {
        identities
            .insert(
                "resettable".to_string(),
                email.to_string(),
                "Reset Table".to_string(),
                crypto::hash_password("original").unwrap(),
                Role::FrontDesk,
                true,
            )
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_request_reset_issues_live_token() {
        let (flow, identities, tokens) = setup().await;
        let identity = seed(&identities, "a@b.com").await;

        flow.request_reset("a@b.com").await.unwrap();

        let token = tokens.latest_unused_for(&identity.id).await.unwrap().unwrap();
        assert!(flow.validate(&token.token).await.unwrap());
    }

    #[tokio::test]
    async fn test_request_reset_for_unknown_email_is_not_found() {
        let (flow, _, _) = setup().await;
        let result = flow.request_reset("nobody@b.com").await;
        assert!(matches!(result, Err(ApiError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_second_request_supersedes_first_token() {
        let (flow, identities, tokens) = setup().await;
        let identity = seed(&identities, "a@b.com").await;

        flow.request_reset("a@b.com").await.unwrap();
        let first = tokens.latest_unused_for(&identity.id).await.unwrap().unwrap();

        flow.request_reset("a@b.com").await.unwrap();
        let second = tokens.latest_unused_for(&identity.id).await.unwrap().unwrap();

        assert_ne!(first.token, second.token);
        assert!(!flow.validate(&first.token).await.unwrap());
        assert!(flow.validate(&second.token).await.unwrap());
    }

    #[tokio::test]
    async fn test_consume_changes_password_and_burns_token() {
        let (flow, identities, tokens) = setup().await;
        let identity = seed(&identities, "a@b.com").await;

        flow.request_reset("a@b.com").await.unwrap();
        let token = tokens.latest_unused_for(&identity.id).await.unwrap().unwrap();

        flow.consume(&token.token, "fresh-pass", "fresh-pass").await.unwrap();

        let updated = identities.get_by_id(&identity.id).await.unwrap();
        assert!(crypto::verify_password("fresh-pass", &updated.password_hash));
        assert!(!crypto::verify_password("original", &updated.password_hash));

        // Consumed: fails validate and cannot be consumed again
        assert!(!flow.validate(&token.token).await.unwrap());
        let again = flow.consume(&token.token, "other", "other").await;
        assert!(matches!(again, Err(ApiError::BadRequest(_))));
    }

    #[tokio::test]
    async fn test_consume_rejects_mismatched_confirmation() {
        let (flow, identities, tokens) = setup().await;
        let identity = seed(&identities, "a@b.com").await;

        flow.request_reset("a@b.com").await.unwrap();
        let token = tokens.latest_unused_for(&identity.id).await.unwrap().unwrap();

        let result = flow.consume(&token.token, "one", "two").await;
        assert!(matches!(result, Err(ApiError::BadRequest(_))));

        // Token survives the failed attempt
        assert!(flow.validate(&token.token).await.unwrap());
    }

    #[tokio::test]
    async fn test_consume_rejects_unknown_token() {
        let (flow, _, _) = setup().await;
        let result = flow.consume("no-such-token", "pw", "pw").await;
        assert!(matches!(result, Err(ApiError::BadRequest(_))));
    }

    #[tokio::test]
    async fn test_expired_token_fails_validate_and_consume() {
        let (flow, identities, tokens) = setup().await;
        let identity = seed(&identities, "a@b.com").await;

        let past = Utc::now().timestamp() - 60;
        tokens
            .insert("stale-token".to_string(), identity.id, past)
            .await
            .unwrap();

        assert!(!flow.validate("stale-token").await.unwrap());
        let result = flow.consume("stale-token", "pw", "pw").await;
        assert!(matches!(result, Err(ApiError::BadRequest(_))));
    }

    #[tokio::test]
    async fn test_purge_removes_expired_tokens_only() {
        let (flow, identities, tokens) = setup().await;
        let identity = seed(&identities, "a@b.com").await;

        let now = Utc::now().timestamp();
        tokens
            .insert("old".to_string(), identity.id.clone(), now - 10)
            .await
            .unwrap();
        tokens
            .insert("new".to_string(), identity.id, now + 3600)
            .await
            .unwrap();

        assert_eq!(flow.purge_expired().await.unwrap(), 1);
        assert!(tokens.find_by_token("old").await.unwrap().is_none());
        assert!(tokens.find_by_token("new").await.unwrap().is_some());
    }
}
