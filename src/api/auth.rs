use poem::Request;
use poem_openapi::{param::Path, payload::Json, OpenApi, Tags};
use std::sync::Arc;

use crate::api::Api;
use crate::errors::ApiError;
use crate::services::{AuthService, PasswordResetFlow};
use crate::types::dto::auth::{
    ForgotPasswordRequest, LoginRequest, LoginResponse, ResetPasswordRequest, ResetTokenValidity,
};
use crate::types::dto::common::MessageResponse;

/// Authentication and password-reset endpoints. Everything here is public;
/// these are the routes a caller hits before they have a token.
pub struct AuthApi {
    auth: Arc<AuthService>,
    reset: Arc<PasswordResetFlow>,
}

impl AuthApi {
    pub fn new(auth: Arc<AuthService>, reset: Arc<PasswordResetFlow>) -> Self {
        Self { auth, reset }
    }
}

#[derive(Tags)]
enum AuthTags {
    /// Authentication endpoints
    Authentication,
}

impl Api for AuthApi {}

#[OpenApi(prefix_path = "/auth")]
impl AuthApi {
    /// Login with username and password to receive a session token
    #[oai(path = "/login", method = "post", tag = "AuthTags::Authentication")]
    async fn login(
        &self,
        req: &Request,
        body: Json<LoginRequest>,
    ) -> Result<Json<LoginResponse>, ApiError> {
        let client_ip = self.extract_ip_address(req);
        let response = self
            .auth
            .login(&body.username, &body.password, client_ip.as_deref())
            .await?;
        Ok(Json(response))
    }

    /// Request a password-reset email.
    ///
    /// Always acknowledges with the same message; whether the address is
    /// registered stays internal.
    #[oai(path = "/forgot-password", method = "post", tag = "AuthTags::Authentication")]
    async fn forgot_password(
        &self,
        body: Json<ForgotPasswordRequest>,
    ) -> Result<Json<MessageResponse>, ApiError> {
        match self.reset.request_reset(&body.email).await {
            Ok(()) => {}
            Err(err) if err.is_not_found() => {
                tracing::info!("password reset requested for unknown email");
            }
            Err(err) => return Err(err),
        }

        Ok(Json(MessageResponse::new(
            "If the address is registered, a reset email has been sent",
        )))
    }

    /// Complete a password reset with a token from the emailed link
    #[oai(path = "/reset-password", method = "post", tag = "AuthTags::Authentication")]
    async fn reset_password(
        &self,
        body: Json<ResetPasswordRequest>,
    ) -> Result<Json<MessageResponse>, ApiError> {
        self.reset
            .consume(&body.token, &body.new_password, &body.confirm_password)
            .await?;
        Ok(Json(MessageResponse::new("Your password has been reset")))
    }

    /// Pre-check whether a reset token is still usable, without consuming it
    #[oai(
        path = "/validate-reset-token/:token",
        method = "get",
        tag = "AuthTags::Authentication"
    )]
    async fn validate_reset_token(
        &self,
        token: Path<String>,
    ) -> Result<Json<ResetTokenValidity>, ApiError> {
        let valid = self.reset.validate(&token.0).await?;
        Ok(Json(ResetTokenValidity { valid }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::{crypto, LogMailer, TokenService};
    use crate::stores::{AuditStore, IdentityStore, ResetTokenStore};
    use crate::types::internal::Role;
    use migration::{Migrator, MigratorTrait};
    use sea_orm::Database;

    async fn setup() -> (AuthApi, Arc<IdentityStore>, Arc<ResetTokenStore>) {
        let db = Database::connect("sqlite::memory:")
            .await
            .expect("Failed to create test database");
        Migrator::up(&db, None).await.expect("Failed to run migrations");

        let identities = Arc::new(IdentityStore::new(db.clone()));
        let reset_tokens = Arc::new(ResetTokenStore::new(db.clone()));
        let audit = Arc::new(AuditStore::new(db));
        let tokens = Arc::new(TokenService::new(
            "test-secret-key-minimum-32-characters-long".to_string(),
            3600,
        ));

        let auth = Arc::new(AuthService::new(identities.clone(), tokens, audit));
        let reset = Arc::new(PasswordResetFlow::new(
            identities.clone(),
            reset_tokens.clone(),
            Arc::new(LogMailer::new(false)),
            "http://localhost:3000/reset-password".to_string(),
        ));

        identities
            .insert(
                "admin".to_string(),
                "admin@clinic.local".to_string(),
                "Administrator".to_string(),
                crypto::hash_password("admin123").unwrap(),
                Role::Administrator,
                true,
            )
            .await
            .unwrap();

        (AuthApi::new(auth, reset), identities, reset_tokens)
    }

    #[tokio::test]
    async fn test_login_returns_token() {
        let (api, _, _) = setup().await;

        let req = Request::builder().finish();
        let response = api
            .login(
                &req,
                Json(LoginRequest {
                    username: "admin".to_string(),
                    password: "admin123".to_string(),
                }),
            )
            .await
            .unwrap();

        assert!(!response.token.is_empty());
        assert_eq!(response.role, "administrator");
    }

    #[tokio::test]
    async fn test_login_with_bad_credentials_is_unauthorized() {
        let (api, _, _) = setup().await;

        let req = Request::builder().finish();
        let result = api
            .login(
                &req,
                Json(LoginRequest {
                    username: "admin".to_string(),
                    password: "wrong".to_string(),
                }),
            )
            .await;

        assert!(matches!(result, Err(ApiError::Unauthorized(_))));
    }

    #[tokio::test]
    async fn test_forgot_password_does_not_reveal_unknown_email() {
        let (api, _, _) = setup().await;

        let known = api
            .forgot_password(Json(ForgotPasswordRequest {
                email: "admin@clinic.local".to_string(),
            }))
            .await
            .unwrap();
        let unknown = api
            .forgot_password(Json(ForgotPasswordRequest {
                email: "nobody@clinic.local".to_string(),
            }))
            .await
            .unwrap();

        assert_eq!(known.message, unknown.message);
    }

    #[tokio::test]
    async fn test_reset_round_trip_through_endpoints() {
        let (api, identities, reset_tokens) = setup().await;

        api.forgot_password(Json(ForgotPasswordRequest {
            email: "admin@clinic.local".to_string(),
        }))
        .await
        .unwrap();

        let admin = identities.get_by_username("admin").await.unwrap();
        let token = reset_tokens.latest_unused_for(&admin.id).await.unwrap().unwrap();

        let validity = api.validate_reset_token(Path(token.token.clone())).await.unwrap();
        assert!(validity.valid);

        api.reset_password(Json(ResetPasswordRequest {
            token: token.token.clone(),
            new_password: "new-pass-1".to_string(),
            confirm_password: "new-pass-1".to_string(),
        }))
        .await
        .unwrap();

        // Burned after use
        let validity = api.validate_reset_token(Path(token.token)).await.unwrap();
        assert!(!validity.valid);

        // And the new password logs in
        let req = Request::builder().finish();
        let login = api
            .login(
                &req,
                Json(LoginRequest {
                    username: "admin".to_string(),
                    password: "new-pass-1".to_string(),
                }),
            )
            .await;
        assert!(login.is_ok());
    }
}
