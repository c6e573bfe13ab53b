use poem::Request;
use poem_openapi::{param::Path, payload::Json, OpenApi, Tags};
use std::sync::Arc;

use crate::api::Api;
use crate::errors::ApiError;
use crate::services::{AccessControl, Action, UserService};
use crate::types::dto::common::MessageResponse;
use crate::types::dto::users::{
    ChangeOwnPasswordRequest, CreateUserRequest, SetPasswordRequest, UpdateUserRequest,
    UserResponse,
};

/// Staff administration endpoints. Administrator-only, except the /me routes
/// which are scoped to the authenticated caller themselves.
pub struct UserApi {
    access: Arc<AccessControl>,
    users: Arc<UserService>,
}

impl UserApi {
    pub fn new(access: Arc<AccessControl>, users: Arc<UserService>) -> Self {
        Self { access, users }
    }
}

#[derive(Tags)]
enum UserTags {
    /// User administration endpoints
    Users,
}

impl Api for UserApi {}

#[OpenApi(prefix_path = "/users")]
impl UserApi {
    /// Own profile; any authenticated identity
    #[oai(path = "/me", method = "get", tag = "UserTags::Users")]
    async fn me(&self, req: &Request) -> Result<Json<UserResponse>, ApiError> {
        let caller = self.access.authenticate(self.bearer_token(req).as_deref()).await?;
        Ok(Json(caller.into()))
    }

    /// Change own password; requires the current password
    #[oai(path = "/me/password", method = "put", tag = "UserTags::Users")]
    async fn change_own_password(
        &self,
        req: &Request,
        body: Json<ChangeOwnPasswordRequest>,
    ) -> Result<Json<MessageResponse>, ApiError> {
        let caller = self.access.authenticate(self.bearer_token(req).as_deref()).await?;

        let client_ip = self.extract_ip_address(req);
        self.users
            .change_own_password(
                &caller.username,
                &body.0.old_password,
                &body.0.new_password,
                client_ip.as_deref(),
            )
            .await?;
        Ok(Json(MessageResponse::new("Password changed")))
    }

    /// List all staff identities
    #[oai(path = "/", method = "get", tag = "UserTags::Users")]
    async fn list(&self, req: &Request) -> Result<Json<Vec<UserResponse>>, ApiError> {
        self.access
            .require(self.bearer_token(req).as_deref(), Action::AdministerUsers)
            .await?;

        let users = self.users.list().await?;
        Ok(Json(users.into_iter().map(Into::into).collect()))
    }

    /// Create a staff identity
    #[oai(path = "/", method = "post", tag = "UserTags::Users")]
    async fn create(
        &self,
        req: &Request,
        body: Json<CreateUserRequest>,
    ) -> Result<Json<UserResponse>, ApiError> {
        let actor = self
            .access
            .require(self.bearer_token(req).as_deref(), Action::AdministerUsers)
            .await?;

        let client_ip = self.extract_ip_address(req);
        let created = self.users.create(body.0, &actor.id, client_ip.as_deref()).await?;
        Ok(Json(created.into()))
    }

    /// Get a staff identity by id
    #[oai(path = "/:id", method = "get", tag = "UserTags::Users")]
    async fn get(&self, req: &Request, id: Path<String>) -> Result<Json<UserResponse>, ApiError> {
        self.access
            .require(self.bearer_token(req).as_deref(), Action::AdministerUsers)
            .await?;

        let user = self.users.get(&id.0).await?;
        Ok(Json(user.into()))
    }

    /// Edit email, full name and role
    #[oai(path = "/:id", method = "put", tag = "UserTags::Users")]
    async fn update(
        &self,
        req: &Request,
        id: Path<String>,
        body: Json<UpdateUserRequest>,
    ) -> Result<Json<UserResponse>, ApiError> {
        let actor = self
            .access
            .require(self.bearer_token(req).as_deref(), Action::AdministerUsers)
            .await?;

        let client_ip = self.extract_ip_address(req);
        let updated = self
            .users
            .update(&id.0, body.0, &actor.id, client_ip.as_deref())
            .await?;
        Ok(Json(updated.into()))
    }

    /// Administrative password set
    #[oai(path = "/:id/password", method = "put", tag = "UserTags::Users")]
    async fn set_password(
        &self,
        req: &Request,
        id: Path<String>,
        body: Json<SetPasswordRequest>,
    ) -> Result<Json<MessageResponse>, ApiError> {
        let actor = self
            .access
            .require(self.bearer_token(req).as_deref(), Action::AdministerUsers)
            .await?;

        let client_ip = self.extract_ip_address(req);
        self.users
            .set_password(&id.0, &body.0.new_password, &actor.id, client_ip.as_deref())
            .await?;
        Ok(Json(MessageResponse::new("Password set")))
    }

    /// Re-enable a disabled account
    #[oai(path = "/:id/enable", method = "put", tag = "UserTags::Users")]
    async fn enable(
        &self,
        req: &Request,
        id: Path<String>,
    ) -> Result<Json<UserResponse>, ApiError> {
        let actor = self
            .access
            .require(self.bearer_token(req).as_deref(), Action::AdministerUsers)
            .await?;

        let client_ip = self.extract_ip_address(req);
        let updated = self
            .users
            .set_enabled(&id.0, true, &actor.id, client_ip.as_deref())
            .await?;
        Ok(Json(updated.into()))
    }

    /// Disable an account without deleting it
    #[oai(path = "/:id/disable", method = "put", tag = "UserTags::Users")]
    async fn disable(
        &self,
        req: &Request,
        id: Path<String>,
    ) -> Result<Json<UserResponse>, ApiError> {
        let actor = self
            .access
            .require(self.bearer_token(req).as_deref(), Action::AdministerUsers)
            .await?;

        let client_ip = self.extract_ip_address(req);
        let updated = self
            .users
            .set_enabled(&id.0, false, &actor.id, client_ip.as_deref())
            .await?;
        Ok(Json(updated.into()))
    }

    /// Physically remove a staff identity
    #[oai(path = "/:id", method = "delete", tag = "UserTags::Users")]
    async fn delete(
        &self,
        req: &Request,
        id: Path<String>,
    ) -> Result<Json<MessageResponse>, ApiError> {
        let actor = self
            .access
            .require(self.bearer_token(req).as_deref(), Action::AdministerUsers)
            .await?;

        let client_ip = self.extract_ip_address(req);
        self.users.delete(&id.0, &actor.id, client_ip.as_deref()).await?;
        Ok(Json(MessageResponse::new("User deleted")))
    }
}
