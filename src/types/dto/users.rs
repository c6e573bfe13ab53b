use crate::types::db::identity;
use poem_openapi::Object;
use serde::{Deserialize, Serialize};

/// Request model for creating a staff identity
#[derive(Object, Debug, Serialize, Deserialize)]
pub struct CreateUserRequest {
    pub username: String,
    pub email: String,
    pub full_name: String,

    /// Role name in wire form (administrator, front_desk, physician, cashier)
    pub role: String,

    pub password: String,
}

/// Request model for editing a staff identity
#[derive(Object, Debug, Serialize, Deserialize)]
pub struct UpdateUserRequest {
    pub email: String,
    pub full_name: String,
    pub role: String,
}

/// Request model for an administrative password set
#[derive(Object, Debug, Serialize, Deserialize)]
pub struct SetPasswordRequest {
    pub new_password: String,
}

/// Request model for changing one's own password
#[derive(Object, Debug, Serialize, Deserialize)]
pub struct ChangeOwnPasswordRequest {
    /// Current password, verified before the change is applied
    pub old_password: String,

    pub new_password: String,
}

/// Staff identity as exposed by the API. The password hash never leaves
/// the store layer.
#[derive(Object, Debug, Serialize, Deserialize)]
pub struct UserResponse {
    pub id: String,
    pub username: String,
    pub email: String,
    pub full_name: String,
    pub role: String,
    pub enabled: bool,
}

impl From<identity::Model> for UserResponse {
    fn from(model: identity::Model) -> Self {
        Self {
            id: model.id,
            username: model.username,
            email: model.email,
            full_name: model.full_name,
            role: model.role,
            enabled: model.enabled,
        }
    }
}
