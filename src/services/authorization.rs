use std::fmt;
use std::sync::Arc;

use crate::errors::ApiError;
use crate::services::TokenService;
use crate::stores::IdentityStore;
use crate::types::db::identity;
use crate::types::internal::Role;

/// Role-gated operations. Each gated endpoint names exactly one action; the
/// policy table below is the single place allowed-role sets are defined.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    ManagePatients,
    ManageTickets,
    ManageConsultations,
    RecordPayments,
    AdministerUsers,
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Action::ManagePatients => "manage patients",
            Action::ManageTickets => "manage tickets",
            Action::ManageConsultations => "manage consultations",
            Action::RecordPayments => "record payments",
            Action::AdministerUsers => "administer users",
        };
        write!(f, "{}", name)
    }
}

/// The static policy table: one row per gated action
const POLICY: &[(Action, &[Role])] = &[
    (Action::ManagePatients, &[Role::Administrator, Role::FrontDesk, Role::Physician]),
    (Action::ManageTickets, &[Role::Administrator, Role::FrontDesk, Role::Physician]),
    (Action::ManageConsultations, &[Role::Administrator, Role::Physician]),
    (Action::RecordPayments, &[Role::Administrator, Role::Cashier]),
    (Action::AdministerUsers, &[Role::Administrator]),
];

/// Roles permitted to perform an action
pub fn allowed_roles(action: Action) -> &'static [Role] {
    POLICY
        .iter()
        .find(|(a, _)| *a == action)
        .map(|(_, roles)| *roles)
        .unwrap_or(&[])
}

pub fn is_allowed(role: Role, action: Action) -> bool {
    allowed_roles(action).contains(&role)
}

/// The enforcement point in front of every gated operation.
///
/// Authentication and authorization fail differently on purpose:
/// Unauthorized means the token was missing, malformed, expired, or its
/// identity no longer resolves to an enabled account; Forbidden means the
/// caller is known but their role is not in the action's allowed set.
pub struct AccessControl {
    identities: Arc<IdentityStore>,
    tokens: Arc<TokenService>,
}

impl AccessControl {
    pub fn new(identities: Arc<IdentityStore>, tokens: Arc<TokenService>) -> Self {
        Self { identities, tokens }
    }

    /// Resolve a bearer token to a live identity.
    ///
    /// The token only proves who the caller was at issue time; role and
    /// enabled state are re-read from the store so edits take effect
    /// immediately.
    pub async fn authenticate(&self, token: Option<&str>) -> Result<identity::Model, ApiError> {
        let token = token.ok_or_else(|| ApiError::unauthorized("Missing bearer token"))?;
        let claims = self.tokens.verify(token)?;

        let identity = self
            .identities
            .find_by_username(&claims.sub)
            .await?
            .ok_or_else(|| ApiError::unauthorized("Token subject no longer exists"))?;

        if !identity.enabled {
            return Err(ApiError::unauthorized("Account is disabled"));
        }

        Ok(identity)
    }

    /// Authenticate, then check the caller's current role against the
    /// action's allowed set
    pub async fn require(
        &self,
        token: Option<&str>,
        action: Action,
    ) -> Result<identity::Model, ApiError> {
        let identity = self.authenticate(token).await?;

        let role = identity
            .role
            .parse::<Role>()
            .map_err(|e| ApiError::internal(format!("stored role is invalid: {}", e)))?;

        if !is_allowed(role, action) {
            return Err(ApiError::forbidden(format!(
                "Role {} is not permitted to {}",
                role, action
            )));
        }

        Ok(identity)
    }
}
