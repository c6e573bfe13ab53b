use crate::errors::ApiError;
use crate::services::crypto;
use crate::stores::IdentityStore;
use crate::types::internal::Role;

/// Default staff accounts seeded on startup so a fresh install is usable.
/// Existing accounts are left untouched; operators change these passwords
/// through the normal flows.
const DEFAULT_IDENTITIES: &[(&str, &str, &str, Role, &str)] = &[
    ("admin", "admin@clinic.local", "Administrator", Role::Administrator, "admin123"),
    ("frontdesk", "frontdesk@clinic.local", "Front Desk", Role::FrontDesk, "frontdesk123"),
    ("physician", "physician@clinic.local", "Physician", Role::Physician, "physician123"),
    ("cashier", "cashier@clinic.local", "Cashier", Role::Cashier, "cashier123"),
];

/// Idempotent seeding of the default identities
pub async fn seed_default_identities(identities: &IdentityStore) -> Result<(), ApiError> {
    tracing::info!("Checking default staff accounts...");

    for (username, email, full_name, role, password) in DEFAULT_IDENTITIES {
        if identities.exists_by_username(username).await? {
            continue;
        }

        let password_hash = crypto::hash_password(password)?;
        identities
            .insert(
                username.to_string(),
                email.to_string(),
                full_name.to_string(),
                password_hash,
                *role,
                true,
            )
            .await?;
        tracing::info!("Created default account: {}", username);
    }

    Ok(())
}
