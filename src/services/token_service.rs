use chrono::Utc;
use jsonwebtoken::{decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use std::fmt;
use std::str::FromStr;

use crate::errors::ApiError;
use crate::types::db::identity;
use crate::types::internal::{Claims, Role};

/// Signs and verifies session tokens.
///
/// Tokens are stateless: verification checks shape, signature and expiry
/// only. Authorization decisions re-resolve the identity by username so a
/// role edit or a disable takes effect before the token expires.
pub struct TokenService {
    secret: String,
    lifetime_secs: i64,
}

impl TokenService {
    /// Create a new TokenService with the given signing secret and token
    /// lifetime
    pub fn new(secret: String, lifetime_secs: i64) -> Self {
        Self { secret, lifetime_secs }
    }

    /// Mint a signed bearer token for an authenticated identity
    pub fn issue(&self, identity: &identity::Model) -> Result<String, ApiError> {
        let role = Role::from_str(&identity.role)
            .map_err(|e| ApiError::internal(format!("stored role is invalid: {}", e)))?;

        let now = Utc::now().timestamp();
        let claims = Claims {
            sub: identity.username.clone(),
            role,
            exp: now + self.lifetime_secs,
            iat: now,
        };

        encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(self.secret.as_bytes()),
        )
        .map_err(|e| ApiError::internal(format!("failed to sign token: {}", e)))
    }

    /// Verify a bearer token and return its claims
    ///
    /// # Errors
    /// Unauthorized for a malformed token, a signature mismatch, or an
    /// expired token
    pub fn verify(&self, token: &str) -> Result<Claims, ApiError> {
        let validation = Validation::new(Algorithm::HS256);

        let data = decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.secret.as_bytes()),
            &validation,
        )
        .map_err(|e| match e.kind() {
            ErrorKind::ExpiredSignature => ApiError::unauthorized("Session token has expired"),
            ErrorKind::InvalidSignature => ApiError::unauthorized("Invalid token signature"),
            _ => ApiError::unauthorized("Invalid or malformed token"),
        })?;

        Ok(data.claims)
    }

    pub fn lifetime_secs(&self) -> i64 {
        self.lifetime_secs
    }
}

impl fmt::Debug for TokenService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenService")
            .field("secret", &"<redacted>")
            .field("lifetime_secs", &self.lifetime_secs)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_identity(username: &str, role: Role) -> identity::Model {
        identity::Model {
            id: "id-1".to_string(),
            username: username.to_string(),
            email: format!("{}@clinic.local", username),
            full_name: "Test User".to_string(),
            password_hash: "h".to_string(),
            role: role.as_str().to_string(),
            enabled: true,
            created_at: 0,
            updated_at: 0,
        }
    }

    fn service() -> TokenService {
        TokenService::new("test-secret-key-minimum-32-characters-long".to_string(), 3600)
    }

    #[test]
    fn test_issue_then_verify_returns_claims() {
        let tokens = service();
        let token = tokens.issue(&test_identity("admin", Role::Administrator)).unwrap();

        let claims = tokens.verify(&token).unwrap();
        assert_eq!(claims.sub, "admin");
        assert_eq!(claims.role, Role::Administrator);
        assert_eq!(claims.exp - claims.iat, 3600);
    }

    #[test]
    fn test_verify_fails_with_wrong_secret() {
        let tokens = service();
        let other = TokenService::new("another-secret-key-minimum-32-chars-x".to_string(), 3600);

        let token = tokens.issue(&test_identity("admin", Role::Administrator)).unwrap();
        let result = other.verify(&token);

        assert!(matches!(result, Err(ApiError::Unauthorized(_))));
    }

    #[test]
    fn test_verify_fails_on_garbage() {
        let tokens = service();
        let result = tokens.verify("definitely.not.a-jwt");
        assert!(matches!(result, Err(ApiError::Unauthorized(_))));
    }

    #[test]
    fn test_verify_fails_on_expired_token() {
        let tokens = service();

        // Hand-build a token that expired an hour ago
        let now = Utc::now().timestamp();
        let claims = Claims {
            sub: "admin".to_string(),
            role: Role::Administrator,
            exp: now - 3600,
            iat: now - 7200,
        };
        let expired = encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret("test-secret-key-minimum-32-characters-long".as_bytes()),
        )
        .unwrap();

        let result = tokens.verify(&expired);
        match result {
            Err(err) => assert_eq!(err.message(), "Session token has expired"),
            Ok(_) => panic!("expired token verified"),
        }
    }

    #[test]
    fn test_issue_rejects_corrupt_stored_role() {
        let tokens = service();
        let mut identity = test_identity("odd", Role::Cashier);
        identity.role = "superuser".to_string();

        assert!(tokens.issue(&identity).is_err());
    }

    #[test]
    fn test_debug_does_not_expose_secret() {
        let tokens = service();
        let output = format!("{:?}", tokens);
        assert!(!output.contains("test-secret-key"));
        assert!(output.contains("<redacted>"));
    }
}
