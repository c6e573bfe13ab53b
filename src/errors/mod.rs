use poem_openapi::{payload::Json, ApiResponse, Object};
use std::fmt;

/// Standardized error body returned by every endpoint
#[derive(Object, Debug)]
pub struct ErrorBody {
    /// Error code identifier
    pub error: String,

    /// Human-readable error message
    pub message: String,

    /// HTTP status code
    pub status_code: u16,
}

/// Request-boundary error taxonomy. Every failure in the system is recovered
/// into one of these at the API layer; nothing on the request path panics.
///
/// Unauthorized and Forbidden are distinct on purpose: the first means the
/// caller never proved who they are, the second means they did and their role
/// is not allowed the operation.
#[derive(ApiResponse, Debug)]
pub enum ApiError {
    /// Uniqueness violation, mismatched confirmation, invalid token state,
    /// or malformed input
    #[oai(status = 400)]
    BadRequest(Json<ErrorBody>),

    /// Missing/invalid/expired session token, or bad login credentials
    #[oai(status = 401)]
    Unauthorized(Json<ErrorBody>),

    /// Authenticated, but the role is not in the operation's allowed set
    #[oai(status = 403)]
    Forbidden(Json<ErrorBody>),

    /// No record matches the lookup key
    #[oai(status = 404)]
    NotFound(Json<ErrorBody>),

    /// Unclassified internal failure; detail is logged, not surfaced
    #[oai(status = 500)]
    Internal(Json<ErrorBody>),
}

impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        ApiError::BadRequest(Json(ErrorBody {
            error: "bad_request".to_string(),
            message: message.into(),
            status_code: 400,
        }))
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        ApiError::Unauthorized(Json(ErrorBody {
            error: "unauthorized".to_string(),
            message: message.into(),
            status_code: 401,
        }))
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        ApiError::Forbidden(Json(ErrorBody {
            error: "forbidden".to_string(),
            message: message.into(),
            status_code: 403,
        }))
    }

    /// NotFound carrying the entity type and the key that missed
    pub fn not_found(entity: &str, key: impl fmt::Display) -> Self {
        ApiError::NotFound(Json(ErrorBody {
            error: "not_found".to_string(),
            message: format!("{} not found: {}", entity, key),
            status_code: 404,
        }))
    }

    /// Log the full detail internally and surface an opaque message
    pub fn internal(detail: impl fmt::Display) -> Self {
        tracing::error!("internal error: {}", detail);
        ApiError::Internal(Json(ErrorBody {
            error: "internal_error".to_string(),
            message: "Internal server error".to_string(),
            status_code: 500,
        }))
    }

    /// Translate a database error, mapping unique-constraint violations to
    /// BadRequest. The DB constraint, not the preceding existence check, is
    /// the actual backstop against duplicate-key races.
    pub fn from_db(context: &str, err: sea_orm::DbErr) -> Self {
        let text = err.to_string();
        if text.contains("UNIQUE") || text.contains("unique constraint") {
            ApiError::bad_request(format!("{}: already exists", context))
        } else {
            ApiError::internal(format!("{}: {}", context, text))
        }
    }

    /// Get the error message from the error variant
    pub fn message(&self) -> String {
        match self {
            ApiError::BadRequest(json) => json.0.message.clone(),
            ApiError::Unauthorized(json) => json.0.message.clone(),
            ApiError::Forbidden(json) => json.0.message.clone(),
            ApiError::NotFound(json) => json.0.message.clone(),
            ApiError::Internal(json) => json.0.message.clone(),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, ApiError::NotFound(_))
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message())
    }
}
