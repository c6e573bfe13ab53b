use std::env;

/// Application configuration, read once at startup
#[derive(Debug, Clone)]
pub struct Settings {
    pub database_url: String,
    pub bind_addr: String,
    pub jwt_secret: String,
    pub token_lifetime_secs: i64,
    pub email_enabled: bool,
    pub reset_link_base: String,
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingVar(&'static str),

    #[error("Invalid value for {0}: {1}")]
    InvalidValue(&'static str, String),
}

impl Settings {
    /// Load settings from environment variables.
    ///
    /// `JWT_SECRET` is required; everything else has a development default.
    pub fn from_env() -> Result<Self, ConfigError> {
        let database_url = env::var("DATABASE_URL")
            .unwrap_or_else(|_| "sqlite://clinic.db?mode=rwc".to_string());

        let bind_addr = env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".to_string());

        let jwt_secret = env::var("JWT_SECRET").map_err(|_| ConfigError::MissingVar("JWT_SECRET"))?;

        let token_lifetime_secs = match env::var("TOKEN_LIFETIME_SECS") {
            Ok(raw) => raw
                .parse::<i64>()
                .map_err(|_| ConfigError::InvalidValue("TOKEN_LIFETIME_SECS", raw))?,
            // One working shift
            Err(_) => 28_800,
        };

        let email_enabled = env::var("EMAIL_ENABLED")
            .map(|v| v == "true" || v == "1")
            .unwrap_or(false);

        let reset_link_base = env::var("RESET_LINK_BASE")
            .unwrap_or_else(|_| "http://localhost:3000/reset-password".to_string());

        Ok(Self {
            database_url,
            bind_addr,
            jwt_secret,
            token_lifetime_secs,
            email_enabled,
            reset_link_base,
        })
    }
}
