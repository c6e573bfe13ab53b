use async_trait::async_trait;

use crate::errors::ApiError;

/// Outbound mail collaborator. The reset flow only depends on this seam;
/// delivery itself is out of scope for the core.
#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, to: &str, subject: &str, body: &str) -> Result<(), ApiError>;
}

/// Log-only mailer. When delivery is disabled the full message is still
/// written to the log so operators can hand out reset links manually.
pub struct LogMailer {
    enabled: bool,
}

impl LogMailer {
    pub fn new(enabled: bool) -> Self {
        Self { enabled }
    }
}

#[async_trait]
impl Mailer for LogMailer {
    async fn send(&self, to: &str, subject: &str, body: &str) -> Result<(), ApiError> {
        if self.enabled {
            // TODO: wire a real SMTP transport; until then log the message
            tracing::info!(to, subject, "outbound email");
            tracing::info!("{}", body);
        } else {
            tracing::info!(to, subject, "email delivery disabled, simulated send");
            tracing::info!("{}", body);
        }
        Ok(())
    }
}
