// API layer - HTTP endpoints
pub mod auth;
pub mod consultations;
pub mod health;
pub mod patients;
pub mod payments;
pub mod tickets;
pub mod users;

pub use auth::AuthApi;
pub use consultations::ConsultationApi;
pub use health::HealthApi;
pub use patients::PatientApi;
pub use payments::PaymentApi;
pub use tickets::TicketApi;
pub use users::UserApi;

use percent_encoding::percent_decode_str;
use poem::Request;

/// Shared request plumbing for the endpoint impls
pub trait Api {
    /// Client address for the audit trail, proxy headers first
    fn extract_ip_address(&self, req: &Request) -> Option<String> {
        // Check X-Forwarded-For header (proxy/load balancer)
        if let Some(forwarded) = req.header("X-Forwarded-For") {
            if let Some(ip) = forwarded.split(',').next() {
                let ip = ip.trim();
                if !ip.is_empty() {
                    return Some(ip.to_string());
                }
            }
        }

        // Check X-Real-IP header (nginx)
        if let Some(real_ip) = req.header("X-Real-IP") {
            return Some(real_ip.to_string());
        }

        // Fall back to remote address
        req.remote_addr()
            .as_socket_addr()
            .map(|addr| addr.ip().to_string())
    }

    /// Pull the bearer token out of the request.
    ///
    /// The `Authorization: Bearer <token>` header wins; a cookie named
    /// `Authorization` holding a URL-encoded `Bearer <token>` value is the
    /// fallback for browser sessions.
    fn bearer_token(&self, req: &Request) -> Option<String> {
        if let Some(header) = req.header("Authorization") {
            if let Some(token) = header.strip_prefix("Bearer ") {
                return Some(token.to_string());
            }
        }

        let cookies = req.header("Cookie")?;
        for pair in cookies.split(';') {
            let mut parts = pair.trim().splitn(2, '=');
            if parts.next() != Some("Authorization") {
                continue;
            }
            let raw = parts.next().unwrap_or("");
            if let Ok(decoded) = percent_decode_str(raw).decode_utf8() {
                if let Some(token) = decoded.strip_prefix("Bearer ") {
                    return Some(token.to_string());
                }
            }
        }

        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Probe;
    impl Api for Probe {}

    #[test]
    fn test_bearer_token_from_header() {
        let req = Request::builder()
            .header("Authorization", "Bearer abc.def.ghi")
            .finish();
        assert_eq!(Probe.bearer_token(&req).as_deref(), Some("abc.def.ghi"));
    }

    #[test]
    fn test_bearer_token_from_cookie_is_url_decoded() {
        let req = Request::builder()
            .header("Cookie", "theme=dark; Authorization=Bearer%20abc.def.ghi")
            .finish();
        assert_eq!(Probe.bearer_token(&req).as_deref(), Some("abc.def.ghi"));
    }

    #[test]
    fn test_header_takes_precedence_over_cookie() {
        let req = Request::builder()
            .header("Authorization", "Bearer from-header")
            .header("Cookie", "Authorization=Bearer%20from-cookie")
            .finish();
        assert_eq!(Probe.bearer_token(&req).as_deref(), Some("from-header"));
    }

    #[test]
    fn test_missing_token_is_none() {
        let req = Request::builder().finish();
        assert!(Probe.bearer_token(&req).is_none());
    }

    #[test]
    fn test_non_bearer_header_is_ignored() {
        let req = Request::builder()
            .header("Authorization", "Basic dXNlcjpwdw==")
            .finish();
        assert!(Probe.bearer_token(&req).is_none());
    }

    #[test]
    fn test_forwarded_for_wins_over_real_ip() {
        let req = Request::builder()
            .header("X-Forwarded-For", "203.0.113.7, 10.0.0.1")
            .header("X-Real-IP", "10.0.0.2")
            .finish();
        assert_eq!(Probe.extract_ip_address(&req).as_deref(), Some("203.0.113.7"));
    }
}
