use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Staff roles. The role decides which operations the policy table permits;
/// it is carried in the session token but re-read from the identity store on
/// every authorization decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Administrator,
    FrontDesk,
    Physician,
    Cashier,
}

impl Role {
    /// String form used in the database and on the wire
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Administrator => "administrator",
            Role::FrontDesk => "front_desk",
            Role::Physician => "physician",
            Role::Cashier => "cashier",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "administrator" => Ok(Role::Administrator),
            "front_desk" => Ok(Role::FrontDesk),
            "physician" => Ok(Role::Physician),
            "cashier" => Ok(Role::Cashier),
            other => Err(format!("unknown role: {}", other)),
        }
    }
}

/// JWT claims for a session token
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (username)
    pub sub: String,

    /// Role claim at issue time
    pub role: Role,

    /// Expiration time (Unix timestamp)
    pub exp: i64,

    /// Issued at (Unix timestamp)
    pub iat: i64,
}
