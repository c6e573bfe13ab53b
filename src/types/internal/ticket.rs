use std::fmt;
use std::str::FromStr;

/// Ticket lifecycle states. The canonical front-desk flow is
/// Waiting -> InProgress -> Done, but transitions are caller-directed and
/// any state may be written over any other (manual correction is allowed).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TicketStatus {
    Waiting,
    InProgress,
    Done,
}

impl TicketStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TicketStatus::Waiting => "waiting",
            TicketStatus::InProgress => "in_progress",
            TicketStatus::Done => "done",
        }
    }
}

impl fmt::Display for TicketStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for TicketStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "waiting" => Ok(TicketStatus::Waiting),
            "in_progress" => Ok(TicketStatus::InProgress),
            "done" => Ok(TicketStatus::Done),
            other => Err(format!("unknown ticket status: {}", other)),
        }
    }
}
