use super::*;
use hg_core::*;
use serde::Deserialize;
use serde::Serialize;

/// Durable game status, as stored and exchanged with the API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Pending,
    Active,
    Finished,
}

impl Status {
    /// The only status a game in this status may move to.
    pub fn successor(self) -> Option<Self> {
        match self {
            Self::Pending => Some(Self::Active),
            Self::Active => Some(Self::Finished),
            Self::Finished => None,
        }
    }
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Active => "active",
            Self::Finished => "finished",
        }
    }
}

impl std::fmt::Display for Status {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Status {
    type Err = SessionError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "active" => Ok(Self::Active),
            "finished" => Ok(Self::Finished),
            other => Err(SessionError::Corrupt(format!("unknown status {:?}", other))),
        }
    }
}

/// Local phase label. `Settling` is an active game whose candidate
/// results are locked pending confirmation; it is never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    Pending,
    Active,
    Settling,
    Finished,
}

impl Phase {
    pub fn status(self) -> Status {
        match self {
            Self::Pending => Status::Pending,
            Self::Active | Self::Settling => Status::Active,
            Self::Finished => Status::Finished,
        }
    }
    pub fn is_locked(self) -> bool {
        matches!(self, Self::Settling)
    }
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Pending => f.write_str("pending"),
            Self::Active => f.write_str("active"),
            Self::Settling => f.write_str("settling"),
            Self::Finished => f.write_str("finished"),
        }
    }
}

/// Phase together with the data that only exists from that phase on.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Lifecycle {
    #[default]
    Pending,
    Active {
        started: Timestamp,
    },
    Settling {
        started: Timestamp,
        settlement: Settlement,
    },
    Finished {
        started: Timestamp,
        duration: Seconds,
        settlement: Settlement,
    },
}

impl Lifecycle {
    pub fn phase(&self) -> Phase {
        match self {
            Self::Pending => Phase::Pending,
            Self::Active { .. } => Phase::Active,
            Self::Settling { .. } => Phase::Settling,
            Self::Finished { .. } => Phase::Finished,
        }
    }
    pub fn started(&self) -> Option<Timestamp> {
        match self {
            Self::Pending => None,
            Self::Active { started }
            | Self::Settling { started, .. }
            | Self::Finished { started, .. } => Some(*started),
        }
    }
    pub fn duration(&self) -> Option<Seconds> {
        match self {
            Self::Finished { duration, .. } => Some(*duration),
            _ => None,
        }
    }
    pub fn settlement(&self) -> Option<&Settlement> {
        match self {
            Self::Settling { settlement, .. } | Self::Finished { settlement, .. } => {
                Some(settlement)
            }
            _ => None,
        }
    }
    /// Seconds of play: running while active or settling, frozen once finished.
    pub fn elapsed(&self, now: Timestamp) -> Seconds {
        match self {
            Self::Pending => 0,
            Self::Active { started } | Self::Settling { started, .. } => elapsed(*started, now),
            Self::Finished { duration, .. } => *duration,
        }
    }
}
