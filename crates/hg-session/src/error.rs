use super::*;
use hg_core::*;

/// Whether a rejection is an operator input problem or a caller bug.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Bad input; the operator can correct it and retry.
    Validation,
    /// The operation is not legal in the current state.
    Invariant,
}

/// Every reason a session operation can be rejected.
/// A rejected operation never mutates the session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionError {
    IllegalTransition { from: Phase, to: Status },
    NotActive(Phase),
    Locked,
    NotLocked,
    RebuysDisabled,
    UnknownPlayer(ID<Player>),
    RebuyLimit { player: ID<Player>, limit: u32 },
    RebuyOutOfRange { amount: Chips, min: Chips, max: Chips },
    NonPositiveRebuy(Chips),
    AmountTooLarge(Chips),
    MissingStack(ID<Player>),
    NegativeStack { player: ID<Player>, stack: Chips },
    ChipMismatch { expected: Chips, actual: Chips },
    InvalidSettings(String),
    InvalidRoster(String),
    Corrupt(String),
}

impl SessionError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::IllegalTransition { .. }
            | Self::NotActive(_)
            | Self::Locked
            | Self::NotLocked
            | Self::RebuysDisabled
            | Self::Corrupt(_) => ErrorKind::Invariant,
            Self::UnknownPlayer(_)
            | Self::RebuyLimit { .. }
            | Self::RebuyOutOfRange { .. }
            | Self::NonPositiveRebuy(_)
            | Self::AmountTooLarge(_)
            | Self::MissingStack(_)
            | Self::NegativeStack { .. }
            | Self::ChipMismatch { .. }
            | Self::InvalidSettings(_)
            | Self::InvalidRoster(_) => ErrorKind::Validation,
        }
    }
}

impl std::fmt::Display for SessionError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::IllegalTransition { from, to } => {
                write!(f, "cannot move a {} game to {}", from, to)
            }
            Self::NotActive(phase) => write!(f, "game is {}, not active", phase),
            Self::Locked => write!(f, "game is locked for settlement"),
            Self::NotLocked => write!(f, "game has no settlement awaiting confirmation"),
            Self::RebuysDisabled => write!(f, "rebuys are not allowed in this game"),
            Self::UnknownPlayer(id) => write!(f, "player {} is not in this game", id),
            Self::RebuyLimit { player, limit } => {
                write!(f, "player {} already used all {} rebuys", player, limit)
            }
            Self::RebuyOutOfRange { amount, min, max } => {
                write!(f, "rebuy of {} is outside the range {}-{}", amount, min, max)
            }
            Self::NonPositiveRebuy(amount) => write!(f, "rebuy of {} must be positive", amount),
            Self::AmountTooLarge(amount) => {
                write!(f, "amount {} is too large for the game's totals", amount)
            }
            Self::MissingStack(id) => write!(f, "no final chip count for player {}", id),
            Self::NegativeStack { player, stack } => {
                write!(f, "final chip count {} for player {} is negative", stack, player)
            }
            Self::ChipMismatch { expected, actual } => write!(
                f,
                "final chips total {} but {} was paid in",
                actual, expected
            ),
            Self::InvalidSettings(s) => write!(f, "invalid settings: {}", s),
            Self::InvalidRoster(s) => write!(f, "invalid roster: {}", s),
            Self::Corrupt(s) => write!(f, "inconsistent stored game: {}", s),
        }
    }
}

impl std::error::Error for SessionError {}
