//! Game session lifecycle for home poker games.
//!
//! A session moves through `pending → active → settling → finished`.
//! While active, cash games accept rebuys into an append-only ledger.
//! Ending the game reconciles final stacks against everything paid in
//! and locks the candidate results until the operator confirms them.
//!
//! ## Configuration
//!
//! - [`GameSettings`] — Immutable rules, tagged on cash vs tournament
//! - [`Game`] — Persistent header: group, creator, roster, settings
//!
//! ## Lifecycle
//!
//! - [`GameSession`] — The state machine driven by operator actions
//! - [`Lifecycle`] / [`Phase`] / [`Status`] — Phase data, labels, wire status
//! - [`Snapshot`] — Durable view used to persist and resume a session
//!
//! ## Accounting
//!
//! - [`Ledger`] / [`Rebuy`] / [`Tally`] — Append-only rebuy bookkeeping
//! - [`Settlement`] / [`Standing`] — Chip-conserving final results
//!
//! ## Time
//!
//! - [`Clock`] — Injectable wall clock; elapsed time is always `now - startedAt`
mod clock;
mod error;
mod game;
mod ledger;
mod lifecycle;
mod player;
mod rebuy;
mod session;
mod settings;
mod settlement;
mod snapshot;

pub use clock::*;
pub use error::*;
pub use game::*;
pub use ledger::*;
pub use lifecycle::*;
pub use player::*;
pub use rebuy::*;
pub use session::*;
pub use settings::*;
pub use settlement::*;
pub use snapshot::*;
