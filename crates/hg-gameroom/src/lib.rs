//! Async shell around game sessions.
//!
//! ## Persistence
//!
//! - [`GameRepository`] — Storage operations for games, rebuys, and results
//! - [`Memory`] — In-process repository for tests and database-free runs
//! - [`migrate()`] — Creates the PostgreSQL tables
//!
//! ## Live Tables
//!
//! - [`Table`] — Drives one session: check, persist, then apply
//! - [`TableError`] — Rejections, missing games, and storage failures
mod error;
mod memory;
mod repository;
mod table;

pub use error::*;
pub use memory::*;
pub use repository::*;
pub use table::*;
