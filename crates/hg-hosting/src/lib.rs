//! HTTP hosting for live homegame tables.
//!
//! ## Core Types
//!
//! - [`Floor`] — Registry of live tables, resumed from storage on demand
//! - [`Server`] — actix-web server wiring logging, CORS, and routes
//!
//! ## HTTP Handlers
//!
//! The [`handlers`] submodule exposes the game routes: create, load,
//! status changes, rebuys, settlement, and group history. Responses use
//! the `{success, data, error}` envelope from `hg-dto`.
mod floor;
pub mod handlers;
mod server;

pub use floor::*;
pub use handlers::routes;
pub use server::*;
