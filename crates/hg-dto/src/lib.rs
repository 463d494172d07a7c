//! Data transfer objects for the homegame REST API.
//!
//! Every response is wrapped in an [`ApiResponse`] envelope carrying
//! either `data` or a human-readable `error`.
mod request;
mod response;

pub use request::*;
pub use response::*;
