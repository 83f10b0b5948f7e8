//! API layer for the sealing service
//!
//! REST endpoints over the seal ledger, plus structured error responses.

pub mod error;
pub mod handlers;
mod rest;
pub mod types;

pub use error::{ApiError, ErrorCode};
pub use rest::*;
