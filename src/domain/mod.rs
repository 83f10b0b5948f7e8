//! Domain models for the sealing ledger
//!
//! Seal records, document policies, request shapes and field validation.

mod request;
mod types;
pub mod validation;

pub use request::*;
pub use types::*;
pub use validation::ValidationError;
