//! REST API handlers organized by concern.

pub mod health;
pub mod seal;
pub mod verify;

pub use health::*;
pub use seal::*;
pub use verify::*;
