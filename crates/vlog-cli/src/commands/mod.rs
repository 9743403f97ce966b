//! CLI command implementations.

pub mod canonicalize;
pub mod digest;
pub mod project;
pub mod verify;
