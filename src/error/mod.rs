//! Error handling
//!
//! Defines error types and handling for the web file manager.

pub mod handlers;
pub mod types;

pub use types::*;
