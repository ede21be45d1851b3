//! HTTP server
//!
//! Router, request handlers, request-scoped session context and page rendering.

pub mod context;
pub mod core;
pub mod handlers;
pub mod render;

pub use self::core::{AppState, Server, build_router};
