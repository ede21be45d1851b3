//! Web File Manager
//!
//! A browser-based personal file manager. Each browser session is bound to a
//! private `user_<id>` folder whose 8-character id doubles as the credential
//! for recovering the session elsewhere.

pub mod config;
pub mod error;
pub mod middleware;
pub mod server;
pub mod session;
pub mod storage;

pub use config::ServerConfig;
pub use server::Server;
