//! Session identity management
//!
//! Maps each browser to a client identity through a cookie-keyed,
//! server-side session record.

pub mod identity;
pub mod resolver;
pub mod store;

pub use identity::{ClientId, SessionData};
pub use resolver::{recover_identity, resolve_identity};
pub use store::{FileSessionStore, MemorySessionStore, SessionStore};
