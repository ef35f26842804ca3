//! Remote browser session lifecycle
//!
//! A [`SessionManager`] hands out one [`SessionLease`] per search attempt and
//! guarantees the browser is released on every exit path.

pub mod manager;
pub mod traits;

pub use manager::{SessionLease, SessionManager, SESSION_ID_PLACEHOLDER};
pub use traits::{Session, SessionOptions, SessionProvisioner};
