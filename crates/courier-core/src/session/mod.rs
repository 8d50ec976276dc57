//! Session state: per-key command queues and pending-result maps.
//!
//! Keyed sessions are isolated from each other and from the default
//! session; the default session always exists and is never reclaimed.

mod state;
mod store;

pub use state::Session;
pub use store::{SessionSelector, SessionStore};
