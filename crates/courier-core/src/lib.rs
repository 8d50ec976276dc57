//! # courier-core
//!
//! Core rendezvous logic for Courier, a command/result broker: remote
//! producers submit commands for isolated execution agents, and agents
//! post back results routed to the exact submitter that issued the
//! matching command.
//!
//! This crate is framework-agnostic; the HTTP boundary lives in
//! `courier-http` and process wiring in `courier-daemon`.
//!
//! ## Key Concepts
//!
//! - **Session**: an isolated command queue plus pending-result map,
//!   addressed by a shared-secret key (or the always-present default)
//! - **Rendezvous**: matching a submitted command's id to its
//!   later-posted result
//! - **Pop-on-read**: a claimed result is removed as it is returned,
//!   so it reaches at most one waiter, at most once

pub mod broker;
pub mod command;
pub mod config;
pub mod reaper;
pub mod session;
pub mod wait;

// Re-export commonly used types
pub use broker::Broker;
pub use command::{Command, CommandArg, CommandId, CommandResult, CommandSpec, SubmitError};
pub use config::{BrokerConfig, ConfigError};
pub use reaper::Reaper;
pub use session::{SessionSelector, SessionStore};
pub use wait::{await_result, WaitOutcome};
