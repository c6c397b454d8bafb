// src/exec/mod.rs

//! Process execution layer.
//!
//! This module is responsible for actually running the commands defined in
//! the catalog, using `tokio::process::Command`, and reporting each outcome
//! as a [`Harvest`].
//!
//! - [`expand`] prepares the command line (environment expansion and
//!   whitespace splitting).
//! - [`reaper`] runs one process against a deadline and classifies the
//!   outcome.
//! - [`backend`] provides the `ExecutorBackend` trait and the concrete
//!   `ReaperBackend` used in production, which tests can replace with a fake
//!   implementation.

pub mod backend;
pub mod expand;
pub mod reaper;

pub use backend::{ExecutorBackend, ReaperBackend};
pub use reaper::{Harvest, NO_PID, SPAWN_FAILURE_CODE, TIMEOUT_CODE, reap};
