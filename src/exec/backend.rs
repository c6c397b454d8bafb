// src/exec/backend.rs

//! Pluggable executor backend abstraction.
//!
//! The dispatcher talks to an `ExecutorBackend` instead of calling
//! [`reap`] directly. Production uses [`ReaperBackend`]; tests can provide a
//! backend that records which commands were requested and returns canned
//! results without spawning processes.

use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use super::reaper::{Harvest, reap};

/// Trait abstracting how a command line is executed.
pub trait ExecutorBackend: Send + Sync {
    /// Run `cmdline` with the given timeout and report the outcome.
    fn run<'a>(
        &'a self,
        cmdline: &'a str,
        timeout: Duration,
    ) -> Pin<Box<dyn Future<Output = Harvest> + Send + 'a>>;
}

/// Real executor backend: spawns an OS process per call.
#[derive(Debug, Clone, Copy, Default)]
pub struct ReaperBackend;

impl ExecutorBackend for ReaperBackend {
    fn run<'a>(
        &'a self,
        cmdline: &'a str,
        timeout: Duration,
    ) -> Pin<Box<dyn Future<Output = Harvest> + Send + 'a>> {
        Box::pin(reap(cmdline, timeout))
    }
}
