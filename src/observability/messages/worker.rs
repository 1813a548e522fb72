// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Message types for the worker run loop lifecycle.
//!
//! * Worker start and prepare
//! * Clean shutdown with final statistics
//! * Fatal exit (parent gone, transport failure)

use crate::observability::messages::StructuredLog;
use std::fmt::{Display, Formatter};
use std::path::Path;
use tracing::Span;

/// Worker entered its run loop.
///
/// # Log Level
/// `info!` - Important operational event
///
/// # Example
/// ```
/// use the_spigot::observability::messages::worker::WorkerStarted;
///
/// let msg = WorkerStarted {
///     task: "positive",
///     kind: "filter",
///     pid: 4242,
/// };
///
/// assert_eq!(msg.to_string(), "Worker for filter 'positive' started (pid 4242)");
/// ```
pub struct WorkerStarted<'a> {
    pub task: &'a str,
    pub kind: &'a str,
    pub pid: u32,
}

impl Display for WorkerStarted<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Worker for {} '{}' started (pid {})",
            self.kind, self.task, self.pid
        )
    }
}

impl StructuredLog for WorkerStarted<'_> {
    fn log(&self) {
        tracing::info!(task = self.task, kind = self.kind, pid = self.pid, "{}", self);
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!(
            "worker",
            span_name = name,
            task = self.task,
            kind = self.kind,
            pid = self.pid,
        )
    }
}

/// Worker finished preparing and is ready for tuples.
///
/// # Log Level
/// `info!` - Important operational event
pub struct WorkerPrepared<'a> {
    pub task: &'a str,
    pub pid_dir: &'a Path,
    pub ran_prepare: bool,
}

impl Display for WorkerPrepared<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Worker '{}' ready: pid_dir={}, prepare={}",
            self.task,
            self.pid_dir.display(),
            if self.ran_prepare { "ran" } else { "none" }
        )
    }
}

impl StructuredLog for WorkerPrepared<'_> {
    fn log(&self) {
        tracing::info!(
            task = self.task,
            pid_dir = %self.pid_dir.display(),
            ran_prepare = self.ran_prepare,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!(
            "worker_prepared",
            span_name = name,
            task = self.task,
            pid_dir = %self.pid_dir.display(),
        )
    }
}

/// Worker stopped at the parent's request.
///
/// # Log Level
/// `info!` - Important operational event
pub struct WorkerStopped<'a> {
    pub task: &'a str,
    pub tuples: u64,
    pub failed: u64,
    pub emitted: u64,
    pub duration: std::time::Duration,
}

impl Display for WorkerStopped<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Worker '{}' stopped after {:?}: tuples={}, failed={}, emitted={}",
            self.task, self.duration, self.tuples, self.failed, self.emitted
        )
    }
}

impl StructuredLog for WorkerStopped<'_> {
    fn log(&self) {
        tracing::info!(
            task = self.task,
            tuples = self.tuples,
            failed = self.failed,
            emitted = self.emitted,
            duration_ms = self.duration.as_millis() as u64,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!(
            "worker_stopped",
            span_name = name,
            task = self.task,
            tuples = self.tuples,
        )
    }
}

/// Worker is terminating on an unrecoverable error.
///
/// # Log Level
/// `error!` - Failure requiring attention
///
/// # Example
/// ```
/// use the_spigot::observability::messages::worker::WorkerFatal;
///
/// let error = std::io::Error::new(std::io::ErrorKind::BrokenPipe, "pipe closed");
/// let msg = WorkerFatal {
///     task: "positive",
///     label: "worker_parent_dead",
///     error: &error,
/// };
///
/// assert!(msg.to_string().contains("pipe closed"));
/// ```
pub struct WorkerFatal<'a> {
    pub task: &'a str,
    pub label: &'a str,
    pub error: &'a dyn std::error::Error,
}

impl Display for WorkerFatal<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Worker '{}' terminating: {}", self.task, self.error)
    }
}

impl StructuredLog for WorkerFatal<'_> {
    fn log(&self) {
        tracing::error!(
            task = self.task,
            label = self.label,
            error = %self.error,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::error_span!(
            "worker_fatal",
            span_name = name,
            task = self.task,
            label = self.label,
        )
    }
}
