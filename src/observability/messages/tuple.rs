// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Message types for per-tuple outcomes.

use crate::observability::messages::StructuredLog;
use std::fmt::{Display, Formatter};
use tracing::Span;

/// Tuple processed and acknowledged.
///
/// # Log Level
/// `debug!` - Emitted once per tuple
pub struct TupleProcessed<'a> {
    pub task: &'a str,
    pub emitted: usize,
    pub duration: std::time::Duration,
}

impl Display for TupleProcessed<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Task '{}' processed tuple: emitted={}, duration={:?}",
            self.task, self.emitted, self.duration
        )
    }
}

impl StructuredLog for TupleProcessed<'_> {
    fn log(&self) {
        tracing::debug!(
            task = self.task,
            emitted = self.emitted,
            duration_us = self.duration.as_micros() as u64,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::debug_span!("tuple", span_name = name, task = self.task)
    }
}

/// Task callback failed for one tuple.
///
/// # Log Level
/// `warn!` - Recovered locally, reported to the parent
pub struct TupleFailed<'a> {
    pub task: &'a str,
    pub kind: &'a str,
    pub error: &'a str,
}

impl Display for TupleFailed<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "{} '{}' failed on tuple: {}", self.kind, self.task, self.error)
    }
}

impl StructuredLog for TupleFailed<'_> {
    fn log(&self) {
        tracing::warn!(task = self.task, kind = self.kind, error = self.error, "{}", self);
    }

    fn span(&self, name: &str) -> Span {
        tracing::warn_span!("tuple_failed", span_name = name, task = self.task)
    }
}
