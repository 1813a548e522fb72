// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Message types for the control channel.

use crate::observability::messages::StructuredLog;
use std::fmt::{Display, Formatter};
use std::path::Path;
use tracing::Span;

/// Handshake completed; pid file written.
///
/// # Log Level
/// `debug!` - Session setup detail
pub struct HandshakeCompleted<'a> {
    pub pid_dir: &'a Path,
    pub pid: u32,
}

impl Display for HandshakeCompleted<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Handshake completed: pid {} registered in {}",
            self.pid,
            self.pid_dir.display()
        )
    }
}

impl StructuredLog for HandshakeCompleted<'_> {
    fn log(&self) {
        tracing::debug!(pid = self.pid, pid_dir = %self.pid_dir.display(), "{}", self);
    }

    fn span(&self, name: &str) -> Span {
        tracing::debug_span!("handshake", span_name = name, pid = self.pid)
    }
}

/// A message from the parent could not be decoded and was skipped.
///
/// # Log Level
/// `warn!` - Parent sent something unexpected
pub struct MalformedMessageSkipped<'a> {
    pub task: &'a str,
    pub reason: &'a str,
}

impl Display for MalformedMessageSkipped<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Worker '{}' skipped malformed message: {}",
            self.task, self.reason
        )
    }
}

impl StructuredLog for MalformedMessageSkipped<'_> {
    fn log(&self) {
        tracing::warn!(task = self.task, reason = self.reason, "{}", self);
    }

    fn span(&self, name: &str) -> Span {
        tracing::warn_span!("malformed_message", span_name = name, task = self.task)
    }
}

/// A non-data control message was skipped.
///
/// # Log Level
/// `trace!` - Routine
pub struct ControlMessageSkipped<'a> {
    pub task: &'a str,
    pub message_type: &'a str,
}

impl Display for ControlMessageSkipped<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Worker '{}' ignored control message '{}'",
            self.task, self.message_type
        )
    }
}

impl StructuredLog for ControlMessageSkipped<'_> {
    fn log(&self) {
        tracing::trace!(task = self.task, message_type = self.message_type, "{}", self);
    }

    fn span(&self, name: &str) -> Span {
        tracing::trace_span!("control_message", span_name = name, task = self.task)
    }
}

/// The channel could not release its session resources after a clean shutdown.
///
/// # Log Level
/// `warn!` - Leftover state for the orchestrator to clean up
pub struct ChannelCloseFailed<'a> {
    pub task: &'a str,
    pub error: &'a dyn std::error::Error,
}

impl Display for ChannelCloseFailed<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Worker '{}' could not close its channel: {}",
            self.task, self.error
        )
    }
}

impl StructuredLog for ChannelCloseFailed<'_> {
    fn log(&self) {
        tracing::warn!(task = self.task, error = %self.error, "{}", self);
    }

    fn span(&self, name: &str) -> Span {
        tracing::warn_span!("channel_close", span_name = name, task = self.task)
    }
}
