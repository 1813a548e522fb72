// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Message types for application assembly.
//!
//! * Task registration
//! * Duplicate name rejection
//! * Stream conflicts and unknown streams

use crate::observability::messages::StructuredLog;
use std::fmt::{Display, Formatter};
use tracing::Span;

/// Task registered with an application.
///
/// # Log Level
/// `debug!` - Assembly detail
pub struct TaskRegistered<'a> {
    pub application: &'a str,
    pub task: &'a str,
    pub kind: &'a str,
    pub emits: &'a [String],
    pub parallelism: u32,
}

impl Display for TaskRegistered<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Registered {} '{}' in '{}': emits=[{}], parallelism={}",
            self.kind,
            self.task,
            self.application,
            self.emits.join(", "),
            self.parallelism
        )
    }
}

impl StructuredLog for TaskRegistered<'_> {
    fn log(&self) {
        tracing::debug!(
            application = self.application,
            task = self.task,
            kind = self.kind,
            emits = self.emits.join(","),
            parallelism = self.parallelism,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::debug_span!(
            "task_registered",
            span_name = name,
            application = self.application,
            task = self.task,
            kind = self.kind,
        )
    }
}

/// Duplicate task name rejected.
///
/// # Log Level
/// `error!` - Wiring mistake
///
/// # Example
/// ```
/// use the_spigot::observability::messages::validation::DuplicateNameRejected;
///
/// let msg = DuplicateNameRejected {
///     name: "positive",
///     kind: "each",
///     existing_kind: "filter",
/// };
///
/// assert!(msg.to_string().contains("positive"));
/// ```
pub struct DuplicateNameRejected<'a> {
    pub name: &'a str,
    pub kind: &'a str,
    pub existing_kind: &'a str,
}

impl Display for DuplicateNameRejected<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Duplicate name '{}': {} collides with existing {}",
            self.name, self.kind, self.existing_kind
        )
    }
}

impl StructuredLog for DuplicateNameRejected<'_> {
    fn log(&self) {
        tracing::error!(
            name = self.name,
            kind = self.kind,
            existing_kind = self.existing_kind,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::error_span!(
            "duplicate_name",
            span_name = name,
            name = self.name,
            kind = self.kind,
        )
    }
}

/// Emitted stream already has a producer.
///
/// # Log Level
/// `error!` - Wiring mistake
pub struct StreamConflictRejected<'a> {
    pub task: &'a str,
    pub kind: &'a str,
    pub stream: &'a str,
    pub producer: &'a str,
}

impl Display for StreamConflictRejected<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "{} '{}' cannot emit '{}': already produced by '{}'",
            self.kind, self.task, self.stream, self.producer
        )
    }
}

impl StructuredLog for StreamConflictRejected<'_> {
    fn log(&self) {
        tracing::error!(
            task = self.task,
            kind = self.kind,
            stream = self.stream,
            producer = self.producer,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::error_span!(
            "stream_conflict",
            span_name = name,
            task = self.task,
            stream = self.stream,
        )
    }
}

/// Consumed stream is not registered.
///
/// # Log Level
/// `error!` - Wiring mistake
pub struct UnknownStreamRejected<'a> {
    pub component: &'a str,
    pub stream: &'a str,
}

impl Display for UnknownStreamRejected<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Component '{}' consumes unknown stream '{}'",
            self.component, self.stream
        )
    }
}

impl StructuredLog for UnknownStreamRejected<'_> {
    fn log(&self) {
        tracing::error!(component = self.component, stream = self.stream, "{}", self);
    }

    fn span(&self, name: &str) -> Span {
        tracing::error_span!(
            "unknown_stream",
            span_name = name,
            component = self.component,
            stream = self.stream,
        )
    }
}
