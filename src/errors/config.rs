// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::fmt;

/// Errors raised while an application is being assembled, before any worker runs.
#[derive(Debug, Clone, PartialEq)]
pub enum ValidationError {
    /// Two tasks were registered under the same name
    DuplicateName {
        /// The name that was registered twice
        name: String,
        /// Kind of the task being added
        kind: String,
        /// Kind of the task that already owns the name
        existing_kind: String,
    },
    /// A component consumes a stream no one produces
    UnknownStream {
        /// The component declaring the consumption
        component: String,
        /// The stream that could not be resolved
        stream: String,
    },
    /// A task emits on a stream that is already produced elsewhere
    StreamAlreadyDeclared {
        /// The task declaring the stream
        task: String,
        /// The conflicting stream name
        stream: String,
        /// The task (or input declaration) that already produces it
        producer: String,
    },
    /// A task declared an empty emits list
    EmptyEmits {
        /// The offending task
        task: String,
    },
    /// Parallelism hints must be positive
    InvalidParallelism {
        /// The offending task
        task: String,
        /// The rejected value
        parallelism: u32,
    },
}

impl ValidationError {
    /// Short snake_case label for logs.
    pub fn as_label(&self) -> &'static str {
        match self {
            ValidationError::DuplicateName { .. } => "duplicate_name",
            ValidationError::UnknownStream { .. } => "unknown_stream",
            ValidationError::StreamAlreadyDeclared { .. } => "stream_already_declared",
            ValidationError::EmptyEmits { .. } => "empty_emits",
            ValidationError::InvalidParallelism { .. } => "invalid_parallelism",
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationError::DuplicateName {
                name,
                kind,
                existing_kind,
            } => {
                write!(
                    f,
                    "Cannot register {} '{}': name is already used by a {}",
                    kind, name, existing_kind
                )
            }
            ValidationError::UnknownStream { component, stream } => {
                write!(
                    f,
                    "Component '{}' consumes stream '{}' which is not produced by any task",
                    component, stream
                )
            }
            ValidationError::StreamAlreadyDeclared {
                task,
                stream,
                producer,
            } => {
                write!(
                    f,
                    "Task '{}' emits stream '{}' which is already produced by '{}'",
                    task, stream, producer
                )
            }
            ValidationError::EmptyEmits { task } => {
                write!(f, "Task '{}' declares an empty emits list", task)
            }
            ValidationError::InvalidParallelism { task, parallelism } => {
                write!(
                    f,
                    "Task '{}' has parallelism {}; parallelism must be at least 1",
                    task, parallelism
                )
            }
        }
    }
}

impl std::error::Error for ValidationError {}
