// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use thiserror::Error;

use super::ChannelError;

/// Terminal errors of a worker run loop.
///
/// Per-tuple failures never show up here; they are reported to the parent with
/// `fail` and the loop keeps going.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum WorkerError {
    /// The parent process is unreachable.
    #[error("worker '{task}' lost its parent: {source}")]
    ParentDead {
        task: String,
        #[source]
        source: ChannelError,
    },

    /// Any other transport failure outside a tuple callback.
    #[error("worker '{task}' channel failure: {source}")]
    Channel {
        task: String,
        #[source]
        source: ChannelError,
    },

    /// The prepare callback failed.
    #[error("worker '{task}' failed to prepare: {message}")]
    Prepare { task: String, message: String },

    /// `run` was called a second time on the same runtime.
    #[error("worker '{task}' has already run")]
    AlreadyRun { task: String },

    /// No task with the requested name is registered.
    #[error("no task named '{0}' in this application")]
    UnknownTask(String),
}

impl WorkerError {
    /// Wraps a channel error, keeping parent death distinguishable.
    pub fn from_channel(task: &str, source: ChannelError) -> Self {
        if source.is_parent_dead() {
            WorkerError::ParentDead {
                task: task.to_string(),
                source,
            }
        } else {
            WorkerError::Channel {
                task: task.to_string(),
                source,
            }
        }
    }

    /// Returns a short stable label (snake_case) for use in logs.
    pub fn as_label(&self) -> &'static str {
        match self {
            WorkerError::ParentDead { .. } => "worker_parent_dead",
            WorkerError::Channel { .. } => "worker_channel",
            WorkerError::Prepare { .. } => "worker_prepare",
            WorkerError::AlreadyRun { .. } => "worker_already_run",
            WorkerError::UnknownTask(_) => "worker_unknown_task",
        }
    }
}
