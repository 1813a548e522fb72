// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! The worker run loop: read, process, emit, acknowledge.
//!
//! # States
//!
//! ```text
//! Init ──run()──▶ Preparing ──▶ Running ──shutdown──▶ Stopped
//!                     │            │
//!                     └────────────┴──parent gone / transport error──▶ Fatal
//! ```
//!
//! * **Preparing**: `get_pid_dir()` once, then the task's `prepare` callback once.
//! * **Running**: one tuple at a time. Heartbeats and control messages are skipped
//!   without any acknowledgement. Every decoded tuple gets exactly one of `done` or
//!   `fail` before the next `read`.
//!
//! # Failure handling
//!
//! The loop matches on [`ChannelError`] variants rather than catching everything:
//!
//! * `Shutdown` from `read` is the only clean exit.
//! * `ParentDead` / `Timeout` end the worker with [`WorkerError::ParentDead`]; the
//!   tuple in flight (if any) is never acknowledged.
//! * A callback error or panic fails that tuple only. Emits buffered by the callback
//!   are discarded and the loop reads the next message.
//! * A line that cannot be decoded, or a tuple without a readable id, is logged to
//!   the parent and skipped. A tuple whose id is readable but whose values are not
//!   is answered with `fail`.
//!
//! After a clean shutdown the channel is closed, which removes the pid file.

use std::path::Path;
use std::sync::Arc;
use std::time::Instant;
use tracing::Instrument;

use crate::errors::{ChannelError, WorkerError};
use crate::observability::messages::channel::{
    ChannelCloseFailed, ControlMessageSkipped, MalformedMessageSkipped,
};
use crate::observability::messages::tuple::{TupleFailed, TupleProcessed};
use crate::observability::messages::worker::{
    WorkerFatal, WorkerPrepared, WorkerStarted, WorkerStopped,
};
use crate::observability::messages::StructuredLog;
use crate::proto::Tuple;
use crate::tasks::{Task, TaskContext};
use crate::traits::ControllerChannel;

/// Lifecycle state of a [`WorkerRuntime`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkerState {
    Init,
    Preparing,
    Running,
    Stopped,
    Fatal,
}

/// Counters kept by the run loop.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WorkerStats {
    /// Tuples decoded and handed to the task.
    pub tuples: u64,
    /// Tuples acknowledged with `done`.
    pub done: u64,
    /// Tuples reported with `fail`.
    pub failed: u64,
    /// Tuples sent downstream.
    pub emitted: u64,
    pub heartbeats: u64,
    /// Control and malformed messages skipped.
    pub skipped: u64,
}

/// Runs one task against one controller channel.
pub struct WorkerRuntime<C> {
    task: Arc<Task>,
    channel: C,
    state: WorkerState,
    stats: WorkerStats,
}

impl<C: ControllerChannel> WorkerRuntime<C> {
    pub fn new(task: Arc<Task>, channel: C) -> Self {
        Self {
            task,
            channel,
            state: WorkerState::Init,
            stats: WorkerStats::default(),
        }
    }

    pub fn state(&self) -> WorkerState {
        self.state
    }

    pub fn stats(&self) -> &WorkerStats {
        &self.stats
    }

    pub fn task(&self) -> &Task {
        &self.task
    }

    pub fn channel(&self) -> &C {
        &self.channel
    }

    pub fn into_channel(self) -> C {
        self.channel
    }

    /// Runs until the parent asks for shutdown or the worker hits a fatal error.
    ///
    /// Can be called once; later calls return [`WorkerError::AlreadyRun`].
    pub async fn run(&mut self) -> Result<WorkerStats, WorkerError> {
        if self.state != WorkerState::Init {
            return Err(WorkerError::AlreadyRun {
                task: self.task.name().to_string(),
            });
        }

        let started = Instant::now();
        let start_msg = WorkerStarted {
            task: self.task.name(),
            kind: self.task.kind().as_str(),
            pid: std::process::id(),
        };
        let span = start_msg.span("worker_run");
        start_msg.log();

        match self.run_loop().instrument(span).await {
            Ok(()) => {
                self.state = WorkerState::Stopped;
                WorkerStopped {
                    task: self.task.name(),
                    tuples: self.stats.tuples,
                    failed: self.stats.failed,
                    emitted: self.stats.emitted,
                    duration: started.elapsed(),
                }
                .log();
                Ok(self.stats.clone())
            }
            Err(error) => {
                self.state = WorkerState::Fatal;
                WorkerFatal {
                    task: self.task.name(),
                    label: error.as_label(),
                    error: &error,
                }
                .log();
                Err(error)
            }
        }
    }

    async fn run_loop(&mut self) -> Result<(), WorkerError> {
        self.session().await?;
        if let Err(error) = self.channel.close().await {
            ChannelCloseFailed {
                task: self.task.name(),
                error: &error,
            }
            .log();
        }
        Ok(())
    }

    async fn session(&mut self) -> Result<(), WorkerError> {
        self.state = WorkerState::Preparing;
        let pid_dir = match self.channel.get_pid_dir().await {
            Ok(dir) => dir,
            Err(ChannelError::Shutdown) => return Ok(()),
            Err(e) => return Err(self.fatal(e)),
        };
        self.prepare(&pid_dir).await?;

        self.state = WorkerState::Running;
        loop {
            let raw = match self.channel.read().await {
                Ok(Some(raw)) => raw,
                Ok(None) => {
                    self.stats.heartbeats += 1;
                    continue;
                }
                Err(ChannelError::Shutdown) => return Ok(()),
                Err(ChannelError::Decode(reason)) => {
                    self.skip_malformed(&reason).await?;
                    continue;
                }
                Err(e) => return Err(self.fatal(e)),
            };

            let message_type = raw.message_type().unwrap_or("untyped").to_string();
            let tuple = match self.channel.get_tuple(raw) {
                Ok(Some(tuple)) => tuple,
                Ok(None) => {
                    ControlMessageSkipped {
                        task: self.task.name(),
                        message_type: &message_type,
                    }
                    .log();
                    self.stats.skipped += 1;
                    continue;
                }
                Err(ChannelError::Decode(reason)) => {
                    self.skip_malformed(&reason).await?;
                    continue;
                }
                Err(ChannelError::InvalidTuple { reason, .. }) => {
                    self.fail_malformed(&reason).await?;
                    continue;
                }
                Err(e) => return Err(self.fatal(e)),
            };

            self.process(&pid_dir, tuple).await?;
        }
    }

    async fn prepare(&mut self, pid_dir: &Path) -> Result<(), WorkerError> {
        let task = Arc::clone(&self.task);
        let emits = task.emits();
        let mut ctx = TaskContext::new(task.name(), emits, pid_dir);
        let result = task.prepare(&mut ctx);

        let (_, logs) = ctx.into_parts();
        self.forward_logs(logs).await?;

        result.map_err(|message| WorkerError::Prepare {
            task: task.name().to_string(),
            message,
        })?;

        WorkerPrepared {
            task: task.name(),
            pid_dir,
            ran_prepare: task.has_prepare(),
        }
        .log();
        Ok(())
    }

    /// Processes one tuple and releases it with exactly one of `done` or `fail`.
    async fn process(&mut self, pid_dir: &Path, tuple: Tuple) -> Result<(), WorkerError> {
        let task = Arc::clone(&self.task);
        let started = Instant::now();
        self.stats.tuples += 1;

        let source = self.channel.source_stream().map(str::to_string);
        let mut ctx =
            TaskContext::new(task.name(), task.emits(), pid_dir).with_source(source.as_deref());
        let result = task.invoke(&mut ctx, &tuple);
        let (emitted, logs) = ctx.into_parts();
        drop(tuple);

        self.forward_logs(logs).await?;

        match result {
            Ok(()) => {
                let count = emitted.len();
                for (stream, out) in emitted {
                    self.channel
                        .emit(&stream, &out)
                        .await
                        .map_err(|e| self.fatal(e))?;
                    self.stats.emitted += 1;
                }
                self.channel.done().await.map_err(|e| self.fatal(e))?;
                self.stats.done += 1;

                TupleProcessed {
                    task: task.name(),
                    emitted: count,
                    duration: started.elapsed(),
                }
                .log();
            }
            Err(error) => {
                TupleFailed {
                    task: task.name(),
                    kind: task.kind().as_str(),
                    error: &error,
                }
                .log();

                let message = format!("Exception in {}: {}", task.kind(), error);
                self.channel
                    .fail(&message)
                    .await
                    .map_err(|e| self.fatal(e))?;
                self.stats.failed += 1;
            }
        }
        Ok(())
    }

    /// Answers a tuple whose id decoded but whose values did not.
    async fn fail_malformed(&mut self, reason: &str) -> Result<(), WorkerError> {
        self.stats.tuples += 1;
        TupleFailed {
            task: self.task.name(),
            kind: self.task.kind().as_str(),
            error: reason,
        }
        .log();

        let message = format!("Malformed tuple for {}: {}", self.task.name(), reason);
        self.channel
            .fail(&message)
            .await
            .map_err(|e| self.fatal(e))?;
        self.stats.failed += 1;
        Ok(())
    }

    async fn skip_malformed(&mut self, reason: &str) -> Result<(), WorkerError> {
        MalformedMessageSkipped {
            task: self.task.name(),
            reason,
        }
        .log();
        self.stats.skipped += 1;
        let line = format!("Skipped malformed message in {}: {}", self.task.name(), reason);
        self.channel.log(&line).await.map_err(|e| self.fatal(e))
    }

    async fn forward_logs(&mut self, logs: Vec<String>) -> Result<(), WorkerError> {
        for line in logs {
            self.channel.log(&line).await.map_err(|e| self.fatal(e))?;
        }
        Ok(())
    }

    fn fatal(&self, error: ChannelError) -> WorkerError {
        WorkerError::from_channel(self.task.name(), error)
    }
}
