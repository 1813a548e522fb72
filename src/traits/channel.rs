// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use async_trait::async_trait;
use std::path::PathBuf;

use crate::errors::ChannelError;
use crate::proto::{RawMessage, Tuple};

/// The transport between a worker and the parent process that spawned it.
///
/// A channel tracks the tuple currently in flight: `get_tuple` makes a tuple current,
/// and exactly one of `done` or `fail` releases it.
///
/// `read` reports a shutdown request as [`ChannelError::Shutdown`] and an unreachable
/// parent as [`ChannelError::ParentDead`]; the run loop matches on those variants.
#[async_trait]
pub trait ControllerChannel: Send {
    /// Working directory assigned by the parent, created if absent.
    async fn get_pid_dir(&mut self) -> Result<PathBuf, ChannelError>;

    /// Next message from the parent. `Ok(None)` is a heartbeat.
    async fn read(&mut self) -> Result<Option<RawMessage>, ChannelError>;

    /// Decodes a message into a data tuple, `Ok(None)` for control messages.
    ///
    /// [`ChannelError::InvalidTuple`] still makes its id current; answer it with `fail`.
    fn get_tuple(&mut self, raw: RawMessage) -> Result<Option<Tuple>, ChannelError>;

    /// Stream the current tuple arrived on, when the parent says.
    fn source_stream(&self) -> Option<&str>;

    /// Sends a tuple downstream on `stream`, anchored to the current tuple.
    async fn emit(&mut self, stream: &str, tuple: &Tuple) -> Result<(), ChannelError>;

    /// The current tuple was processed successfully.
    async fn done(&mut self) -> Result<(), ChannelError>;

    /// The current tuple failed; replaces `done` for that tuple.
    async fn fail(&mut self, message: &str) -> Result<(), ChannelError>;

    /// Out-of-band diagnostic for the parent.
    async fn log(&mut self, message: &str) -> Result<(), ChannelError>;

    /// Releases what the session left behind after a clean shutdown.
    async fn close(&mut self) -> Result<(), ChannelError> {
        Ok(())
    }
}
