// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Error types for the controller channel.
//!
//! The run loop never inspects error messages; it matches on the variant. Parent
//! death and timeouts are fatal, `Shutdown` is the clean exit, and a `Decode` error
//! only ever affects the message that failed to decode. An `InvalidTuple` leaves its
//! id in flight so the worker can answer it with `fail`.

use std::time::Duration;
use thiserror::Error;

use crate::proto::TupleId;

/// Everything that can go wrong talking to the parent process.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum ChannelError {
    /// The parent asked the worker to stop.
    #[error("shutdown requested by parent")]
    Shutdown,

    /// The parent went away (EOF on input or broken pipe on output).
    #[error("parent process is gone: {reason}")]
    ParentDead {
        /// What was observed on the channel.
        reason: String,
    },

    /// No message arrived within the configured read timeout.
    #[error("no message from parent within {0:?}")]
    Timeout(Duration),

    /// A message could not be decoded.
    #[error("malformed message: {0}")]
    Decode(String),

    /// A tuple with a readable id whose body could not be decoded.
    #[error("malformed tuple {id}: {reason}")]
    InvalidTuple {
        /// Id the parent assigned; it is now the tuple in flight.
        id: TupleId,
        /// What failed to decode.
        reason: String,
    },

    /// A message arrived out of order (e.g. no handshake).
    #[error("protocol violation: {0}")]
    Protocol(String),

    /// A message exceeded the configured size limit.
    #[error("message of {size} bytes exceeds the {limit} byte limit")]
    MessageTooLarge {
        /// Observed size.
        size: usize,
        /// Configured limit.
        limit: usize,
    },

    /// Any other I/O failure.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Outbound message serialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl ChannelError {
    /// Builds a [`ChannelError::ParentDead`] with the given reason.
    pub fn parent_dead(reason: impl Into<String>) -> Self {
        ChannelError::ParentDead {
            reason: reason.into(),
        }
    }

    /// Maps an I/O error, promoting a broken pipe to parent death.
    pub fn from_io(error: std::io::Error) -> Self {
        match error.kind() {
            std::io::ErrorKind::BrokenPipe
            | std::io::ErrorKind::ConnectionReset
            | std::io::ErrorKind::UnexpectedEof => ChannelError::parent_dead(error.to_string()),
            _ => ChannelError::Io(error),
        }
    }

    /// Whether the parent is unreachable and the worker has to terminate.
    pub fn is_parent_dead(&self) -> bool {
        matches!(self, ChannelError::ParentDead { .. } | ChannelError::Timeout(_))
    }

    /// Returns a short stable label (snake_case) for use in logs.
    pub fn as_label(&self) -> &'static str {
        match self {
            ChannelError::Shutdown => "channel_shutdown",
            ChannelError::ParentDead { .. } => "channel_parent_dead",
            ChannelError::Timeout(_) => "channel_timeout",
            ChannelError::Decode(_) => "channel_decode",
            ChannelError::InvalidTuple { .. } => "channel_invalid_tuple",
            ChannelError::Protocol(_) => "channel_protocol",
            ChannelError::MessageTooLarge { .. } => "channel_message_too_large",
            ChannelError::Io(_) => "channel_io",
            ChannelError::Json(_) => "channel_json",
        }
    }
}
