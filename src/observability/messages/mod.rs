// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Centralized message types for structured logging.
//!
//! * `worker` - run loop lifecycle (start, prepare, stop, fatal exit)
//! * `tuple` - per-tuple outcomes
//! * `channel` - control channel events (handshake, malformed input)
//! * `validation` - application assembly
//!
//! # Usage Pattern
//!
//! ```rust
//! use the_spigot::observability::messages::tuple::TupleFailed;
//! use the_spigot::observability::messages::StructuredLog;
//!
//! let msg = TupleFailed {
//!     task: "positive",
//!     kind: "filter",
//!     error: "predicate failed",
//! };
//!
//! msg.log();
//! ```

use tracing::Span;

pub mod channel;
pub mod tuple;
pub mod validation;
pub mod worker;

/// A log event with a fixed set of structured fields.
pub trait StructuredLog {
    /// Emits the event at its documented level.
    fn log(&self);

    /// A span carrying the same fields.
    fn span(&self, name: &str) -> Span;
}
