// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Observability module for structured logging and tracing.
//!
//! Message types live in [`messages`], one submodule per subsystem, each implementing
//! `Display` plus [`messages::StructuredLog`] so the same event always carries the
//! same fields.
//!
//! Workers talk to their parent over stdout, so every subscriber installed here
//! writes to stderr.
//!
//! # Usage
//!
//! ```rust
//! use the_spigot::observability::messages::worker::WorkerStarted;
//! use the_spigot::observability::messages::StructuredLog;
//!
//! WorkerStarted {
//!     task: "positive",
//!     kind: "filter",
//!     pid: std::process::id(),
//! }
//! .log();
//! ```

pub mod messages;

use tracing_subscriber::EnvFilter;

/// Installs a stderr `fmt` subscriber.
///
/// `RUST_LOG` wins over `fallback_filter`. Returns `false` if a global subscriber
/// was already installed.
pub fn init_tracing(fallback_filter: &str) -> bool {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback_filter));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .try_init()
        .is_ok()
}
