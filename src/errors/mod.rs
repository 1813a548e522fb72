// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

mod channel;
mod config;
mod settings;
mod worker;

pub use channel::ChannelError;
pub use config::ValidationError;
pub use settings::ConfigError;
pub use worker::WorkerError;
