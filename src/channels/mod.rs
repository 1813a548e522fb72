// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

pub mod json_lines;
pub mod scripted;

pub use json_lines::JsonLinesChannel;
pub use scripted::{ChannelCall, ScriptedChannel};
