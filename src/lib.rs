// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

pub mod channels;      // controller channel implementations
pub mod config;        // application assembly + worker config
pub mod engine;        // worker run loop
pub mod errors;        // error handling
pub mod observability;
pub mod proto;         // wire types
pub mod tasks;         // filter / each / component
pub mod traits;        // channel abstraction

#[doc(hidden)]
pub use serde_json as __serde_json;
