// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

mod application;
mod counter;
mod loader;
mod manifest;
mod validation;

pub mod consts;

pub use application::{Application, INPUT_PRODUCER};
pub use counter::{AtomicCounter, ProcessCounter, Sequence};
pub use loader::{load_and_validate_config, load_config, WorkerConfig};
pub use manifest::{Manifest, TaskManifest};
pub use validation::{check_consumes, check_emits, check_name};
