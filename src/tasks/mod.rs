// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

mod context;
mod task;

pub use context::TaskContext;
pub use task::{Emits, ExecuteFn, KeepFn, Kind, PrepareFn, Task, TaskBuilder, TaskKind};
