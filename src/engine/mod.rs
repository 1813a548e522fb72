pub mod worker;

pub use worker::{WorkerRuntime, WorkerState, WorkerStats};
