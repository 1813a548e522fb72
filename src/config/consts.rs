/// Default upper bound for a single control-channel message (1 MiB)
pub const DEFAULT_MAX_MESSAGE_BYTES: usize = 1024 * 1024;
/// Smallest accepted message limit (1 KiB)
pub const MIN_MAX_MESSAGE_BYTES: usize = 1024;
/// Log filter used when neither `RUST_LOG` nor the config sets one
pub const DEFAULT_LOG_FILTER: &str = "info";
/// Parallelism hint for tasks that do not set one
pub const DEFAULT_PARALLELISM: u32 = 1;
/// Prefix of synthesized stream names
pub const STREAM_NAME_PREFIX: &str = "stream";
