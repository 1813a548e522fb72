// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use anyhow::bail;
use std::path::Path;

use crate::proto::Tuple;

/// Handle given to user callbacks while one tuple (or `prepare`) is being processed.
///
/// Emits and log lines are buffered. The worker forwards log lines whatever the
/// outcome, but forwards emits only when the callback succeeds, so a failed tuple
/// never leaves partial output behind.
#[derive(Debug)]
pub struct TaskContext<'a> {
    task: &'a str,
    emits: &'a [String],
    pid_dir: &'a Path,
    source: Option<&'a str>,
    emitted: Vec<(String, Tuple)>,
    logs: Vec<String>,
}

impl<'a> TaskContext<'a> {
    /// `emits` must be non-empty; its first entry is the default stream.
    pub fn new(task: &'a str, emits: &'a [String], pid_dir: &'a Path) -> Self {
        Self {
            task,
            emits,
            pid_dir,
            source: None,
            emitted: Vec::new(),
            logs: Vec::new(),
        }
    }

    /// Records the stream the tuple arrived on.
    pub fn with_source(mut self, source: Option<&'a str>) -> Self {
        self.source = source;
        self
    }

    /// Stream the current tuple arrived on, if the parent named one. Components
    /// consuming several streams use this to tell their inputs apart.
    pub fn source_stream(&self) -> Option<&str> {
        self.source
    }

    pub fn task_name(&self) -> &str {
        self.task
    }

    pub fn pid_dir(&self) -> &Path {
        self.pid_dir
    }

    pub fn default_stream(&self) -> &str {
        self.emits.first().map(String::as_str).unwrap_or_default()
    }

    /// Emits on the default stream.
    pub fn emit(&mut self, tuple: impl Into<Tuple>) {
        let stream = self.default_stream().to_string();
        self.emitted.push((stream, tuple.into()));
    }

    /// Emits on a named stream; the stream must be one the task declared.
    pub fn emit_to(&mut self, stream: &str, tuple: impl Into<Tuple>) -> anyhow::Result<()> {
        if !self.emits.iter().any(|s| s == stream) {
            bail!(
                "task '{}' emitted on undeclared stream '{}' (declared: {})",
                self.task,
                stream,
                self.emits.join(", ")
            );
        }
        self.emitted.push((stream.to_string(), tuple.into()));
        Ok(())
    }

    /// Queues a diagnostic line for the parent.
    pub fn log(&mut self, message: impl Into<String>) {
        self.logs.push(message.into());
    }

    pub fn emitted(&self) -> &[(String, Tuple)] {
        &self.emitted
    }

    /// Splits the context into its buffered emits and log lines.
    pub fn into_parts(self) -> (Vec<(String, Tuple)>, Vec<String>) {
        (self.emitted, self.logs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tuple;

    #[test]
    fn emit_uses_first_declared_stream() {
        let emits = vec!["main".to_string(), "errors".to_string()];
        let mut ctx = TaskContext::new("t", &emits, Path::new("/tmp"));
        ctx.emit(tuple![1]);
        ctx.emit_to("errors", tuple![2]).unwrap();
        let (emitted, logs) = ctx.into_parts();
        assert_eq!(
            emitted,
            vec![
                ("main".to_string(), tuple![1]),
                ("errors".to_string(), tuple![2])
            ]
        );
        assert!(logs.is_empty());
    }

    #[test]
    fn emit_to_undeclared_stream_fails() {
        let emits = vec!["main".to_string()];
        let mut ctx = TaskContext::new("t", &emits, Path::new("/tmp"));
        let err = ctx.emit_to("elsewhere", tuple![1]).unwrap_err();
        assert!(err.to_string().contains("undeclared stream 'elsewhere'"));
        assert!(ctx.emitted().is_empty());
    }
}
