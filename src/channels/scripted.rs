// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! In-memory channel that replays a script of inbound messages and records every
//! call the worker makes. Used in tests and for dry runs of a task.

use async_trait::async_trait;
use serde_json::{json, Value};
use std::collections::VecDeque;
use std::path::PathBuf;

use crate::errors::ChannelError;
use crate::proto::{decode_tuple, RawMessage, Tuple, TupleId, TYPE_HEARTBEAT, TYPE_SHUTDOWN};
use crate::traits::ControllerChannel;

/// One recorded call on the channel.
#[derive(Debug, Clone, PartialEq)]
pub enum ChannelCall {
    PidDir,
    Emit { stream: String, tuple: Tuple },
    Done,
    Fail(String),
    Log(String),
}

enum Step {
    Message(Value),
    Error(ChannelError),
}

/// A channel fed from a prepared script.
///
/// When the script runs out, `read` reports parent death, as a real pipe would on EOF.
pub struct ScriptedChannel {
    pid_dir: PathBuf,
    script: VecDeque<Step>,
    calls: Vec<ChannelCall>,
    current: Option<TupleId>,
    source: Option<String>,
    next_id: u64,
    reads: usize,
}

impl ScriptedChannel {
    pub fn new(pid_dir: impl Into<PathBuf>) -> Self {
        Self {
            pid_dir: pid_dir.into(),
            script: VecDeque::new(),
            calls: Vec::new(),
            current: None,
            source: None,
            next_id: 1,
            reads: 0,
        }
    }

    /// Queues a data tuple with the next sequential id.
    pub fn tuple(self, tuple: impl Into<Tuple>) -> Self {
        self.push_tuple(None, tuple.into())
    }

    /// Queues a data tuple arriving on `stream`.
    pub fn tuple_on(self, stream: &str, tuple: impl Into<Tuple>) -> Self {
        self.push_tuple(Some(stream), tuple.into())
    }

    fn push_tuple(mut self, stream: Option<&str>, tuple: Tuple) -> Self {
        let id = self.next_id;
        self.next_id += 1;
        let mut message = json!({
            "type": "tuple",
            "id": id,
            "values": tuple,
        });
        if let Some(stream) = stream {
            message["stream"] = json!(stream);
        }
        self.script.push_back(Step::Message(message));
        self
    }

    pub fn heartbeat(self) -> Self {
        self.raw(json!({ "type": TYPE_HEARTBEAT }))
    }

    /// Queues a control message the worker should skip.
    pub fn control(self, message_type: &str) -> Self {
        self.raw(json!({ "type": message_type }))
    }

    pub fn shutdown(self) -> Self {
        self.raw(json!({ "type": TYPE_SHUTDOWN }))
    }

    pub fn parent_dead(self) -> Self {
        self.error(ChannelError::parent_dead("scripted parent death"))
    }

    /// Queues an arbitrary inbound JSON object.
    pub fn raw(mut self, message: Value) -> Self {
        self.script.push_back(Step::Message(message));
        self
    }

    /// Makes the corresponding `read` call fail with `error`.
    pub fn error(mut self, error: ChannelError) -> Self {
        self.script.push_back(Step::Error(error));
        self
    }

    pub fn calls(&self) -> &[ChannelCall] {
        &self.calls
    }

    /// Recorded calls, without `PidDir` and `Log`.
    pub fn tuple_calls(&self) -> Vec<ChannelCall> {
        self.calls
            .iter()
            .filter(|c| !matches!(c, ChannelCall::PidDir | ChannelCall::Log(_)))
            .cloned()
            .collect()
    }

    pub fn reads(&self) -> usize {
        self.reads
    }

    pub fn remaining(&self) -> usize {
        self.script.len()
    }

    fn release_current(&mut self, operation: &str) -> Result<(), ChannelError> {
        self.current.take().map(|_| ()).ok_or_else(|| {
            ChannelError::Protocol(format!("{} called with no tuple in flight", operation))
        })
    }
}

#[async_trait]
impl ControllerChannel for ScriptedChannel {
    async fn get_pid_dir(&mut self) -> Result<PathBuf, ChannelError> {
        tokio::fs::create_dir_all(&self.pid_dir).await?;
        self.calls.push(ChannelCall::PidDir);
        Ok(self.pid_dir.clone())
    }

    async fn read(&mut self) -> Result<Option<RawMessage>, ChannelError> {
        self.reads += 1;
        match self.script.pop_front() {
            Some(Step::Message(value)) => {
                let raw = RawMessage::new(value);
                if raw.is_type(TYPE_HEARTBEAT) {
                    Ok(None)
                } else if raw.is_type(TYPE_SHUTDOWN) {
                    Err(ChannelError::Shutdown)
                } else {
                    Ok(Some(raw))
                }
            }
            Some(Step::Error(error)) => Err(error),
            None => Err(ChannelError::parent_dead("script exhausted")),
        }
    }

    fn get_tuple(&mut self, raw: RawMessage) -> Result<Option<Tuple>, ChannelError> {
        match decode_tuple(raw) {
            Ok(decoded) => Ok(decoded.map(|inbound| {
                self.current = Some(inbound.id);
                self.source = inbound.stream;
                inbound.values
            })),
            Err(ChannelError::InvalidTuple { id, reason }) => {
                self.current = Some(id.clone());
                self.source = None;
                Err(ChannelError::InvalidTuple { id, reason })
            }
            Err(e) => Err(e),
        }
    }

    fn source_stream(&self) -> Option<&str> {
        self.source.as_deref()
    }

    async fn emit(&mut self, stream: &str, tuple: &Tuple) -> Result<(), ChannelError> {
        self.calls.push(ChannelCall::Emit {
            stream: stream.to_string(),
            tuple: tuple.clone(),
        });
        Ok(())
    }

    async fn done(&mut self) -> Result<(), ChannelError> {
        self.release_current("done")?;
        self.calls.push(ChannelCall::Done);
        Ok(())
    }

    async fn fail(&mut self, message: &str) -> Result<(), ChannelError> {
        self.release_current("fail")?;
        self.calls.push(ChannelCall::Fail(message.to_string()));
        Ok(())
    }

    async fn log(&mut self, message: &str) -> Result<(), ChannelError> {
        self.calls.push(ChannelCall::Log(message.to_string()));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tuple;

    #[tokio::test]
    async fn replays_script_in_order() {
        let dir = tempfile::tempdir().unwrap();
        let mut ch = ScriptedChannel::new(dir.path())
            .heartbeat()
            .tuple(tuple![1])
            .control("sync")
            .shutdown();

        assert!(ch.read().await.unwrap().is_none());

        let raw = ch.read().await.unwrap().unwrap();
        assert_eq!(ch.get_tuple(raw).unwrap(), Some(tuple![1]));
        ch.done().await.unwrap();

        let raw = ch.read().await.unwrap().unwrap();
        assert_eq!(ch.get_tuple(raw).unwrap(), None);

        assert!(matches!(ch.read().await, Err(ChannelError::Shutdown)));
        assert!(ch.read().await.unwrap_err().is_parent_dead());
        assert_eq!(ch.reads(), 5);
        assert_eq!(ch.calls(), [ChannelCall::Done]);
    }

    #[tokio::test]
    async fn tuple_on_records_the_source_stream() {
        let mut ch = ScriptedChannel::new("/tmp")
            .tuple_on("words", tuple!["a"])
            .tuple(tuple!["b"]);

        let raw = ch.read().await.unwrap().unwrap();
        ch.get_tuple(raw).unwrap();
        assert_eq!(ch.source_stream(), Some("words"));

        let raw = ch.read().await.unwrap().unwrap();
        ch.get_tuple(raw).unwrap();
        assert_eq!(ch.source_stream(), None);
    }

    #[tokio::test]
    async fn done_requires_a_tuple_in_flight() {
        let mut ch = ScriptedChannel::new("/tmp");
        assert!(matches!(ch.done().await, Err(ChannelError::Protocol(_))));
        assert!(ch.calls().is_empty());
    }
}
