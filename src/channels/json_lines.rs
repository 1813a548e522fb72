// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Newline-delimited JSON channel over any tokio reader/writer pair.
//!
//! In production the reader is the worker's stdin and the writer its stdout. End of
//! input and a broken output pipe both mean the parent is gone.

use async_trait::async_trait;
use std::path::PathBuf;
use std::time::Duration;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncReadExt, AsyncWrite, AsyncWriteExt, BufReader};

use crate::config::consts::DEFAULT_MAX_MESSAGE_BYTES;
use crate::config::WorkerConfig;
use crate::errors::ChannelError;
use crate::observability::messages::channel::HandshakeCompleted;
use crate::observability::messages::StructuredLog;
use crate::proto::{
    decode_tuple, Handshake, Outbound, RawMessage, Tuple, TupleId, TYPE_HEARTBEAT, TYPE_SHUTDOWN,
};
use crate::traits::ControllerChannel;

pub struct JsonLinesChannel<R, W> {
    reader: R,
    writer: W,
    read_timeout: Option<Duration>,
    max_message_bytes: usize,
    pid_dir: Option<PathBuf>,
    pid_file: Option<PathBuf>,
    current: Option<TupleId>,
    source: Option<String>,
}

impl JsonLinesChannel<BufReader<tokio::io::Stdin>, tokio::io::Stdout> {
    /// Channel on the process's stdin/stdout.
    pub fn stdio(config: &WorkerConfig) -> Self {
        Self::from_config(BufReader::new(tokio::io::stdin()), tokio::io::stdout(), config)
    }
}

impl<R, W> JsonLinesChannel<R, W>
where
    R: AsyncBufRead + Unpin + Send,
    W: AsyncWrite + Unpin + Send,
{
    pub fn new(reader: R, writer: W) -> Self {
        Self {
            reader,
            writer,
            read_timeout: None,
            max_message_bytes: DEFAULT_MAX_MESSAGE_BYTES,
            pid_dir: None,
            pid_file: None,
            current: None,
            source: None,
        }
    }

    pub fn from_config(reader: R, writer: W, config: &WorkerConfig) -> Self {
        Self::new(reader, writer)
            .with_read_timeout(config.read_timeout())
            .with_max_message_bytes(config.get_max_message_bytes())
    }

    pub fn with_read_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.read_timeout = timeout.filter(|d| *d > Duration::ZERO);
        self
    }

    pub fn with_max_message_bytes(mut self, limit: usize) -> Self {
        self.max_message_bytes = limit;
        self
    }

    /// Id of the tuple currently in flight.
    pub fn current_tuple(&self) -> Option<&TupleId> {
        self.current.as_ref()
    }

    pub fn into_inner(self) -> (R, W) {
        (self.reader, self.writer)
    }

    async fn read_line(&mut self) -> Result<String, ChannelError> {
        match self.read_timeout {
            Some(limit) => tokio::time::timeout(limit, self.read_line_unbounded())
                .await
                .map_err(|_elapsed| ChannelError::Timeout(limit))?,
            None => self.read_line_unbounded().await,
        }
    }

    /// Next non-blank line, without its terminator.
    async fn read_line_unbounded(&mut self) -> Result<String, ChannelError> {
        loop {
            let mut line = String::new();
            let limit = self.max_message_bytes as u64 + 1;
            let read = (&mut self.reader)
                .take(limit)
                .read_line(&mut line)
                .await
                .map_err(|e| match e.kind() {
                    std::io::ErrorKind::InvalidData => ChannelError::Decode(e.to_string()),
                    _ => ChannelError::from_io(e),
                })?;

            if read == 0 {
                return Err(ChannelError::parent_dead("control channel closed (EOF)"));
            }
            if !line.ends_with('\n') && read as u64 == limit {
                return Err(ChannelError::MessageTooLarge {
                    size: read,
                    limit: self.max_message_bytes,
                });
            }

            let trimmed = line.trim();
            if !trimmed.is_empty() {
                return Ok(trimmed.to_string());
            }
        }
    }

    async fn read_message(&mut self) -> Result<RawMessage, ChannelError> {
        let line = self.read_line().await?;
        RawMessage::parse(&line)
    }

    async fn send(&mut self, message: &Outbound<'_>) -> Result<(), ChannelError> {
        let mut bytes = serde_json::to_vec(message)?;
        bytes.push(b'\n');
        self.writer
            .write_all(&bytes)
            .await
            .map_err(ChannelError::from_io)?;
        self.writer.flush().await.map_err(ChannelError::from_io)
    }

    fn take_current(&mut self, operation: &str) -> Result<TupleId, ChannelError> {
        self.current.take().ok_or_else(|| {
            ChannelError::Protocol(format!("{} called with no tuple in flight", operation))
        })
    }
}

#[async_trait]
impl<R, W> ControllerChannel for JsonLinesChannel<R, W>
where
    R: AsyncBufRead + Unpin + Send,
    W: AsyncWrite + Unpin + Send,
{
    async fn get_pid_dir(&mut self) -> Result<PathBuf, ChannelError> {
        if let Some(dir) = &self.pid_dir {
            return Ok(dir.clone());
        }

        let handshake = loop {
            let raw = self.read_message().await?;
            if raw.is_type(TYPE_HEARTBEAT) {
                continue;
            }
            if raw.is_type(TYPE_SHUTDOWN) {
                return Err(ChannelError::Shutdown);
            }
            break Handshake::from_raw(raw)?;
        };

        let pid = std::process::id();
        let pid_file = handshake.pid_dir.join(pid.to_string());
        tokio::fs::create_dir_all(&handshake.pid_dir).await?;
        tokio::fs::write(&pid_file, b"").await?;
        self.pid_file = Some(pid_file);
        self.send(&Outbound::Pid { pid }).await?;

        HandshakeCompleted {
            pid_dir: &handshake.pid_dir,
            pid,
        }
        .log();

        self.pid_dir = Some(handshake.pid_dir.clone());
        Ok(handshake.pid_dir)
    }

    async fn read(&mut self) -> Result<Option<RawMessage>, ChannelError> {
        let raw = self.read_message().await?;
        if raw.is_type(TYPE_HEARTBEAT) {
            return Ok(None);
        }
        if raw.is_type(TYPE_SHUTDOWN) {
            return Err(ChannelError::Shutdown);
        }
        Ok(Some(raw))
    }

    fn get_tuple(&mut self, raw: RawMessage) -> Result<Option<Tuple>, ChannelError> {
        match decode_tuple(raw) {
            Ok(Some(inbound)) => {
                self.current = Some(inbound.id);
                self.source = inbound.stream;
                Ok(Some(inbound.values))
            }
            Ok(None) => Ok(None),
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
        let anchor = self.current.clone();
        self.send(&Outbound::Emit {
            stream,
            anchor: anchor.as_ref(),
            tuple,
        })
        .await
    }

    async fn done(&mut self) -> Result<(), ChannelError> {
        let id = self.take_current("done")?;
        self.send(&Outbound::Ack { id: &id }).await
    }

    async fn fail(&mut self, message: &str) -> Result<(), ChannelError> {
        let id = self.take_current("fail")?;
        self.send(&Outbound::Fail { id: &id, message }).await
    }

    async fn log(&mut self, message: &str) -> Result<(), ChannelError> {
        self.send(&Outbound::Log { message }).await
    }

    /// Removes the pid file written during the handshake.
    async fn close(&mut self) -> Result<(), ChannelError> {
        if let Some(pid_file) = self.pid_file.take() {
            match tokio::fs::remove_file(&pid_file).await {
                Ok(()) => {}
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                Err(e) => return Err(e.into()),
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tuple;
    use serde_json::{json, Value};
    use std::io::Cursor;

    type TestChannel = JsonLinesChannel<Cursor<Vec<u8>>, Vec<u8>>;

    fn channel(input: impl Into<String>) -> TestChannel {
        JsonLinesChannel::new(Cursor::new(input.into().into_bytes()), Vec::new())
    }

    fn written(channel: TestChannel) -> Vec<Value> {
        let (_, out) = channel.into_inner();
        String::from_utf8(out)
            .unwrap()
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect()
    }

    #[tokio::test]
    async fn handshake_creates_pid_dir_and_reports_pid() {
        let dir = tempfile::tempdir().unwrap();
        let pid_dir = dir.path().join("worker-1");
        let mut ch = channel(format!(
            "{}\n",
            json!({"type": "handshake", "pid_dir": pid_dir})
        ));

        let got = ch.get_pid_dir().await.unwrap();
        assert_eq!(got, pid_dir);
        assert!(pid_dir.join(std::process::id().to_string()).exists());

        // Cached: a second call does not read again.
        assert_eq!(ch.get_pid_dir().await.unwrap(), pid_dir);
        assert_eq!(
            written(ch),
            vec![json!({"command": "pid", "pid": std::process::id()})]
        );
    }

    #[tokio::test]
    async fn handshake_must_come_first() {
        let mut ch = channel("{\"type\":\"tuple\",\"id\":1,\"values\":[]}\n");
        assert!(matches!(
            ch.get_pid_dir().await,
            Err(ChannelError::Protocol(_))
        ));
    }

    #[tokio::test]
    async fn heartbeat_reads_as_none_and_shutdown_as_error() {
        let mut ch = channel("{\"type\":\"heartbeat\"}\n\n{\"type\":\"shutdown\"}\n");
        assert!(ch.read().await.unwrap().is_none());
        assert!(matches!(ch.read().await, Err(ChannelError::Shutdown)));
    }

    #[tokio::test]
    async fn eof_is_parent_death() {
        let mut ch = channel("");
        let err = ch.read().await.unwrap_err();
        assert!(err.is_parent_dead());
    }

    #[tokio::test]
    async fn ack_and_fail_echo_the_current_id() {
        let mut ch = channel(concat!(
            "{\"type\":\"tuple\",\"id\":1,\"values\":[1,\"a\"]}\n",
            "{\"type\":\"tuple\",\"id\":\"x\",\"values\":[2]}\n",
        ));

        let raw = ch.read().await.unwrap().unwrap();
        let t = ch.get_tuple(raw).unwrap().unwrap();
        assert_eq!(t, tuple![1, "a"]);
        ch.emit("out", &t).await.unwrap();
        ch.done().await.unwrap();

        let raw = ch.read().await.unwrap().unwrap();
        ch.get_tuple(raw).unwrap().unwrap();
        ch.fail("boom").await.unwrap();
        ch.log("note").await.unwrap();

        assert_eq!(
            written(ch),
            vec![
                json!({"command": "emit", "stream": "out", "anchor": 1, "tuple": [1, "a"]}),
                json!({"command": "ack", "id": 1}),
                json!({"command": "fail", "id": "x", "message": "boom"}),
                json!({"command": "log", "message": "note"}),
            ]
        );
    }

    #[tokio::test]
    async fn source_stream_follows_the_current_tuple() {
        let mut ch = channel(concat!(
            "{\"type\":\"tuple\",\"id\":1,\"stream\":\"words\",\"values\":[\"a\"]}\n",
            "{\"type\":\"tuple\",\"id\":2,\"values\":[\"b\"]}\n",
        ));

        let raw = ch.read().await.unwrap().unwrap();
        ch.get_tuple(raw).unwrap();
        assert_eq!(ch.source_stream(), Some("words"));
        ch.done().await.unwrap();

        let raw = ch.read().await.unwrap().unwrap();
        ch.get_tuple(raw).unwrap();
        assert_eq!(ch.source_stream(), None);
    }

    #[tokio::test]
    async fn invalid_tuple_can_still_be_failed() {
        let mut ch = channel("{\"type\":\"tuple\",\"id\":4,\"values\":7}\n");
        let raw = ch.read().await.unwrap().unwrap();
        assert!(matches!(
            ch.get_tuple(raw),
            Err(ChannelError::InvalidTuple { .. })
        ));
        assert_eq!(ch.current_tuple(), Some(&TupleId::from(4)));
        ch.fail("malformed").await.unwrap();

        assert_eq!(
            written(ch),
            vec![json!({"command": "fail", "id": 4, "message": "malformed"})]
        );
    }

    #[tokio::test]
    async fn close_removes_the_pid_file() {
        let dir = tempfile::tempdir().unwrap();
        let mut ch = channel(format!(
            "{}\n",
            json!({"type": "handshake", "pid_dir": dir.path()})
        ));
        ch.get_pid_dir().await.unwrap();
        let pid_file = dir.path().join(std::process::id().to_string());
        assert!(pid_file.exists());

        ch.close().await.unwrap();
        assert!(!pid_file.exists());
        assert!(dir.path().is_dir());
        ch.close().await.unwrap();
    }

    #[tokio::test]
    async fn done_without_tuple_is_a_protocol_error() {
        let mut ch = channel("");
        assert!(matches!(ch.done().await, Err(ChannelError::Protocol(_))));
    }

    #[tokio::test]
    async fn control_messages_are_not_tuples() {
        let mut ch = channel("{\"type\":\"sync\"}\n");
        let raw = ch.read().await.unwrap().unwrap();
        assert!(ch.get_tuple(raw).unwrap().is_none());
        assert!(ch.current_tuple().is_none());
    }

    #[tokio::test]
    async fn oversized_lines_are_rejected() {
        let long = format!("{{\"type\":\"tuple\",\"id\":1,\"values\":[\"{}\"]}}\n", "x".repeat(2048));
        let mut ch = channel(long).with_max_message_bytes(1024);
        assert!(matches!(
            ch.read().await,
            Err(ChannelError::MessageTooLarge { limit: 1024, .. })
        ));
    }

    #[tokio::test]
    async fn read_timeout_is_reported() {
        let (_parent, worker) = tokio::io::duplex(64);
        let mut ch = JsonLinesChannel::new(BufReader::new(worker), Vec::new())
            .with_read_timeout(Some(Duration::from_millis(20)));
        let err = ch.read().await.unwrap_err();
        assert!(matches!(err, ChannelError::Timeout(_)));
        assert!(err.is_parent_dead());
    }
}
