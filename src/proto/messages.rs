// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::path::PathBuf;

use super::Tuple;
use crate::errors::ChannelError;

pub const TYPE_HANDSHAKE: &str = "handshake";
pub const TYPE_HEARTBEAT: &str = "heartbeat";
pub const TYPE_TUPLE: &str = "tuple";
pub const TYPE_SHUTDOWN: &str = "shutdown";

/// One message from the parent, parsed as JSON but not yet interpreted.
#[derive(Debug, Clone, PartialEq)]
pub struct RawMessage(Value);

impl RawMessage {
    pub fn new(value: Value) -> Self {
        Self(value)
    }

    /// Parses one line of the control channel.
    pub fn parse(line: &str) -> Result<Self, ChannelError> {
        let value: Value =
            serde_json::from_str(line).map_err(|e| ChannelError::Decode(e.to_string()))?;
        if !value.is_object() {
            return Err(ChannelError::Decode(format!(
                "expected a JSON object, got: {}",
                value
            )));
        }
        Ok(Self(value))
    }

    /// The `type` tag, if present.
    pub fn message_type(&self) -> Option<&str> {
        self.0.get("type").and_then(Value::as_str)
    }

    pub fn is_type(&self, tag: &str) -> bool {
        self.message_type() == Some(tag)
    }

    pub fn as_value(&self) -> &Value {
        &self.0
    }

    pub fn into_value(self) -> Value {
        self.0
    }
}

/// Identifier the parent assigns to a tuple; echoed back in `ack`/`fail`/`emit`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TupleId {
    Number(u64),
    Text(String),
}

impl fmt::Display for TupleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TupleId::Number(n) => write!(f, "{}", n),
            TupleId::Text(s) => write!(f, "{}", s),
        }
    }
}

impl From<u64> for TupleId {
    fn from(n: u64) -> Self {
        TupleId::Number(n)
    }
}

impl From<&str> for TupleId {
    fn from(s: &str) -> Self {
        TupleId::Text(s.to_string())
    }
}

/// First message of every session.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Handshake {
    pub pid_dir: PathBuf,
}

impl Handshake {
    pub fn from_raw(raw: RawMessage) -> Result<Self, ChannelError> {
        if !raw.is_type(TYPE_HANDSHAKE) {
            return Err(ChannelError::Protocol(format!(
                "expected handshake, got message of type {:?}",
                raw.message_type()
            )));
        }
        serde_json::from_value(raw.into_value())
            .map_err(|e| ChannelError::Decode(format!("bad handshake: {}", e)))
    }
}

/// A data tuple as it appears on the wire.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct InboundTuple {
    pub id: TupleId,
    #[serde(default)]
    pub stream: Option<String>,
    pub values: Tuple,
}

/// Decodes a raw message into a data tuple; `Ok(None)` for anything that is not one.
///
/// A tuple whose `id` is readable but whose body is not comes back as
/// [`ChannelError::InvalidTuple`], so the parent can still be answered for that id.
pub fn decode_tuple(raw: RawMessage) -> Result<Option<InboundTuple>, ChannelError> {
    if !raw.is_type(TYPE_TUPLE) {
        return Ok(None);
    }
    let id = raw
        .as_value()
        .get("id")
        .and_then(|id| TupleId::deserialize(id).ok());

    serde_json::from_value(raw.into_value())
        .map(Some)
        .map_err(|e| {
            let reason = format!("bad tuple: {}", e);
            match id {
                Some(id) => ChannelError::InvalidTuple { id, reason },
                None => ChannelError::Decode(reason),
            }
        })
}

/// Messages the worker sends to its parent.
#[derive(Debug, Serialize)]
#[serde(tag = "command", rename_all = "snake_case")]
pub enum Outbound<'a> {
    Pid {
        pid: u32,
    },
    Emit {
        stream: &'a str,
        #[serde(skip_serializing_if = "Option::is_none")]
        anchor: Option<&'a TupleId>,
        tuple: &'a Tuple,
    },
    Ack {
        id: &'a TupleId,
    },
    Fail {
        id: &'a TupleId,
        message: &'a str,
    },
    Log {
        message: &'a str,
    },
}
