// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Wire types for the worker control channel.
//!
//! The channel carries newline-delimited JSON. Messages from the parent are tagged by
//! a `type` field, messages from the worker by a `command` field:
//!
//! ```text
//! parent -> worker                          worker -> parent
//! {"type":"handshake","pid_dir":"/run/x"}   {"command":"pid","pid":4242}
//! {"type":"heartbeat"}                      {"command":"emit","stream":"s","anchor":7,"tuple":[1,"a"]}
//! {"type":"tuple","id":7,"values":[1,"a"]}  {"command":"ack","id":7}
//! {"type":"shutdown"}                       {"command":"fail","id":7,"message":"..."}
//!                                           {"command":"log","message":"..."}
//! ```
//!
//! Any other `type` is a control message the worker does not act on.

mod messages;
mod tuple;

pub use messages::{
    decode_tuple, Handshake, InboundTuple, Outbound, RawMessage, TupleId, TYPE_HANDSHAKE,
    TYPE_HEARTBEAT, TYPE_SHUTDOWN, TYPE_TUPLE,
};
pub use tuple::Tuple;
