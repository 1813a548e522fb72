// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Assembly-time validation of task names and streams.
//!
//! These checks catch wiring mistakes before any worker is spawned. Each function
//! only touches the registries it is given: a name registry (`name -> kind`) and a
//! stream registry (`stream -> producing task`).
//!
//! # Checks
//!
//! 1. **Name uniqueness**: a task name may be registered once per application.
//! 2. **Emits uniqueness**: a stream has exactly one producer, so the orchestrator can
//!    always tell which task a tuple came from.
//! 3. **Consumes resolution**: a component may only read streams that are already
//!    registered, either emitted by an earlier task or declared as an input.
//!
//! # Example
//! ```rust
//! use std::collections::HashMap;
//! use the_spigot::config::{check_emits, check_name};
//! use the_spigot::tasks::Kind;
//!
//! let mut names = HashMap::new();
//! let mut streams = HashMap::new();
//!
//! check_name(Kind::Filter, "positive", &mut names).unwrap();
//! check_emits(Kind::Filter, "positive", &["positives".to_string()], &mut streams).unwrap();
//!
//! assert!(check_name(Kind::Each, "positive", &mut names).is_err());
//! ```

use std::collections::{HashMap, HashSet};

use crate::errors::ValidationError;
use crate::observability::messages::validation::{
    DuplicateNameRejected, StreamConflictRejected, UnknownStreamRejected,
};
use crate::observability::messages::StructuredLog;
use crate::tasks::Kind;

/// Registers `name`, failing if another task already owns it.
///
/// The registry maps names to the kind that registered them so the error can say
/// which kind of task got there first.
pub fn check_name(
    kind: Kind,
    name: &str,
    known_names: &mut HashMap<String, Kind>,
) -> Result<(), ValidationError> {
    if let Some(existing) = known_names.get(name) {
        DuplicateNameRejected {
            name,
            kind: kind.as_str(),
            existing_kind: existing.as_str(),
        }
        .log();
        return Err(ValidationError::DuplicateName {
            name: name.to_string(),
            kind: kind.to_string(),
            existing_kind: existing.to_string(),
        });
    }
    known_names.insert(name.to_string(), kind);
    Ok(())
}

/// Registers every stream in `emits` as produced by `task`.
///
/// Nothing is registered unless the whole list is valid. A stream name may appear
/// only once in `emits` and must not already be produced by anyone else.
pub fn check_emits(
    kind: Kind,
    task: &str,
    emits: &[String],
    known_streams: &mut HashMap<String, String>,
) -> Result<(), ValidationError> {
    let mut seen = HashSet::new();
    for stream in emits {
        let producer = if !seen.insert(stream.as_str()) {
            Some(task)
        } else {
            known_streams.get(stream).map(String::as_str)
        };

        if let Some(producer) = producer {
            StreamConflictRejected {
                task,
                kind: kind.as_str(),
                stream,
                producer,
            }
            .log();
            return Err(ValidationError::StreamAlreadyDeclared {
                task: task.to_string(),
                stream: stream.clone(),
                producer: producer.to_string(),
            });
        }
    }

    for stream in emits {
        known_streams.insert(stream.clone(), task.to_string());
    }
    Ok(())
}

/// Checks that every consumed stream is already registered.
pub fn check_consumes(
    component: &str,
    consumes: &[String],
    known_streams: &HashMap<String, String>,
) -> Result<(), ValidationError> {
    match consumes.iter().find(|s| !known_streams.contains_key(*s)) {
        Some(stream) => {
            UnknownStreamRejected { component, stream }.log();
            Err(ValidationError::UnknownStream {
                component: component.to_string(),
                stream: stream.clone(),
            })
        }
        None => Ok(()),
    }
}
