// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use serde::{Deserialize, Serialize};

use crate::tasks::{Kind, Task};

/// What the orchestrator needs to know to schedule an application's workers.
///
/// # Example
/// ```yaml
/// application: numbers
/// inputs: [raw]
/// tasks:
///   - name: positive
///     kind: filter
///     emits: [positives]
///     parallelism: 2
///   - name: join
///     kind: component
///     emits: [joined]
///     consumes: [positives, raw]
///     parallelism: 1
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Manifest {
    pub application: String,
    #[serde(default)]
    pub inputs: Vec<String>,
    pub tasks: Vec<TaskManifest>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskManifest {
    pub name: String,
    pub kind: Kind,
    pub emits: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub consumes: Vec<String>,
    /// Advisory: how many worker processes to run for this task.
    pub parallelism: u32,
}

impl From<&Task> for TaskManifest {
    fn from(task: &Task) -> Self {
        Self {
            name: task.name().to_string(),
            kind: task.kind(),
            emits: task.emits().to_vec(),
            consumes: task.consumes().to_vec(),
            parallelism: task.parallelism(),
        }
    }
}

impl Manifest {
    pub fn to_yaml(&self) -> Result<String, serde_yaml::Error> {
        serde_yaml::to_string(self)
    }

    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    pub fn task(&self, name: &str) -> Option<&TaskManifest> {
        self.tasks.iter().find(|t| t.name == name)
    }
}
