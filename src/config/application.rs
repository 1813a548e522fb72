// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::collections::HashMap;
use std::sync::Arc;

use crate::config::manifest::{Manifest, TaskManifest};
use crate::config::validation::{check_consumes, check_emits, check_name};
use crate::config::{ProcessCounter, Sequence};
use crate::engine::{WorkerRuntime, WorkerStats};
use crate::errors::{ValidationError, WorkerError};
use crate::observability::messages::validation::TaskRegistered;
use crate::observability::messages::StructuredLog;
use crate::tasks::{Kind, Task, TaskBuilder};
use crate::traits::ControllerChannel;

/// Producer recorded for streams declared with [`Application::declare_input`].
pub const INPUT_PRODUCER: &str = "<input>";

/// The set of tasks making up one stream-processing application.
///
/// Tasks are validated as they are added: names must be unique, emitted streams must
/// have a single producer, and components may only consume streams that were
/// registered before them.
pub struct Application {
    name: String,
    sequence: Arc<dyn Sequence>,
    names: HashMap<String, Kind>,
    streams: HashMap<String, String>,
    inputs: Vec<String>,
    tasks: Vec<Arc<Task>>,
}

impl Application {
    /// New application naming anonymous tasks from the process-wide counter.
    pub fn new(name: impl Into<String>) -> Self {
        Self::with_sequence(name, Arc::new(ProcessCounter))
    }

    pub fn with_sequence(name: impl Into<String>, sequence: Arc<dyn Sequence>) -> Self {
        Self {
            name: name.into(),
            sequence,
            names: HashMap::new(),
            streams: HashMap::new(),
            inputs: Vec::new(),
            tasks: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Registers a stream fed by something outside this application.
    pub fn declare_input(&mut self, stream: impl Into<String>) -> Result<(), ValidationError> {
        let stream = stream.into();
        if let Some(producer) = self.streams.get(&stream) {
            return Err(ValidationError::StreamAlreadyDeclared {
                task: INPUT_PRODUCER.to_string(),
                stream,
                producer: producer.clone(),
            });
        }
        self.streams.insert(stream.clone(), INPUT_PRODUCER.to_string());
        self.inputs.push(stream);
        Ok(())
    }

    /// Builds, validates and registers a task. Nothing is registered on failure.
    pub fn add(&mut self, builder: TaskBuilder) -> Result<Arc<Task>, ValidationError> {
        let task = builder.build(self.sequence.as_ref())?;

        check_consumes(task.name(), task.consumes(), &self.streams)?;
        check_name(task.kind(), task.name(), &mut self.names)?;
        if let Err(e) = check_emits(task.kind(), task.name(), task.emits(), &mut self.streams) {
            self.names.remove(task.name());
            return Err(e);
        }

        TaskRegistered {
            application: &self.name,
            task: task.name(),
            kind: task.kind().as_str(),
            emits: task.emits(),
            parallelism: task.parallelism(),
        }
        .log();

        let task = Arc::new(task);
        self.tasks.push(Arc::clone(&task));
        Ok(task)
    }

    pub fn tasks(&self) -> &[Arc<Task>] {
        &self.tasks
    }

    pub fn task(&self, name: &str) -> Option<&Arc<Task>> {
        self.tasks.iter().find(|t| t.name() == name)
    }

    /// Producer of `stream`, if registered.
    pub fn producer_of(&self, stream: &str) -> Option<&str> {
        self.streams.get(stream).map(String::as_str)
    }

    pub fn manifest(&self) -> Manifest {
        Manifest {
            application: self.name.clone(),
            inputs: self.inputs.clone(),
            tasks: self.tasks.iter().map(|t| TaskManifest::from(t.as_ref())).collect(),
        }
    }

    /// Runs the named task as this process's worker until shutdown or a fatal error.
    pub async fn run_task<C: ControllerChannel>(
        &self,
        name: &str,
        channel: C,
    ) -> Result<WorkerStats, WorkerError> {
        let task = self
            .task(name)
            .ok_or_else(|| WorkerError::UnknownTask(name.to_string()))?;
        WorkerRuntime::new(Arc::clone(task), channel).run().await
    }
}

impl std::fmt::Debug for Application {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Application")
            .field("name", &self.name)
            .field("task_count", &self.tasks.len())
            .field("task_names", &self.tasks.iter().map(|t| t.name()).collect::<Vec<_>>())
            .field("inputs", &self.inputs)
            .finish()
    }
}
