// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Task definitions: the three callback shapes and the builder that names and
//! validates them.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::panic::{catch_unwind, AssertUnwindSafe};

use super::TaskContext;
use crate::config::consts::{DEFAULT_PARALLELISM, STREAM_NAME_PREFIX};
use crate::config::Sequence;
use crate::errors::ValidationError;
use crate::proto::Tuple;

pub type KeepFn = Box<dyn Fn(&Tuple) -> anyhow::Result<bool> + Send + Sync>;
pub type ExecuteFn = Box<dyn Fn(&mut TaskContext<'_>, &Tuple) -> anyhow::Result<()> + Send + Sync>;
pub type PrepareFn = Box<dyn Fn(&mut TaskContext<'_>) -> anyhow::Result<()> + Send + Sync>;

/// Kind of a task, without its callbacks. Used for naming, manifests and messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Kind {
    Filter,
    Each,
    Component,
}

impl Kind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Kind::Filter => "filter",
            Kind::Each => "each",
            Kind::Component => "component",
        }
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The user logic of a task.
pub enum TaskKind {
    /// Keep or drop each tuple; kept tuples are emitted unchanged.
    Filter(KeepFn),
    /// Transform each tuple, emitting any number of results.
    Each(ExecuteFn),
    /// Like `Each`, reading from declared upstream streams.
    Component(ExecuteFn),
}

impl TaskKind {
    pub fn kind(&self) -> Kind {
        match self {
            TaskKind::Filter(_) => Kind::Filter,
            TaskKind::Each(_) => Kind::Each,
            TaskKind::Component(_) => Kind::Component,
        }
    }
}

impl fmt::Debug for TaskKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TaskKind::{:?}", self.kind())
    }
}

/// Ordered list of stream names a task produces.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Emits(Vec<String>);

impl Emits {
    pub fn into_inner(self) -> Vec<String> {
        self.0
    }
}

impl From<&str> for Emits {
    fn from(stream: &str) -> Self {
        Self(vec![stream.to_string()])
    }
}

impl From<String> for Emits {
    fn from(stream: String) -> Self {
        Self(vec![stream])
    }
}

impl From<Vec<String>> for Emits {
    fn from(streams: Vec<String>) -> Self {
        Self(streams)
    }
}

impl From<Vec<&str>> for Emits {
    fn from(streams: Vec<&str>) -> Self {
        Self(streams.into_iter().map(str::to_string).collect())
    }
}

impl<const N: usize> From<[&str; N]> for Emits {
    fn from(streams: [&str; N]) -> Self {
        Self(streams.iter().map(|s| s.to_string()).collect())
    }
}

/// A named, validated unit of user logic. Immutable once built.
pub struct Task {
    name: String,
    emits: Vec<String>,
    consumes: Vec<String>,
    parallelism: u32,
    prepare: Option<PrepareFn>,
    kind: TaskKind,
}

impl Task {
    /// Starts a filter from an infallible predicate.
    pub fn filter<F>(keep: F) -> TaskBuilder
    where
        F: Fn(&Tuple) -> bool + Send + Sync + 'static,
    {
        TaskBuilder::new(TaskKind::Filter(Box::new(move |t| Ok(keep(t)))), Vec::new())
    }

    /// Starts a filter whose predicate can fail.
    pub fn try_filter<F>(keep: F) -> TaskBuilder
    where
        F: Fn(&Tuple) -> anyhow::Result<bool> + Send + Sync + 'static,
    {
        TaskBuilder::new(TaskKind::Filter(Box::new(keep)), Vec::new())
    }

    pub fn each<F>(execute: F) -> TaskBuilder
    where
        F: Fn(&mut TaskContext<'_>, &Tuple) -> anyhow::Result<()> + Send + Sync + 'static,
    {
        TaskBuilder::new(TaskKind::Each(Box::new(execute)), Vec::new())
    }

    /// Starts a component reading from `consumes`.
    pub fn component<I, S, F>(consumes: I, execute: F) -> TaskBuilder
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
        F: Fn(&mut TaskContext<'_>, &Tuple) -> anyhow::Result<()> + Send + Sync + 'static,
    {
        TaskBuilder::new(
            TaskKind::Component(Box::new(execute)),
            consumes.into_iter().map(Into::into).collect(),
        )
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> Kind {
        self.kind.kind()
    }

    pub fn emits(&self) -> &[String] {
        &self.emits
    }

    pub fn consumes(&self) -> &[String] {
        &self.consumes
    }

    pub fn parallelism(&self) -> u32 {
        self.parallelism
    }

    pub fn has_prepare(&self) -> bool {
        self.prepare.is_some()
    }

    /// Runs the prepare callback, if any, inside a panic guard.
    pub fn prepare(&self, ctx: &mut TaskContext<'_>) -> Result<(), String> {
        match &self.prepare {
            Some(prepare) => guarded(|| prepare(ctx)),
            None => Ok(()),
        }
    }

    /// Runs the task callback for one tuple inside a panic guard.
    ///
    /// A filter that keeps the tuple emits it on the default stream through `ctx`.
    /// Errors come back formatted with their full cause chain.
    pub fn invoke(&self, ctx: &mut TaskContext<'_>, tuple: &Tuple) -> Result<(), String> {
        guarded(|| match &self.kind {
            TaskKind::Filter(keep) => {
                if keep(tuple)? {
                    ctx.emit(tuple.clone());
                }
                Ok(())
            }
            TaskKind::Each(execute) | TaskKind::Component(execute) => execute(ctx, tuple),
        })
    }
}

impl fmt::Debug for Task {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Task")
            .field("name", &self.name)
            .field("kind", &self.kind())
            .field("emits", &self.emits)
            .field("consumes", &self.consumes)
            .field("parallelism", &self.parallelism)
            .field("has_prepare", &self.prepare.is_some())
            .finish()
    }
}

fn guarded<F>(callback: F) -> Result<(), String>
where
    F: FnOnce() -> anyhow::Result<()>,
{
    match catch_unwind(AssertUnwindSafe(callback)) {
        Ok(Ok(())) => Ok(()),
        Ok(Err(error)) => Err(format!("{:?}", error)),
        Err(payload) => {
            let reason = payload
                .downcast_ref::<&str>()
                .map(|s| s.to_string())
                .or_else(|| payload.downcast_ref::<String>().cloned())
                .unwrap_or_else(|| "non-string panic payload".to_string());
            Err(format!("panicked: {}", reason))
        }
    }
}

/// Collects the optional parts of a task before it is named and validated.
pub struct TaskBuilder {
    name: Option<String>,
    emits: Option<Vec<String>>,
    consumes: Vec<String>,
    parallelism: u32,
    prepare: Option<PrepareFn>,
    kind: TaskKind,
}

impl TaskBuilder {
    fn new(kind: TaskKind, consumes: Vec<String>) -> Self {
        Self {
            name: None,
            emits: None,
            consumes,
            parallelism: DEFAULT_PARALLELISM,
            prepare: None,
            kind,
        }
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Declares output streams; a single name becomes a one-element list.
    pub fn emits(mut self, emits: impl Into<Emits>) -> Self {
        self.emits = Some(emits.into().into_inner());
        self
    }

    pub fn parallelism(mut self, parallelism: u32) -> Self {
        self.parallelism = parallelism;
        self
    }

    pub fn prepare<F>(mut self, prepare: F) -> Self
    where
        F: Fn(&mut TaskContext<'_>) -> anyhow::Result<()> + Send + Sync + 'static,
    {
        self.prepare = Some(Box::new(prepare));
        self
    }

    pub fn kind(&self) -> Kind {
        self.kind.kind()
    }

    /// Fills in missing names from `sequence` and checks the task on its own.
    ///
    /// Registry checks (duplicate names, stream resolution) happen in
    /// [`crate::config::Application::add`].
    pub fn build(self, sequence: &dyn Sequence) -> Result<Task, ValidationError> {
        let kind = self.kind.kind();
        let name = self
            .name
            .unwrap_or_else(|| format!("{}_{}", kind, sequence.next()));

        let emits = match self.emits {
            Some(emits) if emits.is_empty() => {
                return Err(ValidationError::EmptyEmits { task: name });
            }
            Some(emits) => emits,
            None => vec![format!("{}_{}", STREAM_NAME_PREFIX, sequence.next())],
        };

        if self.parallelism == 0 {
            return Err(ValidationError::InvalidParallelism {
                task: name,
                parallelism: self.parallelism,
            });
        }

        Ok(Task {
            name,
            emits,
            consumes: self.consumes,
            parallelism: self.parallelism,
            prepare: self.prepare,
            kind: self.kind,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AtomicCounter;
    use crate::tuple;
    use anyhow::anyhow;
    use std::path::Path;

    fn run(task: &Task, t: &Tuple) -> (Result<(), String>, Vec<(String, Tuple)>) {
        let emits = task.emits().to_vec();
        let mut ctx = TaskContext::new(task.name(), &emits, Path::new("/tmp"));
        let result = task.invoke(&mut ctx, t);
        (result, ctx.into_parts().0)
    }

    #[test]
    fn anonymous_tasks_get_synthesized_names() {
        let seq = AtomicCounter::new();
        let task = Task::filter(|_| true).build(&seq).unwrap();
        assert_eq!(task.name(), "filter_1");
        assert_eq!(task.emits(), ["stream_2".to_string()]);

        let task = Task::each(|_, _| Ok(())).build(&seq).unwrap();
        assert_eq!(task.name(), "each_3");
    }

    #[test]
    fn explicit_names_do_not_consume_tokens() {
        let seq = AtomicCounter::new();
        let task = Task::each(|_, _| Ok(()))
            .name("upper")
            .emits("words")
            .build(&seq)
            .unwrap();
        assert_eq!(task.name(), "upper");
        assert_eq!(task.emits(), ["words".to_string()]);
        assert_eq!(seq.next(), "1");
    }

    #[test]
    fn empty_emits_are_rejected() {
        let seq = AtomicCounter::new();
        let err = Task::filter(|_| true)
            .name("f")
            .emits(Vec::<String>::new())
            .build(&seq)
            .unwrap_err();
        assert_eq!(err, ValidationError::EmptyEmits { task: "f".into() });
    }

    #[test]
    fn zero_parallelism_is_rejected() {
        let seq = AtomicCounter::new();
        let err = Task::filter(|_| true)
            .name("f")
            .parallelism(0)
            .build(&seq)
            .unwrap_err();
        assert_eq!(err.as_label(), "invalid_parallelism");
    }

    #[test]
    fn filter_emits_kept_tuples_only() {
        let seq = AtomicCounter::new();
        let task = Task::filter(|t| t[0].as_i64().unwrap_or(0) > 0)
            .emits("out")
            .build(&seq)
            .unwrap();

        let (result, emitted) = run(&task, &tuple![1, "a"]);
        assert!(result.is_ok());
        assert_eq!(emitted, vec![("out".to_string(), tuple![1, "a"])]);

        let (result, emitted) = run(&task, &tuple![-1, "b"]);
        assert!(result.is_ok());
        assert!(emitted.is_empty());
    }

    #[test]
    fn errors_carry_their_cause_chain() {
        let seq = AtomicCounter::new();
        let task = Task::each(|_, _| {
            Err(anyhow!("disk full").context("could not write checkpoint"))
        })
        .build(&seq)
        .unwrap();

        let (result, _) = run(&task, &tuple![1]);
        let message = result.unwrap_err();
        assert!(message.contains("could not write checkpoint"));
        assert!(message.contains("disk full"));
    }

    #[test]
    fn panics_are_contained() {
        let seq = AtomicCounter::new();
        let task = Task::try_filter(|_| panic!("predicate exploded"))
            .build(&seq)
            .unwrap();

        let (result, emitted) = run(&task, &tuple![1]);
        assert_eq!(result.unwrap_err(), "panicked: predicate exploded");
        assert!(emitted.is_empty());
    }

    #[test]
    fn component_keeps_consumes_in_order() {
        let seq = AtomicCounter::new();
        let task = Task::component(["b", "a"], |_, _| Ok(()))
            .name("join")
            .build(&seq)
            .unwrap();
        assert_eq!(task.kind(), Kind::Component);
        assert_eq!(task.consumes(), ["b".to_string(), "a".to_string()]);
    }
}
