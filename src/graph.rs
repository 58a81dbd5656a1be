//! The per-run task graph and how it's built

/// Tasks, their kinds and resource hints
pub mod task;
/// Task lifecycle on this side of the engine boundary
pub mod state;
/// Command line templates for external tools
pub mod tools;
/// Wire lanes, samples and the cohort into tasks
pub mod builder;

use log::info;
use serde::Serialize;

use crate::engine::{ExecutionEngine, OutputSink};
use crate::graph::state::TaskState;
use crate::graph::task::Task;
use crate::publish::PublishedOutput;

/// A fully built plan: tasks in dependency order plus the outputs to publish
#[derive(Debug, Clone, Serialize)]
pub struct PipelineGraph {
    tasks: Vec<Task>,
    outputs: Vec<PublishedOutput>,
}

impl PipelineGraph {
    pub(crate) fn new(tasks: Vec<Task>, outputs: Vec<PublishedOutput>) -> Self {
        PipelineGraph { tasks, outputs }
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn outputs(&self) -> &[PublishedOutput] {
        &self.outputs
    }

    /// Task that writes `artifact`, if any task does
    pub fn producer_of(&self, artifact: &str) -> Option<&Task> {
        self.tasks.iter().find(|task| task.outputs.iter().any(|output| output == artifact))
    }

    /// Hand every task to the engine, then every binding to the sink
    ///
    /// Tasks are declared in construction order, so producers always reach the engine before
    /// their consumers.
    pub fn declare(&mut self, engine: &mut dyn ExecutionEngine, sink: &mut dyn OutputSink) -> anyhow::Result<()> {
        for task in self.tasks.iter_mut() {
            engine.declare(task)?;
            task.state = TaskState::Declared;
        }
        info!("Declared {} tasks", self.tasks.len());

        for output in &self.outputs {
            sink.publish(&output.individual, &output.key, &output.path);
        }
        info!("Published {} outputs", self.outputs.len());
        Ok(())
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}
