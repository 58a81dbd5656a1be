use anyhow::{Context, Result};
use chrono::Utc;
use log::info;
use rusqlite::{params, Connection};

use crate::engine::ExecutionEngine;
use crate::graph::state::TaskState;
use crate::graph::task::Task;

/// Declares tasks by recording them in the queue database the scheduler polls
pub struct SqliteEngine<'c> {
    conn: &'c Connection,
}

impl<'c> SqliteEngine<'c> {
    pub fn new(conn: &'c Connection) -> Self {
        SqliteEngine { conn }
    }

    fn insert_task(&self, task: &Task) -> rusqlite::Result<()> {
        self.conn.execute(
            "INSERT INTO task (id, kind, sample, command, memory_gb, threads, scatter_count, intermediate, state, declared_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
            params![
                task.id.0,
                task.kind.name(),
                task.kind.sample(),
                task.command,
                task.resources.memory_gb,
                task.resources.threads,
                task.resources.scatter_count,
                task.intermediate,
                TaskState::Declared.as_str(),
                Utc::now().to_rfc3339(),
            ],
        )?;
        Ok(())
    }

    fn insert_artifacts(&self, task: &Task) -> rusqlite::Result<()> {
        let mut stmt = self.conn.prepare("INSERT INTO task_artifact (task_id, path, direction) VALUES (?1, ?2, ?3)")?;
        for input in &task.inputs {
            stmt.execute(params![task.id.0, input, "input"])?;
        }
        for output in &task.outputs {
            stmt.execute(params![task.id.0, output, "output"])?;
        }
        Ok(())
    }

    fn insert_dependencies(&self, task: &Task) -> rusqlite::Result<()> {
        let mut stmt = self.conn.prepare("INSERT INTO task_dependency (task_id, depends_on) VALUES (?1, ?2)")?;
        for dependency in &task.depends_on {
            stmt.execute(params![task.id.0, dependency.0])?;
        }
        Ok(())
    }
}

impl ExecutionEngine for SqliteEngine<'_> {
    fn declare(&mut self, task: &Task) -> Result<()> {
        info!("Declaring {} {}", task.id, task.kind);
        self.insert_task(task).with_context(|| format!("Insert task {}", task.id))?;
        self.insert_artifacts(task).with_context(|| format!("Insert artifacts of task {}", task.id))?;
        self.insert_dependencies(task).with_context(|| format!("Insert dependencies of task {}", task.id))?;
        Ok(())
    }
}
