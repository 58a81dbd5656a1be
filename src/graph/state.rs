use std::fmt;

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskState {
    Created,
    Declared
}

/// A simple way to keep track of task state.
///
/// Only two states exist on this side of the engine boundary: created (fields populated and
/// dependency edges attached while the graph is built) and declared (handed to the execution
/// engine). Running, succeeded and failed are observed by the engine, never here.
impl TaskState {
    /// db column values, lower case
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskState::Created => "created",
            TaskState::Declared => "declared"
        }
    }
}

impl fmt::Display for TaskState {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
