//! Declared tasks and published outputs can be stored in a SQLite database

/// Connect to a SQLite database
pub mod open;
/// Execution engine that queues declared tasks
pub mod task;
/// Output sink for published bindings
pub mod output;
