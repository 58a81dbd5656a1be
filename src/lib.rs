//! Plan the per-sample processing graph of a tumor/normal sequencing run
//!
//! Lanes of raw reads are grouped into samples, every intermediate and final file gets a
//! deterministic name, and the alignment / cleaning / recalibration / QC tasks are wired together
//! and handed to an external execution engine. Nothing here runs a tool.

pub mod cohort;
pub mod config;
pub mod db;
pub mod engine;
pub mod error;
pub mod graph;
pub mod metadata;
pub mod naming;
pub mod platform;
pub mod publish;

pub use config::PipelineConfig;
pub use engine::{plan, plan_and_declare, ExecutionEngine, OutputSink};
pub use error::PlanError;
pub use graph::PipelineGraph;
pub use metadata::MetadataSource;
