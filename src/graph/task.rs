use std::collections::BTreeSet;
use std::fmt;

use serde::Serialize;

use crate::graph::state::TaskState;

/// Position of a task in declaration order
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct TaskId(pub usize);

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// What a task does; each kind maps onto one external tool invocation
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TaskKind {
    PairedAlignment { lane: usize },
    SingleEndAlignment { lane: usize },
    Merge { sample: String },
    TargetCreation,
    JointRealignment { samples: Vec<String> },
    Deduplication { sample: String },
    BaseRecalibration { sample: String },
    ApplyRecalibration { sample: String },
    PostRecalibration { sample: String },
    Reduction { sample: String },
    SingleSampleCalling { sample: String },
    HybridSelectionMetrics { sample: String },
    GcBiasMetrics { sample: String },
    MultipleMetrics { sample: String },
    /// Contamination of `sample`, genotyped from `genotypes`
    Contamination { sample: String, genotypes: String },
}

impl TaskKind {
    pub fn name(&self) -> &'static str {
        match self {
            TaskKind::PairedAlignment { .. } => "paired_alignment",
            TaskKind::SingleEndAlignment { .. } => "single_end_alignment",
            TaskKind::Merge { .. } => "merge",
            TaskKind::TargetCreation => "target_creation",
            TaskKind::JointRealignment { .. } => "joint_realignment",
            TaskKind::Deduplication { .. } => "deduplication",
            TaskKind::BaseRecalibration { .. } => "base_recalibration",
            TaskKind::ApplyRecalibration { .. } => "apply_recalibration",
            TaskKind::PostRecalibration { .. } => "post_recalibration",
            TaskKind::Reduction { .. } => "reduction",
            TaskKind::SingleSampleCalling { .. } => "single_sample_calling",
            TaskKind::HybridSelectionMetrics { .. } => "hybrid_selection_metrics",
            TaskKind::GcBiasMetrics { .. } => "gc_bias_metrics",
            TaskKind::MultipleMetrics { .. } => "multiple_metrics",
            TaskKind::Contamination { .. } => "contamination",
        }
    }

    /// Sample the task works on, `None` for per-lane and cross-sample tasks
    pub fn sample(&self) -> Option<&str> {
        match self {
            TaskKind::PairedAlignment { .. }
            | TaskKind::SingleEndAlignment { .. }
            | TaskKind::TargetCreation
            | TaskKind::JointRealignment { .. } => None,
            TaskKind::Merge { sample }
            | TaskKind::Deduplication { sample }
            | TaskKind::BaseRecalibration { sample }
            | TaskKind::ApplyRecalibration { sample }
            | TaskKind::PostRecalibration { sample }
            | TaskKind::Reduction { sample }
            | TaskKind::SingleSampleCalling { sample }
            | TaskKind::HybridSelectionMetrics { sample }
            | TaskKind::GcBiasMetrics { sample }
            | TaskKind::MultipleMetrics { sample }
            | TaskKind::Contamination { sample, .. } => Some(sample),
        }
    }
}

impl fmt::Display for TaskKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            TaskKind::PairedAlignment { lane } | TaskKind::SingleEndAlignment { lane } => {
                write!(f, "{} (lane {})", self.name(), lane)
            }
            TaskKind::JointRealignment { samples } => write!(f, "{} ({})", self.name(), samples.join(", ")),
            TaskKind::Contamination { sample, genotypes } => {
                write!(f, "{} ({} vs {})", self.name(), sample, genotypes)
            }
            _ => match self.sample() {
                Some(sample) => write!(f, "{} ({})", self.name(), sample),
                None => write!(f, "{}", self.name()),
            },
        }
    }
}

/// Advisory resources, passed through to the engine untouched
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ResourceHints {
    pub memory_gb: Option<u32>,
    pub threads: Option<u32>,
    pub scatter_count: Option<u32>,
}

impl ResourceHints {
    pub fn jvm(memory_gb: u32) -> Self {
        ResourceHints { memory_gb: Some(memory_gb), ..Default::default() }
    }

    pub fn threaded(threads: u32) -> Self {
        ResourceHints { threads: Some(threads), ..Default::default() }
    }

    pub fn scattered(self, scatter_count: u32) -> Self {
        ResourceHints { scatter_count: Some(scatter_count), ..self }
    }
}

/// One unit of work for the execution engine
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Task {
    pub id: TaskId,
    #[serde(flatten)]
    pub kind: TaskKind,
    pub inputs: Vec<String>,
    pub outputs: Vec<String>,
    pub resources: ResourceHints,
    /// Outputs may be cleaned up once every consumer has finished
    pub intermediate: bool,
    pub depends_on: BTreeSet<TaskId>,
    pub command: String,
    pub state: TaskState,
}
