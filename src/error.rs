use std::path::PathBuf;

/// Every way planning can fail.
///
/// All of these are raised while the graph is being built in memory, so nothing has been handed to
/// the execution engine or the output sink when one of them is returned.
#[derive(Debug, thiserror::Error)]
pub enum PlanError {
    #[error("Malformed metadata on line {line} ({reason}): {content}")]
    MetadataFormat {
        line: usize,
        content: String,
        reason: String,
    },
    #[error("Sample {sample} has lanes with conflicting tumor status ({first} vs {second})")]
    InconsistentTumorStatus {
        sample: String,
        first: bool,
        second: bool,
    },
    #[error(
        "Only one tumor and one normal sample are supported per run, offending samples: {} \
         (tumor: {}; normal: {})",
        offending.join(", "),
        tumor.join(", "),
        normal.join(", ")
    )]
    UnsupportedCohortSize {
        offending: Vec<String>,
        tumor: Vec<String>,
        normal: Vec<String>,
    },
    #[error("Joint indel realignment tracks at most {limit} samples, cohort has {samples}")]
    JointRealignmentCapacity { samples: usize, limit: usize },
    #[error("Artifact {path} would be produced by more than one task")]
    DuplicateArtifact { path: String },
    #[error("No lanes to process")]
    EmptyCohort,
    #[error("Invalid pipeline configuration: {0}")]
    InvalidConfig(String),
    #[error("Fastq group {group} of sample {sample} has no primary read file")]
    MissingPrimaryRead { sample: String, group: usize },
    #[error("Invalid sample catalog: {0}")]
    Catalog(String),
    #[error("Built-in sample catalog schema is broken: {0}")]
    EmbeddedSchema(String),
    #[error("Can't read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error(transparent)]
    Template(#[from] tinytemplate::error::Error),
}

pub type Result<T, E = PlanError> = std::result::Result<T, E>;

impl PlanError {
    pub(crate) fn metadata(line: usize, content: &str, reason: impl Into<String>) -> Self {
        PlanError::MetadataFormat {
            line,
            content: content.to_string(),
            reason: reason.into(),
        }
    }
}
