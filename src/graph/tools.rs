//! Render the command line of every task kind from the templates in `data/templates`

use serde::Serialize;
use tinytemplate::{format_unescaped, TinyTemplate};

use crate::error::Result;
use crate::graph::task::TaskKind;

/// included tool templates, one per external invocation
static TEMPLATES: [(&str, &str); 14] = [
    ("align_paired", include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/data/templates/align_paired.txt"))),
    ("align_single", include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/data/templates/align_single.txt"))),
    ("merge", include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/data/templates/merge.txt"))),
    ("target_creator", include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/data/templates/target_creator.txt"))),
    ("indel_realigner", include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/data/templates/indel_realigner.txt"))),
    ("mark_duplicates", include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/data/templates/mark_duplicates.txt"))),
    ("base_recalibrator", include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/data/templates/base_recalibrator.txt"))),
    ("print_reads", include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/data/templates/print_reads.txt"))),
    ("reduce_reads", include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/data/templates/reduce_reads.txt"))),
    ("unified_genotyper", include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/data/templates/unified_genotyper.txt"))),
    ("hs_metrics", include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/data/templates/hs_metrics.txt"))),
    ("gc_bias", include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/data/templates/gc_bias.txt"))),
    ("multiple_metrics", include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/data/templates/multiple_metrics.txt"))),
    ("contest", include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/data/templates/contest.txt"))),
];

/// Rendering context shared by every tool template
///
/// Templates only reference the fields their tool needs; everything else stays empty.
#[derive(Debug, Default, Serialize)]
pub struct ToolContext {
    pub memory_gb: u32,
    pub threads: u32,
    pub reference: String,
    pub read_group: String,
    pub read1: String,
    pub read2: String,
    pub input: String,
    pub inputs: Vec<String>,
    pub output: String,
    pub known_sites: Vec<String>,
    pub intervals: Option<String>,
    pub realign_targets: String,
    pub metrics: String,
    pub recal_table: String,
    pub dbsnp: Option<String>,
    pub targets: String,
    pub baits: String,
    pub chart: String,
    pub genotypes: String,
    pub population: Option<String>,
    pub value_output: String,
}

/// Template used for each kind of task
fn template(kind: &TaskKind) -> &'static str {
    match kind {
        TaskKind::PairedAlignment { .. } => "align_paired",
        TaskKind::SingleEndAlignment { .. } => "align_single",
        TaskKind::Merge { .. } => "merge",
        TaskKind::TargetCreation => "target_creator",
        TaskKind::JointRealignment { .. } => "indel_realigner",
        TaskKind::Deduplication { .. } => "mark_duplicates",
        TaskKind::BaseRecalibration { .. } | TaskKind::PostRecalibration { .. } => "base_recalibrator",
        TaskKind::ApplyRecalibration { .. } => "print_reads",
        TaskKind::Reduction { .. } => "reduce_reads",
        TaskKind::SingleSampleCalling { .. } => "unified_genotyper",
        TaskKind::HybridSelectionMetrics { .. } => "hs_metrics",
        TaskKind::GcBiasMetrics { .. } => "gc_bias",
        TaskKind::MultipleMetrics { .. } => "multiple_metrics",
        TaskKind::Contamination { .. } => "contest",
    }
}

/// Compiled tool templates
pub struct Tools {
    tt: TinyTemplate<'static>,
}

impl Tools {
    pub fn new() -> Result<Tools> {
        let mut tt = TinyTemplate::new();
        // paths and read groups must come through verbatim
        tt.set_default_formatter(&format_unescaped);
        for (name, text) in TEMPLATES {
            tt.add_template(name, text)?;
        }
        Ok(Tools { tt })
    }

    pub fn render(&self, kind: &TaskKind, context: &ToolContext) -> Result<String> {
        let rendered = self.tt.render(template(kind), context)?;
        Ok(rendered.trim().to_string())
    }
}
