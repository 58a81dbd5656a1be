//! Deterministic file names for every artifact the pipeline produces
//!
//! Every derived artifact is named by rewriting the suffix of the artifact it comes from. Names are
//! plain strings: nothing here touches the filesystem.

use crate::metadata::lane::LaneRecord;

/// Strip `old_suffix` from the end of `path` (if present) and append `new_suffix`
///
/// Total and pure. Not idempotent: applying the same rewrite twice yields a longer, distinct name.
pub fn rewrite(path: &str, old_suffix: &str, new_suffix: &str) -> String {
    let stem = path.strip_suffix(old_suffix).unwrap_or(path);
    format!("{stem}{new_suffix}")
}

/// Coordinate-sorted BAM produced by aligning one lane
///
/// `<individual>.<sample>.<library>.<sequencing>.<lane id>.<tumor|normal>.bam`
pub fn lane_bam(lane: &LaneRecord) -> String {
    format!(
        "{}.{}.{}.{}.{}.{}.bam",
        lane.individual,
        lane.sample,
        lane.library,
        lane.sequencing,
        lane.id,
        if lane.tumor { "tumor" } else { "normal" }
    )
}

/// All lanes of a sample merged into one BAM
pub fn merged_bam(sample: &str) -> String {
    format!("{sample}.bam")
}

/// Index sitting next to a BAM (`x.bam` -> `x.bai`)
pub fn bam_index(bam: &str) -> String {
    rewrite(bam, ".bam", ".bai")
}

/// Realignment target intervals shared by every sample in the run
pub fn realigner_intervals(individual: &str) -> String {
    format!("{individual}.realigner.intervals")
}

/// Outputs of Picard CollectMultipleMetrics, all sharing one base name
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MultipleMetrics {
    pub base: String,
    pub alignment_summary: String,
    pub insert_size: String,
    pub quality_by_cycle: String,
    pub quality_distribution: String,
    pub quality_distribution_chart: String,
}

impl MultipleMetrics {
    fn new(base: String) -> Self {
        MultipleMetrics {
            alignment_summary: format!("{base}.alignment_summary_metrics"),
            insert_size: format!("{base}.insert_size_metrics"),
            quality_by_cycle: format!("{base}.quality_by_cycle_metrics"),
            quality_distribution: format!("{base}.quality_distribution_metrics"),
            quality_distribution_chart: format!("{base}.quality_distribution.pdf"),
            base,
        }
    }

    pub fn files(&self) -> Vec<String> {
        vec![
            self.alignment_summary.clone(),
            self.insert_size.clone(),
            self.quality_by_cycle.clone(),
            self.quality_distribution.clone(),
            self.quality_distribution_chart.clone(),
        ]
    }
}

/// Every name derived from one sample's merged BAM
///
/// The BAM chain is `.bam -> .clean.bam -> .clean.dedup.bam -> .clean.dedup.recal.bam ->
/// .clean.dedup.recal.reduced.bam`; tables and metrics branch off the dedup and recal stages.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SampleArtifacts {
    pub merged_bam: String,
    pub merged_bai: String,
    pub clean_bam: String,
    pub clean_bai: String,
    pub dedup_bam: String,
    pub dedup_bai: String,
    pub duplicate_metrics: String,
    pub pre_recal_table: String,
    pub recal_bam: String,
    pub recal_bai: String,
    pub post_recal_table: String,
    pub hs_metrics: String,
    pub gc_metrics: String,
    pub gc_chart: String,
    pub multiple_metrics: MultipleMetrics,
    pub contamination: String,
    pub contamination_value: String,
    pub reduced_bam: String,
    pub reduced_bai: String,
    pub vcf: String,
    pub vcf_index: String,
}

impl SampleArtifacts {
    pub fn new(sample: &str) -> Self {
        let merged_bam = merged_bam(sample);
        let clean_bam = rewrite(&merged_bam, ".bam", ".clean.bam");
        let dedup_bam = rewrite(&clean_bam, ".bam", ".dedup.bam");
        let recal_bam = rewrite(&dedup_bam, ".bam", ".recal.bam");
        let reduced_bam = rewrite(&recal_bam, ".bam", ".reduced.bam");
        let contamination = rewrite(&recal_bam, ".bam", ".contamination.txt");
        let vcf = rewrite(&reduced_bam, ".bam", ".vcf");

        SampleArtifacts {
            merged_bai: bam_index(&merged_bam),
            clean_bai: bam_index(&clean_bam),
            dedup_bai: bam_index(&dedup_bam),
            duplicate_metrics: rewrite(&dedup_bam, ".bam", ".duplicateMetrics"),
            pre_recal_table: rewrite(&dedup_bam, ".bam", ".pre_recal.table"),
            recal_bai: bam_index(&recal_bam),
            post_recal_table: rewrite(&recal_bam, ".bam", ".post_recal.table"),
            hs_metrics: rewrite(&recal_bam, ".bam", ".hs_metrics"),
            gc_metrics: rewrite(&recal_bam, ".bam", ".gc_metrics"),
            gc_chart: rewrite(&recal_bam, ".bam", ".gc_metrics.pdf"),
            multiple_metrics: MultipleMetrics::new(rewrite(&recal_bam, ".bam", ".multipleMetrics")),
            contamination_value: rewrite(&contamination, ".txt", ".txt.firehose"),
            reduced_bai: bam_index(&reduced_bam),
            vcf_index: rewrite(&vcf, ".vcf", ".vcf.idx"),
            merged_bam,
            clean_bam,
            dedup_bam,
            recal_bam,
            contamination,
            reduced_bam,
            vcf,
        }
    }
}
