//! Named output bindings for the artifacts a run produces

use log::debug;
use serde::Serialize;

use crate::cohort::{Cohort, SampleGroup};
use crate::naming::SampleArtifacts;

/// `(individual, key) -> path`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PublishedOutput {
    pub individual: String,
    pub key: String,
    pub path: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Category {
    Normal,
    Tumor,
}

impl Category {
    /// Prefix for keys that start with the category (`normalGCMetrics`)
    fn prefix(&self) -> &'static str {
        match self {
            Category::Normal => "normal",
            Category::Tumor => "tumor",
        }
    }

    /// Infix for keys that embed the category (`reducedNormalBAM`)
    fn title(&self) -> &'static str {
        match self {
            Category::Normal => "Normal",
            Category::Tumor => "Tumor",
        }
    }
}

/// Every key published for one category, in publishing order
fn category_table(category: Category, names: &SampleArtifacts) -> Vec<(String, &str)> {
    let cat = category.prefix();
    let title = category.title();
    let metrics = &names.multiple_metrics;
    vec![
        (format!("unreduced{title}BAM"), names.recal_bam.as_str()),
        (format!("unreduced{title}BAMIndex"), names.recal_bai.as_str()),
        (format!("reduced{title}BAM"), names.reduced_bam.as_str()),
        (format!("reduced{title}BAMIndex"), names.reduced_bai.as_str()),
        (format!("{cat}HSMetrics"), names.hs_metrics.as_str()),
        (format!("{cat}GCMetrics"), names.gc_metrics.as_str()),
        (format!("{cat}InsertSizeMetrics"), metrics.insert_size.as_str()),
        (format!("{cat}AlignmentMetrics"), metrics.alignment_summary.as_str()),
        (format!("{cat}QualityByCycleMetrics"), metrics.quality_by_cycle.as_str()),
        // table and chart both go out under the same key
        (format!("{cat}QualityDistributionMetrics"), metrics.quality_distribution.as_str()),
        (format!("{cat}QualityDistributionMetrics"), metrics.quality_distribution_chart.as_str()),
        (format!("{cat}DuplicateMetrics"), names.duplicate_metrics.as_str()),
        (format!("{cat}ContEstMetrics"), names.contamination.as_str()),
        (format!("{cat}ContEstValue"), names.contamination_value.as_str()),
    ]
}

/// Build the binding table for a cohort
///
/// Normal keys appear only with a normal sample, tumor keys only with a tumor sample, and single
/// sample VCFs for every sample when calling was requested. Artifacts no declared task produces
/// (skipped QC, no contamination pair) are left out.
pub fn bindings<'a, N, P>(cohort: &Cohort, artifacts: N, calling: bool, produced: P) -> Vec<PublishedOutput>
where
    N: Fn(&SampleGroup) -> &'a SampleArtifacts,
    P: Fn(&str) -> bool,
{
    let mut outputs = Vec::new();
    let mut bind = |sample: &SampleGroup, key: String, path: &str| {
        if produced(path) {
            debug!("{} {} -> {}", sample.individual, key, path);
            outputs.push(PublishedOutput {
                individual: sample.individual.clone(),
                key,
                path: path.to_string(),
            });
        }
    };

    let categories = [(Category::Normal, cohort.normal()), (Category::Tumor, cohort.tumor())];
    for (category, sample) in categories {
        if let Some(sample) = sample {
            for (key, path) in category_table(category, artifacts(sample)) {
                bind(sample, key, path);
            }
        }
    }

    if calling {
        for sample in cohort.samples() {
            let names = artifacts(sample);
            bind(sample, "singleSampleVCF".to_string(), &names.vcf);
            bind(sample, "singleSampleVCFIndex".to_string(), &names.vcf_index);
        }
    }

    outputs
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;
    use crate::cohort::tests::lane;

    fn names_for(cohort: &Cohort) -> HashMap<String, SampleArtifacts> {
        cohort.samples().iter().map(|s| (s.sample.clone(), SampleArtifacts::new(&s.sample))).collect()
    }

    fn keys(outputs: &[PublishedOutput]) -> Vec<&str> {
        outputs.iter().map(|o| o.key.as_str()).collect()
    }

    #[test]
    fn full_table_for_tumor_normal() {
        let cohort = Cohort::aggregate(&[lane(1, "N", false, true), lane(2, "T", true, true)]).unwrap();
        let names = names_for(&cohort);
        let outputs = bindings(&cohort, |s| &names[&s.sample], false, |_| true);

        assert_eq!(outputs.len(), 28);
        let keys = keys(&outputs);
        assert_eq!(keys[0], "unreducedNormalBAM");
        assert_eq!(keys[14], "unreducedTumorBAM");
        assert_eq!(keys.iter().filter(|k| **k == "tumorQualityDistributionMetrics").count(), 2);
        assert!(keys.contains(&"normalContEstValue"));
        assert!(!keys.contains(&"singleSampleVCF"));

        let reduced = outputs.iter().find(|o| o.key == "reducedTumorBAM").unwrap();
        assert_eq!(reduced.path, "T.clean.dedup.recal.reduced.bam");
        assert_eq!(reduced.individual, "IND1");
    }

    #[test]
    fn unproduced_artifacts_are_skipped() {
        let cohort = Cohort::aggregate(&[lane(1, "N", false, true)]).unwrap();
        let names = names_for(&cohort);
        let outputs = bindings(&cohort, |s| &names[&s.sample], false, |path| !path.contains("contamination"));
        let keys = keys(&outputs);
        assert!(!keys.contains(&"normalContEstMetrics"));
        assert!(keys.contains(&"normalDuplicateMetrics"));
        assert!(keys.iter().all(|k| !k.starts_with("tumor") && !k.contains("Tumor")));
    }

    #[test]
    fn vcf_for_every_sample_when_calling() {
        let cohort = Cohort::aggregate(&[lane(1, "N", false, true), lane(2, "T", true, false)]).unwrap();
        let names = names_for(&cohort);
        let outputs = bindings(&cohort, |s| &names[&s.sample], true, |_| true);
        let vcfs: Vec<&str> = outputs
            .iter()
            .filter(|o| o.key == "singleSampleVCF")
            .map(|o| o.path.as_str())
            .collect();
        assert_eq!(vcfs, vec!["N.clean.dedup.recal.reduced.vcf", "T.clean.dedup.recal.reduced.vcf"]);
    }
}
