//! Group lanes into samples and check the cohort is one the pipeline can process

use std::collections::HashMap;

use log::{info, warn};
use crate::error::{PlanError, Result};
use crate::metadata::lane::LaneRecord;
use crate::naming;

/// A lane together with the BAM its alignment will produce
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaneAlignment {
    pub lane: LaneRecord,
    pub bam: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SampleGroup {
    pub sample: String,
    /// Individual of the first lane, used to key published outputs
    pub individual: String,
    pub tumor: bool,
    /// In lane order
    pub lanes: Vec<LaneAlignment>,
}

/// Samples of one run, at most one tumor and one normal
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cohort {
    /// In order of first appearance
    samples: Vec<SampleGroup>,
}

impl Cohort {
    /// Group lanes by sample and validate tumor status and cohort size
    pub fn aggregate(lanes: &[LaneRecord]) -> Result<Cohort> {
        let mut samples: Vec<SampleGroup> = Vec::new();
        let mut index: HashMap<&str, usize> = HashMap::new();

        for lane in lanes {
            let alignment = LaneAlignment { lane: lane.clone(), bam: naming::lane_bam(lane) };
            let existing = index.get(lane.sample.as_str()).copied();
            match existing {
                Some(i) => {
                    let group = &mut samples[i];
                    if group.tumor != lane.tumor {
                        warn!("Lane {} disagrees with earlier lanes of {}", lane.id, lane.sample);
                        return Err(PlanError::InconsistentTumorStatus {
                            sample: lane.sample.clone(),
                            first: group.tumor,
                            second: lane.tumor,
                        });
                    }
                    group.lanes.push(alignment);
                }
                None => {
                    index.insert(&lane.sample, samples.len());
                    samples.push(SampleGroup {
                        sample: lane.sample.clone(),
                        individual: lane.individual.clone(),
                        tumor: lane.tumor,
                        lanes: vec![alignment],
                    });
                }
            }
        }

        let cohort = Cohort { samples };
        cohort.check_size()?;
        info!(
            "Cohort has {} samples (tumor: {:?}, normal: {:?})",
            cohort.samples.len(),
            cohort.tumor().map(|s| &s.sample),
            cohort.normal().map(|s| &s.sample)
        );
        Ok(cohort)
    }

    fn check_size(&self) -> Result<()> {
        let tumor = self.names(true);
        let normal = self.names(false);
        if tumor.len() <= 1 && normal.len() <= 1 {
            return Ok(());
        }

        let mut offending = Vec::new();
        if tumor.len() > 1 {
            offending.extend(tumor.iter().cloned());
        }
        if normal.len() > 1 {
            offending.extend(normal.iter().cloned());
        }
        Err(PlanError::UnsupportedCohortSize { offending, tumor, normal })
    }

    fn names(&self, tumor: bool) -> Vec<String> {
        self.samples.iter().filter(|s| s.tumor == tumor).map(|s| s.sample.clone()).collect()
    }

    pub fn samples(&self) -> &[SampleGroup] {
        &self.samples
    }

    pub fn tumor(&self) -> Option<&SampleGroup> {
        self.samples.iter().find(|s| s.tumor)
    }

    pub fn normal(&self) -> Option<&SampleGroup> {
        self.samples.iter().find(|s| !s.tumor)
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::platform::Platform;

    pub(crate) fn lane(id: usize, sample: &str, tumor: bool, paired: bool) -> LaneRecord {
        LaneRecord {
            id,
            individual: "IND1".to_string(),
            sample: sample.to_string(),
            library: format!("{sample}_LIB"),
            sequencing: format!("RUN{id}"),
            read1: format!("{sample}_{id}_1.fastq"),
            read2: paired.then(|| format!("{sample}_{id}_2.fastq")),
            tumor,
            platform: Platform::Illumina,
            platform_unit: format!("PU{id}"),
            center: "BI".to_string(),
            description: "test".to_string(),
            date_sequenced: "2020-01-01".to_string(),
        }
    }

    #[test]
    fn groups_lanes_in_order() {
        let lanes = vec![
            lane(1, "N", false, true),
            lane(2, "T", true, true),
            lane(3, "N", false, false),
        ];
        let cohort = Cohort::aggregate(&lanes).unwrap();
        assert_eq!(cohort.len(), 2);

        let normal = cohort.normal().unwrap();
        assert_eq!(normal.sample, "N");
        let ids: Vec<usize> = normal.lanes.iter().map(|l| l.lane.id).collect();
        assert_eq!(ids, vec![1, 3]);
        assert_eq!(normal.lanes[1].bam, "IND1.N.N_LIB.RUN3.3.normal.bam");

        assert_eq!(cohort.tumor().unwrap().sample, "T");
        assert_eq!(cohort.samples()[0].sample, "N");
    }

    #[test]
    fn conflicting_tumor_status() {
        let lanes = vec![lane(1, "S1", true, true), lane(2, "S1", false, true)];
        match Cohort::aggregate(&lanes) {
            Err(PlanError::InconsistentTumorStatus { sample, first, second }) => {
                assert_eq!(sample, "S1");
                assert!(first);
                assert!(!second);
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn three_tumors_unsupported() {
        let lanes = vec![lane(1, "A", true, true), lane(2, "B", true, true), lane(3, "C", true, false)];
        match Cohort::aggregate(&lanes) {
            Err(PlanError::UnsupportedCohortSize { offending, tumor, normal }) => {
                assert_eq!(offending, vec!["A", "B", "C"]);
                assert_eq!(tumor.len(), 3);
                assert!(normal.is_empty());
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn two_normals_listed_with_single_tumor_ok() {
        let lanes = vec![lane(1, "T", true, true), lane(2, "N1", false, true), lane(3, "N2", false, true)];
        match Cohort::aggregate(&lanes) {
            Err(PlanError::UnsupportedCohortSize { offending, .. }) => assert_eq!(offending, vec!["N1", "N2"]),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn normal_only_cohort() {
        let cohort = Cohort::aggregate(&[lane(1, "N", false, false)]).unwrap();
        assert!(cohort.tumor().is_none());
        assert!(cohort.normal().is_some());
    }

    #[test]
    fn no_lanes_is_empty_cohort() {
        assert!(Cohort::aggregate(&[]).unwrap().is_empty());
    }
}
