//! Pipeline options, consolidated into one value that's validated once before planning starts

use std::fs;
use std::path::Path;

use log::info;
use serde::{Deserialize, Serialize};

use crate::error::{PlanError, Result};

/// Advisory resources handed to the execution engine with each task
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResourceSettings {
    /// JVM heap for Picard / GATK tools
    pub memory_gb: u32,
    /// Aligner threads
    pub threads: u32,
    /// Interval shards for GATK tools that can scatter
    pub scatter_count: u32,
}

impl Default for ResourceSettings {
    fn default() -> Self {
        ResourceSettings { memory_gb: 4, threads: 1, scatter_count: 1 }
    }
}

pub const DEFAULT_REFERENCE: &str = "Homo_sapiens_assembly19.fasta";
pub const DEFAULT_DBSNP: &str = "dbsnp_132.b37.vcf";
pub const DEFAULT_POPULATION_FREQUENCIES: &str = "hg19_population_stratified_af_hapmap_3.3.vcf";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub skip_qc: bool,
    pub do_post_recal: bool,
    pub do_single_sample_calling: bool,
    /// Restrict interval-aware tools to the target intervals and don't scatter
    pub quick_mode: bool,
    pub reference: String,
    pub dbsnp: Option<String>,
    pub known_indels: Vec<String>,
    pub target_intervals: Option<String>,
    pub bait_intervals: Option<String>,
    /// Population allele frequencies for contamination estimation
    pub population_frequencies: Option<String>,
    pub resources: ResourceSettings,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        PipelineConfig {
            skip_qc: false,
            do_post_recal: false,
            do_single_sample_calling: false,
            quick_mode: false,
            reference: DEFAULT_REFERENCE.to_string(),
            dbsnp: Some(DEFAULT_DBSNP.to_string()),
            known_indels: Vec::new(),
            target_intervals: None,
            bait_intervals: None,
            population_frequencies: Some(DEFAULT_POPULATION_FREQUENCIES.to_string()),
            resources: ResourceSettings::default(),
        }
    }
}

impl PipelineConfig {
    pub fn read(path: &Path) -> Result<PipelineConfig> {
        info!("Reading pipeline configuration at {}", path.display());
        let json_string = fs::read_to_string(path).map_err(|source| PlanError::Io { path: path.to_path_buf(), source })?;
        serde_json::from_str(&json_string).map_err(|err| PlanError::InvalidConfig(err.to_string()))
    }

    pub fn validate(&self) -> Result<()> {
        if self.reference.is_empty() {
            return Err(PlanError::InvalidConfig("a reference genome is required".to_string()));
        }
        if self.resources.memory_gb == 0 || self.resources.threads == 0 || self.resources.scatter_count == 0 {
            return Err(PlanError::InvalidConfig(format!(
                "resource hints must be positive: {:?}",
                self.resources
            )));
        }
        if self.known_sites().is_empty() {
            return Err(PlanError::InvalidConfig(
                "base recalibration needs dbSNP or at least one known indel file".to_string(),
            ));
        }
        if self.quick_mode && self.target_intervals.is_none() {
            return Err(PlanError::InvalidConfig("quick mode needs target intervals".to_string()));
        }
        Ok(())
    }

    /// Known variant sites for recalibration, dbSNP first
    pub fn known_sites(&self) -> Vec<String> {
        self.dbsnp.iter().chain(self.known_indels.iter()).cloned().collect()
    }

    /// Hybrid selection metrics need both interval lists
    pub fn hs_intervals(&self) -> Option<(&str, &str)> {
        match (&self.target_intervals, &self.bait_intervals) {
            (Some(targets), Some(baits)) => Some((targets.as_str(), baits.as_str())),
            _ => None,
        }
    }

    /// Intervals that interval-aware tools are restricted to
    pub fn restricted_intervals(&self) -> Option<&str> {
        match self.quick_mode {
            true => self.target_intervals.as_deref(),
            false => None,
        }
    }

    pub fn scatter_count(&self) -> u32 {
        match self.quick_mode {
            true => 1,
            false => self.resources.scatter_count,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn default_is_valid() {
        assert!(PipelineConfig::default().validate().is_ok());
    }

    #[test]
    fn quick_mode_needs_targets() {
        let config = PipelineConfig { quick_mode: true, ..Default::default() };
        assert!(matches!(config.validate(), Err(PlanError::InvalidConfig(_))));

        let config = PipelineConfig {
            quick_mode: true,
            target_intervals: Some("exome.interval_list".to_string()),
            resources: ResourceSettings { scatter_count: 20, ..Default::default() },
            ..Default::default()
        };
        assert!(config.validate().is_ok());
        assert_eq!(config.scatter_count(), 1);
        assert_eq!(config.restricted_intervals(), Some("exome.interval_list"));
    }

    #[test]
    fn recalibration_needs_known_sites() {
        let config = PipelineConfig { dbsnp: None, ..Default::default() };
        match config.validate() {
            Err(PlanError::InvalidConfig(reason)) => assert!(reason.contains("known")),
            other => panic!("unexpected {other:?}"),
        }

        let indels_only = PipelineConfig { known_indels: vec!["mills.vcf".to_string()], ..config };
        assert!(indels_only.validate().is_ok());
        assert_eq!(indels_only.known_sites(), vec!["mills.vcf"]);
        assert_eq!(PipelineConfig::default().known_sites(), vec![DEFAULT_DBSNP]);
    }

    #[test]
    fn rejects_zero_resources() {
        let config = PipelineConfig {
            resources: ResourceSettings { threads: 0, ..Default::default() },
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn hs_intervals_need_both_files() {
        let targets_only = PipelineConfig { target_intervals: Some("t.list".to_string()), ..Default::default() };
        assert_eq!(targets_only.hs_intervals(), None);
        let both = PipelineConfig { bait_intervals: Some("b.list".to_string()), ..targets_only };
        assert_eq!(both.hs_intervals(), Some(("t.list", "b.list")));
    }

    #[test]
    fn reads_partial_json() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"skip_qc": true, "reference": "ref.fa", "resources": {{"scatter_count": 8}}}}"#).unwrap();
        let config = PipelineConfig::read(file.path()).unwrap();
        assert!(config.skip_qc);
        assert_eq!(config.reference, "ref.fa");
        assert_eq!(config.resources.scatter_count, 8);
        assert_eq!(config.resources.memory_gb, 4);
    }
}
