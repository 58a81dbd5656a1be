use std::fs;
use std::path::{Path, PathBuf};

use jsonschema::JSONSchema;
use log::{info, warn};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{PlanError, Result};
use crate::metadata::lane::LaneRecord;
use crate::metadata::schema;
use crate::platform::Platform;

/// Anything that can answer "which samples were sequenced for this individual?"
pub trait SampleLookup {
    fn lookup(&self, individual: &str) -> Result<Vec<SampleRecord>>;
}

/// One sequenced sample as reported by the tracking service
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct SampleRecord {
    pub name: String,
    pub library: String,
    pub sequencing: String,
    pub tumor: bool,
    pub platform: Platform,
    pub center: String,
    pub description: Option<String>,
    pub date_sequenced: String,
    #[serde(default)]
    fastqs: Vec<FastqPair>,
}

/// Read files of one lane, `read2` only for paired-end data
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct FastqPair {
    pub read1: String,
    pub read2: Option<String>,
    pub platform_unit: Option<String>,
}

impl SampleRecord {
    pub fn new(
        name: &str,
        library: &str,
        sequencing: &str,
        tumor: bool,
        platform: Platform,
        fastqs: Vec<FastqPair>,
    ) -> Self {
        SampleRecord {
            name: name.to_string(),
            library: library.to_string(),
            sequencing: sequencing.to_string(),
            tumor,
            platform,
            center: String::new(),
            description: None,
            date_sequenced: String::new(),
            fastqs,
        }
    }

    pub fn fastq_pairs(&self) -> &[FastqPair] {
        &self.fastqs
    }
}

/// Flatten looked-up samples into lanes, numbered from 1 in enumeration order
pub fn resolve_individual(lookup: &dyn SampleLookup, individual: &str) -> Result<Vec<LaneRecord>> {
    let samples = lookup.lookup(individual)?;
    info!("Tracking service returned {} samples for {}", samples.len(), individual);

    let mut lanes: Vec<LaneRecord> = Vec::new();
    for sample in &samples {
        for (index, pair) in sample.fastq_pairs().iter().enumerate() {
            if pair.read1.is_empty() {
                warn!("Sample {} fastq group {} has no primary read", sample.name, index + 1);
                return Err(PlanError::MissingPrimaryRead { sample: sample.name.clone(), group: index + 1 });
            }
            let platform_unit = match &pair.platform_unit {
                Some(unit) => unit.clone(),
                None => format!("{}.{}", sample.sequencing, index + 1),
            };
            lanes.push(LaneRecord {
                id: lanes.len() + 1,
                individual: individual.to_string(),
                sample: sample.name.clone(),
                library: sample.library.clone(),
                sequencing: sample.sequencing.clone(),
                read1: pair.read1.clone(),
                read2: pair.read2.clone().filter(|mate| !mate.is_empty()),
                tumor: sample.tumor,
                platform: sample.platform,
                platform_unit,
                center: sample.center.clone(),
                description: sample.description.clone().unwrap_or_else(|| sample.name.clone()),
                date_sequenced: sample.date_sequenced.clone(),
            });
        }
    }

    if lanes.is_empty() {
        warn!("No fastq files found for {}", individual);
    }
    Ok(lanes)
}

#[derive(Debug, Deserialize)]
struct Catalog {
    individuals: Vec<CatalogIndividual>,
}

#[derive(Debug, Deserialize)]
struct CatalogIndividual {
    id: String,
    samples: Vec<SampleRecord>,
}

/// A JSON export of the tracking service, validated against the embedded schema on load
pub struct JsonSampleCatalog {
    individuals: Vec<CatalogIndividual>,
}

impl JsonSampleCatalog {
    pub fn read(path: &Path) -> Result<JsonSampleCatalog> {
        let json_string = read_file(path)?;
        JsonSampleCatalog::parse(&json_string)
    }

    pub fn parse(json_string: &str) -> Result<JsonSampleCatalog> {
        let compiled_schema: JSONSchema = schema::load_schema()?;
        let json: Value = parse_untyped_json(json_string)?;
        schema::validate(&compiled_schema, &json)?;
        info!("Catalog is valid");
        let catalog = parse_json(json)?;
        Ok(JsonSampleCatalog { individuals: catalog.individuals })
    }
}

impl SampleLookup for JsonSampleCatalog {
    fn lookup(&self, individual: &str) -> Result<Vec<SampleRecord>> {
        let samples = self
            .individuals
            .iter()
            .filter(|entry| entry.id == individual)
            .flat_map(|entry| entry.samples.iter().cloned())
            .collect();
        Ok(samples)
    }
}

fn read_file(path: &Path) -> Result<String> {
    info!("Reading sample catalog at {}", path.display());
    fs::read_to_string(path).map_err(|source| {
        warn!("Can't read sample catalog at path {}: {}", path.display(), source);
        PlanError::Io { path: PathBuf::from(path), source }
    })
}

fn parse_untyped_json(json_string: &str) -> Result<Value> {
    info!("Parsing JSON into untyped structure");
    serde_json::from_str::<Value>(json_string).map_err(|err| PlanError::Catalog(format!("not JSON: {err}")))
}

fn parse_json(value: Value) -> Result<Catalog> {
    info!("Deserialising valid JSON into typed Rust object");
    // the schema doesn't know the platform vocabulary, so this can still fail
    serde_json::from_value::<Catalog>(value).map_err(|err| PlanError::Catalog(err.to_string()))
}
