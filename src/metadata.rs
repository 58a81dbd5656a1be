//! Turn sequencing metadata into an ordered list of lanes
//!
//! Metadata comes either from a flat comma-separated file or from the sample tracking service.

/// A single lane record
pub mod lane;
/// Flat metadata file parsing
pub mod file;
/// Sample tracking service lookups
pub mod service;
/// Embedded JSON schema for catalog exports of the tracking service
pub mod schema;

use std::path::Path;

use crate::error::Result;
use lane::LaneRecord;
use service::SampleLookup;

/// Where lanes come from, passed explicitly to the planner
pub enum MetadataSource<'a> {
    File(&'a Path),
    Service {
        individual: &'a str,
        lookup: &'a dyn SampleLookup,
    },
}

impl MetadataSource<'_> {
    pub fn resolve(&self) -> Result<Vec<LaneRecord>> {
        match self {
            MetadataSource::File(path) => file::read_metadata_file(path),
            MetadataSource::Service { individual, lookup } => service::resolve_individual(*lookup, individual),
        }
    }
}
