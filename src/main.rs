use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use log::{info, warn};

use lanegraph::config::{
    PipelineConfig, ResourceSettings, DEFAULT_DBSNP, DEFAULT_POPULATION_FREQUENCIES, DEFAULT_REFERENCE,
};
use lanegraph::db::open::{open_db, release_or_rollback};
use lanegraph::db::output::SqliteSink;
use lanegraph::db::task::SqliteEngine;
use lanegraph::metadata::service::JsonSampleCatalog;
use lanegraph::{plan, plan_and_declare, MetadataSource};

#[derive(Parser)]
#[command(name = "lanegraph")]
#[command(about = "Plan tumor/normal sequencing data processing tasks", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the task graph and print it as JSON
    Plan {
        #[command(flatten)]
        input: InputArgs,

        #[command(flatten)]
        pipeline: PipelineArgs,

        /// Write the plan here instead of stdout
        #[arg(short, long, value_name = "PLAN.JSON")]
        output: Option<PathBuf>,
    },

    /// Build the task graph and queue it in a SQLite database
    Declare {
        #[command(flatten)]
        input: InputArgs,

        #[command(flatten)]
        pipeline: PipelineArgs,

        /// Queue database, created if missing
        #[arg(long, value_name = "DB")]
        db: PathBuf,

        /// Roll back every database change when finished
        #[arg(long)]
        dry_run: bool,
    },
}

#[derive(Args)]
struct InputArgs {
    /// Flat comma-separated lane metadata
    #[arg(short, long, value_name = "METADATA.CSV", conflicts_with = "catalog", required_unless_present = "catalog")]
    metadata: Option<PathBuf>,

    /// Sample catalog exported from the tracking service
    #[arg(long, value_name = "CATALOG.JSON", requires = "individual")]
    catalog: Option<PathBuf>,

    /// Individual to look up in the catalog
    #[arg(long, value_name = "ID")]
    individual: Option<String>,
}

#[derive(Args)]
struct PipelineArgs {
    /// JSON pipeline configuration; other pipeline options are ignored when set
    #[arg(long, value_name = "CONFIG.JSON")]
    config: Option<PathBuf>,

    /// Reference genome FASTA
    #[arg(short = 'R', long, value_name = "REF.FA", default_value = DEFAULT_REFERENCE)]
    reference: String,

    #[arg(long, value_name = "VCF", default_value = DEFAULT_DBSNP)]
    dbsnp: String,

    /// Known indel sites, repeatable
    #[arg(long = "known-indels", value_name = "VCF")]
    known_indels: Vec<String>,

    #[arg(long, value_name = "INTERVALS")]
    targets: Option<String>,

    #[arg(long, value_name = "INTERVALS")]
    baits: Option<String>,

    /// Population allele frequencies for contamination estimation
    #[arg(long, value_name = "VCF", default_value = DEFAULT_POPULATION_FREQUENCIES)]
    population_frequencies: String,

    #[arg(long)]
    skip_qc: bool,

    #[arg(long)]
    post_recal: bool,

    /// Call variants on every sample individually
    #[arg(long)]
    call: bool,

    /// Only process target intervals, without scattering
    #[arg(long)]
    quick: bool,

    #[arg(long, value_name = "GB", default_value = "4")]
    memory: u32,

    #[arg(short = 't', long, value_name = "INT", default_value = "1")]
    threads: u32,

    #[arg(long, value_name = "INT", default_value = "1")]
    scatter_count: u32,
}

impl PipelineArgs {
    fn load(self) -> Result<PipelineConfig> {
        if let Some(path) = &self.config {
            return PipelineConfig::read(path).with_context(|| format!("Loading {}", path.display()));
        }
        Ok(PipelineConfig {
            skip_qc: self.skip_qc,
            do_post_recal: self.post_recal,
            do_single_sample_calling: self.call,
            quick_mode: self.quick,
            reference: self.reference,
            dbsnp: Some(self.dbsnp),
            known_indels: self.known_indels,
            target_intervals: self.targets,
            bait_intervals: self.baits,
            population_frequencies: Some(self.population_frequencies),
            resources: ResourceSettings {
                memory_gb: self.memory,
                threads: self.threads,
                scatter_count: self.scatter_count,
            },
        })
    }
}

/// Metadata loaded from the command line, kept alive while planning borrows it
enum Input {
    File(PathBuf),
    Catalog(JsonSampleCatalog, String),
}

impl InputArgs {
    fn load(self) -> Result<Input> {
        match (self.metadata, self.catalog, self.individual) {
            (Some(path), _, _) => Ok(Input::File(path)),
            (None, Some(path), Some(individual)) => {
                let catalog = JsonSampleCatalog::read(&path).with_context(|| format!("Loading {}", path.display()))?;
                Ok(Input::Catalog(catalog, individual))
            }
            _ => anyhow::bail!("--metadata or --catalog with --individual is required"),
        }
    }
}

impl Input {
    fn source(&self) -> MetadataSource<'_> {
        match self {
            Input::File(path) => MetadataSource::File(path),
            Input::Catalog(catalog, individual) => MetadataSource::Service { individual: individual.as_str(), lookup: catalog },
        }
    }
}

fn main() -> Result<()> {
    env_logger::init();
    info!("lanegraph starting up");

    let cli = Cli::parse();
    match cli.command {
        Commands::Plan { input, pipeline, output } => {
            let input = input.load()?;
            let config = pipeline.load()?;
            let graph = plan(&input.source(), &config)?;
            let json = graph.to_json()?;
            match output {
                Some(path) => {
                    info!("Writing plan to {}", path.display());
                    fs::write(&path, json).with_context(|| format!("Writing {}", path.display()))?;
                }
                None => println!("{json}"),
            }
        }
        Commands::Declare { input, pipeline, db, dry_run } => {
            let input = input.load()?;
            let config = pipeline.load()?;
            let conn = open_db(&db).with_context(|| format!("Opening {}", db.display()))?;
            let mut engine = SqliteEngine::new(&conn);
            let mut sink = SqliteSink::new(&conn);
            let result = plan_and_declare(&input.source(), &config, &mut engine, &mut sink);
            // a failed plan never wrote anything, but a failed insert may have
            let rollback = dry_run || result.is_err();
            release_or_rollback(&conn, rollback)?;
            let graph = result?;
            if dry_run {
                warn!("Dry run: {} tasks were planned but not kept", graph.tasks().len());
            }
        }
    }

    Ok(())
}
