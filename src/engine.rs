//! Collaborators that receive the plan, and the planning entry points

use log::info;

use crate::config::PipelineConfig;
use crate::error::Result;
use crate::graph::builder::PipelineGraphBuilder;
use crate::graph::task::Task;
use crate::graph::PipelineGraph;
use crate::metadata::MetadataSource;

/// Scheduler that runs declared tasks; execution, retries and parallelism all happen there
pub trait ExecutionEngine {
    fn declare(&mut self, task: &Task) -> anyhow::Result<()>;
}

/// Reporting transport for named outputs, fire-and-forget
pub trait OutputSink {
    fn publish(&mut self, individual: &str, key: &str, path: &str);
}

/// Resolve metadata and build the complete graph, without declaring anything
pub fn plan(source: &MetadataSource, config: &PipelineConfig) -> Result<PipelineGraph> {
    let builder = PipelineGraphBuilder::new(config)?;
    let lanes = source.resolve()?;
    builder.build(&lanes)
}

/// Plan, then declare; nothing reaches the engine or sink unless planning succeeded
pub fn plan_and_declare(
    source: &MetadataSource,
    config: &PipelineConfig,
    engine: &mut dyn ExecutionEngine,
    sink: &mut dyn OutputSink,
) -> anyhow::Result<PipelineGraph> {
    let mut graph = plan(source, config)?;
    info!("Plan is complete, declaring");
    graph.declare(engine, sink)?;
    Ok(graph)
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;
    use crate::error::PlanError;
    use crate::graph::state::TaskState;
    use crate::metadata::file::METADATA_HEADER;

    #[derive(Default)]
    struct Recorder {
        tasks: Vec<Task>,
        outputs: Vec<(String, String, String)>,
    }

    impl ExecutionEngine for Recorder {
        fn declare(&mut self, task: &Task) -> anyhow::Result<()> {
            self.tasks.push(task.clone());
            Ok(())
        }
    }

    impl OutputSink for Recorder {
        fn publish(&mut self, individual: &str, key: &str, path: &str) {
            self.outputs.push((individual.to_string(), key.to_string(), path.to_string()));
        }
    }

    fn metadata(lines: &[&str]) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "{METADATA_HEADER}").unwrap();
        for line in lines {
            writeln!(file, "{line}").unwrap();
        }
        file
    }

    #[test]
    fn declares_whole_plan() {
        let file = metadata(&[
            "n1.fq,n2.fq,IND1,NORMAL,LIB1,SEQ1,0,ILLUMINA,PU1,CTR1,desc,2020-01-01",
            "t1.fq,,IND1,TUMOR,LIB2,SEQ2,1,ILLUMINA,PU2,CTR1,desc,2020-01-01",
        ]);
        let mut engine = Recorder::default();
        let mut sink = Recorder::default();
        let source = MetadataSource::File(file.path());
        let graph = plan_and_declare(&source, &PipelineConfig::default(), &mut engine, &mut sink).unwrap();

        assert_eq!(engine.tasks.len(), graph.tasks().len());
        assert_eq!(sink.outputs.len(), graph.outputs().len());
        assert!(graph.tasks().iter().all(|t| t.state == TaskState::Declared));
        assert!(sink.outputs.iter().any(|(ind, key, _)| ind == "IND1" && key == "tumorContEstValue"));
        // engine sees producers before consumers
        for (position, task) in engine.tasks.iter().enumerate() {
            assert_eq!(task.id.0, position);
        }
    }

    #[test]
    fn failed_plan_declares_nothing() {
        let file = metadata(&[
            "a.fq,,IND1,S1,LIB1,SEQ1,1,ILLUMINA,PU1,CTR1,desc,2020-01-01",
            "b.fq,,IND1,S1,LIB1,SEQ2,0,ILLUMINA,PU2,CTR1,desc,2020-01-01",
        ]);
        let mut engine = Recorder::default();
        let mut sink = Recorder::default();
        let source = MetadataSource::File(file.path());
        let err = plan_and_declare(&source, &PipelineConfig::default(), &mut engine, &mut sink).unwrap_err();

        assert!(matches!(err.downcast_ref::<PlanError>(), Some(PlanError::InconsistentTumorStatus { .. })));
        assert!(engine.tasks.is_empty());
        assert!(sink.outputs.is_empty());
    }

    #[test]
    fn bad_header_declares_nothing() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "#FILE1,FILE2").unwrap();
        let source = MetadataSource::File(file.path());
        assert!(matches!(plan(&source, &PipelineConfig::default()), Err(PlanError::MetadataFormat { line: 1, .. })));
    }

    #[test]
    fn plans_from_catalog() {
        use crate::metadata::service::JsonSampleCatalog;

        let catalog = JsonSampleCatalog::parse(
            r#"{"individuals": [{"id": "P7", "samples": [{
                "name": "BLOOD", "library": "L", "sequencing": "R", "tumor": false,
                "platform": "ILLUMINA", "center": "BI", "date_sequenced": "2012-01-01",
                "fastqs": [{"read1": "b_1.fq", "read2": "b_2.fq"}]
            }]}]}"#,
        )
        .unwrap();
        let source = MetadataSource::Service { individual: "P7", lookup: &catalog };
        let graph = plan(&source, &PipelineConfig::default()).unwrap();
        assert_eq!(graph.tasks()[0].outputs, vec!["P7.BLOOD.L.R.1.normal.bam"]);
        assert!(graph.outputs().iter().all(|o| o.individual == "P7"));

        let missing = MetadataSource::Service { individual: "P8", lookup: &catalog };
        assert!(matches!(plan(&missing, &PipelineConfig::default()), Err(PlanError::EmptyCohort)));
    }
}
