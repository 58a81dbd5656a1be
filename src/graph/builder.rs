use std::collections::{BTreeSet, HashMap, HashSet};

use log::{debug, info};

use crate::cohort::{Cohort, LaneAlignment, SampleGroup};
use crate::config::PipelineConfig;
use crate::error::{PlanError, Result};
use crate::graph::state::TaskState;
use crate::graph::task::{ResourceHints, Task, TaskId, TaskKind};
use crate::graph::tools::{ToolContext, Tools};
use crate::graph::PipelineGraph;
use crate::metadata::lane::LaneRecord;
use crate::naming::{self, SampleArtifacts};
use crate::publish::{self, PublishedOutput};

/// Most samples the joint indel realigner can track output files for in one invocation
pub const JOINT_REALIGNMENT_MAX_SAMPLES: usize = 5;

pub fn check_joint_capacity(samples: usize) -> Result<()> {
    match samples > JOINT_REALIGNMENT_MAX_SAMPLES {
        true => Err(PlanError::JointRealignmentCapacity { samples, limit: JOINT_REALIGNMENT_MAX_SAMPLES }),
        false => Ok(()),
    }
}

/// A task is intermediate when every output feeds a later task and none is published
///
/// Unconsumed outputs such as diagnostic tables are terminal and must survive cleanup.
fn mark_intermediate(tasks: &mut [Task], outputs: &[PublishedOutput]) {
    let published: HashSet<&str> = outputs.iter().map(|o| o.path.as_str()).collect();
    let consumed: HashSet<String> = tasks.iter().flat_map(|t| t.inputs.iter().cloned()).collect();
    for task in tasks.iter_mut() {
        task.intermediate = task
            .outputs
            .iter()
            .all(|output| consumed.contains(output) && !published.contains(output.as_str()));
    }
}

/// Tasks declared so far and which task produces each artifact
#[derive(Default)]
struct Wiring {
    tasks: Vec<Task>,
    producers: HashMap<String, TaskId>,
}

impl Wiring {
    /// Add a task, depending on every earlier task that produces one of its inputs
    fn add(
        &mut self,
        kind: TaskKind,
        inputs: Vec<String>,
        outputs: Vec<String>,
        resources: ResourceHints,
        command: String,
    ) -> Result<TaskId> {
        let id = TaskId(self.tasks.len());
        for output in &outputs {
            if self.producers.contains_key(output) {
                return Err(PlanError::DuplicateArtifact { path: output.clone() });
            }
        }

        let depends_on: BTreeSet<TaskId> = inputs.iter().filter_map(|input| self.producers.get(input).copied()).collect();
        for output in &outputs {
            self.producers.insert(output.clone(), id);
        }

        debug!("{} {} <- {:?}", id, kind, depends_on);
        self.tasks.push(Task {
            id,
            kind,
            inputs,
            outputs,
            resources,
            intermediate: true,
            depends_on,
            command,
            state: TaskState::Created,
        });
        Ok(id)
    }
}

/// Builds the whole task graph for one run
pub struct PipelineGraphBuilder<'a> {
    config: &'a PipelineConfig,
    tools: Tools,
}

impl<'a> PipelineGraphBuilder<'a> {
    pub fn new(config: &'a PipelineConfig) -> Result<PipelineGraphBuilder<'a>> {
        config.validate()?;
        Ok(PipelineGraphBuilder { config, tools: Tools::new()? })
    }

    /// Plan every task for `lanes`
    ///
    /// Either returns the complete graph or fails without producing anything.
    pub fn build(&self, lanes: &[LaneRecord]) -> Result<PipelineGraph> {
        let cohort = Cohort::aggregate(lanes)?;
        if cohort.is_empty() {
            return Err(PlanError::EmptyCohort);
        }
        check_joint_capacity(cohort.len())?;
        if cohort.tumor().is_some() && cohort.normal().is_some() && self.config.population_frequencies.is_none() {
            return Err(PlanError::InvalidConfig(
                "contamination estimation needs population allele frequencies".to_string(),
            ));
        }

        let names: HashMap<&str, SampleArtifacts> = cohort
            .samples()
            .iter()
            .map(|s| (s.sample.as_str(), SampleArtifacts::new(&s.sample)))
            .collect();
        let artifacts = |sample: &SampleGroup| &names[sample.sample.as_str()];

        let mut wiring = Wiring::default();
        for sample in cohort.samples() {
            for lane in &sample.lanes {
                self.align(&mut wiring, lane)?;
            }
            self.merge(&mut wiring, sample, artifacts(sample))?;
        }

        self.clean(&mut wiring, &cohort, &artifacts)?;

        for sample in cohort.samples() {
            self.process(&mut wiring, sample, artifacts(sample))?;
        }

        if let (Some(tumor), Some(normal)) = (cohort.tumor(), cohort.normal()) {
            self.contamination(&mut wiring, tumor, artifacts(tumor), normal, artifacts(normal))?;
            self.contamination(&mut wiring, normal, artifacts(normal), normal, artifacts(normal))?;
        }

        let producers = &wiring.producers;
        let outputs = publish::bindings(
            &cohort,
            artifacts,
            self.config.do_single_sample_calling,
            |path| producers.contains_key(path),
        );

        let mut tasks = wiring.tasks;
        mark_intermediate(&mut tasks, &outputs);

        info!("Planned {} tasks and {} outputs for {} samples", tasks.len(), outputs.len(), cohort.len());
        Ok(PipelineGraph::new(tasks, outputs))
    }

    fn add(
        &self,
        wiring: &mut Wiring,
        kind: TaskKind,
        inputs: Vec<String>,
        outputs: Vec<String>,
        resources: ResourceHints,
        context: ToolContext,
    ) -> Result<TaskId> {
        let command = self.tools.render(&kind, &context)?;
        wiring.add(kind, inputs, outputs, resources, command)
    }

    fn jvm(&self) -> ResourceHints {
        ResourceHints::jvm(self.config.resources.memory_gb)
    }

    fn scattered(&self) -> ResourceHints {
        self.jvm().scattered(self.config.scatter_count())
    }

    fn base_context(&self) -> ToolContext {
        ToolContext {
            memory_gb: self.config.resources.memory_gb,
            threads: self.config.resources.threads,
            reference: self.config.reference.clone(),
            intervals: self.config.restricted_intervals().map(str::to_string),
            dbsnp: self.config.dbsnp.clone(),
            population: self.config.population_frequencies.clone(),
            ..Default::default()
        }
    }

    fn with_intervals(&self, mut inputs: Vec<String>) -> Vec<String> {
        if let Some(intervals) = self.config.restricted_intervals() {
            inputs.push(intervals.to_string());
        }
        inputs
    }

    fn align(&self, wiring: &mut Wiring, alignment: &LaneAlignment) -> Result<TaskId> {
        let lane = &alignment.lane;
        let mut inputs = vec![lane.read1.clone()];
        let kind = match &lane.read2 {
            Some(mate) => {
                inputs.push(mate.clone());
                TaskKind::PairedAlignment { lane: lane.id }
            }
            None => TaskKind::SingleEndAlignment { lane: lane.id },
        };
        inputs.push(self.config.reference.clone());

        let context = ToolContext {
            read_group: lane.read_group(),
            read1: lane.read1.clone(),
            read2: lane.read2.clone().unwrap_or_default(),
            output: alignment.bam.clone(),
            ..self.base_context()
        };
        let resources = ResourceHints::threaded(self.config.resources.threads);
        self.add(wiring, kind, inputs, vec![alignment.bam.clone()], resources, context)
    }

    fn merge(&self, wiring: &mut Wiring, sample: &SampleGroup, names: &SampleArtifacts) -> Result<TaskId> {
        let inputs: Vec<String> = sample.lanes.iter().map(|l| l.bam.clone()).collect();
        let context = ToolContext {
            inputs: inputs.clone(),
            output: names.merged_bam.clone(),
            ..self.base_context()
        };
        let kind = TaskKind::Merge { sample: sample.sample.clone() };
        let outputs = vec![names.merged_bam.clone(), names.merged_bai.clone()];
        self.add(wiring, kind, inputs, outputs, self.jvm(), context)
    }

    /// Joint realignment around indels, seeing every sample at once
    fn clean<'n, F>(&self, wiring: &mut Wiring, cohort: &Cohort, artifacts: &F) -> Result<TaskId>
    where
        F: Fn(&SampleGroup) -> &'n SampleArtifacts,
    {
        let bams: Vec<String> = cohort.samples().iter().map(|s| artifacts(s).merged_bam.clone()).collect();
        let indexed: Vec<String> = cohort
            .samples()
            .iter()
            .flat_map(|s| [artifacts(s).merged_bam.clone(), artifacts(s).merged_bai.clone()])
            .collect();
        let reference = vec![self.config.reference.clone()];
        let known = self.config.known_indels.clone();

        let first = &cohort.samples()[0];
        let targets = naming::realigner_intervals(&first.individual);
        let context = ToolContext {
            inputs: bams.clone(),
            known_sites: known.clone(),
            output: targets.clone(),
            ..self.base_context()
        };
        let inputs = self.with_intervals([indexed.clone(), reference.clone(), known.clone()].concat());
        self.add(wiring, TaskKind::TargetCreation, inputs, vec![targets.clone()], self.scattered(), context)?;

        let outputs: Vec<String> = cohort
            .samples()
            .iter()
            .flat_map(|s| [artifacts(s).clean_bam.clone(), artifacts(s).clean_bai.clone()])
            .collect();
        let context = ToolContext {
            inputs: bams,
            known_sites: known.clone(),
            realign_targets: targets.clone(),
            ..self.base_context()
        };
        let kind = TaskKind::JointRealignment { samples: cohort.samples().iter().map(|s| s.sample.clone()).collect() };
        let inputs = self.with_intervals([indexed, vec![targets], reference, known].concat());
        self.add(wiring, kind, inputs, outputs, self.scattered(), context)
    }

    /// Per-sample chain after cleaning, with the QC fan-out off the recalibrated BAM
    fn process(&self, wiring: &mut Wiring, sample: &SampleGroup, names: &SampleArtifacts) -> Result<()> {
        let id = || sample.sample.clone();
        let reference = self.config.reference.clone();

        let context = ToolContext {
            input: names.clean_bam.clone(),
            output: names.dedup_bam.clone(),
            metrics: names.duplicate_metrics.clone(),
            ..self.base_context()
        };
        self.add(
            wiring,
            TaskKind::Deduplication { sample: id() },
            vec![names.clean_bam.clone(), names.clean_bai.clone()],
            vec![names.dedup_bam.clone(), names.dedup_bai.clone(), names.duplicate_metrics.clone()],
            self.jvm(),
            context,
        )?;

        let known = self.config.known_sites();
        let context = ToolContext {
            input: names.dedup_bam.clone(),
            known_sites: known.clone(),
            output: names.pre_recal_table.clone(),
            ..self.base_context()
        };
        let inputs = [vec![names.dedup_bam.clone(), names.dedup_bai.clone(), reference.clone()], known.clone()].concat();
        self.add(
            wiring,
            TaskKind::BaseRecalibration { sample: id() },
            self.with_intervals(inputs),
            vec![names.pre_recal_table.clone()],
            self.scattered(),
            context,
        )?;

        let context = ToolContext {
            input: names.dedup_bam.clone(),
            recal_table: names.pre_recal_table.clone(),
            output: names.recal_bam.clone(),
            ..self.base_context()
        };
        let inputs = vec![
            names.dedup_bam.clone(),
            names.dedup_bai.clone(),
            names.pre_recal_table.clone(),
            reference.clone(),
        ];
        self.add(
            wiring,
            TaskKind::ApplyRecalibration { sample: id() },
            self.with_intervals(inputs),
            vec![names.recal_bam.clone(), names.recal_bai.clone()],
            self.scattered(),
            context,
        )?;

        let recalibrated = vec![names.recal_bam.clone(), names.recal_bai.clone(), reference.clone()];

        if self.config.do_post_recal {
            let context = ToolContext {
                input: names.recal_bam.clone(),
                known_sites: known.clone(),
                output: names.post_recal_table.clone(),
                ..self.base_context()
            };
            self.add(
                wiring,
                TaskKind::PostRecalibration { sample: id() },
                self.with_intervals([recalibrated.clone(), known].concat()),
                vec![names.post_recal_table.clone()],
                self.scattered(),
                context,
            )?;
        }

        if !self.config.skip_qc {
            self.qc(wiring, sample, names, &recalibrated)?;
        }

        let context = ToolContext {
            input: names.recal_bam.clone(),
            output: names.reduced_bam.clone(),
            ..self.base_context()
        };
        self.add(
            wiring,
            TaskKind::Reduction { sample: id() },
            self.with_intervals(recalibrated),
            vec![names.reduced_bam.clone(), names.reduced_bai.clone()],
            self.scattered(),
            context,
        )?;

        if self.config.do_single_sample_calling {
            let context = ToolContext {
                input: names.reduced_bam.clone(),
                output: names.vcf.clone(),
                ..self.base_context()
            };
            let inputs = [
                vec![names.reduced_bam.clone(), names.reduced_bai.clone(), reference],
                self.config.dbsnp.iter().cloned().collect(),
            ]
            .concat();
            self.add(
                wiring,
                TaskKind::SingleSampleCalling { sample: id() },
                self.with_intervals(inputs),
                vec![names.vcf.clone(), names.vcf_index.clone()],
                self.scattered(),
                context,
            )?;
        }

        Ok(())
    }

    /// Sibling metrics tasks, none of which feeds another stage
    fn qc(&self, wiring: &mut Wiring, sample: &SampleGroup, names: &SampleArtifacts, recalibrated: &[String]) -> Result<()> {
        let id = || sample.sample.clone();

        if let Some((targets, baits)) = self.config.hs_intervals() {
            let context = ToolContext {
                input: names.recal_bam.clone(),
                output: names.hs_metrics.clone(),
                targets: targets.to_string(),
                baits: baits.to_string(),
                ..self.base_context()
            };
            let inputs = [recalibrated.to_vec(), vec![targets.to_string(), baits.to_string()]].concat();
            self.add(
                wiring,
                TaskKind::HybridSelectionMetrics { sample: id() },
                inputs,
                vec![names.hs_metrics.clone()],
                self.jvm(),
                context,
            )?;
        }

        let context = ToolContext {
            input: names.recal_bam.clone(),
            output: names.gc_metrics.clone(),
            chart: names.gc_chart.clone(),
            ..self.base_context()
        };
        self.add(
            wiring,
            TaskKind::GcBiasMetrics { sample: id() },
            recalibrated.to_vec(),
            vec![names.gc_metrics.clone(), names.gc_chart.clone()],
            self.jvm(),
            context,
        )?;

        let context = ToolContext {
            input: names.recal_bam.clone(),
            output: names.multiple_metrics.base.clone(),
            ..self.base_context()
        };
        self.add(
            wiring,
            TaskKind::MultipleMetrics { sample: id() },
            recalibrated.to_vec(),
            names.multiple_metrics.files(),
            self.jvm(),
            context,
        )?;

        Ok(())
    }

    /// Contamination of `eval`, using `genotype`'s BAM for genotypes
    fn contamination(
        &self,
        wiring: &mut Wiring,
        eval: &SampleGroup,
        eval_names: &SampleArtifacts,
        genotype: &SampleGroup,
        genotype_names: &SampleArtifacts,
    ) -> Result<TaskId> {
        let mut inputs = vec![eval_names.recal_bam.clone(), eval_names.recal_bai.clone()];
        if genotype.sample != eval.sample {
            inputs.push(genotype_names.recal_bam.clone());
            inputs.push(genotype_names.recal_bai.clone());
        }
        inputs.push(self.config.reference.clone());
        inputs.extend(self.config.population_frequencies.iter().cloned());

        let context = ToolContext {
            input: eval_names.recal_bam.clone(),
            genotypes: genotype_names.recal_bam.clone(),
            output: eval_names.contamination.clone(),
            value_output: eval_names.contamination_value.clone(),
            ..self.base_context()
        };
        let kind = TaskKind::Contamination { sample: eval.sample.clone(), genotypes: genotype.sample.clone() };
        let outputs = vec![eval_names.contamination.clone(), eval_names.contamination_value.clone()];
        self.add(wiring, kind, self.with_intervals(inputs), outputs, self.jvm(), context)
    }
}
