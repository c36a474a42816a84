// src/dag/workflow.rs

use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};

use blake3::Hasher;
use petgraph::algo::toposort;
use petgraph::graphmap::DiGraphMap;
use serde::Serialize;
use tracing::debug;

use crate::errors::{GwflowError, Result};
use crate::files::FileList;
use crate::jobs::{JobId, JobRecord};
use crate::segments::Segment;
use crate::stage::StagePlan;

/// Job graph accumulated from successive stage plans.
///
/// Edges are derived from file identity: a job that lists a file among its
/// parents depends on the job whose output has that path. Parents produced
/// outside the workflow add no edge.
#[derive(Debug, Clone, Default)]
pub struct Workflow {
    jobs: Vec<JobRecord>,
    by_id: HashMap<JobId, usize>,
    producers: HashMap<PathBuf, usize>,
}

impl Workflow {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add every job of `plan` and return the plan's outputs.
    ///
    /// Nothing is added if any job id or output path is already present.
    pub fn add_stage(&mut self, plan: StagePlan) -> Result<FileList> {
        self.check_new_jobs(&plan.jobs)?;

        debug!(stage = %plan.stage, jobs = plan.jobs.len(), "adding stage to workflow");
        for job in plan.jobs {
            let idx = self.jobs.len();
            self.by_id.insert(job.id.clone(), idx);
            self.producers.insert(job.output.path.clone(), idx);
            self.jobs.push(job);
        }
        Ok(plan.outputs)
    }

    fn check_new_jobs(&self, jobs: &[JobRecord]) -> Result<()> {
        let mut ids = HashSet::new();
        let mut paths = HashSet::new();
        for job in jobs {
            if self.by_id.contains_key(&job.id) || !ids.insert(&job.id) {
                return Err(GwflowError::ConfigError(format!(
                    "job {} ({}) is already part of the workflow",
                    job.id,
                    job.output.file_name()
                )));
            }
            if self.producers.contains_key(&job.output.path) || !paths.insert(&job.output.path) {
                return Err(GwflowError::ConfigError(format!(
                    "output {} is produced by more than one job",
                    job.output.path.display()
                )));
            }
        }
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.jobs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.jobs.is_empty()
    }

    /// Jobs in insertion order.
    pub fn jobs(&self) -> &[JobRecord] {
        &self.jobs
    }

    pub fn job(&self, id: &JobId) -> Option<&JobRecord> {
        self.by_id.get(id).map(|&i| &self.jobs[i])
    }

    /// Jobs inside the workflow that `id` directly depends on.
    pub fn dependencies_of(&self, id: &JobId) -> Vec<&JobRecord> {
        let Some(&idx) = self.by_id.get(id) else {
            return Vec::new();
        };
        self.parent_indices(idx)
            .into_iter()
            .map(|p| &self.jobs[p])
            .collect()
    }

    /// Jobs with no dependencies inside the workflow.
    pub fn roots(&self) -> Vec<&JobRecord> {
        (0..self.jobs.len())
            .filter(|&i| self.parent_indices(i).is_empty())
            .map(|i| &self.jobs[i])
            .collect()
    }

    pub fn edge_count(&self) -> usize {
        self.graph().edge_count()
    }

    /// Jobs ordered so that every job follows its dependencies.
    ///
    /// Jobs are grouped by depth (longest dependency chain above them), and
    /// keep insertion order within a depth, so the order is reproducible.
    pub fn ordered_jobs(&self) -> Result<Vec<&JobRecord>> {
        let graph = self.graph();
        let order = toposort(&graph, None).map_err(|cycle| {
            GwflowError::WorkflowCycle(self.jobs[cycle.node_id()].id.to_string())
        })?;

        let mut depth = vec![0usize; self.jobs.len()];
        for node in order {
            for parent in self.parent_indices(node) {
                depth[node] = depth[node].max(depth[parent] + 1);
            }
        }

        let mut indices: Vec<usize> = (0..self.jobs.len()).collect();
        indices.sort_by_key(|&i| (depth[i], i));
        Ok(indices.into_iter().map(|i| &self.jobs[i]).collect())
    }

    /// BLAKE3 digest over job ids and output names in insertion order.
    pub fn fingerprint(&self) -> String {
        let mut hasher = Hasher::new();
        for job in &self.jobs {
            hasher.update(job.id.as_str().as_bytes());
            hasher.update(b"\0");
            hasher.update(job.output.file_name().as_bytes());
            hasher.update(b"\n");
        }
        hasher.finalize().to_hex().to_string()
    }

    /// Render the workflow as a TOML document, jobs in dependency order.
    pub fn to_toml(&self) -> Result<String> {
        let ordered = self.ordered_jobs()?;
        let doc = PlanDocument {
            fingerprint: self.fingerprint(),
            jobs: ordered.len(),
            job: ordered
                .into_iter()
                .map(|job| PlannedJob {
                    id: &job.id,
                    executable: &job.executable_path,
                    detector: &job.detector,
                    depends_on: self
                        .dependencies_of(&job.id)
                        .into_iter()
                        .map(|d| &d.id)
                        .collect(),
                    inputs: job.inputs.iter().map(|f| f.path.as_path()).collect(),
                    output: &job.output.path,
                    window: job.window,
                    data_span: job.data_span,
                })
                .collect(),
        };
        Ok(toml::to_string_pretty(&doc)?)
    }

    fn parent_indices(&self, idx: usize) -> Vec<usize> {
        let mut parents: Vec<usize> = self.jobs[idx]
            .parents
            .iter()
            .filter_map(|f| self.producers.get(&f.path).copied())
            .collect();
        parents.sort_unstable();
        parents.dedup();
        parents
    }

    fn graph(&self) -> DiGraphMap<usize, ()> {
        let mut graph = DiGraphMap::new();
        for idx in 0..self.jobs.len() {
            graph.add_node(idx);
        }
        for idx in 0..self.jobs.len() {
            for parent in self.parent_indices(idx) {
                graph.add_edge(parent, idx, ());
            }
        }
        graph
    }
}

#[derive(Serialize)]
struct PlanDocument<'a> {
    fingerprint: String,
    jobs: usize,
    job: Vec<PlannedJob<'a>>,
}

#[derive(Serialize)]
struct PlannedJob<'a> {
    id: &'a JobId,
    executable: &'a Path,
    detector: &'a str,
    depends_on: Vec<&'a JobId>,
    inputs: Vec<&'a Path>,
    output: &'a Path,
    // tables last
    window: Segment,
    data_span: Segment,
}
