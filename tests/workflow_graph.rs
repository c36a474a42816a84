// tests/workflow_graph.rs

mod common;

use std::path::Path;

use gwflow::dag::Workflow;
use gwflow::errors::GwflowError;
use gwflow::files::{FileList, FileRole, WorkflowFile};
use gwflow::jobs::{JobId, JobRecord};
use gwflow::stage::StagePlan;
use gwflow::types::StageKind;
use gwflow_test_utils::builders::{WorkflowConfigBuilder, data_records, seg, segments, tags};
use tempfile::TempDir;

use common::{plan_banks, plan_inspiral};

fn two_stage_workflow(out: &Path, tag_names: &[&str]) -> Workflow {
    let config = WorkflowConfigBuilder::standard().build();
    let segs = segments(&[("H1", 0, 10000)]);
    let data = data_records(&[("H1", -512, 10512)]);
    let tags = tags(tag_names);

    let mut workflow = Workflow::new();
    let bank_plan = plan_banks(&config, &segs, &data, &out.join("tmpltbank"), &tags).unwrap();
    let banks = workflow.add_stage(bank_plan).unwrap();
    let inspiral_plan =
        plan_inspiral(&config, &segs, &data, &banks, None, &out.join("inspiral"), &tags).unwrap();
    workflow.add_stage(inspiral_plan).unwrap();
    workflow
}

#[test]
fn inspiral_jobs_depend_on_their_banks() {
    let tmp = TempDir::new().unwrap();
    let workflow = two_stage_workflow(tmp.path(), &[]);

    assert_eq!(workflow.len(), 10);
    assert_eq!(workflow.edge_count(), 5);

    let roots = workflow.roots();
    assert_eq!(roots.len(), 5);
    assert!(roots.iter().all(|j| j.output.role == FileRole::TemplateBank));

    let inspiral = &workflow.jobs()[5];
    let deps = workflow.dependencies_of(&inspiral.id);
    assert_eq!(deps.len(), 1);
    assert_eq!(deps[0].window, inspiral.window);
    assert_eq!(deps[0].executable, "lalapps_tmpltbank");
}

#[test]
fn ordered_jobs_put_banks_first() {
    let tmp = TempDir::new().unwrap();
    let workflow = two_stage_workflow(tmp.path(), &[]);

    let ordered = workflow.ordered_jobs().unwrap();

    assert_eq!(ordered.len(), 10);
    assert!(ordered[..5].iter().all(|j| j.executable == "lalapps_tmpltbank"));
    assert!(ordered[5..].iter().all(|j| j.executable == "pycbc_inspiral"));
    assert_eq!(ordered[5].window, seg(0, 2000));
}

#[test]
fn adding_a_stage_twice_is_rejected() {
    let tmp = TempDir::new().unwrap();
    let config = WorkflowConfigBuilder::standard().build();
    let segs = segments(&[("H1", 0, 10000)]);
    let data = data_records(&[("H1", -512, 10512)]);
    let plan = plan_banks(&config, &segs, &data, tmp.path(), &[]).unwrap();

    let mut workflow = Workflow::new();
    workflow.add_stage(plan.clone()).unwrap();
    let result = workflow.add_stage(plan);

    assert!(matches!(result, Err(GwflowError::ConfigError(_))));
    assert_eq!(workflow.len(), 5);
}

#[test]
fn fingerprint_is_stable_and_tag_sensitive() {
    let a = TempDir::new().unwrap();
    let b = TempDir::new().unwrap();

    let first = two_stage_workflow(a.path(), &[]);
    let second = two_stage_workflow(b.path(), &[]);
    let tagged = two_stage_workflow(a.path(), &["FULL_DATA"]);

    assert_eq!(first.fingerprint(), second.fingerprint());
    assert_ne!(first.fingerprint(), tagged.fingerprint());
    assert_eq!(first.fingerprint().len(), 64);
}

#[test]
fn plan_document_lists_jobs_in_dependency_order() {
    let tmp = TempDir::new().unwrap();
    let workflow = two_stage_workflow(tmp.path(), &[]);

    let text = workflow.to_toml().unwrap();
    let doc: toml::Table = toml::from_str(&text).unwrap();

    assert_eq!(doc["jobs"].as_integer(), Some(10));
    assert_eq!(
        doc["fingerprint"].as_str(),
        Some(workflow.fingerprint().as_str())
    );

    let jobs = doc["job"].as_array().unwrap();
    assert_eq!(jobs.len(), 10);
    assert!(jobs[0]["depends_on"].as_array().unwrap().is_empty());
    let first_inspiral = jobs[5].as_table().unwrap();
    let depends_on = first_inspiral["depends_on"].as_array().unwrap();
    assert_eq!(depends_on.len(), 1);
    assert_eq!(depends_on[0].as_str(), jobs[0]["id"].as_str());
    assert_eq!(first_inspiral["window"]["start"].as_integer(), Some(0));
    assert_eq!(first_inspiral["window"]["end"].as_integer(), Some(2000));
}

fn job_reading(name: &str, parent: &str) -> JobRecord {
    let window = seg(0, 100);
    let file = |n: &str| {
        WorkflowFile::new(
            Some("H1".to_string()),
            window,
            format!("/out/{n}"),
            "X",
            FileRole::TemplateBank,
        )
    };
    JobRecord {
        id: JobId::derive(name, "H1", &[], &window),
        executable: name.to_string(),
        executable_path: name.into(),
        detector: "H1".to_string(),
        window,
        data_span: window,
        inputs: vec![file(parent)],
        parents: vec![file(parent)],
        output: file(name),
    }
}

#[test]
fn cyclic_dependencies_are_reported() {
    let jobs = vec![job_reading("a", "b"), job_reading("b", "a")];
    let outputs: FileList = jobs.iter().map(|j| j.output.clone()).collect();
    let plan = StagePlan {
        stage: StageKind::TemplateBank,
        jobs,
        outputs,
        gaps: Vec::new(),
        dropped: Vec::new(),
        warnings: Vec::new(),
    };

    let mut workflow = Workflow::new();
    workflow.add_stage(plan).unwrap();

    assert!(matches!(
        workflow.ordered_jobs(),
        Err(GwflowError::WorkflowCycle(_))
    ));
    assert!(workflow.roots().is_empty());
}

#[test]
fn parents_outside_the_workflow_add_no_edges() {
    let tmp = TempDir::new().unwrap();
    let config = WorkflowConfigBuilder::standard().build();
    let segs = segments(&[("H1", 0, 10000)]);
    let data = data_records(&[("H1", -512, 10512)]);
    let banks = plan_banks(&config, &segs, &data, &tmp.path().join("tmpltbank"), &[])
        .unwrap()
        .into_outputs();
    let plan =
        plan_inspiral(&config, &segs, &data, &banks, None, &tmp.path().join("inspiral"), &[])
            .unwrap();

    let mut workflow = Workflow::new();
    workflow.add_stage(plan).unwrap();

    assert_eq!(workflow.edge_count(), 0);
    assert_eq!(workflow.roots().len(), 5);
    assert_eq!(workflow.ordered_jobs().unwrap().len(), 5);
}
