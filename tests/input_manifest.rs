// tests/input_manifest.rs

mod common;

use std::path::{Path, PathBuf};

use gwflow::config::load_inputs;
use gwflow::datafind::{parse_cache, record_from_frame_path};
use gwflow::errors::GwflowError;
use gwflow::files::FileRole;
use gwflow_test_utils::builders::{WorkflowConfigBuilder, seg};
use gwflow_test_utils::write_file;
use tempfile::TempDir;

use common::plan_banks;

#[test]
fn frame_name_gives_detector_and_span() {
    let rec = record_from_frame_path("/frames/H-H1_LDAS_C02_L2-967593543-128.gwf").unwrap();

    assert_eq!(rec.detector.as_deref(), Some("H1"));
    assert_eq!(rec.span, seg(967593543, 967593671));
    assert_eq!(rec.description, "H1_LDAS_C02_L2");
    assert_eq!(rec.role, FileRole::DataLocation);
}

#[test]
fn frame_name_without_gps_fields_is_rejected() {
    let result = record_from_frame_path("/frames/H1-data.gwf");

    assert!(matches!(result, Err(GwflowError::ConfigError(_))));
}

#[test]
fn cache_lines_become_records() {
    let text = "\
# observatory type start duration url
L L1_HOFT_C00 1000 4000 file://localhost/frames/L-L1_HOFT_C00-1000-4000.gwf

H H1_HOFT_C00 1000 64 /frames/H-H1_HOFT_C00-1000-64.gwf
";

    let records = parse_cache(Path::new("test.lcf"), text).unwrap();

    assert_eq!(records.len(), 2);
    let l1: Vec<_> = records.for_detector("L1").collect();
    assert_eq!(l1.len(), 1);
    assert_eq!(l1[0].span, seg(1000, 5000));
    assert_eq!(
        l1[0].path,
        PathBuf::from("/frames/L-L1_HOFT_C00-1000-4000.gwf")
    );
    assert_eq!(records.for_detector("H1").count(), 1);
}

#[test]
fn short_cache_line_reports_its_line_number() {
    let text = "L L1_HOFT_C00 1000 4000 /a.gwf\nL L1_HOFT_C00 1000\n";

    match parse_cache(Path::new("bad.lcf"), text) {
        Err(GwflowError::ConfigError(msg)) => assert!(msg.contains("bad.lcf:2")),
        Err(e) => panic!("Expected ConfigError, got: {:?}", e),
        Ok(_) => panic!("Expected error, got Ok"),
    }
}

#[test]
fn frame_type_must_match_observatory() {
    let text = "H L1_HOFT_C00 1000 4000 /a.gwf\n";

    assert!(matches!(
        parse_cache(Path::new("x.lcf"), text),
        Err(GwflowError::ConfigError(_))
    ));
}

#[test]
fn manifest_collects_segments_data_and_injection() {
    let tmp = TempDir::new().unwrap();
    write_file(
        tmp.path(),
        "caches/L1.lcf",
        "L L1_HOFT_C00 0 5000 file:///frames/L-L1_HOFT_C00-0-5000.gwf\n",
    )
    .unwrap();
    let manifest = write_file(
        tmp.path(),
        "inputs.toml",
        r#"
frames = ["/frames/H-H1_LDAS_C02_L2-1000-4000.gwf"]
data_cache = ["caches/L1.lcf"]

[[segment]]
detector = "H1"
start = 2000
end = 3000

[[segment]]
detector = "H1"
start = 1000
end = 1500

[[segment]]
detector = "L1"
start = 1000
end = 4000

[[data]]
detector = "H1"
start = 0
end = 1000
path = "/data/H1-early.gwf"

[injection]
path = "inj/HL-INJECTIONS-1000-4000.xml"
start = 1000
end = 5000
"#,
    )
    .unwrap();

    let inputs = load_inputs(&manifest).unwrap();

    assert_eq!(inputs.detectors().collect::<Vec<_>>(), vec!["H1", "L1"]);
    assert_eq!(inputs.segments["H1"], vec![seg(1000, 1500), seg(2000, 3000)]);
    assert_eq!(inputs.data_locations.len(), 3);
    assert_eq!(inputs.data_locations.as_slice()[0].description, "DATAFIND");
    assert_eq!(
        inputs.data_locations.for_detector("L1").next().map(|f| f.path.clone()),
        Some(PathBuf::from("/frames/L-L1_HOFT_C00-0-5000.gwf"))
    );

    let inj = inputs.injection.unwrap();
    assert_eq!(inj.detector, None);
    assert_eq!(inj.role, FileRole::Injection);
    assert_eq!(inj.span, seg(1000, 5000));
}

#[test]
fn overlapping_segments_are_rejected() {
    let tmp = TempDir::new().unwrap();
    let manifest = write_file(
        tmp.path(),
        "inputs.toml",
        r#"
[[segment]]
detector = "H1"
start = 0
end = 1000

[[segment]]
detector = "H1"
start = 500
end = 1500
"#,
    )
    .unwrap();

    match load_inputs(&manifest) {
        Err(GwflowError::ConfigError(msg)) => assert!(msg.contains("overlap")),
        Err(e) => panic!("Expected ConfigError, got: {:?}", e),
        Ok(_) => panic!("Expected error, got Ok"),
    }
}

#[test]
fn inverted_span_is_rejected() {
    let tmp = TempDir::new().unwrap();
    let manifest = write_file(
        tmp.path(),
        "inputs.toml",
        r#"
[[data]]
detector = "H1"
start = 1000
end = 1000
path = "/data/empty.gwf"
"#,
    )
    .unwrap();

    assert!(matches!(
        load_inputs(&manifest),
        Err(GwflowError::ConfigError(_))
    ));
}

#[test]
fn missing_cache_file_is_an_io_error() {
    let tmp = TempDir::new().unwrap();
    let manifest = write_file(tmp.path(), "inputs.toml", "data_cache = [\"nope.lcf\"]\n").unwrap();

    assert!(matches!(
        load_inputs(&manifest),
        Err(GwflowError::IoError(_))
    ));
}

#[test]
fn records_sharing_a_directory_keep_their_spans() {
    let tmp = TempDir::new().unwrap();
    let manifest = write_file(
        tmp.path(),
        "inputs.toml",
        r#"
[[segment]]
detector = "H1"
start = 0
end = 4000

[[data]]
detector = "H1"
start = -512
end = 2000
path = "/frames/H1/"

[[data]]
detector = "H1"
start = 2000
end = 4512
path = "/frames/H1/"

[[data]]
detector = "H1"
start = 2000
end = 4512
path = "/frames/H1/"
"#,
    )
    .unwrap();

    let inputs = load_inputs(&manifest).unwrap();

    assert_eq!(inputs.data_locations.len(), 2);
    let spans: Vec<_> = inputs.data_locations.iter().map(|f| f.span).collect();
    assert_eq!(spans, vec![seg(-512, 2000), seg(2000, 4512)]);

    let config = WorkflowConfigBuilder::standard().build();
    let out = tmp.path().join("tmpltbank");
    let plan = plan_banks(&config, &inputs.segments, &inputs.data_locations, &out, &[]).unwrap();

    assert_eq!(plan.jobs.len(), 2);
    assert!(plan.gaps.is_empty());
    assert_eq!(plan.jobs[1].data_span, seg(1744, 4256));
    assert_eq!(plan.jobs[1].inputs.len(), 2);
}

#[test]
fn cache_span_past_the_largest_gps_time_is_rejected() {
    let text = "H H1_LDAS 9223372036854775000 1000 file:///a.gwf\n";

    match parse_cache(Path::new("huge.lcf"), text) {
        Err(GwflowError::ConfigError(msg)) => assert!(msg.contains("huge.lcf")),
        Err(e) => panic!("Expected ConfigError, got: {:?}", e),
        Ok(_) => panic!("Expected error, got Ok"),
    }
}

#[test]
fn frame_span_past_the_largest_gps_time_is_rejected() {
    let result = record_from_frame_path("/frames/H-H1_LDAS-9223372036854775000-1000.gwf");

    assert!(matches!(result, Err(GwflowError::ConfigError(_))));
}
