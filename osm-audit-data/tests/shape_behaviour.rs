//! Behavioural tests for the `shape_osm_file` entry point.

use camino::Utf8PathBuf;
use osm_audit_core::{ElementShaper, StreetCorrections};
use osm_audit_data::{
    OsmReadError, OutputFormat, ShapeRunError, ShapeSummary, fs::default_output_path,
    shape_osm_file,
};
use rstest::fixture;
use rstest_bdd_macros::{given, scenario, then, when};
use serde_json::{Value, json};
use std::cell::RefCell;
use tempfile::TempDir;

mod support;

struct ShapeRun {
    _scratch: TempDir,
    output: Utf8PathBuf,
    result: Result<ShapeSummary, ShapeRunError>,
}

#[fixture]
fn source_path() -> RefCell<Option<Utf8PathBuf>> {
    RefCell::new(None)
}

#[fixture]
fn shape_run() -> RefCell<Option<ShapeRun>> {
    RefCell::new(None)
}

fn expect_summary(run: &RefCell<Option<ShapeRun>>) -> ShapeSummary {
    run.borrow()
        .as_ref()
        .expect("shaping was attempted")
        .result
        .as_ref()
        .expect("expected successful shaping")
        .clone()
}

fn read_records(run: &RefCell<Option<ShapeRun>>) -> Vec<Value> {
    let borrowed = run.borrow();
    let run = borrowed.as_ref().expect("shaping was attempted");
    let contents = std::fs::read_to_string(run.output.as_std_path()).unwrap_or_else(|err| {
        panic!("failed to read output {}: {err}", run.output);
    });
    contents
        .lines()
        .map(|line| serde_json::from_str(line).expect("each line is a JSON object"))
        .collect()
}

fn record<'a>(records: &'a [Value], id: &str) -> &'a Value {
    records
        .iter()
        .find(|record| record["id"] == id)
        .unwrap_or_else(|| panic!("record {id} missing"))
}

fn select(source: &RefCell<Option<Utf8PathBuf>>, run: &RefCell<Option<ShapeRun>>, name: &str) {
    *source.borrow_mut() = Some(support::fixtures_dir().join(name));
    *run.borrow_mut() = None;
}

#[given("the sample extract")]
fn sample_extract(
    #[from(source_path)] source: &RefCell<Option<Utf8PathBuf>>,
    #[from(shape_run)] run: &RefCell<Option<ShapeRun>>,
) {
    select(source, run, "sample.osm");
}

#[given("the compressed sample extract")]
fn compressed_extract(
    #[from(source_path)] source: &RefCell<Option<Utf8PathBuf>>,
    #[from(shape_run)] run: &RefCell<Option<ShapeRun>>,
) {
    select(source, run, "sample.osm.bz2");
}

#[given("a path to a missing extract")]
fn missing_extract(
    #[from(source_path)] source: &RefCell<Option<Utf8PathBuf>>,
    #[from(shape_run)] run: &RefCell<Option<ShapeRun>>,
) {
    select(source, run, "missing.osm");
}

#[given("the truncated extract")]
fn truncated_extract(
    #[from(source_path)] source: &RefCell<Option<Utf8PathBuf>>,
    #[from(shape_run)] run: &RefCell<Option<ShapeRun>>,
) {
    select(source, run, "truncated.osm");
}

#[when("I shape the extract")]
fn shape_selected(
    #[from(source_path)] source: &RefCell<Option<Utf8PathBuf>>,
    #[from(shape_run)] run: &RefCell<Option<ShapeRun>>,
) {
    let input = source.borrow().clone().expect("source path prepared");
    let scratch = TempDir::new().expect("tempdir");
    let root = Utf8PathBuf::from_path_buf(scratch.path().to_path_buf()).expect("utf-8 temp dir");
    let output = default_output_path(&root.join(input.file_name().expect("fixture file name")));
    let shaper = ElementShaper::new(StreetCorrections::curated());
    let result = shape_osm_file(&input, &output, &shaper, OutputFormat::Compact);
    *run.borrow_mut() = Some(ShapeRun {
        _scratch: scratch,
        output,
        result,
    });
}

#[then("the output holds one record per node and way")]
fn one_record_per_primitive(#[from(shape_run)] run: &RefCell<Option<ShapeRun>>) {
    let summary = expect_summary(run);
    let records = read_records(run);
    let ids: Vec<&str> = records
        .iter()
        .map(|record| record["id"].as_str().expect("string id"))
        .collect();
    assert_eq!(ids, ["101", "102", "103", "201", "202"]);
    assert_eq!(
        u64::try_from(records.len()).expect("record count fits"),
        summary.records()
    );
    assert_eq!(record(&records, "201")["node_refs"], json!(["101", "102", "103"]));
    assert!(record(&records, "101").get("node_refs").is_none());
}

#[then("the street names are repaired")]
fn street_names_repaired(#[from(shape_run)] run: &RefCell<Option<ShapeRun>>) {
    let records = read_records(run);
    assert_eq!(
        record(&records, "101")["address"],
        json!({"street": "Advance Road", "housenumber": "12"})
    );
    let restaurant = record(&records, "102");
    assert_eq!(restaurant["amenity"], "restaurant");
    assert_eq!(restaurant["address"]["street"], "Mississauga Road");
    let unit = record(&records, "103");
    assert_eq!(
        unit["address"],
        json!({"street": "Meyerside Drive", "unit": "9"})
    );
    assert!(unit.get("bad=key").is_none());
    assert_eq!(record(&records, "201")["address"]["street"], "Foster Crescent");
    assert_eq!(record(&records, "202")["address"]["street"], "Main Street");
}

#[then("the summary counts 3 nodes, 2 ways and 2 skipped elements")]
fn summary_counts(#[from(shape_run)] run: &RefCell<Option<ShapeRun>>) {
    let summary = expect_summary(run);
    assert_eq!(summary.nodes, 3, "expected three nodes");
    assert_eq!(summary.ways, 2, "expected two ways");
    assert_eq!(summary.skipped, 2, "bounds and relation are skipped");
    let bounds = summary.bounds.expect("nodes produce a bounding box");
    assert_eq!(bounds.min().x, -79.6602);
    assert_eq!(bounds.max().x, -79.5804);
    assert_eq!(bounds.min().y, 43.5501);
    assert_eq!(bounds.max().y, 43.6003);
}

#[then("an open error is returned")]
fn open_error(#[from(shape_run)] run: &RefCell<Option<ShapeRun>>) {
    let borrowed = run.borrow();
    let outcome = &borrowed.as_ref().expect("shaping was attempted").result;
    match outcome {
        Ok(_) => panic!("expected an error for the missing file"),
        Err(ShapeRunError::Read(OsmReadError::Open { path, .. })) => {
            assert!(
                path.as_str().ends_with("missing.osm"),
                "unexpected path in error: {path:?}"
            );
        }
        Err(other) => panic!("expected an open error, got {other:?}"),
    }
}

#[then("a read error is returned")]
fn read_error(#[from(shape_run)] run: &RefCell<Option<ShapeRun>>) {
    let borrowed = run.borrow();
    let outcome = &borrowed.as_ref().expect("shaping was attempted").result;
    assert!(
        matches!(
            outcome,
            Err(ShapeRunError::Read(
                OsmReadError::Truncated { .. } | OsmReadError::Xml { .. }
            ))
        ),
        "expected a read error, got {outcome:?}"
    );
}

#[test]
fn scenario_indices_follow_feature_order() {
    let titles = support::scenario_titles("tests/features/shape_extract.feature");
    assert_eq!(
        titles,
        [
            "shaping a plain extract",
            "shaping a compressed extract",
            "reporting a missing extract",
            "rejecting a truncated extract",
        ],
        "scenario order changed in feature file"
    );
}

#[scenario(path = "tests/features/shape_extract.feature", index = 0)]
fn shaping_plain_extract(source_path: RefCell<Option<Utf8PathBuf>>, shape_run: RefCell<Option<ShapeRun>>) {
    let _ = (source_path, shape_run);
}

#[scenario(path = "tests/features/shape_extract.feature", index = 1)]
fn shaping_compressed_extract(
    source_path: RefCell<Option<Utf8PathBuf>>,
    shape_run: RefCell<Option<ShapeRun>>,
) {
    let _ = (source_path, shape_run);
}

#[scenario(path = "tests/features/shape_extract.feature", index = 2)]
fn reporting_missing_extract(
    source_path: RefCell<Option<Utf8PathBuf>>,
    shape_run: RefCell<Option<ShapeRun>>,
) {
    let _ = (source_path, shape_run);
}

#[scenario(path = "tests/features/shape_extract.feature", index = 3)]
fn rejecting_truncated_extract(
    source_path: RefCell<Option<Utf8PathBuf>>,
    shape_run: RefCell<Option<ShapeRun>>,
) {
    let _ = (source_path, shape_run);
}
