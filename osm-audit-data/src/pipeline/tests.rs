//! Unit tests for the shape pipeline.

use super::*;
use osm_audit_core::StreetCorrections;
use rstest::{fixture, rstest};
use serde_json::{Value, json};
use tempfile::TempDir;

const EXTRACT: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<osm version="0.6">
  <bounds minlat="43.5" minlon="-79.7" maxlat="43.6" maxlon="-79.6"/>
  <node id="1" lat="43.5" lon="-79.6" version="2" changeset="3" timestamp="2015-06-01T12:00:00Z" user="mapper" uid="9"/>
  <node id="2" lat="43.6" lon="-79.7" version="1" changeset="4" timestamp="2015-06-02T12:00:00Z" user="other" uid="5" visible="true">
    <tag k="amenity" v="cafe"/>
    <tag k="addr:street" v="Advance Rd."/>
    <tag k="bad=key" v="dropped"/>
  </node>
  <way id="10" version="1" changeset="3" timestamp="2015-06-01T12:00:00Z" user="mapper" uid="9">
    <nd ref="1"/>
    <nd ref="2"/>
    <tag k="addr:street" v="restaurant"/>
  </way>
  <relation id="20" version="1" changeset="3" timestamp="2015-06-01T12:00:00Z" user="mapper" uid="9">
    <member type="way" ref="10" role="outer"/>
  </relation>
</osm>
"#;

#[fixture]
fn shaper() -> ElementShaper {
    ElementShaper::new(StreetCorrections::curated())
}

fn shape_to_lines(shaper: &ElementShaper, format: OutputFormat) -> (ShapeSummary, String) {
    let mut sink = JsonLinesSink::new(Vec::new(), format);
    let summary =
        shape_osm(OsmReader::new(EXTRACT.as_bytes()), shaper, &mut sink).expect("extract shapes");
    let output = String::from_utf8(sink.into_inner()).expect("utf-8 output");
    (summary, output)
}

#[rstest]
fn writes_one_compact_record_per_line(shaper: ElementShaper) {
    let (_, output) = shape_to_lines(&shaper, OutputFormat::Compact);
    let records: Vec<Value> = output
        .lines()
        .map(|line| serde_json::from_str(line).expect("each line is a JSON object"))
        .collect();

    assert_eq!(records.len(), 3);
    assert_eq!(records[0]["id"], "1");
    assert_eq!(records[1]["address"], json!({"street": "Advance Road"}));
    assert_eq!(records[1]["visible"], "true");
    assert!(records[1].get("bad=key").is_none());
    assert_eq!(records[2]["node_refs"], json!(["1", "2"]));
    assert_eq!(records[2]["amenity"], "restaurant");
    assert_eq!(records[2]["address"], json!({"street": "Mississauga Road"}));
}

#[rstest]
fn pretty_output_carries_the_same_records(shaper: ElementShaper) {
    let (_, compact) = shape_to_lines(&shaper, OutputFormat::Compact);
    let (_, pretty) = shape_to_lines(&shaper, OutputFormat::Pretty);

    assert!(pretty.lines().count() > compact.lines().count());
    let decoded: Vec<Value> = serde_json::Deserializer::from_str(&pretty)
        .into_iter::<Value>()
        .collect::<Result<_, _>>()
        .expect("pretty output decodes");
    let expected: Vec<Value> = compact
        .lines()
        .map(|line| serde_json::from_str(line).expect("compact line decodes"))
        .collect();
    assert_eq!(decoded, expected);
}

#[rstest]
fn summary_counts_kinds_and_bounds(shaper: ElementShaper) {
    let (summary, _) = shape_to_lines(&shaper, OutputFormat::Compact);

    assert_eq!(summary.nodes, 2);
    assert_eq!(summary.ways, 1);
    assert_eq!(summary.skipped, 2, "bounds and relation are skipped");
    assert_eq!(summary.records(), 3);
    let bounds = summary.bounds.expect("nodes produce bounds");
    assert_eq!(bounds.min(), Coord { x: -79.7, y: 43.5 });
    assert_eq!(bounds.max(), Coord { x: -79.6, y: 43.6 });
}

#[rstest]
fn out_of_range_nodes_are_shaped_but_not_bounded(shaper: ElementShaper) {
    let xml = r#"<osm><node id="1" lat="95.0" lon="10.0" version="1" changeset="1" timestamp="t" user="u" uid="1"/></osm>"#;
    let mut records: Vec<NormalizedRecord> = Vec::new();
    let summary =
        shape_osm(OsmReader::new(xml.as_bytes()), &shaper, &mut records).expect("shapes");

    assert_eq!(records.len(), 1);
    assert_eq!(summary.bounds, None);
}

#[rstest]
fn lazy_sequence_yields_records_in_source_order(shaper: ElementShaper) {
    let ids: Vec<String> = shape_records(OsmReader::new(EXTRACT.as_bytes()), &shaper)
        .map(|record| record.map(|shaped| shaped.id().to_owned()))
        .collect::<Result<_, _>>()
        .expect("extract shapes");
    assert_eq!(ids, ["1", "2", "10"]);
}

#[rstest]
fn malformed_element_aborts_after_earlier_records(shaper: ElementShaper) {
    let xml = r#"<osm>
      <node id="1" lat="1" lon="2" version="1" changeset="1" timestamp="t" user="u" uid="1"/>
      <node id="2" lat="north" lon="2" version="1" changeset="1" timestamp="t" user="u" uid="1"/>
      <node id="3" lat="1" lon="2" version="1" changeset="1" timestamp="t" user="u" uid="1"/>
    </osm>"#;
    let mut records: Vec<NormalizedRecord> = Vec::new();
    let err = shape_osm(OsmReader::new(xml.as_bytes()), &shaper, &mut records)
        .expect_err("non-numeric latitude is fatal");

    assert!(matches!(
        err,
        ShapeRunError::Shape(ShapeError::InvalidCoordinate { ref id, .. }) if id == "2"
    ));
    assert_eq!(records.len(), 1, "no partial record for the bad node");
}

#[rstest]
fn lazy_sequence_stops_after_error(shaper: ElementShaper) {
    let xml = r#"<osm><way id="1"/><way id="2"/></osm>"#;
    let mut records = shape_records(OsmReader::new(xml.as_bytes()), &shaper);
    assert!(matches!(records.next(), Some(Err(ShapeRunError::Shape(_)))));
    assert!(records.next().is_none());
}

#[rstest]
fn parse_errors_are_fatal(shaper: ElementShaper) {
    let xml = r#"<osm><node id="1"></way></osm>"#;
    let mut records: Vec<NormalizedRecord> = Vec::new();
    let err = shape_osm(OsmReader::new(xml.as_bytes()), &shaper, &mut records)
        .expect_err("mismatched tags");
    assert!(matches!(err, ShapeRunError::Read(_)));
}

#[rstest]
fn shapes_files_to_default_named_output(shaper: ElementShaper) {
    let dir = TempDir::new().expect("tempdir");
    let root = Utf8PathBuf::from_path_buf(dir.path().to_path_buf()).expect("utf-8 temp dir");
    let input = root.join("sample.osm");
    std::fs::write(input.as_std_path(), EXTRACT).expect("write extract");
    let output = crate::fs::default_output_path(&input);

    let summary =
        shape_osm_file(&input, &output, &shaper, OutputFormat::Compact).expect("file shapes");

    assert_eq!(output.file_name(), Some("sample.osm.json"));
    let written = std::fs::read_to_string(output.as_std_path()).expect("read output");
    assert_eq!(
        u64::try_from(written.lines().count()).expect("line count fits"),
        summary.records()
    );
}

#[rstest]
fn missing_input_reports_open_error(shaper: ElementShaper) {
    let dir = TempDir::new().expect("tempdir");
    let root = Utf8PathBuf::from_path_buf(dir.path().to_path_buf()).expect("utf-8 temp dir");
    let err = shape_osm_file(
        &root.join("absent.osm"),
        &root.join("absent.osm.json"),
        &shaper,
        OutputFormat::Compact,
    )
    .expect_err("missing input");
    assert!(matches!(err, ShapeRunError::Read(OsmReadError::Open { .. })));
}

#[rstest]
fn malformed_element_errors_name_the_element(shaper: ElementShaper) {
    let xml = r#"<osm><node id="77" lat="north" lon="2" version="1" changeset="1" timestamp="t" user="u" uid="1"/></osm>"#;
    let mut records: Vec<NormalizedRecord> = Vec::new();
    let err = shape_osm(OsmReader::new(xml.as_bytes()), &shaper, &mut records)
        .expect_err("non-numeric latitude");

    assert_eq!(
        err.to_string(),
        r#"malformed element: node 77 has invalid lat "north""#
    );
}

#[rstest]
fn read_errors_carry_the_reader_fault(shaper: ElementShaper) {
    let xml = r#"<osm><way id="1"><nd/></way></osm>"#;
    let mut records: Vec<NormalizedRecord> = Vec::new();
    let err = shape_osm(OsmReader::new(xml.as_bytes()), &shaper, &mut records)
        .expect_err("nd without ref");

    assert_eq!(
        err.to_string(),
        "failed to read OSM extract: <nd> is missing its `ref` attribute"
    );
}
