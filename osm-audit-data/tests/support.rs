use camino::Utf8PathBuf;
use osm_audit_data::OsmReader;
use std::io::BufRead;

/// Directory containing the XML fixtures.
pub fn fixtures_dir() -> Utf8PathBuf {
    Utf8PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures")
}

/// Open a named fixture for reading.
pub fn open_fixture(path: &Utf8PathBuf) -> OsmReader<Box<dyn BufRead>> {
    OsmReader::open(path).unwrap_or_else(|err| {
        panic!("failed to open fixture {path}: {err}");
    })
}

/// Titles of the scenarios in a feature file, in file order.
pub fn scenario_titles(feature: &str) -> Vec<String> {
    let path = Utf8PathBuf::from(env!("CARGO_MANIFEST_DIR")).join(feature);
    let contents = std::fs::read_to_string(path.as_std_path()).unwrap_or_else(|err| {
        panic!("failed to read feature file {path}: {err}");
    });
    contents
        .lines()
        .filter_map(|line| line.trim().strip_prefix("Scenario: "))
        .map(str::to_owned)
        .collect()
}
