//! Scratch workspace helpers for CLI tests.

use camino::{Utf8Path, Utf8PathBuf};
use std::fs;
use tempfile::TempDir;

pub(super) const EXTRACT: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<osm version="0.6">
  <node id="1" lat="43.5" lon="-79.6" version="1" changeset="1" timestamp="2015-06-01T12:00:00Z" user="mapper" uid="5">
    <tag k="addr:street" v="Advance Rd."/>
    <tag k="bad=key" v="x"/>
  </node>
  <node id="2" lat="43.6" lon="-79.7" version="1" changeset="1" timestamp="2015-06-01T12:00:00Z" user="mapper" uid="5"/>
  <way id="3" version="1" changeset="1" timestamp="2015-06-01T12:00:00Z" user="surveyor" uid="7">
    <nd ref="1"/>
    <nd ref="2"/>
    <tag k="addr:street" v="Foster"/>
  </way>
</osm>
"#;

pub(super) struct Workspace {
    _dir: TempDir,
    root: Utf8PathBuf,
}

impl Workspace {
    pub(super) fn new() -> Self {
        let dir = TempDir::new().expect("tempdir");
        let root = Utf8PathBuf::from_path_buf(dir.path().to_path_buf()).expect("utf-8 workspace");
        Self { _dir: dir, root }
    }

    pub(super) fn root(&self) -> &Utf8Path {
        &self.root
    }

    pub(super) fn write(&self, name: &str, contents: &str) -> Utf8PathBuf {
        let path = self.root.join(name);
        fs::write(path.as_std_path(), contents).expect("write workspace file");
        path
    }

    pub(super) fn extract(&self) -> Utf8PathBuf {
        self.write("sample.osm", EXTRACT)
    }
}

pub(super) fn read_json_lines(path: &Utf8Path) -> Vec<serde_json::Value> {
    fs::read_to_string(path.as_std_path())
        .expect("read output")
        .lines()
        .map(|line| serde_json::from_str(line).expect("each line is JSON"))
        .collect()
}
