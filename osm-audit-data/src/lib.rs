//! Reading OSM XML extracts, writing shaped records, and auditing extracts.
//!
//! Responsibilities:
//! - Stream OSM XML without materialising the whole document.
//! - Drive the element shaper and write one JSON record per line.
//! - Provide single-pass audits (tag counts, key classes, contributors,
//!   street types) over the same stream.
//!
//! Boundaries:
//! - Shaping rules live in `osm-audit-core`.
//! - Storage backends plug in through [`RecordSink`].
//!
//! Invariants:
//! - At most one top-level element is held in memory at a time.
//! - Records are written in source order as soon as they are shaped.

pub mod audit;
pub mod fs;
pub mod pipeline;
pub mod reader;

pub use audit::{
    AuditError, KeyClassCounts, StreetTypeAudit, audit_street_types, count_key_types, count_tags,
    unique_users,
};
pub use pipeline::{
    JsonLinesSink, OutputFormat, RecordSink, ShapeRunError, ShapeSummary, ShapedRecords,
    SinkError, shape_osm, shape_osm_file, shape_records,
};
pub use reader::{ElementEvent, ElementEvents, Elements, OsmReadError, OsmReader, StartElement};
