//! Facade crate for the OSM extract auditing and shaping toolkit.
//!
//! This crate re-exports the shaping rules and record types from
//! `osm-audit-core` together with the streaming reader, shape pipeline and
//! audit passes from `osm-audit-data`.
//!
//! # Examples
//! ```
//! use osm_audit::{ElementShaper, OsmReader, StreetCorrections, shape_records};
//!
//! let xml = r#"<osm>
//!   <node id="1" lat="43.5" lon="-79.6" version="1" changeset="2"
//!         timestamp="2015-06-01T12:00:00Z" user="mapper" uid="9">
//!     <tag k="addr:street" v="Advance Rd."/>
//!   </node>
//! </osm>"#;
//! let shaper = ElementShaper::new(StreetCorrections::curated());
//! let records: Vec<_> = shape_records(OsmReader::new(xml.as_bytes()), &shaper)
//!     .collect::<Result<_, _>>()?;
//!
//! assert_eq!(records.len(), 1);
//! assert_eq!(records[0].address()["street"], "Advance Road");
//! # Ok::<(), osm_audit::ShapeRunError>(())
//! ```

#![forbid(unsafe_code)]

pub use osm_audit_core::{
    Created, ElementKind, ElementShaper, ExpectedStreetTypes, KeyClass, NormalizedRecord,
    Position, RecordKind, ShapeError, SourceElement, StreetCorrections, Tag, classify_key,
    street_type,
};

pub use osm_audit_data::{
    AuditError, JsonLinesSink, KeyClassCounts, OsmReadError, OsmReader, OutputFormat, RecordSink,
    ShapeRunError, ShapeSummary, SinkError, StreetTypeAudit, audit_street_types, count_key_types,
    count_tags, shape_osm, shape_osm_file, shape_records, unique_users,
};
