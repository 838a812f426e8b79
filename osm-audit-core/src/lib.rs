//! Domain rules for turning OpenStreetMap extracts into document records.
//!
//! Responsibilities:
//! - Model the elements read from an OSM XML extract.
//! - Classify tag keys and repair free-text street names.
//! - Shape `node` and `way` elements into flat, document-store friendly
//!   records.
//!
//! Boundaries:
//! - No I/O. Reading extracts and writing records lives in `osm-audit-data`.
//!
//! Invariants:
//! - Correction tables are immutable configuration values passed in by the
//!   caller; nothing here holds global mutable state.
#![forbid(unsafe_code)]

pub mod classify;
pub mod element;
pub mod record;
pub mod shape;
pub mod street;

pub use classify::{KeyClass, PROBLEM_CHARS, classify_key, has_problem_chars};
pub use element::{ElementKind, SourceElement, Tag};
pub use record::{Created, NormalizedRecord, Position, RecordKind};
pub use shape::{ElementShaper, ShapeError};
pub use street::{ExpectedStreetTypes, StreetCorrections, street_type};
