//! Error types emitted by the `osm-audit` CLI.
//!
//! Keep this error type reasonably small, as every CLI helper returns
//! `Result<_, CliError>` and the workspace enables `clippy::result_large_err`.

use std::sync::Arc;

use camino::Utf8PathBuf;
use osm_audit_data::{AuditError, ShapeRunError};
use thiserror::Error;

/// Errors emitted by the `osm-audit` CLI.
#[derive(Debug, Error)]
pub enum CliError {
    /// Provided arguments failed Clap validation.
    #[error(transparent)]
    ArgumentParsing(#[from] clap::Error),
    /// Configuration layering failed (files, env, CLI).
    #[error("failed to load configuration: {0}")]
    Configuration(#[from] Arc<ortho_config::OrthoError>),
    /// A required option is missing after configuration merging.
    #[error("missing {field} (set --{field} or {env})")]
    MissingArgument {
        field: &'static str,
        env: &'static str,
    },
    /// A referenced input path does not exist on disk.
    #[error("{field} path {path:?} does not exist")]
    MissingSourceFile {
        field: &'static str,
        path: Utf8PathBuf,
    },
    /// A referenced input path exists but is not a file.
    #[error("{field} path {path:?} exists but is not a file")]
    SourcePathNotFile {
        field: &'static str,
        path: Utf8PathBuf,
    },
    /// A referenced input path could not be inspected due to an IO error.
    #[error("failed to inspect {field} path {path:?}: {source}")]
    InspectSourcePath {
        field: &'static str,
        path: Utf8PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// Opening the street correction table failed.
    #[error("failed to open street corrections at {path:?}: {source}")]
    OpenCorrections {
        path: Utf8PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// The street correction table is not valid JSON.
    #[error("failed to parse street corrections at {path:?}: {source}")]
    ParseCorrections {
        path: Utf8PathBuf,
        #[source]
        source: serde_json::Error,
    },
    /// Shaping the extract failed.
    #[error("failed to shape {path:?}: {source}")]
    Shape {
        path: Utf8PathBuf,
        #[source]
        source: ShapeRunError,
    },
    /// An audit pass failed.
    #[error("failed to audit {path:?}: {source}")]
    Audit {
        path: Utf8PathBuf,
        #[source]
        source: AuditError,
    },
    /// Serialising a report failed.
    #[error("failed to serialise report: {0}")]
    SerialiseReport(#[source] serde_json::Error),
    /// Writing a report failed.
    #[error("failed to write report: {0}")]
    WriteReport(#[source] std::io::Error),
}
