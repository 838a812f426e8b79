//! Command-line interface for shaping and auditing OSM XML extracts.
#![forbid(unsafe_code)]

use std::io::Write;

use camino::Utf8Path;
use clap::{Parser, Subcommand};
use serde::Serialize;

mod audit;
mod error;
mod shape;

pub use error::CliError;

use audit::{AuditArgs, AuditReport, run_audit};
use shape::{ShapeArgs, run_shape};

const ARG_INPUT: &str = "input";
const ARG_OUTPUT: &str = "output";
const ARG_PRETTY: &str = "pretty";
const ARG_CORRECTIONS: &str = "corrections";
/// Configuration section names; ortho_config reads `OSM_AUDIT_CMDS_<NAME>_*`.
const SHAPE_COMMAND: &str = "shape";
const AUDIT_COMMAND: &str = "audit";
const ENV_SHAPE_INPUT: &str = "OSM_AUDIT_CMDS_SHAPE_INPUT";
const ENV_AUDIT_INPUT: &str = "OSM_AUDIT_CMDS_AUDIT_INPUT";

/// Run the CLI with the current process arguments and environment.
///
/// # Errors
/// Returns [`CliError`] when arguments or configuration are invalid, or the
/// selected command fails.
pub fn run() -> Result<(), CliError> {
    let cli = Cli::try_parse().map_err(CliError::ArgumentParsing)?;
    match cli.command {
        Command::Shape(args) => run_shape(args),
        Command::CountTags(args) => run_audit(AuditReport::CountTags, args),
        Command::KeyTypes(args) => run_audit(AuditReport::KeyTypes, args),
        Command::Users(args) => run_audit(AuditReport::Users, args),
        Command::AuditStreets(args) => run_audit(AuditReport::StreetTypes, args),
    }
}

#[derive(Debug, Parser)]
#[command(
    name = "osm-audit",
    about = "Audit OSM XML extracts and shape them into JSON records",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Shape nodes and ways into one JSON record per line.
    #[command(name = "shape")]
    Shape(ShapeArgs),
    /// Count elements by tag name.
    #[command(name = "count-tags")]
    CountTags(AuditArgs),
    /// Classify the keys of descriptive tags.
    #[command(name = "key-types")]
    KeyTypes(AuditArgs),
    /// List the distinct contributors.
    #[command(name = "users")]
    Users(AuditArgs),
    /// Group street names whose final token is not an accepted suffix.
    #[command(name = "audit-streets")]
    AuditStreets(AuditArgs),
}

fn require_existing(path: &Utf8Path, field: &'static str) -> Result<(), CliError> {
    match osm_audit_data::fs::file_is_file(path) {
        Ok(true) => Ok(()),
        Ok(false) => Err(CliError::SourcePathNotFile {
            field,
            path: path.to_path_buf(),
        }),
        Err(source) if source.kind() == std::io::ErrorKind::NotFound => {
            Err(CliError::MissingSourceFile {
                field,
                path: path.to_path_buf(),
            })
        }
        Err(source) => Err(CliError::InspectSourcePath {
            field,
            path: path.to_path_buf(),
            source,
        }),
    }
}

fn write_report<T: Serialize + ?Sized>(writer: &mut dyn Write, report: &T) -> Result<(), CliError> {
    let payload = serde_json::to_string_pretty(report).map_err(CliError::SerialiseReport)?;
    writer
        .write_all(payload.as_bytes())
        .map_err(CliError::WriteReport)?;
    writer.write_all(b"\n").map_err(CliError::WriteReport)
}

#[cfg(test)]
mod tests;
