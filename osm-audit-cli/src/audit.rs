//! Audit commands: single-pass reports printed as JSON.

use std::{collections::BTreeSet, io::Write};

use camino::{Utf8Path, Utf8PathBuf};
use clap::Parser;
use ortho_config::{OrthoConfig, SubcmdConfigMerge};
use osm_audit_core::ExpectedStreetTypes;
use osm_audit_data::{
    AuditError, OsmReader, audit_street_types, count_key_types, count_tags, unique_users,
};
use serde::{Deserialize, Serialize};

use crate::{ARG_INPUT, AUDIT_COMMAND, CliError, ENV_AUDIT_INPUT, require_existing, write_report};

/// Report produced by one of the audit subcommands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum AuditReport {
    CountTags,
    KeyTypes,
    Users,
    StreetTypes,
}

/// CLI arguments shared by the audit subcommands.
#[derive(Debug, Clone, Parser, Deserialize, Serialize, OrthoConfig, Default)]
#[command(
    name = AUDIT_COMMAND,
    long_about = "Run a single pass over an OSM XML extract and print a JSON \
                 report. The input path can come from a CLI flag, the \
                 `audit` section of a configuration file, or the \
                 environment.",
    about = "Audit an extract"
)]
#[ortho_config(prefix = "OSM_AUDIT")]
pub(crate) struct AuditArgs {
    /// Path to the OSM XML extract (`.osm` or `.osm.bz2`).
    #[arg(long = ARG_INPUT, value_name = "path")]
    #[serde(default)]
    pub(crate) input: Option<Utf8PathBuf>,
}

impl AuditArgs {
    fn into_config(self) -> Result<AuditConfig, CliError> {
        let merged = self.load_and_merge().map_err(CliError::Configuration)?;
        AuditConfig::try_from(merged)
    }
}

/// Resolved audit configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct AuditConfig {
    pub(crate) input: Utf8PathBuf,
}

impl TryFrom<AuditArgs> for AuditConfig {
    type Error = CliError;

    fn try_from(args: AuditArgs) -> Result<Self, Self::Error> {
        let input = args.input.ok_or(CliError::MissingArgument {
            field: ARG_INPUT,
            env: ENV_AUDIT_INPUT,
        })?;
        Ok(Self { input })
    }
}

#[derive(Debug, Serialize)]
struct UsersReport {
    count: usize,
    uids: BTreeSet<String>,
}

pub(super) fn run_audit(report: AuditReport, args: AuditArgs) -> Result<(), CliError> {
    let mut stdout = std::io::stdout().lock();
    run_audit_with(report, args, &mut stdout)
}

pub(super) fn run_audit_with(
    report: AuditReport,
    args: AuditArgs,
    writer: &mut dyn Write,
) -> Result<(), CliError> {
    let config = args.into_config()?;
    require_existing(&config.input, ARG_INPUT)?;
    execute_audit(report, &config.input, writer)
}

pub(super) fn execute_audit(
    report: AuditReport,
    input: &Utf8Path,
    writer: &mut dyn Write,
) -> Result<(), CliError> {
    let failed = |source: AuditError| CliError::Audit {
        path: input.to_path_buf(),
        source,
    };
    let reader = OsmReader::open(input).map_err(|source| failed(source.into()))?;
    match report {
        AuditReport::CountTags => write_report(writer, &count_tags(reader).map_err(failed)?),
        AuditReport::KeyTypes => write_report(writer, &count_key_types(reader).map_err(failed)?),
        AuditReport::Users => {
            let uids = unique_users(reader).map_err(failed)?;
            write_report(
                writer,
                &UsersReport {
                    count: uids.len(),
                    uids,
                },
            )
        }
        AuditReport::StreetTypes => {
            let audit =
                audit_street_types(reader, &ExpectedStreetTypes::default()).map_err(failed)?;
            write_report(writer, &audit)
        }
    }
}
