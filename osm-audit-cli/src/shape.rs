//! `shape` command: extract in, JSON lines out.

use std::io::{BufReader, Write};

use camino::{Utf8Path, Utf8PathBuf};
use clap::Parser;
use log::info;
use ortho_config::{OrthoConfig, SubcmdConfigMerge};
use osm_audit_core::{ElementShaper, StreetCorrections};
use osm_audit_data::{
    OutputFormat, ShapeSummary,
    fs::{default_output_path, open_file},
    shape_osm_file,
};
use serde::{Deserialize, Serialize};

use crate::{
    ARG_CORRECTIONS, ARG_INPUT, ARG_OUTPUT, ARG_PRETTY, CliError, ENV_SHAPE_INPUT,
    SHAPE_COMMAND, require_existing, write_report,
};

/// CLI arguments for the `shape` subcommand.
#[derive(Debug, Clone, Parser, Deserialize, Serialize, OrthoConfig, Default)]
#[command(
    name = SHAPE_COMMAND,
    long_about = "Shape every node and way of an OSM XML extract into a \
                 JSON record and write one record per line. Street names \
                 are repaired with the curated correction table unless \
                 another table is supplied. Paths can come from CLI flags, \
                 configuration files, or environment variables.",
    about = "Shape an extract into JSON records"
)]
#[ortho_config(prefix = "OSM_AUDIT")]
pub(crate) struct ShapeArgs {
    /// Path to the OSM XML extract (`.osm` or `.osm.bz2`).
    #[arg(long = ARG_INPUT, value_name = "path")]
    #[serde(default)]
    pub(crate) input: Option<Utf8PathBuf>,
    /// Output path; defaults to the input path with `.json` appended.
    #[arg(long = ARG_OUTPUT, value_name = "path")]
    #[serde(default)]
    pub(crate) output: Option<Utf8PathBuf>,
    /// Write indented multi-line records.
    #[arg(long = ARG_PRETTY)]
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub(crate) pretty: bool,
    /// JSON street correction table replacing the curated one.
    #[arg(long = ARG_CORRECTIONS, value_name = "path")]
    #[serde(default)]
    pub(crate) corrections: Option<Utf8PathBuf>,
}

impl ShapeArgs {
    pub(crate) fn into_config(self) -> Result<ShapeConfig, CliError> {
        let merged = self.load_and_merge().map_err(CliError::Configuration)?;
        ShapeConfig::try_from(merged)
    }
}

/// Resolved `shape` command configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct ShapeConfig {
    pub(crate) input: Utf8PathBuf,
    pub(crate) output: Utf8PathBuf,
    pub(crate) format: OutputFormat,
    pub(crate) corrections: Option<Utf8PathBuf>,
}

impl ShapeConfig {
    pub(crate) fn validate_sources(&self) -> Result<(), CliError> {
        require_existing(&self.input, ARG_INPUT)?;
        if let Some(corrections) = &self.corrections {
            require_existing(corrections, ARG_CORRECTIONS)?;
        }
        Ok(())
    }

    fn street_corrections(&self) -> Result<StreetCorrections, CliError> {
        match &self.corrections {
            Some(path) => load_corrections(path),
            None => Ok(StreetCorrections::curated()),
        }
    }
}

impl TryFrom<ShapeArgs> for ShapeConfig {
    type Error = CliError;

    fn try_from(args: ShapeArgs) -> Result<Self, Self::Error> {
        let input = args.input.ok_or(CliError::MissingArgument {
            field: ARG_INPUT,
            env: ENV_SHAPE_INPUT,
        })?;
        let output = args
            .output
            .unwrap_or_else(|| default_output_path(&input));
        let format = if args.pretty {
            OutputFormat::Pretty
        } else {
            OutputFormat::Compact
        };
        Ok(Self {
            input,
            output,
            format,
            corrections: args.corrections,
        })
    }
}

/// Summary printed once an extract has been shaped.
#[derive(Debug, Serialize)]
struct ShapeReport<'a> {
    output: &'a Utf8Path,
    nodes: u64,
    ways: u64,
    skipped: u64,
    /// `[[min_lon, min_lat], [max_lon, max_lat]]`.
    bounds: Option<[[f64; 2]; 2]>,
}

impl<'a> ShapeReport<'a> {
    fn new(output: &'a Utf8Path, summary: &ShapeSummary) -> Self {
        Self {
            output,
            nodes: summary.nodes,
            ways: summary.ways,
            skipped: summary.skipped,
            bounds: summary.bounds.map(|rect| {
                let (min, max) = (rect.min(), rect.max());
                [[min.x, min.y], [max.x, max.y]]
            }),
        }
    }
}

pub(super) fn run_shape(args: ShapeArgs) -> Result<(), CliError> {
    let mut stdout = std::io::stdout().lock();
    run_shape_with(args, &mut stdout)
}

pub(super) fn run_shape_with(args: ShapeArgs, writer: &mut dyn Write) -> Result<(), CliError> {
    let config = args.into_config()?;
    config.validate_sources()?;
    let summary = execute_shape(&config)?;
    write_report(writer, &ShapeReport::new(&config.output, &summary))
}

pub(super) fn execute_shape(config: &ShapeConfig) -> Result<ShapeSummary, CliError> {
    let shaper = ElementShaper::new(config.street_corrections()?);
    info!("shaping {} into {}", config.input, config.output);
    shape_osm_file(&config.input, &config.output, &shaper, config.format).map_err(|source| {
        CliError::Shape {
            path: config.input.clone(),
            source,
        }
    })
}

/// Load a JSON street correction table from disk.
pub(super) fn load_corrections(path: &Utf8Path) -> Result<StreetCorrections, CliError> {
    let file = open_file(path).map_err(|source| CliError::OpenCorrections {
        path: path.to_path_buf(),
        source,
    })?;
    StreetCorrections::from_json_reader(BufReader::new(file)).map_err(|source| {
        CliError::ParseCorrections {
            path: path.to_path_buf(),
            source,
        }
    })
}

#[cfg(test)]
pub(crate) fn config_from_layers_for_test(
    layers: Vec<ortho_config::MergeLayer<'static>>,
) -> Result<ShapeConfig, CliError> {
    let merged = ShapeArgs::merge_from_layers(layers).map_err(CliError::from)?;
    ShapeConfig::try_from(merged)
}
