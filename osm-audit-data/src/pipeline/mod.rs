//! Streaming shape pipeline: extract in, one JSON record per line out.

use std::io::{self, BufRead, BufWriter, Write};

use camino::{Utf8Path, Utf8PathBuf};
use geo::{Coord, Rect};
use log::{info, warn};
use osm_audit_core::{ElementShaper, NormalizedRecord, Position, RecordKind, ShapeError};
use thiserror::Error;

use crate::{
    fs::create_output,
    reader::{Elements, OsmReadError, OsmReader},
};

/// Layout of each serialised record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// One compact JSON object per line.
    #[default]
    Compact,
    /// Indented multi-line JSON objects, one after another.
    Pretty,
}

/// Errors raised by a [`RecordSink`].
#[derive(Debug, Error)]
pub enum SinkError {
    #[error("failed to serialise record {id}: {source}")]
    Serialise {
        #[source]
        source: serde_json::Error,
        id: String,
    },
    #[error("failed to write records: {source}")]
    Write {
        #[source]
        source: io::Error,
    },
}

/// Destination for shaped records, such as a file or a document store.
pub trait RecordSink {
    /// Take one record. Records arrive in source order.
    ///
    /// # Errors
    /// Returns [`SinkError`] when the record cannot be stored.
    fn accept(&mut self, record: &NormalizedRecord) -> Result<(), SinkError>;

    /// Flush anything buffered once the stream is exhausted.
    ///
    /// # Errors
    /// Returns [`SinkError`] when buffered records cannot be flushed.
    fn finish(&mut self) -> Result<(), SinkError> {
        Ok(())
    }
}

impl RecordSink for Vec<NormalizedRecord> {
    fn accept(&mut self, record: &NormalizedRecord) -> Result<(), SinkError> {
        self.push(record.clone());
        Ok(())
    }
}

/// Writes each record as JSON followed by a newline.
///
/// # Examples
/// ```
/// use osm_audit_core::{ElementShaper, StreetCorrections};
/// use osm_audit_data::{JsonLinesSink, OsmReader, OutputFormat, shape_osm};
///
/// let xml = r#"<osm><way id="7" version="1" changeset="2" timestamp="t" user="u" uid="3">
///     <nd ref="100"/><nd ref="200"/></way></osm>"#;
/// let shaper = ElementShaper::new(StreetCorrections::curated());
/// let mut sink = JsonLinesSink::new(Vec::new(), OutputFormat::Compact);
///
/// let summary = shape_osm(OsmReader::new(xml.as_bytes()), &shaper, &mut sink)?;
/// let output = String::from_utf8(sink.into_inner()).unwrap();
///
/// assert_eq!(summary.ways, 1);
/// assert!(output.ends_with("\"address\":{},\"node_refs\":[\"100\",\"200\"]}\n"));
/// # Ok::<(), osm_audit_data::ShapeRunError>(())
/// ```
#[derive(Debug)]
pub struct JsonLinesSink<W> {
    writer: W,
    format: OutputFormat,
}

impl<W: Write> JsonLinesSink<W> {
    /// Wrap a writer.
    pub const fn new(writer: W, format: OutputFormat) -> Self {
        Self { writer, format }
    }

    /// Recover the writer.
    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> RecordSink for JsonLinesSink<W> {
    fn accept(&mut self, record: &NormalizedRecord) -> Result<(), SinkError> {
        let encoded = match self.format {
            OutputFormat::Compact => serde_json::to_writer(&mut self.writer, record),
            OutputFormat::Pretty => serde_json::to_writer_pretty(&mut self.writer, record),
        };
        encoded.map_err(|source| SinkError::Serialise {
            source,
            id: record.id().to_owned(),
        })?;
        self.writer
            .write_all(b"\n")
            .map_err(|source| SinkError::Write { source })
    }

    fn finish(&mut self) -> Result<(), SinkError> {
        self.writer
            .flush()
            .map_err(|source| SinkError::Write { source })
    }
}

/// Counts gathered while shaping an extract.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ShapeSummary {
    /// Node records produced.
    pub nodes: u64,
    /// Way records produced.
    pub ways: u64,
    /// Top-level elements that were not nodes or ways.
    pub skipped: u64,
    /// Bounding box of node positions, `x = longitude`, `y = latitude`.
    pub bounds: Option<Rect<f64>>,
}

impl ShapeSummary {
    /// Total records produced.
    #[must_use]
    pub const fn records(&self) -> u64 {
        self.nodes + self.ways
    }

    fn record(&mut self, record: &NormalizedRecord) {
        match record.kind() {
            RecordKind::Node => self.nodes += 1,
            RecordKind::Way => self.ways += 1,
        }
        if let Some(position) = record.pos() {
            self.include_position(record.id(), position);
        }
    }

    const fn record_skipped(&mut self) {
        self.skipped += 1;
    }

    fn include_position(&mut self, id: &str, position: Position) {
        let coordinate = Coord::from(position);
        if !((-180.0..=180.0).contains(&coordinate.x) && (-90.0..=90.0).contains(&coordinate.y)) {
            warn!("node {id} lies outside WGS84 range; excluded from bounds");
            return;
        }
        self.bounds = Some(match self.bounds {
            Some(existing) => Rect::new(
                Coord {
                    x: existing.min().x.min(coordinate.x),
                    y: existing.min().y.min(coordinate.y),
                },
                Coord {
                    x: existing.max().x.max(coordinate.x),
                    y: existing.max().y.max(coordinate.y),
                },
            ),
            None => Rect::new(coordinate, coordinate),
        });
    }
}

/// Errors that abort a shaping run.
#[derive(Debug, Error)]
pub enum ShapeRunError {
    #[error("failed to read OSM extract: {0}")]
    Read(#[from] OsmReadError),
    #[error("malformed element: {0}")]
    Shape(#[from] ShapeError),
    #[error("failed to write shaped record: {0}")]
    Sink(#[from] SinkError),
    #[error("failed to create output file at {path:?}: {source}")]
    CreateOutput {
        #[source]
        source: io::Error,
        path: Utf8PathBuf,
    },
}

/// Lazy, single-pass sequence of shaped records.
///
/// Elements other than nodes and ways are skipped. Iteration stops after the
/// first error.
#[derive(Debug)]
pub struct ShapedRecords<'a, R> {
    elements: Elements<R>,
    shaper: &'a ElementShaper,
    summary: ShapeSummary,
    failed: bool,
}

impl<R> ShapedRecords<'_, R> {
    /// Counts for the records yielded so far.
    pub const fn summary(&self) -> &ShapeSummary {
        &self.summary
    }

    fn fail(&mut self, err: ShapeRunError) -> ShapeRunError {
        self.failed = true;
        err
    }
}

impl<R: BufRead> Iterator for ShapedRecords<'_, R> {
    type Item = Result<NormalizedRecord, ShapeRunError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }
        loop {
            let element = match self.elements.next()? {
                Ok(element) => element,
                Err(err) => return Some(Err(self.fail(err.into()))),
            };
            match self.shaper.shape(&element) {
                Ok(Some(record)) => {
                    self.summary.record(&record);
                    return Some(Ok(record));
                }
                Ok(None) => self.summary.record_skipped(),
                Err(err) => return Some(Err(self.fail(err.into()))),
            }
        }
    }
}

/// Shape every node and way in an extract, lazily.
pub fn shape_records<R: BufRead>(
    reader: OsmReader<R>,
    shaper: &ElementShaper,
) -> ShapedRecords<'_, R> {
    ShapedRecords {
        elements: reader.elements(),
        shaper,
        summary: ShapeSummary::default(),
        failed: false,
    }
}

/// Shape an extract into `sink`, one record at a time.
///
/// # Errors
/// Returns [`ShapeRunError`] on the first unreadable element, malformed node
/// or way, or sink failure. Records already handed to the sink stay there.
pub fn shape_osm<R, S>(
    reader: OsmReader<R>,
    shaper: &ElementShaper,
    sink: &mut S,
) -> Result<ShapeSummary, ShapeRunError>
where
    R: BufRead,
    S: RecordSink + ?Sized,
{
    let mut records = shape_records(reader, shaper);
    for record in records.by_ref() {
        sink.accept(&record?)?;
    }
    sink.finish()?;
    let summary = records.summary().clone();
    info!(
        "shaped {} nodes and {} ways; skipped {} other elements",
        summary.nodes, summary.ways, summary.skipped
    );
    Ok(summary)
}

/// Shape the extract at `input` into a JSON lines file at `output`.
///
/// # Errors
/// Returns [`ShapeRunError`] when either file cannot be opened or shaping
/// fails.
pub fn shape_osm_file(
    input: &Utf8Path,
    output: &Utf8Path,
    shaper: &ElementShaper,
    format: OutputFormat,
) -> Result<ShapeSummary, ShapeRunError> {
    let reader = OsmReader::open(input)?;
    let file = create_output(output).map_err(|source| ShapeRunError::CreateOutput {
        source,
        path: output.to_path_buf(),
    })?;
    let mut sink = JsonLinesSink::new(BufWriter::new(file), format);
    shape_osm(reader, shaper, &mut sink)
}

#[cfg(test)]
mod tests;
