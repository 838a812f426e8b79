//! Forward-only OSM XML traversal.
//!
//! Two disciplines are offered over the same pull parser:
//! - [`ElementEvents`] yields a start event for every element as soon as its
//!   opening tag is read, and an end event when it closes. Nothing beyond the
//!   current tag is retained.
//! - [`Elements`] yields each top-level element (a child of the document
//!   root) once it and all of its children have been read, with its `tag` and
//!   `nd` children attached. The element is released as soon as the caller
//!   drops it.

use std::{fmt, io::BufRead};

use camino::{Utf8Path, Utf8PathBuf};
use log::debug;
use osm_audit_core::{ElementKind, SourceElement, Tag};
use quick_xml::{
    Reader,
    events::{BytesStart, Event, attributes::AttrError},
};
use thiserror::Error;

use crate::fs::open_source;

/// Depth of elements that sit directly under the document root.
const TOP_LEVEL_DEPTH: usize = 2;
/// Depth of the children of a top-level element.
const CHILD_DEPTH: usize = 3;

/// Errors raised while reading an extract.
#[derive(Debug, Error)]
pub enum OsmReadError {
    #[error("failed to open OSM extract at {path:?}: {source}")]
    Open {
        #[source]
        source: std::io::Error,
        path: Utf8PathBuf,
    },
    #[error("malformed OSM XML: {source}")]
    Xml {
        #[source]
        source: quick_xml::Error,
    },
    #[error("malformed attribute on <{element}>: {source}")]
    Attribute {
        #[source]
        source: AttrError,
        element: String,
    },
    #[error("element or attribute name is not valid UTF-8: {source}")]
    NonUtf8Name {
        #[source]
        source: std::str::Utf8Error,
    },
    #[error("<{element}> is missing its `{attribute}` attribute")]
    MissingChildAttribute {
        element: &'static str,
        attribute: &'static str,
    },
    #[error("extract ended inside {depth} open element(s)")]
    Truncated { depth: usize },
}

impl From<quick_xml::Error> for OsmReadError {
    fn from(source: quick_xml::Error) -> Self {
        Self::Xml { source }
    }
}

/// Pull-based reader over an OSM XML document.
///
/// # Examples
/// ```
/// use osm_audit_data::OsmReader;
///
/// let xml = r#"<osm><node id="1"><tag k="amenity" v="cafe"/></node></osm>"#;
/// let elements: Vec<_> = OsmReader::new(xml.as_bytes())
///     .elements()
///     .collect::<Result<_, _>>()?;
///
/// assert_eq!(elements.len(), 1);
/// assert_eq!(elements[0].tags()[0].value, "cafe");
/// # Ok::<(), osm_audit_data::OsmReadError>(())
/// ```
pub struct OsmReader<R> {
    xml: Reader<R>,
}

impl<R> fmt::Debug for OsmReader<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OsmReader").finish_non_exhaustive()
    }
}

impl OsmReader<Box<dyn BufRead>> {
    /// Open an extract on disk; `.bz2` files are decompressed while reading.
    ///
    /// # Errors
    /// Returns [`OsmReadError::Open`] when the file cannot be opened.
    pub fn open(path: &Utf8Path) -> Result<Self, OsmReadError> {
        let source = open_source(path).map_err(|source| OsmReadError::Open {
            source,
            path: path.to_path_buf(),
        })?;
        Ok(Self::new(source))
    }
}

impl<R: BufRead> OsmReader<R> {
    /// Wrap a buffered source.
    pub fn new(source: R) -> Self {
        let mut xml = Reader::from_reader(source);
        // `<nd ref="1"/>` is reported as a start followed by an end.
        xml.config_mut().expand_empty_elements = true;
        Self { xml }
    }

    /// Traverse every element as start and end events.
    pub fn events(self) -> ElementEvents<R> {
        ElementEvents {
            xml: self.xml,
            buf: Vec::new(),
            depth: 0,
            finished: false,
        }
    }

    /// Traverse top-level elements, each fully materialised.
    pub fn elements(self) -> Elements<R> {
        Elements {
            events: self.events(),
            depth: 0,
            current: None,
        }
    }
}

/// Opening tag of an element with its decoded attributes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StartElement {
    name: String,
    attributes: Vec<(String, String)>,
}

impl StartElement {
    fn decode(start: &BytesStart<'_>) -> Result<Self, OsmReadError> {
        let name = decode_name(start.name().as_ref())?;
        let mut attributes = Vec::new();
        for entry in start.attributes() {
            let attribute = entry.map_err(|source| OsmReadError::Attribute {
                source,
                element: name.clone(),
            })?;
            let key = decode_name(attribute.key.as_ref())?;
            let value = attribute.unescape_value()?.into_owned();
            attributes.push((key, value));
        }
        Ok(Self { name, attributes })
    }

    /// Tag name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Look up an attribute value by name.
    #[must_use]
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    fn require(
        &self,
        element: &'static str,
        attribute: &'static str,
    ) -> Result<&str, OsmReadError> {
        self.attribute(attribute)
            .ok_or(OsmReadError::MissingChildAttribute { element, attribute })
    }

    fn into_source_element(self) -> SourceElement {
        let mut element = SourceElement::new(ElementKind::from_tag_name(&self.name));
        for (key, value) in self.attributes {
            element.set_attribute(key, value);
        }
        element
    }
}

fn decode_name(raw: &[u8]) -> Result<String, OsmReadError> {
    std::str::from_utf8(raw)
        .map(str::to_owned)
        .map_err(|source| OsmReadError::NonUtf8Name { source })
}

/// Element open/close event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ElementEvent {
    /// An opening tag, seen before any of the element's children.
    Start(StartElement),
    /// A closing tag (self-closing elements produce one too).
    End {
        /// Tag name.
        name: String,
    },
}

/// Iterator over [`ElementEvent`]s. Stops after the first error.
pub struct ElementEvents<R> {
    xml: Reader<R>,
    buf: Vec<u8>,
    depth: usize,
    finished: bool,
}

impl<R> fmt::Debug for ElementEvents<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ElementEvents")
            .field("depth", &self.depth)
            .field("finished", &self.finished)
            .finish_non_exhaustive()
    }
}

impl<R: BufRead> ElementEvents<R> {
    fn read_event(&mut self) -> Result<Option<ElementEvent>, OsmReadError> {
        loop {
            self.buf.clear();
            match self.xml.read_event_into(&mut self.buf)? {
                Event::Start(start) => {
                    self.depth += 1;
                    let element = StartElement::decode(&start)?;
                    return Ok(Some(ElementEvent::Start(element)));
                }
                Event::End(end) => {
                    self.depth = self.depth.saturating_sub(1);
                    let name = decode_name(end.name().as_ref())?;
                    return Ok(Some(ElementEvent::End { name }));
                }
                Event::Eof if self.depth > 0 => {
                    return Err(OsmReadError::Truncated { depth: self.depth });
                }
                Event::Eof => return Ok(None),
                _ => {}
            }
        }
    }
}

impl<R: BufRead> Iterator for ElementEvents<R> {
    type Item = Result<ElementEvent, OsmReadError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }
        let outcome = self.read_event();
        if !matches!(outcome, Ok(Some(_))) {
            self.finished = true;
        }
        outcome.transpose()
    }
}

/// Iterator over fully read top-level elements. Stops after the first error.
#[derive(Debug)]
pub struct Elements<R> {
    events: ElementEvents<R>,
    depth: usize,
    current: Option<SourceElement>,
}

impl<R: BufRead> Elements<R> {
    fn accept(&mut self, event: ElementEvent) -> Result<Option<SourceElement>, OsmReadError> {
        match event {
            ElementEvent::Start(start) => {
                self.depth += 1;
                if self.depth == TOP_LEVEL_DEPTH {
                    self.current = Some(start.into_source_element());
                } else if self.depth == CHILD_DEPTH
                    && let Some(parent) = self.current.as_mut()
                {
                    push_child(parent, &start)?;
                }
                Ok(None)
            }
            ElementEvent::End { .. } => {
                let closing = self.depth;
                self.depth = self.depth.saturating_sub(1);
                Ok(if closing == TOP_LEVEL_DEPTH {
                    self.current.take()
                } else {
                    None
                })
            }
        }
    }
}

impl<R: BufRead> Iterator for Elements<R> {
    type Item = Result<SourceElement, OsmReadError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let event = match self.events.next()? {
                Ok(event) => event,
                Err(err) => return Some(Err(err)),
            };
            match self.accept(event) {
                Ok(Some(element)) => return Some(Ok(element)),
                Ok(None) => {}
                Err(err) => {
                    self.events.finished = true;
                    return Some(Err(err));
                }
            }
        }
    }
}

/// Attach a `tag` or `nd` child. Only nodes and ways are shaped, so a child
/// of any other element missing its attributes is dropped rather than fatal.
fn push_child(parent: &mut SourceElement, child: &StartElement) -> Result<(), OsmReadError> {
    match attach_child(parent, child) {
        Err(err) if !matches!(parent.kind(), ElementKind::Node | ElementKind::Way) => {
            let id = parent.id().unwrap_or("<unknown>");
            debug!("dropping child of {} {id}: {err}", parent.kind());
            Ok(())
        }
        outcome => outcome,
    }
}

fn attach_child(parent: &mut SourceElement, child: &StartElement) -> Result<(), OsmReadError> {
    match child.name() {
        "tag" => {
            let key = child.require("tag", "k")?;
            let value = child.require("tag", "v")?;
            parent.push_tag(Tag::new(key, value));
        }
        "nd" => parent.push_node_ref(child.require("nd", "ref")?),
        _ => {}
    }
    Ok(())
}
