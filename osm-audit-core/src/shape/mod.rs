//! Shaping source elements into [`NormalizedRecord`]s.

use log::debug;
use thiserror::Error;

use crate::{
    Created, ElementKind, NormalizedRecord, Position, RecordKind, SourceElement, StreetCorrections,
    Tag, has_problem_chars,
};

const ADDRESS_PREFIX: &str = "addr:";
const STREET_KEY: &str = "street";
const UNKNOWN_ID: &str = "<unknown>";

/// `addr:street` values that were really an amenity name.
const RESTAURANT_STREET: &str = "restaurant";
/// `addr:street` value with the unit number folded into the street.
const UNIT_NINE_STREET: &str = "Meyerside Drive, Unit 9";

/// Errors raised for `node` or `way` elements that cannot be shaped.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ShapeError {
    /// A required attribute is absent.
    #[error("{kind} {id} is missing required attribute `{attribute}`")]
    MissingAttribute {
        /// Kind of the offending element.
        kind: RecordKind,
        /// Element id, or `<unknown>` when the id itself is missing.
        id: String,
        /// Name of the missing attribute.
        attribute: &'static str,
    },
    /// A coordinate attribute is not a finite number.
    #[error("node {id} has invalid {attribute} {value:?}")]
    InvalidCoordinate {
        /// Node id.
        id: String,
        /// `lat` or `lon`.
        attribute: &'static str,
        /// Raw attribute value.
        value: String,
    },
}

/// Shapes `node` and `way` elements using a fixed street correction table.
///
/// # Examples
/// ```
/// use osm_audit_core::{ElementKind, ElementShaper, SourceElement, StreetCorrections};
///
/// let shaper = ElementShaper::new(StreetCorrections::curated());
/// let node = SourceElement::new(ElementKind::Node)
///     .with_attribute("id", "1")
///     .with_attribute("version", "2")
///     .with_attribute("changeset", "3")
///     .with_attribute("timestamp", "2015-06-01T12:00:00Z")
///     .with_attribute("user", "mapper")
///     .with_attribute("uid", "9")
///     .with_attribute("lat", "43.5")
///     .with_attribute("lon", "-79.6")
///     .with_tag("addr:street", "Advance Rd.");
///
/// let record = shaper.shape(&node)?.expect("nodes are shaped");
/// assert_eq!(record.address()["street"], "Advance Road");
/// # Ok::<(), osm_audit_core::ShapeError>(())
/// ```
#[derive(Debug, Clone, Default)]
pub struct ElementShaper {
    corrections: StreetCorrections,
}

impl ElementShaper {
    /// Build a shaper around a correction table.
    #[must_use]
    pub const fn new(corrections: StreetCorrections) -> Self {
        Self { corrections }
    }

    /// The correction table in use.
    #[must_use]
    pub const fn corrections(&self) -> &StreetCorrections {
        &self.corrections
    }

    /// Shape one element.
    ///
    /// Returns `Ok(None)` for anything other than a `node` or `way`.
    ///
    /// # Errors
    /// Returns [`ShapeError`] when a node or way lacks an id or provenance
    /// attribute, or a node lacks a numeric `lat`/`lon`.
    pub fn shape(&self, element: &SourceElement) -> Result<Option<NormalizedRecord>, ShapeError> {
        let kind = match element.kind() {
            ElementKind::Node => RecordKind::Node,
            ElementKind::Way => RecordKind::Way,
            other @ (ElementKind::Relation | ElementKind::Other(_)) => {
                debug!("skipping {other} element {}", element.id().unwrap_or(UNKNOWN_ID));
                return Ok(None);
            }
        };

        let id = required(element, kind, UNKNOWN_ID, "id")?;
        let created = created(element, kind, id)?;
        let mut record = match kind {
            RecordKind::Node => NormalizedRecord::node(id, created, position(element, id)?),
            RecordKind::Way => NormalizedRecord::way(id, created, element.node_refs().to_vec()),
        };
        if let Some(visible) = element.attribute("visible") {
            record.set_visible(visible);
        }
        for tag in element.tags() {
            self.apply_tag(&mut record, tag);
        }
        Ok(Some(record))
    }

    fn apply_tag(&self, record: &mut NormalizedRecord, tag: &Tag) {
        let key = tag.key.as_str();
        if has_problem_chars(key) {
            debug!("dropping tag {key:?} on {}: problem characters", record.id());
            return;
        }
        match key.strip_prefix(ADDRESS_PREFIX) {
            Some(suffix) if suffix.contains(':') => {
                debug!("dropping nested address tag {key:?} on {}", record.id());
            }
            Some(STREET_KEY) => {
                let street = self.repair_street(record, &tag.value);
                record.insert_address(STREET_KEY, street);
            }
            Some(suffix) => record.insert_address(suffix, tag.value.as_str()),
            None => {
                if !record.insert_field(key, tag.value.as_str()) {
                    debug!("dropping tag {key:?} on {}: reserved field", record.id());
                }
            }
        }
    }

    fn repair_street(&self, record: &mut NormalizedRecord, street: &str) -> String {
        match street {
            RESTAURANT_STREET => {
                record.insert_field("amenity", "restaurant");
            }
            UNIT_NINE_STREET => record.insert_address("unit", "9"),
            _ => {}
        }
        self.corrections.repair(street)
    }
}

fn required<'a>(
    element: &'a SourceElement,
    kind: RecordKind,
    id: &str,
    attribute: &'static str,
) -> Result<&'a str, ShapeError> {
    element
        .attribute(attribute)
        .ok_or_else(|| ShapeError::MissingAttribute {
            kind,
            id: id.to_owned(),
            attribute,
        })
}

fn created(element: &SourceElement, kind: RecordKind, id: &str) -> Result<Created, ShapeError> {
    let [version, changeset, timestamp, user, uid] = Created::FIELDS;
    Ok(Created {
        version: required(element, kind, id, version)?.to_owned(),
        changeset: required(element, kind, id, changeset)?.to_owned(),
        timestamp: required(element, kind, id, timestamp)?.to_owned(),
        user: required(element, kind, id, user)?.to_owned(),
        uid: required(element, kind, id, uid)?.to_owned(),
    })
}

fn position(element: &SourceElement, id: &str) -> Result<Position, ShapeError> {
    let lat = coordinate(element, id, "lat")?;
    let lon = coordinate(element, id, "lon")?;
    Ok(Position::new(lat, lon))
}

fn coordinate(element: &SourceElement, id: &str, attribute: &'static str) -> Result<f64, ShapeError> {
    let raw = required(element, RecordKind::Node, id, attribute)?;
    raw.trim()
        .parse::<f64>()
        .ok()
        .filter(|value| value.is_finite())
        .ok_or_else(|| ShapeError::InvalidCoordinate {
            id: id.to_owned(),
            attribute,
            value: raw.to_owned(),
        })
}
