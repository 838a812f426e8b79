//! Normalised document records.
//!
//! One [`NormalizedRecord`] is produced per shaped `node` or `way`. The
//! structural fields are typed; free-form descriptive tags land in an open
//! field map that is flattened into the top level when serialised.

use std::{collections::BTreeMap, fmt};

use geo::Coord;
use serde::Serialize;

/// Kind of a shaped record. Only nodes and ways are ever shaped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RecordKind {
    /// Shaped from a `<node>`.
    Node,
    /// Shaped from a `<way>`.
    Way,
}

impl RecordKind {
    /// Lowercase name as written to the `type` field.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Node => "node",
            Self::Way => "way",
        }
    }
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Provenance copied verbatim from the element attributes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Created {
    /// Element version.
    pub version: String,
    /// Changeset that last touched the element.
    pub changeset: String,
    /// Timestamp of the last edit.
    pub timestamp: String,
    /// Display name of the last editor.
    pub user: String,
    /// Numeric id of the last editor, kept as text.
    pub uid: String,
}

impl Created {
    /// Attribute names that make up the provenance block, in output order.
    pub const FIELDS: [&'static str; 5] = ["version", "changeset", "timestamp", "user", "uid"];
}

/// Node position, serialised as `[latitude, longitude]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(into = "[f64; 2]")]
pub struct Position {
    /// Latitude in degrees.
    pub lat: f64,
    /// Longitude in degrees.
    pub lon: f64,
}

impl Position {
    /// Construct a position from latitude and longitude.
    #[must_use]
    pub const fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }
}

impl From<Position> for [f64; 2] {
    fn from(position: Position) -> Self {
        [position.lat, position.lon]
    }
}

impl From<Position> for Coord<f64> {
    /// WGS84 coordinate with `x = longitude`, `y = latitude`.
    fn from(position: Position) -> Self {
        Self {
            x: position.lon,
            y: position.lat,
        }
    }
}

/// A flat record ready for a document store.
///
/// `pos` is present only on nodes and `node_refs` only on ways; the
/// constructors are the only way to pick between them.
///
/// # Examples
/// ```
/// use osm_audit_core::{Created, NormalizedRecord, Position};
///
/// let created = Created {
///     version: "2".into(),
///     changeset: "3".into(),
///     timestamp: "2015-01-01T00:00:00Z".into(),
///     user: "mapper".into(),
///     uid: "9".into(),
/// };
/// let mut record = NormalizedRecord::node("1", created, Position::new(43.5, -79.6));
/// record.insert_field("amenity", "cafe");
///
/// let json = serde_json::to_value(&record).unwrap();
/// assert_eq!(json["type"], "node");
/// assert_eq!(json["pos"][0], 43.5);
/// assert_eq!(json["amenity"], "cafe");
/// assert!(json["address"].as_object().unwrap().is_empty());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NormalizedRecord {
    id: String,
    #[serde(rename = "type")]
    kind: RecordKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    visible: Option<String>,
    created: Created,
    #[serde(skip_serializing_if = "Option::is_none")]
    pos: Option<Position>,
    address: BTreeMap<String, String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    node_refs: Option<Vec<String>>,
    #[serde(flatten)]
    fields: BTreeMap<String, String>,
}

impl NormalizedRecord {
    /// Top-level names owned by the record structure itself.
    pub const RESERVED_FIELDS: [&'static str; 7] = [
        "id",
        "type",
        "visible",
        "created",
        "pos",
        "address",
        "node_refs",
    ];

    /// Start a node record with an empty address.
    pub fn node(id: impl Into<String>, created: Created, pos: Position) -> Self {
        Self::with_geometry(id.into(), RecordKind::Node, created, Some(pos), None)
    }

    /// Start a way record with an empty address.
    pub fn way(id: impl Into<String>, created: Created, node_refs: Vec<String>) -> Self {
        Self::with_geometry(id.into(), RecordKind::Way, created, None, Some(node_refs))
    }

    const fn with_geometry(
        id: String,
        kind: RecordKind,
        created: Created,
        pos: Option<Position>,
        node_refs: Option<Vec<String>>,
    ) -> Self {
        Self {
            id,
            kind,
            visible: None,
            created,
            pos,
            address: BTreeMap::new(),
            node_refs,
            fields: BTreeMap::new(),
        }
    }

    /// Set the `visible` flag as read from the source.
    pub fn set_visible(&mut self, visible: impl Into<String>) {
        self.visible = Some(visible.into());
    }

    /// Store an address component under `address[key]`.
    pub fn insert_address(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.address.insert(key.into(), value.into());
    }

    /// Store a free-form top-level field.
    ///
    /// Returns `false` and leaves the record untouched when `key` is one of
    /// [`Self::RESERVED_FIELDS`].
    pub fn insert_field(&mut self, key: impl Into<String>, value: impl Into<String>) -> bool {
        let key = key.into();
        if Self::is_reserved(&key) {
            return false;
        }
        self.fields.insert(key, value.into());
        true
    }

    /// Whether `key` names a structural field.
    #[must_use]
    pub fn is_reserved(key: &str) -> bool {
        Self::RESERVED_FIELDS.contains(&key)
    }

    /// Element identifier.
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Record kind.
    #[must_use]
    pub const fn kind(&self) -> RecordKind {
        self.kind
    }

    /// The `visible` attribute, when the source carried one.
    #[must_use]
    pub fn visible(&self) -> Option<&str> {
        self.visible.as_deref()
    }

    /// Provenance block.
    #[must_use]
    pub const fn created(&self) -> &Created {
        &self.created
    }

    /// Position, for nodes.
    #[must_use]
    pub const fn pos(&self) -> Option<Position> {
        self.pos
    }

    /// Address components keyed by their `addr:` suffix.
    #[must_use]
    pub const fn address(&self) -> &BTreeMap<String, String> {
        &self.address
    }

    /// Member node identifiers, for ways.
    #[must_use]
    pub fn node_refs(&self) -> Option<&[String]> {
        self.node_refs.as_deref()
    }

    /// Look up a free-form top-level field.
    #[must_use]
    pub fn field(&self, key: &str) -> Option<&str> {
        self.fields.get(key).map(String::as_str)
    }

    /// All free-form top-level fields.
    #[must_use]
    pub const fn fields(&self) -> &BTreeMap<String, String> {
        &self.fields
    }
}
