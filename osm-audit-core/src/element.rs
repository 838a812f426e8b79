//! Elements read from an OSM XML extract.
//!
//! A [`SourceElement`] is one top-level `node`, `way` or `relation` (or any
//! other top-level tag) together with its `tag` and `nd` children. Readers
//! build one at a time and drop it once it has been consumed.

use std::{collections::BTreeMap, fmt};

/// Tag name of a top-level element.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ElementKind {
    /// `<node>`
    Node,
    /// `<way>`
    Way,
    /// `<relation>`
    Relation,
    /// Any other top-level tag, such as `<bounds>`.
    Other(String),
}

impl ElementKind {
    /// Map an XML tag name onto an element kind.
    ///
    /// # Examples
    /// ```
    /// use osm_audit_core::ElementKind;
    ///
    /// assert_eq!(ElementKind::from_tag_name("way"), ElementKind::Way);
    /// assert_eq!(
    ///     ElementKind::from_tag_name("bounds"),
    ///     ElementKind::Other("bounds".into())
    /// );
    /// ```
    #[must_use]
    pub fn from_tag_name(name: &str) -> Self {
        match name {
            "node" => Self::Node,
            "way" => Self::Way,
            "relation" => Self::Relation,
            other => Self::Other(other.to_owned()),
        }
    }

    /// The XML tag name for this kind.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Node => "node",
            Self::Way => "way",
            Self::Relation => "relation",
            Self::Other(name) => name,
        }
    }

    /// Whether the element carries contributor provenance (`node`, `way`,
    /// `relation`).
    #[must_use]
    pub const fn is_primitive(&self) -> bool {
        matches!(self, Self::Node | Self::Way | Self::Relation)
    }
}

impl fmt::Display for ElementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A descriptive `<tag k="..." v="..."/>` child.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tag {
    /// The `k` attribute.
    pub key: String,
    /// The `v` attribute.
    pub value: String,
}

impl Tag {
    /// Construct a tag from a key/value pair.
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

/// One top-level element with its attributes, descriptive tags and way
/// membership references, in source order.
///
/// # Examples
/// ```
/// use osm_audit_core::{ElementKind, SourceElement};
///
/// let way = SourceElement::new(ElementKind::Way)
///     .with_attribute("id", "42")
///     .with_tag("highway", "residential")
///     .with_node_ref("100")
///     .with_node_ref("200");
///
/// assert_eq!(way.id(), Some("42"));
/// assert_eq!(way.node_refs(), ["100", "200"]);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceElement {
    kind: ElementKind,
    attributes: BTreeMap<String, String>,
    tags: Vec<Tag>,
    node_refs: Vec<String>,
}

impl SourceElement {
    /// Start an element with no attributes or children.
    #[must_use]
    pub const fn new(kind: ElementKind) -> Self {
        Self {
            kind,
            attributes: BTreeMap::new(),
            tags: Vec::new(),
            node_refs: Vec::new(),
        }
    }

    /// Builder form of [`Self::set_attribute`].
    #[must_use]
    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.set_attribute(name, value);
        self
    }

    /// Builder form of [`Self::push_tag`].
    #[must_use]
    pub fn with_tag(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.push_tag(Tag::new(key, value));
        self
    }

    /// Builder form of [`Self::push_node_ref`].
    #[must_use]
    pub fn with_node_ref(mut self, node_ref: impl Into<String>) -> Self {
        self.push_node_ref(node_ref);
        self
    }

    /// Set an attribute, replacing any previous value.
    pub fn set_attribute(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.attributes.insert(name.into(), value.into());
    }

    /// Append a descriptive tag.
    pub fn push_tag(&mut self, tag: Tag) {
        self.tags.push(tag);
    }

    /// Append a way membership reference.
    pub fn push_node_ref(&mut self, node_ref: impl Into<String>) {
        self.node_refs.push(node_ref.into());
    }

    /// Element kind.
    #[must_use]
    pub const fn kind(&self) -> &ElementKind {
        &self.kind
    }

    /// Look up an attribute by name.
    #[must_use]
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }

    /// The `id` attribute, if present.
    #[must_use]
    pub fn id(&self) -> Option<&str> {
        self.attribute("id")
    }

    /// Descriptive tags in source order.
    #[must_use]
    pub fn tags(&self) -> &[Tag] {
        &self.tags
    }

    /// Way membership references in source order, duplicates included.
    #[must_use]
    pub fn node_refs(&self) -> &[String] {
        &self.node_refs
    }
}
