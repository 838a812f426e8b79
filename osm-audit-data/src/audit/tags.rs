//! Tag-frequency and key-class counters.

use std::{collections::BTreeMap, io::BufRead};

use log::info;
use osm_audit_core::{KeyClass, classify_key};
use serde::Serialize;

use super::AuditError;
use crate::reader::{ElementEvent, OsmReader};

const TAG_ELEMENT: &str = "tag";
const KEY_ATTRIBUTE: &str = "k";

/// Count closed elements by tag name.
///
/// Every element in the document counts once, the root and nested children
/// included, so the values sum to the number of elements read.
///
/// # Errors
/// Returns [`AuditError::Read`] when the extract cannot be parsed.
///
/// # Examples
/// ```
/// use osm_audit_data::{OsmReader, count_tags};
///
/// let xml = r#"<osm><node id="1"><tag k="a" v="b"/></node><node id="2"/></osm>"#;
/// let counts = count_tags(OsmReader::new(xml.as_bytes()))?;
///
/// assert_eq!(counts["node"], 2);
/// assert_eq!(counts["tag"], 1);
/// assert_eq!(counts["osm"], 1);
/// # Ok::<(), osm_audit_data::AuditError>(())
/// ```
pub fn count_tags<R: BufRead>(reader: OsmReader<R>) -> Result<BTreeMap<String, u64>, AuditError> {
    let mut counts = BTreeMap::new();
    for event in reader.events() {
        if let ElementEvent::End { name } = event? {
            *counts.entry(name).or_insert(0) += 1;
        }
    }
    info!("counted {} distinct element names", counts.len());
    Ok(counts)
}

/// Number of descriptive keys seen in each [`KeyClass`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct KeyClassCounts {
    /// Keys made of lowercase letters and underscores.
    pub lower: u64,
    /// Two lowercase segments joined by a colon.
    pub lower_colon: u64,
    /// Keys containing a problem character.
    pub problemchars: u64,
    /// Everything else.
    pub other: u64,
}

impl KeyClassCounts {
    /// Increment the bucket for `class`.
    pub const fn record(&mut self, class: KeyClass) {
        *self.bucket_mut(class) += 1;
    }

    /// Count for `class`.
    #[must_use]
    pub const fn get(&self, class: KeyClass) -> u64 {
        match class {
            KeyClass::Lower => self.lower,
            KeyClass::LowerColon => self.lower_colon,
            KeyClass::ProblemChars => self.problemchars,
            KeyClass::Other => self.other,
        }
    }

    /// Keys counted across all buckets.
    #[must_use]
    pub const fn total(&self) -> u64 {
        self.lower + self.lower_colon + self.problemchars + self.other
    }

    const fn bucket_mut(&mut self, class: KeyClass) -> &mut u64 {
        match class {
            KeyClass::Lower => &mut self.lower,
            KeyClass::LowerColon => &mut self.lower_colon,
            KeyClass::ProblemChars => &mut self.problemchars,
            KeyClass::Other => &mut self.other,
        }
    }
}

/// Classify the key of every `<tag>` element.
///
/// Uses start events only, so keys are classified as soon as they are read.
///
/// # Errors
/// Returns [`AuditError::Read`] on malformed input and
/// [`AuditError::MissingTagKey`] when a `<tag>` has no `k` attribute.
pub fn count_key_types<R: BufRead>(reader: OsmReader<R>) -> Result<KeyClassCounts, AuditError> {
    let mut counts = KeyClassCounts::default();
    for event in reader.events() {
        let ElementEvent::Start(start) = event? else {
            continue;
        };
        if start.name() != TAG_ELEMENT {
            continue;
        }
        let key = start
            .attribute(KEY_ATTRIBUTE)
            .ok_or(AuditError::MissingTagKey)?;
        counts.record(classify_key(key));
    }
    info!("classified {} descriptive keys", counts.total());
    Ok(counts)
}
