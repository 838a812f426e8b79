//! Street-type audit: the offline step that feeds the correction table.

use std::{
    collections::{BTreeMap, BTreeSet},
    io::BufRead,
};

use log::{debug, info};
use osm_audit_core::{ElementKind, ExpectedStreetTypes, street_type};

use super::AuditError;
use crate::reader::OsmReader;

const STREET_KEY: &str = "addr:street";

/// Unexpected street types, each mapped to the full names that end in it.
pub type StreetTypeAudit = BTreeMap<String, BTreeSet<String>>;

/// Group street names whose final token is not an accepted suffix.
///
/// Only `addr:street` tags on nodes and ways are inspected. The final token
/// keeps any trailing punctuation, so `"Advance Rd."` is grouped under
/// `"Rd."`.
///
/// # Errors
/// Returns [`AuditError::Read`] when the extract cannot be parsed.
///
/// # Examples
/// ```
/// use osm_audit_core::ExpectedStreetTypes;
/// use osm_audit_data::{OsmReader, audit_street_types};
///
/// let xml = r#"<osm>
///   <node id="1"><tag k="addr:street" v="Advance Rd."/></node>
///   <way id="2"><tag k="addr:street" v="Main Street"/></way>
/// </osm>"#;
/// let audit = audit_street_types(OsmReader::new(xml.as_bytes()), &ExpectedStreetTypes::default())?;
///
/// assert_eq!(audit.len(), 1);
/// assert!(audit["Rd."].contains("Advance Rd."));
/// # Ok::<(), osm_audit_data::AuditError>(())
/// ```
pub fn audit_street_types<R: BufRead>(
    reader: OsmReader<R>,
    expected: &ExpectedStreetTypes,
) -> Result<StreetTypeAudit, AuditError> {
    let mut audit = StreetTypeAudit::new();
    for element in reader.elements() {
        let element = element?;
        if !matches!(element.kind(), ElementKind::Node | ElementKind::Way) {
            continue;
        }
        for tag in element.tags().iter().filter(|tag| tag.key == STREET_KEY) {
            let Some(found) = street_type(&tag.value) else {
                debug!("street name {:?} has no final token", tag.value);
                continue;
            };
            if !expected.contains(found) {
                audit
                    .entry(found.to_owned())
                    .or_default()
                    .insert(tag.value.clone());
            }
        }
    }
    info!("found {} unexpected street types", audit.len());
    Ok(audit)
}
