//! Distinct-contributor collector.

use std::{collections::BTreeSet, io::BufRead};

use log::info;

use super::AuditError;
use crate::reader::OsmReader;

const UID_ATTRIBUTE: &str = "uid";
const UNKNOWN_ID: &str = "<unknown>";

/// Collect the `uid` of every top-level node, way and relation.
///
/// # Errors
/// Returns [`AuditError::Read`] on malformed input and
/// [`AuditError::MissingContributorId`] for the first primitive without a
/// `uid`.
///
/// # Examples
/// ```
/// use osm_audit_data::{OsmReader, unique_users};
///
/// let xml = r#"<osm><node id="1" uid="5"/><node id="2" uid="5"/><way id="3" uid="7"/></osm>"#;
/// let users = unique_users(OsmReader::new(xml.as_bytes()))?;
///
/// assert_eq!(users.len(), 2);
/// # Ok::<(), osm_audit_data::AuditError>(())
/// ```
pub fn unique_users<R: BufRead>(reader: OsmReader<R>) -> Result<BTreeSet<String>, AuditError> {
    let mut users = BTreeSet::new();
    for element in reader.elements() {
        let element = element?;
        if !element.kind().is_primitive() {
            continue;
        }
        let uid = element
            .attribute(UID_ATTRIBUTE)
            .ok_or_else(|| AuditError::MissingContributorId {
                kind: element.kind().to_string(),
                id: element.id().unwrap_or(UNKNOWN_ID).to_owned(),
            })?;
        users.insert(uid.to_owned());
    }
    info!("found {} distinct contributors", users.len());
    Ok(users)
}
