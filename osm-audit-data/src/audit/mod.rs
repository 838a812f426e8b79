//! Single-pass audits over an extract.
//!
//! Each audit consumes its own [`OsmReader`](crate::OsmReader) and reduces the
//! stream to one summary value. Audits never shape records and never share
//! state with one another.

mod streets;
mod tags;
mod users;

use thiserror::Error;

use crate::reader::OsmReadError;

pub use streets::{StreetTypeAudit, audit_street_types};
pub use tags::{KeyClassCounts, count_key_types, count_tags};
pub use users::unique_users;

/// Errors raised by an audit pass.
#[derive(Debug, Error)]
pub enum AuditError {
    #[error("failed to read OSM extract: {0}")]
    Read(#[from] OsmReadError),
    #[error("<tag> element is missing its `k` attribute")]
    MissingTagKey,
    #[error("{kind} {id} has no `uid` attribute")]
    MissingContributorId { kind: String, id: String },
}
