//! Result-key derivation and the pattern used to scan results

use chrono::{DateTime, SecondsFormat, Utc};

use crate::domain::store::escape_glob;

/// Glob matching any timestamp produced by [`format_timestamp`]
pub const TIMESTAMP_GLOB: &str =
    "[0-9][0-9][0-9][0-9]-[0-9][0-9]-[0-9][0-9]T[0-9][0-9]:[0-9][0-9]:[0-9][0-9]Z";

/// Formats a creation time as RFC3339 in UTC with second precision
/// (`2009-11-10T20:34:58Z`).
pub fn format_timestamp(at: &DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// Store key of a [`SimulationRecord`](super::SimulationRecord)
///
/// The key is the plain concatenation `timestamp + backend_id + op_type`.
/// Algorithm services receive it as the run id and echo it back when
/// reporting results, so the format is part of the wire contract.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ResultKey(String);

impl ResultKey {
    pub fn new(created_at: &DateTime<Utc>, backend_id: &str, op_type: &str) -> Self {
        Self(format!(
            "{}{}{}",
            format_timestamp(created_at),
            backend_id,
            op_type
        ))
    }

    /// Pattern matching the keys of every run of `op_type` on `backend_id`
    pub fn search_pattern(backend_id: &str, op_type: &str) -> String {
        format!(
            "{}{}{}",
            TIMESTAMP_GLOB,
            escape_glob(backend_id),
            escape_glob(op_type)
        )
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl std::fmt::Display for ResultKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}
