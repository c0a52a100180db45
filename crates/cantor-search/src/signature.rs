//! Corpus signature: a version token for everything derived from the catalog.

use chrono::{DateTime, Utc};
use std::fmt;

use cantor_core::schema::format_timestamp;
use cantor_core::Catalog;

/// Version token of the catalog contents.
///
/// Derived from the newest modification time, so any write that moves that
/// time produces a new signature and every cache key embedding the old one
/// simply stops being reachable.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CorpusSignature(String);

impl CorpusSignature {
    /// Signature for a catalog whose newest modification is `latest`.
    /// An empty catalog gets the current time.
    #[must_use]
    pub fn from_latest(latest: Option<DateTime<Utc>>) -> Self {
        Self(format_timestamp(latest.unwrap_or_else(Utc::now)))
    }

    /// Read the signature of a catalog.
    pub fn of<C: Catalog + ?Sized>(catalog: &C) -> cantor_core::Result<Self> {
        Ok(Self::from_latest(catalog.latest_modification()?))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CorpusSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
