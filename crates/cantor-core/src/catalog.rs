//! Read/write interface over the hymn catalog.
//!
//! The search layer only talks to the backing store through [`Catalog`];
//! [`Database`](crate::schema::Database) is the SQLite implementation.

use chrono::{DateTime, Utc};

use crate::error::Result;
use crate::filter::{HymnFilter, NameField};
use crate::model::{ActorId, Hymn, HymnDraft, HymnId};

/// Backing store of the catalog.
///
/// Every read only sees visible rows unless stated otherwise, and every
/// list comes back in ascending id order.
pub trait Catalog {
    /// All visible hymns, optionally skipping one id.
    fn list_visible(&self, exclude: Option<HymnId>) -> Result<Vec<Hymn>>;

    /// One visible hymn by id.
    fn find_visible(&self, id: HymnId) -> Result<Option<Hymn>>;

    /// Visible hymns matching a predicate set.
    fn fetch_matching(&self, filter: &HymnFilter) -> Result<Vec<Hymn>>;

    /// Number of visible hymns.
    fn count_visible(&self) -> Result<u64>;

    /// Number of visible hymns other than `exclude` whose `field` equals `name`.
    fn count_named(&self, field: NameField, name: &str, exclude: Option<HymnId>) -> Result<u64>;

    /// Most recent modification across all rows, soft-deleted ones included.
    fn latest_modification(&self) -> Result<Option<DateTime<Utc>>>;

    /// Store a new visible hymn and return its id.
    fn insert(&self, draft: &HymnDraft, at: DateTime<Utc>) -> Result<HymnId>;

    /// Replace a visible hymn, provided the stored row is not newer than
    /// `observed_at`. Fails with `StaleWrite` otherwise.
    fn update(&self, hymn: &Hymn, observed_at: DateTime<Utc>) -> Result<()>;

    /// Flip the soft-delete marker. Fails with `NotFound` when no row with
    /// the opposite visibility exists.
    fn set_visibility(
        &self,
        id: HymnId,
        visible: bool,
        by: ActorId,
        at: DateTime<Utc>,
    ) -> Result<()>;
}
