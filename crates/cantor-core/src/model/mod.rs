pub mod hymn;
pub mod ids;
pub mod ranked;

pub use hymn::{Hymn, HymnDraft, HymnEdit, CLASSICAL_MARK};
pub use ids::{ActorId, HymnId};
pub use ranked::{RankedHymn, Tier};
