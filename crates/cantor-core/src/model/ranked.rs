use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::model::hymn::Hymn;
use crate::model::ids::{ActorId, HymnId};

/// Rank class of a search result. Lower priority sorts first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Tier {
    /// A name equals the keyword.
    ExactName,
    /// A name contains the keyword or is trigram-similar to it, or the
    /// entry was picked by TF-IDF similarity.
    FuzzyNameOrSimilarity,
    /// The lyric or its phonetic reading contains the keyword.
    LyricOrPhoneticMatch,
    /// Everything else, in catalog order.
    FallbackPool,
}

impl Tier {
    #[must_use]
    pub const fn priority(self) -> u8 {
        match self {
            Self::ExactName => 1,
            Self::FuzzyNameOrSimilarity => 2,
            Self::LyricOrPhoneticMatch => 3,
            Self::FallbackPool => 5,
        }
    }
}

impl PartialOrd for Tier {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Tier {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.priority().cmp(&other.priority())
    }
}

/// A hymn as presented in a result list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedHymn {
    pub id: HymnId,

    /// Primary name, decorated for classical hymns.
    pub display_name: String,
    pub name_jp: String,
    pub name_kr: String,
    pub lyric: String,
    pub link: String,
    pub classical: bool,
    pub updated_by: ActorId,
    pub updated_at: DateTime<Utc>,
    pub tier: Tier,
}

impl RankedHymn {
    #[must_use]
    pub fn new(hymn: &Hymn, tier: Tier) -> Self {
        Self {
            id: hymn.id,
            display_name: hymn.display_name(),
            name_jp: hymn.name_jp.clone(),
            name_kr: hymn.name_kr.clone(),
            lyric: hymn.lyric.clone(),
            link: hymn.link.clone(),
            classical: hymn.classical,
            updated_by: hymn.updated_by,
            updated_at: hymn.updated_at,
            tier,
        }
    }
}
