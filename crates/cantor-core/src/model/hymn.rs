use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::model::ids::{ActorId, HymnId};
use crate::text;

/// Glyph prefixed to the display name of classical hymns.
pub const CLASSICAL_MARK: char = '★';

/// A single catalog entry: a hymn with names in two languages and a lyric.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Hymn {
    pub id: HymnId,

    /// Primary (Japanese) title.
    pub name_jp: String,

    /// Secondary-language (Korean) title.
    pub name_kr: String,

    /// Lyric body, stored without ideographic spaces.
    pub lyric: String,

    /// External video link.
    pub link: String,

    /// Phonetic transliteration of the lyric, recomputed on every write.
    pub phonetic: String,

    /// Classical hymns are displayed with [`CLASSICAL_MARK`].
    pub classical: bool,

    /// Soft-delete marker; invisible rows are skipped by every read.
    pub visible: bool,

    pub updated_by: ActorId,
    pub updated_at: DateTime<Utc>,
}

impl Hymn {
    /// Title as shown in listings.
    #[must_use]
    pub fn display_name(&self) -> String {
        if self.classical {
            let mut name = String::with_capacity(self.name_jp.len() + CLASSICAL_MARK.len_utf8());
            name.push(CLASSICAL_MARK);
            name.push_str(&self.name_jp);
            name
        } else {
            self.name_jp.clone()
        }
    }
}

/// A hymn that has not been stored yet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HymnDraft {
    pub name_jp: String,
    pub name_kr: String,
    pub lyric: String,
    pub link: String,
    pub phonetic: String,
    pub classical: bool,
    pub updated_by: ActorId,
}

impl HymnDraft {
    #[must_use]
    pub fn new(name_jp: impl Into<String>, updated_by: ActorId) -> Self {
        Self {
            name_jp: name_jp.into(),
            name_kr: String::new(),
            lyric: String::new(),
            link: String::new(),
            phonetic: String::new(),
            classical: false,
            updated_by,
        }
    }

    #[must_use]
    pub fn with_name_kr(mut self, name_kr: impl Into<String>) -> Self {
        self.name_kr = name_kr.into();
        self
    }

    #[must_use]
    pub fn with_lyric(mut self, lyric: impl Into<String>) -> Self {
        self.lyric = text::trim_lyric(&lyric.into());
        self
    }

    #[must_use]
    pub fn with_link(mut self, link: impl Into<String>) -> Self {
        self.link = link.into();
        self
    }

    #[must_use]
    pub fn with_phonetic(mut self, phonetic: impl Into<String>) -> Self {
        self.phonetic = phonetic.into();
        self
    }

    #[must_use]
    pub fn with_classical(mut self, classical: bool) -> Self {
        self.classical = classical;
        self
    }
}

/// An edit of an existing hymn, as submitted by a caller.
///
/// `observed_at` is the `updated_at` the caller saw when it loaded the
/// record; the write is rejected if the store holds anything newer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HymnEdit {
    pub id: HymnId,
    pub name_jp: String,
    pub name_kr: String,
    pub lyric: String,
    pub link: String,
    pub updated_by: ActorId,
    pub observed_at: DateTime<Utc>,
}

impl HymnEdit {
    /// Start an edit from the stored state of `hymn`.
    #[must_use]
    pub fn of(hymn: &Hymn, updated_by: ActorId) -> Self {
        Self {
            id: hymn.id,
            name_jp: hymn.name_jp.clone(),
            name_kr: hymn.name_kr.clone(),
            lyric: hymn.lyric.clone(),
            link: hymn.link.clone(),
            updated_by,
            observed_at: hymn.updated_at,
        }
    }

    /// Whether applying this edit would leave `current` untouched.
    ///
    /// Timestamps and the modifying actor are not part of the comparison.
    #[must_use]
    pub fn is_noop_for(&self, current: &Hymn) -> bool {
        self.name_jp == current.name_jp
            && self.name_kr == current.name_kr
            && self.link == current.link
            && text::trim_lyric(&self.lyric) == current.lyric
    }

    /// Produce the record that replaces `current`.
    #[must_use]
    pub fn apply_to(
        &self,
        current: &Hymn,
        phonetic: String,
        updated_at: DateTime<Utc>,
    ) -> Hymn {
        Hymn {
            id: current.id,
            name_jp: self.name_jp.clone(),
            name_kr: self.name_kr.clone(),
            lyric: text::trim_lyric(&self.lyric),
            link: self.link.clone(),
            phonetic,
            classical: current.classical,
            visible: current.visible,
            updated_by: self.updated_by,
            updated_at,
        }
    }
}
