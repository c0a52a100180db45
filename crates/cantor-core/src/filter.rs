//! Predicate sets the search layer asks the catalog to evaluate.

/// Which name column a lookup refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NameField {
    Primary,
    Secondary,
}

impl NameField {
    #[must_use]
    pub const fn column(self) -> &'static str {
        match self {
            Self::Primary => "name_jp",
            Self::Secondary => "name_kr",
        }
    }
}

/// One keyword part of a lyric/phonetic predicate.
#[derive(Debug, Clone, PartialEq)]
pub struct LyricTerm {
    /// Squashed form matched against the squashed lyric.
    pub lyric: String,

    /// Phonetic reading matched against the stored transliteration.
    /// `None` disables the phonetic side for this part.
    pub phonetic: Option<String>,
}

/// A predicate set over visible hymns.
///
/// Multi-part filters require every part to match (AND across parts);
/// within one part any of the listed columns may match (OR).
#[derive(Debug, Clone, PartialEq)]
pub enum HymnFilter {
    /// Either name equals the keyword.
    ExactName(String),

    /// Either name contains the part, or either name's trigram similarity
    /// to the part exceeds `threshold`.
    FuzzyName { parts: Vec<String>, threshold: f64 },

    /// The lyric contains the part, or the phonetic reading contains the
    /// part's reading.
    LyricOrPhonetic { parts: Vec<LyricTerm> },
}

impl HymnFilter {
    /// Whether the filter can match anything at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        match self {
            Self::ExactName(keyword) => keyword.is_empty(),
            Self::FuzzyName { parts, .. } => parts.is_empty(),
            Self::LyricOrPhonetic { parts } => parts.is_empty(),
        }
    }
}
