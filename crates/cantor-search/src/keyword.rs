//! Keyword screening and classification.

/// Keywords this long (in characters) or longer are never searched.
pub const MAX_KEYWORD_CHARS: usize = 100;

/// Splits a compound keyword into its two parts.
pub const CONJUNCTION: char = '&';

/// Substrings that make a keyword unsafe to search, compared
/// case-insensitively.
const DENYLIST: [&str; 16] = [
    "insert", "delete", "update", "create", "drop", "#", "$", "%", "&", "(", ")", "\"", "'", "@",
    ":", "select",
];

/// A classified search keyword.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Query {
    /// Nothing to search for.
    Empty,
    /// Rejected by the safety screen; searched as if empty.
    Unsafe(String),
    Single(String),
    /// Two non-empty parts joined by [`CONJUNCTION`].
    Compound(String, String),
}

impl Query {
    /// Classify a raw keyword. Surrounding whitespace is ignored.
    ///
    /// The screen runs on each side of the conjunction, so `a&b` is a
    /// compound query while `a&`, `&b` and `a&b&c` are unsafe.
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        let keyword = raw.trim();
        if keyword.is_empty() {
            return Self::Empty;
        }
        if keyword.chars().count() >= MAX_KEYWORD_CHARS {
            return Self::Unsafe(keyword.to_string());
        }

        let parts: Vec<&str> = keyword.split(CONJUNCTION).map(str::trim).collect();
        match parts.as_slice() {
            [single] if is_safe(single) => Self::Single((*single).to_string()),
            [left, right] if !left.is_empty() && !right.is_empty() && is_safe(left) && is_safe(right) => {
                Self::Compound((*left).to_string(), (*right).to_string())
            }
            _ => Self::Unsafe(keyword.to_string()),
        }
    }

    /// Canonical text of the query, used in cache keys.
    #[must_use]
    pub fn cache_text(&self) -> String {
        match self {
            Self::Empty => String::new(),
            Self::Unsafe(keyword) => format!("\u{0}unsafe:{keyword}"),
            Self::Single(keyword) => keyword.clone(),
            Self::Compound(left, right) => format!("{left}{CONJUNCTION}{right}"),
        }
    }

    /// Keyword parts every tier predicate has to satisfy.
    #[must_use]
    pub fn parts(&self) -> Vec<&str> {
        match self {
            Self::Empty | Self::Unsafe(_) => Vec::new(),
            Self::Single(keyword) => vec![keyword.as_str()],
            Self::Compound(left, right) => vec![left.as_str(), right.as_str()],
        }
    }
}

fn is_safe(part: &str) -> bool {
    let lowered = part.to_lowercase();
    !DENYLIST.iter().any(|needle| lowered.contains(needle))
}
