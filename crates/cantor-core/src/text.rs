//! Text normalization shared by the store and the search layer.

use unicode_normalization::UnicodeNormalization;

const IDEOGRAPHIC_SPACE: char = '\u{3000}';

/// Remove ideographic spaces and surrounding whitespace from a lyric.
#[must_use]
pub fn trim_lyric(lyric: &str) -> String {
    lyric
        .chars()
        .filter(|&c| c != IDEOGRAPHIC_SPACE)
        .collect::<String>()
        .trim()
        .to_string()
}

/// Collapse text into its match form: NFKC, lowercase, no whitespace.
///
/// Both sides of a lyric comparison go through this, so full-width and
/// half-width forms and line breaks never prevent a match.
#[must_use]
pub fn squash(text: &str) -> String {
    text.nfkc()
        .filter(|c| !c.is_whitespace())
        .flat_map(char::to_lowercase)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trim_lyric() {
        assert_eq!(trim_lyric("\u{3000}主よ\u{3000}御許に "), "主よ御許に");
        assert_eq!(trim_lyric("   "), "");
    }

    #[test]
    fn test_squash_folds_width_and_case() {
        assert_eq!(squash("Ａｍａｚｉｎｇ Grace"), "amazinggrace");
        assert_eq!(squash("나 같은\n죄인"), "나같은죄인");
    }
}
