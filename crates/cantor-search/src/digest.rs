//! Content digests used in cache keys.

use sha2::{Digest, Sha256};

/// Hex-encoded SHA-256 of a text.
#[must_use]
pub fn text_digest(text: &str) -> String {
    hex::encode(Sha256::digest(text.as_bytes()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_digest_is_stable_and_hex() {
        let digest = text_digest("주 하나님 지으신 모든 세계");
        assert_eq!(digest, text_digest("주 하나님 지으신 모든 세계"));
        assert_eq!(digest.len(), 64);
        assert!(digest.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_digest_of_empty_text() {
        assert_eq!(
            text_digest(""),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }

    #[test]
    fn test_different_texts_differ() {
        assert_ne!(text_digest("grace"), text_digest("Grace"));
    }
}
