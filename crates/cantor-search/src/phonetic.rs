//! Phonetic readings of lyrics and keywords.

use std::fmt;
use unicode_normalization::UnicodeNormalization;

use crate::tokenize::{Language, Tokenizer};

/// Produces the reading of a single token.
pub trait Transliterator: fmt::Debug + Send + Sync {
    fn reading(&self, token: &str) -> String;
}

/// Reads kana tokens as katakana and drops everything without a kana form.
#[derive(Debug, Clone, Copy, Default)]
pub struct KanaTransliterator;

impl Transliterator for KanaTransliterator {
    fn reading(&self, token: &str) -> String {
        katakana_reading(token)
    }
}

/// The kana of `text` as katakana; everything else is dropped.
pub(crate) fn katakana_reading(text: &str) -> String {
    text.nfkc().filter_map(to_katakana).collect()
}

fn to_katakana(c: char) -> Option<char> {
    match c {
        '\u{3041}'..='\u{3096}' | '\u{309D}'..='\u{309E}' => char::from_u32(u32::from(c) + 0x60),
        '\u{30A1}'..='\u{30FA}' | '\u{30FC}'..='\u{30FE}' => Some(c),
        _ => None,
    }
}

/// Reading of a whole text: the readings of its Japanese tokens, joined.
pub fn transliterate(tokenizer: &Tokenizer, transliterator: &dyn Transliterator, text: &str) -> String {
    tokenizer
        .tokenize(Language::Japanese, text)
        .iter()
        .map(|token| transliterator.reading(token))
        .collect()
}
