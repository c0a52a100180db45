//! Language-aware tokenization with memoization.
//!
//! A [`Segmenter`] does the actual splitting; [`Tokenizer`] applies the
//! language's script filter in front of it and memoizes results in the
//! shared [`NlpCache`] keyed by language, segmenter name and text digest.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use unicode_normalization::UnicodeNormalization;

use crate::cache::{NlpCache, TokenizeKey};
use crate::digest::text_digest;

/// Languages the catalog carries text in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Language {
    Korean,
    Japanese,
}

impl Language {
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::Korean => "ko",
            Self::Japanese => "ja",
        }
    }

    /// Reduce `text` to the characters this language segments.
    ///
    /// Korean keeps Hangul only; everything else becomes a word break.
    #[must_use]
    pub fn filter_script(self, text: &str) -> String {
        match self {
            Self::Korean => text
                .chars()
                .map(|c| if is_hangul(c) { c } else { ' ' })
                .collect(),
            Self::Japanese => text.to_string(),
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

fn is_hangul(c: char) -> bool {
    matches!(c, '\u{AC00}'..='\u{D7A3}' | '\u{1100}'..='\u{11FF}' | '\u{3130}'..='\u{318F}')
}

/// Splits filtered text into terms.
pub trait Segmenter: fmt::Debug + Send + Sync {
    /// Name recorded in cache keys; two segmenters with the same name must
    /// produce the same terms.
    fn name(&self) -> &str;

    fn segment(&self, text: &str) -> Vec<String>;
}

/// Splits on every non-alphanumeric character, lowercasing each term.
#[derive(Debug, Clone, Copy, Default)]
pub struct WordSegmenter;

impl Segmenter for WordSegmenter {
    fn name(&self) -> &str {
        "word"
    }

    fn segment(&self, text: &str) -> Vec<String> {
        text.nfkc()
            .collect::<String>()
            .split(|c: char| !c.is_alphanumeric())
            .filter(|term| !term.is_empty())
            .map(str::to_lowercase)
            .collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Script {
    Hiragana,
    Katakana,
    Han,
    Other,
}

fn script_of(c: char) -> Option<Script> {
    match c {
        '\u{3041}'..='\u{309F}' => Some(Script::Hiragana),
        '\u{30A0}'..='\u{30FF}' | '\u{31F0}'..='\u{31FF}' => Some(Script::Katakana),
        '\u{4E00}'..='\u{9FFF}' | '\u{3400}'..='\u{4DBF}' | '々' => Some(Script::Han),
        c if c.is_alphanumeric() => Some(Script::Other),
        _ => None,
    }
}

/// Splits text without word spacing into runs of one script.
///
/// "主イエスの愛" becomes `["主", "イエス", "の", "愛"]`.
#[derive(Debug, Clone, Copy, Default)]
pub struct ScriptRunSegmenter;

impl Segmenter for ScriptRunSegmenter {
    fn name(&self) -> &str {
        "script-run"
    }

    fn segment(&self, text: &str) -> Vec<String> {
        let mut terms = Vec::new();
        let mut current = String::new();
        let mut current_script = None;

        for c in text.nfkc() {
            let script = script_of(c);
            if script != current_script && !current.is_empty() {
                terms.push(std::mem::take(&mut current));
            }
            if script.is_some() {
                current.extend(c.to_lowercase());
            }
            current_script = script;
        }
        if !current.is_empty() {
            terms.push(current);
        }
        terms
    }
}

/// Memoizing tokenizer over one segmenter per language.
#[derive(Debug, Clone)]
pub struct Tokenizer {
    cache: Arc<NlpCache>,
    segmenters: HashMap<Language, Arc<dyn Segmenter>>,
}

impl Tokenizer {
    /// Tokenizer with the default segmenters: [`WordSegmenter`] for Korean,
    /// [`ScriptRunSegmenter`] for Japanese.
    #[must_use]
    pub fn new(cache: Arc<NlpCache>) -> Self {
        let mut segmenters: HashMap<Language, Arc<dyn Segmenter>> = HashMap::new();
        segmenters.insert(Language::Korean, Arc::new(WordSegmenter));
        segmenters.insert(Language::Japanese, Arc::new(ScriptRunSegmenter));
        Self { cache, segmenters }
    }

    #[must_use]
    pub fn with_segmenter(mut self, language: Language, segmenter: Arc<dyn Segmenter>) -> Self {
        self.segmenters.insert(language, segmenter);
        self
    }

    #[must_use]
    pub fn cache(&self) -> &NlpCache {
        &self.cache
    }

    /// Name of the segmenter used for `language`.
    #[must_use]
    pub fn segmenter_name(&self, language: Language) -> &str {
        self.segmenters
            .get(&language)
            .map_or("none", |segmenter| segmenter.name())
    }

    /// Terms of `text` in `language`. Never fails: text with nothing left
    /// after script filtering yields no terms.
    pub fn tokenize(&self, language: Language, text: &str) -> Arc<[String]> {
        let Some(segmenter) = self.segmenters.get(&language) else {
            return Arc::from(Vec::new());
        };
        let key = TokenizeKey {
            language,
            tokenizer: segmenter.name().to_string(),
            digest: text_digest(text),
        };
        if let Some(tokens) = self.cache.tokens(&key) {
            return tokens;
        }

        let filtered = language.filter_script(text);
        let tokens: Arc<[String]> = if filtered.trim().is_empty() {
            Arc::from(Vec::new())
        } else {
            Arc::from(segmenter.segment(&filtered))
        };
        log::debug!(
            "Tokenized {} chars of {} text into {} terms",
            text.chars().count(),
            language,
            tokens.len()
        );
        self.cache.put_tokens(key, Arc::clone(&tokens));
        tokens
    }
}
