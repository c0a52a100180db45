//! Dictionary-backed morphological analysis.
//!
//! [`MorphAnalyzer`] runs a lindera segmenter over one system dictionary.
//! Loaded with IPADIC it splits Japanese into morphemes and reads each one
//! as katakana; loaded with ko-dic it splits Korean into morphemes, so
//! 주님의 and 주님을 share the term 주님.

use anyhow::{Context, Result};
use lindera::dictionary::load_dictionary;
use lindera::mode::Mode;
use lindera::token::Token;
use std::borrow::Cow;
use std::fmt;
use std::sync::Arc;
use unicode_normalization::UnicodeNormalization;

use crate::config::SearchSettings;
use crate::phonetic::{katakana_reading, Transliterator};
use crate::tokenize::Segmenter;

/// Dictionary placeholder for a field an entry does not fill.
const UNFILLED: &str = "*";

pub struct MorphAnalyzer {
    name: String,
    segmenter: lindera::segmenter::Segmenter,
}

impl fmt::Debug for MorphAnalyzer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MorphAnalyzer")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

impl MorphAnalyzer {
    /// Load the built dictionary at `uri`, a directory or a `file://` URI.
    ///
    /// # Errors
    ///
    /// Returns an error if the dictionary cannot be found or decoded.
    pub fn load(uri: &str) -> Result<Self> {
        let dictionary =
            load_dictionary(uri).with_context(|| format!("Failed to load dictionary {uri}"))?;
        let name = format!("lindera-{}", dictionary.metadata.name);
        log::info!("Loaded {} dictionary from {uri}", dictionary.metadata.name);
        Ok(Self {
            name,
            segmenter: lindera::segmenter::Segmenter::new(Mode::Normal, dictionary, None),
        })
    }

    /// Run `each` over the morphemes of `text` that carry a letter or digit.
    fn analyze<T>(&self, text: &str, mut each: impl FnMut(&mut Token<'_>) -> T) -> Vec<T> {
        let normalized: String = text.nfkc().collect();
        match self.segmenter.segment(Cow::Borrowed(normalized.as_str())) {
            Ok(mut tokens) => tokens
                .iter_mut()
                .filter(|token| token.surface.chars().any(char::is_alphanumeric))
                .map(|token| each(token))
                .collect(),
            Err(err) => {
                log::warn!(
                    "{} failed on {} chars: {err}",
                    self.name,
                    text.chars().count()
                );
                Vec::new()
            }
        }
    }
}

impl Segmenter for MorphAnalyzer {
    fn name(&self) -> &str {
        &self.name
    }

    fn segment(&self, text: &str) -> Vec<String> {
        self.analyze(text, |token| token.surface.to_lowercase())
    }
}

impl Transliterator for MorphAnalyzer {
    fn reading(&self, token: &str) -> String {
        self.analyze(token, |morpheme| {
            let pronunciation = filled(morpheme.get("pronunciation"));
            let reading = pronunciation.or_else(|| filled(morpheme.get("reading")));
            reading.unwrap_or_else(|| katakana_reading(&morpheme.surface))
        })
        .concat()
    }
}

fn filled(field: Option<&str>) -> Option<String> {
    field
        .filter(|value| !value.is_empty() && *value != UNFILLED)
        .map(katakana_reading)
}

/// The analyzers named by the configuration, loaded once and shared by every
/// service built from it.
#[derive(Debug, Clone, Default)]
pub struct Analyzers {
    pub japanese: Option<Arc<MorphAnalyzer>>,
    pub korean: Option<Arc<MorphAnalyzer>>,
}

impl Analyzers {
    /// # Errors
    ///
    /// Returns an error if a configured dictionary cannot be loaded.
    pub fn load(settings: &SearchSettings) -> Result<Self> {
        let load = |uri: Option<&str>| -> Result<Option<Arc<MorphAnalyzer>>> {
            uri.map(MorphAnalyzer::load).transpose().map(|a| a.map(Arc::new))
        };
        let analyzers = Self {
            japanese: load(settings.japanese_dictionary.as_deref())?,
            korean: load(settings.korean_dictionary.as_deref())?,
        };
        if analyzers.is_empty() {
            log::debug!("No dictionaries configured; using built-in segmenters");
        }
        Ok(analyzers)
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.japanese.is_none() && self.korean.is_none()
    }
}
