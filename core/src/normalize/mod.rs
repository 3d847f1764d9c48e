//! Token normalization: raw token in, index key (or nothing) out.
//!
//! Two strategies share the same screening step (lowercase, strip everything but
//! alphanumerics and `-`, numeral rewrite, stopword/ignore/length filter):
//!
//! - [`StemNormalizer`] stems what survives with the Snowball English stemmer.
//! - [`TagNormalizer`] appends a part-of-speech tag and drops excluded classes.
//!
//! [`Normalizer`] picks one from a [`NormalizerConfig`]; build and query code only
//! talk to it through the [`Normalize`] trait.

mod config;
mod stem;
mod tagged;
pub mod tagger;

pub use config::{default_numerals, NormalizerConfig, Strategy, TagExclusion};
pub use stem::StemNormalizer;
pub use tagged::TagNormalizer;

use std::collections::{BTreeMap, HashSet};

use crate::tokenizer::{default_stopwords, tokenize};

pub trait Normalize: Send + Sync {
    /// Canonical key for `raw`, or `None` when the token is dropped.
    fn normalize(&self, raw: &str) -> Option<String>;

    /// Whether an already-lowercased token is on this normalizer's stopword list.
    fn is_stopword(&self, token: &str) -> bool;

    /// Normalized key set of a document's title and content.
    fn get_normalized_tokens(&self, title: Option<&str>, content: Option<&str>) -> HashSet<String> {
        [title, content]
            .into_iter()
            .flatten()
            .flat_map(tokenize)
            .filter_map(|raw| self.normalize(&raw))
            .collect()
    }
}

/// The normalizer an index is pinned to.
#[derive(Debug, Clone)]
pub enum Normalizer {
    Stem(StemNormalizer),
    Tagged(TagNormalizer),
}

impl Normalizer {
    pub fn from_config(config: &NormalizerConfig) -> Self {
        match config.strategy {
            Strategy::Stem => Normalizer::Stem(StemNormalizer::new(config)),
            Strategy::Tagged => Normalizer::Tagged(TagNormalizer::new(config)),
        }
    }

    pub fn config(&self) -> &NormalizerConfig {
        match self {
            Normalizer::Stem(n) => n.config(),
            Normalizer::Tagged(n) => n.config(),
        }
    }
}

impl Normalize for Normalizer {
    fn normalize(&self, raw: &str) -> Option<String> {
        match self {
            Normalizer::Stem(n) => n.normalize(raw),
            Normalizer::Tagged(n) => n.normalize(raw),
        }
    }

    fn is_stopword(&self, token: &str) -> bool {
        match self {
            Normalizer::Stem(n) => n.is_stopword(token),
            Normalizer::Tagged(n) => n.is_stopword(token),
        }
    }
}

/// Screening shared by both strategies.
#[derive(Debug, Clone)]
struct Filters {
    stopwords: HashSet<String>,
    ignore: HashSet<String>,
    numerals: BTreeMap<String, String>,
}

impl Filters {
    fn new(config: &NormalizerConfig) -> Self {
        let stopwords = match &config.stopwords {
            Some(words) => words.iter().map(|w| w.to_lowercase()).collect(),
            None => default_stopwords().iter().map(|w| w.to_string()).collect(),
        };
        Self {
            stopwords,
            ignore: config.ignore.iter().map(|w| w.to_lowercase()).collect(),
            numerals: config.numerals.clone(),
        }
    }

    fn is_stopword(&self, token: &str) -> bool { self.stopwords.contains(token) }

    /// Lowercased, stripped text, or `None` if the raw form is already a stopword
    /// (list entries such as `don't` would not survive stripping).
    fn clean(&self, raw: &str) -> Option<String> {
        let lowered = raw.to_lowercase();
        if self.stopwords.contains(&lowered) {
            return None;
        }
        Some(clean(&lowered))
    }

    fn substitute(&self, text: String) -> String {
        match self.numerals.get(&text) {
            Some(word) => word.clone(),
            None => text,
        }
    }

    fn admits(&self, text: &str) -> bool {
        text.chars().count() > 1 && !self.stopwords.contains(text) && !self.ignore.contains(text)
    }
}

/// Lowercase and keep only alphanumerics and hyphens.
fn clean(raw: &str) -> String {
    raw.chars()
        .flat_map(char::to_lowercase)
        .filter(|c| c.is_alphanumeric() || *c == '-')
        .collect()
}
