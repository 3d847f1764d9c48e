use lazy_static::lazy_static;
use rust_stemmers::{Algorithm, Stemmer};

use super::{Filters, Normalize, NormalizerConfig};

lazy_static! {
    static ref STEMMER: Stemmer = Stemmer::create(Algorithm::English);
}

const MAX_STEM_PASSES: usize = 8;

/// Stem until the output no longer changes, so every key is its own stem.
fn stem_to_fixpoint(text: &str) -> Option<String> {
    let mut current = text.to_string();
    for _ in 0..MAX_STEM_PASSES {
        let next = STEMMER.stem(&current);
        if next == current {
            return Some(current);
        }
        current = next.into_owned();
    }
    None
}

/// Screens a token, then stems it so morphological variants share one key.
#[derive(Debug, Clone)]
pub struct StemNormalizer {
    config: NormalizerConfig,
    filters: Filters,
}

impl StemNormalizer {
    pub fn new(config: &NormalizerConfig) -> Self {
        Self { config: config.clone(), filters: Filters::new(config) }
    }

    pub fn config(&self) -> &NormalizerConfig { &self.config }
}

impl Normalize for StemNormalizer {
    fn normalize(&self, raw: &str) -> Option<String> {
        let text = self.filters.substitute(self.filters.clean(raw)?);
        if !self.filters.admits(&text) {
            return None;
        }
        // a stem can itself be a stopword or a single letter ("wills" -> "will")
        let stem = stem_to_fixpoint(&text)?;
        self.filters.admits(&stem).then_some(stem)
    }

    fn is_stopword(&self, token: &str) -> bool { self.filters.is_stopword(token) }
}
