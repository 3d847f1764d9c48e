use super::tagger::{self, Tag};
use super::{Filters, Normalize, NormalizerConfig, TagExclusion};

/// Keys tokens as `text{separator}TAG`, dropping excluded word classes.
///
/// The tag is taken from the cleaned token before numeral rewriting, so `2011` and
/// `7` both carry `CD`.
#[derive(Debug, Clone)]
pub struct TagNormalizer {
    config: NormalizerConfig,
    filters: Filters,
}

impl TagNormalizer {
    pub fn new(config: &NormalizerConfig) -> Self {
        Self { config: config.clone(), filters: Filters::new(config) }
    }

    pub fn config(&self) -> &NormalizerConfig { &self.config }

    fn exclusion(&self) -> &TagExclusion { &self.config.exclusion }

    /// Normalized text and tag, before the key is assembled.
    pub fn tagged(&self, raw: &str) -> Option<(String, Tag)> {
        let cleaned = self.filters.clean(raw)?;
        let tag = tagger::tag(&cleaned);
        let text = self.filters.substitute(cleaned);
        if !self.filters.admits(&text) || self.exclusion().excludes(&text, tag) {
            return None;
        }
        Some((text, tag))
    }

    /// `raw` itself when it is already a key this normalizer would emit.
    fn existing_key(&self, raw: &str) -> Option<String> {
        let (text, code) = raw.rsplit_once(self.config.separator)?;
        let tag = Tag::from_code(code)?;
        let canonical = self.filters.clean(text).is_some_and(|cleaned| cleaned == text)
            && self.filters.admits(text)
            && !self.exclusion().excludes(text, tag);
        canonical.then(|| raw.to_string())
    }
}

impl Normalize for TagNormalizer {
    fn normalize(&self, raw: &str) -> Option<String> {
        self.existing_key(raw)
            .or_else(|| self.tagged(raw).map(|(text, tag)| format!("{text}{}{tag}", self.config.separator)))
    }

    fn is_stopword(&self, token: &str) -> bool { self.filters.is_stopword(token) }
}
