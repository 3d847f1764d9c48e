use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::Path;

use super::tagger::Tag;

/// Which normalization strategy an index was built with.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Strategy {
    #[default]
    Stem,
    Tagged,
}

/// Decides which tagged tokens are dropped by the tag-augmented strategy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "values", rename_all = "snake_case")]
pub enum TagExclusion {
    /// Drop tokens whose part-of-speech tag is in the set (Penn codes, e.g. `IN`).
    Tags(BTreeSet<String>),
    /// Drop tokens whose normalized text ends with one of these literal suffixes.
    /// Kept for compatibility with indexes built under the old text-suffix rule.
    TextSuffix(Vec<String>),
}

impl Default for TagExclusion {
    fn default() -> Self {
        TagExclusion::Tags(
            [Tag::Preposition, Tag::Particle, Tag::To]
                .iter()
                .map(|t| t.as_str().to_string())
                .collect(),
        )
    }
}

impl TagExclusion {
    pub fn excludes(&self, text: &str, tag: Tag) -> bool {
        match self {
            TagExclusion::Tags(tags) => tags.contains(tag.as_str()),
            TagExclusion::TextSuffix(suffixes) => suffixes.iter().any(|s| text.ends_with(s.as_str())),
        }
    }
}

/// Everything that influences how a raw token becomes an index key.
///
/// An index records the config it was built with (see [`crate::persist::Manifest`]);
/// queries must be normalized with that same config.
/// Fields missing from a config file take the defaults of its `strategy`, so
/// `{"strategy":"tagged"}` gets the numeral table just like [`NormalizerConfig::tagged`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "ConfigFile")]
pub struct NormalizerConfig {
    pub strategy: Strategy,
    /// Replaces the built-in English stopword list when set.
    pub stopwords: Option<Vec<String>>,
    /// Extra terms dropped alongside stopwords.
    pub ignore: Vec<String>,
    /// Digit strings rewritten to words before filtering.
    pub numerals: BTreeMap<String, String>,
    /// Only consulted by the tagged strategy.
    pub exclusion: TagExclusion,
    /// Joins normalized text and tag in tagged keys.
    pub separator: char,
}

/// On-disk form of [`NormalizerConfig`]: every field optional.
#[derive(Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct ConfigFile {
    strategy: Strategy,
    stopwords: Option<Vec<String>>,
    ignore: Option<Vec<String>>,
    numerals: Option<BTreeMap<String, String>>,
    exclusion: Option<TagExclusion>,
    separator: Option<char>,
}

impl From<ConfigFile> for NormalizerConfig {
    fn from(file: ConfigFile) -> Self {
        let defaults = NormalizerConfig::for_strategy(file.strategy);
        NormalizerConfig {
            strategy: file.strategy,
            stopwords: file.stopwords.or(defaults.stopwords),
            ignore: file.ignore.unwrap_or(defaults.ignore),
            numerals: file.numerals.unwrap_or(defaults.numerals),
            exclusion: file.exclusion.unwrap_or(defaults.exclusion),
            separator: file.separator.unwrap_or(defaults.separator),
        }
    }
}

impl Default for NormalizerConfig {
    fn default() -> Self { Self::stem() }
}

impl NormalizerConfig {
    pub fn stem() -> Self {
        Self {
            strategy: Strategy::Stem,
            stopwords: None,
            ignore: Vec::new(),
            numerals: BTreeMap::new(),
            exclusion: TagExclusion::default(),
            separator: '_',
        }
    }

    pub fn tagged() -> Self {
        Self { strategy: Strategy::Tagged, numerals: default_numerals(), ..Self::stem() }
    }

    pub fn for_strategy(strategy: Strategy) -> Self {
        match strategy {
            Strategy::Stem => Self::stem(),
            Strategy::Tagged => Self::tagged(),
        }
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).with_context(|| format!("reading normalizer config {}", path.display()))?;
        let config = serde_json::from_str(&text).with_context(|| format!("parsing normalizer config {}", path.display()))?;
        Ok(config)
    }
}

/// Units, teens, and decades up to one hundred.
pub fn default_numerals() -> BTreeMap<String, String> {
    const TABLE: &[(&str, &str)] = &[
        ("0", "zero"), ("1", "one"), ("2", "two"), ("3", "three"), ("4", "four"),
        ("5", "five"), ("6", "six"), ("7", "seven"), ("8", "eight"), ("9", "nine"),
        ("10", "ten"), ("11", "eleven"), ("12", "twelve"), ("13", "thirteen"), ("14", "fourteen"),
        ("15", "fifteen"), ("16", "sixteen"), ("17", "seventeen"), ("18", "eighteen"), ("19", "nineteen"),
        ("20", "twenty"), ("30", "thirty"), ("40", "forty"), ("50", "fifty"), ("60", "sixty"),
        ("70", "seventy"), ("80", "eighty"), ("90", "ninety"), ("100", "hundred"),
    ];
    TABLE.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
}
