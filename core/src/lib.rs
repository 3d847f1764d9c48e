//! Conjunctive keyword search over a static corpus.
//!
//! Documents are normalized into token sets, folded into postings lists, and
//! queried by intersecting the postings of every resolved query term.

pub mod document;
pub mod engine;
pub mod error;
pub mod index;
pub mod ingest;
pub mod normalize;
pub mod persist;
pub mod query;
pub mod store;
pub mod tokenizer;

pub use document::{DocMeta, Document};
pub use engine::{Engine, IndexSnapshot};
pub use error::{Corruption, IndexError, StoreError};
pub use index::{IndexBuilder, IndexStats, PostingsAccumulator, PostingsEntry};
pub use normalize::{Normalize, Normalizer, NormalizerConfig, Strategy, TagExclusion};
pub use query::{NoMatchReason, QueryEvaluator, QueryOutcome, QueryResult};
pub use store::{MemoryStore, PostingsStore, SledStore};

pub type DocId = u32;
