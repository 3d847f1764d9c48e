//! Published index generations.
//!
//! An [`Engine`] serves queries from the current [`IndexSnapshot`] while at most one
//! rebuild runs. A rebuild writes into a fresh store and only replaces the current
//! snapshot once it has succeeded, so a failed build leaves the old one serving.

use parking_lot::{Mutex, RwLock};
use std::sync::Arc;

use crate::error::{IndexError, StoreError};
use crate::index::{IndexBuilder, IndexStats, DEFAULT_BATCH_SIZE};
use crate::normalize::{Normalizer, NormalizerConfig};
use crate::query::{QueryEvaluator, QueryOutcome};
use crate::store::PostingsStore;
use crate::Document;

/// One immutable index generation together with the normalizer it was built with.
#[derive(Debug)]
pub struct IndexSnapshot<S> {
    generation: u64,
    normalizer: Normalizer,
    store: S,
}

impl<S: PostingsStore> IndexSnapshot<S> {
    pub fn new(generation: u64, config: &NormalizerConfig, store: S) -> Self {
        Self { generation, normalizer: Normalizer::from_config(config), store }
    }

    pub fn generation(&self) -> u64 { self.generation }

    pub fn normalizer(&self) -> &Normalizer { &self.normalizer }

    pub fn config(&self) -> &NormalizerConfig { self.normalizer.config() }

    pub fn store(&self) -> &S { &self.store }

    pub fn evaluate(&self, text: &str) -> Result<QueryOutcome, StoreError> {
        QueryEvaluator::new(&self.normalizer, &self.store).evaluate(text)
    }
}

pub struct Engine<S> {
    current: RwLock<Option<Arc<IndexSnapshot<S>>>>,
    build_lock: Mutex<()>,
    batch_size: usize,
}

impl<S> Default for Engine<S> {
    fn default() -> Self {
        Self { current: RwLock::new(None), build_lock: Mutex::new(()), batch_size: DEFAULT_BATCH_SIZE }
    }
}

impl<S: PostingsStore> Engine<S> {
    pub fn new() -> Self { Self::default() }

    /// Start serving an already built generation.
    pub fn with_snapshot(snapshot: IndexSnapshot<S>) -> Self {
        let engine = Self::default();
        *engine.current.write() = Some(Arc::new(snapshot));
        engine
    }

    pub fn batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size;
        self
    }

    pub fn current(&self) -> Option<Arc<IndexSnapshot<S>>> { self.current.read().clone() }

    pub fn generation(&self) -> Option<u64> { self.current.read().as_ref().map(|s| s.generation) }

    fn next_generation(&self) -> u64 { self.generation().map_or(0, |g| g + 1) }

    /// Build and publish a new generation.
    ///
    /// `open_store` receives the new generation number and returns the empty store
    /// to build into. Fails with [`IndexError::BuildInProgress`] if another rebuild
    /// holds the builder.
    pub fn rebuild<I, F>(
        &self,
        config: &NormalizerConfig,
        documents: I,
        open_store: F,
    ) -> Result<(Arc<IndexSnapshot<S>>, IndexStats), IndexError>
    where
        I: IntoIterator<Item = Result<Document, IndexError>>,
        F: FnOnce(u64) -> Result<S, StoreError>,
    {
        let Some(_guard) = self.build_lock.try_lock() else {
            tracing::warn!("rejected rebuild, another build is in flight");
            return Err(IndexError::BuildInProgress);
        };

        let generation = self.next_generation();
        tracing::info!(generation, strategy = ?config.strategy, "building index generation");
        let snapshot = IndexSnapshot::new(generation, config, open_store(generation)?);
        let stats = IndexBuilder::new(&snapshot.normalizer)
            .batch_size(self.batch_size)
            .build(documents, &snapshot.store)?;

        let snapshot = Arc::new(snapshot);
        *self.current.write() = Some(Arc::clone(&snapshot));
        tracing::info!(generation, terms = stats.terms, "published index generation");
        Ok((snapshot, stats))
    }

    /// Evaluate against the current generation.
    pub fn evaluate(&self, text: &str) -> Result<QueryOutcome, IndexError> {
        let snapshot = self.current().ok_or(IndexError::NotPublished)?;
        Ok(snapshot.evaluate(text)?)
    }
}
