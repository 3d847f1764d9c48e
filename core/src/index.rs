use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

use crate::error::{Corruption, IndexError, StoreError};
use crate::normalize::Normalize;
use crate::store::PostingsStore;
use crate::{DocId, Document};

pub const DEFAULT_BATCH_SIZE: usize = 512;

/// One token and the ascending, duplicate-free ids of documents containing it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostingsEntry {
    pub token: String,
    pub doc_ids: Vec<DocId>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexStats {
    pub documents: u32,
    pub terms: usize,
    /// Sum of all postings list lengths.
    pub postings: usize,
}

/// Token -> doc ids gathered during a build.
///
/// Merging two accumulators is a per-token union, so partial results from
/// different workers can be combined in any order.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct PostingsAccumulator {
    lists: HashMap<String, Vec<DocId>>,
}

impl PostingsAccumulator {
    pub fn new() -> Self { Self::default() }

    pub fn add_document(&mut self, doc_id: DocId, tokens: HashSet<String>) {
        for token in tokens {
            self.lists.entry(token).or_default().push(doc_id);
        }
    }

    pub fn merge(mut self, mut other: Self) -> Self {
        if self.lists.len() < other.lists.len() {
            std::mem::swap(&mut self, &mut other);
        }
        for (token, ids) in other.lists {
            self.lists.entry(token).or_default().extend(ids);
        }
        self
    }

    pub fn len(&self) -> usize { self.lists.len() }

    pub fn is_empty(&self) -> bool { self.lists.is_empty() }

    /// Sorted, deduplicated entries, shortest postings list first (ties by token).
    pub fn into_entries(self) -> Vec<PostingsEntry> {
        let mut entries: Vec<PostingsEntry> = self
            .lists
            .into_iter()
            .map(|(token, mut doc_ids)| {
                doc_ids.sort_unstable();
                doc_ids.dedup();
                PostingsEntry { token, doc_ids }
            })
            .collect();
        entries.sort_by(|a, b| a.doc_ids.len().cmp(&b.doc_ids.len()).then_with(|| a.token.cmp(&b.token)));
        entries
    }
}

/// Batch index build over a single-pass document stream.
pub struct IndexBuilder<'a, N: ?Sized> {
    normalizer: &'a N,
    batch_size: usize,
}

impl<'a, N: Normalize + ?Sized> IndexBuilder<'a, N> {
    pub fn new(normalizer: &'a N) -> Self {
        Self { normalizer, batch_size: DEFAULT_BATCH_SIZE }
    }

    pub fn batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size.max(1);
        self
    }

    /// Normalize every document once and gather postings.
    ///
    /// Documents are pulled in batches; each batch is normalized in parallel and
    /// folded into the running accumulator. Ids must strictly increase.
    pub fn accumulate<I>(&self, documents: I) -> Result<(PostingsAccumulator, u32), IndexError>
    where
        I: IntoIterator<Item = Result<Document, IndexError>>,
    {
        let mut documents = documents.into_iter();
        let mut acc = PostingsAccumulator::new();
        let mut last_id: Option<DocId> = None;
        let mut seen: u32 = 0;
        let mut batch: Vec<Document> = Vec::with_capacity(self.batch_size);

        loop {
            batch.clear();
            for item in documents.by_ref().take(self.batch_size) {
                let doc = item?;
                if let Some(prev) = last_id {
                    if doc.id <= prev {
                        return Err(IndexError::malformed(
                            format!("id {}", doc.id),
                            format!("ids must increase in ingestion order, previous was {prev}"),
                        ));
                    }
                }
                last_id = Some(doc.id);
                batch.push(doc);
            }
            if batch.is_empty() {
                break;
            }

            let partial = batch
                .par_iter()
                .fold(PostingsAccumulator::new, |mut acc, doc| {
                    let tokens = self.normalizer.get_normalized_tokens(doc.title.as_deref(), Some(&doc.content));
                    acc.add_document(doc.id, tokens);
                    acc
                })
                .reduce(PostingsAccumulator::new, PostingsAccumulator::merge);
            acc = acc.merge(partial);
            seen += batch.len() as u32;
            tracing::debug!(documents = seen, terms = acc.len(), "indexed batch");
        }
        Ok((acc, seen))
    }

    /// Build the postings for `documents` and write them to `store`.
    ///
    /// A token that already exists in the store aborts the build with
    /// [`Corruption::DuplicateToken`].
    pub fn build<I, S>(&self, documents: I, store: &S) -> Result<IndexStats, IndexError>
    where
        I: IntoIterator<Item = Result<Document, IndexError>>,
        S: PostingsStore + ?Sized,
    {
        let (acc, documents) = self.accumulate(documents)?;
        let entries = acc.into_entries();
        let stats = IndexStats {
            documents,
            terms: entries.len(),
            postings: entries.iter().map(|e| e.doc_ids.len()).sum(),
        };

        store.upsert(&entries).map_err(|err| match err {
            StoreError::DuplicateKey(token) => {
                tracing::warn!(%token, "duplicate token in postings store, aborting build");
                IndexError::from(Corruption::DuplicateToken { token })
            }
            other => IndexError::from(other),
        })?;

        tracing::info!(documents = stats.documents, terms = stats.terms, postings = stats.postings, "index built");
        Ok(stats)
    }
}
