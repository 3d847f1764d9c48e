//! Conjunctive query evaluation.
//!
//! A query is tokenized like a document, its raw tokens are classified for
//! diagnostics, then each normalized term is looked up and the postings of all
//! resolved terms are intersected. Everything a query accumulates lives in its
//! own [`QueryContext`]; evaluators hold only shared, read-only references.

use serde::Serialize;

use crate::error::StoreError;
use crate::normalize::Normalize;
use crate::store::PostingsStore;
use crate::tokenizer::tokenize;
use crate::DocId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NoMatchReason {
    /// None of the query terms has postings.
    NoTermsResolved,
    /// Terms resolved, but no document contains all of them.
    EmptyIntersection,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum QueryResult {
    Matched(Vec<DocId>),
    NoMatch(NoMatchReason),
}

impl QueryResult {
    /// Matched ids, empty for `NoMatch`.
    pub fn doc_ids(&self) -> &[DocId] {
        match self {
            QueryResult::Matched(ids) => ids,
            QueryResult::NoMatch(_) => &[],
        }
    }

    pub fn is_match(&self) -> bool { matches!(self, QueryResult::Matched(_)) }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QueryOutcome {
    pub result: QueryResult,
    /// Raw query tokens that are stopwords, as typed.
    pub stopwords: Vec<String>,
    /// Normalized terms with no postings.
    pub unknown: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryPhase {
    Received,
    Tokenized,
    Classified,
    Normalized,
    LookedUp,
    Intersected,
    Resolved,
}

/// Per-request evaluation state.
#[derive(Debug)]
pub struct QueryContext<'q> {
    text: &'q str,
    phase: QueryPhase,
    raw_tokens: Vec<String>,
    stopwords: Vec<String>,
    terms: Vec<String>,
    unknown: Vec<String>,
    candidates: Vec<Vec<DocId>>,
    /// `None` until there is something to intersect.
    matched: Option<Vec<DocId>>,
}

impl<'q> QueryContext<'q> {
    pub fn new(text: &'q str) -> Self {
        Self {
            text,
            phase: QueryPhase::Received,
            raw_tokens: Vec::new(),
            stopwords: Vec::new(),
            terms: Vec::new(),
            unknown: Vec::new(),
            candidates: Vec::new(),
            matched: None,
        }
    }

    pub fn phase(&self) -> QueryPhase { self.phase }

    fn advance(&mut self, phase: QueryPhase) {
        tracing::trace!(query = self.text, from = ?self.phase, to = ?phase, "query phase");
        self.phase = phase;
    }

    fn resolve(mut self) -> QueryOutcome {
        let result = match self.matched.take() {
            None => QueryResult::NoMatch(NoMatchReason::NoTermsResolved),
            Some(ids) if ids.is_empty() => QueryResult::NoMatch(NoMatchReason::EmptyIntersection),
            Some(ids) => QueryResult::Matched(ids),
        };
        self.advance(QueryPhase::Resolved);
        tracing::debug!(query = self.text, ?result, unknown = self.unknown.len(), "query resolved");
        QueryOutcome { result, stopwords: self.stopwords, unknown: self.unknown }
    }
}

pub struct QueryEvaluator<'a, N: ?Sized, S: ?Sized> {
    normalizer: &'a N,
    store: &'a S,
}

impl<'a, N, S> QueryEvaluator<'a, N, S>
where
    N: Normalize + ?Sized,
    S: PostingsStore + ?Sized,
{
    pub fn new(normalizer: &'a N, store: &'a S) -> Self { Self { normalizer, store } }

    /// Evaluate `text` as a conjunction of its terms.
    ///
    /// Empty results are reported as [`QueryResult::NoMatch`]; only store
    /// failures are errors.
    pub fn evaluate(&self, text: &str) -> Result<QueryOutcome, StoreError> {
        let mut ctx = QueryContext::new(text);

        ctx.raw_tokens = tokenize(text);
        ctx.advance(QueryPhase::Tokenized);

        self.classify(&mut ctx);
        ctx.advance(QueryPhase::Classified);

        self.normalize(&mut ctx);
        ctx.advance(QueryPhase::Normalized);

        self.look_up(&mut ctx)?;
        ctx.advance(QueryPhase::LookedUp);

        if !ctx.candidates.is_empty() {
            ctx.matched = Some(intersect_postings(std::mem::take(&mut ctx.candidates)));
        }
        ctx.advance(QueryPhase::Intersected);

        Ok(ctx.resolve())
    }

    fn classify(&self, ctx: &mut QueryContext<'_>) {
        for raw in &ctx.raw_tokens {
            if self.normalizer.is_stopword(&raw.to_lowercase()) && !ctx.stopwords.contains(raw) {
                ctx.stopwords.push(raw.clone());
            }
        }
    }

    fn normalize(&self, ctx: &mut QueryContext<'_>) {
        for raw in &ctx.raw_tokens {
            if let Some(term) = self.normalizer.normalize(raw) {
                if !ctx.terms.contains(&term) {
                    ctx.terms.push(term);
                }
            }
        }
    }

    fn look_up(&self, ctx: &mut QueryContext<'_>) -> Result<(), StoreError> {
        for term in &ctx.terms {
            match self.store.lookup(term)? {
                Some(doc_ids) => ctx.candidates.push(doc_ids),
                None => ctx.unknown.push(term.clone()),
            }
        }
        Ok(())
    }
}

/// Intersect two ascending id lists. The result is ascending and duplicate-free.
pub fn intersect_sorted(a: &[DocId], b: &[DocId]) -> Vec<DocId> {
    let mut out = Vec::with_capacity(a.len().min(b.len()));
    let (mut i, mut j) = (0, 0);
    while i < a.len() && j < b.len() {
        match a[i].cmp(&b[j]) {
            std::cmp::Ordering::Less => i += 1,
            std::cmp::Ordering::Greater => j += 1,
            std::cmp::Ordering::Equal => {
                if out.last() != Some(&a[i]) {
                    out.push(a[i]);
                }
                i += 1;
                j += 1;
            }
        }
    }
    out
}

/// Intersect postings lists, shortest first, stopping as soon as the running
/// result is empty. An empty input yields an empty result.
pub fn intersect_postings(mut lists: Vec<Vec<DocId>>) -> Vec<DocId> {
    lists.sort_by_key(Vec::len);
    let mut lists = lists.into_iter();
    let Some(mut acc) = lists.next() else {
        return Vec::new();
    };
    acc.dedup();
    for list in lists {
        if acc.is_empty() {
            break;
        }
        acc = intersect_sorted(&acc, &list);
    }
    acc
}
