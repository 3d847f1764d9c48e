//! Postings stores: where token -> doc id lists live once an index is built.
//!
//! Every store enforces a uniqueness constraint on the token key. Inserting a token
//! twice is reported as [`StoreError::DuplicateKey`] and never overwrites.

use parking_lot::RwLock;
use std::collections::HashMap;

use crate::error::StoreError;
use crate::index::PostingsEntry;
use crate::DocId;

pub trait PostingsStore: Send + Sync {
    /// Insert one postings list. Fails if `token` is already present.
    fn insert(&self, token: &str, doc_ids: &[DocId]) -> Result<(), StoreError>;

    /// Insert a whole mapping in order, stopping at the first failure.
    fn upsert(&self, entries: &[PostingsEntry]) -> Result<(), StoreError> {
        for entry in entries {
            self.insert(&entry.token, &entry.doc_ids)?;
        }
        Ok(())
    }

    fn lookup(&self, token: &str) -> Result<Option<Vec<DocId>>, StoreError>;

    /// Number of tokens stored.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool { self.len() == 0 }
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    postings: RwLock<HashMap<String, Vec<DocId>>>,
}

impl MemoryStore {
    pub fn new() -> Self { Self::default() }
}

impl PostingsStore for MemoryStore {
    fn insert(&self, token: &str, doc_ids: &[DocId]) -> Result<(), StoreError> {
        let mut postings = self.postings.write();
        if postings.contains_key(token) {
            return Err(StoreError::DuplicateKey(token.to_string()));
        }
        postings.insert(token.to_string(), doc_ids.to_vec());
        Ok(())
    }

    fn lookup(&self, token: &str) -> Result<Option<Vec<DocId>>, StoreError> {
        Ok(self.postings.read().get(token).cloned())
    }

    fn len(&self) -> usize { self.postings.read().len() }
}

/// Postings kept in a sled tree, one tree per index generation.
///
/// Values are bincode-encoded `Vec<DocId>`.
#[derive(Debug, Clone)]
pub struct SledStore {
    db: sled::Db,
    tree: sled::Tree,
    generation: u64,
}

fn tree_name(generation: u64) -> String { format!("postings.{generation:08}") }

impl SledStore {
    pub fn open(db: &sled::Db, generation: u64) -> Result<Self, StoreError> {
        let tree = db.open_tree(tree_name(generation))?;
        Ok(Self { db: db.clone(), tree, generation })
    }

    /// Open `generation` empty, discarding whatever an interrupted build left in its tree.
    pub fn create(db: &sled::Db, generation: u64) -> Result<Self, StoreError> {
        if Self::drop_generation(db, generation)? {
            tracing::warn!(generation, "discarded leftover postings from an interrupted build");
        }
        Self::open(db, generation)
    }

    pub fn generation(&self) -> u64 { self.generation }

    /// Remove a generation's tree. Returns false if it did not exist.
    pub fn drop_generation(db: &sled::Db, generation: u64) -> Result<bool, StoreError> {
        Ok(db.drop_tree(tree_name(generation))?)
    }

    pub fn flush(&self) -> Result<(), StoreError> {
        self.db.flush()?;
        Ok(())
    }
}

impl PostingsStore for SledStore {
    fn insert(&self, token: &str, doc_ids: &[DocId]) -> Result<(), StoreError> {
        let bytes = bincode::serialize(doc_ids)?;
        match self.tree.compare_and_swap(token.as_bytes(), None::<&[u8]>, Some(bytes))? {
            Ok(()) => Ok(()),
            Err(_) => Err(StoreError::DuplicateKey(token.to_string())),
        }
    }

    fn lookup(&self, token: &str) -> Result<Option<Vec<DocId>>, StoreError> {
        match self.tree.get(token.as_bytes())? {
            Some(bytes) => Ok(Some(bincode::deserialize(&bytes)?)),
            None => Ok(None),
        }
    }

    fn len(&self) -> usize { self.tree.len() }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn exercise(store: &dyn PostingsStore) {
        store.insert("elect", &[0, 1]).unwrap();
        assert_eq!(store.lookup("elect").unwrap(), Some(vec![0, 1]));
        assert_eq!(store.lookup("missing").unwrap(), None);

        let err = store.insert("elect", &[2]).unwrap_err();
        assert!(matches!(err, StoreError::DuplicateKey(ref t) if t == "elect"));
        // the original list survives
        assert_eq!(store.lookup("elect").unwrap(), Some(vec![0, 1]));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn memory_store_enforces_unique_tokens() {
        exercise(&MemoryStore::new());
    }

    #[test]
    fn sled_store_enforces_unique_tokens() {
        let dir = tempfile::tempdir().unwrap();
        let db = sled::open(dir.path()).unwrap();
        exercise(&SledStore::open(&db, 0).unwrap());
    }

    #[test]
    fn sled_generations_are_isolated() {
        let dir = tempfile::tempdir().unwrap();
        let db = sled::open(dir.path()).unwrap();
        let first = SledStore::open(&db, 1).unwrap();
        let second = SledStore::open(&db, 2).unwrap();
        first.insert("result", &[3]).unwrap();
        assert!(second.is_empty());
        second.insert("result", &[4]).unwrap();
        assert!(SledStore::drop_generation(&db, 1).unwrap());
        assert_eq!(second.lookup("result").unwrap(), Some(vec![4]));
        assert!(SledStore::open(&db, 1).unwrap().is_empty());
    }

    #[test]
    fn create_starts_from_an_empty_tree() {
        let dir = tempfile::tempdir().unwrap();
        let db = sled::open(dir.path()).unwrap();
        SledStore::open(&db, 1).unwrap().insert("elect", &[0]).unwrap();

        let store = SledStore::create(&db, 1).unwrap();
        assert!(store.is_empty());
        store.insert("elect", &[0, 1]).unwrap();
        assert_eq!(store.lookup("elect").unwrap(), Some(vec![0, 1]));
    }

    #[test]
    fn upsert_stops_at_first_duplicate() {
        let store = MemoryStore::new();
        let entries = vec![
            PostingsEntry { token: "a1".into(), doc_ids: vec![0] },
            PostingsEntry { token: "a1".into(), doc_ids: vec![1] },
            PostingsEntry { token: "b2".into(), doc_ids: vec![2] },
        ];
        assert!(store.upsert(&entries).is_err());
        assert_eq!(store.lookup("b2").unwrap(), None);
    }
}
