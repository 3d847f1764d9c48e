use crate::normalize::NormalizerConfig;
use crate::store::SledStore;
use crate::{DocId, DocMeta, IndexSnapshot};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs::{create_dir_all, File};
use std::io::{ErrorKind, Read, Write};
use std::path::{Path, PathBuf};

pub const MANIFEST_VERSION: u32 = 1;

/// `meta.json`: which generation is live and how its keys were normalized.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Manifest {
    pub version: u32,
    pub generation: u64,
    pub created_at: String,
    pub num_docs: u32,
    pub num_terms: usize,
    pub normalizer: NormalizerConfig,
}

pub struct IndexPaths {
    pub root: PathBuf,
}

impl IndexPaths {
    pub fn new<P: AsRef<Path>>(root: P) -> Self {
        Self { root: root.as_ref().to_path_buf() }
    }
    /// Document metadata is kept per generation so the live one is never overwritten.
    fn docs(&self, generation: u64) -> PathBuf { self.root.join(format!("docs.{generation:08}.bin")) }
    fn meta(&self) -> PathBuf { self.root.join("meta.json") }
    fn postings_db(&self) -> PathBuf { self.root.join("postings.sled") }
}

pub fn open_postings_db(paths: &IndexPaths) -> Result<sled::Db> {
    create_dir_all(&paths.root)?;
    let db = sled::open(paths.postings_db()).with_context(|| format!("opening {}", paths.postings_db().display()))?;
    Ok(db)
}

pub fn save_docs(paths: &IndexPaths, generation: u64, docs: &HashMap<DocId, DocMeta>) -> Result<()> {
    create_dir_all(&paths.root)?;
    let mut f = File::create(paths.docs(generation))?;
    let bytes = bincode::serialize(docs)?;
    f.write_all(&bytes)?;
    f.sync_all()?;
    Ok(())
}

pub fn load_docs(paths: &IndexPaths, generation: u64) -> Result<HashMap<DocId, DocMeta>> {
    let path = paths.docs(generation);
    let mut f = File::open(&path).with_context(|| format!("opening {}", path.display()))?;
    let mut buf = Vec::new();
    f.read_to_end(&mut buf)?;
    let docs = bincode::deserialize(&buf)?;
    Ok(docs)
}

pub fn save_manifest(paths: &IndexPaths, manifest: &Manifest) -> Result<()> {
    create_dir_all(&paths.root)?;
    // write-then-rename so readers never see a half-written manifest
    let tmp = paths.meta().with_extension("json.tmp");
    let mut f = File::create(&tmp)?;
    let json = serde_json::to_string_pretty(manifest)?;
    f.write_all(json.as_bytes())?;
    f.sync_all()?;
    std::fs::rename(&tmp, paths.meta())?;
    Ok(())
}

/// Delete a generation's document metadata; a missing file is not an error.
pub fn remove_docs(paths: &IndexPaths, generation: u64) -> Result<()> {
    match std::fs::remove_file(paths.docs(generation)) {
        Err(err) if err.kind() != ErrorKind::NotFound => Err(err.into()),
        _ => Ok(()),
    }
}

/// `Ok(None)` when the directory holds no index yet.
pub fn load_manifest(paths: &IndexPaths) -> Result<Option<Manifest>> {
    let path = paths.meta();
    if !path.exists() {
        return Ok(None);
    }
    let mut f = File::open(&path)?;
    let mut buf = String::new();
    f.read_to_string(&mut buf)?;
    let manifest: Manifest = serde_json::from_str(&buf).with_context(|| format!("parsing {}", path.display()))?;
    if manifest.version != MANIFEST_VERSION {
        anyhow::bail!("unsupported manifest version {} in {}", manifest.version, path.display());
    }
    Ok(Some(manifest))
}

/// Open the live generation for querying, with the normalizer it was built with.
pub fn load_snapshot(paths: &IndexPaths) -> Result<(Manifest, IndexSnapshot<SledStore>)> {
    let manifest = load_manifest(paths)?.with_context(|| format!("no index found in {}", paths.root.display()))?;
    let db = open_postings_db(paths)?;
    let store = SledStore::open(&db, manifest.generation)?;
    let snapshot = IndexSnapshot::new(manifest.generation, &manifest.normalizer, store);
    Ok((manifest, snapshot))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::PostingsStore;

    fn manifest(generation: u64) -> Manifest {
        Manifest {
            version: MANIFEST_VERSION,
            generation,
            created_at: "2024-01-01T00:00:00Z".into(),
            num_docs: 2,
            num_terms: 1,
            normalizer: NormalizerConfig::tagged(),
        }
    }

    #[test]
    fn missing_manifest_is_none() {
        let dir = tempfile::tempdir().unwrap();
        assert!(load_manifest(&IndexPaths::new(dir.path())).unwrap().is_none());
    }

    #[test]
    fn manifest_and_docs_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let paths = IndexPaths::new(dir.path());
        save_manifest(&paths, &manifest(3)).unwrap();
        assert_eq!(load_manifest(&paths).unwrap(), Some(manifest(3)));

        let mut docs = HashMap::new();
        docs.insert(0, DocMeta { title: Some("Doc 0".into()), author: None, published_date: None, preview: "Rust".into() });
        save_docs(&paths, 3, &docs).unwrap();
        assert_eq!(load_docs(&paths, 3).unwrap(), docs);
        assert!(load_docs(&paths, 2).is_err());
    }

    #[test]
    fn removing_docs_tolerates_missing_files() {
        let dir = tempfile::tempdir().unwrap();
        let paths = IndexPaths::new(dir.path());
        save_docs(&paths, 0, &HashMap::new()).unwrap();
        remove_docs(&paths, 0).unwrap();
        assert!(load_docs(&paths, 0).is_err());
        remove_docs(&paths, 0).unwrap();
    }

    #[test]
    fn snapshot_uses_recorded_generation_and_config() {
        let dir = tempfile::tempdir().unwrap();
        let paths = IndexPaths::new(dir.path());
        {
            let db = open_postings_db(&paths).unwrap();
            SledStore::open(&db, 3).unwrap().insert("seven_CD", &[0, 1]).unwrap();
            db.flush().unwrap();
        }
        save_manifest(&paths, &manifest(3)).unwrap();

        let (manifest, snapshot) = load_snapshot(&paths).unwrap();
        assert_eq!(manifest.generation, 3);
        assert_eq!(snapshot.config(), &NormalizerConfig::tagged());
        assert_eq!(snapshot.evaluate("7").unwrap().result.doc_ids(), &[0, 1]);
    }

    #[test]
    fn rejects_unknown_manifest_version() {
        let dir = tempfile::tempdir().unwrap();
        let paths = IndexPaths::new(dir.path());
        save_manifest(&paths, &Manifest { version: 99, ..manifest(0) }).unwrap();
        assert!(load_manifest(&paths).is_err());
    }
}
