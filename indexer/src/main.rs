use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use searchcore::ingest::{Documents, DocumentRecord, JsonLines};
use searchcore::persist::{
    load_docs, load_manifest, load_snapshot, open_postings_db, remove_docs, save_docs, save_manifest, IndexPaths,
    Manifest, MANIFEST_VERSION,
};
use searchcore::{DocId, DocMeta, Engine, IndexError, IndexSnapshot, NormalizerConfig, QueryResult, SledStore, Strategy};
use serde::Serialize;
use tracing_subscriber::{fmt, EnvFilter};
use walkdir::WalkDir;

use std::collections::HashMap;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "indexer")]
#[command(about = "Build and query a conjunctive keyword index", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
enum StrategyArg {
    Stem,
    Tagged,
}

impl From<StrategyArg> for Strategy {
    fn from(arg: StrategyArg) -> Self {
        match arg {
            StrategyArg::Stem => Strategy::Stem,
            StrategyArg::Tagged => Strategy::Tagged,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Build a new index generation from JSON-lines files or a directory of them
    Build {
        /// Input path (file or directory)
        #[arg(long)]
        input: String,
        /// Output index directory
        #[arg(long)]
        output: String,
        /// Normalization strategy, ignored when --config is given
        #[arg(long, value_enum, default_value_t = StrategyArg::Stem)]
        strategy: StrategyArg,
        /// JSON normalizer config (stopwords, ignore list, numerals, tag exclusion)
        #[arg(long)]
        config: Option<PathBuf>,
        /// Documents normalized per parallel batch
        #[arg(long, default_value_t = 512)]
        batch_size: usize,
    },
    /// Run a conjunctive query against a built index
    Query {
        /// Index directory
        #[arg(long, default_value = "./index")]
        index: String,
        /// Print the outcome as JSON
        #[arg(long, default_value_t = false)]
        json: bool,
        /// Query text
        #[arg(required = true)]
        text: Vec<String>,
    },
    /// Show stored metadata for one document
    Doc {
        #[arg(long, default_value = "./index")]
        index: String,
        doc_id: DocId,
    },
}

fn main() -> Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Build { input, output, strategy, config, batch_size } => {
            let config = match config {
                Some(path) => NormalizerConfig::load(path)?,
                None => NormalizerConfig::for_strategy(strategy.into()),
            };
            build_index(&input, &output, &config, batch_size)
        }
        Commands::Query { index, json, text } => query_index(&index, &text.join(" "), json),
        Commands::Doc { index, doc_id } => show_doc(&index, doc_id),
    }
}

fn collect_inputs(input_path: &Path) -> Vec<PathBuf> {
    let mut files: Vec<PathBuf> = Vec::new();
    if input_path.is_dir() {
        for entry in WalkDir::new(input_path).sort_by_file_name().into_iter().filter_map(|e| e.ok()) {
            let p = entry.path();
            if p.is_file() {
                if let Some(ext) = p.extension().and_then(|s| s.to_str()) {
                    if matches!(ext, "jl" | "jsonl") {
                        files.push(p.to_path_buf());
                    }
                }
            }
        }
    } else if input_path.is_file() {
        files.push(input_path.to_path_buf());
    }
    files
}

type Located = Result<(String, DocumentRecord), IndexError>;

/// Records from every input file in order, opened lazily.
fn read_records(files: Vec<PathBuf>) -> impl Iterator<Item = Located> {
    files.into_iter().flat_map(|path| -> Box<dyn Iterator<Item = Located>> {
        match File::open(&path) {
            Ok(f) => Box::new(JsonLines::with_source(BufReader::new(f), path.display().to_string())),
            Err(err) => Box::new(std::iter::once(Err(IndexError::from(err)))),
        }
    })
}

fn build_index(input: &str, output: &str, config: &NormalizerConfig, batch_size: usize) -> Result<()> {
    let files = collect_inputs(Path::new(input));
    if files.is_empty() {
        anyhow::bail!("no .jl/.jsonl input found at {input}");
    }
    let out_paths = IndexPaths::new(output);
    let previous = load_manifest(&out_paths)?;
    let db = open_postings_db(&out_paths)?;

    // Resume from the live generation so the new one gets the next number.
    let engine = match &previous {
        Some(manifest) => Engine::with_snapshot(IndexSnapshot::new(
            manifest.generation,
            &manifest.normalizer,
            SledStore::open(&db, manifest.generation)?,
        )),
        None => Engine::new(),
    }
    .batch_size(batch_size);

    let mut docs: HashMap<DocId, DocMeta> = HashMap::new();
    let documents = Documents::new(read_records(files)).inspect(|item| {
        if let Ok(doc) = item {
            docs.insert(doc.id, DocMeta::from(doc));
        }
    });

    let mut attempted = None;
    let built = engine.rebuild(config, documents, |generation| {
        attempted = Some(generation);
        SledStore::create(&db, generation)
    });
    let (snapshot, stats) = match built {
        Ok(built) => built,
        Err(err) => {
            // Discard the partial generation; the previous one keeps serving.
            if let Some(generation) = attempted {
                discard_generation(&db, &out_paths, generation);
            }
            return Err(err).context("index build failed");
        }
    };

    let manifest = Manifest {
        version: MANIFEST_VERSION,
        generation: snapshot.generation(),
        created_at: time::OffsetDateTime::now_utc()
            .format(&time::format_description::well_known::Rfc3339)
            .unwrap_or_default(),
        num_docs: stats.documents,
        num_terms: stats.terms,
        normalizer: config.clone(),
    };
    // Nothing is live until the manifest names the new generation.
    let published = snapshot
        .store()
        .flush()
        .map_err(anyhow::Error::from)
        .and_then(|()| save_docs(&out_paths, manifest.generation, &docs))
        .and_then(|()| save_manifest(&out_paths, &manifest));
    if let Err(err) = published {
        discard_generation(&db, &out_paths, manifest.generation);
        return Err(err).context("publishing index generation failed");
    }

    if let Some(old) = previous {
        discard_generation(&db, &out_paths, old.generation);
    }
    tracing::info!(output, generation = manifest.generation, "index build complete");
    Ok(())
}

/// Best-effort removal of a generation that is not (or no longer) live.
fn discard_generation(db: &sled::Db, paths: &IndexPaths, generation: u64) {
    let removed = SledStore::drop_generation(db, generation)
        .map_err(anyhow::Error::from)
        .and_then(|_| remove_docs(paths, generation));
    if let Err(err) = removed {
        tracing::warn!(generation, error = %err, "could not discard index generation");
    }
}

#[derive(Serialize)]
struct QueryReport<'a> {
    query: &'a str,
    total_hits: usize,
    #[serde(flatten)]
    outcome: &'a searchcore::QueryOutcome,
    titles: Vec<Option<&'a str>>,
}

fn query_index(index: &str, text: &str, json: bool) -> Result<()> {
    let paths = IndexPaths::new(index);
    let (manifest, snapshot) = load_snapshot(&paths)?;
    let docs = load_docs(&paths, manifest.generation)?;
    let outcome = snapshot.evaluate(text)?;

    let ids = outcome.result.doc_ids();
    let titles: Vec<Option<&str>> =
        ids.iter().map(|id| docs.get(id).and_then(|meta| meta.title.as_deref())).collect();

    if json {
        let report = QueryReport { query: text, total_hits: ids.len(), outcome: &outcome, titles };
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    match &outcome.result {
        QueryResult::Matched(ids) => {
            println!("{} matching documents", ids.len());
            for (id, title) in ids.iter().zip(&titles) {
                println!("  [{id}] {}", title.unwrap_or("(untitled)"));
            }
        }
        QueryResult::NoMatch(reason) => println!("nothing found ({reason:?}): make your query more informative"),
    }
    if !outcome.stopwords.is_empty() {
        println!("stopwords: {}", outcome.stopwords.join(", "));
    }
    if !outcome.unknown.is_empty() {
        println!("unknown: {}", outcome.unknown.join(", "));
    }
    Ok(())
}

fn show_doc(index: &str, doc_id: DocId) -> Result<()> {
    let paths = IndexPaths::new(index);
    let manifest = load_manifest(&paths)?.with_context(|| format!("no index found in {index}"))?;
    let docs = load_docs(&paths, manifest.generation)?;
    let meta = docs.get(&doc_id).with_context(|| format!("document {doc_id} not found"))?;
    println!("{}", serde_json::to_string_pretty(meta)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use searchcore::PostingsStore;

    #[test]
    fn build_then_query_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("wapo.jl");
        fs::write(
            &input,
            "{\"title\":\"Election results\",\"content\":\"The election results are in.\"}\n\
             {\"title\":\"Turnout\",\"content\":\"An election was held.\"}\n",
        )
        .unwrap();
        let out = dir.path().join("index");
        let out_str = out.to_str().unwrap();

        build_index(input.to_str().unwrap(), out_str, &NormalizerConfig::stem(), 16).unwrap();
        build_index(input.to_str().unwrap(), out_str, &NormalizerConfig::tagged(), 16).unwrap();

        let paths = IndexPaths::new(&out);
        let manifest = load_manifest(&paths).unwrap().unwrap();
        assert_eq!(manifest.generation, 1);
        assert_eq!(manifest.normalizer, NormalizerConfig::tagged());
        assert_eq!(load_docs(&paths, 1).unwrap()[&1].title.as_deref(), Some("Turnout"));
        assert!(load_docs(&paths, 0).is_err());

        let (_, snapshot) = load_snapshot(&paths).unwrap();
        assert_eq!(snapshot.evaluate("election").unwrap().result, QueryResult::Matched(vec![0, 1]));
    }

    fn write_input(dir: &Path, name: &str, titles: &[&str]) -> String {
        let lines: Vec<String> = titles
            .iter()
            .map(|t| serde_json::json!({ "title": t, "content": format!("{t} election coverage") }).to_string())
            .collect();
        let path = dir.join(name);
        fs::write(&path, lines.join("\n")).unwrap();
        path.to_str().unwrap().to_string()
    }

    fn has_tree(out: &Path, generation: u64) -> bool {
        let db = open_postings_db(&IndexPaths::new(out)).unwrap();
        let name = format!("postings.{generation:08}");
        db.tree_names().iter().any(|n| n.as_ref() == name.as_bytes())
    }

    #[test]
    fn rebuild_ignores_postings_left_by_an_interrupted_build() {
        let dir = tempfile::tempdir().unwrap();
        let input = write_input(dir.path(), "wapo.jl", &["Turnout"]);
        let out = dir.path().join("index");
        let out_str = out.to_str().unwrap();
        build_index(&input, out_str, &NormalizerConfig::stem(), 16).unwrap();
        {
            // a build of generation 1 that died before cleaning up
            let db = open_postings_db(&IndexPaths::new(&out)).unwrap();
            SledStore::open(&db, 1).unwrap().insert("elect", &[7]).unwrap();
            db.flush().unwrap();
        }

        build_index(&input, out_str, &NormalizerConfig::stem(), 16).unwrap();
        let (manifest, snapshot) = load_snapshot(&IndexPaths::new(&out)).unwrap();
        assert_eq!(manifest.generation, 1);
        assert_eq!(snapshot.evaluate("election").unwrap().result, QueryResult::Matched(vec![0]));
    }

    #[test]
    fn failed_publish_keeps_the_live_generation_consistent() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("index");
        let out_str = out.to_str().unwrap();
        let old = write_input(dir.path(), "old.jl", &["Turnout"]);
        build_index(&old, out_str, &NormalizerConfig::stem(), 16).unwrap();

        // the manifest cannot be replaced while its temp path is a directory
        fs::create_dir(out.join("meta.json.tmp")).unwrap();
        let new = write_input(dir.path(), "new.jl", &["Recount", "Runoff"]);
        assert!(build_index(&new, out_str, &NormalizerConfig::stem(), 16).is_err());

        let paths = IndexPaths::new(&out);
        assert_eq!(load_manifest(&paths).unwrap().unwrap().generation, 0);
        let docs = load_docs(&paths, 0).unwrap();
        assert_eq!(docs.len(), 1);
        assert_eq!(docs[&0].title.as_deref(), Some("Turnout"));
        assert!(load_docs(&paths, 1).is_err());
        assert!(!has_tree(&out, 1));

        fs::remove_dir(out.join("meta.json.tmp")).unwrap();
        build_index(&new, out_str, &NormalizerConfig::stem(), 16).unwrap();
        assert_eq!(load_docs(&paths, 1).unwrap()[&1].title.as_deref(), Some("Runoff"));
        assert!(!has_tree(&out, 0));
    }

    #[test]
    fn collects_only_json_lines_files() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("b.jsonl"), "").unwrap();
        fs::write(dir.path().join("a.jl"), "").unwrap();
        fs::write(dir.path().join("notes.txt"), "").unwrap();
        let files = collect_inputs(dir.path());
        let names: Vec<_> = files.iter().map(|p| p.file_name().unwrap().to_str().unwrap()).collect();
        assert_eq!(names, vec!["a.jl", "b.jsonl"]);
    }
}
