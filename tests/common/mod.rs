//! Collection fixtures shared by the integration tests

#![allow(dead_code)]

use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::{Path, PathBuf};

use bsbi::index::IndexReader;
use tempfile::TempDir;

/// A temp dir holding `data/` (the collection) and `out/` (the index)
pub struct Fixture {
    pub temp_dir: TempDir,
    pub input: PathBuf,
    pub output: PathBuf,
}

impl Fixture {
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let input = temp_dir.path().join("data");
        let output = temp_dir.path().join("out");
        fs::create_dir_all(&input).expect("Failed to create input dir");
        Self {
            temp_dir,
            input,
            output,
        }
    }

    /// Write `<input>/<block>/<name>`
    pub fn doc(&self, block: &str, name: &str, content: &str) -> &Self {
        let dir = self.input.join(block);
        fs::create_dir_all(&dir).expect("Failed to create block dir");
        fs::write(dir.join(name), content).expect("Failed to write doc");
        self
    }

    pub fn out(&self, name: &str) -> PathBuf {
        self.temp_dir.path().join(name)
    }
}

/// The two-block collection: x -> {0}, y -> {0, 1}, z -> {1}
pub fn two_block_fixture() -> Fixture {
    let fixture = Fixture::new();
    fixture.doc("b0", "d0", "x y").doc("b1", "d1", "y z");
    fixture
}

/// Decode the whole index into term -> document file names.
///
/// File names rather than ids or paths so collections grouped into different
/// blocks can be compared.
pub fn term_documents(index_dir: &Path) -> BTreeMap<String, BTreeSet<String>> {
    let reader = IndexReader::open(index_dir).expect("Failed to open index");
    let mut out = BTreeMap::new();
    for (term, id) in reader.terms() {
        let posting = reader
            .postings_for_id(id)
            .expect("Failed to decode posting")
            .expect("Term missing from the directory");
        let names = posting
            .doc_ids
            .iter()
            .map(|&d| {
                let path = reader.doc_path(d).expect("Unknown doc id");
                path.rsplit('/').next().unwrap_or(path).to_string()
            })
            .collect();
        out.insert(term.to_string(), names);
    }
    out
}
