//! Block construction: the in-memory half of BSBI.
//!
//! Each document of a block receives the next doc id, its distinct terms are
//! looked up (or assigned) in the global term dictionary, and the block is
//! collected as term id -> sorted doc id set. The block is then flushed as one
//! run in ascending term id order.

use crate::error::{IndexError, PathContext, Result};
use crate::index::codec::PostingCodec;
use crate::index::run::RunWriter;
use crate::index::types::{DocId, PostingList, TermId};
use crate::utils::extract_terms;
use log::debug;
use rayon::prelude::*;
use rustc_hash::FxHashMap;
use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::{Path, PathBuf};

/// Hands out consecutive ids starting at 0. Ids are never reused.
#[derive(Debug, Default)]
pub struct IdAllocator {
    next: u32,
}

impl IdAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn allocate(&mut self, what: &str) -> Result<u32> {
        let id = self.next;
        self.next = self
            .next
            .checked_add(1)
            .ok_or_else(|| IndexError::config(format!("{} id space exhausted", what)))?;
        Ok(id)
    }

    /// Number of ids handed out so far
    pub fn allocated(&self) -> u32 {
        self.next
    }
}

/// Term -> term id, ids in order of first sighting across all blocks
#[derive(Debug, Default)]
pub struct TermDictionary {
    ids: FxHashMap<String, TermId>,
    allocator: IdAllocator,
}

impl TermDictionary {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get_or_assign(&mut self, term: &str) -> Result<TermId> {
        if let Some(&id) = self.ids.get(term) {
            return Ok(id);
        }
        let id = self.allocator.allocate("term")?;
        self.ids.insert(term.to_string(), id);
        Ok(id)
    }

    pub fn get(&self, term: &str) -> Option<TermId> {
        self.ids.get(term).copied()
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Entries ordered by term
    pub fn sorted(&self) -> Vec<(&str, TermId)> {
        let mut entries: Vec<_> = self.ids.iter().map(|(t, &id)| (t.as_str(), id)).collect();
        entries.sort_unstable_by(|a, b| a.0.cmp(b.0));
        entries
    }
}

/// Relative document path -> doc id, ids in encounter order
#[derive(Debug, Default)]
pub struct DocDictionary {
    ids: BTreeMap<String, DocId>,
    allocator: IdAllocator,
}

impl DocDictionary {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn assign(&mut self, rel_path: &str) -> Result<DocId> {
        if self.ids.contains_key(rel_path) {
            return Err(IndexError::config(format!("document {} listed twice", rel_path)));
        }
        let id = self.allocator.allocate("document")?;
        self.ids.insert(rel_path.to_string(), id);
        Ok(id)
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Entries ordered by path
    pub fn iter(&self) -> impl Iterator<Item = (&str, DocId)> {
        self.ids.iter().map(|(p, &id)| (p.as_str(), id))
    }
}

/// Postings of one block: term id -> doc id set
#[derive(Debug, Default)]
pub struct BlockPostings {
    pub postings: BTreeMap<TermId, BTreeSet<DocId>>,
    pub doc_count: usize,
}

impl BlockPostings {
    /// Posting lists in ascending term id order
    pub fn posting_lists(&self) -> impl Iterator<Item = PostingList> + '_ {
        self.postings
            .iter()
            .map(|(&term_id, docs)| PostingList::new(term_id, docs.iter().copied().collect()))
    }

    /// Flush the block as a run; returns the number of postings written
    pub fn write_run(&self, path: &Path, codec: &'static dyn PostingCodec) -> Result<usize> {
        let mut writer = RunWriter::create(path, codec)?;
        for posting in self.posting_lists() {
            writer.write(&posting)?;
        }
        writer.finish()
    }
}

/// A document read from disk and split into its distinct terms
struct TokenizedDoc {
    rel_path: String,
    terms: Vec<String>,
}

/// Reads the documents of one block and builds its postings
pub struct BlockBuilder<'a> {
    parallel: bool,
    pool: Option<&'a rayon::ThreadPool>,
}

impl<'a> BlockBuilder<'a> {
    pub fn new(parallel: bool, pool: Option<&'a rayon::ThreadPool>) -> Self {
        Self { parallel, pool }
    }

    /// Build the postings for `files`, taken in the given order.
    ///
    /// `block_name` prefixes each document path in the doc dictionary.
    pub fn build(
        &self,
        block_name: &str,
        files: &[PathBuf],
        terms: &mut TermDictionary,
        docs: &mut DocDictionary,
    ) -> Result<BlockPostings> {
        let tokenized = self.tokenize_all(block_name, files)?;

        // Ids are assigned here, in listing order, never from worker threads
        let mut block = BlockPostings::default();
        for doc in tokenized {
            let doc_id = docs.assign(&doc.rel_path)?;
            for term in &doc.terms {
                let term_id = terms.get_or_assign(term)?;
                block.postings.entry(term_id).or_default().insert(doc_id);
            }
            block.doc_count += 1;
        }

        debug!(
            "block {}: {} documents, {} distinct terms",
            block_name,
            block.doc_count,
            block.postings.len()
        );
        Ok(block)
    }

    fn tokenize_all(&self, block_name: &str, files: &[PathBuf]) -> Result<Vec<TokenizedDoc>> {
        let work = || -> Result<Vec<TokenizedDoc>> {
            if self.parallel {
                files
                    .par_iter()
                    .map(|path| tokenize_file(block_name, path))
                    .collect()
            } else {
                files.iter().map(|path| tokenize_file(block_name, path)).collect()
            }
        };

        match (self.parallel, self.pool) {
            (true, Some(pool)) => pool.install(work),
            _ => work(),
        }
    }
}

fn tokenize_file(block_name: &str, path: &Path) -> Result<TokenizedDoc> {
    let bytes = fs::read(path).at_path(path)?;
    let content = String::from_utf8_lossy(&bytes);

    Ok(TokenizedDoc {
        rel_path: format!("{}/{}", block_name, entry_name(path)),
        terms: extract_terms(&content).into_iter().map(str::to_string).collect(),
    })
}

/// Printable name of a directory entry.
///
/// Names that are not valid UTF-8 have their raw bytes escaped (`\xff`), so
/// distinct names stay distinct in the doc dictionary.
pub fn entry_name(path: &Path) -> String {
    match path.file_name() {
        Some(name) => match name.to_str() {
            Some(s) => s.to_string(),
            None => name.as_encoded_bytes().escape_ascii().to_string(),
        },
        None => String::new(),
    }
}

/// True for dot-files and dot-directories
pub fn is_hidden(path: &Path) -> bool {
    path.file_name()
        .map(|n| n.to_string_lossy().starts_with('.'))
        .unwrap_or(false)
}

/// List the visible entries of `dir` that satisfy `keep`.
///
/// Without `sort` the order is whatever the filesystem returns, which is not
/// stable across machines; ids then depend on it.
pub fn list_entries(dir: &Path, sort: bool, keep: impl Fn(&Path) -> bool) -> Result<Vec<PathBuf>> {
    let mut entries = Vec::new();
    for entry in fs::read_dir(dir).at_path(dir)? {
        let path = entry.at_path(dir)?.path();
        if is_hidden(&path) {
            debug!("skipping hidden entry {}", path.display());
            continue;
        }
        if keep(&path) {
            entries.push(path);
        }
    }

    if sort {
        entries.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    }
    Ok(entries)
}
