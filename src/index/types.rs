use crate::index::codec::CodecKind;
use serde::{Deserialize, Serialize};

/// Unique identifier for a document in the collection
pub type DocId = u32;

/// Unique identifier for a term in the collection
pub type TermId = u32;

/// Final merged index file
pub const INDEX_FILE: &str = "corpus.index";
/// Term -> term id dump
pub const TERM_DICT_FILE: &str = "term.dict";
/// Document path -> doc id dump
pub const DOC_DICT_FILE: &str = "doc.dict";
/// Term id -> (offset, doc frequency) directory
pub const POSTING_DICT_FILE: &str = "posting.dict";
/// Build metadata
pub const META_FILE: &str = "meta.json";

/// The documents containing one term, sorted ascending without duplicates
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostingList {
    pub term_id: TermId,
    pub doc_ids: Vec<DocId>,
}

impl PostingList {
    pub fn new(term_id: TermId, doc_ids: Vec<DocId>) -> Self {
        Self { term_id, doc_ids }
    }

    pub fn empty(term_id: TermId) -> Self {
        Self::new(term_id, Vec::new())
    }

    pub fn doc_freq(&self) -> u32 {
        self.doc_ids.len() as u32
    }

    pub fn is_empty(&self) -> bool {
        self.doc_ids.is_empty()
    }

    /// True when doc ids are strictly increasing
    pub fn is_sorted(&self) -> bool {
        self.doc_ids.windows(2).all(|w| w[0] < w[1])
    }
}

/// Posting directory entry: where a term's record starts in the final index
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DictEntry {
    pub offset: u64,
    pub doc_freq: u32,
}

/// Index metadata stored in meta.json
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexMeta {
    pub version: u32,
    pub codec: CodecKind,
    pub doc_count: u32,
    pub term_count: u32,
    pub block_count: u32,
    pub created_at: u64,
}

/// Configuration for one index build
#[derive(Debug, Clone)]
pub struct IndexConfig {
    pub codec: CodecKind,
    /// Read and tokenize the documents of a block on the rayon pool
    pub parallel_tokenize: bool,
    /// Worker threads for tokenization (0 = global pool)
    pub thread_count: usize,
    /// Sort directory listings by file name before assigning ids
    pub sort_entries: bool,
    /// Draw progress bars on stdout
    pub show_progress: bool,
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            codec: CodecKind::Basic,
            parallel_tokenize: false,
            thread_count: 0,
            sort_entries: true,
            show_progress: false,
        }
    }
}

impl IndexConfig {
    pub fn with_codec(codec: CodecKind) -> Self {
        Self {
            codec,
            ..Self::default()
        }
    }
}
