use crate::error::{IndexError, PathContext, Result};
use crate::index::codec::PostingCodec;
use crate::index::dictionary::{read_doc_dict, read_meta, read_posting_dict, read_term_dict};
use crate::index::merge::PostingDirectory;
use crate::index::postings::intersect;
use crate::index::types::*;
use memmap2::Mmap;
use rustc_hash::FxHashMap;
use std::fs::File;
use std::path::{Path, PathBuf};

/// Memory-mapped reader over a finished index directory.
///
/// Term lookups go term -> term id -> posting directory -> one seek into the
/// mapped index file; no scan of the index is needed.
pub struct IndexReader {
    index_dir: PathBuf,
    pub meta: IndexMeta,
    codec: &'static dyn PostingCodec,
    terms: FxHashMap<String, TermId>,
    docs: FxHashMap<DocId, String>,
    directory: PostingDirectory,
    /// `None` for an empty index (zero-length files cannot be mapped)
    postings: Option<Mmap>,
}

impl IndexReader {
    /// Open an index written by the builder
    pub fn open(index_dir: &Path) -> Result<Self> {
        if !index_dir.is_dir() {
            return Err(IndexError::config(format!(
                "no index found at {}",
                index_dir.display()
            )));
        }

        let meta = read_meta(&index_dir.join(META_FILE))?;

        // The three dictionaries are independent, load them concurrently
        let (terms, (docs, directory)) = rayon::join(
            || read_term_dict(&index_dir.join(TERM_DICT_FILE)),
            || {
                rayon::join(
                    || read_doc_dict(&index_dir.join(DOC_DICT_FILE)),
                    || read_posting_dict(&index_dir.join(POSTING_DICT_FILE)),
                )
            },
        );

        let index_path = index_dir.join(INDEX_FILE);
        let file = File::open(&index_path).at_path(&index_path)?;
        let len = file.metadata().at_path(&index_path)?.len();
        let postings = if len == 0 {
            None
        } else {
            // SAFETY: the index file is never modified after the build renames it into place
            Some(unsafe { Mmap::map(&file) }.at_path(&index_path)?)
        };

        Ok(Self {
            index_dir: index_dir.to_path_buf(),
            codec: meta.codec.codec(),
            meta,
            terms: terms?,
            docs: docs?,
            directory: directory?,
            postings,
        })
    }

    pub fn index_dir(&self) -> &Path {
        &self.index_dir
    }

    pub fn term_id(&self, term: &str) -> Option<TermId> {
        self.terms.get(term).copied()
    }

    pub fn doc_path(&self, doc_id: DocId) -> Option<&str> {
        self.docs.get(&doc_id).map(String::as_str)
    }

    pub fn term_count(&self) -> usize {
        self.terms.len()
    }

    pub fn doc_count(&self) -> usize {
        self.docs.len()
    }

    pub fn directory(&self) -> &PostingDirectory {
        &self.directory
    }

    /// Size of the mapped index file in bytes
    pub fn index_size(&self) -> u64 {
        self.postings.as_ref().map(|m| m.len() as u64).unwrap_or(0)
    }

    /// Terms with their ids, in no particular order
    pub fn terms(&self) -> impl Iterator<Item = (&str, TermId)> {
        self.terms.iter().map(|(t, &id)| (t.as_str(), id))
    }

    /// Decode the posting list of a term id straight from its recorded offset
    pub fn postings_for_id(&self, term_id: TermId) -> Result<Option<PostingList>> {
        let Some(entry) = self.directory.get(&term_id) else {
            return Ok(None);
        };
        let Some(data) = self.postings.as_deref() else {
            return Err(IndexError::decode(format!(
                "term {} listed in the directory of an empty index",
                term_id
            )));
        };

        let start = usize::try_from(entry.offset)
            .ok()
            .filter(|&s| s < data.len())
            .ok_or_else(|| {
                IndexError::decode(format!(
                    "offset {} of term {} is outside the index",
                    entry.offset, term_id
                ))
            })?;

        let mut slice = &data[start..];
        let posting = self
            .codec
            .read_posting(&mut slice)?
            .ok_or_else(|| IndexError::decode(format!("no record at offset {}", start)))?;

        if posting.term_id != term_id || posting.doc_freq() != entry.doc_freq {
            return Err(IndexError::decode(format!(
                "record at offset {} is term {} with {} docs, directory expects term {} with {}",
                start,
                posting.term_id,
                posting.doc_freq(),
                term_id,
                entry.doc_freq
            )));
        }
        Ok(Some(posting))
    }

    /// Posting list for a term string
    pub fn postings(&self, term: &str) -> Result<Option<PostingList>> {
        match self.term_id(term) {
            Some(id) => self.postings_for_id(id),
            None => Ok(None),
        }
    }

    /// Documents containing every term.
    ///
    /// Lists are intersected from the rarest term up so intermediate results
    /// stay small. An unknown term yields no documents.
    pub fn query_and<S: AsRef<str>>(&self, terms: &[S]) -> Result<Vec<DocId>> {
        if terms.is_empty() {
            return Ok(Vec::new());
        }

        let mut lists = Vec::with_capacity(terms.len());
        for term in terms {
            match self.postings(term.as_ref())? {
                Some(list) => lists.push(list),
                None => return Ok(Vec::new()),
            }
        }
        lists.sort_by_key(|p| p.doc_ids.len());

        let mut iter = lists.into_iter();
        let mut result = iter.next().map(|p| p.doc_ids).unwrap_or_default();
        for list in iter {
            if result.is_empty() {
                break;
            }
            result = intersect(&result, &list);
        }
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::build::IndexBuilder;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_open_missing_dir() {
        let temp_dir = tempdir().unwrap();
        let err = IndexReader::open(&temp_dir.path().join("absent")).err().unwrap();
        assert!(matches!(err, IndexError::Configuration(_)));
    }

    #[test]
    fn test_terms_lists_every_term() {
        let temp_dir = tempdir().unwrap();
        let input = temp_dir.path().join("data");
        let output = temp_dir.path().join("out");
        fs::create_dir_all(input.join("b0")).unwrap();
        fs::write(input.join("b0").join("d0"), "zebra apple mango").unwrap();
        IndexBuilder::new(IndexConfig::default()).build(&input, &output).unwrap();

        let reader = IndexReader::open(&output).unwrap();
        let mut terms: Vec<_> = reader.terms().collect();
        terms.sort_unstable_by_key(|&(_, id)| id);
        assert_eq!(terms, vec![("zebra", 0), ("apple", 1), ("mango", 2)]);
        assert_eq!(reader.term_id("mango"), Some(2));
    }
}
