//! BSBI index construction
//!
//! 1. Each block directory is tokenized into term id -> doc id sets
//! 2. Every block is flushed as a run with the configured codec
//! 3. Runs are merged pairwise until one remains (`corpus.index`)
//! 4. Term, document and posting dictionaries are written beside it

use crate::error::{IndexError, Result};
use crate::index::block::{BlockBuilder, DocDictionary, TermDictionary, entry_name, list_entries};
use crate::index::dictionary::{write_doc_dict, write_meta, write_posting_dict, write_term_dict};
use crate::index::merge::RunMerger;
use crate::index::types::*;
use crate::utils::{block_bar, spinner};
use log::{debug, info};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

/// Outcome of a finished build
#[derive(Debug, Clone)]
pub struct BuildSummary {
    pub index_path: PathBuf,
    pub block_count: usize,
    pub doc_count: usize,
    pub term_count: usize,
    pub merges: usize,
    pub index_bytes: u64,
}

/// Drives the whole pipeline for one input collection
pub struct IndexBuilder {
    config: IndexConfig,
}

impl IndexBuilder {
    pub fn new(config: IndexConfig) -> Self {
        Self { config }
    }

    /// Build the index of `input_dir` into `output_dir`.
    ///
    /// Directories and the tokenizer pool are checked before anything is
    /// written. Any failure afterwards aborts the build; leftover run files
    /// are not reused.
    pub fn build(&self, input_dir: &Path, output_dir: &Path) -> Result<BuildSummary> {
        validate_dirs(input_dir, output_dir)?;
        let pool = self.thread_pool()?;
        fs::create_dir_all(output_dir).map_err(|e| {
            IndexError::config(format!(
                "cannot create output directory {}: {}",
                output_dir.display(),
                e
            ))
        })?;

        let block_builder = BlockBuilder::new(self.config.parallel_tokenize, pool.as_ref());
        let codec = self.config.codec.codec();

        // The output directory may live inside the input root; it is not a block
        let output_canon = output_dir.canonicalize().ok();
        let blocks = list_entries(input_dir, self.config.sort_entries, |p| {
            p.is_dir() && p.canonicalize().ok() != output_canon
        })?;
        info!(
            "indexing {} blocks from {} with {} codec",
            blocks.len(),
            input_dir.display(),
            self.config.codec
        );

        // Phase 1: block runs
        let mut terms = TermDictionary::new();
        let mut docs = DocDictionary::new();
        let mut merger = RunMerger::new(codec, output_dir);
        let progress = block_bar(blocks.len() as u64, self.config.show_progress);

        for (idx, block_dir) in blocks.iter().enumerate() {
            let block_name = entry_name(block_dir);
            if let Some(ref pb) = progress {
                pb.set_message(block_name.clone());
            }

            let files = list_entries(block_dir, self.config.sort_entries, |p| p.is_file())?;
            let block = block_builder.build(&block_name, &files, &mut terms, &mut docs)?;

            let run_path = output_dir.join(format!("block_{:04}.run", idx));
            let written = block.write_run(&run_path, codec)?;
            debug!("wrote {} postings to {}", written, run_path.display());
            merger.push(run_path);

            if let Some(ref pb) = progress {
                pb.inc(1);
            }
        }

        if let Some(pb) = progress {
            pb.finish_with_message(format!("{} documents", docs.len()));
        }

        // Phase 2: merge
        info!("merging {} runs", merger.pending());
        let merge_spinner = spinner("Merging runs...", self.config.show_progress);
        let outcome = merger.finish(&output_dir.join(INDEX_FILE))?;
        if let Some(s) = merge_spinner {
            s.finish_with_message(format!("Merged in {} steps", outcome.merges));
        }

        // Phase 3: dictionaries
        write_term_dict(&output_dir.join(TERM_DICT_FILE), &terms)?;
        write_doc_dict(&output_dir.join(DOC_DICT_FILE), &docs)?;
        write_posting_dict(&output_dir.join(POSTING_DICT_FILE), &outcome.directory)?;

        let meta = IndexMeta {
            version: 1,
            codec: self.config.codec,
            doc_count: docs.len() as u32,
            term_count: terms.len() as u32,
            block_count: blocks.len() as u32,
            created_at: SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .map(|d| d.as_secs())
                .unwrap_or(0),
        };
        write_meta(&output_dir.join(META_FILE), &meta)?;

        let index_bytes = fs::metadata(&outcome.index_path)
            .map(|m| m.len())
            .unwrap_or(0);

        info!(
            "index complete: {} docs, {} terms, {} bytes",
            docs.len(),
            terms.len(),
            index_bytes
        );

        Ok(BuildSummary {
            index_path: outcome.index_path,
            block_count: blocks.len(),
            doc_count: docs.len(),
            term_count: terms.len(),
            merges: outcome.merges,
            index_bytes,
        })
    }

    /// Dedicated tokenizer pool when a thread count is configured
    fn thread_pool(&self) -> Result<Option<rayon::ThreadPool>> {
        if !self.config.parallel_tokenize || self.config.thread_count == 0 {
            return Ok(None);
        }
        rayon::ThreadPoolBuilder::new()
            .num_threads(self.config.thread_count)
            .build()
            .map(Some)
            .map_err(|e| IndexError::config(format!("cannot start tokenizer pool: {}", e)))
    }
}

/// Check the input and output directories before anything is written
pub fn validate_dirs(input_dir: &Path, output_dir: &Path) -> Result<()> {
    if !input_dir.is_dir() {
        return Err(IndexError::config(format!(
            "invalid data directory: {}",
            input_dir.display()
        )));
    }
    if output_dir.exists() && !output_dir.is_dir() {
        return Err(IndexError::config(format!(
            "invalid output directory: {}",
            output_dir.display()
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_validate_dirs() {
        let temp_dir = tempdir().unwrap();
        let input = temp_dir.path().join("data");
        let output = temp_dir.path().join("out");

        assert!(matches!(
            validate_dirs(&input, &output),
            Err(IndexError::Configuration(_))
        ));

        fs::create_dir(&input).unwrap();
        assert!(validate_dirs(&input, &output).is_ok());

        fs::write(&output, "not a dir").unwrap();
        assert!(matches!(
            validate_dirs(&input, &output),
            Err(IndexError::Configuration(_))
        ));
    }

    #[test]
    fn test_invalid_input_creates_nothing() {
        let temp_dir = tempdir().unwrap();
        let output = temp_dir.path().join("out");
        let err = IndexBuilder::new(IndexConfig::default())
            .build(&temp_dir.path().join("missing"), &output)
            .unwrap_err();
        assert!(matches!(err, IndexError::Configuration(_)));
        assert!(!output.exists());
    }

    #[test]
    fn test_parallel_build_validates_before_writing() {
        let temp_dir = tempdir().unwrap();
        let output = temp_dir.path().join("out");
        let config = IndexConfig {
            parallel_tokenize: true,
            thread_count: 2,
            ..IndexConfig::default()
        };

        let err = IndexBuilder::new(config.clone())
            .build(&temp_dir.path().join("missing"), &output)
            .unwrap_err();
        assert!(matches!(err, IndexError::Configuration(_)));
        assert!(!output.exists());

        let input = temp_dir.path().join("data");
        fs::create_dir_all(input.join("b0")).unwrap();
        fs::write(input.join("b0").join("doc"), "one two").unwrap();
        let summary = IndexBuilder::new(config).build(&input, &output).unwrap();
        assert_eq!(summary.term_count, 2);
    }

    #[test]
    fn test_empty_collection() {
        let temp_dir = tempdir().unwrap();
        let input = temp_dir.path().join("data");
        let output = temp_dir.path().join("out");
        fs::create_dir(&input).unwrap();

        let summary = IndexBuilder::new(IndexConfig::default())
            .build(&input, &output)
            .unwrap();
        assert_eq!(summary.block_count, 0);
        assert_eq!(summary.index_bytes, 0);
        assert!(output.join(INDEX_FILE).exists());
        assert_eq!(fs::read_to_string(output.join(POSTING_DICT_FILE)).unwrap(), "");
    }

    #[test]
    fn test_runs_are_cleaned_up() {
        let temp_dir = tempdir().unwrap();
        let input = temp_dir.path().join("data");
        let output = temp_dir.path().join("out");
        for b in ["b0", "b1", "b2"] {
            fs::create_dir_all(input.join(b)).unwrap();
            fs::write(input.join(b).join("doc"), format!("shared {}", b)).unwrap();
        }

        let summary = IndexBuilder::new(IndexConfig::default())
            .build(&input, &output)
            .unwrap();
        assert_eq!(summary.merges, 2);

        let leftovers: Vec<_> = fs::read_dir(&output)
            .unwrap()
            .filter_map(|e| e.ok())
            .filter(|e| e.path().extension().is_some_and(|x| x == "run"))
            .collect();
        assert!(leftovers.is_empty());
    }
}
