//! External merge of block runs
//!
//! Runs wait in a FIFO queue, in the order their blocks were built. While more
//! than one run is pending, the two oldest are merged by term id into a new run
//! that joins the back of the queue, and both inputs are deleted.
//!
//! The posting directory is only filled during the terminal merge, which is the
//! one where the queue is empty right after its two inputs were taken. Runs
//! written by earlier merges are consumed later, so offsets into them would
//! dangle.

use crate::error::{PathContext, Result};
use crate::index::codec::PostingCodec;
use crate::index::postings::merge;
use crate::index::run::{RunReader, RunWriter};
use crate::index::types::{DictEntry, PostingList, TermId};
use log::{debug, info};
use std::cmp::Ordering;
use std::collections::{BTreeMap, VecDeque};
use std::fs;
use std::path::{Path, PathBuf};

/// Term id -> location of its record in the final index
pub type PostingDirectory = BTreeMap<TermId, DictEntry>;

/// Result of reducing all runs to one
#[derive(Debug)]
pub struct MergeOutcome {
    pub index_path: PathBuf,
    pub directory: PostingDirectory,
    /// Number of pairwise merges performed
    pub merges: usize,
}

/// Queue-driven pairwise merger
pub struct RunMerger {
    codec: &'static dyn PostingCodec,
    work_dir: PathBuf,
    queue: VecDeque<PathBuf>,
    merges: usize,
}

impl RunMerger {
    pub fn new(codec: &'static dyn PostingCodec, work_dir: &Path) -> Self {
        Self {
            codec,
            work_dir: work_dir.to_path_buf(),
            queue: VecDeque::new(),
            merges: 0,
        }
    }

    /// Enqueue a finished run
    pub fn push(&mut self, run: PathBuf) {
        self.queue.push_back(run);
    }

    pub fn pending(&self) -> usize {
        self.queue.len()
    }

    /// Merge until one run remains, then move it to `index_path`
    pub fn finish(mut self, index_path: &Path) -> Result<MergeOutcome> {
        let mut directory = PostingDirectory::new();

        if self.queue.len() <= 1 {
            match self.queue.pop_front() {
                // No merge will happen, so the directory comes from a scan
                Some(run) => {
                    self.scan_directory(&run, &mut directory)?;
                    fs::rename(&run, index_path).at_path(&run)?;
                }
                None => {
                    info!("no runs to merge, writing empty index");
                    fs::File::create(index_path).at_path(index_path)?;
                }
            }
        } else {
            while self.queue.len() > 1 {
                let (Some(r1), Some(r2)) = (self.queue.pop_front(), self.queue.pop_front()) else {
                    break;
                };
                let terminal = self.queue.is_empty();
                let output = self.next_run_path();

                let result = if terminal {
                    self.merge_pair(&r1, &r2, &output, Some(&mut directory))
                } else {
                    self.merge_pair(&r1, &r2, &output, None)
                };
                let written = match result {
                    Ok(written) => written,
                    Err(e) => {
                        // A half-written run must not outlive the failed build
                        if let Err(rm) = fs::remove_file(&output) {
                            debug!("could not remove {}: {}", output.display(), rm);
                        }
                        return Err(e);
                    }
                };
                debug!(
                    "merged {} + {} -> {} ({} postings{})",
                    r1.display(),
                    r2.display(),
                    output.display(),
                    written,
                    if terminal { ", terminal" } else { "" }
                );

                fs::remove_file(&r1).at_path(&r1)?;
                fs::remove_file(&r2).at_path(&r2)?;
                self.queue.push_back(output);
            }

            if let Some(last) = self.queue.pop_front() {
                fs::rename(&last, index_path).at_path(&last)?;
            }
        }

        info!(
            "merge complete: {} merges, {} terms in directory",
            self.merges,
            directory.len()
        );
        Ok(MergeOutcome {
            index_path: index_path.to_path_buf(),
            directory,
            merges: self.merges,
        })
    }

    fn next_run_path(&mut self) -> PathBuf {
        self.merges += 1;
        self.work_dir.join(format!("merge_{:04}.run", self.merges))
    }

    /// Linear merge of two runs by term id
    fn merge_pair(
        &self,
        r1: &Path,
        r2: &Path,
        output: &Path,
        mut directory: Option<&mut PostingDirectory>,
    ) -> Result<usize> {
        let mut left = RunReader::open(r1, self.codec)?;
        let mut right = RunReader::open(r2, self.codec)?;
        let mut writer = RunWriter::create(output, self.codec)?;

        let mut a = left.next_posting()?.map(|(_, p)| p);
        let mut b = right.next_posting()?.map(|(_, p)| p);

        loop {
            let posting: PostingList = match (a.take(), b.take()) {
                (None, None) => break,
                (Some(p), None) => {
                    a = left.next_posting()?.map(|(_, p)| p);
                    p
                }
                (None, Some(q)) => {
                    b = right.next_posting()?.map(|(_, q)| q);
                    q
                }
                (Some(p), Some(q)) => match p.term_id.cmp(&q.term_id) {
                    Ordering::Less => {
                        b = Some(q);
                        a = left.next_posting()?.map(|(_, p)| p);
                        p
                    }
                    Ordering::Greater => {
                        a = Some(p);
                        b = right.next_posting()?.map(|(_, q)| q);
                        q
                    }
                    Ordering::Equal => {
                        a = left.next_posting()?.map(|(_, p)| p);
                        b = right.next_posting()?.map(|(_, q)| q);
                        merge(p, q)
                    }
                },
            };

            let offset = writer.write(&posting)?;
            if let Some(dir) = directory.as_deref_mut() {
                dir.insert(
                    posting.term_id,
                    DictEntry {
                        offset,
                        doc_freq: posting.doc_freq(),
                    },
                );
            }
        }

        debug!("{}: {} bytes", output.display(), writer.offset());
        writer.finish()
    }

    /// Record every posting of a run that is already final
    fn scan_directory(&self, run: &Path, directory: &mut PostingDirectory) -> Result<()> {
        let mut reader = RunReader::open(run, self.codec)?;
        while let Some((offset, posting)) = reader.next_posting()? {
            directory.insert(
                posting.term_id,
                DictEntry {
                    offset,
                    doc_freq: posting.doc_freq(),
                },
            );
        }
        Ok(())
    }
}
