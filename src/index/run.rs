//! Sequential run files
//!
//! A run is a headerless concatenation of codec records in ascending term id
//! order. Writers track the byte offset of every record they emit; readers
//! report the offset each record started at.

use crate::error::{IndexError, PathContext, Result};
use crate::index::codec::PostingCodec;
use crate::index::types::{PostingList, TermId};
use std::fs::File;
use std::io::{self, BufReader, BufWriter, Read, Write};
use std::path::{Path, PathBuf};

/// Appends postings to a fresh run file
pub struct RunWriter {
    path: PathBuf,
    file: BufWriter<File>,
    codec: &'static dyn PostingCodec,
    offset: u64,
    last_term: Option<TermId>,
    count: usize,
}

impl RunWriter {
    /// Create (or truncate) the run at `path`
    pub fn create(path: &Path, codec: &'static dyn PostingCodec) -> Result<Self> {
        let file = File::create(path).at_path(path)?;
        Ok(Self {
            path: path.to_path_buf(),
            file: BufWriter::with_capacity(65536, file),
            codec,
            offset: 0,
            last_term: None,
            count: 0,
        })
    }

    /// Append one posting, returning the offset its record starts at
    pub fn write(&mut self, posting: &PostingList) -> Result<u64> {
        if let Some(last) = self.last_term {
            if posting.term_id <= last {
                return Err(IndexError::InvalidPosting {
                    term_id: posting.term_id,
                    reason: format!(
                        "run {} would not be in ascending term order (previous term {})",
                        self.path.display(),
                        last
                    ),
                });
            }
        }

        let start = self.offset;
        let written = self
            .codec
            .write_posting(&mut self.file, posting)
            .map_err(|e| match e {
                IndexError::Io(source) => IndexError::fs(&self.path, source),
                other => other,
            })?;

        self.offset += written;
        self.last_term = Some(posting.term_id);
        self.count += 1;
        Ok(start)
    }

    /// Bytes written so far
    pub fn offset(&self) -> u64 {
        self.offset
    }

    /// Flush and close, returning the number of postings written
    pub fn finish(mut self) -> Result<usize> {
        self.file.flush().at_path(&self.path)?;
        self.file.get_ref().sync_data().at_path(&self.path)?;
        Ok(self.count)
    }
}

/// Counts bytes pulled through an inner reader
struct CountingReader<R> {
    inner: R,
    position: u64,
}

impl<R: Read> Read for CountingReader<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let n = self.inner.read(buf)?;
        self.position += n as u64;
        Ok(n)
    }
}

/// Reads postings back from a run file in order
pub struct RunReader {
    path: PathBuf,
    reader: CountingReader<BufReader<File>>,
    codec: &'static dyn PostingCodec,
}

impl RunReader {
    pub fn open(path: &Path, codec: &'static dyn PostingCodec) -> Result<Self> {
        let file = File::open(path).at_path(path)?;
        Ok(Self {
            path: path.to_path_buf(),
            reader: CountingReader {
                inner: BufReader::with_capacity(65536, file),
                position: 0,
            },
            codec,
        })
    }

    /// Next posting and the offset its record started at
    pub fn next_posting(&mut self) -> Result<Option<(u64, PostingList)>> {
        let start = self.reader.position;
        let posting = self
            .codec
            .read_posting(&mut self.reader)
            .map_err(|e| match e {
                IndexError::Io(source) => IndexError::fs(&self.path, source),
                IndexError::Decode(msg) => {
                    IndexError::decode(format!("{} at byte {}: {}", self.path.display(), start, msg))
                }
                other => other,
            })?;
        Ok(posting.map(|p| (start, p)))
    }
}
