//! Text dictionaries written next to the index
//!
//! - `term.dict`: `term\ttermId`, sorted by term
//! - `doc.dict`: `path\tdocId`, sorted by path
//! - `posting.dict`: `termId\toffset\tdocFreq`, sorted by term id

use crate::error::{IndexError, PathContext, Result};
use crate::index::block::{DocDictionary, TermDictionary};
use crate::index::merge::PostingDirectory;
use crate::index::types::{DictEntry, DocId, IndexMeta, TermId};
use rustc_hash::FxHashMap;
use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;
use std::str::FromStr;

pub fn write_term_dict(path: &Path, terms: &TermDictionary) -> Result<()> {
    write_lines(path, terms.sorted().into_iter().map(|(t, id)| format!("{}\t{}", t, id)))
}

pub fn write_doc_dict(path: &Path, docs: &DocDictionary) -> Result<()> {
    write_lines(path, docs.iter().map(|(p, id)| format!("{}\t{}", p, id)))
}

pub fn write_posting_dict(path: &Path, directory: &PostingDirectory) -> Result<()> {
    write_lines(
        path,
        directory
            .iter()
            .map(|(id, e)| format!("{}\t{}\t{}", id, e.offset, e.doc_freq)),
    )
}

pub fn write_meta(path: &Path, meta: &IndexMeta) -> Result<()> {
    let mut file = BufWriter::new(File::create(path).at_path(path)?);
    serde_json::to_writer_pretty(&mut file, meta).map_err(|e| IndexError::fs(path, e.into()))?;
    file.flush().at_path(path)
}

fn write_lines(path: &Path, lines: impl Iterator<Item = String>) -> Result<()> {
    let mut file = BufWriter::new(File::create(path).at_path(path)?);
    for line in lines {
        writeln!(file, "{}", line).at_path(path)?;
    }
    file.flush().at_path(path)?;
    Ok(())
}

pub fn read_term_dict(path: &Path) -> Result<FxHashMap<String, TermId>> {
    let mut terms = FxHashMap::default();
    for_each_line(path, |line_no, line| {
        let (term, id) = split_last(line, path, line_no)?;
        terms.insert(term.to_string(), parse_field(id, path, line_no)?);
        Ok(())
    })?;
    Ok(terms)
}

/// Doc id -> path
pub fn read_doc_dict(path: &Path) -> Result<FxHashMap<DocId, String>> {
    let mut docs = FxHashMap::default();
    for_each_line(path, |line_no, line| {
        let (doc, id) = split_last(line, path, line_no)?;
        docs.insert(parse_field(id, path, line_no)?, doc.to_string());
        Ok(())
    })?;
    Ok(docs)
}

pub fn read_posting_dict(path: &Path) -> Result<PostingDirectory> {
    let mut directory = PostingDirectory::new();
    for_each_line(path, |line_no, line| {
        let mut fields = line.split('\t');
        let (Some(id), Some(offset), Some(freq), None) =
            (fields.next(), fields.next(), fields.next(), fields.next())
        else {
            return Err(malformed(path, line_no, "expected 3 fields"));
        };
        directory.insert(
            parse_field(id, path, line_no)?,
            DictEntry {
                offset: parse_field(offset, path, line_no)?,
                doc_freq: parse_field(freq, path, line_no)?,
            },
        );
        Ok(())
    })?;
    Ok(directory)
}

pub fn read_meta(path: &Path) -> Result<IndexMeta> {
    let file = File::open(path).at_path(path)?;
    serde_json::from_reader(BufReader::new(file))
        .map_err(|e| IndexError::decode(format!("{}: {}", path.display(), e)))
}

fn for_each_line(path: &Path, mut f: impl FnMut(usize, &str) -> Result<()>) -> Result<()> {
    let reader = BufReader::new(File::open(path).at_path(path)?);
    for (i, line) in reader.lines().enumerate() {
        let line = line.at_path(path)?;
        if line.is_empty() {
            continue;
        }
        f(i + 1, &line)?;
    }
    Ok(())
}

/// Split on the last tab; the key itself may contain tabs (document paths)
fn split_last<'a>(line: &'a str, path: &Path, line_no: usize) -> Result<(&'a str, &'a str)> {
    line.rsplit_once('\t')
        .ok_or_else(|| malformed(path, line_no, "missing tab separator"))
}

fn parse_field<T: FromStr>(field: &str, path: &Path, line_no: usize) -> Result<T> {
    field
        .parse()
        .map_err(|_| malformed(path, line_no, &format!("invalid number '{}'", field)))
}

fn malformed(path: &Path, line_no: usize, reason: &str) -> IndexError {
    IndexError::decode(format!("{}:{}: {}", path.display(), line_no, reason))
}
