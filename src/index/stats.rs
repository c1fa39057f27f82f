use crate::index::reader::IndexReader;
use crate::index::types::TermId;
use anyhow::Result;
use rustc_hash::FxHashMap;
use std::path::Path;

/// Summary numbers for a built index
#[derive(Debug, Clone)]
pub struct IndexStats {
    pub doc_count: usize,
    pub term_count: usize,
    pub block_count: u32,
    pub index_bytes: u64,
    /// Sum of all document frequencies
    pub total_postings: u64,
    /// Most frequent terms, highest document frequency first
    pub top_terms: Vec<(String, u32)>,
}

impl IndexStats {
    pub fn collect(reader: &IndexReader, top: usize) -> Self {
        let directory = reader.directory();
        let total_postings = directory.values().map(|e| e.doc_freq as u64).sum();

        let names: FxHashMap<TermId, &str> = reader.terms().map(|(t, id)| (id, t)).collect();
        let mut by_freq: Vec<(String, u32)> = directory
            .iter()
            .map(|(id, e)| (names.get(id).copied().unwrap_or("?").to_string(), e.doc_freq))
            .collect();
        by_freq.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        by_freq.truncate(top);

        Self {
            doc_count: reader.doc_count(),
            term_count: reader.term_count(),
            block_count: reader.meta.block_count,
            index_bytes: reader.index_size(),
            total_postings,
            top_terms: by_freq,
        }
    }

    /// Average encoded bytes per (term, doc) pair
    pub fn bytes_per_posting(&self) -> f64 {
        if self.total_postings == 0 {
            0.0
        } else {
            self.index_bytes as f64 / self.total_postings as f64
        }
    }
}

/// Display index statistics
pub fn show_stats(index_dir: &Path) -> Result<()> {
    let reader = IndexReader::open(index_dir)?;
    let stats = IndexStats::collect(&reader, 10);

    println!("Index Statistics");
    println!("================");
    println!();
    println!("Index location:   {}", reader.index_dir().display());
    println!("Index version:    {}", reader.meta.version);
    println!("Codec:            {}", reader.meta.codec);
    println!("Blocks:           {}", stats.block_count);
    println!("Document count:   {}", stats.doc_count);
    println!("Term count:       {}", stats.term_count);
    println!("Postings:         {}", stats.total_postings);
    println!("Index size:       {}", format_size(stats.index_bytes));
    println!("Bytes/posting:    {:.2}", stats.bytes_per_posting());
    println!("Created:          {}", format_timestamp(reader.meta.created_at));

    if !stats.top_terms.is_empty() {
        println!();
        println!("Most frequent terms:");
        for (term, freq) in &stats.top_terms {
            println!("  {:20} {}", term, freq);
        }
    }

    Ok(())
}

/// Format byte size to human readable
fn format_size(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    if bytes >= GB {
        format!("{:.2} GB", bytes as f64 / GB as f64)
    } else if bytes >= MB {
        format!("{:.2} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.2} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} bytes", bytes)
    }
}

/// Format unix timestamp
fn format_timestamp(ts: u64) -> String {
    use std::time::{Duration, UNIX_EPOCH};
    let datetime = UNIX_EPOCH + Duration::from_secs(ts);
    format!("{:?}", datetime)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_size() {
        assert_eq!(format_size(512), "512 bytes");
        assert_eq!(format_size(2048), "2.00 KB");
        assert_eq!(format_size(3 * 1024 * 1024), "3.00 MB");
    }

    #[test]
    fn test_bytes_per_posting_empty() {
        let stats = IndexStats {
            doc_count: 0,
            term_count: 0,
            block_count: 0,
            index_bytes: 0,
            total_postings: 0,
            top_terms: Vec::new(),
        };
        assert_eq!(stats.bytes_per_posting(), 0.0);
    }
}
