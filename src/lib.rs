//! # BSBI - Blocked Sort-Based Inverted Index
//!
//! Builds an on-disk inverted index over a document collection laid out as
//! `<input>/<block>/<file>`, one run per block, merged pairwise into a single
//! posting file.
//!
//! ## Architecture
//!
//! - [`index`] - Block inversion, run merging, codecs and the index reader
//! - [`utils`] - Byte and bit encoding, tokenizing, configuration, progress
//! - [`error`] - Library error type
//!
//! ## Quick Start
//!
//! ```ignore
//! use bsbi::index::{CodecKind, IndexBuilder, IndexConfig, IndexReader};
//! use std::path::Path;
//!
//! let config = IndexConfig::with_codec(CodecKind::VariableByte);
//! IndexBuilder::new(config).build(Path::new("data"), Path::new("out")).unwrap();
//!
//! let reader = IndexReader::open(Path::new("out")).unwrap();
//! for doc_id in reader.query_and(&["hello", "world"]).unwrap() {
//!     println!("{}", reader.doc_path(doc_id).unwrap_or("?"));
//! }
//! ```
//!
//! ## Output
//!
//! | File | Contents |
//! |------|----------|
//! | `corpus.index` | codec-encoded posting records, ascending term id |
//! | `term.dict` | `term<TAB>termId` |
//! | `doc.dict` | `relPath<TAB>docId` |
//! | `posting.dict` | `termId<TAB>offset<TAB>docFreq` |
//! | `meta.json` | codec and counts |

pub mod error;
pub mod index;
pub mod utils;
