pub mod block;
pub mod build;
pub mod codec;
pub mod dictionary;
pub mod merge;
pub mod postings;
pub mod reader;
pub mod run;
pub mod stats;
pub mod types;

pub use build::{BuildSummary, IndexBuilder};
pub use codec::{CodecKind, PostingCodec};
pub use reader::IndexReader;
pub use types::*;
