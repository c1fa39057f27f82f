//! Utility functions shared by the index modules.
//!
//! ## Modules
//!
//! - [`app_data`] - User configuration (`config.json` in the platform config dir)
//! - [`bits`] - MSB-first bit writer and reader for the gamma codec
//! - [`encoding`] - Big-endian integers, gap transform, variable-byte integers
//! - [`progress`] - Progress bars, no-op without the `progress` feature
//! - [`tokenizer`] - Whitespace term extraction
//!
//! ```no_run
//! use bsbi::utils::{gap_encode, extract_terms};
//!
//! let gaps = gap_encode(&[3, 7, 8]);
//! // Some([3, 4, 1])
//!
//! let terms = extract_terms("the cat saw the dog");
//! // ["the", "cat", "saw", "dog"]
//! ```

pub mod app_data;
pub mod bits;
pub mod encoding;
pub mod progress;
pub mod tokenizer;

pub use app_data::*;
pub use bits::*;
pub use encoding::*;
pub use progress::*;
pub use tokenizer::*;
