//! Text extraction and normalization for structural elements.
//!
//! - [`normalize`]: entity decoding and whitespace collapsing
//! - [`table`]: conversion of embedded tables to pipe-delimited rows
//! - [`extract`]: prose extraction from a structural element

pub mod extract;
pub mod normalize;
pub mod table;

pub use extract::{element_to_text, extract_label, extract_text, METADATA_TAGS};
pub use normalize::{clean_text, decode_entities};
pub use table::table_to_text;
