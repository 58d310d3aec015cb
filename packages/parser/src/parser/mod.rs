//! USLM document parsing.
//!
//! - [`document`]: file loading and root element location
//! - [`builder`]: recursive construction of the node tree

pub mod builder;
pub mod document;

pub use builder::TreeBuilder;
pub use document::{find_root_element, parse_file, parse_str, parse_tax_code};
