//! XML utilities for navigating USLM DOM trees.

mod utils;

pub use utils::{
    collect_text, element_children, find_child, find_descendant, get_attribute, get_tag_name,
    has_tag, is_in_namespace,
};
