//! Version parsing and next version inference.

pub mod infer;
pub mod parse;

pub use infer::{next_version, version_from_branch, version_from_merge_lines};
pub use parse::{normalize_tag_version, parse_version};
