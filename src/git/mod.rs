//! Git operations: tags, merge history, repository state.

pub mod commits;
pub mod repo;
pub mod tags;

pub use commits::{head_message, merge_summaries, pr_numbers_from_merges};
pub use repo::{configured_identity, current_branch, open_repository};
pub use tags::{ReleaseTag, last_release, select_last_release};
