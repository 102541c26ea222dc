//! Changelog rendering and idempotent file updates.

pub mod format;
pub mod writer;

pub use format::{ChangelogEntry, ChangelogFormat, Maintainer, RenderedBlock};
pub use writer::{ChangelogFiles, ChangelogOutcome, FileStatus, reconcile_file, update_changelogs};
