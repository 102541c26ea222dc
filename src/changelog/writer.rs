//! Reconcile changelog files with a new release entry.

use std::io::Write;
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;
use tracing::{info, warn};

use crate::error::ChangelogError;

use super::format::{ChangelogEntry, ChangelogFormat};

/// Locations of the three changelog files.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangelogFiles {
    pub debian: PathBuf,
    pub rpm: PathBuf,
    pub markdown: PathBuf,
}

impl ChangelogFiles {
    /// Standard layout: `debian/changelog`, `rpm/<package>.spec`, `CHANGELOG.md`.
    pub fn for_package(root: &Path, package: &str) -> Self {
        Self {
            debian: root.join("debian").join("changelog"),
            rpm: root.join("rpm").join(format!("{}.spec", package)),
            markdown: root.join("CHANGELOG.md"),
        }
    }

    pub fn path(&self, format: ChangelogFormat) -> &Path {
        match format {
            ChangelogFormat::Debian => &self.debian,
            ChangelogFormat::Rpm => &self.rpm,
            ChangelogFormat::Markdown => &self.markdown,
        }
    }

    /// Fail unless every file exists.
    pub fn ensure_exist(&self) -> Result<(), ChangelogError> {
        for format in ChangelogFormat::ALL {
            let path = self.path(format);
            if !path.is_file() {
                return Err(ChangelogError::MissingFile(path.to_path_buf()));
            }
        }
        Ok(())
    }
}

/// What happened to a single file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileStatus {
    Updated,
    AlreadyPresent,
}

/// Result of reconciling all changelog files.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChangelogOutcome {
    pub updated: Vec<ChangelogFormat>,
    pub skipped: Vec<ChangelogFormat>,
}

impl ChangelogOutcome {
    pub fn any_changed(&self) -> bool {
        !self.updated.is_empty()
    }
}

/// Insert the entry into all three changelog files.
///
/// Files that already contain the entry are left untouched. Every file is
/// read and checked for its marker before any of them is written.
pub fn update_changelogs(
    files: &ChangelogFiles,
    entry: &ChangelogEntry,
) -> Result<ChangelogOutcome, ChangelogError> {
    files.ensure_exist()?;

    let mut pending = Vec::with_capacity(ChangelogFormat::ALL.len());
    for format in ChangelogFormat::ALL {
        let path = files.path(format);
        pending.push((format, path, prepare_update(path, format, entry)?));
    }

    let mut outcome = ChangelogOutcome::default();
    for (format, path, update) in pending {
        match update {
            Some(content) => {
                write_atomic(path, &content)?;
                info!("Updated {} ({} format)", path.display(), format);
                outcome.updated.push(format);
            }
            None => outcome.skipped.push(format),
        }
    }

    Ok(outcome)
}

/// Insert the entry into one changelog file unless it is already there.
pub fn reconcile_file(
    path: &Path,
    format: ChangelogFormat,
    entry: &ChangelogEntry,
) -> Result<FileStatus, ChangelogError> {
    let Some(content) = prepare_update(path, format, entry)? else {
        return Ok(FileStatus::AlreadyPresent);
    };

    write_atomic(path, &content)?;
    info!("Updated {} ({} format)", path.display(), format);

    Ok(FileStatus::Updated)
}

/// New content of one file, or `None` when the entry is already present.
fn prepare_update(
    path: &Path,
    format: ChangelogFormat,
    entry: &ChangelogEntry,
) -> Result<Option<String>, ChangelogError> {
    if !path.is_file() {
        return Err(ChangelogError::MissingFile(path.to_path_buf()));
    }

    let content = std::fs::read_to_string(path).map_err(|source| ChangelogError::ReadFailed {
        path: path.to_path_buf(),
        source,
    })?;

    let block = format.render(entry);
    if content.contains(block.stable()) {
        info!(
            "Skipping {}: entry for {} already present",
            path.display(),
            entry.version
        );
        return Ok(None);
    }

    format
        .insert(&content, &block)
        .map(Some)
        .ok_or_else(|| ChangelogError::MissingMarker {
            path: path.to_path_buf(),
            marker: format.marker().unwrap_or_default(),
        })
}

/// Write through a temp file in the same directory, then rename over.
fn write_atomic(path: &Path, content: &str) -> Result<(), ChangelogError> {
    let write_failed = |source| ChangelogError::WriteFailed {
        path: path.to_path_buf(),
        source,
    };

    let dir = path.parent().unwrap_or_else(|| Path::new("."));
    let mut temp = NamedTempFile::new_in(dir).map_err(write_failed)?;
    temp.write_all(content.as_bytes()).map_err(write_failed)?;

    if let Ok(metadata) = std::fs::metadata(path) {
        if let Err(e) = std::fs::set_permissions(temp.path(), metadata.permissions()) {
            warn!("Cannot keep permissions of {}: {}", path.display(), e);
        }
    }

    temp.persist(path).map_err(|e| write_failed(e.error))?;
    Ok(())
}
