//! Changelog entry rendering for the Debian, RPM spec and Markdown formats.

use std::fmt;

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};

use crate::github::ReleaseRecord;

/// Name and email written into Debian and RPM changelog entries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Maintainer {
    pub name: String,
    pub email: String,
}

impl Maintainer {
    pub fn new(name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
        }
    }
}

/// Everything a changelog entry is rendered from.
#[derive(Debug, Clone)]
pub struct ChangelogEntry {
    pub package: String,
    pub version: String,
    pub maintainer: Maintainer,
    pub timestamp: DateTime<FixedOffset>,
    pub records: Vec<ReleaseRecord>,
}

/// The three supported changelog formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangelogFormat {
    Debian,
    Rpm,
    Markdown,
}

impl ChangelogFormat {
    pub const ALL: [ChangelogFormat; 3] = [Self::Debian, Self::Rpm, Self::Markdown];

    /// The marker a file must contain for entries to be inserted.
    ///
    /// Debian entries go at the top of the file and need no marker.
    pub fn marker(&self) -> Option<&'static str> {
        match self {
            Self::Debian => None,
            Self::Rpm => Some("%changelog"),
            Self::Markdown => Some("# Changelog"),
        }
    }

    /// Render the entry block for this format.
    pub fn render(&self, entry: &ChangelogEntry) -> RenderedBlock {
        match self {
            Self::Debian => render_debian(entry),
            Self::Rpm => render_rpm(entry),
            Self::Markdown => render_markdown(entry),
        }
    }

    /// Insert a rendered block into existing file content.
    ///
    /// Returns `None` if the file lacks the format's marker.
    pub fn insert(&self, content: &str, block: &RenderedBlock) -> Option<String> {
        match self {
            Self::Debian => Some(format!("{}{}", block.text, content)),
            Self::Rpm => {
                let offset = find_marker_line_end(content, "%changelog")?;
                let mut updated = String::with_capacity(content.len() + block.text.len() + 1);
                updated.push_str(&content[..offset]);
                if !updated.ends_with('\n') {
                    updated.push('\n');
                }
                updated.push_str(&block.text);
                updated.push_str(&content[offset..]);
                Some(updated)
            }
            Self::Markdown => {
                let marker = "# Changelog";
                let rest = content.strip_prefix(marker)?;
                Some(format!("{}{}{}", marker, block.text, rest))
            }
        }
    }
}

impl fmt::Display for ChangelogFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Debian => write!(f, "debian"),
            Self::Rpm => write!(f, "rpm"),
            Self::Markdown => write!(f, "markdown"),
        }
    }
}

/// A rendered changelog block.
///
/// `stable()` is the prefix that does not depend on the time of rendering
/// beyond the date, used to detect an entry that was already written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedBlock {
    pub text: String,
    stable_len: usize,
}

impl RenderedBlock {
    fn whole(text: String) -> Self {
        let stable_len = text.len();
        Self { text, stable_len }
    }

    pub fn stable(&self) -> &str {
        &self.text[..self.stable_len]
    }
}

fn render_debian(entry: &ChangelogEntry) -> RenderedBlock {
    let mut text = format!(
        "{} ({}-1) stable; urgency=low\n\n",
        entry.package, entry.version
    );
    for record in &entry.records {
        text.push_str(&format!(
            "  * {} (by {})\n    <{}>\n",
            record.title, record.author, record.url
        ));
    }
    text.push_str(&format!(
        "\n -- {} <{}>  ",
        entry.maintainer.name, entry.maintainer.email
    ));
    let stable_len = text.len();

    text.push_str(&entry.timestamp.format("%a, %d %b %Y %H:%M:%S %z").to_string());
    text.push_str("\n\n");

    RenderedBlock { text, stable_len }
}

fn render_rpm(entry: &ChangelogEntry) -> RenderedBlock {
    let mut text = format!(
        "* {} {} - {}-1\n",
        entry.timestamp.format("%a %b %d %Y"),
        entry.maintainer.email,
        entry.version
    );
    for record in &entry.records {
        text.push_str(&format!("- {} (by {})\n", record.title, record.author));
    }
    RenderedBlock::whole(text)
}

fn render_markdown(entry: &ChangelogEntry) -> RenderedBlock {
    let mut text = format!(
        "\n\n## {} ({})\n\n",
        entry.version,
        entry.timestamp.format("%Y-%m-%d")
    );
    for record in &entry.records {
        text.push_str(&format!(
            "* {} #{} ({})\n",
            record.title, record.number, record.author
        ));
    }
    RenderedBlock::whole(text)
}

/// Byte offset just past the line that equals `marker`.
fn find_marker_line_end(content: &str, marker: &str) -> Option<usize> {
    let mut offset = 0;
    for line in content.split_inclusive('\n') {
        offset += line.len();
        if line.trim_end() == marker {
            return Some(offset);
        }
    }
    None
}
