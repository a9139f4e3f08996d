//! Review data records.
//!
//! These mirror the JSON fixture shapes (camelCase keys) so fixtures and
//! generated diffs flow through the same types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A repository available for review.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Repository {
    pub id: String,
    pub name: String,
    pub owner: String,
    pub description: String,
    pub branch: String,
}

impl Repository {
    #[must_use]
    pub fn full_name(&self) -> String {
        format!("{}/{}", self.owner, self.name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileKind {
    File,
    Directory,
}

/// A node in the repository file tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileNode {
    pub id: String,
    pub name: String,
    pub path: String,
    #[serde(rename = "type")]
    pub kind: FileKind,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<FileNode>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment_count: Option<u32>,
}

impl FileNode {
    #[must_use]
    pub fn file(id: impl Into<String>, name: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            path: path.into(),
            kind: FileKind::File,
            children: Vec::new(),
            comment_count: None,
        }
    }

    #[must_use]
    pub fn directory(
        id: impl Into<String>,
        name: impl Into<String>,
        path: impl Into<String>,
        children: Vec<Self>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            path: path.into(),
            kind: FileKind::Directory,
            children,
            comment_count: None,
        }
    }

    #[must_use]
    pub const fn with_comments(mut self, count: u32) -> Self {
        self.comment_count = Some(count);
        self
    }

    #[must_use]
    pub fn is_file(&self) -> bool {
        self.kind == FileKind::File
    }

    #[must_use]
    pub fn comments(&self) -> u32 {
        self.comment_count.unwrap_or(0)
    }
}

/// Files in depth-first pre-order, directories skipped.
#[must_use]
pub fn flatten_files(nodes: &[FileNode]) -> Vec<&FileNode> {
    let mut out = Vec::new();
    collect_files(nodes, &mut out);
    out
}

fn collect_files<'a>(nodes: &'a [FileNode], out: &mut Vec<&'a FileNode>) {
    for node in nodes {
        if node.is_file() {
            out.push(node);
        }
        collect_files(&node.children, out);
    }
}

#[must_use]
pub fn count_files(nodes: &[FileNode]) -> usize {
    flatten_files(nodes).len()
}

#[must_use]
pub fn count_files_with_issues(nodes: &[FileNode]) -> usize {
    flatten_files(nodes)
        .into_iter()
        .filter(|f| f.comments() > 0)
        .count()
}

#[must_use]
pub fn count_total_comments(nodes: &[FileNode]) -> u32 {
    flatten_files(nodes).iter().map(|f| f.comments()).sum()
}

/// Type of diff line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DiffLineKind {
    Add,
    Remove,
    Context,
    Header,
}

impl DiffLineKind {
    /// Gutter symbol shown before the line content.
    #[must_use]
    pub const fn symbol(self) -> &'static str {
        match self {
            Self::Add => "+",
            Self::Remove => "-",
            Self::Context => " ",
            Self::Header => "",
        }
    }
}

/// A single line in a diff hunk
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiffLine {
    /// Position of the line across the whole diff (header lines use 0)
    pub line_number: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub old_line_number: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub new_line_number: Option<u32>,
    #[serde(rename = "type")]
    pub kind: DiffLineKind,
    pub content: String,
    #[serde(default)]
    pub has_comment: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiffHunk {
    pub old_start: u32,
    pub old_lines: u32,
    pub new_start: u32,
    pub new_lines: u32,
    pub lines: Vec<DiffLine>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileStatus {
    Added,
    Modified,
    Deleted,
    Renamed,
}

impl FileStatus {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Added => "added",
            Self::Modified => "modified",
            Self::Deleted => "deleted",
            Self::Renamed => "renamed",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileDiff {
    pub id: String,
    pub file_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub old_file_name: Option<String>,
    pub status: FileStatus,
    pub additions: u32,
    pub deletions: u32,
    pub hunks: Vec<DiffHunk>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
}

impl FileDiff {
    /// All lines across hunks, in display order.
    pub fn lines(&self) -> impl Iterator<Item = &DiffLine> {
        self.hunks.iter().flat_map(|h| h.lines.iter())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Warning,
    Critical,
}

impl Severity {
    pub const ALL: [Self; 3] = [Self::Info, Self::Warning, Self::Critical];

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Info => "Info",
            Self::Warning => "Warning",
            Self::Critical => "Critical",
        }
    }

    #[must_use]
    pub const fn icon(self) -> &'static str {
        match self {
            Self::Info => "ℹ",
            Self::Warning => "⚠",
            Self::Critical => "✕",
        }
    }
}

/// An AI-generated review comment attached to a line of a file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewComment {
    pub id: String,
    pub file_id: String,
    pub file_name: String,
    pub line_number: u32,
    pub severity: Severity,
    pub category: String,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<String>,
    pub ai_confidence: f32,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Confidence {
    High,
    Medium,
    Low,
}

impl ReviewComment {
    #[must_use]
    pub fn confidence(&self) -> Confidence {
        if self.ai_confidence >= 0.9 {
            Confidence::High
        } else if self.ai_confidence >= 0.7 {
            Confidence::Medium
        } else {
            Confidence::Low
        }
    }

    /// Confidence as a whole percentage, e.g. `"87%"`.
    #[must_use]
    pub fn confidence_percent(&self) -> String {
        format!("{:.0}%", self.ai_confidence * 100.0)
    }
}

/// Per-severity comment totals for the header.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SeverityCounts {
    pub info: usize,
    pub warning: usize,
    pub critical: usize,
}

impl SeverityCounts {
    pub fn tally<'a>(comments: impl IntoIterator<Item = &'a ReviewComment>) -> Self {
        let mut counts = Self::default();
        for comment in comments {
            match comment.severity {
                Severity::Info => counts.info += 1,
                Severity::Warning => counts.warning += 1,
                Severity::Critical => counts.critical += 1,
            }
        }
        counts
    }

    #[must_use]
    pub const fn get(&self, severity: Severity) -> usize {
        match severity {
            Severity::Info => self.info,
            Severity::Warning => self.warning,
            Severity::Critical => self.critical,
        }
    }
}
