//! Comment filters: severity toggles, keyword search, and tree pruning.

use crate::types::{FileNode, ReviewComment, Severity};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterState {
    /// Severities to show; empty means all.
    pub severity: Vec<Severity>,
    pub search_query: String,
    pub show_only_files_with_issues: bool,
}

/// A partial update to [`FilterState`]; `None` fields are left alone.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterPatch {
    pub severity: Option<Vec<Severity>>,
    pub search_query: Option<String>,
    pub show_only_files_with_issues: Option<bool>,
}

impl FilterState {
    pub fn apply(&mut self, patch: FilterPatch) {
        if let Some(mut severity) = patch.severity {
            severity.sort();
            severity.dedup();
            self.severity = severity;
        }
        if let Some(query) = patch.search_query {
            self.search_query = query;
        }
        if let Some(only) = patch.show_only_files_with_issues {
            self.show_only_files_with_issues = only;
        }
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Add `severity` if absent, remove it otherwise.
    pub fn toggle_severity(&mut self, severity: Severity) {
        if let Some(pos) = self.severity.iter().position(|s| *s == severity) {
            self.severity.remove(pos);
        } else {
            self.severity.push(severity);
            self.severity.sort();
        }
    }

    #[must_use]
    pub fn is_severity_active(&self, severity: Severity) -> bool {
        self.severity.contains(&severity)
    }

    #[must_use]
    pub fn is_default(&self) -> bool {
        *self == Self::default()
    }
}

/// Narrow `comments` to the selected file, the active severities, and the
/// search query (case-insensitive over message, category and file name).
#[must_use]
pub fn filter_comments<'a>(
    comments: &'a [ReviewComment],
    selected_file: Option<&str>,
    filters: &FilterState,
) -> Vec<&'a ReviewComment> {
    let query = filters.search_query.to_lowercase();
    comments
        .iter()
        .filter(|c| selected_file.is_none_or(|id| c.file_id == id))
        .filter(|c| filters.severity.is_empty() || filters.severity.contains(&c.severity))
        .filter(|c| {
            query.is_empty()
                || c.message.to_lowercase().contains(&query)
                || c.category.to_lowercase().contains(&query)
                || c.file_name.to_lowercase().contains(&query)
        })
        .collect()
}

/// Drop files without comments, and directories left with nothing in them.
#[must_use]
pub fn prune_files_without_issues(nodes: &[FileNode]) -> Vec<FileNode> {
    nodes
        .iter()
        .filter_map(|node| {
            if node.is_file() {
                (node.comments() > 0).then(|| node.clone())
            } else {
                let children = prune_files_without_issues(&node.children);
                (!children.is_empty()).then(|| FileNode {
                    children,
                    ..node.clone()
                })
            }
        })
        .collect()
}
