//! Stream layout for the main pane
//!
//! The main pane is one vertical stream of rows: diff lines with their
//! comment cards beneath them, or the list of all comments when no file is
//! selected. Both the view and `update` (scroll clamping, comment jumps)
//! work from the same row list.

use std::collections::HashSet;

use crate::layout;
use crate::model::Model;
use crate::text::{wrap_text, wrap_text_preserve};
use crate::types::{DiffLine, DiffLineKind, FileDiff, ReviewComment};

/// One terminal row of the main pane.
#[derive(Debug, Clone, PartialEq)]
pub enum StreamRow<'a> {
    /// Section title, e.g. "All Comments (4)"
    Section(String),
    /// `@@` hunk header
    Hunk(&'a DiffLine),
    /// Diff line; `index` is its position in `FileDiff::lines`
    Line { index: usize, line: &'a DiffLine },
    CommentHeader(&'a ReviewComment),
    CommentText {
        comment: &'a ReviewComment,
        text: String,
    },
    SuggestionToggle {
        comment: &'a ReviewComment,
        expanded: bool,
    },
    SuggestionText {
        comment: &'a ReviewComment,
        text: String,
    },
    CommentFooter(&'a ReviewComment),
    Gap,
}

impl StreamRow<'_> {
    /// Comment this row belongs to, if any.
    #[must_use]
    pub fn comment(&self) -> Option<&ReviewComment> {
        match self {
            Self::CommentHeader(comment)
            | Self::CommentText { comment, .. }
            | Self::SuggestionToggle { comment, .. }
            | Self::SuggestionText { comment, .. }
            | Self::CommentFooter(comment) => Some(*comment),
            _ => None,
        }
    }
}

/// Rows of one comment card.
pub fn comment_card<'a>(
    comment: &'a ReviewComment,
    expanded: &HashSet<String>,
    inner_width: u32,
    out: &mut Vec<StreamRow<'a>>,
) {
    let wrap_width = layout::comment_wrap_width(inner_width).max(1);

    out.push(StreamRow::CommentHeader(comment));
    for text in wrap_text(&comment.message, wrap_width) {
        out.push(StreamRow::CommentText { comment, text });
    }
    if let Some(suggestion) = &comment.suggestion {
        let is_expanded = expanded.contains(&comment.id);
        out.push(StreamRow::SuggestionToggle {
            comment,
            expanded: is_expanded,
        });
        if is_expanded {
            for text in wrap_text_preserve(suggestion, wrap_width) {
                out.push(StreamRow::SuggestionText { comment, text });
            }
        }
    }
    out.push(StreamRow::CommentFooter(comment));
    out.push(StreamRow::Gap);
}

/// Diff rows with each comment placed under the line whose new-side number
/// matches. Comments that match no line are listed after the diff.
#[must_use]
pub fn build_diff_stream<'a>(
    diff: &'a FileDiff,
    comments: &[&'a ReviewComment],
    expanded: &HashSet<String>,
    inner_width: u32,
) -> Vec<StreamRow<'a>> {
    let mut rows = Vec::new();
    let mut placed: HashSet<&str> = HashSet::new();

    for (index, line) in diff.lines().enumerate() {
        if line.kind == DiffLineKind::Header {
            rows.push(StreamRow::Hunk(line));
            continue;
        }
        rows.push(StreamRow::Line { index, line });

        let Some(new_number) = line.new_line_number else {
            continue;
        };
        for comment in comments
            .iter()
            .copied()
            .filter(|c| c.line_number == new_number)
        {
            if placed.insert(comment.id.as_str()) {
                comment_card(comment, expanded, inner_width, &mut rows);
            }
        }
    }

    let unplaced: Vec<&ReviewComment> = comments
        .iter()
        .copied()
        .filter(|c| !placed.contains(c.id.as_str()))
        .collect();
    if !unplaced.is_empty() {
        rows.push(StreamRow::Gap);
        rows.push(StreamRow::Section(format!(
            "Comments outside this diff ({})",
            unplaced.len()
        )));
        for comment in unplaced {
            comment_card(comment, expanded, inner_width, &mut rows);
        }
    }

    rows
}

/// Every comment as a card under an "All Comments (N)" title.
#[must_use]
pub fn build_comment_list<'a>(
    comments: &[&'a ReviewComment],
    expanded: &HashSet<String>,
    inner_width: u32,
) -> Vec<StreamRow<'a>> {
    let mut rows = vec![StreamRow::Section(format!("All Comments ({})", comments.len()))];
    for comment in comments.iter().copied() {
        comment_card(comment, expanded, inner_width, &mut rows);
    }
    rows
}

/// Rows the main pane currently shows. Empty while nothing is scrollable
/// (no repository, loading, errors).
#[must_use]
pub fn main_stream<'a>(model: &'a Model, comments: &[&'a ReviewComment]) -> Vec<StreamRow<'a>> {
    let inner_width = layout::main_inner_width(model);
    if model.selected_file.is_some() {
        model
            .current_diff()
            .map(|diff| build_diff_stream(diff, comments, &model.expanded_suggestions, inner_width))
            .unwrap_or_default()
    } else if model.reviews.ready().is_some() && !model.upload_mode {
        build_comment_list(comments, &model.expanded_suggestions, inner_width)
    } else {
        Vec::new()
    }
}

/// Comment ids in the order their cards appear.
#[must_use]
pub fn comment_order<'a>(rows: &[StreamRow<'a>]) -> Vec<&'a str> {
    rows.iter()
        .filter_map(|row| match row {
            StreamRow::CommentHeader(comment) => Some(comment.id.as_str()),
            _ => None,
        })
        .collect()
}

/// Row index of a comment's card header.
#[must_use]
pub fn comment_row(rows: &[StreamRow<'_>], comment_id: &str) -> Option<usize> {
    rows.iter()
        .position(|row| matches!(row, StreamRow::CommentHeader(c) if c.id == comment_id))
}

#[must_use]
pub const fn max_scroll(total_rows: usize, viewport: usize) -> usize {
    total_rows.saturating_sub(viewport)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diff::generate_diff;
    use crate::types::Severity;
    use chrono::{TimeZone, Utc};

    fn comment(id: &str, line: u32, suggestion: Option<&str>) -> ReviewComment {
        ReviewComment {
            id: id.to_string(),
            file_id: "f1".to_string(),
            file_name: "src/lib.rs".to_string(),
            line_number: line,
            severity: Severity::Warning,
            category: "Performance".to_string(),
            message: "Avoid cloning inside the loop".to_string(),
            suggestion: suggestion.map(str::to_string),
            ai_confidence: 0.82,
            timestamp: Utc.with_ymd_and_hms(2025, 1, 5, 14, 30, 0).unwrap(),
        }
    }

    #[test]
    fn comment_sits_under_matching_new_line() {
        let diff = generate_diff("a\nb\nc", "a\nB\nc", "src/lib.rs");
        let c = comment("c1", 2, None);
        let rows = build_diff_stream(&diff, &[&c], &HashSet::new(), 100);

        // hunk, a, -b, +B, card(header, text, footer, gap), c
        assert!(matches!(rows[0], StreamRow::Hunk(_)));
        assert!(matches!(rows[3], StreamRow::Line { line, .. } if line.content == "B"));
        assert_eq!(comment_row(&rows, "c1"), Some(4));
        assert!(matches!(rows[5], StreamRow::CommentText { .. }));
        assert!(matches!(rows[6], StreamRow::CommentFooter(_)));
        assert!(matches!(rows[8], StreamRow::Line { line, .. } if line.content == "c"));
        assert_eq!(rows.len(), 9);
    }

    #[test]
    fn removed_lines_never_carry_comments() {
        let diff = generate_diff("x", "", "src/lib.rs");
        let c = comment("c1", 1, None);
        let rows = build_diff_stream(&diff, &[&c], &HashSet::new(), 100);
        let section = rows
            .iter()
            .position(|r| matches!(r, StreamRow::Section(t) if t == "Comments outside this diff (1)"));
        assert!(section.is_some());
        assert!(comment_row(&rows, "c1").unwrap() > section.unwrap());
    }

    #[test]
    fn suggestion_expands_in_place() {
        let diff = generate_diff("", "a", "src/lib.rs");
        let c = comment("c1", 1, Some("let x = y;\nlet z = x;"));
        let collapsed = build_diff_stream(&diff, &[&c], &HashSet::new(), 100);
        assert!(collapsed
            .iter()
            .any(|r| matches!(r, StreamRow::SuggestionToggle { expanded: false, .. })));

        let expanded: HashSet<String> = ["c1".to_string()].into();
        let open = build_diff_stream(&diff, &[&c], &expanded, 100);
        let suggestion_rows = open
            .iter()
            .filter(|r| matches!(r, StreamRow::SuggestionText { .. }))
            .count();
        assert_eq!(suggestion_rows, 2);
        assert_eq!(open.len(), collapsed.len() + 2);
    }

    #[test]
    fn comment_list_has_title_and_order() {
        let a = comment("a", 1, None);
        let b = comment("b", 9, None);
        let rows = build_comment_list(&[&a, &b], &HashSet::new(), 80);
        assert_eq!(rows[0], StreamRow::Section("All Comments (2)".to_string()));
        assert_eq!(comment_order(&rows), vec!["a", "b"]);
    }

    #[test]
    fn narrow_panes_wrap_messages() {
        let a = comment("a", 1, None);
        let rows = build_comment_list(&[&a], &HashSet::new(), 30);
        let text_rows = rows
            .iter()
            .filter(|r| matches!(r, StreamRow::CommentText { .. }))
            .count();
        assert!(text_rows > 1);
    }

    #[test]
    fn max_scroll_saturates() {
        assert_eq!(max_scroll(10, 4), 6);
        assert_eq!(max_scroll(3, 4), 0);
    }
}
