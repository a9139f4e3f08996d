//! Greedy line-by-line diff.
//!
//! Lines are paired by index with no alignment: equal lines become context,
//! unequal lines at the same index become a remove/add pair, and lines past
//! the end of the shorter side become pure adds or removes.

use chrono::Utc;

use crate::types::{DiffHunk, DiffLine, DiffLineKind, FileDiff, FileStatus};

/// Output of [`compute_diff`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiffResult {
    pub additions: u32,
    pub deletions: u32,
    pub hunks: Vec<DiffHunk>,
}

/// Diff two text blobs into a single-hunk [`FileDiff`].
#[must_use]
pub fn generate_diff(old_content: &str, new_content: &str, file_name: &str) -> FileDiff {
    let old_lines = split_lines(old_content);
    let new_lines = split_lines(new_content);
    let result = compute_diff(&old_lines, &new_lines);

    FileDiff {
        id: format!("diff-{}", Utc::now().timestamp_millis()),
        file_name: file_name.to_string(),
        old_file_name: None,
        status: FileStatus::Modified,
        additions: result.additions,
        deletions: result.deletions,
        hunks: result.hunks,
        language: Some(detect_language(file_name).to_string()),
    }
}

/// An empty blob has no lines; otherwise split on `\n`, keeping a trailing
/// empty line when the text ends with a newline.
///
/// Splitting "" on `\n` would give one empty line, and a diff from "" would
/// open with a stray `- ""` removal and an `@@ -1,1` header. Keep the empty
/// case so new files diff as pure additions.
fn split_lines(content: &str) -> Vec<&str> {
    if content.is_empty() {
        Vec::new()
    } else {
        content.split('\n').collect()
    }
}

#[must_use]
pub fn compute_diff(old_lines: &[&str], new_lines: &[&str]) -> DiffResult {
    let mut lines = Vec::with_capacity(old_lines.len().max(new_lines.len()) + 1);
    let mut additions = 0;
    let mut deletions = 0;

    let mut old_index = 0;
    let mut new_index = 0;
    let mut line_number = 1;

    let mut push = |lines: &mut Vec<DiffLine>,
                    kind: DiffLineKind,
                    old: Option<usize>,
                    new: Option<usize>,
                    content: &str| {
        lines.push(DiffLine {
            line_number,
            old_line_number: old.map(to_line_number),
            new_line_number: new.map(to_line_number),
            kind,
            content: content.to_string(),
            has_comment: false,
        });
        line_number += 1;
    };

    while old_index < old_lines.len() || new_index < new_lines.len() {
        match (old_lines.get(old_index), new_lines.get(new_index)) {
            (None, Some(&new_line)) => {
                push(&mut lines, DiffLineKind::Add, None, Some(new_index), new_line);
                additions += 1;
                new_index += 1;
            }
            (Some(&old_line), None) => {
                push(&mut lines, DiffLineKind::Remove, Some(old_index), None, old_line);
                deletions += 1;
                old_index += 1;
            }
            (Some(&old_line), Some(&new_line)) if old_line == new_line => {
                push(
                    &mut lines,
                    DiffLineKind::Context,
                    Some(old_index),
                    Some(new_index),
                    old_line,
                );
                old_index += 1;
                new_index += 1;
            }
            (Some(&old_line), Some(&new_line)) => {
                push(&mut lines, DiffLineKind::Remove, Some(old_index), None, old_line);
                push(&mut lines, DiffLineKind::Add, None, Some(new_index), new_line);
                deletions += 1;
                additions += 1;
                old_index += 1;
                new_index += 1;
            }
            (None, None) => break,
        }
    }

    let old_count = to_count(old_lines.len());
    let new_count = to_count(new_lines.len());
    let header = DiffLine {
        line_number: 0,
        old_line_number: None,
        new_line_number: None,
        kind: DiffLineKind::Header,
        content: format!("@@ -1,{old_count} +1,{new_count} @@"),
        has_comment: false,
    };
    lines.insert(0, header);

    DiffResult {
        additions,
        deletions,
        hunks: vec![DiffHunk {
            old_start: 1,
            old_lines: old_count,
            new_start: 1,
            new_lines: new_count,
            lines,
        }],
    }
}

fn to_line_number(index: usize) -> u32 {
    to_count(index + 1)
}

fn to_count(n: usize) -> u32 {
    u32::try_from(n).unwrap_or(u32::MAX)
}

/// Map a file name to a highlighter language by extension.
#[must_use]
pub fn detect_language(file_name: &str) -> &'static str {
    let ext = file_name
        .rsplit('.')
        .next()
        .unwrap_or_default()
        .to_lowercase();
    match ext.as_str() {
        "ts" | "tsx" => "typescript",
        "js" | "jsx" => "javascript",
        "py" => "python",
        "java" => "java",
        "cpp" => "cpp",
        "c" => "c",
        "cs" => "csharp",
        "go" => "go",
        "rb" => "ruby",
        "php" => "php",
        "swift" => "swift",
        "kt" => "kotlin",
        "rs" => "rust",
        _ => "plaintext",
    }
}
