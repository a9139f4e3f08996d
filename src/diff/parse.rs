//! Unified diff parser
//!
//! Turns a unified patch into display hunks. Each hunk starts with a header
//! line carrying the `@@` text, followed by the body lines numbered against
//! the old and new files.

use crate::types::{DiffHunk, DiffLine, DiffLineKind};

/// Hunks plus change totals for a unified patch.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedPatch {
    pub hunks: Vec<DiffHunk>,
    pub additions: u32,
    pub deletions: u32,
}

/// Parse a unified diff string
///
/// File headers (`diff --git`, `index`, `---`, `+++`) are skipped; hunks
/// with an unreadable `@@` header are dropped.
#[must_use]
pub fn parse_patch(patch: &str) -> ParsedPatch {
    let mut result = ParsedPatch::default();
    let mut lines = patch.lines().peekable();
    let mut display_number = 1;

    // Skip everything before the first hunk
    while let Some(line) = lines.peek() {
        if line.starts_with("@@") {
            break;
        }
        lines.next();
    }

    while let Some(line) = lines.next() {
        if !line.starts_with("@@") {
            continue;
        }
        let Some(mut hunk) = parse_hunk_header(line) else {
            continue;
        };

        let mut old_line = hunk.old_start;
        let mut new_line = hunk.new_start;

        while let Some(next) = lines.peek() {
            if next.starts_with("@@") || next.starts_with("diff ") {
                break;
            }
            let Some(raw) = lines.next() else { break };

            let (kind, content) = if let Some(content) = raw.strip_prefix('+') {
                (DiffLineKind::Add, content)
            } else if let Some(content) = raw.strip_prefix('-') {
                (DiffLineKind::Remove, content)
            } else if let Some(content) = raw.strip_prefix(' ') {
                (DiffLineKind::Context, content)
            } else if raw.starts_with('\\') {
                // "\ No newline at end of file"
                continue;
            } else {
                // Empty or unprefixed lines count as context
                (DiffLineKind::Context, raw)
            };

            let (old_number, new_number) = match kind {
                DiffLineKind::Add => {
                    new_line += 1;
                    result.additions += 1;
                    (None, Some(new_line - 1))
                }
                DiffLineKind::Remove => {
                    old_line += 1;
                    result.deletions += 1;
                    (Some(old_line - 1), None)
                }
                DiffLineKind::Context | DiffLineKind::Header => {
                    old_line += 1;
                    new_line += 1;
                    (Some(old_line - 1), Some(new_line - 1))
                }
            };

            hunk.lines.push(DiffLine {
                line_number: display_number,
                old_line_number: old_number,
                new_line_number: new_number,
                kind,
                content: content.to_string(),
                has_comment: false,
            });
            display_number += 1;
        }

        result.hunks.push(hunk);
    }

    result
}

/// Parse `@@ -start,count +start,count @@ optional context` into an empty
/// hunk whose first line is the header itself.
fn parse_hunk_header(header: &str) -> Option<DiffHunk> {
    let parts: Vec<&str> = header.split_whitespace().collect();
    if parts.len() < 3 {
        return None;
    }

    let (old_start, old_lines) = parse_range(parts[1].strip_prefix('-')?)?;
    let (new_start, new_lines) = parse_range(parts[2].strip_prefix('+')?)?;

    Some(DiffHunk {
        old_start,
        old_lines,
        new_start,
        new_lines,
        lines: vec![DiffLine {
            line_number: 0,
            old_line_number: None,
            new_line_number: None,
            kind: DiffLineKind::Header,
            content: header.to_string(),
            has_comment: false,
        }],
    })
}

fn parse_range(s: &str) -> Option<(u32, u32)> {
    if let Some((start, count)) = s.split_once(',') {
        Some((start.parse().ok()?, count.parse().ok()?))
    } else {
        // Single line: "5" means start=5, count=1
        let start = s.parse().ok()?;
        Some((start, 1))
    }
}
