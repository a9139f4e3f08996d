//! Main pane: diff with inline comments, or the all-comments list

use opentui::{OptimizedBuffer, Rgba, Style};

use super::comments::draw_card_row;
use super::components::{
    draw_badge, draw_box, draw_skeleton, draw_text_advance, draw_text_truncated,
    truncate_path, Rect,
};
use crate::layout::{self, DIFF_HEADER_HEIGHT, GUTTER_WIDTH, LINE_NUM_WIDTH};
use crate::model::{Focus, Loadable, Model};
use crate::stream::{main_stream, StreamRow};
use crate::text::display_width;
use crate::types::{DiffLine, DiffLineKind, FileDiff, FileStatus};
use crate::upload::CODE_EXTENSIONS;

pub fn view(model: &Model, buffer: &mut OptimizedBuffer, area: Rect) {
    let theme = &model.theme;
    let border = if model.focus == Focus::DiffPane {
        theme.border_focused
    } else {
        theme.border
    };
    let title = model
        .current_diff()
        .map_or_else(|| "Review".to_string(), |d| d.file_name.clone());
    draw_box(buffer, area, border, Some(&title), theme.foreground);

    let inner = area.inner();
    if inner.width == 0 || inner.height == 0 {
        return;
    }
    let (header, body) = inner.split_top(u32::from(DIFF_HEADER_HEIGHT));

    if model.selected_file.is_none() {
        draw_unselected(model, buffer, header, body);
        return;
    }

    if let Some(diff) = model.current_diff() {
        draw_diff_header(model, buffer, header, diff);
        draw_stream(model, buffer, body);
        return;
    }

    match &model.diff {
        Loadable::Failed(err) if !model.upload_mode => {
            draw_error(model, buffer, body, "Unable to load diff", err);
        }
        Loadable::Idle | Loadable::Loading if !model.upload_mode => {
            draw_skeleton(buffer, body, theme, 8);
        }
        _ => draw_error(
            model,
            buffer,
            body,
            "Unable to load diff",
            "The selected file has no diff",
        ),
    }
}

fn draw_unselected(model: &Model, buffer: &mut OptimizedBuffer, header: Rect, body: Rect) {
    let theme = &model.theme;

    if model.upload_mode {
        if model.uploaded_files.is_empty() {
            draw_upload_instructions(model, buffer, body);
        } else {
            draw_centered_lines(
                buffer,
                body,
                &[
                    ("Select a file to review", theme.style_foreground().with_bold()),
                    ("", theme.style_muted()),
                    ("j/k or J/K to move between files", theme.style_muted()),
                ],
            );
        }
        return;
    }

    buffer.draw_text(
        header.x + 1,
        header.y,
        "Select a file to review",
        theme.style_foreground().with_bold(),
    );
    draw_text_truncated(
        buffer,
        header.x + 1,
        header.y + 1,
        "j/k in the file tree or J/K anywhere to move between files",
        header.width.saturating_sub(2),
        theme.style_muted(),
    );

    match &model.reviews {
        Loadable::Ready(_) => draw_stream(model, buffer, body),
        Loadable::Failed(err) => draw_error(model, buffer, body, "Unable to load comments", err),
        Loadable::Idle | Loadable::Loading => draw_skeleton(buffer, body, theme, 6),
    }
}

fn draw_upload_instructions(model: &Model, buffer: &mut OptimizedBuffer, area: Rect) {
    let theme = &model.theme;
    let extensions = CODE_EXTENSIONS
        .iter()
        .map(|ext| format!(".{ext}"))
        .collect::<Vec<_>>()
        .join(" ");
    let supported = format!("Supported: {extensions}");
    draw_centered_lines(
        buffer,
        area,
        &[
            ("Upload files to review", theme.style_foreground().with_bold()),
            ("", theme.style_muted()),
            (
                "Press a and enter one or more file paths, separated by spaces",
                theme.style_muted(),
            ),
            (supported.as_str(), theme.style_muted()),
        ],
    );
}

fn draw_error(model: &Model, buffer: &mut OptimizedBuffer, area: Rect, title: &str, detail: &str) {
    let theme = &model.theme;
    draw_centered_lines(
        buffer,
        area,
        &[
            (title, Style::fg(theme.error).with_bold()),
            ("", theme.style_muted()),
            (detail, theme.style_muted()),
        ],
    );
}

pub(super) fn draw_centered_lines(buffer: &mut OptimizedBuffer, area: Rect, lines: &[(&str, Style)]) {
    let top = area.y + area.height.saturating_sub(lines.len() as u32) / 2;
    for (i, (text, style)) in lines.iter().enumerate() {
        let y = top + i as u32;
        if y >= area.y + area.height {
            break;
        }
        let width = (display_width(text) as u32).min(area.width);
        let x = area.x + (area.width - width) / 2;
        draw_text_truncated(buffer, x, y, text, area.width, *style);
    }
}

fn status_color(model: &Model, status: FileStatus) -> Rgba {
    match status {
        FileStatus::Added => model.theme.success,
        FileStatus::Deleted => model.theme.error,
        FileStatus::Modified => model.theme.warning,
        FileStatus::Renamed => model.theme.primary,
    }
}

fn draw_diff_header(model: &Model, buffer: &mut OptimizedBuffer, area: Rect, diff: &FileDiff) {
    let theme = &model.theme;
    let y = area.y;
    let name = match &diff.old_file_name {
        Some(old) if *old != diff.file_name => format!("{old} → {}", diff.file_name),
        _ => diff.file_name.clone(),
    };
    let status = diff.status.as_str();
    let name_width = area.width.saturating_sub(display_width(status) as u32 + 5) as usize;

    let mut x = draw_text_advance(
        buffer,
        area.x + 1,
        y,
        &truncate_path(&name, name_width),
        theme.style_foreground().with_bold(),
    );
    draw_badge(
        buffer,
        x + 2,
        y,
        status,
        status_color(model, diff.status),
        theme.background,
    );

    let y = y + 1;
    x = draw_text_advance(
        buffer,
        area.x + 1,
        y,
        &format!("+{} additions", diff.additions),
        Style::fg(theme.diff.added),
    );
    x = draw_text_advance(buffer, x, y, "  ", theme.style_muted());
    x = draw_text_advance(
        buffer,
        x,
        y,
        &format!("-{} deletions", diff.deletions),
        Style::fg(theme.diff.removed),
    );
    if let Some(language) = &diff.language {
        x = draw_text_advance(buffer, x, y, &format!("  {language}"), theme.style_muted());
    }
    let comments = model.filtered_reviews().len();
    if comments > 0 {
        let label = if comments == 1 { "comment" } else { "comments" };
        draw_text_advance(
            buffer,
            x,
            y,
            &format!("  {comments} {label}"),
            Style::fg(theme.warning),
        );
    }
}

fn draw_stream(model: &Model, buffer: &mut OptimizedBuffer, area: Rect) {
    let theme = &model.theme;
    let comments = model.filtered_reviews();
    let rows = main_stream(model, &comments);
    let viewport = layout::main_viewport_height(model.height).min(area.height as usize);

    if rows.is_empty() {
        draw_centered_lines(
            buffer,
            area,
            &[("No lines to show", theme.style_muted())],
        );
        return;
    }

    for (i, row) in rows.iter().skip(model.diff_scroll).take(viewport).enumerate() {
        let row_area = Rect::new(area.x, area.y + i as u32, area.width, 1);
        draw_row(model, buffer, row_area, row);
    }

    if rows.len() > viewport {
        let end = (model.diff_scroll + viewport).min(rows.len());
        let indicator = format!(" {}-{}/{} ", model.diff_scroll + 1, end, rows.len());
        let width = display_width(&indicator) as u32;
        // bottom border of the pane
        let y = area.y + area.height;
        if area.width > width + 2 {
            buffer.draw_text(
                area.x + area.width - width - 1,
                y,
                &indicator,
                theme.style_muted(),
            );
        }
    }
}

fn draw_row(model: &Model, buffer: &mut OptimizedBuffer, area: Rect, row: &StreamRow<'_>) {
    let theme = &model.theme;
    match row {
        StreamRow::Section(title) => {
            draw_text_truncated(
                buffer,
                area.x + 1,
                area.y,
                title,
                area.width.saturating_sub(2),
                theme.style_foreground().with_bold(),
            );
        }
        StreamRow::Hunk(line) => {
            buffer.fill_rect(area.x, area.y, area.width, 1, theme.diff.hunk_header_bg);
            draw_text_truncated(
                buffer,
                area.x + 1,
                area.y,
                &line.content,
                area.width.saturating_sub(2),
                Style::fg(theme.diff.hunk_header).with_bg(theme.diff.hunk_header_bg),
            );
        }
        StreamRow::Line { index, line } => draw_diff_line(model, buffer, area, *index, line),
        StreamRow::Gap => {}
        StreamRow::CommentHeader(_)
        | StreamRow::CommentText { .. }
        | StreamRow::SuggestionToggle { .. }
        | StreamRow::SuggestionText { .. }
        | StreamRow::CommentFooter(_) => draw_card_row(model, buffer, area, row),
    }
}

fn line_number(number: Option<u32>) -> String {
    number.map_or_else(
        || " ".repeat(LINE_NUM_WIDTH as usize),
        |n| format!("{n:>width$}", width = LINE_NUM_WIDTH as usize),
    )
}

fn draw_diff_line(
    model: &Model,
    buffer: &mut OptimizedBuffer,
    area: Rect,
    index: usize,
    line: &DiffLine,
) {
    let diff_theme = &model.theme.diff;
    let (fg, bg, number_bg) = match line.kind {
        DiffLineKind::Add => (diff_theme.added, diff_theme.added_bg, diff_theme.added_line_number_bg),
        DiffLineKind::Remove => (
            diff_theme.removed,
            diff_theme.removed_bg,
            diff_theme.removed_line_number_bg,
        ),
        DiffLineKind::Context | DiffLineKind::Header => {
            (diff_theme.context, diff_theme.context_bg, diff_theme.context_bg)
        }
    };

    buffer.fill_rect(area.x, area.y, area.width, 1, bg);
    let gutter = format!(
        "{} {} ",
        line_number(line.old_line_number),
        line_number(line.new_line_number)
    );
    let x = draw_text_advance(
        buffer,
        area.x,
        area.y,
        &gutter,
        Style::fg(diff_theme.line_number).with_bg(number_bg),
    );
    let x = draw_text_advance(buffer, x, area.y, line.kind.symbol(), Style::fg(fg).with_bg(bg));
    let content_x = x + 1;
    let content_width = area.width.saturating_sub(GUTTER_WIDTH);
    if content_width == 0 {
        return;
    }

    let spans = model
        .highlighted_lines
        .get(index)
        .filter(|spans| !spans.is_empty());
    let Some(spans) = spans else {
        draw_text_truncated(buffer, content_x, area.y, &line.content, content_width, Style::fg(fg).with_bg(bg));
        return;
    };

    let end = content_x + content_width;
    let mut cursor = content_x;
    for span in spans {
        if cursor >= end {
            break;
        }
        let mut style = Style::fg(span.fg).with_bg(bg);
        if span.bold {
            style = style.with_bold();
        }
        let room = end - cursor;
        let width = display_width(&span.text) as u32;
        if width > room {
            let visible: String = span.text.chars().take(room as usize).collect();
            buffer.draw_text(cursor, area.y, &visible, style);
            break;
        }
        cursor = draw_text_advance(buffer, cursor, area.y, &span.text, style);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::UiConfig;
    use crate::upload::UploadedFile;
    use crate::view::components::{row_text, screen_text};
    use chrono::Utc;
    use std::path::PathBuf;

    fn render(model: &Model) -> OptimizedBuffer {
        let mut buffer = OptimizedBuffer::new(100, 30);
        view(model, &mut buffer, Rect::new(0, 0, 100, 30));
        buffer
    }

    fn edited_upload() -> Model {
        let mut model = Model::new(100, 30, UiConfig::default());
        model.accept_uploads(vec![UploadedFile {
            id: "u1".to_string(),
            name: "lib.rs".to_string(),
            path: PathBuf::from("lib.rs"),
            content: "let x = 1;".to_string(),
            language: "rust".to_string(),
            timestamp: Utc::now(),
        }]);
        model.update_uploaded_file("u1", "let x = 2;\nlet y = 3;");
        model.set_selected_file(Some("u1"));
        model
    }

    #[test]
    fn header_shows_counts_status_and_language() {
        let model = edited_upload();
        let buffer = render(&model);

        let title = row_text(&buffer, 1);
        assert!(title.contains("lib.rs"), "{title}");
        assert!(title.contains("[modified]"), "{title}");

        let stats = row_text(&buffer, 2);
        assert!(stats.contains("+2 additions"), "{stats}");
        assert!(stats.contains("-1 deletions"), "{stats}");
        assert!(stats.contains("rust"), "{stats}");
    }

    #[test]
    fn diff_rows_carry_gutter_symbols() {
        let model = edited_upload();
        let screen = screen_text(&render(&model));

        assert!(screen.iter().any(|row| row.contains("@@ -1,1 +1,2 @@")));
        let removed = screen.iter().find(|row| row.contains("- let x = 1;")).unwrap();
        assert!(removed.contains("    1       -"), "{removed}");
        let added = screen.iter().find(|row| row.contains("+ let y = 3;")).unwrap();
        assert!(added.contains("          2 +"), "{added}");
        assert!(screen.iter().any(|row| row.contains("+ let x = 2;")));
    }

    #[test]
    fn upload_mode_without_files_shows_instructions() {
        let mut model = Model::new(100, 30, UiConfig::default());
        model.upload_mode = true;
        let screen = screen_text(&render(&model));
        assert!(screen.iter().any(|row| row.contains("Upload files to review")));
    }

    #[test]
    fn line_numbers_are_right_aligned() {
        assert_eq!(line_number(Some(7)), "    7");
        assert_eq!(line_number(Some(12345)), "12345");
        assert_eq!(line_number(None), "     ");
    }
}
