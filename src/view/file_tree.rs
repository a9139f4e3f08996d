//! File tree panel

use opentui::{OptimizedBuffer, Style};

use super::components::{draw_box, draw_hline, draw_skeleton, draw_text_truncated, Rect};
use crate::layout::{self, TREE_HEADER_HEIGHT, TREE_INDENT};
use crate::model::{Focus, Loadable, Model, TreeRow};
use crate::text::display_width;
use crate::types::{count_files, count_files_with_issues, FileKind};

pub fn view(model: &Model, buffer: &mut OptimizedBuffer, area: Rect) {
    let theme = &model.theme;
    buffer.fill_rect(area.x, area.y, area.width, area.height, theme.panel_bg);
    let border = if model.focus == Focus::FileTree {
        theme.border_focused
    } else {
        theme.border
    };
    draw_box(buffer, area, border, Some("Files"), theme.foreground);

    let inner = area.inner();
    if inner.width == 0 || inner.height == 0 {
        return;
    }
    let (header, list) = inner.split_top(u32::from(TREE_HEADER_HEIGHT));

    if !model.upload_mode {
        match &model.files {
            Loadable::Idle | Loadable::Loading => {
                draw_skeleton(buffer, list, theme, 8);
                return;
            }
            Loadable::Failed(err) => {
                buffer.draw_text(list.x + 1, list.y, "Unable to load files", Style::fg(theme.error));
                draw_text_truncated(
                    buffer,
                    list.x + 1,
                    list.y + 1,
                    err,
                    list.width.saturating_sub(2),
                    theme.style_muted_on(theme.panel_bg),
                );
                return;
            }
            Loadable::Ready(_) => {}
        }
    }

    let tree = model.file_tree();
    let stats = format!(
        "{} files • {} with issues",
        count_files(&tree),
        count_files_with_issues(&tree)
    );
    draw_text_truncated(
        buffer,
        header.x + 1,
        header.y,
        &stats,
        header.width.saturating_sub(2),
        theme.style_muted_on(theme.panel_bg),
    );
    draw_hline(buffer, header.x, header.y + 1, header.width, theme.border);

    let rows = model.tree_rows();
    if rows.is_empty() {
        let message = if model.upload_mode {
            "No files uploaded"
        } else if model.filters.show_only_files_with_issues {
            "No files with issues"
        } else {
            "No files found"
        };
        buffer.draw_text(
            list.x + 1,
            list.y,
            message,
            theme.style_muted_on(theme.panel_bg),
        );
        return;
    }

    let cursor = model.tree_cursor_index(&rows);
    let visible = layout::tree_viewport_height(model.height).min(list.height as usize);
    for (i, row) in rows.iter().enumerate().skip(model.tree_scroll).take(visible) {
        let y = list.y + (i - model.tree_scroll) as u32;
        draw_row(model, buffer, Rect::new(list.x, y, list.width, 1), row, cursor == Some(i));
    }
}

fn draw_row(model: &Model, buffer: &mut OptimizedBuffer, area: Rect, row: &TreeRow, on_cursor: bool) {
    let theme = &model.theme;
    let selected = model.selected_file.as_deref() == Some(row.id.as_str());
    let (fg, bg) = if on_cursor {
        (theme.selection_fg, theme.selection_bg)
    } else if selected {
        (theme.primary, theme.panel_bg)
    } else {
        (theme.foreground, theme.panel_bg)
    };
    buffer.fill_rect(area.x, area.y, area.width, 1, bg);

    let indent = (row.depth * TREE_INDENT) as u32 + 1;
    let (marker, label, style) = match row.kind {
        FileKind::Directory => (
            if row.expanded { "▾ " } else { "▸ " },
            format!("{}/", row.name),
            Style::fg(theme.primary).with_bg(bg).with_bold(),
        ),
        FileKind::File if selected => ("  ", row.name.clone(), Style::fg(fg).with_bg(bg).with_bold()),
        FileKind::File => ("  ", row.name.clone(), Style::fg(fg).with_bg(bg)),
    };

    let badge = (row.kind == FileKind::File && row.comment_count > 0)
        .then(|| format!(" {} ", row.comment_count));
    let badge_width = badge.as_deref().map_or(0, |b| display_width(b) as u32 + 1);

    let x = area.x + indent;
    buffer.draw_text(x, area.y, marker, Style::fg(theme.muted).with_bg(bg));
    let name_x = x + 2;
    let room = (area.x + area.width).saturating_sub(name_x + badge_width);
    draw_text_truncated(buffer, name_x, area.y, &label, room, style);

    if let Some(badge) = badge {
        let width = display_width(&badge) as u32;
        if area.width > width + indent + 4 {
            buffer.draw_text(
                area.x + area.width - width - 1,
                area.y,
                &badge,
                Style::fg(theme.background).with_bg(theme.warning).with_bold(),
            );
        }
    }
}
