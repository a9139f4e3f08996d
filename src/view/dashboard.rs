//! Dashboard chrome: header, toolbar, pane layout and help bar

use opentui::{OptimizedBuffer, Style};

use super::components::{
    draw_help_bar, draw_hline, draw_severity_badge, draw_text_advance, draw_text_truncated,
    HotkeyHint, Rect,
};
use super::diff_viewer::draw_centered_lines;
use super::{diff_viewer, file_tree};
use crate::model::{Focus, LayoutMode, Loadable, Model};
use crate::text::display_width;
use crate::types::Severity;

const SEARCH_PLACEHOLDER: &str = "Search comments by keyword...";
const SEARCH_WIDTH: u32 = 40;

pub fn draw_header(model: &Model, buffer: &mut OptimizedBuffer, area: Rect) {
    let theme = &model.theme;
    if area.height == 0 {
        return;
    }

    let x = draw_text_advance(
        buffer,
        area.x + 2,
        area.y,
        "AI Code Review",
        Style::fg(theme.primary).with_bold(),
    );
    let subtitle = if model.upload_mode {
        "Reviewing your uploaded files"
    } else {
        "Intelligent code analysis powered by machine learning"
    };
    if area.height > 1 {
        draw_text_truncated(
            buffer,
            area.x + 2,
            area.y + 1,
            subtitle,
            area.width.saturating_sub(4),
            theme.style_muted(),
        );
    }

    // severity totals, right-aligned on the title row
    let counts = model.severity_counts();
    let parts: Vec<(Severity, String)> = [Severity::Critical, Severity::Warning, Severity::Info]
        .into_iter()
        .map(|severity| (severity, format!("{} {}", severity.icon(), counts.get(severity))))
        .collect();
    let total: u32 = parts
        .iter()
        .map(|(_, text)| display_width(text) as u32 + 2)
        .sum();
    if area.width > x + total + 4 {
        let mut cursor = area.x + area.width - total - 2;
        for (severity, text) in &parts {
            cursor = draw_text_advance(
                buffer,
                cursor,
                area.y,
                text,
                Style::fg(theme.severity_color(*severity)).with_bold(),
            );
            cursor += 2;
        }
    }

    if area.height > 2 {
        draw_hline(buffer, area.x, area.y + 2, area.width, theme.border);
    }
}

pub fn draw_toolbar(model: &Model, buffer: &mut OptimizedBuffer, area: Rect) {
    if area.height == 0 {
        return;
    }
    draw_source_line(model, buffer, Rect::new(area.x, area.y, area.width, 1));
    if area.height > 1 {
        draw_filter_line(model, buffer, Rect::new(area.x, area.y + 1, area.width, 1));
    }
    if area.height > 2 {
        draw_hline(buffer, area.x, area.y + 2, area.width, model.theme.border);
    }
}

fn draw_source_line(model: &Model, buffer: &mut OptimizedBuffer, area: Rect) {
    let theme = &model.theme;
    let x = area.x + 2;
    let width = area.width.saturating_sub(4);

    if model.upload_mode {
        let count = model.uploaded_files.len();
        let text = if count == 0 {
            "Upload mode: no files yet".to_string()
        } else {
            format!("{count} file(s) uploaded")
        };
        draw_text_truncated(buffer, x, area.y, &text, width, Style::fg(theme.success).with_bold());
        return;
    }

    if let Some(repo) = model.selected_repository() {
        let next = draw_text_advance(
            buffer,
            x,
            area.y,
            &repo.full_name(),
            theme.style_foreground().with_bold(),
        );
        let details = format!(
            "  Branch: {} • Description: {}",
            repo.branch, repo.description
        );
        draw_text_truncated(
            buffer,
            next,
            area.y,
            &details,
            (x + width).saturating_sub(next),
            theme.style_muted(),
        );
        return;
    }

    let (text, style) = match &model.repositories {
        Loadable::Idle | Loadable::Loading => ("Loading repositories...", theme.style_muted()),
        Loadable::Failed(_) => ("Unable to load repositories", Style::fg(theme.error)),
        Loadable::Ready(_) => ("No repository selected", theme.style_muted()),
    };
    draw_text_truncated(buffer, x, area.y, text, width, style);
}

fn draw_filter_line(model: &Model, buffer: &mut OptimizedBuffer, area: Rect) {
    let theme = &model.theme;
    let focused = model.focus == Focus::Search;
    let search_width = SEARCH_WIDTH.min(area.width.saturating_sub(4) / 2);
    let x = area.x + 2;

    let box_bg = crate::color::color_lerp(theme.background, theme.panel_bg, 0.7);
    buffer.fill_rect(x, area.y, search_width, 1, box_bg);
    let prefix = draw_text_advance(buffer, x, area.y, " / ", Style::fg(theme.muted).with_bg(box_bg));
    let room = (x + search_width).saturating_sub(prefix + 1);

    if model.search_input.is_empty() && !focused {
        draw_text_truncated(
            buffer,
            prefix,
            area.y,
            SEARCH_PLACEHOLDER,
            room,
            theme.style_muted_on(box_bg),
        );
    } else {
        // keep the end of a long query visible
        let input_width = display_width(&model.search_input);
        let skip = input_width.saturating_sub(room.saturating_sub(1) as usize);
        let visible: String = model.search_input.chars().skip(skip).collect();
        let end = draw_text_advance(buffer, prefix, area.y, &visible, theme.style_foreground_on(box_bg));
        if focused && end < x + search_width {
            buffer.draw_text(end, area.y, "▏", Style::fg(theme.primary).with_bg(box_bg));
        }
    }

    let mut cursor = x + search_width + 3;
    let end = area.x + area.width;
    let counts = model.severity_counts();
    for (key, severity) in [('1', Severity::Critical), ('2', Severity::Warning), ('3', Severity::Info)] {
        let active = model.filters.is_severity_active(severity);
        let marker = if active { "●" } else { "○" };
        let label = format!("{key} {marker} ");
        let count = format!(" ({})", counts.get(severity));
        let needed = (display_width(&label)
            + display_width(severity.icon())
            + 1
            + severity.label().len()
            + display_width(&count)) as u32;
        if cursor + needed > end {
            return;
        }
        let bg = theme.background;
        let style = if active {
            theme.style_foreground()
        } else {
            theme.style_muted()
        };
        cursor = draw_text_advance(buffer, cursor, area.y, &label, style);
        cursor = if active {
            draw_severity_badge(buffer, cursor, area.y, theme, severity, bg)
        } else {
            let text = format!("{} {}", severity.icon(), severity.label());
            draw_text_advance(buffer, cursor, area.y, &text, style)
        };
        cursor = draw_text_advance(buffer, cursor, area.y, &count, theme.style_muted());
        cursor += 2;
    }

    if model.filters.show_only_files_with_issues {
        let text = "[issues only]";
        if cursor + display_width(text) as u32 <= end {
            cursor = draw_text_advance(buffer, cursor, area.y, text, Style::fg(theme.warning));
            cursor += 2;
        }
    }

    if !model.filters.is_default() {
        let text = "x reset filters";
        if cursor + display_width(text) as u32 <= end {
            draw_text_advance(buffer, cursor, area.y, text, theme.style_primary());
        }
    }
}

pub fn draw_body(model: &Model, buffer: &mut OptimizedBuffer, area: Rect) {
    if area.width == 0 || area.height == 0 {
        return;
    }
    if model.selected_repo.is_none() && !model.upload_mode {
        draw_welcome(model, buffer, area);
        return;
    }

    let sidebar_width = u32::from(model.layout_mode.sidebar_width());
    if model.sidebar_shown() {
        let (tree, main) = area.split_left(sidebar_width);
        file_tree::view(model, buffer, tree);
        diff_viewer::view(model, buffer, main);
        return;
    }

    diff_viewer::view(model, buffer, area);
    let tree_focused = model.focus == Focus::FileTree
        || (model.focus == Focus::Search && model.previous_focus == Some(Focus::FileTree));
    if tree_focused && model.sidebar_visible {
        match model.layout_mode {
            LayoutMode::Single => file_tree::view(model, buffer, area),
            LayoutMode::Full | LayoutMode::Compact | LayoutMode::Overlay => {
                let (tree, _) = area.split_left(sidebar_width);
                file_tree::view(model, buffer, tree);
            }
        }
    }
}

fn draw_welcome(model: &Model, buffer: &mut OptimizedBuffer, area: Rect) {
    let theme = &model.theme;
    let detail = match &model.repositories {
        Loadable::Ready(repos) if repos.is_empty() => "No repositories available".to_string(),
        Loadable::Ready(repos) => format!("{} repositories available", repos.len()),
        Loadable::Failed(err) => format!("Unable to load repositories: {err}"),
        Loadable::Idle | Loadable::Loading => "Loading repositories...".to_string(),
    };
    draw_centered_lines(
        buffer,
        area,
        &[
            ("Welcome to AI Code Review", Style::fg(theme.primary).with_bold()),
            ("", theme.style_muted()),
            (
                "Select a repository to browse its changes and AI review comments,",
                theme.style_foreground(),
            ),
            ("or upload local files to review them.", theme.style_foreground()),
            ("", theme.style_muted()),
            ("r  choose a repository", theme.style_muted()),
            ("u  switch to upload mode", theme.style_muted()),
            ("q  quit", theme.style_muted()),
            ("", theme.style_muted()),
            (detail.as_str(), theme.style_muted()),
        ],
    );
}

pub fn draw_footer(model: &Model, buffer: &mut OptimizedBuffer, area: Rect) {
    let theme = &model.theme;
    if area.height == 0 {
        return;
    }
    if let Some(message) = &model.flash_message {
        buffer.fill_rect(area.x, area.y, area.width, 1, theme.background);
        draw_text_truncated(
            buffer,
            area.x + 2,
            area.y,
            message,
            area.width.saturating_sub(4),
            Style::fg(theme.warning),
        );
        return;
    }
    draw_help_bar(buffer, area, theme, &hints(model));
}

fn hints(model: &Model) -> Vec<HotkeyHint> {
    match model.focus {
        Focus::Search => vec![
            HotkeyHint::new("apply", "enter"),
            HotkeyHint::new("clear", "esc"),
            HotkeyHint::new("clear line", "ctrl+u"),
        ],
        Focus::UploadPrompt => vec![
            HotkeyHint::new("upload", "enter"),
            HotkeyHint::new("cancel", "esc"),
        ],
        Focus::RepoPicker => vec![
            HotkeyHint::new("move", "j/k"),
            HotkeyHint::new("select", "enter"),
            HotkeyHint::new("close", "esc"),
        ],
        Focus::FileTree => {
            let mut hints = vec![
                HotkeyHint::new("move", "j/k"),
                HotkeyHint::new("open/fold", "enter"),
                HotkeyHint::new("fold", "z"),
                HotkeyHint::new("search", "/"),
                HotkeyHint::new("severity", "1-3"),
            ];
            hints.extend(mode_hints(model));
            hints.push(HotkeyHint::new("quit", "q"));
            hints
        }
        Focus::DiffPane => {
            let mut hints = vec![
                HotkeyHint::new("scroll", "j/k"),
                HotkeyHint::new("comment", "n/p"),
                HotkeyHint::new("suggestion", "enter"),
                HotkeyHint::new("files", "J/K"),
                HotkeyHint::new("search", "/"),
            ];
            hints.extend(mode_hints(model));
            hints.push(HotkeyHint::new("quit", "q"));
            hints
        }
    }
}

fn mode_hints(model: &Model) -> Vec<HotkeyHint> {
    if model.upload_mode {
        vec![
            HotkeyHint::new("add", "a"),
            HotkeyHint::new("refresh", "R"),
            HotkeyHint::new("clear", "C"),
            HotkeyHint::new("repos", "u"),
        ]
    } else {
        vec![
            HotkeyHint::new("repo", "r"),
            HotkeyHint::new("upload", "u"),
            HotkeyHint::new("theme", "t"),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::UiConfig;

    #[test]
    fn hints_follow_focus_and_mode() {
        let mut model = Model::new(120, 40, UiConfig::default());
        let labels = |model: &Model| hints(model).iter().map(|h| h.label).collect::<Vec<_>>();

        assert!(labels(&model).contains(&"repo"));
        model.upload_mode = true;
        assert!(labels(&model).contains(&"add"));
        assert!(!labels(&model).contains(&"repo"));

        model.focus = Focus::Search;
        assert_eq!(labels(&model), vec!["apply", "clear", "clear line"]);
    }
}
