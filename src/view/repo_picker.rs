//! Repository picker overlay

use opentui::{OptimizedBuffer, Style};

use super::components::{dim_rect, draw_text_truncated, Rect};
use crate::layout::PICKER_WIDTH;
use crate::model::{Loadable, Model};
use crate::text::display_width;

const TEXT_INDENT: u32 = 3;
/// Two rows per repository: name and description.
const ROWS_PER_REPO: u32 = 2;

pub fn view(model: &Model, buffer: &mut OptimizedBuffer, screen: Rect) {
    let theme = &model.theme;
    dim_rect(buffer, screen, 0.35);

    let repos = match &model.repositories {
        Loadable::Ready(repos) => repos.as_slice(),
        _ => &[],
    };

    let modal_width = u32::from(PICKER_WIDTH).min(screen.width.saturating_sub(4));
    let list_height = (repos.len() as u32).max(1) * ROWS_PER_REPO;
    // blank + title + blank + list + blank
    let modal_height = (3 + list_height + 1).min(screen.height.saturating_sub(2));
    let modal_x = screen.x + (screen.width.saturating_sub(modal_width)) / 2;
    let modal_y = screen.y + screen.height / 5;
    if modal_width < 8 || modal_height < 4 {
        return;
    }

    buffer.fill_rect(modal_x, modal_y, modal_width, modal_height, theme.panel_bg);
    let text_x = modal_x + TEXT_INDENT;
    let text_width = modal_width.saturating_sub(TEXT_INDENT * 2);

    let mut y = modal_y + 1;
    buffer.draw_text(
        text_x,
        y,
        "Select Repository",
        theme.style_foreground_on(theme.panel_bg).with_bold(),
    );
    let esc = "esc";
    buffer.draw_text(
        modal_x + modal_width - TEXT_INDENT - display_width(esc) as u32,
        y,
        esc,
        theme.style_muted_on(theme.panel_bg),
    );
    y += 2;

    let list_max = modal_y + modal_height - 1;
    let empty = match &model.repositories {
        Loadable::Idle | Loadable::Loading => Some("Loading repositories..."),
        Loadable::Failed(_) => Some("Unable to load repositories"),
        Loadable::Ready(repos) if repos.is_empty() => Some("No repositories available"),
        Loadable::Ready(_) => None,
    };
    if let Some(message) = empty {
        draw_text_truncated(buffer, text_x, y, message, text_width, theme.style_muted_on(theme.panel_bg));
        return;
    }

    // keep the highlighted entry on screen
    let capacity = ((list_max - y) / ROWS_PER_REPO).max(1) as usize;
    let first = (model.repo_picker_index + 1).saturating_sub(capacity);

    for (idx, repo) in repos.iter().enumerate().skip(first) {
        if y + ROWS_PER_REPO > list_max {
            break;
        }
        let selected = idx == model.repo_picker_index;
        let current = model.selected_repo.as_deref() == Some(repo.id.as_str());
        let bg = if selected { theme.selection_bg } else { theme.panel_bg };
        let fg = if selected { theme.selection_fg } else { theme.foreground };

        buffer.fill_rect(modal_x + 1, y, modal_width - 2, ROWS_PER_REPO, bg);
        let marker = if current { "● " } else { "  " };
        buffer.draw_text(text_x - 2, y, marker, Style::fg(theme.success).with_bg(bg));
        draw_text_truncated(
            buffer,
            text_x,
            y,
            &format!("{}  ({})", repo.full_name(), repo.branch),
            text_width,
            Style::fg(fg).with_bg(bg).with_bold(),
        );
        draw_text_truncated(
            buffer,
            text_x,
            y + 1,
            &repo.description,
            text_width,
            theme.style_muted_on(bg),
        );
        y += ROWS_PER_REPO;
    }
}
