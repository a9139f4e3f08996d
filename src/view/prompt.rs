//! Upload path prompt

use opentui::{OptimizedBuffer, Style};

use super::components::{dim_rect, draw_box, draw_text_truncated, Rect};
use crate::layout::PROMPT_WIDTH;
use crate::model::Model;
use crate::text::display_width;

const MODAL_HEIGHT: u32 = 7;

pub fn view(model: &Model, buffer: &mut OptimizedBuffer, screen: Rect) {
    let theme = &model.theme;
    dim_rect(buffer, screen, 0.35);

    let width = u32::from(PROMPT_WIDTH).min(screen.width.saturating_sub(4));
    let area = screen.centered(width, MODAL_HEIGHT);
    if area.width < 10 || area.height < MODAL_HEIGHT {
        return;
    }

    buffer.fill_rect(area.x, area.y, area.width, area.height, theme.panel_bg);
    draw_box(buffer, area, theme.border_focused, Some("Upload Files"), theme.foreground);
    let inner = area.inner();
    let x = inner.x + 1;
    let text_width = inner.width.saturating_sub(2);

    draw_text_truncated(
        buffer,
        x,
        inner.y,
        "File paths, separated by spaces:",
        text_width,
        theme.style_foreground_on(theme.panel_bg),
    );

    let field_y = inner.y + 2;
    let field_bg = crate::color::color_lerp(theme.panel_bg, theme.background, 0.6);
    buffer.fill_rect(x, field_y, text_width, 1, field_bg);
    // show the tail of long input so the cursor stays visible
    let room = text_width.saturating_sub(3) as usize;
    let skip = display_width(&model.upload_input).saturating_sub(room);
    let visible: String = model.upload_input.chars().skip(skip).collect();
    buffer.draw_text(x + 1, field_y, &visible, theme.style_foreground_on(field_bg));
    let cursor_x = x + 1 + display_width(&visible) as u32;
    buffer.draw_text(cursor_x, field_y, "▏", Style::fg(theme.primary).with_bg(field_bg));

    draw_text_truncated(
        buffer,
        x,
        inner.y + 4,
        "enter upload  esc cancel  (directories are skipped)",
        text_width,
        theme.style_muted_on(theme.panel_bg),
    );
}
