//! Comment card rendering

use std::fmt::Display;

use chrono::{DateTime, Local, TimeZone};
use opentui::{OptimizedBuffer, Style};

use super::components::{draw_severity_badge, draw_text_advance, draw_text_truncated, Rect};
use crate::layout::{COMMENT_H_PAD, COMMENT_INDENT};
use crate::model::Model;
use crate::stream::StreamRow;
use crate::text::display_width;
use crate::types::{Confidence, ReviewComment};

/// `Jan 5, 2025, 02:30 PM` in the timestamp's own zone. Cards pass local time.
#[must_use]
pub fn format_timestamp<Tz: TimeZone>(timestamp: &DateTime<Tz>) -> String
where
    Tz::Offset: Display,
{
    timestamp.format("%b %-d, %Y, %I:%M %p").to_string()
}

/// Draw one row of a comment card. `area` is the full row of the pane.
pub fn draw_card_row(model: &Model, buffer: &mut OptimizedBuffer, area: Rect, row: &StreamRow<'_>) {
    let Some(comment) = row.comment() else {
        return;
    };
    let theme = &model.theme;
    let focused = model.focused_comment.as_deref() == Some(comment.id.as_str());

    let card_x = area.x + COMMENT_INDENT;
    let card_width = area.width.saturating_sub(COMMENT_INDENT);
    if card_width < 4 {
        return;
    }
    let bg = if focused {
        crate::color::color_lerp(theme.severity_bg(comment.severity), theme.selection_bg, 0.5)
    } else {
        theme.severity_bg(comment.severity)
    };
    let accent = theme.severity_color(comment.severity);

    buffer.fill_rect(card_x, area.y, card_width, 1, bg);
    let bar = if focused { "┃" } else { "▌" };
    buffer.draw_text(card_x, area.y, bar, Style::fg(accent).with_bg(bg));

    let x = card_x + 1 + COMMENT_H_PAD;
    let width = card_width.saturating_sub(1 + COMMENT_H_PAD * 2);

    match row {
        StreamRow::CommentHeader(_) => draw_header(model, buffer, x, area.y, width, comment, bg),
        StreamRow::CommentText { text, .. } => {
            draw_text_truncated(buffer, x, area.y, text, width, theme.style_foreground_on(bg));
        }
        StreamRow::SuggestionToggle { expanded, .. } => {
            let label = if *expanded {
                "▼ View Suggestion"
            } else {
                "▶ View Suggestion"
            };
            draw_text_truncated(buffer, x, area.y, label, width, theme.style_primary_on(bg));
        }
        StreamRow::SuggestionText { text, .. } => {
            let code_bg = theme.panel_bg;
            buffer.fill_rect(x, area.y, width, 1, code_bg);
            draw_text_truncated(
                buffer,
                x + 1,
                area.y,
                text,
                width.saturating_sub(2),
                Style::fg(theme.success).with_bg(code_bg),
            );
        }
        StreamRow::CommentFooter(_) => {
            draw_text_truncated(
                buffer,
                x,
                area.y,
                &format_timestamp(&comment.timestamp.with_timezone(&Local)),
                width,
                theme.style_muted_on(bg),
            );
        }
        _ => {}
    }
}

fn draw_header(
    model: &Model,
    buffer: &mut OptimizedBuffer,
    x: u32,
    y: u32,
    width: u32,
    comment: &ReviewComment,
    bg: opentui::Rgba,
) {
    let theme = &model.theme;
    let end = x + width;

    let mut cursor = draw_severity_badge(buffer, x, y, theme, comment.severity, bg);
    cursor = draw_text_advance(buffer, cursor, y, "  ", theme.style_muted_on(bg));
    if cursor + display_width(&comment.category) as u32 <= end {
        cursor = draw_text_advance(
            buffer,
            cursor,
            y,
            &comment.category,
            theme.style_foreground_on(bg).with_bold(),
        );
    }
    let line = format!("  Line {}", comment.line_number);
    if cursor + display_width(&line) as u32 <= end {
        cursor = draw_text_advance(buffer, cursor, y, &line, theme.style_muted_on(bg));
    }

    // file name only shows in the all-comments list
    if model.selected_file.is_none() {
        let file = format!("  {}", comment.file_name);
        if cursor + display_width(&file) as u32 <= end {
            cursor = draw_text_advance(buffer, cursor, y, &file, theme.style_primary_on(bg));
        }
    }

    let confidence = format!("AI Confidence: {}", comment.confidence_percent());
    let confidence_color = match comment.confidence() {
        Confidence::High => theme.success,
        Confidence::Medium => theme.warning,
        Confidence::Low => theme.muted,
    };
    let confidence_width = display_width(&confidence) as u32;
    if cursor + 2 + confidence_width <= end {
        buffer.draw_text(
            end - confidence_width,
            y,
            &confidence,
            Style::fg(confidence_color).with_bg(bg),
        );
    }
}
