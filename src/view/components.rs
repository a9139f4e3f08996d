//! Reusable UI components

use opentui::buffer::BoxStyle;
use opentui::{OptimizedBuffer, Rgba, Style};

use crate::text::{display_width, truncate};
use crate::theme::Theme;
use crate::types::Severity;

/// A rectangular area for layout
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl Rect {
    #[must_use]
    pub const fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Create from terminal dimensions
    #[must_use]
    pub const fn from_size(width: u16, height: u16) -> Self {
        Self::new(0, 0, width as u32, height as u32)
    }

    /// Inner area after removing border (1 cell on each side)
    #[must_use]
    pub const fn inner(&self) -> Self {
        Self {
            x: self.x + 1,
            y: self.y + 1,
            width: self.width.saturating_sub(2),
            height: self.height.saturating_sub(2),
        }
    }

    /// Split horizontally at a given width from left
    #[must_use]
    pub const fn split_left(&self, width: u32) -> (Self, Self) {
        let width = if width > self.width { self.width } else { width };
        let left = Self {
            x: self.x,
            y: self.y,
            width,
            height: self.height,
        };
        let right = Self {
            x: self.x + width,
            y: self.y,
            width: self.width - width,
            height: self.height,
        };
        (left, right)
    }

    /// Split vertically at a given height from top
    #[must_use]
    pub const fn split_top(&self, height: u32) -> (Self, Self) {
        let height = if height > self.height {
            self.height
        } else {
            height
        };
        let top = Self {
            x: self.x,
            y: self.y,
            width: self.width,
            height,
        };
        let bottom = Self {
            x: self.x,
            y: self.y + height,
            width: self.width,
            height: self.height - height,
        };
        (top, bottom)
    }

    /// A `width` x `height` area centered in this one.
    #[must_use]
    pub fn centered(&self, width: u32, height: u32) -> Self {
        let width = width.min(self.width);
        let height = height.min(self.height);
        Self {
            x: self.x + (self.width - width) / 2,
            y: self.y + (self.height - height) / 2,
            width,
            height,
        }
    }
}

/// Draw a bordered box with optional title
pub fn draw_box(
    buffer: &mut OptimizedBuffer,
    area: Rect,
    border_color: Rgba,
    title: Option<&str>,
    title_color: Rgba,
) {
    if area.width < 2 || area.height < 2 {
        return;
    }
    buffer.draw_box(
        area.x,
        area.y,
        area.width,
        area.height,
        BoxStyle::rounded(Style::fg(border_color)),
    );

    if let Some(title) = title {
        let title_str = truncate(&format!(" {title} "), area.width.saturating_sub(4) as usize);
        buffer.draw_text(
            area.x + 2,
            area.y,
            &title_str,
            Style::fg(title_color).with_bold(),
        );
    }
}

/// Draw text, truncating with an ellipsis if necessary
pub fn draw_text_truncated(
    buffer: &mut OptimizedBuffer,
    x: u32,
    y: u32,
    text: &str,
    max_width: u32,
    style: Style,
) {
    if max_width == 0 {
        return;
    }
    buffer.draw_text(x, y, &truncate(text, max_width as usize), style);
}

/// Draw text and return the column just past it.
pub fn draw_text_advance(
    buffer: &mut OptimizedBuffer,
    x: u32,
    y: u32,
    text: &str,
    style: Style,
) -> u32 {
    buffer.draw_text(x, y, text, style);
    x + display_width(text) as u32
}

/// Draw a horizontal line
pub fn draw_hline(buffer: &mut OptimizedBuffer, x: u32, y: u32, width: u32, color: Rgba) {
    let line = "─".repeat(width as usize);
    buffer.draw_text(x, y, &line, Style::fg(color));
}

/// Draw a badge like `[modified]`, returning the column after it.
pub fn draw_badge(
    buffer: &mut OptimizedBuffer,
    x: u32,
    y: u32,
    text: &str,
    fg: Rgba,
    bg: Rgba,
) -> u32 {
    let badge = format!("[{text}]");
    draw_text_advance(buffer, x, y, &badge, Style::fg(fg).with_bg(bg))
}

/// Draw `icon label` in the severity color, returning the column after it.
pub fn draw_severity_badge(
    buffer: &mut OptimizedBuffer,
    x: u32,
    y: u32,
    theme: &Theme,
    severity: Severity,
    bg: Rgba,
) -> u32 {
    let text = format!("{} {}", severity.icon(), severity.label());
    draw_text_advance(
        buffer,
        x,
        y,
        &text,
        Style::fg(theme.severity_color(severity)).with_bg(bg).with_bold(),
    )
}

/// Placeholder bars shown while a query is loading.
pub fn draw_skeleton(buffer: &mut OptimizedBuffer, area: Rect, theme: &Theme, rows: u32) {
    let bar = crate::color::color_lerp(theme.panel_bg, theme.muted, 0.25);
    for i in 0..rows.min(area.height / 2) {
        // vary bar lengths so the placeholder reads as text
        let width = area.width.saturating_sub(2) * (60 + (i * 17) % 35) / 100;
        buffer.fill_rect(area.x + 1, area.y + i * 2, width, 1, bar);
    }
}

/// Truncate a path for display, keeping the filename visible
#[must_use]
pub fn truncate_path(path: &str, max_width: usize) -> String {
    if display_width(path) <= max_width {
        return path.to_string();
    }

    if let Some((_, filename)) = path.rsplit_once('/') {
        let name_width = display_width(filename);
        if name_width + 4 <= max_width {
            let available = max_width - name_width - 4;
            let prefix: String = path.chars().take(available).collect();
            return format!("{prefix}.../{filename}");
        }
    }

    truncate(path, max_width)
}

/// Dim the cells in `area` by scaling both fg and bg colors.
pub fn dim_rect(buffer: &mut OptimizedBuffer, area: Rect, scale: f32) {
    for row in area.y..area.y + area.height {
        for col in area.x..area.x + area.width {
            if let Some(cell) = buffer.get_mut(col, row) {
                cell.fg = Rgba::new(
                    cell.fg.r * scale,
                    cell.fg.g * scale,
                    cell.fg.b * scale,
                    cell.fg.a,
                );
                cell.bg = Rgba::new(
                    cell.bg.r * scale,
                    cell.bg.g * scale,
                    cell.bg.b * scale,
                    cell.bg.a,
                );
            }
        }
    }
}

/// A label + key hint for the help bar.
pub struct HotkeyHint {
    pub label: &'static str,
    pub key: &'static str,
}

impl HotkeyHint {
    #[must_use]
    pub const fn new(label: &'static str, key: &'static str) -> Self {
        Self { label, key }
    }

    #[must_use]
    pub const fn width(&self) -> usize {
        self.label.len() + 1 + self.key.len()
    }
}

/// Draw a right-aligned row of `label key` pairs. Hints that do not fit
/// are dropped from the end.
pub fn draw_help_bar(buffer: &mut OptimizedBuffer, area: Rect, theme: &Theme, hints: &[HotkeyHint]) {
    buffer.fill_rect(area.x, area.y, area.width, 1, theme.background);
    if hints.is_empty() || area.width == 0 {
        return;
    }

    let separator = "  ";
    let padding = 2usize;
    let available = (area.width as usize).saturating_sub(padding * 2);

    let mut shown = 0usize;
    let mut total_width = 0usize;
    for hint in hints {
        let extra = if shown == 0 { 0 } else { separator.len() };
        if total_width + extra + hint.width() > available {
            break;
        }
        total_width += extra + hint.width();
        shown += 1;
    }
    if shown == 0 {
        return;
    }

    let x_start = area.x + (area.width as usize - padding - total_width) as u32;
    let dim = theme.style_muted();
    let bright = theme.style_foreground();

    let mut x = x_start;
    for (i, hint) in hints.iter().take(shown).enumerate() {
        if i > 0 {
            x = draw_text_advance(buffer, x, area.y, separator, dim);
        }
        x = draw_text_advance(buffer, x, area.y, hint.label, dim);
        x = draw_text_advance(buffer, x, area.y, " ", dim);
        x = draw_text_advance(buffer, x, area.y, hint.key, bright);
    }
}

/// Text of one buffer row, with blank cells as spaces.
#[cfg(test)]
pub(crate) fn row_text(buffer: &OptimizedBuffer, y: u32) -> String {
    use opentui::cell::CellContent;

    (0..buffer.width())
        .map(|x| match buffer.get(x, y) {
            Some(cell) => match cell.content {
                CellContent::Char(c) => c,
                _ => ' ',
            },
            None => ' ',
        })
        .collect()
}

/// Every row of the buffer as text.
#[cfg(test)]
pub(crate) fn screen_text(buffer: &OptimizedBuffer) -> Vec<String> {
    (0..buffer.height()).map(|y| row_text(buffer, y)).collect()
}
