//! Centralized layout constants and derived sizes.
//!
//! Shared by the view and by `update`, which needs viewport heights to
//! clamp scrolling and keep selections on screen.

use crate::model::Model;

// --- Frame ---

pub const HEADER_HEIGHT: u16 = 3;
pub const TOOLBAR_HEIGHT: u16 = 3;
pub const HELP_BAR_HEIGHT: u16 = 1;

// --- File tree panel ---

/// Title and stats rows above the tree.
pub const TREE_HEADER_HEIGHT: u16 = 2;
pub const TREE_INDENT: usize = 2;

// --- Diff pane ---

/// File name row and stats row above the diff lines.
pub const DIFF_HEADER_HEIGHT: u16 = 2;
pub const LINE_NUM_WIDTH: u32 = 5;
/// old number, space, new number, space, symbol, space
pub const GUTTER_WIDTH: u32 = LINE_NUM_WIDTH * 2 + 4;

// --- Comment cards ---

pub const COMMENT_INDENT: u32 = 4;
pub const COMMENT_H_PAD: u32 = 2;

// --- Overlays ---

pub const PICKER_WIDTH: u16 = 64;
pub const PROMPT_WIDTH: u16 = 72;

/// Rows between the toolbar and the help bar.
#[must_use]
pub const fn body_height(total_height: u16) -> u16 {
    total_height.saturating_sub(HEADER_HEIGHT + TOOLBAR_HEIGHT + HELP_BAR_HEIGHT)
}

/// Rows available for diff or comment rows inside the main pane border.
#[must_use]
pub const fn main_viewport_height(total_height: u16) -> usize {
    body_height(total_height).saturating_sub(2 + DIFF_HEADER_HEIGHT) as usize
}

/// Rows available for tree entries inside the file panel border.
#[must_use]
pub const fn tree_viewport_height(total_height: u16) -> usize {
    body_height(total_height).saturating_sub(2 + TREE_HEADER_HEIGHT) as usize
}

/// Left edge and width of the main pane.
#[must_use]
pub const fn main_pane_columns(model: &Model) -> (u32, u32) {
    let x = if model.sidebar_shown() {
        model.layout_mode.sidebar_width() as u32
    } else {
        0
    };
    (x, (model.width as u32).saturating_sub(x))
}

/// Width inside the main pane border.
#[must_use]
pub const fn main_inner_width(model: &Model) -> u32 {
    main_pane_columns(model).1.saturating_sub(2)
}

/// Width for wrapped comment text inside a card.
#[must_use]
pub const fn comment_wrap_width(inner_width: u32) -> usize {
    inner_width.saturating_sub(COMMENT_INDENT + 1 + COMMENT_H_PAD * 2) as usize
}
