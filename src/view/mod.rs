//! View rendering

mod comments;
mod components;
mod dashboard;
mod diff_viewer;
mod file_tree;
mod prompt;
mod repo_picker;

use opentui::OptimizedBuffer;

use crate::layout::{HEADER_HEIGHT, HELP_BAR_HEIGHT, TOOLBAR_HEIGHT};
use crate::model::{Focus, Model};

pub use comments::format_timestamp;
pub use components::Rect;

/// Render the current model state to the buffer
pub fn view(model: &Model, buffer: &mut OptimizedBuffer) {
    let screen = Rect::from_size(model.width, model.height);
    buffer.fill_rect(
        screen.x,
        screen.y,
        screen.width,
        screen.height,
        model.theme.background,
    );

    let (header, rest) = screen.split_top(u32::from(HEADER_HEIGHT));
    let (toolbar, rest) = rest.split_top(u32::from(TOOLBAR_HEIGHT));
    let (body, help) = rest.split_top(rest.height.saturating_sub(u32::from(HELP_BAR_HEIGHT)));

    dashboard::draw_header(model, buffer, header);
    dashboard::draw_toolbar(model, buffer, toolbar);
    dashboard::draw_body(model, buffer, body);
    dashboard::draw_footer(model, buffer, help);

    match model.focus {
        Focus::RepoPicker => repo_picker::view(model, buffer, screen),
        Focus::UploadPrompt => prompt::view(model, buffer, screen),
        Focus::FileTree | Focus::DiffPane | Focus::Search => {}
    }
}
