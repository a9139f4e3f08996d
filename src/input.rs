//! Input mapping: events → messages.
//!
//! Pure functions that translate keyboard and resize events into the
//! application's `Message` type. Which keys apply depends on focus.

use opentui::{Event, KeyCode, KeyModifiers};

use crate::message::Message;
use crate::model::{Focus, Model};
use crate::types::Severity;

#[must_use]
pub fn map_event_to_message(model: &Model, event: &Event) -> Message {
    match event {
        Event::Key(key) => map_key(model, key.code, key.modifiers),
        Event::Resize(resize) => Message::Resize {
            width: resize.width.saturating_sub(2).max(1),
            height: resize.height,
        },
        Event::Mouse(_) | Event::Paste(_) | Event::FocusGained | Event::FocusLost => {
            Message::Noop
        }
    }
}

#[must_use]
pub fn map_key(model: &Model, key: KeyCode, modifiers: KeyModifiers) -> Message {
    if modifiers.contains(KeyModifiers::CTRL) {
        match key {
            KeyCode::Char('c') => return Message::Quit,
            KeyCode::Char('r') if !model.focus.is_text_input() => return Message::Reload,
            _ => {}
        }
    }

    match model.focus {
        Focus::Search => map_search_key(key, modifiers),
        Focus::UploadPrompt => map_upload_prompt_key(key, modifiers),
        Focus::RepoPicker => map_repo_picker_key(key),
        Focus::FileTree => map_file_tree_key(model, key).unwrap_or_else(|| map_global_key(key)),
        Focus::DiffPane => map_diff_pane_key(key).unwrap_or_else(|| map_global_key(key)),
    }
}

fn map_search_key(key: KeyCode, modifiers: KeyModifiers) -> Message {
    if modifiers.contains(KeyModifiers::CTRL) {
        return match key {
            KeyCode::Char('u') => Message::SearchClearLine,
            _ => Message::Noop,
        };
    }
    match key {
        KeyCode::Esc => Message::SearchCancel,
        KeyCode::Enter => Message::SearchSubmit,
        KeyCode::Backspace => Message::SearchBackspace,
        KeyCode::Char(c) => Message::SearchInput(c.to_string()),
        _ => Message::Noop,
    }
}

fn map_upload_prompt_key(key: KeyCode, modifiers: KeyModifiers) -> Message {
    if modifiers.contains(KeyModifiers::CTRL) {
        return Message::Noop;
    }
    match key {
        KeyCode::Esc => Message::UploadCancel,
        KeyCode::Enter => Message::UploadSubmit,
        KeyCode::Backspace => Message::UploadBackspace,
        KeyCode::Char(c) => Message::UploadInput(c.to_string()),
        _ => Message::Noop,
    }
}

fn map_repo_picker_key(key: KeyCode) -> Message {
    match key {
        KeyCode::Esc | KeyCode::Char('q') => Message::CloseRepoPicker,
        KeyCode::Char('j') | KeyCode::Down => Message::RepoPickerDown,
        KeyCode::Char('k') | KeyCode::Up => Message::RepoPickerUp,
        KeyCode::Enter => Message::RepoPickerConfirm,
        _ => Message::Noop,
    }
}

fn map_file_tree_key(model: &Model, key: KeyCode) -> Option<Message> {
    Some(match key {
        KeyCode::Char('j') | KeyCode::Down => Message::TreeCursorDown,
        KeyCode::Char('k') | KeyCode::Up => Message::TreeCursorUp,
        KeyCode::Enter | KeyCode::Char('l') => model
            .tree_cursor_directory()
            .map_or(Message::ToggleFocus, Message::ToggleDirectory),
        KeyCode::Char('z') => Message::ToggleParentDirectory,
        KeyCode::Char('Z') => Message::ExpandAll,
        _ => return None,
    })
}

fn map_diff_pane_key(key: KeyCode) -> Option<Message> {
    Some(match key {
        KeyCode::Char('j') | KeyCode::Down => Message::ScrollDown,
        KeyCode::Char('k') | KeyCode::Up => Message::ScrollUp,
        KeyCode::Char('g') | KeyCode::Home => Message::ScrollTop,
        KeyCode::Char('G') | KeyCode::End => Message::ScrollBottom,
        KeyCode::Char('b') | KeyCode::PageUp => Message::PageUp,
        KeyCode::Char('f') | KeyCode::PageDown => Message::PageDown,
        KeyCode::Char('n') => Message::NextComment,
        KeyCode::Char('p' | 'N') => Message::PrevComment,
        KeyCode::Enter | KeyCode::Char(' ') => Message::ToggleSuggestion,
        KeyCode::Esc | KeyCode::Char('h') => Message::ToggleFocus,
        _ => return None,
    })
}

/// Keys that work in both panes.
fn map_global_key(key: KeyCode) -> Message {
    match key {
        KeyCode::Char('q') => Message::Quit,
        KeyCode::Tab => Message::ToggleFocus,
        KeyCode::Char('J') => Message::NextFile,
        KeyCode::Char('K') => Message::PrevFile,
        KeyCode::Char('/') => Message::SearchActivate,
        KeyCode::Char('1') => Message::ToggleSeverity(Severity::Critical),
        KeyCode::Char('2') => Message::ToggleSeverity(Severity::Warning),
        KeyCode::Char('3') => Message::ToggleSeverity(Severity::Info),
        KeyCode::Char('i') => Message::ToggleFilesWithIssues,
        KeyCode::Char('x') => Message::ResetFilters,
        KeyCode::Char('r') => Message::OpenRepoPicker,
        KeyCode::Char('u') => Message::ToggleUploadMode,
        KeyCode::Char('a') => Message::OpenUploadPrompt,
        KeyCode::Char('R') => Message::RefreshUploadedFile,
        KeyCode::Char('C') => Message::ClearUploads,
        KeyCode::Char('s') => Message::ToggleSidebar,
        KeyCode::Char('t') => Message::CycleTheme,
        KeyCode::Esc => Message::SelectFile(None),
        _ => Message::Noop,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::ReviewApi;
    use crate::config::UiConfig;
    use crate::fixtures::FixtureSet;
    use crate::model::Loadable;

    fn model_with_focus(focus: Focus) -> Model {
        let mut model = Model::new(120, 40, UiConfig::default());
        model.focus = focus;
        model
    }

    fn key(model: &Model, code: KeyCode) -> Message {
        map_key(model, code, KeyModifiers::empty())
    }

    #[test]
    fn ctrl_c_quits_everywhere() {
        for focus in [Focus::FileTree, Focus::Search, Focus::UploadPrompt] {
            let model = model_with_focus(focus);
            assert!(matches!(
                map_key(&model, KeyCode::Char('c'), KeyModifiers::CTRL),
                Message::Quit
            ));
        }
    }

    #[test]
    fn j_and_k_depend_on_focus() {
        let tree = model_with_focus(Focus::FileTree);
        assert!(matches!(key(&tree, KeyCode::Char('j')), Message::TreeCursorDown));
        assert!(matches!(key(&tree, KeyCode::Char('k')), Message::TreeCursorUp));
        assert!(matches!(key(&tree, KeyCode::Char('J')), Message::NextFile));

        let diff = model_with_focus(Focus::DiffPane);
        assert!(matches!(key(&diff, KeyCode::Char('j')), Message::ScrollDown));
        assert!(matches!(key(&diff, KeyCode::Char('J')), Message::NextFile));
    }

    #[test]
    fn enter_folds_a_directory_under_the_cursor() {
        let mut model = model_with_focus(Focus::FileTree);
        let files = FixtureSet::builtin().unwrap().files("repo-1").unwrap();
        model.files = Loadable::Ready(files);

        model.tree_cursor = Some("web-dir-utils".to_string());
        assert!(matches!(
            key(&model, KeyCode::Enter),
            Message::ToggleDirectory(id) if id == "web-dir-utils"
        ));
        assert!(matches!(
            key(&model, KeyCode::Char('l')),
            Message::ToggleDirectory(id) if id == "web-dir-utils"
        ));

        model.set_selected_file(Some("web-api"));
        assert!(matches!(key(&model, KeyCode::Enter), Message::ToggleFocus));
    }

    #[test]
    fn text_inputs_capture_characters() {
        let search = model_with_focus(Focus::Search);
        assert!(matches!(key(&search, KeyCode::Char('q')), Message::SearchInput(s) if s == "q"));
        assert!(matches!(key(&search, KeyCode::Char('j')), Message::SearchInput(_)));
        assert!(matches!(key(&search, KeyCode::Esc), Message::SearchCancel));
        assert!(matches!(
            map_key(&search, KeyCode::Char('r'), KeyModifiers::CTRL),
            Message::Noop
        ));

        let prompt = model_with_focus(Focus::UploadPrompt);
        assert!(matches!(key(&prompt, KeyCode::Char('/')), Message::UploadInput(s) if s == "/"));
        assert!(matches!(key(&prompt, KeyCode::Enter), Message::UploadSubmit));
    }

    #[test]
    fn severity_keys() {
        let model = model_with_focus(Focus::FileTree);
        assert!(matches!(
            key(&model, KeyCode::Char('1')),
            Message::ToggleSeverity(Severity::Critical)
        ));
        assert!(matches!(
            key(&model, KeyCode::Char('3')),
            Message::ToggleSeverity(Severity::Info)
        ));
    }

    #[test]
    fn repo_picker_keys() {
        let model = model_with_focus(Focus::RepoPicker);
        assert!(matches!(key(&model, KeyCode::Down), Message::RepoPickerDown));
        assert!(matches!(key(&model, KeyCode::Enter), Message::RepoPickerConfirm));
        assert!(matches!(key(&model, KeyCode::Esc), Message::CloseRepoPicker));
    }

    #[test]
    fn reload_shortcut() {
        let model = model_with_focus(Focus::DiffPane);
        assert!(matches!(
            map_key(&model, KeyCode::Char('r'), KeyModifiers::CTRL),
            Message::Reload
        ));
    }
}
