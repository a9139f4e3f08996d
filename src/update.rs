//! State update logic (Elm Architecture)

use std::path::PathBuf;
use std::time::Instant;

use chrono::Utc;

use crate::api::{Completed, QueryData, QueryKey};
use crate::filter::FilterPatch;
use crate::layout;
use crate::message::Message;
use crate::model::{ancestors_of, Focus, Loadable, Model};
use crate::stream::{comment_order, comment_row, main_stream, max_scroll};
use crate::types::FileKind;
use crate::upload::{process_paths, read_file_as_text};
use crate::{config, theme, Highlighter};

pub fn update(model: &mut Model, msg: Message) {
    if is_user_action(&msg) {
        model.flash_message = None;
    }

    match msg {
        // === Data ===
        Message::QueryStarted(key) => {
            mark_loading(model, &key);
            model.needs_redraw = true;
        }
        Message::QueryResolved(completed) => {
            apply_query_result(model, completed);
            model.needs_redraw = true;
        }
        Message::Reload => {
            model.reload_requested = true;
            model.needs_redraw = true;
        }

        // === Repository ===
        Message::OpenRepoPicker => {
            let Some(repos) = model.repositories.ready().filter(|r| !r.is_empty()) else {
                model.flash_message = Some("Repositories are still loading".to_string());
                model.needs_redraw = true;
                return;
            };
            model.repo_picker_index = model
                .selected_repo
                .as_deref()
                .and_then(|id| repos.iter().position(|r| r.id == id))
                .unwrap_or(0);
            if model.focus != Focus::RepoPicker {
                model.previous_focus = Some(model.focus);
            }
            model.focus = Focus::RepoPicker;
            model.needs_redraw = true;
        }
        Message::CloseRepoPicker => {
            model.focus = model.previous_focus.take().unwrap_or(Focus::FileTree);
            model.needs_redraw = true;
        }
        Message::RepoPickerUp => {
            model.repo_picker_index = model.repo_picker_index.saturating_sub(1);
            model.needs_redraw = true;
        }
        Message::RepoPickerDown => {
            let count = model.repositories.ready().map_or(0, Vec::len);
            if model.repo_picker_index + 1 < count {
                model.repo_picker_index += 1;
            }
            model.needs_redraw = true;
        }
        Message::RepoPickerConfirm => {
            let id = model
                .repositories
                .ready()
                .and_then(|repos| repos.get(model.repo_picker_index))
                .map(|repo| repo.id.clone());
            model.previous_focus = None;
            model.focus = Focus::FileTree;
            if let Some(id) = id {
                select_repo(model, &id);
            }
            model.needs_redraw = true;
        }
        Message::SelectRepo(id) => {
            select_repo(model, &id);
            model.needs_redraw = true;
        }

        // === File Tree ===
        Message::SelectFile(id) => {
            select_file(model, id.as_deref());
            model.needs_redraw = true;
        }
        Message::NextFile => {
            step_file(model, 1);
            model.needs_redraw = true;
        }
        Message::PrevFile => {
            step_file(model, -1);
            model.needs_redraw = true;
        }
        Message::TreeCursorDown => {
            step_cursor(model, 1);
            model.needs_redraw = true;
        }
        Message::TreeCursorUp => {
            step_cursor(model, -1);
            model.needs_redraw = true;
        }
        Message::ToggleDirectory(id) => {
            toggle_directory(model, &id);
            model.needs_redraw = true;
        }
        Message::ToggleParentDirectory => {
            let target = model.tree_cursor_directory().or_else(|| {
                model.selected_file.as_deref().and_then(|selected| {
                    ancestors_of(&model.file_tree(), selected).and_then(|mut path| path.pop())
                })
            });
            if let Some(dir) = target {
                toggle_directory(model, &dir);
            }
            model.needs_redraw = true;
        }
        Message::ExpandAll => {
            model.collapsed_dirs.clear();
            model.needs_redraw = true;
        }

        // === Diff Pane ===
        Message::ScrollUp => {
            model.diff_scroll = model.diff_scroll.saturating_sub(1);
            model.needs_redraw = true;
        }
        Message::ScrollDown => {
            model.diff_scroll = (model.diff_scroll + 1).min(scroll_limit(model));
            model.needs_redraw = true;
        }
        Message::PageUp => {
            let page = layout::main_viewport_height(model.height).max(1);
            model.diff_scroll = model.diff_scroll.saturating_sub(page);
            model.needs_redraw = true;
        }
        Message::PageDown => {
            let page = layout::main_viewport_height(model.height).max(1);
            model.diff_scroll = (model.diff_scroll + page).min(scroll_limit(model));
            model.needs_redraw = true;
        }
        Message::ScrollTop => {
            model.diff_scroll = 0;
            model.needs_redraw = true;
        }
        Message::ScrollBottom => {
            model.diff_scroll = scroll_limit(model);
            model.needs_redraw = true;
        }
        Message::NextComment => {
            step_comment(model, true);
            model.needs_redraw = true;
        }
        Message::PrevComment => {
            step_comment(model, false);
            model.needs_redraw = true;
        }
        Message::ToggleSuggestion => {
            if model.focused_comment.is_none() {
                step_comment(model, true);
            }
            let has_suggestion = model.focused_comment.as_deref().is_some_and(|id| {
                model
                    .all_reviews()
                    .iter()
                    .any(|c| c.id == id && c.suggestion.is_some())
            });
            if let (true, Some(id)) = (has_suggestion, model.focused_comment.clone()) {
                if !model.expanded_suggestions.remove(&id) {
                    model.expanded_suggestions.insert(id);
                }
            }
            model.needs_redraw = true;
        }

        // === Focus / Layout ===
        Message::ToggleFocus => {
            model.focus = match model.focus {
                Focus::FileTree => Focus::DiffPane,
                Focus::DiffPane => Focus::FileTree,
                other => other,
            };
            if model.focus == Focus::FileTree {
                model.sidebar_visible = true;
            }
            model.needs_redraw = true;
        }
        Message::ToggleSidebar => {
            model.sidebar_visible = !model.sidebar_visible;
            if !model.sidebar_visible && model.focus == Focus::FileTree {
                model.focus = Focus::DiffPane;
            }
            model.needs_redraw = true;
        }

        // === Filters ===
        Message::SearchActivate => {
            if !model.focus.is_text_input() {
                model.previous_focus = Some(model.focus);
            }
            model.focus = Focus::Search;
            model.search_input.clone_from(&model.filters.search_query);
            model.needs_redraw = true;
        }
        Message::SearchInput(text) => {
            model.search_input.push_str(&text);
            schedule_search(model);
        }
        Message::SearchBackspace => {
            model.search_input.pop();
            schedule_search(model);
        }
        Message::SearchClearLine => {
            model.search_input.clear();
            apply_search(model);
        }
        Message::SearchSubmit => {
            apply_search(model);
            leave_text_input(model);
        }
        Message::SearchCancel => {
            model.search_input.clear();
            apply_search(model);
            leave_text_input(model);
        }
        Message::ToggleSeverity(severity) => {
            model.toggle_severity(severity);
            model.needs_redraw = true;
        }
        Message::SetFilters(patch) => {
            if let Some(query) = &patch.search_query {
                model.search_input.clone_from(query);
                model.search_deadline = None;
            }
            model.set_filters(patch);
            model.needs_redraw = true;
        }
        Message::ResetFilters => {
            model.reset_filters();
            model.needs_redraw = true;
        }
        Message::ToggleFilesWithIssues => {
            let show = !model.filters.show_only_files_with_issues;
            model.set_filters(FilterPatch {
                show_only_files_with_issues: Some(show),
                ..FilterPatch::default()
            });
            model.tree_scroll = 0;
            model.needs_redraw = true;
        }

        // === Upload ===
        Message::ToggleUploadMode => {
            model.toggle_upload_mode();
            model.focus = Focus::FileTree;
            model.tree_scroll = 0;
            model.needs_redraw = true;
        }
        Message::OpenUploadPrompt => {
            if !model.focus.is_text_input() {
                model.previous_focus = Some(model.focus);
            }
            model.focus = Focus::UploadPrompt;
            model.upload_input.clear();
            model.needs_redraw = true;
        }
        Message::UploadInput(text) => {
            model.upload_input.push_str(&text);
            model.needs_redraw = true;
        }
        Message::UploadBackspace => {
            model.upload_input.pop();
            model.needs_redraw = true;
        }
        Message::UploadSubmit => {
            let paths: Vec<PathBuf> = model
                .upload_input
                .split_whitespace()
                .map(PathBuf::from)
                .collect();
            model.upload_input.clear();
            leave_text_input(model);
            if !paths.is_empty() {
                upload_paths(model, &paths);
            }
        }
        Message::UploadCancel => {
            model.upload_input.clear();
            leave_text_input(model);
        }
        Message::UploadPaths(paths) => {
            upload_paths(model, &paths);
        }
        Message::RefreshUploadedFile => {
            refresh_uploaded_file(model);
            model.needs_redraw = true;
        }
        Message::ClearUploads => {
            let had_uploads = !model.uploaded_files.is_empty();
            model.clear_uploaded_files();
            if had_uploads {
                model.flash_message = Some("Cleared uploaded files".to_string());
            }
            model.needs_redraw = true;
        }

        // === Theme ===
        Message::CycleTheme => {
            let names = theme::built_in_theme_names();
            let current = model
                .config
                .theme
                .as_deref()
                .and_then(|name| names.iter().position(|n| *n == name));
            let next = current.map_or(1, |i| i + 1) % names.len().max(1);
            if let Some(name) = names.get(next) {
                update(model, Message::ApplyTheme((*name).to_string()));
            }
        }
        Message::ApplyTheme(theme_name) => {
            if let Some(loaded) = theme::load_built_in_theme(&theme_name) {
                model.highlighter = Highlighter::with_theme(loaded.syntax_theme_name());
                model.theme = loaded.theme;
                model.highlighted_for = None;
                model.config.theme = Some(theme_name);
                if let Some(path) = &model.config_path {
                    if let Err(err) = config::save_ui_config_to(&model.config, path) {
                        log::warn!("Failed to save theme choice: {err:#}");
                    }
                }
                model.needs_redraw = true;
            }
        }

        // === System ===
        Message::Resize { width, height } => {
            model.resize(width, height);
            model.needs_redraw = true;
        }
        Message::Tick(now) => {
            if model.search_deadline.is_some_and(|due| now >= due) {
                apply_search(model);
            }
        }
        Message::Quit => {
            model.should_quit = true;
        }
        Message::Noop => {}
    }

    if model.needs_redraw {
        settle(model);
    }
    model.sync_highlights();
}

const fn is_user_action(msg: &Message) -> bool {
    !matches!(
        msg,
        Message::QueryStarted(_)
            | Message::QueryResolved(_)
            | Message::Tick(_)
            | Message::Resize { .. }
            | Message::Noop
    )
}

// === Queries ===

fn mark_loading(model: &mut Model, key: &QueryKey) {
    match key {
        QueryKey::Repositories => {
            if model.repositories.is_idle() {
                model.repositories = Loadable::Loading;
            }
        }
        QueryKey::Files(repo_id) => {
            if model.selected_repo.as_deref() == Some(repo_id) && model.files.is_idle() {
                model.files = Loadable::Loading;
            }
        }
        QueryKey::Diff(file_id) => {
            if !model.upload_mode
                && model.selected_file.as_deref() == Some(file_id)
                && model.diff.is_idle()
            {
                model.diff = Loadable::Loading;
            }
        }
        QueryKey::Reviews(None) => {
            if model.reviews.is_idle() {
                model.reviews = Loadable::Loading;
            }
        }
        QueryKey::Reviews(Some(_)) => {}
    }
}

/// Store a finished query. Results for a repository or file that is no
/// longer selected are dropped.
fn apply_query_result(model: &mut Model, completed: Completed) {
    let Completed { key, result } = completed;
    match key {
        QueryKey::Repositories => {
            model.repositories = match result {
                Ok(QueryData::Repositories(repos)) => {
                    model.repo_picker_index = model.repo_picker_index.min(repos.len().saturating_sub(1));
                    Loadable::Ready(repos)
                }
                Ok(other) => mismatched(&QueryKey::Repositories, &other),
                Err(err) => Loadable::Failed(err),
            };
        }
        QueryKey::Files(repo_id) => {
            if model.selected_repo.as_deref() != Some(repo_id.as_str()) {
                log::debug!("Dropping files for deselected repository {repo_id}");
                return;
            }
            model.files = match result {
                Ok(QueryData::Files(files)) => Loadable::Ready(files),
                Ok(other) => mismatched(&QueryKey::Files(repo_id), &other),
                Err(err) => Loadable::Failed(err),
            };
        }
        QueryKey::Diff(file_id) => {
            if model.upload_mode || model.selected_file.as_deref() != Some(file_id.as_str()) {
                log::debug!("Dropping diff for deselected file {file_id}");
                return;
            }
            model.diff = match result {
                Ok(QueryData::Diff(diff)) => Loadable::Ready(diff),
                Ok(other) => mismatched(&QueryKey::Diff(file_id), &other),
                Err(err) => Loadable::Failed(err),
            };
        }
        QueryKey::Reviews(None) => {
            model.reviews = match result {
                Ok(QueryData::Reviews(reviews)) => Loadable::Ready(reviews),
                Ok(other) => mismatched(&QueryKey::Reviews(None), &other),
                Err(err) => Loadable::Failed(err),
            };
        }
        QueryKey::Reviews(Some(file_id)) => {
            log::debug!("Ignoring per-file reviews for {file_id}");
        }
    }
}

fn mismatched<T>(key: &QueryKey, data: &QueryData) -> Loadable<T> {
    log::error!("Query {key:?} resolved with unexpected data {data:?}");
    Loadable::Failed(format!("Unexpected response for {key:?}"))
}

// === Selection ===

fn select_repo(model: &mut Model, repo_id: &str) {
    if model.upload_mode {
        model.toggle_upload_mode();
    }
    model.set_selected_repo(repo_id);
    model.focus = Focus::FileTree;
}

/// Select a file, expanding the directories that hold it and scrolling the
/// tree so its row is visible. The cursor follows the selection.
fn select_file(model: &mut Model, file_id: Option<&str>) {
    model.set_selected_file(file_id);
    model.tree_cursor = file_id.map(str::to_string);
    let Some(file_id) = file_id else {
        return;
    };

    if let Some(ancestors) = ancestors_of(&model.file_tree(), file_id) {
        for dir in ancestors {
            model.collapsed_dirs.remove(&dir);
        }
    }
    scroll_tree_to(model, file_id);
}

fn scroll_tree_to(model: &mut Model, row_id: &str) {
    let rows = model.tree_rows();
    if let Some(pos) = rows.iter().position(|row| row.id == row_id) {
        let visible = layout::tree_viewport_height(model.height).max(1);
        if pos < model.tree_scroll {
            model.tree_scroll = pos;
        } else if pos >= model.tree_scroll + visible {
            model.tree_scroll = pos + 1 - visible;
        }
    }
}

/// Move the cursor one visible row. A file row becomes the selection; a
/// directory row only takes the cursor, so collapsed directories stay
/// collapsed while walking past them.
fn step_cursor(model: &mut Model, delta: isize) {
    let rows = model.tree_rows();
    if rows.is_empty() {
        return;
    }
    let current = model.tree_cursor_index(&rows).map_or(-1, |i| i as isize);
    let last = rows.len() as isize - 1;
    let row = &rows[(current + delta).clamp(0, last) as usize];
    if row.kind == FileKind::File {
        select_file(model, Some(&row.id));
    } else {
        model.tree_cursor = Some(row.id.clone());
        scroll_tree_to(model, &row.id);
    }
}

/// Move the file selection through the flattened tree. With nothing
/// selected the position counts as -1, so "next" lands on the first file
/// and "previous" on the first file as well.
fn step_file(model: &mut Model, delta: isize) {
    let ids = model.file_ids();
    if ids.is_empty() {
        return;
    }
    let current = model
        .selected_file
        .as_deref()
        .and_then(|selected| ids.iter().position(|id| id == selected))
        .map_or(-1, |i| i as isize);
    let last = ids.len() as isize - 1;
    let next = (current + delta).clamp(0, last) as usize;
    let target = ids[next].clone();
    select_file(model, Some(&target));
}

/// Flip a directory and put the cursor on it.
fn toggle_directory(model: &mut Model, dir_id: &str) {
    if !model.collapsed_dirs.remove(dir_id) {
        model.collapsed_dirs.insert(dir_id.to_string());
    }
    model.tree_cursor = Some(dir_id.to_string());
    let count = model.tree_rows().len();
    model.tree_scroll = model.tree_scroll.min(count.saturating_sub(1));
    scroll_tree_to(model, dir_id);
}

// === Main pane ===

fn scroll_limit(model: &Model) -> usize {
    let comments = model.filtered_reviews();
    let rows = main_stream(model, &comments);
    max_scroll(rows.len(), layout::main_viewport_height(model.height))
}

/// Comment ids with the row their card starts on.
fn comment_positions(model: &Model) -> Vec<(String, usize)> {
    let comments = model.filtered_reviews();
    let rows = main_stream(model, &comments);
    comment_order(&rows)
        .into_iter()
        .filter_map(|id| comment_row(&rows, id).map(|row| (id.to_string(), row)))
        .collect()
}

fn step_comment(model: &mut Model, forward: bool) {
    let positions = comment_positions(model);
    if positions.is_empty() {
        return;
    }
    let current = model
        .focused_comment
        .as_deref()
        .and_then(|id| positions.iter().position(|(cid, _)| cid == id));
    let next = match (current, forward) {
        (None, true) => 0,
        (None, false) => positions.len() - 1,
        (Some(i), true) => (i + 1).min(positions.len() - 1),
        (Some(i), false) => i.saturating_sub(1),
    };
    let (id, row) = positions[next].clone();
    model.focused_comment = Some(id);
    // keep the diff line above the card in view
    model.diff_scroll = row.saturating_sub(2).min(scroll_limit(model));
}

/// Keep scroll and comment focus valid after the stream changed shape.
fn settle(model: &mut Model) {
    let limit = scroll_limit(model);
    if model.diff_scroll > limit {
        model.diff_scroll = limit;
    }
    if let Some(id) = model.focused_comment.clone() {
        if !comment_positions(model).iter().any(|(cid, _)| *cid == id) {
            model.focused_comment = None;
        }
    }
}

// === Text inputs ===

fn schedule_search(model: &mut Model) {
    model.search_deadline = Some(Instant::now() + model.config.search_debounce());
    model.needs_redraw = true;
}

fn apply_search(model: &mut Model) {
    model.search_deadline = None;
    let query = model.search_input.clone();
    model.set_filters(FilterPatch {
        search_query: Some(query),
        ..FilterPatch::default()
    });
    model.needs_redraw = true;
}

fn leave_text_input(model: &mut Model) {
    model.focus = model.previous_focus.take().unwrap_or(Focus::FileTree);
    model.needs_redraw = true;
}

// === Uploads ===

fn upload_paths(model: &mut Model, paths: &[PathBuf]) {
    match process_paths(paths, Utc::now()) {
        Ok(batch) => {
            let count = batch.files.len();
            let skipped = batch.skipped.len();
            if count == 0 {
                model.flash_message = Some(format!(
                    "No code files to upload ({skipped} skipped)"
                ));
            } else {
                log::info!("Uploaded {count} file(s), skipped {skipped}");
                model.accept_uploads(batch.files);
                model.focus = Focus::FileTree;
                model.tree_scroll = 0;
                model.flash_message = Some(if skipped > 0 {
                    format!("Uploaded {count} file(s), {skipped} skipped")
                } else {
                    format!("Uploaded {count} file(s)")
                });
            }
        }
        Err(err) => {
            log::error!("Upload failed: {err}");
            model.flash_message = Some(format!("Error processing files: {err}"));
        }
    }
    model.needs_redraw = true;
}

fn refresh_uploaded_file(model: &mut Model) {
    let target = model
        .selected_file
        .as_deref()
        .filter(|_| model.upload_mode)
        .and_then(|id| model.uploaded_file(id))
        .map(|file| (file.id.clone(), file.name.clone(), file.path.clone()));
    let Some((id, name, path)) = target else {
        model.flash_message = Some("Select an uploaded file to refresh".to_string());
        return;
    };

    match read_file_as_text(&path) {
        Ok(content) => {
            model.update_uploaded_file(&id, &content);
            model.flash_message = Some(format!("Re-diffed {name} against the original upload"));
        }
        Err(err) => {
            log::warn!("Refresh of {} failed: {err}", path.display());
            model.flash_message = Some(format!("Error processing files: {err}"));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::QueryClient;
    use crate::config::UiConfig;
    use crate::fixtures::FixtureSet;
    use crate::types::{FileStatus, Severity};
    use std::time::Duration;

    fn model() -> Model {
        Model::new(140, 40, UiConfig::default())
    }

    /// Model with repositories, reviews and repo-1's files loaded.
    fn loaded_model() -> Model {
        let fixtures = FixtureSet::builtin().unwrap();
        let mut client = QueryClient::new(Box::new(fixtures)).with_latency(Duration::ZERO);
        let mut model = model();
        let now = Instant::now();
        for key in [
            QueryKey::Repositories,
            QueryKey::Reviews(None),
            QueryKey::Files("repo-1".to_string()),
        ] {
            client.fetch(key, now);
        }
        update(&mut model, Message::SelectRepo("repo-1".to_string()));
        for completed in client.poll(now) {
            update(&mut model, Message::QueryResolved(completed));
        }
        model
    }

    fn resolve_diff(model: &mut Model, file_id: &str) {
        let fixtures = FixtureSet::builtin().unwrap();
        let mut client = QueryClient::new(Box::new(fixtures)).with_latency(Duration::ZERO);
        let now = Instant::now();
        client.fetch(QueryKey::Diff(file_id.to_string()), now);
        for completed in client.poll(now) {
            update(model, Message::QueryResolved(completed));
        }
    }

    #[test]
    fn next_file_from_nothing_selects_first() {
        let mut model = loaded_model();
        update(&mut model, Message::NextFile);
        assert_eq!(model.selected_file.as_deref(), Some("web-app"));
        update(&mut model, Message::NextFile);
        assert_eq!(model.selected_file.as_deref(), Some("web-header"));
    }

    #[test]
    fn prev_file_from_nothing_selects_first() {
        let mut model = loaded_model();
        update(&mut model, Message::PrevFile);
        assert_eq!(model.selected_file.as_deref(), Some("web-app"));
        update(&mut model, Message::PrevFile);
        assert_eq!(model.selected_file.as_deref(), Some("web-app"));
    }

    #[test]
    fn next_file_stops_at_last() {
        let mut model = loaded_model();
        let ids = model.file_ids();
        let last = ids.last().unwrap().clone();
        update(&mut model, Message::SelectFile(Some(last.clone())));
        update(&mut model, Message::NextFile);
        assert_eq!(model.selected_file, Some(last));
    }

    #[test]
    fn navigation_on_empty_tree_is_ignored() {
        let mut model = model();
        update(&mut model, Message::NextFile);
        assert_eq!(model.selected_file, None);
    }

    #[test]
    fn stale_file_results_are_dropped() {
        let mut model = loaded_model();
        update(
            &mut model,
            Message::QueryResolved(Completed {
                key: QueryKey::Files("repo-2".to_string()),
                result: Ok(QueryData::Files(Vec::new())),
            }),
        );
        assert!(model.files.ready().is_some_and(|f| !f.is_empty()));
    }

    #[test]
    fn stale_diff_results_are_dropped() {
        let mut model = loaded_model();
        update(&mut model, Message::SelectFile(Some("web-app".to_string())));
        resolve_diff(&mut model, "web-header");
        assert!(model.diff.is_idle());
        resolve_diff(&mut model, "web-app");
        assert!(model.current_diff().is_some());
    }

    #[test]
    fn failed_diff_is_kept_as_error() {
        let mut model = loaded_model();
        update(&mut model, Message::SelectFile(Some("nope".to_string())));
        resolve_diff(&mut model, "nope");
        assert_eq!(
            model.diff,
            Loadable::Failed("No diff found for file nope".to_string())
        );
    }

    #[test]
    fn selecting_hidden_file_expands_its_directory() {
        let mut model = loaded_model();
        model.collapsed_dirs.insert("web-dir-components".to_string());
        update(&mut model, Message::SelectFile(Some("web-header".to_string())));
        assert!(!model.collapsed_dirs.contains("web-dir-components"));
    }

    #[test]
    fn parent_directory_toggles() {
        let mut model = loaded_model();
        update(&mut model, Message::SelectFile(Some("web-header".to_string())));
        update(&mut model, Message::ToggleParentDirectory);
        assert!(model.collapsed_dirs.contains("web-dir-components"));
        update(&mut model, Message::ExpandAll);
        assert!(model.collapsed_dirs.is_empty());
    }

    #[test]
    fn collapsed_directory_survives_cursor_moves() {
        let mut model = loaded_model();
        update(&mut model, Message::SelectFile(Some("web-header".to_string())));
        update(&mut model, Message::ToggleParentDirectory);
        assert_eq!(model.tree_cursor.as_deref(), Some("web-dir-components"));

        update(&mut model, Message::TreeCursorDown);
        assert_eq!(model.tree_cursor.as_deref(), Some("web-dir-utils"));
        assert_eq!(model.selected_file.as_deref(), Some("web-header"));
        assert!(model.collapsed_dirs.contains("web-dir-components"));

        update(&mut model, Message::TreeCursorDown);
        assert_eq!(model.selected_file.as_deref(), Some("web-api"));
        assert!(model.collapsed_dirs.contains("web-dir-components"));

        update(&mut model, Message::TreeCursorUp);
        update(&mut model, Message::TreeCursorUp);
        assert_eq!(model.tree_cursor.as_deref(), Some("web-dir-components"));
        update(&mut model, Message::TreeCursorUp);
        assert_eq!(model.selected_file.as_deref(), Some("web-app"));
        assert!(model.collapsed_dirs.contains("web-dir-components"));
    }

    #[test]
    fn fold_key_acts_on_directory_under_cursor() {
        let mut model = loaded_model();
        update(&mut model, Message::TreeCursorDown);
        assert_eq!(model.tree_cursor.as_deref(), Some("web-dir-src"));
        assert_eq!(model.selected_file, None);

        update(&mut model, Message::ToggleParentDirectory);
        assert!(model.collapsed_dirs.contains("web-dir-src"));
        let ids: Vec<String> = model.tree_rows().into_iter().map(|r| r.id).collect();
        assert_eq!(ids, vec!["web-dir-src", "web-package"]);

        update(&mut model, Message::ToggleDirectory("web-dir-src".to_string()));
        assert!(model.collapsed_dirs.is_empty());
        assert_eq!(model.tree_cursor.as_deref(), Some("web-dir-src"));
    }

    #[test]
    fn search_applies_after_debounce() {
        let mut model = loaded_model();
        update(&mut model, Message::SearchActivate);
        assert_eq!(model.focus, Focus::Search);
        update(&mut model, Message::SearchInput("sql".to_string()));
        assert_eq!(model.filters.search_query, "");

        update(&mut model, Message::Tick(Instant::now()));
        assert_eq!(model.filters.search_query, "");

        update(&mut model, Message::Tick(Instant::now() + Duration::from_secs(1)));
        assert_eq!(model.filters.search_query, "sql");
        assert_eq!(model.search_deadline, None);
    }

    #[test]
    fn search_submit_and_cancel() {
        let mut model = loaded_model();
        update(&mut model, Message::SearchActivate);
        update(&mut model, Message::SearchInput("token".to_string()));
        update(&mut model, Message::SearchSubmit);
        assert_eq!(model.filters.search_query, "token");
        assert_eq!(model.focus, Focus::FileTree);

        update(&mut model, Message::SearchActivate);
        assert_eq!(model.search_input, "token");
        update(&mut model, Message::SearchCancel);
        assert_eq!(model.filters.search_query, "");
        assert_eq!(model.focus, Focus::FileTree);
    }

    #[test]
    fn clearing_search_applies_immediately() {
        let mut model = loaded_model();
        update(&mut model, Message::SetFilters(FilterPatch {
            search_query: Some("abc".to_string()),
            ..FilterPatch::default()
        }));
        assert_eq!(model.search_input, "abc");
        update(&mut model, Message::SearchClearLine);
        assert_eq!(model.filters.search_query, "");
    }

    #[test]
    fn severity_toggle_and_reset() {
        let mut model = loaded_model();
        let all = model.filtered_reviews().len();
        update(&mut model, Message::ToggleSeverity(Severity::Critical));
        let critical = model.filtered_reviews().len();
        assert!(critical < all);
        assert!(model
            .filtered_reviews()
            .iter()
            .all(|c| c.severity == Severity::Critical));
        // counts are over every review, not the filtered ones
        assert_eq!(
            model.severity_counts().info + model.severity_counts().warning
                + model.severity_counts().critical,
            all
        );
        update(&mut model, Message::ResetFilters);
        assert_eq!(model.filtered_reviews().len(), all);
    }

    #[test]
    fn comment_navigation_walks_cards() {
        let mut model = loaded_model();
        update(&mut model, Message::SelectFile(Some("web-userlist".to_string())));
        resolve_diff(&mut model, "web-userlist");
        update(&mut model, Message::NextComment);
        let first = model.focused_comment.clone();
        assert!(first.is_some());
        update(&mut model, Message::NextComment);
        assert_ne!(model.focused_comment, first);
        update(&mut model, Message::PrevComment);
        assert_eq!(model.focused_comment, first);
    }

    #[test]
    fn focused_comment_cleared_when_filtered_out() {
        let mut model = loaded_model();
        update(&mut model, Message::NextComment);
        let id = model.focused_comment.clone().unwrap();
        update(&mut model, Message::SetFilters(FilterPatch {
            search_query: Some("zzzz-no-match".to_string()),
            ..FilterPatch::default()
        }));
        assert_ne!(model.focused_comment, Some(id));
        assert_eq!(model.focused_comment, None);
    }

    #[test]
    fn scroll_is_clamped() {
        let mut model = loaded_model();
        update(&mut model, Message::ScrollBottom);
        let bottom = model.diff_scroll;
        update(&mut model, Message::ScrollDown);
        assert_eq!(model.diff_scroll, bottom);
        update(&mut model, Message::PageUp);
        update(&mut model, Message::ScrollUp);
        assert_eq!(model.diff_scroll, 0);
    }

    #[test]
    fn upload_flow() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("main.rs");
        std::fs::write(&path, "fn main() {}\n").unwrap();
        let notes = dir.path().join("image.png");
        std::fs::write(&notes, [0x89, b'P', b'N', b'G', 0x00]).unwrap();

        let mut model = loaded_model();
        update(&mut model, Message::UploadPaths(vec![path.clone(), notes]));
        assert!(model.upload_mode);
        assert_eq!(model.uploaded_files.len(), 1);
        assert_eq!(
            model.flash_message.as_deref(),
            Some("Uploaded 1 file(s), 1 skipped")
        );

        update(&mut model, Message::NextFile);
        let id = model.selected_file.clone().unwrap();
        assert_eq!(model.current_diff().unwrap().status, FileStatus::Added);

        std::fs::write(&path, "fn main() {\n    run();\n}\n").unwrap();
        update(&mut model, Message::RefreshUploadedFile);
        let diff = &model.uploaded_diffs[&id];
        assert_eq!(diff.status, FileStatus::Modified);
        // greedy pairing: both original lines are replaced, two lines appended
        assert_eq!(diff.deletions, 2);
        assert_eq!(diff.additions, 4);

        update(&mut model, Message::ClearUploads);
        assert!(!model.upload_mode);
        assert!(model.uploaded_files.is_empty());
    }

    #[test]
    fn same_named_files_from_different_directories() {
        let dir = tempfile::tempdir().unwrap();
        let first = dir.path().join("a").join("mod.rs");
        let second = dir.path().join("b").join("mod.rs");
        for (path, content) in [(&first, "pub mod a;\n"), (&second, "pub mod b;\npub mod c;\n")] {
            std::fs::create_dir_all(path.parent().unwrap()).unwrap();
            std::fs::write(path, content).unwrap();
        }

        let mut model = model();
        update(&mut model, Message::UploadPaths(vec![first, second]));
        assert_eq!(model.uploaded_files.len(), 2);
        let first_id = model.uploaded_files[0].id.clone();
        let second_id = model.uploaded_files[1].id.clone();
        assert_ne!(first_id, second_id);
        assert_eq!(model.uploaded_diffs.len(), 2);
        assert_eq!(model.original_contents[&first_id], "pub mod a;\n");

        update(&mut model, Message::NextFile);
        assert_eq!(model.selected_file.as_deref(), Some(first_id.as_str()));
        assert_eq!(model.current_diff().unwrap().additions, 2);
        update(&mut model, Message::NextFile);
        assert_eq!(model.selected_file.as_deref(), Some(second_id.as_str()));
        assert_eq!(model.current_diff().unwrap().additions, 3);
    }

    #[test]
    fn upload_errors_become_flash_messages() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.rs");
        std::fs::write(&path, [0xff, 0xfe, 0x00]).unwrap();

        let mut model = model();
        update(&mut model, Message::UploadPaths(vec![path]));
        assert!(!model.upload_mode);
        assert!(model
            .flash_message
            .as_deref()
            .is_some_and(|m| m.starts_with("Error processing files")));
    }

    #[test]
    fn upload_prompt_splits_paths() {
        let dir = tempfile::tempdir().unwrap();
        let a = dir.path().join("a.py");
        let b = dir.path().join("b.go");
        std::fs::write(&a, "print(1)").unwrap();
        std::fs::write(&b, "package main").unwrap();

        let mut model = model();
        update(&mut model, Message::OpenUploadPrompt);
        assert_eq!(model.focus, Focus::UploadPrompt);
        update(
            &mut model,
            Message::UploadInput(format!("{} {}", a.display(), b.display())),
        );
        update(&mut model, Message::UploadSubmit);
        assert_eq!(model.focus, Focus::FileTree);
        assert_eq!(model.uploaded_files.len(), 2);
    }

    #[test]
    fn selecting_repo_leaves_upload_mode() {
        let mut model = loaded_model();
        update(&mut model, Message::ToggleUploadMode);
        assert!(model.upload_mode);
        update(&mut model, Message::SelectRepo("repo-2".to_string()));
        assert!(!model.upload_mode);
        assert!(model.files.is_idle());
    }

    #[test]
    fn repo_picker_confirms_highlighted_repo() {
        let mut model = loaded_model();
        update(&mut model, Message::OpenRepoPicker);
        assert_eq!(model.focus, Focus::RepoPicker);
        assert_eq!(model.repo_picker_index, 0);
        update(&mut model, Message::RepoPickerDown);
        update(&mut model, Message::RepoPickerConfirm);
        assert_eq!(model.selected_repo.as_deref(), Some("repo-2"));
        assert_eq!(model.focus, Focus::FileTree);
    }

    #[test]
    fn theme_change_is_saved() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ui.json");
        let mut model = model();
        model.config_path = Some(path.clone());
        update(&mut model, Message::ApplyTheme("nord".to_string()));
        assert_eq!(model.theme.name, "Nord");
        let saved = config::load_ui_config_from(&path).unwrap().unwrap();
        assert_eq!(saved.theme.as_deref(), Some("nord"));

        update(&mut model, Message::CycleTheme);
        assert_eq!(model.config.theme.as_deref(), Some("default-dark"));
    }

    #[test]
    fn flash_clears_on_next_key() {
        let mut model = model();
        model.flash_message = Some("hello".to_string());
        update(&mut model, Message::Tick(Instant::now()));
        assert!(model.flash_message.is_some());
        update(&mut model, Message::ScrollDown);
        assert!(model.flash_message.is_none());
    }
}
