//! Application state model
//!
//! The single client-side store: selections, filters, upload state, query
//! results and UI navigation state. Store operations live here as methods;
//! `update` maps messages onto them.

use std::collections::{HashMap, HashSet};
use std::path::PathBuf;
use std::time::Instant;

use crate::config::UiConfig;
use crate::diff::generate_diff;
use crate::filter::{filter_comments, prune_files_without_issues, FilterPatch, FilterState};
use crate::syntax::{HighlightSpan, Highlighter};
use crate::theme::Theme;
use crate::types::{
    flatten_files, FileDiff, FileKind, FileNode, FileStatus, Repository, ReviewComment, Severity,
    SeverityCounts,
};
use crate::upload::UploadedFile;

pub const UPLOAD_ROOT_ID: &str = "uploaded-root";

/// State of one query as seen by the view.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Loadable<T> {
    #[default]
    Idle,
    Loading,
    Ready(T),
    Failed(String),
}

impl<T> Loadable<T> {
    #[must_use]
    pub const fn ready(&self) -> Option<&T> {
        match self {
            Self::Ready(value) => Some(value),
            _ => None,
        }
    }

    #[must_use]
    pub const fn is_loading(&self) -> bool {
        matches!(self, Self::Loading)
    }

    #[must_use]
    pub const fn is_idle(&self) -> bool {
        matches!(self, Self::Idle)
    }
}

/// Which pane has focus
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Focus {
    #[default]
    FileTree,
    DiffPane,
    Search,
    RepoPicker,
    UploadPrompt,
}

impl Focus {
    /// Focus targets that capture typed characters.
    #[must_use]
    pub const fn is_text_input(self) -> bool {
        matches!(self, Self::Search | Self::UploadPrompt)
    }
}

/// Responsive layout mode based on terminal width
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LayoutMode {
    /// >= 130 cols: full sidebar + diff
    Full,
    /// 100-129 cols: compact sidebar + diff
    Compact,
    /// 80-99 cols: overlay sidebar (toggleable)
    Overlay,
    /// < 80 cols: single pane mode
    Single,
}

impl LayoutMode {
    /// Determine layout mode from terminal width
    #[must_use]
    pub const fn from_width(width: u16) -> Self {
        match width {
            w if w >= 130 => Self::Full,
            w if w >= 100 => Self::Compact,
            w if w >= 80 => Self::Overlay,
            _ => Self::Single,
        }
    }

    /// Get sidebar width for this layout mode
    #[must_use]
    pub const fn sidebar_width(self) -> u16 {
        match self {
            Self::Full => 36,
            Self::Compact => 30,
            Self::Overlay => 28,
            Self::Single => 0,
        }
    }
}

/// One visible row of the file tree panel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeRow {
    pub id: String,
    pub name: String,
    pub kind: FileKind,
    pub depth: usize,
    pub comment_count: u32,
    pub expanded: bool,
}

/// Application state
#[allow(clippy::struct_excessive_bools)] // TUI state inherently needs many boolean flags
pub struct Model {
    // === Focus ===
    pub focus: Focus,
    pub previous_focus: Option<Focus>,

    // === Query results ===
    pub repositories: Loadable<Vec<Repository>>,
    pub files: Loadable<Vec<FileNode>>,
    pub diff: Loadable<FileDiff>,
    pub reviews: Loadable<Vec<ReviewComment>>,
    /// Set by `Reload`; the query driver invalidates and refetches
    pub reload_requested: bool,

    // === Store ===
    pub selected_repo: Option<String>,
    pub selected_file: Option<String>,
    pub filters: FilterState,
    pub upload_mode: bool,
    pub uploaded_files: Vec<UploadedFile>,
    pub uploaded_diffs: HashMap<String, FileDiff>,
    /// Content of each upload as first read, for later re-diffing
    pub original_contents: HashMap<String, String>,

    // === Syntax ===
    pub highlighter: Highlighter,
    /// Spans for the current diff, one entry per diff line
    pub highlighted_lines: Vec<Vec<HighlightSpan>>,
    /// `file id:diff id` the spans above were computed for
    pub highlighted_for: Option<String>,

    // === UI state ===
    /// Directory ids the user collapsed; everything else is expanded
    pub collapsed_dirs: HashSet<String>,
    /// Tree row under the cursor: a directory, or the selected file
    pub tree_cursor: Option<String>,
    pub tree_scroll: usize,
    pub diff_scroll: usize,
    /// Comment targeted by n/p in the diff pane
    pub focused_comment: Option<String>,
    /// Comments whose suggestion block is open
    pub expanded_suggestions: HashSet<String>,
    pub sidebar_visible: bool,
    pub repo_picker_index: usize,

    // === Text inputs ===
    pub search_input: String,
    /// When the typed query is due to be applied to the filters
    pub search_deadline: Option<Instant>,
    pub upload_input: String,

    // === Layout ===
    pub width: u16,
    pub height: u16,
    pub layout_mode: LayoutMode,

    // === Theme ===
    pub theme: Theme,
    pub config: UiConfig,
    /// Where theme changes are saved; `None` keeps them in memory
    pub config_path: Option<PathBuf>,

    // === Flash message (transient error/status) ===
    /// Shown in the help bar area until the next keypress.
    pub flash_message: Option<String>,

    // === Control ===
    pub should_quit: bool,
    /// Flag indicating the view needs a full redraw
    pub needs_redraw: bool,
}

impl Model {
    /// Create a new model
    #[must_use]
    pub fn new(width: u16, height: u16, config: UiConfig) -> Self {
        Self {
            focus: Focus::default(),
            previous_focus: None,
            repositories: Loadable::Idle,
            files: Loadable::Idle,
            diff: Loadable::Idle,
            reviews: Loadable::Idle,
            reload_requested: false,
            selected_repo: None,
            selected_file: None,
            filters: FilterState::default(),
            upload_mode: false,
            uploaded_files: Vec::new(),
            uploaded_diffs: HashMap::new(),
            original_contents: HashMap::new(),
            highlighter: Highlighter::new(),
            highlighted_lines: Vec::new(),
            highlighted_for: None,
            collapsed_dirs: HashSet::new(),
            tree_cursor: None,
            tree_scroll: 0,
            diff_scroll: 0,
            focused_comment: None,
            expanded_suggestions: HashSet::new(),
            sidebar_visible: true,
            repo_picker_index: 0,
            search_input: String::new(),
            search_deadline: None,
            upload_input: String::new(),
            width,
            height,
            layout_mode: LayoutMode::from_width(width),
            theme: Theme::default(),
            config,
            config_path: None,
            flash_message: None,
            should_quit: false,
            needs_redraw: true,
        }
    }

    // === Store operations ===

    /// Select a repository; the file selection and its diff are cleared.
    pub fn set_selected_repo(&mut self, repo_id: &str) {
        if self.selected_repo.as_deref() != Some(repo_id) {
            self.files = Loadable::Idle;
            self.collapsed_dirs.clear();
            self.tree_cursor = None;
            self.tree_scroll = 0;
        }
        self.selected_repo = Some(repo_id.to_string());
        self.set_selected_file(None);
    }

    pub fn set_selected_file(&mut self, file_id: Option<&str>) {
        if self.selected_file.as_deref() == file_id {
            return;
        }
        self.selected_file = file_id.map(str::to_string);
        self.tree_cursor = self.selected_file.clone();
        self.diff = Loadable::Idle;
        self.diff_scroll = 0;
        self.focused_comment = None;
    }

    pub fn set_filters(&mut self, patch: FilterPatch) {
        self.filters.apply(patch);
    }

    pub fn reset_filters(&mut self) {
        self.filters.reset();
        self.search_input.clear();
        self.search_deadline = None;
    }

    pub fn toggle_severity(&mut self, severity: Severity) {
        self.filters.toggle_severity(severity);
    }

    pub fn add_uploaded_file(&mut self, file: UploadedFile) {
        self.uploaded_files.push(file);
    }

    pub fn add_uploaded_diff(&mut self, file_id: &str, diff: FileDiff) {
        self.uploaded_diffs.insert(file_id.to_string(), diff);
    }

    /// Drop every upload, its original content and diff, and leave upload mode.
    pub fn clear_uploaded_files(&mut self) {
        self.uploaded_files.clear();
        self.uploaded_diffs.clear();
        self.original_contents.clear();
        if self.upload_mode {
            self.upload_mode = false;
            self.set_selected_file(None);
        }
    }

    /// Register freshly uploaded files: each keeps its original content and
    /// gets an all-additions diff. Enters upload mode.
    pub fn accept_uploads(&mut self, files: Vec<UploadedFile>) {
        for mut file in files {
            file.id = self.unused_upload_id(&file.id);
            self.original_contents
                .insert(file.id.clone(), file.content.clone());
            let mut diff = generate_diff("", &file.content, &file.name);
            diff.status = FileStatus::Added;
            self.add_uploaded_diff(&file.id, diff);
            self.add_uploaded_file(file);
        }
        if !self.upload_mode {
            self.upload_mode = true;
            self.set_selected_file(None);
        }
    }

    /// `id`, or `id-2`, `id-3`, ... when that id is already taken. Files with
    /// the same name uploaded in the same millisecond get the same base id.
    fn unused_upload_id(&self, id: &str) -> String {
        let mut candidate = id.to_string();
        let mut n = 2;
        while self.uploaded_diffs.contains_key(&candidate) {
            candidate = format!("{id}-{n}");
            n += 1;
        }
        candidate
    }

    /// Diff new content of an uploaded file against what was first uploaded.
    pub fn update_uploaded_file(&mut self, file_id: &str, new_content: &str) {
        let original = self
            .original_contents
            .get(file_id)
            .map_or("", String::as_str);
        let Some(file) = self.uploaded_files.iter().find(|f| f.id == file_id) else {
            return;
        };
        let diff = generate_diff(original, new_content, &file.name);
        self.add_uploaded_diff(file_id, diff);
    }

    pub fn toggle_upload_mode(&mut self) {
        self.upload_mode = !self.upload_mode;
        self.selected_file = None;
        self.tree_cursor = None;
        self.diff = Loadable::Idle;
        self.diff_scroll = 0;
        self.focused_comment = None;
    }

    // === Derived views ===

    #[must_use]
    pub fn selected_repository(&self) -> Option<&Repository> {
        let id = self.selected_repo.as_deref()?;
        self.repositories.ready()?.iter().find(|r| r.id == id)
    }

    /// The tree shown in the file panel: uploads in upload mode, otherwise
    /// the loaded repository tree. Pruned when only files with issues are
    /// wanted.
    #[must_use]
    pub fn file_tree(&self) -> Vec<FileNode> {
        let tree = if self.upload_mode && !self.uploaded_files.is_empty() {
            let children = self
                .uploaded_files
                .iter()
                .map(|f| FileNode::file(f.id.clone(), f.name.clone(), f.name.clone()).with_comments(0))
                .collect();
            vec![FileNode::directory(
                UPLOAD_ROOT_ID,
                "Uploaded Files",
                "uploads",
                children,
            )]
        } else if self.upload_mode {
            Vec::new()
        } else {
            self.files.ready().cloned().unwrap_or_default()
        };

        if self.filters.show_only_files_with_issues {
            prune_files_without_issues(&tree)
        } else {
            tree
        }
    }

    /// Ids of the files in the panel tree, depth-first.
    #[must_use]
    pub fn file_ids(&self) -> Vec<String> {
        flatten_files(&self.file_tree())
            .into_iter()
            .map(|f| f.id.clone())
            .collect()
    }

    /// Visible tree rows, skipping children of collapsed directories.
    #[must_use]
    pub fn tree_rows(&self) -> Vec<TreeRow> {
        let mut rows = Vec::new();
        push_rows(&self.file_tree(), 0, &self.collapsed_dirs, &mut rows);
        rows
    }

    /// Index of the cursor row in `rows`. Falls back to the selected file
    /// when the cursor row is hidden or unset.
    #[must_use]
    pub fn tree_cursor_index(&self, rows: &[TreeRow]) -> Option<usize> {
        let find = |id: &str| rows.iter().position(|row| row.id == id);
        self.tree_cursor
            .as_deref()
            .and_then(find)
            .or_else(|| self.selected_file.as_deref().and_then(find))
    }

    /// Id of the directory under the tree cursor, if the cursor is on one.
    #[must_use]
    pub fn tree_cursor_directory(&self) -> Option<String> {
        let rows = self.tree_rows();
        let row = &rows[self.tree_cursor_index(&rows)?];
        (row.kind == FileKind::Directory).then(|| row.id.clone())
    }

    #[must_use]
    pub fn current_diff(&self) -> Option<&FileDiff> {
        let selected = self.selected_file.as_deref()?;
        if self.upload_mode {
            self.uploaded_diffs.get(selected)
        } else {
            self.diff.ready()
        }
    }

    #[must_use]
    pub fn all_reviews(&self) -> &[ReviewComment] {
        self.reviews.ready().map_or(&[], Vec::as_slice)
    }

    #[must_use]
    pub fn filtered_reviews(&self) -> Vec<&ReviewComment> {
        filter_comments(
            self.all_reviews(),
            self.selected_file.as_deref(),
            &self.filters,
        )
    }

    #[must_use]
    pub fn severity_counts(&self) -> SeverityCounts {
        SeverityCounts::tally(self.all_reviews())
    }

    #[must_use]
    pub fn uploaded_file(&self, file_id: &str) -> Option<&UploadedFile> {
        self.uploaded_files.iter().find(|f| f.id == file_id)
    }

    // === Layout ===

    /// Handle terminal resize
    pub const fn resize(&mut self, width: u16, height: u16) {
        self.width = width;
        self.height = height;
        self.layout_mode = LayoutMode::from_width(width);
    }

    /// Whether the file panel takes up columns next to the diff.
    #[must_use]
    pub const fn sidebar_shown(&self) -> bool {
        match self.layout_mode {
            LayoutMode::Full | LayoutMode::Compact => self.sidebar_visible,
            LayoutMode::Overlay | LayoutMode::Single => false,
        }
    }

    /// Refresh syntax spans when the diff on screen changed.
    pub fn sync_highlights(&mut self) {
        let key = self.current_diff().map(|diff| {
            format!(
                "{}:{}",
                self.selected_file.as_deref().unwrap_or_default(),
                diff.id
            )
        });
        if key == self.highlighted_for {
            return;
        }
        self.highlighted_lines = self
            .current_diff()
            .map(|diff| self.highlighter.highlight_diff(diff))
            .unwrap_or_default();
        self.highlighted_for = key;
    }
}

fn push_rows(nodes: &[FileNode], depth: usize, collapsed: &HashSet<String>, out: &mut Vec<TreeRow>) {
    for node in nodes {
        let expanded = !collapsed.contains(&node.id);
        out.push(TreeRow {
            id: node.id.clone(),
            name: node.name.clone(),
            kind: node.kind,
            depth,
            comment_count: node.comments(),
            expanded,
        });
        if !node.is_file() && expanded {
            push_rows(&node.children, depth + 1, collapsed, out);
        }
    }
}

/// Ids of the directories enclosing `file_id`, outermost first.
#[must_use]
pub fn ancestors_of(nodes: &[FileNode], file_id: &str) -> Option<Vec<String>> {
    for node in nodes {
        if node.id == file_id {
            return Some(Vec::new());
        }
        if let Some(mut path) = ancestors_of(&node.children, file_id) {
            path.insert(0, node.id.clone());
            return Some(path);
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::DiffLineKind;
    use chrono::Utc;
    use std::path::PathBuf;

    fn model() -> Model {
        Model::new(140, 40, UiConfig::default())
    }

    fn upload(id: &str, name: &str, content: &str) -> UploadedFile {
        UploadedFile {
            id: id.to_string(),
            name: name.to_string(),
            path: PathBuf::from(name),
            content: content.to_string(),
            language: "rust".to_string(),
            timestamp: Utc::now(),
        }
    }

    fn tree() -> Vec<FileNode> {
        vec![
            FileNode::directory(
                "d1",
                "src",
                "src",
                vec![
                    FileNode::file("f1", "a.rs", "src/a.rs").with_comments(1),
                    FileNode::directory(
                        "d2",
                        "util",
                        "src/util",
                        vec![FileNode::file("f2", "b.rs", "src/util/b.rs")],
                    ),
                ],
            ),
            FileNode::file("f3", "README.md", "README.md"),
        ]
    }

    #[test]
    fn selecting_a_repo_clears_the_file() {
        let mut model = model();
        model.set_selected_repo("repo-1");
        model.set_selected_file(Some("f1"));
        model.diff = Loadable::Loading;
        model.set_selected_repo("repo-2");
        assert_eq!(model.selected_repo.as_deref(), Some("repo-2"));
        assert_eq!(model.selected_file, None);
        assert!(model.diff.is_idle());
        assert!(model.files.is_idle());
    }

    #[test]
    fn uploads_show_under_a_single_root() {
        let mut model = model();
        model.accept_uploads(vec![upload("u1", "main.rs", "fn main() {}\n")]);
        assert!(model.upload_mode);

        let tree = model.file_tree();
        assert_eq!(tree.len(), 1);
        assert_eq!(tree[0].id, UPLOAD_ROOT_ID);
        assert_eq!(tree[0].name, "Uploaded Files");
        assert_eq!(tree[0].path, "uploads");
        assert_eq!(tree[0].children[0].id, "u1");
        assert_eq!(tree[0].children[0].comment_count, Some(0));
    }

    #[test]
    fn upload_diff_is_all_additions() {
        let mut model = model();
        model.accept_uploads(vec![upload("u1", "main.rs", "a\nb")]);
        model.set_selected_file(Some("u1"));
        let diff = model.current_diff().unwrap();
        assert_eq!(diff.status, FileStatus::Added);
        assert_eq!(diff.additions, 2);
        assert_eq!(diff.deletions, 0);
        assert_eq!(model.original_contents["u1"], "a\nb");
    }

    #[test]
    fn same_named_uploads_keep_separate_ids() {
        let mut model = model();
        model.accept_uploads(vec![
            upload("u1", "mod.rs", "a"),
            upload("u1", "mod.rs", "b\nc"),
        ]);
        model.accept_uploads(vec![upload("u1", "mod.rs", "d")]);

        let ids: Vec<&str> = model.uploaded_files.iter().map(|f| f.id.as_str()).collect();
        assert_eq!(ids, vec!["u1", "u1-2", "u1-3"]);
        assert_eq!(model.uploaded_diffs.len(), 3);
        assert_eq!(model.original_contents["u1"], "a");
        assert_eq!(model.original_contents["u1-2"], "b\nc");
        assert_eq!(model.uploaded_diffs["u1-2"].additions, 2);
        assert_eq!(model.file_ids(), vec!["u1", "u1-2", "u1-3"]);
    }

    #[test]
    fn updated_upload_diffs_against_original() {
        let mut model = model();
        model.accept_uploads(vec![upload("u1", "main.rs", "a\nb")]);
        model.update_uploaded_file("u1", "a\nc\nd");
        let diff = &model.uploaded_diffs["u1"];
        assert_eq!(diff.status, FileStatus::Modified);
        assert_eq!(diff.additions, 2);
        assert_eq!(diff.deletions, 1);
        let kinds: Vec<DiffLineKind> = diff.lines().map(|l| l.kind).collect();
        assert_eq!(kinds[1], DiffLineKind::Context);
    }

    #[test]
    fn clearing_uploads_leaves_upload_mode() {
        let mut model = model();
        model.accept_uploads(vec![upload("u1", "main.rs", "x")]);
        model.set_selected_file(Some("u1"));
        model.clear_uploaded_files();
        assert!(!model.upload_mode);
        assert!(model.uploaded_files.is_empty());
        assert!(model.uploaded_diffs.is_empty());
        assert!(model.original_contents.is_empty());
        assert_eq!(model.selected_file, None);
    }

    #[test]
    fn toggling_upload_mode_clears_selection() {
        let mut model = model();
        model.set_selected_repo("repo-1");
        model.set_selected_file(Some("f1"));
        model.toggle_upload_mode();
        assert!(model.upload_mode);
        assert_eq!(model.selected_file, None);
        assert!(model.file_tree().is_empty());
        model.toggle_upload_mode();
        assert!(!model.upload_mode);
    }

    #[test]
    fn fetched_diff_is_ignored_in_upload_mode() {
        let mut model = model();
        model.files = Loadable::Ready(tree());
        model.set_selected_file(Some("f1"));
        model.diff = Loadable::Ready(generate_diff("", "x", "a.rs"));
        assert!(model.current_diff().is_some());
        model.upload_mode = true;
        assert!(model.current_diff().is_none());
    }

    #[test]
    fn collapsed_directories_hide_children() {
        let mut model = model();
        model.files = Loadable::Ready(tree());
        let ids: Vec<String> = model.tree_rows().into_iter().map(|r| r.id).collect();
        assert_eq!(ids, vec!["d1", "f1", "d2", "f2", "f3"]);

        model.collapsed_dirs.insert("d2".to_string());
        let rows = model.tree_rows();
        let ids: Vec<&str> = rows.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["d1", "f1", "d2", "f3"]);
        assert!(!rows[2].expanded);
        assert_eq!(rows[1].depth, 1);
    }

    #[test]
    fn cursor_index_falls_back_to_selection() {
        let mut model = model();
        model.files = Loadable::Ready(tree());
        model.set_selected_file(Some("f2"));
        assert_eq!(model.tree_cursor.as_deref(), Some("f2"));
        assert_eq!(model.tree_cursor_index(&model.tree_rows()), Some(3));

        model.tree_cursor = Some("d2".to_string());
        assert_eq!(model.tree_cursor_index(&model.tree_rows()), Some(2));

        // d1 hides d2, so the cursor falls back to the selected file, also hidden
        model.collapsed_dirs.insert("d1".to_string());
        assert_eq!(model.tree_cursor_index(&model.tree_rows()), None);

        model.set_selected_file(None);
        assert_eq!(model.tree_cursor, None);
    }

    #[test]
    fn files_with_issues_filter_prunes_tree() {
        let mut model = model();
        model.files = Loadable::Ready(tree());
        model.filters.show_only_files_with_issues = true;
        assert_eq!(model.file_ids(), vec!["f1"]);
    }

    #[test]
    fn ancestors_are_outermost_first() {
        assert_eq!(
            ancestors_of(&tree(), "f2"),
            Some(vec!["d1".to_string(), "d2".to_string()])
        );
        assert_eq!(ancestors_of(&tree(), "f3"), Some(Vec::new()));
        assert_eq!(ancestors_of(&tree(), "nope"), None);
    }

    #[test]
    fn layout_modes_by_width() {
        assert_eq!(LayoutMode::from_width(150), LayoutMode::Full);
        assert_eq!(LayoutMode::from_width(100), LayoutMode::Compact);
        assert_eq!(LayoutMode::from_width(85), LayoutMode::Overlay);
        assert_eq!(LayoutMode::from_width(60).sidebar_width(), 0);
    }
}
