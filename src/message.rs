//! Message types for the Elm Architecture

use std::path::PathBuf;
use std::time::Instant;

use crate::api::{Completed, QueryKey};
use crate::filter::FilterPatch;
use crate::types::Severity;

/// All possible user actions and system events
#[derive(Debug, Clone)]
pub enum Message {
    // === Data ===
    /// A query was scheduled for this key
    QueryStarted(QueryKey),
    /// A query finished (or was answered from cache)
    QueryResolved(Completed),
    /// Drop cached data and refetch everything on screen
    Reload,

    // === Repository ===
    OpenRepoPicker,
    CloseRepoPicker,
    RepoPickerUp,
    RepoPickerDown,
    RepoPickerConfirm,
    SelectRepo(String),

    // === File Tree ===
    /// Select a file by id, or clear the selection
    SelectFile(Option<String>),
    /// Select the next file in tree order
    NextFile,
    /// Select the previous file in tree order
    PrevFile,
    /// Move the tree cursor down one visible row
    TreeCursorDown,
    /// Move the tree cursor up one visible row
    TreeCursorUp,
    /// Expand or collapse a directory by id
    ToggleDirectory(String),
    /// Expand or collapse the directory under the cursor, or the one
    /// holding the selected file
    ToggleParentDirectory,
    ExpandAll,

    // === Diff Pane ===
    ScrollUp,
    ScrollDown,
    PageUp,
    PageDown,
    ScrollTop,
    ScrollBottom,
    /// Focus the next comment in the diff
    NextComment,
    /// Focus the previous comment in the diff
    PrevComment,
    /// Show or hide the focused comment's suggestion
    ToggleSuggestion,

    // === Focus / Layout ===
    ToggleFocus,
    ToggleSidebar,

    // === Filters ===
    SearchActivate,
    SearchInput(String),
    SearchBackspace,
    SearchClearLine,
    /// Apply the typed query now and leave the search box
    SearchSubmit,
    /// Clear the query and leave the search box
    SearchCancel,
    ToggleSeverity(Severity),
    SetFilters(FilterPatch),
    ResetFilters,
    ToggleFilesWithIssues,

    // === Upload ===
    ToggleUploadMode,
    OpenUploadPrompt,
    UploadInput(String),
    UploadBackspace,
    UploadSubmit,
    UploadCancel,
    UploadPaths(Vec<PathBuf>),
    /// Re-read the selected uploaded file and diff it against the original
    RefreshUploadedFile,
    ClearUploads,

    // === Theme Selection ===
    CycleTheme,
    ApplyTheme(String),

    // === System ===
    /// Terminal resize event
    Resize {
        width: u16,
        height: u16,
    },
    /// Periodic tick driving the search debounce
    Tick(Instant),
    /// Request to quit
    Quit,
    /// No-op (ignore event)
    Noop,
}
