//! Syntax highlighting module using syntect
//!
//! Diff lines are highlighted once when a diff arrives; the view only looks
//! the spans up by row.

use std::path::Path;

use syntect::easy::HighlightLines;
use syntect::highlighting::{Color, FontStyle, Theme as SyntectTheme, ThemeSet};
use syntect::parsing::{SyntaxReference, SyntaxSet};

use opentui::Rgba;

use crate::types::{DiffLineKind, FileDiff};

const DEFAULT_SYNTAX_THEME: &str = "base16-ocean.dark";

/// Highlighted text span with color information
#[derive(Debug, Clone)]
pub struct HighlightSpan {
    pub text: String,
    pub fg: Rgba,
    pub bold: bool,
}

/// Syntax highlighter with loaded syntaxes and theme
pub struct Highlighter {
    syntax_set: SyntaxSet,
    theme: SyntectTheme,
}

impl Highlighter {
    #[must_use]
    pub fn new() -> Self {
        Self::with_theme(DEFAULT_SYNTAX_THEME)
    }

    /// Create a highlighter with a specific syntect theme name, falling back
    /// to the default dark theme when the name is unknown.
    #[must_use]
    pub fn with_theme(theme_name: &str) -> Self {
        let syntax_set = SyntaxSet::load_defaults_newlines();
        let mut theme_set = ThemeSet::load_defaults();

        let theme = theme_set
            .themes
            .remove(theme_name)
            .or_else(|| theme_set.themes.remove(DEFAULT_SYNTAX_THEME))
            .unwrap_or_default();

        Self { syntax_set, theme }
    }

    /// Resolve a syntax by file extension, well-known file name, or the
    /// language name attached to a diff.
    fn syntax_for(&self, path: &str, language: Option<&str>) -> Option<&SyntaxReference> {
        let path = Path::new(path);

        if let Some(ext) = path.extension().and_then(|e| e.to_str()) {
            if let Some(syntax) = self.syntax_set.find_syntax_by_extension(ext) {
                return Some(syntax);
            }
        }

        if let Some(name) = path.file_name().and_then(|n| n.to_str()) {
            match name {
                "Makefile" | "makefile" | "GNUmakefile" => {
                    return self.syntax_set.find_syntax_by_extension("make");
                }
                "Dockerfile" => {
                    return self.syntax_set.find_syntax_by_extension("dockerfile");
                }
                _ => {}
            }
        }

        // The bundled syntax set has no TypeScript, Kotlin or Swift grammar;
        // borrow the closest one.
        let token = match language? {
            "typescript" | "javascript" => "js",
            "kotlin" | "swift" => "java",
            "csharp" => "cs",
            "python" => "py",
            "ruby" => "rb",
            "rust" => "rs",
            "json" => "json",
            other => other,
        };
        self.syntax_set
            .find_syntax_by_token(token)
            .or_else(|| self.syntax_set.find_syntax_by_extension(token))
    }

    /// Highlight a single line of code, returning spans with colors
    ///
    /// Returns None if the syntax couldn't be determined or highlighting failed.
    pub fn highlight_line(&self, line: &str, file_path: &str) -> Option<Vec<HighlightSpan>> {
        let syntax = self.syntax_for(file_path, None)?;
        let mut highlighter = HighlightLines::new(syntax, &self.theme);
        let ranges = highlighter.highlight_line(line, &self.syntax_set).ok()?;
        Some(to_spans(ranges))
    }

    /// Spans for every line of `diff` in display order. Header lines and
    /// lines of unknown languages get an empty span list.
    #[must_use]
    pub fn highlight_diff(&self, diff: &FileDiff) -> Vec<Vec<HighlightSpan>> {
        let Some(syntax) = self.syntax_for(&diff.file_name, diff.language.as_deref()) else {
            return diff.lines().map(|_| Vec::new()).collect();
        };

        // Removed and added lines come from different file versions; keep a
        // separate parse state for each side.
        let mut old_side = HighlightLines::new(syntax, &self.theme);
        let mut new_side = HighlightLines::new(syntax, &self.theme);

        diff.lines()
            .map(|line| {
                let state = match line.kind {
                    DiffLineKind::Header => return Vec::new(),
                    DiffLineKind::Remove => &mut old_side,
                    DiffLineKind::Add | DiffLineKind::Context => &mut new_side,
                };
                let text = format!("{}\n", line.content);
                state
                    .highlight_line(&text, &self.syntax_set)
                    .map(|ranges| {
                        let mut spans = to_spans(ranges);
                        if let Some(last) = spans.last_mut() {
                            if last.text.ends_with('\n') {
                                last.text.pop();
                            }
                        }
                        spans
                    })
                    .unwrap_or_default()
            })
            .collect()
    }
}

impl Default for Highlighter {
    fn default() -> Self {
        Self::new()
    }
}

fn to_spans(ranges: Vec<(syntect::highlighting::Style, &str)>) -> Vec<HighlightSpan> {
    ranges
        .into_iter()
        .map(|(style, text)| HighlightSpan {
            text: text.to_string(),
            fg: syntect_color_to_rgba(style.foreground),
            bold: style.font_style.contains(FontStyle::BOLD),
        })
        .collect()
}

/// Convert syntect `Color` to backend `Rgba`.
fn syntect_color_to_rgba(color: Color) -> Rgba {
    Rgba::new(
        f32::from(color.r) / 255.0,
        f32::from(color.g) / 255.0,
        f32::from(color.b) / 255.0,
        f32::from(color.a) / 255.0,
    )
}
