//! Dashboard colors
//!
//! A theme file names 7 seed colors. Chrome, diff and severity colors are
//! derived from them, and any derived color can be pinned with an override.

use std::path::Path;

use opentui::{Rgba, Style};
use serde::Deserialize;

use crate::color::{color_blend_over, color_from_hex, color_lerp, color_luminance, color_with_alpha};
use crate::error::{Error, Result};
use crate::types::Severity;

pub const DEFAULT_THEME: &str = "default-dark";

const BUILTIN_THEMES: &[(&str, &str)] = &[
    (DEFAULT_THEME, include_str!("../../themes/default-dark.json")),
    ("default-light", include_str!("../../themes/default-light.json")),
    ("nord", include_str!("../../themes/nord.json")),
];

/// Colors of the diff pane.
#[derive(Debug, Clone)]
pub struct DiffTheme {
    pub added: Rgba,
    pub removed: Rgba,
    pub context: Rgba,
    /// `@@` rows
    pub hunk_header: Rgba,
    pub added_bg: Rgba,
    pub removed_bg: Rgba,
    pub context_bg: Rgba,
    pub hunk_header_bg: Rgba,
    pub line_number: Rgba,
    pub added_line_number_bg: Rgba,
    pub removed_line_number_bg: Rgba,
}

/// Accent and card tint for one severity.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SeverityColors {
    pub accent: Rgba,
    pub card_bg: Rgba,
}

impl SeverityColors {
    fn tinted(accent: Rgba, bg: Rgba) -> Self {
        Self {
            accent,
            card_bg: color_blend_over(color_with_alpha(accent, 0.10), bg),
        }
    }
}

#[derive(Debug, Clone)]
pub struct SeverityTheme {
    pub critical: SeverityColors,
    pub warning: SeverityColors,
    pub info: SeverityColors,
}

impl SeverityTheme {
    #[must_use]
    pub const fn get(&self, severity: Severity) -> SeverityColors {
        match severity {
            Severity::Critical => self.critical,
            Severity::Warning => self.warning,
            Severity::Info => self.info,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Theme {
    pub name: String,
    pub is_dark: bool,

    pub background: Rgba,
    pub foreground: Rgba,
    pub panel_bg: Rgba,
    pub border: Rgba,
    pub border_focused: Rgba,
    pub selection_bg: Rgba,
    pub selection_fg: Rgba,

    pub primary: Rgba,
    pub success: Rgba,
    pub warning: Rgba,
    pub error: Rgba,
    pub muted: Rgba,

    pub diff: DiffTheme,
    pub severity: SeverityTheme,
}

impl Default for Theme {
    fn default() -> Self {
        Self::dark()
    }
}

impl Theme {
    #[must_use]
    pub fn style_muted(&self) -> Style {
        Style::fg(self.muted)
    }

    #[must_use]
    pub fn style_muted_on(&self, bg: Rgba) -> Style {
        Style::fg(self.muted).with_bg(bg)
    }

    #[must_use]
    pub fn style_foreground(&self) -> Style {
        Style::fg(self.foreground)
    }

    #[must_use]
    pub fn style_foreground_on(&self, bg: Rgba) -> Style {
        Style::fg(self.foreground).with_bg(bg)
    }

    #[must_use]
    pub fn style_primary(&self) -> Style {
        Style::fg(self.primary)
    }

    #[must_use]
    pub fn style_primary_on(&self, bg: Rgba) -> Style {
        Style::fg(self.primary).with_bg(bg)
    }

    /// Accent color for a comment severity.
    #[must_use]
    pub const fn severity_color(&self, severity: Severity) -> Rgba {
        self.severity.get(severity).accent
    }

    /// Background of a comment card.
    #[must_use]
    pub const fn severity_bg(&self, severity: Severity) -> Rgba {
        self.severity.get(severity).card_bg
    }

    /// Syntect theme to pair with this palette when the theme file names none.
    #[must_use]
    pub const fn default_syntax_theme(&self) -> &'static str {
        if self.is_dark {
            "base16-ocean.dark"
        } else {
            "base16-ocean.light"
        }
    }

    /// The bundled default theme.
    ///
    /// # Panics
    ///
    /// Panics if the bundled theme file does not parse.
    #[must_use]
    pub fn dark() -> Self {
        load_built_in_theme(DEFAULT_THEME)
            .map(|loaded| loaded.theme)
            .expect("bundled default theme is valid")
    }

    /// Derive a full theme from seed colors, then apply overrides.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidColor`] for any seed or override that is not
    /// a `#rrggbb` or `#rrggbbaa` color.
    pub fn from_seeds(name: String, seeds: &ThemeSeeds, overrides: &ThemeOverrides) -> Result<Self> {
        let bg = parse_color(&seeds.background)?;
        let fg = parse_color(&seeds.foreground)?;
        let primary = parse_color(&seeds.primary)?;
        let muted = parse_color(&seeds.muted)?;
        let success = parse_color(&seeds.success)?;
        let warning = parse_color(&seeds.warning)?;
        let error = parse_color(&seeds.error)?;
        let tint = |color: Rgba, alpha: f32| color_blend_over(color_with_alpha(color, alpha), bg);

        let mut theme = Self {
            name,
            is_dark: color_luminance(bg) < 0.5,
            background: bg,
            foreground: fg,
            panel_bg: color_lerp(bg, fg, 0.05),
            border: color_lerp(bg, fg, 0.15),
            border_focused: primary,
            selection_bg: tint(primary, 0.25),
            selection_fg: fg,
            primary,
            success,
            warning,
            error,
            muted,
            diff: DiffTheme {
                added: color_lerp(success, fg, 0.3),
                removed: color_lerp(error, fg, 0.3),
                context: fg,
                hunk_header: muted,
                added_bg: tint(success, 0.08),
                removed_bg: tint(error, 0.08),
                context_bg: bg,
                hunk_header_bg: tint(primary, 0.06),
                line_number: muted,
                added_line_number_bg: tint(success, 0.05),
                removed_line_number_bg: tint(error, 0.05),
            },
            severity: SeverityTheme {
                critical: SeverityColors::tinted(error, bg),
                warning: SeverityColors::tinted(warning, bg),
                info: SeverityColors::tinted(primary, bg),
            },
        };
        theme.apply_overrides(overrides)?;
        Ok(theme)
    }

    fn apply_overrides(&mut self, overrides: &ThemeOverrides) -> Result<()> {
        let bg = self.background;
        let pinned = [
            (&overrides.panel_bg, &mut self.panel_bg),
            (&overrides.selection_bg, &mut self.selection_bg),
            (&overrides.selection_fg, &mut self.selection_fg),
            (&overrides.border, &mut self.border),
            (&overrides.border_focused, &mut self.border_focused),
            (&overrides.diff_added, &mut self.diff.added),
            (&overrides.diff_removed, &mut self.diff.removed),
            (&overrides.diff_hunk_header, &mut self.diff.hunk_header),
            (&overrides.diff_added_bg, &mut self.diff.added_bg),
            (&overrides.diff_removed_bg, &mut self.diff.removed_bg),
            (&overrides.diff_line_number, &mut self.diff.line_number),
        ];
        for (source, target) in pinned {
            if let Some(hex) = source {
                *target = parse_color(hex)?;
            }
        }

        // A severity accent also re-tints its card
        let accents = [
            (&overrides.severity_critical, &mut self.severity.critical),
            (&overrides.severity_warning, &mut self.severity.warning),
            (&overrides.severity_info, &mut self.severity.info),
        ];
        for (source, target) in accents {
            if let Some(hex) = source {
                *target = SeverityColors::tinted(parse_color(hex)?, bg);
            }
        }
        Ok(())
    }
}

/// The 7 colors every theme file defines.
#[derive(Debug, Clone, Deserialize)]
pub struct ThemeSeeds {
    pub background: String,
    pub foreground: String,
    pub primary: String,
    pub muted: String,
    pub success: String,
    pub warning: String,
    pub error: String,
}

/// Derived colors a theme file may pin.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ThemeOverrides {
    pub panel_bg: Option<String>,
    pub selection_bg: Option<String>,
    pub selection_fg: Option<String>,
    pub border: Option<String>,
    pub border_focused: Option<String>,
    pub diff_added: Option<String>,
    pub diff_removed: Option<String>,
    pub diff_hunk_header: Option<String>,
    pub diff_added_bg: Option<String>,
    pub diff_removed_bg: Option<String>,
    pub diff_line_number: Option<String>,
    pub severity_critical: Option<String>,
    pub severity_warning: Option<String>,
    pub severity_info: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ThemeFile {
    name: String,
    syntax_theme: Option<String>,
    seeds: ThemeSeeds,
    #[serde(default)]
    overrides: ThemeOverrides,
}

#[derive(Debug, Clone)]
pub struct ThemeLoadResult {
    pub theme: Theme,
    /// Syntect theme named by the file, if any
    pub syntax_theme: Option<String>,
}

impl ThemeLoadResult {
    /// The file's syntect theme, else one matching the palette's brightness.
    #[must_use]
    pub fn syntax_theme_name(&self) -> &str {
        self.syntax_theme
            .as_deref()
            .unwrap_or_else(|| self.theme.default_syntax_theme())
    }
}

fn parse_color(hex: &str) -> Result<Rgba> {
    color_from_hex(hex).ok_or_else(|| Error::InvalidColor(hex.to_string()))
}

/// Load a theme file from disk.
///
/// # Errors
///
/// Fails when the file cannot be read, is not a theme, or has a bad color.
pub fn load_theme_from_path(path: &Path) -> Result<ThemeLoadResult> {
    let json = std::fs::read_to_string(path).map_err(|source| Error::io(path, source))?;
    load_theme_from_str(&json)
}

/// Parse a theme file.
///
/// # Errors
///
/// Fails on malformed JSON or a bad color.
pub fn load_theme_from_str(json: &str) -> Result<ThemeLoadResult> {
    let file: ThemeFile = serde_json::from_str(json).map_err(Error::Theme)?;
    let theme = Theme::from_seeds(file.name, &file.seeds, &file.overrides)?;
    Ok(ThemeLoadResult {
        theme,
        syntax_theme: file.syntax_theme,
    })
}

#[must_use]
pub fn load_built_in_theme(name: &str) -> Option<ThemeLoadResult> {
    let (_, json) = BUILTIN_THEMES.iter().find(|(builtin, _)| *builtin == name)?;
    match load_theme_from_str(json) {
        Ok(loaded) => Some(loaded),
        Err(err) => {
            log::warn!("Bundled theme {name} is broken: {err}");
            None
        }
    }
}

#[must_use]
pub fn built_in_theme_names() -> Vec<&'static str> {
    BUILTIN_THEMES.iter().map(|(name, _)| *name).collect()
}
