//! cr-ui - terminal dashboard for AI code review comments
//!
//! Usage: cr-ui [--repo <id>] [--upload <paths>...] [--theme <name|path>]
//!
//! Browses the bundled fixture repositories unless `--fixtures` points at a
//! directory with `repos.json`, `files.json`, `diffs.json` and `reviews.json`.

use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use clap::Parser;
use opentui::input::ParseError;
use opentui::{enable_raw_mode, terminal_size, InputParser, Renderer, RendererOptions};

use codereview_ui::config::{self, load_ui_config, save_ui_config, UiConfig};
use codereview_ui::input::map_event_to_message;
use codereview_ui::loader::drive_queries;
use codereview_ui::theme::{load_built_in_theme, load_theme_from_path, ThemeLoadResult, DEFAULT_THEME};
use codereview_ui::{update, view, FixtureSet, Highlighter, Message, Model, QueryClient, Theme};

#[derive(Debug, Parser)]
#[command(name = "cr-ui", version, about = "Browse diffs and AI review comments in the terminal")]
struct Args {
    /// Theme name (default-dark, default-light, nord) or path to a JSON theme
    #[arg(long, env = "CR_UI_THEME")]
    theme: Option<String>,

    /// Directory with repos.json, files.json, diffs.json and reviews.json
    #[arg(long, value_name = "DIR")]
    fixtures: Option<PathBuf>,

    /// Simulated API latency in milliseconds
    #[arg(long, value_name = "MS")]
    latency_ms: Option<u64>,

    /// Write logs to this file (the terminal is owned by the UI)
    #[arg(long, env = "CR_UI_LOG", value_name = "PATH")]
    log_file: Option<PathBuf>,

    /// Local files to review; starts in upload mode
    #[arg(long, num_args = 1.., value_name = "PATH")]
    upload: Vec<PathBuf>,

    /// Repository id to open on start
    #[arg(long, value_name = "ID")]
    repo: Option<String>,
}

fn main() -> Result<()> {
    let args = Args::parse();
    if let Some(path) = &args.log_file {
        init_logging(path)?;
    }

    let mut config = load_ui_config()?.unwrap_or_default();
    let loaded_theme = resolve_theme(&args, &mut config)?;

    if let Some(latency) = args.latency_ms {
        config.api_latency_ms = Some(latency);
    }
    let fixtures_dir = args.fixtures.clone().or_else(|| config.fixtures_dir.clone());
    let fixtures = match &fixtures_dir {
        Some(dir) => FixtureSet::load_dir(dir)
            .with_context(|| format!("Failed to load fixtures: {}", dir.display()))?,
        None => FixtureSet::builtin().context("Failed to load built-in fixtures")?,
    };
    let mut client = QueryClient::new(Box::new(fixtures))
        .with_latency(config.api_latency())
        .with_stale_time(config.stale_time());

    // Get terminal size
    let (term_width, height) = terminal_size().unwrap_or((80, 24));
    let width = term_width.saturating_sub(2).max(1);

    let mut model = Model::new(width as u16, height as u16, config);
    model.config_path = config::config_path();
    model.highlighter = Highlighter::with_theme(loaded_theme.syntax_theme_name());
    model.theme = loaded_theme.theme;

    if let Some(repo) = args.repo {
        update(&mut model, Message::SelectRepo(repo));
    }
    if !args.upload.is_empty() {
        update(&mut model, Message::UploadPaths(args.upload));
    }
    drive_queries(&mut model, &mut client, Instant::now());

    // Enter raw mode for input handling
    let _raw_guard = enable_raw_mode().context("Failed to enable raw mode")?;

    let options = RendererOptions {
        use_alt_screen: true,
        hide_cursor: true,
        enable_mouse: false,
        query_capabilities: false,
    };
    let mut renderer = Renderer::new_with_options(width.into(), height.into(), options)
        .context("Failed to initialize renderer")?;
    let _wrap_guard = AutoWrapGuard::new().context("Failed to disable line wrap")?;
    renderer.set_background(model.theme.background);

    let mut input = InputParser::new();
    log::info!("Started at {}x{}", model.width, model.height);

    loop {
        // Detect external terminal resize even if no input events are received
        if let Ok((term_width, term_height)) = terminal_size() {
            let ui_width = term_width.saturating_sub(2).max(1);
            let term_width_u16 = ui_width as u16;
            let term_height_u16 = term_height as u16;
            if term_width_u16 != model.width || term_height_u16 != model.height {
                update(
                    &mut model,
                    Message::Resize {
                        width: term_width_u16,
                        height: term_height_u16,
                    },
                );
                renderer
                    .resize(ui_width.into(), term_height.into())
                    .context("Failed to resize renderer")?;
            }
        }

        // Force a full redraw to avoid render artifacts
        renderer.invalidate();
        model.needs_redraw = false;

        renderer.set_background(model.theme.background);
        renderer.clear();
        view(&model, renderer.buffer());
        renderer.present().context("Failed to present frame")?;

        if model.should_quit {
            break;
        }

        let mut buf = [0u8; 32];
        if let Ok(n) = read_with_timeout(&mut buf, Duration::from_millis(100)) {
            let mut offset = 0usize;
            while offset < n {
                match input.parse(&buf[offset..n]) {
                    Ok((event, consumed)) => {
                        offset = offset.saturating_add(consumed);
                        let msg = map_event_to_message(&model, &event);
                        let resize = if let Message::Resize { width, height } = msg {
                            Some((width, height))
                        } else {
                            None
                        };
                        update(&mut model, msg);

                        if let Some((width, height)) = resize {
                            renderer
                                .resize(width.into(), height.into())
                                .context("Failed to resize renderer")?;
                            model.needs_redraw = true;
                        }
                    }
                    Err(ParseError::Empty | ParseError::Incomplete) => break,
                    Err(_) => {
                        offset = offset.saturating_add(1);
                    }
                }
            }
        }

        // Debounced search and simulated fetches advance on every pass
        let now = Instant::now();
        update(&mut model, Message::Tick(now));
        drive_queries(&mut model, &mut client, now);
    }

    log::info!("Exiting");
    Ok(())
}

/// Pick the theme from CLI/env, then config, then the built-in default.
/// A built-in theme named on the command line is saved to the config.
fn resolve_theme(args: &Args, config: &mut UiConfig) -> Result<ThemeLoadResult> {
    let theme_override = args.theme.clone();
    let theme_selection = theme_override.clone().or_else(|| config.theme.clone());

    let default_theme = || {
        load_built_in_theme(DEFAULT_THEME).unwrap_or_else(|| ThemeLoadResult {
            theme: Theme::default(),
            syntax_theme: None,
        })
    };

    let mut selected_builtin: Option<String> = None;
    let loaded = if let Some(selection) = theme_selection {
        if let Some(loaded) = load_built_in_theme(&selection) {
            selected_builtin = Some(selection);
            loaded
        } else {
            let path = Path::new(&selection);
            if path.exists() {
                load_theme_from_path(path)
                    .with_context(|| format!("Failed to load theme: {}", path.display()))?
            } else if theme_override.is_some() {
                anyhow::bail!("Unknown theme: {selection}");
            } else {
                log::warn!("Configured theme {selection} not found, using default");
                default_theme()
            }
        }
    } else {
        default_theme()
    };

    if theme_override.is_some() {
        if let Some(name) = selected_builtin {
            if config.theme.as_deref() != Some(name.as_str()) {
                config.theme = Some(name);
                save_ui_config(config)?;
            }
        }
    }

    Ok(loaded)
}

fn init_logging(path: &Path) -> Result<()> {
    let file = File::create(path)
        .with_context(|| format!("Failed to open log file: {}", path.display()))?;
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .target(env_logger::Target::Pipe(Box::new(file)))
        .init();
    Ok(())
}

struct AutoWrapGuard;

impl AutoWrapGuard {
    fn new() -> std::io::Result<Self> {
        let mut out = std::io::stdout();
        out.write_all(b"\x1b[?7l")?; // Disable line wrap
        out.flush()?;
        Ok(Self)
    }
}

impl Drop for AutoWrapGuard {
    fn drop(&mut self) {
        let mut out = std::io::stdout();
        let _ = out.write_all(b"\x1b[?7h"); // Re-enable line wrap
        let _ = out.flush();
    }
}

/// Read from stdin. Raw mode is set up with VMIN=0, VTIME=1, so this
/// returns after roughly 100ms even without input.
fn read_with_timeout(buf: &mut [u8], _timeout: Duration) -> std::io::Result<usize> {
    use std::io::Read;
    std::io::stdin().read(buf)
}
