//! codereview-ui - terminal dashboard for AI code review comments
//!
//! Uses Elm Architecture (Model/Message/Update/View) with `opentui_rust` rendering.
//! Data comes from a fixture-backed mock API with simulated latency, or from
//! local files diffed against their uploaded versions.

#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::too_many_lines)]

pub mod api;
pub mod color;
pub mod config;
pub mod diff;
pub mod error;
pub mod filter;
pub mod fixtures;
pub mod input;
pub mod layout;
pub mod loader;
pub mod message;
pub mod model;
pub mod stream;
pub mod syntax;
pub mod text;
pub mod theme;
pub mod types;
pub mod update;
pub mod upload;
pub mod view;

pub use api::QueryClient;
pub use error::{Error, Result};
pub use fixtures::FixtureSet;
pub use message::Message;
pub use model::{Focus, LayoutMode, Model};
pub use syntax::{HighlightSpan, Highlighter};
pub use theme::Theme;
pub use update::update;
pub use view::view;
