//! Line diffs: naive generation for uploaded files and unified-patch parsing
//! for fixture data.

mod generate;
mod parse;

pub use generate::{compute_diff, detect_language, generate_diff, DiffResult};
pub use parse::{parse_patch, ParsedPatch};
