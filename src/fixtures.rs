//! Mock review data loaded from JSON fixtures.
//!
//! The built-in set is compiled into the binary; `load_dir` reads the same
//! four files from disk so a custom data set can be pointed at with
//! `--fixtures`.

use std::collections::HashMap;
use std::path::Path;

use serde::Deserialize;

use crate::api::ReviewApi;
use crate::diff::parse_patch;
use crate::error::{Error, Result};
use crate::types::{FileDiff, FileNode, FileStatus, Repository, ReviewComment};

const REPOS_JSON: &str = include_str!("../fixtures/repos.json");
const FILES_JSON: &str = include_str!("../fixtures/files.json");
const DIFFS_JSON: &str = include_str!("../fixtures/diffs.json");
const REVIEWS_JSON: &str = include_str!("../fixtures/reviews.json");

/// A diff as stored on disk: metadata plus a unified patch.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PatchFixture {
    file_name: String,
    #[serde(default)]
    old_file_name: Option<String>,
    status: FileStatus,
    #[serde(default)]
    language: Option<String>,
    patch: String,
}

impl PatchFixture {
    fn into_diff(self, file_id: &str) -> FileDiff {
        let parsed = parse_patch(&self.patch);
        FileDiff {
            id: format!("diff-{file_id}"),
            file_name: self.file_name,
            old_file_name: self.old_file_name,
            status: self.status,
            additions: parsed.additions,
            deletions: parsed.deletions,
            hunks: parsed.hunks,
            language: self.language,
        }
    }
}

/// Repositories, trees, diffs and review comments backing the mock API.
#[derive(Debug, Clone, Default)]
pub struct FixtureSet {
    repositories: Vec<Repository>,
    files: HashMap<String, Vec<FileNode>>,
    diffs: HashMap<String, FileDiff>,
    reviews: Vec<ReviewComment>,
}

impl FixtureSet {
    /// The data set shipped with the binary.
    ///
    /// # Errors
    ///
    /// Returns an error if a compiled-in fixture fails to parse.
    pub fn builtin() -> Result<Self> {
        Self::from_sources(REPOS_JSON, FILES_JSON, DIFFS_JSON, REVIEWS_JSON)
    }

    /// Load `repos.json`, `files.json`, `diffs.json` and `reviews.json` from `dir`.
    ///
    /// # Errors
    ///
    /// Returns an error if any file is missing, unreadable or malformed.
    pub fn load_dir(dir: &Path) -> Result<Self> {
        let read = |name: &str| {
            let path = dir.join(name);
            std::fs::read_to_string(&path).map_err(|e| Error::io(path, e))
        };
        let set = Self::from_sources(
            &read("repos.json")?,
            &read("files.json")?,
            &read("diffs.json")?,
            &read("reviews.json")?,
        )?;
        log::info!(
            "Loaded fixtures from {}: {} repositories, {} diffs, {} reviews",
            dir.display(),
            set.repositories.len(),
            set.diffs.len(),
            set.reviews.len()
        );
        Ok(set)
    }

    fn from_sources(repos: &str, files: &str, diffs: &str, reviews: &str) -> Result<Self> {
        let repositories = parse_json("repos.json", repos)?;
        let files = parse_json("files.json", files)?;
        let patches: HashMap<String, PatchFixture> = parse_json("diffs.json", diffs)?;
        let reviews = parse_json("reviews.json", reviews)?;

        let diffs = patches
            .into_iter()
            .map(|(file_id, fixture)| {
                let diff = fixture.into_diff(&file_id);
                (file_id, diff)
            })
            .collect();

        Ok(Self {
            repositories,
            files,
            diffs,
            reviews,
        })
    }
}

fn parse_json<T: for<'de> Deserialize<'de>>(name: &str, source: &str) -> Result<T> {
    serde_json::from_str(source).map_err(|source| Error::Fixture {
        name: name.to_string(),
        source,
    })
}

impl ReviewApi for FixtureSet {
    fn repositories(&self) -> Result<Vec<Repository>> {
        Ok(self.repositories.clone())
    }

    fn files(&self, repo_id: &str) -> Result<Vec<FileNode>> {
        self.files
            .get(repo_id)
            .cloned()
            .ok_or_else(|| Error::not_found("files", format!("repository {repo_id}")))
    }

    fn diff(&self, file_id: &str) -> Result<FileDiff> {
        self.diffs
            .get(file_id)
            .cloned()
            .ok_or_else(|| Error::not_found("diff", format!("file {file_id}")))
    }

    fn reviews(&self, file_id: Option<&str>) -> Result<Vec<ReviewComment>> {
        Ok(self
            .reviews
            .iter()
            .filter(|r| file_id.is_none_or(|id| r.file_id == id))
            .cloned()
            .collect())
    }
}
