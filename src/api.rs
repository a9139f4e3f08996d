//! Simulated-latency query layer over a review data source.
//!
//! Requests never resolve inline: `fetch` schedules a query that becomes due
//! after the configured latency and `poll` resolves everything due. Fresh
//! cached results short-circuit the delay.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use crate::error::Result;
use crate::types::{FileDiff, FileNode, Repository, ReviewComment};

pub const DEFAULT_LATENCY: Duration = Duration::from_millis(500);
pub const DEFAULT_STALE_TIME: Duration = Duration::from_secs(5 * 60);

/// Source of repositories, file trees, diffs and review comments.
pub trait ReviewApi {
    fn repositories(&self) -> Result<Vec<Repository>>;
    fn files(&self, repo_id: &str) -> Result<Vec<FileNode>>;
    fn diff(&self, file_id: &str) -> Result<FileDiff>;
    /// Comments for one file, or every comment when `file_id` is `None`.
    fn reviews(&self, file_id: Option<&str>) -> Result<Vec<ReviewComment>>;
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum QueryKey {
    Repositories,
    Files(String),
    Diff(String),
    Reviews(Option<String>),
}

#[derive(Debug, Clone, PartialEq)]
pub enum QueryData {
    Repositories(Vec<Repository>),
    Files(Vec<FileNode>),
    Diff(FileDiff),
    Reviews(Vec<ReviewComment>),
}

/// A resolved query. Errors are flattened to their display text.
#[derive(Debug, Clone, PartialEq)]
pub struct Completed {
    pub key: QueryKey,
    pub result: std::result::Result<QueryData, String>,
}

#[derive(Debug)]
struct Pending {
    key: QueryKey,
    due: Instant,
}

#[derive(Debug)]
struct CacheEntry {
    data: QueryData,
    fetched_at: Instant,
}

pub struct QueryClient {
    api: Box<dyn ReviewApi>,
    latency: Duration,
    stale_time: Duration,
    pending: Vec<Pending>,
    cache: HashMap<QueryKey, CacheEntry>,
}

impl QueryClient {
    pub fn new(api: Box<dyn ReviewApi>) -> Self {
        Self {
            api,
            latency: DEFAULT_LATENCY,
            stale_time: DEFAULT_STALE_TIME,
            pending: Vec::new(),
            cache: HashMap::new(),
        }
    }

    #[must_use]
    pub const fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    #[must_use]
    pub const fn with_stale_time(mut self, stale_time: Duration) -> Self {
        self.stale_time = stale_time;
        self
    }

    /// Request `key`. Returns cached data when it is still fresh; otherwise
    /// schedules the query (once per key) and returns `None`.
    pub fn fetch(&mut self, key: QueryKey, now: Instant) -> Option<QueryData> {
        if let Some(entry) = self.cache.get(&key) {
            if now.saturating_duration_since(entry.fetched_at) < self.stale_time {
                log::debug!("Cache hit for {key:?}");
                return Some(entry.data.clone());
            }
        }

        if self.is_in_flight(&key) {
            return None;
        }

        log::debug!("Scheduling {key:?} in {:?}", self.latency);
        self.pending.push(Pending {
            key,
            due: now + self.latency,
        });
        None
    }

    /// Resolve every request due at `now`, in the order they were scheduled.
    pub fn poll(&mut self, now: Instant) -> Vec<Completed> {
        if self.pending.iter().all(|p| p.due > now) {
            return Vec::new();
        }

        let (due, waiting): (Vec<Pending>, Vec<Pending>) =
            self.pending.drain(..).partition(|p| p.due <= now);
        self.pending = waiting;

        due.into_iter()
            .map(|pending| {
                let result = run(self.api.as_ref(), &pending.key);
                match &result {
                    Ok(data) => {
                        self.cache.insert(
                            pending.key.clone(),
                            CacheEntry {
                                data: data.clone(),
                                fetched_at: now,
                            },
                        );
                    }
                    Err(err) => log::warn!("Query {:?} failed: {err}", pending.key),
                }
                Completed {
                    key: pending.key,
                    result: result.map_err(|e| e.to_string()),
                }
            })
            .collect()
    }

    pub fn invalidate(&mut self, key: &QueryKey) {
        self.cache.remove(key);
    }

    #[must_use]
    pub fn is_in_flight(&self, key: &QueryKey) -> bool {
        self.pending.iter().any(|p| &p.key == key)
    }

    /// Earliest time a scheduled request becomes due.
    #[must_use]
    pub fn next_due(&self) -> Option<Instant> {
        self.pending.iter().map(|p| p.due).min()
    }
}

fn run(api: &dyn ReviewApi, key: &QueryKey) -> Result<QueryData> {
    Ok(match key {
        QueryKey::Repositories => QueryData::Repositories(api.repositories()?),
        QueryKey::Files(repo_id) => QueryData::Files(api.files(repo_id)?),
        QueryKey::Diff(file_id) => QueryData::Diff(api.diff(file_id)?),
        QueryKey::Reviews(file_id) => QueryData::Reviews(api.reviews(file_id.as_deref())?),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::FixtureSet;

    fn client() -> QueryClient {
        QueryClient::new(Box::new(FixtureSet::builtin().unwrap()))
    }

    #[test]
    fn fetch_resolves_after_latency() {
        let mut client = client();
        let start = Instant::now();
        assert!(client.fetch(QueryKey::Repositories, start).is_none());
        assert!(client.is_in_flight(&QueryKey::Repositories));

        assert!(client.poll(start + Duration::from_millis(499)).is_empty());

        let done = client.poll(start + DEFAULT_LATENCY);
        assert_eq!(done.len(), 1);
        assert_eq!(done[0].key, QueryKey::Repositories);
        assert!(matches!(&done[0].result, Ok(QueryData::Repositories(r)) if r.len() == 3));
        assert!(!client.is_in_flight(&QueryKey::Repositories));
    }

    #[test]
    fn duplicate_fetches_are_coalesced() {
        let mut client = client();
        let start = Instant::now();
        let key = QueryKey::Files("repo-1".to_string());
        client.fetch(key.clone(), start);
        client.fetch(key.clone(), start + Duration::from_millis(100));
        let done = client.poll(start + Duration::from_secs(1));
        assert_eq!(done.len(), 1);
    }

    #[test]
    fn fresh_cache_answers_immediately() {
        let mut client = client();
        let start = Instant::now();
        let key = QueryKey::Diff("web-app".to_string());
        client.fetch(key.clone(), start);
        client.poll(start + DEFAULT_LATENCY);

        let later = start + Duration::from_secs(60);
        assert!(matches!(client.fetch(key.clone(), later), Some(QueryData::Diff(_))));
        assert!(!client.is_in_flight(&key));
    }

    #[test]
    fn stale_cache_refetches() {
        let mut client = client().with_stale_time(Duration::from_secs(10));
        let start = Instant::now();
        let key = QueryKey::Reviews(None);
        client.fetch(key.clone(), start);
        client.poll(start + DEFAULT_LATENCY);

        assert!(client.fetch(key.clone(), start + Duration::from_secs(11)).is_none());
        assert!(client.is_in_flight(&key));
    }

    #[test]
    fn invalidate_forces_refetch() {
        let mut client = client().with_latency(Duration::ZERO);
        let start = Instant::now();
        let key = QueryKey::Repositories;
        client.fetch(key.clone(), start);
        client.poll(start);
        client.invalidate(&key);
        assert!(client.fetch(key, start).is_none());
    }

    #[test]
    fn errors_are_reported_and_not_cached() {
        let mut client = client().with_latency(Duration::ZERO);
        let start = Instant::now();
        let key = QueryKey::Diff("missing".to_string());
        client.fetch(key.clone(), start);
        let done = client.poll(start);
        assert_eq!(done[0].result, Err("No diff found for file missing".to_string()));
        assert!(client.fetch(key, start).is_none());
    }

    #[test]
    fn poll_keeps_scheduling_order() {
        let mut client = client();
        let start = Instant::now();
        client.fetch(QueryKey::Reviews(None), start);
        client.fetch(QueryKey::Repositories, start);
        client.fetch(QueryKey::Files("repo-2".to_string()), start + Duration::from_secs(2));

        assert_eq!(client.next_due(), Some(start + DEFAULT_LATENCY));
        let keys: Vec<QueryKey> = client
            .poll(start + Duration::from_secs(1))
            .into_iter()
            .map(|c| c.key)
            .collect();
        assert_eq!(keys, vec![QueryKey::Reviews(None), QueryKey::Repositories]);
        assert!(client.is_in_flight(&QueryKey::Files("repo-2".to_string())));
    }
}
