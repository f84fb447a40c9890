//! On-disk memo of fetched search and comment results.
//!
//! One JSON snapshot per distinct [`SearchParams`], named by the SHA-256 of the
//! parameters' JSON encoding. A snapshot holds the raw API records, so every
//! downstream view can be rebuilt without network calls.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::Subcommand;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use threadscout_core::{RawComment, RawPost, SearchParams, DEFAULT_CACHE_DIR};

/// Sub-commands available under `cache`.
#[derive(Debug, Subcommand)]
pub enum CacheCommands {
    /// Delete every cached crawl result
    Clear {
        /// Cache directory to clear
        #[arg(long, env = "THREADSCOUT_CACHE_DIR", default_value = DEFAULT_CACHE_DIR)]
        cache_dir: PathBuf,
    },
}

/// Raw records gathered by one crawl.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub(crate) struct Snapshot {
    pub posts: Vec<RawPost>,
    pub comments: Vec<RawComment>,
}

pub(crate) struct ResultCache {
    dir: PathBuf,
}

impl ResultCache {
    pub(crate) fn new(dir: &Path) -> Self {
        Self {
            dir: dir.to_path_buf(),
        }
    }

    fn key(params: &SearchParams) -> anyhow::Result<String> {
        let encoded = serde_json::to_vec(params).context("failed to encode search parameters")?;
        Ok(format!("{:x}", Sha256::digest(&encoded)))
    }

    fn path_for(&self, params: &SearchParams) -> anyhow::Result<PathBuf> {
        Ok(self.dir.join(format!("{}.json", Self::key(params)?)))
    }

    /// Returns the stored snapshot for `params`, if any. An unreadable
    /// snapshot is treated as a miss.
    pub(crate) fn load(&self, params: &SearchParams) -> anyhow::Result<Option<Snapshot>> {
        let path = self.path_for(params)?;
        let bytes = match std::fs::read(&path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(e).with_context(|| format!("failed to read {}", path.display()))
            }
        };

        match serde_json::from_slice(&bytes) {
            Ok(snapshot) => {
                tracing::debug!(path = %path.display(), "cache hit");
                Ok(Some(snapshot))
            }
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "ignoring corrupt cache entry");
                Ok(None)
            }
        }
    }

    pub(crate) fn store(&self, params: &SearchParams, snapshot: &Snapshot) -> anyhow::Result<PathBuf> {
        std::fs::create_dir_all(&self.dir)
            .with_context(|| format!("failed to create {}", self.dir.display()))?;
        let path = self.path_for(params)?;
        let encoded = serde_json::to_vec(snapshot).context("failed to encode snapshot")?;
        std::fs::write(&path, encoded)
            .with_context(|| format!("failed to write {}", path.display()))?;
        tracing::debug!(path = %path.display(), "cached crawl result");
        Ok(path)
    }

    /// Removes every `*.json` snapshot and returns how many were deleted.
    pub(crate) fn clear(&self) -> anyhow::Result<usize> {
        let entries = match std::fs::read_dir(&self.dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(0),
            Err(e) => {
                return Err(e).with_context(|| format!("failed to read {}", self.dir.display()))
            }
        };

        let mut removed = 0;
        for entry in entries {
            let path = entry?.path();
            if path.extension().is_some_and(|ext| ext == "json") {
                std::fs::remove_file(&path)
                    .with_context(|| format!("failed to remove {}", path.display()))?;
                removed += 1;
            }
        }
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use threadscout_core::{DateRange, SortMode};

    use super::*;

    fn params(keyword: &str) -> SearchParams {
        SearchParams {
            subreddits: "all".to_string(),
            keywords: vec![keyword.to_string()],
            sort: SortMode::New,
            time_filter: "all".to_string(),
            limit: None,
            range: DateRange::new(
                NaiveDate::from_ymd_opt(2021, 6, 1).unwrap(),
                NaiveDate::from_ymd_opt(2021, 7, 1).unwrap(),
            )
            .unwrap(),
        }
    }

    fn snapshot() -> Snapshot {
        Snapshot {
            posts: vec![RawPost {
                search_word: "battery".to_string(),
                subreddit: "electricvehicles".to_string(),
                title: "Battery day".to_string(),
                author: None,
                score: 5,
                id: "p1".to_string(),
                url: "https://example.com".to_string(),
                permalink: "https://reddit.com/r/electricvehicles/comments/p1/".to_string(),
                num_comments: 0,
                created_utc: 1_625_140_800,
                selftext: String::new(),
            }],
            comments: Vec::new(),
        }
    }

    #[test]
    fn store_then_load_hits_only_for_same_params() {
        let dir = tempfile::tempdir().unwrap();
        let cache = ResultCache::new(dir.path());

        assert!(cache.load(&params("battery")).unwrap().is_none());
        cache.store(&params("battery"), &snapshot()).unwrap();

        assert_eq!(cache.load(&params("battery")).unwrap(), Some(snapshot()));
        assert!(cache.load(&params("cells")).unwrap().is_none());
    }

    #[test]
    fn corrupt_entry_is_a_miss() {
        let dir = tempfile::tempdir().unwrap();
        let cache = ResultCache::new(dir.path());
        let path = cache.store(&params("battery"), &snapshot()).unwrap();
        std::fs::write(&path, b"{not json").unwrap();

        assert!(cache.load(&params("battery")).unwrap().is_none());
    }

    #[test]
    fn clear_removes_snapshots_only() {
        let dir = tempfile::tempdir().unwrap();
        let cache = ResultCache::new(dir.path());
        cache.store(&params("a"), &snapshot()).unwrap();
        cache.store(&params("b"), &snapshot()).unwrap();
        std::fs::write(dir.path().join("notes.txt"), b"keep").unwrap();

        assert_eq!(cache.clear().unwrap(), 2);
        assert!(dir.path().join("notes.txt").exists());
        assert_eq!(cache.clear().unwrap(), 0);
    }

    #[test]
    fn clearing_missing_dir_is_a_no_op() {
        let dir = tempfile::tempdir().unwrap();
        let cache = ResultCache::new(&dir.path().join("absent"));
        assert_eq!(cache.clear().unwrap(), 0);
    }
}
