// src/entry.rs
//! Archive record and the per-source shapes that carry records into a merge.

use std::fmt;

use serde::{Deserialize, Serialize};

/// One archived feed item. Field order is the on-disk key order.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Entry {
    pub id: String,
    pub title: String,
    pub link: String,
    pub published: String,
}

impl Entry {
    pub fn new(
        id: impl Into<String>,
        title: impl Into<String>,
        link: impl Into<String>,
        published: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            link: link.into(),
            published: published.into(),
        }
    }
}

/// A configured feed. `index` is its position in the run's list.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FeedSource {
    pub index: usize,
    pub url: String,
}

impl FeedSource {
    pub fn new(index: usize, url: impl Into<String>) -> Self {
        Self { index, url: url.into() }
    }

    /// Number a list of URLs in order.
    pub fn list(urls: &[&str]) -> Vec<FeedSource> {
        urls.iter().enumerate().map(|(i, u)| FeedSource::new(i, *u)).collect()
    }
}

impl fmt::Display for FeedSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{} {}", self.index, self.url)
    }
}

/// Entries extracted from one source during a run.
#[derive(Clone, Debug)]
pub struct FeedBatch {
    pub source: FeedSource,
    pub entries: Vec<Entry>,
}

impl FeedBatch {
    pub fn new(source: FeedSource, entries: Vec<Entry>) -> Self {
        Self { source, entries }
    }
}
