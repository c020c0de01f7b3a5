// src/merge.rs
//! Incremental archive merge.
//!
//! Given the entries already archived and this run's batches (one per
//! source, in processing order), build the next archive state:
//!
//! 1. seen-ids and seen-links come from the existing archive;
//! 2. each batch, in order, keeps only entries whose id **and** link are
//!    unseen; kept entries join both sets right away, so a later source
//!    (or a later entry of the same source) loses to an earlier one;
//! 3. existing entries, then accepted entries, form the combined list;
//! 4. a final link-only pass keeps the first occurrence of every link
//!    (existing entries therefore always win) and drops empty links;
//! 5. a stable sort orders by `published`, newest first, comparing the
//!    raw strings.
//!
//! Links are compared after [`clean_redirect_link`], so a wrapped and an
//! unwrapped copy of the same article collide.

use std::collections::HashSet;

use crate::core::sanitize::clean_redirect_link;
use crate::entry::{Entry, FeedBatch};

#[derive(Debug, Default)]
pub struct Merged {
    /// Next archive content, sorted.
    pub entries: Vec<Entry>,
    /// New entries accepted across all batches (before the final link pass).
    pub accepted: usize,
    /// Accepted count per batch, in batch order.
    pub accepted_per_source: Vec<usize>,
    /// Entries removed by the final link-only pass.
    pub duplicate_links_removed: usize,
}

impl Merged {
    /// Nothing new: the archive on disk is already the answer.
    pub fn is_noop(&self) -> bool {
        self.accepted == 0
    }
}

pub fn merge(existing: Vec<Entry>, batches: Vec<FeedBatch>) -> Merged {
    let mut seen_ids: HashSet<String> = existing.iter().map(|e| e.id.clone()).collect();
    let mut seen_links: HashSet<String> = existing.iter().map(|e| clean_redirect_link(&e.link)).collect();

    let mut accepted_per_source = Vec::with_capacity(batches.len());
    let mut fresh: Vec<Entry> = Vec::new();

    for batch in batches {
        let before = fresh.len();
        for entry in batch.entries {
            let link = clean_redirect_link(&entry.link);
            if seen_ids.contains(&entry.id) || seen_links.contains(&link) {
                continue;
            }
            seen_ids.insert(entry.id.clone());
            seen_links.insert(link);
            fresh.push(entry);
        }
        let n = fresh.len() - before;
        logf!("{}: {n} new entries", batch.source);
        accepted_per_source.push(n);
    }

    let accepted = fresh.len();
    if accepted == 0 {
        return Merged { entries: existing, accepted, accepted_per_source, duplicate_links_removed: 0 };
    }

    let mut combined = existing;
    combined.extend(fresh);

    let before = combined.len();
    let mut entries = dedup_links(combined);
    let duplicate_links_removed = before - entries.len();
    if duplicate_links_removed > 0 {
        logf!("removed {duplicate_links_removed} duplicate entries (same link)");
    }

    sort_newest_first(&mut entries);

    Merged { entries, accepted, accepted_per_source, duplicate_links_removed }
}

/// Keep the first entry for every normalized link; entries without a link go.
pub fn dedup_links(entries: Vec<Entry>) -> Vec<Entry> {
    let mut seen = HashSet::with_capacity(entries.len());
    entries
        .into_iter()
        .filter(|e| {
            let link = clean_redirect_link(&e.link);
            !link.is_empty() && seen.insert(link)
        })
        .collect()
}

/// Stable: equal timestamps keep their relative order.
pub fn sort_newest_first(entries: &mut [Entry]) {
    entries.sort_by(|a, b| b.published.cmp(&a.published));
}

/// Check the at-rest ordering: `published` never increases down the list.
pub fn is_sorted_newest_first(entries: &[Entry]) -> bool {
    entries.windows(2).all(|w| w[0].published >= w[1].published)
}

/// Position of the first entry that violates id or link uniqueness, if any.
pub fn first_duplicate(entries: &[Entry]) -> Option<usize> {
    let mut ids = HashSet::new();
    let mut links = HashSet::new();
    entries
        .iter()
        .position(|e| !ids.insert(e.id.as_str()) | !links.insert(clean_redirect_link(&e.link)))
}
