// src/runner.rs
use std::fmt;
use std::path::PathBuf;

use crate::{
    config::options::RunOptions,
    core::net::Fetch,
    entry::{FeedBatch, FeedSource},
    error::{FetchError, RunError},
    file::{prepare_directories, ScratchFile},
    merge::merge,
    progress::Progress,
    specs::atom::{collect_entries, extract_entries},
    store::{load_archive, save_archive, verify_archive},
};

/// How one source fared during a run.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SourceStatus {
    /// Fetched and parsed. `found` counts `<entry>` elements, `skipped` the
    /// ones missing a required field.
    Ok { found: usize, skipped: usize, accepted: usize },
    /// Download, scratch file or document parse failed; contributes nothing.
    Failed(String),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SourceReport {
    pub source: FeedSource,
    pub status: SourceStatus,
}

impl SourceReport {
    pub fn is_ok(&self) -> bool {
        matches!(self.status, SourceStatus::Ok { .. })
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RunOutcome {
    /// Nothing new; the archive was left untouched.
    Unchanged,
    /// `added` new entries were accepted and the archive now holds `total`.
    Updated { added: usize, total: usize },
}

impl fmt::Display for RunOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RunOutcome::Unchanged => write!(f, "no new entries, archive unchanged"),
            RunOutcome::Updated { added, total } => {
                write!(f, "added {added} new entries, archive holds {total}")
            }
        }
    }
}

/// Summary of what a run did.
#[derive(Debug)]
pub struct RunSummary {
    pub outcome: RunOutcome,
    pub sources: Vec<SourceReport>,
    pub archive_path: PathBuf,
}

/// Top-level runner: fetch every source, merge into the archive, persist.
/// `progress` can be None (no UI updates) or Some(&mut impl Progress).
pub fn run(
    opts: &RunOptions,
    fetcher: &dyn Fetch,
    mut progress: Option<&mut dyn Progress>,
) -> Result<RunSummary, RunError> {
    let result = run_inner(opts, fetcher, progress.as_deref_mut());
    if let Some(p) = progress.as_deref_mut() {
        match &result {
            Ok(summary) => p.log(&summary.outcome.to_string()),
            Err(e) => p.log(&format!("run failed: {e}")),
        }
        p.finish();
    }
    result
}

fn run_inner<'p>(
    opts: &RunOptions,
    fetcher: &dyn Fetch,
    mut progress: Option<&mut (dyn Progress + 'p)>,
) -> Result<RunSummary, RunError> {
    let data_dir = opts.paths.data_dir();
    let tmp_dir = opts.paths.tmp_dir();
    let archive_path = opts.paths.archive_path();

    prepare_directories(&data_dir, &tmp_dir)?;

    let loaded = load_archive(&archive_path);
    if loaded.skipped_lines > 0 {
        logw!("{} archive lines could not be read and were dropped", loaded.skipped_lines);
    }

    if let Some(p) = progress.as_deref_mut() {
        p.begin(opts.feeds.len());
    }

    let mut batches = Vec::with_capacity(opts.feeds.len());
    let mut sources = Vec::with_capacity(opts.feeds.len());

    for source in &opts.feeds {
        logf!("processing feed {source}");
        match process_source(opts, fetcher, source) {
            Ok(outcome) => {
                if let Some(p) = progress.as_deref_mut() {
                    p.item_done(source.index, outcome.entries.len());
                }
                sources.push(SourceReport {
                    source: source.clone(),
                    status: SourceStatus::Ok { found: outcome.found, skipped: outcome.skipped, accepted: 0 },
                });
                batches.push(FeedBatch::new(source.clone(), outcome.entries));
            }
            Err(reason) => {
                loge!("{source}: {reason}");
                if let Some(p) = progress.as_deref_mut() {
                    p.item_failed(source.index, &reason);
                }
                sources.push(SourceReport { source: source.clone(), status: SourceStatus::Failed(reason) });
            }
        }
    }

    let extracted: usize = batches.iter().map(|b| b.entries.len()).sum();
    if extracted == 0 {
        let failed = sources.iter().filter(|r| !r.is_ok()).count();
        loge!("no entries extracted from any feed");
        return Err(RunError::NoContent { failed, total: sources.len() });
    }

    let batch_indices: Vec<usize> = batches.iter().map(|b| b.source.index).collect();
    let merged = merge(loaded.entries, batches);

    for (index, n) in batch_indices.iter().zip(&merged.accepted_per_source) {
        if let Some(SourceReport { status: SourceStatus::Ok { accepted, .. }, .. }) =
            sources.iter_mut().find(|r| r.source.index == *index)
        {
            *accepted = *n;
        }
    }

    let outcome = if merged.is_noop() {
        logf!("no new entries to add; {} unchanged", archive_path.display());
        RunOutcome::Unchanged
    } else {
        save_archive(&archive_path, &merged.entries)?;
        verify_archive(&archive_path)?;
        logf!("added {} new entries to {}", merged.accepted, archive_path.display());
        RunOutcome::Updated { added: merged.accepted, total: merged.entries.len() }
    };

    Ok(RunSummary { outcome, sources, archive_path })
}

struct SourceOutcome {
    entries: Vec<crate::entry::Entry>,
    found: usize,
    skipped: usize,
}

/// Fetch, stage, read back and extract one source. Errors become the
/// human-readable reason recorded in the report.
fn process_source(opts: &RunOptions, fetcher: &dyn Fetch, source: &FeedSource) -> Result<SourceOutcome, String> {
    let body = fetcher.fetch(&source.url).map_err(|e| format!("fetch failed: {e}"))?;

    let tmp_dir = opts.paths.tmp_dir();
    let scratch = ScratchFile::write(&tmp_dir, &opts.paths.scratch_prefix, source.index, &body)
        .map_err(|e| format!("{}", FetchError::Scratch(e)))?;
    let staged = scratch.read().map_err(|e| format!("{}", FetchError::Scratch(e)))?;
    drop(scratch);

    let attempts = extract_entries(&staged).map_err(|e| e.to_string())?;
    let found = attempts.len();
    let (entries, skipped) = collect_entries(source, attempts);
    Ok(SourceOutcome { entries, found, skipped })
}
