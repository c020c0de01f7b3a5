// src/error.rs
use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Why a single source could not be downloaded.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("HTTP {status} when fetching {url}")]
    Status { status: u16, url: String },

    #[error("empty response body from {0}")]
    EmptyBody(String),

    #[error("scratch file: {0}")]
    Scratch(#[from] io::Error),
}

/// The document as a whole could not be read as a feed.
#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("malformed feed document: {0}")]
    Malformed(String),
}

#[derive(Debug, Error)]
pub enum ArchiveError {
    #[error("failed to write archive {path}: {source}")]
    Write { path: PathBuf, source: io::Error },

    #[error("failed to encode entry {id}: {source}")]
    Encode { id: String, source: serde_json::Error },

    #[error("archive {0} is missing or empty after write")]
    Verify(PathBuf),
}

/// Run-level failures; each maps to exit status 1.
#[derive(Debug, Error)]
pub enum RunError {
    #[error("directory {path} is not usable: {reason}")]
    Directory { path: PathBuf, reason: String },

    #[error("no feed source produced any entries ({failed} of {total} failed)")]
    NoContent { failed: usize, total: usize },

    #[error(transparent)]
    Archive(#[from] ArchiveError),
}
