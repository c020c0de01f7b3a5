// src/config/options.rs
use std::path::{Path, PathBuf};
use std::time::Duration;

use super::consts::*;
use crate::entry::FeedSource;

/// Everything one run needs, built once at process start.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RunOptions {
    pub feeds: Vec<FeedSource>,
    pub timeout: Duration,
    pub paths: PathOptions,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            feeds: FeedSource::list(FEED_URLS),
            timeout: Duration::from_secs(FETCH_TIMEOUT_SECS),
            paths: PathOptions::default(),
        }
    }
}

impl RunOptions {
    /// Defaults with every directory placed under `root`.
    pub fn with_root(root: impl Into<PathBuf>) -> Self {
        let mut opts = Self::default();
        opts.paths.root = root.into();
        opts
    }
}

/// Local layout. Relative `data_dir`/`tmp_dir` resolve against `root`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PathOptions {
    pub root: PathBuf,
    pub data_dir: PathBuf,
    pub tmp_dir: PathBuf,
    pub archive_file: String,
    pub scratch_prefix: String,
}

impl Default for PathOptions {
    fn default() -> Self {
        Self {
            root: PathBuf::from("."),
            data_dir: PathBuf::from(DEFAULT_DATA_DIR),
            tmp_dir: PathBuf::from(DEFAULT_TMP_DIR),
            archive_file: s!(DEFAULT_ARCHIVE_FILE),
            scratch_prefix: s!(SCRATCH_PREFIX),
        }
    }
}

impl PathOptions {
    pub fn data_dir(&self) -> PathBuf {
        resolve(&self.root, &self.data_dir)
    }

    pub fn tmp_dir(&self) -> PathBuf {
        resolve(&self.root, &self.tmp_dir)
    }

    pub fn archive_path(&self) -> PathBuf {
        self.data_dir().join(&self.archive_file)
    }
}

fn resolve(root: &Path, dir: &Path) -> PathBuf {
    if dir.is_absolute() { dir.to_path_buf() } else { root.join(dir) }
}
