// src/file.rs

use std::{
    fs,
    io,
    path::{Path, PathBuf},
};

use crate::error::RunError;

/// Create the data and scratch dirs and make sure we can write into both.
/// Runs before any network activity: if output cannot land, don't fetch.
pub fn prepare_directories(data_dir: &Path, tmp_dir: &Path) -> Result<(), RunError> {
    logd!("checking directories: data={} tmp={}", data_dir.display(), tmp_dir.display());
    for dir in [data_dir, tmp_dir] {
        ensure_directory(dir).map_err(|e| directory_error(dir, e))?;
        check_writable(dir).map_err(|e| directory_error(dir, e))?;
    }
    logd!("directories ready and writable");
    Ok(())
}

fn directory_error(dir: &Path, e: io::Error) -> RunError {
    loge!("directory {} is not usable: {e}", dir.display());
    RunError::Directory { path: dir.to_path_buf(), reason: e.to_string() }
}

pub fn ensure_directory(dir: &Path) -> io::Result<()> {
    if dir.exists() && !dir.is_dir() {
        return Err(io::Error::new(
            io::ErrorKind::AlreadyExists,
            format!("path exists but is not a directory: {}", dir.display()),
        ));
    }
    if !dir.exists() {
        fs::create_dir_all(dir)?;
    }
    Ok(())
}

/// Probe by creating (and immediately dropping) an anonymous temp file.
pub fn check_writable(dir: &Path) -> io::Result<()> {
    tempfile::tempfile_in(dir).map(drop)
}

/// Per-source download landing spot: `<dir>/<prefix>_<index>.xml`.
/// Removed on drop, so a failed parse never leaves it behind.
#[derive(Debug)]
pub struct ScratchFile {
    path: PathBuf,
}

impl ScratchFile {
    pub fn path_for(dir: &Path, prefix: &str, index: usize) -> PathBuf {
        dir.join(format!("{prefix}_{index}.xml"))
    }

    pub fn write(dir: &Path, prefix: &str, index: usize, bytes: &[u8]) -> io::Result<Self> {
        let path = Self::path_for(dir, prefix, index);
        fs::write(&path, bytes)?;
        let scratch = Self { path };

        let size = fs::metadata(&scratch.path)?.len();
        if size == 0 {
            return Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                format!("scratch file {} is empty after write", scratch.path.display()),
            ));
        }
        logd!("saved {size} bytes to {}", scratch.path.display());
        Ok(scratch)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn read(&self) -> io::Result<Vec<u8>> {
        fs::read(&self.path)
    }
}

impl Drop for ScratchFile {
    fn drop(&mut self) {
        if let Err(e) = fs::remove_file(&self.path) {
            if e.kind() != io::ErrorKind::NotFound {
                logw!("could not remove scratch file {}: {e}", self.path.display());
            }
        }
    }
}
