// src/store.rs
//! On-disk archive: UTF-8, one JSON object per line, no enclosing array.
//!
//! Loading is lossy: a missing or unreadable file is "no prior state", and a
//! line that is not a valid record is skipped with a warning. Saving always
//! rewrites the whole file through a sibling `.tmp` and a rename.

use std::{
    fs::{self, File},
    io::{self, BufRead, BufReader, BufWriter, Write},
    path::{Path, PathBuf},
};

use crate::entry::Entry;
use crate::error::ArchiveError;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ArchiveState {
    Missing,
    Unreadable,
    Present,
}

#[derive(Debug)]
pub struct LoadedArchive {
    pub entries: Vec<Entry>,
    pub skipped_lines: usize,
    pub state: ArchiveState,
}

impl LoadedArchive {
    fn empty(state: ArchiveState) -> Self {
        Self { entries: Vec::new(), skipped_lines: 0, state }
    }
}

pub fn load_archive(path: &Path) -> LoadedArchive {
    let file = match File::open(path) {
        Ok(f) => f,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            logf!("no archive at {} yet, starting empty", path.display());
            return LoadedArchive::empty(ArchiveState::Missing);
        }
        Err(e) => {
            loge!("error reading archive {}: {e}", path.display());
            return LoadedArchive::empty(ArchiveState::Unreadable);
        }
    };

    match read_lines(BufReader::new(file)) {
        Ok((entries, skipped_lines)) => {
            logf!("loaded {} entries from {}", entries.len(), path.display());
            LoadedArchive { entries, skipped_lines, state: ArchiveState::Present }
        }
        Err(e) => {
            loge!("error reading archive {}: {e}", path.display());
            LoadedArchive::empty(ArchiveState::Unreadable)
        }
    }
}

/// Parse archive lines; blank lines are ignored, bad lines skipped.
/// Only an I/O failure fails the whole read: a line that is not UTF-8 is
/// skipped like any other bad record.
pub fn read_lines<R: BufRead>(reader: R) -> io::Result<(Vec<Entry>, usize)> {
    let mut entries = Vec::new();
    let mut skipped = 0usize;

    for (i, raw) in reader.split(b'\n').enumerate() {
        let raw = raw?;
        let line = match std::str::from_utf8(&raw) {
            Ok(text) => text.trim(),
            Err(e) => {
                skipped += 1;
                logw!("skipping archive line {}: not valid UTF-8: {e}", i + 1);
                continue;
            }
        };
        if line.is_empty() {
            continue;
        }
        match serde_json::from_str::<Entry>(line) {
            Ok(entry) => entries.push(entry),
            Err(e) => {
                skipped += 1;
                logw!("skipping archive line {}: {e}: {line}", i + 1);
            }
        }
    }
    Ok((entries, skipped))
}

/// Encode one record per line, `\n` terminated, non-ASCII left as-is.
pub fn write_lines<W: Write>(mut w: W, entries: &[Entry]) -> Result<(), ArchiveError> {
    for entry in entries {
        let line = serde_json::to_string(entry)
            .map_err(|source| ArchiveError::Encode { id: entry.id.clone(), source })?;
        writeln!(w, "{line}").map_err(|source| ArchiveError::Write { path: PathBuf::new(), source })?;
    }
    Ok(())
}

/// Replace the archive with `entries`, in the given order.
pub fn save_archive(path: &Path, entries: &[Entry]) -> Result<(), ArchiveError> {
    let write_err = |source: io::Error| ArchiveError::Write { path: path.to_path_buf(), source };

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).map_err(write_err)?;
        }
    }

    let tmp_path = path.with_extension("jsonl.tmp");
    let file = File::create(&tmp_path).map_err(write_err)?;
    let mut writer = BufWriter::new(file);

    let written = write_lines(&mut writer, entries).and_then(|()| {
        writer.flush().map_err(write_err)?;
        writer.get_ref().sync_all().map_err(write_err)
    });
    if let Err(e) = written {
        let _ = fs::remove_file(&tmp_path);
        return Err(match e {
            ArchiveError::Write { source, .. } => write_err(source),
            other => other,
        });
    }
    drop(writer);

    fs::rename(&tmp_path, path).map_err(write_err)?;
    logf!("wrote {} entries to {}", entries.len(), path.display());
    Ok(())
}

/// Post-write check: the archive exists and is non-empty.
pub fn verify_archive(path: &Path) -> Result<u64, ArchiveError> {
    let size = fs::metadata(path).map(|m| m.len()).unwrap_or(0);
    if size == 0 {
        return Err(ArchiveError::Verify(path.to_path_buf()));
    }
    logd!("archive {} is {size} bytes", path.display());

    if let Ok(file) = File::open(path) {
        let mut first = String::new();
        if BufReader::new(file).read_line(&mut first).is_ok() {
            logd!("first archive line: {}", first.trim_end());
        }
    }
    Ok(size)
}
