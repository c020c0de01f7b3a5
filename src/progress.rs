// src/progress.rs
/// Progress reporting for a run over the configured feed sources.
/// Frontends implement this to surface per-source status to users.
pub trait Progress {
    /// Called once with the number of sources about to be processed.
    fn begin(&mut self, _total: usize) {}

    /// Free-form status line for human eyes.
    fn log(&mut self, _msg: &str) {}

    /// A source was fetched and parsed; `entries` is how many it yielded.
    fn item_done(&mut self, _index: usize, _entries: usize) {}

    /// A source was skipped for this run.
    fn item_failed(&mut self, _index: usize, _reason: &str) {}

    /// Called at the end, successful or not.
    fn finish(&mut self) {}
}

/// A no-op progress sink.
pub struct NullProgress;
impl Progress for NullProgress {}
