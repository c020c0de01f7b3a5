// src/lib.rs

#[macro_use]
pub mod macros;
#[macro_use]
pub mod logging;

pub mod cli;
pub mod config;
pub mod core;
pub mod specs;

pub mod entry;
pub mod error;
pub mod file;
pub mod merge;
pub mod progress;
pub mod runner;
pub mod store;

pub use entry::{Entry, FeedBatch, FeedSource};
pub use error::{ArchiveError, ExtractError, FetchError, RunError};
pub use runner::{run, RunOutcome, RunSummary, SourceReport};
