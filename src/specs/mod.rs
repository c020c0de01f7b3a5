// src/specs/mod.rs
//! # Feed "specs" module
//!
//! Format-specific extraction: how to read one kind of feed document and
//! turn it into archive [`Entry`](crate::entry::Entry) records.
//!
//! ## What lives here
//! - **Pure document parsing** over raw bytes (no networking, no files).
//! - **Field mapping**: which elements/attributes become `id`, `title`,
//!   `link`, `published`.
//! - **Link normalization** at extraction time, so every later comparison
//!   sees the unwrapped target URL.
//! - **Per-entry results**: one malformed entry becomes a
//!   [`SkippedEntry`](atom::SkippedEntry) value, never an abort.
//!
//! ## What does **not** live here
//! - Downloading and scratch files (`core::net`, `file`).
//! - Deduplication and ordering (`merge`).
//! - Persistence (`store`).
//!
//! ## Typical call chain
//! ```text
//! runner → Fetch::fetch → file::ScratchFile → specs::atom::extract_entries
//!                                          ↘ specs::atom::collect_entries → merge
//! ```
pub mod atom;
