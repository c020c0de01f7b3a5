// src/specs/atom.rs
//! Extraction spec for Atom alert feeds.
//!
//! Every `entry` element in the Atom namespace, at any depth, is one
//! candidate. Its direct Atom children give the fields:
//! - `id`, `title`, `published`: the element's first text node (entities
//!   unescaped, CDATA kept); text after a nested child element is ignored
//! - `link`: `href` of the first `link` child that has one, unwrapped by
//!   [`clean_redirect_link`]
//!
//! A field that is absent or empty skips that entry only. A document that
//! is not well-formed XML is an [`ExtractError`] for the whole feed.

use std::fmt;

use quick_xml::events::{BytesStart, Event};
use quick_xml::name::{Namespace, ResolveResult};
use quick_xml::reader::NsReader;

use crate::config::consts::ATOM_NS;
use crate::core::sanitize::clean_redirect_link;
use crate::entry::{Entry, FeedSource};
use crate::error::ExtractError;

/// Outcome of reading one entry element.
pub type EntryAttempt = Result<Entry, SkippedEntry>;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SkipReason {
    MissingField(&'static str),
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::MissingField(name) => write!(f, "missing field `{name}`"),
        }
    }
}

/// An entry element that could not become an [`Entry`].
/// `index` is 1-based, in document order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SkippedEntry {
    pub index: usize,
    pub reason: SkipReason,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Field {
    Id,
    Title,
    Published,
}

#[derive(Default)]
struct EntryBuilder {
    id: Option<String>,
    title: Option<String>,
    link: Option<String>,
    published: Option<String>,
}

impl EntryBuilder {
    fn set_text(&mut self, field: Field, text: String) {
        if text.is_empty() {
            return;
        }
        let slot = match field {
            Field::Id => &mut self.id,
            Field::Title => &mut self.title,
            Field::Published => &mut self.published,
        };
        // First occurrence wins, like taking `[0]` of a node set.
        if slot.is_none() {
            *slot = Some(text);
        }
    }

    fn take_link(&mut self, e: &BytesStart<'_>) -> Result<(), ExtractError> {
        if self.link.is_some() {
            return Ok(());
        }
        let attr = e.try_get_attribute("href").map_err(malformed)?;
        if let Some(attr) = attr {
            let href = attr.unescape_value().map_err(malformed)?;
            if !href.is_empty() {
                self.link = Some(clean_redirect_link(&href));
            }
        }
        Ok(())
    }

    fn build(self, index: usize) -> EntryAttempt {
        let missing = |name| SkippedEntry { index, reason: SkipReason::MissingField(name) };
        Ok(Entry {
            id: self.id.ok_or_else(|| missing("id"))?,
            title: self.title.ok_or_else(|| missing("title"))?,
            link: self.link.ok_or_else(|| missing("link"))?,
            published: self.published.ok_or_else(|| missing("published"))?,
        })
    }
}

/// Open entry: nesting depth of its element plus the fields seen so far.
struct OpenEntry {
    depth: usize,
    index: usize,
    builder: EntryBuilder,
}

/// Text being captured for one field element. Only its first direct text
/// node counts: capture stops at the first child element after some text.
struct OpenField {
    depth: usize,
    field: Field,
    text: String,
    done: bool,
}

impl OpenField {
    fn push(&mut self, depth: usize, text: &str) {
        if self.depth == depth && !self.done {
            self.text.push_str(text);
        }
    }

    fn child_opened(&mut self, depth: usize) {
        if self.depth == depth && !self.text.is_empty() {
            self.done = true;
        }
    }
}

fn malformed(e: impl fmt::Display) -> ExtractError {
    ExtractError::Malformed(e.to_string())
}

fn field_for(local: &[u8]) -> Option<Field> {
    match local {
        b"id" => Some(Field::Id),
        b"title" => Some(Field::Title),
        b"published" => Some(Field::Published),
        _ => None,
    }
}

/// Parse a whole feed document into per-entry attempts.
pub fn extract_entries(xml: &[u8]) -> Result<Vec<EntryAttempt>, ExtractError> {
    let mut reader = NsReader::from_reader(xml);
    let mut buf = Vec::new();

    let mut attempts = Vec::new();
    let mut depth = 0usize;
    let mut seen_root = false;
    let mut entries_seen = 0usize;
    let mut open: Option<OpenEntry> = None;
    let mut field: Option<OpenField> = None;

    loop {
        let (in_atom, event) = match reader.read_resolved_event_into(&mut buf) {
            Ok((ns, event)) => {
                let in_atom = matches!(ns, ResolveResult::Bound(Namespace(n)) if n == ATOM_NS);
                (in_atom, event)
            }
            Err(e) => return Err(malformed(e)),
        };

        match event {
            Event::Start(e) => {
                if let Some(f) = field.as_mut() {
                    f.child_opened(depth);
                }
                depth += 1;
                seen_root = true;
                let local = e.local_name();

                match open.as_mut() {
                    None => {
                        if in_atom && local.as_ref() == b"entry" {
                            entries_seen += 1;
                            open = Some(OpenEntry {
                                depth,
                                index: entries_seen,
                                builder: EntryBuilder::default(),
                            });
                        }
                    }
                    Some(entry) if in_atom && depth == entry.depth + 1 => {
                        if local.as_ref() == b"link" {
                            entry.builder.take_link(&e)?;
                        } else if let Some(f) = field_for(local.as_ref()) {
                            field = Some(OpenField { depth, field: f, text: s!(), done: false });
                        }
                    }
                    Some(_) => {}
                }
            }
            Event::Empty(e) => {
                if let Some(f) = field.as_mut() {
                    f.child_opened(depth);
                }
                seen_root = true;
                let local = e.local_name();

                match open.as_mut() {
                    None => {
                        // `<entry/>`: an entry with no fields at all
                        if in_atom && local.as_ref() == b"entry" {
                            entries_seen += 1;
                            attempts.push(EntryBuilder::default().build(entries_seen));
                        }
                    }
                    Some(entry) if in_atom && depth == entry.depth && local.as_ref() == b"link" => {
                        entry.builder.take_link(&e)?;
                    }
                    Some(_) => {}
                }
            }
            Event::Text(t) => {
                if let Some(f) = field.as_mut() {
                    f.push(depth, &t.unescape().map_err(malformed)?);
                }
            }
            Event::CData(c) => {
                if let Some(f) = field.as_mut() {
                    f.push(depth, &String::from_utf8_lossy(&c));
                }
            }
            Event::End(_) => {
                if field.as_ref().is_some_and(|f| f.depth == depth) {
                    if let (Some(f), Some(entry)) = (field.take(), open.as_mut()) {
                        entry.builder.set_text(f.field, f.text);
                    }
                }
                if open.as_ref().is_some_and(|o| o.depth == depth) {
                    if let Some(entry) = open.take() {
                        attempts.push(entry.builder.build(entry.index));
                    }
                }
                depth = depth.saturating_sub(1);
            }
            Event::Eof => {
                if !seen_root {
                    return Err(ExtractError::Malformed(s!("no root element")));
                }
                if depth != 0 {
                    return Err(ExtractError::Malformed(format!(
                        "unexpected end of document with {depth} unclosed element(s)"
                    )));
                }
                break;
            }
            _ => {}
        }
        buf.clear();
    }

    Ok(attempts)
}

/// Keep the good entries of one source, logging every skipped one.
pub fn collect_entries(source: &FeedSource, attempts: Vec<EntryAttempt>) -> (Vec<Entry>, usize) {
    let total = attempts.len();
    logf!("{source}: found {total} entries in feed");

    let mut entries = Vec::with_capacity(total);
    let mut skipped = 0usize;
    for (i, attempt) in attempts.into_iter().enumerate() {
        match attempt {
            Ok(entry) => {
                logd!("{source}: extracted entry {}/{total}: id={}", i + 1, entry.id);
                entries.push(entry);
            }
            Err(skip) => {
                skipped += 1;
                loge!("{source}: skipping entry {}/{total}: {}", skip.index, skip.reason);
            }
        }
    }

    logf!("{source}: extracted {} valid entries", entries.len());
    (entries, skipped)
}
