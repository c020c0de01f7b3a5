// tests/run_pipeline.rs
use std::cell::Cell;
use std::collections::HashMap;
use std::fs;

use tempfile::TempDir;

use feed_archive::config::options::RunOptions;
use feed_archive::core::net::Fetch;
use feed_archive::merge::{first_duplicate, is_sorted_newest_first};
use feed_archive::progress::Progress;
use feed_archive::runner::SourceStatus;
use feed_archive::store::load_archive;
use feed_archive::{run, Entry, FeedSource, FetchError, RunError, RunOutcome};

const URL_A: &str = "https://feeds.test/a";
const URL_B: &str = "https://feeds.test/b";

/// Serves canned documents; URLs without one answer HTTP 503.
struct FakeFetcher {
    docs: HashMap<&'static str, String>,
    calls: Cell<usize>,
}

impl FakeFetcher {
    fn new(docs: &[(&'static str, String)]) -> Self {
        Self { docs: docs.iter().cloned().collect(), calls: Cell::new(0) }
    }
}

impl Fetch for FakeFetcher {
    fn fetch(&self, url: &str) -> Result<Vec<u8>, FetchError> {
        self.calls.set(self.calls.get() + 1);
        match self.docs.get(url) {
            Some(doc) => Ok(doc.clone().into_bytes()),
            None => Err(FetchError::Status { status: 503, url: url.to_string() }),
        }
    }
}

#[derive(Default)]
struct Recorder {
    done: Vec<(usize, usize)>,
    failed: Vec<usize>,
    finished: bool,
}

impl Progress for Recorder {
    fn item_done(&mut self, index: usize, entries: usize) {
        self.done.push((index, entries));
    }
    fn item_failed(&mut self, index: usize, _reason: &str) {
        self.failed.push(index);
    }
    fn finish(&mut self) {
        self.finished = true;
    }
}

fn feed(entries: &[(&str, &str, &str)]) -> String {
    let mut doc = String::from(r#"<?xml version="1.0" encoding="utf-8"?><feed xmlns="http://www.w3.org/2005/Atom"><title>alerts</title>"#);
    for (id, link, published) in entries {
        doc.push_str(&format!(
            r#"<entry><id>{id}</id><title>Title {id}</title><link href="{link}"/><published>{published}</published></entry>"#
        ));
    }
    doc.push_str("</feed>");
    doc
}

fn options(root: &TempDir) -> RunOptions {
    let mut opts = RunOptions::with_root(root.path());
    opts.feeds = FeedSource::list(&[URL_A, URL_B]);
    opts
}

fn archive_ids(opts: &RunOptions) -> Vec<String> {
    load_archive(&opts.paths.archive_path()).entries.into_iter().map(|e| e.id).collect()
}

#[test]
fn first_run_writes_sorted_archive() {
    let root = TempDir::new().unwrap();
    let opts = options(&root);
    let fetcher = FakeFetcher::new(&[
        (URL_A, feed(&[("a1", "https://x/1", "2025-05-01T10:00:00Z"), ("a2", "https://x/2", "2025-05-03T10:00:00Z")])),
        (URL_B, feed(&[("b1", "https://x/3", "2025-05-02T10:00:00Z")])),
    ]);

    let summary = run(&opts, &fetcher, None).unwrap();
    assert_eq!(summary.outcome, RunOutcome::Updated { added: 3, total: 3 });
    assert_eq!(archive_ids(&opts), ["a2", "b1", "a1"]);

    let entries = load_archive(&opts.paths.archive_path()).entries;
    assert!(is_sorted_newest_first(&entries));
    assert_eq!(first_duplicate(&entries), None);
}

#[test]
fn redirect_links_are_stored_unwrapped() {
    let root = TempDir::new().unwrap();
    let opts = options(&root);
    let wrapped = "https://www.google.com/url?rct=j&amp;sa=t&amp;url=https://news.example/story&amp;ct=ga&amp;cd=x";
    let fetcher = FakeFetcher::new(&[(URL_A, feed(&[("a1", wrapped, "2025-05-01")]))]);

    run(&opts, &fetcher, None).unwrap();
    let entries = load_archive(&opts.paths.archive_path()).entries;
    assert_eq!(entries[0].link, "https://news.example/story");
}

#[test]
fn second_identical_run_is_a_noop_and_leaves_bytes_alone() {
    let root = TempDir::new().unwrap();
    let opts = options(&root);
    let fetcher = FakeFetcher::new(&[
        (URL_A, feed(&[("a1", "https://x/1", "2025-05-01")])),
        (URL_B, feed(&[("b1", "https://x/2", "2025-05-02")])),
    ]);

    run(&opts, &fetcher, None).unwrap();
    let before = fs::read(opts.paths.archive_path()).unwrap();

    let summary = run(&opts, &fetcher, None).unwrap();
    assert_eq!(summary.outcome, RunOutcome::Unchanged);
    assert_eq!(fs::read(opts.paths.archive_path()).unwrap(), before);
}

#[test]
fn noop_run_does_not_rewrite_hand_edited_archive() {
    // Entries already archived under the same ids: nothing accepted, so the
    // file keeps its exact bytes, odd spacing included.
    let root = TempDir::new().unwrap();
    let opts = options(&root);
    fs::create_dir_all(opts.paths.data_dir()).unwrap();
    let hand_written = "{\"id\": \"a1\", \"title\": \"t\", \"link\": \"https://x/1\", \"published\": \"2025\"}\n\n";
    fs::write(opts.paths.archive_path(), hand_written).unwrap();

    let fetcher = FakeFetcher::new(&[(URL_A, feed(&[("a1", "https://x/1", "2025")]))]);
    let summary = run(&opts, &fetcher, None).unwrap();
    assert_eq!(summary.outcome, RunOutcome::Unchanged);
    assert_eq!(fs::read_to_string(opts.paths.archive_path()).unwrap(), hand_written);
}

#[test]
fn one_failing_source_does_not_stop_the_run() {
    let root = TempDir::new().unwrap();
    let opts = options(&root);
    let fetcher = FakeFetcher::new(&[(URL_B, feed(&[
        ("b1", "https://x/1", "2025-05-02"),
        ("b2", "https://x/2", "2025-05-03"),
    ]))]);
    let mut rec = Recorder::default();

    let summary = run(&opts, &fetcher, Some(&mut rec)).unwrap();
    assert_eq!(summary.outcome, RunOutcome::Updated { added: 2, total: 2 });
    assert!(matches!(summary.sources[0].status, SourceStatus::Failed(_)));
    assert_eq!(
        summary.sources[1].status,
        SourceStatus::Ok { found: 2, skipped: 0, accepted: 2 }
    );
    assert_eq!(
        load_archive(&opts.paths.archive_path()).entries,
        [
            Entry::new("b2", "Title b2", "https://x/2", "2025-05-03"),
            Entry::new("b1", "Title b1", "https://x/1", "2025-05-02"),
        ]
    );
    assert_eq!(rec.failed, [0]);
    assert_eq!(rec.done, [(1, 2)]);
    assert!(rec.finished);
}

#[test]
fn malformed_document_counts_as_failed_source() {
    let root = TempDir::new().unwrap();
    let opts = options(&root);
    let fetcher = FakeFetcher::new(&[
        (URL_A, String::from("<feed xmlns=\"http://www.w3.org/2005/Atom\"><entry>")),
        (URL_B, feed(&[("b1", "https://x/1", "2025-05-02")])),
    ]);

    let summary = run(&opts, &fetcher, None).unwrap();
    assert!(!summary.sources[0].is_ok());
    assert_eq!(archive_ids(&opts), ["b1"]);
}

#[test]
fn earlier_source_wins_shared_link() {
    let root = TempDir::new().unwrap();
    let opts = options(&root);
    let fetcher = FakeFetcher::new(&[
        (URL_A, feed(&[("from-a", "https://x/shared", "2025-05-01")])),
        (URL_B, feed(&[("from-b", "https://x/shared", "2025-05-09"), ("b2", "https://x/2", "2025-05-03")])),
    ]);

    let summary = run(&opts, &fetcher, None).unwrap();
    assert_eq!(summary.outcome, RunOutcome::Updated { added: 2, total: 2 });
    assert_eq!(archive_ids(&opts), ["b2", "from-a"]);
    assert_eq!(summary.sources[1].status, SourceStatus::Ok { found: 2, skipped: 0, accepted: 1 });
}

#[test]
fn new_entries_merge_into_existing_archive() {
    let root = TempDir::new().unwrap();
    let opts = options(&root);

    let first = FakeFetcher::new(&[(URL_A, feed(&[("a1", "https://x/1", "2025-05-01")]))]);
    run(&opts, &first, None).unwrap();

    let second = FakeFetcher::new(&[(URL_A, feed(&[
        ("a1", "https://x/1", "2025-05-01"),
        ("a2", "https://x/2", "2025-05-04"),
    ]))]);
    let summary = run(&opts, &second, None).unwrap();
    assert_eq!(summary.outcome, RunOutcome::Updated { added: 1, total: 2 });
    assert_eq!(archive_ids(&opts), ["a2", "a1"]);
}

#[test]
fn corrupt_archive_lines_are_dropped_on_rewrite() {
    let root = TempDir::new().unwrap();
    let opts = options(&root);
    fs::create_dir_all(opts.paths.data_dir()).unwrap();
    fs::write(
        opts.paths.archive_path(),
        "{\"id\":\"old\",\"title\":\"t\",\"link\":\"https://x/old\",\"published\":\"2024\"}\nnot json at all\n",
    )
    .unwrap();

    let fetcher = FakeFetcher::new(&[(URL_A, feed(&[("new", "https://x/new", "2025")]))]);
    run(&opts, &fetcher, None).unwrap();

    let text = fs::read_to_string(opts.paths.archive_path()).unwrap();
    assert_eq!(text.lines().count(), 2);
    assert!(!text.contains("not json"));
}

#[test]
fn non_utf8_archive_line_keeps_the_rest_of_the_archive() {
    let root = TempDir::new().unwrap();
    let opts = options(&root);
    fs::create_dir_all(opts.paths.data_dir()).unwrap();

    let mut bytes = Vec::new();
    for i in 0..3 {
        bytes.extend_from_slice(
            format!("{{\"id\":\"old{i}\",\"title\":\"t\",\"link\":\"https://x/old{i}\",\"published\":\"2024-0{}\"}}\n", 3 - i)
                .as_bytes(),
        );
        if i == 1 {
            bytes.extend_from_slice(b"{\"id\":\"bad\",\"title\":\"\xff\xfe\",\"link\":\"https://x/bad\",\"published\":\"2024\"}\n");
        }
    }
    fs::write(opts.paths.archive_path(), &bytes).unwrap();

    let fetcher = FakeFetcher::new(&[(URL_A, feed(&[("new", "https://x/new", "2025")]))]);
    let summary = run(&opts, &fetcher, None).unwrap();
    assert_eq!(summary.outcome, RunOutcome::Updated { added: 1, total: 4 });
    assert_eq!(archive_ids(&opts), ["new", "old0", "old1", "old2"]);
}

#[test]
fn every_source_failing_is_no_content() {
    let root = TempDir::new().unwrap();
    let opts = options(&root);
    let fetcher = FakeFetcher::new(&[]);

    let err = run(&opts, &fetcher, None).unwrap_err();
    assert!(matches!(err, RunError::NoContent { failed: 2, total: 2 }));
    assert!(!opts.paths.archive_path().exists());
}

#[test]
fn empty_feeds_are_no_content_too() {
    let root = TempDir::new().unwrap();
    let opts = options(&root);
    let fetcher = FakeFetcher::new(&[(URL_A, feed(&[])), (URL_B, feed(&[]))]);

    let err = run(&opts, &fetcher, None).unwrap_err();
    assert!(matches!(err, RunError::NoContent { failed: 0, total: 2 }));
}

#[test]
fn unusable_data_dir_aborts_before_any_fetch() {
    let root = TempDir::new().unwrap();
    let opts = options(&root);
    // A plain file where the data directory should be.
    fs::write(opts.paths.data_dir(), b"blocker").unwrap();
    let fetcher = FakeFetcher::new(&[(URL_A, feed(&[("a1", "https://x/1", "2025")]))]);

    let err = run(&opts, &fetcher, None).unwrap_err();
    assert!(matches!(err, RunError::Directory { .. }));
    assert_eq!(fetcher.calls.get(), 0);
}

#[test]
fn scratch_files_do_not_outlive_the_run() {
    let root = TempDir::new().unwrap();
    let opts = options(&root);
    let fetcher = FakeFetcher::new(&[
        (URL_A, feed(&[("a1", "https://x/1", "2025")])),
        (URL_B, String::from("<<< not xml")),
    ]);

    run(&opts, &fetcher, None).unwrap();
    let leftovers: Vec<_> = fs::read_dir(opts.paths.tmp_dir()).unwrap().collect();
    assert!(leftovers.is_empty());
}

#[test]
fn entries_missing_fields_are_skipped() {
    let root = TempDir::new().unwrap();
    let opts = options(&root);
    let doc = r#"<feed xmlns="http://www.w3.org/2005/Atom">
        <entry><id>ok</id><title>T</title><link href="https://x/ok"/><published>2025</published></entry>
        <entry><id>no-date</id><title>T</title><link href="https://x/nd"/></entry>
    </feed>"#;
    let fetcher = FakeFetcher::new(&[(URL_A, String::from(doc))]);

    let summary = run(&opts, &fetcher, None).unwrap();
    assert_eq!(summary.sources[0].status, SourceStatus::Ok { found: 2, skipped: 1, accepted: 1 });
    let entries = load_archive(&opts.paths.archive_path()).entries;
    assert_eq!(entries, [Entry::new("ok", "T", "https://x/ok", "2025")]);
}
