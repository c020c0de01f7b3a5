// src/config/consts.rs

// Sources: Google Alerts Atom feeds. Order matters for cross-source dedup.
pub const FEED_URLS: &[&str] = &[
    "https://www.google.com/alerts/feeds/15244278077982194024/11541540114411201767",
    "https://www.google.com/alerts/feeds/15244278077982194024/10845276624304286453",
];

// Net config
pub const FETCH_TIMEOUT_SECS: u64 = 30;
pub const USER_AGENT: &str = concat!("feed_archive/", env!("CARGO_PKG_VERSION"));

// Feed format
pub const ATOM_NS: &[u8] = b"http://www.w3.org/2005/Atom";

// Redirect wrapper around real article links: keep group 1, drop "&ct=..." tail.
pub const REDIRECT_WRAPPER_PATTERN: &str =
    r"https://www\.google\.com/url\?rct=j&sa=t&url=(.+?)(?:&ct=.+)?$";

// Local layout (relative to the root dir)
pub const DEFAULT_DATA_DIR: &str = "data";
pub const DEFAULT_TMP_DIR: &str = "tmp";
pub const DEFAULT_ARCHIVE_FILE: &str = "feed_entries.jsonl";
pub const SCRATCH_PREFIX: &str = "feed_temp";
