// src/core/sanitize.rs

use once_cell::sync::Lazy;
use regex::Regex;

use crate::config::consts::REDIRECT_WRAPPER_PATTERN;

static REDIRECT_WRAPPER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(REDIRECT_WRAPPER_PATTERN).expect("redirect wrapper pattern is a valid regex")
});

/// Strip the alert redirect wrapper from a link.
///
/// `https://www.google.com/url?rct=j&sa=t&url=<target>&ct=ga&...` becomes
/// `<target>`; the `&ct=` tracking tail is optional. Links without the
/// wrapper come back unchanged.
pub fn clean_redirect_link(link: &str) -> String {
    if link.is_empty() {
        return s!();
    }
    match REDIRECT_WRAPPER.captures(link).and_then(|c| c.get(1)) {
        Some(target) => s!(target.as_str()),
        None => s!(link),
    }
}
