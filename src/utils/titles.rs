//! Track title helpers

use once_cell::sync::Lazy;
use regex::Regex;

static TRACK_NUMBER_PREFIX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d+\.\s*").expect("valid track number regex"));

/// Drop a leading `N. ` track number from a display title
pub fn strip_track_number(title: &str) -> &str {
    match TRACK_NUMBER_PREFIX.find(title) {
        Some(m) => &title[m.end()..],
        None => title,
    }
}
