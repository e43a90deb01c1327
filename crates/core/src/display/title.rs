//! Title cleanup and truncation.

use once_cell::sync::Lazy;
use regex_lite::Regex;
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

/// Marker appended to truncated text.
pub const ELLIPSIS: &str = "...";

static SIZE_ANNOTATION: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\d+(\.\d+)? ?[kmgt]i?b").expect("valid size regex"));
static REPEATED_SPACE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\s{2,}").expect("valid whitespace regex"));
static ORPHAN_DASH: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"-(\s+-)+").expect("valid dash regex"));
static TRAILING_DASH: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\s*-\s*$").expect("valid trailing dash regex"));

/// Strip size annotations and leftover punctuation from a torrent title.
///
/// Every rewrite shortens the text, so the passes repeat until nothing
/// changes; the result is a fixed point and normalizing it again is a no-op.
pub fn normalize_title(title: &str) -> String {
    let mut current = title.trim().to_string();
    loop {
        let next = normalize_once(&current);
        if next == current {
            return current;
        }
        current = next;
    }
}

fn normalize_once(title: &str) -> String {
    let text = SIZE_ANNOTATION.replace_all(title, "");
    let text = REPEATED_SPACE.replace_all(&text, " ");
    let text = ORPHAN_DASH.replace_all(&text, "-");
    let text = TRAILING_DASH.replace_all(&text, "");
    text.trim().to_string()
}

/// Shorten `text` to at most `width` display columns, ending in [`ELLIPSIS`].
pub fn truncate(text: &str, width: usize) -> String {
    if text.width() <= width {
        return text.to_string();
    }

    let marker = if width >= ELLIPSIS.len() { ELLIPSIS } else { "" };
    let budget = width - marker.len();

    let mut out = String::new();
    let mut used = 0;
    for ch in text.chars() {
        let w = ch.width().unwrap_or(0);
        if used + w > budget {
            break;
        }
        out.push(ch);
        used += w;
    }
    let mut out = out.trim_end().to_string();
    out.push_str(marker);
    out
}
