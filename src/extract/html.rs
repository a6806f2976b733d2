//! Regex-based HTML to plain-text stripping.
//!
//! The passes run in a fixed order: later passes assume the earlier tag
//! classes are already gone.

use once_cell::sync::Lazy;
use regex::Regex;

/// Maximum characters returned by [`extract_text`].
pub const MAX_CHARS: usize = 12_000;

/// Elements removed together with their contents.
const DROPPED_ELEMENTS: [&str; 5] = ["script", "style", "nav", "header", "footer"];

/// Entities decoded, applied one after another in this order.
const ENTITIES: [(&str, &str); 4] = [("&nbsp;", " "), ("&amp;", "&"), ("&lt;", "<"), ("&gt;", ">")];

static DROPPED_BLOCKS: Lazy<Vec<Regex>> = Lazy::new(|| {
    DROPPED_ELEMENTS
        .iter()
        .map(|name| {
            Regex::new(&format!(r"(?is)<{name}[^>]*>.*?</{name}>"))
                .expect("static element pattern is valid")
        })
        .collect()
});

static ANY_TAG: Lazy<Regex> = Lazy::new(|| Regex::new(r"<[^>]+>").expect("static tag pattern is valid"));

/// Byte-order mark, also used as a zero-width no-break space. Treated as
/// whitespace alongside Unicode `White_Space`.
const BOM: char = '\u{FEFF}';

static WHITESPACE_RUN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[\s\x{FEFF}]+").expect("static whitespace pattern is valid"));

/// Strip an HTML document down to readable text, capped at [`MAX_CHARS`].
///
/// Never fails: malformed markup just leaves more residue in the output.
pub fn extract_text(html: &str) -> String {
    extract_text_with_limit(html, MAX_CHARS)
}

/// Same as [`extract_text`] with a caller-chosen character cap.
///
/// The cap counts Unicode scalar values and may cut a word in half.
pub fn extract_text_with_limit(html: &str, max_chars: usize) -> String {
    let mut text = html.to_string();

    for block in DROPPED_BLOCKS.iter() {
        text = block.replace_all(&text, "").into_owned();
    }

    text = ANY_TAG.replace_all(&text, " ").into_owned();

    for (entity, literal) in ENTITIES {
        text = text.replace(entity, literal);
    }

    let collapsed = WHITESPACE_RUN.replace_all(&text, " ");
    let trimmed = collapsed.trim_matches(|c: char| c.is_whitespace() || c == BOM);
    truncate_chars(trimmed, max_chars)
}

fn truncate_chars(s: &str, max_chars: usize) -> String {
    match s.char_indices().nth(max_chars) {
        Some((idx, _)) => s[..idx].to_string(),
        None => s.to_string(),
    }
}
