//! Prose normalization.
//!
//! Markdown links would otherwise spend the character budget on raw URLs, and
//! line breaks carry no meaning once text is packed into chunks.

use std::sync::LazyLock;

use regex::Regex;

static MARKDOWN_LINK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"!?\[(?P<label>[^\[\]]*)\]\([^()\s]*\)").unwrap());

static LINE_BREAK: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s*[\r\n]\s*").unwrap());

/// Normalize album-free prose for character counting.
///
/// Replaces `[label](url)` and `![label](url)` with `label` and collapses line
/// breaks (with any surrounding whitespace) into a single space. Links are
/// unwrapped until none remain, so nested links come out as plain text and
/// applying it twice gives the same result as applying it once.
///
/// Album entries are link-shaped too, so albums must be removed first.
///
/// # Example
///
/// ```
/// use posse_thread::normalize::normalize;
///
/// let text = "I found [a converter](https://example.org/smtk2ssrf.pl)\nfor my logs.";
/// assert_eq!(normalize(text), "I found a converter for my logs.");
/// ```
pub fn normalize(text: &str) -> String {
    let mut unlinked = text.to_string();
    loop {
        let next = MARKDOWN_LINK.replace_all(&unlinked, "$label").into_owned();
        if next == unlinked {
            break;
        }
        unlinked = next;
    }

    let single_line = LINE_BREAK.replace_all(&unlinked, " ");
    single_line.trim().to_string()
}
