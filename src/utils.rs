//! Utility functions for building and recognizing permalinks.

use chrono::{Datelike, NaiveDate};

/// Turn a title into a URL slug.
///
/// Lowercases the text and joins runs of letters and digits with single dashes.
///
/// # Example
///
/// ```
/// use posse_thread::utils::slugify;
///
/// assert_eq!(slugify("A Surreal Setting"), "a-surreal-setting");
/// assert_eq!(slugify("  DLSS & RLSS, 2018!  "), "dlss-rlss-2018");
/// ```
pub fn slugify(title: &str) -> String {
    let mut slug = String::with_capacity(title.len());
    let mut pending_dash = false;

    for c in title.chars() {
        if c.is_alphanumeric() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.extend(c.to_lowercase());
        } else {
            pending_dash = true;
        }
    }

    slug
}

/// Build the permalink of an entry on the author's own site.
///
/// Entries live at `<domain>/e/<year>/<month>/<day>/<slug>`. The slug comes
/// from the entry's name when it has one (articles), otherwise from the first
/// sentence of its content (notes).
///
/// # Example
///
/// ```
/// use chrono::NaiveDate;
/// use posse_thread::utils::entry_permalink;
///
/// let published = NaiveDate::from_ymd_opt(2017, 8, 25).unwrap();
/// assert_eq!(
///     entry_permalink("kongaloosh.com", published, None, "Solar eclipse. It was great."),
///     "kongaloosh.com/e/2017/8/25/solar-eclipse"
/// );
/// ```
pub fn entry_permalink(domain: &str, published: NaiveDate, name: Option<&str>, content: &str) -> String {
    let title = match name {
        Some(name) if !name.trim().is_empty() => name,
        _ => content.split('.').next().unwrap_or_default(),
    };

    format!(
        "{}/e/{}/{}/{}/{}",
        domain.trim_end_matches('/'),
        published.year(),
        published.month(),
        published.day(),
        slugify(title)
    )
}

/// Build the permalink of a published status.
///
/// # Example
///
/// ```
/// use posse_thread::utils::status_permalink;
///
/// assert_eq!(
///     status_permalink("https://twitter.com/", "kongaloosh", "1234"),
///     "https://twitter.com/kongaloosh/status/1234"
/// );
/// ```
pub fn status_permalink(base_url: &str, account: &str, id: &str) -> String {
    format!("{}/{}/status/{}", base_url.trim_end_matches('/'), account, id)
}

/// Extract the post identifier from a URL on the given platform.
///
/// Returns `None` when the URL belongs to another site or has no trailing
/// path segment. The scheme and a leading `www.` are ignored when comparing.
///
/// # Example
///
/// ```
/// use posse_thread::utils::reply_anchor_from_url;
///
/// let id = reply_anchor_from_url("https://platform.example/user/status/555", "https://platform.example");
/// assert_eq!(id.as_deref(), Some("555"));
/// assert_eq!(reply_anchor_from_url("https://elsewhere.example/p/1", "https://platform.example"), None);
/// ```
pub fn reply_anchor_from_url(url: &str, base_url: &str) -> Option<String> {
    let target = strip_origin(url.trim());
    let base = strip_origin(base_url.trim()).trim_end_matches('/');
    if base.is_empty() {
        return None;
    }

    let path = target.strip_prefix(base)?.strip_prefix('/')?;
    let path = path.split(['?', '#']).next().unwrap_or_default();

    path.trim_end_matches('/')
        .rsplit('/')
        .next()
        .filter(|segment| !segment.is_empty())
        .map(str::to_string)
}

fn strip_origin(url: &str) -> &str {
    let url = url
        .strip_prefix("https://")
        .or_else(|| url.strip_prefix("http://"))
        .unwrap_or(url);
    url.strip_prefix("www.").unwrap_or(url)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slugify_unicode_and_edges() {
        assert_eq!(slugify("Café Über"), "café-über");
        assert_eq!(slugify("---"), "");
        assert_eq!(slugify("one"), "one");
    }

    #[test]
    fn test_entry_permalink_prefers_name() {
        let published = NaiveDate::from_ymd_opt(2018, 8, 1).unwrap();
        assert_eq!(
            entry_permalink("https://kongaloosh.com/", published, Some("DLSS and RLSS"), "ignored"),
            "https://kongaloosh.com/e/2018/8/1/dlss-and-rlss"
        );
        assert_eq!(
            entry_permalink("kongaloosh.com", published, Some(" "), "Back in Toronto"),
            "kongaloosh.com/e/2018/8/1/back-in-toronto"
        );
    }

    #[test]
    fn test_reply_anchor_variants() {
        let base = "https://twitter.com";
        assert_eq!(
            reply_anchor_from_url("http://www.twitter.com/a/status/42/", base).as_deref(),
            Some("42")
        );
        assert_eq!(
            reply_anchor_from_url("https://twitter.com/a/status/42?s=20#frag", base).as_deref(),
            Some("42")
        );
        assert_eq!(reply_anchor_from_url("https://twitter.com", base), None);
        assert_eq!(reply_anchor_from_url("https://twitter.community/a/1", base), None);
        assert_eq!(reply_anchor_from_url("https://twitter.com/a/1", ""), None);
    }
}
