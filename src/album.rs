//! Album extraction.
//!
//! Post content embeds photo albums inline. An album block is opened and
//! closed by a run of three or more `@` characters, and holds markdown
//! link-shaped image entries separated by optional whitespace and an
//! optional dash:
//!
//! ```text
//! Some prose.
//!
//! @@@
//! [](/data/2017/8/25/img_6838.jpg)-
//! [a caption](/data/2017/8/25/img_6834.jpg)
//! @@@
//!
//! More prose.
//! ```
//!
//! The extractor splits content into an ordered list of [`Span`]s so that
//! later stages can re-interleave text and albums without placeholder markers.

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

static ALBUM_BLOCK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)@{3,}(?P<album>.*?)@{3,}").unwrap());

// The reference runs to the `)` closing the entry; it may hold spaces and
// balanced parentheses, as in `IMG_1 (1).jpg`.
static IMAGE_ENTRY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\[(?P<alt>[^\[\]]*)\]\((?P<image>(?:[^()\r\n]|\([^()\r\n]*\))+)\)").unwrap()
});

/// A reference to an image: a path or URL, opaque to this library.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ImageRef(String);

impl ImageRef {
    /// Create an image reference.
    pub fn new(image: impl Into<String>) -> Self {
        Self(image.into())
    }

    /// The reference as written in the post.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ImageRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ImageRef {
    fn from(image: &str) -> Self {
        Self::new(image)
    }
}

impl From<String> for ImageRef {
    fn from(image: String) -> Self {
        Self(image)
    }
}

/// An ordered group of images that belong together.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Album {
    images: Vec<ImageRef>,
}

impl Album {
    /// Create an album from image references, keeping their order.
    pub fn new(images: impl IntoIterator<Item = impl Into<ImageRef>>) -> Self {
        Self {
            images: images.into_iter().map(Into::into).collect(),
        }
    }

    /// The images in source order.
    pub fn images(&self) -> &[ImageRef] {
        &self.images
    }

    /// Number of images in the album.
    pub fn len(&self) -> usize {
        self.images.len()
    }

    /// Whether the album has no images.
    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }

    /// Split the album into consecutive batches of at most `max` images.
    ///
    /// A `max` of zero is treated as one.
    pub fn batches(&self, max: usize) -> Vec<Album> {
        self.images
            .chunks(max.max(1))
            .map(|batch| Album {
                images: batch.to_vec(),
            })
            .collect()
    }
}

/// A piece of post content: either prose or an album, in source order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Span {
    /// Prose between album blocks, untouched
    Text(String),
    /// An album with at least one image
    Album(Album),
}

/// The result of [`extract`]: all albums plus the album-free content.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Extraction {
    /// Albums in source order
    pub albums: Vec<Album>,
    /// Content with every album block removed
    pub text: String,
}

/// Split content into text and album spans, in source order.
///
/// Empty albums are dropped and empty text between blocks is omitted, so the
/// result never contains an empty span.
pub fn split_spans(content: &str) -> Vec<Span> {
    let mut spans = Vec::new();
    let mut last_end = 0;

    for block in ALBUM_BLOCK.captures_iter(content) {
        let Some(whole) = block.get(0) else { continue };

        let before = &content[last_end..whole.start()];
        if !before.is_empty() {
            spans.push(Span::Text(before.to_string()));
        }
        last_end = whole.end();

        let body = block.name("album").map_or("", |m| m.as_str());
        let album = parse_album(body);
        if album.is_empty() {
            debug!(offset = whole.start(), "dropping album block with no images");
        } else {
            spans.push(Span::Album(album));
        }
    }

    let rest = &content[last_end..];
    if !rest.is_empty() {
        spans.push(Span::Text(rest.to_string()));
    }

    debug!(
        spans = spans.len(),
        albums = spans.iter().filter(|span| matches!(span, Span::Album(_))).count(),
        "split content into spans"
    );
    spans
}

/// Extract every album from content and return the remaining prose.
///
/// # Example
///
/// ```
/// use posse_thread::album::{extract, Album};
///
/// let extraction = extract("@@@[](img1)-[](img2)@@@Hello world. More text.");
/// assert_eq!(extraction.albums, vec![Album::new(["img1", "img2"])]);
/// assert_eq!(extraction.text, "Hello world. More text.");
/// ```
pub fn extract(content: &str) -> Extraction {
    let mut extraction = Extraction::default();

    for span in split_spans(content) {
        match span {
            Span::Album(album) => extraction.albums.push(album),
            Span::Text(text) => join_text(&mut extraction.text, &text),
        }
    }

    extraction
}

/// Append `next` to `text`, keeping words on either side of a removed block apart.
pub(crate) fn join_text(text: &mut String, next: &str) {
    let glued = text.ends_with(|c: char| !c.is_whitespace())
        && next.starts_with(|c: char| !c.is_whitespace());
    if glued {
        text.push('\n');
    }
    text.push_str(next);
}

fn parse_album(body: &str) -> Album {
    let images: Vec<ImageRef> = IMAGE_ENTRY
        .captures_iter(body)
        .filter_map(|entry| entry.name("image"))
        .map(|image| image.as_str().trim())
        .filter(|image| !image.is_empty())
        .map(ImageRef::new)
        .collect();

    // Anything besides entries and their separators is a malformed entry.
    let leftover = IMAGE_ENTRY.replace_all(body, "");
    if leftover.chars().any(|c| !c.is_whitespace() && c != '-') {
        warn!(
            leftover = %leftover.trim(),
            kept = images.len(),
            "skipping malformed album entries"
        );
    }

    Album { images }
}
