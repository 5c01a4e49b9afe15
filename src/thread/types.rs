//! Core types for assembled threads.

use serde::{Deserialize, Serialize};

use crate::album::Album;
use crate::segment::TextChunk;

/// Identifier of an existing post that a thread replies to.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ReplyAnchor(String);

impl ReplyAnchor {
    /// Create an anchor from a platform post identifier.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The platform post identifier.
    pub fn id(&self) -> &str {
        &self.0
    }
}

/// One message of a thread: a text chunk with optional media.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostingUnit {
    /// Text of the message
    pub text: TextChunk,
    /// Images posted with the message
    pub media: Option<Album>,
}

impl PostingUnit {
    /// Create a text-only unit.
    pub fn text(text: TextChunk) -> Self {
        Self { text, media: None }
    }

    /// Create a unit that carries only media.
    pub fn media(media: Album) -> Self {
        Self {
            text: TextChunk::plain(""),
            media: Some(media),
        }
    }

    /// Check if this unit carries images.
    pub fn has_media(&self) -> bool {
        self.media.as_ref().is_some_and(|album| !album.is_empty())
    }

    /// Render the unit text, appending `link` if the unit reserves it.
    pub fn render(&self, link: &str) -> String {
        self.text.render(link)
    }
}

/// An assembled thread, ready to publish.
///
/// Units are immutable once assembled, so a thread can be published again
/// from any unit boundary after a failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Thread {
    link: String,
    anchor: Option<ReplyAnchor>,
    units: Vec<PostingUnit>,
}

impl Thread {
    pub(crate) fn new(link: String, anchor: Option<ReplyAnchor>, units: Vec<PostingUnit>) -> Self {
        Self {
            link,
            anchor,
            units,
        }
    }

    /// The permalink appended to the first unit.
    pub fn link(&self) -> &str {
        &self.link
    }

    /// The external post the first unit replies to, if any.
    pub fn anchor(&self) -> Option<&ReplyAnchor> {
        self.anchor.as_ref()
    }

    /// The units in publishing order.
    pub fn units(&self) -> &[PostingUnit] {
        &self.units
    }

    /// Get a unit by position.
    pub fn get(&self, index: usize) -> Option<&PostingUnit> {
        self.units.get(index)
    }

    /// Number of units in the thread.
    pub fn len(&self) -> usize {
        self.units.len()
    }

    /// Check if the thread has no units.
    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }

    /// Rendered text of every unit, in order.
    pub fn rendered(&self) -> Vec<String> {
        self.units.iter().map(|unit| unit.render(&self.link)).collect()
    }

    /// Total number of images across all units.
    pub fn media_count(&self) -> usize {
        self.units
            .iter()
            .filter_map(|unit| unit.media.as_ref())
            .map(Album::len)
            .sum()
    }

    /// Consume the thread, returning its units.
    pub fn into_units(self) -> Vec<PostingUnit> {
        self.units
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_media_unit_renders_empty() {
        let unit = PostingUnit::media(Album::new(["a.jpg"]));
        assert!(unit.has_media());
        assert_eq!(unit.render("example.com/e/1"), "");
    }

    #[test]
    fn test_empty_album_is_not_media() {
        let unit = PostingUnit {
            text: TextChunk::plain("hi"),
            media: Some(Album::default()),
        };
        assert!(!unit.has_media());
    }

    #[test]
    fn test_thread_accessors() {
        let first = TextChunk {
            text: "Hello".to_string(),
            reserves_link: true,
            continues: false,
        };
        let thread = Thread::new(
            "example.com/e/1".to_string(),
            Some(ReplyAnchor::new("555")),
            vec![
                PostingUnit::text(first),
                PostingUnit::media(Album::new(["a.jpg", "b.jpg"])),
            ],
        );
        assert_eq!(thread.len(), 2);
        assert_eq!(thread.anchor().map(ReplyAnchor::id), Some("555"));
        assert_eq!(thread.rendered(), vec!["Hello example.com/e/1".to_string(), String::new()]);
        assert_eq!(thread.media_count(), 2);
        assert!(thread.get(2).is_none());
    }
}
