//! Mock collaborators for testing purposes.
//!
//! This module provides in-memory [`Publisher`] and [`MediaResolver`]
//! implementations so that publishing can be exercised without a network.

use std::collections::{HashMap, HashSet};

use async_trait::async_trait;
use bytes::Bytes;

use crate::album::ImageRef;
use crate::error::BoxError;
use crate::publish::{MediaResolver, Publisher, Receipt};

/// A message accepted by [`MockPublisher`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishCall {
    /// Identifier assigned to the message
    pub id: String,
    /// Text that was posted
    pub text: String,
    /// Images that were posted
    pub media: Vec<Bytes>,
    /// Message this one replied to
    pub reply_to: Option<String>,
}

/// A mock publisher that records every message it accepts.
///
/// Identifiers are assigned sequentially starting at 1. Specific attempts can
/// be made to fail, to simulate rejected media or network errors.
#[derive(Debug)]
pub struct MockPublisher {
    author_handle: String,
    next_id: u64,
    attempts: usize,
    fail_on: HashSet<usize>,
    calls: Vec<PublishCall>,
}

impl MockPublisher {
    /// Create a mock publisher posting as `author_handle`.
    pub fn new(author_handle: impl Into<String>) -> Self {
        Self {
            author_handle: author_handle.into(),
            next_id: 1,
            attempts: 0,
            fail_on: HashSet::new(),
            calls: Vec::new(),
        }
    }

    /// Make the given attempt (counting from 0, failures included) fail.
    pub fn fail_on_call(mut self, attempt: usize) -> Self {
        self.fail_on.insert(attempt);
        self
    }

    /// Messages accepted so far, in order.
    pub fn calls(&self) -> &[PublishCall] {
        &self.calls
    }

    /// Number of publish attempts, including failed ones.
    pub fn attempts(&self) -> usize {
        self.attempts
    }
}

#[async_trait]
impl Publisher for MockPublisher {
    async fn publish(
        &mut self,
        text: &str,
        media: Option<Vec<Bytes>>,
        reply_to: Option<&str>,
    ) -> Result<Receipt, BoxError> {
        let attempt = self.attempts;
        self.attempts += 1;
        if self.fail_on.contains(&attempt) {
            return Err(format!("attempt {attempt} rejected").into());
        }

        let id = self.next_id.to_string();
        self.next_id += 1;
        self.calls.push(PublishCall {
            id: id.clone(),
            text: text.to_string(),
            media: media.unwrap_or_default(),
            reply_to: reply_to.map(str::to_string),
        });

        Ok(Receipt {
            id,
            author_handle: self.author_handle.clone(),
        })
    }
}

/// A mock resolver serving images from memory.
#[derive(Debug, Clone, Default)]
pub struct MockResolver {
    images: HashMap<String, Bytes>,
    failing: HashSet<String>,
    permissive: bool,
}

impl MockResolver {
    /// Create a resolver that only knows the images added with [`with_image`](Self::with_image).
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a resolver that answers any reference with its own name as bytes.
    pub fn permissive() -> Self {
        Self {
            permissive: true,
            ..Self::default()
        }
    }

    /// Serve `bytes` for `image`.
    pub fn with_image(mut self, image: impl Into<String>, bytes: impl Into<Bytes>) -> Self {
        self.images.insert(image.into(), bytes.into());
        self
    }

    /// Always fail to resolve `image`.
    pub fn failing(mut self, image: impl Into<String>) -> Self {
        self.failing.insert(image.into());
        self
    }
}

#[async_trait]
impl MediaResolver for MockResolver {
    async fn resolve(&self, image: &ImageRef) -> Result<Bytes, BoxError> {
        let key = image.as_str();
        if self.failing.contains(key) {
            return Err(format!("{key} is unavailable").into());
        }
        match self.images.get(key) {
            Some(bytes) => Ok(bytes.clone()),
            None if self.permissive => Ok(Bytes::copy_from_slice(key.as_bytes())),
            None => Err(format!("{key} not found").into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_publisher_assigns_ids_and_fails_on_request() {
        let mut publisher = MockPublisher::new("alex").fail_on_call(1);
        let first = publisher.publish("one", None, None).await.unwrap();
        assert_eq!(first.id, "1");
        assert!(publisher.publish("two", None, Some("1")).await.is_err());
        let retry = publisher.publish("two", None, Some("1")).await.unwrap();
        assert_eq!(retry.id, "2");
        assert_eq!(publisher.attempts(), 3);
        assert_eq!(publisher.calls().len(), 2);
    }

    #[tokio::test]
    async fn test_mock_resolver() {
        let resolver = MockResolver::new().with_image("a.jpg", &b"jpeg"[..]);
        assert_eq!(resolver.resolve(&ImageRef::new("a.jpg")).await.unwrap(), Bytes::from_static(b"jpeg"));
        assert!(resolver.resolve(&ImageRef::new("b.jpg")).await.is_err());

        let resolver = MockResolver::permissive().failing("c.jpg");
        assert!(resolver.resolve(&ImageRef::new("b.jpg")).await.is_ok());
        assert!(resolver.resolve(&ImageRef::new("c.jpg")).await.is_err());
    }
}
