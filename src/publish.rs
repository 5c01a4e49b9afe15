//! Publishing assembled threads.
//!
//! Publishing is the only step that performs I/O, and it is left to the
//! caller's [`Publisher`] and [`MediaResolver`] implementations. This module
//! drives them in thread order: each unit replies to the unit published
//! before it, and the first unit replies to the thread's anchor, if any.
//!
//! A [`PublishSession`] remembers how far it got. When a unit fails, the
//! error reports its index and how many units already went out; calling
//! [`PublishSession::run`] again retries from the failed unit. Units that were
//! published are never retracted, and dropping the future returned by `run`
//! stops before the next unit, so a partially posted thread is a possible
//! outcome the caller has to handle.

use async_trait::async_trait;
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::album::ImageRef;
use crate::context::PlatformConfig;
use crate::error::{BoxError, Error, Result};
use crate::thread::Thread;
use crate::utils::status_permalink;

/// What a publisher reports for a posted message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Receipt {
    /// Platform identifier of the new message
    pub id: String,
    /// Handle of the account that posted it
    pub author_handle: String,
}

/// Posts one message to a platform.
///
/// Implementations wrap a concrete HTTP client; this library never talks to
/// the network itself.
#[async_trait]
pub trait Publisher: Send {
    /// Post `text` with optional images, as a reply to `reply_to` when given.
    async fn publish(
        &mut self,
        text: &str,
        media: Option<Vec<Bytes>>,
        reply_to: Option<&str>,
    ) -> std::result::Result<Receipt, BoxError>;
}

/// Loads image bytes for an image reference.
///
/// Called once per image, right before the unit carrying it is published.
#[async_trait]
pub trait MediaResolver: Send + Sync {
    /// Fetch the bytes of `image`.
    async fn resolve(&self, image: &ImageRef) -> std::result::Result<Bytes, BoxError>;
}

/// What to do when an image of a unit cannot be resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MediaFallback {
    /// Stop and report the failure
    #[default]
    Abort,
    /// Publish the unit without its images
    TextOnly,
}

/// A unit that reached the platform.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublishedUnit {
    /// Position of the unit in the thread
    pub index: usize,
    /// Platform identifier of the message
    pub id: String,
    /// Handle of the account that posted it
    pub author_handle: String,
    /// Number of images posted with it
    pub media_count: usize,
    /// Whether the unit was skipped because it had nothing left to post.
    ///
    /// A skipped unit carries the id of the message before it, so the next
    /// unit still replies into the chain.
    pub skipped: bool,
}

/// A fully published thread.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishedThread {
    /// Every unit, in thread order
    pub units: Vec<PublishedUnit>,
    /// Permalink of the first message
    pub permalink: String,
}

/// Sequential, resumable publishing of one thread.
///
/// # Example
///
/// ```
/// use posse_thread::context::ThreadContext;
/// use posse_thread::mock::{MockPublisher, MockResolver};
/// use posse_thread::publish::PublishSession;
/// use posse_thread::thread::assemble;
///
/// # #[tokio::main]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let ctx = ThreadContext::new("kongaloosh.com/e/2018/8/1/dlss");
/// let thread = assemble("Back in Toronto for the summer.", &ctx)?;
///
/// let mut publisher = MockPublisher::new("kongaloosh");
/// let resolver = MockResolver::permissive();
///
/// let mut session = PublishSession::new(&thread, ctx.platform_config());
/// let published = session.run(&mut publisher, &resolver).await?;
/// assert_eq!(published.permalink, "https://twitter.com/kongaloosh/status/1");
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct PublishSession<'a> {
    thread: &'a Thread,
    base_url: String,
    fallback: MediaFallback,
    published: Vec<PublishedUnit>,
}

impl<'a> PublishSession<'a> {
    /// Start publishing a thread from its first unit.
    pub fn new(thread: &'a Thread, platform: &PlatformConfig) -> Self {
        Self {
            thread,
            base_url: platform.base_url.clone(),
            fallback: MediaFallback::default(),
            published: Vec::new(),
        }
    }

    /// Continue a thread from previously recorded progress.
    ///
    /// `published` must be the units already posted, in order, starting at
    /// index 0. Publishing resumes at `published.len()`.
    pub fn resume(
        thread: &'a Thread,
        platform: &PlatformConfig,
        published: Vec<PublishedUnit>,
    ) -> Result<Self> {
        if published.len() > thread.len() {
            return Err(Error::InvalidResume {
                index: published.len(),
                len: thread.len(),
            });
        }
        if let Some((position, unit)) = published
            .iter()
            .enumerate()
            .find(|(position, unit)| unit.index != *position)
        {
            return Err(Error::InvalidResume {
                index: unit.index.max(position),
                len: thread.len(),
            });
        }

        debug!(next = published.len(), "resuming thread");
        Ok(Self {
            published,
            ..Self::new(thread, platform)
        })
    }

    /// Set what happens when an image cannot be resolved.
    pub fn fallback(mut self, fallback: MediaFallback) -> Self {
        self.fallback = fallback;
        self
    }

    /// Index of the next unit to publish.
    pub fn next_index(&self) -> usize {
        self.published.len()
    }

    /// Check if every unit has been published.
    pub fn is_complete(&self) -> bool {
        self.published.len() == self.thread.len()
    }

    /// Units published so far.
    pub fn published(&self) -> &[PublishedUnit] {
        &self.published
    }

    /// The id the next unit replies to.
    pub fn reply_to(&self) -> Option<&str> {
        match self.published.last() {
            Some(unit) => Some(&unit.id),
            None => self.thread.anchor().map(|anchor| anchor.id()),
        }
    }

    /// Publish the next unit.
    ///
    /// Returns `Ok(None)` once the thread is complete. On error the session is
    /// unchanged, so calling again retries the same unit.
    pub async fn publish_next<P, R>(
        &mut self,
        publisher: &mut P,
        resolver: &R,
    ) -> Result<Option<&PublishedUnit>>
    where
        P: Publisher + ?Sized,
        R: MediaResolver + ?Sized,
    {
        let thread = self.thread;
        let index = self.next_index();
        let Some(unit) = thread.get(index) else {
            return Ok(None);
        };

        let media = self.resolve_media(index, resolver).await?;
        let text = unit.render(thread.link());

        if text.is_empty() && media.is_none() {
            if let Some(previous) = self.published.last().cloned() {
                warn!(index, "unit has neither text nor media left, skipping");
                self.published.push(PublishedUnit {
                    index,
                    media_count: 0,
                    skipped: true,
                    ..previous
                });
                return Ok(self.published.last());
            }
        }

        let media_count = media.as_ref().map_or(0, Vec::len);
        let reply_to = self.reply_to().map(str::to_string);
        debug!(index, media_count, reply_to = ?reply_to, "publishing unit");

        let receipt = publisher
            .publish(&text, media, reply_to.as_deref())
            .await
            .map_err(|source| {
                warn!(index, published = self.published.len(), error = %source, "publish failed");
                Error::Publish {
                    index,
                    published: self.published.len(),
                    source,
                }
            })?;

        info!(index, id = %receipt.id, "published unit");
        self.published.push(PublishedUnit {
            index,
            id: receipt.id,
            author_handle: receipt.author_handle,
            media_count,
            skipped: false,
        });
        Ok(self.published.last())
    }

    /// Publish every remaining unit, in order.
    ///
    /// Returns the published thread, whose permalink points at the first unit.
    pub async fn run<P, R>(&mut self, publisher: &mut P, resolver: &R) -> Result<PublishedThread>
    where
        P: Publisher + ?Sized,
        R: MediaResolver + ?Sized,
    {
        while self.publish_next(publisher, resolver).await?.is_some() {}

        let thread = self.finish().ok_or_else(|| Error::InvalidResume {
            index: self.next_index(),
            len: self.thread.len(),
        })?;
        info!(permalink = %thread.permalink, units = thread.units.len(), "thread published");
        Ok(thread)
    }

    /// The published thread, once every unit went out.
    pub fn finish(&self) -> Option<PublishedThread> {
        if !self.is_complete() {
            return None;
        }
        let first = self.published.first()?;
        Some(PublishedThread {
            permalink: status_permalink(&self.base_url, &first.author_handle, &first.id),
            units: self.published.clone(),
        })
    }

    async fn resolve_media<R>(&self, index: usize, resolver: &R) -> Result<Option<Vec<Bytes>>>
    where
        R: MediaResolver + ?Sized,
    {
        let Some(album) = self.thread.get(index).and_then(|unit| unit.media.as_ref()) else {
            return Ok(None);
        };
        if album.is_empty() {
            return Ok(None);
        }

        let mut images = Vec::with_capacity(album.len());
        for image in album.images() {
            match resolver.resolve(image).await {
                Ok(bytes) => images.push(bytes),
                Err(source) => match self.fallback {
                    MediaFallback::Abort => {
                        return Err(Error::Resolve {
                            index,
                            image: image.to_string(),
                            published: self.published.len(),
                            source,
                        });
                    }
                    MediaFallback::TextOnly => {
                        warn!(index, image = %image, error = %source, "image unavailable, posting text only");
                        return Ok(None);
                    }
                },
            }
        }
        Ok(Some(images))
    }
}

/// Publish a whole thread from the start.
///
/// Shorthand for [`PublishSession::new`] followed by [`PublishSession::run`].
pub async fn publish_thread<P, R>(
    thread: &Thread,
    platform: &PlatformConfig,
    publisher: &mut P,
    resolver: &R,
) -> Result<PublishedThread>
where
    P: Publisher + ?Sized,
    R: MediaResolver + ?Sized,
{
    PublishSession::new(thread, platform)
        .run(publisher, resolver)
        .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::ThreadContext;
    use crate::mock::{MockPublisher, MockResolver};
    use crate::thread::assemble;

    fn three_unit_thread() -> (Thread, ThreadContext) {
        let ctx = ThreadContext::new("kongaloosh.com/e/1").platform(PlatformConfig {
            char_limit: 40,
            reserved_link_width: 10,
            ..PlatformConfig::default()
        });
        let content = "First sentence is here. @@@[](a.jpg)@@@ Second sentence goes here. Third sentence comes last.";
        (assemble(content, &ctx).unwrap(), ctx)
    }

    #[tokio::test]
    async fn test_units_chain_replies() {
        let (thread, ctx) = three_unit_thread();
        let mut publisher = MockPublisher::new("alex");
        let resolver = MockResolver::permissive();

        let published = publish_thread(&thread, ctx.platform_config(), &mut publisher, &resolver)
            .await
            .unwrap();

        assert_eq!(published.units.len(), thread.len());
        let calls = publisher.calls();
        assert_eq!(calls[0].reply_to, None);
        for pair in calls.windows(2) {
            assert_eq!(pair[1].reply_to.as_deref(), Some(pair[0].id.as_str()));
        }
        assert_eq!(calls[0].media.len(), 1);
        assert_eq!(published.permalink, "https://twitter.com/alex/status/1");
    }

    #[tokio::test]
    async fn test_first_unit_replies_to_anchor() {
        let ctx = ThreadContext::new("kongaloosh.com/e/1")
            .reply_target("https://twitter.com/someone/status/555");
        let thread = assemble("A reply.", &ctx).unwrap();
        let mut publisher = MockPublisher::new("alex");

        publish_thread(&thread, ctx.platform_config(), &mut publisher, &MockResolver::permissive())
            .await
            .unwrap();

        assert_eq!(publisher.calls()[0].reply_to.as_deref(), Some("555"));
    }

    #[tokio::test]
    async fn test_failure_then_retry_continues_chain() {
        let (thread, ctx) = three_unit_thread();
        assert!(thread.len() >= 3);
        let mut publisher = MockPublisher::new("alex").fail_on_call(1);
        let resolver = MockResolver::permissive();

        let mut session = PublishSession::new(&thread, ctx.platform_config());
        let err = session.run(&mut publisher, &resolver).await.unwrap_err();
        assert_eq!(err.unit_index(), Some(1));
        assert!(err.is_partial());
        assert_eq!(session.next_index(), 1);
        assert!(session.finish().is_none());

        let published = session.run(&mut publisher, &resolver).await.unwrap();
        assert_eq!(published.units.len(), thread.len());
        let calls = publisher.calls();
        // The retried unit replies to unit 0, not to the failed attempt.
        assert_eq!(calls[1].reply_to.as_deref(), Some(calls[0].id.as_str()));
    }

    #[tokio::test]
    async fn test_resolve_failure_aborts() {
        let (thread, ctx) = three_unit_thread();
        let mut publisher = MockPublisher::new("alex");
        let resolver = MockResolver::permissive().failing("a.jpg");

        let err = publish_thread(&thread, ctx.platform_config(), &mut publisher, &resolver)
            .await
            .unwrap_err();
        match err {
            Error::Resolve { index, image, published, .. } => {
                assert_eq!(index, 0);
                assert_eq!(image, "a.jpg");
                assert_eq!(published, 0);
            }
            other => panic!("unexpected error: {other}"),
        }
        assert!(publisher.calls().is_empty());
    }

    #[tokio::test]
    async fn test_resolve_failure_text_only() {
        let (thread, ctx) = three_unit_thread();
        let mut publisher = MockPublisher::new("alex");
        let resolver = MockResolver::permissive().failing("a.jpg");

        let mut session = PublishSession::new(&thread, ctx.platform_config()).fallback(MediaFallback::TextOnly);
        let published = session.run(&mut publisher, &resolver).await.unwrap();

        assert_eq!(published.units[0].media_count, 0);
        assert!(publisher.calls()[0].media.is_empty());
    }

    #[tokio::test]
    async fn test_media_only_unit_skipped_when_images_fail() {
        let ctx = ThreadContext::new("kongaloosh.com/e/1");
        let thread = assemble("Look. @@@[](a.jpg)@@@\n@@@[](b.jpg)@@@ After.", &ctx).unwrap();
        assert_eq!(thread.len(), 3);
        let mut publisher = MockPublisher::new("alex");
        let resolver = MockResolver::permissive().failing("b.jpg");

        let mut session = PublishSession::new(&thread, ctx.platform_config()).fallback(MediaFallback::TextOnly);
        let published = session.run(&mut publisher, &resolver).await.unwrap();

        assert!(published.units[1].skipped);
        assert_eq!(published.units[1].id, published.units[0].id);
        let calls = publisher.calls();
        assert_eq!(calls.len(), 2);
        assert_eq!(calls[1].reply_to.as_deref(), Some(calls[0].id.as_str()));
    }

    #[tokio::test]
    async fn test_resume_from_recorded_progress() {
        let (thread, ctx) = three_unit_thread();
        let done = vec![PublishedUnit {
            index: 0,
            id: "900".to_string(),
            author_handle: "alex".to_string(),
            media_count: 1,
            skipped: false,
        }];
        let mut session = PublishSession::resume(&thread, ctx.platform_config(), done).unwrap();
        assert_eq!(session.reply_to(), Some("900"));

        let mut publisher = MockPublisher::new("alex");
        let published = session.run(&mut publisher, &MockResolver::permissive()).await.unwrap();

        assert_eq!(publisher.calls().len(), thread.len() - 1);
        assert_eq!(publisher.calls()[0].reply_to.as_deref(), Some("900"));
        assert_eq!(published.permalink, "https://twitter.com/alex/status/900");
    }

    #[test]
    fn test_resume_rejects_bad_progress() {
        let (thread, ctx) = three_unit_thread();
        let unit = |index: usize| PublishedUnit {
            index,
            id: index.to_string(),
            author_handle: "alex".to_string(),
            media_count: 0,
            skipped: false,
        };
        let too_many = (0..thread.len() + 1).map(unit).collect();
        assert!(PublishSession::resume(&thread, ctx.platform_config(), too_many).is_err());
        assert!(PublishSession::resume(&thread, ctx.platform_config(), vec![unit(1)]).is_err());
    }
}
