//! # posse-thread
//!
//! A sans-io library that turns long-form posts into reply threads for
//! microblogging platforms with a fixed per-message character limit.
//!
//! Given post content (prose interleaved with photo albums and markdown links)
//! and the post's permalink, it produces an ordered list of posting units that,
//! published as a chain of replies, retell the post with its images in place.
//!
//! ## Design Philosophy
//!
//! This library follows the "sans-io" design pattern:
//! - **Pure assembly**: album extraction, normalization, segmentation and thread
//!   assembly are synchronous functions with no side effects
//! - **I/O Separation**: posting and image loading go through the [`Publisher`]
//!   and [`MediaResolver`] traits, implemented by the caller
//! - **Resumable publishing**: a [`PublishSession`] publishes units strictly in
//!   order and can pick up again at the unit that failed
//!
//! ## Pipeline
//!
//! 1. [`album`] splits content into prose and album spans
//! 2. [`normalize`] strips link targets and line breaks from prose
//! 3. [`segment`] packs prose into chunks under the character budget
//! 4. [`thread`] interleaves chunks and albums into posting units
//! 5. [`publish`] posts the units as a reply chain
//!
//! ## Example
//!
//! ```rust
//! use posse_thread::{assemble, ThreadContext};
//!
//! let ctx = ThreadContext::new("kongaloosh.com/e/2017/8/25/eclipse");
//! let content = "I flew down to Wyoming on the weekend to go see the Solar Eclipse.\n\n\
//!                @@@[](/data/2017/8/25/img_6838.jpg)-[](/data/2017/8/25/img_6834.jpg)@@@";
//!
//! let thread = assemble(content, &ctx).unwrap();
//! for (index, text) in thread.rendered().iter().enumerate() {
//!     println!("{index}: {text}");
//! }
//! ```

#![cfg_attr(docsrs, feature(doc_cfg))]
#![deny(missing_docs)]
#![warn(rust_2018_idioms)]

pub mod album;
pub mod context;
pub mod error;
pub mod normalize;
pub mod publish;
pub mod segment;
pub mod thread;
pub mod utils;

// Mock collaborators for testing
pub mod mock;

pub use album::{Album, ImageRef};
pub use context::{PlatformConfig, ThreadContext};
pub use error::{Error, Result};
pub use publish::{
    publish_thread, MediaFallback, MediaResolver, PublishSession, PublishedThread, PublishedUnit,
    Publisher, Receipt,
};
pub use segment::TextChunk;
pub use thread::{assemble, assemble_summary, PostingUnit, ReplyAnchor, Thread};
