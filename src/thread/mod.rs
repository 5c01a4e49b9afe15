//! Thread assembly API.
//!
//! This module turns a post into a chain of platform-sized messages:
//!
//! - **Assembly**: splitting content into units that each fit the platform limit
//! - **Media placement**: keeping albums next to the prose they illustrate
//! - **Reply anchoring**: continuing an existing conversation when the post is a reply
//!
//! # Overview
//!
//! - [`PostingUnit`]: one message, with optional images
//! - [`Thread`]: the ordered units plus the permalink and reply anchor
//! - [`ReplyAnchor`]: the platform post a thread replies to
//! - [`assemble`]: build a full thread from content
//! - [`assemble_summary`]: build a single-message summary of the content
//!
//! # Example
//!
//! ```
//! use posse_thread::context::ThreadContext;
//! use posse_thread::thread::assemble;
//!
//! let ctx = ThreadContext::new("kongaloosh.com/e/2018/8/1/dlss")
//!     .reply_target("https://twitter.com/someone/status/1024");
//! let thread = assemble("This year I went to DLSS and RLSS in Toronto.", &ctx).unwrap();
//!
//! assert_eq!(thread.anchor().map(|a| a.id()), Some("1024"));
//! for text in thread.rendered() {
//!     println!("{text}");
//! }
//! ```

mod assembler;
mod types;

pub use assembler::{assemble, assemble_summary};
pub use types::{PostingUnit, ReplyAnchor, Thread};
