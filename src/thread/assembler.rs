//! Thread assembly.
//!
//! Turns post content into posting units: albums are pulled out as spans,
//! each prose span is normalized and segmented, and albums are attached to
//! the unit holding the prose that precedes them.

use tracing::debug;

use crate::album::{extract, split_spans, Album, Span};
use crate::context::ThreadContext;
use crate::error::Result;
use crate::normalize::normalize;
use crate::segment::{segment_with, TextChunk};
use crate::utils::reply_anchor_from_url;

use super::types::{PostingUnit, ReplyAnchor, Thread};

/// Assemble post content into a thread.
///
/// Steps:
/// 1. Splits content into prose and album spans, in source order
/// 2. Normalizes and segments each prose span; only the very first unit of the
///    thread uses the first budget and carries the permalink
/// 3. Attaches each album to the unit ending just before it, splitting albums
///    larger than the platform's media limit into media-only follow-up units
/// 4. Albums that come before any prose go with the first unit
/// 5. Resolves the reply anchor from the context's reply target
///
/// Assembly is pure: the same content and context always give the same thread.
///
/// # Example
///
/// ```
/// use posse_thread::context::ThreadContext;
/// use posse_thread::thread::assemble;
///
/// let ctx = ThreadContext::new("kongaloosh.com/e/2017/8/25/eclipse");
/// let thread = assemble("I flew down to see the eclipse. @@@[](a.jpg)-[](b.jpg)@@@", &ctx).unwrap();
///
/// assert_eq!(thread.len(), 1);
/// assert_eq!(
///     thread.rendered()[0],
///     "I flew down to see the eclipse. kongaloosh.com/e/2017/8/25/eclipse"
/// );
/// assert_eq!(thread.units()[0].media.as_ref().map(|a| a.len()), Some(2));
/// ```
pub fn assemble(content: &str, ctx: &ThreadContext) -> Result<Thread> {
    ctx.validate()?;

    let first_budget = ctx.first_budget();
    let rest_budget = ctx.rest_budget();
    let max_media = ctx.platform_config().max_media_per_unit;

    let mut units: Vec<PostingUnit> = Vec::new();
    // Albums seen before any prose; they belong to the first unit.
    let mut leading: Vec<Album> = Vec::new();

    for span in split_spans(content) {
        match span {
            Span::Text(text) => {
                let prose = normalize(&text);
                if prose.is_empty() {
                    continue;
                }

                let chunks = if units.is_empty() {
                    segment_with(&prose, first_budget, rest_budget, true)
                } else {
                    segment_with(&prose, rest_budget, rest_budget, false)
                };
                let mut chunks = chunks.into_iter().map(PostingUnit::text);

                if units.is_empty() {
                    units.extend(chunks.next());
                    for album in leading.drain(..) {
                        attach(&mut units, album, max_media);
                    }
                }
                units.extend(chunks);
            }
            Span::Album(album) if units.is_empty() => leading.push(album),
            Span::Album(album) => attach(&mut units, album, max_media),
        }
    }

    if units.is_empty() {
        let link_only = segment_with("", first_budget, rest_budget, true);
        units.extend(link_only.into_iter().map(PostingUnit::text));
        for album in leading.drain(..) {
            attach(&mut units, album, max_media);
        }
    }

    let anchor = resolve_anchor(ctx);
    debug!(
        units = units.len(),
        anchored = anchor.is_some(),
        "assembled thread"
    );

    Ok(Thread::new(ctx.link().to_string(), anchor, units))
}

/// Assemble a single-unit summary of the post.
///
/// The unit holds as much of the prose as fits in the first budget, cut at a
/// word boundary with a continuation marker, followed by the permalink. The
/// first batch of the first album, if any, is attached.
pub fn assemble_summary(content: &str, ctx: &ThreadContext) -> Result<Thread> {
    ctx.validate()?;

    let extraction = extract(content);
    let prose = normalize(&extraction.text);
    let text = segment_with(&prose, ctx.first_budget(), ctx.rest_budget(), true)
        .into_iter()
        .next()
        .unwrap_or_else(|| TextChunk {
            text: String::new(),
            reserves_link: true,
            continues: false,
        });

    let max_media = ctx.platform_config().max_media_per_unit;
    let media = extraction
        .albums
        .first()
        .and_then(|album| album.batches(max_media).into_iter().next());

    debug!(
        albums = extraction.albums.len(),
        truncated = text.continues,
        "assembled summary"
    );

    Ok(Thread::new(
        ctx.link().to_string(),
        resolve_anchor(ctx),
        vec![PostingUnit { text, media }],
    ))
}

fn resolve_anchor(ctx: &ThreadContext) -> Option<ReplyAnchor> {
    let target = ctx.target()?;
    match reply_anchor_from_url(target, &ctx.platform_config().base_url) {
        Some(id) => {
            debug!(reply_target = target, id = %id, "thread replies to existing post");
            Some(ReplyAnchor::new(id))
        }
        None => {
            debug!(reply_target = target, "reply target is not on this platform, starting fresh thread");
            None
        }
    }
}

/// Attach an album to the last unit, spilling extra batches into media-only units.
fn attach(units: &mut Vec<PostingUnit>, album: Album, max_media: usize) {
    let mut batches = album.batches(max_media).into_iter();

    if let Some(last) = units.last_mut().filter(|unit| unit.media.is_none()) {
        last.media = batches.next();
    }
    units.extend(batches.map(PostingUnit::media));
}
