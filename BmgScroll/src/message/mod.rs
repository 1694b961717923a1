//! Message decoding pipeline
//!
//! One language at a time: every raw message is decoded into boxes, then
//! cross-references are resolved across the whole language, then each
//! message is timed and summarized.

pub mod decoder;
pub mod display;
pub mod escape;
pub mod resolver;
pub mod text_box;
pub mod timing;
pub mod token;

use std::collections::BTreeSet;

use indexmap::IndexMap;
use serde::Serialize;

pub use decoder::decode_message;
pub use escape::{RawSegment, split_segments, tokenize};
pub use resolver::{CrossReference, CrossReferenceMap, resolve_cross_references};
pub use text_box::{BoxContent, BoxUpdate, PLACEHOLDER_CASE, TextBox};
pub use timing::{BoxSummary, BoxTiming, FrameEstimate, Frames, estimate_frames};
pub use token::{PlaceholderKind, Token};

use crate::error::Result;
use crate::formats::bmg::{MessageId, RawMessage};
use crate::lookup::{LanguageSpeed, LookupContext};

/// Which presentation-only escapes are rendered into display text
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DecodeOptions {
    /// Render color changes as `<NAME color>`
    pub show_colors: bool,
    /// Render kanji readings as `<READING>`
    pub show_furigana: bool,
}

/// Content of a decoded message
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MessageBody {
    /// No body stored in the archive
    Null,
    /// A body holding only the terminator
    Blank,
    Boxes(Vec<TextBox>),
}

/// A message after decoding, before timing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedMessage {
    pub id: MessageId,
    pub body: MessageBody,
    /// Number/name escapes left without a value
    pub unresolved: BTreeSet<PlaceholderKind>,
    /// Escapes that decoded to [`Token::Unknown`]
    pub unknown_escapes: usize,
}

impl DecodedMessage {
    #[must_use]
    pub fn boxes(&self) -> Option<&[TextBox]> {
        match &self.body {
            MessageBody::Boxes(boxes) => Some(boxes),
            MessageBody::Null | MessageBody::Blank => None,
        }
    }
}

/// Final per-message output
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MessageRecord {
    pub text_display: String,
    pub boxes: Option<Vec<BoxTiming>>,
    pub boxes_display: String,
    pub frames: Option<FrameEstimate>,
    pub frames_display: String,
    #[serde(skip_serializing_if = "is_zero")]
    pub unknown_escapes: usize,
}

#[allow(clippy::trivially_copy_pass_by_ref)]
fn is_zero(n: &usize) -> bool {
    *n == 0
}

/// Decode every message of a language, collecting cross-references
///
/// # Errors
/// Stops at the first message that fails to decode.
pub fn decode_messages(
    raw: &[RawMessage],
    ctx: &LookupContext,
    options: DecodeOptions,
) -> Result<(IndexMap<MessageId, DecodedMessage>, CrossReferenceMap)> {
    tracing::info!("Decoding {} messages", raw.len());

    let mut references = CrossReferenceMap::new();
    let mut messages = IndexMap::with_capacity(raw.len());
    for message in raw {
        let decoded = decode_message(
            &message.id,
            message.content.as_deref(),
            ctx,
            options,
            &mut references,
        )?;
        messages.insert(message.id.clone(), decoded);
    }
    Ok((messages, references))
}

/// Time and summarize one decoded message
///
/// # Errors
/// Returns [`crate::Error::CaseDimensionConflict`] if the message's split
/// boxes disagree on their cases.
pub fn finalize_message(
    message: &DecodedMessage,
    ctx: &LookupContext,
    speed: LanguageSpeed,
) -> Result<MessageRecord> {
    let text_display = display::text_display(&message.body);

    let (boxes, frames) = match message.boxes() {
        Some(boxes) => {
            let estimate =
                estimate_frames(&message.id, boxes, &message.unresolved, ctx, speed)?;
            (Some(timing::box_timings(boxes, speed)), Some(estimate))
        }
        None => (None, None),
    };

    Ok(MessageRecord {
        text_display,
        boxes_display: display::boxes_display(boxes.as_deref()),
        frames_display: display::frames_display(frames.as_ref()),
        boxes,
        frames,
        unknown_escapes: message.unknown_escapes,
    })
}

/// Run the full pipeline over one language's messages
///
/// Nothing is returned unless every phase succeeds.
///
/// # Errors
/// Returns [`crate::Error::UnknownLanguage`] if the context has no speed for
/// `language`, or the first decode, resolution or timing error.
pub fn process_language(
    language: &str,
    raw: &[RawMessage],
    ctx: &LookupContext,
    options: DecodeOptions,
) -> Result<IndexMap<MessageId, MessageRecord>> {
    let speed = ctx.language_speed(language)?;

    let (mut messages, references) = decode_messages(raw, ctx, options)?;
    resolve_cross_references(&mut messages, references)?;

    let unknown: usize = messages.values().map(|m| m.unknown_escapes).sum();
    if unknown > 0 {
        tracing::warn!("{}: {} unknown escape sequences need review", language, unknown);
    }

    tracing::info!("Computing frames for {} messages", messages.len());
    messages
        .iter()
        .map(|(id, message)| Ok((id.clone(), finalize_message(message, ctx, speed)?)))
        .collect()
}

/// Split every message into raw text runs and escape payloads
///
/// Null messages map to `None`.
///
/// # Errors
/// Returns the errors of [`split_segments`].
pub fn dump_segments(raw: &[RawMessage]) -> Result<IndexMap<MessageId, Option<Vec<RawSegment>>>> {
    raw.iter()
        .map(|message| {
            let segments = message
                .content
                .as_deref()
                .map(|body| split_segments(body, &message.id))
                .transpose()?;
            Ok((message.id.clone(), segments))
        })
        .collect()
}
