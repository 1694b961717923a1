//! Scroll timing estimates
//!
//! Each character fades in over several frames and the next one starts once
//! the previous reaches the language's alpha requirement. Holding the fast
//! scroll button triples the speed, except for a short slow lead-in at the
//! start of every box after the first.

use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;

use super::text_box::{BoxContent, TextBox};
use super::token::PlaceholderKind;
use crate::error::{Error, Result};
use crate::lookup::{LanguageSpeed, LookupContext};

/// Frames between a box finishing and the next one opening
pub const BOX_CLOSE_DELAY: u32 = 2;

/// Frames at the start of a later box that scroll at normal speed
pub const SLOW_LEAD_IN: u32 = 10;

/// Speed-up while the scroll button is held
pub const FAST_SCROLL_FACTOR: u32 = 3;

/// Frames for one box (or one case of a box) to scroll in completely
#[must_use]
pub fn box_length(content: &BoxContent, speed: LanguageSpeed) -> u32 {
    let fade = ((content.chars as f32) * speed.alpha_req + 1.0_f32) / speed.fade_rate;
    content.pause_length + fade.floor() as u32
}

/// Frames for a whole message given its box lengths, before any A presses
#[must_use]
pub fn base_message_frames(box_lengths: &[u32], forced_slow: bool) -> u32 {
    let scrolled: u32 = if forced_slow {
        box_lengths.iter().sum()
    } else {
        box_lengths
            .iter()
            .enumerate()
            .map(|(i, &length)| {
                if i == 0 {
                    length.div_ceil(FAST_SCROLL_FACTOR)
                } else if length > SLOW_LEAD_IN {
                    SLOW_LEAD_IN + (length - SLOW_LEAD_IN).div_ceil(FAST_SCROLL_FACTOR)
                } else {
                    length
                }
            })
            .sum()
    };
    scrolled + BOX_CLOSE_DELAY * box_lengths.len() as u32
}

/// Length and character count of one box
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BoxSummary {
    pub length: u32,
    pub chars: u32,
}

/// Timing of one box, per case if the box varies
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum BoxTiming {
    Uniform(BoxSummary),
    CaseSplit(BTreeMap<String, BoxSummary>),
}

/// Base frame count, per case if any box varies
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Frames {
    Single(u32),
    PerCase(BTreeMap<String, u32>),
}

/// Frame estimate for one message
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FrameEstimate {
    /// Scroll frames plus box-close delays
    pub base: Frames,
    /// One A press per box, not included in `base`
    pub num_boxes: usize,
    pub forced_slow: bool,
    /// Placeholders whose length can't be known from the archive
    pub additional_factors: Vec<PlaceholderKind>,
    /// Cutscene animation length reported alongside
    pub animation_time: Option<u32>,
}

/// Case names shared by the split boxes of a message
///
/// # Errors
/// Returns [`Error::CaseDimensionConflict`] when two split boxes disagree.
pub fn message_cases<'a>(message_id: &str, boxes: &'a [TextBox]) -> Result<Option<BTreeSet<&'a str>>> {
    let mut shared: Option<BTreeSet<&str>> = None;
    for names in boxes.iter().filter_map(TextBox::case_names) {
        match &shared {
            None => shared = Some(names),
            Some(expected) if *expected != names => {
                return Err(Error::CaseDimensionConflict {
                    message_id: message_id.to_string(),
                    expected: expected.iter().map(|s| (*s).to_string()).collect(),
                    found: names.iter().map(|s| (*s).to_string()).collect(),
                });
            }
            Some(_) => {}
        }
    }
    Ok(shared)
}

/// Per-box timings of a message
#[must_use]
pub fn box_timings(boxes: &[TextBox], speed: LanguageSpeed) -> Vec<BoxTiming> {
    let summarize = |content: &BoxContent| BoxSummary {
        length: box_length(content, speed),
        chars: content.chars,
    };
    boxes
        .iter()
        .map(|text_box| match text_box {
            TextBox::Uniform(content) => BoxTiming::Uniform(summarize(content)),
            TextBox::CaseSplit(cases) => BoxTiming::CaseSplit(
                cases
                    .iter()
                    .map(|(case, content)| (case.clone(), summarize(content)))
                    .collect(),
            ),
        })
        .collect()
}

/// Estimate the frames a message takes to scroll through
///
/// A message with split boxes gets one base count per case, computed by
/// reading every box under that case.
///
/// # Errors
/// Returns [`Error::CaseDimensionConflict`] when split boxes disagree on
/// their cases.
pub fn estimate_frames(
    message_id: &str,
    boxes: &[TextBox],
    unresolved: &BTreeSet<PlaceholderKind>,
    ctx: &LookupContext,
    speed: LanguageSpeed,
) -> Result<FrameEstimate> {
    let forced_slow = ctx.is_forced_slow(message_id);
    let lengths_for = |case: &str| -> Vec<u32> {
        boxes
            .iter()
            .filter_map(|text_box| text_box.content_for(case))
            .map(|content| box_length(content, speed))
            .collect()
    };

    let base = match message_cases(message_id, boxes)? {
        None => Frames::Single(base_message_frames(&lengths_for(""), forced_slow)),
        Some(cases) => Frames::PerCase(
            cases
                .into_iter()
                .map(|case| {
                    (
                        case.to_string(),
                        base_message_frames(&lengths_for(case), forced_slow),
                    )
                })
                .collect(),
        ),
    };

    Ok(FrameEstimate {
        base,
        num_boxes: boxes.len(),
        forced_slow,
        additional_factors: unresolved.iter().copied().collect(),
        animation_time: ctx.animation_time(message_id),
    })
}
