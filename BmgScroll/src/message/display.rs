//! Human-readable summaries of decoded messages

use super::MessageBody;
use super::text_box::PLACEHOLDER_CASE;
use super::timing::{BoxSummary, BoxTiming, FrameEstimate, Frames};

/// Shown for summaries of messages without boxes
pub const NOT_APPLICABLE: &str = "<N/A>";

pub const NULL_MESSAGE: &str = "<Null message>";
pub const BLANK_MESSAGE: &str = "<Blank message>";

/// Message text, boxes separated by a blank line
#[must_use]
pub fn text_display(body: &MessageBody) -> String {
    match body {
        MessageBody::Null => NULL_MESSAGE.to_string(),
        MessageBody::Blank => BLANK_MESSAGE.to_string(),
        MessageBody::Boxes(boxes) => boxes
            .iter()
            .map(|text_box| text_box.display_text())
            .collect::<Vec<_>>()
            .join("\n\n"),
    }
}

fn summary_line(summary: BoxSummary) -> String {
    format!("{} length, {} chars", summary.length, summary.chars)
}

/// One line per box; split boxes list their cases alphabetically
#[must_use]
pub fn boxes_display(timings: Option<&[BoxTiming]>) -> String {
    let Some(timings) = timings else {
        return NOT_APPLICABLE.to_string();
    };
    timings
        .iter()
        .map(|timing| match timing {
            BoxTiming::Uniform(summary) => summary_line(*summary),
            BoxTiming::CaseSplit(cases) => {
                let mut parts: Vec<String> = cases
                    .iter()
                    .filter(|(case, _)| case.as_str() != PLACEHOLDER_CASE)
                    .map(|(case, summary)| format!("{case}: {}", summary_line(*summary)))
                    .collect();
                parts.sort();
                format!("{{{}}}", parts.join(", "))
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn frames_line(base: u32, estimate: &FrameEstimate) -> String {
    let mut line = format!("{base} + {}A", estimate.num_boxes);
    for factor in &estimate.additional_factors {
        line.push_str(&format!(" + {}'s frames", factor.label()));
    }
    if let Some(animation_time) = estimate.animation_time {
        line.push_str(&format!("\n(Cutscene: {animation_time})"));
    }
    line
}

/// Frame estimate as `BASE + NA`, one line per case for split messages
#[must_use]
pub fn frames_display(estimate: Option<&FrameEstimate>) -> String {
    let Some(estimate) = estimate else {
        return NOT_APPLICABLE.to_string();
    };
    match &estimate.base {
        Frames::Single(base) => frames_line(*base, estimate),
        Frames::PerCase(cases) => {
            let mut lines: Vec<String> = cases
                .iter()
                .filter(|(case, _)| case.as_str() != PLACEHOLDER_CASE)
                .map(|(case, base)| format!("{case}: {}", frames_line(*base, estimate)))
                .collect();
            lines.sort();
            lines.join("\n")
        }
    }
}
