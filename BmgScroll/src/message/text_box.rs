//! Text boxes and case-aware accumulation
//!
//! A box starts out [`TextBox::Uniform`]. The first per-case update turns it
//! into [`TextBox::CaseSplit`], copying what it held so far into every case.
//! It never turns back.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Case holding the unresolved placeholder text, kept for display
pub const PLACEHOLDER_CASE: &str = "_placeholder";

/// What one box (or one case of a box) has accumulated
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoxContent {
    /// Characters that fade in, including icons
    pub chars: u32,
    /// Display text
    pub text: String,
    /// Frames of explicit pauses
    pub pause_length: u32,
}

/// One field increment
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BoxField {
    Chars(u32),
    Text(String),
    PauseLength(u32),
}

impl BoxContent {
    fn add(&mut self, field: &BoxField) {
        match field {
            BoxField::Chars(n) => self.chars += n,
            BoxField::Text(s) => self.text.push_str(s),
            BoxField::PauseLength(n) => self.pause_length += n,
        }
    }
}

/// An increment that applies to every case, or differs per case
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BoxUpdate {
    All(BoxField),
    PerCase(BTreeMap<String, BoxField>),
}

impl BoxUpdate {
    #[must_use]
    pub fn chars(n: u32) -> Self {
        BoxUpdate::All(BoxField::Chars(n))
    }

    #[must_use]
    pub fn text(s: impl Into<String>) -> Self {
        BoxUpdate::All(BoxField::Text(s.into()))
    }

    #[must_use]
    pub fn pause_length(n: u32) -> Self {
        BoxUpdate::All(BoxField::PauseLength(n))
    }

    #[must_use]
    pub fn chars_per_case(values: BTreeMap<String, u32>) -> Self {
        BoxUpdate::PerCase(
            values
                .into_iter()
                .map(|(case, n)| (case, BoxField::Chars(n)))
                .collect(),
        )
    }

    #[must_use]
    pub fn text_per_case(values: BTreeMap<String, String>) -> Self {
        BoxUpdate::PerCase(
            values
                .into_iter()
                .map(|(case, s)| (case, BoxField::Text(s)))
                .collect(),
        )
    }
}

/// One screen of text
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum TextBox {
    Uniform(BoxContent),
    CaseSplit(BTreeMap<String, BoxContent>),
}

impl Default for TextBox {
    fn default() -> Self {
        TextBox::Uniform(BoxContent::default())
    }
}

impl TextBox {
    /// Apply an update, producing the resulting box
    ///
    /// - uniform + all: update in place
    /// - uniform + per-case: split, copying the current state into each case
    /// - split + all: broadcast to every case
    /// - split + per-case: update matching cases
    ///
    /// # Errors
    /// Returns [`Error::CaseDimensionConflict`] when a per-case update names a
    /// case the split box doesn't have.
    pub fn apply(self, update: BoxUpdate, message_id: &str) -> Result<TextBox> {
        match (self, update) {
            (TextBox::Uniform(mut content), BoxUpdate::All(field)) => {
                content.add(&field);
                Ok(TextBox::Uniform(content))
            }
            (TextBox::Uniform(content), BoxUpdate::PerCase(values)) => {
                if values.is_empty() {
                    return Ok(TextBox::Uniform(content));
                }
                let cases = values
                    .into_iter()
                    .map(|(case, field)| {
                        let mut case_content = content.clone();
                        case_content.add(&field);
                        (case, case_content)
                    })
                    .collect();
                Ok(TextBox::CaseSplit(cases))
            }
            (TextBox::CaseSplit(mut cases), BoxUpdate::All(field)) => {
                for case_content in cases.values_mut() {
                    case_content.add(&field);
                }
                Ok(TextBox::CaseSplit(cases))
            }
            (TextBox::CaseSplit(mut cases), BoxUpdate::PerCase(values)) => {
                if values.keys().any(|case| !cases.contains_key(case)) {
                    return Err(Error::CaseDimensionConflict {
                        message_id: message_id.to_string(),
                        expected: cases.keys().cloned().collect(),
                        found: values.keys().cloned().collect(),
                    });
                }
                for (case, field) in values {
                    if let Some(case_content) = cases.get_mut(&case) {
                        case_content.add(&field);
                    }
                }
                Ok(TextBox::CaseSplit(cases))
            }
        }
    }

    /// Case names of a split box, `None` for a uniform box
    #[must_use]
    pub fn case_names(&self) -> Option<BTreeSet<&str>> {
        match self {
            TextBox::Uniform(_) => None,
            TextBox::CaseSplit(cases) => Some(cases.keys().map(String::as_str).collect()),
        }
    }

    /// Content seen under a case; a uniform box looks the same under every case
    #[must_use]
    pub fn content_for(&self, case: &str) -> Option<&BoxContent> {
        match self {
            TextBox::Uniform(content) => Some(content),
            TextBox::CaseSplit(cases) => cases.get(case),
        }
    }

    /// Text to show when a single rendering is needed
    ///
    /// A split box shows its placeholder case, or its first case if it has none.
    #[must_use]
    pub fn display_text(&self) -> &str {
        match self {
            TextBox::Uniform(content) => &content.text,
            TextBox::CaseSplit(cases) => cases
                .get(PLACEHOLDER_CASE)
                .or_else(|| cases.values().next())
                .map_or("", |content| content.text.as_str()),
        }
    }

    /// Whether a uniform box has no text yet
    #[must_use]
    pub fn is_empty_uniform(&self) -> bool {
        matches!(self, TextBox::Uniform(content) if content.text.is_empty())
    }

    /// Replace every occurrence of `placeholder` in each case's text with that
    /// case's replacement; cases without a replacement are left alone
    pub(crate) fn replace_text(&mut self, placeholder: &str, replacements: &BTreeMap<String, String>) {
        match self {
            TextBox::Uniform(_) => {}
            TextBox::CaseSplit(cases) => {
                for (case, content) in cases.iter_mut() {
                    if let Some(replacement) = replacements.get(case) {
                        content.text = content.text.replace(placeholder, replacement);
                    }
                }
            }
        }
    }
}

/// Apply an update to the last box of a message
pub(crate) fn accumulate(boxes: &mut [TextBox], update: BoxUpdate, message_id: &str) -> Result<()> {
    if let Some(last) = boxes.last_mut() {
        let current = std::mem::take(last);
        *last = current.apply(update, message_id)?;
    }
    Ok(())
}
