//! Message-in-message resolution
//!
//! Some escapes stand for text held in other messages (the player's name,
//! a galaxy name). The decoder records these as cross-references; once every
//! message of a language is decoded, [`resolve_cross_references`] splices the
//! referenced text in and turns the referencing boxes into per-case boxes.

use std::collections::BTreeMap;

use indexmap::IndexMap;

use super::text_box::{BoxUpdate, PLACEHOLDER_CASE, TextBox};
use super::{DecodedMessage, MessageBody};
use crate::error::{Error, Result};
use crate::formats::bmg::MessageId;

/// Placeholder text in one message, to be filled from other messages per case
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrossReference {
    /// Text standing in for the reference until it is resolved
    pub placeholder: String,
    /// Case name to the message whose first box supplies the text
    pub targets: BTreeMap<String, MessageId>,
}

/// Cross-references collected while decoding one language
#[derive(Debug, Clone, Default)]
pub struct CrossReferenceMap {
    entries: IndexMap<MessageId, Vec<CrossReference>>,
}

impl CrossReferenceMap {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a reference made by `message_id`
    ///
    /// Registering the same placeholder twice for one message keeps one entry.
    pub fn register(&mut self, message_id: &str, reference: CrossReference) {
        let references = self.entries.entry(message_id.to_string()).or_default();
        if !references.contains(&reference) {
            references.push(reference);
        }
    }

    /// References made by one message
    #[must_use]
    pub fn get(&self, message_id: &str) -> Option<&[CrossReference]> {
        self.entries.get(message_id).map(Vec::as_slice)
    }

    /// Number of messages that make references
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate in registration order
    pub fn iter(&self) -> impl Iterator<Item = (&MessageId, &[CrossReference])> {
        self.entries.iter().map(|(id, refs)| (id, refs.as_slice()))
    }
}

/// Splice referenced text into every message that asked for it
///
/// Each reference is resolved against the *current* state of its targets,
/// in registration order. Consumes the map.
///
/// # Errors
/// - [`Error::MissingReference`] if a target is absent, null, or blank
/// - [`Error::NonUniformReference`] if a target's first box varies by case
/// - [`Error::CaseDimensionConflict`] if a referencing box already varies
///   over a different set of cases
pub fn resolve_cross_references(
    messages: &mut IndexMap<MessageId, DecodedMessage>,
    references: CrossReferenceMap,
) -> Result<()> {
    tracing::info!("Resolving cross-references for {} messages", references.len());

    for (message_id, refs) in references.entries {
        for reference in refs {
            let replacements = replacement_texts(messages, &message_id, &reference)?;

            let Some(message) = messages.get_mut(&message_id) else {
                continue;
            };
            if let MessageBody::Boxes(boxes) = &mut message.body {
                for text_box in boxes.iter_mut() {
                    let current = std::mem::take(text_box);
                    *text_box =
                        substitute(current, &reference.placeholder, &replacements, &message_id)?;
                }
            }
        }
    }
    Ok(())
}

/// Case name to replacement text, including the placeholder case
fn replacement_texts(
    messages: &IndexMap<MessageId, DecodedMessage>,
    message_id: &str,
    reference: &CrossReference,
) -> Result<BTreeMap<String, String>> {
    let mut replacements = BTreeMap::new();
    replacements.insert(PLACEHOLDER_CASE.to_string(), reference.placeholder.clone());

    for (case, target) in &reference.targets {
        let missing = || Error::MissingReference {
            message_id: message_id.to_string(),
            target: target.clone(),
        };
        let first_box = match messages.get(target).map(|m| &m.body) {
            Some(MessageBody::Boxes(boxes)) => boxes.first().ok_or_else(missing)?,
            _ => return Err(missing()),
        };
        let TextBox::Uniform(content) = first_box else {
            return Err(Error::NonUniformReference {
                message_id: message_id.to_string(),
                target: target.clone(),
            });
        };
        replacements.insert(case.clone(), content.text.clone());
    }
    Ok(replacements)
}

/// Substitute one placeholder inside one box
///
/// Characters added per case are `occurrences × replacement length`; the
/// placeholder case gains none. A box without the placeholder is returned as is.
fn substitute(
    text_box: TextBox,
    placeholder: &str,
    replacements: &BTreeMap<String, String>,
    message_id: &str,
) -> Result<TextBox> {
    let occurrences = |text: &str| text.matches(placeholder).count() as u32;
    let added = |case: &str, count: u32| {
        if case == PLACEHOLDER_CASE {
            0
        } else {
            count * replacements[case].chars().count() as u32
        }
    };

    let deltas: BTreeMap<String, u32> = match &text_box {
        TextBox::Uniform(content) => {
            let count = occurrences(&content.text);
            if count == 0 {
                return Ok(text_box);
            }
            replacements
                .keys()
                .map(|case| (case.clone(), added(case, count)))
                .collect()
        }
        TextBox::CaseSplit(cases) => {
            if !cases.values().any(|content| content.text.contains(placeholder)) {
                return Ok(text_box);
            }
            replacements
                .keys()
                .map(|case| {
                    let count = cases.get(case).map_or(0, |content| occurrences(&content.text));
                    (case.clone(), added(case, count))
                })
                .collect()
        }
    };

    let mut resolved = text_box.apply(BoxUpdate::chars_per_case(deltas), message_id)?;
    resolved.replace_text(placeholder, replacements);
    Ok(resolved)
}
