//! Folding a message's tokens into boxes

use std::collections::{BTreeMap, BTreeSet};

use super::escape::tokenize;
use super::resolver::{CrossReference, CrossReferenceMap};
use super::text_box::{BoxUpdate, TextBox, accumulate};
use super::token::{PlayerNameKind, TIMER_TEXT, Token, unknown_escape_label};
use super::{DecodeOptions, DecodedMessage, MessageBody};
use crate::error::Result;
use crate::lookup::{LookupContext, NumberNameOverride};

/// Decode one message's body into boxes
///
/// `content` is `None` for a null message. Cross-references found along the
/// way are added to `references` for resolution once the whole language has
/// been decoded.
///
/// # Errors
/// Returns the errors of [`tokenize`] and [`TextBox::apply`].
pub fn decode_message(
    message_id: &str,
    content: Option<&[u8]>,
    ctx: &LookupContext,
    options: DecodeOptions,
    references: &mut CrossReferenceMap,
) -> Result<DecodedMessage> {
    let mut decoded = DecodedMessage {
        id: message_id.to_string(),
        body: MessageBody::Null,
        unresolved: BTreeSet::new(),
        unknown_escapes: 0,
    };

    let Some(content) = content else {
        return Ok(decoded);
    };

    let tokens = tokenize(content, ctx, message_id)?;
    if tokens.is_empty() {
        decoded.body = MessageBody::Blank;
        return Ok(decoded);
    }

    let mut boxes = vec![TextBox::default()];
    for token in tokens {
        let updates = match token {
            Token::Text(run) => {
                // A box break is followed by a line break that doesn't scroll
                let visible = if boxes.len() > 1
                    && boxes.last().is_some_and(TextBox::is_empty_uniform)
                {
                    run.trim_start_matches('\n')
                } else {
                    run.as_str()
                };
                visible_text(visible)
            }
            Token::Pause(length) => vec![
                BoxUpdate::pause_length(u32::from(length)),
                BoxUpdate::text(format!("<Text pause, {length}L>")),
            ],
            Token::BoxBreak => {
                boxes.push(TextBox::default());
                Vec::new()
            }
            Token::Marker(marker) => vec![BoxUpdate::text(marker.label())],
            Token::Icon { name, .. } => {
                vec![BoxUpdate::chars(1), BoxUpdate::text(format!("<{name} icon>"))]
            }
            Token::Color { name, .. } => {
                if options.show_colors {
                    vec![BoxUpdate::text(format!("<{name} color>"))]
                } else {
                    Vec::new()
                }
            }
            Token::Furigana { reading, .. } => {
                if options.show_furigana {
                    vec![BoxUpdate::text(format!("<{reading}>"))]
                } else {
                    Vec::new()
                }
            }
            Token::PlayerName(kind) => {
                references.register(message_id, player_name_reference(kind));
                vec![BoxUpdate::text(kind.placeholder())]
            }
            Token::Placeholder(kind) => match ctx.number_name_override(message_id) {
                Some(NumberNameOverride::Text { cases }) => {
                    let chars = cases
                        .iter()
                        .map(|(case, text)| (case.clone(), text.chars().count() as u32))
                        .collect();
                    vec![
                        BoxUpdate::chars_per_case(chars),
                        BoxUpdate::text_per_case(cases.clone()),
                    ]
                }
                Some(NumberNameOverride::Message {
                    placeholder,
                    targets,
                }) => {
                    references.register(
                        message_id,
                        CrossReference {
                            placeholder: placeholder.clone(),
                            targets: targets.clone(),
                        },
                    );
                    vec![BoxUpdate::text(placeholder.clone())]
                }
                None => {
                    decoded.unresolved.insert(kind);
                    vec![BoxUpdate::text(kind.label())]
                }
            },
            Token::Timer => vec![
                BoxUpdate::text(TIMER_TEXT),
                BoxUpdate::chars(TIMER_TEXT.chars().count() as u32),
            ],
            Token::Unknown(payload) => {
                decoded.unknown_escapes += 1;
                vec![BoxUpdate::text(unknown_escape_label(&payload))]
            }
        };

        for update in updates {
            accumulate(&mut boxes, update, message_id)?;
        }
    }

    tracing::debug!("Decoded '{}' into {} boxes", message_id, boxes.len());
    decoded.body = MessageBody::Boxes(boxes);
    Ok(decoded)
}

fn visible_text(text: &str) -> Vec<BoxUpdate> {
    if text.is_empty() {
        return Vec::new();
    }
    vec![
        BoxUpdate::text(text),
        BoxUpdate::chars(text.chars().count() as u32),
    ]
}

fn player_name_reference(kind: PlayerNameKind) -> CrossReference {
    CrossReference {
        placeholder: kind.placeholder().to_string(),
        targets: kind
            .targets()
            .iter()
            .map(|(case, target)| ((*case).to_string(), (*target).to_string()))
            .collect::<BTreeMap<_, _>>(),
    }
}
