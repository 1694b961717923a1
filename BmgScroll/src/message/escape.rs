//! Escape sequence decoding
//!
//! A message body is a sequence of big-endian UTF-16 units ending at `00 00`.
//! The unit `00 1A` starts an escape: the next byte is the total escape length
//! (counting the marker and the length byte itself), followed by the payload.

use serde::{Deserialize, Serialize};

use super::token::{DisplayMarker, PlaceholderKind, PlayerNameKind, Token};
use crate::error::{Error, Result};
use crate::formats::bmg::{ESCAPE_MARKER, TERMINATOR};
use crate::lookup::LookupContext;

/// Undecoded piece of a message body
///
/// Serializes as a plain string or a plain array of payload bytes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawSegment {
    Text(String),
    Escape(Vec<u8>),
}

/// Split a message body into text runs and escape payloads
///
/// Stops at the terminator or at the end of the data, whichever comes first.
///
/// # Errors
/// Returns [`Error::MalformedEscape`] for an escape shorter than its own
/// header or one that runs past the end of the body.
pub fn split_segments(body: &[u8], message_id: &str) -> Result<Vec<RawSegment>> {
    let mut segments = Vec::new();
    let mut run: Vec<u16> = Vec::new();
    let mut pos = 0;

    while let Some(pair) = body.get(pos..pos + 2) {
        let unit = u16::from_be_bytes([pair[0], pair[1]]);
        let marker_pos = pos;
        pos += 2;

        match unit {
            TERMINATOR => break,
            ESCAPE_MARKER => {
                let length = body.get(pos).copied().unwrap_or(0);
                let invalid = || Error::MalformedEscape {
                    message_id: message_id.to_string(),
                    position: marker_pos,
                    length,
                };
                if length < 3 {
                    return Err(invalid());
                }
                let start = pos + 1;
                let end = start + usize::from(length) - 3;
                let payload = body.get(start..end).ok_or_else(invalid)?;

                if !run.is_empty() {
                    segments.push(RawSegment::Text(String::from_utf16_lossy(&run)));
                    run.clear();
                }
                segments.push(RawSegment::Escape(payload.to_vec()));
                pos = end;
            }
            _ => run.push(unit),
        }
    }

    if !run.is_empty() {
        segments.push(RawSegment::Text(String::from_utf16_lossy(&run)));
    }
    Ok(segments)
}

/// Decode a message body into typed tokens
///
/// # Errors
/// Returns [`Error::LookupMiss`] for icon or color codes absent from the
/// lookup context, and the errors of [`split_segments`].
pub fn tokenize(body: &[u8], ctx: &LookupContext, message_id: &str) -> Result<Vec<Token>> {
    split_segments(body, message_id)?
        .into_iter()
        .map(|segment| match segment {
            RawSegment::Text(text) => Ok(Token::Text(text)),
            RawSegment::Escape(payload) => decode_escape(&payload, ctx, message_id),
        })
        .collect()
}

/// Interpret one escape payload (the bytes after the length byte)
///
/// # Errors
/// Returns [`Error::LookupMiss`] for icon or color codes absent from the
/// lookup context. Unrecognized payloads are not an error.
pub fn decode_escape(payload: &[u8], ctx: &LookupContext, message_id: &str) -> Result<Token> {
    let token = match payload {
        [0x01, 0x00, 0x00, 0x00, length, ..] => Token::Pause(*length),
        [0x01, 0x00, 0x01, ..] => Token::BoxBreak,
        [0x01, 0x00, 0x02, ..] => Token::Marker(DisplayMarker::LowerBaseline),
        [0x01, 0x00, 0x03, ..] => Token::Marker(DisplayMarker::CenterAlign),
        [0x02, 0x00, 0x00, 0x00, 0x53, ..] => Token::Marker(DisplayMarker::VoiceCue),
        [0x03, 0x00, code, ..] => Token::Icon {
            code: *code,
            name: ctx.icon_name(*code, message_id)?.to_string(),
        },
        [0x04, 0x00, 0x00, ..] => Token::Marker(DisplayMarker::SmallText),
        [0x04, 0x00, 0x02, ..] => Token::Marker(DisplayMarker::LargeText),
        [0x05, 0x00, 0x00, 0x00, 0x00] => Token::PlayerName(PlayerNameKind::Plain),
        [0x05, 0x00, 0x00, 0x01, 0x00] => Token::PlayerName(PlayerNameKind::Honorific),
        [0x06, ..] => Token::Placeholder(PlaceholderKind::Number),
        [0x07, ..] => Token::Placeholder(PlaceholderKind::Name),
        [0x09, 0x00, 0x05] => Token::Timer,
        [0xFF, 0x00, 0x00, code, ..] => Token::Color {
            code: *code,
            name: ctx.color_name(*code, message_id)?.to_string(),
        },
        [0xFF, 0x00, 0x02, kanji_count, rest @ ..] => {
            // The reading is followed by one stray byte
            let reading = &rest[..rest.len() - rest.len() % 2];
            let units: Vec<u16> = reading
                .chunks_exact(2)
                .map(|pair| u16::from_be_bytes([pair[0], pair[1]]))
                .collect();
            Token::Furigana {
                kanji_count: *kanji_count,
                reading: String::from_utf16_lossy(&units),
            }
        }
        _ => {
            tracing::warn!(
                "Unknown escape sequence {:02x?} in message '{}'",
                payload,
                message_id
            );
            Token::Unknown(payload.to_vec())
        }
    };
    Ok(token)
}
