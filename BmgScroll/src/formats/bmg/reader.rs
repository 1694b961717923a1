//! `message.bmg` reading and pairing with the id table

use super::{
    BMG_HEADER_SIZE, CONTENT_FILE, DAT1_TAG, ESCAPE_MARKER, ID_TABLE_FILE, INF1_HEADER_SIZE,
    INF1_TAG, RawMessage, TERMINATOR, parse_id_table_bytes,
};
use crate::error::{Error, Result};
use byteorder::{BigEndian, ByteOrder, ReadBytesExt};
use std::io::{Cursor, Read, Seek, SeekFrom};
use std::path::Path;

/// Read a language's archive from an id table and a content archive on disk
///
/// # Errors
///
/// Returns [`Error::Io`] if either file cannot be read, or any of the format
/// errors described on [`parse_archive_bytes`].
pub fn read_archive<P: AsRef<Path>, Q: AsRef<Path>>(
    id_table: P,
    content: Q,
) -> Result<Vec<RawMessage>> {
    let id_table = std::fs::read(id_table)?;
    let content = std::fs::read(content)?;
    parse_archive_bytes(&id_table, &content)
}

/// Read `messageid.tbl` and `message.bmg` from a language directory
pub fn read_language_dir<P: AsRef<Path>>(dir: P) -> Result<Vec<RawMessage>> {
    let dir = dir.as_ref();
    read_archive(dir.join(ID_TABLE_FILE), dir.join(CONTENT_FILE))
}

/// Parse an archive from the id-table bytes and the content-archive bytes
///
/// Messages are returned in id-table order. A message whose content offset
/// is 0 comes back with `content: None`.
///
/// # Errors
///
/// - [`Error::InvalidSectionTag`] if `INF1` or `DAT1` is missing
/// - [`Error::MessageCountMismatch`] if the two files disagree on the count
/// - [`Error::OutOfOrderMessage`] if a body starts before the previous one ended
/// - [`Error::TruncatedMessage`] if a body runs off the end of the data
/// - [`Error::InvalidEscapeLength`] if an escape in a body is shorter than its header
pub fn parse_archive_bytes(id_table: &[u8], content: &[u8]) -> Result<Vec<RawMessage>> {
    let ids = parse_id_table_bytes(id_table)?;

    let mut cursor = Cursor::new(content);
    cursor.seek(SeekFrom::Start(BMG_HEADER_SIZE))?;

    // INF1: offset index
    expect_tag(&mut cursor, INF1_TAG, "INF1")?;
    let section_size = cursor.read_u32::<BigEndian>()?;
    let count = cursor.read_u16::<BigEndian>()?;
    if usize::from(count) != ids.len() {
        return Err(Error::MessageCountMismatch {
            id_table: ids.len() as u32,
            index: count,
        });
    }
    let item_size = cursor.read_u16::<BigEndian>()?;
    if item_size < 4 {
        return Err(Error::InvalidItemSize { item_size });
    }
    // Reserved
    cursor.seek(SeekFrom::Current(4))?;

    let mut offsets = Vec::with_capacity(ids.len());
    let mut item = vec![0u8; usize::from(item_size)];
    for _ in 0..count {
        cursor.read_exact(&mut item)?;
        // Bytes past the offset are reserved and left uninterpreted
        offsets.push(BigEndian::read_u32(&item[..4]));
    }

    let padding = section_size
        .checked_sub(INF1_HEADER_SIZE + u32::from(count) * u32::from(item_size))
        .ok_or(Error::InvalidSectionSize {
            size: section_size,
            count,
            item_size,
        })?;
    cursor.seek(SeekFrom::Current(i64::from(padding)))?;

    // DAT1: message bodies
    expect_tag(&mut cursor, DAT1_TAG, "DAT1")?;
    let dat1_size = cursor.read_u32::<BigEndian>()?;
    let content_start = cursor.position();
    tracing::debug!(
        "INF1 has {} entries of {} bytes; DAT1 is {:#x} bytes at {:#x}",
        count,
        item_size,
        dat1_size,
        content_start
    );

    let mut messages = Vec::with_capacity(ids.len());
    for (index, (id, offset)) in ids.into_iter().zip(offsets).enumerate() {
        if offset == 0 {
            messages.push(RawMessage { id, content: None });
            continue;
        }

        let start = content_start + u64::from(offset);
        let position = cursor.position();
        if start < position {
            return Err(Error::OutOfOrderMessage {
                index,
                offset: start,
                position,
            });
        }
        if start > position {
            tracing::debug!(
                "Skipping {} padding bytes before message {}",
                start - position,
                index
            );
        }

        let begin = usize::try_from(start).map_err(|_| Error::TruncatedMessage {
            index,
            offset: start,
        })?;
        let end = match scan_message_body(content, begin) {
            Ok(end) => end,
            Err(Error::TruncatedMessage { .. }) => {
                return Err(Error::TruncatedMessage {
                    index,
                    offset: start,
                });
            }
            Err(Error::InvalidEscapeLength { offset, length, .. }) => {
                return Err(Error::InvalidEscapeLength {
                    index,
                    offset,
                    length,
                });
            }
            Err(e) => return Err(e),
        };
        cursor.set_position(end as u64);

        messages.push(RawMessage {
            id,
            content: Some(content[begin..end].to_vec()),
        });
    }

    tracing::info!("Read {} messages from archive", messages.len());
    Ok(messages)
}

/// Find the end of the message body starting at `start`
///
/// Walks 2-byte units, stepping over escape sequences as a whole, and
/// returns the offset just past the terminating `00 00` unit.
///
/// # Errors
///
/// Returns [`Error::TruncatedMessage`] if the data ends before the terminator,
/// or [`Error::InvalidEscapeLength`] (at the marker's offset in `data`) for an
/// escape whose declared length is shorter than its header. Both carry
/// index 0; [`parse_archive_bytes`] fills in the real message index.
pub fn scan_message_body(data: &[u8], start: usize) -> Result<usize> {
    let truncated = || Error::TruncatedMessage {
        index: 0,
        offset: start as u64,
    };

    let mut pos = start;
    loop {
        let unit = data.get(pos..pos + 2).ok_or_else(truncated)?;
        let unit = BigEndian::read_u16(unit);
        pos += 2;

        match unit {
            TERMINATOR => return Ok(pos),
            ESCAPE_MARKER => {
                let length = *data.get(pos).ok_or_else(truncated)?;
                if length < 3 {
                    return Err(Error::InvalidEscapeLength {
                        index: 0,
                        offset: (pos - 2) as u64,
                        length,
                    });
                }
                // Length counts the marker, which we've already consumed
                pos += usize::from(length) - 2;
            }
            _ => {}
        }
    }
}

fn expect_tag(cursor: &mut Cursor<&[u8]>, expected: &[u8; 4], name: &'static str) -> Result<()> {
    let offset = cursor.position();
    let mut found = [0u8; 4];
    cursor.read_exact(&mut found)?;
    if &found != expected {
        return Err(Error::InvalidSectionTag {
            expected: name,
            found,
            offset,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id_table(ids: &[&str]) -> Vec<u8> {
        let mut data = Vec::new();
        data.extend_from_slice(&(ids.len() as u32).to_be_bytes());
        data.extend_from_slice(&[0u8; 0x24]);
        let mut offset = 0u32;
        for (index, id) in ids.iter().enumerate() {
            data.extend_from_slice(&(index as u32).to_be_bytes());
            data.extend_from_slice(&offset.to_be_bytes());
            offset += id.len() as u32 + 1;
        }
        for id in ids {
            data.extend_from_slice(id.as_bytes());
            data.push(0);
        }
        data
    }

    /// Lay out bodies contiguously (with optional padding before each) and
    /// build the content archive. `None` bodies get offset 0.
    fn content(bodies: &[(usize, Option<Vec<u8>>)], item_size: u16) -> (Vec<u8>, Vec<u32>) {
        let mut dat = vec![0u8; 2];
        let mut offsets = Vec::new();
        for (padding, body) in bodies {
            match body {
                Some(body) => {
                    dat.extend(std::iter::repeat_n(0xEEu8, *padding));
                    offsets.push(dat.len() as u32);
                    dat.extend_from_slice(body);
                }
                None => offsets.push(0),
            }
        }
        (build_bmg(&offsets, item_size, &dat), offsets)
    }

    fn build_bmg(offsets: &[u32], item_size: u16, dat: &[u8]) -> Vec<u8> {
        let mut data = vec![0u8; 0x20];
        let entries = offsets.len() as u32 * u32::from(item_size);
        let size = (16 + entries + 31) / 32 * 32;
        data.extend_from_slice(b"INF1");
        data.extend_from_slice(&size.to_be_bytes());
        data.extend_from_slice(&(offsets.len() as u16).to_be_bytes());
        data.extend_from_slice(&item_size.to_be_bytes());
        data.extend_from_slice(&[0u8; 4]);
        for offset in offsets {
            data.extend_from_slice(&offset.to_be_bytes());
            data.extend(std::iter::repeat_n(0xAAu8, usize::from(item_size) - 4));
        }
        data.extend(std::iter::repeat_n(0u8, (size - 16 - entries) as usize));
        data.extend_from_slice(b"DAT1");
        data.extend_from_slice(&(dat.len() as u32 + 8).to_be_bytes());
        data.extend_from_slice(dat);
        data
    }

    fn utf16(text: &str) -> Vec<u8> {
        let mut bytes: Vec<u8> = text.encode_utf16().flat_map(u16::to_be_bytes).collect();
        bytes.extend_from_slice(&[0, 0]);
        bytes
    }

    #[test]
    fn test_reads_bodies_and_null_messages() {
        let ids = id_table(&["A", "B", "C"]);
        let (bmg, _) = content(
            &[(0, Some(utf16("Hi"))), (0, None), (0, Some(utf16("Yo")))],
            8,
        );
        let messages = parse_archive_bytes(&ids, &bmg).unwrap();
        assert_eq!(messages.len(), 3);
        assert_eq!(messages[0].id, "A");
        assert_eq!(messages[0].content.as_deref(), Some(&utf16("Hi")[..]));
        assert!(messages[1].is_null());
        assert_eq!(messages[2].content.as_deref(), Some(&utf16("Yo")[..]));
    }

    #[test]
    fn test_padding_between_bodies_is_skipped() {
        let ids = id_table(&["A", "B"]);
        let (bmg, _) = content(&[(0, Some(utf16("Hi"))), (6, Some(utf16("Yo")))], 4);
        let messages = parse_archive_bytes(&ids, &bmg).unwrap();
        assert_eq!(messages[1].content.as_deref(), Some(&utf16("Yo")[..]));
    }

    #[test]
    fn test_escape_containing_zero_unit_does_not_end_body() {
        // Pause escape: 00 1A 08 01 00 00 00 0A, payload has zero pairs
        let mut body = vec![0x00, 0x1A, 0x08, 0x01, 0x00, 0x00, 0x00, 0x0A];
        body.extend_from_slice(&utf16("A"));
        let end = scan_message_body(&body, 0).unwrap();
        assert_eq!(end, body.len());
    }

    #[test]
    fn test_wrong_section_tag() {
        let ids = id_table(&["A"]);
        let (mut bmg, _) = content(&[(0, Some(utf16("Hi")))], 8);
        bmg[0x20..0x24].copy_from_slice(b"INF2");
        let err = parse_archive_bytes(&ids, &bmg).unwrap_err();
        assert!(matches!(
            err,
            Error::InvalidSectionTag { expected: "INF1", offset: 0x20, .. }
        ));
    }

    #[test]
    fn test_count_mismatch() {
        let ids = id_table(&["A", "B"]);
        let (bmg, _) = content(&[(0, Some(utf16("Hi")))], 8);
        let err = parse_archive_bytes(&ids, &bmg).unwrap_err();
        assert!(matches!(
            err,
            Error::MessageCountMismatch { id_table: 2, index: 1 }
        ));
    }

    #[test]
    fn test_out_of_order_offsets() {
        let ids = id_table(&["A", "B"]);
        let dat = [vec![0u8; 2], utf16("Hello"), utf16("Yo")].concat();
        // Second message points back into the first body
        let bmg = build_bmg(&[2, 4], 8, &dat);
        let err = parse_archive_bytes(&ids, &bmg).unwrap_err();
        assert!(matches!(err, Error::OutOfOrderMessage { index: 1, .. }));
    }

    #[test]
    fn test_truncated_body() {
        let ids = id_table(&["A"]);
        let dat = [vec![0u8; 2], "Hi".encode_utf16().flat_map(u16::to_be_bytes).collect()].concat();
        let bmg = build_bmg(&[2], 8, &dat);
        let err = parse_archive_bytes(&ids, &bmg).unwrap_err();
        assert!(matches!(err, Error::TruncatedMessage { index: 0, .. }));
    }

    #[test]
    fn test_bad_escape_length() {
        let body = [0x00, 0x41, 0x00, 0x1A, 0x02, 0x00, 0x00];
        let err = scan_message_body(&body, 0).unwrap_err();
        assert!(matches!(
            err,
            Error::InvalidEscapeLength { offset: 2, length: 2, .. }
        ));
    }

    #[test]
    fn test_bad_escape_length_names_message() {
        let ids = id_table(&["A", "B"]);
        let bad = [vec![0x00, 0x1A, 0x02], utf16("x")].concat();
        let (bmg, offsets) = content(&[(0, Some(utf16("Hi"))), (0, Some(bad))], 8);
        let err = parse_archive_bytes(&ids, &bmg).unwrap_err();

        // Escape marker sits at the start of message 1's body
        let content_start = bmg.windows(4).position(|w| w == b"DAT1").unwrap() as u64 + 8;
        let marker = content_start + u64::from(offsets[1]);
        assert!(matches!(
            err,
            Error::InvalidEscapeLength { index: 1, length: 2, offset } if offset == marker
        ));
        assert!(err.to_string().starts_with("message 1: "));
    }
}
