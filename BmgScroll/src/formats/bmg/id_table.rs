//! `messageid.tbl` reading
//!
//! Layout: u32 message count, 0x24 reserved bytes, then per message a u32
//! sequence index and a u32 id-string offset, then the NUL-terminated id
//! strings in order.

use super::{ID_TABLE_RESERVED, MessageId};
use crate::error::{Error, Result};
use byteorder::{BigEndian, ReadBytesExt};
use std::io::{Cursor, Read, Seek, SeekFrom};
use std::path::Path;

/// Read an id table from disk
pub fn read_id_table<P: AsRef<Path>>(path: P) -> Result<Vec<MessageId>> {
    let data = std::fs::read(path)?;
    parse_id_table_bytes(&data)
}

/// Parse an id table from bytes
///
/// # Errors
///
/// Returns [`Error::IdTableIndexMismatch`] if an entry's sequence index does
/// not match its position, [`Error::InvalidIdString`] if an id cannot be
/// recovered, and [`Error::Io`] on truncated data.
pub fn parse_id_table_bytes(data: &[u8]) -> Result<Vec<MessageId>> {
    let mut cursor = Cursor::new(data);

    let count = cursor.read_u32::<BigEndian>()? as usize;
    cursor.seek(SeekFrom::Current(ID_TABLE_RESERVED))?;

    // Each entry is 8 bytes, so a corrupt count can't make us over-allocate
    let mut offsets = Vec::with_capacity(count.min(data.len() / 8));
    for index in 0..count {
        let sequence = cursor.read_u32::<BigEndian>()?;
        if sequence as usize != index {
            return Err(Error::IdTableIndexMismatch {
                index,
                found: sequence,
            });
        }
        offsets.push(cursor.read_u32::<BigEndian>()?);
    }

    let mut ids = Vec::with_capacity(offsets.len());
    for (index, &offset) in offsets.iter().enumerate() {
        let bytes = match offsets.get(index + 1) {
            Some(&next) => {
                let len = next
                    .checked_sub(offset)
                    .and_then(|gap| gap.checked_sub(1))
                    .ok_or(Error::InvalidIdString { index, offset })?;
                let mut bytes = vec![0u8; len as usize];
                cursor.read_exact(&mut bytes)?;
                // Terminator
                cursor.read_u8()?;
                bytes
            }
            None => read_until_nul(&mut cursor)?,
        };

        if !bytes.is_ascii() {
            return Err(Error::InvalidIdString { index, offset });
        }
        ids.push(String::from_utf8(bytes).map_err(|_| Error::InvalidIdString { index, offset })?);
    }

    tracing::debug!("Read {} message ids", ids.len());
    Ok(ids)
}

fn read_until_nul(cursor: &mut Cursor<&[u8]>) -> Result<Vec<u8>> {
    let mut bytes = Vec::new();
    loop {
        match cursor.read_u8()? {
            0 => return Ok(bytes),
            byte => bytes.push(byte),
        }
    }
}
