//! BMG message archive format
//!
//! A language's messages are stored as a pair of big-endian files:
//! `messageid.tbl` maps message indices to ASCII ids, and `message.bmg`
//! holds an `INF1` offset index followed by a `DAT1` section of UTF-16
//! message bodies with embedded escape sequences.

mod id_table;
mod reader;

pub use id_table::{parse_id_table_bytes, read_id_table};
pub use reader::{
    parse_archive_bytes, read_archive, read_language_dir, scan_message_body,
};

/// Message id as stored in the id table, stable across languages
pub type MessageId = String;

/// File name of the id table inside a language directory
pub const ID_TABLE_FILE: &str = "messageid.tbl";

/// File name of the content archive inside a language directory
pub const CONTENT_FILE: &str = "message.bmg";

/// Bytes skipped after the id table's message count
pub const ID_TABLE_RESERVED: i64 = 0x24;

/// Size of the content archive's file header
pub const BMG_HEADER_SIZE: u64 = 0x20;

/// Tag of the offset index section
pub const INF1_TAG: &[u8; 4] = b"INF1";

/// Tag of the message body section
pub const DAT1_TAG: &[u8; 4] = b"DAT1";

/// Bytes of the `INF1` section before its first entry
/// (tag, size, count, item size, 4 reserved bytes)
pub const INF1_HEADER_SIZE: u32 = 16;

/// UTF-16 unit that terminates a message body
pub const TERMINATOR: u16 = 0x0000;

/// UTF-16 unit that introduces an escape sequence
pub const ESCAPE_MARKER: u16 = 0x001A;

/// One message as stored in the archive, before decoding
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawMessage {
    /// Message id from the id table
    pub id: MessageId,
    /// Body bytes including the terminator, or `None` for a null message
    pub content: Option<Vec<u8>>,
}

impl RawMessage {
    /// Whether the archive stores no body for this message (offset 0)
    #[must_use]
    pub fn is_null(&self) -> bool {
        self.content.is_none()
    }
}
