//! Error types for `BmgScroll`

use thiserror::Error;

/// The error type for `BmgScroll` operations.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum Error {
    // ==================== IO Errors ====================
    /// IO error from file operations.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON parsing or serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    // ==================== Archive Format Errors ====================
    /// A section of the content archive did not start with the expected tag.
    #[error("invalid section tag at offset {offset:#x}: expected {expected}, found {found:?}")]
    InvalidSectionTag {
        /// The tag that should have been present (`INF1` or `DAT1`).
        expected: &'static str,
        /// The four bytes actually found.
        found: [u8; 4],
        /// Byte offset of the tag within the content archive.
        offset: u64,
    },

    /// The id table and the content index disagree on the message count.
    #[error("message count mismatch: id table has {id_table}, INF1 has {index}")]
    MessageCountMismatch {
        /// Count declared by the id table.
        id_table: u32,
        /// Count declared by the INF1 section.
        index: u16,
    },

    /// An id-table entry carries a sequence index other than its position.
    #[error("id table entry {index} declares sequence index {found}")]
    IdTableIndexMismatch {
        /// Position of the entry in the table.
        index: usize,
        /// The sequence index stored in the entry.
        found: u32,
    },

    /// A message id could not be read from the id table.
    #[error("invalid message id for message {index} at offset {offset:#x}")]
    InvalidIdString {
        /// Message index.
        index: usize,
        /// Id-string offset declared for the message.
        offset: u32,
    },

    /// The INF1 per-entry size is too small to hold a content offset.
    #[error("INF1 item size {item_size} is smaller than a 4-byte offset")]
    InvalidItemSize {
        /// Declared per-entry size.
        item_size: u16,
    },

    /// The INF1 section size cannot hold the declared entries.
    #[error("INF1 section size {size:#x} cannot hold {count} entries of {item_size} bytes")]
    InvalidSectionSize {
        /// Declared section size.
        size: u32,
        /// Declared entry count.
        count: u16,
        /// Declared per-entry size.
        item_size: u16,
    },

    /// A message body begins before the end of the previous one.
    #[error("message {index} content at offset {offset:#x} precedes read position {position:#x}")]
    OutOfOrderMessage {
        /// Message index.
        index: usize,
        /// Absolute byte offset of the message body.
        offset: u64,
        /// Read position when the message was reached.
        position: u64,
    },

    /// A message body ran past the end of the content archive.
    #[error("message {index} at offset {offset:#x} is truncated")]
    TruncatedMessage {
        /// Message index.
        index: usize,
        /// Absolute byte offset of the message body.
        offset: u64,
    },

    /// An escape sequence in the archive declares a total length below its
    /// own 3-byte header.
    #[error("message {index}: escape sequence at offset {offset:#x} declares length {length}")]
    InvalidEscapeLength {
        /// Message index.
        index: usize,
        /// Absolute byte offset of the escape marker within the content archive.
        offset: u64,
        /// The declared total length.
        length: u8,
    },

    // ==================== Decode Errors ====================
    /// An escape sequence in a message body is shorter than its header or
    /// runs past the end of the body.
    #[error("message '{message_id}': escape sequence at byte {position} declares length {length}")]
    MalformedEscape {
        /// The message being decoded.
        message_id: String,
        /// Position of the escape marker within the message body.
        position: usize,
        /// The declared total length.
        length: u8,
    },

    /// An escape code is missing from its lookup table.
    #[error("{table} code {code} in message '{message_id}' is not in the lookup table")]
    LookupMiss {
        /// Which table was consulted (`icon` or `color`).
        table: &'static str,
        /// The code found in the escape payload.
        code: u8,
        /// The message containing the escape.
        message_id: String,
    },

    /// Two parts of one message vary over different case sets.
    #[error(
        "message '{message_id}' has multiple dimensions of cases: {expected:?} vs {found:?}"
    )]
    CaseDimensionConflict {
        /// The message being processed.
        message_id: String,
        /// Case names already established.
        expected: Vec<String>,
        /// Case names that could not be merged into them.
        found: Vec<String>,
    },

    /// A cross-reference names a message that does not exist or has no boxes.
    #[error("message '{message_id}' references '{target}', which has no text")]
    MissingReference {
        /// The referencing message.
        message_id: String,
        /// The referenced message.
        target: String,
    },

    /// A cross-reference target does not start with a single-case box.
    #[error("message '{message_id}' references '{target}', whose first box varies by case")]
    NonUniformReference {
        /// The referencing message.
        message_id: String,
        /// The referenced message.
        target: String,
    },

    // ==================== Configuration Errors ====================
    /// No scroll speed entry exists for a language code.
    #[error("no scroll speed configured for language '{0}'")]
    UnknownLanguage(String),
}

/// A specialized Result type for `BmgScroll` operations.
pub type Result<T> = std::result::Result<T, Error>;
