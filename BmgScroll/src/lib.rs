//! # BmgScroll
//!
//! A pure-Rust library for decoding Super Mario Galaxy message archives and
//! estimating how many frames each message takes to scroll through.
//!
//! ## Pipeline
//!
//! - **Archive** - `messageid.tbl` + `message.bmg` into raw messages
//! - **Decoding** - escape sequences into tokens, tokens into text boxes
//! - **Cross-references** - player names and other messages spliced in per case
//! - **Timing** - per-box lengths and per-message frame estimates
//!
//! ## Quick Start
//!
//! ```no_run
//! use bmgscroll::prelude::*;
//!
//! let ctx = LookupContext::from_json_file("lookup.json")?;
//! let raw = read_language_dir("data/usenglish")?;
//! let records = process_language("usenglish", &raw, &ctx, DecodeOptions::default())?;
//!
//! for (id, record) in &records {
//!     println!("{id}: {}", record.frames_display);
//! }
//! # Ok::<(), bmgscroll::Error>(())
//! ```
//!
//! ## Feature Flags
//!
//! - `cli` - Enables the `bmgscroll` command-line binary

pub mod batch;
pub mod error;
pub mod formats;
pub mod lookup;
pub mod message;

// Re-exports for convenience
pub use error::{Error, Result};

/// Prelude module for common imports
pub mod prelude {
    pub use crate::error::{Error, Result};
    pub use crate::formats::bmg::{
        MessageId, RawMessage, parse_archive_bytes, read_archive, read_language_dir,
    };
    pub use crate::lookup::{LanguageSpeed, LookupContext, NumberNameOverride};
    pub use crate::message::{
        BoxContent, BoxTiming, CrossReferenceMap, DecodeOptions, DecodedMessage, FrameEstimate,
        Frames, MessageBody, MessageRecord, PLACEHOLDER_CASE, PlaceholderKind, RawSegment,
        TextBox, Token, decode_messages, dump_segments, process_language,
        resolve_cross_references,
    };

    // Batch processing
    pub use crate::batch::{
        BatchResult, LanguageOutcome, LanguageSource, process_language_dir, process_languages,
    };
}

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// CLI module (feature-gated)
#[cfg(feature = "cli")]
pub mod cli;
