//! File format handlers for Super Mario Galaxy message data

pub mod bmg;

pub use bmg::{MessageId, RawMessage, read_archive, read_language_dir};
