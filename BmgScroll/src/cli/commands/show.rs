//! CLI command for inspecting a single message

use std::path::Path;

use crate::batch::{LanguageSource, process_language_dir};
use crate::lookup::LookupContext;
use crate::message::DecodeOptions;

/// Print one message's text, box summary and frame summary
pub fn execute(lookup: &Path, language: &LanguageSource, id: &str) -> anyhow::Result<()> {
    let ctx = LookupContext::from_json_file(lookup)?;
    let records = process_language_dir(&language.code, &language.dir, &ctx, DecodeOptions::default())?;

    let Some(record) = records.get(id) else {
        anyhow::bail!("Message '{}' not found in {}", id, language.dir.display());
    };

    println!("Id: {id}");
    println!("Text:");
    println!("{}", record.text_display);
    println!();
    println!("Boxes:");
    println!("{}", record.boxes_display);
    println!();
    println!("Frames:");
    println!("{}", record.frames_display);
    if record.unknown_escapes > 0 {
        println!();
        println!("Unknown escapes: {}", record.unknown_escapes);
    }
    Ok(())
}
