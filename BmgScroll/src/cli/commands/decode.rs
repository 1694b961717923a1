//! CLI command for decoding whole languages

use std::fs::File;
use std::io::BufWriter;
use std::path::Path;
use std::time::Instant;

use indexmap::IndexMap;

use crate::batch::{LanguageSource, process_languages};
use crate::cli::progress::{DISK, GEAR, LOOKING_GLASS, print_done, print_step, simple_bar};
use crate::formats::bmg::MessageId;
use crate::lookup::LookupContext;
use crate::message::{DecodeOptions, MessageRecord};

/// Decode every language and write `{language: {id: record}}` JSON
///
/// Languages that fail are reported and left out of the output.
pub fn execute(
    lookup: &Path,
    languages: &[LanguageSource],
    output: &Path,
    parallel: bool,
    options: DecodeOptions,
    quiet: bool,
) -> anyhow::Result<()> {
    let started = Instant::now();

    if !quiet {
        print_step(1, 3, LOOKING_GLASS, "Loading lookup context...");
    }
    let ctx = LookupContext::from_json_file(lookup)?;

    if !quiet {
        print_step(
            2,
            3,
            GEAR,
            &format!("Decoding {} languages...", languages.len()),
        );
    }
    let pb = simple_bar(languages.len() as u64, "Decoding", quiet);
    let result = process_languages(languages, &ctx, options, parallel, |progress| {
        pb.set_position(progress.current as u64);
        pb.set_message(progress.language.clone());
    });
    pb.finish_and_clear();

    let mut decoded: IndexMap<String, IndexMap<MessageId, MessageRecord>> = IndexMap::new();
    let mut failures = Vec::new();
    for outcome in result.outcomes {
        match outcome.result {
            Ok(records) => {
                decoded.insert(outcome.language, records);
            }
            Err(e) => failures.push(format!("{}: {e}", outcome.language)),
        }
    }

    if !quiet {
        print_step(3, 3, DISK, &format!("Writing {}...", output.display()));
    }
    let writer = BufWriter::new(File::create(output)?);
    serde_json::to_writer_pretty(writer, &decoded)?;

    if !quiet {
        println!();
        println!("Decoding complete:");
        println!("  Success: {}", result.success_count);
        println!("  Failed: {}", result.fail_count);
    }

    if !failures.is_empty() {
        println!();
        println!("Failures:");
        for msg in &failures {
            println!("  {msg}");
        }
        anyhow::bail!("{} of {} languages failed", failures.len(), languages.len());
    }

    if !quiet {
        print_done(started.elapsed());
    }
    Ok(())
}
