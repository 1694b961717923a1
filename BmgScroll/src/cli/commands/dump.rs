//! CLI command for dumping raw message segments

use std::path::Path;

use crate::formats::bmg::read_archive;
use crate::message::dump_segments;

/// Write an archive's messages as text runs and escape payloads
pub fn execute(tbl: &Path, bmg: &Path, output: Option<&Path>) -> anyhow::Result<()> {
    let raw = read_archive(tbl, bmg)?;
    let dump = dump_segments(&raw)?;
    let json = serde_json::to_string_pretty(&dump)?;

    match output {
        Some(path) => {
            std::fs::write(path, json)?;
            println!("Dumped {} messages to {}", dump.len(), path.display());
        }
        None => println!("{json}"),
    }
    Ok(())
}
