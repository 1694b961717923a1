//! Command execution implementations

use super::Commands;
use super::{decode, dump, show};
use crate::message::DecodeOptions;

impl Commands {
    /// Execute the selected command.
    ///
    /// # Errors
    /// Returns an error if the underlying command fails.
    pub fn execute(&self) -> anyhow::Result<()> {
        match self {
            Commands::Decode {
                lookup,
                languages,
                output,
                parallel,
                show_colors,
                show_furigana,
                quiet,
            } => decode::execute(
                lookup,
                languages,
                output,
                *parallel,
                DecodeOptions {
                    show_colors: *show_colors,
                    show_furigana: *show_furigana,
                },
                *quiet,
            ),
            Commands::Dump { tbl, bmg, output } => dump::execute(tbl, bmg, output.as_deref()),
            Commands::Show {
                lookup,
                language,
                id,
            } => show::execute(lookup, language, id),
        }
    }
}
