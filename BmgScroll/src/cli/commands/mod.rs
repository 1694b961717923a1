use clap::Subcommand;
use std::path::PathBuf;

use crate::batch::LanguageSource;

pub mod decode;
pub mod dump;
mod execute;
pub mod show;

#[derive(Subcommand)]
pub enum Commands {
    /// Decode one or more languages and write per-message frame estimates as JSON
    Decode {
        /// Lookup context JSON (colors, icons, speeds, overrides)
        #[arg(short, long)]
        lookup: PathBuf,

        /// Language to decode, as CODE=DIR (repeatable)
        #[arg(short = 'L', long = "language", required = true)]
        languages: Vec<LanguageSource>,

        /// Output JSON file
        #[arg(short, long)]
        output: PathBuf,

        /// Process languages in parallel
        #[arg(long)]
        parallel: bool,

        /// Render color changes into display text
        #[arg(long)]
        show_colors: bool,

        /// Render furigana readings into display text
        #[arg(long)]
        show_furigana: bool,

        /// Suppress progress output
        #[arg(short, long)]
        quiet: bool,
    },

    /// Dump an archive's messages as raw text runs and escape bytes
    Dump {
        /// Message id table (messageid.tbl)
        #[arg(long)]
        tbl: PathBuf,

        /// Message archive (message.bmg)
        #[arg(long)]
        bmg: PathBuf,

        /// Output JSON file (stdout if omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Print one message's text, boxes and frame estimate
    Show {
        /// Lookup context JSON
        #[arg(short, long)]
        lookup: PathBuf,

        /// Language to read, as CODE=DIR
        #[arg(short = 'L', long = "language")]
        language: LanguageSource,

        /// Message id
        #[arg(long)]
        id: String,
    },
}
