//! Multi-language processing
//!
//! Languages share nothing but the lookup context, so they can be processed
//! in parallel. A failing language never affects the others.

use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::atomic::{AtomicUsize, Ordering};

use indexmap::IndexMap;
use rayon::prelude::*;

use crate::error::Result;
use crate::formats::bmg::{MessageId, read_language_dir};
use crate::lookup::LookupContext;
use crate::message::{DecodeOptions, MessageRecord, process_language};

/// A language code paired with the directory holding its archive
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LanguageSource {
    pub code: String,
    pub dir: PathBuf,
}

impl LanguageSource {
    pub fn new(code: impl Into<String>, dir: impl Into<PathBuf>) -> Self {
        Self {
            code: code.into(),
            dir: dir.into(),
        }
    }
}

impl FromStr for LanguageSource {
    type Err = String;

    /// Parse `code=dir`
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.split_once('=') {
            Some((code, dir)) if !code.is_empty() && !dir.is_empty() => {
                Ok(LanguageSource::new(code, dir))
            }
            _ => Err(format!(
                "Invalid language '{s}'. Expected CODE=DIR, e.g. usenglish=data/usenglish"
            )),
        }
    }
}

/// Progress update sent as each language starts
#[derive(Debug, Clone)]
pub struct BatchProgress {
    /// Current language number (1-indexed)
    pub current: usize,
    pub total: usize,
    pub language: String,
}

/// Outcome of one language
#[derive(Debug)]
pub struct LanguageOutcome {
    pub language: String,
    pub result: Result<IndexMap<MessageId, MessageRecord>>,
}

/// Result of a batch run
#[derive(Debug)]
pub struct BatchResult {
    /// Number of languages processed without error
    pub success_count: usize,
    /// Number of languages that failed
    pub fail_count: usize,
    /// One outcome per language, in input order
    pub outcomes: Vec<LanguageOutcome>,
}

/// Read and process one language directory
///
/// # Errors
/// Returns the archive reader's errors or those of [`process_language`].
pub fn process_language_dir<P: AsRef<Path>>(
    code: &str,
    dir: P,
    ctx: &LookupContext,
    options: DecodeOptions,
) -> Result<IndexMap<MessageId, MessageRecord>> {
    let raw = read_language_dir(dir)?;
    process_language(code, &raw, ctx, options)
}

/// Process several languages, optionally in parallel
///
/// # Arguments
/// * `sources` - Languages to process
/// * `ctx` - Lookup context shared by every language
/// * `options` - Display options
/// * `parallel` - Process languages on the rayon thread pool
/// * `progress` - Callback for progress updates
pub fn process_languages<F>(
    sources: &[LanguageSource],
    ctx: &LookupContext,
    options: DecodeOptions,
    parallel: bool,
    progress: F,
) -> BatchResult
where
    F: Fn(&BatchProgress) + Send + Sync,
{
    let success_counter = AtomicUsize::new(0);
    let fail_counter = AtomicUsize::new(0);
    let processed = AtomicUsize::new(0);
    let total = sources.len();

    let run = |source: &LanguageSource| {
        let current = processed.fetch_add(1, Ordering::SeqCst) + 1;
        progress(&BatchProgress {
            current,
            total,
            language: source.code.clone(),
        });

        let result = process_language_dir(&source.code, &source.dir, ctx, options);
        match &result {
            Ok(records) => {
                success_counter.fetch_add(1, Ordering::SeqCst);
                tracing::info!("{}: processed {} messages", source.code, records.len());
            }
            Err(e) => {
                fail_counter.fetch_add(1, Ordering::SeqCst);
                tracing::warn!("{}: failed: {}", source.code, e);
            }
        }
        LanguageOutcome {
            language: source.code.clone(),
            result,
        }
    };

    let outcomes: Vec<LanguageOutcome> = if parallel {
        sources.par_iter().map(run).collect()
    } else {
        sources.iter().map(run).collect()
    };

    BatchResult {
        success_count: success_counter.load(Ordering::SeqCst),
        fail_count: fail_counter.load(Ordering::SeqCst),
        outcomes,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_language_source() {
        let source: LanguageSource = "usenglish=data/UsEnglish".parse().unwrap();
        assert_eq!(source, LanguageSource::new("usenglish", "data/UsEnglish"));

        assert!("usenglish".parse::<LanguageSource>().is_err());
        assert!("=dir".parse::<LanguageSource>().is_err());
        assert!("usenglish=".parse::<LanguageSource>().is_err());
    }

    #[test]
    fn test_missing_directory_fails_alone() {
        let ctx = LookupContext::with_default_languages();
        let sources = [
            LanguageSource::new("usenglish", "/nonexistent/usenglish"),
            LanguageSource::new("jpjapanese", "/nonexistent/jpjapanese"),
        ];
        let seen = AtomicUsize::new(0);
        let result = process_languages(&sources, &ctx, DecodeOptions::default(), true, |_| {
            seen.fetch_add(1, Ordering::SeqCst);
        });

        assert_eq!(result.fail_count, 2);
        assert_eq!(result.success_count, 0);
        assert_eq!(seen.load(Ordering::SeqCst), 2);
        let languages: Vec<_> = result.outcomes.iter().map(|o| o.language.as_str()).collect();
        assert_eq!(languages, ["usenglish", "jpjapanese"]);
    }
}
