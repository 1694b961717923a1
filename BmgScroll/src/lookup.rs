//! Lookup context shared by the decoder and the timing model
//!
//! Everything here is read-only once built. It is usually loaded from a
//! single JSON document:
//!
//! ```json
//! {
//!   "colors": { "1": "Red" },
//!   "icons": { "0": "Star" },
//!   "forced_slow": ["Tutorial_Start"],
//!   "languages": { "usenglish": { "alpha_req": 0.9, "fade_rate": 0.4375 } },
//!   "number_name_overrides": {
//!     "Lumas_Hungry": { "kind": "text", "cases": { "a": "10", "b": "500" } },
//!     "Galaxy_Hint": {
//!       "kind": "message",
//!       "placeholder": "<Galaxy name>",
//!       "targets": { "a": "GalaxyName_A", "b": "GalaxyName_B" }
//!     }
//!   },
//!   "animation_times": { "Cutscene_Intro": 240 }
//! }
//! ```

use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

use serde::Deserialize;

use crate::error::{Error, Result};
use crate::formats::bmg::MessageId;

/// Character alpha requirement used by both known languages
pub const DEFAULT_ALPHA_REQ: f32 = 0.9;

/// Per-language scroll parameters
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct LanguageSpeed {
    /// Alpha each character must reach before the next starts fading in
    pub alpha_req: f32,
    /// Alpha gained per frame
    pub fade_rate: f32,
}

/// How a number/name escape in a specific message is filled in
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum NumberNameOverride {
    /// Literal text per case
    Text {
        /// Case name to the text shown for that case
        cases: BTreeMap<String, String>,
    },
    /// Text taken from other messages, substituted after decoding
    Message {
        /// Text shown until the reference is resolved
        placeholder: String,
        /// Case name to the message whose text fills the placeholder
        targets: BTreeMap<String, MessageId>,
    },
}

/// Immutable lookup tables consulted while decoding and timing messages
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct LookupContext {
    /// Color escape code to color name
    pub colors: BTreeMap<u8, String>,
    /// Icon escape code to icon name
    pub icons: BTreeMap<u8, String>,
    /// Messages that always scroll at slow speed
    pub forced_slow: BTreeSet<MessageId>,
    /// Language code to scroll parameters
    pub languages: BTreeMap<String, LanguageSpeed>,
    /// Per-message number/name fill-ins
    pub number_name_overrides: BTreeMap<MessageId, NumberNameOverride>,
    /// Cutscene animation length in frames, per message
    pub animation_times: BTreeMap<MessageId, u32>,
}

impl LookupContext {
    /// Create an empty context
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty context with the scroll speeds of the known languages
    #[must_use]
    pub fn with_default_languages() -> Self {
        let mut ctx = Self::default();
        ctx.languages.insert(
            "usenglish".to_string(),
            LanguageSpeed {
                alpha_req: DEFAULT_ALPHA_REQ,
                fade_rate: 0.4375,
            },
        );
        ctx.languages.insert(
            "jpjapanese".to_string(),
            LanguageSpeed {
                alpha_req: DEFAULT_ALPHA_REQ,
                fade_rate: 0.35,
            },
        );
        ctx
    }

    /// Parse a context from a JSON string
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Load a context from a JSON file
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        let ctx = Self::from_json_str(&content)?;
        tracing::info!(
            "Loaded lookup context from {}: {} colors, {} icons, {} languages",
            path.display(),
            ctx.colors.len(),
            ctx.icons.len(),
            ctx.languages.len()
        );
        Ok(ctx)
    }

    /// Name of an icon code
    ///
    /// # Errors
    /// Returns [`Error::LookupMiss`] if the code is not in the icon table.
    pub fn icon_name(&self, code: u8, message_id: &str) -> Result<&str> {
        self.icons
            .get(&code)
            .map(String::as_str)
            .ok_or_else(|| Error::LookupMiss {
                table: "icon",
                code,
                message_id: message_id.to_string(),
            })
    }

    /// Name of a color code
    ///
    /// # Errors
    /// Returns [`Error::LookupMiss`] if the code is not in the color table.
    pub fn color_name(&self, code: u8, message_id: &str) -> Result<&str> {
        self.colors
            .get(&code)
            .map(String::as_str)
            .ok_or_else(|| Error::LookupMiss {
                table: "color",
                code,
                message_id: message_id.to_string(),
            })
    }

    /// Scroll parameters for a language
    ///
    /// # Errors
    /// Returns [`Error::UnknownLanguage`] if no entry exists for the code.
    pub fn language_speed(&self, language: &str) -> Result<LanguageSpeed> {
        self.languages
            .get(language)
            .copied()
            .ok_or_else(|| Error::UnknownLanguage(language.to_string()))
    }

    /// Whether a message always scrolls at slow speed
    pub fn is_forced_slow(&self, message_id: &str) -> bool {
        self.forced_slow.contains(message_id)
    }

    pub fn number_name_override(&self, message_id: &str) -> Option<&NumberNameOverride> {
        self.number_name_overrides.get(message_id)
    }

    pub fn animation_time(&self, message_id: &str) -> Option<u32> {
        self.animation_times.get(message_id).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_full_context() {
        let json = r#"{
            "colors": { "2": "Green" },
            "icons": { "0": "Star" },
            "forced_slow": ["Tutorial_Start"],
            "languages": { "usenglish": { "alpha_req": 0.9, "fade_rate": 0.4375 } },
            "number_name_overrides": {
                "Luma_Hungry": { "kind": "text", "cases": { "a": "10", "b": "500" } },
                "Galaxy_Hint": {
                    "kind": "message",
                    "placeholder": "<Galaxy>",
                    "targets": { "a": "GalaxyName_A" }
                }
            },
            "animation_times": { "Cutscene_Intro": 240 }
        }"#;
        let ctx = LookupContext::from_json_str(json).unwrap();

        assert_eq!(ctx.color_name(2, "m").unwrap(), "Green");
        assert_eq!(ctx.icon_name(0, "m").unwrap(), "Star");
        assert!(ctx.is_forced_slow("Tutorial_Start"));
        assert!(!ctx.is_forced_slow("Other"));
        assert_eq!(ctx.language_speed("usenglish").unwrap().fade_rate, 0.4375);
        assert_eq!(ctx.animation_time("Cutscene_Intro"), Some(240));
        assert!(matches!(
            ctx.number_name_override("Luma_Hungry"),
            Some(NumberNameOverride::Text { cases }) if cases["b"] == "500"
        ));
        assert!(matches!(
            ctx.number_name_override("Galaxy_Hint"),
            Some(NumberNameOverride::Message { placeholder, .. }) if placeholder == "<Galaxy>"
        ));
    }

    #[test]
    fn test_missing_sections_default_to_empty() {
        let ctx = LookupContext::from_json_str("{}").unwrap();
        assert_eq!(ctx, LookupContext::new());
    }

    #[test]
    fn test_lookup_miss_is_typed() {
        let ctx = LookupContext::new();
        let err = ctx.icon_name(9, "Msg").unwrap_err();
        assert!(matches!(
            err,
            Error::LookupMiss { table: "icon", code: 9, ref message_id } if message_id == "Msg"
        ));
    }

    #[test]
    fn test_default_languages() {
        let ctx = LookupContext::with_default_languages();
        assert_eq!(ctx.language_speed("jpjapanese").unwrap().fade_rate, 0.35);
        assert!(matches!(
            ctx.language_speed("frfrench"),
            Err(Error::UnknownLanguage(code)) if code == "frfrench"
        ));
    }
}
