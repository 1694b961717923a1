//! Typed tokens produced from a message body

use serde::Serialize;

/// Escape sequences that only change presentation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisplayMarker {
    LowerBaseline,
    CenterAlign,
    VoiceCue,
    SmallText,
    LargeText,
}

impl DisplayMarker {
    /// Text shown in place of the marker
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            DisplayMarker::LowerBaseline => "<Lower-baseline text>",
            DisplayMarker::CenterAlign => "<Center align>",
            DisplayMarker::VoiceCue => "<Play voice audio>",
            DisplayMarker::SmallText => "<Small text>",
            DisplayMarker::LargeText => "<Large text>",
        }
    }
}

/// The two player-name escapes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayerNameKind {
    /// "Mario" / "Luigi"
    Plain,
    /// "Mr. Maaario" / "Mr. Luiiiigiii"
    Honorific,
}

impl PlayerNameKind {
    /// Text shown until the name is substituted
    #[must_use]
    pub const fn placeholder(self) -> &'static str {
        match self {
            PlayerNameKind::Plain => "<Player name>",
            PlayerNameKind::Honorific => "<Mr. Plaaayer naaame>",
        }
    }

    /// System messages holding the name for each playable character
    #[must_use]
    pub const fn targets(self) -> [(&'static str, &'static str); 2] {
        match self {
            PlayerNameKind::Plain => [
                ("mario", "System_PlayerName000"),
                ("luigi", "System_PlayerName100"),
            ],
            PlayerNameKind::Honorific => [
                ("mario", "System_PlayerName001"),
                ("luigi", "System_PlayerName101"),
            ],
        }
    }
}

/// Number and name escapes, whose length depends on game state
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum PlaceholderKind {
    Number,
    Name,
}

impl PlaceholderKind {
    /// Text shown when no override fills the value in
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            PlaceholderKind::Number => "<Number>",
            PlaceholderKind::Name => "<Name>",
        }
    }
}

/// Text shown for the in-game timer escape; counts as 8 characters
pub const TIMER_TEXT: &str = "xx:xx:xx";

/// One element of a decoded message body
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    /// A run of literal text
    Text(String),
    /// Scroll pause of the given number of frames
    Pause(u8),
    /// Start of a new text box
    BoxBreak,
    /// Presentation-only escape
    Marker(DisplayMarker),
    /// Inline icon; counts as one character
    Icon { code: u8, name: String },
    /// Text color change
    Color { code: u8, name: String },
    /// Kanji reading annotation
    Furigana { kanji_count: u8, reading: String },
    /// Player name substituted from system messages
    PlayerName(PlayerNameKind),
    /// Game-state dependent number or name
    Placeholder(PlaceholderKind),
    /// In-game timer display
    Timer,
    /// Escape payload with no known meaning
    Unknown(Vec<u8>),
}

impl Token {
    /// Whether this token is an escape nobody knows how to interpret
    #[must_use]
    pub fn is_unknown(&self) -> bool {
        matches!(self, Token::Unknown(_))
    }
}

/// Hex rendering of an unknown escape payload
#[must_use]
pub fn unknown_escape_label(payload: &[u8]) -> String {
    let hex: String = payload.iter().map(|b| format!("{b:02x}")).collect();
    format!("<Unknown escape {hex}>")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_escape_label() {
        assert_eq!(unknown_escape_label(&[0x0a, 0xff, 0x00]), "<Unknown escape 0aff00>");
    }

    #[test]
    fn test_player_name_targets() {
        assert_eq!(
            PlayerNameKind::Honorific.targets()[1],
            ("luigi", "System_PlayerName101")
        );
    }
}
