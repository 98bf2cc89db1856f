//! Session lifecycle state definitions

use serde::{Deserialize, Serialize};

/// Top-level lifecycle of one play-through
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SessionState {
    /// Before the first start, or after returning to the title
    Intro,
    /// Clocks running, score accruing
    Playing,
    /// Flagged behaviour seen during a scan (terminal)
    Caught,
    /// Time ran out without a catch (terminal)
    Finished,
}

impl SessionState {
    /// CAUGHT and FINISHED end a session
    pub fn is_terminal(&self) -> bool {
        matches!(self, SessionState::Caught | SessionState::Finished)
    }

    /// Get ANSI color code for terminal display
    pub fn color_code(&self) -> &'static str {
        match self {
            SessionState::Intro => "\x1b[90m",    // Gray
            SessionState::Playing => "\x1b[36m",  // Cyan
            SessionState::Caught => "\x1b[31m",   // Red
            SessionState::Finished => "\x1b[32m", // Green
        }
    }

    /// Reset ANSI color
    pub fn color_reset() -> &'static str {
        "\x1b[0m"
    }

    /// Get emoji for state
    pub fn emoji(&self) -> &'static str {
        match self {
            SessionState::Intro => "📝",
            SessionState::Playing => "✏️",
            SessionState::Caught => "🚨",
            SessionState::Finished => "🔔",
        }
    }
}

impl std::fmt::Display for SessionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            SessionState::Intro => "INTRO",
            SessionState::Playing => "PLAYING",
            SessionState::Caught => "CAUGHT",
            SessionState::Finished => "FINISHED",
        };
        write!(f, "{}", name)
    }
}
