//! Observer phase definitions

use serde::{Deserialize, Serialize};

/// Where the observer is in its scan cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ObserverPhase {
    /// Wandering, not looking
    Idle,
    /// Approaching: the warning window
    Preparing,
    /// Actively looking, any flagged action is caught
    Scanning,
    /// Just caught someone (terminal, set externally)
    Alert,
}

impl ObserverPhase {
    /// Get ANSI color code for terminal display
    pub fn color_code(&self) -> &'static str {
        match self {
            ObserverPhase::Idle => "\x1b[90m",      // Gray
            ObserverPhase::Preparing => "\x1b[33m", // Yellow
            ObserverPhase::Scanning => "\x1b[31m",  // Red
            ObserverPhase::Alert => "\x1b[35m",     // Magenta
        }
    }

    pub fn emoji(&self) -> &'static str {
        match self {
            ObserverPhase::Idle => "💤",
            ObserverPhase::Preparing => "👣",
            ObserverPhase::Scanning => "👁",
            ObserverPhase::Alert => "🚨",
        }
    }
}

impl std::fmt::Display for ObserverPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            ObserverPhase::Idle => "IDLE",
            ObserverPhase::Preparing => "PREPARING",
            ObserverPhase::Scanning => "SCANNING",
            ObserverPhase::Alert => "ALERT",
        };
        write!(f, "{}", name)
    }
}
