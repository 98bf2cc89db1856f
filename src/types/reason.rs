//! Reason codes for lifecycle, phase and arbitration decisions

use serde::{Deserialize, Serialize};

/// Reason codes attached to every session status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[allow(non_camel_case_types)]
pub enum ReasonCode {
    // =========================================================================
    // R001: Lifecycle
    // =========================================================================
    /// Waiting on the title screen
    R001_INTRO,
    /// Start refused, perception never came up
    R001_PERCEPTION_UNAVAILABLE,

    // =========================================================================
    // R002: Observer phase
    // =========================================================================
    /// Observer idle, safe to act
    R002_OBSERVER_IDLE,
    /// Observer approaching, warning window
    R002_OBSERVER_PREPARING,
    /// Observer scanning, any flagged action is caught
    R002_OBSERVER_SCANNING,

    // =========================================================================
    // R003: Arbitration
    // =========================================================================
    /// Flagged action held, score accruing
    R003_SCORING,
    /// Score already at ceiling
    R003_SCORE_CAPPED,
    /// Flagged action during a scan
    R003_CAUGHT,

    // =========================================================================
    // R004: Clock
    // =========================================================================
    /// Countdown reached zero
    R004_TIME_UP,
}

impl ReasonCode {
    /// Get the code string (for logging)
    pub fn code(&self) -> &'static str {
        match self {
            Self::R001_INTRO => "R001_INTRO",
            Self::R001_PERCEPTION_UNAVAILABLE => "R001_PERCEPTION_UNAVAILABLE",
            Self::R002_OBSERVER_IDLE => "R002_OBSERVER_IDLE",
            Self::R002_OBSERVER_PREPARING => "R002_OBSERVER_PREPARING",
            Self::R002_OBSERVER_SCANNING => "R002_OBSERVER_SCANNING",
            Self::R003_SCORING => "R003_SCORING",
            Self::R003_SCORE_CAPPED => "R003_SCORE_CAPPED",
            Self::R003_CAUGHT => "R003_CAUGHT",
            Self::R004_TIME_UP => "R004_TIME_UP",
        }
    }

    /// Get human-readable description
    pub fn description(&self) -> &'static str {
        match self {
            Self::R001_INTRO => "Waiting to start",
            Self::R001_PERCEPTION_UNAVAILABLE => "Camera or model unavailable",
            Self::R002_OBSERVER_IDLE => "Observer is not looking",
            Self::R002_OBSERVER_PREPARING => "Observer is approaching",
            Self::R002_OBSERVER_SCANNING => "Observer is scanning",
            Self::R003_SCORING => "Score rising",
            Self::R003_SCORE_CAPPED => "Score at maximum",
            Self::R003_CAUGHT => "Caught in the act",
            Self::R004_TIME_UP => "Time is up",
        }
    }
}

impl std::fmt::Display for ReasonCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.code(), self.description())
    }
}
