//! Notifications emitted by the session for presentation/audio

use serde::{Deserialize, Serialize};

use crate::types::{Grade, ObserverPhase, PlayerAction};

/// Fire-and-forget notification. Nothing in the core reads these back.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum SessionEvent {
    SessionStarted,
    PhaseChanged {
        at_ms: u64,
        from: ObserverPhase,
        to: ObserverPhase,
    },
    ActionChanged {
        at_ms: u64,
        from: PlayerAction,
        to: PlayerAction,
    },
    /// Entering the warning window, optionally with a spoken line
    WarningPhaseEntered { message: Option<String> },
    /// Entering an active scan (alert sound)
    ScanPhaseEntered,
    /// Occasional positive feedback while scoring
    ScoreIncreased { score: f64 },
    Caught { message: String, score: f64 },
    Finished { score: f64, grade: Grade },
}
