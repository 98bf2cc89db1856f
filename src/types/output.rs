//! Session status for terminal and API display

use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc};
use crate::types::{Grade, ObserverPhase, PlayerAction, ReasonCode, SessionState};

/// Point-in-time view of a session
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionStatus {
    /// Wall-clock time the status was taken
    pub timestamp: DateTime<Utc>,
    pub state: SessionState,
    pub phase: ObserverPhase,
    pub action: PlayerAction,
    pub score: f64,
    pub time_remaining_secs: u32,
    /// Session clock (milliseconds since start)
    pub elapsed_ms: u64,
    pub reason: ReasonCode,
    /// Set once FINISHED
    #[serde(skip_serializing_if = "Option::is_none")]
    pub grade: Option<Grade>,
}

impl SessionStatus {
    /// Format for terminal display (with colors)
    pub fn to_terminal_string(&self) -> String {
        let color = self.phase.color_code();
        let reset = SessionState::color_reset();

        format!(
            "{}{} t={:>2}s | score={:>5.1} | action={} | observer={} | {}{}",
            color,
            self.phase.emoji(),
            self.time_remaining_secs,
            self.score,
            self.action,
            self.phase,
            self.reason.code(),
            reset
        )
    }

    /// Format for parseable output (no colors)
    pub fn to_parseable_string(&self) -> String {
        format!(
            "state={} | t={}s | score={:.1} | action={} | observer={} | reason={}",
            self.state,
            self.time_remaining_secs,
            self.score,
            self.action,
            self.phase,
            self.reason.code()
        )
    }
}
