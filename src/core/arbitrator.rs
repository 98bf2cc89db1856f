//! Session Arbitrator: score, catch and countdown ticks
//!
//! Two periodic tasks while PLAYING:
//! - score tick (every score_tick_ms): score increment, then catch check
//! - clock tick (every clock_tick_ms): countdown, expiry at zero
//!
//! The player action and observer phase are passed in as values at each
//! tick; the arbitrator never reads them from shared state.

use tracing::debug;

use crate::core::config::SessionConfig;
use crate::types::{ObserverPhase, PlayerAction};

/// Score is held in hundredths so repeated 0.2 steps sum exactly
const SCORE_SCALE: f64 = 100.0;

/// Smallest nonzero score step the arbitrator can represent
pub const SCORE_RESOLUTION: f64 = 1.0 / SCORE_SCALE;

/// Result of one score tick
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ScoreTick {
    /// Flagged action during SCANNING, score includes this tick
    Caught { score: f64 },
    /// Flagged action, score went up (or sat at the cap)
    Scored { score: f64, capped: bool },
    /// Player idle, nothing changed
    Held,
}

/// Result of one clock tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClockTick {
    Running { remaining_secs: u32 },
    Expired,
}

/// Authoritative score and countdown
#[derive(Debug, Clone)]
pub struct Arbitrator {
    score_tick_ms: u64,
    clock_tick_ms: u64,
    per_tick: u32,
    max_score: u32,
    duration_secs: u32,
    score: u32,
    time_remaining_secs: u32,
    /// Pending periodic tasks; `None` once stopped
    next_score_tick: Option<u64>,
    next_clock_tick: Option<u64>,
}

impl Arbitrator {
    /// Create a stopped arbitrator with full time and zero score
    pub fn new(config: &SessionConfig) -> Self {
        Self {
            score_tick_ms: config.score_tick_ms,
            clock_tick_ms: config.clock_tick_ms,
            per_tick: to_hundredths(config.score_per_tick),
            max_score: to_hundredths(config.max_score),
            duration_secs: config.duration_secs,
            score: 0,
            time_remaining_secs: config.duration_secs,
            next_score_tick: None,
            next_clock_tick: None,
        }
    }

    /// Reset score and time, arm both periodic tasks
    pub fn start(&mut self, now_ms: u64) {
        self.score = 0;
        self.time_remaining_secs = self.duration_secs;
        self.next_score_tick = Some(now_ms + self.score_tick_ms);
        self.next_clock_tick = Some(now_ms + self.clock_tick_ms);
    }

    /// Cancel both periodic tasks; score and time freeze. Idempotent.
    pub fn stop(&mut self) {
        self.next_score_tick = None;
        self.next_clock_tick = None;
    }

    pub fn is_running(&self) -> bool {
        self.next_score_tick.is_some() || self.next_clock_tick.is_some()
    }

    /// Earliest pending tick
    pub fn next_due(&self) -> Option<u64> {
        match (self.next_score_tick, self.next_clock_tick) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        }
    }

    pub fn score_tick_due(&self, now_ms: u64) -> bool {
        self.next_score_tick.is_some_and(|t| t <= now_ms)
    }

    pub fn clock_tick_due(&self, now_ms: u64) -> bool {
        self.next_clock_tick.is_some_and(|t| t <= now_ms)
    }

    /// Score first, then the catch check. A catching tick still scores.
    pub fn score_tick(&mut self, action: PlayerAction, phase: ObserverPhase) -> ScoreTick {
        let Some(at) = self.next_score_tick else {
            return ScoreTick::Held;
        };
        self.next_score_tick = Some(at + self.score_tick_ms);

        if !action.is_flagged() {
            return ScoreTick::Held;
        }

        let capped = self.score >= self.max_score;
        self.score = self.score.saturating_add(self.per_tick).min(self.max_score);

        if phase == ObserverPhase::Scanning {
            debug!(at, %action, score = self.score(), "flagged action during scan");
            return ScoreTick::Caught { score: self.score() };
        }
        ScoreTick::Scored {
            score: self.score(),
            capped,
        }
    }

    /// Decrement the countdown by one second
    pub fn clock_tick(&mut self) -> ClockTick {
        let Some(at) = self.next_clock_tick else {
            return ClockTick::Running {
                remaining_secs: self.time_remaining_secs,
            };
        };
        self.next_clock_tick = Some(at + self.clock_tick_ms);

        self.time_remaining_secs = self.time_remaining_secs.saturating_sub(1);
        if self.time_remaining_secs == 0 {
            debug!(at, "countdown expired");
            ClockTick::Expired
        } else {
            ClockTick::Running {
                remaining_secs: self.time_remaining_secs,
            }
        }
    }

    pub fn score(&self) -> f64 {
        self.score as f64 / SCORE_SCALE
    }

    pub fn is_capped(&self) -> bool {
        self.score >= self.max_score
    }

    pub fn time_remaining_secs(&self) -> u32 {
        self.time_remaining_secs
    }
}

pub(crate) fn to_hundredths(value: f64) -> u32 {
    (value * SCORE_SCALE).round().max(0.0) as u32
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn running() -> Arbitrator {
        let mut arbitrator = Arbitrator::new(&SessionConfig::default());
        arbitrator.start(0);
        arbitrator
    }

    #[test]
    fn test_idle_never_scores() {
        let mut arbitrator = running();
        for _ in 0..100 {
            assert_eq!(
                arbitrator.score_tick(PlayerAction::Idle, ObserverPhase::Scanning),
                ScoreTick::Held
            );
        }
        assert_eq!(arbitrator.score(), 0.0);
    }

    #[test]
    fn test_ten_ticks_score_exactly_two() {
        let mut arbitrator = running();
        for _ in 0..10 {
            arbitrator.score_tick(PlayerAction::UsingHiddenNote, ObserverPhase::Idle);
        }
        assert_eq!(arbitrator.score(), 2.0);
    }

    #[test]
    fn test_score_clamped_at_max() {
        let mut arbitrator = running();
        for _ in 0..1000 {
            arbitrator.score_tick(PlayerAction::ConsultingNeighbor, ObserverPhase::Preparing);
            assert!(arbitrator.score() <= 100.0);
        }
        assert_eq!(arbitrator.score(), 100.0);
        assert!(arbitrator.is_capped());
        assert_eq!(
            arbitrator.score_tick(PlayerAction::ConsultingNeighbor, ObserverPhase::Idle),
            ScoreTick::Scored {
                score: 100.0,
                capped: true
            }
        );
    }

    #[test]
    fn test_caught_tick_still_scores() {
        let mut arbitrator = running();
        arbitrator.score_tick(PlayerAction::UsingHiddenNote, ObserverPhase::Idle);
        let tick = arbitrator.score_tick(PlayerAction::UsingHiddenNote, ObserverPhase::Scanning);
        assert_eq!(tick, ScoreTick::Caught { score: 0.4 });
        assert_eq!(arbitrator.score(), 0.4);
    }

    #[test]
    fn test_caught_at_cap_stays_at_cap() {
        let mut arbitrator = running();
        for _ in 0..600 {
            arbitrator.score_tick(PlayerAction::UsingHiddenNote, ObserverPhase::Idle);
        }
        let tick = arbitrator.score_tick(PlayerAction::ConsultingNeighbor, ObserverPhase::Scanning);
        assert_eq!(tick, ScoreTick::Caught { score: 100.0 });
    }

    #[test]
    fn test_clock_expires_after_duration() {
        let mut arbitrator = running();
        for remaining in (1..60).rev() {
            assert_eq!(
                arbitrator.clock_tick(),
                ClockTick::Running {
                    remaining_secs: remaining
                }
            );
        }
        assert_eq!(arbitrator.clock_tick(), ClockTick::Expired);
        assert_eq!(arbitrator.time_remaining_secs(), 0);
    }

    #[test]
    fn test_tick_schedule() {
        let mut arbitrator = running();
        assert_eq!(arbitrator.next_due(), Some(100));
        assert!(!arbitrator.score_tick_due(99));
        assert!(arbitrator.score_tick_due(100));
        arbitrator.score_tick(PlayerAction::Idle, ObserverPhase::Idle);
        assert_eq!(arbitrator.next_due(), Some(200));
        assert!(arbitrator.clock_tick_due(1000));
    }

    #[test]
    fn test_stop_freezes_everything() {
        let mut arbitrator = running();
        arbitrator.score_tick(PlayerAction::UsingHiddenNote, ObserverPhase::Idle);
        arbitrator.stop();
        arbitrator.stop();
        assert!(!arbitrator.is_running());
        assert_eq!(arbitrator.next_due(), None);
        assert_eq!(
            arbitrator.score_tick(PlayerAction::UsingHiddenNote, ObserverPhase::Idle),
            ScoreTick::Held
        );
        assert_eq!(arbitrator.score(), 0.2);
        assert_eq!(arbitrator.time_remaining_secs(), 60);
    }
}
