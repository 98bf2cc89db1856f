//! Session lifecycle and the arbitration loop
//!
//! State transitions:
//! - INTRO → PLAYING: start (refused while perception is unavailable)
//! - PLAYING → CAUGHT: flagged action on a score tick during SCANNING
//! - PLAYING → FINISHED: countdown reaches zero
//! - CAUGHT | FINISHED → PLAYING: restart (full reset)
//! - CAUGHT | FINISHED → INTRO: return to intro (full reset)
//!
//! Time only moves when the owner calls [`Session::advance`] (or a method
//! that advances first). Due events sharing an instant run in the order:
//! observer transitions, score/catch tick, clock tick.

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg64Mcg;
use tracing::{debug, info};

use crate::core::arbitrator::{Arbitrator, ClockTick, ScoreTick};
use crate::core::classifier::SignalClassifier;
use crate::core::config::GameConfig;
use crate::core::observer::{ObserverScheduler, PhaseTransition};
use crate::core::resolver::ActionResolver;
use crate::error::SessionError;
use crate::types::{
    BehaviorSignals, Grade, LandmarkSnapshot, ObserverPhase, PlayerAction, ReasonCode,
    SessionEvent, SessionState, SessionStatus,
};

/// One play-through plus the lifecycle around it
#[derive(Debug)]
pub struct Session {
    config: GameConfig,
    classifier: SignalClassifier,
    resolver: ActionResolver,
    state: SessionState,
    observer: ObserverScheduler,
    arbitrator: Arbitrator,
    /// Last committed action, read by every score tick
    action: PlayerAction,
    signals: BehaviorSignals,
    /// Feedback rolls
    rng: Pcg64Mcg,
    /// Bumped on every reset so each play-through draws a fresh schedule
    generation: u64,
    started_at_ms: u64,
    clock_ms: u64,
    perception_error: Option<String>,
    grade: Option<Grade>,
}

impl Session {
    /// Create a session waiting in INTRO
    pub fn new(config: GameConfig) -> Self {
        let classifier = SignalClassifier::with_config(config.classifier.clone());
        let arbitrator = Arbitrator::new(&config.session);
        let observer = ObserverScheduler::new(
            config.observer.clone(),
            config.content.warning_lines.clone(),
            seed_for(config.seed, 0),
        );
        let rng = Pcg64Mcg::seed_from_u64(seed_for(config.seed.map(|s| !s), 0));

        Self {
            config,
            classifier,
            resolver: ActionResolver::new(),
            state: SessionState::Intro,
            observer,
            arbitrator,
            action: PlayerAction::Idle,
            signals: BehaviorSignals::none(),
            rng,
            generation: 0,
            started_at_ms: 0,
            clock_ms: 0,
            perception_error: None,
            grade: None,
        }
    }

    // =========================================================================
    // Lifecycle
    // =========================================================================

    /// INTRO → PLAYING
    pub fn start(&mut self, now_ms: u64) -> Result<Vec<SessionEvent>, SessionError> {
        if self.state != SessionState::Intro {
            return Err(SessionError::InvalidTransition {
                from: self.state,
                action: "start",
            });
        }
        self.begin(now_ms)
    }

    /// CAUGHT | FINISHED → PLAYING with a full reset
    pub fn restart(&mut self, now_ms: u64) -> Result<Vec<SessionEvent>, SessionError> {
        if !self.state.is_terminal() {
            return Err(SessionError::InvalidTransition {
                from: self.state,
                action: "restart",
            });
        }
        self.begin(now_ms)
    }

    /// Start from INTRO or restart from a terminal state
    pub fn start_or_restart(&mut self, now_ms: u64) -> Result<Vec<SessionEvent>, SessionError> {
        match self.state {
            SessionState::Intro => self.start(now_ms),
            _ => self.restart(now_ms),
        }
    }

    /// CAUGHT | FINISHED → INTRO with a full reset
    pub fn return_to_intro(&mut self) -> Result<(), SessionError> {
        if !self.state.is_terminal() {
            return Err(SessionError::InvalidTransition {
                from: self.state,
                action: "return to intro",
            });
        }
        self.reset();
        self.state = SessionState::Intro;
        info!("session back at intro");
        Ok(())
    }

    /// Camera or model failed to come up. Blocks entering PLAYING.
    pub fn mark_perception_unavailable(&mut self, reason: impl Into<String>) {
        let reason = reason.into();
        info!(%reason, "perception unavailable");
        self.perception_error = Some(reason);
    }

    pub fn mark_perception_ready(&mut self) {
        self.perception_error = None;
    }

    pub fn perception_error(&self) -> Option<&str> {
        self.perception_error.as_deref()
    }

    fn begin(&mut self, now_ms: u64) -> Result<Vec<SessionEvent>, SessionError> {
        if let Some(reason) = &self.perception_error {
            return Err(SessionError::PerceptionUnavailable(reason.clone()));
        }
        self.reset();
        self.state = SessionState::Playing;
        self.started_at_ms = now_ms;
        self.clock_ms = now_ms;
        self.arbitrator.start(now_ms);
        self.observer.start(now_ms);
        info!(generation = self.generation, now_ms, "session started");
        Ok(vec![SessionEvent::SessionStarted])
    }

    /// Drop everything from the previous play-through, timers included
    fn reset(&mut self) {
        self.observer.cancel();
        self.arbitrator.stop();
        self.generation += 1;
        self.observer = ObserverScheduler::new(
            self.config.observer.clone(),
            self.config.content.warning_lines.clone(),
            seed_for(self.config.seed, self.generation),
        );
        self.arbitrator = Arbitrator::new(&self.config.session);
        self.rng = Pcg64Mcg::seed_from_u64(seed_for(self.config.seed.map(|s| !s), self.generation));
        self.action = PlayerAction::Idle;
        self.signals = BehaviorSignals::none();
        self.grade = None;
    }

    // =========================================================================
    // Frames
    // =========================================================================

    /// Classify a landmark snapshot and commit the resolved action
    pub fn observe(&mut self, now_ms: u64, snapshot: &LandmarkSnapshot) -> Vec<SessionEvent> {
        let signals = self.classifier.classify(snapshot);
        self.submit_signals(now_ms, signals)
    }

    /// A frame that could not be processed counts as "nothing detected"
    pub fn observe_failure(&mut self, now_ms: u64) -> Vec<SessionEvent> {
        self.submit_signals(now_ms, BehaviorSignals::none())
    }

    /// Advance to `now_ms` under the previous action, then commit the new one
    pub fn submit_signals(&mut self, now_ms: u64, signals: BehaviorSignals) -> Vec<SessionEvent> {
        let mut events = self.advance(now_ms);
        if self.state != SessionState::Playing {
            return events;
        }

        self.signals = signals;
        let action = self.resolver.resolve(&signals);
        if action != self.action {
            debug!(from = %self.action, to = %action, flags = %signals.flags(), "action changed");
            events.push(SessionEvent::ActionChanged {
                at_ms: self.elapsed_at(self.clock_ms),
                from: self.action,
                to: action,
            });
            self.action = action;
        }
        events
    }

    // =========================================================================
    // Clock
    // =========================================================================

    /// Run every observer transition and tick due at or before `now_ms`
    pub fn advance(&mut self, now_ms: u64) -> Vec<SessionEvent> {
        let mut events = Vec::new();
        if self.state != SessionState::Playing {
            return events;
        }

        while self.state == SessionState::Playing {
            let next = match (self.observer.next_deadline(), self.arbitrator.next_due()) {
                (Some(a), Some(b)) => a.min(b),
                (a, b) => match a.or(b) {
                    Some(t) => t,
                    None => break,
                },
            };
            if next > now_ms {
                break;
            }
            self.clock_ms = next;
            self.step(next, &mut events);
        }

        if self.state == SessionState::Playing {
            self.clock_ms = self.clock_ms.max(now_ms);
        }
        events
    }

    fn step(&mut self, at_ms: u64, events: &mut Vec<SessionEvent>) {
        for transition in self.observer.advance(at_ms) {
            self.push_transition(&transition, events);
        }

        if self.arbitrator.score_tick_due(at_ms) {
            match self.arbitrator.score_tick(self.action, self.observer.phase()) {
                ScoreTick::Caught { .. } => {
                    self.catch(at_ms, events);
                    return;
                }
                ScoreTick::Scored { score, .. } => {
                    if self.rng.random_bool(self.config.session.feedback_probability) {
                        events.push(SessionEvent::ScoreIncreased { score });
                    }
                }
                ScoreTick::Held => {}
            }
        }

        if self.arbitrator.clock_tick_due(at_ms) {
            if let ClockTick::Expired = self.arbitrator.clock_tick() {
                self.finish(at_ms, events);
            }
        }
    }

    fn push_transition(&self, transition: &PhaseTransition, events: &mut Vec<SessionEvent>) {
        events.push(SessionEvent::PhaseChanged {
            at_ms: self.elapsed_at(transition.at_ms),
            from: transition.from,
            to: transition.to,
        });
        match transition.to {
            ObserverPhase::Preparing => events.push(SessionEvent::WarningPhaseEntered {
                message: transition.warning.clone(),
            }),
            ObserverPhase::Scanning => events.push(SessionEvent::ScanPhaseEntered),
            ObserverPhase::Idle | ObserverPhase::Alert => {}
        }
    }

    /// PLAYING → CAUGHT, observer forced to ALERT, all timers cancelled
    fn catch(&mut self, at_ms: u64, events: &mut Vec<SessionEvent>) {
        self.state = SessionState::Caught;
        self.arbitrator.stop();
        if let Some(transition) = self.observer.alert(at_ms) {
            self.push_transition(&transition, events);
        }
        info!(
            at_ms = self.elapsed_at(at_ms),
            action = %self.action,
            score = self.arbitrator.score(),
            "caught"
        );
        events.push(SessionEvent::Caught {
            message: self.config.content.caught_message.clone(),
            score: self.arbitrator.score(),
        });
    }

    /// PLAYING → FINISHED, all timers cancelled
    fn finish(&mut self, at_ms: u64, events: &mut Vec<SessionEvent>) {
        self.state = SessionState::Finished;
        self.arbitrator.stop();
        self.observer.cancel();
        let score = self.arbitrator.score();
        let grade = Grade::from_score(score);
        self.grade = Some(grade);
        info!(at_ms = self.elapsed_at(at_ms), score, %grade, "time up");
        events.push(SessionEvent::Finished { score, grade });
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn phase(&self) -> ObserverPhase {
        self.observer.phase()
    }

    pub fn action(&self) -> PlayerAction {
        self.action
    }

    pub fn signals(&self) -> BehaviorSignals {
        self.signals
    }

    pub fn score(&self) -> f64 {
        self.arbitrator.score()
    }

    pub fn time_remaining_secs(&self) -> u32 {
        self.arbitrator.time_remaining_secs()
    }

    /// Milliseconds of session time processed so far
    pub fn elapsed_ms(&self) -> u64 {
        self.elapsed_at(self.clock_ms)
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    /// True while any observer or arbitrator timer is pending
    pub fn has_pending_timers(&self) -> bool {
        self.observer.is_armed() || self.arbitrator.is_running()
    }

    /// Observer scan cycles completed this play-through
    pub fn observer_cycles(&self) -> u64 {
        self.observer.cycles_completed()
    }

    pub fn status(&self) -> SessionStatus {
        SessionStatus {
            timestamp: chrono::Utc::now(),
            state: self.state,
            phase: self.phase(),
            action: self.action,
            score: self.score(),
            time_remaining_secs: self.time_remaining_secs(),
            elapsed_ms: self.elapsed_ms(),
            reason: self.reason(),
            grade: self.grade,
        }
    }

    fn reason(&self) -> ReasonCode {
        match self.state {
            SessionState::Intro if self.perception_error.is_some() => {
                ReasonCode::R001_PERCEPTION_UNAVAILABLE
            }
            SessionState::Intro => ReasonCode::R001_INTRO,
            SessionState::Caught => ReasonCode::R003_CAUGHT,
            SessionState::Finished => ReasonCode::R004_TIME_UP,
            SessionState::Playing if self.action.is_flagged() => {
                if self.arbitrator.is_capped() {
                    ReasonCode::R003_SCORE_CAPPED
                } else {
                    ReasonCode::R003_SCORING
                }
            }
            SessionState::Playing => match self.phase() {
                ObserverPhase::Preparing => ReasonCode::R002_OBSERVER_PREPARING,
                ObserverPhase::Scanning => ReasonCode::R002_OBSERVER_SCANNING,
                ObserverPhase::Idle | ObserverPhase::Alert => ReasonCode::R002_OBSERVER_IDLE,
            },
        }
    }

    fn elapsed_at(&self, at_ms: u64) -> u64 {
        at_ms.saturating_sub(self.started_at_ms)
    }
}

/// Fixed seeds give a reproducible schedule per play-through
fn seed_for(seed: Option<u64>, generation: u64) -> u64 {
    match seed {
        Some(seed) => seed.wrapping_add(generation.wrapping_mul(0x9E37_79B9_7F4A_7C15)),
        None => rand::random(),
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    const NOTE: BehaviorSignals = BehaviorSignals {
        looking_down: true,
        looking_right: false,
        hand_open: true,
    };

    const NEIGHBOR: BehaviorSignals = BehaviorSignals {
        looking_down: false,
        looking_right: true,
        hand_open: false,
    };

    /// Observer idles for exactly `wait_ms`, no random feedback
    fn session_with_wait(wait_ms: u64) -> Session {
        let mut config = GameConfig {
            seed: Some(7),
            ..GameConfig::default()
        };
        config.observer.min_interval_ms = wait_ms;
        config.observer.max_interval_ms = wait_ms;
        config.session.feedback_probability = 0.0;
        Session::new(config)
    }

    #[test]
    fn test_initial_state_is_intro() {
        let session = Session::new(GameConfig::default());
        assert_eq!(session.state(), SessionState::Intro);
        assert_eq!(session.score(), 0.0);
        assert_eq!(session.time_remaining_secs(), 60);
        assert!(!session.has_pending_timers());
    }

    #[test]
    fn test_start_only_from_intro() {
        let mut session = session_with_wait(5000);
        session.start(0).unwrap();
        assert_eq!(session.state(), SessionState::Playing);
        assert!(session.start(10).is_err());
        assert!(session.restart(10).is_err());
        assert!(session.return_to_intro().is_err());
    }

    #[test]
    fn test_frames_ignored_outside_playing() {
        let mut session = session_with_wait(5000);
        let events = session.submit_signals(1000, NOTE);
        assert!(events.is_empty());
        assert_eq!(session.action(), PlayerAction::Idle);
        assert!(session.advance(100_000).is_empty());
    }

    #[test]
    fn test_perception_failure_blocks_start() {
        let mut session = session_with_wait(5000);
        session.mark_perception_unavailable("camera denied");
        let err = session.start(0).unwrap_err();
        assert!(matches!(err, SessionError::PerceptionUnavailable(_)));
        assert_eq!(session.state(), SessionState::Intro);
        assert_eq!(session.status().reason, ReasonCode::R001_PERCEPTION_UNAVAILABLE);

        session.mark_perception_ready();
        assert!(session.start(0).is_ok());
    }

    #[test]
    fn test_scoring_while_observer_idle() {
        let mut session = session_with_wait(7000);
        session.start(0).unwrap();
        session.submit_signals(0, NOTE);
        session.advance(1000);
        assert_eq!(session.score(), 2.0);
        assert_eq!(session.time_remaining_secs(), 59);
    }

    #[test]
    fn test_caught_when_scanning() {
        let mut session = session_with_wait(4000);
        session.start(0).unwrap();
        // PREPARING at 4000, SCANNING at 6000
        session.advance(6000);
        assert_eq!(session.phase(), ObserverPhase::Scanning);

        let events = session.submit_signals(6050, NEIGHBOR);
        assert!(events.iter().all(|e| !matches!(e, SessionEvent::Caught { .. })));

        let events = session.advance(6100);
        assert_eq!(session.state(), SessionState::Caught);
        assert_eq!(session.phase(), ObserverPhase::Alert);
        assert!(!session.has_pending_timers());
        assert!(events.iter().any(|e| matches!(e, SessionEvent::Caught { .. })));
    }

    #[test]
    fn test_idle_during_scan_is_safe() {
        let mut session = session_with_wait(4000);
        session.start(0).unwrap();
        session.advance(7900);
        assert_eq!(session.state(), SessionState::Playing);
        assert_eq!(session.phase(), ObserverPhase::Scanning);
    }

    #[test]
    fn test_state_frozen_after_caught() {
        let mut session = session_with_wait(4000);
        session.start(0).unwrap();
        session.submit_signals(0, NOTE);
        session.advance(6000);
        assert_eq!(session.state(), SessionState::Caught);
        let score = session.score();
        let time = session.time_remaining_secs();

        assert!(session.advance(60_000).is_empty());
        assert!(session.submit_signals(60_000, BehaviorSignals::none()).is_empty());
        assert_eq!(session.score(), score);
        assert_eq!(session.time_remaining_secs(), time);
        assert_eq!(session.phase(), ObserverPhase::Alert);
    }

    #[test]
    fn test_finished_when_time_runs_out() {
        let mut session = session_with_wait(4000);
        session.start(0).unwrap();
        let events = session.advance(60_000);
        assert_eq!(session.state(), SessionState::Finished);
        assert_eq!(session.time_remaining_secs(), 0);
        assert!(!session.has_pending_timers());
        assert!(events
            .iter()
            .any(|e| matches!(e, SessionEvent::Finished { grade: Grade::Fail, .. })));
    }

    #[test]
    fn test_restart_resets_everything() {
        let mut session = session_with_wait(4000);
        session.start(0).unwrap();
        session.submit_signals(0, NOTE);
        session.advance(6000);
        assert_eq!(session.state(), SessionState::Caught);

        session.restart(100_000).unwrap();
        assert_eq!(session.state(), SessionState::Playing);
        assert_eq!(session.score(), 0.0);
        assert_eq!(session.time_remaining_secs(), 60);
        assert_eq!(session.phase(), ObserverPhase::Idle);
        assert_eq!(session.action(), PlayerAction::Idle);
        assert_eq!(session.elapsed_ms(), 0);

        // Nothing from the first play-through fires into the second
        session.advance(103_999);
        assert_eq!(session.phase(), ObserverPhase::Idle);
        session.advance(104_000);
        assert_eq!(session.phase(), ObserverPhase::Preparing);
    }

    #[test]
    fn test_return_to_intro() {
        let mut session = session_with_wait(4000);
        session.start(0).unwrap();
        session.advance(60_000);
        session.return_to_intro().unwrap();
        assert_eq!(session.state(), SessionState::Intro);
        assert_eq!(session.score(), 0.0);
        assert!(!session.has_pending_timers());
        assert!(session.status().grade.is_none());
    }

    #[test]
    fn test_action_changed_event() {
        let mut session = session_with_wait(5000);
        session.start(0).unwrap();
        let events = session.submit_signals(250, NEIGHBOR);
        assert_eq!(
            events,
            vec![SessionEvent::ActionChanged {
                at_ms: 250,
                from: PlayerAction::Idle,
                to: PlayerAction::ConsultingNeighbor,
            }]
        );
        assert!(session.submit_signals(300, NEIGHBOR).is_empty());
    }

    #[test]
    fn test_reason_codes() {
        let mut session = session_with_wait(4000);
        assert_eq!(session.status().reason, ReasonCode::R001_INTRO);
        session.start(0).unwrap();
        assert_eq!(session.status().reason, ReasonCode::R002_OBSERVER_IDLE);
        session.advance(4000);
        assert_eq!(session.status().reason, ReasonCode::R002_OBSERVER_PREPARING);
        session.submit_signals(4000, NOTE);
        assert_eq!(session.status().reason, ReasonCode::R003_SCORING);
    }

    fn score_cues(events: &[SessionEvent]) -> Vec<f64> {
        events
            .iter()
            .filter_map(|e| match e {
                SessionEvent::ScoreIncreased { score } => Some(*score),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_seeded_restart_repeats_feedback_cadence() {
        let mut config = GameConfig {
            seed: Some(21),
            ..GameConfig::default()
        };
        config.observer.min_interval_ms = 120_000;
        config.observer.max_interval_ms = 120_000;
        config.session.feedback_probability = 0.3;

        let mut first = Session::new(config.clone());
        first.start(0).unwrap();
        first.submit_signals(0, NOTE);
        first.advance(60_000);
        first.restart(70_000).unwrap();
        first.submit_signals(70_000, NOTE);
        let replayed = score_cues(&first.advance(80_000));

        // A fresh session that jumps straight to the same generation
        let mut second = Session::new(config);
        second.start(0).unwrap();
        second.advance(60_000);
        second.restart(70_000).unwrap();
        second.submit_signals(70_000, NOTE);
        let expected = score_cues(&second.advance(80_000));

        assert!(!expected.is_empty());
        assert_eq!(replayed, expected);
    }
}
