//! Cribwatch: exam sneak simulator core
//!
//! Camera landmarks → SignalClassifier → ActionResolver → Session,
//! with an ObserverScheduler running its own randomized scan cycle.

pub mod core;
pub mod error;
pub mod types;

// =============================================================================
// SESSION [C]
// =============================================================================

/// Length of one play-through (seconds)
pub const SESSION_DURATION_SECS: u32 = 60;

/// Score awarded per score tick while a flagged action is held
/// 0.2 per 100ms = 2 points per second
pub const SCORE_PER_TICK: f64 = 0.2;

/// Score ceiling
pub const MAX_SCORE: f64 = 100.0;

/// Score / catch tick period (milliseconds)
pub const SCORE_TICK_MS: u64 = 100;

/// Countdown tick period (milliseconds)
pub const CLOCK_TICK_MS: u64 = 1000;

/// Chance that a score tick also emits positive feedback
pub const SCORE_FEEDBACK_PROBABILITY: f64 = 0.1;

// =============================================================================
// OBSERVER [C]
// =============================================================================

/// Shortest idle wait between scans (milliseconds)
pub const OBSERVER_MIN_INTERVAL_MS: u64 = 4000;

/// Longest idle wait between scans (milliseconds)
pub const OBSERVER_MAX_INTERVAL_MS: u64 = 7000;

/// Warning window before a scan (milliseconds)
pub const OBSERVER_PREPARE_MS: u64 = 2000;

/// Active scan window (milliseconds)
pub const OBSERVER_SCAN_MS: u64 = 2000;

/// Chance that entering the warning window emits a voice line
pub const OBSERVER_WARNING_PROBABILITY: f64 = 0.5;

// =============================================================================
// CLASSIFIER THRESHOLDS [C] - normalized image units
// =============================================================================

/// Nose must sit this far below the eye line to count as looking down
pub const LOOK_DOWN_MARGIN: f64 = 0.05;

/// Nose-to-right-eye distance must be under this fraction of nose-to-left-eye
pub const LOOK_RIGHT_RATIO: f64 = 0.7;

/// Index-to-pinky fingertip spread above which a hand counts as open
pub const HAND_OPEN_SPREAD: f64 = 0.12;

// =============================================================================
// LANDMARK INDICES [C] - face mesh (468 points) and hand (21 points)
// =============================================================================

pub const FACE_NOSE_TIP: usize = 1;
pub const FACE_LEFT_EYE: usize = 33;
pub const FACE_RIGHT_EYE: usize = 263;
pub const HAND_INDEX_TIP: usize = 8;
pub const HAND_PINKY_TIP: usize = 20;

// =============================================================================
// VERSION
// =============================================================================

pub const VERSION: &str = "1.0.0";
