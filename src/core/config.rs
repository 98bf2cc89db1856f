//! Game configuration
//!
//! Every field defaults to the crate-root constants, so a config file only
//! needs the values it overrides.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::core::arbitrator::{to_hundredths, SCORE_RESOLUTION};
use crate::error::ConfigError;
use crate::{
    CLOCK_TICK_MS, FACE_LEFT_EYE, FACE_NOSE_TIP, FACE_RIGHT_EYE, HAND_INDEX_TIP,
    HAND_OPEN_SPREAD, HAND_PINKY_TIP, LOOK_DOWN_MARGIN, LOOK_RIGHT_RATIO, MAX_SCORE,
    OBSERVER_MAX_INTERVAL_MS, OBSERVER_MIN_INTERVAL_MS, OBSERVER_PREPARE_MS, OBSERVER_SCAN_MS,
    OBSERVER_WARNING_PROBABILITY, SCORE_FEEDBACK_PROBABILITY, SCORE_PER_TICK, SCORE_TICK_MS,
    SESSION_DURATION_SECS,
};

/// Top-level configuration
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub session: SessionConfig,
    pub observer: ObserverConfig,
    pub classifier: ClassifierConfig,
    pub content: ContentConfig,
    /// Fixes every random draw (observer schedule, warning lines, feedback)
    pub seed: Option<u64>,
}

/// Arbitration timing and scoring
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    pub duration_secs: u32,
    pub score_per_tick: f64,
    pub max_score: f64,
    pub score_tick_ms: u64,
    pub clock_tick_ms: u64,
    pub feedback_probability: f64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            duration_secs: SESSION_DURATION_SECS,
            score_per_tick: SCORE_PER_TICK,
            max_score: MAX_SCORE,
            score_tick_ms: SCORE_TICK_MS,
            clock_tick_ms: CLOCK_TICK_MS,
            feedback_probability: SCORE_FEEDBACK_PROBABILITY,
        }
    }
}

/// Observer scan cycle timing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ObserverConfig {
    pub min_interval_ms: u64,
    pub max_interval_ms: u64,
    pub prepare_ms: u64,
    pub scan_ms: u64,
    pub warning_probability: f64,
}

impl Default for ObserverConfig {
    fn default() -> Self {
        Self {
            min_interval_ms: OBSERVER_MIN_INTERVAL_MS,
            max_interval_ms: OBSERVER_MAX_INTERVAL_MS,
            prepare_ms: OBSERVER_PREPARE_MS,
            scan_ms: OBSERVER_SCAN_MS,
            warning_probability: OBSERVER_WARNING_PROBABILITY,
        }
    }
}

/// Classifier thresholds and landmark indices
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassifierConfig {
    pub look_down_margin: f64,
    pub look_right_ratio: f64,
    pub hand_open_spread: f64,
    pub nose_index: usize,
    pub left_eye_index: usize,
    pub right_eye_index: usize,
    pub index_tip_index: usize,
    pub pinky_tip_index: usize,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            look_down_margin: LOOK_DOWN_MARGIN,
            look_right_ratio: LOOK_RIGHT_RATIO,
            hand_open_spread: HAND_OPEN_SPREAD,
            nose_index: FACE_NOSE_TIP,
            left_eye_index: FACE_LEFT_EYE,
            right_eye_index: FACE_RIGHT_EYE,
            index_tip_index: HAND_INDEX_TIP,
            pinky_tip_index: HAND_PINKY_TIP,
        }
    }
}

/// Lines handed to the presentation layer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContentConfig {
    pub warning_lines: Vec<String>,
    pub caught_message: String,
}

impl Default for ContentConfig {
    fn default() -> Self {
        Self {
            warning_lines: [
                "Eyes on your own paper!",
                "No looking around, no funny business!",
                "You in the white shirt, head up!",
                "Only a few minutes left, get a move on.",
                "Next one I see glancing around loses their paper!",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
            caught_message: "You've been caught!".to_string(),
        }
    }
}

impl GameConfig {
    /// Load and validate a JSON config file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let data = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config: GameConfig =
            serde_json::from_str(&data).map_err(|source| ConfigError::Parse {
                path: path.to_path_buf(),
                source,
            })?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values the engines cannot run with
    pub fn validate(&self) -> Result<(), ConfigError> {
        let s = &self.session;
        if s.duration_secs == 0 {
            return Err(invalid("session.duration_secs", "must be positive"));
        }
        if s.score_tick_ms == 0 {
            return Err(invalid("session.score_tick_ms", "must be positive"));
        }
        if s.clock_tick_ms == 0 {
            return Err(invalid("session.clock_tick_ms", "must be positive"));
        }
        if !(s.max_score > 0.0) {
            return Err(invalid("session.max_score", "must be positive"));
        }
        if !(s.score_per_tick >= 0.0) {
            return Err(invalid("session.score_per_tick", "must not be negative"));
        }
        for (field, value) in [
            ("session.score_per_tick", s.score_per_tick),
            ("session.max_score", s.max_score),
        ] {
            if value > 0.0 && to_hundredths(value) == 0 {
                return Err(invalid(
                    field,
                    format!("{} is below the score resolution {}", value, SCORE_RESOLUTION),
                ));
            }
        }
        check_probability("session.feedback_probability", s.feedback_probability)?;

        let o = &self.observer;
        if o.min_interval_ms > o.max_interval_ms {
            return Err(invalid(
                "observer.min_interval_ms",
                format!("{} exceeds max_interval_ms {}", o.min_interval_ms, o.max_interval_ms),
            ));
        }
        if o.prepare_ms == 0 {
            return Err(invalid("observer.prepare_ms", "must be positive"));
        }
        if o.scan_ms == 0 {
            return Err(invalid("observer.scan_ms", "must be positive"));
        }
        check_probability("observer.warning_probability", o.warning_probability)?;

        let c = &self.classifier;
        for (field, value) in [
            ("classifier.look_down_margin", c.look_down_margin),
            ("classifier.look_right_ratio", c.look_right_ratio),
            ("classifier.hand_open_spread", c.hand_open_spread),
        ] {
            if !(value >= 0.0) {
                return Err(invalid(field, "must not be negative"));
            }
        }
        Ok(())
    }
}

fn check_probability(field: &'static str, value: f64) -> Result<(), ConfigError> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(invalid(field, format!("{} is not within [0, 1]", value)))
    }
}

fn invalid(field: &'static str, reason: impl Into<String>) -> ConfigError {
    ConfigError::Invalid {
        field,
        reason: reason.into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults_match_constants() {
        let config = GameConfig::default();
        assert_eq!(config.session.duration_secs, 60);
        assert_eq!(config.session.score_tick_ms, 100);
        assert_eq!(config.observer.min_interval_ms, 4000);
        assert_eq!(config.observer.max_interval_ms, 7000);
        assert_eq!(config.classifier.right_eye_index, 263);
        assert_eq!(config.content.warning_lines.len(), 5);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"observer": {{"scan_ms": 3000}}, "seed": 7}}"#).unwrap();

        let config = GameConfig::load(file.path()).unwrap();
        assert_eq!(config.observer.scan_ms, 3000);
        assert_eq!(config.observer.prepare_ms, OBSERVER_PREPARE_MS);
        assert_eq!(config.seed, Some(7));
    }

    #[test]
    fn test_malformed_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "{{ not json").unwrap();

        let err = GameConfig::load(file.path()).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn test_missing_file() {
        let err = GameConfig::load("/definitely/not/here.json").unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }

    #[test]
    fn test_inverted_interval_rejected() {
        let mut config = GameConfig::default();
        config.observer.min_interval_ms = 8000;
        let err = config.validate().unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { field: "observer.min_interval_ms", .. }));
    }

    #[test]
    fn test_probability_out_of_range_rejected() {
        let mut config = GameConfig::default();
        config.observer.warning_probability = 1.5;
        assert!(config.validate().is_err());

        let mut config = GameConfig::default();
        config.session.feedback_probability = f64::NAN;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_score_step_below_resolution_rejected() {
        let mut config = GameConfig::default();
        config.session.score_per_tick = 0.004;
        let err = config.validate().unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { field: "session.score_per_tick", .. }));

        config.session.score_per_tick = 0.01;
        assert!(config.validate().is_ok());

        // Zero is a deliberate "no scoring" setting
        config.session.score_per_tick = 0.0;
        assert!(config.validate().is_ok());

        config.session.max_score = 0.001;
        assert!(config.validate().is_err());
    }
}
