//! Shared builders for integration tests
#![allow(dead_code)]

use cribwatch::core::GameConfig;
use cribwatch::types::{BehaviorSignals, Landmark, LandmarkSnapshot};
use cribwatch::{FACE_LEFT_EYE, FACE_NOSE_TIP, FACE_RIGHT_EYE, HAND_INDEX_TIP, HAND_PINKY_TIP};

pub const NOTE: BehaviorSignals = BehaviorSignals {
    looking_down: true,
    looking_right: false,
    hand_open: true,
};

pub const NEIGHBOR: BehaviorSignals = BehaviorSignals {
    looking_down: false,
    looking_right: true,
    hand_open: false,
};

pub const IDLE: BehaviorSignals = BehaviorSignals {
    looking_down: false,
    looking_right: false,
    hand_open: false,
};

/// Seeded config whose observer always idles exactly `wait_ms`
pub fn fixed_config(wait_ms: u64) -> GameConfig {
    let mut config = GameConfig {
        seed: Some(11),
        ..GameConfig::default()
    };
    config.observer.min_interval_ms = wait_ms;
    config.observer.max_interval_ms = wait_ms;
    config.session.feedback_probability = 0.0;
    config
}

/// 468-point face with the three landmarks the classifier reads
pub fn face(nose: (f64, f64), left_eye: (f64, f64), right_eye: (f64, f64)) -> Vec<Landmark> {
    let mut points = vec![Landmark::new(0.5, 0.5); 468];
    points[FACE_NOSE_TIP] = Landmark::new(nose.0, nose.1);
    points[FACE_LEFT_EYE] = Landmark::new(left_eye.0, left_eye.1);
    points[FACE_RIGHT_EYE] = Landmark::new(right_eye.0, right_eye.1);
    points
}

pub fn neutral_face() -> Vec<Landmark> {
    face((0.50, 0.42), (0.40, 0.40), (0.60, 0.40))
}

pub fn face_down() -> Vec<Landmark> {
    face((0.50, 0.48), (0.40, 0.40), (0.60, 0.40))
}

pub fn face_right() -> Vec<Landmark> {
    face((0.56, 0.42), (0.40, 0.40), (0.60, 0.40))
}

/// 21-point hand with the given index-to-pinky spread
pub fn hand(spread: f64) -> Vec<Landmark> {
    let mut points = vec![Landmark::new(0.3, 0.7); 21];
    points[HAND_INDEX_TIP] = Landmark::new(0.3, 0.7);
    points[HAND_PINKY_TIP] = Landmark::new(0.3 + spread, 0.7);
    points
}

pub fn note_frame(timestamp_ms: u64) -> LandmarkSnapshot {
    LandmarkSnapshot::empty(timestamp_ms)
        .with_face(face_down())
        .with_hand(hand(0.2))
}

pub fn neighbor_frame(timestamp_ms: u64) -> LandmarkSnapshot {
    LandmarkSnapshot::empty(timestamp_ms).with_face(face_right())
}

pub fn idle_frame(timestamp_ms: u64) -> LandmarkSnapshot {
    LandmarkSnapshot::empty(timestamp_ms).with_face(neutral_face())
}
