//! Landmark data produced by the perception collaborator

use serde::{Deserialize, Serialize};

/// A single keypoint. `x`/`y` are normalized to [0, 1], `y` grows downward.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Landmark {
    pub x: f64,
    pub y: f64,
    /// Relative depth, unused by the classifier
    #[serde(default)]
    pub z: f64,
}

impl Landmark {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y, z: 0.0 }
    }

    /// Planar (x, y) distance, ignoring depth
    pub fn planar_distance(&self, other: &Landmark) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }
}

/// One processed frame: zero-or-one face, zero-or-more hands.
///
/// Every hand list is indexed identically (21-point hand model).
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct LandmarkSnapshot {
    /// Capture time in milliseconds since session start
    #[serde(default)]
    pub timestamp_ms: u64,
    #[serde(default)]
    pub face: Option<Vec<Landmark>>,
    #[serde(default)]
    pub hands: Vec<Vec<Landmark>>,
}

impl LandmarkSnapshot {
    /// A frame where nothing was detected
    pub fn empty(timestamp_ms: u64) -> Self {
        Self {
            timestamp_ms,
            face: None,
            hands: Vec::new(),
        }
    }

    pub fn with_face(mut self, face: Vec<Landmark>) -> Self {
        self.face = Some(face);
        self
    }

    pub fn with_hand(mut self, hand: Vec<Landmark>) -> Self {
        self.hands.push(hand);
        self
    }
}
