//! Signal Classifier: landmark snapshot → behaviour signals
//!
//! Stateless. Each signal is an independent threshold test in normalized
//! image units, so results do not depend on camera resolution.

use crate::core::config::ClassifierConfig;
use crate::types::{BehaviorSignals, Landmark, LandmarkSnapshot};

/// Reduces one frame of landmarks to discrete signals
#[derive(Debug, Clone, Default)]
pub struct SignalClassifier {
    config: ClassifierConfig,
}

impl SignalClassifier {
    /// Create classifier with default thresholds
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: ClassifierConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ClassifierConfig {
        &self.config
    }

    /// Classify a snapshot. Missing face or hands yield `false` for the
    /// signals that depend on them.
    pub fn classify(&self, snapshot: &LandmarkSnapshot) -> BehaviorSignals {
        let (looking_down, looking_right) = snapshot
            .face
            .as_deref()
            .map(|face| (self.looking_down(face), self.looking_right(face)))
            .unwrap_or((false, false));

        BehaviorSignals {
            looking_down,
            looking_right,
            hand_open: self.any_hand_open(&snapshot.hands),
        }
    }

    /// Nose below the mean eye line by more than the margin
    fn looking_down(&self, face: &[Landmark]) -> bool {
        let Some((nose, left, right)) = self.face_points(face) else {
            return false;
        };
        let eye_y = (left.y + right.y) / 2.0;
        nose.y > eye_y + self.config.look_down_margin
    }

    /// Yaw approximation: nose much closer (horizontally) to the right eye
    /// than to the left one in the mirrored view
    fn looking_right(&self, face: &[Landmark]) -> bool {
        let Some((nose, left, right)) = self.face_points(face) else {
            return false;
        };
        let to_left = (nose.x - left.x).abs();
        let to_right = (nose.x - right.x).abs();
        to_right < to_left * self.config.look_right_ratio
    }

    /// Any hand counts; left and right are not distinguished
    fn any_hand_open(&self, hands: &[Vec<Landmark>]) -> bool {
        hands.iter().any(|hand| {
            match (
                hand.get(self.config.index_tip_index),
                hand.get(self.config.pinky_tip_index),
            ) {
                (Some(index), Some(pinky)) => {
                    index.planar_distance(pinky) > self.config.hand_open_spread
                }
                _ => false,
            }
        })
    }

    fn face_points<'a>(
        &self,
        face: &'a [Landmark],
    ) -> Option<(&'a Landmark, &'a Landmark, &'a Landmark)> {
        Some((
            face.get(self.config.nose_index)?,
            face.get(self.config.left_eye_index)?,
            face.get(self.config.right_eye_index)?,
        ))
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{FACE_LEFT_EYE, FACE_NOSE_TIP, FACE_RIGHT_EYE, HAND_INDEX_TIP, HAND_PINKY_TIP};

    fn face(nose: (f64, f64), left: (f64, f64), right: (f64, f64)) -> Vec<Landmark> {
        let mut points = vec![Landmark::new(0.5, 0.5); FACE_RIGHT_EYE + 1];
        points[FACE_NOSE_TIP] = Landmark::new(nose.0, nose.1);
        points[FACE_LEFT_EYE] = Landmark::new(left.0, left.1);
        points[FACE_RIGHT_EYE] = Landmark::new(right.0, right.1);
        points
    }

    fn hand(spread: f64) -> Vec<Landmark> {
        let mut points = vec![Landmark::new(0.3, 0.6); HAND_PINKY_TIP + 1];
        points[HAND_INDEX_TIP] = Landmark::new(0.3, 0.6);
        points[HAND_PINKY_TIP] = Landmark::new(0.3 + spread, 0.6);
        points
    }

    #[test]
    fn test_empty_snapshot_is_all_false() {
        let classifier = SignalClassifier::new();
        let signals = classifier.classify(&LandmarkSnapshot::empty(0));
        assert_eq!(signals, BehaviorSignals::none());
    }

    #[test]
    fn test_neutral_face() {
        let classifier = SignalClassifier::new();
        let snapshot = LandmarkSnapshot::empty(0)
            .with_face(face((0.50, 0.42), (0.40, 0.40), (0.60, 0.40)));
        assert!(classifier.classify(&snapshot).is_none());
    }

    #[test]
    fn test_looking_down() {
        let classifier = SignalClassifier::new();
        let snapshot = LandmarkSnapshot::empty(0)
            .with_face(face((0.50, 0.47), (0.40, 0.40), (0.60, 0.40)));
        let signals = classifier.classify(&snapshot);
        assert!(signals.looking_down);
        assert!(!signals.looking_right);
    }

    #[test]
    fn test_looking_down_needs_margin() {
        let classifier = SignalClassifier::new();
        // 0.04 below the eye line, margin is 0.05
        let snapshot = LandmarkSnapshot::empty(0)
            .with_face(face((0.50, 0.44), (0.40, 0.40), (0.60, 0.40)));
        assert!(!classifier.classify(&snapshot).looking_down);
    }

    #[test]
    fn test_looking_right() {
        let classifier = SignalClassifier::new();
        // 0.05 to the right eye vs 0.15 to the left: ratio 0.33
        let snapshot = LandmarkSnapshot::empty(0)
            .with_face(face((0.55, 0.42), (0.40, 0.40), (0.60, 0.40)));
        assert!(classifier.classify(&snapshot).looking_right);
    }

    #[test]
    fn test_looking_left_is_not_right() {
        let classifier = SignalClassifier::new();
        let snapshot = LandmarkSnapshot::empty(0)
            .with_face(face((0.45, 0.42), (0.40, 0.40), (0.60, 0.40)));
        assert!(!classifier.classify(&snapshot).looking_right);
    }

    #[test]
    fn test_resolution_independent() {
        let classifier = SignalClassifier::new();
        // Same proportions, face half the size in frame
        let small = LandmarkSnapshot::empty(0)
            .with_face(face((0.525, 0.46), (0.45, 0.45), (0.55, 0.45)));
        let signals = classifier.classify(&small);
        assert!(!signals.looking_down);
        assert!(signals.looking_right);
    }

    #[test]
    fn test_open_hand() {
        let classifier = SignalClassifier::new();
        let snapshot = LandmarkSnapshot::empty(0).with_hand(hand(0.15));
        assert!(classifier.classify(&snapshot).hand_open);
    }

    #[test]
    fn test_closed_hand() {
        let classifier = SignalClassifier::new();
        let snapshot = LandmarkSnapshot::empty(0).with_hand(hand(0.05));
        assert!(!classifier.classify(&snapshot).hand_open);
    }

    #[test]
    fn test_any_hand_counts() {
        let classifier = SignalClassifier::new();
        let snapshot = LandmarkSnapshot::empty(0)
            .with_hand(hand(0.02))
            .with_hand(hand(0.20));
        assert!(classifier.classify(&snapshot).hand_open);
    }

    #[test]
    fn test_truncated_landmarks_are_absent() {
        let classifier = SignalClassifier::new();
        let snapshot = LandmarkSnapshot::empty(0)
            .with_face(vec![Landmark::new(0.5, 0.9); 10])
            .with_hand(vec![Landmark::new(0.1, 0.1); 5]);
        assert_eq!(classifier.classify(&snapshot), BehaviorSignals::none());
    }

    #[test]
    fn test_custom_thresholds() {
        let classifier = SignalClassifier::with_config(ClassifierConfig {
            hand_open_spread: 0.30,
            ..ClassifierConfig::default()
        });
        let snapshot = LandmarkSnapshot::empty(0).with_hand(hand(0.20));
        assert!(!classifier.classify(&snapshot).hand_open);
    }
}
