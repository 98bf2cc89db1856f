//! Per-frame behaviour signals

use serde::{Deserialize, Serialize};

/// Discrete signals derived from one landmark snapshot.
///
/// No memory across frames: each snapshot produces a fresh set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct BehaviorSignals {
    /// Nose sits below the eye line by more than the margin
    pub looking_down: bool,
    /// Head turned toward the mirrored right side
    pub looking_right: bool,
    /// Any detected hand has its fingers spread
    pub hand_open: bool,
}

impl BehaviorSignals {
    /// All signals absent (no face, no hands, or a failed frame)
    pub fn none() -> Self {
        Self::default()
    }

    pub fn is_none(&self) -> bool {
        !(self.looking_down || self.looking_right || self.hand_open)
    }

    /// Compact `D R H` flags for terminal display
    pub fn flags(&self) -> String {
        format!(
            "{}{}{}",
            if self.looking_down { 'D' } else { '-' },
            if self.looking_right { 'R' } else { '-' },
            if self.hand_open { 'H' } else { '-' },
        )
    }
}
