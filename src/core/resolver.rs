//! Action Resolver: behaviour signals → exactly one player action
//!
//! Priority (first match wins):
//! 1. looking down AND hand open → USING_HIDDEN_NOTE
//! 2. looking right              → CONSULTING_NEIGHBOR
//! 3. otherwise                  → IDLE

use crate::types::{BehaviorSignals, PlayerAction};

/// Stateless priority resolver
#[derive(Debug, Default, Clone, Copy)]
pub struct ActionResolver;

impl ActionResolver {
    pub fn new() -> Self {
        Self
    }

    /// The two-signal note cue outranks the single-signal gaze cue
    pub fn resolve(&self, signals: &BehaviorSignals) -> PlayerAction {
        if signals.looking_down && signals.hand_open {
            PlayerAction::UsingHiddenNote
        } else if signals.looking_right {
            PlayerAction::ConsultingNeighbor
        } else {
            PlayerAction::Idle
        }
    }
}
