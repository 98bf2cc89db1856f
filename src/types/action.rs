//! Player action resolved from behaviour signals

use serde::{Deserialize, Serialize};

/// Exactly one of these holds per frame
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PlayerAction {
    #[default]
    Idle,
    /// Looking down with an open hand
    UsingHiddenNote,
    /// Head turned toward the neighbour
    ConsultingNeighbor,
}

impl PlayerAction {
    /// Anything other than IDLE scores points and can be caught
    pub fn is_flagged(&self) -> bool {
        !matches!(self, PlayerAction::Idle)
    }
}

impl std::fmt::Display for PlayerAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            PlayerAction::Idle => "IDLE",
            PlayerAction::UsingHiddenNote => "HIDDEN_NOTE",
            PlayerAction::ConsultingNeighbor => "NEIGHBOR",
        };
        write!(f, "{}", name)
    }
}
