//! Core types for cribwatch

mod state;
mod phase;
mod action;
mod signals;
mod landmarks;
mod reason;
mod event;
mod grade;
mod output;

pub use state::SessionState;
pub use phase::ObserverPhase;
pub use action::PlayerAction;
pub use signals::BehaviorSignals;
pub use landmarks::{Landmark, LandmarkSnapshot};
pub use reason::ReasonCode;
pub use event::SessionEvent;
pub use grade::Grade;
pub use output::SessionStatus;
