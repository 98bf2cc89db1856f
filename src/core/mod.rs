//! Core modules for cribwatch

pub mod config;
pub mod classifier;
pub mod resolver;
pub mod observer;
pub mod arbitrator;
pub mod session;
pub mod notify;
pub mod perception;
pub mod driver;
pub mod api;

pub use config::{GameConfig, SessionConfig, ObserverConfig, ClassifierConfig, ContentConfig};
pub use classifier::SignalClassifier;
pub use resolver::ActionResolver;
pub use observer::{ObserverScheduler, PhaseTransition};
pub use arbitrator::{Arbitrator, ScoreTick, ClockTick};
pub use session::Session;
pub use notify::{dispatch, Notifier, TerminalNotifier, TracingNotifier};
pub use perception::{replay, FrameSource, MemorySource, ReplaySource, ReplaySummary};
pub use driver::{Driver, SessionClock, DRIVER_PERIOD_MS};
pub use api::{create_router, router_with_state, run_server, spawn_ticker, AppState};
