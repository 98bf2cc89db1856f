//! Observer Scheduler: the adversary's randomized scan cycle
//!
//! State transitions (time-driven only, never by player input):
//! - IDLE → PREPARING: after a uniform wait in [min_interval, max_interval]
//! - PREPARING → SCANNING: after prepare_ms (may emit a warning line on entry)
//! - SCANNING → IDLE: after scan_ms, next wait is drawn immediately
//! - any → ALERT: external only, cancels the pending timer
//!
//! The scheduler owns its single pending deadline. Nothing fires unless the
//! owner calls [`ObserverScheduler::advance`] with the current session time.

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg64Mcg;
use tracing::debug;

use crate::core::config::ObserverConfig;
use crate::types::ObserverPhase;

/// One phase change produced by the cycle
#[derive(Debug, Clone, PartialEq)]
pub struct PhaseTransition {
    /// Session time the change took effect
    pub at_ms: u64,
    pub from: ObserverPhase,
    pub to: ObserverPhase,
    /// Voice line drawn on PREPARING entry, if any
    pub warning: Option<String>,
}

/// Timed idle/preparing/scanning cycle
#[derive(Debug)]
pub struct ObserverScheduler {
    config: ObserverConfig,
    warning_lines: Vec<String>,
    rng: Pcg64Mcg,
    phase: ObserverPhase,
    /// The one pending timer. `None` = cancelled or never started.
    deadline: Option<u64>,
    /// Completed SCANNING → IDLE cycles
    cycles: u64,
}

impl ObserverScheduler {
    /// Create an idle, unarmed scheduler
    pub fn new(config: ObserverConfig, warning_lines: Vec<String>, seed: u64) -> Self {
        Self {
            config,
            warning_lines,
            rng: Pcg64Mcg::seed_from_u64(seed),
            phase: ObserverPhase::Idle,
            deadline: None,
            cycles: 0,
        }
    }

    /// Enter IDLE and arm the first wait
    pub fn start(&mut self, now_ms: u64) {
        self.phase = ObserverPhase::Idle;
        self.cycles = 0;
        let wait = self.draw_idle_wait();
        self.deadline = Some(now_ms + wait);
        debug!(now_ms, wait, "observer cycle started");
    }

    /// Fire every transition due at or before `now_ms`, in order.
    ///
    /// Each deadline chains from the previous one, so cumulative phase
    /// durations do not drift with the caller's tick granularity.
    pub fn advance(&mut self, now_ms: u64) -> Vec<PhaseTransition> {
        let mut fired = Vec::new();
        while let Some(deadline) = self.deadline {
            if deadline > now_ms {
                break;
            }
            fired.push(self.fire(deadline));
        }
        fired
    }

    /// Force ALERT and drop the pending timer
    pub fn alert(&mut self, now_ms: u64) -> Option<PhaseTransition> {
        self.cancel();
        if self.phase == ObserverPhase::Alert {
            return None;
        }
        let from = self.phase;
        self.phase = ObserverPhase::Alert;
        debug!(now_ms, %from, "observer alerted");
        Some(PhaseTransition {
            at_ms: now_ms,
            from,
            to: ObserverPhase::Alert,
            warning: None,
        })
    }

    /// Release the pending timer. Safe to call any number of times.
    pub fn cancel(&mut self) {
        if self.deadline.take().is_some() {
            debug!(phase = %self.phase, "observer timer cancelled");
        }
    }

    pub fn phase(&self) -> ObserverPhase {
        self.phase
    }

    /// When the pending timer fires, if armed
    pub fn next_deadline(&self) -> Option<u64> {
        self.deadline
    }

    pub fn is_armed(&self) -> bool {
        self.deadline.is_some()
    }

    pub fn cycles_completed(&self) -> u64 {
        self.cycles
    }

    fn fire(&mut self, at_ms: u64) -> PhaseTransition {
        let from = self.phase;
        let (to, next_deadline, warning) = match from {
            ObserverPhase::Idle => {
                let warning = self.draw_warning();
                (ObserverPhase::Preparing, at_ms + self.config.prepare_ms, warning)
            }
            ObserverPhase::Preparing => (ObserverPhase::Scanning, at_ms + self.config.scan_ms, None),
            ObserverPhase::Scanning => {
                self.cycles += 1;
                (ObserverPhase::Idle, at_ms + self.draw_idle_wait(), None)
            }
            // ALERT never holds a deadline; treat a stray fire as a cancel
            ObserverPhase::Alert => {
                self.deadline = None;
                return PhaseTransition {
                    at_ms,
                    from,
                    to: from,
                    warning: None,
                };
            }
        };

        self.phase = to;
        self.deadline = Some(next_deadline);
        debug!(at_ms, %from, %to, next_deadline, "observer phase");

        PhaseTransition {
            at_ms,
            from,
            to,
            warning,
        }
    }

    fn draw_idle_wait(&mut self) -> u64 {
        self.rng
            .random_range(self.config.min_interval_ms..=self.config.max_interval_ms)
    }

    fn draw_warning(&mut self) -> Option<String> {
        if self.warning_lines.is_empty() || !self.rng.random_bool(self.config.warning_probability) {
            return None;
        }
        let index = self.rng.random_range(0..self.warning_lines.len());
        Some(self.warning_lines[index].clone())
    }
}

// =============================================================================
// TESTS
// =============================================================================
