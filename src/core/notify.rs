//! Presentation/audio notifications
//!
//! The session only emits [`SessionEvent`] values. A [`Notifier`] turns them
//! into sound, speech or text; its failures are logged and dropped.

use std::io::Write;

use colored::Colorize;
use tracing::{info, warn};

use crate::error::NotifyError;
use crate::types::{Grade, SessionEvent};

/// Consumer side of the presentation contract
pub trait Notifier: Send {
    fn on_warning_phase_entered(&mut self, message: Option<&str>) -> Result<(), NotifyError>;

    fn on_scan_phase_entered(&mut self) -> Result<(), NotifyError>;

    fn on_score_increased(&mut self, score: f64) -> Result<(), NotifyError>;

    fn on_caught(&mut self, message: &str) -> Result<(), NotifyError>;

    fn on_finished(&mut self, _score: f64, _grade: Grade) -> Result<(), NotifyError> {
        Ok(())
    }
}

/// Deliver events best-effort. Returns how many deliveries failed.
pub fn dispatch(notifier: &mut dyn Notifier, events: &[SessionEvent]) -> usize {
    let mut failures = 0;
    for event in events {
        let result = match event {
            SessionEvent::WarningPhaseEntered { message } => {
                notifier.on_warning_phase_entered(message.as_deref())
            }
            SessionEvent::ScanPhaseEntered => notifier.on_scan_phase_entered(),
            SessionEvent::ScoreIncreased { score } => notifier.on_score_increased(*score),
            SessionEvent::Caught { message, .. } => notifier.on_caught(message),
            SessionEvent::Finished { score, grade } => notifier.on_finished(*score, *grade),
            SessionEvent::SessionStarted
            | SessionEvent::PhaseChanged { .. }
            | SessionEvent::ActionChanged { .. } => Ok(()),
        };
        if let Err(err) = result {
            failures += 1;
            warn!(error = %err, ?event, "notification dropped");
        }
    }
    failures
}

/// Prints cues to a terminal
pub struct TerminalNotifier<W: Write + Send> {
    out: W,
    no_color: bool,
}

impl TerminalNotifier<std::io::Stdout> {
    pub fn stdout(no_color: bool) -> Self {
        Self::new(std::io::stdout(), no_color)
    }
}

impl<W: Write + Send> TerminalNotifier<W> {
    pub fn new(out: W, no_color: bool) -> Self {
        Self { out, no_color }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn line(&mut self, text: colored::ColoredString) -> Result<(), NotifyError> {
        if self.no_color {
            writeln!(self.out, "{}", text.clear())?;
        } else {
            writeln!(self.out, "{}", text)?;
        }
        Ok(())
    }
}

impl<W: Write + Send> Notifier for TerminalNotifier<W> {
    fn on_warning_phase_entered(&mut self, message: Option<&str>) -> Result<(), NotifyError> {
        self.line("  ⚠ The observer is approaching...".yellow().bold())?;
        if let Some(message) = message {
            self.line(format!("  🗣 \"{}\"", message).as_str().yellow())?;
        }
        Ok(())
    }

    fn on_scan_phase_entered(&mut self) -> Result<(), NotifyError> {
        self.line("  👁 SCANNING - freeze!".red().bold())
    }

    fn on_score_increased(&mut self, score: f64) -> Result<(), NotifyError> {
        self.line(format!("  + score rising ({:.1})", score).as_str().green())
    }

    fn on_caught(&mut self, message: &str) -> Result<(), NotifyError> {
        self.line(format!("  🚨 {}", message).as_str().red().bold())
    }

    fn on_finished(&mut self, score: f64, grade: Grade) -> Result<(), NotifyError> {
        self.line(format!("  🔔 Time's up! {:.0} points [{}]", score, grade).as_str().green().bold())?;
        self.line(grade.verdict().normal())
    }
}

/// Writes cues to the log only
#[derive(Debug, Default)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn on_warning_phase_entered(&mut self, message: Option<&str>) -> Result<(), NotifyError> {
        info!(message = message.unwrap_or(""), "observer approaching");
        Ok(())
    }

    fn on_scan_phase_entered(&mut self) -> Result<(), NotifyError> {
        info!("observer scanning");
        Ok(())
    }

    fn on_score_increased(&mut self, score: f64) -> Result<(), NotifyError> {
        info!(score, "score rising");
        Ok(())
    }

    fn on_caught(&mut self, message: &str) -> Result<(), NotifyError> {
        info!(%message, "caught");
        Ok(())
    }

    fn on_finished(&mut self, score: f64, grade: Grade) -> Result<(), NotifyError> {
        info!(score, %grade, "finished");
        Ok(())
    }
}
