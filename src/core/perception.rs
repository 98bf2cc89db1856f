//! Perception collaborator: where landmark snapshots come from
//!
//! The core never touches cameras or models. It pulls finished snapshots
//! from a [`FrameSource`] and treats any per-frame failure as "nothing
//! detected" for that frame only.

use std::fs::File;
use std::io::{BufRead, BufReader, Lines};
use std::path::{Path, PathBuf};

use tracing::{info, warn};

use crate::core::notify::{dispatch, Notifier};
use crate::core::session::Session;
use crate::error::{PerceptionError, SessionError};
use crate::types::{LandmarkSnapshot, SessionState, SessionStatus};

/// Producer of per-frame landmark results
pub trait FrameSource {
    /// Bring the source up. Failure is terminal and never retried.
    fn init(&mut self) -> Result<(), PerceptionError>;

    /// Next frame, or `None` when the stream has ended
    fn next_frame(&mut self) -> Option<Result<LandmarkSnapshot, PerceptionError>>;
}

/// Replays recorded snapshots from a JSON Lines file
#[derive(Debug)]
pub struct ReplaySource {
    path: PathBuf,
    lines: Option<Lines<BufReader<File>>>,
    index: usize,
}

impl ReplaySource {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            lines: None,
            index: 0,
        }
    }
}

impl FrameSource for ReplaySource {
    fn init(&mut self) -> Result<(), PerceptionError> {
        let file = File::open(&self.path).map_err(|err| {
            PerceptionError::Init(format!("{}: {}", self.path.display(), err))
        })?;
        self.lines = Some(BufReader::new(file).lines());
        Ok(())
    }

    fn next_frame(&mut self) -> Option<Result<LandmarkSnapshot, PerceptionError>> {
        let lines = self.lines.as_mut()?;
        loop {
            let line = match lines.next()? {
                Ok(line) => line,
                Err(err) => {
                    // A failed read ends the stream; retrying would fail the same way
                    self.lines = None;
                    return Some(Err(PerceptionError::Io(err)));
                }
            };
            self.index += 1;
            if line.trim().is_empty() {
                continue;
            }
            return Some(serde_json::from_str(&line).map_err(|err| PerceptionError::Frame {
                index: self.index,
                reason: err.to_string(),
            }));
        }
    }
}

/// In-memory frames, for scripted runs
#[derive(Debug, Default)]
pub struct MemorySource {
    frames: std::collections::VecDeque<Result<LandmarkSnapshot, PerceptionError>>,
    fail_init: Option<String>,
}

impl MemorySource {
    pub fn new(frames: Vec<Result<LandmarkSnapshot, PerceptionError>>) -> Self {
        Self {
            frames: frames.into(),
            fail_init: None,
        }
    }

    /// A source whose init always fails
    pub fn unavailable(reason: impl Into<String>) -> Self {
        Self {
            frames: Default::default(),
            fail_init: Some(reason.into()),
        }
    }
}

impl FrameSource for MemorySource {
    fn init(&mut self) -> Result<(), PerceptionError> {
        match &self.fail_init {
            Some(reason) => Err(PerceptionError::Init(reason.clone())),
            None => Ok(()),
        }
    }

    fn next_frame(&mut self) -> Option<Result<LandmarkSnapshot, PerceptionError>> {
        self.frames.pop_front()
    }
}

/// Outcome of a replay run
#[derive(Debug, Clone)]
pub struct ReplaySummary {
    pub frames: usize,
    pub failed_frames: usize,
    pub notify_failures: usize,
    pub status: SessionStatus,
}

/// Drive a session from a frame source on the frames' own timestamps.
///
/// Starts the session at t=0 (from INTRO or a terminal state), feeds every
/// frame until the session ends, then runs the clock out.
pub fn replay(
    session: &mut Session,
    source: &mut dyn FrameSource,
    notifier: &mut dyn Notifier,
) -> Result<ReplaySummary, SessionError> {
    if let Err(err) = source.init() {
        session.mark_perception_unavailable(err.to_string());
        return Err(SessionError::PerceptionUnavailable(err.to_string()));
    }

    let mut notify_failures = dispatch(notifier, &session.start_or_restart(0)?);
    let mut frames = 0;
    let mut failed_frames = 0;
    let mut last_ms = 0;

    while session.state() == SessionState::Playing {
        let Some(frame) = source.next_frame() else {
            break;
        };
        frames += 1;
        let events = match frame {
            Ok(snapshot) => {
                last_ms = last_ms.max(snapshot.timestamp_ms);
                session.observe(last_ms, &snapshot)
            }
            Err(err) => {
                failed_frames += 1;
                warn!(error = %err, at_ms = last_ms, "frame dropped");
                let events = session.observe_failure(last_ms);
                if matches!(err, PerceptionError::Io(_)) {
                    notify_failures += dispatch(notifier, &events);
                    break;
                }
                events
            }
        };
        notify_failures += dispatch(notifier, &events);
    }

    if session.state() == SessionState::Playing {
        let end_ms = u64::from(session.config().session.duration_secs)
            * session.config().session.clock_tick_ms;
        notify_failures += dispatch(notifier, &session.advance(end_ms.max(last_ms)));
    }

    let status = session.status();
    info!(frames, failed_frames, state = %status.state, score = status.score, "replay done");
    Ok(ReplaySummary {
        frames,
        failed_frames,
        notify_failures,
        status,
    })
}
