//! Landmark sources: where each frame's hands come from.
//!
//! The application does not care whether a frame came from a live detector,
//! a recorded file or the keyboard simulator; it only calls
//! [`LandmarkSource::next_frame`] once per cycle.

use std::fs::File;
use std::io::{self, BufRead, BufReader, Lines};
use std::path::{Path, PathBuf};
use std::process::{Child, ChildStdout, Command, Stdio};
use std::sync::mpsc::{Receiver, TryRecvError};

use log::{debug, info, warn};
use thiserror::Error;

use hand_landmarks::synth::{HandSketch, Pose};
use hand_landmarks::{decode_frame, Frame, Handedness, LandmarkError};

use crate::config::{SourceConfig, SourceKind};

/// Line the detector prints once the camera is open.
pub const READY: &str = "READY";

// ════════════════════════════════════════════════════════════════════════════
// Errors
// ════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("could not start `{command}`: {source}")]
    Spawn {
        command: String,
        #[source]
        source: io::Error,
    },

    #[error("detector did not signal READY, got {0:?}")]
    NotReady(String),

    #[error("reading {path}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error(transparent)]
    Io(#[from] io::Error),

    /// The detector exited, the replay ran out or the window went away.
    #[error("landmark source closed")]
    Closed,

    #[error("bad frame: {0}")]
    Decode(#[from] LandmarkError),
}

impl SourceError {
    /// Errors after which the source will never produce another frame.
    pub fn is_terminal(&self) -> bool {
        matches!(self, SourceError::Closed | SourceError::NotReady(_) | SourceError::Spawn { .. })
    }
}

// ════════════════════════════════════════════════════════════════════════════
// LandmarkSource trait
// ════════════════════════════════════════════════════════════════════════════

pub trait LandmarkSource {
    fn name(&self) -> &str;

    /// Produce the next frame.
    ///
    /// `Ok(None)` means nothing new this cycle.  A [`SourceError::Decode`]
    /// skips one frame; [`SourceError::Closed`] ends the stream.
    fn next_frame(&mut self) -> Result<Option<Frame>, SourceError>;
}

/// Drop hands whose detector score is under `min_score`.
pub fn filter_by_score(mut frame: Frame, min_score: f32) -> Frame {
    let before = frame.hands.len();
    frame.hands.retain(|h| h.score >= min_score);
    if frame.hands.len() < before {
        debug!("[source] dropped {} low-score hand(s)", before - frame.hands.len());
    }
    frame
}

// ════════════════════════════════════════════════════════════════════════════
// TrackerSource: external detector subprocess
// ════════════════════════════════════════════════════════════════════════════

/// Runs a detector process that owns the camera and prints one JSON frame
/// per line after an initial `READY`.  The process is killed on drop, which
/// releases the camera.
pub struct TrackerSource {
    child:        Child,
    lines:        Lines<BufReader<ChildStdout>>,
    default_size: (u32, u32),
    min_score:    f32,
    label:        String,
}

impl TrackerSource {
    pub fn spawn(command: &str, args: &[String], default_size: (u32, u32), min_score: f32) -> Result<Self, SourceError> {
        info!("[tracker] starting {} {}", command, args.join(" "));
        let mut child = Command::new(command)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit())
            .spawn()
            .map_err(|source| SourceError::Spawn { command: command.to_string(), source })?;

        let stdout = match child.stdout.take() {
            Some(s) => s,
            None => {
                let _ = child.kill();
                return Err(SourceError::NotReady("no stdout".to_string()));
            }
        };
        let mut lines = BufReader::new(stdout).lines();

        let first = lines.next().transpose()?.unwrap_or_default();
        if first.trim() != READY {
            let _ = child.kill();
            let _ = child.wait();
            return Err(SourceError::NotReady(first));
        }
        info!("[tracker] detector ready");

        Ok(TrackerSource {
            child,
            lines,
            default_size,
            min_score,
            label: format!("tracker:{}", command),
        })
    }
}

impl LandmarkSource for TrackerSource {
    fn name(&self) -> &str { &self.label }

    fn next_frame(&mut self) -> Result<Option<Frame>, SourceError> {
        match self.lines.next() {
            None           => Err(SourceError::Closed),
            Some(Err(e))   => Err(SourceError::Io(e)),
            Some(Ok(line)) => {
                if line.trim().is_empty() {
                    return Ok(None);
                }
                let frame = decode_frame(&line, self.default_size)?;
                Ok(Some(filter_by_score(frame, self.min_score)))
            }
        }
    }
}

impl Drop for TrackerSource {
    fn drop(&mut self) {
        debug!("[tracker] stopping detector");
        let _ = self.child.kill();
        let _ = self.child.wait();
    }
}

// ════════════════════════════════════════════════════════════════════════════
// ReplaySource: recorded JSON lines
// ════════════════════════════════════════════════════════════════════════════

pub struct ReplaySource {
    path:         PathBuf,
    lines:        Vec<String>,
    pos:          usize,
    looping:      bool,
    default_size: (u32, u32),
    min_score:    f32,
    label:        String,
}

impl ReplaySource {
    pub fn open(path: &Path, looping: bool, default_size: (u32, u32)) -> Result<Self, SourceError> {
        let file = File::open(path)
            .map_err(|source| SourceError::Open { path: path.to_path_buf(), source })?;
        let lines = BufReader::new(file)
            .lines()
            .collect::<Result<Vec<_>, _>>()?
            .into_iter()
            .filter(|l| !l.trim().is_empty() && l.trim() != READY)
            .collect::<Vec<_>>();
        info!("[replay] {} frames from {}", lines.len(), path.display());
        Ok(ReplaySource {
            path: path.to_path_buf(),
            lines,
            pos: 0,
            looping,
            default_size,
            min_score: 0.0,
            label: format!("replay:{}", path.display()),
        })
    }

    pub fn with_min_score(mut self, min_score: f32) -> Self {
        self.min_score = min_score;
        self
    }

    pub fn len(&self) -> usize { self.lines.len() }
    pub fn is_empty(&self) -> bool { self.lines.is_empty() }
}

impl LandmarkSource for ReplaySource {
    fn name(&self) -> &str { &self.label }

    fn next_frame(&mut self) -> Result<Option<Frame>, SourceError> {
        if self.pos >= self.lines.len() {
            if !self.looping || self.lines.is_empty() {
                return Err(SourceError::Closed);
            }
            debug!("[replay] looping {}", self.path.display());
            self.pos = 0;
        }
        let line = &self.lines[self.pos];
        self.pos += 1;
        let frame = decode_frame(line, self.default_size)?;
        Ok(Some(filter_by_score(frame, self.min_score)))
    }
}

// ════════════════════════════════════════════════════════════════════════════
// SimSource: keyboard simulation
// ════════════════════════════════════════════════════════════════════════════

/// Raw input event from the visualizer window.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum SimInput {
    /// Toggle whether the hand is in view.
    ToggleHand(Handedness),
    /// Widen (positive) or narrow (negative) the pinch, in normalised units.
    Pinch(Handedness, f32),
    /// Hold a pose (`None` releases back to a plain pinch).
    Hold(Handedness, Option<Pose>),
}

/// Per-hand pinch step for one key repeat.
pub const PINCH_STEP: f32 = 0.01;

#[derive(Clone, Copy, Debug)]
struct SimHand {
    present: bool,
    sketch:  HandSketch,
}

/// Synthetic two-hand source driven by [`SimInput`] events from the window.
pub struct SimSource {
    rx:     Receiver<SimInput>,
    hands:  [SimHand; 2],
    size:   (u32, u32),
    closed: bool,
}

impl SimSource {
    pub fn new(rx: Receiver<SimInput>, size: (u32, u32)) -> Self {
        let hand = |side| SimHand { present: true, sketch: HandSketch::new(side, Pose::Pinch) };
        SimSource {
            rx,
            hands: [hand(Handedness::Left), hand(Handedness::Right)],
            size,
            closed: false,
        }
    }

    fn slot(&mut self, side: Handedness) -> &mut SimHand {
        match side {
            Handedness::Left  => &mut self.hands[0],
            Handedness::Right => &mut self.hands[1],
        }
    }

    pub fn apply(&mut self, input: SimInput) {
        match input {
            SimInput::ToggleHand(side) => {
                let h = self.slot(side);
                h.present = !h.present;
            }
            SimInput::Pinch(side, delta) => {
                let h = self.slot(side);
                h.sketch = h.sketch.pinch((h.sketch.pinch + delta).min(0.4));
            }
            SimInput::Hold(side, pose) => {
                self.slot(side).sketch.pose = pose.unwrap_or(Pose::Pinch);
            }
        }
    }

    pub fn frame(&self) -> Frame {
        let hands = self.hands.iter()
            .filter(|h| h.present)
            .map(|h| h.sketch.build())
            .collect();
        Frame::new(self.size.0, self.size.1, hands)
    }
}

impl LandmarkSource for SimSource {
    fn name(&self) -> &str { "sim" }

    fn next_frame(&mut self) -> Result<Option<Frame>, SourceError> {
        if self.closed {
            return Err(SourceError::Closed);
        }
        loop {
            match self.rx.try_recv() {
                Ok(input) => self.apply(input),
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    self.closed = true;
                    break;
                }
            }
        }
        Ok(Some(self.frame()))
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Construction from config
// ════════════════════════════════════════════════════════════════════════════

/// Open the configured source.  The simulator needs the window's input
/// channel, so `sim_rx` must be supplied for [`SourceKind::Sim`].
pub fn open_source(cfg: &SourceConfig, sim_rx: Option<Receiver<SimInput>>) -> Result<Box<dyn LandmarkSource>, SourceError> {
    let size = cfg.frame_size();
    match cfg.kind {
        SourceKind::Tracker => {
            Ok(Box::new(TrackerSource::spawn(&cfg.command, &cfg.args, size, cfg.min_score)?))
        }
        SourceKind::Replay => {
            let path = cfg.path.clone().ok_or_else(|| {
                SourceError::Open {
                    path: PathBuf::new(),
                    source: io::Error::new(io::ErrorKind::NotFound, "no replay path configured"),
                }
            })?;
            Ok(Box::new(ReplaySource::open(&path, cfg.loop_replay, size)?.with_min_score(cfg.min_score)))
        }
        SourceKind::Sim => match sim_rx {
            Some(rx) => Ok(Box::new(SimSource::new(rx, size))),
            None => {
                warn!("[source] simulator requested without an input channel");
                Err(SourceError::Closed)
            }
        },
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════
