//! # control_sinks
//!
//! Output side of the controller: where brightness percentages and volume
//! levels actually go.
//!
//! * [`BrightnessSink`] takes an integer percentage 0–100.
//! * [`VolumeSink`] takes a device-native level inside the range the sink
//!   reports from [`VolumeSink::range`].
//!
//! Backends:
//!
//! | Backend | Concern | Mechanism |
//! |---|---|---|
//! | [`backlight::SysfsBacklight`] | brightness | `/sys/class/backlight/<dev>/brightness` |
//! | [`mixer::CommandVolume`] | volume | `pactl set-sink-volume` or `amixer sset Master` |
//! | [`NullSink`] | both | discards (dry run / no device) |
//! | [`MemorySink`] | both | records every write (tests, replays) |
//!
//! Sink failures are ordinary `Err` values; callers log them and carry on.

use std::fmt;
use std::io;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub mod backlight;
pub mod mixer;

use backlight::SysfsBacklight;
use mixer::{CommandVolume, Mixer};

// ════════════════════════════════════════════════════════════════════════════
// Errors
// ════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Error)]
pub enum SinkError {
    #[error("no backlight device under {0}")]
    NoBacklight(PathBuf),

    #[error("{path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("malformed value {value:?} in {path}")]
    Parse { path: PathBuf, value: String },

    #[error("`{program}` could not be started: {source}")]
    Spawn {
        program: String,
        #[source]
        source: io::Error,
    },

    #[error("`{program}` exited with {status}: {stderr}")]
    Command { program: String, status: String, stderr: String },

    #[error("level {level} outside [{min}, {max}]")]
    OutOfRange { level: f32, min: f32, max: f32 },

    /// Raised by [`MemorySink::failing`].
    #[error("{0}")]
    Rejected(String),
}

// ════════════════════════════════════════════════════════════════════════════
// Sink traits
// ════════════════════════════════════════════════════════════════════════════

pub trait BrightnessSink {
    fn name(&self) -> &str;
    fn set_brightness(&mut self, percent: u8) -> Result<(), SinkError>;
}

/// Device-native volume range, e.g. 0–100 % for PulseAudio.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct VolumeRange {
    pub min: f32,
    pub max: f32,
}

impl Default for VolumeRange {
    fn default() -> Self { VolumeRange { min: 0.0, max: 100.0 } }
}

impl VolumeRange {
    pub fn new(min: f32, max: f32) -> Self { VolumeRange { min, max } }

    /// Project a 0–100 percentage onto the device range (clamped).
    pub fn level_for_percent(&self, percent: f32) -> f32 {
        let t = (percent / 100.0).clamp(0.0, 1.0);
        self.min + (self.max - self.min) * t
    }

    pub fn contains(&self, level: f32) -> bool {
        let (lo, hi) = if self.min <= self.max { (self.min, self.max) } else { (self.max, self.min) };
        level >= lo && level <= hi
    }

    pub fn check(&self, level: f32) -> Result<(), SinkError> {
        if self.contains(level) {
            Ok(())
        } else {
            Err(SinkError::OutOfRange { level, min: self.min, max: self.max })
        }
    }
}

pub trait VolumeSink {
    fn name(&self) -> &str;
    /// Queried once at startup and whenever a reset needs the floor.
    fn range(&self) -> VolumeRange;
    fn set_level(&mut self, level: f32) -> Result<(), SinkError>;
}

// ════════════════════════════════════════════════════════════════════════════
// NullSink: no device, or --dry-run
// ════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Default)]
pub struct NullSink;

impl BrightnessSink for NullSink {
    fn name(&self) -> &str { "null" }
    fn set_brightness(&mut self, percent: u8) -> Result<(), SinkError> {
        debug!("[null] brightness {}%", percent);
        Ok(())
    }
}

impl VolumeSink for NullSink {
    fn name(&self) -> &str { "null" }
    fn range(&self) -> VolumeRange { VolumeRange::default() }
    fn set_level(&mut self, level: f32) -> Result<(), SinkError> {
        debug!("[null] volume {:.1}", level);
        Ok(())
    }
}

// ════════════════════════════════════════════════════════════════════════════
// MemorySink: records writes behind a shared handle
// ════════════════════════════════════════════════════════════════════════════

/// Sink that records every value it receives.
///
/// Clones share the same log, so a test can keep one clone while the
/// application owns the other.
#[derive(Clone, Debug, Default)]
pub struct MemorySink {
    writes: Arc<Mutex<Vec<f32>>>,
    range:  VolumeRange,
    fail:   bool,
}

impl MemorySink {
    pub fn new() -> Self { MemorySink::default() }

    pub fn with_range(range: VolumeRange) -> Self {
        MemorySink { range, ..MemorySink::default() }
    }

    /// A sink whose every write fails (and is not recorded).
    pub fn failing() -> Self {
        MemorySink { fail: true, ..MemorySink::default() }
    }

    pub fn writes(&self) -> Vec<f32> {
        self.writes.lock().map(|w| w.clone()).unwrap_or_default()
    }

    pub fn last(&self) -> Option<f32> {
        self.writes().last().copied()
    }

    fn record(&self, v: f32) -> Result<(), SinkError> {
        if self.fail {
            return Err(SinkError::Rejected(format!("memory sink refused {}", v)));
        }
        if let Ok(mut w) = self.writes.lock() {
            w.push(v);
        }
        Ok(())
    }
}

impl BrightnessSink for MemorySink {
    fn name(&self) -> &str { "memory" }
    fn set_brightness(&mut self, percent: u8) -> Result<(), SinkError> {
        self.record(percent as f32)
    }
}

impl VolumeSink for MemorySink {
    fn name(&self) -> &str { "memory" }
    fn range(&self) -> VolumeRange { self.range }
    fn set_level(&mut self, level: f32) -> Result<(), SinkError> {
        self.range.check(level)?;
        self.record(level)
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Backend selection
// ════════════════════════════════════════════════════════════════════════════

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BrightnessBackend {
    Sysfs,
    None,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VolumeBackend {
    Pactl,
    Amixer,
    None,
}

impl fmt::Display for BrightnessBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            BrightnessBackend::Sysfs => "sysfs",
            BrightnessBackend::None  => "none",
        })
    }
}

impl fmt::Display for VolumeBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            VolumeBackend::Pactl  => "pactl",
            VolumeBackend::Amixer => "amixer",
            VolumeBackend::None   => "none",
        })
    }
}

/// Open the configured brightness backend.
///
/// Falls back to [`NullSink`] with a warning when the device cannot be
/// opened, so the controller still runs (display-only).
pub fn open_brightness(backend: BrightnessBackend, device: Option<&PathBuf>) -> Box<dyn BrightnessSink> {
    match backend {
        BrightnessBackend::None => Box::new(NullSink),
        BrightnessBackend::Sysfs => {
            let opened = match device {
                Some(dir) => SysfsBacklight::open(dir),
                None      => SysfsBacklight::discover(backlight::SYSFS_BACKLIGHT),
            };
            match opened {
                Ok(b) => {
                    info!("[sinks] brightness via {}", b.name());
                    Box::new(b)
                }
                Err(e) => {
                    warn!("[sinks] backlight unavailable: {}; brightness is display-only", e);
                    Box::new(NullSink)
                }
            }
        }
    }
}

/// Open the configured volume backend with the given device range.
pub fn open_volume(backend: VolumeBackend, range: VolumeRange) -> Box<dyn VolumeSink> {
    match backend {
        VolumeBackend::None   => Box::new(NullSink),
        VolumeBackend::Pactl  => Box::new(CommandVolume::new(Mixer::Pactl, range)),
        VolumeBackend::Amixer => Box::new(CommandVolume::new(Mixer::Amixer, range)),
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn percent_projects_onto_range() {
        let r = VolumeRange::new(-65.25, 0.0);
        assert_eq!(r.level_for_percent(0.0), -65.25);
        assert_eq!(r.level_for_percent(100.0), 0.0);
        assert_eq!(r.level_for_percent(250.0), 0.0);
        assert!((r.level_for_percent(50.0) + 32.625).abs() < 1e-4);
    }

    #[test]
    fn range_check() {
        let r = VolumeRange::default();
        assert!(r.check(0.0).is_ok());
        assert!(r.check(100.0).is_ok());
        assert!(matches!(r.check(100.5), Err(SinkError::OutOfRange { .. })));
    }

    #[test]
    fn memory_sink_shares_log() {
        let probe = MemorySink::new();
        let mut owned: Box<dyn BrightnessSink> = Box::new(probe.clone());
        owned.set_brightness(42).unwrap();
        owned.set_brightness(7).unwrap();
        assert_eq!(probe.writes(), vec![42.0, 7.0]);
        assert_eq!(probe.last(), Some(7.0));
    }

    #[test]
    fn failing_memory_sink_records_nothing() {
        let probe = MemorySink::failing();
        let mut owned = probe.clone();
        assert!(BrightnessSink::set_brightness(&mut owned, 10).is_err());
        assert!(probe.writes().is_empty());
    }

    #[test]
    fn memory_volume_rejects_out_of_range() {
        let mut s = MemorySink::with_range(VolumeRange::new(0.0, 1.0));
        assert!(s.set_level(2.0).is_err());
        assert!(s.set_level(0.5).is_ok());
    }

    #[test]
    fn none_backends_are_null() {
        assert_eq!(open_brightness(BrightnessBackend::None, None).name(), "null");
        assert_eq!(open_volume(VolumeBackend::None, VolumeRange::default()).name(), "null");
    }

    #[test]
    fn missing_backlight_falls_back() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope");
        assert_eq!(open_brightness(BrightnessBackend::Sysfs, Some(&missing)).name(), "null");
    }
}
