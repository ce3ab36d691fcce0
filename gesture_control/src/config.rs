//! TOML configuration.  Every field has a default, so an empty file (or no
//! file at all) yields a working setup.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use control_sinks::{BrightnessBackend, VolumeBackend, VolumeRange};
use dual_channel::ControlMapper;

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub mapping:    MappingConfig,
    pub source:     SourceConfig,
    pub brightness: BrightnessConfig,
    pub volume:     VolumeConfig,
    pub display:    DisplayConfig,
}

// ════════════════════════════════════════════════════════════════════════════
// Sections
// ════════════════════════════════════════════════════════════════════════════

/// Pinch calibration window (pixels) and smoothing factor.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MappingConfig {
    pub min_distance: f32,
    pub max_distance: f32,
    pub smoothing:    f32,
}

impl Default for MappingConfig {
    fn default() -> Self {
        MappingConfig { min_distance: 30.0, max_distance: 200.0, smoothing: 0.3 }
    }
}

impl MappingConfig {
    pub fn mapper(&self) -> ControlMapper {
        ControlMapper::new(self.min_distance, self.max_distance).with_smoothing(self.smoothing)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    /// Keyboard-driven synthetic hands
    Sim,
    /// External detector process writing JSON lines
    Tracker,
    /// JSON-lines file recorded earlier
    Replay,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceConfig {
    pub kind:         SourceKind,
    pub command:      String,
    pub args:         Vec<String>,
    /// Hands reported below this detector score are ignored.
    pub min_score:    f32,
    pub path:         Option<PathBuf>,
    pub loop_replay:  bool,
    /// Used when a frame record carries no dimensions.
    pub frame_width:  u32,
    pub frame_height: u32,
}

impl Default for SourceConfig {
    fn default() -> Self {
        SourceConfig {
            kind:    SourceKind::Sim,
            command: "python3".to_string(),
            args: [
                "hand_detect.py",
                "--max-hands", "2",
                "--min-detection-confidence", "0.8",
                "--min-tracking-confidence", "0.8",
            ].iter().map(|s| s.to_string()).collect(),
            min_score:    0.0,
            path:         None,
            loop_replay:  false,
            frame_width:  640,
            frame_height: 480,
        }
    }
}

impl SourceConfig {
    pub fn frame_size(&self) -> (u32, u32) { (self.frame_width, self.frame_height) }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BrightnessConfig {
    pub backend: BrightnessBackend,
    /// Backlight directory; the first one under /sys/class/backlight if unset.
    pub device:  Option<PathBuf>,
}

impl Default for BrightnessConfig {
    fn default() -> Self {
        BrightnessConfig { backend: BrightnessBackend::Sysfs, device: None }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VolumeConfig {
    pub backend: VolumeBackend,
    pub min:     f32,
    pub max:     f32,
}

impl Default for VolumeConfig {
    fn default() -> Self {
        VolumeConfig { backend: VolumeBackend::Pactl, min: 0.0, max: 100.0 }
    }
}

impl VolumeConfig {
    pub fn range(&self) -> VolumeRange { VolumeRange::new(self.min, self.max) }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    pub width:          usize,
    pub height:         usize,
    pub frame_delay_ms: u64,
    /// How long a gesture banner stays on screen.
    pub feedback_ms:    u64,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        DisplayConfig { width: 960, height: 720, frame_delay_ms: 10, feedback_ms: 2000 }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Load / save
// ════════════════════════════════════════════════════════════════════════════

impl Config {
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("reading {}", path.display()))?;
        toml::from_str(&content).with_context(|| format!("parsing {}", path.display()))
    }

    /// Missing file → defaults.  A file that exists but does not parse is
    /// still an error.
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if path.exists() {
            Config::load(path)
        } else {
            log::info!("[config] {} not found, using defaults", path.display());
            Ok(Config::default())
        }
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self)?;
        fs::write(path, content).with_context(|| format!("writing {}", path.display()))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let c = Config::default();
        assert_eq!(c.mapping.min_distance, 30.0);
        assert_eq!(c.mapping.max_distance, 200.0);
        assert_eq!(c.source.kind, SourceKind::Sim);
        assert_eq!(c.source.frame_size(), (640, 480));
        assert_eq!(c.source.args[0], "hand_detect.py");
        assert_eq!(c.volume.range(), VolumeRange::new(0.0, 100.0));
        assert_eq!(c.display.feedback_ms, 2000);
    }

    #[test]
    fn partial_file_fills_defaults() {
        let c: Config = toml::from_str(
            "[mapping]\nmax_distance = 250.0\n\n[source]\nkind = \"replay\"\npath = \"hands.jsonl\"\n\n[volume]\nbackend = \"amixer\"\n",
        ).unwrap();
        assert_eq!(c.mapping.min_distance, 30.0);
        assert_eq!(c.mapping.max_distance, 250.0);
        assert_eq!(c.source.kind, SourceKind::Replay);
        assert_eq!(c.source.path, Some(PathBuf::from("hands.jsonl")));
        assert_eq!(c.volume.backend, VolumeBackend::Amixer);
        assert_eq!(c.brightness.backend, BrightnessBackend::Sysfs);
    }

    #[test]
    fn save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("gesture_control.toml");
        let mut c = Config::default();
        c.mapping.smoothing = 0.5;
        c.brightness.backend = BrightnessBackend::None;
        c.save(&path).unwrap();
        assert_eq!(Config::load(&path).unwrap(), c);
    }

    #[test]
    fn missing_file_is_default() {
        let dir = tempfile::tempdir().unwrap();
        let c = Config::load_or_default(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(c, Config::default());
    }

    #[test]
    fn malformed_file_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.toml");
        fs::write(&path, "[mapping\nmin_distance = ").unwrap();
        assert!(Config::load_or_default(&path).is_err());
    }

    #[test]
    fn mapper_from_config() {
        let m = MappingConfig { min_distance: 10.0, max_distance: 110.0, smoothing: 1.0 }.mapper();
        assert_eq!(m.map(60.0), 50.0);
        assert_eq!(m.alpha, 1.0);
    }
}
