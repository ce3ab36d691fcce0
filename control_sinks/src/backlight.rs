//! Linux sysfs backlight: `<dir>/max_brightness` is read once, percentages
//! are scaled into it and written to `<dir>/brightness`.

use std::fs;
use std::path::{Path, PathBuf};

use log::debug;

use crate::{BrightnessSink, SinkError};

pub const SYSFS_BACKLIGHT: &str = "/sys/class/backlight";

#[derive(Debug)]
pub struct SysfsBacklight {
    dir:   PathBuf,
    label: String,
    max:   u32,
}

impl SysfsBacklight {
    /// Open one device directory, e.g. `/sys/class/backlight/intel_backlight`.
    pub fn open(dir: impl AsRef<Path>) -> Result<Self, SinkError> {
        let dir = dir.as_ref().to_path_buf();
        let max_path = dir.join("max_brightness");
        let raw = fs::read_to_string(&max_path)
            .map_err(|source| SinkError::Io { path: max_path.clone(), source })?;
        let max = raw.trim().parse::<u32>().ok().filter(|&m| m > 0).ok_or_else(|| {
            SinkError::Parse { path: max_path.clone(), value: raw.trim().to_string() }
        })?;
        let label = format!(
            "sysfs:{}",
            dir.file_name().map(|n| n.to_string_lossy().into_owned()).unwrap_or_default()
        );
        Ok(SysfsBacklight { dir, label, max })
    }

    /// Open the first device (by name) under `root`.
    pub fn discover(root: impl AsRef<Path>) -> Result<Self, SinkError> {
        let root = root.as_ref();
        let first = list_devices(root)?
            .into_iter()
            .next()
            .ok_or_else(|| SinkError::NoBacklight(root.to_path_buf()))?;
        SysfsBacklight::open(first)
    }

    pub fn max_brightness(&self) -> u32 { self.max }

    /// Device units for a percentage, rounded to nearest; over 100 saturates.
    pub fn raw_for_percent(&self, percent: u8) -> u32 {
        let p = percent.min(100) as u64;
        ((p * self.max as u64 + 50) / 100) as u32
    }
}

/// Device directories under `root`, sorted by name.
pub fn list_devices(root: impl AsRef<Path>) -> Result<Vec<PathBuf>, SinkError> {
    let root = root.as_ref();
    let entries = fs::read_dir(root)
        .map_err(|source| SinkError::Io { path: root.to_path_buf(), source })?;
    let mut dirs: Vec<PathBuf> = entries
        .filter_map(|e| e.ok())
        .map(|e| e.path())
        .filter(|p| p.join("max_brightness").exists())
        .collect();
    dirs.sort();
    Ok(dirs)
}

impl BrightnessSink for SysfsBacklight {
    fn name(&self) -> &str { &self.label }

    fn set_brightness(&mut self, percent: u8) -> Result<(), SinkError> {
        let raw = self.raw_for_percent(percent);
        let path = self.dir.join("brightness");
        debug!("[backlight] {}% → {} / {}", percent, raw, self.max);
        fs::write(&path, raw.to_string()).map_err(|source| SinkError::Io { path, source })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fake_device(root: &Path, name: &str, max: &str) -> PathBuf {
        let dir = root.join(name);
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join("max_brightness"), max).unwrap();
        fs::write(dir.join("brightness"), "0\n").unwrap();
        dir
    }

    #[test]
    fn writes_scaled_value() {
        let root = tempfile::tempdir().unwrap();
        let dir = fake_device(root.path(), "panel", "255\n");
        let mut b = SysfsBacklight::open(&dir).unwrap();
        assert_eq!(b.max_brightness(), 255);
        b.set_brightness(50).unwrap();
        assert_eq!(fs::read_to_string(dir.join("brightness")).unwrap(), "128");
        b.set_brightness(100).unwrap();
        assert_eq!(fs::read_to_string(dir.join("brightness")).unwrap(), "255");
        b.set_brightness(0).unwrap();
        assert_eq!(fs::read_to_string(dir.join("brightness")).unwrap(), "0");
    }

    #[test]
    fn percent_saturates() {
        let root = tempfile::tempdir().unwrap();
        let b = SysfsBacklight::open(fake_device(root.path(), "p", "1000")).unwrap();
        assert_eq!(b.raw_for_percent(200), 1000);
        assert_eq!(b.raw_for_percent(1), 10);
    }

    #[test]
    fn discover_picks_first_by_name() {
        let root = tempfile::tempdir().unwrap();
        fake_device(root.path(), "zz_backlight", "10");
        fake_device(root.path(), "acpi_video0", "15");
        fs::create_dir_all(root.path().join("not_a_device")).unwrap();
        let b = SysfsBacklight::discover(root.path()).unwrap();
        assert_eq!(b.name(), "sysfs:acpi_video0");
        assert_eq!(list_devices(root.path()).unwrap().len(), 2);
    }

    #[test]
    fn empty_root_is_no_backlight() {
        let root = tempfile::tempdir().unwrap();
        assert!(matches!(SysfsBacklight::discover(root.path()), Err(SinkError::NoBacklight(_))));
    }

    #[test]
    fn bad_max_is_parse_error() {
        let root = tempfile::tempdir().unwrap();
        let dir = fake_device(root.path(), "p", "zero");
        assert!(matches!(SysfsBacklight::open(&dir), Err(SinkError::Parse { .. })));
        let dir = fake_device(root.path(), "q", "0");
        assert!(matches!(SysfsBacklight::open(&dir), Err(SinkError::Parse { .. })));
    }
}
