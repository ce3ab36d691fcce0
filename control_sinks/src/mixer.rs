//! System volume through the desktop mixer command line tools.

use std::process::Command;

use log::debug;

use crate::{SinkError, VolumeRange, VolumeSink};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Mixer {
    /// PulseAudio / PipeWire: `pactl set-sink-volume @DEFAULT_SINK@ N%`
    Pactl,
    /// ALSA: `amixer -q sset Master N%`
    Amixer,
}

impl Mixer {
    pub fn program(&self) -> &'static str {
        match self {
            Mixer::Pactl  => "pactl",
            Mixer::Amixer => "amixer",
        }
    }

    /// Argument vector setting the volume to `percent` (already rounded).
    pub fn args(&self, percent: u32) -> Vec<String> {
        let level = format!("{}%", percent);
        match self {
            Mixer::Pactl  => vec!["set-sink-volume".into(), "@DEFAULT_SINK@".into(), level],
            Mixer::Amixer => vec!["-q".into(), "sset".into(), "Master".into(), level],
        }
    }
}

/// Volume sink that shells out to a mixer on every write.
///
/// Levels are expressed in the configured range and converted to the
/// 0–100 % the tools take.
#[derive(Debug)]
pub struct CommandVolume {
    mixer: Mixer,
    range: VolumeRange,
}

impl CommandVolume {
    pub fn new(mixer: Mixer, range: VolumeRange) -> Self {
        CommandVolume { mixer, range }
    }

    pub fn percent_for_level(&self, level: f32) -> u32 {
        let span = self.range.max - self.range.min;
        if span == 0.0 {
            return 0;
        }
        (((level - self.range.min) / span) * 100.0).round().clamp(0.0, 100.0) as u32
    }
}

impl VolumeSink for CommandVolume {
    fn name(&self) -> &str { self.mixer.program() }

    fn range(&self) -> VolumeRange { self.range }

    fn set_level(&mut self, level: f32) -> Result<(), SinkError> {
        self.range.check(level)?;
        let program = self.mixer.program();
        let args = self.mixer.args(self.percent_for_level(level));
        debug!("[mixer] {} {}", program, args.join(" "));
        let out = Command::new(program)
            .args(&args)
            .output()
            .map_err(|source| SinkError::Spawn { program: program.to_string(), source })?;
        if out.status.success() {
            Ok(())
        } else {
            Err(SinkError::Command {
                program: program.to_string(),
                status:  out.status.to_string(),
                stderr:  String::from_utf8_lossy(&out.stderr).trim().to_string(),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn command_lines() {
        assert_eq!(Mixer::Pactl.args(35), ["set-sink-volume", "@DEFAULT_SINK@", "35%"]);
        assert_eq!(Mixer::Amixer.args(0), ["-q", "sset", "Master", "0%"]);
    }

    #[test]
    fn level_to_percent() {
        let v = CommandVolume::new(Mixer::Pactl, VolumeRange::new(20.0, 60.0));
        assert_eq!(v.percent_for_level(20.0), 0);
        assert_eq!(v.percent_for_level(40.0), 50);
        assert_eq!(v.percent_for_level(60.0), 100);
        let flat = CommandVolume::new(Mixer::Amixer, VolumeRange::new(5.0, 5.0));
        assert_eq!(flat.percent_for_level(5.0), 0);
    }

    #[test]
    fn out_of_range_never_spawns() {
        let mut v = CommandVolume::new(Mixer::Pactl, VolumeRange::default());
        assert!(matches!(v.set_level(150.0), Err(SinkError::OutOfRange { .. })));
    }
}
