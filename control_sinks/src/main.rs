//! sinkctl: poke the brightness and volume outputs by hand.
//!
//! ```text
//! sinkctl list
//! sinkctl brightness 40 [--device /sys/class/backlight/intel_backlight]
//! sinkctl volume 35 [--mixer amixer]
//! ```

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};

use control_sinks::backlight::{self, SysfsBacklight};
use control_sinks::mixer::{CommandVolume, Mixer};
use control_sinks::{BrightnessSink, VolumeRange, VolumeSink};

#[derive(Parser, Debug)]
#[command(name = "sinkctl", about = "Set screen brightness or system volume directly")]
struct Cli {
    #[command(subcommand)]
    action: Action,
}

#[derive(Subcommand, Debug)]
enum Action {
    /// List backlight devices
    List {
        #[arg(long, default_value = backlight::SYSFS_BACKLIGHT)]
        root: PathBuf,
    },
    /// Set brightness to a percentage (0–100)
    Brightness {
        #[arg(value_parser = clap::value_parser!(u8).range(0..=100))]
        percent: u8,
        /// Device directory (default: first under /sys/class/backlight)
        #[arg(long)]
        device: Option<PathBuf>,
    },
    /// Set volume to a percentage (0–100)
    Volume {
        #[arg(value_parser = clap::value_parser!(u8).range(0..=100))]
        percent: u8,
        #[arg(long, value_enum, default_value_t = MixerArg::Pactl)]
        mixer: MixerArg,
    },
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum MixerArg {
    Pactl,
    Amixer,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();

    match cli.action {
        Action::List { root } => {
            let devices = backlight::list_devices(&root)
                .with_context(|| format!("listing {}", root.display()))?;
            if devices.is_empty() {
                println!("no backlight devices under {}", root.display());
            }
            for dir in devices {
                match SysfsBacklight::open(&dir) {
                    Ok(b)  => println!("{}  (max {})", dir.display(), b.max_brightness()),
                    Err(e) => println!("{}  ({})", dir.display(), e),
                }
            }
        }
        Action::Brightness { percent, device } => {
            let mut sink = match device {
                Some(dir) => SysfsBacklight::open(dir)?,
                None      => SysfsBacklight::discover(backlight::SYSFS_BACKLIGHT)?,
            };
            sink.set_brightness(percent)
                .with_context(|| format!("writing brightness via {}", sink.name()))?;
            println!("brightness {}% ({})", percent, sink.name());
        }
        Action::Volume { percent, mixer } => {
            let mixer = match mixer {
                MixerArg::Pactl  => Mixer::Pactl,
                MixerArg::Amixer => Mixer::Amixer,
            };
            let mut sink = CommandVolume::new(mixer, VolumeRange::default());
            sink.set_level(percent as f32)
                .with_context(|| format!("setting volume via {}", sink.name()))?;
            println!("volume {}% ({})", percent, sink.name());
        }
    }
    Ok(())
}
