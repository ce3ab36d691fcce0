//! gesture_control: entry point.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;

use gesture_control::app::{run, RunOptions};
use gesture_control::config::{Config, SourceKind};

#[derive(Parser, Debug)]
#[command(name = "gesture_control", about = "Control brightness and volume with hand gestures")]
struct Cli {
    /// Configuration file (missing file → defaults)
    #[arg(long, default_value = "gesture_control.toml")]
    config: PathBuf,

    /// Landmark source, overriding the config file
    #[arg(long, value_enum)]
    source: Option<SourceKind>,

    /// Replay this JSON-lines file (implies --source replay)
    #[arg(long)]
    replay: Option<PathBuf>,

    /// Start the replay over when it ends
    #[arg(long)]
    loop_replay: bool,

    /// Do not touch the backlight or the mixer
    #[arg(long)]
    dry_run: bool,

    /// Append every processed frame to this JSON-lines file
    #[arg(long)]
    record: Option<PathBuf>,

    /// Write the effective configuration to --config and exit
    #[arg(long)]
    write_config: bool,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_secs()
        .init();
    let cli = Cli::parse();

    let mut cfg = Config::load_or_default(&cli.config)?;
    if let Some(kind) = cli.source {
        cfg.source.kind = kind;
    }
    if let Some(path) = cli.replay {
        cfg.source.kind = SourceKind::Replay;
        cfg.source.path = Some(path);
    }
    if cli.loop_replay {
        cfg.source.loop_replay = true;
    }

    if cli.write_config {
        cfg.save(&cli.config)
            .with_context(|| format!("saving {}", cli.config.display()))?;
        println!("wrote {}", cli.config.display());
        return Ok(());
    }

    println!();
    println!("╔══════════════════════════════════════════════════════════════╗");
    println!("║      Gesture Control — pinch for brightness and volume       ║");
    println!("╚══════════════════════════════════════════════════════════════╝");
    println!();
    println!("  Source:  {:?}", cfg.source.kind);
    println!("  Window:  {}×{}", cfg.display.width, cfg.display.height);
    if cli.dry_run {
        println!("  Outputs: disabled (--dry-run)");
    }
    println!();

    run(cfg, RunOptions { dry_run: cli.dry_run, record: cli.record })
}
