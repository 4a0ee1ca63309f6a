//! hand_particles: interactive entry point.

use anyhow::Result;
use clap::Parser;
use hand_particles::app::{run, AppConfig};
use hand_particles::cli::Cli;

fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut logger = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"));
    if cli.verbose > 0 {
        logger.filter_level(match cli.verbose {
            1 => log::LevelFilter::Info,
            2 => log::LevelFilter::Debug,
            _ => log::LevelFilter::Trace,
        });
    }
    logger.init();

    println!();
    println!("╔══════════════════════════════════════════════════════════════╗");
    println!("║          Hand Particles — gesture-driven point cloud         ║");
    println!("╚══════════════════════════════════════════════════════════════╝");
    println!();

    #[cfg(feature = "leap")]
    println!("  Mode: LeapMotion hardware");
    #[cfg(not(feature = "leap"))]
    println!("  Mode: Mouse simulation  (use --features leap for hardware)");
    println!();

    let cfg = AppConfig::from_cli(&cli)?;
    println!("  Opening visualizer window…");
    println!();

    run(cfg)?;
    Ok(())
}
