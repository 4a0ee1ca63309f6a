//! Command line flags.

use std::path::PathBuf;

use clap::Parser;
use particle_core::{ConfigUpdate, Rgb};

#[derive(Parser, Debug)]
#[command(name = "hand_particles")]
#[command(about = "Hand-gesture driven particle point cloud", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Particle colour as hex, e.g. "#00ffff"
    #[arg(long)]
    pub color: Option<Rgb>,

    /// Point size in world units
    #[arg(long)]
    pub size: Option<f32>,

    /// Particles per second while pointing
    #[arg(long)]
    pub rate: Option<f32>,

    /// Base particle life in seconds
    #[arg(long)]
    pub life: Option<f32>,

    /// Vertical acceleration (negative pulls down)
    #[arg(long, allow_negative_numbers = true)]
    pub gravity: Option<f32>,

    /// Base emission speed
    #[arg(long)]
    pub speed: Option<f32>,

    /// JSON file with config overrides, applied before the flags above
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Seed for all randomness (reproducible runs)
    #[arg(long)]
    pub seed: Option<u64>,

    /// Verbosity level (can be repeated for more detail)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

impl Cli {
    /// The config overrides given directly as flags.
    pub fn overrides(&self) -> ConfigUpdate {
        ConfigUpdate {
            color:         self.color,
            size:          self.size,
            emission_rate: self.rate,
            life:          self.life,
            gravity:       self.gravity,
            speed:         self.speed,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_flags_no_overrides() {
        let cli = Cli::try_parse_from(["hand_particles"]).unwrap();
        assert!(cli.overrides().is_empty());
        assert_eq!(cli.verbose, 0);
        assert!(cli.config.is_none());
    }

    #[test]
    fn flags_become_overrides() {
        let cli = Cli::try_parse_from([
            "hand_particles", "--color", "#ff8000", "--rate", "120",
            "--gravity", "-2.5", "--seed", "7", "-vv",
        ]).unwrap();
        let o = cli.overrides();
        assert_eq!(o.color, Some(Rgb::from_hex(0xff8000)));
        assert_eq!(o.emission_rate, Some(120.0));
        assert_eq!(o.gravity, Some(-2.5));
        assert_eq!(o.size, None);
        assert_eq!(cli.seed, Some(7));
        assert_eq!(cli.verbose, 2);
    }

    #[test]
    fn bad_colour_is_rejected() {
        assert!(Cli::try_parse_from(["hand_particles", "--color", "teal"]).is_err());
    }
}
