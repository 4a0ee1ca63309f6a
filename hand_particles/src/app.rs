//! Application wiring: config loading, the landmark source, the window and
//! the frame loop.
//!
//! The loop owns the [`FrameDriver`].  Each frame it polls window input,
//! applies UI commands, drains the detection channel, ticks the simulation
//! with the measured frame time and presents the result.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::time::Instant;

use particle_core::{ConfigUpdate, FrameDriver, Rgb, SimulationConfig};
use thiserror::Error;

use crate::cli::Cli;
use crate::detection::{spawn_landmark_source, DetectionEvent, SimInput};
#[cfg(not(feature = "leap"))]
use crate::detection::SimLandmarkSource;
use crate::visualizer::{Knob, UiCommand, Visualizer};

// ════════════════════════════════════════════════════════════════════════════
// Errors
// ════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Error)]
pub enum AppError {
    #[error("could not open window: {0}")]
    Window(#[from] minifb::Error),

    #[error("could not read config file {}: {source}", path.display())]
    ConfigRead {
        path:   PathBuf,
        source: io::Error,
    },

    #[error("invalid config file {}: {source}", path.display())]
    ConfigParse {
        path:   PathBuf,
        source: serde_json::Error,
    },
}

// ════════════════════════════════════════════════════════════════════════════
// AppConfig
// ════════════════════════════════════════════════════════════════════════════

/// Configuration for the full application.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct AppConfig {
    pub sim:  SimulationConfig,
    /// Fixed seed for particle and impulse randomness; `None` seeds from the OS.
    pub seed: Option<u64>,
}

impl AppConfig {
    /// Defaults, then the `--config` file, then individual flags.
    pub fn from_cli(cli: &Cli) -> Result<Self, AppError> {
        let file = match &cli.config {
            Some(path) => load_config_file(path)?,
            None       => ConfigUpdate::default(),
        };
        let update = file.merged(&cli.overrides());

        let mut sim = SimulationConfig::default();
        sim.apply(&update);
        log::debug!("starting config: {:?}", sim);

        Ok(AppConfig { sim, seed: cli.seed })
    }
}

/// Read a JSON [`ConfigUpdate`] from disk.
pub fn load_config_file(path: &Path) -> Result<ConfigUpdate, AppError> {
    let text = fs::read_to_string(path).map_err(|source| AppError::ConfigRead {
        path: path.to_path_buf(),
        source,
    })?;
    let update = serde_json::from_str(&text).map_err(|source| AppError::ConfigParse {
        path: path.to_path_buf(),
        source,
    })?;
    log::info!("loaded config overrides from {}", path.display());
    Ok(update)
}

// ════════════════════════════════════════════════════════════════════════════
// UI commands → config
// ════════════════════════════════════════════════════════════════════════════

const HUE_STEP: f32 = 30.0;

/// (step, min, max) for each keyboard knob.
fn knob_range(knob: Knob) -> (f32, f32, f32) {
    match knob {
        Knob::Rate    => (10.0,  0.0,  300.0),
        Knob::Life    => (0.5,   0.5,  10.0),
        Knob::Gravity => (0.25, -5.0,  5.0),
        Knob::Size    => (0.5,   0.25, 5.0),
    }
}

/// The config change a nudge of `knob` in direction `dir` produces.
pub fn nudge(cfg: &SimulationConfig, knob: Knob, dir: i8) -> ConfigUpdate {
    let (step, lo, hi) = knob_range(knob);
    let bump = |v: f32| (v + step * dir.signum() as f32).clamp(lo, hi);
    match knob {
        Knob::Rate    => ConfigUpdate { emission_rate: Some(bump(cfg.emission_rate)), ..Default::default() },
        Knob::Life    => ConfigUpdate { life:          Some(bump(cfg.life)),          ..Default::default() },
        Knob::Gravity => ConfigUpdate { gravity:       Some(bump(cfg.gravity)),       ..Default::default() },
        Knob::Size    => ConfigUpdate { size:          Some(bump(cfg.size)),          ..Default::default() },
    }
}

/// Fully saturated colour one hue step on from `current`.
pub fn next_color(current: Rgb) -> Rgb {
    Rgb::from_hsv(current.hue() + HUE_STEP, 1.0, 1.0)
}

/// Apply one UI command.  Returns `false` on quit.
pub fn handle_ui(driver: &mut FrameDriver, cmd: UiCommand) -> bool {
    let cfg = driver.store().config().clone();
    match cmd {
        UiCommand::NextColor => {
            let update = ConfigUpdate::color(next_color(cfg.color));
            driver.configure(&update);
        }
        UiCommand::Nudge(knob, dir) => {
            let update = nudge(&cfg, knob, dir);
            driver.configure(&update);
        }
        UiCommand::Clear => driver.clear(),
        UiCommand::Quit  => return false,
    }
    true
}

// ════════════════════════════════════════════════════════════════════════════
// Detection channel
// ════════════════════════════════════════════════════════════════════════════

/// Feed every pending detection event into the driver.  Later snapshots
/// replace earlier ones.  Returns `false` once the source has gone away.
pub fn drain_detections(rx: &Receiver<DetectionEvent>, driver: &mut FrameDriver) -> bool {
    loop {
        match rx.try_recv() {
            Ok(DetectionEvent::Ready(false)) => {
                log::warn!("landmark source unavailable; running without hands");
                driver.set_ready(false);
            }
            Ok(DetectionEvent::Ready(true))  => driver.set_ready(true),
            Ok(DetectionEvent::Frame(snap))  => driver.submit(snap),
            Err(TryRecvError::Empty)         => return true,
            Err(TryRecvError::Disconnected)  => {
                driver.set_ready(false);
                return false;
            }
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// run
// ════════════════════════════════════════════════════════════════════════════

/// Launch the landmark source and the visualizer, then run until the window
/// closes or the user quits.
pub fn run(cfg: AppConfig) -> Result<(), AppError> {
    // ── Landmark source ───────────────────────────────────────────────────
    let (sim_tx, sim_rx) = mpsc::channel::<SimInput>();

    #[cfg(feature = "leap")]
    let detection_rx = {
        drop(sim_rx);
        spawn_landmark_source(crate::detection::LeapLandmarkSource)
    };
    #[cfg(not(feature = "leap"))]
    let detection_rx = spawn_landmark_source(SimLandmarkSource::new(sim_rx));

    // ── Visualizer (owns the window and the sim input sender) ────────────
    let mut vis = Visualizer::new(sim_tx)?;

    // ── Simulation ────────────────────────────────────────────────────────
    let mut driver = match cfg.seed {
        Some(seed) => FrameDriver::with_seed(cfg.sim, seed),
        None       => FrameDriver::new(cfg.sim),
    };

    // ── Main loop ─────────────────────────────────────────────────────────
    let mut source_alive = true;
    let mut last = Instant::now();
    while vis.is_open() {
        // 1. Window input
        for cmd in vis.poll_input() {
            if !handle_ui(&mut driver, cmd) {
                log::info!("quit requested");
                return Ok(());
            }
        }

        // 2. Latest detections
        if source_alive && !drain_detections(&detection_rx, &mut driver) {
            log::warn!("landmark source stopped; continuing without hands");
            source_alive = false;
        }

        // 3. Simulate
        let now = Instant::now();
        driver.tick(now.duration_since(last).as_secs_f32());
        last = now;

        // 4. Render
        driver.present(&mut vis);
    }

    Ok(())
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════
