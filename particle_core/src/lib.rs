//! # particle_core
//!
//! The simulation side of a hand-gesture particle toy: raw hand landmarks go
//! in, a flat point-cloud buffer comes out.
//!
//! ## Pipeline (one frame)
//!
//! ```text
//! RawDetection ─▶ HandPose ─▶ Gesture ─▶ DetectionSnapshot
//!                                              │
//!                         IntentDispatcher ◀───┘
//!                               │ emit / add_force
//!                               ▼
//!                         ParticleStore ─step(dt)─▶ RenderBuffer ─▶ FrameSink
//! ```
//!
//! ## Gesture → action mapping
//!
//! | Gesture | Action |
//! |---|---|
//! | Point | Emit `ceil(rate × 0.02)` particles from the index tip along palm→index |
//! | Pinch | Push particles within 4 units of the index tip back along index→palm |
//! | Open  | Push particles within 6 units of the palm along palm→index |
//! | Peace | Random impulse to particles within 8 units of the palm |
//! | Fist / None | Nothing |
//!
//! Everything here is single-threaded and allocation-light; the only
//! randomness comes from seedable `StdRng`s so runs can be reproduced.
//!
//! ## Quick start
//!
//! ```rust
//! use particle_core::{FrameDriver, SimulationConfig, DetectionSnapshot};
//!
//! let mut driver = FrameDriver::with_seed(SimulationConfig::default(), 42);
//! driver.set_ready(true);
//! driver.submit(DetectionSnapshot::default());
//! driver.tick(1.0 / 60.0);
//! assert_eq!(driver.store().count(), 0);
//! ```

pub mod color;
pub mod config;
pub mod landmarks;
pub mod gesture;
pub mod particles;
pub mod dispatch;
pub mod frame;

pub use color::{ColorParseError, Rgb};
pub use config::{ConfigUpdate, SimulationConfig};
pub use dispatch::{DetectionSnapshot, IntentDispatcher};
pub use frame::{FrameDriver, FrameSink, FrameStatus, MAX_DT};
pub use gesture::{classify, Gesture};
pub use landmarks::{HandPose, Handedness, RawDetection, RawLandmark, LANDMARK_COUNT};
pub use particles::{Particle, ParticleStore, RenderBuffer};

pub use glam::Vec3;
