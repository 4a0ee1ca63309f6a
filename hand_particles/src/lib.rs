//! # hand_particles
//!
//! Hand-gesture particle toy.  A landmark source reports hands, the
//! [`particle_core`] simulation turns their gestures into emission and forces,
//! and a software-rendered window shows the resulting point cloud.
//!
//! ## Gesture → Action mapping
//!
//! | Gesture | Action |
//! |---|---|
//! | Point (index only) | Emit particles from the index fingertip along the pointing direction |
//! | Pinch (thumb touches index) | Push particles near the fingertip back along the pointing direction |
//! | Open (all four fingers) | Push particles near the palm along the pointing direction |
//! | Peace (index + middle) | Random impulse to particles near the palm |
//! | Fist / none | Nothing; particles keep drifting |
//!
//! ## Feature flags
//!
//! * (default): **Simulation mode**, a synthetic hand follows the mouse.
//! * `leap`: **Hardware mode**, polls a real LeapMotion controller via LeapC.
//!
//! ### Keyboard shortcuts
//!
//! | Key | Effect |
//! |---|---|
//! | `1`–`5` | Simulated pose: point / pinch / peace / open / fist |
//! | `H` | Show or hide the simulated hand |
//! | `J` | Toggle a second, mirrored hand |
//! | `C` | Next particle colour |
//! | `+` / `-` | Emission rate ±10 |
//! | `[` / `]` | Life span ±0.5 s |
//! | `G` / `B` | Gravity ±0.25 |
//! | `Z` / `X` | Point size ±0.5 |
//! | `Backspace` | Clear all particles |
//! | `Q` / `Escape` | Quit |

pub mod detection;
pub mod cli;
pub mod visualizer;
pub mod app;

pub use app::{AppConfig, AppError};
