//! Simulation parameters and partial overrides.

use serde::Deserialize;

use crate::color::Rgb;

// ════════════════════════════════════════════════════════════════════════════
// SimulationConfig
// ════════════════════════════════════════════════════════════════════════════

/// Parameters read every tick by the particle store and the dispatcher.
///
/// Values are not validated.  A negative `life` yields particles that die on
/// the next step, a negative `emission_rate` emits nothing; neither panics.
#[derive(Clone, Debug, PartialEq)]
pub struct SimulationConfig {
    pub color:         Rgb,
    /// Point size in world units (size-attenuated by the renderer).
    pub size:          f32,
    /// Particles per second while pointing.
    pub emission_rate: f32,
    /// Base life span in seconds; each particle gets ±20 %.
    pub life:          f32,
    /// Vertical acceleration, units/s².
    pub gravity:       f32,
    /// Base emission speed, units/s; each particle gets ×0.5–1.5.
    pub speed:         f32,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        SimulationConfig {
            color:         Rgb::CYAN,
            size:          1.0,
            emission_rate: 60.0,
            life:          2.5,
            gravity:       -0.5,
            speed:         6.0,
        }
    }
}

impl SimulationConfig {
    /// Overwrite every field that `update` carries.
    pub fn apply(&mut self, update: &ConfigUpdate) {
        if let Some(c) = update.color         { self.color = c; }
        if let Some(s) = update.size          { self.size = s; }
        if let Some(r) = update.emission_rate { self.emission_rate = r; }
        if let Some(l) = update.life          { self.life = l; }
        if let Some(g) = update.gravity       { self.gravity = g; }
        if let Some(s) = update.speed         { self.speed = s; }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// ConfigUpdate
// ════════════════════════════════════════════════════════════════════════════

/// A partial override of [`SimulationConfig`].  `None` keeps the current value.
///
/// Deserialises from JSON such as
/// `{"color": "#ff00ff", "emissionRate": 120, "gravity": -1.5}`.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase", deny_unknown_fields)]
pub struct ConfigUpdate {
    pub color:         Option<Rgb>,
    pub size:          Option<f32>,
    #[serde(alias = "emission_rate", alias = "rate")]
    pub emission_rate: Option<f32>,
    pub life:          Option<f32>,
    pub gravity:       Option<f32>,
    pub speed:         Option<f32>,
}

impl ConfigUpdate {
    pub fn is_empty(&self) -> bool {
        *self == ConfigUpdate::default()
    }

    /// Layer `other` on top of `self`; fields set in `other` win.
    pub fn merged(mut self, other: &ConfigUpdate) -> Self {
        self.color         = other.color.or(self.color);
        self.size          = other.size.or(self.size);
        self.emission_rate = other.emission_rate.or(self.emission_rate);
        self.life          = other.life.or(self.life);
        self.gravity       = other.gravity.or(self.gravity);
        self.speed         = other.speed.or(self.speed);
        self
    }

    pub fn color(color: Rgb) -> Self {
        ConfigUpdate { color: Some(color), ..Default::default() }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════
