//! The particle store: emission, impulses, integration and the flat buffers
//! handed to the renderer.

use glam::Vec3;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::color::Rgb;
use crate::config::{ConfigUpdate, SimulationConfig};

/// Velocity multiplier applied once per step.  Not scaled by `dt`, so the
/// effective drag depends on the frame rate.
pub const DAMPING: f32 = 0.99;

/// Half-width of the per-axis direction jitter applied on emission.
pub const SPREAD: f32 = 0.2;

// ════════════════════════════════════════════════════════════════════════════
// Particle
// ════════════════════════════════════════════════════════════════════════════

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Particle {
    pub position: Vec3,
    pub velocity: Vec3,
    pub color:    Rgb,
    /// Remaining life in seconds.
    pub life:     f32,
    /// Life at creation.
    pub max_life: f32,
}

impl Particle {
    pub fn new(position: Vec3, velocity: Vec3, color: Rgb, life: f32) -> Self {
        Particle { position, velocity, color, life, max_life: life }
    }

    /// Advance by `dt` seconds under `gravity`.
    pub fn update(&mut self, dt: f32, gravity: f32) {
        self.velocity.y += gravity * dt;
        self.position   += self.velocity * dt;
        self.velocity   *= DAMPING;
        self.life       -= dt;
    }

    pub fn alive(&self) -> bool { self.life > 0.0 }

    /// Remaining life fraction, never negative.
    pub fn alpha(&self) -> f32 {
        (self.life / self.max_life).max(0.0)
    }
}

// ════════════════════════════════════════════════════════════════════════════
// RenderBuffer
// ════════════════════════════════════════════════════════════════════════════

/// Flat vertex data for a point cloud: `xyz` triples and premultiplied `rgb`
/// triples, one pair per particle.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RenderBuffer {
    pub positions: Vec<f32>,
    pub colors:    Vec<f32>,
}

impl RenderBuffer {
    pub fn with_capacity(points: usize) -> Self {
        RenderBuffer {
            positions: Vec::with_capacity(points * 3),
            colors:    Vec::with_capacity(points * 3),
        }
    }

    /// Number of points.
    pub fn len(&self) -> usize { self.positions.len() / 3 }

    pub fn is_empty(&self) -> bool { self.positions.is_empty() }

    /// Iterate `(position, premultiplied colour)` pairs.
    pub fn points(&self) -> impl Iterator<Item = (Vec3, Rgb)> + '_ {
        self.positions.chunks_exact(3)
            .zip(self.colors.chunks_exact(3))
            .map(|(p, c)| (Vec3::new(p[0], p[1], p[2]), Rgb::new(c[0], c[1], c[2])))
    }
}

// ════════════════════════════════════════════════════════════════════════════
// ParticleStore
// ════════════════════════════════════════════════════════════════════════════

/// Owns every live particle and the current [`SimulationConfig`].
///
/// Particles live in a packed `Vec`; order is not meaningful and dead
/// particles are swap-removed.
#[derive(Debug)]
pub struct ParticleStore {
    particles: Vec<Particle>,
    config:    SimulationConfig,
    rng:       StdRng,
}

impl ParticleStore {
    pub fn new(config: SimulationConfig) -> Self {
        Self::with_rng(config, StdRng::from_os_rng())
    }

    /// A store whose emission jitter is reproducible.
    pub fn with_seed(config: SimulationConfig, seed: u64) -> Self {
        Self::with_rng(config, StdRng::seed_from_u64(seed))
    }

    fn with_rng(config: SimulationConfig, rng: StdRng) -> Self {
        ParticleStore { particles: Vec::new(), config, rng }
    }

    pub fn config(&self) -> &SimulationConfig { &self.config }

    pub fn update_config(&mut self, update: &ConfigUpdate) {
        self.config.apply(update);
        log::debug!("config now {:?}", self.config);
    }

    pub fn particles(&self) -> &[Particle] { &self.particles }

    pub fn count(&self) -> usize { self.particles.len() }

    /// Spawn `count` particles at `origin` heading roughly along `direction`.
    pub fn emit(&mut self, origin: Vec3, direction: Vec3, count: usize) {
        let base = direction.normalize_or_zero();
        let cfg  = &self.config;
        for _ in 0..count {
            let jitter = Vec3::new(
                self.rng.random_range(-SPREAD..=SPREAD),
                self.rng.random_range(-SPREAD..=SPREAD),
                self.rng.random_range(-SPREAD..=SPREAD),
            );
            let dir      = (base + jitter).normalize_or_zero();
            let velocity = dir * cfg.speed * self.rng.random_range(0.5..1.5);
            let life     = cfg.life * self.rng.random_range(0.8..1.2);
            self.particles.push(Particle::new(origin, velocity, cfg.color, life));
        }
    }

    /// One-shot impulse: every particle strictly inside `radius` of `origin`
    /// gains `force` scaled by linear falloff (full at the centre, zero at the
    /// edge).  A non-positive radius touches nothing.
    pub fn add_force(&mut self, origin: Vec3, force: Vec3, radius: f32) {
        for p in &mut self.particles {
            let d = p.position.distance(origin);
            if d < radius {
                p.velocity += force * (1.0 - d / radius);
            }
        }
    }

    /// Integrate every particle by `dt` seconds and drop the dead.
    pub fn step(&mut self, dt: f32) {
        let gravity = self.config.gravity;
        let mut i = 0;
        while i < self.particles.len() {
            let p = &mut self.particles[i];
            p.update(dt, gravity);
            if p.alive() {
                i += 1;
            } else {
                self.particles.swap_remove(i);
            }
        }
    }

    pub fn clear(&mut self) {
        self.particles.clear();
    }

    /// Snapshot of every live particle, rebuilt from scratch on each call.
    pub fn render_buffer(&self) -> RenderBuffer {
        let mut buf = RenderBuffer::with_capacity(self.particles.len());
        for p in &self.particles {
            let c = p.color.scaled(p.alpha());
            buf.positions.extend_from_slice(&[p.position.x, p.position.y, p.position.z]);
            buf.colors.extend_from_slice(&[c.r, c.g, c.b]);
        }
        buf
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════
