//! Software-rendered point-cloud visualizer using `minifb`.
//!
//! Layout:
//!
//! ```text
//! ┌───────────────────────────────────────────────────────────────────┐
//! │ STATUS  ACTIVE                                                    │
//! │ HANDS   1                                                         │
//! │ GESTURE POINT                  ·  ·                               │
//! │ PARTICLES 412                 · ✋ ·:·.                            │
//! │                                  ·:·:·.. particles                │
//! │                                     ·.·:.                         │
//! │ colour / size / rate / life / gravity                             │
//! │ key legend                                                        │
//! └───────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The scene is viewed through a fixed pinhole camera on the +Z axis looking
//! at the origin.  Particles are splatted as size-attenuated squares with
//! additive blending, which suits their premultiplied, fading colours.

use std::sync::mpsc::Sender;

use minifb::{Key, KeyRepeat, MouseMode, Window, WindowOptions};
use particle_core::{FrameSink, FrameStatus, RenderBuffer, Rgb, Vec3};
use particle_core::landmarks::{RawLandmark, INDEX_TIP, PALM};

use crate::detection::{SimInput, SimPose};
use crate::AppError;

// ════════════════════════════════════════════════════════════════════════════
// Layout constants
// ════════════════════════════════════════════════════════════════════════════

pub const WIN_W:      usize = 960;
pub const WIN_H:      usize = 600;
const BG_COLOR:       u32   = 0xFF07070A;
const HUD_COLOR:      u32   = 0xFFEEEEEE;
const HUD_DIM:        u32   = 0xFF888888;
const HUD_ACCENT:     u32   = 0xFF00FFFF;
const LANDMARK_COLOR: u32   = 0xFFAAAAAA;
const PALM_COLOR:     u32   = 0xFFFFD700;
const TIP_COLOR:      u32   = 0xFFFF4466;
const GLYPH_SCALE:    usize = 2;
const LINE_H:         usize = 7 * GLYPH_SCALE;
const MAX_POINT_PX:   f32   = 24.0;

// ════════════════════════════════════════════════════════════════════════════
// Camera
// ════════════════════════════════════════════════════════════════════════════

/// Pinhole camera at `(0, 0, eye_z)` looking down −Z.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Camera {
    pub eye_z:    f32,
    /// tan(vertical FOV / 2)
    pub tan_half: f32,
    pub width:    f32,
    pub height:   f32,
}

impl Camera {
    pub const NEAR: f32 = 0.1;

    pub fn new(width: usize, height: usize) -> Self {
        Camera {
            eye_z:    20.0,
            tan_half: (60f32.to_radians() / 2.0).tan(),
            width:    width as f32,
            height:   height as f32,
        }
    }

    fn aspect(&self) -> f32 { self.width / self.height }

    /// Screen position and view depth of `p`, or `None` behind the near plane.
    pub fn project(&self, p: Vec3) -> Option<(f32, f32, f32)> {
        let depth = self.eye_z - p.z;
        if depth < Self::NEAR {
            return None;
        }
        let ndc_x = p.x / (depth * self.tan_half * self.aspect());
        let ndc_y = p.y / (depth * self.tan_half);
        let sx = (ndc_x + 1.0) * 0.5 * self.width;
        let sy = (1.0 - ndc_y) * 0.5 * self.height;
        Some((sx, sy, depth))
    }

    /// The point on the `z = 0` plane under screen pixel `(sx, sy)`.
    pub fn unproject(&self, sx: f32, sy: f32) -> Vec3 {
        let ndc_x = 2.0 * sx / self.width - 1.0;
        let ndc_y = 1.0 - 2.0 * sy / self.height;
        Vec3::new(
            ndc_x * self.eye_z * self.tan_half * self.aspect(),
            ndc_y * self.eye_z * self.tan_half,
            0.0,
        )
    }

    /// On-screen size of a point of world size `size` at `depth`.
    pub fn point_px(&self, size: f32, depth: f32) -> f32 {
        (size * (self.height * 0.5) / depth).clamp(1.0, MAX_POINT_PX)
    }
}

// ════════════════════════════════════════════════════════════════════════════
// UI commands
// ════════════════════════════════════════════════════════════════════════════

/// A config knob the keyboard can nudge.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Knob {
    Rate,
    Life,
    Gravity,
    Size,
}

/// Window input that is not a hand gesture.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UiCommand {
    NextColor,
    Nudge(Knob, i8),
    Clear,
    Quit,
}

// ════════════════════════════════════════════════════════════════════════════
// Canvas
// ════════════════════════════════════════════════════════════════════════════

/// The software framebuffer; tracks the window size.
pub struct Canvas {
    pixels: Vec<u32>,
    width:  usize,
    height: usize,
}

impl Canvas {
    pub fn new(width: usize, height: usize) -> Self {
        Canvas { pixels: vec![BG_COLOR; width * height], width, height }
    }

    pub fn width(&self)    -> usize  { self.width }
    pub fn height(&self)   -> usize  { self.height }
    pub fn pixels(&self)   -> &[u32] { &self.pixels }

    /// Match a new window size.  Returns true if the size changed.
    pub fn resize(&mut self, width: usize, height: usize) -> bool {
        if (width, height) == (self.width, self.height) {
            return false;
        }
        self.width  = width;
        self.height = height;
        self.pixels = vec![BG_COLOR; width * height];
        true
    }

    pub fn clear(&mut self) { self.pixels.fill(BG_COLOR); }

    pub fn pixel(&self, x: usize, y: usize) -> Option<u32> {
        (x < self.width && y < self.height).then(|| self.pixels[y * self.width + x])
    }

    /// Additively blend `color` into a rectangle (sub-pixel origin rounded).
    pub fn add_rect(&mut self, x: f32, y: f32, w: f32, h: f32, color: Rgb) {
        let add = color.to_packed();
        if add == 0 { return; }
        let x0 = x.round().max(0.0) as usize;
        let y0 = y.round().max(0.0) as usize;
        let x1 = ((x + w).round().max(0.0) as usize).min(self.width);
        let y1 = ((y + h).round().max(0.0) as usize).min(self.height);
        for row in y0..y1 {
            for col in x0..x1 {
                let px = &mut self.pixels[row * self.width + col];
                *px = add_saturating(*px, add);
            }
        }
    }

    pub fn fill_rect(&mut self, x: isize, y: isize, w: usize, h: usize, color: u32) {
        let x0 = x.max(0) as usize;
        let y0 = y.max(0) as usize;
        let x1 = ((x + w as isize).max(0) as usize).min(self.width);
        let y1 = ((y + h as isize).max(0) as usize).min(self.height);
        for row in y0..y1 {
            for col in x0..x1 {
                self.pixels[row * self.width + col] = color;
            }
        }
    }

    fn set_pixel(&mut self, x: usize, y: usize, color: u32) {
        if x < self.width && y < self.height {
            self.pixels[y * self.width + x] = color;
        }
    }

    /// 3×5 bitmap font, each font pixel drawn `GLYPH_SCALE` wide.
    pub fn draw_label(&mut self, text: &str, x: usize, y: usize, color: u32) {
        let advance = 4 * GLYPH_SCALE;
        let mut cx = x;
        for ch in text.chars() {
            for (row, &bits) in char_glyph(ch).iter().enumerate() {
                for col in 0..3usize {
                    if bits & (1 << (2 - col)) == 0 { continue; }
                    for dy in 0..GLYPH_SCALE {
                        for dx in 0..GLYPH_SCALE {
                            self.set_pixel(
                                cx + col * GLYPH_SCALE + dx,
                                y + row * GLYPH_SCALE + dy,
                                color,
                            );
                        }
                    }
                }
            }
            cx += advance;
            if cx + advance > self.width { break; }
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Visualizer
// ════════════════════════════════════════════════════════════════════════════

pub struct Visualizer {
    window:     Window,
    canvas:     Canvas,
    camera:     Camera,
    sim_tx:     Sender<SimInput>,
    last_mouse: Option<(f32, f32)>,
}

impl Visualizer {
    pub fn new(sim_tx: Sender<SimInput>) -> Result<Self, AppError> {
        let mut window = Window::new(
            "Hand Particles - gesture-driven point cloud",
            WIN_W, WIN_H,
            WindowOptions {
                resize: true,
                ..WindowOptions::default()
            },
        )?;

        window.limit_update_rate(Some(std::time::Duration::from_millis(16))); // ~60fps

        Ok(Visualizer {
            window,
            canvas: Canvas::new(WIN_W, WIN_H),
            camera: Camera::new(WIN_W, WIN_H),
            sim_tx,
            last_mouse: None,
        })
    }

    /// Returns false when the window should close.
    pub fn is_open(&self) -> bool { self.window.is_open() }

    /// Follow the window size so the projection keeps its aspect ratio.
    fn fit_to_window(&mut self) {
        let (w, h) = self.window.get_size();
        if w == 0 || h == 0 { return; }
        if self.canvas.resize(w, h) {
            self.camera = Camera::new(w, h);
            log::debug!("window resized to {}x{}", w, h);
        }
    }

    /// Poll mouse and keyboard.  Hand input goes to the simulated landmark
    /// source; everything else comes back as [`UiCommand`]s.
    pub fn poll_input(&mut self) -> Vec<UiCommand> {
        let mut out = Vec::new();
        if !self.window.is_open() {
            out.push(UiCommand::Quit);
            return out;
        }

        // ── synthetic hand ────────────────────────────────────────────────
        if let Some(pos) = self.window.get_mouse_pos(MouseMode::Clamp) {
            if self.last_mouse != Some(pos) {
                self.last_mouse = Some(pos);
                let raw = RawLandmark::from_scene(self.camera.unproject(pos.0, pos.1));
                let _ = self.sim_tx.send(SimInput::Move { x: raw.x, y: raw.y });
            }
        }

        let one_shot = |k: Key| self.window.is_key_pressed(k, KeyRepeat::No);
        let held     = |k: Key| self.window.is_key_pressed(k, KeyRepeat::Yes);

        let poses = [
            (Key::Key1, SimPose::Point),
            (Key::Key2, SimPose::Pinch),
            (Key::Key3, SimPose::Peace),
            (Key::Key4, SimPose::Open),
            (Key::Key5, SimPose::Fist),
        ];
        for (key, pose) in poses {
            if one_shot(key) {
                let _ = self.sim_tx.send(SimInput::Pose(pose));
            }
        }
        if one_shot(Key::H) { let _ = self.sim_tx.send(SimInput::ToggleHand); }
        if one_shot(Key::J) { let _ = self.sim_tx.send(SimInput::ToggleSecondHand); }

        // ── config / UI ───────────────────────────────────────────────────
        if one_shot(Key::Q) || one_shot(Key::Escape) {
            out.push(UiCommand::Quit);
            return out;
        }
        if one_shot(Key::C)         { out.push(UiCommand::NextColor); }
        if one_shot(Key::Backspace) { out.push(UiCommand::Clear); }

        let nudges = [
            (Key::Equal,        Knob::Rate,     1),
            (Key::NumPadPlus,   Knob::Rate,     1),
            (Key::Minus,        Knob::Rate,    -1),
            (Key::NumPadMinus,  Knob::Rate,    -1),
            (Key::RightBracket, Knob::Life,     1),
            (Key::LeftBracket,  Knob::Life,    -1),
            (Key::G,            Knob::Gravity,  1),
            (Key::B,            Knob::Gravity, -1),
            (Key::X,            Knob::Size,     1),
            (Key::Z,            Knob::Size,    -1),
        ];
        for (key, knob, dir) in nudges {
            if held(key) {
                out.push(UiCommand::Nudge(knob, dir));
            }
        }

        out
    }

    // ── Scene ─────────────────────────────────────────────────────────────

    fn draw_points(&mut self, buffer: &RenderBuffer, size: f32) {
        for (p, c) in buffer.points() {
            let Some((sx, sy, depth)) = self.camera.project(p) else { continue };
            let px = self.camera.point_px(size, depth);
            let half = px * 0.5;
            self.canvas.add_rect(sx - half, sy - half, px, px, c);
        }
    }

    fn draw_hands(&mut self, status: &FrameStatus<'_>) {
        for hand in status.hands {
            for (i, &lm) in hand.landmarks().iter().enumerate() {
                let Some((sx, sy, _)) = self.camera.project(lm) else { continue };
                let (color, r) = match i {
                    PALM      => (PALM_COLOR, 3),
                    INDEX_TIP => (TIP_COLOR,  3),
                    _         => (LANDMARK_COLOR, 1),
                };
                self.canvas.fill_rect(
                    sx as isize - r, sy as isize - r,
                    (2 * r + 1) as usize, (2 * r + 1) as usize,
                    color,
                );
            }
        }
    }

    // ── HUD ───────────────────────────────────────────────────────────────

    fn draw_hud(&mut self, status: &FrameStatus<'_>) {
        let cfg = status.config;
        let bottom = self.canvas.height();
        let state = if status.ready { "ACTIVE" } else { "INITIALIZING..." };
        let lines = [
            format!("STATUS    {}", state),
            format!("HANDS     {}", status.hands.len()),
            format!("GESTURE   {}", status.gesture),
            format!("PARTICLES {}", status.particles),
        ];
        for (i, line) in lines.iter().enumerate() {
            self.canvas.draw_label(line, 12, 12 + i * LINE_H, HUD_COLOR);
        }

        let swatch_y = 12 + lines.len() * LINE_H + 6;
        self.canvas.fill_rect(12, swatch_y as isize, 10, 10, 0xFF000000 | cfg.color.to_packed());
        let config_line = format!(
            "{}  SIZE {:.1}  RATE {:.0}  LIFE {:.1}  GRAVITY {:.2}",
            cfg.color, cfg.size, cfg.emission_rate, cfg.life, cfg.gravity,
        );
        self.canvas.draw_label(&config_line, 28, swatch_y, HUD_ACCENT);

        self.canvas.draw_label(
            "MOUSE=move  1-5=point/pinch/peace/open/fist  H=hand  J=2nd hand",
            12, bottom.saturating_sub(2 * LINE_H + 6), HUD_DIM,
        );
        self.canvas.draw_label(
            "C=colour  +/-=rate  [/]=life  G/B=gravity  Z/X=size  BKSP=clear  Q=quit",
            12, bottom.saturating_sub(LINE_H + 4), HUD_DIM,
        );
    }
}

impl FrameSink for Visualizer {
    fn present(&mut self, buffer: &RenderBuffer, status: &FrameStatus<'_>) {
        self.fit_to_window();
        self.canvas.clear();
        self.draw_points(buffer, status.config.size);
        self.draw_hands(status);
        self.draw_hud(status);
        let (w, h) = (self.canvas.width(), self.canvas.height());
        if let Err(e) = self.window.update_with_buffer(self.canvas.pixels(), w, h) {
            log::warn!("frame dropped: {}", e);
        }
    }
}

/// Per-channel saturating add of two `0x??RRGGBB` pixels; alpha forced opaque.
fn add_saturating(a: u32, b: u32) -> u32 {
    let ch = |shift: u32| (((a >> shift) & 0xFF) + ((b >> shift) & 0xFF)).min(0xFF) << shift;
    0xFF000000 | ch(16) | ch(8) | ch(0)
}

// ────────────────────────────────────────────────────────────────────────────
// Minimal 3×5 bitmap font
// ────────────────────────────────────────────────────────────────────────────

fn char_glyph(c: char) -> [u8; 5] {
    match c.to_ascii_uppercase() {
        '0' => [0b111, 0b101, 0b101, 0b101, 0b111],
        '1' => [0b010, 0b110, 0b010, 0b010, 0b111],
        '2' => [0b111, 0b001, 0b111, 0b100, 0b111],
        '3' => [0b111, 0b001, 0b111, 0b001, 0b111],
        '4' => [0b101, 0b101, 0b111, 0b001, 0b001],
        '5' => [0b111, 0b100, 0b111, 0b001, 0b111],
        '6' => [0b111, 0b100, 0b111, 0b101, 0b111],
        '7' => [0b111, 0b001, 0b001, 0b001, 0b001],
        '8' => [0b111, 0b101, 0b111, 0b101, 0b111],
        '9' => [0b111, 0b101, 0b111, 0b001, 0b111],
        'A' => [0b111, 0b101, 0b111, 0b101, 0b101],
        'B' => [0b110, 0b101, 0b110, 0b101, 0b110],
        'C' => [0b111, 0b100, 0b100, 0b100, 0b111],
        'D' => [0b110, 0b101, 0b101, 0b101, 0b110],
        'E' => [0b111, 0b100, 0b111, 0b100, 0b111],
        'F' => [0b111, 0b100, 0b111, 0b100, 0b100],
        'G' => [0b111, 0b100, 0b101, 0b101, 0b111],
        'H' => [0b101, 0b101, 0b111, 0b101, 0b101],
        'I' => [0b111, 0b010, 0b010, 0b010, 0b111],
        'J' => [0b001, 0b001, 0b001, 0b101, 0b111],
        'K' => [0b101, 0b101, 0b110, 0b101, 0b101],
        'L' => [0b100, 0b100, 0b100, 0b100, 0b111],
        'M' => [0b101, 0b111, 0b101, 0b101, 0b101],
        'N' => [0b111, 0b101, 0b101, 0b101, 0b101],
        'O' => [0b111, 0b101, 0b101, 0b101, 0b111],
        'P' => [0b111, 0b101, 0b111, 0b100, 0b100],
        'Q' => [0b111, 0b101, 0b101, 0b111, 0b001],
        'R' => [0b110, 0b101, 0b110, 0b101, 0b101],
        'S' => [0b111, 0b100, 0b111, 0b001, 0b111],
        'T' => [0b111, 0b010, 0b010, 0b010, 0b010],
        'U' => [0b101, 0b101, 0b101, 0b101, 0b111],
        'V' => [0b101, 0b101, 0b101, 0b010, 0b010],
        'W' => [0b101, 0b101, 0b101, 0b111, 0b101],
        'X' => [0b101, 0b101, 0b010, 0b101, 0b101],
        'Y' => [0b101, 0b101, 0b111, 0b010, 0b010],
        'Z' => [0b111, 0b001, 0b010, 0b100, 0b111],
        '#' => [0b101, 0b111, 0b101, 0b111, 0b101],
        '[' => [0b110, 0b100, 0b100, 0b100, 0b110],
        ']' => [0b011, 0b001, 0b001, 0b001, 0b011],
        '/' => [0b001, 0b001, 0b010, 0b100, 0b100],
        '-' => [0b000, 0b000, 0b111, 0b000, 0b000],
        '+' => [0b000, 0b010, 0b111, 0b010, 0b000],
        '=' => [0b000, 0b111, 0b000, 0b111, 0b000],
        '.' => [0b000, 0b000, 0b000, 0b000, 0b010],
        ':' => [0b000, 0b010, 0b000, 0b010, 0b000],
        ' ' => [0b000; 5],
        _   => [0b000, 0b000, 0b010, 0b000, 0b000],
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════
