//! Software-rendered visualizer using `minifb`.
//!
//! Layout:
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │  LEFT HAND: FREEZE BRIGHTNESS           (feedback banner)│
//! │                                                          │
//! │      ✋ skeleton            ✋ skeleton                   │
//! │      o────o pinch           o──────o pinch               │
//! │                                                          │
//! ├──────────────────────────────────────────────────────────┤
//! │  BRIGHTNESS [██████████░░░░░░░░]  52%                    │
//! │  VOLUME     [████░░░░░░░░░░░░░░]  20% (FROZEN)           │
//! │  status bar                                              │
//! │  key legend                                              │
//! └──────────────────────────────────────────────────────────┘
//! ```
//!
//! Drawing goes through [`Canvas`], which owns nothing but a pixel buffer, so
//! the layout can be rendered and inspected without opening a window.

use std::sync::mpsc::Sender;
use std::time::Duration;

use anyhow::{anyhow, Result};
use minifb::{Key, KeyRepeat, Window, WindowOptions};

use dual_channel::{value_label, ChannelState, Command};
use hand_landmarks::synth::Pose;
use hand_landmarks::{Gesture, Handedness, PixelPoint, HAND_CONNECTIONS};

use crate::app::{HandView, View};
use crate::config::DisplayConfig;
use crate::source::{SimInput, PINCH_STEP};

// ════════════════════════════════════════════════════════════════════════════
// Layout constants
// ════════════════════════════════════════════════════════════════════════════

const PANEL_H:       usize = 150;
const BAR_X:         usize = 130;
const BAR_H:         usize = 26;
const BAR_W:         usize = 480;
const BG_COLOR:      u32   = 0xFF1A1A2E;
const VIDEO_BG:      u32   = 0xFF101018;
const PANEL_BG:      u32   = 0xFF16213E;
const TEXT_BG:       u32   = 0xFF0F3460;
const LEFT_COLOR:    u32   = 0xFF4FC3F7;  // cyan
const RIGHT_COLOR:   u32   = 0xFFFFA94D;  // orange
const JOINT_COLOR:   u32   = 0xFFEEEEEE;
const PINCH_COLOR:   u32   = 0xFFFFD700;  // gold
const LIVE_COLOR:    u32   = 0xFF4CAF50;
const FROZEN_COLOR:  u32   = 0xFF5C6BC0;
const BANNER_COLOR:  u32   = 0xFFFFFF00;

pub const LEGEND: &str =
    "F=freeze all  B=brightness  V=volume  R=reset  Q/Esc=quit   sim: 1/2 hands  W/S Up/Down pinch  Z/X/C J/K/L poses";

// ════════════════════════════════════════════════════════════════════════════
// Canvas
// ════════════════════════════════════════════════════════════════════════════

pub struct Canvas {
    pub w:   usize,
    pub h:   usize,
    pub buf: Vec<u32>,
}

impl Canvas {
    pub fn new(w: usize, h: usize) -> Self {
        Canvas { w, h, buf: vec![BG_COLOR; w * h] }
    }

    pub fn pixel(&self, x: usize, y: usize) -> Option<u32> {
        if x < self.w && y < self.h { Some(self.buf[y * self.w + x]) } else { None }
    }

    pub fn clear(&mut self, color: u32) { self.buf.fill(color); }

    pub fn fill_rect(&mut self, x: usize, y: usize, w: usize, h: usize, color: u32) {
        for row in y..(y + h).min(self.h) {
            for col in x..(x + w).min(self.w) {
                self.buf[row * self.w + col] = color;
            }
        }
    }

    pub fn draw_border(&mut self, x: usize, y: usize, w: usize, h: usize, color: u32) {
        if w == 0 || h == 0 { return; }
        for col in x..(x + w).min(self.w) {
            self.set_pixel(col, y, color);
            self.set_pixel(col, y + h - 1, color);
        }
        for row in y..(y + h).min(self.h) {
            self.set_pixel(x, row, color);
            self.set_pixel(x + w - 1, row, color);
        }
    }

    pub fn set_pixel(&mut self, x: usize, y: usize, color: u32) {
        if x < self.w && y < self.h {
            self.buf[y * self.w + x] = color;
        }
    }

    /// Signed-coordinate plot; off-canvas points are dropped.
    pub fn plot(&mut self, x: i32, y: i32, color: u32) {
        if x >= 0 && y >= 0 {
            self.set_pixel(x as usize, y as usize, color);
        }
    }

    /// Bresenham line, `thick` pixels wide (square pen).  The segment is
    /// clipped to the canvas first, so the step count never exceeds its size.
    pub fn draw_line(&mut self, a: (i32, i32), b: (i32, i32), thick: i32, color: u32) {
        let r = thick.max(1) / 2;
        let hi = (self.w as i32 - 1 + r, self.h as i32 - 1 + r);
        let Some((a, b)) = clip_segment(a, b, (-r, -r), hi) else { return };
        let (mut x, mut y) = a;
        let dx = (b.0 - a.0).abs();
        let dy = -(b.1 - a.1).abs();
        let sx = if a.0 < b.0 { 1 } else { -1 };
        let sy = if a.1 < b.1 { 1 } else { -1 };
        let mut err = dx + dy;
        loop {
            for oy in -r..=r {
                for ox in -r..=r {
                    self.plot(x + ox, y + oy, color);
                }
            }
            if x == b.0 && y == b.1 { break; }
            let e2 = 2 * err;
            if e2 >= dy { err += dy; x += sx; }
            if e2 <= dx { err += dx; y += sy; }
        }
    }

    pub fn fill_circle(&mut self, cx: i32, cy: i32, r: i32, color: u32) {
        let (w, h) = (self.w as i64, self.h as i64);
        let (cx64, cy64, r64) = (cx as i64, cy as i64, r as i64);
        if cx64 + r64 < 0 || cy64 + r64 < 0 || cx64 - r64 >= w || cy64 - r64 >= h {
            return;
        }
        for dy in -r..=r {
            for dx in -r..=r {
                if dx * dx + dy * dy <= r * r {
                    self.plot(cx + dx, cy + dy, color);
                }
            }
        }
    }

    /// 3×5 bitmap text, each font pixel drawn as a `scale`×`scale` block.
    pub fn draw_text(&mut self, text: &str, x: usize, y: usize, scale: usize, color: u32) {
        let scale = scale.max(1);
        let mut cx = x;
        for ch in text.chars() {
            if cx + 3 * scale > self.w { break; }
            let glyph = char_glyph(ch);
            for (row, &bits) in glyph.iter().enumerate() {
                for col in 0..3usize {
                    if bits & (1 << (2 - col)) != 0 {
                        self.fill_rect(cx + col * scale, y + row * scale, scale, scale, color);
                    }
                }
            }
            cx += 4 * scale; // 3 wide + 1 gap
        }
    }
}

pub fn text_width(text: &str, scale: usize) -> usize {
    text.chars().count() * 4 * scale.max(1)
}

/// Liang–Barsky clip of `a`–`b` to the box `lo..=hi`; `None` when the
/// segment misses the box entirely.
fn clip_segment(
    a: (i32, i32),
    b: (i32, i32),
    lo: (i32, i32),
    hi: (i32, i32),
) -> Option<((i32, i32), (i32, i32))> {
    let (x0, y0) = (a.0 as f64, a.1 as f64);
    let (dx, dy) = (b.0 as f64 - x0, b.1 as f64 - y0);
    let (mut t0, mut t1) = (0.0_f64, 1.0_f64);
    for (p, q) in [
        (-dx, x0 - lo.0 as f64),
        ( dx, hi.0 as f64 - x0),
        (-dy, y0 - lo.1 as f64),
        ( dy, hi.1 as f64 - y0),
    ] {
        if p == 0.0 {
            if q < 0.0 { return None; }
            continue;
        }
        let t = q / p;
        if p < 0.0 {
            if t > t1 { return None; }
            t0 = t0.max(t);
        } else {
            if t < t0 { return None; }
            t1 = t1.min(t);
        }
    }
    let at = |t: f64| ((x0 + dx * t).round() as i32, (y0 + dy * t).round() as i32);
    Some((at(t0), at(t1)))
}

// ════════════════════════════════════════════════════════════════════════════
// Layout
// ════════════════════════════════════════════════════════════════════════════

/// Uniform frame → window mapping that letterboxes into the video area.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FrameFit {
    pub scale: f32,
    pub ox:    f32,
    pub oy:    f32,
}

impl FrameFit {
    pub fn new(frame: (u32, u32), area: (usize, usize)) -> Self {
        let (fw, fh) = (frame.0.max(1) as f32, frame.1.max(1) as f32);
        let (aw, ah) = (area.0 as f32, area.1 as f32);
        let scale = (aw / fw).min(ah / fh);
        FrameFit { scale, ox: (aw - fw * scale) / 2.0, oy: (ah - fh * scale) / 2.0 }
    }

    pub fn map(&self, p: PixelPoint) -> (i32, i32) {
        (
            (self.ox + p.x as f32 * self.scale) as i32,
            (self.oy + p.y as f32 * self.scale) as i32,
        )
    }
}

fn hand_color(side: Handedness) -> u32 {
    match side {
        Handedness::Left  => LEFT_COLOR,
        Handedness::Right => RIGHT_COLOR,
    }
}

/// Render the whole screen for one [`View`].
pub fn paint(c: &mut Canvas, view: &View) {
    c.clear(BG_COLOR);
    let video_h = c.h.saturating_sub(PANEL_H);

    // ── Video area ────────────────────────────────────────────────────────
    let fit = FrameFit::new(view.frame_size, (c.w, video_h));
    c.fill_rect(0, 0, c.w, video_h, VIDEO_BG);
    for hand in view.hands {
        draw_hand(c, hand, &fit);
    }

    // ── Feedback banner ───────────────────────────────────────────────────
    if let Some(text) = view.banner {
        let text = text.to_uppercase();
        let tw = text_width(&text, 4);
        let x = c.w.saturating_sub(tw) / 2;
        c.fill_rect(x.saturating_sub(12), 12, tw + 24, 44, TEXT_BG);
        c.draw_text(&text, x, 22, 4, BANNER_COLOR);
    }

    // ── Bars ──────────────────────────────────────────────────────────────
    c.fill_rect(0, video_h, c.w, PANEL_H, PANEL_BG);
    draw_bar(c, "BRIGHTNESS", &view.brightness, video_h + 14);
    draw_bar(c, "VOLUME",     &view.volume,     video_h + 14 + BAR_H + 12);

    // ── Status bar ────────────────────────────────────────────────────────
    let status_y = c.h.saturating_sub(44);
    c.fill_rect(0, status_y, c.w, 24, TEXT_BG);
    c.draw_text(view.status, 10, status_y + 9, 1, 0xFFEEEEEE);

    // ── Key legend ────────────────────────────────────────────────────────
    c.draw_text(LEGEND, 10, c.h.saturating_sub(14), 1, 0xFF888888);
}

fn draw_hand(c: &mut Canvas, hand: &HandView, fit: &FrameFit) {
    let color = hand_color(hand.handedness);
    let at = |i: u8| hand.points.get(i as usize).copied().flatten().map(|p| fit.map(p));

    for &(a, b) in HAND_CONNECTIONS.iter() {
        if let (Some(pa), Some(pb)) = (at(a), at(b)) {
            c.draw_line(pa, pb, 2, color);
        }
    }
    for p in hand.points.iter().flatten() {
        let (x, y) = fit.map(*p);
        c.fill_circle(x, y, 3, JOINT_COLOR);
    }

    if let Some((thumb, index)) = hand.pinch {
        let (a, b) = (fit.map(thumb), fit.map(index));
        c.draw_line(a, b, 3, PINCH_COLOR);
        c.fill_circle(a.0, a.1, 6, PINCH_COLOR);
        c.fill_circle(b.0, b.1, 6, PINCH_COLOR);
        let mx = ((a.0 as i64 + b.0 as i64) / 2).max(0) as usize;
        let my = ((a.1 as i64 + b.1 as i64) / 2 - 16).max(0) as usize;
        c.draw_text(&format!("{}px", hand.distance as i32), mx, my, 2, PINCH_COLOR);
    }

    // name + gesture above the wrist
    if let Some((x, y)) = at(0) {
        let label = match hand.gesture {
            Gesture::None => hand.handedness.name().to_uppercase(),
            g             => format!("{} {}", hand.handedness.name().to_uppercase(), g),
        };
        c.draw_text(&label, x.max(0) as usize, y.saturating_add(14).max(0) as usize, 2, color);
    }
}

fn draw_bar(c: &mut Canvas, name: &str, st: &ChannelState, y: usize) {
    c.draw_text(name, 12, y + 8, 2, 0xFFEEEEEE);
    let fill = if st.frozen { FROZEN_COLOR } else { LIVE_COLOR };
    let w = BAR_W * st.value().min(100) as usize / 100;
    c.fill_rect(BAR_X, y, BAR_W, BAR_H, VIDEO_BG);
    c.fill_rect(BAR_X, y, w, BAR_H, fill);
    c.draw_border(BAR_X, y, BAR_W, BAR_H, 0xFF888888);
    c.draw_text(&value_label(st), BAR_X + BAR_W + 16, y + 8, 2, 0xFFEEEEEE);
}

// ════════════════════════════════════════════════════════════════════════════
// Visualizer
// ════════════════════════════════════════════════════════════════════════════

/// What the keyboard asked for this cycle.
#[derive(Debug, Default, PartialEq)]
pub struct Polled {
    pub quit:     bool,
    pub commands: Vec<Command>,
}

pub struct Visualizer {
    window: Window,
    canvas: Canvas,
    sim_tx: Sender<SimInput>,
}

const HOLD_KEYS: [(Key, Handedness, Pose); 6] = [
    (Key::Z, Handedness::Left,  Pose::Fist),
    (Key::X, Handedness::Left,  Pose::FourFingers),
    (Key::C, Handedness::Left,  Pose::ThumbsUp),
    (Key::J, Handedness::Right, Pose::Fist),
    (Key::K, Handedness::Right, Pose::FourFingers),
    (Key::L, Handedness::Right, Pose::ThumbsUp),
];

const PINCH_KEYS: [(Key, Handedness, f32); 4] = [
    (Key::W,    Handedness::Left,   PINCH_STEP),
    (Key::S,    Handedness::Left,  -PINCH_STEP),
    (Key::Up,   Handedness::Right,  PINCH_STEP),
    (Key::Down, Handedness::Right, -PINCH_STEP),
];

impl Visualizer {
    pub fn new(cfg: &DisplayConfig, sim_tx: Sender<SimInput>) -> Result<Self> {
        let mut window = Window::new(
            "Gesture Control: Brightness & Volume",
            cfg.width, cfg.height,
            WindowOptions {
                resize: false,
                ..WindowOptions::default()
            },
        ).map_err(|e| anyhow!("opening window: {}", e))?;

        window.limit_update_rate(Some(Duration::from_millis(16))); // ~60fps

        Ok(Visualizer {
            window,
            canvas: Canvas::new(cfg.width, cfg.height),
            sim_tx,
        })
    }

    pub fn is_open(&self) -> bool { self.window.is_open() }

    /// Poll the keyboard: commands and quit come back, simulator keys go to
    /// the sim source.
    pub fn poll_input(&mut self) -> Polled {
        let mut polled = Polled::default();
        if !self.window.is_open() {
            polled.quit = true;
            return polled;
        }

        let one_shot = |k: Key| self.window.is_key_pressed(k, KeyRepeat::No);
        let held     = |k: Key| self.window.is_key_pressed(k, KeyRepeat::Yes);

        if one_shot(Key::Q) || one_shot(Key::Escape) {
            polled.quit = true;
            return polled;
        }
        for (key, c) in [(Key::F, 'f'), (Key::B, 'b'), (Key::V, 'v'), (Key::R, 'r')] {
            if one_shot(key) {
                polled.commands.extend(Command::from_key(c));
            }
        }

        // ── simulator ─────────────────────────────────────────────────────
        let mut sim = Vec::new();
        if one_shot(Key::Key1) { sim.push(SimInput::ToggleHand(Handedness::Left)); }
        if one_shot(Key::Key2) { sim.push(SimInput::ToggleHand(Handedness::Right)); }
        for &(key, side, step) in PINCH_KEYS.iter() {
            if held(key) { sim.push(SimInput::Pinch(side, step)); }
        }
        for &(key, side, pose) in HOLD_KEYS.iter() {
            if one_shot(key) { sim.push(SimInput::Hold(side, Some(pose))); }
            if self.window.is_key_released(key) { sim.push(SimInput::Hold(side, None)); }
        }
        for input in sim {
            let _ = self.sim_tx.send(input);
        }

        polled
    }

    pub fn render(&mut self, view: &View) {
        paint(&mut self.canvas, view);
        self.window.update_with_buffer(&self.canvas.buf, self.canvas.w, self.canvas.h).ok();
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Minimal 3×5 bitmap font
// ────────────────────────────────────────────────────────────────────────────

fn char_glyph(c: char) -> [u8; 5] {
    match c {
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
        'a' | 'A' => [0b111, 0b101, 0b111, 0b101, 0b101],
        'b' | 'B' => [0b110, 0b101, 0b110, 0b101, 0b110],
        'c' | 'C' => [0b111, 0b100, 0b100, 0b100, 0b111],
        'd' | 'D' => [0b110, 0b101, 0b101, 0b101, 0b110],
        'e' | 'E' => [0b111, 0b100, 0b111, 0b100, 0b111],
        'f' | 'F' => [0b111, 0b100, 0b111, 0b100, 0b100],
        'g' | 'G' => [0b111, 0b100, 0b101, 0b101, 0b111],
        'h' | 'H' => [0b101, 0b101, 0b111, 0b101, 0b101],
        'i' | 'I' => [0b111, 0b010, 0b010, 0b010, 0b111],
        'j' | 'J' => [0b001, 0b001, 0b001, 0b101, 0b111],
        'k' | 'K' => [0b101, 0b101, 0b110, 0b101, 0b101],
        'l' | 'L' => [0b100, 0b100, 0b100, 0b100, 0b111],
        'm' | 'M' => [0b101, 0b111, 0b101, 0b101, 0b101],
        'n' | 'N' => [0b111, 0b101, 0b101, 0b101, 0b101],
        'o' | 'O' => [0b111, 0b101, 0b101, 0b101, 0b111],
        'p' | 'P' => [0b111, 0b101, 0b111, 0b100, 0b100],
        'q' | 'Q' => [0b111, 0b101, 0b101, 0b111, 0b001],
        'r' | 'R' => [0b110, 0b101, 0b110, 0b101, 0b101],
        's' | 'S' => [0b111, 0b100, 0b111, 0b001, 0b111],
        't' | 'T' => [0b111, 0b010, 0b010, 0b010, 0b010],
        'u' | 'U' => [0b101, 0b101, 0b101, 0b101, 0b111],
        'v' | 'V' => [0b101, 0b101, 0b101, 0b010, 0b010],
        'w' | 'W' => [0b101, 0b101, 0b101, 0b111, 0b101],
        'x' | 'X' => [0b101, 0b101, 0b010, 0b101, 0b101],
        'y' | 'Y' => [0b101, 0b101, 0b111, 0b010, 0b010],
        'z' | 'Z' => [0b111, 0b001, 0b010, 0b100, 0b111],
        '/' => [0b001, 0b001, 0b010, 0b100, 0b100],
        '-' => [0b000, 0b000, 0b111, 0b000, 0b000],
        '.' => [0b000, 0b000, 0b000, 0b000, 0b010],
        ',' => [0b000, 0b000, 0b000, 0b010, 0b100],
        ':' => [0b000, 0b010, 0b000, 0b010, 0b000],
        '=' => [0b000, 0b111, 0b000, 0b111, 0b000],
        '+' => [0b000, 0b010, 0b111, 0b010, 0b000],
        '%' => [0b101, 0b001, 0b010, 0b100, 0b101],
        '(' => [0b010, 0b100, 0b100, 0b100, 0b010],
        ')' => [0b010, 0b001, 0b001, 0b001, 0b010],
        '|' => [0b010, 0b010, 0b010, 0b010, 0b010],
        '&' => [0b010, 0b101, 0b010, 0b101, 0b011],
        ' ' => [0b000, 0b000, 0b000, 0b000, 0b000],
        _   => [0b000, 0b000, 0b010, 0b000, 0b000], // fallback dot
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dual_channel::{ChannelState, ControlMapper};
    use hand_landmarks::synth::HandSketch;
    use hand_landmarks::Frame;

    #[test]
    fn line_hits_both_ends() {
        let mut c = Canvas::new(50, 50);
        c.draw_line((2, 3), (40, 20), 1, 0xFFFFFFFF);
        assert_eq!(c.pixel(2, 3), Some(0xFFFFFFFF));
        assert_eq!(c.pixel(40, 20), Some(0xFFFFFFFF));
        assert_eq!(c.pixel(40, 3), Some(BG_COLOR));
    }

    #[test]
    fn drawing_off_canvas_is_clipped() {
        let mut c = Canvas::new(10, 10);
        c.draw_line((-20, -20), (30, 30), 3, 0xFF00FF00);
        c.fill_circle(-5, 5, 4, 0xFF00FF00);
        c.draw_text("overflowing text", 8, 8, 3, 0xFF00FF00);
        c.draw_border(5, 5, 20, 20, 0xFF00FF00);
        assert_eq!(c.pixel(5, 5), Some(0xFF00FF00));
        assert_eq!(c.pixel(10, 10), None);
    }

    #[test]
    fn extreme_segments_are_clipped() {
        let mut c = Canvas::new(40, 30);
        c.draw_line((i32::MIN, 15), (i32::MAX, 15), 1, 0xFFFFFFFF);
        assert_eq!(c.pixel(0, 15), Some(0xFFFFFFFF));
        assert_eq!(c.pixel(39, 15), Some(0xFFFFFFFF));
        c.draw_line((i32::MIN, i32::MIN), (-1, i32::MIN), 3, 0xFF00FF00);
        c.fill_circle(i32::MAX, i32::MAX, 6, 0xFF00FF00);
        assert!(!c.buf.iter().any(|&p| p == 0xFF00FF00));
    }

    #[test]
    fn clip_keeps_inside_segment() {
        assert_eq!(clip_segment((2, 3), (8, 9), (0, 0), (10, 10)), Some(((2, 3), (8, 9))));
        assert_eq!(clip_segment((-10, 5), (20, 5), (0, 0), (10, 10)), Some(((0, 5), (10, 5))));
        assert_eq!(clip_segment((-10, -5), (20, -5), (0, 0), (10, 10)), None);
    }

    #[test]
    fn off_frame_hand_paints_without_stalling() {
        let line = format!(
            r#"{{"width":640,"height":480,"hands":[{{"handedness":"Right","landmarks":[{}]}}]}}"#,
            (0..21)
                .map(|i| if i % 2 == 0 { r#"{"x":1e10,"y":-1e10}"# } else { r#"{"x":-1e10,"y":1e10}"# })
                .collect::<Vec<_>>()
                .join(",")
        );
        let frame = hand_landmarks::decode_frame(&line, (640, 480)).unwrap();
        let mut app = crate::app::AppState::new(
            ControlMapper::default(),
            Box::new(control_sinks::NullSink),
            Box::new(control_sinks::NullSink),
            Duration::from_millis(10),
        );
        app.process_frame(&frame, std::time::Instant::now());
        let mut c = Canvas::new(320, 240);
        paint(&mut c, &app.view());
        assert!(c.buf.iter().any(|&p| p == RIGHT_COLOR));
    }

    #[test]
    fn fit_letterboxes() {
        let fit = FrameFit::new((640, 480), (960, 570));
        assert!((fit.scale - 570.0 / 480.0).abs() < 1e-5);
        assert!(fit.oy.abs() < 1e-3);
        assert!(fit.ox > 0.0);
        let (x, y) = fit.map(PixelPoint { x: 0, y: 0 });
        assert_eq!((x, y), (fit.ox as i32, 0));
    }

    #[test]
    fn text_width_counts_chars() {
        assert_eq!(text_width("52%", 2), 24);
        assert_eq!(text_width("", 4), 0);
    }

    #[test]
    fn bars_reflect_values() {
        let mut c = Canvas::new(960, 720);
        let live = ChannelState { smoothed: 50.0, ..ChannelState::default() };
        let frozen = ChannelState::default().freeze();
        let view = View {
            frame_size: (640, 480),
            hands:      &[],
            brightness: live,
            volume:     frozen,
            status:     "Ready",
            banner:     Some("Left hand: FREEZE BRIGHTNESS"),
        };
        paint(&mut c, &view);
        let bar_y = 720 - PANEL_H + 14 + BAR_H / 2;
        // brightness bar filled to the middle, not beyond
        assert_eq!(c.pixel(BAR_X + 10, bar_y), Some(LIVE_COLOR));
        assert_eq!(c.pixel(BAR_X + BAR_W / 2 + 10, bar_y), Some(VIDEO_BG));
        // banner drawn somewhere on the top rows
        assert!((0..c.w).any(|x| c.pixel(x, 24) == Some(BANNER_COLOR)));
    }

    #[test]
    fn paints_hand_skeleton() {
        let frame = Frame::new(640, 480, vec![HandSketch::new(Handedness::Left, Pose::Pinch).build()]);
        let mut app = crate::app::AppState::new(
            ControlMapper::default(),
            Box::new(control_sinks::NullSink),
            Box::new(control_sinks::NullSink),
            Duration::from_millis(10),
        );
        app.process_frame(&frame, std::time::Instant::now());
        let mut c = Canvas::new(960, 720);
        paint(&mut c, &app.view());
        assert!(c.buf.iter().any(|&p| p == LEFT_COLOR));
        assert!(c.buf.iter().any(|&p| p == PINCH_COLOR));
        assert!(!c.buf.iter().any(|&p| p == RIGHT_COLOR));
    }
}
