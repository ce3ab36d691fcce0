//! Top-level application state machine.
//!
//! `AppState` owns the `DualChannel`, the mapper and both output sinks.  It
//! consumes one landmark [`Frame`] per cycle plus any keyboard
//! [`Command`]s, and exposes a [`View`] for the visualizer.

use std::io::Write;
use std::sync::mpsc;
use std::thread;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use log::{debug, error, info, warn};

use control_sinks::{open_brightness, open_volume, BrightnessSink, NullSink, VolumeRange, VolumeSink};
use dual_channel::{value_label, Channel, ChannelState, Command, ControlMapper, DualChannel, Transition};
use hand_landmarks::{classify, pinch_distance, pinch_points, Frame, Gesture, Hand, Handedness, PixelPoint, LANDMARK_COUNT};

use crate::config::Config;
use crate::source::{open_source, SourceError};
use crate::visualizer::Visualizer;

pub const NO_HANDS: &str = "No hands detected - place your hands in front of the camera";

// ════════════════════════════════════════════════════════════════════════════
// Display model
// ════════════════════════════════════════════════════════════════════════════

/// One hand as the visualizer needs it, in frame pixel coordinates.
#[derive(Clone, Debug, PartialEq)]
pub struct HandView {
    pub handedness: Handedness,
    /// Indexed by landmark number; `None` where the detector gave no point.
    pub points:     Vec<Option<PixelPoint>>,
    pub pinch:      Option<(PixelPoint, PixelPoint)>,
    pub distance:   f32,
    pub gesture:    Gesture,
}

impl HandView {
    fn of(hand: &Hand, width: u32, height: u32) -> Self {
        HandView {
            handedness: hand.handedness,
            points: (0..LANDMARK_COUNT as u8)
                .map(|i| hand.get(i).map(|lm| PixelPoint::from_landmark(lm, width, height)))
                .collect(),
            pinch:    pinch_points(hand, width, height),
            distance: pinch_distance(hand, width, height),
            gesture:  classify(hand),
        }
    }
}

/// Everything drawn in one frame.
pub struct View<'a> {
    pub frame_size: (u32, u32),
    pub hands:      &'a [HandView],
    pub brightness: ChannelState,
    pub volume:     ChannelState,
    pub status:     &'a str,
    pub banner:     Option<&'a str>,
}

/// Gesture / command feedback shown for a fixed time.
#[derive(Clone, Debug, PartialEq)]
struct Banner {
    text:  String,
    until: Instant,
}

// ════════════════════════════════════════════════════════════════════════════
// AppState
// ════════════════════════════════════════════════════════════════════════════

pub struct AppState {
    dual:       DualChannel,
    mapper:     ControlMapper,

    // ── outputs ──────────────────────────────────────────────────────────
    brightness: Box<dyn BrightnessSink>,
    volume:     Box<dyn VolumeSink>,
    vol_range:  VolumeRange,

    // ── display ──────────────────────────────────────────────────────────
    frame_size: (u32, u32),
    hands:      Vec<HandView>,
    banner:     Option<Banner>,
    feedback:   Duration,
    pub status: String,

    /// Every processed frame is appended here as a JSON line when set.
    recorder:   Option<Box<dyn Write>>,
}

impl AppState {
    pub fn new(
        mapper: ControlMapper,
        brightness: Box<dyn BrightnessSink>,
        volume: Box<dyn VolumeSink>,
        feedback: Duration,
    ) -> Self {
        let vol_range = volume.range();
        info!(
            "[app] brightness → {}, volume → {} [{}, {}]",
            brightness.name(), volume.name(), vol_range.min, vol_range.max
        );
        AppState {
            dual: DualChannel::new(),
            mapper,
            brightness,
            volume,
            vol_range,
            frame_size: (0, 0),
            hands: Vec::new(),
            banner: None,
            feedback,
            status: format!("Ready - {}", NO_HANDS),
            recorder: None,
        }
    }

    pub fn with_recorder(mut self, out: Box<dyn Write>) -> Self {
        self.recorder = Some(out);
        self
    }

    pub fn dual(&self) -> DualChannel { self.dual }

    // ── one landmark frame ────────────────────────────────────────────────

    pub fn process_frame(&mut self, frame: &Frame, now: Instant) {
        self.record(frame);

        for side in frame.duplicated_sides() {
            debug!("[app] {} hand detected twice, using the last one", side);
        }
        let (w, h) = (frame.width, frame.height);

        // 1. gestures, left hand first
        for side in Handedness::all() {
            if let Some(hand) = frame.hand(side) {
                let (next, t) = self.dual.apply_gesture(side, classify(hand));
                self.dual = next;
                if let Some(t) = t {
                    self.announce(format!("{} hand: {}", side, t.label()), now);
                    if t == Transition::Reset {
                        self.write_reset();
                    }
                }
            }
        }

        // 2. live mapping for present hands on unfrozen channels
        let mut updated = Vec::with_capacity(2);
        for ch in Channel::all() {
            if let Some(hand) = frame.hand(ch.hand()) {
                if !self.dual.state(ch).frozen {
                    self.dual = self.dual.observe(ch, pinch_distance(hand, w, h), &self.mapper);
                    updated.push(ch);
                }
            }
        }

        // 3. outputs for channels that moved this frame
        for ch in updated {
            self.write_channel(ch);
        }

        // 4. display model
        self.frame_size = (w, h);
        self.hands = Handedness::all().iter()
            .filter_map(|&side| frame.hand(side))
            .map(|hand| HandView::of(hand, w, h))
            .collect();
        self.refresh_status();
    }

    // ── keyboard commands ─────────────────────────────────────────────────

    pub fn handle_command(&mut self, cmd: Command, now: Instant) {
        let (next, t) = self.dual.apply_command(cmd);
        self.dual = next;
        self.announce(t.label(), now);
        if t == Transition::Reset {
            self.write_reset();
        }
        self.refresh_status();
    }

    /// The landmark source is gone; keep the window up with a notice.
    pub fn source_lost(&mut self, err: &SourceError, now: Instant) {
        self.hands.clear();
        self.announce(format!("Source stopped: {}", err), now);
        self.refresh_status();
    }

    // ── per-cycle tick ────────────────────────────────────────────────────

    pub fn tick(&mut self, now: Instant) {
        if matches!(self.banner, Some(ref b) if now >= b.until) {
            self.banner = None;
        }
    }

    // ── accessors for the render loop ─────────────────────────────────────

    pub fn banner(&self) -> Option<&str> { self.banner.as_ref().map(|b| b.text.as_str()) }

    pub fn view(&self) -> View<'_> {
        View {
            frame_size: self.frame_size,
            hands:      &self.hands,
            brightness: self.dual.state(Channel::Brightness),
            volume:     self.dual.state(Channel::Volume),
            status:     &self.status,
            banner:     self.banner(),
        }
    }

    pub fn label(&self, ch: Channel) -> String {
        value_label(&self.dual.state(ch))
    }

    // ── internals ─────────────────────────────────────────────────────────

    fn announce(&mut self, text: String, now: Instant) {
        info!("[app] {}", text);
        self.banner = Some(Banner { text, until: now + self.feedback });
    }

    fn write_channel(&mut self, ch: Channel) {
        let percent = self.dual.state(ch).value();
        let result = match ch {
            Channel::Brightness => self.brightness.set_brightness(percent),
            Channel::Volume     => self.volume.set_level(self.vol_range.level_for_percent(percent as f32)),
        };
        if let Err(e) = result {
            warn!("[app] {} output failed: {}", ch, e);
        }
    }

    fn write_reset(&mut self) {
        if let Err(e) = self.brightness.set_brightness(0) {
            warn!("[app] brightness reset failed: {}", e);
        }
        if let Err(e) = self.volume.set_level(self.vol_range.min) {
            warn!("[app] volume reset failed: {}", e);
        }
    }

    fn record(&mut self, frame: &Frame) {
        if let Some(out) = self.recorder.as_mut() {
            if let Err(e) = writeln!(out, "{}", frame.to_json_line()) {
                warn!("[app] recording stopped: {}", e);
                self.recorder = None;
            }
        }
    }

    fn refresh_status(&mut self) {
        let mut parts = Vec::new();

        let frozen: Vec<String> = Channel::all().iter()
            .filter(|&&ch| self.dual.state(ch).frozen)
            .map(|&ch| format!("{} frozen at {}%", ch, self.dual.state(ch).value()))
            .collect();
        if !frozen.is_empty() {
            parts.push(frozen.join(", "));
        }

        let detected: Vec<String> = self.hands.iter()
            .map(|h| format!(
                "{} hand detected ({} control)",
                h.handedness,
                Channel::for_hand(h.handedness).name().to_lowercase()
            ))
            .collect();
        if detected.is_empty() {
            parts.push(NO_HANDS.to_string());
        } else {
            parts.push(detected.join(", "));
        }

        self.status = format!("Ready - {}", parts.join(" | "));
    }
}

// ════════════════════════════════════════════════════════════════════════════
// run(): the main application loop
// ════════════════════════════════════════════════════════════════════════════

/// Options that only exist on the command line.
#[derive(Clone, Debug, Default)]
pub struct RunOptions {
    /// Use null sinks regardless of the configured backends.
    pub dry_run: bool,
    /// Append every processed frame to this JSON-lines file.
    pub record:  Option<std::path::PathBuf>,
}

/// Run the full application until the window closes or Q/Esc is pressed.
pub fn run(cfg: Config, opts: RunOptions) -> Result<()> {
    // ── Sim input channel (unused unless the source is the simulator) ─────
    let (sim_tx, sim_rx) = mpsc::channel();
    let mut source = open_source(&cfg.source, Some(sim_rx)).context("opening landmark source")?;
    info!("[app] landmark source: {}", source.name());

    // ── Outputs ───────────────────────────────────────────────────────────
    let brightness: Box<dyn BrightnessSink>;
    let volume: Box<dyn VolumeSink>;
    if opts.dry_run {
        info!("[app] dry run, outputs disabled");
        brightness = Box::new(NullSink);
        volume = Box::new(NullSink);
    } else {
        brightness = open_brightness(cfg.brightness.backend, cfg.brightness.device.as_ref());
        volume = open_volume(cfg.volume.backend, cfg.volume.range());
    }

    let mut app = AppState::new(
        cfg.mapping.mapper(),
        brightness,
        volume,
        Duration::from_millis(cfg.display.feedback_ms),
    );
    if let Some(path) = &opts.record {
        let file = std::fs::File::create(path)
            .with_context(|| format!("creating {}", path.display()))?;
        info!("[app] recording frames to {}", path.display());
        app = app.with_recorder(Box::new(std::io::BufWriter::new(file)));
    }

    // ── Visualizer (owns the window and the sim input sender) ────────────
    let mut vis = Visualizer::new(&cfg.display, sim_tx)?;
    let delay = Duration::from_millis(cfg.display.frame_delay_ms);
    let mut live = true;

    // ── Main loop ─────────────────────────────────────────────────────────
    while vis.is_open() {
        let now = Instant::now();

        // 1. Keyboard
        let input = vis.poll_input();
        if input.quit { break; }
        for cmd in input.commands {
            app.handle_command(cmd, now);
        }

        // 2. One landmark frame
        if live {
            match source.next_frame() {
                Ok(Some(frame)) => app.process_frame(&frame, now),
                Ok(None) => {}
                Err(e) if e.is_terminal() => {
                    error!("[app] {}", e);
                    app.source_lost(&e, now);
                    live = false;
                }
                Err(e) => warn!("[app] frame skipped: {}", e),
            }
        }

        // 3. Per-frame logic and render
        app.tick(now);
        vis.render(&app.view());

        thread::sleep(delay);
    }

    info!("[app] shutting down");
    Ok(())
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use control_sinks::MemorySink;
    use hand_landmarks::synth::{HandSketch, Pose};
    use std::sync::{Arc, Mutex};

    const W: u32 = 1000;
    const H: u32 = 1000;

    struct Rig {
        app:        AppState,
        brightness: MemorySink,
        volume:     MemorySink,
        t0:         Instant,
    }

    fn rig() -> Rig {
        let brightness = MemorySink::new();
        let volume = MemorySink::new();
        let app = AppState::new(
            ControlMapper::default(),
            Box::new(brightness.clone()),
            Box::new(volume.clone()),
            Duration::from_millis(2000),
        );
        Rig { app, brightness, volume, t0: Instant::now() }
    }

    fn hand(side: Handedness, pose: Pose, spread: f32) -> Hand {
        HandSketch::new(side, pose).pinch(spread).build()
    }

    fn frame(hands: Vec<Hand>) -> Frame { Frame::new(W, H, hands) }

    #[test]
    fn empty_frame_changes_nothing() {
        let mut r = rig();
        r.app.process_frame(&frame(vec![]), r.t0);
        assert_eq!(r.app.dual(), DualChannel::new());
        assert!(r.brightness.writes().is_empty());
        assert!(r.volume.writes().is_empty());
        assert_eq!(r.app.status, format!("Ready - {}", NO_HANDS));
    }

    #[test]
    fn left_pinch_drives_brightness_only() {
        let mut r = rig();
        // 0.2 normalised → 200 px → 100
        for _ in 0..40 {
            r.app.process_frame(&frame(vec![hand(Handedness::Left, Pose::Pinch, 0.2)]), r.t0);
        }
        assert_eq!(r.brightness.writes().len(), 40);
        assert!(r.brightness.last().unwrap() >= 99.0);
        assert!(r.volume.writes().is_empty());
        assert_eq!(r.app.dual().state(Channel::Volume), ChannelState::default());
        assert!(r.app.status.contains("Left hand detected (brightness control)"));
    }

    #[test]
    fn volume_projected_into_device_range() {
        let brightness = MemorySink::new();
        let volume = MemorySink::with_range(VolumeRange::new(0.0, 1.0));
        let mut app = AppState::new(
            ControlMapper::default().with_smoothing(1.0),
            Box::new(brightness),
            Box::new(volume.clone()),
            Duration::from_millis(10),
        );
        app.process_frame(&frame(vec![hand(Handedness::Right, Pose::Pinch, 0.3)]), Instant::now());
        assert_eq!(volume.last(), Some(1.0));
    }

    #[test]
    fn fist_freezes_and_holds_outputs() {
        let mut r = rig();
        for _ in 0..30 {
            r.app.process_frame(&frame(vec![hand(Handedness::Left, Pose::Pinch, 0.2)]), r.t0);
        }
        let held = r.app.dual().state(Channel::Brightness).live_value();
        let writes_before = r.brightness.writes().len();

        r.app.process_frame(&frame(vec![hand(Handedness::Left, Pose::Fist, 0.0)]), r.t0);
        assert!(r.app.dual().state(Channel::Brightness).frozen);
        assert_eq!(r.app.banner(), Some("Left hand: FREEZE BRIGHTNESS"));
        assert!(r.app.status.contains(&format!("Brightness frozen at {}%", held)));

        // pinch closes while frozen: no new writes, value holds
        for _ in 0..10 {
            r.app.process_frame(&frame(vec![hand(Handedness::Left, Pose::Pinch, 0.0)]), r.t0);
        }
        assert_eq!(r.brightness.writes().len(), writes_before);
        assert_eq!(r.app.dual().state(Channel::Brightness).value(), held);
        assert_eq!(r.app.label(Channel::Brightness), format!("{}% (FROZEN)", held));

        r.app.process_frame(&frame(vec![hand(Handedness::Left, Pose::FourFingers, 0.0)]), r.t0);
        assert!(!r.app.dual().state(Channel::Brightness).frozen);
        assert_eq!(r.app.banner(), Some("Left hand: RELEASE BRIGHTNESS"));
    }

    #[test]
    fn thumbs_up_on_right_resets_both() {
        let mut r = rig();
        for _ in 0..20 {
            r.app.process_frame(&frame(vec![
                hand(Handedness::Left,  Pose::Pinch, 0.2),
                hand(Handedness::Right, Pose::Pinch, 0.2),
            ]), r.t0);
        }
        r.app.handle_command(Command::ToggleFreeze(Channel::Volume), r.t0);
        assert!(r.app.dual().state(Channel::Volume).frozen);

        r.app.process_frame(&frame(vec![hand(Handedness::Right, Pose::ThumbsUp, 0.0)]), r.t0);
        let d = r.app.dual();
        assert_eq!(d.state(Channel::Brightness), ChannelState::default());
        assert!(!d.state(Channel::Volume).frozen);
        assert_eq!(r.brightness.last(), Some(0.0));
        assert_eq!(r.app.banner(), Some("Right hand: RESET ALL"));
    }

    #[test]
    fn reset_command_writes_floor() {
        let volume = MemorySink::with_range(VolumeRange::new(10.0, 90.0));
        let mut app = AppState::new(
            ControlMapper::default(),
            Box::new(NullSink),
            Box::new(volume.clone()),
            Duration::from_millis(100),
        );
        app.handle_command(Command::Reset, Instant::now());
        assert_eq!(volume.writes(), vec![10.0]);
        assert_eq!(app.banner(), Some("RESET ALL"));
    }

    #[test]
    fn freeze_all_command_toggles() {
        let mut r = rig();
        r.app.handle_command(Command::ToggleFreezeAll, r.t0);
        assert!(r.app.dual().all_frozen());
        assert_eq!(r.app.banner(), Some("FREEZE ALL"));
        r.app.handle_command(Command::ToggleFreezeAll, r.t0);
        assert!(!r.app.dual().any_frozen());
        assert_eq!(r.app.banner(), Some("RELEASE ALL"));
    }

    #[test]
    fn banner_expires() {
        let mut r = rig();
        r.app.handle_command(Command::Reset, r.t0);
        r.app.tick(r.t0 + Duration::from_millis(1999));
        assert!(r.app.banner().is_some());
        r.app.tick(r.t0 + Duration::from_millis(2000));
        assert!(r.app.banner().is_none());
    }

    #[test]
    fn sink_failure_is_not_fatal() {
        let mut app = AppState::new(
            ControlMapper::default(),
            Box::new(MemorySink::failing()),
            Box::new(MemorySink::failing()),
            Duration::from_millis(100),
        );
        for _ in 0..5 {
            app.process_frame(&frame(vec![hand(Handedness::Left, Pose::Pinch, 0.2)]), Instant::now());
        }
        assert!(app.dual().state(Channel::Brightness).smoothed > 0.0);
    }

    #[test]
    fn view_carries_skeletons() {
        let mut r = rig();
        r.app.process_frame(&frame(vec![
            hand(Handedness::Right, Pose::Pinch, 0.1),
            hand(Handedness::Left,  Pose::Fist,  0.0),
        ]), r.t0);
        let v = r.app.view();
        assert_eq!(v.frame_size, (W, H));
        assert_eq!(v.hands.len(), 2);
        assert_eq!(v.hands[0].handedness, Handedness::Left);
        assert_eq!(v.hands[0].gesture, Gesture::Freeze);
        assert!(v.hands[1].points.iter().all(|p| p.is_some()));
        assert!((v.hands[1].distance - 100.0).abs() < 2.0);
        assert!(v.brightness.frozen);
    }

    #[derive(Clone, Default)]
    struct SharedBuf(Arc<Mutex<Vec<u8>>>);

    impl Write for SharedBuf {
        fn write(&mut self, data: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(data);
            Ok(data.len())
        }
        fn flush(&mut self) -> std::io::Result<()> { Ok(()) }
    }

    #[test]
    fn recorder_writes_json_lines() {
        let buf = SharedBuf::default();
        let mut r = rig();
        r.app = r.app.with_recorder(Box::new(buf.clone()));
        r.app.process_frame(&frame(vec![]), r.t0);
        r.app.process_frame(&frame(vec![hand(Handedness::Left, Pose::Fist, 0.0)]), r.t0);
        let text = String::from_utf8(buf.0.lock().unwrap().clone()).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 2);
        let back = hand_landmarks::decode_frame(lines[1], (1, 1)).unwrap();
        assert_eq!(classify(&back.hands[0]), Gesture::Freeze);
    }
}
