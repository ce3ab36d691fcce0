//! Drives a recorded session through the application state with memory
//! sinks attached, the same path `--replay` takes minus the window.

use std::io::Write;
use std::time::{Duration, Instant};

use control_sinks::{MemorySink, VolumeRange};
use dual_channel::{Channel, ControlMapper};
use gesture_control::app::AppState;
use gesture_control::config::{SourceConfig, SourceKind};
use gesture_control::source::{open_source, LandmarkSource, SourceError};
use hand_landmarks::synth::{HandSketch, Pose};
use hand_landmarks::{Frame, Handedness};

fn sketch(side: Handedness, pose: Pose, spread: f32) -> hand_landmarks::Hand {
    HandSketch::new(side, pose).pinch(spread).build()
}

/// 20 frames of both pinches wide open, the left fist, 10 frames of both
/// pinches closed, one detector error line, then a right thumbs-up.
fn session() -> Vec<String> {
    let mut lines = vec!["READY".to_string()];
    for _ in 0..20 {
        lines.push(Frame::new(1000, 1000, vec![
            sketch(Handedness::Left,  Pose::Pinch, 0.25),
            sketch(Handedness::Right, Pose::Pinch, 0.25),
        ]).to_json_line());
    }
    lines.push(Frame::new(1000, 1000, vec![sketch(Handedness::Left, Pose::Fist, 0.0)]).to_json_line());
    for _ in 0..10 {
        lines.push(Frame::new(1000, 1000, vec![
            sketch(Handedness::Left,  Pose::Pinch, 0.0),
            sketch(Handedness::Right, Pose::Pinch, 0.0),
        ]).to_json_line());
    }
    lines.push(r#"{"error":"camera read failed"}"#.to_string());
    lines.push(Frame::new(1000, 1000, vec![sketch(Handedness::Right, Pose::ThumbsUp, 0.0)]).to_json_line());
    lines
}

#[test]
fn recorded_session_through_app() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    for l in session() {
        writeln!(file, "{}", l).unwrap();
    }

    let cfg = SourceConfig {
        kind: SourceKind::Replay,
        path: Some(file.path().to_path_buf()),
        ..SourceConfig::default()
    };
    let mut source: Box<dyn LandmarkSource> = open_source(&cfg, None).unwrap();

    let brightness = MemorySink::new();
    let volume = MemorySink::with_range(VolumeRange::new(0.0, 100.0));
    let mut app = AppState::new(
        ControlMapper::default(),
        Box::new(brightness.clone()),
        Box::new(volume.clone()),
        Duration::from_millis(2000),
    );

    let now = Instant::now();
    let mut skipped = 0;
    let mut frames = 0;
    let mut frozen_at = None;
    loop {
        match source.next_frame() {
            Ok(Some(frame)) => {
                app.process_frame(&frame, now);
                frames += 1;
                if frames == 21 {
                    frozen_at = Some(app.dual().state(Channel::Brightness).value());
                }
            }
            Ok(None) => {}
            Err(SourceError::Closed) => break,
            Err(e) => {
                assert!(!e.is_terminal());
                skipped += 1;
            }
        }
    }
    assert_eq!(frames, 32);
    assert_eq!(skipped, 1);

    // brightness froze near the top and never moved while the pinch closed
    let frozen_at = frozen_at.unwrap();
    assert!(frozen_at >= 95, "frozen at {}", frozen_at);
    let b = brightness.writes();
    assert_eq!(b.len(), 20 + 1, "20 live writes plus the reset");
    assert_eq!(*b.last().unwrap(), 0.0);

    // volume followed the closing pinch, then the reset floor, then the
    // first live step after the reset
    let v = volume.writes();
    assert_eq!(v.len(), 20 + 10 + 2);
    assert!(v[19] >= 95.0);
    assert!(v[29] < v[19]);
    assert_eq!(v[30], 0.0);

    let d = app.dual();
    assert!(!d.any_frozen());
    assert_eq!(d.state(Channel::Brightness).value(), 0);
    assert_eq!(app.banner(), Some("Right hand: RESET ALL"));
}
