//! Shows smoothing, freeze/release, and reset on the channel pair.

use dual_channel::{Channel, ControlMapper, DualChannel};
use hand_landmarks::{Gesture, Handedness};

fn main() {
    println!("\n=== DualChannel Demo ===\n");
    let m = ControlMapper::default();

    // ── 1. Convergence toward a steady pinch ──────────────────────────────
    println!("1. Left hand held at 160 px (raw ≈ 76%)");
    let mut dc = DualChannel::new();
    for frame in 1..=10 {
        dc = dc.observe(Channel::Brightness, 160.0, &m);
        let st = dc.state(Channel::Brightness);
        println!("   frame {:>2}: smoothed {:>6.2}  shown {:>3}%", frame, st.smoothed, st.value());
    }
    println!();

    // ── 2. Freeze holds while the hand keeps moving ───────────────────────
    println!("2. Fist on the left hand, then the pinch closes");
    let (mut dc, t) = dc.apply_gesture(Handedness::Left, Gesture::Freeze);
    println!("   {:?}", t.map(|t| t.label()));
    for _ in 0..5 {
        dc = dc.observe(Channel::Brightness, 30.0, &m);
    }
    println!("   {}", dc.status());
    let (dc, t) = dc.apply_gesture(Handedness::Left, Gesture::Release);
    println!("   {:?} → {}", t.map(|t| t.label()), dc.status());
    println!();

    // ── 3. Thumbs up on the right resets both ─────────────────────────────
    println!("3. Thumbs up on the RIGHT hand");
    let dc = dc.observe(Channel::Volume, 200.0, &m);
    println!("   before: {}", dc.status());
    let (dc, _) = dc.apply_gesture(Handedness::Right, Gesture::Reset);
    println!("   after:  {}", dc.status());
    println!();
}
