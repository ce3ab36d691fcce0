//! Walks the synthetic poses through the classifier and the pinch geometry.

use hand_landmarks::synth::{HandSketch, Pose};
use hand_landmarks::{classify, pinch_distance, Frame, Handedness, HandShape};

fn main() {
    println!("\n=== Hand Landmark Demo ===\n");

    // ── 1. Pose → gesture ─────────────────────────────────────────────────
    println!("1. Synthetic poses");
    for pose in [Pose::Pinch, Pose::Fist, Pose::FourFingers, Pose::ThumbsUp] {
        let hand = HandSketch::new(Handedness::Left, pose).build();
        let shape = HandShape::of(&hand).unwrap();
        println!(
            "   {:<12} thumb={:<9} fingers up={}  → {}",
            format!("{:?}", pose),
            format!("{:?}", shape.thumb),
            shape.extended_fingers(),
            classify(&hand),
        );
    }
    println!();

    // ── 2. Pinch spread → pixel distance ──────────────────────────────────
    println!("2. Pinch spread at 640×480");
    for spread in [0.0, 0.05, 0.1, 0.2, 0.3, 0.5] {
        let hand = HandSketch::new(Handedness::Right, Pose::Pinch).pinch(spread).build();
        println!("   spread {:>4.2} → {:>6.1} px", spread, pinch_distance(&hand, 640, 480));
    }
    println!();

    // ── 3. Wire format ────────────────────────────────────────────────────
    println!("3. One frame as a JSON line");
    let frame = Frame::new(640, 480, vec![
        HandSketch::new(Handedness::Right, Pose::ThumbsUp).build(),
    ]);
    let line = frame.to_json_line();
    println!("   {}…  ({} bytes)", &line[..line.len().min(72)], line.len());
    println!();
}
