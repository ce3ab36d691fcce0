//! hand_probe: classify every hand in a JSON-lines landmark recording.
//!
//! ```text
//! hand_probe session.jsonl            # read a recording
//! tracker | hand_probe -              # or a live detector on stdin
//! ```

use hand_landmarks::{classify, decode_frame, pinch_distance, Frame, Handedness};
use std::fs::File;
use std::io::{self, BufRead, BufReader};

const DEFAULT_SIZE: (u32, u32) = (640, 480);

fn main() {
    let path = std::env::args().nth(1).unwrap_or_else(|| "-".to_string());

    let reader: Box<dyn BufRead> = if path == "-" {
        Box::new(BufReader::new(io::stdin()))
    } else {
        match File::open(&path) {
            Ok(f)  => Box::new(BufReader::new(f)),
            Err(e) => {
                eprintln!("hand_probe: cannot open {}: {}", path, e);
                std::process::exit(1);
            }
        }
    };

    let mut frames  = 0usize;
    let mut skipped = 0usize;

    for (lineno, line) in reader.lines().enumerate() {
        let line = match line {
            Ok(l)  => l,
            Err(e) => {
                eprintln!("hand_probe: read error: {}", e);
                break;
            }
        };
        if line.trim().is_empty() || line.trim() == "READY" { continue; }

        match decode_frame(&line, DEFAULT_SIZE) {
            Ok(frame) => {
                print_frame(frames, &frame);
                frames += 1;
            }
            Err(e) => {
                eprintln!("  line {:>5}: skipped ({})", lineno + 1, e);
                skipped += 1;
            }
        }
    }

    println!();
    println!("  {} frames, {} skipped", frames, skipped);
}

fn print_frame(n: usize, frame: &Frame) {
    if frame.hands.is_empty() {
        println!("  [{:>5}]  no hands", n);
        return;
    }
    let mut cols = Vec::new();
    for side in Handedness::all() {
        if let Some(hand) = frame.hand(side) {
            cols.push(format!(
                "{:<5} pinch={:>6.1}px  {:<7}",
                side.name(),
                pinch_distance(hand, frame.width, frame.height),
                classify(hand).name(),
            ));
        }
    }
    let dup = frame.duplicated_sides();
    let note = if dup.is_empty() { String::new() } else { format!("  (duplicate {:?})", dup) };
    println!("  [{:>5}]  {}{}", n, cols.join("  |  "), note);
}
