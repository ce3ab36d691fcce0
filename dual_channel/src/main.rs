//! Interactive explorer for the brightness/volume freeze-reset machine.

use dual_channel::{Channel, Command, ControlMapper, DualChannel};
use hand_landmarks::{Gesture, Handedness};
use std::io::{self, Write};

fn main() {
    println!();
    println!("╔══════════════════════════════════════════════════════════╗");
    println!("║            Dual Control Channel Explorer                 ║");
    println!("╚══════════════════════════════════════════════════════════╝");
    println!();

    let mapper = pick_mapper();
    let mut dc = DualChannel::new();

    println!("\n  ✓  {}\n", dc.status());

    loop {
        print_ops_menu();
        let choice = read_line("Command: ").trim().to_ascii_lowercase();

        match choice.as_str() {
            "1" | "2" => {
                let ch = if choice == "1" { Channel::Brightness } else { Channel::Volume };
                let d: f32 = read_line(&format!("  {} pinch distance (px): ", ch))
                    .trim().parse().unwrap_or(0.0);
                let n: usize = read_line("  Frames (default 1): ").trim().parse().unwrap_or(1);
                for _ in 0..n {
                    dc = dc.observe(ch, d, &mapper);
                }
                let st = dc.state(ch);
                println!("  raw={}  smoothed={:.2}  shown={}", st.target, st.smoothed, st.value());
            }
            "3" | "4" => {
                let hand = if choice == "3" { Handedness::Left } else { Handedness::Right };
                let g = pick_gesture();
                let (next, t) = dc.apply_gesture(hand, g);
                dc = next;
                match t {
                    Some(t) => println!("  {} hand: {}", hand, t.label()),
                    None    => println!("  {} hand: {} — no change", hand, g),
                }
            }
            "f" | "b" | "v" | "r" => {
                let c = choice.chars().next().unwrap_or('?');
                if let Some(cmd) = Command::from_key(c) {
                    let (next, t) = dc.apply_command(cmd);
                    dc = next;
                    println!("  {}", t.label());
                }
            }
            "9" => {
                println!("  {}", dc.status());
            }
            "q" | "quit" => {
                println!("\nGoodbye!\n");
                break;
            }
            _ => println!("  ⚠  Unknown command."),
        }
        println!();
    }
}

fn print_ops_menu() {
    println!("  ┌─────────────────────────────────────────────────────────┐");
    println!("  │  1. Pinch → Brightness        f. Toggle freeze all      │");
    println!("  │  2. Pinch → Volume            b. Toggle brightness      │");
    println!("  │  3. Left-hand gesture         v. Toggle volume          │");
    println!("  │  4. Right-hand gesture        r. Reset all              │");
    println!("  │                               9. Status    q. Quit      │");
    println!("  └─────────────────────────────────────────────────────────┘");
}

fn pick_mapper() -> ControlMapper {
    let lo: f32 = read_line("  Min distance px (default 30): ").trim().parse().unwrap_or(30.0);
    let hi: f32 = loop {
        let h = read_line("  Max distance px (default 200): ").trim().parse().unwrap_or(200.0);
        if h > lo { break h; }
        println!("  ⚠  Max must exceed min.");
    };
    let alpha: f32 = read_line("  Smoothing α (default 0.3): ").trim().parse().unwrap_or(0.3);
    ControlMapper::new(lo, hi).with_smoothing(alpha)
}

fn pick_gesture() -> Gesture {
    println!("    1.Fist (freeze)  2.Four fingers (release)  3.Thumbs up (reset)  4.None");
    match read_line("    Choice: ").trim() {
        "1" => Gesture::Freeze,
        "2" => Gesture::Release,
        "3" => Gesture::Reset,
        _   => Gesture::None,
    }
}

fn read_line(prompt: &str) -> String {
    print!("{}", prompt);
    io::stdout().flush().ok();
    let mut buf = String::new();
    io::stdin().read_line(&mut buf).ok();
    buf
}
