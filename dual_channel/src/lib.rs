//! # dual_channel
//!
//! Two independently-controllable output channels: **brightness** bound to
//! the left hand, **volume** bound to the right, each with its own smoothed
//! value and freeze state.
//!
//! All transitions are pure: [`ChannelState`] and [`DualChannel`] are `Copy`
//! and every operation returns the next state.
//!
//! ## State machine (per channel)
//!
//! ```text
//!            FREEZE (bound hand) / freeze command
//!   UNFROZEN ───────────────────────────────────▶ FROZEN
//!      ▲      snapshot = smoothed value              │
//!      └─────────────────────────────────────────────┘
//!            RELEASE (bound hand) / unfreeze command
//!
//!   RESET (either hand) / reset command: both channels → UNFROZEN, value 0
//! ```
//!
//! ## Quick start
//!
//! ```rust
//! use dual_channel::{Channel, ControlMapper, DualChannel};
//!
//! let mapper = ControlMapper::default();               // [30,200] px → 0–100
//! let dc = DualChannel::new()
//!     .observe(Channel::Brightness, 200.0, &mapper)    // one frame, fully open
//!     .freeze(Channel::Brightness);
//! assert_eq!(dc.state(Channel::Brightness).value(), 30); // α = 0.3
//! ```

use std::fmt;

use hand_landmarks::{Gesture, Handedness};

pub mod mapper;

pub use mapper::{lerp_clamped, ControlMapper};

// ════════════════════════════════════════════════════════════════════════════
// Channel
// ════════════════════════════════════════════════════════════════════════════

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Channel {
    Brightness,
    Volume,
}

impl Channel {
    pub fn all() -> [Channel; 2] { [Channel::Brightness, Channel::Volume] }

    pub fn name(self) -> &'static str {
        match self {
            Channel::Brightness => "Brightness",
            Channel::Volume     => "Volume",
        }
    }

    /// Fixed binding: left hand drives brightness, right hand drives volume.
    pub fn for_hand(hand: Handedness) -> Channel {
        match hand {
            Handedness::Left  => Channel::Brightness,
            Handedness::Right => Channel::Volume,
        }
    }

    pub fn hand(self) -> Handedness {
        match self {
            Channel::Brightness => Handedness::Left,
            Channel::Volume     => Handedness::Right,
        }
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// ════════════════════════════════════════════════════════════════════════════
// ChannelState
// ════════════════════════════════════════════════════════════════════════════

/// Value and freeze state of one channel.  All values are on a 0–100 scale.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ChannelState {
    /// Exponentially smoothed value; the accumulator survives freezes.
    pub smoothed: f32,
    pub frozen:   bool,
    /// Value held while frozen.
    pub snapshot: u8,
    /// Last unsmoothed mapped value.
    pub target:   u8,
}

impl ChannelState {
    /// Live value: the smoothed accumulator truncated to a whole percent.
    pub fn live_value(&self) -> u8 {
        self.smoothed.clamp(0.0, 100.0) as u8
    }

    /// Value to display and apply: the snapshot while frozen, live otherwise.
    pub fn value(&self) -> u8 {
        if self.frozen { self.snapshot } else { self.live_value() }
    }

    /// Freeze at the current live value.  No-op when already frozen.
    pub fn freeze(self) -> Self {
        if self.frozen { return self; }
        ChannelState { frozen: true, snapshot: self.live_value(), ..self }
    }

    /// Resume live mapping from the untouched accumulator; the snapshot is
    /// discarded.
    pub fn unfreeze(self) -> Self {
        ChannelState { frozen: false, snapshot: 0, ..self }
    }

    pub fn toggle(self) -> Self {
        if self.frozen { self.unfreeze() } else { self.freeze() }
    }

    /// Feed one already-mapped sample.  Ignored while frozen.
    pub fn track(self, mapped: f32, mapper: &ControlMapper) -> Self {
        if self.frozen { return self; }
        ChannelState {
            smoothed: mapper.smooth(self.smoothed, mapped),
            target:   mapped.clamp(0.0, 100.0) as u8,
            ..self
        }
    }

    /// Feed one pinch distance.  Ignored while frozen.
    pub fn observe(self, distance: f32, mapper: &ControlMapper) -> Self {
        self.track(mapper.map(distance), mapper)
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Transition / Command
// ════════════════════════════════════════════════════════════════════════════

/// A state change that actually happened (gestures that change nothing
/// yield no transition).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Transition {
    Froze(Channel),
    Released(Channel),
    FrozeAll,
    ReleasedAll,
    Reset,
}

impl Transition {
    pub fn label(self) -> String {
        match self {
            Transition::Froze(ch)    => format!("FREEZE {}", ch.name().to_uppercase()),
            Transition::Released(ch) => format!("RELEASE {}", ch.name().to_uppercase()),
            Transition::FrozeAll     => "FREEZE ALL".to_string(),
            Transition::ReleasedAll  => "RELEASE ALL".to_string(),
            Transition::Reset        => "RESET ALL".to_string(),
        }
    }
}

/// User-triggered commands (keyboard / buttons).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Command {
    /// Unfreeze both if both are frozen, otherwise freeze both.
    ToggleFreezeAll,
    ToggleFreeze(Channel),
    Reset,
}

impl Command {
    /// F = freeze all, B = brightness, V = volume, R = reset.
    pub fn from_key(c: char) -> Option<Command> {
        match c.to_ascii_lowercase() {
            'f' => Some(Command::ToggleFreezeAll),
            'b' => Some(Command::ToggleFreeze(Channel::Brightness)),
            'v' => Some(Command::ToggleFreeze(Channel::Volume)),
            'r' => Some(Command::Reset),
            _   => None,
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// DualChannel
// ════════════════════════════════════════════════════════════════════════════

/// The brightness/volume pair.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct DualChannel {
    brightness: ChannelState,
    volume:     ChannelState,
}

impl DualChannel {
    /// Both channels unfrozen at 0.
    pub fn new() -> Self { DualChannel::default() }

    pub fn state(&self, ch: Channel) -> ChannelState {
        match ch {
            Channel::Brightness => self.brightness,
            Channel::Volume     => self.volume,
        }
    }

    fn with(self, ch: Channel, f: impl FnOnce(ChannelState) -> ChannelState) -> Self {
        match ch {
            Channel::Brightness => DualChannel { brightness: f(self.brightness), ..self },
            Channel::Volume     => DualChannel { volume:     f(self.volume),     ..self },
        }
    }

    pub fn freeze(self, ch: Channel)   -> Self { self.with(ch, ChannelState::freeze) }
    pub fn unfreeze(self, ch: Channel) -> Self { self.with(ch, ChannelState::unfreeze) }
    pub fn toggle(self, ch: Channel)   -> Self { self.with(ch, ChannelState::toggle) }

    pub fn all_frozen(&self) -> bool { self.brightness.frozen && self.volume.frozen }
    pub fn any_frozen(&self) -> bool { self.brightness.frozen || self.volume.frozen }

    pub fn freeze_all(self) -> Self {
        self.freeze(Channel::Brightness).freeze(Channel::Volume)
    }

    pub fn unfreeze_all(self) -> Self {
        self.unfreeze(Channel::Brightness).unfreeze(Channel::Volume)
    }

    /// Both channels back to UNFROZEN at 0.
    pub fn reset(self) -> Self { DualChannel::default() }

    /// Feed one pinch distance to a channel.  Ignored while it is frozen.
    pub fn observe(self, ch: Channel, distance: f32, mapper: &ControlMapper) -> Self {
        self.with(ch, |s| s.observe(distance, mapper))
    }

    /// Apply a gesture made by `hand`.
    ///
    /// Freeze/Release act only on the hand's bound channel; Reset acts on
    /// both channels whichever hand made it.
    pub fn apply_gesture(self, hand: Handedness, gesture: Gesture) -> (Self, Option<Transition>) {
        let ch = Channel::for_hand(hand);
        let st = self.state(ch);
        match gesture {
            Gesture::Freeze if !st.frozen  => (self.freeze(ch),   Some(Transition::Froze(ch))),
            Gesture::Release if st.frozen  => (self.unfreeze(ch), Some(Transition::Released(ch))),
            Gesture::Reset                 => (self.reset(),      Some(Transition::Reset)),
            _                              => (self, None),
        }
    }

    pub fn apply_command(self, cmd: Command) -> (Self, Transition) {
        match cmd {
            Command::ToggleFreezeAll if self.all_frozen() => (self.unfreeze_all(), Transition::ReleasedAll),
            Command::ToggleFreezeAll                      => (self.freeze_all(),   Transition::FrozeAll),
            Command::ToggleFreeze(ch) => {
                let next = self.toggle(ch);
                let t = if next.state(ch).frozen { Transition::Froze(ch) } else { Transition::Released(ch) };
                (next, t)
            }
            Command::Reset => (self.reset(), Transition::Reset),
        }
    }

    /// "Brightness 42% | Volume 17% (FROZEN)"
    pub fn status(&self) -> String {
        Channel::all().iter()
            .map(|&ch| format!("{} {}", ch.name(), value_label(&self.state(ch))))
            .collect::<Vec<_>>()
            .join(" | ")
    }
}

/// "42%" or "42% (FROZEN)".
pub fn value_label(st: &ChannelState) -> String {
    if st.frozen {
        format!("{}% (FROZEN)", st.value())
    } else {
        format!("{}%", st.value())
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════
