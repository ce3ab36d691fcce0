//! # gesture_control
//!
//! Two-hand gesture controller: the left hand's thumb–index pinch sets
//! screen brightness, the right hand's sets system volume.  Hand poses
//! freeze, release and reset the values.
//!
//! ## Gesture → Action mapping
//!
//! | Gesture | Hand | Action |
//! |---|---|---|
//! | Pinch (thumb tip ↔ index tip) | Left | Brightness follows the distance |
//! | Pinch (thumb tip ↔ index tip) | Right | Volume follows the distance |
//! | Fist, thumb tucked | Left / Right | Freeze brightness / volume |
//! | Four fingers up, thumb folded | Left / Right | Release brightness / volume |
//! | Thumbs up | Either | Reset both channels to 0 |
//!
//! ## Landmark sources
//!
//! * `sim` (default): keyboard simulation, no camera needed.
//! * `tracker`: external detector process writing JSON lines.
//! * `replay`: a JSON-lines file (e.g. one written with `--record`).
//!
//! ### Keyboard
//!
//! | Key | Action |
//! |---|---|
//! | `F` | Toggle freeze on both channels |
//! | `B` / `V` | Toggle brightness / volume freeze |
//! | `R` | Reset both channels |
//! | `Q` / `Escape` | Quit |
//! | `1` / `2` | (sim) Show / hide left / right hand |
//! | `W` / `S` | (sim) Widen / narrow the left pinch |
//! | `Up` / `Down` | (sim) Widen / narrow the right pinch |
//! | `Z` `X` `C` | (sim) Hold left hand in fist / four fingers / thumbs up |
//! | `J` `K` `L` | (sim) Same for the right hand |

pub mod config;
pub mod source;
pub mod visualizer;
pub mod app;
