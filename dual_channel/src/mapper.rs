//! Distance → control-value mapping with exponential smoothing.

/// Linear interpolation of `x` from `from` into `to`, clamped at both ends.
///
/// Below `from.0` the result is `to.0`, above `from.1` it is `to.1`; the
/// output range may run in either direction.  NaN maps to `to.0`.
pub fn lerp_clamped(x: f32, from: (f32, f32), to: (f32, f32)) -> f32 {
    let (x0, x1) = from;
    let (y0, y1) = to;
    if x.is_nan() || x <= x0 { return y0; }
    if x >= x1               { return y1; }
    let t = (x - x0) / (x1 - x0);
    let y = y0 + (y1 - y0) * t;
    y.clamp(y0.min(y1), y0.max(y1))
}

/// Calibration window, output range and smoothing factor for one channel.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ControlMapper {
    pub min_distance: f32,
    pub max_distance: f32,
    pub out_min: f32,
    pub out_max: f32,
    /// Weight of the newest sample, in (0, 1].
    pub alpha: f32,
}

impl Default for ControlMapper {
    fn default() -> Self {
        ControlMapper {
            min_distance: 30.0,
            max_distance: 200.0,
            out_min: 0.0,
            out_max: 100.0,
            alpha: 0.3,
        }
    }
}

impl ControlMapper {
    pub fn new(min_distance: f32, max_distance: f32) -> Self {
        ControlMapper { min_distance, max_distance, ..ControlMapper::default() }
    }

    pub fn with_output(mut self, out_min: f32, out_max: f32) -> Self {
        self.out_min = out_min;
        self.out_max = out_max;
        self
    }

    pub fn with_smoothing(mut self, alpha: f32) -> Self {
        self.alpha = alpha.clamp(f32::EPSILON, 1.0);
        self
    }

    /// Raw mapped value for a pinch distance.
    pub fn map(&self, distance: f32) -> f32 {
        lerp_clamped(
            distance,
            (self.min_distance, self.max_distance),
            (self.out_min, self.out_max),
        )
    }

    /// One exponential-moving-average step toward `sample`:
    /// `previous·(1−α) + sample·α`, written in the form that cannot round
    /// past `sample`.
    pub fn smooth(&self, previous: f32, sample: f32) -> f32 {
        previous + (sample - previous) * self.alpha
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn window_edges_clamp() {
        let m = ControlMapper::default();
        assert_eq!(m.map(30.0),  0.0);
        assert_eq!(m.map(400.0), 100.0);
        for d in [-5.0, 0.0, 10.0, 29.9] {
            assert_eq!(m.map(d), 0.0, "d={}", d);
        }
        for d in [200.0, 200.1, 1.0e6, f32::INFINITY] {
            assert_eq!(m.map(d), 100.0, "d={}", d);
        }
    }

    #[test]
    fn midpoint_is_linear() {
        let m = ControlMapper::default();
        assert!((m.map(115.0) - 50.0).abs() < 1e-4);
    }

    #[test]
    fn nan_distance_maps_low() {
        assert_eq!(ControlMapper::default().map(f32::NAN), 0.0);
    }

    #[test]
    fn descending_output_range() {
        // e.g. a device whose "max" level is numerically lower
        let m = ControlMapper::new(0.0, 100.0).with_output(0.0, -60.0);
        assert!((m.map(50.0) + 30.0).abs() < 1e-4);
        assert_eq!(m.map(500.0), -60.0);
    }

    #[test]
    fn degenerate_window_steps() {
        assert_eq!(lerp_clamped(9.0,  (10.0, 10.0), (0.0, 1.0)), 0.0);
        assert_eq!(lerp_clamped(11.0, (10.0, 10.0), (0.0, 1.0)), 1.0);
    }

    #[test]
    fn smoothing_converges_without_overshoot() {
        let m = ControlMapper::default();
        let target = 80.0;
        let mut v = 0.0f32;
        let mut prev_gap = target - v;
        for _ in 0..30 {
            v = m.smooth(v, target);
            assert!(v <= target);
            let gap = target - v;
            assert!(gap <= prev_gap);
            prev_gap = gap;
        }
        assert!(prev_gap < 0.01);
    }

    #[test]
    fn smoothing_factor_clamps() {
        let m = ControlMapper::default().with_smoothing(3.0);
        assert_eq!(m.alpha, 1.0);
        assert_eq!(m.smooth(10.0, 70.0), 70.0);
        let m = ControlMapper::default().with_smoothing(0.0);
        assert!(m.alpha > 0.0);
    }
}
