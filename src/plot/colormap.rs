//! The fixed colour map applied to every slice plot.

/// Name passed to the visualization library
pub const NAME: &str = "inferno";

/// Approximate inferno colour for a normalized value in [0, 1].
///
/// Piecewise-linear ramp black -> purple -> red -> orange -> pale yellow,
/// close enough to draw the legend next to a rendered plot.
pub fn inferno(value: f32) -> [f32; 3] {
    let v = if value.is_finite() { value.clamp(0.0, 1.0) } else { 0.0 };

    if v < 0.25 {
        let t = v / 0.25;
        [0.0 + 0.25 * t, 0.0 + 0.04 * t, 0.02 + 0.38 * t]
    } else if v < 0.5 {
        let t = (v - 0.25) / 0.25;
        [0.25 + 0.45 * t, 0.04 + 0.12 * t, 0.40 - 0.02 * t]
    } else if v < 0.75 {
        let t = (v - 0.5) / 0.25;
        [0.70 + 0.27 * t, 0.16 + 0.30 * t, 0.38 - 0.30 * t]
    } else {
        let t = (v - 0.75) / 0.25;
        [0.97 + 0.02 * t, 0.46 + 0.52 * t, 0.08 + 0.56 * t]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoints() {
        let low = inferno(0.0);
        let high = inferno(1.0);

        assert!(low.iter().all(|&c| c < 0.05), "low end should be near black");
        assert!(high[0] > 0.95 && high[1] > 0.95, "high end should be pale yellow");
    }

    #[test]
    fn test_out_of_range_is_clamped() {
        assert_eq!(inferno(-3.0), inferno(0.0));
        assert_eq!(inferno(7.5), inferno(1.0));
        assert_eq!(inferno(f32::NAN), inferno(0.0));
    }

    #[test]
    fn test_brightness_increases() {
        let luminance = |c: [f32; 3]| 0.2126 * c[0] + 0.7152 * c[1] + 0.0722 * c[2];
        let samples: Vec<f32> = (0..=20).map(|i| luminance(inferno(i as f32 / 20.0))).collect();

        for pair in samples.windows(2) {
            assert!(pair[1] >= pair[0]);
        }
    }
}
