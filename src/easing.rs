//! Easing curve shared by node impulses and pulsing indicators.

/// Quintic ease-in-out.
///
/// Accelerates from 0 over the first half of the domain and decelerates
/// into 1 over the second half, symmetric about `t = 0.5`. Input is clamped
/// to `[0, 1]`, so timers that overshoot slightly still map onto the curve.
///
/// ```
/// use cytodrift::easing::ease_in_out;
///
/// assert_eq!(ease_in_out(0.0), 0.0);
/// assert_eq!(ease_in_out(0.5), 0.5);
/// assert_eq!(ease_in_out(1.0), 1.0);
/// ```
#[inline]
pub fn ease_in_out(t: f32) -> f32 {
    let t = t.clamp(0.0, 1.0);
    if t < 0.5 {
        16.0 * t.powi(5)
    } else {
        let u = t - 1.0;
        1.0 + 16.0 * u.powi(5)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ease_endpoints() {
        assert_eq!(ease_in_out(0.0), 0.0);
        assert!((ease_in_out(0.5) - 0.5).abs() < 1e-6);
        assert!((ease_in_out(1.0) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_ease_monotonic() {
        let mut prev = 0.0;
        for i in 0..=1000 {
            let t = i as f32 / 1000.0;
            let v = ease_in_out(t);
            assert!(v >= prev, "ease_in_out should be non-decreasing at t = {}", t);
            prev = v;
        }
    }

    #[test]
    fn test_ease_symmetric() {
        for i in 0..=50 {
            let t = i as f32 / 100.0;
            let lhs = ease_in_out(t);
            let rhs = 1.0 - ease_in_out(1.0 - t);
            assert!((lhs - rhs).abs() < 1e-5, "asymmetric at t = {}", t);
        }
    }

    #[test]
    fn test_ease_clamps_out_of_range() {
        assert_eq!(ease_in_out(-0.3), 0.0);
        assert!((ease_in_out(1.02) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_ease_is_steeper_than_cubic_at_start() {
        let cubic = 4.0 * 0.2f32.powi(3);
        assert!(ease_in_out(0.2) < cubic);
    }
}
