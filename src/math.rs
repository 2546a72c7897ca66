//! Math types for sonartrace
//!
//! All geometry lives in the range/vertical plane: `x` is horizontal range
//! from the source in meters, `y` is the vertical coordinate in meters with
//! zero at the sea surface and negative values below it.

pub use glam::DVec2;

/// Square root clamped at zero.
///
/// Arc evaluation computes `R^2 - dx^2`, which floating-point rounding can
/// push fractionally negative at segment boundaries; clamping keeps the
/// result finite instead of producing NaN.
#[inline]
pub(crate) fn clamped_sqrt(v: f64) -> f64 {
    if v > 0.0 { v.sqrt() } else { 0.0 }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clamped_sqrt_positive() {
        assert_eq!(clamped_sqrt(4.0), 2.0);
    }

    #[test]
    fn test_clamped_sqrt_negative_is_zero() {
        assert_eq!(clamped_sqrt(-1e-12), 0.0);
        assert_eq!(clamped_sqrt(f64::MIN), 0.0);
    }

    #[test]
    fn test_clamped_sqrt_zero() {
        assert_eq!(clamped_sqrt(0.0), 0.0);
    }
}
