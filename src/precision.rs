//! Precision constants for geometric comparisons.
//!
//! Gridfinity dimensions are specified to the micrometre (e.g. 0.77426 mm), so
//! the linear tolerance sits two orders of magnitude below that.

/// Two lengths closer than this are the same length, in millimetres.
pub const LINEAR: f64 = 1.0e-6;

/// Angular tolerance used when classifying corners (radians).
pub const ANGULAR: f64 = 1.0e-9;

/// Number of straight segments used to sample one fillet arc in a stack
/// profile.
pub const FILLET_SEGMENTS: usize = 8;

/// Check whether two lengths are equal within [`LINEAR`].
#[inline]
pub fn same_length(a: f64, b: f64) -> bool {
    (a - b).abs() <= LINEAR
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_precision_values() {
        assert_eq!(LINEAR, 1.0e-6);
        assert!(LINEAR < 1.0e-5, "Tolerance must resolve the stacking lip width");
    }

    #[test]
    fn test_same_length() {
        assert!(same_length(41.5, 41.5 + 1.0e-7));
        assert!(!same_length(41.5, 41.5 + 1.0e-5));
    }
}
