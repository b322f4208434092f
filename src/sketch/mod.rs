//! 2D sketch profiles
//!
//! Every outline the Gridfinity recipe draws is a rounded rectangle: the block
//! body, the mating lip cells and the stacking recess are all the same shape at
//! different insets. A [`Profile`] is that rectangle, lying in an XY plane.

use serde::{Deserialize, Serialize};

use crate::{KernelError, Result};

/// A rounded rectangle in the XY plane.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    pub center: [f64; 2],
    pub width: f64,
    pub height: f64,
    pub radius: f64,
}

impl Profile {
    /// Create a rounded rectangle centred on the origin
    ///
    /// # Arguments
    /// * `width` - Size in X direction
    /// * `height` - Size in Y direction
    /// * `radius` - Corner fillet radius; zero gives sharp corners
    ///
    /// # Returns
    /// The profile, or an error if the rectangle is empty or the corners
    /// cannot be filleted at `radius`
    pub fn rounded_rect(width: f64, height: f64, radius: f64) -> Result<Self> {
        if !(width.is_finite() && height.is_finite() && radius.is_finite()) {
            return Err(KernelError::InvalidGeometry(
                "Profile dimensions must be finite".into(),
            ));
        }
        if width <= 0.0 || height <= 0.0 {
            return Err(KernelError::InvalidGeometry(format!(
                "Profile dimensions must be positive, got {} x {}",
                width, height
            )));
        }
        if radius < 0.0 {
            return Err(KernelError::InvalidGeometry(format!(
                "Corner radius must not be negative, got {}",
                radius
            )));
        }
        if radius > width.min(height) / 2.0 {
            return Err(KernelError::InvalidGeometry(format!(
                "Corner radius {} exceeds half of the {} x {} profile",
                radius, width, height
            )));
        }

        Ok(Self {
            center: [0.0, 0.0],
            width,
            height,
            radius,
        })
    }

    /// Create a sharp-cornered rectangle centred on the origin
    pub fn rect(width: f64, height: f64) -> Result<Self> {
        Self::rounded_rect(width, height, 0.0)
    }

    /// A circle of `radius`, as a fully rounded square
    pub fn circle(radius: f64) -> Result<Self> {
        Self::rounded_rect(2.0 * radius, 2.0 * radius, radius)
    }

    /// Move the profile by `(dx, dy)`.
    pub fn translated(&self, dx: f64, dy: f64) -> Self {
        Self {
            center: [self.center[0] + dx, self.center[1] + dy],
            ..*self
        }
    }

    /// Offset the outline inward by `distance` (outward when negative).
    ///
    /// Corners stay concentric: the radius shrinks by the same amount and
    /// becomes sharp once the offset passes the original radius. Returns
    /// `None` when the offset collapses the rectangle.
    pub fn offset(&self, distance: f64) -> Option<Self> {
        let width = self.width - 2.0 * distance;
        let height = self.height - 2.0 * distance;
        if width <= 0.0 || height <= 0.0 {
            return None;
        }
        Some(Self {
            center: self.center,
            width,
            height,
            radius: (self.radius - distance).max(0.0),
        })
    }

    /// Enclosed area
    pub fn area(&self) -> f64 {
        self.width * self.height - (4.0 - std::f64::consts::PI) * self.radius * self.radius
    }

    /// Axis-aligned bounds as `(min, max)`
    pub fn bounds(&self) -> ([f64; 2], [f64; 2]) {
        let hx = self.width / 2.0;
        let hy = self.height / 2.0;
        (
            [self.center[0] - hx, self.center[1] - hy],
            [self.center[0] + hx, self.center[1] + hy],
        )
    }

    /// Signed distance from `point` to the outline: negative inside.
    pub fn signed_distance(&self, point: [f64; 2]) -> f64 {
        let qx = (point[0] - self.center[0]).abs() - (self.width / 2.0 - self.radius);
        let qy = (point[1] - self.center[1]).abs() - (self.height / 2.0 - self.radius);
        let outside = (qx.max(0.0).powi(2) + qy.max(0.0).powi(2)).sqrt();
        let inside = qx.max(qy).min(0.0);
        outside + inside - self.radius
    }

    /// Unsigned distance from `point` to the outline curve.
    pub fn distance_to_outline(&self, point: [f64; 2]) -> f64 {
        self.signed_distance(point).abs()
    }

    pub fn contains_point(&self, point: [f64; 2], tolerance: f64) -> bool {
        self.signed_distance(point) <= tolerance
    }

    /// Smallest distance between the sides of `self` and the sides of an
    /// `inner` outline lying within it. Negative when `inner` pokes out.
    pub fn side_gap(&self, inner: &Profile) -> f64 {
        let (outer_min, outer_max) = self.bounds();
        let (inner_min, inner_max) = inner.bounds();
        let gaps = [
            inner_min[0] - outer_min[0],
            inner_min[1] - outer_min[1],
            outer_max[0] - inner_max[0],
            outer_max[1] - inner_max[1],
        ];
        gaps.into_iter().fold(f64::INFINITY, f64::min)
    }

    /// Whether `inner` lies inside this outline, corners included.
    pub fn contains_profile(&self, inner: &Profile, tolerance: f64) -> bool {
        if self.side_gap(inner) < -tolerance {
            return false;
        }
        // Check the inner corner arcs against the outer corner arcs
        let (min, max) = inner.bounds();
        let r = inner.radius;
        let diagonal = std::f64::consts::FRAC_1_SQRT_2;
        [
            [min[0] + r, min[1] + r, -1.0, -1.0],
            [max[0] - r, min[1] + r, 1.0, -1.0],
            [max[0] - r, max[1] - r, 1.0, 1.0],
            [min[0] + r, max[1] - r, -1.0, 1.0],
        ]
        .iter()
        .all(|&[cx, cy, sx, sy]| {
            let corner = [cx + sx * r * diagonal, cy + sy * r * diagonal];
            self.contains_point(corner, tolerance)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rounded_rect_basic() {
        let profile = Profile::rounded_rect(41.5, 41.5, 3.75).expect("Failed to create profile");
        assert_eq!(profile.center, [0.0, 0.0]);
        assert_eq!(profile.bounds(), ([-20.75, -20.75], [20.75, 20.75]));
    }

    #[test]
    fn test_rounded_rect_rejects_bad_input() {
        assert!(Profile::rounded_rect(0.0, 10.0, 1.0).is_err(), "Zero width should fail");
        assert!(Profile::rounded_rect(10.0, 10.0, -1.0).is_err(), "Negative radius should fail");
        assert!(Profile::rounded_rect(10.0, 10.0, 5.5).is_err(), "Oversized radius should fail");
        assert!(Profile::rounded_rect(f64::NAN, 10.0, 1.0).is_err(), "NaN should fail");
        assert!(Profile::rounded_rect(10.0, 10.0, 5.0).is_ok(), "Half-width radius is a stadium");
    }

    #[test]
    fn test_area_accounts_for_corners() {
        let sharp = Profile::rect(10.0, 20.0).unwrap();
        assert!((sharp.area() - 200.0).abs() < 1e-12);

        let rounded = Profile::rounded_rect(10.0, 10.0, 5.0).unwrap();
        assert!((rounded.area() - std::f64::consts::PI * 25.0).abs() < 1e-9);
    }

    #[test]
    fn test_offset_keeps_corners_concentric() {
        let profile = Profile::rounded_rect(42.0, 42.0, 4.0).unwrap();
        let inset = profile.offset(2.4).expect("Offset should not collapse");
        assert!((inset.width - 37.2).abs() < 1e-12);
        assert!((inset.radius - 1.6).abs() < 1e-12);

        let outset = inset.offset(-2.14).unwrap();
        assert!((outset.radius - 3.74).abs() < 1e-12);

        let sharp = profile.offset(5.0).unwrap();
        assert_eq!(sharp.radius, 0.0);

        assert!(profile.offset(21.0).is_none(), "Offset to zero width collapses");
    }

    #[test]
    fn test_signed_distance() {
        let profile = Profile::rounded_rect(10.0, 10.0, 2.0).unwrap();
        assert!((profile.signed_distance([0.0, 0.0]) + 5.0).abs() < 1e-12);
        assert!((profile.signed_distance([7.0, 0.0]) - 2.0).abs() < 1e-12);

        // Corner arc centre is at (3, 3)
        let d = profile.signed_distance([3.0 + 4.0, 3.0 + 3.0]);
        assert!((d - 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_contains_profile() {
        let outer = Profile::rounded_rect(41.5, 41.5, 3.75).unwrap();
        let inner = Profile::rounded_rect(37.2, 37.2, 1.6).unwrap();
        assert!(outer.contains_profile(&inner, 1e-9));
        assert!(!inner.contains_profile(&outer, 1e-9));
        assert!((outer.side_gap(&inner) - 2.15).abs() < 1e-9);

        let shifted = inner.translated(3.0, 0.0);
        assert!(!outer.contains_profile(&shifted, 1e-9));
    }
}
