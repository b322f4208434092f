//! Chamfering operations
//!
//! A chamfer replaces a loop edge by a flat bevel set back by the same
//! distance along both adjoining faces. Loop edges are tangent-continuous, so
//! the bevel runs all the way around the loop, as a B-rep chamfer propagates
//! along a tangent chain.

use crate::brep::topology::{corner, replace_corner};
use crate::brep::{EdgeRef, Solid};
use crate::precision::{ANGULAR, LINEAR};
use crate::{KernelError, Result};

/// Create a constant-distance chamfer on one loop edge of a solid
///
/// # Arguments
/// * `solid` - The input solid to chamfer
/// * `edge` - Edge to chamfer, as returned by a query on `solid`
/// * `distance` - Setback along each adjoining face
///
/// # Returns
/// A new Solid with the chamfered edge, or an error when the setback does not
/// fit on one of the faces
///
/// # Implementation Notes
/// Chamfering a convex edge removes material, a concave one adds it. Both are
/// the same cut of the corner in the stack's `(offset, z)` profile.
pub fn make_chamfer(solid: &Solid, edge: EdgeRef, distance: f64) -> Result<Solid> {
    if !distance.is_finite() || distance <= 0.0 {
        return Err(KernelError::InvalidGeometry(format!(
            "Chamfer distance must be positive, got {}",
            distance
        )));
    }

    let corner = corner(solid, edge)?;
    let opening = corner.opening();
    if opening < ANGULAR || opening > std::f64::consts::PI - ANGULAR {
        return Err(KernelError::TopologyError(
            "Edge joins collinear faces and cannot be chamfered".into(),
        ));
    }

    for (name, leg) in [("lower", corner.below), ("upper", corner.above)] {
        if distance > leg.length - LINEAR {
            return Err(KernelError::InvalidGeometry(format!(
                "Chamfer distance {} does not fit on the {} face ({} long)",
                distance, name, leg.length
            )));
        }
    }

    let start = corner.point + corner.below.direction * distance;
    let end = corner.point + corner.above.direction * distance;
    replace_corner(solid, edge, start, &[], end)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::brep::End;
    use crate::primitive::extrude;
    use crate::sketch::Profile;

    fn lip() -> Solid {
        let profile = Profile::rounded_rect(37.2, 37.2, 1.6).unwrap();
        extrude(&profile, 0.0, -4.75).unwrap()
    }

    #[test]
    fn test_chamfer_bottom_edge() {
        let solid = lip();
        let chamfered = make_chamfer(&solid, EdgeRef::Lump { stack: 0, station: 0 }, 0.8)
            .expect("Chamfer should succeed");

        let stations = &chamfered.lumps[0].stations;
        assert_eq!(stations.len(), 3);
        assert!((stations[0].z + 4.75).abs() < 1e-12);
        assert!((stations[0].offset - 0.8).abs() < 1e-12);
        assert!((stations[1].z + 3.95).abs() < 1e-12);
        assert!(stations[1].offset.abs() < 1e-12);
        assert_eq!(chamfered.lumps[0].bottom, End::Free);
    }

    #[test]
    fn test_chamfer_invalid_distance() {
        let solid = lip();
        let edge = EdgeRef::Lump { stack: 0, station: 0 };
        assert!(make_chamfer(&solid, edge, -1.0).is_err(), "Negative distance should fail");
        assert!(make_chamfer(&solid, edge, 0.0).is_err(), "Zero distance should fail");
    }

    #[test]
    fn test_chamfer_too_large() {
        let solid = lip();
        let result = make_chamfer(&solid, EdgeRef::Lump { stack: 0, station: 0 }, 5.0);
        assert!(result.is_err(), "Chamfer longer than the wall should fail");
    }

    #[test]
    fn test_chamfer_does_not_touch_input() {
        let solid = lip();
        let before = solid.clone();
        let _ = make_chamfer(&solid, EdgeRef::Lump { stack: 0, station: 1 }, 1.0).unwrap();
        assert_eq!(solid, before, "Input solid must be unchanged");
    }
}
