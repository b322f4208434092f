//! Manufacturing feature operations
//!
//! Counterbored holes: a wide, shallow pocket (for a magnet) over a narrower
//! hole (for a screw), drilled straight into a horizontal face.

use crate::brep::topology::material_run;
use crate::brep::{Bore, Solid};
use crate::precision::{same_length, LINEAR};
use crate::query::faces;
use crate::sketch::Profile;
use crate::{KernelError, Result};

/// Dimensions of a counterbored hole.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Counterbore {
    pub hole_diameter: f64,
    pub cbore_diameter: f64,
    pub cbore_depth: f64,
    /// Total depth from the drilled face; `None` drills through to the first
    /// face where the material ends.
    pub depth: Option<f64>,
}

impl Counterbore {
    fn validate(&self) -> Result<()> {
        if self.hole_diameter <= 0.0 || self.cbore_diameter <= 0.0 {
            return Err(KernelError::InvalidGeometry(format!(
                "Bore diameters must be positive, got {} and {}",
                self.hole_diameter, self.cbore_diameter
            )));
        }
        if self.cbore_diameter <= self.hole_diameter {
            return Err(KernelError::InvalidGeometry(format!(
                "Counterbore diameter {} must exceed hole diameter {}",
                self.cbore_diameter, self.hole_diameter
            )));
        }
        if self.cbore_depth <= 0.0 {
            return Err(KernelError::InvalidGeometry(format!(
                "Counterbore depth must be positive, got {}",
                self.cbore_depth
            )));
        }
        if let Some(depth) = self.depth {
            if depth <= self.cbore_depth {
                return Err(KernelError::InvalidGeometry(format!(
                    "Hole depth {} must exceed counterbore depth {}",
                    depth, self.cbore_depth
                )));
            }
        }
        Ok(())
    }
}

/// Drill a counterbored hole into a horizontal face
///
/// # Arguments
/// * `solid` - The input solid to modify
/// * `center` - Point on the drilled face at the hole axis
/// * `direction` - `1.0` drills upward from a downward-facing face, `-1.0`
///   drills downward from an upward-facing face
/// * `bore` - Hole dimensions
///
/// # Returns
/// A new Solid with the bore, or an error if no face at `center` can take the
/// whole counterbore
pub fn make_cbore_hole(
    solid: &Solid,
    center: [f64; 3],
    direction: f64,
    bore: &Counterbore,
) -> Result<Solid> {
    bore.validate()?;
    if direction != 1.0 && direction != -1.0 {
        return Err(KernelError::NotImplemented(
            "Bores along directions other than +Z or -Z".into(),
        ));
    }

    let axis = [center[0], center[1]];
    let radius = bore.cbore_diameter / 2.0;
    let rim = Profile::circle(radius)?.translated(axis[0], axis[1]);
    let on_face = faces(solid).iter().any(|face| {
        same_length(face.z, center[2])
            && face.normal == -direction
            && face.outline.contains_profile(&rim, LINEAR)
            && face.holes.iter().all(|hole| hole.signed_distance(axis) >= radius)
    });
    if !on_face {
        return Err(KernelError::BooleanFailed(format!(
            "No face at ({}, {}, {}) can take a {} mm counterbore",
            center[0], center[1], center[2], bore.cbore_diameter
        )));
    }

    let available = material_run(solid, center, direction).ok_or_else(|| {
        KernelError::BooleanFailed(format!(
            "No material above the face at ({}, {}, {})",
            center[0], center[1], center[2]
        ))
    })?;
    let (depth, through) = match bore.depth {
        Some(depth) if depth < available - LINEAR => (depth, false),
        Some(_) => (available, true),
        None => (available, true),
    };
    if depth <= bore.cbore_depth {
        return Err(KernelError::InvalidGeometry(format!(
            "Solid is only {} thick at the bore, counterbore needs {}",
            depth, bore.cbore_depth
        )));
    }

    let mut result = solid.clone();
    result.bores.push(Bore {
        center: [center[0], center[1]],
        z: center[2],
        direction,
        hole_diameter: bore.hole_diameter,
        cbore_diameter: bore.cbore_diameter,
        cbore_depth: bore.cbore_depth,
        depth,
        through,
    });
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::primitive::extrude;

    fn magnet_bore() -> Counterbore {
        Counterbore {
            hole_diameter: 3.5,
            cbore_diameter: 6.5,
            cbore_depth: 2.4,
            depth: Some(6.0),
        }
    }

    fn slab() -> Solid {
        extrude(&Profile::rect(40.0, 40.0).unwrap(), 0.0, 10.0).unwrap()
    }

    #[test]
    fn test_make_cbore_hole_basic() {
        let holed = make_cbore_hole(&slab(), [5.0, 5.0, 0.0], 1.0, &magnet_bore())
            .expect("Bore should succeed");
        assert_eq!(holed.bores.len(), 1);
        assert!(!holed.bores[0].through);
        assert_eq!(holed.bores[0].end_z(), 6.0);
    }

    #[test]
    fn test_make_cbore_hole_through() {
        let bore = Counterbore {
            depth: None,
            ..magnet_bore()
        };
        let holed = make_cbore_hole(&slab(), [5.0, 5.0, 0.0], 1.0, &bore).unwrap();
        assert!(holed.bores[0].through);
        assert_eq!(holed.bores[0].depth, 10.0);
    }

    #[test]
    fn test_make_cbore_hole_through_stops_at_recess_floor() {
        let recess = extrude(&Profile::rect(30.0, 30.0).unwrap(), 10.0, -4.0).unwrap();
        let pocketed = crate::boolean::cut(&slab(), &recess).unwrap();
        let bore = Counterbore {
            depth: None,
            ..magnet_bore()
        };
        let holed = make_cbore_hole(&pocketed, [5.0, 5.0, 0.0], 1.0, &bore).unwrap();
        assert!(holed.bores[0].through);
        assert_eq!(holed.bores[0].end_z(), 6.0);

        // Beside the recess the hole still runs to the top
        let holed = make_cbore_hole(&pocketed, [16.0, 16.0, 0.0], 1.0, &bore).unwrap();
        assert_eq!(holed.bores[0].end_z(), 10.0);
    }

    #[test]
    fn test_make_cbore_hole_invalid_dimensions() {
        let bore = Counterbore {
            cbore_diameter: 3.0,
            ..magnet_bore()
        };
        let result = make_cbore_hole(&slab(), [5.0, 5.0, 0.0], 1.0, &bore);
        assert!(result.is_err(), "Counterbore narrower than the hole should fail");
    }

    #[test]
    fn test_make_cbore_hole_off_face() {
        let result = make_cbore_hole(&slab(), [19.0, 0.0, 0.0], 1.0, &magnet_bore());
        assert!(result.is_err(), "Bore overhanging the face edge should fail");

        let result = make_cbore_hole(&slab(), [0.0, 0.0, 5.0], 1.0, &magnet_bore());
        assert!(result.is_err(), "Bore starting inside the material should fail");
    }

    #[test]
    fn test_make_cbore_hole_wrong_side() {
        let result = make_cbore_hole(&slab(), [0.0, 0.0, 0.0], -1.0, &magnet_bore());
        assert!(result.is_err(), "Drilling away from the material should fail");
    }
}
