//! Primitive solid creation
//!
//! Linear extrusion of a sketch profile, the only primitive the recipe
//! needs.

use crate::brep::{End, Solid, Stack, Station};
use crate::sketch::Profile;
use crate::{KernelError, Result};

/// Extrude a profile along Z
///
/// # Arguments
/// * `profile` - Outline to sweep, lying in the plane `z`
/// * `z` - Height of the sketch plane
/// * `distance` - Extrusion length; negative extrudes downward
///
/// # Returns
/// A prism spanning `z..z + distance` with both end caps free
pub fn extrude(profile: &Profile, z: f64, distance: f64) -> Result<Solid> {
    if !distance.is_finite() || distance == 0.0 {
        return Err(KernelError::InvalidGeometry(format!(
            "Extrusion distance must be finite and non-zero, got {}",
            distance
        )));
    }

    let (lo, hi) = if distance > 0.0 {
        (z, z + distance)
    } else {
        (z + distance, z)
    };

    Ok(Solid {
        lumps: vec![Stack {
            base: *profile,
            stations: vec![Station::new(lo, 0.0), Station::new(hi, 0.0)],
            bottom: End::Free,
            top: End::Free,
        }],
        voids: vec![],
        bores: vec![],
    })
}
