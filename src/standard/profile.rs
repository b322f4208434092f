//! Inset profiles
//!
//! Every outline in a Gridfinity part is the footprint rectangle shrunk by
//! some inset, with its corner radius shrunk by the same amount. All of them
//! therefore share the corner centres of the master `fillet_radius` outline.

use super::{check_footprint, GridSpec, GridfinityError, Result};
use crate::sketch::Profile;

/// Rounded rectangle for a `width` x `height` footprint, inset by `inset` mm
///
/// # Arguments
/// * `spec` - Grid constants
/// * `width`, `height` - Footprint in grid units
/// * `inset` - Distance from the grid cell boundary, `0..=fillet_radius`
///
/// # Returns
/// A profile centred on the origin with corner radius
/// `fillet_radius - inset`; `inset == fillet_radius` gives sharp corners
pub fn inset_profile(spec: &GridSpec, width: u32, height: u32, inset: f64) -> Result<Profile> {
    check_footprint(width, height)?;
    if !inset.is_finite() || inset < 0.0 {
        return Err(GridfinityError::InvalidParameter(format!(
            "Inset must be a non-negative length, got {}",
            inset
        )));
    }
    if inset > spec.fillet_radius {
        return Err(GridfinityError::InvalidParameter(format!(
            "Inset {} exceeds the fillet radius {} and would need a negative corner radius",
            inset, spec.fillet_radius
        )));
    }

    let w = f64::from(width) * spec.grid_unit - 2.0 * inset;
    let h = f64::from(height) * spec.grid_unit - 2.0 * inset;
    Profile::rounded_rect(w, h, spec.fillet_radius - inset).map_err(|err| {
        GridfinityError::InvalidParameter(format!(
            "Inset {} collapses the {}x{} footprint: {}",
            inset, width, height, err
        ))
    })
}
