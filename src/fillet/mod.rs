//! Filleting operations
//!
//! A fillet replaces a loop edge by a circular blend tangent to both
//! adjoining faces. The blend is sampled into smooth stations; only its two
//! tangent boundaries remain selectable edges.

use nalgebra::Vector2;

use crate::brep::topology::{corner, replace_corner};
use crate::brep::{EdgeRef, Solid};
use crate::precision::{ANGULAR, FILLET_SEGMENTS, LINEAR};
use crate::{KernelError, Result};

/// Create a constant-radius fillet on one loop edge of a solid
///
/// # Arguments
/// * `solid` - The input solid to fillet
/// * `edge` - Edge to fillet, as returned by a query on `solid`
/// * `radius` - The radius of the fillet
///
/// # Returns
/// A new Solid with the filleted edge
pub fn make_fillet(solid: &Solid, edge: EdgeRef, radius: f64) -> Result<Solid> {
    if !radius.is_finite() || radius <= 0.0 {
        return Err(KernelError::InvalidGeometry(format!(
            "Fillet radius must be positive, got {}",
            radius
        )));
    }

    let corner = corner(solid, edge)?;
    let opening = corner.opening();
    if opening < ANGULAR || opening > std::f64::consts::PI - ANGULAR {
        return Err(KernelError::TopologyError(
            "Edge joins collinear faces and cannot be filleted".into(),
        ));
    }

    // Distance from the corner to each tangent point
    let setback = radius / (opening / 2.0).tan();
    for (name, leg) in [("lower", corner.below), ("upper", corner.above)] {
        if setback > leg.length - LINEAR {
            return Err(KernelError::InvalidGeometry(format!(
                "Fillet radius {} needs {} of the {} face, which is {} long",
                radius, setback, name, leg.length
            )));
        }
    }

    let start = corner.point + corner.below.direction * setback;
    let end = corner.point + corner.above.direction * setback;
    let bisector = (corner.below.direction + corner.above.direction).normalize();
    let center = corner.point + bisector * (radius / (opening / 2.0).sin());

    let arc = sample_arc(center, start, end, radius);
    replace_corner(solid, edge, start, &arc, end)
}

/// Interior points of the short arc from `start` to `end` around `center`.
fn sample_arc(
    center: Vector2<f64>,
    start: Vector2<f64>,
    end: Vector2<f64>,
    radius: f64,
) -> Vec<Vector2<f64>> {
    let from = (start - center).y.atan2((start - center).x);
    let to = (end - center).y.atan2((end - center).x);
    let mut sweep = to - from;
    if sweep > std::f64::consts::PI {
        sweep -= 2.0 * std::f64::consts::PI;
    } else if sweep < -std::f64::consts::PI {
        sweep += 2.0 * std::f64::consts::PI;
    }

    (1..FILLET_SEGMENTS)
        .map(|k| {
            let angle = from + sweep * k as f64 / FILLET_SEGMENTS as f64;
            center + Vector2::new(angle.cos(), angle.sin()) * radius
        })
        .collect()
}
