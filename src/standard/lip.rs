//! Mating lip
//!
//! The underside of a block carries one lip per grid cell, shaped to seat in
//! a baseplate socket or in the stacking recess of the block below. Each lip
//! is flared out to the body with a corner chamfer, and the bottom is drilled
//! with counterbores for magnets over screw holes.

use nalgebra::Point3;
use serde::{Deserialize, Serialize};

use super::block::gridfinity_block;
use super::{check_face_extent, inset_profile, select_edge, select_face, GridSpec, GridfinityError, Result, StepContext};
use crate::boolean::{fuse, translate};
use crate::brep::Solid;
use crate::chamfer::make_chamfer;
use crate::feature::{make_cbore_hole, Counterbore};
use crate::primitive::extrude;
use crate::query::{bounding_box, extreme_edges, nearest_edge, Extreme};
use crate::KernelError;

/// Where counterbores go under each cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum BoreLayout {
    /// Four per cell, on the corners of a `grid_unit - 2 * magnet_inset`
    /// square around the cell centre.
    #[default]
    Corners,
    /// One per cell, on the cell centre.
    Centered,
    /// No bores, for covers and midplates.
    None,
}

/// Depth of the screw holes, measured from the bottom of the lip.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub enum ScrewDepth {
    /// `GridSpec::screw_depth`.
    #[default]
    Standard,
    Custom(f64),
    /// Through the whole block.
    Through,
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct LipOptions {
    pub screw_depth: ScrewDepth,
    pub bores: BoreLayout,
}

/// A lip cell whose corner chamfer could not be applied. The cell keeps its
/// plain lip.
#[derive(Debug, Clone, PartialEq)]
pub struct SkippedCell {
    pub column: u32,
    pub row: u32,
    pub error: KernelError,
}

/// Result of [`gridfinity_block_lip`].
#[derive(Debug, Clone, PartialEq)]
pub struct LipBuild {
    pub solid: Solid,
    pub skipped: Vec<SkippedCell>,
}

/// A lip for a `width` x `height` outline, hanging below `z = 0` with its
/// bottom edge chamfered.
fn lip_stack(spec: &GridSpec, width: u32, height: u32) -> Result<Solid> {
    let profile = inset_profile(spec, width, height, spec.mating_inset)?;
    let lip = extrude(&profile, 0.0, -spec.block_mating_depth).step("lip extrusion")?;
    let bottom = extreme_edges(&lip, Extreme::Bottom);
    let edge = bottom
        .first()
        .ok_or(GridfinityError::FaceNotFound(Extreme::Bottom))?;
    make_chamfer(&lip, edge.id, spec.block_mating_chamfer).step("lip bottom chamfer")
}

/// Lower-left corner of the lip under cell `(column, row)`.
fn cell_corner(spec: &GridSpec, origin: [f64; 2], column: u32, row: u32, width: u32, height: u32) -> [f64; 2] {
    [
        origin[0] + f64::from(column) * spec.grid_unit - f64::from(width) * spec.grid_unit / 2.0 + spec.mating_inset,
        origin[1] + f64::from(row) * spec.grid_unit - f64::from(height) * spec.grid_unit / 2.0 + spec.mating_inset,
    ]
}

fn cell_center(spec: &GridSpec, origin: [f64; 2], column: u32, row: u32, width: u32, height: u32) -> [f64; 2] {
    [
        origin[0] + (f64::from(column) - f64::from(width - 1) / 2.0) * spec.grid_unit,
        origin[1] + (f64::from(row) - f64::from(height - 1) / 2.0) * spec.grid_unit,
    ]
}

/// Flare the top of one lip cell out toward the body.
fn chamfer_cell(solid: &Solid, corner: [f64; 2], z: f64, distance: f64) -> crate::Result<Solid> {
    let edge = nearest_edge(solid, Point3::new(corner[0], corner[1], z))?;
    make_chamfer(solid, edge.id, distance)
}

fn bore_centers(spec: &GridSpec, layout: BoreLayout, center: [f64; 2]) -> Vec<[f64; 2]> {
    let half = spec.magnet_spacing() / 2.0;
    match layout {
        BoreLayout::Corners => [(-1.0, -1.0), (1.0, -1.0), (1.0, 1.0), (-1.0, 1.0)]
            .iter()
            .map(|(sx, sy)| [center[0] + sx * half, center[1] + sy * half])
            .collect(),
        BoreLayout::Centered => vec![center],
        BoreLayout::None => vec![],
    }
}

/// Add the mating lip under the bottom face of a block
///
/// # Arguments
/// * `spec` - Grid constants
/// * `solid` - Block whose lowest face is a full `width` x `height` body bottom
/// * `width`, `height` - Footprint in grid units
/// * `options` - Screw depth and bore layout
///
/// # Returns
/// The lipped solid together with the cells whose corner chamfer was skipped.
/// Every other failure is fatal.
pub fn gridfinity_block_lip(
    spec: &GridSpec,
    solid: &Solid,
    width: u32,
    height: u32,
    options: LipOptions,
) -> Result<LipBuild> {
    spec.validate()?;
    let screw_depth = match options.screw_depth {
        ScrewDepth::Standard => Some(spec.screw_depth),
        ScrewDepth::Custom(depth) if depth.is_finite() && depth > spec.magnet_depth => Some(depth),
        ScrewDepth::Custom(depth) => {
            return Err(GridfinityError::InvalidParameter(format!(
                "Screw depth {} must exceed the magnet depth {}",
                depth, spec.magnet_depth
            )));
        }
        ScrewDepth::Through => None,
    };

    let face = select_face(solid, Extreme::Bottom)?;
    check_face_extent(spec, &face, "bottom", width, height)?;
    let z = face.z;
    let center = face.center();
    let origin = [center.x, center.y];
    log::debug!("mating lip {}x{} under bottom face at z = {}", width, height, z);

    let lip = lip_stack(spec, 1, 1)?;
    let mut result = solid.clone();
    for column in 0..width {
        for row in 0..height {
            let center = cell_center(spec, origin, column, row, width, height);
            let cell = translate(&lip, [center[0], center[1], z]);
            result = fuse(&result, &cell).step("lip cell union")?;
        }
    }

    let mut skipped = Vec::new();
    for column in 0..width {
        for row in 0..height {
            let corner = cell_corner(spec, origin, column, row, width, height);
            match chamfer_cell(&result, corner, z, spec.lip_corner_chamfer()) {
                Ok(chamfered) => result = chamfered,
                Err(error) => {
                    log::warn!("skipping lip corner chamfer of cell ({}, {}): {}", column, row, error);
                    skipped.push(SkippedCell { column, row, error });
                }
            }
        }
    }

    if options.bores == BoreLayout::None {
        return Ok(LipBuild { solid: result, skipped });
    }

    let (min, _) = bounding_box(&result)?;
    let bore = Counterbore {
        hole_diameter: spec.screw_diameter,
        cbore_diameter: spec.magnet_diameter,
        cbore_depth: spec.magnet_depth,
        depth: screw_depth,
    };
    for column in 0..width {
        for row in 0..height {
            let center = cell_center(spec, origin, column, row, width, height);
            for at in bore_centers(spec, options.bores, center) {
                result = make_cbore_hole(&result, [at[0], at[1], min[2]], 1.0, &bore).step("counterbore")?;
            }
        }
    }
    log::debug!("drilled {} counterbores from z = {}", result.bores.len(), min[2]);

    Ok(LipBuild { solid: result, skipped })
}

/// A one-unit-deep block with a single lip spanning the whole footprint.
///
/// Mates with a stacking recess but not with a baseplate; covers are cut from
/// it.
pub fn giant_block_lip(spec: &GridSpec, width: u32, height: u32) -> Result<Solid> {
    let body = gridfinity_block(spec, width, height, 1.0)?;
    let lip = lip_stack(spec, width, height)?;
    let result = fuse(&body, &lip).step("giant lip union")?;

    let step = "giant lip corner chamfer";
    let corner = cell_corner(spec, [0.0, 0.0], 0, 0, width, height);
    let edge = select_edge(&result, [corner[0], corner[1], 0.0], step)?;
    make_chamfer(&result, edge, spec.lip_corner_chamfer()).step(step)
}
