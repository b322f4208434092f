//! Block bodies
//!
//! Depth arithmetic, the plain block body, and [`Block`], which chains the
//! body with the stacking recess and the mating lip.

use super::lip::{gridfinity_block_lip, LipOptions, SkippedCell};
use super::stack::gridfinity_block_stack;
use super::{
    check_footprint, inset_profile, select_face, GridSpec, GridfinityError, Result, StepContext,
};
use crate::brep::Solid;
use crate::precision::same_length;
use crate::primitive::extrude;
use crate::query::{faces, Extreme, Face};

/// Height of a body `depth` units tall, without the mating lip below it.
pub fn block_extrusion(spec: &GridSpec, depth: f64) -> f64 {
    (spec.grid_depth - spec.block_mating_depth) / 2.0 * depth - spec.stacking_clearance_depth
}

/// Height of the stacking recess floor of a body `depth` units tall.
///
/// This is the top of the solid material; object cut-outs start here.
pub fn block_top_surface(spec: &GridSpec, depth: f64) -> f64 {
    block_extrusion(spec, depth) - spec.stacking_mating_depth
}

/// How far below [`block_top_surface`] a cut may reach before it meets the
/// tops of the screw bores.
pub fn block_cut_limit(spec: &GridSpec, depth: f64) -> f64 {
    block_top_surface(spec, depth) - (spec.screw_depth - spec.block_mating_depth)
}

/// Usable edge length of a block's top, `units` cells long.
pub fn top_surface_length(spec: &GridSpec, units: u32) -> f64 {
    spec.body_length(units)
}

/// Extrude the body of a `width` x `height` block, `depth` units tall
///
/// # Arguments
/// * `spec` - Grid constants
/// * `width`, `height` - Footprint in grid units
/// * `depth` - Height in depth units; halves are allowed
///
/// # Returns
/// A prism from `z = 0` to [`block_extrusion`], without lip or recess
pub fn gridfinity_block(spec: &GridSpec, width: u32, height: u32, depth: f64) -> Result<Solid> {
    spec.validate()?;
    check_footprint(width, height)?;
    let extrusion = block_extrusion(spec, depth);
    if !depth.is_finite() || extrusion <= 0.0 {
        return Err(GridfinityError::InvalidParameter(format!(
            "Depth {} gives a non-positive body height {}",
            depth, extrusion
        )));
    }

    let profile = inset_profile(spec, width, height, spec.block_spacing / 2.0)?;
    log::debug!(
        "block body {}x{}: {} x {} mm, {} mm tall",
        width,
        height,
        profile.width,
        profile.height,
        extrusion
    );
    extrude(&profile, 0.0, extrusion).step("block body extrusion")
}

/// A block under construction.
///
/// ```ignore
/// let spec = GridSpec::default();
/// let block = Block::new(&spec, 2, 1, 3.0)?.stack()?.lip(LipOptions::default())?;
/// assert!(block.skipped().is_empty());
/// ```
#[derive(Debug, Clone)]
pub struct Block<'a> {
    spec: &'a GridSpec,
    width: u32,
    height: u32,
    depth: f64,
    solid: Solid,
    stacked: bool,
    lipped: bool,
    skipped: Vec<SkippedCell>,
}

impl<'a> Block<'a> {
    /// Start a block with a plain body.
    pub fn new(spec: &'a GridSpec, width: u32, height: u32, depth: f64) -> Result<Self> {
        let solid = gridfinity_block(spec, width, height, depth)?;
        Ok(Self {
            spec,
            width,
            height,
            depth,
            solid,
            stacked: false,
            lipped: false,
            skipped: Vec::new(),
        })
    }

    /// Cut the stacking recess into the top.
    pub fn stack(mut self) -> Result<Self> {
        if self.stacked {
            return Err(GridfinityError::InvalidParameter(
                "Block already has a stacking recess".into(),
            ));
        }
        self.solid = gridfinity_block_stack(self.spec, &self.solid, self.width, self.height)?;
        self.stacked = true;
        Ok(self)
    }

    /// Add the mating lip and bores underneath.
    pub fn lip(mut self, options: LipOptions) -> Result<Self> {
        if self.lipped {
            return Err(GridfinityError::InvalidParameter(
                "Block already has a mating lip".into(),
            ));
        }
        let build = gridfinity_block_lip(self.spec, &self.solid, self.width, self.height, options)?;
        self.solid = build.solid;
        self.skipped = build.skipped;
        self.lipped = true;
        Ok(self)
    }

    pub fn solid(&self) -> &Solid {
        &self.solid
    }

    pub fn into_solid(self) -> Solid {
        self.solid
    }

    /// Lip cells whose corner chamfer could not be applied.
    pub fn skipped(&self) -> &[SkippedCell] {
        &self.skipped
    }

    pub fn footprint(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub fn depth(&self) -> f64 {
        self.depth
    }

    /// The face object cut-outs start from: the recess floor of a stacked
    /// block, otherwise the top of the body.
    pub fn top_face(&self) -> Result<Face> {
        if !self.stacked {
            return select_face(&self.solid, Extreme::Top);
        }
        let z = block_top_surface(self.spec, self.depth);
        faces(&self.solid)
            .into_iter()
            .find(|face| face.normal > 0.0 && same_length(face.z, z))
            .ok_or(GridfinityError::FaceNotFound(Extreme::Top))
    }
}
