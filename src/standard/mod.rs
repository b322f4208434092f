//! The Gridfinity recipe
//!
//! Turns grid coordinates into standard-compliant solids:
//! - [`dimensions`]: the constants of the standard
//! - [`profile`]: inset rounded-rectangle profiles
//! - [`block`]: block bodies, depth arithmetic and the [`Block`] builder
//! - [`stack`]: the stacking recess cut into a block's top
//! - [`lip`]: the mating lip and magnet/screw counterbores under a block
//! - [`mating`]: checks that a lip seats in a stacking recess

pub mod dimensions;
pub mod profile;
pub mod block;
pub mod stack;
pub mod lip;
pub mod mating;

pub use block::{
    block_cut_limit, block_extrusion, block_top_surface, gridfinity_block, top_surface_length,
    Block,
};
pub use dimensions::GridSpec;
pub use lip::{
    giant_block_lip, gridfinity_block_lip, BoreLayout, LipBuild, LipOptions, ScrewDepth, SkippedCell,
};
pub use mating::{mating_clearance, MatingReport};
pub use profile::inset_profile;
pub use stack::gridfinity_block_stack;

use nalgebra::Point3;

use crate::brep::{EdgeRef, Solid};
use crate::precision::same_length;
use crate::query::{self, Extreme, Face};
use crate::KernelError;

/// Result type for recipe operations
pub type Result<T> = std::result::Result<T, GridfinityError>;

#[derive(Debug, thiserror::Error)]
pub enum GridfinityError {
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    #[error(
        "Footprint {width}x{height} expects a {expected_width} x {expected_height} mm {face} face, found {actual_width} x {actual_height} mm"
    )]
    FootprintMismatch {
        face: &'static str,
        width: u32,
        height: u32,
        expected_width: f64,
        expected_height: f64,
        actual_width: f64,
        actual_height: f64,
    },

    #[error("No edge found near ({}, {}, {}) for {step}", .point[0], .point[1], .point[2])]
    EdgeNotFound { step: &'static str, point: [f64; 3] },

    #[error("Solid has no {0} face")]
    FaceNotFound(Extreme),

    #[error("{count} faces tie for the {which} face at z = {z}")]
    AmbiguousFace { which: Extreme, count: usize, z: f64 },

    #[error("{step} failed: {source}")]
    Construction {
        step: &'static str,
        #[source]
        source: KernelError,
    },

    #[error(transparent)]
    Kernel(#[from] KernelError),

    #[error("Invalid grid spec: {0}")]
    Config(#[from] serde_json::Error),
}

/// Attach the name of a recipe step to a kernel failure.
pub(crate) trait StepContext<T> {
    fn step(self, step: &'static str) -> Result<T>;
}

impl<T> StepContext<T> for crate::Result<T> {
    fn step(self, step: &'static str) -> Result<T> {
        self.map_err(|source| GridfinityError::Construction { step, source })
    }
}

/// Select the single highest or lowest planar face, like `faces(">Z")`.
pub(crate) fn select_face(solid: &Solid, which: Extreme) -> Result<Face> {
    let mut matching = query::extreme_faces(solid, which);
    match matching.len() {
        0 => Err(GridfinityError::FaceNotFound(which)),
        1 => Ok(matching.remove(0)),
        count => Err(GridfinityError::AmbiguousFace {
            which,
            count,
            z: matching[0].z,
        }),
    }
}

/// Select the edge nearest `point` for the recipe step `step`.
pub(crate) fn select_edge(solid: &Solid, point: [f64; 3], step: &'static str) -> Result<EdgeRef> {
    let edge = query::nearest_edge(solid, Point3::new(point[0], point[1], point[2]))
        .map_err(|_| GridfinityError::EdgeNotFound { step, point })?;
    log::debug!("{}: selected {:?} at z = {}", step, edge.id, edge.z);
    Ok(edge.id)
}

/// Check that `face` spans exactly the body outline of a footprint.
pub(crate) fn check_face_extent(
    spec: &GridSpec,
    face: &Face,
    name: &'static str,
    width: u32,
    height: u32,
) -> Result<()> {
    let expected_width = spec.body_length(width);
    let expected_height = spec.body_length(height);
    let (actual_width, actual_height) = face.extent();
    if same_length(actual_width, expected_width) && same_length(actual_height, expected_height) {
        return Ok(());
    }
    Err(GridfinityError::FootprintMismatch {
        face: name,
        width,
        height,
        expected_width,
        expected_height,
        actual_width,
        actual_height,
    })
}

/// Reject a zero-sized footprint.
pub(crate) fn check_footprint(width: u32, height: u32) -> Result<()> {
    if width == 0 || height == 0 {
        return Err(GridfinityError::InvalidParameter(format!(
            "Footprint must be at least 1x1, got {}x{}",
            width, height
        )));
    }
    Ok(())
}
