//! gridfinity: parametric Gridfinity storage blocks
//!
//! Generates storage blocks for the Gridfinity modular grid: rounded inset
//! profiles, block bodies, the bottom mating lip with magnet/screw
//! counterbores, and the top stacking recess, all mating across
//! independently generated parts.
//!
//! The recipe lives in [`standard`]. It runs on a small solid kernel
//! (`sketch`, `brep`, `primitive`, `boolean`, `chamfer`, `fillet`,
//! `feature`, `query`) that models exactly the swept rounded-rectangle solids
//! a Gridfinity part is made of.
//!
//! ```ignore
//! use gridfinity::{Block, GridSpec, LipOptions};
//!
//! let spec = GridSpec::default();
//! let block = Block::new(&spec, 2, 1, 3.0)?
//!     .stack()?
//!     .lip(LipOptions::default())?;
//! ```

pub mod precision;
pub mod sketch;
pub mod brep;
pub mod primitive;
pub mod boolean;
pub mod chamfer;
pub mod fillet;
pub mod feature;
pub mod query;
pub mod standard;

// Re-exports for convenience
pub use brep::{Bore, EdgeRef, End, Solid, Stack, Station};
pub use sketch::Profile;
pub use primitive::extrude;
pub use boolean::{cut, fuse, translate};
pub use chamfer::make_chamfer;
pub use fillet::make_fillet;
pub use feature::{make_cbore_hole, Counterbore};
pub use query::{Edge, Extreme, Face};
pub use standard::{
    block_cut_limit, block_extrusion, block_top_surface, giant_block_lip, gridfinity_block,
    gridfinity_block_lip, gridfinity_block_stack, inset_profile, mating_clearance,
    top_surface_length, Block, BoreLayout, GridSpec, GridfinityError, LipBuild, LipOptions,
    MatingReport, ScrewDepth, SkippedCell,
};

/// Result type for kernel operations
pub type Result<T> = std::result::Result<T, KernelError>;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum KernelError {
    #[error("Invalid geometry: {0}")]
    InvalidGeometry(String),

    #[error("Boolean operation failed: {0}")]
    BooleanFailed(String),

    #[error("Topology error: {0}")]
    TopologyError(String),

    #[error("Selection failed: {0}")]
    SelectionFailed(String),

    #[error("Not implemented: {0}")]
    NotImplemented(String),
}
