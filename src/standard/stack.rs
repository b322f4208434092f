//! Stacking recess
//!
//! The top of a block is recessed so that the mating lip of another block
//! seats in it. The recess wall is vertical at `mating_inset`, bevelled at the
//! floor, and opens through a chamfer into a thin rounded crest.

use super::{check_face_extent, inset_profile, select_edge, select_face, GridSpec, Result, StepContext};
use crate::boolean::cut;
use crate::brep::Solid;
use crate::chamfer::make_chamfer;
use crate::fillet::make_fillet;
use crate::primitive::extrude;
use crate::query::Extreme;

/// Cut the stacking recess out of the top face of a block
///
/// # Arguments
/// * `spec` - Grid constants
/// * `solid` - Block whose highest face is a full `width` x `height` body top
/// * `width`, `height` - Footprint in grid units
///
/// # Returns
/// A new Solid with the recess, or an error naming the step that failed
pub fn gridfinity_block_stack(spec: &GridSpec, solid: &Solid, width: u32, height: u32) -> Result<Solid> {
    spec.validate()?;
    let face = select_face(solid, Extreme::Top)?;
    check_face_extent(spec, &face, "top", width, height)?;
    let top = face.z;
    let center = face.center();
    let (x, y) = (center.x, center.y);
    log::debug!("stacking recess {}x{} from top face at z = {}", width, height, top);

    let profile = inset_profile(spec, width, height, spec.mating_inset)?.translated(x, y);
    let recess = extrude(&profile, top, -spec.stacking_mating_depth).step("recess extrusion")?;
    let mut result = cut(solid, &recess).step("recess cut")?;

    let half_w = f64::from(width) * spec.grid_unit / 2.0;
    let half_h = f64::from(height) * spec.grid_unit / 2.0;
    let crest = 4.0 * spec.block_stacking_lip;

    let step = "recess mouth chamfer";
    let edge = select_edge(&result, [x, y, top], step)?;
    result = make_chamfer(&result, edge, spec.stack_mouth_chamfer()).step(step)?;

    let step = "recess floor chamfer";
    let edge = select_edge(&result, [x, y, top - spec.block_mating_depth], step)?;
    result = make_chamfer(&result, edge, spec.block_stacking_chamfer).step(step)?;

    let step = "outer top fillet";
    let edge = select_edge(&result, [x + half_w, y + half_h, top + 10.0], step)?;
    result = make_fillet(&result, edge, spec.block_stacking_lip / 2.0).step(step)?;

    let step = "crest fillet";
    let edge = select_edge(&result, [x + half_w - crest, y + half_h - crest, top + 2.0], step)?;
    make_fillet(&result, edge, spec.block_stacking_lip).step(step)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::boolean::translate;
    use crate::brep::{EdgeRef, End};
    use crate::query::{bounding_box, faces, volume};
    use crate::standard::{block_extrusion, block_top_surface, gridfinity_block, GridfinityError};

    fn stacked(width: u32, height: u32) -> Solid {
        let spec = GridSpec::default();
        let body = gridfinity_block(&spec, width, height, 3.0).unwrap();
        gridfinity_block_stack(&spec, &body, width, height).expect("Stacking should succeed")
    }

    #[test]
    fn test_stack_keeps_outer_height() {
        let spec = GridSpec::default();
        let (_, max) = bounding_box(&stacked(1, 1)).unwrap();
        assert!((max[2] - block_extrusion(&spec, 3.0)).abs() < 1e-9);
    }

    #[test]
    fn test_stack_recess_shape() {
        let spec = GridSpec::default();
        let solid = stacked(1, 1);
        assert_eq!(solid.voids.len(), 1);
        let recess = &solid.voids[0];
        assert_eq!(recess.top, End::Mouth { host: 0 });
        assert_eq!(recess.bottom, End::Floor);

        // Floor sits at the top surface, bevelled inward
        let floor = recess.stations[0];
        assert!((floor.z - block_top_surface(&spec, 3.0)).abs() < 1e-9);
        assert!((floor.offset - spec.block_stacking_chamfer).abs() < 1e-12);

        // Vertical wall at the mating inset
        let wall = recess.section(floor.z + 1.5).unwrap();
        assert!((wall.width - 37.2).abs() < 1e-9);
    }

    #[test]
    fn test_stack_leaves_crest_on_top() {
        let spec = GridSpec::default();
        let solid = stacked(1, 1);
        let body = &solid.lumps[0];
        let top_index = body.last_station();
        let top = body.stations[top_index];
        assert!((top.offset - spec.block_stacking_lip / 2.0).abs() < 1e-12);
        assert!(solid.stack(EdgeRef::Lump { stack: 0, station: top_index }).is_some());

        // Both fillets leave smooth samples behind
        assert!(body.stations.iter().any(|s| s.smooth));
        assert!(solid.voids[0].stations.iter().any(|s| s.smooth));
        // The crest face is the only upward face at the top
        let top_faces: Vec<_> = faces(&solid)
            .into_iter()
            .filter(|f| (f.z - top.z).abs() < 1e-9)
            .collect();
        assert_eq!(top_faces.len(), 1);
        assert_eq!(top_faces[0].holes.len(), 1);
    }

    #[test]
    fn test_stack_removes_material() {
        let spec = GridSpec::default();
        let body = gridfinity_block(&spec, 2, 2, 3.0).unwrap();
        let solid = gridfinity_block_stack(&spec, &body, 2, 2).unwrap();
        let removed = volume(&body) - volume(&solid);
        let recess = inset_profile(&spec, 2, 2, spec.mating_inset).unwrap().area() * spec.stacking_mating_depth;
        assert!(removed > recess * 0.9, "Recess should remove most of its prism");
        assert!(removed < recess * 1.2, "Mouth chamfer and fillets only widen it slightly");
    }

    #[test]
    fn test_stack_footprint_mismatch() {
        let spec = GridSpec::default();
        let body = gridfinity_block(&spec, 2, 1, 3.0).unwrap();
        let result = gridfinity_block_stack(&spec, &body, 1, 1);
        assert!(matches!(result, Err(GridfinityError::FootprintMismatch { face: "top", .. })));
    }

    #[test]
    fn test_stack_follows_a_moved_block() {
        let spec = GridSpec::default();
        let delta = [100.0, -50.0, 0.0];
        let body = translate(&gridfinity_block(&spec, 2, 1, 3.0).unwrap(), delta);
        let moved = gridfinity_block_stack(&spec, &body, 2, 1).expect("Moved block should stack");
        assert_eq!(moved.voids[0].base.center, [100.0, -50.0]);
        assert_eq!(moved, translate(&stacked(2, 1), delta));
    }

    #[test]
    fn test_stack_rejects_invalid_spec() {
        let spec = GridSpec {
            block_stacking_lip: 2.5,
            ..GridSpec::default()
        };
        let body = gridfinity_block(&GridSpec::default(), 1, 1, 3.0).unwrap();
        let result = gridfinity_block_stack(&spec, &body, 1, 1);
        assert!(matches!(result, Err(GridfinityError::InvalidParameter(_))));
    }

    #[test]
    fn test_stack_twice_fails() {
        let spec = GridSpec::default();
        let solid = stacked(1, 1);
        let result = gridfinity_block_stack(&spec, &solid, 1, 1);
        assert!(result.is_err(), "Crest face is narrower than the footprint");
    }
}
