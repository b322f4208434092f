//! Boolean operations on solids
//!
//! Union and difference restricted to the configurations a Gridfinity part is
//! assembled from:
//! - **fuse**: lumps are either disjoint or stand end-to-end, one end cap lying
//!   inside the other's (a lip cell under a block body)
//! - **cut**: the tool opens onto a free end cap of exactly one lump and stays
//!   inside it (a stacking recess)
//!
//! Anything else is reported as [`KernelError::BooleanFailed`] rather than
//! producing a wrong shape.

use crate::brep::topology::{end_section, material_run};
use crate::brep::{End, Solid, Stack};
use crate::precision::{same_length, LINEAR};
use crate::sketch::Profile;
use crate::{KernelError, Result};

/// Move a solid by `delta`.
pub fn translate(solid: &Solid, delta: [f64; 3]) -> Solid {
    Solid {
        lumps: solid.lumps.iter().map(|s| s.translated(delta)).collect(),
        voids: solid.voids.iter().map(|s| s.translated(delta)).collect(),
        bores: solid
            .bores
            .iter()
            .map(|b| {
                let mut bore = *b;
                bore.center = [b.center[0] + delta[0], b.center[1] + delta[1]];
                bore.z += delta[2];
                bore
            })
            .collect(),
    }
}

fn z_overlap(a: &Stack, b: &Stack) -> bool {
    a.z_max().min(b.z_max()) - a.z_min().max(b.z_min()) > LINEAR
}

fn xy_overlap(a: &Profile, b: &Profile) -> bool {
    let (a_min, a_max) = a.bounds();
    let (b_min, b_max) = b.bounds();
    (0..2).all(|i| a_max[i].min(b_max[i]) - a_min[i].max(b_min[i]) > LINEAR)
}

/// Widest section of a stack, used for coarse overlap tests.
fn envelope(stack: &Stack) -> Option<Profile> {
    let widest = stack
        .stations
        .iter()
        .map(|s| s.offset)
        .fold(f64::INFINITY, f64::min);
    stack.base.offset(widest)
}

fn stacks_overlap(a: &Stack, b: &Stack) -> bool {
    if !z_overlap(a, b) {
        return false;
    }
    match (envelope(a), envelope(b)) {
        (Some(pa), Some(pb)) => xy_overlap(&pa, &pb),
        _ => true,
    }
}

fn remap_host(end: End, shift: usize) -> End {
    match end {
        End::Attached { host } => End::Attached { host: host + shift },
        End::Mouth { host } => End::Mouth { host: host + shift },
        other => other,
    }
}

/// Try to seat the end of lump `lower`'s top against lump `upper`'s bottom.
fn attach_pair(solid: &mut Solid, lower: usize, upper: usize) -> Result<()> {
    let z = solid.lumps[lower].z_max();
    if !same_length(z, solid.lumps[upper].z_min()) {
        return Ok(());
    }
    let (Some(lower_cap), Some(upper_cap)) = (
        end_section(&solid.lumps[lower], z),
        end_section(&solid.lumps[upper], z),
    ) else {
        return Ok(());
    };
    if !xy_overlap(&lower_cap, &upper_cap) {
        return Ok(());
    }

    if upper_cap.contains_profile(&lower_cap, LINEAR) && solid.lumps[upper].bottom == End::Free {
        solid.lumps[lower].top = End::Attached { host: upper };
        Ok(())
    } else if lower_cap.contains_profile(&upper_cap, LINEAR) && solid.lumps[lower].top == End::Free
    {
        solid.lumps[upper].bottom = End::Attached { host: lower };
        Ok(())
    } else {
        Err(KernelError::BooleanFailed(format!(
            "End faces at z = {} overlap without one containing the other",
            z
        )))
    }
}

/// Boolean union
///
/// # Arguments
/// * `base` - The solid to add to
/// * `tool` - The solid added; its lumps must not overlap `base` in volume
///
/// # Returns
/// A new Solid holding both, with touching end caps joined
pub fn fuse(base: &Solid, tool: &Solid) -> Result<Solid> {
    let shift = base.lumps.len();
    let mut result = base.clone();

    for lump in &tool.lumps {
        if let Some(existing) = result.lumps.iter().find(|l| stacks_overlap(l, lump)) {
            return Err(KernelError::BooleanFailed(format!(
                "Fused lumps overlap in volume between z = {} and z = {}",
                existing.z_min().max(lump.z_min()),
                existing.z_max().min(lump.z_max())
            )));
        }
        let mut lump = lump.clone();
        lump.bottom = remap_host(lump.bottom, shift);
        lump.top = remap_host(lump.top, shift);
        result.lumps.push(lump);
    }
    for void in &tool.voids {
        let mut void = void.clone();
        void.bottom = remap_host(void.bottom, shift);
        void.top = remap_host(void.top, shift);
        result.voids.push(void);
    }
    result.bores.extend(tool.bores.iter().copied());

    for added in shift..result.lumps.len() {
        for other in 0..result.lumps.len() {
            if other == added {
                continue;
            }
            attach_pair(&mut result, added, other)?;
            attach_pair(&mut result, other, added)?;
        }
    }

    Ok(result)
}

/// Find the lump whose free end cap at `z` contains `section`.
fn find_host(solid: &Solid, z: f64, section: &Profile) -> Option<usize> {
    solid.lumps.iter().position(|lump| {
        let free = if same_length(lump.z_max(), z) {
            lump.top == End::Free
        } else if same_length(lump.z_min(), z) {
            lump.bottom == End::Free
        } else {
            false
        };
        free && end_section(lump, z).is_some_and(|cap| cap.contains_profile(section, LINEAR))
    })
}

/// Boolean difference
///
/// # Arguments
/// * `base` - The solid to cut from
/// * `tool` - Plain lumps (no cut-outs of their own), each opening onto one
///   free end cap of `base`
///
/// # Returns
/// A new Solid with the tool's volume removed
pub fn cut(base: &Solid, tool: &Solid) -> Result<Solid> {
    if !tool.voids.is_empty() || !tool.bores.is_empty() {
        return Err(KernelError::NotImplemented(
            "Cutting with a tool that has cut-outs".into(),
        ));
    }

    let mut result = base.clone();
    for cutter in &tool.lumps {
        let bottom_cap = cutter.station_section(0);
        let top_cap = cutter.station_section(cutter.last_station());
        let (Some(bottom_cap), Some(top_cap)) = (bottom_cap, top_cap) else {
            return Err(KernelError::InvalidGeometry("Cut tool section collapses".into()));
        };

        let top_host = find_host(&result, cutter.z_max(), &top_cap);
        let bottom_host = find_host(&result, cutter.z_min(), &bottom_cap);
        let (host, mouth_at_top) = match (top_host, bottom_host) {
            (Some(_), Some(_)) => {
                return Err(KernelError::NotImplemented("Through cuts".into()));
            }
            (Some(host), None) => (host, true),
            (None, Some(host)) => (host, false),
            (None, None) => {
                return Err(KernelError::BooleanFailed(format!(
                    "Cut tool spanning z = {}..{} does not open onto a free face",
                    cutter.z_min(),
                    cutter.z_max()
                )));
            }
        };

        let host_stack = &result.lumps[host];
        if cutter.z_min() < host_stack.z_min() - LINEAR || cutter.z_max() > host_stack.z_max() + LINEAR {
            return Err(KernelError::BooleanFailed(
                "Cut tool runs out of its host lump".into(),
            ));
        }
        let heights = cutter
            .stations
            .iter()
            .chain(host_stack.stations.iter())
            .map(|s| s.z)
            .filter(|z| *z >= cutter.z_min() && *z <= cutter.z_max());
        for z in heights {
            let fits = match (host_stack.section(z), cutter.section(z)) {
                (Some(outer), Some(inner)) => outer.contains_profile(&inner, LINEAR),
                _ => false,
            };
            if !fits {
                return Err(KernelError::BooleanFailed(format!(
                    "Cut tool breaks through the side of its host at z = {}",
                    z
                )));
            }
        }

        let mut void = cutter.clone();
        if mouth_at_top {
            void.top = End::Mouth { host };
            void.bottom = End::Floor;
        } else {
            void.bottom = End::Mouth { host };
            void.top = End::Floor;
        }
        if result.voids.iter().any(|existing| stacks_overlap(existing, &void)) {
            return Err(KernelError::BooleanFailed(
                "Cut tool overlaps an existing cut".into(),
            ));
        }
        result.voids.push(void);
        trim_bores(&mut result)?;
    }

    Ok(result)
}

/// Shorten every hole a cut has opened into so that it exits on the cut's
/// floor.
fn trim_bores(solid: &mut Solid) -> Result<()> {
    for index in 0..solid.bores.len() {
        let bore = solid.bores[index];
        let start = [bore.center[0], bore.center[1], bore.z];
        let Some(run) = material_run(solid, start, bore.direction) else {
            continue;
        };
        if run >= bore.depth - LINEAR {
            continue;
        }
        if run <= bore.cbore_depth {
            return Err(KernelError::BooleanFailed(format!(
                "Cut breaks into the counterbore at ({}, {})",
                bore.center[0], bore.center[1]
            )));
        }
        let trimmed = &mut solid.bores[index];
        trimmed.depth = run;
        trimmed.through = true;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::primitive::extrude;

    fn body() -> Solid {
        let profile = Profile::rounded_rect(41.5, 41.5, 3.75).unwrap();
        extrude(&profile, 0.0, 20.0).unwrap()
    }

    #[test]
    fn test_fuse_attaches_lip_below_body() {
        let lip_profile = Profile::rounded_rect(37.2, 37.2, 1.6).unwrap();
        let lip = extrude(&lip_profile, 0.0, -4.75).unwrap();

        let fused = fuse(&body(), &lip).expect("Fuse should succeed");
        assert_eq!(fused.lumps.len(), 2);
        assert_eq!(fused.lumps[1].top, End::Attached { host: 0 });
        assert_eq!(fused.lumps[0].bottom, End::Free);
    }

    #[test]
    fn test_fuse_attaches_body_onto_lip() {
        let lip_profile = Profile::rounded_rect(37.2, 37.2, 1.6).unwrap();
        let lip = extrude(&lip_profile, 0.0, -4.75).unwrap();

        let fused = fuse(&lip, &body()).expect("Fuse should succeed");
        assert_eq!(fused.lumps[0].top, End::Attached { host: 1 });
    }

    #[test]
    fn test_fuse_disjoint() {
        let moved = translate(&body(), [100.0, 0.0, 0.0]);
        let fused = fuse(&body(), &moved).expect("Disjoint fuse should succeed");
        assert_eq!(fused.lumps.len(), 2);
        assert_eq!(fused.lumps[0].bottom, End::Free);
        assert_eq!(fused.lumps[1].bottom, End::Free);
    }

    #[test]
    fn test_fuse_overlapping_fails() {
        let moved = translate(&body(), [10.0, 0.0, 5.0]);
        assert!(fuse(&body(), &moved).is_err(), "Overlapping lumps should fail");
    }

    #[test]
    fn test_cut_recess_from_top() {
        let recess_profile = Profile::rounded_rect(37.2, 37.2, 1.6).unwrap();
        let recess = extrude(&recess_profile, 20.0, -3.796).unwrap();

        let cut_solid = cut(&body(), &recess).expect("Cut should succeed");
        assert_eq!(cut_solid.voids.len(), 1);
        assert_eq!(cut_solid.voids[0].top, End::Mouth { host: 0 });
        assert_eq!(cut_solid.voids[0].bottom, End::Floor);
    }

    #[test]
    fn test_cut_floating_tool_fails() {
        let profile = Profile::rect(5.0, 5.0).unwrap();
        let inside = extrude(&profile, 5.0, 5.0).unwrap();
        assert!(matches!(cut(&body(), &inside), Err(KernelError::BooleanFailed(_))));
    }

    #[test]
    fn test_cut_oversized_tool_fails() {
        let profile = Profile::rect(50.0, 50.0).unwrap();
        let tool = extrude(&profile, 20.0, -3.0).unwrap();
        assert!(cut(&body(), &tool).is_err(), "Tool wider than the face should fail");
    }

    #[test]
    fn test_cut_trims_holes_it_opens_into() {
        let bore = crate::feature::Counterbore {
            hole_diameter: 3.5,
            cbore_diameter: 6.5,
            cbore_depth: 2.4,
            depth: None,
        };
        let drilled = crate::feature::make_cbore_hole(&body(), [13.0, 13.0, 0.0], 1.0, &bore).unwrap();
        assert_eq!(drilled.bores[0].end_z(), 20.0);

        let recess = extrude(&Profile::rounded_rect(37.2, 37.2, 1.6).unwrap(), 20.0, -3.796).unwrap();
        let cut_solid = cut(&drilled, &recess).unwrap();
        assert!((cut_solid.bores[0].end_z() - 16.204).abs() < 1e-9);
        assert!(cut_solid.bores[0].through);

        // A blind hole the cut reaches becomes a through hole
        let blind = crate::feature::Counterbore {
            depth: Some(18.0),
            ..bore
        };
        let drilled = crate::feature::make_cbore_hole(&body(), [13.0, 13.0, 0.0], 1.0, &blind).unwrap();
        assert!(!drilled.bores[0].through);
        let cut_solid = cut(&drilled, &recess).unwrap();
        assert!(cut_solid.bores[0].through);
        assert!((cut_solid.bores[0].depth - 16.204).abs() < 1e-9);
    }

    #[test]
    fn test_translate_moves_bores_and_stacks() {
        let moved = translate(&body(), [1.0, -1.0, 2.5]);
        assert_eq!(moved.lumps[0].base.center, [1.0, -1.0]);
        assert_eq!(moved.lumps[0].z_min(), 2.5);
    }
}
