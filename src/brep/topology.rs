//! Topological queries on stack solids
//!
//! Resolves which faces meet at a loop edge and how far each of them runs
//! before hitting another edge. Chamfer and fillet use this to decide whether
//! a setback fits.

use nalgebra::Vector2;

use super::{EdgeRef, End, Solid, Stack, Station};
use crate::precision::{same_length, LINEAR};
use crate::sketch::Profile;
use crate::{KernelError, Result};

/// One of the two faces leaving a corner, in the stack's `(offset, z)` plane.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Leg {
    pub direction: Vector2<f64>,
    pub length: f64,
}

/// A loop edge seen in cross-section: the corner point in `(offset, z)` and
/// the faces on either side of it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Corner {
    pub point: Vector2<f64>,
    /// Face toward the station below, or the end cap for a bottom end.
    pub below: Leg,
    /// Face toward the station above, or the end cap for a top end.
    pub above: Leg,
}

impl Corner {
    /// Angle between the two faces, in radians.
    pub fn opening(&self) -> f64 {
        self.below.direction.dot(&self.above.direction).clamp(-1.0, 1.0).acos()
    }
}

/// Section of `stack` at its end lying in the plane `z`, if it has one there.
pub fn end_section(stack: &Stack, z: f64) -> Option<Profile> {
    if same_length(stack.z_min(), z) {
        stack.station_section(0)
    } else if same_length(stack.z_max(), z) {
        stack.station_section(stack.last_station())
    } else {
        None
    }
}

/// Outlines opening into the free end cap of lump `lump` at height `z`:
/// recess mouths, lumps standing on the cap, and bores starting or exiting
/// there.
pub fn cap_holes(solid: &Solid, lump: usize, z: f64) -> Vec<Profile> {
    let mut holes = Vec::new();

    for void in &solid.voids {
        for (end, index) in [(void.bottom, 0), (void.top, void.last_station())] {
            if end == (End::Mouth { host: lump }) && same_length(void.stations[index].z, z) {
                holes.extend(void.station_section(index));
            }
        }
    }

    for other in &solid.lumps {
        for (end, index) in [(other.bottom, 0), (other.top, other.last_station())] {
            if end == (End::Attached { host: lump }) && same_length(other.stations[index].z, z) {
                holes.extend(other.station_section(index));
            }
        }
    }

    if let Some(cap) = solid.lumps.get(lump).and_then(|stack| end_section(stack, z)) {
        for bore in &solid.bores {
            let opens_here =
                same_length(bore.z, z) || (bore.through && same_length(bore.end_z(), z));
            if !opens_here || !cap.contains_point(bore.center, LINEAR) {
                continue;
            }
            let radius = if same_length(bore.z, z) {
                bore.cbore_diameter / 2.0
            } else {
                bore.hole_diameter / 2.0
            };
            if let Ok(circle) = Profile::circle(radius) {
                holes.push(circle.translated(bore.center[0], bore.center[1]));
            }
        }
    }

    holes
}

/// Distance from `start` along `direction` (`1.0` up, `-1.0` down) to the
/// first face where the material ends: a free lump end or the floor of a
/// cut, whichever the vertical line through `start` meets first.
pub fn material_run(solid: &Solid, start: [f64; 3], direction: f64) -> Option<f64> {
    let axis = [start[0], start[1]];
    let upward = direction > 0.0;

    let lump_ends = solid.lumps.iter().filter_map(|lump| {
        let (end, index) = if upward { (lump.top, lump.last_station()) } else { (lump.bottom, 0) };
        (end == End::Free).then(|| (lump.stations[index].z, lump.station_section(index)))
    });
    let floors = solid.voids.iter().filter_map(|void| {
        let (end, index) = if upward { (void.bottom, 0) } else { (void.top, void.last_station()) };
        (end == End::Floor).then(|| (void.stations[index].z, void.station_section(index)))
    });

    lump_ends
        .chain(floors)
        .filter(|(_, section)| section.as_ref().is_some_and(|s| s.contains_point(axis, LINEAR)))
        .map(|(z, _)| (z - start[2]) * direction)
        .filter(|travel| *travel > LINEAR)
        .min_by(f64::total_cmp)
}

/// How far the face adjoining end `index` of a stack runs away from the
/// end loop before meeting another edge.
fn face_leg_length(solid: &Solid, edge: EdgeRef, stack: &Stack, index: usize) -> Result<f64> {
    let end = stack
        .end_at(index)
        .ok_or_else(|| KernelError::TopologyError("Station is not a stack end".into()))?;
    let z = stack.stations[index].z;
    let section = stack.station_section(index).ok_or_else(|| {
        KernelError::TopologyError(format!("Stack section collapses at z = {}", z))
    })?;

    match end {
        End::Free => {
            let EdgeRef::Lump { stack: lump, .. } = edge else {
                return Err(KernelError::TopologyError("Free end on a cut stack".into()));
            };
            let holes = cap_holes(solid, lump, z);
            if holes.is_empty() {
                Ok(section.width.min(section.height) / 2.0)
            } else {
                Ok(holes
                    .iter()
                    .map(|hole| section.side_gap(hole))
                    .fold(f64::INFINITY, f64::min))
            }
        }
        End::Floor => Ok(section.width.min(section.height) / 2.0),
        End::Attached { host } | End::Mouth { host } => {
            let host_section = solid
                .lumps
                .get(host)
                .and_then(|host_stack| end_section(host_stack, z))
                .ok_or_else(|| {
                    KernelError::TopologyError(format!(
                        "Host lump {} has no end face at z = {}",
                        host, z
                    ))
                })?;
            Ok(host_section.side_gap(&section))
        }
    }
}

fn leg_to(from: &Station, to: &Station) -> Leg {
    let delta = Vector2::new(to.offset - from.offset, to.z - from.z);
    let length = delta.norm();
    Leg {
        direction: delta / length,
        length,
    }
}

/// Resolve a loop edge to its cross-section corner.
pub fn corner(solid: &Solid, edge: EdgeRef) -> Result<Corner> {
    let index = match edge {
        EdgeRef::Lump { station, .. } | EdgeRef::Void { station, .. } => station,
        EdgeRef::Bore { .. } => {
            return Err(KernelError::NotImplemented(
                "Chamfer and fillet of bore edges".into(),
            ))
        }
    };
    let stack = solid
        .stack(edge)
        .ok_or_else(|| KernelError::InvalidGeometry(format!("No stack for edge {:?}", edge)))?;
    let station = stack.stations.get(index).ok_or_else(|| {
        KernelError::InvalidGeometry(format!("Station index out of bounds for edge {:?}", edge))
    })?;
    if station.smooth {
        return Err(KernelError::TopologyError(
            "Edge lies inside a fillet and has no corner".into(),
        ));
    }

    let below = if index == 0 {
        Leg {
            direction: Vector2::new(stack.bottom.face_direction(), 0.0),
            length: face_leg_length(solid, edge, stack, index)?,
        }
    } else {
        leg_to(station, &stack.stations[index - 1])
    };
    let above = if index == stack.last_station() {
        Leg {
            direction: Vector2::new(stack.top.face_direction(), 0.0),
            length: face_leg_length(solid, edge, stack, index)?,
        }
    } else {
        leg_to(station, &stack.stations[index + 1])
    };

    Ok(Corner {
        point: Vector2::new(station.offset, station.z),
        below,
        above,
    })
}

/// Replace the corner station behind `edge` by the points of a chamfer or
/// fillet: `start` on the lower face, interior `arc` samples, `end` on the
/// upper face.
pub(crate) fn replace_corner(
    solid: &Solid,
    edge: EdgeRef,
    start: Vector2<f64>,
    arc: &[Vector2<f64>],
    end: Vector2<f64>,
) -> Result<Solid> {
    let index = match edge {
        EdgeRef::Lump { station, .. } | EdgeRef::Void { station, .. } => station,
        EdgeRef::Bore { .. } => {
            return Err(KernelError::NotImplemented("Bore edge modification".into()))
        }
    };

    let mut result = solid.clone();
    let stack = result
        .stack_mut(edge)
        .ok_or_else(|| KernelError::InvalidGeometry(format!("No stack for edge {:?}", edge)))?;

    let mut stations = Vec::with_capacity(stack.stations.len() + arc.len() + 1);
    stations.extend_from_slice(&stack.stations[..index]);
    stations.push(Station::new(start.y, start.x));
    stations.extend(arc.iter().map(|p| Station::smooth(p.y, p.x)));
    stations.push(Station::new(end.y, end.x));
    stations.extend_from_slice(&stack.stations[index + 1..]);

    if stations.windows(2).any(|pair| pair[1].z <= pair[0].z) {
        return Err(KernelError::TopologyError(
            "Corner treatment folds the stack profile back on itself".into(),
        ));
    }
    if stations.iter().any(|s| stack.base.offset(s.offset).is_none()) {
        return Err(KernelError::InvalidGeometry(
            "Corner treatment collapses the stack section".into(),
        ));
    }

    stack.stations = stations;
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn block() -> Solid {
        Solid {
            lumps: vec![Stack {
                base: Profile::rounded_rect(20.0, 20.0, 4.0).unwrap(),
                stations: vec![Station::new(0.0, 0.0), Station::new(10.0, 0.0)],
                bottom: End::Free,
                top: End::Free,
            }],
            voids: vec![Stack {
                base: Profile::rounded_rect(16.0, 16.0, 2.0).unwrap(),
                stations: vec![Station::new(7.0, 0.0), Station::new(10.0, 0.0)],
                bottom: End::Floor,
                top: End::Mouth { host: 0 },
            }],
            bores: vec![],
        }
    }

    #[test]
    fn test_cap_holes_include_mouth() {
        let solid = block();
        let holes = cap_holes(&solid, 0, 10.0);
        assert_eq!(holes.len(), 1);
        assert!((holes[0].width - 16.0).abs() < 1e-12);
        assert!(cap_holes(&solid, 0, 0.0).is_empty(), "Bottom cap has no holes");
    }

    #[test]
    fn test_material_run_stops_at_recess_floor() {
        let solid = block();
        // Under the recess the material ends at its floor
        assert_eq!(material_run(&solid, [0.0, 0.0, 0.0], 1.0), Some(7.0));
        // Outside the recess it runs to the top cap
        assert_eq!(material_run(&solid, [9.0, 0.0, 0.0], 1.0), Some(10.0));
        // Downward from the floor it reaches the bottom cap
        assert_eq!(material_run(&solid, [0.0, 0.0, 7.0], -1.0), Some(7.0));
        assert_eq!(material_run(&solid, [30.0, 0.0, 0.0], 1.0), None);
    }

    #[test]
    fn test_corner_of_free_top_edge() {
        let solid = block();
        let corner = corner(&solid, EdgeRef::Lump { stack: 0, station: 1 }).unwrap();
        assert_eq!(corner.point, Vector2::new(0.0, 10.0));
        assert_eq!(corner.below.direction, Vector2::new(0.0, -1.0));
        assert!((corner.below.length - 10.0).abs() < 1e-12);
        // Top cap runs inward until the recess mouth
        assert_eq!(corner.above.direction, Vector2::new(1.0, 0.0));
        assert!((corner.above.length - 2.0).abs() < 1e-12);
        assert!((corner.opening() - std::f64::consts::FRAC_PI_2).abs() < 1e-12);
    }

    #[test]
    fn test_corner_of_mouth_runs_outward() {
        let solid = block();
        let corner = corner(&solid, EdgeRef::Void { stack: 0, station: 1 }).unwrap();
        assert_eq!(corner.above.direction, Vector2::new(-1.0, 0.0));
        assert!((corner.above.length - 2.0).abs() < 1e-12);
    }

    #[test]
    fn test_corner_rejects_bore_edges() {
        let solid = block();
        let result = corner(
            &solid,
            EdgeRef::Bore {
                bore: 0,
                ring: crate::brep::BoreRing::Rim,
            },
        );
        assert!(matches!(result, Err(KernelError::NotImplemented(_))));
    }

    #[test]
    fn test_replace_corner_rejects_folding() {
        let solid = block();
        let edge = EdgeRef::Lump { stack: 0, station: 1 };
        let result = replace_corner(
            &solid,
            edge,
            Vector2::new(0.0, 11.0),
            &[],
            Vector2::new(1.0, 10.0),
        );
        assert!(result.is_err(), "Stations must stay ordered in z");
    }
}
