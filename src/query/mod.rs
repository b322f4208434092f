//! Geometric queries
//!
//! Edge and face enumeration, predicate-based selection, bounds and volume.
//! Selections are always evaluated against the solid passed in; the returned
//! [`EdgeRef`]s must not be reused on a solid produced by a later operation.

use nalgebra::Point3;

use crate::brep::topology::cap_holes;
use crate::brep::{BoreRing, EdgeRef, End, Solid};
use crate::precision::{same_length, LINEAR};
use crate::sketch::Profile;
use crate::{KernelError, Result};

/// Geometry of a horizontal edge loop.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum EdgeCurve {
    /// Closed rounded-rectangle loop.
    Loop(Profile),
    Circle { center: [f64; 2], radius: f64 },
}

/// An edge of a solid, lying in the plane `z`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Edge {
    pub id: EdgeRef,
    pub z: f64,
    pub curve: EdgeCurve,
}

impl Edge {
    /// Shortest distance from `point` to the edge curve.
    pub fn distance_to(&self, point: &Point3<f64>) -> f64 {
        let planar = match self.curve {
            EdgeCurve::Loop(profile) => profile.distance_to_outline([point.x, point.y]),
            EdgeCurve::Circle { center, radius } => {
                let dx = point.x - center[0];
                let dy = point.y - center[1];
                ((dx * dx + dy * dy).sqrt() - radius).abs()
            }
        };
        let dz = point.z - self.z;
        (planar * planar + dz * dz).sqrt()
    }
}

/// Selects the top-most or bottom-most geometry, like `>Z` / `<Z`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Extreme {
    Top,
    Bottom,
}

impl std::fmt::Display for Extreme {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Extreme::Top => write!(f, "top"),
            Extreme::Bottom => write!(f, "bottom"),
        }
    }
}

/// A horizontal planar face.
#[derive(Debug, Clone, PartialEq)]
pub struct Face {
    pub z: f64,
    /// `1.0` when the face looks up, `-1.0` when it looks down.
    pub normal: f64,
    pub outline: Profile,
    pub holes: Vec<Profile>,
}

impl Face {
    pub fn area(&self) -> f64 {
        self.outline.area() - self.holes.iter().map(Profile::area).sum::<f64>()
    }

    pub fn center(&self) -> Point3<f64> {
        Point3::new(self.outline.center[0], self.outline.center[1], self.z)
    }

    /// Outer width and height of the face.
    pub fn extent(&self) -> (f64, f64) {
        (self.outline.width, self.outline.height)
    }
}

fn circle(center: [f64; 2], radius: f64) -> Option<Profile> {
    Profile::circle(radius)
        .ok()
        .map(|c| c.translated(center[0], center[1]))
}

/// All edges of a solid
pub fn edges(solid: &Solid) -> Vec<Edge> {
    let mut edges = Vec::new();

    let stacks = solid
        .lumps
        .iter()
        .enumerate()
        .map(|(i, s)| (s, i, true))
        .chain(solid.voids.iter().enumerate().map(|(i, s)| (s, i, false)));
    for (stack, index, material) in stacks {
        for (station_index, station) in stack.stations.iter().enumerate() {
            if station.smooth {
                continue;
            }
            let Some(section) = stack.station_section(station_index) else {
                continue;
            };
            let id = if material {
                EdgeRef::Lump {
                    stack: index,
                    station: station_index,
                }
            } else {
                EdgeRef::Void {
                    stack: index,
                    station: station_index,
                }
            };
            edges.push(Edge {
                id,
                z: station.z,
                curve: EdgeCurve::Loop(section),
            });
        }
    }

    for (index, bore) in solid.bores.iter().enumerate() {
        let rings = [
            (BoreRing::Rim, bore.z, bore.cbore_diameter),
            (BoreRing::ShoulderOuter, bore.step_z(), bore.cbore_diameter),
            (BoreRing::ShoulderInner, bore.step_z(), bore.hole_diameter),
            (BoreRing::End, bore.end_z(), bore.hole_diameter),
        ];
        for (ring, z, diameter) in rings {
            edges.push(Edge {
                id: EdgeRef::Bore { bore: index, ring },
                z,
                curve: EdgeCurve::Circle {
                    center: bore.center,
                    radius: diameter / 2.0,
                },
            });
        }
    }

    edges
}

/// The edge closest to `point`
pub fn nearest_edge(solid: &Solid, point: Point3<f64>) -> Result<Edge> {
    edges(solid)
        .into_iter()
        .map(|edge| (edge.distance_to(&point), edge))
        .fold(None, |best: Option<(f64, Edge)>, (distance, edge)| match best {
            Some((best_distance, _)) if best_distance <= distance => best,
            _ => Some((distance, edge)),
        })
        .map(|(_, edge)| edge)
        .ok_or_else(|| {
            KernelError::SelectionFailed(format!(
                "No edge near ({}, {}, {}): solid has no edges",
                point.x, point.y, point.z
            ))
        })
}

/// Edges lying in the highest or lowest edge plane
pub fn extreme_edges(solid: &Solid, which: Extreme) -> Vec<Edge> {
    let all = edges(solid);
    let target = match which {
        Extreme::Top => all.iter().map(|e| e.z).fold(f64::NEG_INFINITY, f64::max),
        Extreme::Bottom => all.iter().map(|e| e.z).fold(f64::INFINITY, f64::min),
    };
    all.into_iter().filter(|e| same_length(e.z, target)).collect()
}

/// All horizontal planar faces of a solid
pub fn faces(solid: &Solid) -> Vec<Face> {
    let mut faces = Vec::new();

    for (index, lump) in solid.lumps.iter().enumerate() {
        for (end, station, normal) in [(lump.bottom, 0, -1.0), (lump.top, lump.last_station(), 1.0)] {
            if end != End::Free {
                continue;
            }
            let z = lump.stations[station].z;
            if let Some(outline) = lump.station_section(station) {
                faces.push(Face {
                    z,
                    normal,
                    outline,
                    holes: cap_holes(solid, index, z),
                });
            }
        }
    }

    for void in &solid.voids {
        for (end, station, normal) in [(void.bottom, 0, 1.0), (void.top, void.last_station(), -1.0)] {
            if end != End::Floor {
                continue;
            }
            let z = void.stations[station].z;
            let Some(outline) = void.station_section(station) else {
                continue;
            };
            let holes = solid
                .bores
                .iter()
                .filter(|b| b.through && same_length(b.end_z(), z))
                .filter(|b| outline.contains_point(b.center, LINEAR))
                .filter_map(|b| circle(b.center, b.hole_diameter / 2.0))
                .collect();
            faces.push(Face {
                z,
                normal,
                outline,
                holes,
            });
        }
    }

    for bore in &solid.bores {
        if let (Some(outline), Some(hole)) = (
            circle(bore.center, bore.cbore_diameter / 2.0),
            circle(bore.center, bore.hole_diameter / 2.0),
        ) {
            faces.push(Face {
                z: bore.step_z(),
                normal: -bore.direction,
                outline,
                holes: vec![hole],
            });
            if !bore.through {
                faces.push(Face {
                    z: bore.end_z(),
                    normal: -bore.direction,
                    outline: hole,
                    holes: vec![],
                });
            }
        }
    }

    faces
}

/// Faces lying in the highest or lowest face plane
pub fn extreme_faces(solid: &Solid, which: Extreme) -> Vec<Face> {
    let all = faces(solid);
    let target = match which {
        Extreme::Top => all.iter().map(|f| f.z).fold(f64::NEG_INFINITY, f64::max),
        Extreme::Bottom => all.iter().map(|f| f.z).fold(f64::INFINITY, f64::min),
    };
    all.into_iter().filter(|f| same_length(f.z, target)).collect()
}

/// The single highest (`>Z`) or lowest (`<Z`) planar face
///
/// # Returns
/// The face, or an error if the solid has no faces or several faces tie for
/// the extreme height
pub fn extreme_face(solid: &Solid, which: Extreme) -> Result<Face> {
    let mut matching = extreme_faces(solid, which);
    match matching.len() {
        0 => Err(KernelError::SelectionFailed(format!("Solid has no {} face", which))),
        1 => Ok(matching.remove(0)),
        n => Err(KernelError::SelectionFailed(format!(
            "{} faces tie for the {} face at z = {}",
            n, which, matching[0].z
        ))),
    }
}

/// Axis-aligned bounding box as `(min, max)`
pub fn bounding_box(solid: &Solid) -> Result<([f64; 3], [f64; 3])> {
    if solid.is_empty() {
        return Err(KernelError::InvalidGeometry("Empty solid has no bounds".into()));
    }

    let mut min = [f64::INFINITY; 3];
    let mut max = [f64::NEG_INFINITY; 3];
    for lump in &solid.lumps {
        for index in 0..lump.stations.len() {
            let Some(section) = lump.station_section(index) else {
                continue;
            };
            let (lo, hi) = section.bounds();
            let z = lump.stations[index].z;
            for i in 0..2 {
                min[i] = min[i].min(lo[i]);
                max[i] = max[i].max(hi[i]);
            }
            min[2] = min[2].min(z);
            max[2] = max[2].max(z);
        }
    }

    Ok((min, max))
}

/// Area of the solid's cross-section at height `z`
pub fn section_area(solid: &Solid, z: f64) -> f64 {
    let material: f64 = solid
        .lumps
        .iter()
        .filter_map(|lump| lump.section(z))
        .map(|s| s.area())
        .sum();

    let void_sections: Vec<Profile> = solid.voids.iter().filter_map(|v| v.section(z)).collect();
    let cut: f64 = void_sections.iter().map(Profile::area).sum();

    let drilled: f64 = solid
        .bores
        .iter()
        .filter(|bore| !void_sections.iter().any(|v| v.contains_point(bore.center, 0.0)))
        .filter(|bore| solid.lumps.iter().any(|lump| lump.section(z).is_some_and(|s| s.contains_point(bore.center, 0.0))))
        .filter_map(|bore| bore.radius_at(z))
        .map(|r| std::f64::consts::PI * r * r)
        .sum();

    material - cut - drilled
}

/// Volume of a solid, integrated slice by slice
pub fn volume(solid: &Solid) -> f64 {
    let mut breaks: Vec<f64> = solid
        .lumps
        .iter()
        .chain(solid.voids.iter())
        .flat_map(|s| s.stations.iter().map(|st| st.z))
        .chain(
            solid
                .bores
                .iter()
                .flat_map(|b| [b.z, b.step_z(), b.end_z()]),
        )
        .collect();
    breaks.sort_by(f64::total_cmp);
    breaks.dedup_by(|a, b| (*a - *b).abs() <= LINEAR);

    // Three-point Gauss-Legendre: exact for the quadratic area of a linearly
    // offset rounded rectangle
    let node = (3.0f64 / 5.0).sqrt();
    let rule = [(-node, 5.0 / 9.0), (0.0, 8.0 / 9.0), (node, 5.0 / 9.0)];

    breaks
        .windows(2)
        .map(|pair| {
            let half = (pair[1] - pair[0]) / 2.0;
            let mid = (pair[1] + pair[0]) / 2.0;
            rule.iter()
                .map(|(x, w)| w * section_area(solid, mid + x * half))
                .sum::<f64>()
                * half
        })
        .sum()
}
