//! Solid representation
//!
//! The kernel only models the solids a Gridfinity recipe can produce. Each
//! piece of material or cut-out is a [`Stack`]: a rounded-rectangle base
//! profile swept along Z while its inward offset varies piecewise linearly.
//! Chamfers and fillets on the horizontal loop edges become extra stations in
//! that offset polyline, which keeps every edge an analytic loop that can be
//! found again by position after each operation.

use serde::{Deserialize, Serialize};

use crate::sketch::Profile;

pub mod topology;

/// One vertex of a stack's offset polyline.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Station {
    pub z: f64,
    /// Inward offset from the stack's base profile; negative is outward.
    pub offset: f64,
    /// Interior sample of a fillet arc. Smooth stations are not edges.
    pub smooth: bool,
}

impl Station {
    pub fn new(z: f64, offset: f64) -> Self {
        Self {
            z,
            offset,
            smooth: false,
        }
    }

    pub fn smooth(z: f64, offset: f64) -> Self {
        Self {
            z,
            offset,
            smooth: true,
        }
    }
}

/// How the end of a stack meets the rest of the solid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum End {
    /// Material stack whose end cap is an outer face of the solid.
    Free,
    /// Material stack whose end cap sits on the end face of lump `host`.
    Attached { host: usize },
    /// Cut stack opening onto the end face of lump `host`.
    Mouth { host: usize },
    /// Closed bottom of a cut stack.
    Floor,
}

impl End {
    /// Direction, in offset units, in which the adjoining face runs away from
    /// the end loop: `1.0` inward across the cap, `-1.0` outward over a host
    /// face.
    pub fn face_direction(&self) -> f64 {
        match self {
            End::Free | End::Floor => 1.0,
            End::Attached { .. } | End::Mouth { .. } => -1.0,
        }
    }
}

/// A rounded-rectangle profile swept along Z with a varying inward offset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stack {
    pub base: Profile,
    /// Strictly increasing in `z`; at least two.
    pub stations: Vec<Station>,
    pub bottom: End,
    pub top: End,
}

impl Stack {
    pub fn z_min(&self) -> f64 {
        self.stations[0].z
    }

    pub fn z_max(&self) -> f64 {
        self.stations[self.stations.len() - 1].z
    }

    pub fn last_station(&self) -> usize {
        self.stations.len() - 1
    }

    /// Inward offset at height `z`, interpolated between stations.
    pub fn offset_at(&self, z: f64) -> Option<f64> {
        if z < self.z_min() || z > self.z_max() {
            return None;
        }
        for pair in self.stations.windows(2) {
            let (lo, hi) = (pair[0], pair[1]);
            if z <= hi.z {
                let t = (z - lo.z) / (hi.z - lo.z);
                return Some(lo.offset + t * (hi.offset - lo.offset));
            }
        }
        Some(self.stations[self.last_station()].offset)
    }

    /// Cross-section at height `z`.
    pub fn section(&self, z: f64) -> Option<Profile> {
        self.offset_at(z).and_then(|offset| self.base.offset(offset))
    }

    /// Cross-section at station `index`.
    pub fn station_section(&self, index: usize) -> Option<Profile> {
        self.stations
            .get(index)
            .and_then(|station| self.base.offset(station.offset))
    }

    /// End behaviour for a station index, if the station is an end.
    pub fn end_at(&self, index: usize) -> Option<End> {
        if index == 0 {
            Some(self.bottom)
        } else if index == self.last_station() {
            Some(self.top)
        } else {
            None
        }
    }

    pub fn translated(&self, delta: [f64; 3]) -> Self {
        Self {
            base: self.base.translated(delta[0], delta[1]),
            stations: self
                .stations
                .iter()
                .map(|s| Station {
                    z: s.z + delta[2],
                    ..*s
                })
                .collect(),
            bottom: self.bottom,
            top: self.top,
        }
    }
}

/// A counterbored hole: a wide pocket of `cbore_depth` followed by a narrower
/// hole, drilled from the plane `z` along `direction` (`1.0` up, `-1.0` down).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bore {
    pub center: [f64; 2],
    pub z: f64,
    pub direction: f64,
    pub hole_diameter: f64,
    pub cbore_diameter: f64,
    pub cbore_depth: f64,
    pub depth: f64,
    /// Hole exits the far side of the solid.
    pub through: bool,
}

impl Bore {
    /// Height of the shoulder between counterbore and hole.
    pub fn step_z(&self) -> f64 {
        self.z + self.direction * self.cbore_depth
    }

    /// Height of the hole's far end.
    pub fn end_z(&self) -> f64 {
        self.z + self.direction * self.depth
    }

    /// Radius of the bore at height `z`, or `None` outside it.
    pub fn radius_at(&self, z: f64) -> Option<f64> {
        let travel = (z - self.z) * self.direction;
        if travel < 0.0 || travel > self.depth {
            None
        } else if travel <= self.cbore_depth {
            Some(self.cbore_diameter / 2.0)
        } else {
            Some(self.hole_diameter / 2.0)
        }
    }
}

/// Which ring of a bore an edge belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BoreRing {
    /// Counterbore rim on the drilled face.
    Rim,
    /// Outer circle of the shoulder.
    ShoulderOuter,
    /// Inner circle of the shoulder, where the hole starts.
    ShoulderInner,
    /// Bottom circle of a blind hole, or the exit circle of a through hole.
    End,
}

/// Identifies one edge of one particular solid.
///
/// An `EdgeRef` is only meaningful for the solid it was queried from; every
/// modifying operation may renumber stations, so callers query again after
/// each operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EdgeRef {
    Lump { stack: usize, station: usize },
    Void { stack: usize, station: usize },
    Bore { bore: usize, ring: BoreRing },
}

/// A solid: material lumps minus cut stacks and bores.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Solid {
    pub lumps: Vec<Stack>,
    pub voids: Vec<Stack>,
    pub bores: Vec<Bore>,
}

impl Solid {
    pub fn is_empty(&self) -> bool {
        self.lumps.is_empty()
    }

    /// Borrow the stack an edge reference points into.
    pub fn stack(&self, edge: EdgeRef) -> Option<&Stack> {
        match edge {
            EdgeRef::Lump { stack, .. } => self.lumps.get(stack),
            EdgeRef::Void { stack, .. } => self.voids.get(stack),
            EdgeRef::Bore { .. } => None,
        }
    }

    pub(crate) fn stack_mut(&mut self, edge: EdgeRef) -> Option<&mut Stack> {
        match edge {
            EdgeRef::Lump { stack, .. } => self.lumps.get_mut(stack),
            EdgeRef::Void { stack, .. } => self.voids.get_mut(stack),
            EdgeRef::Bore { .. } => None,
        }
    }
}
