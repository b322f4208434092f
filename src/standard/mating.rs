//! Stacking fit check
//!
//! Seats the mating lip of one block in the stacking recess of another and
//! measures the clearance between them, height by height. Both profiles are
//! piecewise linear in height, so comparing them at every station of either
//! one is exact.

use super::{GridSpec, GridfinityError, Result};
use crate::brep::{End, Solid, Stack};
use crate::precision::LINEAR;

/// Fit of a lip seated in a stacking recess.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MatingReport {
    /// Some lip section pokes through a recess wall.
    pub interference: bool,
    /// Smallest wall clearance over the seated height.
    pub min_gap: f64,
    /// Largest wall clearance over the seated height.
    pub max_gap: f64,
    /// Total height over which the lip touches the recess wall.
    pub contact_height: f64,
}

/// The stacking recess: the highest cut opening upward.
fn recess(solid: &Solid) -> Option<&Stack> {
    solid
        .voids
        .iter()
        .filter(|void| matches!(void.top, End::Mouth { .. }))
        .max_by(|a, b| a.z_max().total_cmp(&b.z_max()))
}

/// Lip cells: lumps hanging from the underside of another lump.
fn lips(solid: &Solid) -> Vec<&Stack> {
    solid
        .lumps
        .iter()
        .filter(|lump| matches!(lump.top, End::Attached { .. }))
        .collect()
}

/// Seat `upper`'s lip in `lower`'s stacking recess and measure the fit
///
/// # Arguments
/// * `spec` - Grid constants
/// * `lower` - Block with a stacking recess
/// * `upper` - Block with a mating lip, centred over `lower`
///
/// # Returns
/// The clearance report. The lip rests with its bottom on the recess floor.
pub fn mating_clearance(spec: &GridSpec, lower: &Solid, upper: &Solid) -> Result<MatingReport> {
    let recess = recess(lower).ok_or_else(|| {
        GridfinityError::InvalidParameter("Lower solid has no stacking recess".into())
    })?;
    let lips = lips(upper);
    let lip_bottom = lips
        .iter()
        .map(|lip| lip.z_min())
        .fold(f64::INFINITY, f64::min);
    if !lip_bottom.is_finite() {
        return Err(GridfinityError::InvalidParameter(
            "Upper solid has no mating lip".into(),
        ));
    }

    let floor = recess.z_min();
    let shift = floor - lip_bottom;
    let seated: Vec<Stack> = lips.iter().map(|lip| lip.translated([0.0, 0.0, shift])).collect();
    log::debug!(
        "seating {} lip cells on recess floor at z = {} (shift {})",
        seated.len(),
        floor,
        shift
    );

    let mut heights: Vec<f64> = recess
        .stations
        .iter()
        .chain(seated.iter().flat_map(|lip| lip.stations.iter()))
        .map(|station| station.z)
        .filter(|z| *z >= floor && *z <= recess.z_max())
        .collect();
    heights.sort_by(f64::total_cmp);
    heights.dedup_by(|a, b| (*a - *b).abs() <= LINEAR);

    let mut interference = false;
    let mut gaps = Vec::with_capacity(heights.len());
    for &z in &heights {
        let Some(outer) = recess.section(z) else {
            continue;
        };
        let mut gap = f64::INFINITY;
        for inner in seated.iter().filter_map(|lip| lip.section(z)) {
            if !outer.contains_profile(&inner, LINEAR) {
                interference = true;
            }
            gap = gap.min(outer.side_gap(&inner));
        }
        if gap.is_finite() {
            gaps.push((z, gap));
        }
    }

    let min_gap = gaps.iter().map(|(_, g)| *g).fold(f64::INFINITY, f64::min);
    let max_gap = gaps.iter().map(|(_, g)| *g).fold(f64::NEG_INFINITY, f64::max);
    let contact_height = gaps
        .windows(2)
        .filter(|pair| pair[0].1.abs() <= LINEAR && pair[1].1.abs() <= LINEAR)
        .map(|pair| pair[1].0 - pair[0].0)
        .sum();

    if max_gap > spec.block_stacking_lip {
        log::warn!(
            "lip clearance {} exceeds the stacking lip width {}",
            max_gap,
            spec.block_stacking_lip
        );
    }

    Ok(MatingReport {
        interference,
        min_gap,
        max_gap,
        contact_height,
    })
}
