//! Gridfinity dimension table
//!
//! The fixed constants of the grid standard, measured from the reference
//! models. Changing any one of them produces parts that no longer mate with
//! parts made from the standard values, so [`GridSpec::default`] is the table
//! to use; custom tables exist for deliberately non-standard grids.

use serde::{Deserialize, Serialize};

use super::{GridfinityError, Result};

/// Constants of a Gridfinity grid, in millimetres.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GridSpec {
    /// Pitch of one grid cell.
    pub grid_unit: f64,
    /// Gap between two neighbouring blocks on a baseplate.
    pub block_spacing: f64,
    /// Height of a depth-2 block including stacking clearance. Depth
    /// arithmetic works on half of this.
    pub grid_depth: f64,
    /// Removed from the top of every block so stacked blocks separate.
    pub stacking_clearance_depth: f64,
    /// Master radius. Insetting a profile shrinks its corners by the same
    /// amount, so all profiles share corner centres.
    pub fillet_radius: f64,
    /// Height of the mating lip under a block.
    pub block_mating_depth: f64,
    /// Height of the mating surface of a baseplate.
    pub baseplate_mating_depth: f64,
    /// Depth of the stacking recess in a block's top.
    pub stacking_mating_depth: f64,
    /// Inset of the vertical part of the lip and of the stacking recess.
    pub mating_inset: f64,
    /// Bottom chamfer of the mating lip.
    pub block_mating_chamfer: f64,
    /// Width of the stacking lip crest.
    pub block_stacking_lip: f64,
    /// Chamfer at the floor of the stacking recess.
    pub block_stacking_chamfer: f64,
    /// Distance from the cell edge to each magnet centre.
    pub magnet_inset: f64,
    pub magnet_diameter: f64,
    pub magnet_depth: f64,
    pub screw_diameter: f64,
    /// Default depth of the screw bore, measured from the bottom of the lip.
    pub screw_depth: f64,
}

impl Default for GridSpec {
    fn default() -> Self {
        Self {
            grid_unit: 42.0,
            block_spacing: 0.5,
            grid_depth: 18.75,
            stacking_clearance_depth: 0.954,
            fillet_radius: 4.0,
            block_mating_depth: 4.75,
            baseplate_mating_depth: 4.4,
            stacking_mating_depth: 3.796,
            mating_inset: 2.4,
            block_mating_chamfer: 0.8,
            block_stacking_lip: 0.77426,
            block_stacking_chamfer: 0.69645,
            magnet_inset: 8.0,
            magnet_diameter: 6.5,
            magnet_depth: 2.4,
            screw_diameter: 3.5,
            screw_depth: 6.0,
        }
    }
}

impl GridSpec {
    /// Parse a full table from JSON and validate it.
    pub fn from_json(json: &str) -> Result<Self> {
        let spec: GridSpec = serde_json::from_str(json)?;
        spec.validate()?;
        Ok(spec)
    }

    /// Check the constants are consistent with each other.
    ///
    /// Every inset the recipe uses must leave a non-negative corner radius,
    /// and every chamfer must fit on the faces it joins. The lip corner flare
    /// is the exception: a flare that does not fit only skips its lip cells.
    pub fn validate(&self) -> Result<()> {
        let named = [
            ("grid_unit", self.grid_unit),
            ("block_spacing", self.block_spacing),
            ("grid_depth", self.grid_depth),
            ("stacking_clearance_depth", self.stacking_clearance_depth),
            ("fillet_radius", self.fillet_radius),
            ("block_mating_depth", self.block_mating_depth),
            ("baseplate_mating_depth", self.baseplate_mating_depth),
            ("stacking_mating_depth", self.stacking_mating_depth),
            ("mating_inset", self.mating_inset),
            ("block_mating_chamfer", self.block_mating_chamfer),
            ("block_stacking_lip", self.block_stacking_lip),
            ("block_stacking_chamfer", self.block_stacking_chamfer),
            ("magnet_inset", self.magnet_inset),
            ("magnet_diameter", self.magnet_diameter),
            ("magnet_depth", self.magnet_depth),
            ("screw_diameter", self.screw_diameter),
            ("screw_depth", self.screw_depth),
        ];
        for (name, value) in named {
            if !value.is_finite() || value <= 0.0 {
                return Err(invalid(format!("{} must be positive, got {}", name, value)));
            }
        }

        let rules = [
            (
                self.mating_inset <= self.fillet_radius,
                "mating_inset must not exceed fillet_radius",
            ),
            (
                self.block_spacing / 2.0 < self.mating_inset,
                "block_spacing / 2 must be less than mating_inset",
            ),
            (
                self.mating_inset + self.block_mating_chamfer < self.grid_unit / 2.0,
                "mating lip must fit inside one grid cell",
            ),
            (
                self.stack_mouth_chamfer() > 0.0,
                "block_stacking_lip must be narrower than the recess ledge",
            ),
            (
                self.stacking_mating_depth < self.block_mating_depth,
                "stacking_mating_depth must be less than block_mating_depth",
            ),
            (
                self.block_mating_chamfer < self.block_mating_depth,
                "block_mating_chamfer must be less than block_mating_depth",
            ),
            (
                self.block_stacking_chamfer + self.stack_mouth_chamfer() < self.stacking_mating_depth,
                "recess chamfers must fit on the recess wall",
            ),
            (
                self.block_mating_depth < self.grid_depth,
                "block_mating_depth must be less than grid_depth",
            ),
            (
                self.magnet_diameter > self.screw_diameter,
                "magnet_diameter must exceed screw_diameter",
            ),
            (
                self.magnet_depth < self.screw_depth,
                "magnet_depth must be less than screw_depth",
            ),
            (
                self.magnet_inset * 2.0 < self.grid_unit,
                "magnet_inset must be less than half a grid unit",
            ),
        ];
        for (ok, message) in rules {
            if !ok {
                return Err(invalid(message.to_string()));
            }
        }

        Ok(())
    }

    /// Chamfer that widens the top of each lip cell out to the block body.
    ///
    /// The hundredth of a millimetre keeps the bevel off the body's own
    /// bottom edge.
    pub fn lip_corner_chamfer(&self) -> f64 {
        self.mating_inset - self.block_spacing / 2.0 - 0.01
    }

    /// Chamfer on the recess mouth that leaves a crest of
    /// `block_stacking_lip`.
    pub fn stack_mouth_chamfer(&self) -> f64 {
        self.mating_inset - self.block_spacing / 2.0 - self.block_stacking_lip
    }

    /// Side of the square whose corners hold a cell's four magnets.
    pub fn magnet_spacing(&self) -> f64 {
        self.grid_unit - self.magnet_inset * 2.0
    }

    /// Outer size of a block body spanning `units` cells.
    pub fn body_length(&self, units: u32) -> f64 {
        f64::from(units) * self.grid_unit - self.block_spacing
    }
}

fn invalid(message: String) -> GridfinityError {
    GridfinityError::InvalidParameter(message)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_values_are_the_standard() {
        let spec = GridSpec::default();
        assert_eq!(spec.grid_unit, 42.0);
        assert_eq!(spec.block_spacing, 0.5);
        assert_eq!(spec.grid_depth, 18.75);
        assert_eq!(spec.stacking_clearance_depth, 0.954);
        assert_eq!(spec.fillet_radius, 4.0);
        assert_eq!(spec.block_mating_depth, 4.75);
        assert_eq!(spec.baseplate_mating_depth, 4.4);
        assert_eq!(spec.stacking_mating_depth, 3.796);
        assert_eq!(spec.mating_inset, 2.4);
        assert_eq!(spec.block_mating_chamfer, 0.8);
        assert_eq!(spec.block_stacking_lip, 0.77426);
        assert_eq!(spec.block_stacking_chamfer, 0.69645);
        assert_eq!(spec.magnet_inset, 8.0);
        assert_eq!(spec.magnet_diameter, 6.5);
        assert_eq!(spec.magnet_depth, 2.4);
        assert_eq!(spec.screw_diameter, 3.5);
        assert_eq!(spec.screw_depth, 6.0);
    }

    #[test]
    fn test_default_is_valid() {
        GridSpec::default().validate().expect("Standard table must validate");
    }

    #[test]
    fn test_derived_dimensions() {
        let spec = GridSpec::default();
        assert!((spec.lip_corner_chamfer() - 2.14).abs() < 1e-12);
        assert!((spec.stack_mouth_chamfer() - 1.37574).abs() < 1e-12);
        assert_eq!(spec.magnet_spacing(), 26.0);
        assert_eq!(spec.body_length(3), 125.5);
    }

    #[test]
    fn test_validate_rejects_negative_radius() {
        let spec = GridSpec {
            mating_inset: 4.5,
            ..GridSpec::default()
        };
        assert!(spec.validate().is_err(), "Inset beyond the fillet radius should fail");
    }

    #[test]
    fn test_validate_rejects_non_finite() {
        let spec = GridSpec {
            grid_unit: f64::NAN,
            ..GridSpec::default()
        };
        assert!(spec.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_oversized_crest() {
        let spec = GridSpec {
            block_stacking_lip: 2.5,
            ..GridSpec::default()
        };
        assert!(spec.validate().is_err(), "Crest wider than the ledge should fail");
    }

    #[test]
    fn test_validate_allows_lip_flare_that_does_not_fit() {
        let spec = GridSpec {
            block_mating_chamfer: 3.0,
            ..GridSpec::default()
        };
        spec.validate().expect("Flare is checked per lip cell");

        let spec = GridSpec {
            block_mating_chamfer: 5.0,
            ..GridSpec::default()
        };
        assert!(spec.validate().is_err(), "Bottom chamfer taller than the lip should fail");
    }

    #[test]
    fn test_json_round_trip() {
        let json = serde_json::to_string(&GridSpec::default()).unwrap();
        let parsed = GridSpec::from_json(&json).expect("Failed to parse spec");
        assert_eq!(parsed, GridSpec::default());
    }

    #[test]
    fn test_json_rejects_inconsistent_table() {
        let mut value = serde_json::to_value(GridSpec::default()).unwrap();
        value["magnet_diameter"] = serde_json::json!(3.0);
        let result = GridSpec::from_json(&value.to_string());
        assert!(matches!(result, Err(GridfinityError::InvalidParameter(_))));

        let result = GridSpec::from_json("{\"grid_unit\": 42.0}");
        assert!(matches!(result, Err(GridfinityError::Config(_))));
    }
}
