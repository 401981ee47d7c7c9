//! Engraving rules consumed by the contour engine.

use serde::{Deserialize, Serialize};

use crate::error::{ContourError, Result};

/// Samples per staff-space unit of horizontal resolution.
pub const DEFAULT_SAMPLING_UNIT: f64 = 3.0;
/// Height of a five-line staff in staff-space units.
pub const DEFAULT_STAFF_HEIGHT: f64 = 4.0;

/// Formatting parameters shared by every staff line of a layout pass.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngravingRules {
    /// Number of contour samples per staff-space unit
    pub sampling_unit: f64,
    /// Staff height used as the bottom line's resting value
    pub staff_height: f64,
}

impl Default for EngravingRules {
    fn default() -> Self {
        Self {
            sampling_unit: DEFAULT_SAMPLING_UNIT,
            staff_height: DEFAULT_STAFF_HEIGHT,
        }
    }
}

impl EngravingRules {
    /// Rules with the default staff height and a custom resolution.
    pub fn with_sampling_unit(sampling_unit: f64) -> Self {
        Self {
            sampling_unit,
            ..Self::default()
        }
    }

    /// Parse rules from JSON. Missing fields fall back to the defaults.
    pub fn from_json(json: &str) -> Result<Self> {
        let rules: Self = serde_json::from_str(json)?;
        rules.validate()?;
        Ok(rules)
    }

    pub fn validate(&self) -> Result<()> {
        if !self.sampling_unit.is_finite() || self.sampling_unit <= 0.0 {
            return Err(ContourError::InvalidRules(format!(
                "sampling unit must be a positive number, got {}",
                self.sampling_unit
            )));
        }
        if !self.staff_height.is_finite() || self.staff_height < 0.0 {
            return Err(ContourError::InvalidRules(format!(
                "staff height must be a non-negative number, got {}",
                self.staff_height
            )));
        }
        Ok(())
    }
}
