//! skybottom — skyline and bottomline contours for engraved staff lines.
//!
//! For every staff line the layout pass builds two sampled envelopes of
//! everything already drawn: the skyline above the staff and the
//! bottomline below it. Decorations placed later (dynamics, wedges,
//! slurs, lyrics, measure numbers) query them to avoid collisions and
//! fold their own boxes back in.
//!
//! # Example
//! ```
//! use skybottom::{BoundingBox, EngravingRules, Measure, StaffLine};
//!
//! let measure = Measure::new(6.0)
//!     .with_element(BoundingBox::new(1.0, 0.0).with_borders(0.0, 2.0, -3.0, 4.0));
//! let mut staff_line = StaffLine::new(vec![measure], Vec::new());
//! staff_line.calculate_sky_bottom_line(&EngravingRules::with_sampling_unit(1.0)).unwrap();
//! staff_line.update_borders();
//!
//! assert_eq!(staff_line.sky_bottom_line().sky_line_min(), -3.0);
//! assert_eq!(staff_line.borders.top, -3.0);
//! ```

pub mod contour;
pub mod error;
pub mod model;
pub mod rules;

pub use contour::{render_contour_svg, Line, SamplingGrid, SkyBottomLine};
pub use error::{ContourError, Result};
pub use model::*;
pub use rules::EngravingRules;

/// Load a staff line (measures, beams, borders) from JSON.
pub fn staff_line_from_json(json: &str) -> Result<StaffLine> {
    Ok(serde_json::from_str(json)?)
}

/// Convert a contour to a JSON string for inspection.
pub fn contour_to_json(lines: &SkyBottomLine) -> Result<String> {
    Ok(serde_json::to_string_pretty(lines)?)
}
