//! Skyline and bottomline of a staff line.
//!
//! The skyline holds, per horizontal sample, how far the drawn content
//! reaches above the staff (negative values); the bottomline holds how far
//! it reaches below (values beyond the staff height). Both are built once
//! per layout pass from the measures and then grown incrementally as
//! dynamics, wedges and other late elements are placed.

mod bounding_box;
mod builder;
mod grid;
mod range;
mod svg;
mod wedge;

use log::debug;
use serde::Serialize;

use crate::error::Result;
use crate::model::{Beam, BoundingBox, Measure, Point, StaffLineBorders};
use crate::rules::EngravingRules;
use builder::ContourBuilder;
use grid::{clamp_bound, clamp_point};

pub use grid::SamplingGrid;
pub use range::{
    max_in_range, min_in_range, set_in_range, update_in_range, MAX_SENTINEL, MIN_SENTINEL,
};
pub use svg::render_contour_svg;

// ═══════════════════════════════════════════════════════════════════════
// Line selector
// ═══════════════════════════════════════════════════════════════════════

/// Selects one of the two contours.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Line {
    /// Upper envelope; grows upward (negative values)
    Sky,
    /// Lower envelope; grows downward (values past the staff height)
    Bottom,
}

impl Line {
    pub const BOTH: [Self; 2] = [Self::Sky, Self::Bottom];

    /// Value of an unoccupied sample.
    pub fn resting_value(self, staff_height: f64) -> f64 {
        match self {
            Self::Sky => 0.0,
            Self::Bottom => staff_height,
        }
    }

    /// Whether `value` reaches beyond the staff on this line's side.
    pub fn extends(self, value: f64, staff_height: f64) -> bool {
        match self {
            Self::Sky => value < 0.0,
            Self::Bottom => value > staff_height,
        }
    }

    /// The border of `bbox` facing this line.
    pub(crate) fn border(self, bbox: &BoundingBox) -> f64 {
        match self {
            Self::Sky => bbox.border_top,
            Self::Bottom => bbox.border_bottom,
        }
    }

    /// Most extreme finite sample, or the line's sentinel.
    fn extreme(self, samples: &[f64]) -> f64 {
        match self {
            Self::Sky => range::reduce(samples, MIN_SENTINEL, f64::min),
            Self::Bottom => range::reduce(samples, MAX_SENTINEL, f64::max),
        }
    }

    fn extreme_in_range(self, samples: &[f64], grid: SamplingGrid, start: f64, end: f64) -> f64 {
        match self {
            Self::Sky => min_in_range(samples, grid, start, end),
            Self::Bottom => max_in_range(samples, grid, start, end),
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════
// SkyBottomLine
// ═══════════════════════════════════════════════════════════════════════

/// The skyline and bottomline of one staff line. Both lines always have
/// the same number of samples.
#[derive(Debug, Clone, Serialize)]
pub struct SkyBottomLine {
    #[serde(rename = "sampling_unit")]
    grid: SamplingGrid,
    staff_height: f64,
    sky_line: Vec<f64>,
    bottom_line: Vec<f64>,
}

impl Default for SkyBottomLine {
    fn default() -> Self {
        Self::new(&EngravingRules::default())
    }
}

impl SkyBottomLine {
    /// An empty contour; call [`calculate_lines`](Self::calculate_lines)
    /// to fill it.
    pub fn new(rules: &EngravingRules) -> Self {
        Self {
            grid: SamplingGrid::new(rules.sampling_unit),
            staff_height: rules.staff_height,
            sky_line: Vec::new(),
            bottom_line: Vec::new(),
        }
    }

    pub fn sampling_unit(&self) -> f64 {
        self.grid.sampling_unit()
    }

    pub fn staff_height(&self) -> f64 {
        self.staff_height
    }

    pub fn sky_line(&self) -> &[f64] {
        &self.sky_line
    }

    pub fn bottom_line(&self) -> &[f64] {
        &self.bottom_line
    }

    pub fn line(&self, line: Line) -> &[f64] {
        match line {
            Line::Sky => &self.sky_line,
            Line::Bottom => &self.bottom_line,
        }
    }

    fn line_mut(&mut self, line: Line) -> &mut [f64] {
        match line {
            Line::Sky => &mut self.sky_line,
            Line::Bottom => &mut self.bottom_line,
        }
    }

    /// Number of samples in each line.
    pub fn len(&self) -> usize {
        self.sky_line.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sky_line.is_empty()
    }

    // ── Full build ──────────────────────────────────────────────────

    /// Rebuild both lines from the staff line's measures, left to right.
    /// Any earlier incremental updates are discarded.
    pub fn calculate_lines(&mut self, measures: &[Measure], beams: &[Beam]) {
        self.sky_line.clear();
        self.bottom_line.clear();

        let builder = ContourBuilder::new(self.grid, self.staff_height, beams);
        for measure in measures {
            let (sky, bottom) = builder.build_measure(measure).into_lines();
            self.sky_line.extend(sky);
            self.bottom_line.extend(bottom);
        }

        debug_assert_eq!(self.sky_line.len(), self.bottom_line.len());
        debug!(
            "Calculated sky/bottom lines: {} measures, {} samples at {} per unit",
            measures.len(),
            self.len(),
            self.sampling_unit()
        );
    }

    // ── Wedges ──────────────────────────────────────────────────────

    /// Overwrite the skyline under a wedge's upper edge.
    pub fn update_sky_line_with_wedge(&mut self, start: Point, end: Point) {
        self.update_with_wedge(Line::Sky, start, end);
    }

    /// Overwrite the bottomline under a wedge's lower edge.
    pub fn update_bottom_line_with_wedge(&mut self, start: Point, end: Point) {
        self.update_with_wedge(Line::Bottom, start, end);
    }

    pub fn update_with_wedge(&mut self, line: Line, start: Point, end: Point) {
        let grid = self.grid;
        wedge::ramp(self.line_mut(line), grid, start, end);
    }

    // ── Range updates ───────────────────────────────────────────────

    /// Grow `line` to `value` over `[start, end)`; samples already further
    /// from the staff are kept.
    pub fn update_in_range(&mut self, line: Line, start: f64, end: f64, value: f64) -> Result<()> {
        let grid = self.grid;
        update_in_range(self.line_mut(line), grid, start, end, value)
    }

    /// Overwrite `line` with `value` over `[start, end)`.
    pub fn set_in_range(&mut self, line: Line, start: f64, end: f64, value: f64) -> Result<()> {
        let grid = self.grid;
        set_in_range(self.line_mut(line), grid, start, end, value)
    }

    /// Restore the resting value of `line` over `[start, end)`.
    pub fn reset_in_range(&mut self, line: Line, start: f64, end: f64) -> Result<()> {
        let value = line.resting_value(self.staff_height);
        self.set_in_range(line, start, end, value)
    }

    /// Overwrite every sample of `line` with `value`.
    pub fn set_line_with_value(&mut self, line: Line, value: f64) {
        self.line_mut(line).fill(value);
    }

    pub fn update_sky_line_in_range(&mut self, start: f64, end: f64, value: f64) -> Result<()> {
        self.update_in_range(Line::Sky, start, end, value)
    }

    pub fn update_bottom_line_in_range(&mut self, start: f64, end: f64, value: f64) -> Result<()> {
        self.update_in_range(Line::Bottom, start, end, value)
    }

    pub fn set_sky_line_in_range(&mut self, start: f64, end: f64, value: f64) -> Result<()> {
        self.set_in_range(Line::Sky, start, end, value)
    }

    pub fn set_bottom_line_in_range(&mut self, start: f64, end: f64, value: f64) -> Result<()> {
        self.set_in_range(Line::Bottom, start, end, value)
    }

    pub fn reset_sky_line_in_range(&mut self, start: f64, end: f64) -> Result<()> {
        self.reset_in_range(Line::Sky, start, end)
    }

    pub fn reset_bottom_line_in_range(&mut self, start: f64, end: f64) -> Result<()> {
        self.reset_in_range(Line::Bottom, start, end)
    }

    pub fn set_sky_line_with_value(&mut self, value: f64) {
        self.set_line_with_value(Line::Sky, value);
    }

    pub fn set_bottom_line_with_value(&mut self, value: f64) {
        self.set_line_with_value(Line::Bottom, value);
    }

    // ── Bounding boxes ──────────────────────────────────────────────

    /// Grow both lines by the leaves of a bounding-box tree whose root
    /// position is absolute within the staff line.
    pub fn update_with_bounding_box(&mut self, bbox: &BoundingBox) -> Result<()> {
        bounding_box::update_recursively(self, bbox, Point::default())
    }

    // ── Queries ─────────────────────────────────────────────────────

    /// Highest point of the skyline, or [`MIN_SENTINEL`] when no sample
    /// is finite.
    pub fn sky_line_min(&self) -> f64 {
        Line::Sky.extreme(&self.sky_line)
    }

    /// Lowest point of the bottomline, or [`MAX_SENTINEL`] when no sample
    /// is finite.
    pub fn bottom_line_max(&self) -> f64 {
        Line::Bottom.extreme(&self.bottom_line)
    }

    pub fn sky_line_min_at_point(&self, x: f64) -> Option<f64> {
        self.value_at_point(Line::Sky, x)
    }

    pub fn bottom_line_max_at_point(&self, x: f64) -> Option<f64> {
        self.value_at_point(Line::Bottom, x)
    }

    /// Sample nearest to `x`, clamped to the line. `None` before the
    /// first build.
    pub fn value_at_point(&self, line: Line, x: f64) -> Option<f64> {
        let samples = self.line(line);
        if samples.is_empty() {
            return None;
        }
        Some(samples[clamp_point(self.grid.nearest_index(x), samples.len())])
    }

    /// Skyline minimum over the closed range `[start, end]`.
    pub fn sky_line_min_in_range(&self, start: f64, end: f64) -> f64 {
        Line::Sky.extreme_in_range(&self.sky_line, self.grid, start, end)
    }

    /// Bottomline maximum over the closed range `[start, end]`.
    pub fn bottom_line_max_in_range(&self, start: f64, end: f64) -> f64 {
        Line::Bottom.extreme_in_range(&self.bottom_line, self.grid, start, end)
    }

    /// Skyline minimum under the horizontal extent of `bbox`, whose
    /// position is absolute within the staff line.
    pub fn sky_line_min_in_bounding_box(&self, bbox: &BoundingBox) -> f64 {
        let (start, end) = bounding_box::horizontal_extent(bbox, bbox.relative_position);
        self.sky_line_min_in_range(start, end)
    }

    /// Bottomline maximum under the horizontal extent of `bbox`, whose
    /// position is absolute within the staff line.
    pub fn bottom_line_max_in_bounding_box(&self, bbox: &BoundingBox) -> f64 {
        let (start, end) = bounding_box::horizontal_extent(bbox, bbox.relative_position);
        self.bottom_line_max_in_range(start, end)
    }

    /// Sample index at or left of `x`, clamped to `[0, length - 1]`.
    pub fn left_index_for_point_x(&self, x: f64, length: usize) -> usize {
        clamp_bound(self.grid.start_index(x), length.saturating_sub(1))
    }

    /// Sample index at or right of `x`, clamped to `[0, length - 1]`.
    pub fn right_index_for_point_x(&self, x: f64, length: usize) -> usize {
        clamp_bound(self.grid.end_index(x), length.saturating_sub(1))
    }

    // ── Border sync ─────────────────────────────────────────────────

    /// Write the line extremes into a staff line's layout borders. An
    /// unbuilt contour reports the resting values.
    pub fn update_staff_line_borders(&self, borders: &mut StaffLineBorders) {
        let top = finite_or(self.sky_line_min(), Line::Sky.resting_value(self.staff_height));
        let bottom = finite_or(
            self.bottom_line_max(),
            Line::Bottom.resting_value(self.staff_height),
        );
        borders.top = top;
        borders.margin_top = top;
        borders.bottom = bottom;
        borders.margin_bottom = bottom;
    }
}

fn finite_or(value: f64, fallback: f64) -> f64 {
    if value.is_finite() {
        value
    } else {
        fallback
    }
}
