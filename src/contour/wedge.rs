//! Wedge updates — crescendo and diminuendo hairpins.
//!
//! A wedge's outer edge is a straight line, so the covered samples are
//! overwritten with a linear ramp rather than combined with the contour.

use log::debug;

use super::grid::{clamp_bound, clamp_point, SamplingGrid};
use crate::model::Point;

/// Overwrite the samples under the wedge edge `start`–`end` with a ramp
/// from `start.y`. A wedge that covers a single sample is written flat.
pub(super) fn ramp(samples: &mut [f64], grid: SamplingGrid, start: Point, end: Point) {
    if samples.is_empty() {
        return;
    }

    let start_index = grid.start_index(start.x);
    let mut end_index = grid.end_index(end.x);
    let mut slope = (end.y - start.y) / (end.x - start.x);

    if end_index.saturating_sub(start_index) <= 1 {
        end_index = end_index.saturating_add(1);
        slope = 0.0;
    }
    if !slope.is_finite() {
        slope = 0.0;
    }

    let start_index = clamp_point(start_index, samples.len());
    let end_index = clamp_bound(end_index, samples.len());
    debug!(
        "wedge from ({:.2}, {:.2}) to ({:.2}, {:.2}) over samples {start_index}..{end_index}",
        start.x, start.y, end.x, end.y
    );

    let step = slope / grid.sampling_unit();
    samples[start_index] = start.y;
    for i in start_index + 1..end_index {
        samples[i] = samples[i - 1] + step;
    }
}
