//! Range update and query primitives over a single contour line.
//!
//! Every primitive takes continuous `start`/`end` positions and converts
//! them through the sampling grid first. Updates treat `end` as exclusive,
//! queries treat it as inclusive. Indices past either end of the line are
//! clamped.

use std::ops::Range;

use super::grid::{clamp_bound, clamp_point, SamplingGrid};
use crate::error::{ContourError, Result};

/// Returned by [`min_in_range`] when no finite sample is in range.
pub const MIN_SENTINEL: f64 = f64::INFINITY;
/// Returned by [`max_in_range`] when no finite sample is in range.
pub const MAX_SENTINEL: f64 = f64::NEG_INFINITY;

/// Converted, clamped half-open index range of `[start, end)`.
fn update_range(len: usize, grid: SamplingGrid, start: f64, end: f64) -> Result<Range<usize>> {
    let (start, end) = grid.span(start, end);
    if end < start {
        return Err(ContourError::RangeOrder { start, end });
    }
    Ok(clamp_bound(start, len)..clamp_bound(end, len))
}

/// Raise samples in range to `value`, keeping any sample that already
/// lies further from the staff.
pub fn update_in_range(
    line: &mut [f64],
    grid: SamplingGrid,
    start: f64,
    end: f64,
    value: f64,
) -> Result<()> {
    let range = update_range(line.len(), grid, start, end)?;
    for sample in &mut line[range] {
        if value.abs() > sample.abs() {
            *sample = value;
        }
    }
    Ok(())
}

/// Overwrite every sample in range with `value`.
pub fn set_in_range(
    line: &mut [f64],
    grid: SamplingGrid,
    start: f64,
    end: f64,
    value: f64,
) -> Result<()> {
    let range = update_range(line.len(), grid, start, end)?;
    line[range].fill(value);
    Ok(())
}

/// Smallest finite sample of the closed range, or [`MIN_SENTINEL`].
pub fn min_in_range(line: &[f64], grid: SamplingGrid, start: f64, end: f64) -> f64 {
    query_range(line, grid, start, end)
        .map_or(MIN_SENTINEL, |samples| reduce(samples, MIN_SENTINEL, f64::min))
}

/// Largest finite sample of the closed range, or [`MAX_SENTINEL`].
pub fn max_in_range(line: &[f64], grid: SamplingGrid, start: f64, end: f64) -> f64 {
    query_range(line, grid, start, end)
        .map_or(MAX_SENTINEL, |samples| reduce(samples, MAX_SENTINEL, f64::max))
}

/// Fold the finite samples of `samples`, starting from `sentinel`.
pub(super) fn reduce(samples: &[f64], sentinel: f64, pick: fn(f64, f64) -> f64) -> f64 {
    samples
        .iter()
        .copied()
        .filter(|s| s.is_finite())
        .fold(sentinel, pick)
}

fn query_range(line: &[f64], grid: SamplingGrid, start: f64, end: f64) -> Option<&[f64]> {
    if line.is_empty() {
        return None;
    }
    let (start, end) = grid.span(start, end);
    let start = clamp_point(start, line.len());
    let end = clamp_point(end, line.len());
    if end < start {
        return None;
    }
    Some(&line[start..=end])
}
