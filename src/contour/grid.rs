//! Sampling grid — maps continuous horizontal positions to sample indices.
//!
//! Range starts round down and range ends round up, so any continuous
//! extent is covered by its index span. Indices are signed until they are
//! clamped against a concrete array.

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(transparent)]
pub struct SamplingGrid {
    sampling_unit: f64,
}

impl SamplingGrid {
    pub const fn new(sampling_unit: f64) -> Self {
        Self { sampling_unit }
    }

    pub fn sampling_unit(&self) -> f64 {
        self.sampling_unit
    }

    /// First sample touched by an extent starting at `x`.
    pub fn start_index(&self, x: f64) -> i64 {
        (x * self.sampling_unit).floor() as i64
    }

    /// One past the last sample touched by an extent ending at `x`.
    pub fn end_index(&self, x: f64) -> i64 {
        (x * self.sampling_unit).ceil() as i64
    }

    /// Sample closest to `x`.
    pub fn nearest_index(&self, x: f64) -> i64 {
        (x * self.sampling_unit).round() as i64
    }

    /// Number of samples needed to cover `width`.
    pub fn sample_count(&self, width: f64) -> usize {
        clamp_bound(self.end_index(width), usize::MAX)
    }

    /// Covering index span `[start, end)` of a continuous extent.
    pub fn span(&self, start: f64, end: f64) -> (i64, i64) {
        (self.start_index(start), self.end_index(end))
    }
}

/// Clamp into `[0, len - 1]`; `len` must be non-zero.
pub(super) fn clamp_point(index: i64, len: usize) -> usize {
    debug_assert!(len > 0, "cannot clamp a point into an empty line");
    clamp_bound(index, len - 1)
}

/// Clamp into `[0, len]`, the valid range for half-open bounds.
pub(super) fn clamp_bound(index: i64, len: usize) -> usize {
    if index <= 0 {
        0
    } else {
        usize::try_from(index).map_or(len, |i| i.min(len))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn span_covers_extent() {
        let grid = SamplingGrid::new(3.0);
        assert_eq!(grid.span(0.5, 1.1), (1, 4));
        assert_eq!(grid.span(-0.5, 0.0), (-2, 0));
    }

    #[test]
    fn mapping_is_monotonic() {
        let grid = SamplingGrid::new(2.5);
        let mut prev = grid.start_index(-3.0);
        for step in 0..200 {
            let idx = grid.start_index(-3.0 + step as f64 * 0.07);
            assert!(idx >= prev, "index went backwards at step {step}");
            prev = idx;
        }
    }

    #[test]
    fn sample_count_rounds_up() {
        let grid = SamplingGrid::new(3.0);
        assert_eq!(grid.sample_count(2.1), 7);
        assert_eq!(grid.sample_count(0.0), 0);
        assert_eq!(grid.sample_count(-1.0), 0);
    }

    #[test]
    fn clamping() {
        assert_eq!(clamp_point(-4, 10), 0);
        assert_eq!(clamp_point(12, 10), 9);
        assert_eq!(clamp_bound(12, 10), 10);
        assert_eq!(clamp_bound(7, 10), 7);
    }
}
