//! Measure contour builder — flat per-measure contours from the element
//! bounding boxes, bent along slanted beams.
//!
//! Elements are assumed not to overlap at this stage, so each element
//! simply overwrites its span; when spans do overlap the element processed
//! last wins.

use log::{trace, warn};

use super::grid::{clamp_bound, SamplingGrid};
use super::Line;
use crate::model::{Beam, BeamId, BoundingBox, Measure};

// ── Measure contour ─────────────────────────────────────────────────

/// Contour of one measure, indexed from the measure's left edge.
#[derive(Debug, Clone)]
pub(super) struct MeasureContour {
    sky: Vec<f64>,
    bottom: Vec<f64>,
}

impl MeasureContour {
    fn new(len: usize, staff_height: f64) -> Self {
        Self {
            sky: vec![Line::Sky.resting_value(staff_height); len],
            bottom: vec![Line::Bottom.resting_value(staff_height); len],
        }
    }

    fn line_mut(&mut self, line: Line) -> &mut [f64] {
        match line {
            Line::Sky => &mut self.sky,
            Line::Bottom => &mut self.bottom,
        }
    }

    pub(super) fn into_lines(self) -> (Vec<f64>, Vec<f64>) {
        (self.sky, self.bottom)
    }
}

// ── Beam bookkeeping ────────────────────────────────────────────────

/// A beam group whose first note has been seen in the current measure.
#[derive(Debug, Clone, Copy)]
struct BeamAccumulator {
    start_index: usize,
    slope_applied: bool,
}

/// Pending beam groups of one contour line, looked up by beam id.
#[derive(Debug, Default)]
struct BeamTracker {
    pending: Vec<Option<BeamAccumulator>>,
}

impl BeamTracker {
    fn start(&mut self, beam: BeamId, start_index: usize) {
        if self.pending.len() <= beam {
            self.pending.resize(beam + 1, None);
        }
        self.pending[beam] = Some(BeamAccumulator {
            start_index,
            slope_applied: false,
        });
    }

    fn take(&mut self, beam: BeamId) -> Option<BeamAccumulator> {
        self.pending.get_mut(beam).and_then(Option::take)
    }
}

// ── Builder ─────────────────────────────────────────────────────────

pub(super) struct ContourBuilder<'a> {
    grid: SamplingGrid,
    staff_height: f64,
    beams: &'a [Beam],
}

impl<'a> ContourBuilder<'a> {
    pub(super) fn new(grid: SamplingGrid, staff_height: f64, beams: &'a [Beam]) -> Self {
        Self {
            grid,
            staff_height,
            beams,
        }
    }

    pub(super) fn build_measure(&self, measure: &Measure) -> MeasureContour {
        let len = self.grid.sample_count(measure.width).max(1);
        let mut contour = MeasureContour::new(len, self.staff_height);
        let mut trackers = [BeamTracker::default(), BeamTracker::default()];

        for element in &measure.bounding_box.children {
            let x = element.relative_position.x;
            let (start, end) = self.grid.span(x + element.border_left, x + element.border_right);
            let start = clamp_bound(start, len);
            let end = clamp_bound(end, len).max(start);

            for (line, tracker) in Line::BOTH.into_iter().zip(&mut trackers) {
                let value = line.border(element);
                if !line.extends(value, self.staff_height) {
                    continue;
                }
                let samples = contour.line_mut(line);
                samples[start..end].fill(value);
                self.refine_beams(element, samples, tracker, start, end);
            }
        }

        contour
    }

    /// Record where beam groups begin and, at a group's last note, replace
    /// the flat span since its first note with a ramp along the beam.
    fn refine_beams(
        &self,
        element: &BoundingBox,
        samples: &mut [f64],
        tracker: &mut BeamTracker,
        start: usize,
        end: usize,
    ) {
        let Some(entry) = &element.staff_entry else {
            return;
        };

        for note in &entry.notes {
            let Some(member) = note.beam() else {
                continue;
            };
            let Some(beam) = self.beams.get(member.beam) else {
                warn!("Note references beam {} which doesn't exist", member.beam);
                continue;
            };

            if member.index == 0 {
                tracker.start(member.beam, start);
            } else if beam.is_last_member(member.index) {
                let Some(mut pending) = tracker.take(member.beam) else {
                    warn!("Beam {} ends without a recorded start on this line", member.beam);
                    continue;
                };
                if note.has_beam_slope() {
                    let slope = beam.slope();
                    if slope != 0.0 {
                        apply_slope(samples, pending.start_index, end, slope);
                        pending.slope_applied = true;
                    }
                }
                trace!(
                    "beam {}: samples {}..{}, slope applied: {}",
                    member.beam, pending.start_index, end, pending.slope_applied
                );
            }
        }
    }
}

/// Rewrite `samples[start + 1..end]` as a ramp rising by `step` per sample
/// from the value already at `start`.
fn apply_slope(samples: &mut [f64], start: usize, end: usize, step: f64) {
    let end = end.min(samples.len());
    for i in start + 1..end {
        samples[i] = samples[i - 1] + step;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{BeamMember, GraphicalNote, Point, StaffEntry, StemDirection};
    use crate::rules::DEFAULT_SAMPLING_UNIT;
    use pretty_assertions::assert_eq;

    const UNIT: SamplingGrid = SamplingGrid::new(1.0);

    fn build(measure: &Measure, beams: &[Beam]) -> (Vec<f64>, Vec<f64>) {
        ContourBuilder::new(UNIT, 4.0, beams).build_measure(measure).into_lines()
    }

    fn beamed_note(x: f64, top: f64, index: usize, stem: StemDirection) -> BoundingBox {
        let note = GraphicalNote::stemmed(stem, Some(BeamMember { beam: 0, index }));
        BoundingBox::new(x, 0.0)
            .with_borders(0.0, 1.0, top, 4.0)
            .with_staff_entry(StaffEntry::new(vec![note]))
    }

    fn beamed_measure(stem: StemDirection) -> Measure {
        Measure::new(12.0)
            .with_element(beamed_note(4.0, -3.0, 0, stem))
            .with_element(beamed_note(6.0, -3.0, 1, stem))
            .with_element(beamed_note(9.0, -3.0, 2, stem))
    }

    #[test]
    fn element_above_staff() {
        let measure = Measure::new(5.0)
            .with_element(BoundingBox::new(0.0, 0.0).with_borders(0.0, 2.0, -5.0, 4.0));
        let (sky, bottom) = build(&measure, &[]);
        assert_eq!(sky, vec![-5.0, -5.0, 0.0, 0.0, 0.0]);
        assert_eq!(bottom, vec![4.0; 5]);
    }

    #[test]
    fn element_below_staff() {
        let measure = Measure::new(4.0)
            .with_element(BoundingBox::new(1.0, 0.0).with_borders(0.0, 1.5, 0.0, 6.5));
        let (sky, bottom) = build(&measure, &[]);
        assert_eq!(sky, vec![0.0; 4]);
        assert_eq!(bottom, vec![4.0, 6.5, 6.5, 4.0]);
    }

    #[test]
    fn zero_width_measure_keeps_one_sample() {
        let (sky, bottom) = build(&Measure::new(0.0), &[]);
        assert_eq!(sky, vec![0.0]);
        assert_eq!(bottom, vec![4.0]);
    }

    #[test]
    fn elements_past_measure_edges_are_clamped() {
        let measure = Measure::new(3.0)
            .with_element(BoundingBox::new(-1.0, 0.0).with_borders(-1.0, 2.0, -1.0, 0.0))
            .with_element(BoundingBox::new(2.0, 0.0).with_borders(0.0, 5.0, -2.0, 0.0));
        let (sky, _) = build(&measure, &[]);
        assert_eq!(sky, vec![-1.0, 0.0, -2.0]);
    }

    #[test]
    fn last_processed_element_wins() {
        let measure = Measure::new(4.0)
            .with_element(BoundingBox::new(0.0, 0.0).with_borders(0.0, 3.0, -6.0, 0.0))
            .with_element(BoundingBox::new(1.0, 0.0).with_borders(0.0, 1.0, -2.0, 0.0));
        let (sky, _) = build(&measure, &[]);
        assert_eq!(sky, vec![-6.0, -2.0, -6.0, 0.0]);
    }

    #[test]
    fn beam_slope_ramps_sky_line() {
        let beams = [Beam::with_slope(3, 0.5)];
        let (sky, _) = build(&beamed_measure(StemDirection::Up), &beams);
        assert_eq!(sky[4], -3.0);
        for i in 5..=9 {
            assert_eq!(sky[i], sky[i - 1] + 0.5, "sample {i}");
        }
        assert_eq!(sky[10], 0.0);
        assert_eq!(&sky[..4], &[0.0; 4]);
    }

    #[test]
    fn beam_slope_steps_once_per_sample_at_any_resolution() {
        let beams = [Beam::with_slope(3, 0.5)];
        let (sky, _) = ContourBuilder::new(SamplingGrid::new(2.0), 4.0, &beams)
            .build_measure(&beamed_measure(StemDirection::Up))
            .into_lines();
        assert_eq!(sky.len(), 24);
        assert_eq!(sky[8], -3.0);
        assert_eq!(sky[9], -2.5);
        assert_eq!(sky[19], 2.5);
        assert_eq!(sky[20], 0.0);
    }

    #[test]
    fn beam_slope_at_default_resolution() {
        let beams = [Beam::with_slope(3, 0.5)];
        let (sky, _) = ContourBuilder::new(SamplingGrid::new(DEFAULT_SAMPLING_UNIT), 4.0, &beams)
            .build_measure(&beamed_measure(StemDirection::Up))
            .into_lines();
        assert_eq!(sky.len(), 36);
        assert_eq!(sky[12], -3.0);
        for i in 13..30 {
            assert_eq!(sky[i], sky[i - 1] + 0.5, "sample {i}");
        }
        assert_eq!(sky[30], 0.0);
    }

    #[test]
    fn beam_end_without_start_keeps_flat_values() {
        let beams = [Beam::with_slope(2, 0.5)];
        let measure = Measure::new(6.0).with_element(beamed_note(3.0, -3.0, 1, StemDirection::Up));
        let (sky, _) = build(&measure, &beams);
        assert_eq!(sky, vec![0.0, 0.0, 0.0, -3.0, 0.0, 0.0]);
    }

    #[test]
    fn down_stem_keeps_flat_values() {
        let beams = [Beam::with_slope(3, 0.5)];
        let (sky, _) = build(&beamed_measure(StemDirection::Down), &beams);
        assert_eq!(sky, vec![0.0, 0.0, 0.0, 0.0, -3.0, 0.0, -3.0, 0.0, 0.0, -3.0, 0.0, 0.0]);
    }

    #[test]
    fn flat_beam_keeps_flat_values() {
        let beams = [Beam::new(3, vec![Point::new(4.0, -3.0), Point::new(9.0, -3.0)])];
        let (sky, _) = build(&beamed_measure(StemDirection::Up), &beams);
        assert_eq!(sky[5], 0.0);
        assert!(beams[0].is_slope_cached());
    }

    #[test]
    fn single_note_group_is_ignored() {
        let beams = [Beam::with_slope(1, 0.5)];
        let measure = Measure::new(6.0).with_element(beamed_note(2.0, -3.0, 0, StemDirection::Up));
        let (sky, _) = build(&measure, &beams);
        assert_eq!(sky, vec![0.0, 0.0, -3.0, 0.0, 0.0, 0.0]);
    }

    #[test]
    fn bottom_line_gets_its_own_refinement() {
        let beams = [Beam::with_slope(2, -1.0)];
        let note = |x: f64, index: usize| {
            let member = BeamMember { beam: 0, index };
            let note = GraphicalNote::stemmed(StemDirection::Up, Some(member));
            BoundingBox::new(x, 0.0)
                .with_borders(0.0, 1.0, -2.0, 9.0)
                .with_staff_entry(StaffEntry::new(vec![note]))
        };
        let measure = Measure::new(6.0).with_element(note(1.0, 0)).with_element(note(3.0, 1));
        let (sky, bottom) = build(&measure, &beams);
        assert_eq!(sky, vec![0.0, -2.0, -3.0, -4.0, 0.0, 0.0]);
        assert_eq!(bottom, vec![4.0, 9.0, 8.0, 7.0, 4.0, 4.0]);
    }

    #[test]
    fn unknown_beam_is_skipped() {
        let measure = Measure::new(6.0)
            .with_element(beamed_note(1.0, -3.0, 0, StemDirection::Up))
            .with_element(beamed_note(3.0, -3.0, 1, StemDirection::Up));
        let (sky, _) = build(&measure, &[]);
        assert_eq!(sky, vec![0.0, -3.0, 0.0, -3.0, 0.0, 0.0]);
    }
}
