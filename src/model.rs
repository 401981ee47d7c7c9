//! Data model for the already-resolved layout geometry of a staff line.
//!
//! These structures are produced by the surrounding layout pass: measures
//! carry bounding-box trees with final positions, notes carry their beam
//! membership and stem direction. The contour engine only reads them,
//! except for [`StaffLine`], which owns its contour and layout borders.

use std::cell::OnceCell;
use std::ops::Add;

use serde::{Deserialize, Serialize};

use crate::contour::SkyBottomLine;
use crate::error::Result;
use crate::rules::EngravingRules;

/// A position in staff-space units.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

impl Add for Point {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self::new(self.x + rhs.x, self.y + rhs.y)
    }
}

/// Occupied layout area of an element, with optional child boxes.
///
/// Borders are signed offsets from `relative_position`: a box drawn
/// above and to the left of its anchor has negative `border_top` and
/// `border_left`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct BoundingBox {
    /// Position relative to the parent box (or the measure for elements)
    pub relative_position: Point,
    pub border_left: f64,
    pub border_right: f64,
    pub border_top: f64,
    pub border_bottom: f64,
    /// Nested boxes; an empty list marks a leaf
    pub children: Vec<BoundingBox>,
    /// Present when the box belongs to a note-bearing staff entry
    pub staff_entry: Option<StaffEntry>,
}

impl BoundingBox {
    pub fn new(x: f64, y: f64) -> Self {
        Self {
            relative_position: Point::new(x, y),
            ..Self::default()
        }
    }

    pub fn with_borders(mut self, left: f64, right: f64, top: f64, bottom: f64) -> Self {
        self.border_left = left;
        self.border_right = right;
        self.border_top = top;
        self.border_bottom = bottom;
        self
    }

    pub fn with_child(mut self, child: BoundingBox) -> Self {
        self.children.push(child);
        self
    }

    pub fn with_staff_entry(mut self, entry: StaffEntry) -> Self {
        self.staff_entry = Some(entry);
        self
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }
}

/// The notes engraved at one horizontal position of a measure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StaffEntry {
    pub notes: Vec<GraphicalNote>,
}

impl StaffEntry {
    pub fn new(notes: Vec<GraphicalNote>) -> Self {
        Self { notes }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StemDirection {
    Up,
    Down,
}

/// Index into [`StaffLine::beams`].
pub type BeamId = usize;

/// A note's place within the beam group it belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BeamMember {
    pub beam: BeamId,
    /// 0-based position of the note within the group
    pub index: usize,
}

/// A rendered note.
///
/// Only stemmed notes pointing up carry geometry from which a beam slope
/// can be read; every other variant is skipped by the beam refinement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum GraphicalNote {
    Stemmed {
        stem: StemDirection,
        #[serde(default)]
        beam: Option<BeamMember>,
    },
    /// Whole notes, rests and other glyphs without a stem
    Stemless {
        #[serde(default)]
        beam: Option<BeamMember>,
    },
}

impl GraphicalNote {
    pub fn stemmed(stem: StemDirection, beam: Option<BeamMember>) -> Self {
        Self::Stemmed { stem, beam }
    }

    pub fn beam(&self) -> Option<BeamMember> {
        match self {
            Self::Stemmed { beam, .. } | Self::Stemless { beam } => *beam,
        }
    }

    /// Whether the beam slope can be resolved from this note's stem.
    pub fn has_beam_slope(&self) -> bool {
        matches!(self, Self::Stemmed { stem: StemDirection::Up, .. })
    }
}

/// A beam shared by consecutive notes.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Beam {
    /// Number of notes in the group
    pub members: usize,
    /// Stem end points of the group, left to right
    #[serde(default)]
    pub stem_tips: Vec<Point>,
    #[serde(skip)]
    slope: OnceCell<f64>,
}

impl Beam {
    pub fn new(members: usize, stem_tips: Vec<Point>) -> Self {
        Self {
            members,
            stem_tips,
            slope: OnceCell::new(),
        }
    }

    /// A beam whose slope has already been computed elsewhere.
    pub fn with_slope(members: usize, slope: f64) -> Self {
        let beam = Self::new(members, Vec::new());
        let _ = beam.slope.set(slope);
        beam
    }

    /// Rise per staff-space unit along the beam, computed on first use.
    pub fn slope(&self) -> f64 {
        *self.slope.get_or_init(|| self.calculate_slope())
    }

    pub fn is_slope_cached(&self) -> bool {
        self.slope.get().is_some()
    }

    pub fn is_last_member(&self, index: usize) -> bool {
        self.members > 1 && index + 1 == self.members
    }

    fn calculate_slope(&self) -> f64 {
        let (Some(first), Some(last)) = (self.stem_tips.first(), self.stem_tips.last()) else {
            return 0.0;
        };
        let dx = last.x - first.x;
        if dx.abs() < f64::EPSILON {
            return 0.0;
        }
        let slope = (last.y - first.y) / dx;
        if slope.is_finite() { slope } else { 0.0 }
    }
}

/// A measure with its resolved bounding-box tree.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Measure {
    /// Width in staff-space units
    pub width: f64,
    /// Root box; its direct children are the measure's elements
    #[serde(default)]
    pub bounding_box: BoundingBox,
}

impl Measure {
    pub fn new(width: f64) -> Self {
        Self {
            width,
            bounding_box: BoundingBox::default(),
        }
    }

    pub fn with_element(mut self, element: BoundingBox) -> Self {
        self.bounding_box.children.push(element);
        self
    }
}

/// Vertical layout extent of a staff line, in staff-space units.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct StaffLineBorders {
    pub top: f64,
    pub margin_top: f64,
    pub bottom: f64,
    pub margin_bottom: f64,
}

/// One horizontal line of a staff: measures, beams and the contour
/// computed from them.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StaffLine {
    pub measures: Vec<Measure>,
    pub beams: Vec<Beam>,
    pub borders: StaffLineBorders,
    #[serde(skip)]
    sky_bottom_line: SkyBottomLine,
}

impl StaffLine {
    pub fn new(measures: Vec<Measure>, beams: Vec<Beam>) -> Self {
        Self {
            measures,
            beams,
            ..Self::default()
        }
    }

    /// Total width of all measures.
    pub fn width(&self) -> f64 {
        self.measures.iter().map(|m| m.width).sum()
    }

    /// Rebuild the contour from the current measures, discarding any
    /// incremental updates made since the last build.
    pub fn calculate_sky_bottom_line(&mut self, rules: &EngravingRules) -> Result<()> {
        rules.validate()?;
        let mut lines = SkyBottomLine::new(rules);
        lines.calculate_lines(&self.measures, &self.beams);
        self.sky_bottom_line = lines;
        Ok(())
    }

    pub fn sky_bottom_line(&self) -> &SkyBottomLine {
        &self.sky_bottom_line
    }

    pub fn sky_bottom_line_mut(&mut self) -> &mut SkyBottomLine {
        &mut self.sky_bottom_line
    }

    /// Push the contour extremes into this line's layout borders.
    pub fn update_borders(&mut self) {
        self.sky_bottom_line.update_staff_line_borders(&mut self.borders);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn beam_slope_is_computed_once() {
        let tips = vec![Point::new(1.0, -4.0), Point::new(2.0, -4.5), Point::new(5.0, -6.0)];
        let beam = Beam::new(3, tips);
        assert!(!beam.is_slope_cached());
        assert_eq!(beam.slope(), -0.5);
        assert!(beam.is_slope_cached());
    }

    #[test]
    fn vertical_beam_has_no_slope() {
        let beam = Beam::new(2, vec![Point::new(1.0, -4.0), Point::new(1.0, -6.0)]);
        assert_eq!(beam.slope(), 0.0);
    }

    #[test]
    fn only_up_stems_resolve_slope() {
        let member = Some(BeamMember { beam: 0, index: 1 });
        assert!(GraphicalNote::stemmed(StemDirection::Up, member).has_beam_slope());
        assert!(!GraphicalNote::stemmed(StemDirection::Down, member).has_beam_slope());
        assert!(!GraphicalNote::Stemless { beam: member }.has_beam_slope());
    }

    #[test]
    fn single_note_group_has_no_last_member() {
        let beam = Beam::with_slope(1, 0.5);
        assert!(!beam.is_last_member(0));
        assert!(Beam::with_slope(3, 0.5).is_last_member(2));
    }

    #[test]
    fn note_json_uses_kind_tag() {
        let note: GraphicalNote = serde_json::from_str(
            r#"{ "kind": "stemmed", "stem": "up", "beam": { "beam": 0, "index": 2 } }"#,
        )
        .unwrap();
        assert_eq!(note.beam(), Some(BeamMember { beam: 0, index: 2 }));
        assert!(note.has_beam_slope());
    }
}
