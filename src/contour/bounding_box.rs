//! Folding late-placed elements into an existing contour.

use super::range::update_in_range;
use super::{Line, SkyBottomLine};
use crate::error::Result;
use crate::model::{BoundingBox, Point};

/// Grow the contour by every leaf of `bbox`. `origin` is the absolute
/// position of the box's parent.
pub(super) fn update_recursively(
    lines: &mut SkyBottomLine,
    bbox: &BoundingBox,
    origin: Point,
) -> Result<()> {
    let position = origin + bbox.relative_position;
    if !bbox.is_leaf() {
        for child in &bbox.children {
            update_recursively(lines, child, position)?;
        }
        return Ok(());
    }

    let (start, end) = horizontal_extent(bbox, position);
    for line in Line::BOTH {
        let value = line.border(bbox) + position.y;
        if line.extends(value, lines.staff_height) {
            let grid = lines.grid;
            update_in_range(lines.line_mut(line), grid, start, end, value)?;
        }
    }
    Ok(())
}

/// Absolute left and right edges of a box anchored at `position`.
pub(super) fn horizontal_extent(bbox: &BoundingBox, position: Point) -> (f64, f64) {
    (position.x + bbox.border_left, position.x + bbox.border_right)
}
