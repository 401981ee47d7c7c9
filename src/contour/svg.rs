//! SVG debug overlay — draws a staff with its skyline and bottomline.
//!
//! Used to eyeball contours while tuning layout; not part of the
//! rendered score.

use std::fmt::Write as _;

use super::{finite_or, Line, SkyBottomLine};

const STAFF_COLOR: &str = "#555555";
const SKY_COLOR: &str = "#d0402b";
const BOTTOM_COLOR: &str = "#2b6fd0";
const STAFF_LINE_WIDTH: f64 = 0.8;
const CONTOUR_WIDTH: f64 = 1.2;
/// Space kept around the drawing, in staff spaces.
const PADDING: f64 = 1.0;

// ═══════════════════════════════════════════════════════════════════════
// SvgBuilder
// ═══════════════════════════════════════════════════════════════════════

struct SvgBuilder {
    elements: Vec<String>,
    width: f64,
    height: f64,
}

impl SvgBuilder {
    fn new(width: f64, height: f64) -> Self {
        Self {
            elements: Vec::new(),
            width,
            height,
        }
    }

    fn build(self) -> String {
        let mut svg = format!(
            r#"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 {:.1} {:.1}" width="{:.1}" height="{:.1}">"#,
            self.width, self.height, self.width, self.height
        );
        svg.push('\n');
        for el in &self.elements {
            svg.push_str("  ");
            svg.push_str(el);
            svg.push('\n');
        }
        svg.push_str("</svg>\n");
        svg
    }

    fn line(&mut self, x1: f64, y1: f64, x2: f64, y2: f64, color: &str, width: f64) {
        self.elements.push(format!(
            r#"<line x1="{:.1}" y1="{:.1}" x2="{:.1}" y2="{:.1}" stroke="{}" stroke-width="{:.1}"/>"#,
            x1, y1, x2, y2, color, width
        ));
    }

    fn polyline(&mut self, points: &[(f64, f64)], color: &str, width: f64) {
        if points.len() < 2 {
            return;
        }
        let mut coords = String::new();
        for (i, (x, y)) in points.iter().enumerate() {
            if i > 0 {
                coords.push(' ');
            }
            let _ = write!(coords, "{x:.1},{y:.1}");
        }
        self.elements.push(format!(
            r#"<polyline points="{}" fill="none" stroke="{}" stroke-width="{:.1}"/>"#,
            coords, color, width
        ));
    }
}

fn empty_svg(message: &str) -> String {
    format!(
        "<svg xmlns=\"http://www.w3.org/2000/svg\" viewBox=\"0 0 400 100\">\
         <text x=\"200\" y=\"50\" text-anchor=\"middle\" font-size=\"14\" fill=\"gray\">{}</text>\
         </svg>",
        message
    )
}

// ═══════════════════════════════════════════════════════════════════════
// Public API
// ═══════════════════════════════════════════════════════════════════════

/// Render both contours over a five-line staff. `scale` is the number of
/// SVG user units per staff space.
pub fn render_contour_svg(lines: &SkyBottomLine, scale: f64) -> String {
    if lines.is_empty() {
        return empty_svg("Sky/bottom lines not calculated");
    }

    let staff_height = lines.staff_height();
    let top = finite_or(lines.sky_line_min(), 0.0).min(0.0) - PADDING;
    let bottom = finite_or(lines.bottom_line_max(), staff_height).max(staff_height) + PADDING;

    let su = lines.sampling_unit();
    let width = lines.len() as f64 / su * scale;
    let mut svg = SvgBuilder::new(width, (bottom - top) * scale);
    let to_y = |y: f64| (y - top) * scale;

    let mut staff_y = 0.0;
    while staff_y <= staff_height + f64::EPSILON {
        svg.line(0.0, to_y(staff_y), width, to_y(staff_y), STAFF_COLOR, STAFF_LINE_WIDTH);
        staff_y += 1.0;
    }

    for (line, color) in [(Line::Sky, SKY_COLOR), (Line::Bottom, BOTTOM_COLOR)] {
        // Each sample is drawn as a flat step; non-finite samples break
        // the outline.
        let mut points: Vec<(f64, f64)> = Vec::new();
        for (i, &value) in lines.line(line).iter().enumerate() {
            if !value.is_finite() {
                svg.polyline(&points, color, CONTOUR_WIDTH);
                points.clear();
                continue;
            }
            let x0 = i as f64 / su * scale;
            let x1 = (i + 1) as f64 / su * scale;
            points.push((x0, to_y(value)));
            points.push((x1, to_y(value)));
        }
        svg.polyline(&points, color, CONTOUR_WIDTH);
    }

    svg.build()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{BoundingBox, Measure};
    use crate::rules::EngravingRules;

    #[test]
    fn draws_staff_and_both_contours() {
        let mut lines = SkyBottomLine::new(&EngravingRules::with_sampling_unit(1.0));
        let measure = Measure::new(4.0)
            .with_element(BoundingBox::new(1.0, 0.0).with_borders(0.0, 1.0, -2.0, 6.0));
        lines.calculate_lines(&[measure], &[]);

        let svg = render_contour_svg(&lines, 10.0);
        assert!(svg.starts_with("<svg"), "Output should be SVG");
        assert_eq!(svg.matches("<line").count(), 5, "five staff lines");
        assert_eq!(svg.matches("<polyline").count(), 2);
        assert!(svg.contains(SKY_COLOR));
        assert!(svg.contains(BOTTOM_COLOR));
        assert!(svg.contains(r#"viewBox="0 0 40.0 100.0""#), "{svg}");
    }

    #[test]
    fn unbuilt_contour_renders_placeholder() {
        let svg = render_contour_svg(&SkyBottomLine::default(), 10.0);
        assert!(svg.contains("not calculated"));
    }
}
