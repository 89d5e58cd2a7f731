//! SVG plot of a quadtree: leaf rectangles outlined, input points as red dots.

use std::fmt::{self, Write};

use tracing::instrument;

use crate::domain::{QuadTree, Region};

/// Canvas settings for [`render_svg`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SvgStyle {
    pub width: u32,
    pub height: u32,
    pub point_radius: f64,
    /// Blank border around the plot, in pixels
    pub margin: f64,
}

impl Default for SvgStyle {
    fn default() -> Self {
        Self {
            width: 1200,
            height: 800,
            point_radius: 3.0,
            margin: 40.0,
        }
    }
}

/// Maps tree coordinates onto the canvas. The y axis points up.
struct Viewport {
    origin: Region,
    scale_x: f64,
    scale_y: f64,
    margin: f64,
    canvas_height: f64,
}

impl Viewport {
    fn new(root: Region, style: &SvgStyle) -> Self {
        let plot_w = (style.width as f64 - 2.0 * style.margin).max(1.0);
        let plot_h = (style.height as f64 - 2.0 * style.margin).max(1.0);
        let scale = |extent: f64, pixels: f64| {
            if extent > 0.0 {
                pixels / extent
            } else {
                1.0
            }
        };
        Self {
            origin: root,
            scale_x: scale(root.width, plot_w),
            scale_y: scale(root.height, plot_h),
            margin: style.margin,
            canvas_height: style.height as f64,
        }
    }

    fn x(&self, x: f64) -> f64 {
        self.margin + (x - self.origin.x0) * self.scale_x
    }

    fn y(&self, y: f64) -> f64 {
        self.canvas_height - self.margin - (y - self.origin.y0) * self.scale_y
    }
}

/// Render the leaves and the original points of `tree` as an SVG document.
#[instrument(level = "debug", skip(tree), fields(leaves = tree.leaf_count()))]
pub fn render_svg(tree: &QuadTree, style: &SvgStyle) -> Result<String, fmt::Error> {
    let mut svg = String::new();
    write_document(&mut svg, tree, style)?;
    Ok(svg)
}

fn write_document(out: &mut impl Write, tree: &QuadTree, style: &SvgStyle) -> fmt::Result {
    let view = Viewport::new(tree.root_region(), style);

    writeln!(
        out,
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{w}" height="{h}" viewBox="0 0 {w} {h}">"#,
        w = style.width,
        h = style.height
    )?;
    writeln!(out, r#"  <rect width="100%" height="100%" fill="white"/>"#)?;
    writeln!(
        out,
        r#"  <text x="{}" y="{}" font-family="sans-serif" font-size="18" text-anchor="middle">Quadtree</text>"#,
        style.width as f64 / 2.0,
        (style.margin * 0.6).max(18.0)
    )?;

    writeln!(out, r#"  <g fill="none" stroke="black" stroke-width="1">"#)?;
    for leaf in tree.leaves() {
        let r = leaf.region();
        writeln!(
            out,
            r#"    <rect x="{:.3}" y="{:.3}" width="{:.3}" height="{:.3}"/>"#,
            view.x(r.x0),
            view.y(r.y1()),
            r.width * view.scale_x,
            r.height * view.scale_y
        )?;
    }
    writeln!(out, "  </g>")?;

    writeln!(out, r#"  <g fill="red">"#)?;
    for p in tree.points() {
        writeln!(
            out,
            r#"    <circle cx="{:.3}" cy="{:.3}" r="{}"/>"#,
            view.x(p.x),
            view.y(p.y),
            style.point_radius
        )?;
    }
    writeln!(out, "  </g>")?;
    writeln!(out, "</svg>")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn given_tree_when_rendering_then_one_rect_per_leaf_and_one_circle_per_point() {
        let tree = QuadTree::build([(0.0, 0.0), (1.0, 1.0), (0.2, 0.9)], 1).unwrap();

        let svg = render_svg(&tree, &SvgStyle::default()).unwrap();

        assert!(svg.starts_with("<svg"));
        assert!(svg.trim_end().ends_with("</svg>"));
        // background rect is not a leaf
        assert_eq!(svg.matches("<rect ").count() - 1, tree.leaf_count());
        assert_eq!(svg.matches("<circle ").count(), 3);
        assert!(svg.contains(">Quadtree</text>"));
    }

    #[test]
    fn given_root_corner_when_mapping_then_lands_on_margin() {
        let style = SvgStyle {
            width: 200,
            height: 100,
            point_radius: 1.0,
            margin: 10.0,
        };
        let view = Viewport::new(Region::new(0.0, 0.0, 2.0, 1.0), &style);

        assert_eq!(view.x(0.0), 10.0);
        assert_eq!(view.y(0.0), 90.0);
        assert_eq!(view.x(2.0), 190.0);
        assert_eq!(view.y(1.0), 10.0);
    }
}
