//! Uniform view over the copper features a scan works on

use super::geometry::{Core, Shape};
use super::{Arc, BoundingBox, Coord, Line, ObjectFlags, ObjectKind, Pad, Pin, Point, Polygon};

/// Borrowed copper feature
#[derive(Debug, Clone, Copy)]
pub enum CopperRef<'a> {
    Line(&'a Line),
    Arc(&'a Arc),
    Pin(&'a Pin),
    Pad(&'a Pad),
    Via(&'a Pin),
    Polygon(&'a Polygon),
}

impl<'a> CopperRef<'a> {
    pub fn kind(&self) -> ObjectKind {
        match self {
            CopperRef::Line(_) => ObjectKind::Line,
            CopperRef::Arc(_) => ObjectKind::Arc,
            CopperRef::Pin(_) => ObjectKind::Pin,
            CopperRef::Pad(_) => ObjectKind::Pad,
            CopperRef::Via(_) => ObjectKind::Via,
            CopperRef::Polygon(_) => ObjectKind::Polygon,
        }
    }

    pub fn flags(&self) -> &'a ObjectFlags {
        match self {
            CopperRef::Line(o) => &o.flags,
            CopperRef::Arc(o) => &o.flags,
            CopperRef::Pin(o) | CopperRef::Via(o) => &o.flags,
            CopperRef::Pad(o) => &o.flags,
            CopperRef::Polygon(o) => &o.flags,
        }
    }

    /// Clearance kept free around this feature inside clearing polygons
    pub fn clearance(&self) -> Coord {
        match self {
            CopperRef::Line(o) => o.clearance,
            CopperRef::Arc(o) => o.clearance,
            CopperRef::Pin(o) | CopperRef::Via(o) => o.clearance,
            CopperRef::Pad(o) => o.clearance,
            CopperRef::Polygon(_) => 0,
        }
    }

    /// Stroke width or outer diameter; polygons have none
    pub fn width(&self) -> Option<Coord> {
        match self {
            CopperRef::Line(o) => Some(o.thickness),
            CopperRef::Arc(o) => Some(o.thickness),
            CopperRef::Pin(o) | CopperRef::Via(o) => Some(o.thickness),
            CopperRef::Pad(o) => Some(o.thickness),
            CopperRef::Polygon(_) => None,
        }
    }

    /// Copper outline
    pub fn shape(&self) -> Shape {
        match self {
            CopperRef::Line(l) => Shape::stroke(l.point1.to_vec2(), l.point2.to_vec2(), l.thickness as f64),
            CopperRef::Arc(a) => Shape::new(Core::Arc(a.core()), a.thickness as f64 / 2.0),
            CopperRef::Pin(p) | CopperRef::Via(p) => {
                let c = p.position.to_vec2();
                if p.flags.square {
                    let h = p.thickness as f64 / 2.0;
                    Shape::rect([c[0] - h, c[1] - h], [c[0] + h, c[1] + h])
                } else {
                    Shape::disc(c, p.thickness as f64)
                }
            }
            CopperRef::Pad(p) => {
                if p.flags.square {
                    Shape::oriented_rect(p.point1.to_vec2(), p.point2.to_vec2(), p.thickness as f64)
                } else {
                    Shape::stroke(p.point1.to_vec2(), p.point2.to_vec2(), p.thickness as f64)
                }
            }
            CopperRef::Polygon(p) => {
                Shape::new(Core::Region(p.points.iter().map(|pt| pt.to_vec2()).collect()), 0.0)
            }
        }
    }

    /// Outline grown by `delta` in total width
    pub fn inflated_by(&self, delta: Coord) -> Shape {
        self.shape().inflated(delta as f64)
    }

    /// Copper bounding box, clearance not included
    pub fn bounding_box(&self) -> BoundingBox {
        match self.shape().extent() {
            Some((lo, hi)) => BoundingBox::new(
                lo[0].floor() as Coord,
                lo[1].floor() as Coord,
                hi[0].ceil() as Coord,
                hi[1].ceil() as Coord,
            ),
            None => BoundingBox::new(0, 0, 0, 0),
        }
    }

    /// Whether this feature cuts its own clearance hole into `polygon`
    ///
    /// A polygon is only cut when it carries `clear_poly`; lines and arcs then
    /// need `clear_line`, pins, pads and vias a positive clearance.
    pub fn clears(&self, polygon: &Polygon) -> bool {
        if !polygon.flags.clear_poly {
            return false;
        }
        match self {
            CopperRef::Line(_) | CopperRef::Arc(_) => self.flags().clear_line,
            CopperRef::Pin(_) | CopperRef::Via(_) | CopperRef::Pad(_) => self.clearance() > 0,
            CopperRef::Polygon(_) => false,
        }
    }

    /// Representative point for reports
    pub fn location(&self) -> Point {
        match self {
            CopperRef::Line(l) => Point::midpoint(l.point1, l.point2),
            CopperRef::Arc(a) => a.center,
            CopperRef::Pin(p) | CopperRef::Via(p) => p.position,
            CopperRef::Pad(p) => Point::midpoint(p.point1, p.point2),
            CopperRef::Polygon(_) => self.bounding_box().center(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(clear_line: bool) -> Line {
        Line {
            id: 1,
            point1: Point::new(0, 0),
            point2: Point::new(100, 0),
            thickness: 10,
            clearance: 20,
            flags: ObjectFlags {
                clear_line,
                ..Default::default()
            },
        }
    }

    fn poly(clear_poly: bool) -> Polygon {
        Polygon {
            id: 2,
            points: vec![Point::new(0, 0), Point::new(10, 0), Point::new(10, 10)],
            flags: ObjectFlags {
                clear_poly,
                ..Default::default()
            },
        }
    }

    #[test]
    fn test_clears_needs_both_flags() {
        assert!(CopperRef::Line(&line(true)).clears(&poly(true)));
        assert!(!CopperRef::Line(&line(true)).clears(&poly(false)));
        assert!(!CopperRef::Line(&line(false)).clears(&poly(true)));
    }

    #[test]
    fn test_line_box_excludes_clearance() {
        let l = line(false);
        assert_eq!(CopperRef::Line(&l).bounding_box(), BoundingBox::new(-5, -5, 105, 5));
    }

    #[test]
    fn test_inflation_grows_radius_by_half() {
        let l = line(false);
        let shape = CopperRef::Line(&l).inflated_by(8);
        assert!((shape.radius - 9.0).abs() < 1e-9);
    }

    #[test]
    fn test_arc_box_reaches_the_top_of_the_sweep() {
        let a = Arc {
            id: 3,
            center: Point::new(0, 0),
            radius: 100,
            start_angle: 45.0,
            delta_angle: 90.0,
            thickness: 10,
            clearance: 0,
            flags: ObjectFlags::default(),
        };
        assert_eq!(CopperRef::Arc(&a).bounding_box(), BoundingBox::new(-76, 65, 76, 105));
    }

    #[test]
    fn test_square_pad_box_covers_rotated_corners() {
        let pad = Pad {
            id: 4,
            number: "1".to_string(),
            point1: Point::new(0, 0),
            point2: Point::new(100, 100),
            thickness: 20,
            clearance: 0,
            flags: ObjectFlags {
                square: true,
                ..Default::default()
            },
        };
        // corners stick out 10 * sqrt(2) past each endpoint
        assert_eq!(CopperRef::Pad(&pad).bounding_box(), BoundingBox::new(-15, -15, 115, 115));
    }

    #[test]
    fn test_polygon_location_is_box_center() {
        let p = poly(false);
        assert_eq!(CopperRef::Polygon(&p).location(), Point::new(5, 5));
    }
}
