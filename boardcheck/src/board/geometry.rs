//! Geometry primitives for contact testing
//!
//! Every copper feature is reduced to a [`Shape`]: a core set (a segment, a
//! circular arc or a filled region) swept by a radius. The edge-to-edge gap
//! between two shapes is the distance between their cores minus both radii,
//! so a negative gap is an overlap. Growing a feature only changes its
//! radius, which keeps bloat/shrink tests cheap. Arcs stay exact and are
//! never flattened to chords.

use std::f64::consts::{FRAC_PI_2, PI, TAU};

/// A point in floating-point board units
pub type Vec2 = [f64; 2];

/// Upper bound on contact samples taken along a single segment or arc
const MAX_SAMPLES_PER_SEGMENT: usize = 64;

/// Slack on angle comparisons, in radians
const ANGLE_EPSILON: f64 = 1e-12;

/// Circular arc, angles in radians, counter-clockwise positive
///
/// Always stored with a sweep in `[0, 2π]` starting at `start` in `[0, 2π)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ArcCore {
    pub center: Vec2,
    pub radius: f64,
    pub start: f64,
    pub sweep: f64,
}

impl ArcCore {
    /// Arc from board angles in degrees
    ///
    /// Sweeps are reduced modulo 360 with a whole turn kept as a full
    /// circle; a negative sweep runs from its far end instead. Non-finite
    /// angles collapse to zero.
    pub fn from_degrees(center: Vec2, radius: f64, start_deg: f64, delta_deg: f64) -> Self {
        let finite = |v: f64| if v.is_finite() { v } else { 0.0 };
        let (mut start, delta) = (finite(start_deg), finite(delta_deg));
        let mut sweep = delta % 360.0;
        if sweep == 0.0 && delta != 0.0 {
            sweep = 360.0;
        }
        if sweep < 0.0 {
            start += sweep;
            sweep = -sweep;
        }
        Self {
            center,
            radius: finite(radius).abs(),
            start: start.rem_euclid(360.0).to_radians() % TAU,
            sweep: sweep.to_radians(),
        }
    }

    pub fn point_at(&self, angle: f64) -> Vec2 {
        [
            self.center[0] + self.radius * angle.cos(),
            self.center[1] + self.radius * angle.sin(),
        ]
    }

    pub fn endpoints(&self) -> [Vec2; 2] {
        [self.point_at(self.start), self.point_at(self.start + self.sweep)]
    }

    /// Whether the ray from the center at `angle` crosses the arc
    pub fn contains_angle(&self, angle: f64) -> bool {
        self.sweep >= TAU - ANGLE_EPSILON
            || (angle - self.start).rem_euclid(TAU) <= self.sweep + ANGLE_EPSILON
    }

    fn angle_of(&self, p: Vec2) -> f64 {
        (p[1] - self.center[1]).atan2(p[0] - self.center[0])
    }

    pub fn distance_to_point(&self, p: Vec2) -> f64 {
        let from_center = distance(p, self.center);
        if from_center == 0.0 || self.contains_angle(self.angle_of(p)) {
            return (from_center - self.radius).abs();
        }
        let [a, b] = self.endpoints();
        distance(p, a).min(distance(p, b))
    }

    /// Exact segment-to-arc distance
    ///
    /// The minimum is reached at a segment end, an arc end, the foot of the
    /// perpendicular from the center, a crossing of the circle or a crossing
    /// of the rays bounding the arc, so only those points are evaluated.
    pub fn distance_to_segment(&self, a: Vec2, b: Vec2) -> f64 {
        let [e1, e2] = self.endpoints();
        let mut min = point_segment_distance(e1, a, b).min(point_segment_distance(e2, a, b));

        let d = [b[0] - a[0], b[1] - a[1]];
        let len2 = d[0] * d[0] + d[1] * d[1];
        let mut params = vec![0.0, 1.0];
        if len2 > 0.0 {
            let ac = [a[0] - self.center[0], a[1] - self.center[1]];
            params.push(-(ac[0] * d[0] + ac[1] * d[1]) / len2);

            let half_b = ac[0] * d[0] + ac[1] * d[1];
            let c = ac[0] * ac[0] + ac[1] * ac[1] - self.radius * self.radius;
            let disc = half_b * half_b - len2 * c;
            if disc >= 0.0 {
                let root = disc.sqrt();
                params.push((-half_b - root) / len2);
                params.push((-half_b + root) / len2);
            }

            for angle in [self.start, self.start + self.sweep] {
                let u = [angle.cos(), angle.sin()];
                let denom = d[0] * u[1] - d[1] * u[0];
                if denom != 0.0 {
                    params.push((ac[1] * u[0] - ac[0] * u[1]) / denom);
                }
            }
        }

        for t in params {
            if (0.0..=1.0).contains(&t) {
                min = min.min(self.distance_to_point([a[0] + d[0] * t, a[1] + d[1] * t]));
            }
        }
        min
    }

    /// Exact arc-to-arc distance
    pub fn distance_to_arc(&self, other: &ArcCore) -> f64 {
        let mut min = f64::MAX;
        for p in self.endpoints() {
            min = min.min(other.distance_to_point(p));
        }
        for p in other.endpoints() {
            min = min.min(self.distance_to_point(p));
        }

        let between = distance(self.center, other.center);
        if between == 0.0 {
            return min;
        }
        let toward = other.angle_of(self.center) + PI;
        for angle in [toward, toward + PI] {
            if self.contains_angle(angle) {
                min = min.min(other.distance_to_point(self.point_at(angle)));
            }
            let back = angle + PI;
            if other.contains_angle(back) {
                min = min.min(self.distance_to_point(other.point_at(back)));
            }
        }

        // crossing circles: zero when a crossing lies on both arcs
        let (r1, r2) = (self.radius, other.radius);
        if between <= r1 + r2 && between >= (r1 - r2).abs() {
            let along = (r1 * r1 - r2 * r2 + between * between) / (2.0 * between);
            let spread = (r1 * r1 - along * along).max(0.0).sqrt().atan2(along);
            for angle in [toward - spread, toward + spread] {
                let p = self.point_at(angle);
                if self.contains_angle(angle) && other.contains_angle(other.angle_of(p)) {
                    return 0.0;
                }
            }
        }
        min
    }

    /// Points bounding the arc: its ends plus every axis extreme it passes
    pub fn extremes(&self) -> Vec<Vec2> {
        let mut out = self.endpoints().to_vec();
        for quarter in 0..4 {
            let angle = quarter as f64 * FRAC_PI_2;
            if self.contains_angle(angle) {
                out.push(self.point_at(angle));
            }
        }
        out
    }

    pub fn length(&self) -> f64 {
        self.radius * self.sweep
    }
}

/// Piece of a core boundary
#[derive(Debug, Clone, Copy)]
enum Piece {
    Segment(Vec2, Vec2),
    Arc(ArcCore),
}

impl Piece {
    fn distance(&self, other: &Piece) -> f64 {
        match (self, other) {
            (Piece::Segment(a1, a2), Piece::Segment(b1, b2)) => segment_distance(*a1, *a2, *b1, *b2),
            (Piece::Segment(a, b), Piece::Arc(arc)) | (Piece::Arc(arc), Piece::Segment(a, b)) => {
                arc.distance_to_segment(*a, *b)
            }
            (Piece::Arc(a), Piece::Arc(b)) => a.distance_to_arc(b),
        }
    }

    fn distance_to_point(&self, p: Vec2) -> f64 {
        match self {
            Piece::Segment(a, b) => point_segment_distance(p, *a, *b),
            Piece::Arc(arc) => arc.distance_to_point(p),
        }
    }
}

/// Core set of a shape, before the radius is applied
#[derive(Debug, Clone, PartialEq)]
pub enum Core {
    /// Straight segment; a point when both ends coincide
    Segment(Vec2, Vec2),
    Arc(ArcCore),
    /// Closed, filled polygon
    Region(Vec<Vec2>),
}

impl Core {
    fn pieces(&self) -> Vec<Piece> {
        match self {
            Core::Segment(a, b) => vec![Piece::Segment(*a, *b)],
            Core::Arc(arc) => vec![Piece::Arc(*arc)],
            Core::Region(points) => polygon_edges(points)
                .into_iter()
                .map(|(a, b)| Piece::Segment(a, b))
                .collect(),
        }
    }

    fn region(&self) -> Option<&[Vec2]> {
        match self {
            Core::Region(points) if points.len() >= 3 => Some(points),
            _ => None,
        }
    }

    fn vertices(&self) -> Vec<Vec2> {
        match self {
            Core::Segment(a, b) => vec![*a, *b],
            Core::Region(points) => points.clone(),
            Core::Arc(arc) => arc.endpoints().to_vec(),
        }
    }

    /// Corners of the axis-aligned box around the core, `None` when empty
    pub fn extent(&self) -> Option<(Vec2, Vec2)> {
        let points = match self {
            Core::Arc(arc) => arc.extremes(),
            _ => self.vertices(),
        };
        let first = *points.first()?;
        Some(points.iter().fold((first, first), |(lo, hi), p| {
            ([lo[0].min(p[0]), lo[1].min(p[1])], [hi[0].max(p[0]), hi[1].max(p[1])])
        }))
    }

    /// Distance between two cores, zero when they intersect or one contains the other
    pub fn distance(&self, other: &Core) -> f64 {
        if let Some(region) = self.region() {
            if other.vertices().iter().any(|p| point_in_polygon(*p, region)) {
                return 0.0;
            }
        }
        if let Some(region) = other.region() {
            if self.vertices().iter().any(|p| point_in_polygon(*p, region)) {
                return 0.0;
            }
        }

        let theirs = other.pieces();
        let mut min = f64::MAX;
        for a in self.pieces() {
            for b in &theirs {
                min = min.min(a.distance(b));
                if min == 0.0 {
                    return 0.0;
                }
            }
        }
        min
    }

    /// Distance from a point to the core
    pub fn distance_to_point(&self, p: Vec2) -> f64 {
        if let Some(region) = self.region() {
            if point_in_polygon(p, region) {
                return 0.0;
            }
        }
        self.pieces()
            .iter()
            .map(|piece| piece.distance_to_point(p))
            .fold(f64::MAX, f64::min)
    }

    /// Points spread along the core no further than `spacing` apart
    pub fn samples(&self, spacing: f64) -> Vec<Vec2> {
        let spacing = spacing.max(1.0);
        let mut out = Vec::new();
        for piece in self.pieces() {
            match piece {
                Piece::Segment(a, b) => {
                    let steps = sample_steps(distance(a, b), spacing);
                    for i in 0..=steps {
                        let t = i as f64 / steps as f64;
                        out.push([a[0] + (b[0] - a[0]) * t, a[1] + (b[1] - a[1]) * t]);
                    }
                }
                Piece::Arc(arc) => {
                    let steps = sample_steps(arc.length(), spacing);
                    for i in 0..=steps {
                        out.push(arc.point_at(arc.start + arc.sweep * i as f64 / steps as f64));
                    }
                }
            }
        }
        out
    }
}

fn sample_steps(len: f64, spacing: f64) -> usize {
    let steps = (len / spacing).ceil();
    if steps.is_finite() {
        (steps as usize).clamp(1, MAX_SAMPLES_PER_SEGMENT)
    } else {
        MAX_SAMPLES_PER_SEGMENT
    }
}

/// A core swept by a radius
#[derive(Debug, Clone, PartialEq)]
pub struct Shape {
    pub core: Core,
    pub radius: f64,
}

impl Shape {
    pub fn new(core: Core, radius: f64) -> Self {
        Self { core, radius }
    }

    /// Round-ended stroke between two points
    pub fn stroke(a: Vec2, b: Vec2, width: f64) -> Self {
        Self::new(Core::Segment(a, b), width / 2.0)
    }

    /// Disc of the given diameter
    pub fn disc(center: Vec2, diameter: f64) -> Self {
        Self::new(Core::Segment(center, center), diameter / 2.0)
    }

    /// Axis-aligned rectangle
    pub fn rect(min: Vec2, max: Vec2) -> Self {
        Self::new(
            Core::Region(vec![
                [min[0], min[1]],
                [max[0], min[1]],
                [max[0], max[1]],
                [min[0], max[1]],
            ]),
            0.0,
        )
    }

    /// Rectangle of the given width around the segment `a`-`b`, square ends
    /// extended by half the width past each endpoint
    pub fn oriented_rect(a: Vec2, b: Vec2, width: f64) -> Self {
        let h = width / 2.0;
        let len = distance(a, b);
        if len == 0.0 {
            return Self::rect([a[0] - h, a[1] - h], [a[0] + h, a[1] + h]);
        }
        let u = [(b[0] - a[0]) / len * h, (b[1] - a[1]) / len * h];
        let n = [-u[1], u[0]];
        Self::new(
            Core::Region(vec![
                [a[0] - u[0] - n[0], a[1] - u[1] - n[1]],
                [b[0] + u[0] - n[0], b[1] + u[1] - n[1]],
                [b[0] + u[0] + n[0], b[1] + u[1] + n[1]],
                [a[0] - u[0] + n[0], a[1] - u[1] + n[1]],
            ]),
            0.0,
        )
    }

    /// Corners of the axis-aligned box around the swept shape
    pub fn extent(&self) -> Option<(Vec2, Vec2)> {
        let (lo, hi) = self.core.extent()?;
        let r = self.radius.max(0.0);
        Some(([lo[0] - r, lo[1] - r], [hi[0] + r, hi[1] + r]))
    }

    /// Edge-to-edge gap; negative when the shapes overlap
    pub fn gap(&self, other: &Shape) -> f64 {
        self.core.distance(&other.core) - self.radius - other.radius
    }

    /// Shape grown by `delta` in total width (half of it on each side)
    pub fn inflated(&self, delta: f64) -> Shape {
        Shape {
            core: self.core.clone(),
            radius: self.radius + delta / 2.0,
        }
    }
}

pub fn distance(a: Vec2, b: Vec2) -> f64 {
    ((a[0] - b[0]).powi(2) + (a[1] - b[1]).powi(2)).sqrt()
}

/// Point-to-segment minimum distance
pub fn point_segment_distance(p: Vec2, a: Vec2, b: Vec2) -> f64 {
    let ab = [b[0] - a[0], b[1] - a[1]];
    let ap = [p[0] - a[0], p[1] - a[1]];
    let ab_len2 = ab[0] * ab[0] + ab[1] * ab[1];

    if ab_len2 == 0.0 {
        return distance(p, a);
    }

    let t = ((ap[0] * ab[0] + ap[1] * ab[1]) / ab_len2).clamp(0.0, 1.0);
    distance(p, [a[0] + t * ab[0], a[1] + t * ab[1]])
}

fn cross(o: Vec2, a: Vec2, b: Vec2) -> f64 {
    (a[0] - o[0]) * (b[1] - o[1]) - (a[1] - o[1]) * (b[0] - o[0])
}

/// Whether two closed segments share at least one point
pub fn segments_intersect(a1: Vec2, a2: Vec2, b1: Vec2, b2: Vec2) -> bool {
    let d1 = cross(b1, b2, a1);
    let d2 = cross(b1, b2, a2);
    let d3 = cross(a1, a2, b1);
    let d4 = cross(a1, a2, b2);

    if ((d1 > 0.0 && d2 < 0.0) || (d1 < 0.0 && d2 > 0.0))
        && ((d3 > 0.0 && d4 < 0.0) || (d3 < 0.0 && d4 > 0.0))
    {
        return true;
    }

    // Collinear and touching cases
    (d1 == 0.0 && point_segment_distance(a1, b1, b2) == 0.0)
        || (d2 == 0.0 && point_segment_distance(a2, b1, b2) == 0.0)
        || (d3 == 0.0 && point_segment_distance(b1, a1, a2) == 0.0)
        || (d4 == 0.0 && point_segment_distance(b2, a1, a2) == 0.0)
}

/// Segment-to-segment minimum distance
pub fn segment_distance(a1: Vec2, a2: Vec2, b1: Vec2, b2: Vec2) -> f64 {
    if segments_intersect(a1, a2, b1, b2) {
        return 0.0;
    }
    point_segment_distance(a1, b1, b2)
        .min(point_segment_distance(a2, b1, b2))
        .min(point_segment_distance(b1, a1, a2))
        .min(point_segment_distance(b2, a1, a2))
}

/// Even-odd point-in-polygon test; points on the boundary count as inside
pub fn point_in_polygon(p: Vec2, polygon: &[Vec2]) -> bool {
    if polygon.len() < 3 {
        return false;
    }
    let mut inside = false;
    let mut j = polygon.len() - 1;
    for i in 0..polygon.len() {
        let (pi, pj) = (polygon[i], polygon[j]);
        if point_segment_distance(p, pi, pj) == 0.0 {
            return true;
        }
        if (pi[1] > p[1]) != (pj[1] > p[1]) {
            let x = pj[0] + (p[1] - pj[1]) * (pi[0] - pj[0]) / (pi[1] - pj[1]);
            if p[0] < x {
                inside = !inside;
            }
        }
        j = i;
    }
    inside
}

fn polygon_edges(points: &[Vec2]) -> Vec<(Vec2, Vec2)> {
    match points.len() {
        0 => vec![],
        1 => vec![(points[0], points[0])],
        n => (0..n).map(|i| (points[i], points[(i + 1) % n])).collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_point_segment_distance() {
        let d = point_segment_distance([0.0, 1.0], [0.0, 0.0], [2.0, 0.0]);
        assert!((d - 1.0).abs() < 1e-9);
        let d = point_segment_distance([3.0, 0.0], [0.0, 0.0], [2.0, 0.0]);
        assert!((d - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_crossing_segments_have_zero_distance() {
        assert_eq!(segment_distance([0.0, 0.0], [2.0, 2.0], [0.0, 2.0], [2.0, 0.0]), 0.0);
        assert!(segments_intersect([0.0, 0.0], [2.0, 0.0], [1.0, 0.0], [3.0, 0.0]));
        assert!(!segments_intersect([0.0, 0.0], [1.0, 0.0], [2.0, 0.0], [3.0, 0.0]));
    }

    #[test]
    fn test_parallel_strokes_gap() {
        let a = Shape::stroke([0.0, 0.0], [100.0, 0.0], 4.0);
        let b = Shape::stroke([0.0, 12.0], [100.0, 12.0], 4.0);
        assert!((a.gap(&b) - 8.0).abs() < 1e-9);
        assert!((a.inflated(4.0).gap(&b) - 6.0).abs() < 1e-9);
    }

    #[test]
    fn test_point_in_polygon() {
        let square = vec![[0.0, 0.0], [10.0, 0.0], [10.0, 10.0], [0.0, 10.0]];
        assert!(point_in_polygon([5.0, 5.0], &square));
        assert!(point_in_polygon([10.0, 5.0], &square));
        assert!(!point_in_polygon([11.0, 5.0], &square));
    }

    #[test]
    fn test_stroke_inside_region_touches() {
        let region = Shape::rect([0.0, 0.0], [100.0, 100.0]);
        let inside = Shape::stroke([10.0, 10.0], [20.0, 10.0], 2.0);
        assert!(inside.gap(&region) < 0.0);

        let outside = Shape::stroke([110.0, 10.0], [120.0, 10.0], 2.0);
        assert!((outside.gap(&region) - 9.0).abs() < 1e-9);
    }

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-6
    }

    #[test]
    fn test_arc_sweep_is_normalised() {
        let full = ArcCore::from_degrees([0.0, 0.0], 10.0, 0.0, 720.0);
        assert!(close(full.sweep, TAU));

        let backwards = ArcCore::from_degrees([0.0, 0.0], 10.0, 0.0, -90.0);
        assert!(close(backwards.start, 270f64.to_radians()));
        assert!(close(backwards.sweep, FRAC_PI_2));

        let huge = ArcCore::from_degrees([0.0, 0.0], 10.0, 0.0, 1.0e13);
        assert!(huge.sweep >= 0.0 && huge.sweep <= TAU);

        let bad = ArcCore::from_degrees([0.0, 0.0], 10.0, f64::NAN, f64::INFINITY);
        assert_eq!(bad.start, 0.0);
        assert_eq!(bad.sweep, 0.0);
    }

    #[test]
    fn test_point_to_arc_distance() {
        let arc = ArcCore::from_degrees([0.0, 0.0], 10.0, 0.0, 90.0);
        assert!(close(arc.distance_to_point([20.0, 0.0]), 10.0));
        assert!(close(arc.distance_to_point([0.0, 0.0]), 10.0));
        // outside the sweep the nearest end wins
        assert!(close(arc.distance_to_point([0.0, -5.0]), 125f64.sqrt()));
    }

    #[test]
    fn test_arc_is_exact_between_chord_ends() {
        let arc = Shape::new(
            Core::Arc(ArcCore::from_degrees([0.0, 0.0], 20_000_000.0, 0.0, 90.0)),
            100_000.0,
        );
        let angle = 2.5f64.to_radians();
        let at = 20_000_000.0 + 100_000.0 + 95_000.0 + 50_000.0;
        let via = Shape::disc([at * angle.cos(), at * angle.sin()], 100_000.0);
        assert!((arc.gap(&via) - 95_000.0).abs() < 1.0);
    }

    #[test]
    fn test_segment_to_arc_distance() {
        let upper = ArcCore::from_degrees([0.0, 0.0], 10.0, 0.0, 180.0);
        assert!(close(upper.distance_to_segment([-5.0, 15.0], [5.0, 15.0]), 5.0));
        assert!(upper.distance_to_segment([0.0, 0.0], [0.0, 20.0]) < 1e-9);

        let quarter = ArcCore::from_degrees([0.0, 0.0], 10.0, 0.0, 90.0);
        let d = quarter.distance_to_segment([-20.0, -5.0], [-20.0, 5.0]);
        assert!(close(d, 425f64.sqrt()));
    }

    #[test]
    fn test_arc_to_arc_distance() {
        let inner = ArcCore::from_degrees([0.0, 0.0], 10.0, 0.0, 90.0);
        let outer = ArcCore::from_degrees([0.0, 0.0], 15.0, 0.0, 90.0);
        assert!(close(inner.distance_to_arc(&outer), 5.0));

        let right = ArcCore::from_degrees([0.0, 0.0], 10.0, -90.0, 180.0);
        let left = ArcCore::from_degrees([30.0, 0.0], 10.0, 90.0, 180.0);
        assert!(close(right.distance_to_arc(&left), 10.0));

        let a = ArcCore::from_degrees([0.0, 0.0], 10.0, 0.0, 360.0);
        let b = ArcCore::from_degrees([15.0, 0.0], 10.0, 0.0, 360.0);
        assert!(a.distance_to_arc(&b) < 1e-9);
    }

    #[test]
    fn test_arc_extent_includes_axis_extremes() {
        let arc = Core::Arc(ArcCore::from_degrees([0.0, 0.0], 10.0, 45.0, 90.0));
        let (lo, hi) = arc.extent().unwrap();
        let r = 50f64.sqrt();
        assert!(close(lo[0], -r) && close(hi[0], r));
        assert!(close(lo[1], r) && close(hi[1], 10.0));
    }

    #[test]
    fn test_oriented_rect_follows_the_diagonal() {
        let pad = Shape::oriented_rect([0.0, 0.0], [100.0, 100.0], 20.0);
        // inside the axis-aligned box, but 14 units off the pad axis
        assert!(pad.gap(&Shape::disc([60.0, 40.0], 0.0)) > 0.0);
        assert!(pad.gap(&Shape::disc([55.0, 45.0], 0.0)) <= 0.0);
        assert!(pad.gap(&Shape::disc([-5.0, -5.0], 0.0)) <= 0.0);
    }

    #[test]
    fn test_samples_cover_both_ends() {
        let core = Core::Segment([0.0, 0.0], [100.0, 0.0]);
        let samples = core.samples(10.0);
        assert_eq!(samples.first().copied(), Some([0.0, 0.0]));
        assert_eq!(samples.last().copied(), Some([100.0, 0.0]));
        assert_eq!(samples.len(), 11);
    }
}
