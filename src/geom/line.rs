use super::core::{
    ACCURACY_POINT_ON_LINE, BBox2, Point2, Tolerance, Vec2, fuzzy_eq, fuzzy_is_null,
    normalize_angle,
};

/// Line segment with screen-space angle conventions.
///
/// Angles are in degrees, counter-clockwise as seen on screen (y down), in
/// `[0, 360)`. Changing the angle keeps the length and the first point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Line2 {
    pub p1: Point2,
    pub p2: Point2,
}

/// Result of intersecting two lines.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LineIntersection {
    /// The lines are parallel or degenerate.
    None,
    /// Crossing lies on both segments.
    Bounded(Point2),
    /// Crossing lies on the infinite extension of at least one segment.
    Unbounded(Point2),
}

impl LineIntersection {
    #[must_use]
    pub const fn point(self) -> Option<Point2> {
        match self {
            Self::None => None,
            Self::Bounded(p) | Self::Unbounded(p) => Some(p),
        }
    }

    #[must_use]
    pub const fn is_bounded(self) -> bool {
        matches!(self, Self::Bounded(_))
    }
}

impl Line2 {
    #[must_use]
    pub const fn new(p1: Point2, p2: Point2) -> Self {
        Self { p1, p2 }
    }

    /// Line starting at `origin` with the given screen angle and length.
    #[must_use]
    pub fn from_polar(origin: Point2, degrees: f64, length: f64) -> Self {
        Self::new(origin, origin.polar(degrees, length))
    }

    #[must_use]
    pub fn delta(self) -> Vec2 {
        self.p2 - self.p1
    }

    #[must_use]
    pub fn length(self) -> f64 {
        self.delta().length()
    }

    #[must_use]
    pub fn angle(self) -> f64 {
        self.delta().angle()
    }

    /// Angle needed to turn this line onto `other`, in `[0, 360)`.
    #[must_use]
    pub fn angle_to(self, other: Self) -> f64 {
        let delta = other.angle() - self.angle();
        let normalized = if delta < 0.0 { delta + 360.0 } else { delta };
        if fuzzy_eq(normalized, 360.0) { 0.0 } else { normalized }
    }

    #[must_use]
    pub fn with_angle(self, degrees: f64) -> Self {
        Self::from_polar(self.p1, degrees, self.length())
    }

    /// Keeps direction. A zero-length line stays degenerate.
    #[must_use]
    pub fn with_length(self, length: f64) -> Self {
        match self.delta().normalized() {
            Some(u) => Self::new(self.p1, self.p1 + u * length),
            None => self,
        }
    }

    #[must_use]
    pub fn point_at(self, t: f64) -> Point2 {
        self.p1.lerp(self.p2, t)
    }

    #[must_use]
    pub fn midpoint(self) -> Point2 {
        self.p1.midpoint(self.p2)
    }

    #[must_use]
    pub fn reversed(self) -> Self {
        Self::new(self.p2, self.p1)
    }

    #[must_use]
    pub fn translated(self, v: Vec2) -> Self {
        Self::new(self.p1 + v, self.p2 + v)
    }

    #[must_use]
    pub fn unit_vector(self) -> Option<Vec2> {
        self.delta().normalized()
    }

    /// Intersect the two lines treating each as a segment for the bounded
    /// classification.
    #[must_use]
    pub fn intersect(self, other: Self) -> LineIntersection {
        let a = self.p2 - self.p1;
        let b = other.p1 - other.p2;
        let c = self.p1 - other.p1;
        let denominator = a.y * b.x - a.x * b.y;
        if denominator == 0.0 || !denominator.is_finite() {
            return LineIntersection::None;
        }
        let reciprocal = 1.0 / denominator;
        let na = (b.y * c.x - b.x * c.y) * reciprocal;
        let point = self.p1 + a * na;
        if !(0.0..=1.0).contains(&na) {
            return LineIntersection::Unbounded(point);
        }
        let nb = (a.x * c.y - a.y * c.x) * reciprocal;
        if !(0.0..=1.0).contains(&nb) {
            return LineIntersection::Unbounded(point);
        }
        LineIntersection::Bounded(point)
    }

    /// Foot of the perpendicular from `p` onto the infinite line.
    #[must_use]
    pub fn project(self, p: Point2) -> Point2 {
        let d = self.delta();
        let len2 = d.length_squared();
        if len2 <= Tolerance::ZERO_LENGTH.eps_squared() {
            return self.p1;
        }
        self.p1 + d * ((p - self.p1).dot(d) / len2)
    }

    #[must_use]
    pub fn closest_point_on_segment(self, p: Point2) -> Point2 {
        let d = self.delta();
        let len2 = d.length_squared();
        if len2 <= Tolerance::ZERO_LENGTH.eps_squared() {
            return self.p1;
        }
        let t = ((p - self.p1).dot(d) / len2).clamp(0.0, 1.0);
        self.point_at(t)
    }

    /// Perpendicular distance from `p` to the infinite line.
    #[must_use]
    pub fn distance_to_point(self, p: Point2) -> f64 {
        let len = self.length();
        if fuzzy_is_null(len) {
            return p.distance_to(self.p1);
        }
        self.delta().cross(p - self.p1).abs() / len
    }
}

/// `true` when `p` lies on the infinite line within `accuracy`.
#[must_use]
pub fn is_point_on_line(p: Point2, line: Line2, accuracy: f64) -> bool {
    line.distance_to_point(p) <= accuracy
}

/// `true` when `p` lies on the segment within `accuracy`.
#[must_use]
pub fn is_point_on_segment(p: Point2, line: Line2, accuracy: f64) -> bool {
    if !BBox2::new(line.p1, line.p2).expand_by(accuracy).contains(p) {
        return false;
    }
    line.distance_to_point(p) <= accuracy
}

#[must_use]
pub fn is_point_on_segment_default(p: Point2, line: Line2) -> bool {
    is_point_on_segment(p, line, ACCURACY_POINT_ON_LINE)
}

/// Intersections of an infinite line with a circle, ordered along the line.
#[must_use]
pub fn line_intersect_circle(center: Point2, radius: f64, line: Line2) -> Vec<Point2> {
    let radius = radius.abs();
    let foot = line.project(center);
    let d = foot.distance_to(center);
    if d > radius + Tolerance::DEFAULT.eps {
        return Vec::new();
    }
    let Some(u) = line.unit_vector() else {
        return Vec::new();
    };
    let half = (radius * radius - d * d).max(0.0).sqrt();
    if fuzzy_is_null(half) {
        return vec![foot];
    }
    vec![foot - u * half, foot + u * half]
}

/// Intersections of two circles. Concentric or disjoint circles give none.
#[must_use]
pub fn circles_intersect(c1: Point2, r1: f64, c2: Point2, r2: f64) -> Vec<Point2> {
    let (r1, r2) = (r1.abs(), r2.abs());
    let d = c1.distance_to(c2);
    let eps = Tolerance::DEFAULT.eps;
    if fuzzy_is_null(d) || d > r1 + r2 + eps || d < (r1 - r2).abs() - eps {
        return Vec::new();
    }
    let a = (r1 * r1 - r2 * r2 + d * d) / (2.0 * d);
    let h = (r1 * r1 - a * a).max(0.0).sqrt();
    let u = (c2 - c1) / d;
    let base = c1 + u * a;
    if fuzzy_is_null(h) {
        return vec![base];
    }
    let n = u.perp();
    vec![base + n * h, base - n * h]
}

/// Angle between two directions in `[0, 360)`, measured from `from` to `to`.
#[must_use]
pub fn angle_between(from: f64, to: f64) -> f64 {
    normalize_angle(to - from)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_line_angle_and_length() {
        let line = Line2::new(Point2::new(0.0, 0.0), Point2::new(0.0, -10.0));
        assert!((line.angle() - 90.0).abs() < 1e-12);
        assert!((line.length() - 10.0).abs() < 1e-12);

        let turned = line.with_angle(180.0);
        assert!((turned.p2.x + 10.0).abs() < 1e-9);
        assert!(turned.p2.y.abs() < 1e-9);

        let longer = line.with_length(25.0);
        assert!((longer.p2.y + 25.0).abs() < 1e-12);
    }

    #[test]
    fn test_angle_to_wraps() {
        let a = Line2::from_polar(Point2::ORIGIN, 350.0, 1.0);
        let b = Line2::from_polar(Point2::ORIGIN, 10.0, 1.0);
        assert!((a.angle_to(b) - 20.0).abs() < 1e-9);
        assert!((b.angle_to(a) - 340.0).abs() < 1e-9);
    }

    #[test]
    fn test_intersect_kinds() {
        let h = Line2::new(Point2::new(0.0, 0.0), Point2::new(10.0, 0.0));
        let v = Line2::new(Point2::new(5.0, -5.0), Point2::new(5.0, 5.0));
        assert_eq!(h.intersect(v), LineIntersection::Bounded(Point2::new(5.0, 0.0)));

        let far = Line2::new(Point2::new(20.0, -5.0), Point2::new(20.0, 5.0));
        assert!(matches!(h.intersect(far), LineIntersection::Unbounded(_)));

        let parallel = h.translated(Vec2::new(0.0, 3.0));
        assert_eq!(h.intersect(parallel), LineIntersection::None);
    }

    #[test]
    fn test_point_on_segment() {
        let line = Line2::new(Point2::new(0.0, 0.0), Point2::new(100.0, 0.0));
        assert!(is_point_on_segment_default(Point2::new(50.0, 0.1), line));
        assert!(!is_point_on_segment_default(Point2::new(50.0, 2.0), line));
        assert!(!is_point_on_segment_default(Point2::new(110.0, 0.0), line));
        assert!(is_point_on_line(Point2::new(110.0, 0.0), line, 1e-9));
    }

    #[test]
    fn test_line_circle() {
        let line = Line2::new(Point2::new(-20.0, 0.0), Point2::new(20.0, 0.0));
        let hits = line_intersect_circle(Point2::ORIGIN, 10.0, line);
        assert_eq!(hits.len(), 2);
        assert!((hits[0].x + 10.0).abs() < 1e-9);
        assert!((hits[1].x - 10.0).abs() < 1e-9);

        let tangent = line.translated(Vec2::new(0.0, 10.0));
        assert_eq!(line_intersect_circle(Point2::ORIGIN, 10.0, tangent).len(), 1);
    }

    #[test]
    fn test_circles() {
        let hits = circles_intersect(Point2::ORIGIN, 5.0, Point2::new(8.0, 0.0), 5.0);
        assert_eq!(hits.len(), 2);
        for p in hits {
            assert!((p.x - 4.0).abs() < 1e-9);
            assert!((p.y.abs() - 3.0).abs() < 1e-9);
        }
        assert!(circles_intersect(Point2::ORIGIN, 1.0, Point2::new(8.0, 0.0), 1.0).is_empty());
    }
}
