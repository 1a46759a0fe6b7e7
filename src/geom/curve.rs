//! Shared curve behaviour and polyline helpers.
//!
//! Every curve in the kernel renders to a polyline. The queries here
//! (closest point, intersections, sub-segments, direction arrows) work on
//! that polyline, so they are available to any [`Curve2`] implementation.

use super::core::{ACCURACY_POINT_ON_LINE, BBox2, Point2, fuzzy_eq_points};
use super::error::CurveError;
use super::line::{Line2, is_point_on_segment_default};
use super::settings::{CurveSettings, curve_settings};

pub trait Curve2 {
    /// Display name used in diagnostics.
    fn name(&self) -> &str;

    /// Polyline approximation from the first point to the last.
    fn points(&self) -> Vec<Point2>;

    /// Requested approximation scale, possibly out of range.
    fn approximation_scale(&self) -> f64;

    /// Length of the curve. Arcs report a negative value when flipped.
    #[must_use]
    fn length(&self) -> f64 {
        path_length(&self.points())
    }

    #[must_use]
    fn effective_scale(&self) -> f64 {
        curve_settings().effective_scale(self.approximation_scale())
    }

    /// Closest point on the polyline whose foot falls inside a segment.
    #[must_use]
    fn closest_point(&self, p: Point2) -> Option<Point2> {
        closest_point(&self.points(), p)
    }

    /// Length from the first point up to `p`, or `None` if `p` is not on the
    /// curve.
    #[must_use]
    fn length_by_point(&self, p: Point2) -> Option<f64> {
        length_by_point(&self.points(), p)
    }

    #[must_use]
    fn intersect_line(&self, line: Line2) -> Vec<Point2> {
        curve_intersect_line(&self.points(), line)
    }

    #[must_use]
    fn is_intersect_line(&self, line: Line2) -> bool {
        !self.intersect_line(line).is_empty()
    }

    #[must_use]
    fn is_point_on_curve(&self, p: Point2) -> bool {
        is_point_on_polyline(&self.points(), p)
    }

    /// Part of the polyline between `begin` and `end`.
    ///
    /// # Errors
    /// Fails when either point is not on the curve or the result has fewer
    /// than two points.
    fn segment_points(
        &self,
        begin: Point2,
        end: Point2,
        reverse: bool,
    ) -> Result<Vec<Point2>, CurveError> {
        segment_points(&self.points(), begin, end, reverse)
    }

    /// Arrow wings at the middle of the curve pointing back along it.
    #[must_use]
    fn direction_arrows(&self, arrow_length: f64) -> Vec<DirectionArrow> {
        direction_arrows(&self.points(), arrow_length)
    }
}

/// Two short lines forming an arrow head.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DirectionArrow {
    pub first: Line2,
    pub second: Line2,
}

/// Default wing length of a direction arrow, in pixels.
pub const DIRECTION_ARROW_LENGTH: f64 = 1.2 * 8.0;

// ─────────────────────────────────────────────────────────────────────────────
// Polyline helpers
// ─────────────────────────────────────────────────────────────────────────────

#[must_use]
pub fn path_length(points: &[Point2]) -> f64 {
    points.windows(2).map(|w| w[0].distance_to(w[1])).sum()
}

/// Append `p` unless it repeats the last point.
pub(crate) fn push_unique(points: &mut Vec<Point2>, p: Point2) {
    if points.last() != Some(&p) {
        points.push(p);
    }
}

/// Name of a derived curve: the source name with `suffix` appended.
pub(crate) fn suffixed(name: &str, suffix: &str) -> String {
    format!("{name}{suffix}")
}

#[must_use]
pub fn is_point_on_polyline(points: &[Point2], p: Point2) -> bool {
    match points {
        [] => false,
        [only] => *only == p,
        _ => points
            .windows(2)
            .any(|w| is_point_on_segment_default(p, Line2::new(w[0], w[1]))),
    }
}

#[must_use]
pub fn closest_point(points: &[Point2], p: Point2) -> Option<Point2> {
    if points.len() < 2 {
        return None;
    }
    if fuzzy_eq_points(points[0], p, ACCURACY_POINT_ON_LINE) {
        return Some(points[0]);
    }

    let mut best: Option<(f64, Point2)> = None;
    for w in points.windows(2) {
        let segment = Line2::new(w[0], w[1]);
        let candidate = segment.project(p);
        if !is_point_on_segment_default(candidate, segment) {
            continue;
        }
        let distance = candidate.distance_to(p);
        if best.is_none_or(|(d, _)| distance < d) {
            best = Some((distance, candidate));
        }
    }
    best.map(|(_, point)| point)
}

/// Polyline starting at `begin`, or `None` if `begin` is not on it.
#[must_use]
pub fn from_begin(points: &[Point2], begin: Point2) -> Option<Vec<Point2>> {
    if points.len() < 2 {
        return None;
    }
    if fuzzy_eq_points(points[0], begin, ACCURACY_POINT_ON_LINE) {
        return Some(points.to_vec());
    }

    let last = points.len() - 2;
    let mut segment = Vec::new();
    let mut started = false;
    for (i, w) in points.windows(2).enumerate() {
        if started {
            segment.push(w[0]);
        } else if is_point_on_segment_default(begin, Line2::new(w[0], w[1])) {
            started = true;
            if !fuzzy_eq_points(begin, w[1], ACCURACY_POINT_ON_LINE) {
                segment.push(begin);
            }
        } else {
            continue;
        }
        if i == last {
            segment.push(w[1]);
        }
    }

    if segment.is_empty() { None } else { Some(segment) }
}

/// Polyline ending at `end`, or `None` if `end` is not on it.
#[must_use]
pub fn to_end(points: &[Point2], end: Point2) -> Option<Vec<Point2>> {
    let reversed: Vec<Point2> = points.iter().rev().copied().collect();
    let mut segment = from_begin(&reversed, end)?;
    segment.reverse();
    Some(segment)
}

/// Split a polyline at `p`. Returns `None` if `p` is not on it.
#[must_use]
pub fn subdivide_path(points: &[Point2], p: Point2) -> Option<(Vec<Point2>, Vec<Point2>)> {
    if points.len() < 2 {
        return None;
    }

    let last = points.len() - 1;
    let mut sub1 = Vec::new();
    let mut sub2 = Vec::new();
    let mut found = false;
    for (i, w) in points.windows(2).enumerate() {
        if found {
            sub2.push(w[0]);
            if i + 1 == last {
                sub2.push(w[1]);
            }
            continue;
        }

        if !is_point_on_segment_default(p, Line2::new(w[0], w[1])) {
            sub1.push(w[0]);
            continue;
        }

        if !fuzzy_eq_points(w[0], p, ACCURACY_POINT_ON_LINE) {
            sub1.push(w[0]);
            sub1.push(p);
        } else if !sub1.is_empty() {
            sub1.push(p);
        }

        if !fuzzy_eq_points(w[1], p, ACCURACY_POINT_ON_LINE) {
            sub2.push(p);
            if i + 1 == last {
                sub2.push(w[1]);
            }
        }
        found = true;
    }

    found.then_some((sub1, sub2))
}

#[must_use]
pub fn length_by_point(points: &[Point2], p: Point2) -> Option<f64> {
    if points.len() < 2 {
        return None;
    }
    if fuzzy_eq_points(points[0], p, ACCURACY_POINT_ON_LINE) {
        return Some(0.0);
    }
    to_end(points, p).map(|segment| path_length(&segment))
}

/// Sub-polyline between two points on it. When `begin == end` the whole
/// polyline is returned.
///
/// # Errors
/// [`CurveError::SegmentStartNotFound`], [`CurveError::SegmentEndNotFound`]
/// or [`CurveError::SegmentTooShort`].
pub fn segment_points(
    points: &[Point2],
    begin: Point2,
    end: Point2,
    reverse: bool,
) -> Result<Vec<Point2>, CurveError> {
    let mut segment = points.to_vec();
    if reverse {
        segment.reverse();
    }

    let (start, finish) = match (segment.first(), segment.last()) {
        (Some(&first), Some(&last)) if begin == end => (first, last),
        _ => (begin, end),
    };

    let segment = from_begin(&segment, start).ok_or(CurveError::SegmentStartNotFound)?;
    let segment = to_end(&segment, finish).ok_or(CurveError::SegmentEndNotFound)?;
    if segment.len() < 2 {
        return Err(CurveError::SegmentTooShort);
    }
    Ok(segment)
}

/// Crossings between a polyline and a segment.
#[must_use]
pub fn curve_intersect_line(points: &[Point2], line: Line2) -> Vec<Point2> {
    points
        .windows(2)
        .filter_map(|w| {
            let edge = Line2::new(w[0], w[1]);
            let hit = line.intersect(edge);
            let p = hit.point()?;
            let accepted = hit.is_bounded()
                || (is_point_on_segment_default(p, edge) && is_point_on_segment_default(p, line));
            accepted.then_some(p)
        })
        .collect()
}

/// Crossing of the axis through `point` at `angle` with a polyline.
///
/// Hits ahead of the point along `angle` are preferred over hits behind it,
/// nearer hits over farther ones. A point already on the curve is its own
/// answer when nothing else is found.
#[must_use]
pub fn curve_intersect_axis(point: Point2, angle: f64, curve_points: &[Point2]) -> Option<Point2> {
    let angle = Line2::from_polar(point, angle, 100.0).angle();
    let reach = BBox2::from_points(curve_points).map_or(0.0, |b| {
        [b.min, b.max, Point2::new(b.min.x, b.max.y), Point2::new(b.max.x, b.min.y)]
            .iter()
            .map(|c| c.distance_to(point))
            .fold(0.0, f64::max)
    }) + 1.0;

    let mut hits = curve_intersect_line(curve_points, Line2::from_polar(point, angle, reach));
    hits.extend(curve_intersect_line(
        curve_points,
        Line2::from_polar(point, angle + 180.0, reach),
    ));

    if hits.len() == 1 {
        return hits.first().copied();
    }

    let mut forward: Option<(f64, Point2)> = None;
    let mut backward: Option<(f64, Point2)> = None;
    for hit in hits {
        if fuzzy_eq_points(hit, point, ACCURACY_POINT_ON_LINE) {
            continue;
        }
        let ray = Line2::new(point, hit);
        let slot = if (ray.angle() - angle).abs() < 0.1 {
            &mut forward
        } else {
            &mut backward
        };
        let distance = ray.length();
        if slot.is_none_or(|(d, _)| distance < d) {
            *slot = Some((distance, hit));
        }
    }

    forward
        .or(backward)
        .map(|(_, p)| p)
        .or_else(|| is_point_on_polyline(curve_points, point).then_some(point))
}

#[must_use]
pub fn direction_arrows(points: &[Point2], arrow_length: f64) -> Vec<DirectionArrow> {
    if points.len() < 2 {
        return Vec::new();
    }

    let seek = path_length(points) / 2.0;
    let mut found = 0.0;
    let mut arrow = Line2::new(points[0], points[1]);
    for w in points.windows(2) {
        arrow = Line2::new(w[0], w[1]);
        found += arrow.length();
        if seek <= found {
            arrow = arrow.with_length(arrow.length() - (found - seek));
            break;
        }
    }

    let arrow = arrow.reversed();
    let angle = arrow.angle();
    let arrow = arrow.with_length(arrow_length);
    vec![DirectionArrow {
        first: arrow.with_angle(angle - 35.0),
        second: arrow.with_angle(angle + 35.0),
    }]
}

// ─────────────────────────────────────────────────────────────────────────────
// Cut length correction
// ─────────────────────────────────────────────────────────────────────────────

/// Clamp a cut length into the curve.
///
/// Lengths run from 0 to `full_length`; flipped arcs have a negative full
/// length and the range runs from `full_length` to 0 instead. In pedantic
/// mode an out-of-range length is an error, otherwise it is logged and
/// clamped.
///
/// # Errors
/// [`CurveError::CutLengthTooSmall`] or [`CurveError::CutLengthTooBig`] in
/// pedantic mode.
pub fn correct_cut_length(
    length: f64,
    full_length: f64,
    curve: &str,
    point: &str,
    settings: &CurveSettings,
) -> Result<f64, CurveError> {
    let (clamped, error) = if full_length >= 0.0 {
        if length < 0.0 {
            (0.0, Some(too_small(curve, point)))
        } else if length > full_length {
            (full_length, Some(too_big(curve, point)))
        } else {
            (length, None)
        }
    } else if length < full_length {
        (full_length, Some(too_small(curve, point)))
    } else if length > 0.0 {
        (0.0, Some(too_big(curve, point)))
    } else {
        (length, None)
    };

    match error {
        Some(err) if settings.pedantic => Err(err),
        Some(err) => {
            log::warn!("{err}");
            Ok(clamped)
        }
        None => Ok(clamped),
    }
}

fn too_small(curve: &str, point: &str) -> CurveError {
    CurveError::CutLengthTooSmall {
        curve: curve.to_string(),
        point: point.to_string(),
    }
}

fn too_big(curve: &str, point: &str) -> CurveError {
    CurveError::CutLengthTooBig {
        curve: curve.to_string(),
        point: point.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn zigzag() -> Vec<Point2> {
        vec![
            Point2::new(0.0, 0.0),
            Point2::new(100.0, 0.0),
            Point2::new(100.0, 100.0),
        ]
    }

    #[test]
    fn test_path_length() {
        assert!((path_length(&zigzag()) - 200.0).abs() < 1e-12);
        assert_eq!(path_length(&[]), 0.0);
    }

    #[test]
    fn test_subdivide_path() {
        let (a, b) = subdivide_path(&zigzag(), Point2::new(50.0, 0.0)).unwrap();
        assert_eq!(a, vec![Point2::new(0.0, 0.0), Point2::new(50.0, 0.0)]);
        assert_eq!(
            b,
            vec![
                Point2::new(50.0, 0.0),
                Point2::new(100.0, 0.0),
                Point2::new(100.0, 100.0)
            ]
        );
        assert!(subdivide_path(&zigzag(), Point2::new(50.0, 50.0)).is_none());
    }

    #[test]
    fn test_length_by_point() {
        let len = length_by_point(&zigzag(), Point2::new(100.0, 30.0)).unwrap();
        assert!((len - 130.0).abs() < 1e-9);
        assert_eq!(length_by_point(&zigzag(), Point2::new(0.0, 0.0)), Some(0.0));
        assert!(length_by_point(&zigzag(), Point2::new(-50.0, 50.0)).is_none());
    }

    #[test]
    fn test_segment_points() {
        let seg = segment_points(
            &zigzag(),
            Point2::new(50.0, 0.0),
            Point2::new(100.0, 50.0),
            false,
        )
        .unwrap();
        assert_eq!(seg.first(), Some(&Point2::new(50.0, 0.0)));
        assert_eq!(seg.last(), Some(&Point2::new(100.0, 50.0)));

        let err = segment_points(
            &zigzag(),
            Point2::new(-5.0, 40.0),
            Point2::new(100.0, 50.0),
            false,
        );
        assert_eq!(err, Err(CurveError::SegmentStartNotFound));
    }

    #[test]
    fn test_closest_point() {
        let p = closest_point(&zigzag(), Point2::new(40.0, -10.0)).unwrap();
        assert!(p.distance_to(Point2::new(40.0, 0.0)) < 1e-9);
    }

    #[test]
    fn test_intersect_axis_prefers_forward_hit() {
        let points = vec![
            Point2::new(-100.0, -50.0),
            Point2::new(100.0, -50.0),
            Point2::new(100.0, 20.0),
            Point2::new(-100.0, 20.0),
        ];
        // Angle 90 points up the screen, towards y = -50.
        let hit = curve_intersect_axis(Point2::new(0.0, 0.0), 90.0, &points).unwrap();
        assert!(hit.distance_to(Point2::new(0.0, -50.0)) < 1e-9);
        let hit = curve_intersect_axis(Point2::new(0.0, 0.0), 270.0, &points).unwrap();
        assert!(hit.distance_to(Point2::new(0.0, 20.0)) < 1e-9);
    }

    #[test]
    fn test_direction_arrows_at_middle() {
        let arrows = direction_arrows(&zigzag(), 10.0);
        assert_eq!(arrows.len(), 1);
        let arrow = arrows[0];
        assert!(arrow.first.p1.distance_to(Point2::new(100.0, 0.0)) < 1e-9);
        assert!((arrow.first.length() - 10.0).abs() < 1e-9);
        assert!((arrow.first.angle() - 145.0).abs() < 1e-9);
        assert!((arrow.second.angle() - 215.0).abs() < 1e-9);
    }

    #[test]
    fn test_correct_cut_length() {
        let normal = CurveSettings::new();
        let pedantic = CurveSettings::new().pedantic(true);

        assert_eq!(correct_cut_length(50.0, 100.0, "c", "P", &normal), Ok(50.0));
        assert_eq!(correct_cut_length(-10.0, 100.0, "c", "P", &normal), Ok(0.0));
        assert_eq!(correct_cut_length(150.0, 100.0, "c", "P", &normal), Ok(100.0));
        assert!(matches!(
            correct_cut_length(-10.0, 100.0, "c", "P1", &pedantic),
            Err(CurveError::CutLengthTooSmall { ref point, .. }) if point == "P1"
        ));

        // Flipped curves measure negative lengths.
        assert_eq!(correct_cut_length(-150.0, -100.0, "c", "P", &normal), Ok(-100.0));
        assert_eq!(correct_cut_length(10.0, -100.0, "c", "P", &normal), Ok(0.0));
        assert!(matches!(
            correct_cut_length(10.0, -100.0, "c", "P", &pedantic),
            Err(CurveError::CutLengthTooBig { .. })
        ));
    }
}
