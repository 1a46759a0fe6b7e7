//! Spline paths: chains of cubic segments sharing their end points.
//!
//! A path stores its nodes, not its segments. Segment `i` (1-based) runs from
//! node `i - 1` along its outgoing tangent (`angle2`, `length2`) to node `i`
//! arriving along that node's incoming tangent (`angle1`, `length1`).

use serde::{Deserialize, Serialize};

use super::bezier::CubicBezier;
use super::core::{
    Point2, Transform2, Vec2, fuzzy_eq_nullable, fuzzy_is_null, mm_to_px, normalize_angle,
};
use super::curve::{Curve2, correct_cut_length, path_length, push_unique, suffixed};
use super::error::CurveError;
use super::line::Line2;
use super::settings::{CurveSettings, UNSET_APPROXIMATION_SCALE, curve_settings};

/// Replacement length of a collapsed handle at an interior node.
const MIN_HANDLE_LENGTH: f64 = mm_to_px(0.1);

// ─────────────────────────────────────────────────────────────────────────────
// Nodes
// ─────────────────────────────────────────────────────────────────────────────

/// Path node with absolute handle lengths.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SplinePoint {
    pub point: Point2,
    /// Direction of the incoming handle, pointing away from the node.
    pub angle1: f64,
    pub length1: f64,
    /// Direction of the outgoing handle.
    pub angle2: f64,
    pub length2: f64,
    /// Keep both handles on one line: setting one angle turns the other.
    pub strict: bool,
}

impl SplinePoint {
    #[must_use]
    pub fn new(point: Point2, angle1: f64, length1: f64, angle2: f64, length2: f64) -> Self {
        Self {
            point,
            angle1: normalize_angle(angle1),
            length1,
            angle2: normalize_angle(angle2),
            length2,
            strict: false,
        }
    }

    #[must_use]
    pub const fn with_strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    pub fn set_angle1(&mut self, degrees: f64) {
        self.angle1 = normalize_angle(degrees);
        if self.strict {
            self.angle2 = normalize_angle(self.angle1 + 180.0);
        }
    }

    pub fn set_angle2(&mut self, degrees: f64) {
        self.angle2 = normalize_angle(degrees);
        if self.strict {
            self.angle1 = normalize_angle(self.angle2 + 180.0);
        }
    }

    /// Node at `point` whose handles end at `incoming` and `outgoing`. A
    /// collapsed handle takes the direction opposite to the other one.
    fn from_handles(point: Point2, incoming: Point2, outgoing: Point2) -> Self {
        let length1 = point.distance_to(incoming);
        let length2 = point.distance_to(outgoing);
        let mut angle1 = point.angle_to(incoming);
        let mut angle2 = point.angle_to(outgoing);
        if fuzzy_is_null(length1) && !fuzzy_is_null(length2) {
            angle1 = angle2 + 180.0;
        } else if fuzzy_is_null(length2) && !fuzzy_is_null(length1) {
            angle2 = angle1 + 180.0;
        }
        Self::new(point, angle1, length1, angle2, length2)
    }

    fn transformed(&self, m: Transform2) -> Self {
        let point = m.apply_point(self.point);
        let turn = |angle: f64| point.angle_to(m.apply_point(self.point.polar(angle, 1.0)));
        Self {
            point,
            angle1: turn(self.angle1),
            angle2: turn(self.angle2),
            ..*self
        }
    }
}

/// Path node whose handles are given as coefficients of the chord-based
/// handle length. The two handles are always collinear.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FSplinePoint {
    pub point: Point2,
    pub angle1: f64,
    pub k_asm1: f64,
    pub angle2: f64,
    pub k_asm2: f64,
}

impl FSplinePoint {
    /// `angle2` is replaced by `angle1 + 180` unless the two are already
    /// opposite.
    #[must_use]
    pub fn new(point: Point2, angle1: f64, k_asm1: f64, angle2: f64, k_asm2: f64) -> Self {
        let angle1 = normalize_angle(angle1);
        let mut angle2 = normalize_angle(angle2);
        if !fuzzy_eq_nullable((angle1 - angle2).abs(), 180.0) {
            angle2 = normalize_angle(angle1 + 180.0);
        }
        Self {
            point,
            angle1,
            k_asm1,
            angle2,
            k_asm2,
        }
    }

    /// Node with unit coefficients and outgoing direction `angle2`.
    #[must_use]
    pub fn smooth(point: Point2, angle2: f64) -> Self {
        Self::new(point, angle2 + 180.0, 1.0, angle2, 1.0)
    }

    pub fn set_angle1(&mut self, degrees: f64) {
        self.angle1 = normalize_angle(degrees);
        self.angle2 = normalize_angle(self.angle1 + 180.0);
    }

    pub fn set_angle2(&mut self, degrees: f64) {
        self.angle2 = normalize_angle(degrees);
        self.angle1 = normalize_angle(self.angle2 + 180.0);
    }
}

/// Which end of a segment a node is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SplinePointPosition {
    First,
    Last,
}

// ─────────────────────────────────────────────────────────────────────────────
// Path
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SplinePath {
    points: Vec<SplinePoint>,
    pub approximation_scale: f64,
    pub name: String,
}

impl Default for SplinePath {
    fn default() -> Self {
        Self::new()
    }
}

impl SplinePath {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            points: Vec::new(),
            approximation_scale: UNSET_APPROXIMATION_SCALE,
            name: String::new(),
        }
    }

    #[must_use]
    pub fn from_points(points: Vec<SplinePoint>) -> Self {
        Self {
            points,
            ..Self::new()
        }
    }

    /// Path through consecutive segments. Each segment's start is taken as
    /// the node, so gaps between segments are closed at the next start.
    #[must_use]
    pub fn from_segments(segments: &[CubicBezier]) -> Self {
        let Some(last) = segments.last() else {
            return Self::new();
        };

        let mut points: Vec<SplinePoint> = Vec::with_capacity(segments.len() + 1);
        let mut incoming: Option<(f64, f64)> = None;
        for segment in segments {
            let (angle1, length1) = incoming.unwrap_or((segment.start_angle() + 180.0, 0.0));
            points.push(SplinePoint::new(
                segment.p1,
                angle1,
                length1,
                segment.start_angle(),
                segment.c1_length(),
            ));
            incoming = Some((segment.end_angle(), segment.c2_length()));
        }
        points.push(SplinePoint::new(
            last.p4,
            last.end_angle(),
            last.c2_length(),
            last.end_angle() + 180.0,
            0.0,
        ));

        Self {
            approximation_scale: last.approximation_scale,
            ..Self::from_points(points)
        }
    }

    /// Path from nodes with handle coefficients. Handle lengths are resolved
    /// per segment with curvature `k_curve`.
    ///
    /// # Errors
    /// [`CurveError::TooFewSplinePoints`] for fewer than three nodes.
    pub fn from_fspline_points(points: &[FSplinePoint], k_curve: f64) -> Result<Self, CurveError> {
        if points.len() < 3 {
            return Err(CurveError::TooFewSplinePoints { count: points.len() });
        }

        let mut nodes: Vec<SplinePoint> = points
            .iter()
            .map(|p| SplinePoint::new(p.point, p.angle1, 0.0, p.angle2, 0.0))
            .collect();
        for (i, pair) in points.windows(2).enumerate() {
            let spline = CubicBezier::from_angles(
                pair[0].point,
                pair[1].point,
                pair[0].angle2,
                pair[1].angle1,
                pair[0].k_asm2,
                pair[1].k_asm1,
                k_curve,
            );
            nodes[i].angle2 = spline.start_angle();
            nodes[i].length2 = spline.c1_length();
            nodes[i + 1].angle1 = spline.end_angle();
            nodes[i + 1].length1 = spline.c2_length();
        }
        Ok(Self::from_points(nodes))
    }

    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    #[must_use]
    pub const fn with_approximation_scale(mut self, scale: f64) -> Self {
        self.approximation_scale = scale;
        self
    }

    pub fn push(&mut self, point: SplinePoint) {
        self.points.push(point);
    }

    pub fn clear(&mut self) {
        self.points.clear();
    }

    #[must_use]
    pub fn spline_points(&self) -> &[SplinePoint] {
        &self.points
    }

    #[must_use]
    pub fn count_points(&self) -> usize {
        self.points.len()
    }

    #[must_use]
    pub fn count_segments(&self) -> usize {
        self.points.len().saturating_sub(1)
    }

    fn check_segment_index(&self, index: usize) -> Result<(), CurveError> {
        if index < 1 || index > self.count_segments() {
            return Err(CurveError::SegmentOutOfRange {
                index,
                count: self.count_segments(),
            });
        }
        Ok(())
    }

    /// Segment `index`, counted from 1.
    ///
    /// # Errors
    /// [`CurveError::NotEnoughPoints`] for an empty path,
    /// [`CurveError::SegmentOutOfRange`] for a bad index.
    pub fn segment(&self, index: usize) -> Result<CubicBezier, CurveError> {
        if self.points.is_empty() {
            return Err(CurveError::NotEnoughPoints);
        }
        self.check_segment_index(index)?;
        Ok(self.build_segment(index))
    }

    fn build_segment(&self, index: usize) -> CubicBezier {
        let p1 = &self.points[index - 1];
        let p2 = &self.points[index];
        CubicBezier::from_handles(p1.point, p2.point, p1.angle2, p2.angle1, p1.length2, p2.length1)
            .with_approximation_scale(self.approximation_scale)
    }

    #[must_use]
    pub fn segments(&self) -> Vec<CubicBezier> {
        (1..=self.count_segments()).map(|i| self.build_segment(i)).collect()
    }

    /// # Errors
    /// [`CurveError::SegmentOutOfRange`] for a bad index.
    pub fn spline_point(
        &self,
        index: usize,
        position: SplinePointPosition,
    ) -> Result<SplinePoint, CurveError> {
        self.check_segment_index(index)?;
        Ok(match position {
            SplinePointPosition::First => self.points[index - 1],
            SplinePointPosition::Last => self.points[index],
        })
    }

    /// # Errors
    /// [`CurveError::SegmentOutOfRange`] for a bad index.
    pub fn update_point(
        &mut self,
        index: usize,
        position: SplinePointPosition,
        point: SplinePoint,
    ) -> Result<(), CurveError> {
        self.check_segment_index(index)?;
        match position {
            SplinePointPosition::First => self.points[index - 1] = point,
            SplinePointPosition::Last => self.points[index] = point,
        }
        Ok(())
    }

    #[must_use]
    pub fn start_angle(&self) -> f64 {
        self.points.first().map_or(0.0, |p| p.angle2)
    }

    #[must_use]
    pub fn end_angle(&self) -> f64 {
        self.points.last().map_or(0.0, |p| p.angle1)
    }

    #[must_use]
    pub fn c1_length(&self) -> f64 {
        self.points.first().map_or(0.0, |p| p.length2)
    }

    #[must_use]
    pub fn c2_length(&self) -> f64 {
        self.points.last().map_or(0.0, |p| p.length1)
    }

    #[must_use]
    pub fn first_point(&self) -> Option<Point2> {
        self.points.first().map(|p| p.point)
    }

    #[must_use]
    pub fn last_point(&self) -> Option<Point2> {
        self.points.last().map(|p| p.point)
    }

    /// Index of the first segment passing through `p`.
    #[must_use]
    pub fn segment_of_point(&self, p: Point2) -> Option<usize> {
        (1..=self.count_segments()).find(|&i| self.build_segment(i).parameter_of_point(p).is_some())
    }

    #[must_use]
    pub fn points_with(&self, settings: &CurveSettings) -> Vec<Point2> {
        let mut points = Vec::new();
        for segment in self.segments() {
            for p in segment.points_with(settings) {
                push_unique(&mut points, p);
            }
        }
        points
    }

    #[must_use]
    pub fn length_with(&self, settings: &CurveSettings) -> f64 {
        self.segments()
            .iter()
            .map(|s| path_length(&s.points_with(settings)))
            .sum()
    }

    // ─────────────────────────────────────────────────────────────────────
    // Cutting
    // ─────────────────────────────────────────────────────────────────────

    /// Split at a length measured from the first point, using the global
    /// settings. A negative length counts back from the end.
    ///
    /// # Errors
    /// [`CurveError::CannotCutEmptyPath`] without segments, out-of-range
    /// lengths in pedantic mode.
    pub fn cut(&self, length: f64, point: &str) -> Result<(Self, Self, Point2), CurveError> {
        self.cut_with(length, point, &curve_settings())
    }

    /// # Errors
    /// [`CurveError::CannotCutEmptyPath`] without segments, out-of-range
    /// lengths in pedantic mode.
    pub fn cut_with(
        &self,
        length: f64,
        point: &str,
        settings: &CurveSettings,
    ) -> Result<(Self, Self, Point2), CurveError> {
        if self.count_segments() < 1 {
            return Err(CurveError::CannotCutEmptyPath);
        }

        let segments = self.segments();
        let lengths: Vec<f64> = segments
            .iter()
            .map(|s| path_length(&s.points_with(settings)))
            .collect();
        let full_length: f64 = lengths.iter().sum();
        let first = self.points[0].point;
        if fuzzy_is_null(full_length) {
            return Ok((self.clone(), self.clone(), first));
        }

        let length = if length < 0.0 { full_length + length } else { length };
        let length = correct_cut_length(length, full_length, &self.name, point, settings)?;

        let mut walked = 0.0;
        let mut index = segments.len();
        for (i, segment_length) in lengths.iter().enumerate() {
            if walked + segment_length >= length {
                index = i + 1;
                break;
            }
            walked += segment_length;
        }
        if index == segments.len() {
            walked = full_length - lengths[index - 1];
        }

        let local = (length - walked).clamp(0.0, lengths[index - 1]);
        let (mut left, mut right, cut) =
            segments[index - 1].cut_at_length_with(local, point, settings)?;

        let start = &self.points[index - 1];
        let end = &self.points[index];
        if index > 1 && fuzzy_is_null(start.point.distance_to(left.p2)) {
            left.p2 = start.point.polar(start.angle1 + 180.0, MIN_HANDLE_LENGTH);
        }
        if index < self.count_segments() && fuzzy_is_null(end.point.distance_to(right.p3)) {
            right.p3 = end.point.polar(end.angle2 + 180.0, MIN_HANDLE_LENGTH);
        }

        let cut_node = SplinePoint::from_handles(cut, left.p3, right.p2);

        let mut head: Vec<SplinePoint> = self.points[..index - 1].to_vec();
        head.push(SplinePoint {
            angle2: start.point.angle_to(left.p2),
            length2: start.point.distance_to(left.p2),
            ..*start
        });
        head.push(cut_node);

        let mut tail = vec![
            cut_node,
            SplinePoint {
                angle1: end.point.angle_to(right.p3),
                length1: end.point.distance_to(right.p3),
                ..*end
            },
        ];
        tail.extend_from_slice(&self.points[index + 1..]);

        let path1 = Self::from_points(head).with_approximation_scale(self.approximation_scale);
        let path2 = Self::from_points(tail).with_approximation_scale(self.approximation_scale);
        Ok((path1, path2, cut))
    }

    // ─────────────────────────────────────────────────────────────────────
    // Conversions and transforms
    // ─────────────────────────────────────────────────────────────────────

    /// Nodes with handle lengths expressed as coefficients for `k_curve`.
    #[must_use]
    pub fn to_fspline_points(&self, k_curve: f64) -> Vec<FSplinePoint> {
        let mut nodes: Vec<FSplinePoint> = self
            .points
            .iter()
            .map(|p| FSplinePoint::new(p.point, p.angle1, 1.0, p.angle2, 1.0))
            .collect();
        for i in 1..=self.count_segments() {
            let spline = self.build_segment(i).with_k_curve(k_curve);
            nodes[i - 1].set_angle2(self.points[i - 1].angle2);
            nodes[i - 1].k_asm2 = spline.k_asm1();
            nodes[i].set_angle1(self.points[i].angle1);
            nodes[i].k_asm1 = spline.k_asm2();
        }
        nodes
    }

    fn transformed(&self, m: Transform2, suffix: &str) -> Self {
        Self {
            points: self.points.iter().map(|p| p.transformed(m)).collect(),
            approximation_scale: self.approximation_scale,
            name: suffixed(&self.name, suffix),
        }
    }

    #[must_use]
    pub fn rotate(&self, origin: Point2, degrees: f64, suffix: &str) -> Self {
        self.transformed(Transform2::rotate_around(origin, degrees), suffix)
    }

    #[must_use]
    pub fn flip(&self, axis: Line2, suffix: &str) -> Self {
        self.transformed(Transform2::reflect(axis.p1, axis.p2), suffix)
    }

    #[must_use]
    pub fn move_by(&self, length: f64, degrees: f64, suffix: &str) -> Self {
        self.transformed(Transform2::translate(Vec2::from_polar(degrees, length)), suffix)
    }

    /// Every segment offset by `distance`, joined into one path.
    ///
    /// Joints between pieces of one segment are smoothed. The path's own
    /// nodes keep their angles, so corners stay corners.
    #[must_use]
    pub fn offset(&self, distance: f64, suffix: &str) -> Self {
        let pieces: Vec<CubicBezier> = self
            .segments()
            .iter()
            .flat_map(|s| super::offset::offset_curve(s, distance))
            .collect();
        Self::from_segments(&pieces)
            .with_approximation_scale(self.approximation_scale)
            .with_name(suffixed(&self.name, suffix))
    }
}

impl Curve2 for SplinePath {
    fn name(&self) -> &str {
        &self.name
    }

    fn points(&self) -> Vec<Point2> {
        self.points_with(&curve_settings())
    }

    fn approximation_scale(&self) -> f64 {
        self.approximation_scale
    }

    fn length(&self) -> f64 {
        self.length_with(&curve_settings())
    }
}
