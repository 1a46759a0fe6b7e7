//! Elliptical arcs.
//!
//! The ellipse lives in its own frame: centre `center`, semi-axes `radius1`
//! along the x axis and `radius2` along the y axis, turned by
//! `rotation_angle`. Start and end angles are visual angles of rays from the
//! centre in the unrotated frame. The affine `transform` maps that frame into
//! the scene, so moves, rotations and reflections never touch the radii.

use std::f64::consts::PI;

use serde::{Deserialize, Serialize};

use super::arc::{arc_sections, span_angle, spline_section_limit};
use super::bezier::CubicBezier;
use super::core::{
    Point2, Transform2, Vec2, fuzzy_eq_nullable, fuzzy_eq_points, fuzzy_is_null, mm_to_px,
    normalize_angle,
};
use super::curve::{Curve2, correct_cut_length, path_length, suffixed};
use super::ellipse_raster::{MAX_RADIUS, full_ellipse_points};
use super::error::CurveError;
use super::line::{Line2, angle_between, is_point_on_segment};
use super::settings::{CurveSettings, UNSET_APPROXIMATION_SCALE, curve_settings};
use super::spline_path::SplinePath;

/// Length accuracy of the end angle search.
const LENGTH_ACCURACY: f64 = mm_to_px(0.001);

/// Smallest angular step of the end angle search.
const MIN_GAP: f64 = 0.0001;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EllipticalArc {
    pub center: Point2,
    pub radius1: f64,
    pub radius2: f64,
    pub f1: f64,
    pub f2: f64,
    /// Rotation of the axes in degrees, counter-clockwise on screen.
    pub rotation_angle: f64,
    pub transform: Transform2,
    pub flipped: bool,
    pub allow_empty: bool,
    pub approximation_scale: f64,
    pub name: String,
}

impl EllipticalArc {
    #[must_use]
    pub fn new(
        center: Point2,
        radius1: f64,
        radius2: f64,
        f1: f64,
        f2: f64,
        rotation_angle: f64,
    ) -> Self {
        Self {
            center,
            radius1,
            radius2,
            f1: normalize_angle(f1),
            f2: normalize_angle(f2),
            rotation_angle,
            transform: Transform2::identity(),
            flipped: radius1 < 0.0 || radius2 < 0.0,
            allow_empty: false,
            approximation_scale: UNSET_APPROXIMATION_SCALE,
            name: String::new(),
        }
    }

    /// Arc of the given signed length starting at `f1`.
    #[must_use]
    pub fn from_length(
        length: f64,
        center: Point2,
        radius1: f64,
        radius2: f64,
        f1: f64,
        rotation_angle: f64,
    ) -> Self {
        let mut arc = Self::new(center, radius1, radius2, f1, f1, rotation_angle);
        arc.flipped = length < 0.0 || radius1 < 0.0 || radius2 < 0.0;
        arc.f2 = arc.find_end_angle(length);
        arc
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

    #[must_use]
    pub const fn with_transform(mut self, transform: Transform2) -> Self {
        self.transform = transform;
        self
    }

    #[must_use]
    pub const fn with_flipped(mut self, flipped: bool) -> Self {
        self.flipped = flipped;
        self
    }

    fn derived(&self, f1: f64, f2: f64, allow_empty: bool) -> Self {
        Self {
            f1: normalize_angle(f1),
            f2: normalize_angle(f2),
            allow_empty,
            name: String::new(),
            ..self.clone()
        }
    }

    fn is_degenerate(&self) -> bool {
        fuzzy_is_null(self.radius1) && fuzzy_is_null(self.radius2)
    }

    /// Radii used for geometry. Zero radii are replaced by a tiny one so the
    /// ellipse never collapses into a division by zero.
    fn working_radii(&self) -> (f64, f64) {
        let threshold = mm_to_px(0.001);
        (
            self.radius1.abs().max(threshold),
            self.radius2.abs().max(threshold),
        )
    }

    /// `true` when the arc runs counter-clockwise in its own frame.
    fn local_ccw(&self) -> bool {
        self.flipped == self.transform.is_mirroring()
    }

    /// Maps the ellipse frame (origin at the centre, unrotated axes) into
    /// the scene.
    fn placement(&self) -> Transform2 {
        self.transform
            .compose(Transform2::translate(self.center.to_vec2()))
            .compose(Transform2::rotate(self.rotation_angle))
    }

    /// Angular span in the ellipse frame, degrees.
    #[must_use]
    pub fn angle_arc(&self) -> f64 {
        span_angle(self.f1, self.f2, !self.local_ccw(), self.allow_empty)
    }

    /// Point where the ray at `angle` from the centre meets the ellipse.
    #[must_use]
    pub fn point_at_angle(&self, angle: f64) -> Point2 {
        if self.is_degenerate() {
            return self.center_point();
        }
        let (r1, r2) = self.working_radii();
        let ray = Vec2::from_polar(angle, 100.0);
        let a = ray.x / r1;
        let b = ray.y / r2;
        let k = (a * a + b * b).sqrt();
        if fuzzy_is_null(k) {
            return self.center_point();
        }
        let local = Point2::new(ray.x / k, ray.y / k);
        self.placement().apply_point(local)
    }

    #[must_use]
    pub fn p1(&self) -> Point2 {
        self.point_at_angle(self.f1)
    }

    #[must_use]
    pub fn p2(&self) -> Point2 {
        self.point_at_angle(self.f2)
    }

    /// Centre in scene coordinates.
    #[must_use]
    pub fn center_point(&self) -> Point2 {
        self.transform.apply_point(self.center)
    }

    #[must_use]
    pub fn points_with(&self, settings: &CurveSettings) -> Vec<Point2> {
        if self.is_degenerate() {
            return vec![self.center_point()];
        }
        if fuzzy_is_null(self.angle_arc()) {
            return vec![self.p1()];
        }

        let (r1, r2) = self.working_radii();
        let max = r1.max(r2);
        let down = if max > MAX_RADIUS { max / MAX_RADIUS } else { 1.0 };
        let scale = settings.effective_scale(self.approximation_scale);
        let full = full_ellipse_points(r1 / down, r2 / down, scale);
        let reach = 2.0 * max / down;

        let span = if self.local_ccw() {
            clip_span(full, self.f1, self.f2, reach)
        } else {
            let mut span = clip_span(full, self.f2, self.f1, reach);
            span.reverse();
            span
        };

        let place = self.placement().compose(Transform2::scale(down, down));
        span.into_iter().map(|p| place.apply_point(p)).collect()
    }

    #[must_use]
    pub fn length_with(&self, settings: &CurveSettings) -> f64 {
        let length = path_length(&self.points_with(settings));
        if self.flipped { -length } else { length }
    }

    /// Ramanujan's perimeter of the full ellipse. Negative when a radius is.
    #[must_use]
    pub fn max_length(&self) -> f64 {
        let a = self.radius1.abs();
        let b = self.radius2.abs();
        if fuzzy_is_null(a + b) {
            return 0.0;
        }
        let h = (a - b).powi(2) / (a + b).powi(2);
        let length = PI * (a + b) * (1.0 + 3.0 * h / (10.0 + (4.0 - 3.0 * h).sqrt()));
        if self.radius1 < 0.0 || self.radius2 < 0.0 { -length } else { length }
    }

    /// End angle of an arc of `length` starting at `f1`, found by bisection.
    #[must_use]
    pub fn find_end_angle(&self, length: f64) -> f64 {
        self.find_end_angle_with(length, &curve_settings())
    }

    fn find_end_angle_with(&self, length: f64, settings: &CurveSettings) -> f64 {
        if self.is_degenerate() {
            return self.f1;
        }
        let target = length.abs().min(self.max_length().abs());
        let dir = if self.local_ccw() { 1.0 } else { -1.0 };

        let mut trial = self.derived(self.f1, self.f1 + dir * 180.0, false);
        let mut gap: f64 = 180.0;
        let mut measured = trial.length_with(settings).abs();
        while (measured - target).abs() > LENGTH_ACCURACY {
            gap /= 2.0;
            if gap < MIN_GAP {
                crate::debug_log!(
                    "elliptical arc '{}': end angle search stopped {} px off",
                    self.name,
                    (measured - target).abs()
                );
                break;
            }
            let step = if measured > target { -gap } else { gap };
            trial.f2 = normalize_angle(trial.f2 + dir * step);
            measured = trial.length_with(settings).abs();
        }
        trial.f2
    }

    /// Parametric angle of the point at visual angle `angle`.
    fn parametric_angle(angle: f64, r1: f64, r2: f64) -> f64 {
        let a = angle.to_radians();
        normalize_angle((r1 * a.sin()).atan2(r2 * a.cos()).to_degrees())
    }

    /// Spline path following the arc from `p1` to `p2`.
    #[must_use]
    pub fn to_spline_path(&self) -> SplinePath {
        self.to_spline_path_with(&curve_settings())
    }

    #[must_use]
    pub fn to_spline_path_with(&self, settings: &CurveSettings) -> SplinePath {
        let span = self.angle_arc();
        if self.is_degenerate() || fuzzy_is_null(span) {
            return SplinePath::new()
                .with_approximation_scale(self.approximation_scale)
                .with_name(self.name.clone());
        }

        let (r1, r2) = self.working_radii();
        let t1 = Self::parametric_angle(self.f1, r1, r2);
        let t2 = Self::parametric_angle(self.f2, r1, r2);
        let ccw = self.local_ccw();
        let sweep = if fuzzy_eq_nullable(span, 360.0) {
            360.0
        } else if ccw {
            angle_between(t1, t2)
        } else {
            360.0 - angle_between(t1, t2)
        };
        let dir = if ccw { 1.0 } else { -1.0 };

        let limit = spline_section_limit(settings.effective_scale(self.approximation_scale));
        let place = self.placement().compose(Transform2::scale(r1, r2));
        let unit = |deg: f64| {
            let (s, c) = deg.to_radians().sin_cos();
            (Point2::new(c, -s), Vec2::new(-s, -c))
        };

        let mut theta = t1;
        let mut curves = Vec::new();
        for section in arc_sections(sweep, limit) {
            let end = theta + dir * section;
            let h = dir * 4.0 / 3.0 * (section.to_radians() / 4.0).tan();
            let (a, da) = unit(theta);
            let (b, db) = unit(end);
            let curve = CubicBezier::new(
                place.apply_point(a),
                place.apply_point(a + da * h),
                place.apply_point(b - db * h),
                place.apply_point(b),
            )
            .with_approximation_scale(self.approximation_scale);
            curves.push(curve);
            theta = end;
        }

        SplinePath::from_segments(&curves)
            .with_approximation_scale(self.approximation_scale)
            .with_name(self.name.clone())
    }

    /// Split at a length measured from `p1`, using the global settings.
    ///
    /// # Errors
    /// Out-of-range lengths in pedantic mode.
    pub fn cut(&self, length: f64, point: &str) -> Result<(Self, Self, Point2), CurveError> {
        self.cut_with(length, point, &curve_settings())
    }

    /// # Errors
    /// Out-of-range lengths in pedantic mode.
    pub fn cut_with(
        &self,
        length: f64,
        point: &str,
        settings: &CurveSettings,
    ) -> Result<(Self, Self, Point2), CurveError> {
        let full_length = self.length_with(settings);
        if self.is_degenerate() || fuzzy_is_null(full_length) {
            return Ok((self.clone(), self.clone(), self.center_point()));
        }

        let length = if fuzzy_is_null(length) {
            0.0
        } else {
            correct_cut_length(length, full_length, &self.name, point, settings)?
        };

        if fuzzy_is_null(length) {
            let arc1 = self.derived(self.f1, self.f1, true);
            return Ok((arc1, self.clone(), self.p1()));
        }
        if fuzzy_eq_nullable(length, full_length) {
            let arc2 = self.derived(self.f2, self.f2, true);
            return Ok((self.clone(), arc2, self.p2()));
        }

        let end = self.find_end_angle_with(length, settings);
        let arc1 = self.derived(self.f1, end, false);
        let arc2 = self.derived(end, self.f2, false);
        let point = arc1.p2();
        Ok((arc1, arc2, point))
    }

    fn transformed(&self, world: Transform2, flipped: bool, suffix: &str) -> Self {
        Self {
            transform: world.compose(self.transform),
            flipped,
            name: suffixed(&self.name, suffix),
            ..self.clone()
        }
    }

    #[must_use]
    pub fn rotate(&self, origin: Point2, degrees: f64, suffix: &str) -> Self {
        self.transformed(Transform2::rotate_around(origin, degrees), self.flipped, suffix)
    }

    #[must_use]
    pub fn flip(&self, axis: Line2, suffix: &str) -> Self {
        self.transformed(Transform2::reflect(axis.p1, axis.p2), !self.flipped, suffix)
    }

    #[must_use]
    pub fn move_by(&self, length: f64, degrees: f64, suffix: &str) -> Self {
        self.transformed(
            Transform2::translate(Vec2::from_polar(degrees, length)),
            self.flipped,
            suffix,
        )
    }
}

impl Curve2 for EllipticalArc {
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

// ─────────────────────────────────────────────────────────────────────────────
// Clipping the rasterized outline
// ─────────────────────────────────────────────────────────────────────────────

/// Append `tail` to `head`, skipping points that repeat the last one.
fn join_points(head: &[Point2], tail: &[Point2]) -> Vec<Point2> {
    let accuracy = mm_to_px(0.0001);
    let mut joined = Vec::with_capacity(head.len() + tail.len());
    joined.extend_from_slice(head);
    for &p in tail {
        if joined.last().is_none_or(|&last| !fuzzy_eq_points(last, p, accuracy)) {
            joined.push(p);
        }
    }
    joined
}

/// Crossing of a ray with a polyline edge, tolerating rounding at vertices.
fn crossing(ray: Line2, edge: Line2) -> Option<Point2> {
    let hit = ray.intersect(edge);
    let p = hit.point()?;
    let on_both = is_point_on_segment(p, edge, 1e-6) && is_point_on_segment(p, ray, 1e-6);
    (hit.is_bounded() || on_both).then_some(p)
}

/// Part of a closed counter-clockwise outline around the origin between the
/// rays at `start` and `end` degrees.
fn clip_span(mut points: Vec<Point2>, start: f64, end: f64, reach: f64) -> Vec<Point2> {
    if points.len() < 2 {
        return points;
    }
    let start_ray = Line2::from_polar(Point2::ORIGIN, start, reach);
    let end_ray = Line2::from_polar(Point2::ORIGIN, end, reach);

    // The outline begins at angle 0. When the span wraps past it, rotate the
    // loop so that it begins on the start ray.
    let mut begin = true;
    if start_ray.angle() >= end_ray.angle() {
        let hit = points
            .windows(2)
            .enumerate()
            .find_map(|(i, w)| crossing(start_ray, Line2::new(w[0], w[1])).map(|p| (i, p)));
        if let Some((i, p)) = hit {
            let tail = join_points(&[p], &points[i + 1..]);
            let rotated = join_points(&tail, &points[..=i]);
            points = join_points(&rotated, &[p]);
            if fuzzy_eq_nullable(start_ray.angle(), end_ray.angle()) {
                return points;
            }
            begin = false;
        }
    }

    let mut arc = Vec::with_capacity(points.len());
    for w in points.windows(2) {
        let edge = Line2::new(w[0], w[1]);
        if begin {
            if let Some(p) = crossing(start_ray, edge) {
                arc.push(p);
                begin = false;
                // Both rays may cross the same edge of a very short arc.
                if let Some(q) = crossing(end_ray, edge)
                    && w[0].distance_squared_to(q) > w[0].distance_squared_to(p)
                {
                    arc.push(q);
                    break;
                }
            }
        } else {
            arc.push(w[0]);
            if let Some(p) = crossing(end_ray, edge) {
                arc.push(p);
                break;
            }
        }
    }

    if arc.is_empty() { points } else { arc }
}
