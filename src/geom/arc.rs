//! Circular arcs.

use std::f64::consts::TAU;

use serde::{Deserialize, Serialize};

use super::bezier::CubicBezier;
use super::core::{Point2, Transform2, Vec2, fuzzy_eq_nullable, fuzzy_is_null, normalize_angle};
use super::curve::{Curve2, correct_cut_length, suffixed};
use super::error::CurveError;
use super::line::{Line2, angle_between};
use super::settings::{
    CurveSettings, MAX_APPROXIMATION_SCALE, MIN_APPROXIMATION_SCALE, UNSET_APPROXIMATION_SCALE,
    curve_settings,
};
use super::spline_path::SplinePath;

/// Angular size of one flattening section.
const POINTS_SECTION: f64 = 45.0;

/// Largest section of a spline path built from an arc. Coarse approximation
/// scales allow quarter turns.
pub(crate) fn spline_section_limit(effective_scale: f64) -> f64 {
    if effective_scale < 5.0 { 90.0 } else { 45.0 }
}

/// Split `total` degrees into sections of at most `limit` plus a remainder.
/// A single section is halved so callers always get at least two.
pub(crate) fn arc_sections(total: f64, limit: f64) -> Vec<f64> {
    if total <= 0.0 || !total.is_finite() {
        return Vec::new();
    }
    let mut sections = Vec::new();
    let mut rest = total;
    while rest > limit && !fuzzy_eq_nullable(rest, limit) {
        sections.push(limit);
        rest -= limit;
    }
    if !fuzzy_is_null(rest) {
        sections.push(rest);
    }
    if let [only] = sections[..] {
        sections = vec![only / 2.0, only / 2.0];
    }
    sections
}

/// Span from `f1` to `f2`: counter-clockwise, or the complement when
/// `clockwise`. Coincident angles mean a full turn unless the arc may be empty.
pub(crate) fn span_angle(f1: f64, f2: f64, clockwise: bool, allow_empty: bool) -> f64 {
    let diff = (f1 - f2).abs();
    if fuzzy_eq_nullable(diff, 0.0) || fuzzy_eq_nullable(diff, 360.0) {
        return if allow_empty { 0.0 } else { 360.0 };
    }
    let ccw = angle_between(f1, f2);
    if clockwise { 360.0 - ccw } else { ccw }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CircularArc {
    pub center: Point2,
    /// Signed radius. A negative radius makes the arc run clockwise.
    pub radius: f64,
    /// Start angle in degrees.
    pub f1: f64,
    /// End angle in degrees.
    pub f2: f64,
    /// Clockwise traversal, negative length.
    pub flipped: bool,
    /// Coincident angles describe an empty arc instead of a full circle.
    pub allow_empty: bool,
    pub approximation_scale: f64,
    pub name: String,
}

impl CircularArc {
    #[must_use]
    pub fn new(center: Point2, radius: f64, f1: f64, f2: f64) -> Self {
        Self {
            center,
            radius,
            f1: normalize_angle(f1),
            f2: normalize_angle(f2),
            flipped: radius < 0.0,
            allow_empty: false,
            approximation_scale: UNSET_APPROXIMATION_SCALE,
            name: String::new(),
        }
    }

    /// Arc of the given signed length starting at `f1`.
    #[must_use]
    pub fn from_length(length: f64, center: Point2, radius: f64, f1: f64) -> Self {
        let mut arc = Self::new(center, radius, f1, f1);
        arc.flipped = length < 0.0 || radius < 0.0;
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
    pub const fn with_flipped(mut self, flipped: bool) -> Self {
        self.flipped = flipped;
        self
    }

    /// Copy with new angles and no name.
    fn derived(&self, f1: f64, f2: f64, allow_empty: bool) -> Self {
        Self {
            f1: normalize_angle(f1),
            f2: normalize_angle(f2),
            allow_empty,
            name: String::new(),
            ..self.clone()
        }
    }

    /// Angular span in degrees, `[0, 360]`.
    #[must_use]
    pub fn angle_arc(&self) -> f64 {
        span_angle(self.f1, self.f2, self.flipped, self.allow_empty)
    }

    /// Signed length, negative when flipped.
    #[must_use]
    pub fn arc_length(&self) -> f64 {
        let length = self.radius.abs() * self.angle_arc().to_radians();
        if self.flipped { -length } else { length }
    }

    /// Signed circumference.
    #[must_use]
    pub fn max_length(&self) -> f64 {
        TAU * self.radius
    }

    #[must_use]
    pub fn p1(&self) -> Point2 {
        self.center.polar(self.f1, self.radius.abs())
    }

    #[must_use]
    pub fn p2(&self) -> Point2 {
        self.center.polar(self.f2, self.radius.abs())
    }

    /// End angle of an arc of `length` starting at `f1`.
    #[must_use]
    pub fn find_end_angle(&self, length: f64) -> f64 {
        if fuzzy_is_null(self.radius) {
            return self.f1;
        }
        let max = self.max_length();
        let length = if length.abs() >= max.abs() { max } else { length };
        let mut angle = (length.abs() / self.radius.abs()).to_degrees();
        if length < 0.0 || self.radius < 0.0 || self.flipped {
            angle = -angle;
        }
        normalize_angle(self.f1 + angle)
    }

    /// Bezier sections from `start` through `sections` degrees, turning
    /// counter-clockwise for `dir = 1` and clockwise for `dir = -1`.
    fn section_curves(&self, start: f64, dir: f64, sections: &[f64]) -> Vec<CubicBezier> {
        let r = self.radius.abs();
        let mut angle = start;
        let mut curves = Vec::with_capacity(sections.len());
        for &section in sections {
            let end_angle = angle + dir * section;
            let d = r * 4.0 / 3.0 * (section.to_radians() / 4.0).tan();
            let p1 = self.center.polar(angle, r);
            let p4 = self.center.polar(end_angle, r);
            let curve = CubicBezier::new(
                p1,
                p1.polar(angle + dir * 90.0, d),
                p4.polar(end_angle - dir * 90.0, d),
                p4,
            )
            .with_approximation_scale(self.approximation_scale);
            curves.push(curve);
            angle = end_angle;
        }
        curves
    }

    #[must_use]
    pub fn points_with(&self, settings: &CurveSettings) -> Vec<Point2> {
        if fuzzy_is_null(self.radius) {
            return vec![self.center];
        }
        let angle = self.angle_arc();
        if fuzzy_is_null(angle) {
            return vec![self.p1()];
        }

        let mut sections = Vec::new();
        let mut rest = angle;
        while rest >= POINTS_SECTION {
            sections.push(POINTS_SECTION);
            rest -= POINTS_SECTION;
        }
        if rest > 0.0 {
            sections.push(rest);
        }

        let start = if self.flipped { self.f2 } else { self.f1 };
        let mut points: Vec<Point2> = Vec::new();
        for curve in self.section_curves(start, 1.0, &sections) {
            points.pop();
            points.extend(curve.points_with(settings));
        }

        if self.flipped {
            points.reverse();
        }
        points
    }

    /// Spline path following the arc from `p1` to `p2`.
    #[must_use]
    pub fn to_spline_path(&self) -> SplinePath {
        self.to_spline_path_with(&curve_settings())
    }

    #[must_use]
    pub fn to_spline_path_with(&self, settings: &CurveSettings) -> SplinePath {
        let path = SplinePath::new()
            .with_approximation_scale(self.approximation_scale)
            .with_name(self.name.clone());
        if fuzzy_is_null(self.radius) {
            return path;
        }

        let limit = spline_section_limit(settings.effective_scale(self.approximation_scale));
        let sections = arc_sections(self.angle_arc(), limit);
        let dir = if self.flipped { -1.0 } else { 1.0 };
        let curves = self.section_curves(self.f1, dir, &sections);
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
        let full_length = self.arc_length();
        if fuzzy_is_null(full_length) || fuzzy_is_null(self.radius) {
            return Ok((self.clone(), self.clone(), self.center));
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

        let turn = (length.abs() / self.radius.abs()).to_degrees();
        let angle = if self.flipped { self.f1 - turn } else { self.f1 + turn };
        let arc1 = self.derived(self.f1, angle, false);
        let arc2 = self.derived(angle, self.f2, false);
        let point = arc1.p2();
        Ok((arc1, arc2, point))
    }

    fn transformed(&self, m: Transform2, flipped: bool, suffix: &str) -> Self {
        let center = m.apply_point(self.center);
        let f1 = center.angle_to(m.apply_point(self.p1()));
        let f2 = center.angle_to(m.apply_point(self.p2()));
        Self {
            center,
            f1,
            f2,
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

    /// Smallest approximation scale whose polyline turns within `tolerance`
    /// (relative) of the true curvature `1 / |radius|`.
    #[must_use]
    pub fn optimal_approximation_scale(radius: f64, f1: f64, f2: f64, tolerance: f64) -> f64 {
        if fuzzy_is_null(radius) {
            return MAX_APPROXIMATION_SCALE;
        }

        let expected = 1.0 / radius.abs();
        let mut scale = MIN_APPROXIMATION_SCALE;
        while scale <= MAX_APPROXIMATION_SCALE {
            let arc = Self::new(Point2::ORIGIN, radius, f1, f2).with_approximation_scale(scale);
            let curvature = polyline_curvature(&arc.points());
            if expected - curvature <= expected * tolerance {
                return scale;
            }
            scale += 0.1;
        }
        MAX_APPROXIMATION_SCALE
    }
}

impl Curve2 for CircularArc {
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
        self.arc_length()
    }
}

/// Mean turning per unit length of a polyline.
fn polyline_curvature(points: &[Point2]) -> f64 {
    let mut turning = 0.0;
    let mut length = 0.0;
    for w in points.windows(2) {
        length += w[0].distance_to(w[1]);
    }
    for w in points.windows(3) {
        let a = w[1] - w[0];
        let b = w[2] - w[1];
        turning += a.cross(b).atan2(a.dot(b)).abs();
    }
    if fuzzy_is_null(length) { 0.0 } else { turning / length }
}
