//! Cubic Bezier segments.
//!
//! A [`CubicBezier`] is a plain value: two end points, two control points and
//! the knobs that control how it is approximated. Lengths are measured on the
//! flattened polyline; parameters for a given length are found by bisection.

use std::f64::consts::{FRAC_PI_8, SQRT_2};

use serde::{Deserialize, Serialize};

use super::core::{
    ACCURACY_POINT_ON_LINE, Point2, Transform2, Vec2, fuzzy_eq_points, fuzzy_is_null, mm_to_px,
};
use super::curve::{Curve2, correct_cut_length, path_length, suffixed};
use super::error::CurveError;
use super::flatten::{FlattenOptions, flatten_cubic, flatten_cubic_with};
use super::line::Line2;
use super::offset::{offset_curve, outline_curve};
use super::settings::{
    CurveSettings, MAX_APPROXIMATION_SCALE, UNSET_APPROXIMATION_SCALE, curve_settings,
};
use super::spline_path::SplinePath;

/// Length error accepted by [`CubicBezier::parameter_at_length`].
const LENGTH_SEARCH_EPSILON: f64 = mm_to_px(0.00001);

/// Maximum distance, in pixels, between a point and the curve for
/// [`CubicBezier::parameter_of_point`] to accept it.
const PARAMETER_SEARCH_RADIUS: f64 = 3.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CubicBezier {
    pub p1: Point2,
    pub p2: Point2,
    pub p3: Point2,
    pub p4: Point2,
    /// Curvature coefficient used to derive control-line coefficients.
    pub k_curve: f64,
    pub approximation_scale: f64,
    pub name: String,
}

impl CubicBezier {
    #[must_use]
    pub const fn new(p1: Point2, p2: Point2, p3: Point2, p4: Point2) -> Self {
        Self {
            p1,
            p2,
            p3,
            p4,
            k_curve: 1.0,
            approximation_scale: UNSET_APPROXIMATION_SCALE,
            name: String::new(),
        }
    }

    #[must_use]
    pub const fn from_control(control: [Point2; 4]) -> Self {
        Self::new(control[0], control[1], control[2], control[3])
    }

    /// Build a curve from its end points and tangent directions.
    ///
    /// Control-line lengths are `k_asm * L`, where `L` grows with the chord
    /// length and `k_curve`.
    #[must_use]
    pub fn from_angles(
        p1: Point2,
        p4: Point2,
        angle1: f64,
        angle2: f64,
        k_asm1: f64,
        k_asm2: f64,
        k_curve: f64,
    ) -> Self {
        let l = handle_base_length(p1, p4, k_curve);
        let mut curve = Self::new(
            p1,
            p1.polar(angle1, (l * k_asm1).abs()),
            p4.polar(angle2, (l * k_asm2).abs()),
            p4,
        );
        curve.k_curve = k_curve;
        curve
    }

    /// Build a curve from its end points, tangent directions and absolute
    /// control-line lengths.
    #[must_use]
    pub fn from_handles(
        p1: Point2,
        p4: Point2,
        angle1: f64,
        angle2: f64,
        c1_length: f64,
        c2_length: f64,
    ) -> Self {
        Self::new(
            p1,
            p1.polar(angle1, c1_length.abs()),
            p4.polar(angle2, c2_length.abs()),
            p4,
        )
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
    pub const fn with_k_curve(mut self, k_curve: f64) -> Self {
        self.k_curve = k_curve;
        self
    }

    #[must_use]
    pub const fn control(&self) -> [Point2; 4] {
        [self.p1, self.p2, self.p3, self.p4]
    }

    /// Same scale and curvature coefficient, no name.
    fn derived(&self, control: [Point2; 4]) -> Self {
        Self {
            k_curve: self.k_curve,
            approximation_scale: self.approximation_scale,
            ..Self::from_control(control)
        }
    }

    // ─────────────────────────────────────────────────────────────────────
    // Evaluation
    // ─────────────────────────────────────────────────────────────────────

    #[must_use]
    pub fn point_at(&self, t: f64) -> Point2 {
        if t <= 0.0 {
            return self.p1;
        }
        if t >= 1.0 {
            return self.p4;
        }
        let u = 1.0 - t;
        let a = u * u * u;
        let b = 3.0 * u * u * t;
        let c = 3.0 * u * t * t;
        let d = t * t * t;
        Point2::new(
            a * self.p1.x + b * self.p2.x + c * self.p3.x + d * self.p4.x,
            a * self.p1.y + b * self.p2.y + c * self.p3.y + d * self.p4.y,
        )
    }

    #[must_use]
    pub fn derivative_at(&self, t: f64) -> Vec2 {
        let t = t.clamp(0.0, 1.0);
        let u = 1.0 - t;
        (self.p2 - self.p1) * (3.0 * u * u)
            + (self.p3 - self.p2) * (6.0 * u * t)
            + (self.p4 - self.p3) * (3.0 * t * t)
    }

    /// Unit normal `(-dy, dx)` of the tangent at `t`. Zero where the tangent
    /// vanishes.
    #[must_use]
    pub fn normal_at(&self, t: f64) -> Vec2 {
        let d = self.derivative_at(t);
        let q = d.length();
        if fuzzy_is_null(q) {
            return Vec2::ZERO;
        }
        Vec2::new(-d.y / q, d.x / q)
    }

    /// Polyline using explicit settings for the scale fallback.
    #[must_use]
    pub fn points_with(&self, settings: &CurveSettings) -> Vec<Point2> {
        flatten_cubic_with(
            self.control(),
            FlattenOptions::new(self.approximation_scale),
            settings,
        )
    }

    /// Polyline length at an explicit approximation scale.
    #[must_use]
    pub fn length_at(&self, scale: f64) -> f64 {
        path_length(&flatten_cubic(self.control(), FlattenOptions::new(scale)))
    }

    /// Length at the finest approximation scale.
    #[must_use]
    pub fn real_length(&self) -> f64 {
        self.length_at(MAX_APPROXIMATION_SCALE)
    }

    fn real_length_to(&self, t: f64) -> f64 {
        self.cut_at_parameter(t).0.real_length()
    }

    // ─────────────────────────────────────────────────────────────────────
    // Parameter search
    // ─────────────────────────────────────────────────────────────────────

    /// Parameter whose left sub-curve has the given length.
    ///
    /// Negative lengths give 0, lengths past the end are clamped.
    #[must_use]
    pub fn parameter_at_length(&self, length: f64) -> f64 {
        if length < 0.0 || fuzzy_is_null(length) {
            return 0.0;
        }
        let base = self.real_length();
        if fuzzy_is_null(base) {
            return 0.0;
        }
        let length = length.min(base);

        let mut t = 0.5;
        let mut step = 0.5;
        loop {
            let measured = self.real_length_to(t);
            if (measured - length).abs() <= LENGTH_SEARCH_EPSILON {
                break;
            }
            step /= 2.0;
            if fuzzy_is_null(step) {
                crate::debug_log!("length search stopped at t = {t}, error {}", measured - length);
                break;
            }
            if measured > length {
                t -= step;
            } else {
                t += step;
            }
        }
        t
    }

    /// Parameter of a point lying on the curve, if it is within 3 px of it.
    ///
    /// Solves the cubic for each axis and keeps the root whose curve point is
    /// nearest to `p`.
    #[must_use]
    pub fn parameter_of_point(&self, p: Point2) -> Option<f64> {
        let mut candidates = axis_roots(self.p1.x, self.p2.x, self.p3.x, self.p4.x, p.x);
        candidates.extend(axis_roots(self.p1.y, self.p2.y, self.p3.y, self.p4.y, p.y));

        let mut best = None;
        let mut eps = PARAMETER_SEARCH_RADIUS;
        for t in candidates {
            let d = self.point_at(t).distance_to(p);
            if d <= eps {
                best = Some(t);
                eps = d;
            }
        }
        best
    }

    // ─────────────────────────────────────────────────────────────────────
    // Cutting
    // ─────────────────────────────────────────────────────────────────────

    /// Split at `t` (clamped to `[0, 1]`) by de Casteljau subdivision.
    #[must_use]
    pub fn cut_at_parameter(&self, t: f64) -> (Self, Self, Point2) {
        let t = t.clamp(0.0, 1.0);
        let p12 = self.p1.lerp(self.p2, t);
        let p23 = self.p2.lerp(self.p3, t);
        let p34 = self.p3.lerp(self.p4, t);
        let p123 = p12.lerp(p23, t);
        let p234 = p23.lerp(p34, t);
        let cut = p123.lerp(p234, t);

        (
            self.derived([self.p1, p12, p123, cut]),
            self.derived([cut, p234, p34, self.p4]),
            cut,
        )
    }

    /// Split at a length measured from `p1`, using the global settings.
    ///
    /// # Errors
    /// Out-of-range lengths in pedantic mode, see [`correct_cut_length`].
    pub fn cut_at_length(
        &self,
        length: f64,
        point: &str,
    ) -> Result<(Self, Self, Point2), CurveError> {
        self.cut_at_length_with(length, point, &curve_settings())
    }

    /// # Errors
    /// Out-of-range lengths in pedantic mode, see [`correct_cut_length`].
    pub fn cut_at_length_with(
        &self,
        length: f64,
        point: &str,
        settings: &CurveSettings,
    ) -> Result<(Self, Self, Point2), CurveError> {
        let full_length = path_length(&self.points_with(settings));
        if fuzzy_is_null(full_length) {
            let p = self.p1;
            return Ok((self.derived([p; 4]), self.derived([p; 4]), p));
        }

        let length = correct_cut_length(length, full_length, &self.name, point, settings)?;
        Ok(self.cut_at_parameter(self.parameter_at_length(length)))
    }

    // ─────────────────────────────────────────────────────────────────────
    // Tangent descriptors
    // ─────────────────────────────────────────────────────────────────────

    #[must_use]
    pub fn start_angle(&self) -> f64 {
        Line2::new(self.p1, self.p2).angle()
    }

    #[must_use]
    pub fn end_angle(&self) -> f64 {
        Line2::new(self.p4, self.p3).angle()
    }

    #[must_use]
    pub fn c1_length(&self) -> f64 {
        self.p1.distance_to(self.p2)
    }

    #[must_use]
    pub fn c2_length(&self) -> f64 {
        self.p4.distance_to(self.p3)
    }

    #[must_use]
    pub fn k_asm1(&self) -> f64 {
        self.c1_length() / handle_base_length(self.p1, self.p4, self.k_curve)
    }

    #[must_use]
    pub fn k_asm2(&self) -> f64 {
        self.c2_length() / handle_base_length(self.p1, self.p4, self.k_curve)
    }

    // ─────────────────────────────────────────────────────────────────────
    // Derived curves
    // ─────────────────────────────────────────────────────────────────────

    /// Apply `m` to all four points.
    #[must_use]
    pub fn transformed(&self, m: Transform2, suffix: &str) -> Self {
        Self {
            name: suffixed(&self.name, suffix),
            ..self.derived(self.control().map(|p| m.apply_point(p)))
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

    #[must_use]
    pub fn reversed(&self) -> Self {
        Self {
            name: self.name.clone(),
            ..self.derived([self.p4, self.p3, self.p2, self.p1])
        }
    }

    /// Parallel curve at a constant signed distance.
    #[must_use]
    pub fn offset(&self, distance: f64, suffix: &str) -> SplinePath {
        self.derived_path(&offset_curve(self, distance), suffix)
    }

    /// Parallel curve whose distance follows a piecewise-linear profile
    /// spread evenly along the curve.
    #[must_use]
    pub fn outline(&self, distances: &[f64], suffix: &str) -> SplinePath {
        self.derived_path(&outline_curve(self, distances), suffix)
    }

    fn derived_path(&self, pieces: &[Self], suffix: &str) -> SplinePath {
        SplinePath::from_segments(pieces)
            .with_approximation_scale(self.approximation_scale)
            .with_name(suffixed(&self.name, suffix))
    }
}

impl Curve2 for CubicBezier {
    fn name(&self) -> &str {
        &self.name
    }

    fn points(&self) -> Vec<Point2> {
        self.points_with(&curve_settings())
    }

    fn approximation_scale(&self) -> f64 {
        self.approximation_scale
    }
}

/// Reference control-line length for a chord: the handle of a quarter circle
/// whose chord is `p1..p4`, scaled by `k_curve`.
fn handle_base_length(p1: Point2, p4: Point2, k_curve: f64) -> f64 {
    let chord = if fuzzy_eq_points(p1, p4, ACCURACY_POINT_ON_LINE) {
        ACCURACY_POINT_ON_LINE * 2.0
    } else {
        p1.distance_to(p4)
    };
    let radius = chord / SQRT_2;
    k_curve * radius * 4.0 / 3.0 * FRAC_PI_8.tan()
}

// ─────────────────────────────────────────────────────────────────────────────
// Root finding
// ─────────────────────────────────────────────────────────────────────────────

/// Parameters in `[0, 1]` where one coordinate of the curve equals `value`.
fn axis_roots(c1: f64, c2: f64, c3: f64, c4: f64, value: f64) -> Vec<f64> {
    let a = -c1 + 3.0 * c2 - 3.0 * c3 + c4;
    let b = 3.0 * c1 - 6.0 * c2 + 3.0 * c3;
    let c = -3.0 * c1 + 3.0 * c2;
    let d = c1 - value;

    let roots = if !fuzzy_is_null(a) {
        cubic_roots(b / a, c / a, d / a)
    } else if !fuzzy_is_null(b) {
        quadratic_roots(b, c, d)
    } else if !fuzzy_is_null(c) {
        vec![-d / c]
    } else {
        Vec::new()
    };

    roots
        .into_iter()
        .filter(|t| (0.0..=1.0).contains(t))
        .collect()
}

/// Real roots of `x^3 + a x^2 + b x + c = 0` (Vieta for three roots,
/// Cardano otherwise).
fn cubic_roots(a: f64, b: f64, c: f64) -> Vec<f64> {
    use std::f64::consts::PI;

    let q = (a * a - 3.0 * b) / 9.0;
    let r = (2.0 * a * a * a - 9.0 * a * b + 27.0 * c) / 54.0;
    let shift = a / 3.0;

    if r * r < q * q * q {
        let t = (r / (q * q * q).sqrt()).acos() / 3.0;
        let m = -2.0 * q.sqrt();
        return vec![
            m * t.cos() - shift,
            m * (t + 2.0 * PI / 3.0).cos() - shift,
            m * (t - 2.0 * PI / 3.0).cos() - shift,
        ];
    }

    let aa = -sign(r) * (r.abs() + (r * r - q * q * q).sqrt()).cbrt();
    let bb = if aa == 0.0 { 0.0 } else { q / aa };
    let mut roots = vec![aa + bb - shift];
    if fuzzy_is_null(3.0_f64.sqrt() * 0.5 * (aa - bb).abs()) {
        roots.push(-0.5 * (aa + bb) - shift);
    }
    roots
}

fn quadratic_roots(a: f64, b: f64, c: f64) -> Vec<f64> {
    let disc = b * b - 4.0 * a * c;
    if fuzzy_is_null(disc) {
        return vec![-b / (2.0 * a)];
    }
    if disc < 0.0 {
        return Vec::new();
    }
    let s = disc.sqrt();
    vec![(-b - s) / (2.0 * a), (-b + s) / (2.0 * a)]
}

fn sign(v: f64) -> f64 {
    if v.abs() < 1e-11 { 0.0 } else { v.signum() }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn s_curve() -> CubicBezier {
        CubicBezier::new(
            Point2::new(0.0, 0.0),
            Point2::new(0.0, 50.0),
            Point2::new(50.0, 50.0),
            Point2::new(50.0, 0.0),
        )
    }

    #[test]
    fn test_point_and_derivative() {
        let c = s_curve();
        assert_eq!(c.point_at(0.0), c.p1);
        assert_eq!(c.point_at(1.0), c.p4);
        let mid = c.point_at(0.5);
        assert!((mid.x - 25.0).abs() < 1e-12);
        assert!((mid.y - 37.5).abs() < 1e-12);

        let d = c.derivative_at(0.0);
        assert!((d.x).abs() < 1e-12 && (d.y - 150.0).abs() < 1e-12);
        let n = c.normal_at(0.0);
        assert!((n.x + 1.0).abs() < 1e-12 && n.y.abs() < 1e-12);
    }

    #[test]
    fn test_from_angles_matches_descriptors() {
        let c = CubicBezier::from_angles(
            Point2::new(0.0, 0.0),
            Point2::new(100.0, 0.0),
            45.0,
            135.0,
            1.0,
            2.0,
            1.0,
        );
        assert!((c.start_angle() - 45.0).abs() < 1e-9);
        assert!((c.end_angle() - 135.0).abs() < 1e-9);
        assert!((c.k_asm1() - 1.0).abs() < 1e-9);
        assert!((c.k_asm2() - 2.0).abs() < 1e-9);
        assert!((c.c2_length() - 2.0 * c.c1_length()).abs() < 1e-9);
    }

    #[test]
    fn test_parameter_at_length_bounds() {
        let c = s_curve();
        assert_eq!(c.parameter_at_length(-5.0), 0.0);
        assert_eq!(c.parameter_at_length(0.0), 0.0);
        assert!((c.parameter_at_length(c.real_length()) - 1.0).abs() < 1e-3);
        assert!((c.parameter_at_length(1e6) - 1.0).abs() < 1e-3);
        // Symmetric curve: half the length is half the parameter range.
        assert!((c.parameter_at_length(c.real_length() / 2.0) - 0.5).abs() < 1e-4);
    }

    #[test]
    fn test_parameter_of_point() {
        let c = s_curve();
        let t = c.parameter_of_point(c.point_at(0.3)).unwrap();
        assert!((t - 0.3).abs() < 1e-6);
        assert_eq!(c.parameter_of_point(Point2::new(500.0, 500.0)), None);
    }

    #[test]
    fn test_quadratic_axis_roots() {
        // y(t) has no cubic term on this curve.
        let roots = axis_roots(0.0, 50.0, 50.0, 0.0, 37.5);
        assert_eq!(roots.len(), 1);
        assert!((roots[0] - 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_transform_keeps_scale_and_appends_suffix() {
        let c = s_curve().with_name("Spl_A_B").with_approximation_scale(3.0);
        let moved = c.move_by(10.0, 90.0, "a1");
        assert_eq!(moved.name, "Spl_A_Ba1");
        assert_eq!(moved.approximation_scale, 3.0);
        assert!((moved.p1.y + 10.0).abs() < 1e-12);

        let rotated = c.rotate(Point2::ORIGIN, 90.0, "");
        assert!((rotated.p4.x).abs() < 1e-9);
        assert!((rotated.p4.y + 50.0).abs() < 1e-9);

        let flipped = c.flip(Line2::new(Point2::ORIGIN, Point2::new(100.0, 0.0)), "");
        assert!((flipped.p2.y + 50.0).abs() < 1e-12);
    }

    #[test]
    fn test_cut_of_degenerate_curve() {
        let p = Point2::new(3.0, 4.0);
        let c = CubicBezier::new(p, p, p, p);
        let (left, right, cut) = c.cut_at_length(10.0, "X").unwrap();
        assert_eq!(cut, p);
        assert_eq!(left.control(), [p; 4]);
        assert_eq!(right.control(), [p; 4]);
    }
}
