//! Adaptive flattening of cubic Bezier curves.
//!
//! Recursive midpoint subdivision with a distance tolerance derived from the
//! approximation scale, optionally refined by angle and cusp limits. The
//! output polyline always starts at `p1` and ends at `p4`.
//!
//! Every emitted vertex lies on the curve: a flat piece contributes its
//! parametric midpoint and its end point. Since a finer tolerance only splits
//! pieces further, a finer polyline passes through every vertex of a coarser
//! one and its length never decreases.

use std::f64::consts::PI;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

use super::core::Point2;
use super::settings::{CurveSettings, curve_settings};

/// Maximum subdivision depth.
pub const RECURSION_LIMIT: u32 = 32;

const COLLINEARITY_EPSILON: f64 = 1e-30;
const ANGLE_TOLERANCE_EPSILON: f64 = 0.01;

/// Options for [`flatten_cubic`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FlattenOptions {
    /// Polyline density, higher is finer. Out-of-range values fall back to
    /// the configured default.
    pub approximation_scale: f64,
    /// Maximum turning angle in radians. Values below 0.01 disable the test.
    pub angle_tolerance: f64,
    /// Cusp detection angle in radians. Zero disables the test.
    pub cusp_limit: f64,
}

impl FlattenOptions {
    #[must_use]
    pub const fn new(approximation_scale: f64) -> Self {
        Self {
            approximation_scale,
            angle_tolerance: 0.0,
            cusp_limit: 0.0,
        }
    }

    #[must_use]
    pub const fn angle_tolerance(mut self, radians: f64) -> Self {
        self.angle_tolerance = radians;
        self
    }

    #[must_use]
    pub const fn cusp_limit(mut self, radians: f64) -> Self {
        self.cusp_limit = radians;
        self
    }
}

impl Default for FlattenOptions {
    fn default() -> Self {
        Self::new(CurveSettings::DEFAULT.default_approximation_scale)
    }
}

#[derive(Debug, Clone, Copy)]
struct Limits {
    distance_tolerance_square: f64,
    angle_tolerance: f64,
    cusp_limit: f64,
}

impl Limits {
    fn new(options: FlattenOptions, settings: &CurveSettings) -> Self {
        let scale = settings.effective_scale(options.approximation_scale);
        let tolerance = 0.5 / scale;
        Self {
            distance_tolerance_square: tolerance * tolerance,
            angle_tolerance: options.angle_tolerance,
            cusp_limit: options.cusp_limit,
        }
    }

    fn angle_enabled(self) -> bool {
        self.angle_tolerance >= ANGLE_TOLERANCE_EPSILON
    }

    fn cusp_enabled(self) -> bool {
        self.cusp_limit != 0.0
    }
}

/// Flatten one cubic using the global settings for scale fallback.
#[must_use]
pub fn flatten_cubic(control: [Point2; 4], options: FlattenOptions) -> Vec<Point2> {
    flatten_cubic_with(control, options, &curve_settings())
}

#[must_use]
pub fn flatten_cubic_with(
    control: [Point2; 4],
    options: FlattenOptions,
    settings: &CurveSettings,
) -> Vec<Point2> {
    let limits = Limits::new(options, settings);
    let mut points = vec![control[0]];
    subdivide_root(control, limits, &mut points);
    points
}

/// Flatten many curves. Runs on the rayon pool with the `parallel` feature.
#[cfg(feature = "parallel")]
#[must_use]
pub fn flatten_many(curves: &[[Point2; 4]], options: FlattenOptions) -> Vec<Vec<Point2>> {
    let settings = curve_settings();
    curves
        .par_iter()
        .map(|c| flatten_cubic_with(*c, options, &settings))
        .collect()
}

/// Flatten many curves. Runs on the rayon pool with the `parallel` feature.
#[cfg(not(feature = "parallel"))]
#[must_use]
pub fn flatten_many(curves: &[[Point2; 4]], options: FlattenOptions) -> Vec<Vec<Point2>> {
    let settings = curve_settings();
    curves
        .iter()
        .map(|c| flatten_cubic_with(*c, options, &settings))
        .collect()
}

struct Halves {
    left: [Point2; 4],
    right: [Point2; 4],
}

fn halves(c: [Point2; 4]) -> Halves {
    let p12 = c[0].midpoint(c[1]);
    let p23 = c[1].midpoint(c[2]);
    let p34 = c[2].midpoint(c[3]);
    let p123 = p12.midpoint(p23);
    let p234 = p23.midpoint(p34);
    let p1234 = p123.midpoint(p234);
    Halves {
        left: [c[0], p12, p123, p1234],
        right: [p1234, p234, p34, c[3]],
    }
}

cfg_if::cfg_if! {
    if #[cfg(feature = "parallel")] {
        fn subdivide_root(c: [Point2; 4], limits: Limits, out: &mut Vec<Point2>) {
            if emit_or_split(c, limits, out) {
                let Halves { left, right } = halves(c);
                let (head, tail) = rayon::join(
                    || {
                        let mut v = Vec::new();
                        subdivide(left, 1, limits, &mut v);
                        v
                    },
                    || {
                        let mut v = Vec::new();
                        subdivide(right, 1, limits, &mut v);
                        v
                    },
                );
                out.extend(head);
                out.extend(tail);
            } else {
                out.push(c[3]);
            }
        }
    } else {
        fn subdivide_root(c: [Point2; 4], limits: Limits, out: &mut Vec<Point2>) {
            subdivide(c, 0, limits, out);
        }
    }
}

fn subdivide(c: [Point2; 4], level: u32, limits: Limits, out: &mut Vec<Point2>) {
    if level > RECURSION_LIMIT {
        out.push(c[3]);
        return;
    }
    if emit_or_split(c, limits, out) {
        let Halves { left, right } = halves(c);
        subdivide(left, level + 1, limits, out);
        subdivide(right, level + 1, limits, out);
    } else {
        out.push(c[3]);
    }
}

fn square_distance(a: Point2, b: Point2) -> f64 {
    a.distance_squared_to(b)
}

fn turn(a: f64, b: f64) -> f64 {
    let d = (a - b).abs();
    if d >= PI { 2.0 * PI - d } else { d }
}

fn heading(from: Point2, to: Point2) -> f64 {
    (to.y - from.y).atan2(to.x - from.x)
}

/// Point of `c` at `t = 0.5`.
fn mid_on_curve(c: [Point2; 4]) -> Point2 {
    let [p1, p2, p3, p4] = c;
    Point2::new(
        (p1.x + 3.0 * (p2.x + p3.x) + p4.x) / 8.0,
        (p1.y + 3.0 * (p2.y + p3.y) + p4.y) / 8.0,
    )
}

/// Emit the interior point of `c` if it is flat enough. Returns `true` when
/// the curve has to be split further. The caller emits the end point.
fn emit_or_split(c: [Point2; 4], limits: Limits, out: &mut Vec<Point2>) -> bool {
    let [p1, p2, p3, p4] = c;
    let mid = mid_on_curve(c);
    let dx = p4.x - p1.x;
    let dy = p4.y - p1.y;
    let chord2 = dx * dx + dy * dy;
    let tol = limits.distance_tolerance_square;

    let mut d2 = ((p2.x - p4.x) * dy - (p2.y - p4.y) * dx).abs();
    let mut d3 = ((p3.x - p4.x) * dy - (p3.y - p4.y) * dx).abs();

    match (d2 > COLLINEARITY_EPSILON, d3 > COLLINEARITY_EPSILON) {
        (false, false) => {
            // All collinear or p1 == p4.
            if chord2 < 1e-9 {
                d2 = square_distance(p1, p2);
                d3 = square_distance(p4, p3);
            } else {
                let k = 1.0 / chord2;
                d2 = k * ((p2.x - p1.x) * dx + (p2.y - p1.y) * dy);
                d3 = k * ((p3.x - p1.x) * dx + (p3.y - p1.y) * dy);
                if d2 > 0.0 && d2 < 1.0 && d3 > 0.0 && d3 < 1.0 {
                    // 1---2---3---4, the endpoints suffice.
                    return false;
                }
                d2 = collinear_deviation(p2, p1, p4, d2);
                d3 = collinear_deviation(p3, p1, p4, d3);
            }
            if d2.max(d3) < tol {
                out.push(mid);
                return false;
            }
        }
        (false, true) => {
            // p3 is significant.
            if d3 * d3 <= tol * chord2 {
                if !limits.angle_enabled() {
                    out.push(mid);
                    return false;
                }
                let da1 = turn(heading(p3, p4), heading(p2, p3));
                if da1 < limits.angle_tolerance
                    || (limits.cusp_enabled() && da1 > limits.cusp_limit)
                {
                    out.push(mid);
                    return false;
                }
            }
        }
        (true, false) => {
            // p2 is significant.
            if d2 * d2 <= tol * chord2 {
                if !limits.angle_enabled() {
                    out.push(mid);
                    return false;
                }
                let da1 = turn(heading(p2, p3), heading(p1, p2));
                if da1 < limits.angle_tolerance
                    || (limits.cusp_enabled() && da1 > limits.cusp_limit)
                {
                    out.push(mid);
                    return false;
                }
            }
        }
        (true, true) => {
            if (d2 + d3) * (d2 + d3) <= tol * chord2 {
                if !limits.angle_enabled() {
                    out.push(mid);
                    return false;
                }
                let k = heading(p2, p3);
                let da1 = turn(k, heading(p1, p2));
                let da2 = turn(heading(p3, p4), k);
                let cusp = limits.cusp_enabled()
                    && (da1 > limits.cusp_limit || da2 > limits.cusp_limit);
                if da1 + da2 < limits.angle_tolerance || cusp {
                    out.push(mid);
                    return false;
                }
            }
        }
    }
    true
}

/// Squared distance of a collinear control point from the chord `p1..p4`,
/// given its projection parameter `t` along the chord.
fn collinear_deviation(p: Point2, p1: Point2, p4: Point2, t: f64) -> f64 {
    if t <= 0.0 {
        square_distance(p, p1)
    } else if t >= 1.0 {
        square_distance(p, p4)
    } else {
        square_distance(p, p1.lerp(p4, t))
    }
}
