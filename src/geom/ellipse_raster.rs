//! Fixed-point ellipse rasterizer.
//!
//! Generates points along an elliptical arc from a pair of conjugate radius
//! vectors using the incremental circle generator `u -= v >> k; v += u >> k`.
//! Arithmetic is 16.16 fixed point, so inputs must stay well below 32768 in
//! magnitude. Callers scale large ellipses down first (see [`MAX_RADIUS`]).

use std::f64::consts::TAU;

use super::core::{ACCURACY_POINT_ON_LINE, MAX_SCENE_SIZE, Point2};
use super::fixed::Fixed16;
use super::settings::MAX_APPROXIMATION_SCALE;

/// Allowed deviation of the polyline from the true ellipse at maximum scale.
pub const TOLERANCE: f64 = ACCURACY_POINT_ON_LINE / 8.0;

/// Largest radius rasterized directly.
pub const MAX_RADIUS: f64 = 10_000.0;

/// Upper bound of the angular increment exponent.
#[must_use]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn max_increment() -> u32 {
    (0.5 * (MAX_SCENE_SIZE / (8.0 * TOLERANCE)).log2()).round() as u32
}

/// Cheap vector length, within a few percent of the euclidean one.
#[must_use]
pub fn approx_len(x: Fixed16, y: Fixed16) -> Fixed16 {
    let x = x.abs();
    let y = y.abs();
    if x > y {
        x + (y.div_int(8)).max(y.div_int(2) - x.div_int(8))
    } else {
        y + (x.div_int(8)).max(x.div_int(2) - y.div_int(8))
    }
}

/// Radius of a circle enclosing the ellipse spanned by `P` and `Q`.
#[must_use]
pub fn aux_radius(xp: Fixed16, yp: Fixed16, xq: Fixed16, yq: Fixed16) -> Fixed16 {
    let dp = approx_len(xp, yp);
    let dq = approx_len(xq, yq);
    let dj = approx_len(xp + xq, yp + yq);
    let dk = approx_len(xp - xq, yp - yq);
    let r1 = dp.max(dq);
    let r2 = dj.max(dk);
    (r1 + r1.div_int(16)).max(r2 - r2.div_int(4))
}

/// Exponent `k` of the angular step `2^-k` radians that keeps the chord error
/// under `flatness`.
#[must_use]
pub fn angular_increment(
    xp: Fixed16,
    yp: Fixed16,
    xq: Fixed16,
    yq: Fixed16,
    flatness: Fixed16,
) -> u32 {
    let r = aux_radius(xp, yp, xq, yq);
    // 2nd and 4th order error terms.
    let mut err2 = r >> 3;
    let mut err4 = r >> 7;
    let kmax = max_increment();
    for k in 0..kmax {
        if flatness >= err2 + err4 {
            return k;
        }
        err2 >>= 2;
        err4 >>= 4;
    }
    kmax
}

/// One step of the circle generator.
pub fn circle_step(u: &mut Fixed16, v: &mut Fixed16, k: u32) {
    *u -= *v >> k;
    *v += *u >> k;
}

/// Half-step correction of the starting `u` so the generator stays on the
/// ellipse instead of spiralling.
#[must_use]
pub fn initial_value(u0: Fixed16, v0: Fixed16, k: u32) -> Fixed16 {
    let shift = 2 * k + 3;
    let mut w = u0 >> shift;

    let mut u = u0 - w + (v0 >> (k + 1));
    w >>= shift + 1;
    u -= w;
    w >>= shift;
    u -= w;
    u
}

/// Points from `P` sweeping towards `Q` through `sweep` radians. The end
/// point is not included.
#[must_use]
pub fn ellipse_core(
    mut xp: Fixed16,
    mut yp: Fixed16,
    xq: Fixed16,
    yq: Fixed16,
    sweep: Fixed16,
    flatness: Fixed16,
) -> Vec<Point2> {
    let k = angular_increment(xp, yp, xq, yq, flatness).min(16);
    #[allow(clippy::cast_sign_loss)]
    let count = (sweep.raw() as u32) >> (16 - k);

    let mut arc = Vec::with_capacity(count as usize + 2);
    arc.push(Point2::new(xp.to_f64(), yp.to_f64()));

    let mut xq = initial_value(xq, xp, k);
    let mut yq = initial_value(yq, yp, k);

    for _ in 0..count {
        circle_step(&mut xq, &mut xp, k);
        circle_step(&mut yq, &mut yp, k);
        arc.push(Point2::new(xp.to_f64(), yp.to_f64()));
    }
    arc
}

/// Rasterize an axis-aligned elliptical arc centred on the origin.
///
/// Angles are parametric and in radians. `start` rotates the conjugate pair,
/// a negative `sweep` runs clockwise on screen. `approximation_scale` must be
/// already resolved to a valid scale.
#[must_use]
pub fn elliptic_arc_points(
    radius1: f64,
    radius2: f64,
    start: f64,
    sweep: f64,
    approximation_scale: f64,
) -> Vec<Point2> {
    let mut xp = Fixed16::from_f64(radius1);
    let mut yp = Fixed16::ZERO;
    let mut xq = Fixed16::ZERO;
    let mut yq = Fixed16::from_f64(-radius2);

    if start.abs() > 1e-12 {
        let cosa = Fixed16::from_f64(start.cos());
        let sina = Fixed16::from_f64(start.sin());
        let x = xp * cosa + xq * sina;
        let y = yp * cosa + yq * sina;
        xq = xq * cosa - xp * sina;
        yq = yq * cosa - yp * sina;
        xp = x;
        yp = y;
    }

    let mut sweep = sweep;
    if sweep < 0.0 {
        xq = -xq;
        yq = -yq;
        sweep = -sweep;
    }

    let flatness = Fixed16::from_f64(MAX_APPROXIMATION_SCALE / approximation_scale * TOLERANCE);
    let mut arc = ellipse_core(xp, yp, xq, yq, Fixed16::from_f64(sweep), flatness);

    let cosb = Fixed16::from_f64(sweep.cos());
    let sinb = Fixed16::from_f64(sweep.sin());
    let x = xp * cosb + xq * sinb;
    let y = yp * cosb + yq * sinb;
    arc.push(Point2::new(x.to_f64(), y.to_f64()));
    arc
}

/// Closed ellipse outline, first and last points coincide.
#[must_use]
pub fn full_ellipse_points(radius1: f64, radius2: f64, approximation_scale: f64) -> Vec<Point2> {
    elliptic_arc_points(radius1, radius2, 0.0, TAU, approximation_scale)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fx(v: f64) -> Fixed16 {
        Fixed16::from_f64(v)
    }

    #[test]
    fn test_approx_len_is_close() {
        let len = approx_len(fx(3.0), fx(4.0)).to_f64();
        assert!((len - 5.0).abs() < 0.5);
        assert_eq!(approx_len(fx(-7.0), Fixed16::ZERO), fx(7.0));
    }

    #[test]
    fn test_increment_grows_with_finer_flatness() {
        let r = fx(100.0);
        let coarse = angular_increment(r, Fixed16::ZERO, Fixed16::ZERO, -r, fx(2.0));
        let fine = angular_increment(r, Fixed16::ZERO, Fixed16::ZERO, -r, fx(0.01));
        assert!(fine > coarse);
        assert!(fine <= max_increment());
    }

    #[test]
    fn test_quarter_circle_stays_on_circle() {
        let points = elliptic_arc_points(100.0, 100.0, 0.0, std::f64::consts::FRAC_PI_2, 10.0);
        assert!(points.len() > 10);
        assert!(points[0].distance_to(Point2::new(100.0, 0.0)) < 1e-3);
        let last = points[points.len() - 1];
        assert!(last.distance_to(Point2::new(0.0, -100.0)) < 1e-3);
        for p in &points {
            let r = p.to_vec2().length();
            assert!((r - 100.0).abs() < 0.5, "radius {r}");
        }
    }

    #[test]
    fn test_negative_sweep_runs_clockwise() {
        let points = elliptic_arc_points(50.0, 20.0, 0.0, -std::f64::consts::FRAC_PI_2, 10.0);
        let last = points[points.len() - 1];
        assert!(last.distance_to(Point2::new(0.0, 20.0)) < 1e-3);
        assert!(points[1].y > 0.0);
    }

    #[test]
    fn test_full_ellipse_closes() {
        let points = full_ellipse_points(80.0, 40.0, 1.0);
        let first = points[0];
        let last = points[points.len() - 1];
        assert!(first.distance_to(last) < 1e-3);
        assert!(points.iter().all(|p| p.x.abs() <= 80.5 && p.y.abs() <= 40.5));
    }
}
