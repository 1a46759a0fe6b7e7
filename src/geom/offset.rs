//! Offset and outline curves for cubic Béziers.
//!
//! An exact offset of a cubic is not a cubic, so the curve is first reduced
//! into pieces that are "simple": both handles on the same side of the chord
//! and end normals within an angle that shrinks as the approximation scale
//! grows. Each piece is then scaled about the point where its end normals
//! cross, which keeps the offset pieces within a small distance of the true
//! parallel curve.
//!
//! # Example
//!
//! ```ignore
//! use curve_kernel::geom::{offset_curve, CubicBezier, SplinePath};
//!
//! let pieces = offset_curve(&curve, 10.0);
//! let path = SplinePath::from_segments(&pieces);
//! ```

use super::bezier::CubicBezier;
use super::core::{Point2, Vec2, fuzzy_eq_nullable, fuzzy_is_null, mm_to_px};
use super::line::{Line2, is_point_on_line};
use super::settings::{CurveSettings, curve_settings};

/// Smallest parameter span tried while searching for simple pieces.
const REDUCE_STEP: f64 = 0.01;

/// Distance along the end normals used to find the scaling origin.
const FOCAL_REACH: f64 = 10.0;

/// Sine of the angle below which two end normals count as parallel.
const PARALLEL_NORMALS: f64 = 1e-9;

/// How control points of a simple piece are moved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ScaleMode {
    /// Constant distance: handles keep their tangent directions and slide
    /// along the rays from the scaling origin.
    #[default]
    Normal,
    /// Variable distance: handles move radially by the distance sampled at
    /// one and two thirds of the piece.
    Function,
}

/// Counters describing how a curve was offset.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OffsetDiagnostics {
    /// Number of simple pieces the curve was reduced into.
    pub reduced_pieces: usize,
    /// Pieces that were straight and only translated.
    pub linear_pieces: usize,
    /// Pieces whose handles were translated because scaling failed.
    pub fallback_pieces: usize,
    /// Joints whose handles were realigned.
    pub smoothed_joints: usize,
}

// ─────────────────────────────────────────────────────────────────────────────
// Public entry points
// ─────────────────────────────────────────────────────────────────────────────

/// Pieces of the curve offset by a constant signed `distance` along
/// [`CubicBezier::normal_at`].
#[must_use]
pub fn offset_curve(curve: &CubicBezier, distance: f64) -> Vec<CubicBezier> {
    offset_curve_with(curve, distance, &curve_settings()).0
}

/// Offset with explicit settings, also reporting diagnostics.
#[must_use]
pub fn offset_curve_with(
    curve: &CubicBezier,
    distance: f64,
    settings: &CurveSettings,
) -> (Vec<CubicBezier>, OffsetDiagnostics) {
    let mut diagnostics = OffsetDiagnostics::default();

    if is_linear(curve) {
        diagnostics.reduced_pieces = 1;
        diagnostics.linear_pieces = 1;
        return (vec![translate_linear(curve, distance)], diagnostics);
    }

    let pieces = reduce(curve, settings);
    diagnostics.reduced_pieces = pieces.len();

    let mut result = Vec::with_capacity(pieces.len());
    for piece in &pieces {
        if is_linear(piece) {
            diagnostics.linear_pieces += 1;
            result.push(translate_linear(piece, distance));
            continue;
        }
        let (scaled, fallback) = scale(piece, |_| distance, ScaleMode::Normal);
        if fallback {
            diagnostics.fallback_pieces += 1;
        }
        result.push(scaled);
    }

    diagnostics.smoothed_joints = smooth_joints(&mut result);
    log_diagnostics("offset", &diagnostics);
    (result, diagnostics)
}

/// Pieces of the curve offset by a distance that varies piecewise linearly
/// through `distances`, spread evenly along the curve length.
///
/// An empty profile gives no pieces, a single distance is a plain offset.
#[must_use]
pub fn outline_curve(curve: &CubicBezier, distances: &[f64]) -> Vec<CubicBezier> {
    outline_curve_with(curve, distances, &curve_settings()).0
}

/// Outline with explicit settings, also reporting diagnostics.
#[must_use]
pub fn outline_curve_with(
    curve: &CubicBezier,
    distances: &[f64],
    settings: &CurveSettings,
) -> (Vec<CubicBezier>, OffsetDiagnostics) {
    match distances {
        [] => return (Vec::new(), OffsetDiagnostics::default()),
        [distance] => return offset_curve_with(curve, *distance, settings),
        _ => {}
    }

    let profile = |v: f64| piecewise_distance(distances, v);
    let pieces = reduce(curve, settings);
    let mut diagnostics = OffsetDiagnostics {
        reduced_pieces: pieces.len(),
        ..OffsetDiagnostics::default()
    };

    let total = curve_length(curve, settings);
    let mut walked = 0.0;
    let mut result = Vec::with_capacity(pieces.len());
    for piece in &pieces {
        let piece_length = curve_length(piece, settings);
        let (v0, v1) = if fuzzy_is_null(total) {
            (0.0, 0.0)
        } else {
            (walked / total, (walked + piece_length) / total)
        };
        walked += piece_length;

        let start = profile(v0);
        let end = profile(v1);
        let (scaled, fallback) =
            scale(piece, |t| remap(t, 0.0, 1.0, start, end), ScaleMode::Function);
        if fallback {
            diagnostics.fallback_pieces += 1;
        }
        result.push(scaled);
    }

    diagnostics.smoothed_joints = smooth_joints(&mut result);
    log_diagnostics("outline", &diagnostics);
    (result, diagnostics)
}

fn log_diagnostics(kind: &str, diagnostics: &OffsetDiagnostics) {
    if diagnostics.fallback_pieces > 0 {
        log::debug!(
            "{kind}: {} of {} pieces used translated handles",
            diagnostics.fallback_pieces,
            diagnostics.reduced_pieces
        );
    }
    crate::debug_log!("{kind}: {diagnostics:?}");
}

fn curve_length(curve: &CubicBezier, settings: &CurveSettings) -> f64 {
    super::curve::path_length(&curve.points_with(settings))
}

/// Linear interpolation of the distance profile at `v` in `[0, 1]`.
fn piecewise_distance(distances: &[f64], v: f64) -> f64 {
    let Some(&last) = distances.last() else {
        return 0.0;
    };
    if distances.len() == 1 {
        return last;
    }
    #[allow(clippy::cast_precision_loss)]
    let spans = (distances.len() - 1) as f64;
    for (i, pair) in distances.windows(2).enumerate() {
        #[allow(clippy::cast_precision_loss)]
        let (from, to) = (i as f64 / spans, (i + 1) as f64 / spans);
        if v >= from && v <= to {
            return remap(v, from, to, pair[0], pair[1]);
        }
    }
    last
}

/// Map `v` from `[domain_start, domain_end]` onto `[range_start, range_end]`.
fn remap(v: f64, domain_start: f64, domain_end: f64, range_start: f64, range_end: f64) -> f64 {
    let span = domain_end - domain_start;
    if span.abs() < 1e-12 {
        return range_start;
    }
    range_start + (v - domain_start) / span * (range_end - range_start)
}

// ─────────────────────────────────────────────────────────────────────────────
// Extrema
// ─────────────────────────────────────────────────────────────────────────────

/// Roots of a Bernstein polynomial given by two (linear) or three
/// (quadratic) coefficients. Other lengths have no roots.
#[must_use]
pub fn derivative_roots(coefficients: &[f64]) -> Vec<f64> {
    match *coefficients {
        [a, b, c] => {
            let d = a - 2.0 * b + c;
            if d != 0.0 {
                let under = b * b - a * c;
                if under < 0.0 {
                    return Vec::new();
                }
                let m1 = -under.sqrt();
                let m2 = b - a;
                vec![-(m1 + m2) / d, -(-m1 + m2) / d]
            } else if b != c {
                vec![(2.0 * b - c) / (2.0 * (b - c))]
            } else {
                Vec::new()
            }
        }
        [a, b] if a != b => vec![a / (a - b)],
        _ => Vec::new(),
    }
}

/// Parameters in `[0, 1]` where either coordinate of the first or second
/// derivative vanishes, sorted and without near duplicates.
#[must_use]
pub fn extrema(curve: &CubicBezier) -> Vec<f64> {
    let p = curve.control();
    let first: Vec<Vec2> = p.windows(2).map(|w| (w[1] - w[0]) * 3.0).collect();
    let second: Vec<Vec2> = first.windows(2).map(|w| (w[1] - w[0]) * 2.0).collect();

    let mut roots = Vec::new();
    for derivative in [&first, &second] {
        let xs: Vec<f64> = derivative.iter().map(|v| v.x).collect();
        let ys: Vec<f64> = derivative.iter().map(|v| v.y).collect();
        roots.extend(derivative_roots(&xs));
        roots.extend(derivative_roots(&ys));
    }

    roots.retain(|t| (0.0..=1.0).contains(t));
    roots.sort_by(f64::total_cmp);
    roots.dedup_by(|a, b| fuzzy_eq_nullable(*a, *b));
    roots
}

// ─────────────────────────────────────────────────────────────────────────────
// Splitting
// ─────────────────────────────────────────────────────────────────────────────

/// Split at `t`, dropping the cut point.
#[must_use]
pub fn split_at(curve: &CubicBezier, t: f64) -> (CubicBezier, CubicBezier) {
    let (left, right, _) = curve.cut_at_parameter(t);
    (left, right)
}

/// The part of the curve between parameters `t1` and `t2`.
#[must_use]
pub fn split_range(curve: &CubicBezier, t1: f64, t2: f64) -> CubicBezier {
    if fuzzy_is_null(t1) && !fuzzy_is_null(t2) {
        return split_at(curve, t2).0;
    }
    if fuzzy_eq_nullable(t2, 1.0) {
        return split_at(curve, t1).1;
    }
    let right = split_at(curve, t1).1;
    split_at(&right, remap(t2, t1, 1.0, 0.0, 1.0)).0
}

fn derived(curve: &CubicBezier, control: [Point2; 4]) -> CubicBezier {
    CubicBezier::from_control(control)
        .with_approximation_scale(curve.approximation_scale)
        .with_k_curve(curve.k_curve)
}

// ─────────────────────────────────────────────────────────────────────────────
// Reduction
// ─────────────────────────────────────────────────────────────────────────────

/// Angle at `origin` from `a` to `b`, radians in `(-π, π]`.
fn signed_angle(origin: Point2, a: Point2, b: Point2) -> f64 {
    let v1 = a - origin;
    let v2 = b - origin;
    v1.cross(v2).atan2(v1.dot(v2))
}

/// Largest angle between end normals of a simple piece, in degrees.
#[must_use]
pub fn normal_angle_threshold(scale: f64) -> f64 {
    if scale <= 2.0 {
        60.0
    } else if scale <= 4.0 {
        30.0
    } else if scale <= 6.0 {
        15.0
    } else if scale <= 8.0 {
        7.5
    } else {
        3.75
    }
}

/// `true` when both handles lie on the same side of the chord and the end
/// normals are close enough for scaling to stay accurate.
#[must_use]
pub fn is_simple(curve: &CubicBezier, settings: &CurveSettings) -> bool {
    let a1 = signed_angle(curve.p1, curve.p4, curve.p2);
    let a2 = signed_angle(curve.p1, curve.p4, curve.p3);
    if (a1 > 0.0 && a2 < 0.0) || (a1 < 0.0 && a2 > 0.0) {
        return false;
    }

    let n0 = curve.normal_at(0.0);
    let n1 = curve.normal_at(1.0);
    let angle = n0.dot(n1).clamp(-1.0, 1.0).acos().abs();
    let scale = settings.effective_scale(curve.approximation_scale);
    angle < normal_angle_threshold(scale).to_radians()
}

/// `true` when both handles lie on the line through the end points.
#[must_use]
pub fn is_linear(curve: &CubicBezier) -> bool {
    let chord = Line2::new(curve.p1, curve.p4);
    let accuracy = mm_to_px(1e-9);
    is_point_on_line(curve.p2, chord, accuracy) && is_point_on_line(curve.p3, chord, accuracy)
}

/// Split the curve at its extrema, then greedily into the longest simple
/// pieces found by bisection.
#[must_use]
pub fn reduce(curve: &CubicBezier, settings: &CurveSettings) -> Vec<CubicBezier> {
    let mut breaks = extrema(curve);
    if breaks.first().is_none_or(|t| !fuzzy_is_null(*t)) {
        breaks.insert(0, 0.0);
    }
    if breaks.last().is_none_or(|t| !fuzzy_eq_nullable(*t, 1.0)) {
        breaks.push(1.0);
    }

    let coarse: Vec<CubicBezier> = breaks
        .windows(2)
        .map(|w| split_range(curve, w[0], w[1]))
        .collect();

    let precision = REDUCE_STEP / 16.0;
    let mut pieces = Vec::new();
    for segment in &coarse {
        let mut t1 = 0.0;
        while t1 < 1.0 - precision {
            let mut low = t1 + REDUCE_STEP;
            let mut high = 1.0;
            if low >= 1.0 - precision {
                pieces.push(split_range(segment, t1, 1.0));
                break;
            }

            let mut best = split_range(segment, t1, low);
            let mut best_t2 = low;
            while high - low > precision {
                let mid = (low + high) / 2.0;
                let candidate = split_range(segment, t1, mid);
                if is_simple(&candidate, settings) {
                    low = mid;
                    best = candidate;
                    best_t2 = mid;
                } else {
                    high = mid;
                }
            }
            // Bisection stops short of the end, close the gap.
            if 1.0 - best_t2 <= precision {
                best = split_range(segment, t1, 1.0);
                best_t2 = 1.0;
            }
            pieces.push(best);
            t1 = best_t2;
        }
    }
    crate::debug_log!("reduce: {} extrema spans, {} pieces", coarse.len(), pieces.len());
    pieces
}

// ─────────────────────────────────────────────────────────────────────────────
// Scaling
// ─────────────────────────────────────────────────────────────────────────────

fn translate_linear(curve: &CubicBezier, distance: f64) -> CubicBezier {
    let mut normal = curve.normal_at(0.0);
    if normal == Vec2::ZERO {
        normal = (curve.p4 - curve.p1).perp().normalized().unwrap_or(Vec2::ZERO);
    }
    let shift = normal * distance;
    derived(curve, curve.control().map(|p| p + shift))
}

/// Keep each handle's vector relative to its own end point after the end
/// points moved to `start` and `end`.
#[must_use]
pub fn fallback_translation(curve: &CubicBezier, start: Point2, end: Point2) -> CubicBezier {
    derived(
        curve,
        [start, start + (curve.p2 - curve.p1), end + (curve.p3 - curve.p4), end],
    )
}

/// Scale a simple piece away from the crossing of its end normals.
///
/// `distance` is sampled over the piece parameter. Returns the new piece and
/// whether the handle fallback was used.
#[must_use]
pub fn scale(
    curve: &CubicBezier,
    distance: impl Fn(f64) -> f64,
    mode: ScaleMode,
) -> (CubicBezier, bool) {
    let d0 = distance(0.0);
    let d1 = distance(1.0);
    let n0 = curve.normal_at(0.0);
    let n1 = curve.normal_at(1.0);
    let start = curve.p1 + n0 * d0;
    let end = curve.p4 + n1 * d1;

    // Parallel end normals cross far away or not at all.
    let focal = if n0.cross(n1).abs() < PARALLEL_NORMALS {
        None
    } else {
        Line2::new(curve.p1 + n0 * FOCAL_REACH, curve.p1)
            .intersect(Line2::new(curve.p4 + n1 * FOCAL_REACH, curve.p4))
            .point()
    };
    let Some(focal) = focal else {
        return (fallback_translation(curve, start, end), true);
    };

    let handles = [curve.p2, curve.p3];
    let ends = [start, end];
    let mut moved = [Point2::ORIGIN; 2];
    for (i, handle) in handles.into_iter().enumerate() {
        let placed = match mode {
            ScaleMode::Normal => {
                #[allow(clippy::cast_precision_loss)]
                let tangent = curve.derivative_at(i as f64);
                let anchor = ends[i];
                Line2::new(anchor, anchor + tangent)
                    .intersect(Line2::new(focal, handle))
                    .point()
            }
            ScaleMode::Function => {
                #[allow(clippy::cast_precision_loss)]
                let mut r = distance((i as f64 + 1.0) / 3.0);
                if !is_clockwise(curve) {
                    r = -r;
                }
                (handle - focal).normalized().map(|ray| handle + ray * r)
            }
        };
        match placed {
            Some(p) => moved[i] = p,
            None => return (fallback_translation(curve, start, end), true),
        }
    }

    (derived(curve, [start, moved[0], moved[1], end]), false)
}

fn is_clockwise(curve: &CubicBezier) -> bool {
    signed_angle(curve.p1, curve.p4, curve.p2) > 0.0
}

// ─────────────────────────────────────────────────────────────────────────────
// Joints
// ─────────────────────────────────────────────────────────────────────────────

/// Realign the handles around each joint so consecutive pieces share a
/// tangent, keeping handle lengths. Returns the number of joints changed.
pub fn smooth_joints(pieces: &mut [CubicBezier]) -> usize {
    let mut changed = 0;
    for i in 1..pieces.len() {
        let anchor = pieces[i - 1].p4;
        let incoming = anchor - pieces[i - 1].p3;
        let outgoing = pieces[i].p2 - anchor;
        let len_in = incoming.length();
        let len_out = outgoing.length();
        if fuzzy_is_null(len_in) || fuzzy_is_null(len_out) {
            continue;
        }
        let Some(direction) = (incoming / len_in + outgoing / len_out).normalized() else {
            continue;
        };
        pieces[i - 1].p3 = anchor - direction * len_in;
        pieces[i].p2 = anchor + direction * len_out;
        changed += 1;
    }
    changed
}
