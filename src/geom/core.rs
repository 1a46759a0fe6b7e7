use std::ops::{Add, AddAssign, Div, Mul, Neg, Sub};

use serde::{Deserialize, Serialize};

// ─────────────────────────────────────────────────────────────────────────────
// Units
// ─────────────────────────────────────────────────────────────────────────────

/// Resolution used to map physical units onto scene pixels.
pub const PRINT_DPI: f64 = 96.0;

/// Convert millimetres to scene pixels.
#[must_use]
pub const fn mm_to_px(mm: f64) -> f64 {
    mm / 25.4 * PRINT_DPI
}

/// Convert scene pixels to millimetres.
#[must_use]
pub const fn px_to_mm(px: f64) -> f64 {
    px / PRINT_DPI * 25.4
}

/// Distance under which two points are treated as the same point.
pub const ACCURACY_POINT_ON_LINE: f64 = mm_to_px(0.1555);

/// Largest coordinate span the scene is expected to hold.
pub const MAX_SCENE_SIZE: f64 = mm_to_px(20_000.0);

// ─────────────────────────────────────────────────────────────────────────────
// Fuzzy comparisons
// ─────────────────────────────────────────────────────────────────────────────

/// `true` when `d` is indistinguishable from zero at double precision.
#[must_use]
pub fn fuzzy_is_null(d: f64) -> bool {
    d.abs() <= Tolerance::ZERO_LENGTH.eps
}

/// Relative comparison. Never true when one side is exactly zero, use
/// [`fuzzy_eq_nullable`] for values that may be zero.
#[must_use]
pub fn fuzzy_eq(a: f64, b: f64) -> bool {
    (a - b).abs() * 1e12 <= a.abs().min(b.abs())
}

#[must_use]
pub fn fuzzy_eq_nullable(a: f64, b: f64) -> bool {
    if fuzzy_is_null(a) {
        fuzzy_is_null(b)
    } else if fuzzy_is_null(b) {
        false
    } else {
        fuzzy_eq(a, b)
    }
}

/// Point equality within `accuracy` pixels.
#[must_use]
pub fn fuzzy_eq_points(a: Point2, b: Point2, accuracy: f64) -> bool {
    a.distance_to(b) <= accuracy
}

/// Normalize an angle in degrees into `[0, 360)`.
#[must_use]
pub fn normalize_angle(degrees: f64) -> f64 {
    if !degrees.is_finite() {
        return 0.0;
    }
    let a = degrees.rem_euclid(360.0);
    if fuzzy_eq(a, 360.0) { 0.0 } else { a }
}

// ─────────────────────────────────────────────────────────────────────────────
// Vec2
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Vec2 {
    pub x: f64,
    pub y: f64,
}

impl Vec2 {
    pub const ZERO: Self = Self::new(0.0, 0.0);

    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Vector of `length` pointing along the screen angle `degrees`.
    #[must_use]
    pub fn from_polar(degrees: f64, length: f64) -> Self {
        let r = degrees.to_radians();
        Self::new(length * r.cos(), -length * r.sin())
    }

    #[must_use]
    pub fn length(self) -> f64 {
        self.x.hypot(self.y)
    }

    #[must_use]
    pub const fn length_squared(self) -> f64 {
        self.dot(self)
    }

    #[must_use]
    pub const fn dot(self, rhs: Self) -> f64 {
        self.x * rhs.x + self.y * rhs.y
    }

    /// Z component of the 3D cross product.
    #[must_use]
    pub const fn cross(self, rhs: Self) -> f64 {
        self.x * rhs.y - self.y * rhs.x
    }

    #[must_use]
    pub fn normalized(self) -> Option<Self> {
        let len = self.length();
        if len.is_finite() && len > Tolerance::ZERO_LENGTH.eps {
            Some(Self::new(self.x / len, self.y / len))
        } else {
            None
        }
    }

    /// Rotated by +90 degrees in math orientation: `(-y, x)`.
    #[must_use]
    pub const fn perp(self) -> Self {
        Self::new(-self.y, self.x)
    }

    /// Screen angle of the vector in degrees, `[0, 360)`.
    #[must_use]
    pub fn angle(self) -> f64 {
        if self.x == 0.0 && self.y == 0.0 {
            return 0.0;
        }
        normalize_angle((-self.y).atan2(self.x).to_degrees())
    }
}

impl Default for Vec2 {
    fn default() -> Self {
        Self::ZERO
    }
}

impl Add for Vec2 {
    type Output = Self;
    fn add(self, rhs: Self) -> Self::Output {
        Self::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for Vec2 {
    type Output = Self;
    fn sub(self, rhs: Self) -> Self::Output {
        Self::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl Mul<f64> for Vec2 {
    type Output = Self;
    fn mul(self, rhs: f64) -> Self::Output {
        Self::new(self.x * rhs, self.y * rhs)
    }
}

impl Mul<Vec2> for f64 {
    type Output = Vec2;
    fn mul(self, rhs: Vec2) -> Self::Output {
        Vec2::new(self * rhs.x, self * rhs.y)
    }
}

impl Div<f64> for Vec2 {
    type Output = Self;
    fn div(self, rhs: f64) -> Self::Output {
        Self::new(self.x / rhs, self.y / rhs)
    }
}

impl Neg for Vec2 {
    type Output = Self;
    fn neg(self) -> Self::Output {
        Self::new(-self.x, -self.y)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Point2
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point2 {
    pub x: f64,
    pub y: f64,
}

impl Point2 {
    pub const ORIGIN: Self = Self::new(0.0, 0.0);

    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    #[must_use]
    pub const fn to_vec2(self) -> Vec2 {
        Vec2::new(self.x, self.y)
    }

    #[must_use]
    pub fn lerp(self, rhs: Self, t: f64) -> Self {
        Self::new(
            self.x + (rhs.x - self.x) * t,
            self.y + (rhs.y - self.y) * t,
        )
    }

    #[must_use]
    pub fn midpoint(self, rhs: Self) -> Self {
        Self::new((self.x + rhs.x) * 0.5, (self.y + rhs.y) * 0.5)
    }

    #[must_use]
    pub fn distance_to(self, other: Self) -> f64 {
        (self - other).length()
    }

    #[must_use]
    pub fn distance_squared_to(self, other: Self) -> f64 {
        (self - other).length_squared()
    }

    /// Point reached by walking `length` along the screen angle `degrees`.
    #[must_use]
    pub fn polar(self, degrees: f64, length: f64) -> Self {
        self + Vec2::from_polar(degrees, length)
    }

    /// Screen angle of the direction from `self` to `other`.
    #[must_use]
    pub fn angle_to(self, other: Self) -> f64 {
        (other - self).angle()
    }

    /// Rotate around `origin` by `degrees`, counter-clockwise on screen.
    #[must_use]
    pub fn rotate(self, origin: Self, degrees: f64) -> Self {
        Transform2::rotate_around(origin, degrees).apply_point(self)
    }

    /// Mirror across the infinite line through `a` and `b`.
    #[must_use]
    pub fn flip(self, a: Self, b: Self) -> Self {
        Transform2::reflect(a, b).apply_point(self)
    }

    /// Translate by `length` along the screen angle `degrees`.
    #[must_use]
    pub fn move_by(self, length: f64, degrees: f64) -> Self {
        self.polar(degrees, length)
    }
}

impl Add<Vec2> for Point2 {
    type Output = Self;
    fn add(self, rhs: Vec2) -> Self::Output {
        Self::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl AddAssign<Vec2> for Point2 {
    fn add_assign(&mut self, rhs: Vec2) {
        self.x += rhs.x;
        self.y += rhs.y;
    }
}

impl Sub<Vec2> for Point2 {
    type Output = Self;
    fn sub(self, rhs: Vec2) -> Self::Output {
        Self::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl Sub for Point2 {
    type Output = Vec2;
    fn sub(self, rhs: Self) -> Self::Output {
        Vec2::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl From<Vec2> for Point2 {
    fn from(v: Vec2) -> Self {
        Self::new(v.x, v.y)
    }
}

impl From<(f64, f64)> for Point2 {
    fn from((x, y): (f64, f64)) -> Self {
        Self::new(x, y)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Transform2
// ─────────────────────────────────────────────────────────────────────────────

/// Affine 2D transform stored as the top two rows of a 3x3 matrix.
///
/// `a.compose(b)` applies `b` first, then `a`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Transform2 {
    m: [[f64; 3]; 2],
}

impl Transform2 {
    #[must_use]
    pub const fn identity() -> Self {
        Self {
            m: [[1.0, 0.0, 0.0], [0.0, 1.0, 0.0]],
        }
    }

    #[must_use]
    pub const fn translate(offset: Vec2) -> Self {
        Self {
            m: [[1.0, 0.0, offset.x], [0.0, 1.0, offset.y]],
        }
    }

    #[must_use]
    pub const fn scale(sx: f64, sy: f64) -> Self {
        Self {
            m: [[sx, 0.0, 0.0], [0.0, sy, 0.0]],
        }
    }

    /// Rotation about the origin, counter-clockwise on screen (y down).
    #[must_use]
    pub fn rotate(degrees: f64) -> Self {
        let (s, c) = degrees.to_radians().sin_cos();
        Self {
            m: [[c, s, 0.0], [-s, c, 0.0]],
        }
    }

    #[must_use]
    pub fn rotate_around(origin: Point2, degrees: f64) -> Self {
        Self::translate(origin.to_vec2())
            .compose(Self::rotate(degrees))
            .compose(Self::translate(-origin.to_vec2()))
    }

    /// Reflection across the line through `a` and `b`. Degenerate axes give
    /// the identity.
    #[must_use]
    pub fn reflect(a: Point2, b: Point2) -> Self {
        let Some(u) = (b - a).normalized() else {
            return Self::identity();
        };
        let r00 = u.x * u.x - u.y * u.y;
        let r01 = 2.0 * u.x * u.y;
        let r11 = u.y * u.y - u.x * u.x;
        Self {
            m: [
                [r00, r01, a.x - (r00 * a.x + r01 * a.y)],
                [r01, r11, a.y - (r01 * a.x + r11 * a.y)],
            ],
        }
    }

    #[must_use]
    pub fn compose(self, other: Self) -> Self {
        let a = &self.m;
        let b = &other.m;
        Self {
            m: [
                [
                    a[0][0] * b[0][0] + a[0][1] * b[1][0],
                    a[0][0] * b[0][1] + a[0][1] * b[1][1],
                    a[0][0] * b[0][2] + a[0][1] * b[1][2] + a[0][2],
                ],
                [
                    a[1][0] * b[0][0] + a[1][1] * b[1][0],
                    a[1][0] * b[0][1] + a[1][1] * b[1][1],
                    a[1][0] * b[0][2] + a[1][1] * b[1][2] + a[1][2],
                ],
            ],
        }
    }

    #[must_use]
    pub fn determinant(self) -> f64 {
        self.m[0][0] * self.m[1][1] - self.m[0][1] * self.m[1][0]
    }

    /// `true` when the transform reverses orientation.
    #[must_use]
    pub fn is_mirroring(self) -> bool {
        self.determinant() < 0.0
    }

    /// Returns `None` if the matrix is singular.
    #[must_use]
    pub fn inverse(self) -> Option<Self> {
        let det = self.determinant();
        if !det.is_finite() || det.abs() < 1e-15 {
            return None;
        }
        let m = &self.m;
        let i00 = m[1][1] / det;
        let i01 = -m[0][1] / det;
        let i10 = -m[1][0] / det;
        let i11 = m[0][0] / det;
        Some(Self {
            m: [
                [i00, i01, -(i00 * m[0][2] + i01 * m[1][2])],
                [i10, i11, -(i10 * m[0][2] + i11 * m[1][2])],
            ],
        })
    }

    #[must_use]
    pub fn apply_point(self, p: Point2) -> Point2 {
        Point2::new(
            self.m[0][0] * p.x + self.m[0][1] * p.y + self.m[0][2],
            self.m[1][0] * p.x + self.m[1][1] * p.y + self.m[1][2],
        )
    }

    #[must_use]
    pub fn apply_vec(self, v: Vec2) -> Vec2 {
        Vec2::new(
            self.m[0][0] * v.x + self.m[0][1] * v.y,
            self.m[1][0] * v.x + self.m[1][1] * v.y,
        )
    }
}

impl Default for Transform2 {
    fn default() -> Self {
        Self::identity()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// BBox2
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BBox2 {
    pub min: Point2,
    pub max: Point2,
}

impl BBox2 {
    #[must_use]
    pub fn new(a: Point2, b: Point2) -> Self {
        Self {
            min: Point2::new(a.x.min(b.x), a.y.min(b.y)),
            max: Point2::new(a.x.max(b.x), a.y.max(b.y)),
        }
    }

    #[must_use]
    pub fn from_points(points: &[Point2]) -> Option<Self> {
        let (first, rest) = points.split_first()?;
        Some(rest.iter().fold(Self::new(*first, *first), |b, p| {
            Self {
                min: Point2::new(b.min.x.min(p.x), b.min.y.min(p.y)),
                max: Point2::new(b.max.x.max(p.x), b.max.y.max(p.y)),
            }
        }))
    }

    #[must_use]
    pub fn expand_by(self, margin: f64) -> Self {
        Self {
            min: Point2::new(self.min.x - margin, self.min.y - margin),
            max: Point2::new(self.max.x + margin, self.max.y + margin),
        }
    }

    #[must_use]
    pub fn contains(self, p: Point2) -> bool {
        p.x >= self.min.x && p.x <= self.max.x && p.y >= self.min.y && p.y <= self.max.y
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tolerance
// ─────────────────────────────────────────────────────────────────────────────

/// Tolerance configuration for geometric comparisons.
///
/// - `Tolerance::DEFAULT` - general comparisons (1e-9)
/// - `Tolerance::ZERO_LENGTH` - degenerate vectors and fuzzy zero (1e-12)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tolerance {
    pub eps: f64,
}

impl Tolerance {
    pub const DEFAULT: Self = Self { eps: 1e-9 };

    pub const ZERO_LENGTH: Self = Self { eps: 1e-12 };

    #[must_use]
    pub const fn eps_squared(self) -> f64 {
        self.eps * self.eps
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_units() {
        assert!((mm_to_px(25.4) - 96.0).abs() < 1e-12);
        assert!((px_to_mm(96.0) - 25.4).abs() < 1e-12);
        assert!((ACCURACY_POINT_ON_LINE - 0.1555 / 25.4 * 96.0).abs() < 1e-12);
    }

    #[test]
    fn test_screen_angle_convention() {
        // y points down, so "up" on screen is 90 degrees.
        assert!((Vec2::new(0.0, -1.0).angle() - 90.0).abs() < 1e-12);
        assert!((Vec2::new(-1.0, 0.0).angle() - 180.0).abs() < 1e-12);
        assert!((Vec2::new(0.0, 1.0).angle() - 270.0).abs() < 1e-12);

        let p = Point2::ORIGIN.polar(90.0, 10.0);
        assert!(p.x.abs() < 1e-12);
        assert!((p.y + 10.0).abs() < 1e-12);
    }

    #[test]
    fn test_normalize_angle() {
        assert!((normalize_angle(-90.0) - 270.0).abs() < 1e-12);
        assert!((normalize_angle(720.0 + 45.0) - 45.0).abs() < 1e-12);
        assert_eq!(normalize_angle(360.0), 0.0);
        assert_eq!(normalize_angle(f64::NAN), 0.0);
    }

    #[test]
    fn test_fuzzy() {
        assert!(fuzzy_is_null(1e-13));
        assert!(!fuzzy_is_null(1e-9));
        assert!(fuzzy_eq(100.0, 100.0 + 1e-11));
        assert!(!fuzzy_eq(0.0, 0.0));
        assert!(fuzzy_eq_nullable(0.0, 1e-14));
        assert!(!fuzzy_eq_nullable(0.0, 1.0));
    }

    #[test]
    fn test_rotate_point() {
        let p = Point2::new(10.0, 0.0).rotate(Point2::ORIGIN, 90.0);
        assert!(p.x.abs() < 1e-9);
        assert!((p.y + 10.0).abs() < 1e-9);
    }

    #[test]
    fn test_reflect() {
        let t = Transform2::reflect(Point2::new(0.0, 5.0), Point2::new(10.0, 5.0));
        let p = t.apply_point(Point2::new(3.0, 1.0));
        assert!((p.x - 3.0).abs() < 1e-12);
        assert!((p.y - 9.0).abs() < 1e-12);
        assert!(t.is_mirroring());
        assert!(!Transform2::rotate(33.0).is_mirroring());
    }

    #[test]
    fn test_compose_and_inverse() {
        let a = Transform2::translate(Vec2::new(5.0, -2.0));
        let b = Transform2::rotate(30.0);
        let ab = a.compose(b);
        let p = Point2::new(1.0, 2.0);
        let expected = a.apply_point(b.apply_point(p));
        assert!(ab.apply_point(p).distance_to(expected) < 1e-12);

        let inv = ab.inverse().unwrap();
        assert!(inv.apply_point(ab.apply_point(p)).distance_to(p) < 1e-12);
        assert!(Transform2::scale(0.0, 1.0).inverse().is_none());
    }

    #[test]
    fn test_bbox() {
        let b = BBox2::from_points(&[Point2::new(1.0, 3.0), Point2::new(-1.0, 2.0)]).unwrap();
        assert_eq!(b.min, Point2::new(-1.0, 2.0));
        assert_eq!(b.max, Point2::new(1.0, 3.0));
        assert!(b.contains(Point2::new(0.0, 2.5)));
        assert!(!b.contains(Point2::new(0.0, 3.5)));
        assert!(b.expand_by(1.0).contains(Point2::new(0.0, 3.5)));
        assert!(BBox2::from_points(&[]).is_none());
    }
}
