use serde::{Deserialize, Serialize};

use super::arc::CircularArc;
use super::core::Point2;
use super::curve::Curve2;
use super::elliptical_arc::EllipticalArc;
use super::error::CurveError;
use super::line::Line2;
use super::settings::{CurveSettings, curve_settings};
use super::spline_path::SplinePath;

/// Either kind of arc, for code that handles both uniformly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ArcCurve {
    Circular(CircularArc),
    Elliptical(EllipticalArc),
}

impl ArcCurve {
    #[must_use]
    pub const fn is_flipped(&self) -> bool {
        match self {
            Self::Circular(arc) => arc.flipped,
            Self::Elliptical(arc) => arc.flipped,
        }
    }

    #[must_use]
    pub fn p1(&self) -> Point2 {
        match self {
            Self::Circular(arc) => arc.p1(),
            Self::Elliptical(arc) => arc.p1(),
        }
    }

    #[must_use]
    pub fn p2(&self) -> Point2 {
        match self {
            Self::Circular(arc) => arc.p2(),
            Self::Elliptical(arc) => arc.p2(),
        }
    }

    #[must_use]
    pub fn to_spline_path(&self) -> SplinePath {
        match self {
            Self::Circular(arc) => arc.to_spline_path(),
            Self::Elliptical(arc) => arc.to_spline_path(),
        }
    }

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
        Ok(match self {
            Self::Circular(arc) => {
                let (a, b, p) = arc.cut_with(length, point, settings)?;
                (Self::Circular(a), Self::Circular(b), p)
            }
            Self::Elliptical(arc) => {
                let (a, b, p) = arc.cut_with(length, point, settings)?;
                (Self::Elliptical(a), Self::Elliptical(b), p)
            }
        })
    }

    #[must_use]
    pub fn rotate(&self, origin: Point2, degrees: f64, suffix: &str) -> Self {
        match self {
            Self::Circular(arc) => Self::Circular(arc.rotate(origin, degrees, suffix)),
            Self::Elliptical(arc) => Self::Elliptical(arc.rotate(origin, degrees, suffix)),
        }
    }

    #[must_use]
    pub fn flip(&self, axis: Line2, suffix: &str) -> Self {
        match self {
            Self::Circular(arc) => Self::Circular(arc.flip(axis, suffix)),
            Self::Elliptical(arc) => Self::Elliptical(arc.flip(axis, suffix)),
        }
    }

    #[must_use]
    pub fn move_by(&self, length: f64, degrees: f64, suffix: &str) -> Self {
        match self {
            Self::Circular(arc) => Self::Circular(arc.move_by(length, degrees, suffix)),
            Self::Elliptical(arc) => Self::Elliptical(arc.move_by(length, degrees, suffix)),
        }
    }
}

impl Curve2 for ArcCurve {
    fn name(&self) -> &str {
        match self {
            Self::Circular(arc) => arc.name(),
            Self::Elliptical(arc) => arc.name(),
        }
    }

    fn points(&self) -> Vec<Point2> {
        match self {
            Self::Circular(arc) => arc.points(),
            Self::Elliptical(arc) => arc.points(),
        }
    }

    fn approximation_scale(&self) -> f64 {
        match self {
            Self::Circular(arc) => arc.approximation_scale,
            Self::Elliptical(arc) => arc.approximation_scale,
        }
    }

    fn length(&self) -> f64 {
        match self {
            Self::Circular(arc) => arc.length(),
            Self::Elliptical(arc) => arc.length(),
        }
    }
}

impl From<CircularArc> for ArcCurve {
    fn from(arc: CircularArc) -> Self {
        Self::Circular(arc)
    }
}

impl From<EllipticalArc> for ArcCurve {
    fn from(arc: EllipticalArc) -> Self {
        Self::Elliptical(arc)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dispatch_keeps_the_variant() {
        let arc: ArcCurve = CircularArc::new(Point2::ORIGIN, 10.0, 0.0, 180.0).into();
        let (left, right, p) = arc.cut(arc.length() / 2.0, "").unwrap();
        assert!(matches!(left, ArcCurve::Circular(_)));
        assert!(matches!(right, ArcCurve::Circular(_)));
        assert!(p.distance_to(Point2::new(0.0, -10.0)) < 1e-9);

        let ellipse: ArcCurve =
            EllipticalArc::new(Point2::ORIGIN, 20.0, 10.0, 0.0, 90.0, 0.0).into();
        let moved = ellipse.move_by(5.0, 270.0, "_m");
        assert!(matches!(moved, ArcCurve::Elliptical(_)));
        assert_eq!(moved.name(), "_m");
        assert!(moved.p1().distance_to(Point2::new(20.0, 5.0)) < 1e-9);
    }

    #[test]
    fn test_flip_marks_both_kinds() {
        let axis = Line2::new(Point2::ORIGIN, Point2::new(0.0, 1.0));
        let circle: ArcCurve = CircularArc::new(Point2::ORIGIN, 10.0, 0.0, 90.0).into();
        let ellipse: ArcCurve =
            EllipticalArc::new(Point2::ORIGIN, 20.0, 10.0, 0.0, 90.0, 0.0).into();
        assert!(circle.flip(axis, "").is_flipped());
        assert!(ellipse.flip(axis, "").is_flipped());
        assert!(circle.flip(axis, "").length() < 0.0);
    }
}
