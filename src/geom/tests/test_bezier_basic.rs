use approx::assert_relative_eq;

use crate::geom::{CubicBezier, Curve2, CurveError, CurveSettings, Point2};

fn s_curve() -> CubicBezier {
    CubicBezier::new(
        Point2::new(0.0, 0.0),
        Point2::new(0.0, 50.0),
        Point2::new(50.0, 50.0),
        Point2::new(50.0, 0.0),
    )
    .with_name("S")
}

#[test]
fn cut_at_half_parameter_hits_the_midpoint() {
    let (left, right, p) = s_curve().cut_at_parameter(0.5);
    assert_relative_eq!(p.x, 25.0, epsilon = 1e-12);
    assert_relative_eq!(p.y, 37.5, epsilon = 1e-12);
    assert_eq!(left.p4, right.p1);
    assert_eq!(left.p1, Point2::new(0.0, 0.0));
    assert_eq!(right.p4, Point2::new(50.0, 0.0));
}

#[test]
fn cut_lengths_add_up() {
    let curve = s_curve();
    let full = curve.length();
    let (left, right, _) = curve.cut_at_length(full / 3.0, "A1").unwrap();
    assert_relative_eq!(left.length() + right.length(), full, max_relative = 0.01);
    assert_relative_eq!(left.length(), full / 3.0, max_relative = 0.02);
}

#[test]
fn negative_cut_is_clamped_or_rejected() {
    let line = CubicBezier::new(
        Point2::new(0.0, 0.0),
        Point2::new(30.0, 0.0),
        Point2::new(70.0, 0.0),
        Point2::new(100.0, 0.0),
    );

    let (left, _, p) = line
        .cut_at_length_with(-10.0, "P1", &CurveSettings::default())
        .unwrap();
    assert_eq!(p, line.p1);
    assert!(left.length() < 1e-9);

    let err = line
        .cut_at_length_with(-10.0, "P1", &CurveSettings::default().pedantic(true))
        .unwrap_err();
    assert!(matches!(err, CurveError::CutLengthTooSmall { .. }));
    assert!(err.to_string().contains("P1"));
}

#[test]
fn descriptors_survive_construction_from_angles() {
    let curve = CubicBezier::from_handles(
        Point2::new(0.0, 0.0),
        Point2::new(100.0, 0.0),
        45.0,
        135.0,
        20.0,
        30.0,
    );
    assert_relative_eq!(curve.start_angle(), 45.0, epsilon = 1e-9);
    assert_relative_eq!(curve.end_angle(), 135.0, epsilon = 1e-9);
    assert_relative_eq!(curve.c1_length(), 20.0, epsilon = 1e-9);
    assert_relative_eq!(curve.c2_length(), 30.0, epsilon = 1e-9);
}

#[test]
fn serde_round_trip_keeps_curve() {
    let curve = s_curve().with_approximation_scale(2.0);
    let json = serde_json::to_string(&curve).unwrap();
    let back: CubicBezier = serde_json::from_str(&json).unwrap();
    assert_eq!(back, curve);
}

#[test]
fn new_curves_use_the_configured_default_scale() {
    let curve = s_curve();
    let coarse = CurveSettings::new().default_approximation_scale(0.2);
    let fine = CurveSettings::new().default_approximation_scale(10.0);
    assert!(curve.points_with(&fine).len() > curve.points_with(&coarse).len());

    let pinned = s_curve().with_approximation_scale(0.2);
    assert_eq!(pinned.points_with(&fine), pinned.points_with(&coarse));
}
