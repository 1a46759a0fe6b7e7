use approx::assert_relative_eq;

use curve_kernel::geom::{
    ArcCurve, CircularArc, CubicBezier, Curve2, CurveError, CurveSettings, EllipticalArc, Line2,
    Point2, SplinePath, offset_curve,
};

fn s_curve() -> CubicBezier {
    CubicBezier::new(
        Point2::new(0.0, 0.0),
        Point2::new(0.0, 50.0),
        Point2::new(50.0, 50.0),
        Point2::new(50.0, 0.0),
    )
}

#[test]
fn arc_becomes_a_two_segment_path() {
    let arc = CircularArc::new(Point2::ORIGIN, 100.0, 0.0, 90.0);
    let path = arc.to_spline_path();
    assert_eq!(path.count_segments(), 2);
    assert_relative_eq!(path.length(), 157.08, max_relative = 0.005);
}

#[test]
fn s_curve_splits_at_its_middle() {
    let (_, _, p) = s_curve().cut_at_parameter(0.5);
    assert!(p.distance_to(Point2::new(25.0, 37.5)) < 1e-12);
}

#[test]
fn pedantic_cut_reports_the_point_name() {
    let line = CubicBezier::new(
        Point2::new(0.0, 0.0),
        Point2::new(25.0, 0.0),
        Point2::new(75.0, 0.0),
        Point2::new(100.0, 0.0),
    )
    .with_name("Spl_A_B");

    let err = line
        .cut_at_length_with(-10.0, "P1", &CurveSettings::new().pedantic(true))
        .unwrap_err();
    assert!(matches!(err, CurveError::CutLengthTooSmall { .. }));
    let message = err.to_string();
    assert!(message.contains("Spl_A_B"));
    assert!(message.contains("P1"));

    let (_, right, p) = line
        .cut_at_length_with(-10.0, "P1", &CurveSettings::new())
        .unwrap();
    assert_eq!(p, line.p1);
    assert_relative_eq!(right.length(), 100.0, epsilon = 1e-6);
}

#[test]
fn zero_offset_reproduces_the_curve() {
    let curve = s_curve();
    let path = SplinePath::from_segments(&offset_curve(&curve, 0.0));
    assert!(path.first_point().unwrap().distance_to(curve.p1) < 1e-9);
    assert!(path.last_point().unwrap().distance_to(curve.p4) < 1e-9);
    assert_relative_eq!(path.length(), curve.length(), max_relative = 0.01);
}

#[test]
fn offset_there_and_back() {
    let curve = CubicBezier::new(
        Point2::new(0.0, 0.0),
        Point2::new(30.0, -40.0),
        Point2::new(70.0, -40.0),
        Point2::new(100.0, 0.0),
    );
    let out = curve.offset(6.0, "");
    let back = out.offset(-6.0, "");
    assert!(back.first_point().unwrap().distance_to(curve.p1) < 0.01);
    assert!(back.last_point().unwrap().distance_to(curve.p4) < 0.01);
    assert_relative_eq!(back.length(), curve.length(), max_relative = 0.02);
}

#[test]
fn arcs_share_one_interface() {
    let arcs: Vec<ArcCurve> = vec![
        CircularArc::new(Point2::new(50.0, 50.0), 30.0, 0.0, 120.0).into(),
        EllipticalArc::new(Point2::new(50.0, 50.0), 40.0, 20.0, 0.0, 120.0, 30.0).into(),
    ];
    let axis = Line2::new(Point2::new(0.0, 0.0), Point2::new(0.0, 100.0));
    for arc in &arcs {
        let mirrored = arc.flip(axis, "_m");
        assert!(mirrored.is_flipped());
        assert_relative_eq!(mirrored.length().abs(), arc.length().abs(), max_relative = 0.02);

        let (left, right, p) = arc.cut(arc.length() / 2.0, "M").unwrap();
        assert!(left.p2().distance_to(p) < 1e-3);
        assert!(right.p1().distance_to(p) < 1e-3);
    }
}

#[test]
fn settings_serialize_as_json() {
    let settings = CurveSettings::new().default_approximation_scale(2.5).pedantic(true);
    let json = serde_json::to_string(&settings).unwrap();
    let back: CurveSettings = serde_json::from_str(&json).unwrap();
    assert_eq!(back, settings);
}
