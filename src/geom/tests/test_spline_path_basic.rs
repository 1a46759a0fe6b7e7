use approx::assert_relative_eq;

use crate::geom::{
    CircularArc, Curve2, CurveError, CurveSettings, FSplinePoint, Point2, SplinePath, SplinePoint,
    normalize_angle,
};

fn wave() -> SplinePath {
    SplinePath::from_points(vec![
        SplinePoint::new(Point2::new(0.0, 0.0), 180.0, 0.0, 0.0, 40.0),
        SplinePoint::new(Point2::new(100.0, 0.0), 90.0, 40.0, 270.0, 40.0),
        SplinePoint::new(Point2::new(200.0, 0.0), 180.0, 40.0, 0.0, 0.0),
    ])
    .with_name("W")
}

#[test]
fn counts_and_bounds() {
    let path = wave();
    assert_eq!(path.count_points(), 3);
    assert_eq!(path.count_segments(), 2);
    assert!(path.segment(1).is_ok());
    assert!(path.segment(2).is_ok());
    assert_eq!(
        path.segment(3).unwrap_err(),
        CurveError::SegmentOutOfRange { index: 3, count: 2 }
    );
    assert!(path.segment(0).is_err());
}

#[test]
fn cut_in_the_middle_preserves_length() {
    let path = wave();
    let full = path.length();
    let (head, tail, p) = path.cut(full / 2.0, "X").unwrap();
    assert!(p.distance_to(Point2::new(100.0, 0.0)) < 2.0);
    assert_relative_eq!(head.length() + tail.length(), full, epsilon = 2.0);
    assert_eq!(head.last_point(), Some(p));
    assert_eq!(tail.first_point(), Some(p));
}

#[test]
fn negative_cut_counts_from_the_end() {
    let path = wave();
    let full = path.length();
    let (_, tail, _) = path
        .cut_with(-full / 4.0, "X", &CurveSettings::default())
        .unwrap();
    assert_relative_eq!(tail.length(), full / 4.0, epsilon = 2.0);
}

#[test]
fn fspline_points_build_a_path() {
    let points = [
        FSplinePoint::smooth(Point2::new(0.0, 0.0), 0.0),
        FSplinePoint::smooth(Point2::new(100.0, 50.0), 0.0),
        FSplinePoint::smooth(Point2::new(200.0, 0.0), 0.0),
    ];
    let path = SplinePath::from_fspline_points(&points, 1.0).unwrap();
    assert_eq!(path.count_segments(), 2);
    assert!(SplinePath::from_fspline_points(&points[..2], 1.0).is_err());
}

#[test]
fn arc_path_offset_grows_the_radius() {
    let arc = CircularArc::new(Point2::ORIGIN, 100.0, 0.0, 90.0);
    let path = arc.to_spline_path().offset(10.0, "");
    for p in path.points() {
        assert_relative_eq!(p.to_vec2().length(), 110.0, epsilon = 0.5);
    }
}

/// How far a node bends away from a straight pass, in degrees.
fn bend(node: &SplinePoint) -> f64 {
    let d = normalize_angle(node.angle2 - node.angle1 - 180.0);
    d.min(360.0 - d)
}

#[test]
fn offset_keeps_corner_nodes() {
    let path = SplinePath::from_points(vec![
        SplinePoint::new(Point2::new(0.0, 0.0), 180.0, 0.0, 0.0, 30.0),
        SplinePoint::new(Point2::new(100.0, 0.0), 180.0, 30.0, 270.0, 30.0),
        SplinePoint::new(Point2::new(100.0, 100.0), 90.0, 30.0, 270.0, 0.0),
    ]);
    let shifted = path.offset(10.0, "");
    let nodes = shifted.spline_points();
    let interior = &nodes[1..nodes.len() - 1];
    let sharpest = interior.iter().map(bend).fold(0.0, f64::max);
    assert_relative_eq!(sharpest, 90.0, epsilon = 1e-6);
    assert_eq!(interior.iter().filter(|n| bend(n) > 1e-6).count(), 1);
}
