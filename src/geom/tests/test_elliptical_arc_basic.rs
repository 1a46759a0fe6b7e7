use std::f64::consts::PI;

use approx::assert_relative_eq;

use crate::geom::{Curve2, EllipticalArc, Line2, Point2};

fn ellipse() -> EllipticalArc {
    EllipticalArc::new(Point2::new(100.0, 100.0), 80.0, 40.0, 0.0, 90.0, 0.0)
        .with_approximation_scale(10.0)
}

#[test]
fn end_points_follow_the_radii() {
    let arc = ellipse();
    assert!(arc.p1().distance_to(Point2::new(180.0, 100.0)) < 1e-6);
    assert!(arc.p2().distance_to(Point2::new(100.0, 60.0)) < 1e-6);
}

#[test]
fn quarter_length_is_a_quarter_of_the_perimeter() {
    let arc = ellipse();
    assert_relative_eq!(arc.length(), arc.max_length() / 4.0, max_relative = 0.01);
}

#[test]
fn circle_case_matches_the_circle() {
    let arc = EllipticalArc::new(Point2::ORIGIN, 50.0, 50.0, 0.0, 90.0, 0.0)
        .with_approximation_scale(10.0);
    assert_relative_eq!(arc.length(), 50.0 * PI / 2.0, epsilon = 0.2);
}

#[test]
fn spline_path_stays_close_to_the_ellipse() {
    let arc = ellipse();
    let path = arc.to_spline_path();
    assert!(path.count_segments() >= 1);
    for p in path.points() {
        let x = (p.x - 100.0) / 80.0;
        let y = (p.y - 100.0) / 40.0;
        assert_relative_eq!(x * x + y * y, 1.0, epsilon = 0.01);
    }
}

fn distance_to_polyline(p: Point2, polyline: &[Point2]) -> f64 {
    if let [single] = polyline {
        return single.distance_to(p);
    }
    polyline
        .windows(2)
        .map(|w| Line2::new(w[0], w[1]).closest_point_on_segment(p).distance_to(p))
        .fold(f64::INFINITY, f64::min)
}

/// Largest distance from either polyline to the other.
fn hausdorff(a: &[Point2], b: &[Point2]) -> f64 {
    let one_way = |from: &[Point2], to: &[Point2]| {
        from.iter().map(|p| distance_to_polyline(*p, to)).fold(0.0, f64::max)
    };
    one_way(a, b).max(one_way(b, a))
}

#[test]
fn spline_path_follows_the_rasterized_points() {
    let center = Point2::new(200.0, 150.0);
    let arcs = [
        ("rotated", EllipticalArc::new(center, 120.0, 60.0, 20.0, 200.0, 30.0)),
        ("wrapped", EllipticalArc::new(center, 120.0, 60.0, 300.0, 60.0, 0.0)),
        ("near full", EllipticalArc::new(center, 90.0, 150.0, 10.0, 350.0, 45.0)),
    ];
    for (label, arc) in arcs {
        let arc = arc.with_approximation_scale(2.0);
        let raster = arc.points();
        let spline = arc.to_spline_path().points();
        assert!(raster.len() > 2 && spline.len() > 2, "{label}");
        let gap = hausdorff(&raster, &spline);
        assert!(gap < 1.5, "{label}: {gap}");
    }
}

#[test]
fn rotation_moves_the_start_point() {
    let arc = ellipse().rotate(Point2::new(100.0, 100.0), 90.0, "r");
    assert!(arc.p1().distance_to(Point2::new(100.0, 20.0)) < 1e-6);
    assert_eq!(arc.name(), "r");
}
