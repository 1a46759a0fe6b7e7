use crate::geom::{
    CubicBezier, Curve2, CurveSettings, Point2, SplinePath, Vec2, offset_curve,
    offset_curve_with, outline_curve,
};

fn bulge() -> CubicBezier {
    CubicBezier::new(
        Point2::new(0.0, 0.0),
        Point2::new(20.0, -60.0),
        Point2::new(80.0, -60.0),
        Point2::new(100.0, 0.0),
    )
}

#[test]
fn offset_pieces_are_contiguous() {
    let pieces = offset_curve(&bulge(), 15.0);
    assert!(!pieces.is_empty());
    for w in pieces.windows(2) {
        assert!(w[0].p4.distance_to(w[1].p1) < 1e-9);
    }
}

#[test]
fn offset_keeps_its_distance() {
    let curve = bulge();
    let d = 12.0;
    for piece in offset_curve(&curve, d) {
        for i in 0..=4 {
            let p = piece.point_at(f64::from(i) / 4.0);
            let nearest = (0..=1000)
                .map(|j| curve.point_at(f64::from(j) / 1000.0).distance_to(p))
                .fold(f64::INFINITY, f64::min);
            assert!((nearest - d).abs() < 1.0, "distance {nearest}");
        }
    }
}

#[test]
fn opposite_offsets_return_to_the_curve() {
    let curve = bulge();
    let there = SplinePath::from_segments(&offset_curve(&curve, 8.0));
    let back: Vec<CubicBezier> = there
        .segments()
        .iter()
        .flat_map(|s| offset_curve(s, -8.0))
        .collect();
    let first = back.first().unwrap();
    let last = back.last().unwrap();
    assert!(first.p1.distance_to(curve.p1) < 0.01);
    assert!(last.p4.distance_to(curve.p4) < 0.01);
}

#[test]
fn diagnostics_count_pieces() {
    let (pieces, diag) = offset_curve_with(&bulge(), 5.0, &CurveSettings::default());
    assert_eq!(diag.reduced_pieces, pieces.len());
    assert_eq!(diag.linear_pieces, 0);
    assert!(diag.smoothed_joints < pieces.len());
}

#[test]
fn outline_interpolates_between_distances() {
    let curve = bulge();
    let pieces = outline_curve(&curve, &[0.0, 10.0, 0.0]);
    let first = pieces.first().unwrap();
    let last = pieces.last().unwrap();
    assert!(first.p1.distance_to(curve.p1) < 1e-6);
    assert!(last.p4.distance_to(curve.p4) < 0.5);
    // The widest point sits under the apex, offset towards the inside.
    let widest = curve.point_at(0.5) + Vec2::new(0.0, 10.0);
    let nearest = pieces
        .iter()
        .map(|p| p.p1.distance_to(widest))
        .fold(f64::INFINITY, f64::min);
    assert!(nearest < 0.5, "distance {nearest}");
}

#[test]
fn bezier_offset_builds_a_named_path() {
    let path = bulge().with_name("A").offset(10.0, "_o");
    assert_eq!(path.name(), "A_o");
    assert!(path.count_segments() >= 1);
}
