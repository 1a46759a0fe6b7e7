mod arc;
mod arc_kind;
mod bezier;
mod core;
mod curve;
mod ellipse_raster;
mod elliptical_arc;
mod error;
mod fixed;
mod flatten;
mod line;
mod offset;
mod settings;
mod spline_path;

pub use arc::CircularArc;
pub use arc_kind::ArcCurve;
pub use bezier::CubicBezier;
pub use core::{
    ACCURACY_POINT_ON_LINE, BBox2, MAX_SCENE_SIZE, PRINT_DPI, Point2, Tolerance, Transform2, Vec2,
    fuzzy_eq, fuzzy_eq_nullable, fuzzy_eq_points, fuzzy_is_null, mm_to_px, normalize_angle,
    px_to_mm,
};
pub use curve::{
    Curve2, DIRECTION_ARROW_LENGTH, DirectionArrow, closest_point, correct_cut_length,
    curve_intersect_axis, curve_intersect_line, direction_arrows, from_begin,
    is_point_on_polyline, length_by_point, path_length, segment_points, subdivide_path, to_end,
};
pub use ellipse_raster::{
    MAX_RADIUS as MAX_RASTER_RADIUS, elliptic_arc_points, full_ellipse_points,
};
pub use elliptical_arc::EllipticalArc;
pub use error::CurveError;
pub use fixed::Fixed16;
pub use flatten::{FlattenOptions, RECURSION_LIMIT, flatten_cubic, flatten_cubic_with, flatten_many};
pub use line::{
    Line2, LineIntersection, angle_between, circles_intersect, is_point_on_line,
    is_point_on_segment, is_point_on_segment_default, line_intersect_circle,
};
pub use offset::{
    OffsetDiagnostics, ScaleMode, extrema, is_linear, is_simple, offset_curve, offset_curve_with,
    outline_curve, outline_curve_with, reduce, split_at, split_range,
};
pub use settings::{
    CurveSettings, DEFAULT_APPROXIMATION_SCALE, MAX_APPROXIMATION_SCALE, MIN_APPROXIMATION_SCALE,
    UNSET_APPROXIMATION_SCALE, curve_settings, is_valid_scale, set_curve_settings,
};
pub use spline_path::{FSplinePoint, SplinePath, SplinePoint, SplinePointPosition};

#[cfg(test)]
mod tests;
