/// Errors reported by curve operations.
///
/// Structural misuse (bad indices, empty paths) is always an error. Cut
/// lengths outside the curve are errors only in pedantic mode, otherwise they
/// are clamped and logged.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CurveError {
    /// A cut length below the start of the curve.
    #[error("Curve '{curve}'. Length of a cut segment{} is too small. Optimize it to minimal value.", point_suffix(.point))]
    CutLengthTooSmall { curve: String, point: String },

    /// A cut length beyond the end of the curve.
    #[error("Curve '{curve}'. Length of a cut segment{} is too big. Optimize it to maximal value.", point_suffix(.point))]
    CutLengthTooBig { curve: String, point: String },

    /// The path holds no points at all.
    #[error("Not enough points to create the spline.")]
    NotEnoughPoints,

    /// Segment or point index outside the path.
    #[error("This spline does not exist (index {index}, {count} segments).")]
    SegmentOutOfRange { index: usize, count: usize },

    /// Cutting a path without segments.
    #[error("Can't cut this spline")]
    CannotCutEmptyPath,

    /// Construction from named points needs at least three of them.
    #[error("spline path needs at least 3 points, got {count}")]
    TooFewSplinePoints { count: usize },

    /// A polyline walk could not locate its start point.
    #[error("Could not find the segment start.")]
    SegmentStartNotFound,

    /// A polyline walk could not locate its end point.
    #[error("Could not find the segment end.")]
    SegmentEndNotFound,

    /// A polyline walk produced fewer than two points.
    #[error("Segment is too short.")]
    SegmentTooShort,
}

fn point_suffix(point: &str) -> String {
    if point.is_empty() {
        String::new()
    } else {
        format!(" ({point})")
    }
}
