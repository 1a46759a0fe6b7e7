#![warn(clippy::all, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

//! Two-dimensional curve kernel for pattern drafting.
//!
//! Cubic Bezier splines, circular and elliptical arcs, spline paths and an
//! offset/outline engine live under [`geom`]. All geometry is expressed in
//! screen pixels at 96 DPI with the y axis pointing down.

#[macro_export]
macro_rules! debug_log {
    ($($t:tt)*) => {{
        #[cfg(feature = "debug_logs")]
        {
            ::log::debug!($($t)*);
        }
    }};
}

pub mod geom;
