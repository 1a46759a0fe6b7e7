mod test_bezier_basic;
mod test_elliptical_arc_basic;
mod test_offset_basic;
mod test_spline_path_basic;
