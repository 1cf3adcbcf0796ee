//! Scalar interpolation helpers shared by the spline evaluator.

/// Linear interpolation of scalars.
#[inline]
pub fn lerp_f32(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

/// Cubic Bezier basis function
#[inline]
pub fn cubic_bezier(p0: f32, p1: f32, p2: f32, p3: f32, t: f32) -> f32 {
    let u = 1.0 - t;
    u * u * u * p0 + 3.0 * u * u * t * p1 + 3.0 * u * t * t * p2 + t * t * t * p3
}

/// Evaluate one track segment as a cubic Bezier in value space.
///
/// `out_tangent` belongs to the left key and `in_tangent` to the right key; both are
/// slopes (value per time unit), so the inner control points sit a third of the
/// segment duration away from the ends.
#[inline]
pub fn bezier_segment(
    left: f32,
    out_tangent: f32,
    in_tangent: f32,
    right: f32,
    duration: f32,
    t: f32,
) -> f32 {
    let third = duration / 3.0;
    let p1 = left + out_tangent * third;
    let p2 = right - in_tangent * third;
    cubic_bezier(left, p1, p2, right, t.clamp(0.0, 1.0))
}

/// Slope between two points, or `None` when the time delta is singular.
#[inline]
pub fn slope(t0: f32, y0: f32, t1: f32, y1: f32, min_dt: f32) -> Option<f32> {
    let dt = t1 - t0;
    if !dt.is_finite() || dt.abs() <= min_dt {
        return None;
    }
    Some((y1 - y0) / dt)
}
