//! Deterministic math helpers shared by every phase.
//!
//! RULE: Pure functions only. No state, no randomness, no failure modes.

/// Restrict `v` to `[lo, hi]`. Requires `lo <= hi`.
pub fn clamp(v: f64, lo: f64, hi: f64) -> f64 {
    debug_assert!(lo <= hi, "clamp bounds inverted: {lo} > {hi}");
    v.max(lo).min(hi)
}

/// Linear interpolation. `t` is not clamped; callers clamp upstream.
pub fn lerp(a: f64, b: f64, t: f64) -> f64 {
    a + (b - a) * t
}

/// Cubic ease-in-out over `[0, 1]`: f(0)=0, f(0.5)=0.5, f(1)=1, monotonic.
pub fn ease_in_out_cubic(t: f64) -> f64 {
    if t < 0.5 {
        4.0 * t * t * t
    } else {
        1.0 - (-2.0 * t + 2.0).powi(3) / 2.0
    }
}

/// Direction of a velocity vector in degrees, range (-180, 180].
/// Screen space: positive `dy` points down, so descending headings are positive.
pub fn heading_degrees(dx: f64, dy: f64) -> f64 {
    let deg = dy.atan2(dx).to_degrees();
    if deg <= -180.0 { deg + 360.0 } else { deg }
}
