//! Score clamping.
//!
//! Every numeric field the pipeline emits lives in a closed range. These
//! helpers are the single place that range is enforced: NaN maps to the
//! floor of a unit range (zero for signed scores), infinities pin to the
//! matching end.

/// Clamp into `[0, 1]`.
pub fn unit(value: f64) -> f64 {
    within(value, 0.0, 1.0)
}

/// Clamp into `[-1, 1]`. NaN is treated as neutral.
pub fn signed(value: f64) -> f64 {
    if value.is_nan() {
        return 0.0;
    }
    within(value, -1.0, 1.0)
}

/// Clamp into `[min, max]`. NaN yields the lower bound.
///
/// Inverted bounds are swapped. A NaN bound is ignored, and if both are NaN
/// the value passes through unchanged (or `0.0` when it is NaN too).
pub fn within(value: f64, min: f64, max: f64) -> f64 {
    let (lo, hi) = if min > max { (max, min) } else { (min, max) };
    if value.is_nan() {
        return [lo, hi].into_iter().find(|b| !b.is_nan()).unwrap_or(0.0);
    }
    value.max(lo).min(hi)
}

/// Return the value if finite, otherwise `None`.
///
/// Used where a malformed number means "no update" rather than a clamp.
pub fn finite(value: f64) -> Option<f64> {
    value.is_finite().then_some(value)
}

/// Linear blend: `a * (1 - weight) + b * weight`, with `weight` clamped.
pub fn blend(a: f64, b: f64, weight: f64) -> f64 {
    let w = unit(weight);
    a * (1.0 - w) + b * w
}
