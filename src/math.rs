/// Distance beyond which the pointer exerts no force, independent of the
/// pointer's influence radius
pub const MAX_FORCE_DISTANCE: f64 = 100.0;

/// Fraction of the residual offset a particle recovers per frame, before
/// its speed factor is applied
pub const RETURN_RATE: f64 = 1.0 / 15.0;

/// Euclidean distance between two points
pub fn distance(a: &[f64; 2], b: &[f64; 2]) -> f64 {
    let dx = a[0] - b[0];
    let dy = a[1] - b[1];
    (dx * dx + dy * dy).sqrt()
}

/// Repulsion strength for a particle `distance` units from the pointer.
///
/// Falls linearly from 1 at the pointer to 0 at [`MAX_FORCE_DISTANCE`] and is
/// clamped to 0 beyond it.
pub fn repulsion_force(distance: f64) -> f64 {
    ((MAX_FORCE_DISTANCE - distance) / MAX_FORCE_DISTANCE).max(0.0)
}

/// Unit vector from `from` towards `to`, together with the distance used to
/// normalize it.
///
/// A zero distance is replaced by 1 so the result is always finite.
pub fn direction(from: &[f64; 2], to: &[f64; 2]) -> ([f64; 2], f64) {
    let dx = to[0] - from[0];
    let dy = to[1] - from[1];
    let mut length = (dx * dx + dy * dy).sqrt();
    if length == 0.0 {
        length = 1.0;
    }
    ([dx / length, dy / length], length)
}

/// Moves `value` towards `rest` by [`RETURN_RATE`] of the gap, scaled by
/// `speed_factor`
pub fn ease_toward(value: f64, rest: f64, speed_factor: f64) -> f64 {
    if value == rest {
        return value;
    }
    value - (value - rest) * RETURN_RATE * speed_factor
}

/// Stroke alpha for a connecting line of the given length, or `None` when the
/// endpoints are too far apart to be connected
pub fn connection_alpha(length: f64, max_distance: f64, line_opacity: f64) -> Option<f64> {
    if length < max_distance {
        Some(line_opacity * (1.0 - length / max_distance))
    } else {
        None
    }
}
