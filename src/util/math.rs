//! Angle helpers shared by the geometry and codec modules.

/// Computes sine and cosine for an angle in degrees.
pub(crate) fn sin_cos_deg(angle_deg: f64) -> (f64, f64) {
    angle_deg.to_radians().sin_cos()
}

/// Folds an angle in degrees into the half-open range `(-90, 90]`.
///
/// Accepts inputs in `(-270, 270]`, which covers the sum of a canonical
/// angle and a rotation of at most a quarter turn.
pub(crate) fn fold_half_turn(angle_deg: f64) -> f64 {
    if angle_deg > 90.0 {
        angle_deg - 180.0
    } else if angle_deg <= -90.0 {
        angle_deg + 180.0
    } else {
        angle_deg
    }
}

/// Returns true if `angle_deg` is finite and lies in `(-90, 90]`.
pub(crate) fn in_half_turn(angle_deg: f64) -> bool {
    angle_deg.is_finite() && angle_deg > -90.0 && angle_deg <= 90.0
}
