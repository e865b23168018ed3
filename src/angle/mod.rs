//! Orientation distances that respect the half-turn symmetry of the boxes.
//!
//! All angles are in degrees. Distances double the angles before comparing
//! them, so `theta` and `theta + 180` are the same orientation and nothing
//! jumps at the `±90` wrap.

use crate::geometry::OrientedBox;
use crate::util::math::{fold_half_turn, in_half_turn};
use crate::util::{AnchorTargetError, AnchorTargetResult};

/// Largest magnitude of an encoded angular delta.
pub const MAX_ENCODED_DELTA: f64 = 2.0;

/// Unsigned orientation distance in `[0, 90]` degrees.
pub fn symmetric_distance(a_deg: f64, b_deg: f64) -> f64 {
    let delta = 2.0 * a_deg.to_radians() - 2.0 * b_deg.to_radians();
    // cos(delta) can exceed 1 by an ulp on some platforms.
    delta.cos().clamp(-1.0, 1.0).acos().to_degrees() * 0.5
}

/// Encodes the shortest rotation from `theta2` toward `theta1`.
///
/// Returns `±(1 - cos(2 t1 - 2 t2))` with the sign of `sin(2 t1 - 2 t2)`,
/// a value in `[-2, 2]`. Both angles must lie in `(-90, 90]`.
pub fn signed_shortest_delta(theta1_deg: f64, theta2_deg: f64) -> AnchorTargetResult<f64> {
    check_half_turn(theta1_deg)?;
    check_half_turn(theta2_deg)?;
    let delta = 2.0 * theta1_deg.to_radians() - 2.0 * theta2_deg.to_radians();
    let magnitude = 1.0 - delta.cos();
    Ok(if delta.sin() < 0.0 {
        -magnitude
    } else {
        magnitude
    })
}

/// Applies an encoded delta to `theta1` and returns the result in `(-90, 90]`.
///
/// `dtheta` is clamped to `[-2, 2]` first, so any network output decodes to
/// a valid orientation. Inverts [`signed_shortest_delta`]:
/// `decode_shortest_delta(t, signed_shortest_delta(g, t)) == g`.
pub fn decode_shortest_delta(theta1_deg: f64, dtheta: f64) -> AnchorTargetResult<f64> {
    check_half_turn(theta1_deg)?;
    if dtheta.is_nan() {
        return Err(AnchorTargetError::InvalidInput("encoded angle delta is NaN"));
    }
    let dtheta = dtheta.clamp(-MAX_ENCODED_DELTA, MAX_ENCODED_DELTA);
    let half = ((1.0 - dtheta.abs()).clamp(-1.0, 1.0).acos() * 0.5).to_degrees();
    let rotation = if dtheta < 0.0 { -half } else { half };
    Ok(fold_half_turn(theta1_deg + rotation))
}

fn check_half_turn(angle_deg: f64) -> AnchorTargetResult<()> {
    if in_half_turn(angle_deg) {
        Ok(())
    } else {
        Err(AnchorTargetError::Domain { angle_deg })
    }
}

/// Dense `N x K` table of [`symmetric_distance`] between two box sets.
#[derive(Clone, Debug)]
pub struct AngularAgreement {
    rows: usize,
    cols: usize,
    data: Vec<f64>,
}

impl AngularAgreement {
    /// Computes the distance between every `boxes[i]` and `query[j]`.
    pub fn between(boxes: &[OrientedBox], query: &[OrientedBox]) -> Self {
        let mut data = Vec::with_capacity(boxes.len() * query.len());
        for a in boxes {
            for q in query {
                data.push(symmetric_distance(a.theta, q.theta));
            }
        }
        Self {
            rows: boxes.len(),
            cols: query.len(),
            data,
        }
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Returns the distance for `(row, col)` if in range.
    pub fn get(&self, row: usize, col: usize) -> Option<f64> {
        if row >= self.rows || col >= self.cols {
            return None;
        }
        self.data.get(row * self.cols + col).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sweep() -> impl Iterator<Item = f64> {
        // (-90, 90] in 2.5 degree steps plus a few awkward values.
        (1..=72)
            .map(|i| -90.0 + 2.5 * i as f64)
            .chain([-89.999, 0.001, 44.9999, 89.9999])
    }

    #[test]
    fn symmetric_distance_is_symmetric_and_bounded() {
        for a in sweep() {
            assert!(symmetric_distance(a, a).abs() < 1e-6);
            for b in sweep() {
                let d = symmetric_distance(a, b);
                assert!((0.0..=90.0).contains(&d), "{a} {b} -> {d}");
                assert!((d - symmetric_distance(b, a)).abs() < 1e-12);
            }
        }
    }

    #[test]
    fn symmetric_distance_is_continuous_across_wrap() {
        assert!((symmetric_distance(89.0, -89.0) - 2.0).abs() < 1e-6);
        assert!((symmetric_distance(90.0, -90.0)).abs() < 1e-6);
        assert!((symmetric_distance(0.0, 90.0) - 90.0).abs() < 1e-6);
        assert!((symmetric_distance(10.0, 190.0)).abs() < 1e-6);
    }

    #[test]
    fn signed_delta_sign_follows_shortest_rotation() {
        assert!(signed_shortest_delta(10.0, 0.0).unwrap() > 0.0);
        assert!(signed_shortest_delta(-10.0, 0.0).unwrap() < 0.0);
        // 89 -> -89 is a two degree anti-clockwise turn through the wrap.
        assert!(signed_shortest_delta(-89.0, 89.0).unwrap() > 0.0);
        assert_eq!(signed_shortest_delta(30.0, 30.0).unwrap(), 0.0);
        let quarter = signed_shortest_delta(90.0, 0.0).unwrap();
        assert!((quarter.abs() - 2.0).abs() < 1e-12);
    }

    #[test]
    fn signed_delta_rejects_out_of_range() {
        assert_eq!(
            signed_shortest_delta(-90.0, 0.0),
            Err(AnchorTargetError::Domain { angle_deg: -90.0 })
        );
        assert_eq!(
            signed_shortest_delta(0.0, 91.0),
            Err(AnchorTargetError::Domain { angle_deg: 91.0 })
        );
        assert!(decode_shortest_delta(120.0, 0.5).is_err());
    }

    #[test]
    fn decode_inverts_signed_delta() {
        for base in sweep() {
            for target in sweep() {
                let encoded = signed_shortest_delta(target, base).unwrap();
                let decoded = decode_shortest_delta(base, encoded).unwrap();
                assert!(
                    symmetric_distance(decoded, target) < 1e-4,
                    "base {base} target {target} decoded {decoded}"
                );
                assert!(decoded > -90.0 && decoded <= 90.0);
            }
        }
    }

    #[test]
    fn decode_recovers_exact_values_away_from_wrap() {
        let encoded = signed_shortest_delta(-60.0, 45.0).unwrap();
        let decoded = decode_shortest_delta(45.0, encoded).unwrap();
        assert!((decoded + 60.0).abs() < 1e-9);
    }

    #[test]
    fn decode_clamps_large_deltas() {
        let a = decode_shortest_delta(0.0, 5.0).unwrap();
        let b = decode_shortest_delta(0.0, 2.0).unwrap();
        assert_eq!(a, b);
        assert!((b - 90.0).abs() < 1e-9);
        let c = decode_shortest_delta(0.0, -7.0).unwrap();
        assert!((c - 90.0).abs() < 1e-9);
    }

    #[test]
    fn agreement_table_matches_pairwise_distance() {
        let boxes = [
            OrientedBox::new(0.0, 0.0, 1.0, 1.0, 10.0),
            OrientedBox::new(0.0, 0.0, 1.0, 1.0, 80.0),
        ];
        let query = [OrientedBox::new(0.0, 0.0, 1.0, 1.0, -80.0)];
        let table = AngularAgreement::between(&boxes, &query);
        assert_eq!((table.rows(), table.cols()), (2, 1));
        assert!((table.get(0, 0).unwrap() - 90.0).abs() < 1e-9);
        assert!((table.get(1, 0).unwrap() - 20.0).abs() < 1e-9);
        assert!(table.get(2, 0).is_none());
    }
}
