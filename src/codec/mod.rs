//! Regression targets between anchors and their matched ground truth.
//!
//! A target is `(dx, dy, dlog_h, dlog_w, dtheta)`: the center offset in units
//! of the anchor size, the log size ratios, and the encoded shortest rotation
//! from the anchor orientation toward the ground truth.

mod weights;

pub use weights::{compute_weights, RegressionWeights, WeightConfig};

use crate::angle::{decode_shortest_delta, signed_shortest_delta};
use crate::geometry::OrientedBox;
use crate::util::{AnchorTargetError, AnchorTargetResult};

/// Number of regression values per anchor.
pub const TARGET_DIM: usize = 5;

/// Encoded offset from an anchor to a box.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct RegressionTarget {
    pub dx: f64,
    pub dy: f64,
    pub dlog_h: f64,
    pub dlog_w: f64,
    pub dtheta: f64,
}

impl RegressionTarget {
    pub fn from_array(values: [f64; TARGET_DIM]) -> Self {
        let [dx, dy, dlog_h, dlog_w, dtheta] = values;
        Self {
            dx,
            dy,
            dlog_h,
            dlog_w,
            dtheta,
        }
    }

    pub fn to_array(&self) -> [f64; TARGET_DIM] {
        [self.dx, self.dy, self.dlog_h, self.dlog_w, self.dtheta]
    }
}

fn check_anchor(anchor: &OrientedBox) -> AnchorTargetResult<()> {
    if anchor.is_degenerate() {
        return Err(AnchorTargetError::DegenerateAnchor {
            height: anchor.height,
            width: anchor.width,
        });
    }
    Ok(())
}

/// Encodes `gt` relative to `anchor`.
pub fn encode(anchor: &OrientedBox, gt: &OrientedBox) -> AnchorTargetResult<RegressionTarget> {
    check_anchor(anchor)?;
    if gt.is_degenerate() {
        return Err(AnchorTargetError::InvalidInput(
            "ground-truth box has non-positive size",
        ));
    }
    Ok(RegressionTarget {
        dx: (gt.cx - anchor.cx) / anchor.width,
        dy: (gt.cy - anchor.cy) / anchor.height,
        dlog_h: (gt.height / anchor.height).ln(),
        dlog_w: (gt.width / anchor.width).ln(),
        dtheta: signed_shortest_delta(gt.theta, anchor.theta)?,
    })
}

/// Applies `delta` to `anchor`; the inverse of [`encode`].
pub fn decode(anchor: &OrientedBox, delta: &RegressionTarget) -> AnchorTargetResult<OrientedBox> {
    check_anchor(anchor)?;
    Ok(OrientedBox {
        cx: delta.dx * anchor.width + anchor.cx,
        cy: delta.dy * anchor.height + anchor.cy,
        height: delta.dlog_h.exp() * anchor.height,
        width: delta.dlog_w.exp() * anchor.width,
        theta: decode_shortest_delta(anchor.theta, delta.dtheta)?,
    })
}

/// Encodes each anchor against `gt[matches[i]]`.
pub fn encode_matched(
    anchors: &[OrientedBox],
    gt: &[OrientedBox],
    matches: &[usize],
) -> AnchorTargetResult<Vec<RegressionTarget>> {
    if anchors.len() != matches.len() {
        return Err(AnchorTargetError::ShapeMismatch {
            expected_rows: anchors.len(),
            expected_cols: 1,
            rows: matches.len(),
            cols: 1,
        });
    }
    anchors
        .iter()
        .zip(matches)
        .map(|(anchor, &j)| {
            let target = gt
                .get(j)
                .ok_or(AnchorTargetError::InvalidInput("match index out of range"))?;
            encode(anchor, target)
        })
        .collect()
}

/// Decodes parallel slices of anchors and predicted deltas.
pub fn decode_all(
    anchors: &[OrientedBox],
    deltas: &[RegressionTarget],
) -> AnchorTargetResult<Vec<OrientedBox>> {
    if anchors.len() != deltas.len() {
        return Err(AnchorTargetError::ShapeMismatch {
            expected_rows: anchors.len(),
            expected_cols: TARGET_DIM,
            rows: deltas.len(),
            cols: TARGET_DIM,
        });
    }
    anchors
        .iter()
        .zip(deltas)
        .map(|(anchor, delta)| decode(anchor, delta))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::angle::symmetric_distance;

    fn assert_box_close(a: &OrientedBox, b: &OrientedBox) {
        assert!((a.cx - b.cx).abs() < 1e-9, "{a:?} vs {b:?}");
        assert!((a.cy - b.cy).abs() < 1e-9, "{a:?} vs {b:?}");
        assert!((a.height - b.height).abs() < 1e-9, "{a:?} vs {b:?}");
        assert!((a.width - b.width).abs() < 1e-9, "{a:?} vs {b:?}");
        assert!(symmetric_distance(a.theta, b.theta) < 1e-4, "{a:?} vs {b:?}");
    }

    #[test]
    fn identical_boxes_encode_to_zero() {
        let b = OrientedBox::new(100.0, 100.0, 100.0, 100.0, 0.0);
        assert_eq!(encode(&b, &b).unwrap(), RegressionTarget::default());
    }

    #[test]
    fn encode_scales_by_anchor_size() {
        let anchor = OrientedBox::new(100.0, 100.0, 50.0, 200.0, 0.0);
        let gt = OrientedBox::new(120.0, 90.0, 100.0, 100.0, 0.0);
        let t = encode(&anchor, &gt).unwrap();
        assert!((t.dx - 0.1).abs() < 1e-12);
        assert!((t.dy + 0.2).abs() < 1e-12);
        assert!((t.dlog_h - 2.0_f64.ln()).abs() < 1e-12);
        assert!((t.dlog_w - 0.5_f64.ln()).abs() < 1e-12);
        assert_eq!(t.dtheta, 0.0);
    }

    #[test]
    fn decode_inverts_encode() {
        let pairs = [
            (
                OrientedBox::new(100.0, 100.0, 100.0, 100.0, 45.0),
                OrientedBox::new(101.0, 99.0, 50.0, 50.0, -60.0),
            ),
            (
                OrientedBox::new(33.0, 34.0, 76.0, 2.0, 90.0),
                OrientedBox::new(123.0, 545.0, 3.0, 5.0, -89.0),
            ),
            (
                OrientedBox::new(0.0, 0.0, 8.0, 16.0, -30.0),
                OrientedBox::new(4.0, -2.0, 12.0, 9.0, 75.0),
            ),
        ];
        let anchors: Vec<_> = pairs.iter().map(|p| p.0).collect();
        let gts: Vec<_> = pairs.iter().map(|p| p.1).collect();
        let targets = encode_matched(&anchors, &gts, &[0, 1, 2]).unwrap();
        let decoded = decode_all(&anchors, &targets).unwrap();
        for (d, g) in decoded.iter().zip(&gts) {
            assert_box_close(d, g);
        }
    }

    #[test]
    fn degenerate_anchor_is_rejected() {
        let anchor = OrientedBox::new(0.0, 0.0, 0.0, 10.0, 0.0);
        let gt = OrientedBox::new(0.0, 0.0, 10.0, 10.0, 0.0);
        assert_eq!(
            encode(&anchor, &gt),
            Err(AnchorTargetError::DegenerateAnchor {
                height: 0.0,
                width: 10.0
            })
        );
        assert!(decode(&anchor, &RegressionTarget::default()).is_err());
    }

    #[test]
    fn non_canonical_angles_are_domain_errors() {
        let anchor = OrientedBox::new(0.0, 0.0, 10.0, 10.0, 0.0);
        let gt = OrientedBox::new(0.0, 0.0, 10.0, 10.0, 135.0);
        assert_eq!(
            encode(&anchor, &gt),
            Err(AnchorTargetError::Domain { angle_deg: 135.0 })
        );
    }

    #[test]
    fn batch_helpers_check_lengths() {
        let anchor = OrientedBox::new(0.0, 0.0, 10.0, 10.0, 0.0);
        assert!(decode_all(&[anchor], &[]).is_err());
        assert!(decode_all(&[], &[]).unwrap().is_empty());
        assert!(encode_matched(&[anchor], &[anchor], &[3]).is_err());
    }
}
