//! Grid-sampled ellipse IoU.
//!
//! Each box is treated as the ellipse inscribed in it, with semi-axes `w / 2`
//! along the local x axis and `h / 2` along the local y axis. Areas are exact;
//! the intersection is estimated by testing cell centers of a regular grid laid
//! over the overlap of the two bounding rectangles.

use crate::geometry::OrientedBox;
use crate::overlap::{OverlapMatrix, OverlapOracle};
use crate::util::math::sin_cos_deg;
use crate::util::{AnchorTargetError, AnchorTargetResult};

/// Reference overlap oracle for elliptical footprints.
#[derive(Clone, Copy, Debug)]
pub struct SampledEllipseOverlap {
    resolution: usize,
}

impl Default for SampledEllipseOverlap {
    fn default() -> Self {
        Self { resolution: 32 }
    }
}

impl SampledEllipseOverlap {
    /// Creates an oracle sampling `resolution x resolution` points per pair.
    pub fn new(resolution: usize) -> AnchorTargetResult<Self> {
        if resolution < 2 {
            return Err(AnchorTargetError::InvalidConfig {
                reason: "overlap sampling resolution must be >= 2",
            });
        }
        Ok(Self { resolution })
    }

    pub fn resolution(&self) -> usize {
        self.resolution
    }

    /// Estimates the IoU of the ellipses inscribed in `a` and `b`.
    pub fn pair_iou(&self, a: &OrientedBox, b: &OrientedBox) -> f64 {
        let ea = Ellipse::from_box(a);
        let eb = Ellipse::from_box(b);
        let (ax0, ay0, ax1, ay1) = ea.bounds();
        let (bx0, by0, bx1, by1) = eb.bounds();
        let x0 = ax0.max(bx0);
        let y0 = ay0.max(by0);
        let x1 = ax1.min(bx1);
        let y1 = ay1.min(by1);
        if x1 <= x0 || y1 <= y0 {
            return 0.0;
        }

        let n = self.resolution;
        let step_x = (x1 - x0) / n as f64;
        let step_y = (y1 - y0) / n as f64;
        let mut hits = 0usize;
        for iy in 0..n {
            let y = y0 + (iy as f64 + 0.5) * step_y;
            for ix in 0..n {
                let x = x0 + (ix as f64 + 0.5) * step_x;
                if ea.contains(x, y) && eb.contains(x, y) {
                    hits += 1;
                }
            }
        }

        let inter = hits as f64 * step_x * step_y;
        let union = ea.area() + eb.area() - inter;
        if union <= 0.0 {
            return 0.0;
        }
        (inter / union).clamp(0.0, 1.0)
    }

    pub(crate) fn row(&self, anchor: &OrientedBox, gt: &[OrientedBox]) -> Vec<f64> {
        gt.iter().map(|g| self.pair_iou(anchor, g)).collect()
    }
}

impl OverlapOracle for SampledEllipseOverlap {
    fn compute_overlap(
        &self,
        anchors: &[OrientedBox],
        gt: &[OrientedBox],
    ) -> AnchorTargetResult<OverlapMatrix> {
        #[cfg(feature = "rayon")]
        let data = crate::overlap::rayon::overlap_rows_par(self, anchors, gt);
        #[cfg(not(feature = "rayon"))]
        let data: Vec<f64> = anchors.iter().flat_map(|a| self.row(a, gt)).collect();

        OverlapMatrix::new(data, anchors.len(), gt.len())
    }
}

struct Ellipse {
    cx: f64,
    cy: f64,
    semi_x: f64,
    semi_y: f64,
    sin_t: f64,
    cos_t: f64,
}

impl Ellipse {
    fn from_box(b: &OrientedBox) -> Self {
        let (sin_t, cos_t) = sin_cos_deg(b.theta);
        Self {
            cx: b.cx,
            cy: b.cy,
            semi_x: (b.width * 0.5).max(0.0),
            semi_y: (b.height * 0.5).max(0.0),
            sin_t,
            cos_t,
        }
    }

    fn area(&self) -> f64 {
        std::f64::consts::PI * self.semi_x * self.semi_y
    }

    /// Axis-aligned bounding rectangle `(x0, y0, x1, y1)`.
    fn bounds(&self) -> (f64, f64, f64, f64) {
        let ex = (self.semi_x * self.cos_t).hypot(self.semi_y * self.sin_t);
        let ey = (self.semi_x * self.sin_t).hypot(self.semi_y * self.cos_t);
        (self.cx - ex, self.cy - ey, self.cx + ex, self.cy + ey)
    }

    fn contains(&self, x: f64, y: f64) -> bool {
        if self.semi_x <= 0.0 || self.semi_y <= 0.0 {
            return false;
        }
        let dx = x - self.cx;
        let dy = y - self.cy;
        // Inverse rotation into the local frame.
        let lx = dx * self.cos_t + dy * self.sin_t;
        let ly = -dx * self.sin_t + dy * self.cos_t;
        let u = lx / self.semi_x;
        let v = ly / self.semi_y;
        u * u + v * v <= 1.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identical_ellipses_overlap_fully() {
        let oracle = SampledEllipseOverlap::new(128).unwrap();
        let b = OrientedBox::new(50.0, 40.0, 30.0, 60.0, 25.0);
        assert!(oracle.pair_iou(&b, &b) > 0.97);
    }

    #[test]
    fn disjoint_ellipses_do_not_overlap() {
        let oracle = SampledEllipseOverlap::default();
        let a = OrientedBox::new(0.0, 0.0, 10.0, 10.0, 0.0);
        let b = OrientedBox::new(100.0, 0.0, 10.0, 10.0, 0.0);
        assert_eq!(oracle.pair_iou(&a, &b), 0.0);
    }

    #[test]
    fn concentric_circles_overlap_by_area_ratio() {
        let oracle = SampledEllipseOverlap::new(128).unwrap();
        let big = OrientedBox::new(0.0, 0.0, 40.0, 40.0, 0.0);
        let small = OrientedBox::new(0.0, 0.0, 20.0, 20.0, 0.0);
        assert!((oracle.pair_iou(&big, &small) - 0.25).abs() < 0.01);
    }

    #[test]
    fn orientation_changes_overlap_of_elongated_shapes() {
        let oracle = SampledEllipseOverlap::new(64).unwrap();
        let a = OrientedBox::new(0.0, 0.0, 10.0, 80.0, 0.0);
        let same = OrientedBox::new(0.0, 0.0, 10.0, 80.0, 180.0);
        let crossed = OrientedBox::new(0.0, 0.0, 10.0, 80.0, 90.0);
        assert!(oracle.pair_iou(&a, &same) > 0.9);
        assert!(oracle.pair_iou(&a, &crossed) < 0.2);
    }

    #[test]
    fn oracle_fills_matrix_row_major() {
        let oracle = SampledEllipseOverlap::default();
        let anchors = [
            OrientedBox::new(0.0, 0.0, 10.0, 10.0, 0.0),
            OrientedBox::new(100.0, 0.0, 10.0, 10.0, 0.0),
        ];
        let gt = [OrientedBox::new(100.0, 0.0, 10.0, 10.0, 0.0)];
        let m = oracle.compute_overlap(&anchors, &gt).unwrap();
        assert_eq!((m.rows(), m.cols()), (2, 1));
        assert_eq!(m.get(0, 0), Some(0.0));
        assert!(m.get(1, 0).unwrap() > 0.9);
    }

    #[test]
    fn resolution_must_be_at_least_two() {
        assert!(SampledEllipseOverlap::new(1).is_err());
    }
}
