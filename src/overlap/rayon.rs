//! Rayon-parallel overlap rows (feature-gated).
//!
//! Rows are independent, so each anchor is scored on its own worker and the
//! rows are concatenated in anchor order.

use crate::geometry::OrientedBox;
use crate::overlap::SampledEllipseOverlap;
use rayon::prelude::*;

pub(crate) fn overlap_rows_par(
    oracle: &SampledEllipseOverlap,
    anchors: &[OrientedBox],
    gt: &[OrientedBox],
) -> Vec<f64> {
    let rows: Vec<Vec<f64>> = anchors.par_iter().map(|a| oracle.row(a, gt)).collect();
    let mut data = Vec::with_capacity(anchors.len() * gt.len());
    for row in rows {
        data.extend(row);
    }
    data
}
