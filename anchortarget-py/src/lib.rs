//! Python bindings for the anchortarget library.
//!
//! Exposes the per-image target computation to Python via PyO3, returning
//! the four training blobs as float32 numpy arrays.

use std::cell::RefCell;

use numpy::ndarray::{Array2, Array4};
use numpy::{IntoPyArray, PyArray4, PyReadonlyArray2};
use pyo3::exceptions::{PyRuntimeError, PyValueError};
use pyo3::prelude::*;
use rand::rngs::StdRng;
use rand::SeedableRng;

use anchortarget::{
    AnchorTargetError, AnchorTargetGenerator, AssignConfig, BaseAnchor, FeatureSize,
    GroundTruthBox, ImageInputs, OrientedBox, OverlapMatrix, SampledEllipseOverlap,
    TargetConfig as RustTargetConfig, WeightConfig, TARGET_DIM,
};

/// Convert an AnchorTargetError to a Python exception.
fn to_py_err(err: AnchorTargetError) -> PyErr {
    PyRuntimeError::new_err(err.to_string())
}

type Blobs<'py> = (
    Bound<'py, PyArray4<f32>>,
    Bound<'py, PyArray4<f32>>,
    Bound<'py, PyArray4<f32>>,
    Bound<'py, PyArray4<f32>>,
);

/// Configuration for anchor labelling, sampling and regression weights.
#[pyclass]
#[derive(Clone)]
pub struct TargetConfig {
    inner: RustTargetConfig,
}

#[pymethods]
impl TargetConfig {
    /// Create a new TargetConfig.
    ///
    /// Args:
    ///     pos_overlap_thresh: Overlap at or above which an anchor is positive (default: 0.7)
    ///     neg_overlap_thresh: Overlap below which an anchor is negative (default: 0.3)
    ///     clobber_positives: Apply the negative rule last (default: False)
    ///     positive_angle_filter: Max angle difference for positives, degrees (default: 15.0)
    ///     negative_angle_filter: Angle difference above which overlap no longer blocks negatives (default: 15.0)
    ///     batch_size: Labelled anchors kept per image (default: 256)
    ///     fg_fraction: Fraction of the batch reserved for positives (default: 0.5)
    ///     positive_weight: Negative for uniform weighting, else in (0, 1) (default: -1.0)
    ///     inside_weights: Per-coordinate weights for positives (default: [1.0] * 5)
    ///     feature_stride: Image pixels per feature cell (default: 16)
    ///     allowed_border_padding_frac: Border slack as a fraction of the image size (default: 0.0)
    #[new]
    #[pyo3(signature = (
        pos_overlap_thresh = 0.7,
        neg_overlap_thresh = 0.3,
        clobber_positives = false,
        positive_angle_filter = 15.0,
        negative_angle_filter = 15.0,
        batch_size = 256,
        fg_fraction = 0.5,
        positive_weight = -1.0,
        inside_weights = [1.0; TARGET_DIM],
        feature_stride = 16,
        allowed_border_padding_frac = 0.0
    ))]
    #[allow(clippy::too_many_arguments)]
    fn new(
        pos_overlap_thresh: f64,
        neg_overlap_thresh: f64,
        clobber_positives: bool,
        positive_angle_filter: f64,
        negative_angle_filter: f64,
        batch_size: usize,
        fg_fraction: f64,
        positive_weight: f64,
        inside_weights: [f64; TARGET_DIM],
        feature_stride: usize,
        allowed_border_padding_frac: f64,
    ) -> PyResult<Self> {
        let inner = RustTargetConfig {
            assign: AssignConfig {
                pos_overlap_thresh,
                neg_overlap_thresh,
                clobber_positives,
                positive_angle_filter,
                negative_angle_filter,
                batch_size,
                fg_fraction,
            },
            weights: WeightConfig {
                positive_weight,
                inside_weights,
            },
            feature_stride,
            allowed_border_padding_frac,
        };
        inner.validate().map_err(to_py_err)?;
        Ok(Self { inner })
    }

    /// Validate the configuration.
    fn validate(&self) -> PyResult<()> {
        self.inner.validate().map_err(to_py_err)
    }

    fn __repr__(&self) -> String {
        format!(
            "TargetConfig(pos_overlap_thresh={}, neg_overlap_thresh={}, batch_size={}, fg_fraction={}, positive_weight={}, feature_stride={})",
            self.inner.assign.pos_overlap_thresh,
            self.inner.assign.neg_overlap_thresh,
            self.inner.assign.batch_size,
            self.inner.assign.fg_fraction,
            self.inner.weights.positive_weight,
            self.inner.feature_stride
        )
    }
}

/// Rows are `(h, w)`, `(h, w, theta)` or `(cx, cy, h, w, theta)`.
fn base_anchors_from_array(array: &PyReadonlyArray2<'_, f64>) -> PyResult<Vec<BaseAnchor>> {
    let view = array.as_array();
    let cols = view.ncols();
    view.rows()
        .into_iter()
        .map(|row| match cols {
            2 => Ok(BaseAnchor::new(row[0], row[1])),
            3 => Ok(BaseAnchor::new(row[0], row[1]).with_theta(row[2])),
            5 => Ok(BaseAnchor::new(row[2], row[3])
                .with_theta(row[4])
                .centered_at(row[0], row[1])),
            _ => Err(PyValueError::new_err(
                "base_anchors must have 2, 3 or 5 columns",
            )),
        })
        .collect()
}

/// Rows are `(cx, cy, h, w, theta[, class_label, ...])`.
fn ground_truth_from_array(array: &PyReadonlyArray2<'_, f64>) -> PyResult<Vec<GroundTruthBox>> {
    let view = array.as_array();
    if view.ncols() < 5 {
        return Err(PyValueError::new_err("gt_boxes must have at least 5 columns"));
    }
    Ok(view
        .rows()
        .into_iter()
        .map(|row| {
            let bbox = OrientedBox::new(row[0], row[1], row[2], row[3], row[4]);
            let class_label = row.get(5).map_or(0, |&c| c as i32);
            GroundTruthBox::new(bbox, class_label)
        })
        .collect())
}

fn boxes_to_array<'py>(py: Python<'py>, boxes: &[OrientedBox]) -> PyResult<Bound<'py, PyAny>> {
    let flat: Vec<f64> = boxes.iter().flat_map(|b| b.to_array()).collect();
    let array = Array2::from_shape_vec((boxes.len(), TARGET_DIM), flat)
        .map_err(|e| PyValueError::new_err(e.to_string()))?;
    Ok(array.into_pyarray(py).into_any())
}

/// Calls a Python `oracle(anchors, gt) -> (N, K)` array.
fn call_python_oracle(
    py: Python<'_>,
    oracle: &Bound<'_, PyAny>,
    anchors: &[OrientedBox],
    gt: &[OrientedBox],
) -> PyResult<OverlapMatrix> {
    let result = oracle.call1((boxes_to_array(py, anchors)?, boxes_to_array(py, gt)?))?;
    let table: PyReadonlyArray2<'_, f64> = result.extract()?;
    let view = table.as_array();
    let (rows, cols) = view.dim();
    let values: Vec<f64> = view.iter().copied().collect();
    OverlapMatrix::new(values, rows, cols).map_err(to_py_err)
}

fn to_blob<'py>(
    py: Python<'py>,
    shape: [usize; 4],
    values: Vec<f32>,
) -> PyResult<Bound<'py, PyArray4<f32>>> {
    let array = Array4::from_shape_vec((shape[0], shape[1], shape[2], shape[3]), values)
        .map_err(|e| PyValueError::new_err(e.to_string()))?;
    Ok(array.into_pyarray(py))
}

/// Compute anchor targets for one image.
///
/// Args:
///     base_anchors: float64 array, rows (h, w), (h, w, theta) or (cx, cy, h, w, theta)
///     gt_boxes: float64 array (K, 5+), rows (cx, cy, h, w, theta[, class_label])
///     image_size: (width, height) of the image in pixels
///     feature_size: (height, width) of the feature map
///     config: TargetConfig (default: TargetConfig())
///     oracle: Optional callable (anchors, gt) -> (N, K) overlap array.
///         When omitted the built-in sampled ellipse overlap is used.
///     seed: Seed for positive / negative subsampling (default: 0)
///
/// Returns:
///     (labels, bbox_targets, bbox_inside_weights, bbox_outside_weights)
///     as float32 arrays shaped (1, 1, A*H, W) and (1, A*5, H, W).
#[pyfunction]
#[pyo3(signature = (base_anchors, gt_boxes, image_size, feature_size, config = None, oracle = None, seed = 0))]
#[allow(clippy::too_many_arguments)]
fn anchor_targets<'py>(
    py: Python<'py>,
    base_anchors: PyReadonlyArray2<'py, f64>,
    gt_boxes: PyReadonlyArray2<'py, f64>,
    image_size: (f64, f64),
    feature_size: (usize, usize),
    config: Option<TargetConfig>,
    oracle: Option<Bound<'py, PyAny>>,
    seed: u64,
) -> PyResult<Blobs<'py>> {
    let base = base_anchors_from_array(&base_anchors)?;
    let gt = ground_truth_from_array(&gt_boxes)?;
    let cfg = config.map(|c| c.inner).unwrap_or_default();
    let generator = AnchorTargetGenerator::new(&base, cfg).map_err(to_py_err)?;

    let inputs = ImageInputs::new(
        &gt,
        image_size,
        FeatureSize::new(feature_size.0, feature_size.1),
    );
    let mut rng = StdRng::seed_from_u64(seed);

    let out = match oracle {
        Some(callable) => {
            let failure: RefCell<Option<PyErr>> = RefCell::new(None);
            let bridge = |anchors: &[OrientedBox], gt: &[OrientedBox]| {
                call_python_oracle(py, &callable, anchors, gt).map_err(|err| {
                    *failure.borrow_mut() = Some(err);
                    AnchorTargetError::InvalidInput("overlap callback failed")
                })
            };
            let result = generator.compute_targets(&inputs, &bridge, &mut rng);
            if let Some(err) = failure.into_inner() {
                return Err(err);
            }
            result.map_err(to_py_err)?
        }
        None => generator
            .compute_targets(&inputs, &SampledEllipseOverlap::default(), &mut rng)
            .map_err(to_py_err)?,
    };

    let dense = &out.dense;
    let labels: Vec<f32> = dense.labels().iter().map(|l| f32::from(l.value())).collect();
    let as_f32 = |values: &[f64]| values.iter().map(|&v| v as f32).collect::<Vec<f32>>();
    Ok((
        to_blob(py, dense.label_shape(), labels)?,
        to_blob(py, dense.target_shape(), as_f32(dense.targets()))?,
        to_blob(py, dense.target_shape(), as_f32(dense.inside_weights()))?,
        to_blob(py, dense.target_shape(), as_f32(dense.outside_weights()))?,
    ))
}

/// Python module for rotated anchor target generation.
#[pymodule]
fn _anchortarget(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_class::<TargetConfig>()?;
    m.add_function(wrap_pyfunction!(anchor_targets, m)?)?;

    m.add("__version__", env!("CARGO_PKG_VERSION"))?;

    Ok(())
}
