//! Inside and outside loss weights for the regression targets.

use crate::assign::Label;
use crate::codec::TARGET_DIM;
use crate::util::{AnchorTargetError, AnchorTargetResult};

/// Weighting of regression and classification examples.
#[derive(Clone, Debug)]
pub struct WeightConfig {
    /// Negative selects uniform weighting over all labelled anchors;
    /// otherwise the share of the total weight given to positives, in `(0, 1)`.
    pub positive_weight: f64,
    /// Per-component inside weight for positive anchors.
    pub inside_weights: [f64; TARGET_DIM],
}

impl Default for WeightConfig {
    fn default() -> Self {
        Self {
            positive_weight: -1.0,
            inside_weights: [1.0; TARGET_DIM],
        }
    }
}

impl WeightConfig {
    pub fn validate(&self) -> AnchorTargetResult<()> {
        let pw = self.positive_weight;
        if pw.is_nan() || (pw >= 0.0 && !(pw > 0.0 && pw < 1.0)) {
            return Err(AnchorTargetError::InvalidWeight {
                positive_weight: pw,
            });
        }
        if self.inside_weights.iter().any(|w| !w.is_finite()) {
            return Err(AnchorTargetError::InvalidConfig {
                reason: "inside weights must be finite",
            });
        }
        Ok(())
    }
}

/// Per-anchor inside and outside weights, parallel to the label slice.
#[derive(Clone, Debug, Default)]
pub struct RegressionWeights {
    pub inside: Vec<[f64; TARGET_DIM]>,
    pub outside: Vec<[f64; TARGET_DIM]>,
}

/// Computes weights from the final labels.
///
/// Inside weights are `inside_weights` for positives and zero elsewhere.
/// Outside weights are `1 / labelled` for every labelled anchor in uniform
/// mode, or `p / positives` and `(1 - p) / negatives` otherwise.
pub fn compute_weights(
    labels: &[Label],
    cfg: &WeightConfig,
) -> AnchorTargetResult<RegressionWeights> {
    cfg.validate()?;

    let positives = labels.iter().filter(|&&l| l == Label::Positive).count();
    let negatives = labels.iter().filter(|&&l| l == Label::Negative).count();

    // Only evaluated for labels that exist, so the counts are never zero.
    let (pos_weight, neg_weight) = if cfg.positive_weight < 0.0 {
        let uniform = 1.0 / (positives + negatives).max(1) as f64;
        (uniform, uniform)
    } else {
        (
            cfg.positive_weight / positives.max(1) as f64,
            (1.0 - cfg.positive_weight) / negatives.max(1) as f64,
        )
    };

    let mut weights = RegressionWeights {
        inside: Vec::with_capacity(labels.len()),
        outside: Vec::with_capacity(labels.len()),
    };
    for label in labels {
        let (inside, outside) = match label {
            Label::Positive => (cfg.inside_weights, pos_weight),
            Label::Negative => ([0.0; TARGET_DIM], neg_weight),
            Label::Ignore => ([0.0; TARGET_DIM], 0.0),
        };
        weights.inside.push(inside);
        weights.outside.push([outside; TARGET_DIM]);
    }
    Ok(weights)
}
