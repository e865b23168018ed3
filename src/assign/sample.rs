//! Balanced positive / negative subsampling.

use crate::assign::{AssignConfig, Label};
use rand::seq::index;
use rand::Rng;

/// Demotes excess labels to `Ignore` so at most `num_fg` positives and
/// `batch_size` labelled anchors remain.
///
/// Demoted anchors are drawn uniformly without replacement from `rng`.
pub fn subsample<R>(labels: &mut [Label], cfg: &AssignConfig, rng: &mut R)
where
    R: Rng + ?Sized,
{
    let num_fg = cfg.num_fg();
    let kept_fg = disable_excess(labels, Label::Positive, num_fg, rng);

    let num_bg = cfg.batch_size.saturating_sub(kept_fg);
    disable_excess(labels, Label::Negative, num_bg, rng);
}

/// Keeps at most `keep` anchors with `label`; returns how many remain.
fn disable_excess<R>(labels: &mut [Label], label: Label, keep: usize, rng: &mut R) -> usize
where
    R: Rng + ?Sized,
{
    let candidates: Vec<usize> = labels
        .iter()
        .enumerate()
        .filter(|(_, l)| **l == label)
        .map(|(i, _)| i)
        .collect();
    if candidates.len() <= keep {
        return candidates.len();
    }
    let excess = candidates.len() - keep;
    for pick in index::sample(rng, candidates.len(), excess).iter() {
        labels[candidates[pick]] = Label::Ignore;
    }
    keep
}
