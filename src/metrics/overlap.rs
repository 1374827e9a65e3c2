//! set-overlap metrics: coverage and intersection over union

use ndarray::{Array1, ArrayView2, Axis, Zip};

use super::{Evaluator, Scores};
use crate::error::Result;
use crate::labels::{LabelValue, Labels, Padding};

/// `1` for each prediction row holding at least one non-padding value, else `0`.
pub fn coverage<T: LabelValue>(pred: impl Into<Labels<T>>, padding: Padding<T>) -> Scores {
    let pred = pred.into().into_rows();
    let covered = padding.mask(pred.view()).map_axis(Axis(1), |row| {
        if row.iter().any(|&real| real) {
            1.0
        } else {
            0.0
        }
    });
    Scores::squeeze(covered)
}

/// `|pred ∩ truth| / |pred ∪ truth|` per row, counting only non-padding
/// labels. Rows are assumed to hold distinct values.
pub fn jaccard<T: LabelValue>(
    relevance: ArrayView2<bool>,
    pred: ArrayView2<T>,
    truth: ArrayView2<T>,
    padding: Padding<T>,
) -> Array1<f64> {
    let intersection = Zip::from(relevance)
        .and(pred)
        .map_collect(|&relevant, label| relevant && !padding.matches(label))
        .map_axis(Axis(1), |row| row.iter().filter(|&&hit| hit).count() as f64);
    let sizes = (padding.counts(pred) + padding.counts(truth)).mapv(|n| n as f64);
    &intersection / &(sizes - &intersection)
}

/// Intersection over union of the top `k` predictions and the true labels.
///
/// Fails with [`crate::error::MetricError::DuplicateLabels`] if either side
/// repeats a label.
pub fn iou<T: LabelValue>(
    truth: impl Into<Labels<T>>,
    pred: impl Into<Labels<T>>,
    k: Option<usize>,
) -> Result<Scores> {
    Evaluator::new().k(k).iou(truth, pred)
}
