//! top-k metrics: reciprocal rank, recall, precision, average precision, ndcg
//!
//! The batched formulas take relevance (or distinct-hit) matrices and reduce
//! along the position axis. The label-level functions run the full pipeline
//! with multi-label relevance; use [`Evaluator`] for other policies.

use ndarray::{Array1, Array2, ArrayView1, ArrayView2, Axis, Zip};

use super::{Evaluator, Scores};
use crate::error::Result;
use crate::labels::{LabelValue, Labels};

fn count_hits(hits: ArrayView2<bool>) -> Array1<f64> {
    hits.map_axis(Axis(1), |row| row.iter().filter(|&&hit| hit).count() as f64)
}

/// `1 / (index + 1)` of the first relevant position in each row, `0` if none
pub fn reciprocal_ranks(relevance: ArrayView2<bool>) -> Array1<f64> {
    relevance.map_axis(Axis(1), |row| {
        row.iter()
            .position(|&relevant| relevant)
            .map_or(0.0, |index| 1.0 / (index + 1) as f64)
    })
}

// `0` where there is nothing to divide by
fn ratio(numerator: f64, denominator: usize) -> f64 {
    if denominator == 0 {
        0.0
    } else {
        numerator / denominator as f64
    }
}

/// hits over the number of real truth labels of each row
pub fn recalls(hits: ArrayView2<bool>, n_true: ArrayView1<usize>) -> Array1<f64> {
    Zip::from(&count_hits(hits))
        .and(n_true)
        .map_collect(|&found, &n| ratio(found, n))
}

/// hits over the number of predicted positions
pub fn precisions(hits: ArrayView2<bool>) -> Array1<f64> {
    count_hits(hits).mapv(|found| ratio(found, hits.ncols()))
}

/// Sum of precision at each rank holding a hit, over the first
/// `min(n_true, n_labels)` ranks, normalized by the prediction row length.
pub fn average_precisions(hits: ArrayView2<bool>, n_true: ArrayView1<usize>) -> Array1<f64> {
    let mut cumulative: Array2<f64> = hits.mapv(|hit| if hit { 1.0 } else { 0.0 });
    cumulative.accumulate_axis_inplace(Axis(1), |&before, here| *here += before);
    let precision_at = cumulative / &Array1::from_shape_fn(hits.ncols(), |j| (j + 1) as f64);

    let terms = Zip::indexed(&precision_at)
        .and(hits)
        .map_collect(|(i, j), &precision, &hit| {
            if hit && j < n_true[i] {
                precision
            } else {
                0.0
            }
        });
    terms
        .sum_axis(Axis(1))
        .mapv(|total| ratio(total, hits.ncols()))
}

/// Reciprocal rank of the first true label among the top `k` predictions.
pub fn rr<T: LabelValue>(
    truth: impl Into<Labels<T>>,
    pred: impl Into<Labels<T>>,
    k: Option<usize>,
) -> Result<Scores> {
    Evaluator::new().k(k).rr(truth, pred)
}

/// Fraction of the true labels found among the top `k` predictions.
pub fn recall<T: LabelValue>(
    truth: impl Into<Labels<T>>,
    pred: impl Into<Labels<T>>,
    k: Option<usize>,
) -> Result<Scores> {
    Evaluator::new().k(k).recall(truth, pred)
}

/// Fraction of the top `k` predictions that are true labels.
pub fn precision<T: LabelValue>(
    truth: impl Into<Labels<T>>,
    pred: impl Into<Labels<T>>,
    k: Option<usize>,
) -> Result<Scores> {
    Evaluator::new().k(k).precision(truth, pred)
}

pub fn ap<T: LabelValue>(
    truth: impl Into<Labels<T>>,
    pred: impl Into<Labels<T>>,
    k: Option<usize>,
) -> Result<Scores> {
    Evaluator::new().k(k).ap(truth, pred)
}

/// NDCG of binary relevance judgements over the top `k` predictions.
pub fn ndcg<T: LabelValue>(
    truth: impl Into<Labels<T>>,
    pred: impl Into<Labels<T>>,
    k: Option<usize>,
) -> Result<Scores> {
    Evaluator::new().k(k).ndcg(truth, pred)
}
