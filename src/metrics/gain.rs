//! discounted cumulative gain over (possibly graded) relevance matrices
//!
//! The gain of position `j` (0-indexed) is `(2^rel - 1) / log2(j + 2)`,
//! optionally scaled by a per-position weight. NDCG divides the DCG of the
//! given order by the DCG of the same values sorted in descending order; a
//! row with no positive relevance has an ideal DCG of zero and scores `NaN`.

use itertools::Itertools;
use ndarray::{Array1, Array2, ArrayView2, Axis, Zip};

use super::topk::reciprocal_ranks;
use crate::error::{MetricError, Result};
use crate::labels::shape::{check_depth, truncate};

/// `log2(j + 2)` for each of the first `n` positions
pub fn discounts(n: usize) -> Array1<f64> {
    Array1::from_shape_fn(n, |j| ((j + 2) as f64).log2())
}

fn check_weights(relevance: ArrayView2<f64>, weights: Option<ArrayView2<f64>>) -> Result<()> {
    match weights {
        Some(w) if w.dim() != relevance.dim() => Err(MetricError::WeightsShape {
            weights: [w.nrows(), w.ncols()],
            relevance: [relevance.nrows(), relevance.ncols()],
        }),
        _ => Ok(()),
    }
}

/// DCG of each row over its first `k` positions
pub fn dcg(
    relevance: ArrayView2<f64>,
    k: Option<usize>,
    weights: Option<ArrayView2<f64>>,
) -> Result<Array1<f64>> {
    check_depth(k)?;
    check_weights(relevance, weights)?;

    let relevance = truncate(relevance, k);
    let gains = relevance.mapv(|r| r.exp2() - 1.0) / &discounts(relevance.ncols());
    let gains = match weights {
        Some(w) => gains * &truncate(w, k),
        None => gains,
    };
    Ok(gains.sum_axis(Axis(1)))
}

/// Sorts each row into descending relevance, carrying the weights along.
pub fn ideal(
    relevance: ArrayView2<f64>,
    weights: Option<ArrayView2<f64>>,
) -> Result<(Array2<f64>, Option<Array2<f64>>)> {
    check_weights(relevance, weights)?;

    let mut order = Array2::from_shape_fn(relevance.dim(), |(_, j)| j);
    Zip::from(order.rows_mut())
        .and(relevance.rows())
        .for_each(|mut positions, row| {
            let ranked = (0..row.len()).sorted_by(|&a, &b| row[b].total_cmp(&row[a]));
            positions.assign(&Array1::from_iter(ranked));
        });

    let gather = |values: ArrayView2<f64>| {
        Array2::from_shape_fn(values.dim(), |(i, j)| values[[i, order[[i, j]]]])
    };
    let sorted = gather(relevance);
    Ok((sorted, weights.map(|w| gather(w))))
}

/// NDCG of each row over its first `k` positions
pub fn ndcg(
    relevance: ArrayView2<f64>,
    k: Option<usize>,
    weights: Option<ArrayView2<f64>>,
) -> Result<Array1<f64>> {
    let actual = dcg(relevance, k, weights)?;
    let (ideal_relevance, ideal_weights) = ideal(relevance, weights)?;
    let best = dcg(
        ideal_relevance.view(),
        k,
        ideal_weights.as_ref().map(|w| w.view()),
    )?;
    Ok(actual / best)
}

/// reciprocal rank of the first positive relevance within the first `k` positions
pub fn rr(relevance: ArrayView2<f64>, k: Option<usize>) -> Result<Array1<f64>> {
    check_depth(k)?;
    let positive = truncate(relevance, k).mapv(|r| r > 0.0);
    Ok(reciprocal_ranks(positive.view()))
}
