//! coerces truth and prediction inputs into aligned (n_samples, n_labels) batches

use ndarray::{s, Array2, ArrayView2, Axis};
use tracing::{debug, trace};

use super::{LabelValue, Labels};
use crate::error::{MetricError, Result};

/// rejects a truncation depth of zero
pub fn check_depth(k: Option<usize>) -> Result<()> {
    match k {
        Some(0) => Err(MetricError::InvalidDepth),
        _ => Ok(()),
    }
}

/// keeps the first `k` columns (all of them for `None`)
pub fn truncate<A>(labels: ArrayView2<'_, A>, k: Option<usize>) -> ArrayView2<'_, A> {
    let end = k.map_or(labels.ncols(), |k| k.min(labels.ncols()));
    labels.slice_move(s![.., ..end])
}

/// Normalizes a truth/prediction pair.
///
/// Predictions define the batch: a scalar becomes a 1x1 batch and a flat
/// sequence a single row. Truth follows the same rule, with one exception:
/// a flat truth sequence whose length equals the number of prediction rows
/// is read as one label per sample (a column). A single truth row is
/// broadcast across every prediction row. Both batches are then truncated
/// to their first `k` columns.
pub fn normalize<T: LabelValue>(
    truth: Labels<T>,
    pred: Labels<T>,
    k: Option<usize>,
) -> Result<(Array2<T>, Array2<T>)> {
    check_depth(k)?;

    let pred = pred.into_rows();
    let n_samples = pred.nrows();

    let truth = match truth {
        Labels::Flat(column) if column.len() == n_samples => {
            if n_samples > 1 {
                debug!(n_samples, "flat truth read as one label per sample");
            }
            column.insert_axis(Axis(1))
        }
        other => other.into_rows(),
    };
    let truth = align_rows(truth, n_samples)?;

    trace!(truth = ?truth.dim(), pred = ?pred.dim(), ?k, "normalized inputs");

    Ok((
        truncate(truth.view(), k).to_owned(),
        truncate(pred.view(), k).to_owned(),
    ))
}

/// broadcasts a single truth row over `n_samples` rows, or checks the counts agree
fn align_rows<T: LabelValue>(truth: Array2<T>, n_samples: usize) -> Result<Array2<T>> {
    let mismatch = MetricError::ShapeMismatch {
        truth: truth.nrows(),
        pred: n_samples,
    };

    if truth.nrows() == n_samples {
        return Ok(truth);
    }
    if truth.nrows() != 1 {
        return Err(mismatch);
    }

    debug!(n_samples, "broadcasting a single truth row");
    match truth.broadcast((n_samples, truth.ncols())) {
        Some(rows) => Ok(rows.to_owned()),
        None => Err(mismatch),
    }
}
