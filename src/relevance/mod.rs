//! relevance judgements: which predicted positions hold a true label

pub mod duplicates;

use ndarray::{Array2, Array3, ArrayView2, Axis, Zip};

use crate::error::{MetricError, Result};
use crate::labels::LabelValue;

/// Computes a boolean (n_samples, n_labels) relevance matrix from aligned
/// truth and prediction batches.
pub trait Relevance<T: LabelValue> {
    fn judge(&self, truth: ArrayView2<T>, pred: ArrayView2<T>) -> Result<Array2<bool>>;
}

/// One true label per sample; truth must be a single column.
#[derive(Debug, Clone, Copy, Default)]
pub struct Unilabel;

/// Any number of true labels per sample; a position is relevant if it
/// matches any of them.
#[derive(Debug, Clone, Copy, Default)]
pub struct Multilabel;

impl<T: LabelValue> Relevance<T> for Unilabel {
    fn judge(&self, truth: ArrayView2<T>, pred: ArrayView2<T>) -> Result<Array2<bool>> {
        if truth.ncols() != 1 {
            return Err(MetricError::MultiLabelTruth {
                shape: [truth.nrows(), truth.ncols()],
            });
        }
        check_rows(truth, pred)?;

        Ok(Zip::from(pred)
            .and_broadcast(truth)
            .map_collect(|p, t| p == t))
    }
}

impl<T: LabelValue> Relevance<T> for Multilabel {
    fn judge(&self, truth: ArrayView2<T>, pred: ArrayView2<T>) -> Result<Array2<bool>> {
        check_rows(truth, pred)?;

        Ok(pairwise_eq(pred, truth).map_axis(Axis(2), |lane| lane.iter().any(|&hit| hit)))
    }
}

impl<T: LabelValue, R: Relevance<T> + ?Sized> Relevance<T> for &R {
    fn judge(&self, truth: ArrayView2<T>, pred: ArrayView2<T>) -> Result<Array2<bool>> {
        (**self).judge(truth, pred)
    }
}

fn check_rows<T>(truth: ArrayView2<T>, pred: ArrayView2<T>) -> Result<()> {
    if truth.nrows() != pred.nrows() {
        return Err(MetricError::ShapeMismatch {
            truth: truth.nrows(),
            pred: pred.nrows(),
        });
    }
    Ok(())
}

/// `[i, j, t]` is whether `left[i, j] == right[i, t]`; both sides must have
/// the same number of rows
fn pairwise_eq<T: PartialEq>(left: ArrayView2<T>, right: ArrayView2<T>) -> Array3<bool> {
    debug_assert_eq!(left.nrows(), right.nrows());
    let shape = (left.nrows(), left.ncols(), right.ncols());
    Array3::from_shape_fn(shape, |(i, j, t)| left[[i, j]] == right[[i, t]])
}

/// how many times each position's value occurs in its own row (itself included)
pub fn repeat_counts<T: LabelValue>(labels: ArrayView2<T>) -> Array2<usize> {
    pairwise_eq(labels, labels).map_axis(Axis(2), |lane| lane.iter().filter(|&&eq| eq).count())
}

/// whether each position holds the first occurrence of its value in the row
pub fn first_occurrences<T: LabelValue>(labels: ArrayView2<T>) -> Array2<bool> {
    let mut earlier = pairwise_eq(labels, labels);
    Zip::indexed(&mut earlier).for_each(|(_, j, t), eq| *eq &= t < j);
    earlier.map_axis(Axis(2), |lane| !lane.iter().any(|&eq| eq))
}

/// Relevance restricted to the first occurrence of each predicted value, so
/// a true label predicted several times is only counted once.
pub fn distinct_hits<T: LabelValue>(
    relevance: ArrayView2<bool>,
    pred: ArrayView2<T>,
) -> Array2<bool> {
    Zip::from(relevance)
        .and(&first_occurrences(pred))
        .map_collect(|&relevant, &first| relevant && first)
}
