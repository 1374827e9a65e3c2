//! batched ranking metrics

pub mod evaluator;
pub mod gain;
pub mod overlap;
pub mod topk;

#[cfg(test)]
mod reference;
#[cfg(test)]
mod tests;

use ndarray::Array1;

pub use evaluator::{Evaluator, Judged};
pub use overlap::{coverage, iou};
pub use topk::{ap, ndcg, precision, recall, rr};

/// Default truncation depth of the label-level metrics.
pub const DEFAULT_K: Option<usize> = Some(20);

/// Per-sample scores, collapsed to a scalar for a single sample.
#[derive(Debug, Clone, PartialEq)]
pub enum Scores {
    Scalar(f64),
    Batch(Array1<f64>),
}

impl Scores {
    pub fn squeeze(values: Array1<f64>) -> Scores {
        if values.len() == 1 {
            Scores::Scalar(values[0])
        } else {
            Scores::Batch(values)
        }
    }

    pub fn as_scalar(&self) -> Option<f64> {
        match self {
            Scores::Scalar(value) => Some(*value),
            Scores::Batch(_) => None,
        }
    }

    pub fn to_array(&self) -> Array1<f64> {
        match self {
            Scores::Scalar(value) => Array1::from_elem(1, *value),
            Scores::Batch(values) => values.clone(),
        }
    }

    pub fn len(&self) -> usize {
        match self {
            Scores::Scalar(_) => 1,
            Scores::Batch(values) => values.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn iter(&self) -> impl Iterator<Item = f64> + '_ {
        let values: Box<dyn Iterator<Item = f64> + '_> = match self {
            Scores::Scalar(value) => Box::new(std::iter::once(*value)),
            Scores::Batch(values) => Box::new(values.iter().copied()),
        };
        values
    }

    pub fn mean(&self, skip_nan: bool) -> f64 {
        mean(self.iter(), skip_nan)
    }
}

impl From<Scores> for Array1<f64> {
    fn from(scores: Scores) -> Self {
        match scores {
            Scores::Scalar(value) => Array1::from_elem(1, value),
            Scores::Batch(values) => values,
        }
    }
}

/// Mean of a set of scores. With `skip_nan` undefined scores are left out;
/// otherwise any `NaN` makes the mean `NaN`. An empty set has mean `NaN`.
pub fn mean(scores: impl IntoIterator<Item = f64>, skip_nan: bool) -> f64 {
    let (sum, count) = scores
        .into_iter()
        .filter(|score| !(skip_nan && score.is_nan()))
        .fold((0.0, 0usize), |(sum, count), score| (sum + score, count + 1));
    sum / count as f64
}
