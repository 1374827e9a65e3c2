//! normalizer -> duplicate check -> relevance judge -> metric, as one pipeline

use ndarray::{Array2, ArrayView2, Zip};

use super::{gain, overlap, topk, Scores, DEFAULT_K};
use crate::error::Result;
use crate::labels::shape::normalize;
use crate::labels::{LabelValue, Labels, Padding};
use crate::relevance::duplicates::{ensure_unique, warn_on_duplicates};
use crate::relevance::{distinct_hits, Multilabel, Relevance};

/// Normalized inputs together with their relevance matrix.
#[derive(Debug, Clone)]
pub struct Judged<T> {
    pub truth: Array2<T>,
    pub pred: Array2<T>,
    pub relevance: Array2<bool>,
}

impl<T: LabelValue> Judged<T> {
    /// relevance counting each predicted value once
    pub fn hits(&self) -> Array2<bool> {
        distinct_hits(self.relevance.view(), self.pred.view())
    }
}

/// Configures and runs the label-level metrics.
///
/// ```
/// use irmetrics::metrics::Evaluator;
/// use irmetrics::relevance::Unilabel;
///
/// let score = Evaluator::new()
///     .k(Some(3))
///     .relevance(Unilabel)
///     .rr(1i64, vec![0, 1, 4])
///     .unwrap();
/// assert_eq!(score.as_scalar(), Some(0.5));
/// ```
#[derive(Debug, Clone)]
pub struct Evaluator<'a, T, R = Multilabel> {
    k: Option<usize>,
    relevance: R,
    padding: Padding<'a, T>,
    check_duplicates: bool,
}

impl<T: LabelValue> Evaluator<'_, T, Multilabel> {
    pub fn new() -> Self {
        Evaluator {
            k: DEFAULT_K,
            relevance: Multilabel,
            padding: Padding::Natural,
            check_duplicates: true,
        }
    }
}

impl<T: LabelValue> Default for Evaluator<'_, T, Multilabel> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'a, T: LabelValue, R: Relevance<T>> Evaluator<'a, T, R> {
    /// truncation depth; `None` keeps every position
    pub fn k(mut self, k: Option<usize>) -> Self {
        self.k = k;
        self
    }

    pub fn relevance<P: Relevance<T>>(self, relevance: P) -> Evaluator<'a, T, P> {
        Evaluator {
            k: self.k,
            relevance,
            padding: self.padding,
            check_duplicates: self.check_duplicates,
        }
    }

    pub fn padding(mut self, padding: Padding<'a, T>) -> Self {
        self.padding = padding;
        self
    }

    /// whether to warn about duplicate predictions before scoring
    pub fn check_duplicates(mut self, enabled: bool) -> Self {
        self.check_duplicates = enabled;
        self
    }

    // padded predictions are never relevant, even against padded truth
    fn relevant(&self, truth: ArrayView2<T>, pred: ArrayView2<T>) -> Result<Array2<bool>> {
        let mut relevance = self.relevance.judge(truth, pred)?;
        Zip::from(&mut relevance)
            .and(pred)
            .for_each(|relevant, label| *relevant &= !self.padding.matches(label));
        Ok(relevance)
    }

    /// normalizes the inputs and computes their relevance matrix
    pub fn judge(
        &self,
        truth: impl Into<Labels<T>>,
        pred: impl Into<Labels<T>>,
    ) -> Result<Judged<T>> {
        let (truth, pred) = normalize(truth.into(), pred.into(), self.k)?;
        if self.check_duplicates {
            warn_on_duplicates(pred.view(), self.padding);
        }
        let relevance = self.relevant(truth.view(), pred.view())?;
        Ok(Judged {
            truth,
            pred,
            relevance,
        })
    }

    pub fn rr(&self, truth: impl Into<Labels<T>>, pred: impl Into<Labels<T>>) -> Result<Scores> {
        let judged = self.judge(truth, pred)?;
        Ok(Scores::squeeze(topk::reciprocal_ranks(
            judged.relevance.view(),
        )))
    }

    pub fn recall(
        &self,
        truth: impl Into<Labels<T>>,
        pred: impl Into<Labels<T>>,
    ) -> Result<Scores> {
        let judged = self.judge(truth, pred)?;
        let n_true = self.padding.counts(judged.truth.view());
        Ok(Scores::squeeze(topk::recalls(
            judged.hits().view(),
            n_true.view(),
        )))
    }

    pub fn precision(
        &self,
        truth: impl Into<Labels<T>>,
        pred: impl Into<Labels<T>>,
    ) -> Result<Scores> {
        let judged = self.judge(truth, pred)?;
        Ok(Scores::squeeze(topk::precisions(judged.hits().view())))
    }

    pub fn ap(&self, truth: impl Into<Labels<T>>, pred: impl Into<Labels<T>>) -> Result<Scores> {
        let judged = self.judge(truth, pred)?;
        let n_true = self.padding.counts(judged.truth.view());
        Ok(Scores::squeeze(topk::average_precisions(
            judged.hits().view(),
            n_true.view(),
        )))
    }

    pub fn ndcg(&self, truth: impl Into<Labels<T>>, pred: impl Into<Labels<T>>) -> Result<Scores> {
        let judged = self.judge(truth, pred)?;
        let relevance = judged.relevance.mapv(|relevant| if relevant { 1.0 } else { 0.0 });
        // already truncated by the normalizer
        let scores = gain::ndcg(relevance.view(), None, None)?;
        Ok(Scores::squeeze(scores))
    }

    /// Jaccard similarity of truth and predictions. Both must be free of
    /// duplicates; a repeated label is an error here rather than a warning.
    pub fn iou(&self, truth: impl Into<Labels<T>>, pred: impl Into<Labels<T>>) -> Result<Scores> {
        let (truth, pred) = normalize(truth.into(), pred.into(), self.k)?;
        ensure_unique(truth.view(), self.padding, "true")?;
        ensure_unique(pred.view(), self.padding, "predicted")?;

        let relevance = self.relevant(truth.view(), pred.view())?;
        Ok(Scores::squeeze(overlap::jaccard(
            relevance.view(),
            pred.view(),
            truth.view(),
            self.padding,
        )))
    }
}
