use super::*;
use crate::error::MetricError;
use crate::labels::{Label, Labels, Padding};
use crate::relevance::Unilabel;

use ndarray::{array, Array1, Array2};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

const N_SAMPLES: usize = 128;

type Metric = fn(Labels<i64>, Labels<i64>, Option<usize>) -> crate::error::Result<Scores>;

// a single true label against short rankings; the last one only hits past k = 20
fn inputs() -> Vec<(i64, Vec<i64>)> {
    let mut late_hit = vec![0; 60];
    late_hit.push(1);
    vec![
        (1, vec![1, 0, 0]),
        (1, vec![0, 1, 0]),
        (1, vec![0, 0, 1]),
        (1, vec![1, 1, 1]),
        (1, vec![0, 0, 0]),
        (1, late_hit),
    ]
}

fn close(a: f64, b: f64) -> bool {
    (a.is_nan() && b.is_nan()) || (a - b).abs() < 1e-12
}

fn check_table(metric: Metric, expected: [f64; 6]) {
    for ((truth, pred), expected) in inputs().into_iter().zip(expected) {
        let score = metric(Labels::scalar(truth), pred.clone().into(), DEFAULT_K).unwrap();
        let score = score.as_scalar().unwrap();
        assert!(close(score, expected), "{pred:?}: {score} != {expected}");

        // the same query tiled into a batch scores the same in every row
        let truths = Array1::from_elem(N_SAMPLES, truth);
        let preds = Array2::from_shape_fn((N_SAMPLES, pred.len()), |(_, j)| pred[j]);
        let scores = metric(truths.into(), preds.into(), DEFAULT_K).unwrap();
        assert_eq!(scores.len(), N_SAMPLES);
        assert!(scores.iter().all(|s| close(s, expected)), "{pred:?}: {scores:?}");
    }
}

#[test]
fn reciprocal_rank_table() {
    check_table(rr::<i64>, [1.0, 0.5, 1.0 / 3.0, 1.0, 0.0, 0.0]);
}

#[test]
fn recall_table() {
    check_table(recall::<i64>, [1.0, 1.0, 1.0, 1.0, 0.0, 0.0]);
}

#[test]
fn precision_table() {
    let third = 1.0 / 3.0;
    check_table(precision::<i64>, [third, third, third, third, 0.0, 0.0]);
}

#[test]
fn ndcg_table() {
    check_table(
        ndcg::<i64>,
        [1.0, 1.0 / 3f64.log2(), 0.5, 1.0, f64::NAN, f64::NAN],
    );
}

#[test]
fn average_precision_table() {
    let third = 1.0 / 3.0;
    check_table(ap::<i64>, [third, 0.0, 0.0, third, 0.0, 0.0]);
}

#[test]
fn precision_of_one_label_among_four() {
    let score = precision(1i64, [0i64, 1, 4, 3], None).unwrap();
    assert_eq!(score, Scores::Scalar(0.25));
}

#[test]
fn ndcg_ignores_truth_order() {
    let forward = ndcg([1i64, 2], [0i64, 1, 0, 0], None).unwrap();
    let backward = ndcg([2i64, 1], [0i64, 1, 0, 0], None).unwrap();
    let expected = 0.6309297535714575;
    assert!((forward.as_scalar().unwrap() - expected).abs() < 1e-12);
    assert_eq!(forward, backward);
}

#[test]
fn ndcg_without_relevant_items_is_undefined() {
    let score = ndcg(5i64, [0i64, 1, 2], None).unwrap();
    assert!(score.as_scalar().unwrap().is_nan());
}

#[test]
fn unilabel_policy_through_the_pipeline() {
    let evaluator = Evaluator::new().k(None).relevance(Unilabel);
    assert_eq!(
        evaluator.rr(1i64, [0i64, 0, 1]).unwrap(),
        Scores::Scalar(1.0 / 3.0)
    );

    let truth = array![[1i64, 2]];
    let pred = array![[2i64, 1]];
    assert!(matches!(
        evaluator.rr(truth, pred),
        Err(MetricError::MultiLabelTruth { .. })
    ));
}

#[test]
fn mismatched_batches_fail_every_metric() {
    let truth = array![[1i64], [2]];
    let pred = array![[1i64, 2], [3, 4], [5, 6]];
    let metrics: [Metric; 5] = [
        rr::<i64>,
        recall::<i64>,
        precision::<i64>,
        ap::<i64>,
        ndcg::<i64>,
    ];
    for metric in metrics {
        assert!(matches!(
            metric(truth.clone().into(), pred.clone().into(), None),
            Err(MetricError::ShapeMismatch { truth: 2, pred: 3 })
        ));
    }
}

#[test]
fn recall_skips_padding_in_the_denominator() {
    let truth = array![[Some(1), Some(2), None, None]];
    let pred = array![[Some(1), Some(5), Some(6)]];
    let score = recall(truth, pred, None).unwrap();
    assert_eq!(score, Scores::Scalar(0.5));
}

#[test]
fn padding_never_matches_padding() {
    let truth = array![[Some(1), None]];
    let pred = array![[None, Some(1), None]];
    assert_eq!(rr(truth.clone(), pred.clone(), None).unwrap(), Scores::Scalar(0.5));
    assert_eq!(recall(truth.clone(), pred.clone(), None).unwrap(), Scores::Scalar(1.0));
    assert_eq!(
        precision(truth, pred, None).unwrap(),
        Scores::Scalar(1.0 / 3.0)
    );
}

#[test]
fn empty_rows_score_zero() {
    let none: Vec<i64> = Vec::new();
    assert_eq!(precision(1i64, none.clone(), None).unwrap(), Scores::Scalar(0.0));
    assert_eq!(ap(1i64, none.clone(), None).unwrap(), Scores::Scalar(0.0));
    assert_eq!(rr(1i64, none.clone(), None).unwrap(), Scores::Scalar(0.0));
    assert_eq!(recall(none, vec![1i64, 2], None).unwrap(), Scores::Scalar(0.0));

    // a sample whose truth is all padding has nothing to recall
    let truth = array![[None, None], [Some(3), None]];
    let pred = array![[Some(1), Some(2)], [Some(3), Some(4)]];
    assert_eq!(
        recall(truth, pred, None).unwrap(),
        Scores::Batch(array![0.0, 1.0])
    );
}

#[test]
fn recall_with_a_caller_supplied_sentinel() {
    let sentinel = -1i64;
    let evaluator = Evaluator::new()
        .k(None)
        .padding(Padding::Value(&sentinel));
    let score = evaluator
        .recall(array![[1i64, 2, -1], [3, -1, -1]], array![[2i64, 9], [3, 4]])
        .unwrap();
    assert_eq!(score, Scores::Batch(array![0.5, 1.0]));
}

#[test]
fn mixed_label_types() {
    let truth: Vec<Label> = vec!["doc-a".into(), 7i64.into()];
    let pred: Vec<Label> = vec![Label::from(7i64), "doc-b".into(), "doc-a".into(), Label::Pad];
    let score = recall(truth.clone(), pred.clone(), None).unwrap();
    assert_eq!(score, Scores::Scalar(1.0));
    let score = rr(truth, pred, None).unwrap();
    assert_eq!(score, Scores::Scalar(1.0));

    // an integer never matches its own spelling
    let score = rr(Label::from("7"), vec![Label::from(7i64)], None).unwrap();
    assert_eq!(score, Scores::Scalar(0.0));
}

#[test]
fn duplicate_warning_leaves_scores_untouched() {
    let pred = array![[1i64, 1, 2], [3, 3, 3]];
    let truth = array![[1i64], [3]];
    let checked = Evaluator::new().ndcg(truth.clone(), pred.clone()).unwrap();
    let unchecked = Evaluator::new()
        .check_duplicates(false)
        .ndcg(truth, pred)
        .unwrap();
    assert_eq!(checked, unchecked);
}

#[test]
fn scores_squeeze_only_single_samples() {
    assert_eq!(Scores::squeeze(array![0.5]), Scores::Scalar(0.5));
    let batch = Scores::squeeze(array![0.5, 1.0]);
    assert_eq!(batch.as_scalar(), None);
    assert_eq!(batch.to_array(), array![0.5, 1.0]);
    assert!((batch.mean(false) - 0.75).abs() < 1e-12);
}

#[test]
fn mean_with_and_without_nan() {
    let scores = [1.0, f64::NAN, 0.0];
    assert!(mean(scores, false).is_nan());
    assert!((mean(scores, true) - 0.5).abs() < 1e-12);
    assert!(mean([], true).is_nan());
}

fn random_batch(rng: &mut StdRng, n: usize, width: usize, vocabulary: i64) -> Array2<i64> {
    Array2::from_shape_fn((n, width), |_| rng.random_range(0..vocabulary))
}

fn row(batch: &Array2<i64>, i: usize, k: Option<usize>) -> Vec<i64> {
    let end = k.map_or(batch.ncols(), |k| k.min(batch.ncols()));
    batch.row(i).iter().take(end).copied().collect()
}

#[test]
fn batched_metrics_agree_with_per_row_reference() {
    let mut rng = StdRng::seed_from_u64(1724);
    let checks: [(Metric, fn(&[i64], &[i64]) -> f64); 5] = [
        (rr::<i64>, reference::rr),
        (recall::<i64>, reference::recall),
        (precision::<i64>, reference::precision),
        (ap::<i64>, reference::ap),
        (ndcg::<i64>, reference::ndcg),
    ];

    for _ in 0..20 {
        let n = rng.random_range(2..40);
        let n_true = rng.random_range(1..6);
        let n_labels = rng.random_range(1..15);
        let truth = random_batch(&mut rng, n, n_true, 20);
        let pred = random_batch(&mut rng, n, n_labels, 20);
        let k = match rng.random_range(0..3) {
            0 => None,
            _ => Some(rng.random_range(1..n_labels + 3)),
        };

        for (metric, reference) in checks {
            let scores = metric(truth.clone().into(), pred.clone().into(), k).unwrap();
            let scores = scores.to_array();
            assert_eq!(scores.len(), n);
            for i in 0..n {
                let expected = reference(&row(&truth, i, k), &row(&pred, i, k));
                assert!(
                    close(scores[i], expected),
                    "row {i} with k = {k:?}: {} != {expected}",
                    scores[i]
                );
            }
        }
    }
}

#[test]
fn truncation_commutes_with_scoring() {
    let mut rng = StdRng::seed_from_u64(400);
    let truth = random_batch(&mut rng, 16, 4, 12);
    let pred = random_batch(&mut rng, 16, 10, 12);
    let metrics: [Metric; 5] = [
        rr::<i64>,
        recall::<i64>,
        precision::<i64>,
        ap::<i64>,
        ndcg::<i64>,
    ];

    for k in 1..12 {
        let end = k.min(pred.ncols());
        let short_truth = truth.slice(ndarray::s![.., ..k.min(truth.ncols())]).to_owned();
        let short_pred = pred.slice(ndarray::s![.., ..end]).to_owned();
        for metric in metrics {
            let truncated = metric(truth.clone().into(), pred.clone().into(), Some(k)).unwrap();
            let pre_cut = metric(short_truth.clone().into(), short_pred.clone().into(), None).unwrap();
            let agree = truncated
                .iter()
                .zip(pre_cut.iter())
                .all(|(a, b)| close(a, b));
            assert!(agree, "k = {k}");
        }
    }
}
