//! straightforward per-row versions of the metrics, for checking the batched ones

use std::cmp::min;

fn ratio(numerator: f64, denominator: usize) -> f64 {
    if denominator == 0 {
        0.0
    } else {
        numerator / denominator as f64
    }
}

/// positions of `output` holding a true label not already seen earlier in the row
fn hits<T: PartialEq>(truth: &[T], output: &[T]) -> Vec<bool> {
    output
        .iter()
        .enumerate()
        .map(|(i, label)| truth.contains(label) && !output[..i].contains(label))
        .collect()
}

pub fn rr<T: PartialEq>(truth: &[T], output: &[T]) -> f64 {
    for (i, label) in output.iter().enumerate() {
        if truth.contains(label) {
            return 1.0 / (i + 1) as f64;
        }
    }
    0.0
}

pub fn recall<T: PartialEq>(truth: &[T], output: &[T]) -> f64 {
    let matches = hits(truth, output).into_iter().filter(|&hit| hit).count();
    ratio(matches as f64, truth.len())
}

pub fn precision<T: PartialEq>(truth: &[T], output: &[T]) -> f64 {
    let matches = hits(truth, output).into_iter().filter(|&hit| hit).count();
    ratio(matches as f64, output.len())
}

pub fn ap<T: PartialEq>(truth: &[T], output: &[T]) -> f64 {
    let depth = min(truth.len(), output.len());
    let mut matches = 0;
    let mut total = 0.0;

    for (i, hit) in hits(truth, output).into_iter().enumerate() {
        if hit {
            matches += 1;
            if i < depth {
                total += matches as f64 / (i + 1) as f64;
            }
        }
    }

    ratio(total, output.len())
}

fn dcg(relevance: &[f64]) -> f64 {
    relevance
        .iter()
        .enumerate()
        .map(|(i, rel)| (2f64.powf(*rel) - 1.0) / ((i + 2) as f64).log2())
        .sum()
}

pub fn ndcg<T: PartialEq>(truth: &[T], output: &[T]) -> f64 {
    let relevance: Vec<f64> = output
        .iter()
        .map(|label| if truth.contains(label) { 1.0 } else { 0.0 })
        .collect();
    let mut sorted = relevance.clone();
    sorted.sort_by(|a, b| b.total_cmp(a));
    dcg(&relevance) / dcg(&sorted)
}
