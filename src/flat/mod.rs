//! Relevance tables in flat form: one row per (query, judged result).
//!
//! Rows are grouped by query, each group keeping its rows in the order they
//! were read, which is taken to be the ranking. Groups of different lengths
//! are packed into one rectangular batch so a measure runs in a single call.

pub mod csv;


use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use ndarray::Array2;
use tracing::debug;

use crate::error::{MetricError, Result};
use crate::metrics::{gain, mean};

/// One judged result of one query.
#[derive(Debug, Clone, PartialEq)]
pub struct FlatRecord<Q> {
    pub query: Q,
    pub relevance: f64,
    /// defaults to `1.0` when absent
    pub weight: Option<f64>,
}

impl<Q> FlatRecord<Q> {
    pub fn new(query: Q, relevance: f64) -> Self {
        FlatRecord {
            query,
            relevance,
            weight: None,
        }
    }

    pub fn weighted(query: Q, relevance: f64, weight: f64) -> Self {
        FlatRecord {
            query,
            relevance,
            weight: Some(weight),
        }
    }
}

/// The ranked judgements of a single query.
#[derive(Debug, Clone, PartialEq)]
pub struct Group<Q> {
    pub query: Q,
    pub relevance: Vec<f64>,
    pub weights: Vec<f64>,
}

impl<Q> Group<Q> {
    pub fn len(&self) -> usize {
        self.relevance.len()
    }

    pub fn is_empty(&self) -> bool {
        self.relevance.is_empty()
    }
}

/// Splits flat records into per-query groups.
pub trait GroupBy<Q> {
    fn group(&self, records: impl IntoIterator<Item = FlatRecord<Q>>) -> Vec<Group<Q>>;
}

/// Groups in ascending query order, rows within a group in input order.
#[derive(Debug, Clone, Copy, Default)]
pub struct SortedGroups;

impl<Q: Ord> GroupBy<Q> for SortedGroups {
    fn group(&self, records: impl IntoIterator<Item = FlatRecord<Q>>) -> Vec<Group<Q>> {
        let mut groups: BTreeMap<Q, (Vec<f64>, Vec<f64>)> = BTreeMap::new();
        for record in records {
            let (relevance, weights) = groups.entry(record.query).or_default();
            relevance.push(record.relevance);
            weights.push(record.weight.unwrap_or(1.0));
        }
        groups
            .into_iter()
            .map(|(query, (relevance, weights))| Group {
                query,
                relevance,
                weights,
            })
            .collect()
    }
}

/// Measures that only need the relevance of the ranked results.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlatMeasure {
    Rr,
    Ndcg,
    /// ndcg with each gain scaled by the row's weight
    Wdcg,
}

impl FlatMeasure {
    pub const ALL: [FlatMeasure; 3] = [FlatMeasure::Rr, FlatMeasure::Ndcg, FlatMeasure::Wdcg];

    pub fn name(&self) -> &'static str {
        match self {
            FlatMeasure::Rr => "rr",
            FlatMeasure::Ndcg => "ndcg",
            FlatMeasure::Wdcg => "wdcg",
        }
    }
}

impl fmt::Display for FlatMeasure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for FlatMeasure {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        FlatMeasure::ALL
            .into_iter()
            .find(|measure| measure.name() == s)
            .ok_or_else(|| format!("unknown flat measure {s:?}"))
    }
}

/// A ragged set of groups as one rectangular batch.
///
/// Missing positions hold `-inf` relevance and zero weight: they are never a
/// hit, sort after every real value, and add no gain.
#[derive(Debug, Clone)]
pub struct Packed {
    pub relevance: Array2<f64>,
    /// `1.0` at real positions
    pub mask: Array2<f64>,
    pub weights: Array2<f64>,
}

pub fn pack<Q>(groups: &[Group<Q>]) -> Packed {
    let width = groups.iter().map(Group::len).max().unwrap_or(0);
    let shape = (groups.len(), width);
    let mut packed = Packed {
        relevance: Array2::from_elem(shape, f64::NEG_INFINITY),
        mask: Array2::zeros(shape),
        weights: Array2::zeros(shape),
    };

    for (i, group) in groups.iter().enumerate() {
        for (j, (&relevance, &weight)) in group.relevance.iter().zip(&group.weights).enumerate() {
            packed.relevance[[i, j]] = relevance;
            packed.mask[[i, j]] = 1.0;
            packed.weights[[i, j]] = weight;
        }
    }
    packed
}

/// Scores every query with `measure` over its first `k` rows, grouping with
/// [`SortedGroups`].
///
/// ```
/// use irmetrics::flat::{flat, FlatMeasure, FlatRecord};
///
/// let records = vec![
///     FlatRecord::new(1, 1.0),
///     FlatRecord::new(1, 0.0),
///     FlatRecord::new(2, 0.0),
///     FlatRecord::new(2, 1.0),
/// ];
/// let scores = flat(records, FlatMeasure::Rr, None).unwrap();
/// assert_eq!(scores, vec![(1, 1.0), (2, 0.5)]);
/// ```
pub fn flat<Q: Ord>(
    records: impl IntoIterator<Item = FlatRecord<Q>>,
    measure: FlatMeasure,
    k: Option<usize>,
) -> Result<Vec<(Q, f64)>> {
    flat_with(&SortedGroups, records, measure, k)
}

/// [`flat`] with a caller-supplied grouping.
pub fn flat_with<Q, G: GroupBy<Q>>(
    grouping: &G,
    records: impl IntoIterator<Item = FlatRecord<Q>>,
    measure: FlatMeasure,
    k: Option<usize>,
) -> Result<Vec<(Q, f64)>> {
    let groups = grouping.group(records);
    if groups.is_empty() {
        return Err(MetricError::EmptyInput);
    }

    let packed = pack(&groups);
    debug!(
        queries = groups.len(),
        width = packed.relevance.ncols(),
        %measure,
        "scoring flat groups"
    );

    let scores = match measure {
        FlatMeasure::Rr => gain::rr(packed.relevance.view(), k)?,
        FlatMeasure::Ndcg => gain::ndcg(packed.relevance.view(), k, Some(packed.mask.view()))?,
        FlatMeasure::Wdcg => {
            gain::ndcg(packed.relevance.view(), k, Some(packed.weights.view()))?
        }
    };

    Ok(groups
        .into_iter()
        .map(|group| group.query)
        .zip(scores)
        .collect())
}

/// Mean of the per-query scores; `skip_nan` leaves out queries without any
/// relevant result.
pub fn mean_score<Q: Ord>(
    records: impl IntoIterator<Item = FlatRecord<Q>>,
    measure: FlatMeasure,
    k: Option<usize>,
    skip_nan: bool,
) -> Result<f64> {
    let scores = flat(records, measure, k)?;
    Ok(mean(scores.into_iter().map(|(_, score)| score), skip_nan))
}
