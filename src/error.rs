//! error types shared by every metric

use thiserror::Error;

pub type Result<T> = std::result::Result<T, MetricError>;

#[derive(Debug, Error)]
pub enum MetricError {
    /// truth and prediction batches disagree on the number of samples
    #[error("shape mismatch: truth has {truth} samples, predictions have {pred}")]
    ShapeMismatch { truth: usize, pred: usize },

    #[error("single-label relevance expects truth of shape (n_samples, 1), got {shape:?}")]
    MultiLabelTruth { shape: [usize; 2] },

    #[error("duplicate {what} labels in rows {rows:?}")]
    DuplicateLabels { what: &'static str, rows: Vec<usize> },

    #[error("weights of shape {weights:?} do not match relevance of shape {relevance:?}")]
    WeightsShape {
        weights: [usize; 2],
        relevance: [usize; 2],
    },

    #[error("k must be a positive number of positions")]
    InvalidDepth,

    #[error("row {row} has {found} labels, expected {expected}")]
    RaggedRows {
        row: usize,
        expected: usize,
        found: usize,
    },

    #[error("no input rows")]
    EmptyInput,

    #[error("column {0:?} not found in header")]
    MissingColumn(String),

    #[error("line {line}: could not parse {value:?} as a number")]
    Parse { line: u64, value: String },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
