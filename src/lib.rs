pub mod error;
pub mod flat;
pub mod labels;
pub mod metrics;
pub mod relevance;

pub use error::{MetricError, Result};
pub use labels::{Label, LabelValue, Labels, Padding};
pub use metrics::{ap, coverage, iou, ndcg, precision, recall, rr, Evaluator, Scores, DEFAULT_K};

// Python bindings are only compiled when the "python" feature is enabled
#[cfg(feature = "python")]
pub mod python;

#[cfg(feature = "python")]
pub use python::irmetrics;
