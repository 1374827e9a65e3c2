//! detection of repeated candidates within a ranking

use ndarray::{Array1, ArrayView2, Axis, Zip};
use tracing::warn;

use super::repeat_counts;
use crate::error::{MetricError, Result};
use crate::labels::{LabelValue, Padding};

/// Flags every row in which some non-padding value occurs more than once.
///
/// Rows of length one can't hold duplicates and are never flagged.
pub fn duplicate_rows<T: LabelValue>(labels: ArrayView2<T>, padding: Padding<T>) -> Array1<bool> {
    if labels.ncols() < 2 {
        return Array1::from_elem(labels.nrows(), false);
    }

    let repeated = Zip::from(&repeat_counts(labels))
        .and(labels)
        .map_collect(|&count, value| count > 1 && !padding.matches(value));
    repeated.map_axis(Axis(1), |row| row.iter().any(|&r| r))
}

fn flagged(rows: &Array1<bool>) -> Vec<usize> {
    rows.iter()
        .enumerate()
        .filter_map(|(i, &dup)| dup.then_some(i))
        .collect()
}

/// Logs a warning naming the rows with duplicate predictions. Never fails
/// and never alters what the caller goes on to compute.
pub fn warn_on_duplicates<T: LabelValue>(pred: ArrayView2<T>, padding: Padding<T>) {
    let rows = flagged(&duplicate_rows(pred, padding));
    if !rows.is_empty() {
        warn!(
            count = rows.len(),
            ?rows,
            "predictions contain duplicate labels; metrics assume distinct candidates"
        );
    }
}

/// Fails with [`MetricError::DuplicateLabels`] if any row repeats a value.
pub fn ensure_unique<T: LabelValue>(
    labels: ArrayView2<T>,
    padding: Padding<T>,
    what: &'static str,
) -> Result<()> {
    let rows = flagged(&duplicate_rows(labels, padding));
    if rows.is_empty() {
        Ok(())
    } else {
        Err(MetricError::DuplicateLabels { what, rows })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;
    use std::sync::{Arc, Mutex};

    #[test]
    fn flags_rows_with_repeats() {
        let pred = array![[1, 2, 3], [1, 1, 3], [4, 4, 4]];
        let rows = duplicate_rows(pred.view(), Padding::Natural);
        assert_eq!(rows, array![false, true, true]);
    }

    #[test]
    fn single_column_rows_are_never_duplicates() {
        let pred = array![[1], [1]];
        assert_eq!(duplicate_rows(pred.view(), Padding::Natural), array![false, false]);
    }

    #[test]
    fn repeated_padding_is_allowed() {
        let pred = array![[Some(1), None, None], [Some(2), Some(2), None]];
        let rows = duplicate_rows(pred.view(), Padding::Natural);
        assert_eq!(rows, array![false, true]);

        let sentinel = 0;
        let pred = array![[1, 0, 0]];
        assert_eq!(duplicate_rows(pred.view(), Padding::Value(&sentinel)), array![false]);
        assert_eq!(duplicate_rows(pred.view(), Padding::Natural), array![true]);
    }

    #[test]
    fn ensure_unique_reports_rows() {
        let pred = array![[1, 2], [3, 3], [5, 6], [7, 7]];
        match ensure_unique(pred.view(), Padding::Natural, "predicted") {
            Err(MetricError::DuplicateLabels { what, rows }) => {
                assert_eq!(what, "predicted");
                assert_eq!(rows, vec![1, 3]);
            }
            other => panic!("expected duplicate labels, got {other:?}"),
        }
        assert!(ensure_unique(array![[1, 2]].view(), Padding::Natural, "true").is_ok());
    }

    #[derive(Clone, Default)]
    struct Capture(Arc<Mutex<Vec<u8>>>);

    impl std::io::Write for Capture {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    fn logged(pred: ArrayView2<i64>) -> String {
        let capture = Capture::default();
        let writer = capture.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(move || writer.clone())
            .with_ansi(false)
            .finish();
        tracing::subscriber::with_default(subscriber, || {
            warn_on_duplicates(pred, Padding::Natural)
        });
        let bytes = capture.0.lock().unwrap().clone();
        String::from_utf8(bytes).unwrap()
    }

    #[test]
    fn warns_only_when_a_row_repeats() {
        let output = logged(array![[1, 2, 3], [1, 1, 1]].view());
        assert!(output.contains("WARN"), "{output}");
        assert!(output.contains("duplicate labels"), "{output}");
        assert!(output.contains("rows=[1]"), "{output}");

        assert!(logged(array![[1, 2, 3], [4, 5, 6]].view()).is_empty());
    }
}
