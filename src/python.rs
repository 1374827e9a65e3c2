//! Python bindings for the irmetrics library
//! This module is only compiled when the "python" feature is enabled

use ndarray::{Ix1, Ix2};
use numpy::{IntoPyArray, PyReadonlyArrayDyn};
use pyo3::exceptions::PyValueError;
use pyo3::prelude::*;
use pyo3::types::PyFloat;

use crate::error::MetricError;
use crate::labels::{Labels, Padding};
use crate::metrics::{self, Scores, DEFAULT_K};

impl From<MetricError> for PyErr {
    fn from(err: MetricError) -> PyErr {
        PyValueError::new_err(err.to_string())
    }
}

fn labels(array: PyReadonlyArrayDyn<'_, i64>) -> PyResult<Labels<i64>> {
    let view = array.as_array();
    let shape_error = |err: ndarray::ShapeError| PyValueError::new_err(err.to_string());
    match view.ndim() {
        0 => view
            .first()
            .map(|&value| Labels::Scalar(value))
            .ok_or_else(|| PyValueError::new_err("empty scalar array")),
        1 => Ok(Labels::Flat(
            view.into_dimensionality::<Ix1>().map_err(shape_error)?.to_owned(),
        )),
        2 => Ok(Labels::Batch(
            view.into_dimensionality::<Ix2>().map_err(shape_error)?.to_owned(),
        )),
        n => Err(PyValueError::new_err(format!(
            "labels must have at most 2 dimensions, got {n}"
        ))),
    }
}

// a single sample comes back as a float, a batch as an array
fn scores(py: Python<'_>, scores: Scores) -> PyObject {
    match scores {
        Scores::Scalar(value) => PyFloat::new(py, value).into_any().unbind(),
        Scores::Batch(values) => values.into_pyarray(py).into_any().unbind(),
    }
}

type Metric = fn(Labels<i64>, Labels<i64>, Option<usize>) -> crate::error::Result<Scores>;

fn run<'py>(
    py: Python<'py>,
    metric: Metric,
    y_true: PyReadonlyArrayDyn<'py, i64>,
    y_pred: PyReadonlyArrayDyn<'py, i64>,
    k: Option<usize>,
) -> PyResult<PyObject> {
    let truth = labels(y_true)?;
    let pred = labels(y_pred)?;
    let result = py.allow_threads(|| metric(truth, pred, k))?;
    Ok(scores(py, result))
}

#[pyfunction]
#[pyo3(signature = (y_true, y_pred, k = DEFAULT_K))]
fn rr<'py>(
    py: Python<'py>,
    y_true: PyReadonlyArrayDyn<'py, i64>,
    y_pred: PyReadonlyArrayDyn<'py, i64>,
    k: Option<usize>,
) -> PyResult<PyObject> {
    run(py, metrics::rr::<i64>, y_true, y_pred, k)
}

#[pyfunction]
#[pyo3(signature = (y_true, y_pred, k = DEFAULT_K))]
fn recall<'py>(
    py: Python<'py>,
    y_true: PyReadonlyArrayDyn<'py, i64>,
    y_pred: PyReadonlyArrayDyn<'py, i64>,
    k: Option<usize>,
) -> PyResult<PyObject> {
    run(py, metrics::recall::<i64>, y_true, y_pred, k)
}

#[pyfunction]
#[pyo3(signature = (y_true, y_pred, k = DEFAULT_K))]
fn precision<'py>(
    py: Python<'py>,
    y_true: PyReadonlyArrayDyn<'py, i64>,
    y_pred: PyReadonlyArrayDyn<'py, i64>,
    k: Option<usize>,
) -> PyResult<PyObject> {
    run(py, metrics::precision::<i64>, y_true, y_pred, k)
}

#[pyfunction]
#[pyo3(signature = (y_true, y_pred, k = DEFAULT_K))]
fn ap<'py>(
    py: Python<'py>,
    y_true: PyReadonlyArrayDyn<'py, i64>,
    y_pred: PyReadonlyArrayDyn<'py, i64>,
    k: Option<usize>,
) -> PyResult<PyObject> {
    run(py, metrics::ap::<i64>, y_true, y_pred, k)
}

#[pyfunction]
#[pyo3(signature = (y_true, y_pred, k = DEFAULT_K))]
fn ndcg<'py>(
    py: Python<'py>,
    y_true: PyReadonlyArrayDyn<'py, i64>,
    y_pred: PyReadonlyArrayDyn<'py, i64>,
    k: Option<usize>,
) -> PyResult<PyObject> {
    run(py, metrics::ndcg::<i64>, y_true, y_pred, k)
}

#[pyfunction]
#[pyo3(signature = (y_true, y_pred, k = DEFAULT_K))]
fn iou<'py>(
    py: Python<'py>,
    y_true: PyReadonlyArrayDyn<'py, i64>,
    y_pred: PyReadonlyArrayDyn<'py, i64>,
    k: Option<usize>,
) -> PyResult<PyObject> {
    run(py, metrics::iou::<i64>, y_true, y_pred, k)
}

/// `padding` names the value that marks an empty position. Without it
/// every position counts as filled, so any non-empty row is covered.
#[pyfunction]
#[pyo3(signature = (y_pred, padding = None))]
fn coverage<'py>(
    py: Python<'py>,
    y_pred: PyReadonlyArrayDyn<'py, i64>,
    padding: Option<i64>,
) -> PyResult<PyObject> {
    let pred = labels(y_pred)?;
    let padding = match &padding {
        Some(value) => Padding::Value(value),
        None => Padding::Natural,
    };
    Ok(scores(py, metrics::coverage(pred, padding)))
}

#[pymodule]
pub fn irmetrics(_py: Python<'_>, m: &Bound<PyModule>) -> PyResult<()> {
    m.add_function(wrap_pyfunction!(rr, m)?)?;
    m.add_function(wrap_pyfunction!(recall, m)?)?;
    m.add_function(wrap_pyfunction!(precision, m)?)?;
    m.add_function(wrap_pyfunction!(ap, m)?)?;
    m.add_function(wrap_pyfunction!(ndcg, m)?)?;
    m.add_function(wrap_pyfunction!(iou, m)?)?;
    m.add_function(wrap_pyfunction!(coverage, m)?)?;
    Ok(())
}
