//! label elements, the padding sentinel, and the input shapes every metric accepts

pub mod shape;

use std::fmt::{self, Debug, Display};

use ndarray::{Array1, Array2, ArrayView1, ArrayView2, Axis};

use crate::error::{MetricError, Result};

/// An element that can appear in a truth or prediction row.
///
/// `is_padding` reports whether the value is the type's own "no label"
/// marker (`None` for `Option`, [`Label::Pad`] for [`Label`]). Plain types
/// have no such marker; use [`Padding::Value`] to name one explicitly.
pub trait LabelValue: Clone + PartialEq + Debug {
    fn is_padding(&self) -> bool {
        false
    }
}

macro_rules! plain_labels {
    ($($t:ty),*) => {
        $(impl LabelValue for $t {})*
    };
}

plain_labels!(i8, i16, i32, i64, isize, u8, u16, u32, u64, usize, bool, char, String);

impl LabelValue for &str {}

impl<T: LabelValue> LabelValue for Option<T> {
    fn is_padding(&self) -> bool {
        self.as_ref().map_or(true, LabelValue::is_padding)
    }
}

/// A candidate identifier of mixed type.
///
/// Integers and strings never compare equal to each other, so a row may hold
/// both without special handling.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Label {
    Int(i64),
    Str(String),
    #[default]
    Pad,
}

impl Label {
    /// parses a text cell: empty is padding, integers stay integers, the rest are strings
    pub fn from_cell(cell: &str) -> Label {
        let cell = cell.trim();
        if cell.is_empty() {
            Label::Pad
        } else if let Ok(value) = cell.parse::<i64>() {
            Label::Int(value)
        } else {
            Label::Str(cell.to_string())
        }
    }
}

impl LabelValue for Label {
    fn is_padding(&self) -> bool {
        matches!(self, Label::Pad)
    }
}

impl Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Label::Int(value) => write!(f, "{value}"),
            Label::Str(value) => f.write_str(value),
            Label::Pad => Ok(()),
        }
    }
}

impl From<i64> for Label {
    fn from(value: i64) -> Self {
        Label::Int(value)
    }
}

impl From<i32> for Label {
    fn from(value: i32) -> Self {
        Label::Int(value as i64)
    }
}

impl From<&str> for Label {
    fn from(value: &str) -> Self {
        Label::Str(value.to_string())
    }
}

impl From<String> for Label {
    fn from(value: String) -> Self {
        Label::Str(value)
    }
}

impl<T: Into<Label>> From<Option<T>> for Label {
    fn from(value: Option<T>) -> Self {
        value.map_or(Label::Pad, Into::into)
    }
}

/// Which values count as padding.
pub enum Padding<'a, T> {
    /// the type's own marker, see [`LabelValue::is_padding`]
    Natural,
    /// a caller-supplied sentinel
    Value(&'a T),
}

impl<'a, T: LabelValue> Padding<'a, T> {
    pub fn matches(&self, value: &T) -> bool {
        match self {
            Padding::Natural => value.is_padding(),
            Padding::Value(sentinel) => value == *sentinel,
        }
    }

    /// boolean mask of the non-padding cells
    pub fn mask(&self, labels: ArrayView2<T>) -> Array2<bool> {
        labels.map(|value| !self.matches(value))
    }

    /// number of non-padding cells in each row
    pub fn counts(&self, labels: ArrayView2<T>) -> Array1<usize> {
        self.mask(labels)
            .map_axis(Axis(1), |row| row.iter().filter(|&&real| real).count())
    }
}

impl<T> Default for Padding<'_, T> {
    fn default() -> Self {
        Padding::Natural
    }
}

impl<T> Clone for Padding<'_, T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Padding<'_, T> {}

impl<T: Debug> Debug for Padding<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Padding::Natural => f.write_str("Natural"),
            Padding::Value(sentinel) => f.debug_tuple("Value").field(sentinel).finish(),
        }
    }
}

/// Labels as supplied by a caller, before normalization.
#[derive(Debug, Clone, PartialEq)]
pub enum Labels<T> {
    Scalar(T),
    Flat(Array1<T>),
    Batch(Array2<T>),
}

impl<T: LabelValue> Labels<T> {
    pub fn scalar(value: T) -> Self {
        Labels::Scalar(value)
    }

    /// builds a batch from nested rows, which must all have the same length
    pub fn from_rows(rows: Vec<Vec<T>>) -> Result<Self> {
        let n = rows.len();
        let width = rows.first().map_or(0, Vec::len);
        if let Some((row, found)) = rows
            .iter()
            .map(Vec::len)
            .enumerate()
            .find(|&(_, len)| len != width)
        {
            return Err(MetricError::RaggedRows {
                row,
                expected: width,
                found,
            });
        }

        let data: Vec<T> = rows.into_iter().flatten().collect();
        Ok(Labels::Batch(Array2::from_shape_fn((n, width), |(i, j)| {
            data[i * width + j].clone()
        })))
    }

    pub fn ndim(&self) -> usize {
        match self {
            Labels::Scalar(_) => 0,
            Labels::Flat(_) => 1,
            Labels::Batch(_) => 2,
        }
    }

    /// shape of the at-least-2-d form
    pub fn dim(&self) -> (usize, usize) {
        match self {
            Labels::Scalar(_) => (1, 1),
            Labels::Flat(row) => (1, row.len()),
            Labels::Batch(rows) => rows.dim(),
        }
    }

    /// at-least-2-d form: a scalar is a 1x1 batch, a flat sequence one row
    pub fn into_rows(self) -> Array2<T> {
        match self {
            Labels::Scalar(value) => Array2::from_elem((1, 1), value),
            Labels::Flat(row) => row.insert_axis(Axis(0)),
            Labels::Batch(batch) => batch,
        }
    }
}

macro_rules! scalar_labels {
    ($($t:ty),*) => {
        $(impl From<$t> for Labels<$t> {
            fn from(value: $t) -> Self {
                Labels::Scalar(value)
            }
        })*
    };
}

scalar_labels!(i32, i64, u32, u64, usize, String, Label);

impl<'a> From<&'a str> for Labels<&'a str> {
    fn from(value: &'a str) -> Self {
        Labels::Scalar(value)
    }
}

impl<T> From<Vec<T>> for Labels<T> {
    fn from(values: Vec<T>) -> Self {
        Labels::Flat(Array1::from(values))
    }
}

impl<T: Clone> From<&[T]> for Labels<T> {
    fn from(values: &[T]) -> Self {
        Labels::Flat(Array1::from(values.to_vec()))
    }
}

impl<T, const N: usize> From<[T; N]> for Labels<T> {
    fn from(values: [T; N]) -> Self {
        Labels::Flat(Array1::from(Vec::from(values)))
    }
}

impl<T> From<Array1<T>> for Labels<T> {
    fn from(values: Array1<T>) -> Self {
        Labels::Flat(values)
    }
}

impl<T: Clone> From<ArrayView1<'_, T>> for Labels<T> {
    fn from(values: ArrayView1<'_, T>) -> Self {
        Labels::Flat(values.to_owned())
    }
}

impl<T> From<Array2<T>> for Labels<T> {
    fn from(values: Array2<T>) -> Self {
        Labels::Batch(values)
    }
}

impl<T: Clone> From<ArrayView2<'_, T>> for Labels<T> {
    fn from(values: ArrayView2<'_, T>) -> Self {
        Labels::Batch(values.to_owned())
    }
}
