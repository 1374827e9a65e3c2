//! loading flat relevance tables and label batches from CSV

use std::io;
use std::path::Path;

use csv::{ReaderBuilder, StringRecord};
use tracing::info;

use super::FlatRecord;
use crate::error::{MetricError, Result};
use crate::labels::{Label, Labels};

/// Column names of a flat relevance table.
#[derive(Debug, Clone)]
pub struct FlatColumns<'a> {
    pub query: &'a str,
    pub relevance: &'a str,
    pub weights: Option<&'a str>,
}

fn column(headers: &StringRecord, name: &str) -> Result<usize> {
    headers
        .iter()
        .position(|header| header == name)
        .ok_or_else(|| MetricError::MissingColumn(name.to_string()))
}

/// numbers, plus `true`/`false` for binary judgements
fn number(record: &StringRecord, index: usize) -> Result<f64> {
    let cell = record.get(index).unwrap_or("").trim();
    match cell {
        "true" | "True" => Ok(1.0),
        "false" | "False" => Ok(0.0),
        _ => cell.parse().map_err(|_| MetricError::Parse {
            line: record.position().map_or(0, |position| position.line()),
            value: cell.to_string(),
        }),
    }
}

/// Reads a headed flat table; the query column is kept as a [`Label`].
pub fn read_flat_from<R: io::Read>(
    reader: R,
    columns: &FlatColumns,
) -> Result<Vec<FlatRecord<Label>>> {
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(reader);

    let headers = reader.headers()?.clone();
    let query = column(&headers, columns.query)?;
    let relevance = column(&headers, columns.relevance)?;
    let weights = columns
        .weights
        .map(|name| column(&headers, name))
        .transpose()?;

    let mut records = Vec::new();
    for result in reader.records() {
        let record = result?;
        records.push(FlatRecord {
            query: Label::from_cell(record.get(query).unwrap_or("")),
            relevance: number(&record, relevance)?,
            weight: weights.map(|index| number(&record, index)).transpose()?,
        });
    }
    Ok(records)
}

pub fn read_flat(path: impl AsRef<Path>, columns: &FlatColumns) -> Result<Vec<FlatRecord<Label>>> {
    let path = path.as_ref();
    let records = read_flat_from(std::fs::File::open(path)?, columns)?;
    info!("loaded {} flat records from {:?}", records.len(), path);
    Ok(records)
}

/// Reads a header-less table of labels, one sample per line.
///
/// Empty cells are padding, and short lines are padded to the longest one.
pub fn read_labels_from<R: io::Read>(reader: R) -> Result<Labels<Label>> {
    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(reader);

    let mut rows = Vec::new();
    for result in reader.records() {
        let record = result?;
        rows.push(record.iter().map(Label::from_cell).collect::<Vec<_>>());
    }
    if rows.is_empty() {
        return Err(MetricError::EmptyInput);
    }

    let width = rows.iter().map(Vec::len).max().unwrap_or(0);
    for row in &mut rows {
        row.resize(width, Label::Pad);
    }
    Labels::from_rows(rows)
}

pub fn read_labels(path: impl AsRef<Path>) -> Result<Labels<Label>> {
    let path = path.as_ref();
    let labels = read_labels_from(std::fs::File::open(path)?)?;
    info!("loaded labels of shape {:?} from {:?}", labels.dim(), path);
    Ok(labels)
}
