//! Type-converted projection of a raw batch.

use chrono::{DateTime, Utc};
use polars::prelude::{Column, DataFrame, PlSmallStr};
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;

use evc_model::Datatype;

use crate::error::Result;

/// A successfully converted cell value.
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    /// Empty or accepted `null` value.
    Null,
    String(String),
    Integer(i64),
    /// Exact decimal; integer fields also use it for values beyond `i64`.
    Decimal(Decimal),
    Boolean(bool),
    Timestamp(DateTime<Utc>),
}

impl CellValue {
    /// Canonical text used for key comparison.
    ///
    /// Strings are trimmed, decimals drop trailing fractional zeros and
    /// timestamps are rendered in UTC.
    pub fn canonical_text(&self) -> String {
        match self {
            CellValue::Null => String::new(),
            CellValue::String(value) => value.trim().to_string(),
            CellValue::Integer(value) => value.to_string(),
            CellValue::Decimal(value) => value.normalize().to_string(),
            CellValue::Boolean(true) => "TRUE".to_string(),
            CellValue::Boolean(false) => "FALSE".to_string(),
            CellValue::Timestamp(value) => value.format("%Y-%m-%dT%H:%M:%S%.fZ").to_string(),
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, CellValue::Null)
    }
}

/// Sentinel for a cell whose text could not be converted to the field type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Unconvertible {
    pub raw: String,
}

impl Unconvertible {
    pub fn new(raw: impl Into<String>) -> Self {
        Self { raw: raw.into() }
    }
}

/// Per-cell conversion result.
pub type TypedCell = std::result::Result<CellValue, Unconvertible>;

/// Canonical comparison text for a cell, falling back to the trimmed raw text.
pub fn canonical_text(cell: &TypedCell) -> String {
    match cell {
        Ok(value) => value.canonical_text(),
        Err(unconvertible) => unconvertible.raw.trim().to_string(),
    }
}

/// One column of a [`TypedBatch`].
///
/// `datatype` is `None` for columns carried through without validation.
#[derive(Debug, Clone, PartialEq)]
pub struct TypedColumn {
    pub name: String,
    pub datatype: Option<Datatype>,
    pub cells: Vec<TypedCell>,
}

impl TypedColumn {
    pub fn new(name: impl Into<String>, datatype: Option<Datatype>, cells: Vec<TypedCell>) -> Self {
        Self {
            name: name.into(),
            datatype,
            cells,
        }
    }

    /// Column carried through verbatim.
    pub fn passthrough(name: impl Into<String>, values: &[&str]) -> Self {
        let cells = values
            .iter()
            .map(|value| Ok(CellValue::String((*value).to_string())))
            .collect();
        Self::new(name, None, cells)
    }

    pub fn unconvertible_count(&self) -> usize {
        self.cells.iter().filter(|cell| cell.is_err()).count()
    }
}

/// Schema-conformant batch produced by the batch validator.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TypedBatch {
    columns: Vec<TypedColumn>,
    row_count: usize,
}

impl TypedBatch {
    pub fn new(row_count: usize) -> Self {
        Self {
            columns: Vec::new(),
            row_count,
        }
    }

    pub fn push(&mut self, column: TypedColumn) {
        debug_assert_eq!(column.cells.len(), self.row_count);
        self.columns.push(column);
    }

    pub fn columns(&self) -> &[TypedColumn] {
        &self.columns
    }

    pub fn column(&self, name: &str) -> Option<&TypedColumn> {
        self.columns.iter().find(|column| column.name == name)
    }

    pub fn row_count(&self) -> usize {
        self.row_count
    }

    pub fn is_empty(&self) -> bool {
        self.row_count == 0
    }

    /// Export to a polars DataFrame.
    ///
    /// Numeric and boolean columns become native dtypes; timestamps become
    /// canonical UTC strings. Unconvertible cells become null.
    pub fn to_dataframe(&self) -> Result<DataFrame> {
        let columns: Vec<Column> = self.columns.iter().map(to_polars_column).collect();
        Ok(DataFrame::new(columns)?)
    }

    /// Export every column as its canonical text.
    ///
    /// Lossless for key comparison: re-validating the written text against
    /// the same schema yields the same key tuples.
    pub fn to_canonical_dataframe(&self) -> Result<DataFrame> {
        let columns: Vec<Column> = self
            .columns
            .iter()
            .map(|column| {
                let values: Vec<Option<String>> = column
                    .cells
                    .iter()
                    .map(|cell| match cell {
                        Ok(CellValue::Null) => None,
                        cell => Some(canonical_text(cell)),
                    })
                    .collect();
                Column::new(PlSmallStr::from(column.name.as_str()), values)
            })
            .collect();
        Ok(DataFrame::new(columns)?)
    }
}

fn to_polars_column(column: &TypedColumn) -> Column {
    let name = PlSmallStr::from(column.name.as_str());
    match column.datatype {
        Some(Datatype::Integer) => {
            let values: Vec<Option<i64>> = column
                .cells
                .iter()
                .map(|cell| match cell {
                    Ok(CellValue::Integer(value)) => Some(*value),
                    _ => None,
                })
                .collect();
            Column::new(name, values)
        }
        Some(Datatype::Decimal) => {
            let values: Vec<Option<f64>> = column
                .cells
                .iter()
                .map(|cell| match cell {
                    Ok(CellValue::Decimal(value)) => value.to_f64(),
                    _ => None,
                })
                .collect();
            Column::new(name, values)
        }
        Some(Datatype::Boolean) => {
            let values: Vec<Option<bool>> = column
                .cells
                .iter()
                .map(|cell| match cell {
                    Ok(CellValue::Boolean(value)) => Some(*value),
                    _ => None,
                })
                .collect();
            Column::new(name, values)
        }
        Some(Datatype::String | Datatype::Timestamp) | None => {
            let values: Vec<Option<String>> = column
                .cells
                .iter()
                .map(|cell| match cell {
                    Ok(CellValue::Null) | Err(_) => None,
                    Ok(CellValue::String(value)) => Some(value.clone()),
                    Ok(value) => Some(value.canonical_text()),
                })
                .collect();
            Column::new(name, values)
        }
    }
}
