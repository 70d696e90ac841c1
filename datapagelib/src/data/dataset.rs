//! Row-oriented in-memory table keyed by column name.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::DatapageError;
use crate::Result;

use super::value::Value;

/// A rectangular dataset: ordered column names and rows of values.
///
/// Serializes to (and loads from) the split JSON layout:
///
/// ```json
/// {"columns": ["region", "share"], "rows": [["north", 0.5], ["south", 0.25]]}
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawDataset")]
pub struct Dataset {
    columns: Vec<String>,
    rows: Vec<Vec<Value>>,
}

#[derive(Deserialize)]
struct RawDataset {
    columns: Vec<String>,
    #[serde(default)]
    rows: Vec<Vec<Value>>,
}

impl TryFrom<RawDataset> for Dataset {
    type Error = DatapageError;

    fn try_from(raw: RawDataset) -> Result<Self> {
        Dataset::from_rows(raw.columns, raw.rows)
    }
}

/// A borrowed view of one dataset row with access by column name.
#[derive(Debug, Clone, Copy)]
pub struct Row<'a> {
    index: usize,
    columns: &'a [String],
    values: &'a [Value],
}

impl<'a> Row<'a> {
    /// Position of the row in its dataset.
    pub fn index(&self) -> usize {
        self.index
    }

    /// Value of the named field.
    pub fn get(&self, name: &str) -> Result<&'a Value> {
        self.columns
            .iter()
            .position(|c| c == name)
            .map(|i| &self.values[i])
            .ok_or_else(|| DatapageError::FieldNotFound(name.to_string()))
    }

    /// Iterate `(column, value)` pairs in column order.
    pub fn iter(&self) -> impl Iterator<Item = (&'a str, &'a Value)> {
        self.columns
            .iter()
            .map(String::as_str)
            .zip(self.values.iter())
    }
}

impl Dataset {
    /// Create an empty dataset with the given columns.
    pub fn new<S: Into<String>>(columns: impl IntoIterator<Item = S>) -> Self {
        Dataset {
            columns: columns.into_iter().map(Into::into).collect(),
            rows: Vec::new(),
        }
    }

    /// Create a dataset from columns and rows, checking every row's width.
    pub fn from_rows<S: Into<String>>(
        columns: impl IntoIterator<Item = S>,
        rows: Vec<Vec<Value>>,
    ) -> Result<Self> {
        let mut dataset = Dataset::new(columns);
        for row in rows {
            dataset.push_row(row)?;
        }
        Ok(dataset)
    }

    /// Parse the split JSON layout.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Load the split JSON layout from a file.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| DatapageError::FileRead {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&content)
    }

    /// Append a row.
    pub fn push_row(&mut self, row: Vec<Value>) -> Result<()> {
        if row.len() != self.columns.len() {
            return Err(DatapageError::RowLength {
                row: self.rows.len(),
                expected: self.columns.len(),
                found: row.len(),
            });
        }
        self.rows.push(row);
        Ok(())
    }

    /// Column names in order.
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether the dataset has no rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Position of a column.
    pub fn column_index(&self, name: &str) -> Result<usize> {
        self.columns
            .iter()
            .position(|c| c == name)
            .ok_or_else(|| DatapageError::FieldNotFound(name.to_string()))
    }

    /// Iterate all values of one column.
    pub fn column_values(&self, index: usize) -> impl Iterator<Item = &Value> {
        self.rows.iter().map(move |row| &row[index])
    }

    /// Row at `index`, if present.
    pub fn row(&self, index: usize) -> Option<Row<'_>> {
        self.rows.get(index).map(|values| Row {
            index,
            columns: &self.columns,
            values,
        })
    }

    /// Iterate rows in order.
    pub fn rows(&self) -> impl Iterator<Item = Row<'_>> {
        self.rows.iter().enumerate().map(|(index, values)| Row {
            index,
            columns: &self.columns,
            values,
        })
    }

    /// Project onto the named columns, in the order given.
    pub fn select<S: AsRef<str>>(&self, names: &[S]) -> Result<Dataset> {
        let indices = names
            .iter()
            .map(|n| self.column_index(n.as_ref()))
            .collect::<Result<Vec<_>>>()?;

        Ok(Dataset {
            columns: indices.iter().map(|&i| self.columns[i].clone()).collect(),
            rows: self
                .rows
                .iter()
                .map(|row| indices.iter().map(|&i| row[i].clone()).collect())
                .collect(),
        })
    }

    /// Return a copy with columns renamed by `(old, new)` pairs.
    ///
    /// Names without a mapping are kept; mappings for unknown names are ignored.
    pub fn rename<A: AsRef<str>, B: AsRef<str>>(&self, mapping: &[(A, B)]) -> Dataset {
        let columns = self
            .columns
            .iter()
            .map(|column| {
                mapping
                    .iter()
                    .find(|(old, _)| old.as_ref() == column)
                    .map(|(_, new)| new.as_ref().to_string())
                    .unwrap_or_else(|| column.clone())
            })
            .collect();

        Dataset {
            columns,
            rows: self.rows.clone(),
        }
    }

    /// Convert float columns to integers where this loses no information.
    ///
    /// A column qualifies when it holds at least one float and every value is
    /// an integer or an integral, finite float. Columns with missing values,
    /// text or fractional numbers are left unchanged.
    pub fn convert_int_columns(&self) -> Dataset {
        let mut converted = self.clone();
        for (index, column) in self.columns.iter().enumerate() {
            if !self.column_values(index).any(|v| matches!(v, Value::Float(_))) {
                continue;
            }
            match lossless_ints(self.column_values(index)) {
                Some(ints) => {
                    for (row, value) in converted.rows.iter_mut().zip(ints) {
                        row[index] = Value::Int(value);
                    }
                }
                None => log::debug!("column '{}' kept as float", column),
            }
        }
        converted
    }
}

fn lossless_ints<'a>(values: impl Iterator<Item = &'a Value>) -> Option<Vec<i64>> {
    values
        .map(|value| match value {
            Value::Int(i) => Some(*i),
            Value::Float(x)
                if x.is_finite()
                    && x.fract() == 0.0
                    && *x >= i64::MIN as f64
                    && *x < i64::MAX as f64 =>
            {
                Some(*x as i64)
            }
            _ => None,
        })
        .collect()
}
