//! Small ordered table used to carry ChEMBL records through the pipeline.
//!
//! Columns keep insertion order, rows keep input order, and joins follow the
//! left-join semantics of the reports: every left row survives, matched once
//! per right row with the same key.

use std::collections::HashMap;
use std::fmt;

use serde_json::Value;

use crate::error::AnnotatorError;

#[derive(Debug, Clone, PartialEq, Default)]
pub enum Cell {
    #[default]
    Empty,
    Text(String),
    Number(f64),
    Bool(bool),
}

impl Cell {
    pub fn text(value: impl Into<String>) -> Self {
        Cell::Text(value.into())
    }

    /// Text cell, or `Empty` when the value is absent or blank.
    pub fn optional(value: Option<impl Into<String>>) -> Self {
        match value.map(Into::into) {
            Some(text) if !text.is_empty() => Cell::Text(text),
            _ => Cell::Empty,
        }
    }

    /// Scalars map directly; arrays and objects are kept as compact JSON.
    pub fn from_json(value: &Value) -> Self {
        match value {
            Value::Null => Cell::Empty,
            Value::Bool(flag) => Cell::Bool(*flag),
            Value::Number(number) => number.as_f64().map(Cell::Number).unwrap_or(Cell::Empty),
            Value::String(text) if text.is_empty() => Cell::Empty,
            Value::String(text) => Cell::Text(text.clone()),
            other => Cell::Text(other.to_string()),
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Cell::Empty)
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Cell::Text(text) => Some(text.as_str()),
            _ => None,
        }
    }

    /// Join key representation; numbers and text compare by their rendering.
    pub fn key(&self) -> Option<String> {
        match self {
            Cell::Empty => None,
            other => Some(other.to_string()),
        }
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cell::Empty => Ok(()),
            Cell::Text(text) => write!(f, "{text}"),
            Cell::Number(number) if number.fract() == 0.0 && number.abs() < 1e15 => {
                write!(f, "{}", *number as i64)
            }
            Cell::Number(number) => write!(f, "{number}"),
            Cell::Bool(flag) => write!(f, "{flag}"),
        }
    }
}

impl From<&str> for Cell {
    fn from(value: &str) -> Self {
        Cell::optional(Some(value))
    }
}

impl From<String> for Cell {
    fn from(value: String) -> Self {
        Cell::optional(Some(value))
    }
}

impl From<f64> for Cell {
    fn from(value: f64) -> Self {
        Cell::Number(value)
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Table {
    columns: Vec<String>,
    rows: Vec<Vec<Cell>>,
}

impl Table {
    pub fn new<I, S>(columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            columns: columns.into_iter().map(Into::into).collect(),
            rows: Vec::new(),
        }
    }

    /// Builds a table from JSON objects, projecting onto `columns`.
    pub fn from_records(columns: &[&str], records: &[Value]) -> Self {
        let mut table = Self::new(columns.iter().copied());
        for record in records {
            let row = columns
                .iter()
                .map(|name| record.get(*name).map(Cell::from_json).unwrap_or_default())
                .collect();
            table.rows.push(row);
        }
        table
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Vec<Cell>] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|column| column == name)
    }

    fn require_column(&self, name: &str) -> Result<usize, AnnotatorError> {
        self.column_index(name)
            .ok_or_else(|| AnnotatorError::UnknownColumn(name.to_string()))
    }

    /// Appends a row, padding or truncating it to the table width.
    pub fn push_row(&mut self, mut row: Vec<Cell>) {
        row.resize(self.columns.len(), Cell::Empty);
        self.rows.push(row);
    }

    pub fn cell(&self, row: usize, column: &str) -> Option<&Cell> {
        let index = self.column_index(column)?;
        self.rows.get(row).map(|cells| &cells[index])
    }

    pub fn column_values(&self, column: &str) -> Result<Vec<&Cell>, AnnotatorError> {
        let index = self.require_column(column)?;
        Ok(self.rows.iter().map(|row| &row[index]).collect())
    }

    /// Non-empty keys of `column`, deduplicated in first-seen order.
    pub fn unique_keys(&self, column: &str) -> Result<Vec<String>, AnnotatorError> {
        let mut seen = Vec::new();
        for cell in self.column_values(column)? {
            if let Some(key) = cell.key() {
                if !seen.contains(&key) {
                    seen.push(key);
                }
            }
        }
        Ok(seen)
    }

    pub fn select(&self, columns: &[&str]) -> Result<Table, AnnotatorError> {
        let indices = columns
            .iter()
            .map(|name| self.require_column(name))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Table {
            columns: columns.iter().map(|name| name.to_string()).collect(),
            rows: self
                .rows
                .iter()
                .map(|row| indices.iter().map(|&idx| row[idx].clone()).collect())
                .collect(),
        })
    }

    /// Removes `column` if present; a missing column is not an error.
    pub fn drop_column(&self, column: &str) -> Table {
        let Some(index) = self.column_index(column) else {
            return self.clone();
        };
        let mut table = self.clone();
        table.columns.remove(index);
        for row in &mut table.rows {
            row.remove(index);
        }
        table
    }

    pub fn add_constant_column(&mut self, name: &str, value: Cell) {
        self.columns.push(name.to_string());
        for row in &mut self.rows {
            row.push(value.clone());
        }
    }

    /// Left join on `key`. Left rows without a match keep empty right
    /// columns; overlapping non-key columns get `_x`/`_y` suffixes.
    pub fn left_join(&self, right: &Table, key: &str) -> Result<Table, AnnotatorError> {
        let left_key = self.require_column(key)?;
        let right_key = right.require_column(key)?;

        let right_columns: Vec<usize> = (0..right.columns.len())
            .filter(|&idx| idx != right_key)
            .collect();
        let overlapping = |name: &str| {
            name != key
                && self.columns.iter().any(|c| c == name)
                && right.columns.iter().any(|c| c == name)
        };

        let mut columns: Vec<String> = self
            .columns
            .iter()
            .map(|name| {
                if overlapping(name) {
                    format!("{name}_x")
                } else {
                    name.clone()
                }
            })
            .collect();
        columns.extend(right_columns.iter().map(|&idx| {
            let name = &right.columns[idx];
            if overlapping(name) {
                format!("{name}_y")
            } else {
                name.clone()
            }
        }));

        let mut index: HashMap<String, Vec<usize>> = HashMap::new();
        for (row_idx, row) in right.rows.iter().enumerate() {
            if let Some(k) = row[right_key].key() {
                index.entry(k).or_default().push(row_idx);
            }
        }

        let mut rows = Vec::new();
        for row in &self.rows {
            let matches = row[left_key]
                .key()
                .and_then(|k| index.get(&k))
                .filter(|matches| !matches.is_empty());
            match matches {
                Some(matches) => {
                    for &right_idx in matches {
                        let mut joined = row.clone();
                        joined.extend(
                            right_columns
                                .iter()
                                .map(|&idx| right.rows[right_idx][idx].clone()),
                        );
                        rows.push(joined);
                    }
                }
                None => {
                    let mut joined = row.clone();
                    joined.extend(right_columns.iter().map(|_| Cell::Empty));
                    rows.push(joined);
                }
            }
        }

        Ok(Table { columns, rows })
    }

    /// `columns`/`values` repeated `times` times.
    pub fn replicate_row(columns: &[String], values: &[Cell], times: usize) -> Table {
        let mut table = Table::new(columns.iter().cloned());
        for _ in 0..times {
            table.push_row(values.to_vec());
        }
        table
    }

    /// Column-wise concatenation of two tables with the same row count.
    pub fn hstack(&self, right: &Table) -> Result<Table, AnnotatorError> {
        if self.len() != right.len() {
            return Err(AnnotatorError::ReportLength {
                assay: self.len(),
                targets: right.len(),
            });
        }
        let mut columns = self.columns.clone();
        columns.extend(right.columns.iter().cloned());
        let rows = self
            .rows
            .iter()
            .zip(&right.rows)
            .map(|(left, right)| left.iter().chain(right).cloned().collect())
            .collect();
        Ok(Table { columns, rows })
    }

    /// Row-wise concatenation. Columns are aligned by name; columns unknown to
    /// `self` are appended and earlier rows get empty cells for them.
    pub fn append(&mut self, other: Table) {
        if self.columns.is_empty() && self.rows.is_empty() {
            *self = other;
            return;
        }
        let mut mapping = Vec::with_capacity(other.columns.len());
        for name in &other.columns {
            let index = match self.column_index(name) {
                Some(index) if !mapping.contains(&index) => index,
                _ => {
                    self.columns.push(name.clone());
                    for row in &mut self.rows {
                        row.push(Cell::Empty);
                    }
                    self.columns.len() - 1
                }
            };
            mapping.push(index);
        }
        for row in other.rows {
            let mut aligned = vec![Cell::Empty; self.columns.len()];
            for (cell, &index) in row.into_iter().zip(&mapping) {
                aligned[index] = cell;
            }
            self.rows.push(aligned);
        }
    }

    /// Moves the columns at `moved_indices` so they follow the column at
    /// `anchor_idx`, keeping the relative order of the columns before and
    /// after it. Joined tables may repeat a column name, hence positions.
    pub fn move_after(&self, anchor_idx: usize, moved_indices: &[usize]) -> Result<Table, AnnotatorError> {
        let width = self.columns.len();
        if let Some(&bad) = std::iter::once(&anchor_idx)
            .chain(moved_indices)
            .find(|&&idx| idx >= width)
        {
            return Err(AnnotatorError::UnknownColumn(format!("#{bad}")));
        }

        let mut order: Vec<usize> = (0..=anchor_idx)
            .filter(|idx| !moved_indices.contains(idx))
            .collect();
        order.extend(moved_indices.iter().copied());
        order.extend((anchor_idx + 1..self.columns.len()).filter(|idx| !moved_indices.contains(idx)));

        Ok(Table {
            columns: order.iter().map(|&idx| self.columns[idx].clone()).collect(),
            rows: self
                .rows
                .iter()
                .map(|row| order.iter().map(|&idx| row[idx].clone()).collect())
                .collect(),
        })
    }
}
