use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use serde::Serialize;

use crate::error::{LcError, Result};

// ---------------------------------------------------------------------------
// Value – a single cell of the table
// ---------------------------------------------------------------------------

/// A dynamically-typed cell, as seen through a row view.
/// Band discovery collects these into a `BTreeSet`, so `Value` must be `Ord`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Value {
    Integer(i64),
    Float(f64),
    String(String),
    Null,
}

// -- Manual Eq/Ord so we can put Value in BTreeSet --

impl Eq for Value {}

impl PartialOrd for Value {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Value {
    fn cmp(&self, other: &Self) -> Ordering {
        use Value::*;
        fn discriminant(v: &Value) -> u8 {
            match v {
                Null => 0,
                Integer(_) => 1,
                Float(_) => 2,
                String(_) => 3,
            }
        }
        match (self, other) {
            (Null, Null) => Ordering::Equal,
            (Integer(a), Integer(b)) => a.cmp(b),
            (Float(a), Float(b)) => a.total_cmp(b),
            (String(a), String(b)) => a.cmp(b),
            _ => discriminant(self).cmp(&discriminant(other)),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::String(s) => write!(f, "{s}"),
            Value::Integer(i) => write!(f, "{i}"),
            Value::Float(v) => write!(f, "{v}"),
            Value::Null => write!(f, "<null>"),
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl Value {
    /// Numeric view of the cell, if it has one.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Float(v) => Some(*v),
            Value::Integer(i) => Some(*i as f64),
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Number – the result of a numeric reduction
// ---------------------------------------------------------------------------

/// A scalar that keeps the numeric type of the column it came from.
///
/// Comparisons are numeric across variants, so `Number::Integer(7) == 7.0`.
#[derive(Debug, Clone, Copy, Serialize)]
#[serde(untagged)]
pub enum Number {
    Integer(i64),
    Float(f64),
}

impl Number {
    pub fn as_f64(self) -> f64 {
        match self {
            Number::Integer(i) => i as f64,
            Number::Float(v) => v,
        }
    }

    pub fn is_nan(self) -> bool {
        matches!(self, Number::Float(v) if v.is_nan())
    }
}

impl PartialEq for Number {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Number::Integer(a), Number::Integer(b)) => a == b,
            _ => self.as_f64() == other.as_f64(),
        }
    }
}

impl PartialEq<i64> for Number {
    fn eq(&self, other: &i64) -> bool {
        *self == Number::Integer(*other)
    }
}

impl PartialEq<f64> for Number {
    fn eq(&self, other: &f64) -> bool {
        self.as_f64() == *other
    }
}

impl PartialOrd for Number {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        match (self, other) {
            (Number::Integer(a), Number::Integer(b)) => Some(a.cmp(b)),
            _ => self.as_f64().partial_cmp(&other.as_f64()),
        }
    }
}

impl From<i64> for Number {
    fn from(i: i64) -> Self {
        Number::Integer(i)
    }
}

impl From<f64> for Number {
    fn from(v: f64) -> Self {
        Number::Float(v)
    }
}

impl fmt::Display for Number {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Number::Integer(i) => write!(f, "{i}"),
            Number::Float(v) => write!(f, "{v}"),
        }
    }
}

// ---------------------------------------------------------------------------
// Column – a named, homogeneously typed series
// ---------------------------------------------------------------------------

/// Type tag fixed when a column is built or parsed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnKind {
    Integer,
    Float,
    Text,
}

impl ColumnKind {
    pub fn is_numeric(self) -> bool {
        !matches!(self, ColumnKind::Text)
    }
}

impl fmt::Display for ColumnKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ColumnKind::Integer => write!(f, "integer"),
            ColumnKind::Float => write!(f, "float"),
            ColumnKind::Text => write!(f, "text"),
        }
    }
}

/// Column storage. Missing floats are `NaN`, missing text is `None`.
#[derive(Debug, Clone, PartialEq)]
pub enum ColumnData {
    Integer(Vec<i64>),
    Float(Vec<f64>),
    Text(Vec<Option<String>>),
}

impl ColumnData {
    /// Decide the narrowest type that holds every cell.
    ///
    /// * no empty cells and all parse as `i64` → `Integer`
    /// * every non-empty cell parses as `f64`  → `Float` (empty → `NaN`)
    /// * anything else                         → `Text` (empty → `None`)
    ///
    /// A column with no cells at all is `Float`.
    pub fn infer<S: AsRef<str>>(cells: &[S]) -> Self {
        let trimmed: Vec<&str> = cells.iter().map(|c| c.as_ref().trim()).collect();

        if !trimmed.is_empty() && trimmed.iter().all(|c| !c.is_empty()) {
            let ints: Option<Vec<i64>> = trimmed.iter().map(|c| c.parse().ok()).collect();
            if let Some(ints) = ints {
                return ColumnData::Integer(ints);
            }
        }

        let floats: Option<Vec<f64>> = trimmed
            .iter()
            .map(|c| if c.is_empty() { Some(f64::NAN) } else { c.parse().ok() })
            .collect();
        if let Some(floats) = floats {
            return ColumnData::Float(floats);
        }

        ColumnData::Text(
            cells
                .iter()
                .map(|c| {
                    let c = c.as_ref();
                    (!c.trim().is_empty()).then(|| c.to_string())
                })
                .collect(),
        )
    }

    pub fn kind(&self) -> ColumnKind {
        match self {
            ColumnData::Integer(_) => ColumnKind::Integer,
            ColumnData::Float(_) => ColumnKind::Float,
            ColumnData::Text(_) => ColumnKind::Text,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            ColumnData::Integer(v) => v.len(),
            ColumnData::Float(v) => v.len(),
            ColumnData::Text(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn value(&self, row: usize) -> Option<Value> {
        match self {
            ColumnData::Integer(v) => v.get(row).map(|i| Value::Integer(*i)),
            ColumnData::Float(v) => v.get(row).map(|f| Value::Float(*f)),
            ColumnData::Text(v) => v.get(row).map(|s| match s {
                Some(s) => Value::String(s.clone()),
                None => Value::Null,
            }),
        }
    }

    fn take(&self, indices: &[usize]) -> Self {
        fn pick<T: Clone>(v: &[T], indices: &[usize]) -> Vec<T> {
            indices.iter().filter_map(|&i| v.get(i).cloned()).collect()
        }
        match self {
            ColumnData::Integer(v) => ColumnData::Integer(pick(v, indices)),
            ColumnData::Float(v) => ColumnData::Float(pick(v, indices)),
            ColumnData::Text(v) => ColumnData::Text(pick(v, indices)),
        }
    }

    fn sub_scalar(&self, rhs: Number) -> Self {
        match (self, rhs) {
            // i64 arithmetic wraps on overflow, like a fixed-width dataframe dtype
            (ColumnData::Integer(v), Number::Integer(k)) => {
                ColumnData::Integer(v.iter().map(|x| x.wrapping_sub(k)).collect())
            }
            (ColumnData::Integer(v), Number::Float(k)) => {
                ColumnData::Float(v.iter().map(|&x| x as f64 - k).collect())
            }
            (ColumnData::Float(v), k) => {
                let k = k.as_f64();
                ColumnData::Float(v.iter().map(|x| x - k).collect())
            }
            (ColumnData::Text(_), _) => self.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    pub name: String,
    pub data: ColumnData,
}

impl Column {
    pub fn new(name: impl Into<String>, data: ColumnData) -> Self {
        Column {
            name: name.into(),
            data,
        }
    }

    pub fn integer(name: impl Into<String>, values: Vec<i64>) -> Self {
        Self::new(name, ColumnData::Integer(values))
    }

    pub fn float(name: impl Into<String>, values: Vec<f64>) -> Self {
        Self::new(name, ColumnData::Float(values))
    }

    pub fn text<S: Into<String>>(name: impl Into<String>, values: Vec<S>) -> Self {
        Self::new(
            name,
            ColumnData::Text(values.into_iter().map(|s| Some(s.into())).collect()),
        )
    }

    pub fn kind(&self) -> ColumnKind {
        self.data.kind()
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn value(&self, row: usize) -> Option<Value> {
        self.data.value(row)
    }
}

// ---------------------------------------------------------------------------
// Table – rows of observations, stored column-wise
// ---------------------------------------------------------------------------

/// An in-memory observation table: equal-length, uniquely named columns.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Table {
    columns: Vec<Column>,
    n_rows: usize,
}

impl Table {
    /// Assemble a table, checking that names are unique and lengths agree.
    pub fn new(columns: Vec<Column>) -> Result<Self> {
        let n_rows = columns.first().map_or(0, Column::len);
        let mut seen = BTreeSet::new();
        for col in &columns {
            if !seen.insert(col.name.as_str()) {
                return Err(LcError::DuplicateColumn {
                    column: col.name.clone(),
                });
            }
            if col.len() != n_rows {
                return Err(LcError::Shape {
                    column: col.name.clone(),
                    expected: n_rows,
                    found: col.len(),
                });
            }
        }
        Ok(Table { columns, n_rows })
    }

    /// Build a table from string cells, inferring each column's type.
    ///
    /// Every row must have one cell per header. Errors report the 1-based
    /// line the row would occupy in a file with a header line.
    pub fn from_records<H, C>(headers: &[H], rows: &[Vec<C>]) -> Result<Self>
    where
        H: AsRef<str>,
        C: AsRef<str>,
    {
        let mut cells: Vec<Vec<&str>> = vec![Vec::with_capacity(rows.len()); headers.len()];
        for (row_no, row) in rows.iter().enumerate() {
            if row.len() != headers.len() {
                return Err(LcError::parse(
                    Some(row_no as u64 + 2),
                    format!("found {} fields, expected {}", row.len(), headers.len()),
                ));
            }
            for (col, cell) in cells.iter_mut().zip(row) {
                col.push(cell.as_ref());
            }
        }

        let columns = headers
            .iter()
            .zip(&cells)
            .map(|(name, col)| Column::new(name.as_ref(), ColumnData::infer(col)))
            .collect();
        Table::new(columns)
    }

    pub fn column(&self, name: &str) -> Result<&Column> {
        self.columns
            .iter()
            .find(|c| c.name == name)
            .ok_or_else(|| LcError::MissingColumn {
                column: name.to_string(),
            })
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.n_rows
    }

    pub fn is_empty(&self) -> bool {
        self.n_rows == 0
    }

    /// Row view: column name → cell.
    pub fn row(&self, index: usize) -> Option<BTreeMap<&str, Value>> {
        if index >= self.n_rows {
            return None;
        }
        self.columns
            .iter()
            .map(|c| c.value(index).map(|v| (c.name.as_str(), v)))
            .collect()
    }

    pub fn rows(&self) -> impl Iterator<Item = BTreeMap<&str, Value>> + '_ {
        (0..self.n_rows).filter_map(move |i| self.row(i))
    }

    /// Sorted set of distinct values in a column.
    pub fn unique_values(&self, column: &str) -> Result<BTreeSet<Value>> {
        let col = self.column(column)?;
        Ok((0..col.len()).filter_map(|i| col.value(i)).collect())
    }

    /// New table holding the given rows, in the given order.
    /// Indices past the end are skipped.
    pub fn take(&self, indices: &[usize]) -> Table {
        let n_rows = indices.iter().filter(|&&i| i < self.n_rows).count();
        Table {
            columns: self
                .columns
                .iter()
                .map(|c| Column::new(c.name.clone(), c.data.take(indices)))
                .collect(),
            n_rows,
        }
    }

    /// Subtract a scalar from every numeric column; text columns are copied.
    pub fn sub_scalar(&self, rhs: Number) -> Table {
        Table {
            columns: self
                .columns
                .iter()
                .map(|c| Column::new(c.name.clone(), c.data.sub_scalar(rhs)))
                .collect(),
            n_rows: self.n_rows,
        }
    }
}
