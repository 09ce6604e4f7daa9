use std::collections::{BTreeMap, BTreeSet};

use log::{debug, warn};

use super::model::{ColumnKind, Table, Value};
use crate::error::Result;

// ---------------------------------------------------------------------------
// Row filter: which values are selected per column
// ---------------------------------------------------------------------------

/// Per-column selection: column_name → set of accepted values.
/// An empty set accepts nothing.
pub type RowFilter = BTreeMap<String, BTreeSet<Value>>;

/// Per-band sub-tables keyed by band name.
pub type BandTables = BTreeMap<String, Table>;

/// Return indices of rows that pass every column filter.
///
/// Fails with `MissingColumn` if a filtered column does not exist.
pub fn filtered_indices(table: &Table, filters: &RowFilter) -> Result<Vec<usize>> {
    let columns = filters
        .iter()
        .map(|(name, selected)| table.column(name).map(|col| (col, selected)))
        .collect::<Result<Vec<_>>>()?;

    Ok((0..table.len())
        .filter(|&row| {
            columns.iter().all(|(col, selected)| {
                col.value(row)
                    .map_or(false, |val| selected.contains(&val))
            })
        })
        .collect())
}

// ---------------------------------------------------------------------------
// Band slicing
// ---------------------------------------------------------------------------

/// Slice `table` into one sub-table per requested band.
///
/// A band with no matching rows maps to an empty table with the same
/// columns.
pub fn split_bands<S: AsRef<str>>(
    table: &Table,
    band_column: &str,
    bands: &[S],
) -> Result<BandTables> {
    let kind = table.column(band_column)?.kind();
    let mut out = BandTables::new();

    for band in bands {
        let band = band.as_ref();
        let selected: BTreeSet<Value> = band_value(kind, band).into_iter().collect();
        let filter = RowFilter::from([(band_column.to_string(), selected)]);
        let rows = filtered_indices(table, &filter)?;
        if rows.is_empty() {
            warn!("band '{band}' has no rows in column '{band_column}'");
        }
        debug!("band '{band}': {} rows", rows.len());
        out.insert(band.to_string(), table.take(&rows));
    }
    Ok(out)
}

/// Slice `table` by every distinct value of `band_column`.
/// Missing cells (null text, NaN) do not form a band.
pub fn split_by(table: &Table, band_column: &str) -> Result<BandTables> {
    let mut out = BandTables::new();
    for value in table.unique_values(band_column)? {
        if matches!(value, Value::Null) || matches!(value, Value::Float(f) if f.is_nan()) {
            continue;
        }
        let key = value.to_string();
        let filter = RowFilter::from([(band_column.to_string(), BTreeSet::from([value]))]);
        let rows = filtered_indices(table, &filter)?;
        out.insert(key, table.take(&rows));
    }
    Ok(out)
}

/// The cell value a band name stands for in a column of the given kind.
fn band_value(kind: ColumnKind, band: &str) -> Option<Value> {
    match kind {
        ColumnKind::Text => Some(Value::String(band.to_string())),
        ColumnKind::Integer => band.trim().parse().ok().map(Value::Integer),
        ColumnKind::Float => band.trim().parse().ok().map(Value::Float),
    }
}
