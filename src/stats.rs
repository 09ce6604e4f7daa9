//! Column reductions, per-band statistics and lightcurve normalization.
//!
//! Every function here reads a [`Table`] and never mutates it. Reducers
//! refuse text columns with [`LcError::InvalidOperandKind`]; nothing is
//! coerced to a number.

use log::{debug, trace, warn};
use serde::ser::{Serialize, SerializeMap, Serializer};

use crate::data::filter::BandTables;
use crate::data::model::{Column, ColumnData, Number, Table};
use crate::error::{LcError, Result};

fn invalid_operand(col: &Column) -> LcError {
    LcError::InvalidOperandKind {
        column: col.name.clone(),
        kind: col.kind(),
    }
}

// ---------------------------------------------------------------------------
// Column reducers
// ---------------------------------------------------------------------------

/// Smallest value of `mag_col`. `NaN` cells are skipped; an empty column
/// gives `NaN`.
pub fn min_mag(data: &Table, mag_col: &str) -> Result<Number> {
    let col = data.column(mag_col)?;
    match &col.data {
        ColumnData::Integer(v) => Ok(v.iter().min().map_or(Number::Float(f64::NAN), |&i| i.into())),
        ColumnData::Float(v) => Ok(Number::Float(
            v.iter().copied().filter(|x| !x.is_nan()).reduce(f64::min).unwrap_or(f64::NAN),
        )),
        ColumnData::Text(_) => Err(invalid_operand(col)),
    }
}

/// Largest value of `mag_col`. `NaN` cells are skipped; an empty column
/// gives `NaN`.
pub fn max_mag(data: &Table, mag_col: &str) -> Result<Number> {
    let col = data.column(mag_col)?;
    match &col.data {
        ColumnData::Integer(v) => Ok(v.iter().max().map_or(Number::Float(f64::NAN), |&i| i.into())),
        ColumnData::Float(v) => Ok(Number::Float(
            v.iter().copied().filter(|x| !x.is_nan()).reduce(f64::max).unwrap_or(f64::NAN),
        )),
        ColumnData::Text(_) => Err(invalid_operand(col)),
    }
}

/// Arithmetic mean of `mag_col`, always as `f64`.
pub fn mean_mag(data: &Table, mag_col: &str) -> Result<f64> {
    let col = data.column(mag_col)?;
    let values: Vec<f64> = match &col.data {
        ColumnData::Integer(v) => v.iter().map(|&i| i as f64).collect(),
        ColumnData::Float(v) => v.iter().copied().filter(|x| !x.is_nan()).collect(),
        ColumnData::Text(_) => return Err(invalid_operand(col)),
    };
    Ok(mean_of(&values))
}

fn mean_of(values: &[f64]) -> f64 {
    let Some(&first) = values.first() else {
        return f64::NAN;
    };
    let n = values.len() as f64;
    // Summing offsets from a finite first value keeps a constant column exact.
    let mean = if first.is_finite() {
        first + values.iter().map(|x| x - first).sum::<f64>() / n
    } else {
        values.iter().sum::<f64>() / n
    };

    let lo = values.iter().copied().fold(f64::INFINITY, f64::min);
    let hi = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    mean.clamp(lo, hi)
}

// ---------------------------------------------------------------------------
// Per-band statistics
// ---------------------------------------------------------------------------

/// Summary of one band's magnitude column.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize)]
pub struct BandStats {
    pub max: Number,
    pub mean: f64,
    pub min: Number,
}

/// Band name → [`BandStats`], in the order the bands were requested.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct StatsTable {
    entries: Vec<(String, BandStats)>,
}

impl StatsTable {
    /// Insert or replace; a replaced band keeps its original position.
    fn insert(&mut self, band: &str, stats: BandStats) {
        match self.entries.iter_mut().find(|(name, _)| name == band) {
            Some((_, slot)) => *slot = stats,
            None => self.entries.push((band.to_string(), stats)),
        }
    }

    pub fn get(&self, band: &str) -> Option<&BandStats> {
        self.entries
            .iter()
            .find(|(name, _)| name == band)
            .map(|(_, stats)| stats)
    }

    pub fn bands(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(name, _)| name.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &BandStats)> {
        self.entries.iter().map(|(name, stats)| (name.as_str(), stats))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Pretty-printed JSON object keyed by band.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    /// Wide table: a `stat` column (`max`, `mean`, `min`) and one float
    /// column per band.
    pub fn to_table(&self) -> Result<Table> {
        let mut columns = vec![Column::text("stat", vec!["max", "mean", "min"])];
        columns.extend(self.entries.iter().map(|(band, s)| {
            Column::float(band.clone(), vec![s.max.as_f64(), s.mean, s.min.as_f64()])
        }));
        Table::new(columns)
    }
}

impl Serialize for StatsTable {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (band, stats) in &self.entries {
            map.serialize_entry(band, stats)?;
        }
        map.end()
    }
}

/// Max, mean and min of `mag_col` for each band in `bands`.
///
/// Fails with `MissingBand` for a band that `lc` does not contain, and
/// propagates reducer errors for a missing or non-numeric column.
pub fn calc_stats<S: AsRef<str>>(lc: &BandTables, bands: &[S], mag_col: &str) -> Result<StatsTable> {
    let mut stats = StatsTable::default();
    for band in bands {
        let band = band.as_ref();
        let table = lc.get(band).ok_or_else(|| LcError::MissingBand {
            band: band.to_string(),
        })?;
        let stat = BandStats {
            max: max_mag(table, mag_col)?,
            mean: mean_mag(table, mag_col)?,
            min: min_mag(table, mag_col)?,
        };
        trace!("band '{band}': {stat:?}");
        stats.insert(band, stat);
    }
    debug!("computed '{mag_col}' statistics for {} bands", stats.len());
    Ok(stats)
}

// ---------------------------------------------------------------------------
// Normalization
// ---------------------------------------------------------------------------

/// Rescale one band's magnitudes to `[0, 1]`.
///
/// The minimum is subtracted from the whole table, the maximum is then
/// taken from the shifted magnitude column, and each shifted magnitude is
/// divided by it. Undefined results (a constant lightcurve, or a missing
/// cell) become `0.0`.
pub fn normalize_lc(df: &Table, mag_col: &str) -> Result<Vec<f64>> {
    let min = min_mag(df, mag_col)?;
    let shifted = df.sub_scalar(min);
    let max = max_mag(&shifted, mag_col)?;
    debug!("normalizing '{mag_col}': min {min}, shifted max {max}");
    if max == Number::Integer(0) {
        warn!("'{mag_col}' is constant; normalized values are all 0");
    }

    let denom = max.as_f64();
    let col = shifted.column(mag_col)?;
    let scaled: Vec<f64> = match &col.data {
        ColumnData::Integer(v) => v.iter().map(|&x| x as f64 / denom).collect(),
        ColumnData::Float(v) => v.iter().map(|x| x / denom).collect(),
        ColumnData::Text(_) => return Err(invalid_operand(col)),
    };
    Ok(scaled
        .into_iter()
        .map(|x| if x.is_nan() { 0.0 } else { x })
        .collect())
}
