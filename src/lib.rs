//! Summary statistics and normalization for photometric lightcurves.
//!
//! A lightcurve is loaded from CSV into a [`Table`], sliced into per-band
//! sub-tables, and then reduced:
//!
//! ```no_run
//! use lcanalyzer::{calc_stats, load_dataset, normalize_lc, split_bands};
//!
//! let lc = load_dataset("observations.csv")?;
//! let bands = ["g", "r"];
//! let per_band = split_bands(&lc, "band", &bands)?;
//!
//! let stats = calc_stats(&per_band, &bands, "psfMag")?;
//! println!("{}", stats.to_json().unwrap_or_default());
//!
//! let g_norm = normalize_lc(&per_band["g"], "psfMag")?;
//! # let _ = g_norm;
//! # Ok::<(), lcanalyzer::LcError>(())
//! ```

pub mod data;
pub mod error;
pub mod stats;

pub use data::filter::{filtered_indices, split_bands, split_by, BandTables, RowFilter};
pub use data::loader::{load_dataset, load_dataset_with, load_from_reader, LoadOptions};
pub use data::model::{Column, ColumnData, ColumnKind, Number, Table, Value};
pub use error::{LcError, Result};
pub use stats::{calc_stats, max_mag, mean_mag, min_mag, normalize_lc, BandStats, StatsTable};
