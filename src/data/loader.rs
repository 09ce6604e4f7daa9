use std::collections::BTreeMap;
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

use log::debug;
use serde::{Deserialize, Serialize};

use super::model::Table;
use crate::error::{LcError, Result};

// ---------------------------------------------------------------------------
// Parser settings
// ---------------------------------------------------------------------------

/// Settings for the delimited-text reader.
///
/// The default reads plain CSV: comma separated, double-quoted fields,
/// first line is the header.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoadOptions {
    pub delimiter: u8,
    pub quote: u8,
    /// Lines starting with this byte are skipped.
    pub comment: Option<u8>,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self {
            delimiter: b',',
            quote: b'"',
            comment: None,
        }
    }
}

impl LoadOptions {
    fn reader<R: Read>(&self, rdr: R) -> csv::Reader<R> {
        csv::ReaderBuilder::new()
            .delimiter(self.delimiter)
            .quote(self.quote)
            .comment(self.comment)
            .has_headers(true)
            .flexible(false)
            .from_reader(rdr)
    }
}

// ---------------------------------------------------------------------------
// Public entry-points
// ---------------------------------------------------------------------------

/// Load an observation table from a CSV file.
pub fn load_dataset(path: impl AsRef<Path>) -> Result<Table> {
    load_dataset_with(path, &LoadOptions::default())
}

/// Load an observation table from a delimited file with explicit settings.
pub fn load_dataset_with(path: impl AsRef<Path>, options: &LoadOptions) -> Result<Table> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|source| LcError::File {
        path: path.to_path_buf(),
        source,
    })?;
    let table = load_from_reader(file, options).map_err(|err| match err {
        LcError::File { source, .. } => LcError::File {
            path: path.to_path_buf(),
            source,
        },
        other => other,
    })?;
    debug!(
        "loaded {} rows x {} columns from {}",
        table.len(),
        table.columns().len(),
        path.display()
    );
    Ok(table)
}

/// Parse delimited text from any reader.
///
/// Column types are inferred after the whole input has been read, so a
/// single non-numeric cell turns its column into text. A read failure is
/// reported as `File` with the path `<reader>`.
pub fn load_from_reader<R: Read>(rdr: R, options: &LoadOptions) -> Result<Table> {
    let mut reader = options.reader(rdr);

    let raw_headers = reader.headers().map_err(csv_error)?.clone();
    if raw_headers.is_empty() {
        return Err(LcError::parse(Some(1), "missing header line"));
    }
    let headers = dedupe_headers(raw_headers.iter());

    let mut rows: Vec<Vec<String>> = Vec::new();
    for result in reader.records() {
        let record = result.map_err(csv_error)?;
        rows.push(record.iter().map(str::to_string).collect());
    }

    let table = Table::from_records(&headers, &rows)?;
    for col in table.columns() {
        debug!("column '{}' inferred as {}", col.name, col.kind());
    }
    Ok(table)
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Repeated header names get a `.N` suffix: `a, a, a` → `a, a.1, a.2`.
fn dedupe_headers<'a>(names: impl Iterator<Item = &'a str>) -> Vec<String> {
    let mut seen: BTreeMap<&str, usize> = BTreeMap::new();
    names
        .map(|name| {
            let count = seen.entry(name).or_insert(0);
            let out = if *count == 0 {
                name.to_string()
            } else {
                format!("{name}.{count}")
            };
            *count += 1;
            out
        })
        .collect()
}

fn csv_error(err: csv::Error) -> LcError {
    let line = err.position().map(|p| p.line());
    match err.into_kind() {
        csv::ErrorKind::Io(source) => LcError::File {
            path: PathBuf::from("<reader>"),
            source,
        },
        csv::ErrorKind::UnequalLengths {
            pos,
            expected_len,
            len,
        } => LcError::parse(
            pos.map(|p| p.line()).or(line),
            format!("found {len} fields, expected {expected_len}"),
        ),
        csv::ErrorKind::Utf8 { pos, err } => {
            LcError::parse(pos.map(|p| p.line()).or(line), format!("invalid UTF-8: {err}"))
        }
        other => LcError::parse(line, format!("{other:?}")),
    }
}
