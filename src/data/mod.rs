/// Data layer: table model, loading, and band slicing.
///
/// Architecture:
/// ```text
///   observations.csv
///        │
///        ▼
///   ┌──────────┐
///   │  loader  │  parse file → Table (column kinds inferred)
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  Table   │  Vec<Column>, row views, unique values
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  filter  │  select rows per band → BandTables
///   └──────────┘
/// ```

pub mod filter;
pub mod loader;
pub mod model;
