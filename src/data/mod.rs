//! Data layer: core types, loading, and saving.
//!
//! Architecture:
//! ```text
//!  .csv / .tsv / .json / .parquet
//!        │
//!        ▼
//!   ┌──────────┐
//!   │  loader  │  parse file → Table (column kinds inferred)
//!   └──────────┘
//!        │
//!        ▼
//!   ┌──────────┐
//!   │  Table   │  Vec<Column>, each tagged with a ColumnKind
//!   └──────────┘
//!        │   (cleaning stages, see `crate::clean`)
//!        ▼
//!   ┌──────────┐
//!   │  writer  │  Table → file, no row index
//!   └──────────┘
//! ```

pub mod format;
pub mod loader;
pub mod model;
pub mod writer;
