/// Data layer: the owner table, loading, filtering, and fabrication.
///
/// Architecture:
/// ```text
///  .csv / .json / .parquet
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  parse file → OwnerDataset
///   └──────────┘
///        │
///        ▼
///   ┌──────────────┐
///   │ OwnerDataset │  Vec<OwnerRecord>, distinct values, numeric bounds
///   └──────────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  filter   │  apply per-field criteria → FilteredView
///   └──────────┘
/// ```
///
/// `synth` sits upstream of the pipeline: it fabricates the table the
/// loader reads.

pub mod filter;
pub mod loader;
pub mod model;
pub mod synth;
