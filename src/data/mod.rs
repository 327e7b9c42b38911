/// Data layer: catalog, loading, and predicates.
///
/// Architecture:
/// ```text
///  .json / .csv / .parquet
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  parse file → AttributeCatalog
///   └──────────┘
///        │
///        ▼
///   ┌────────────────┐
///   │ AttributeCatalog │  name → values, domain inference
///   └────────────────┘
///        │
///        ▼
///   ┌───────────┐
///   │ predicate  │  committed filters → JSON / query string
///   └───────────┘
/// ```

pub mod catalog;
pub mod loader;
pub mod predicate;
