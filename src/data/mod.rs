//! Data layer: record model, loading, and queries.
//!
//! Architecture:
//! ```text
//!  volcano.json / .csv
//!        │
//!        ▼
//!   ┌──────────┐
//!   │  loader   │  parse file → Vec<Volcano>
//!   └──────────┘
//!        │
//!        ▼
//!   ┌──────────────┐
//!   │ VolcanoQuery  │  owns the records, read-only
//!   └──────────────┘
//!        │
//!        ▼
//!   filters, rankings, ratios
//! ```

pub mod error;
pub mod loader;
pub mod model;
pub mod query;

pub use error::{LoadError, QueryError};
pub use model::Volcano;
pub use query::VolcanoQuery;
