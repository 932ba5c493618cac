//! Data layer: class discovery, image loading, and the dataset container.
//!
//! Architecture:
//! ```text
//!   Images/<class>/*.jpg
//!        │
//!        ▼
//!   ┌──────────┐
//!   │ taxonomy │  class directories → Vec<Taxonomy>
//!   └──────────┘
//!        │
//!        ▼
//!   ┌──────────┐
//!   │  loader  │  decode, normalize, one-hot label → Dataset
//!   └──────────┘
//!        │
//!        ▼
//!   ┌──────────┐
//!   │  writer  │  validate → gzip Parquet container
//!   └──────────┘
//!        │
//!        ▼
//!   ┌──────────┐
//!   │  reader  │  container → StoredDataset (inspection, tests)
//!   └──────────┘
//! ```

pub mod loader;
pub mod model;
pub mod reader;
pub mod taxonomy;
pub mod writer;
