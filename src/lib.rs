//! Turn a folder of class subdirectories full of JPEGs into one compressed
//! `images` / `classifications` dataset file.

pub mod config;
pub mod data;
pub mod error;
pub mod importer;

pub use config::{CompressionAlgorithm, ImageSize, ImportConfig, ListingOrder, WriterOptions};
pub use data::model::{label_vector_for, Dataset, ImageArray, Taxonomy};
pub use data::reader::{read_container, StoredDataset};
pub use error::ImportError;
pub use importer::{run, ImportSummary};
