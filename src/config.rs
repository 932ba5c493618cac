use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use anyhow::{bail, Context};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Import configuration
// ---------------------------------------------------------------------------

/// Everything one import run needs. Built from the command line in `main`
/// and recorded verbatim in the output file's metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImportConfig {
    /// Root folder: one subdirectory per class.
    pub input: PathBuf,
    /// Container file to create (or overwrite).
    pub output: PathBuf,
    /// Resize every image to this size; `None` keeps native resolution.
    pub resize: Option<ImageSize>,
    pub listing_order: ListingOrder,
    pub writer: WriterOptions,
}

impl ImportConfig {
    pub fn new(input: impl Into<PathBuf>, output: impl Into<PathBuf>) -> Self {
        Self {
            input: input.into(),
            output: output.into(),
            resize: None,
            listing_order: ListingOrder::default(),
            writer: WriterOptions::default(),
        }
    }
}

// ---------------------------------------------------------------------------
// Image size (`--resize`)
// ---------------------------------------------------------------------------

/// Target size for resizing mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageSize {
    pub width: u32,
    pub height: u32,
}

impl ImageSize {
    pub const fn square(side: u32) -> Self {
        Self {
            width: side,
            height: side,
        }
    }

    /// Expected `(height, width, channels)` of a resized RGB image.
    pub fn shape(&self) -> [usize; 3] {
        [self.height as usize, self.width as usize, 3]
    }
}

/// Accepts `N` (square) or `WxH`.
impl FromStr for ImageSize {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> anyhow::Result<Self> {
        let parse = |tok: &str| -> anyhow::Result<u32> {
            let v = tok
                .trim()
                .parse::<u32>()
                .with_context(|| format!("'{tok}' is not a positive integer"))?;
            if v == 0 {
                bail!("image dimensions must be non-zero");
            }
            Ok(v)
        };

        match s.split_once(['x', 'X']) {
            Some((w, h)) => Ok(Self {
                width: parse(w)?,
                height: parse(h)?,
            }),
            None => Ok(Self::square(parse(s)?)),
        }
    }
}

impl fmt::Display for ImageSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

// ---------------------------------------------------------------------------
// Listing order
// ---------------------------------------------------------------------------

/// Order in which class directories and image files are enumerated.
/// Class indices follow this order, so it decides the label assignment.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ListingOrder {
    /// Byte-wise sort of the entry names; reproducible across platforms.
    #[default]
    Sorted,
    /// Whatever `read_dir` yields.
    Filesystem,
}

// ---------------------------------------------------------------------------
// Writer options
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum CompressionAlgorithm {
    #[default]
    Gzip,
    #[serde(rename = "none")]
    #[value(name = "none")]
    Uncompressed,
}

/// Compression settings applied to both stored arrays.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WriterOptions {
    pub compression_algorithm: CompressionAlgorithm,
    /// Gzip level, 0-9. Ignored when compression is off.
    pub compression_level: u32,
}

impl Default for WriterOptions {
    fn default() -> Self {
        Self {
            compression_algorithm: CompressionAlgorithm::Gzip,
            compression_level: 9,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_square_and_rectangular_sizes() {
        assert_eq!("32".parse::<ImageSize>().unwrap(), ImageSize::square(32));
        assert_eq!(
            "64x48".parse::<ImageSize>().unwrap(),
            ImageSize {
                width: 64,
                height: 48
            }
        );
        assert_eq!(ImageSize::square(32).shape(), [32, 32, 3]);
    }

    #[test]
    fn rejects_zero_and_garbage_sizes() {
        assert!("0".parse::<ImageSize>().is_err());
        assert!("32x0".parse::<ImageSize>().is_err());
        assert!("abc".parse::<ImageSize>().is_err());
        assert!("x32".parse::<ImageSize>().is_err());
    }

    #[test]
    fn default_writer_is_gzip_level_nine() {
        let opts = WriterOptions::default();
        assert_eq!(opts.compression_algorithm, CompressionAlgorithm::Gzip);
        assert_eq!(opts.compression_level, 9);
    }

    #[test]
    fn config_serializes_with_lowercase_enums() {
        let mut config = ImportConfig::new("Images", "out.parquet");
        config.resize = Some(ImageSize::square(32));
        let json = serde_json::to_value(&config).unwrap();
        assert_eq!(json["listing_order"], "sorted");
        assert_eq!(json["writer"]["compression_algorithm"], "gzip");
        assert_eq!(json["resize"]["width"], 32);
    }
}
