use std::path::Path;

use image::imageops::FilterType;
use image::{DynamicImage, ImageReader};

use crate::config::{ImageSize, ListingOrder};
use crate::error::ImportError;

use super::model::{label_vector_for, Dataset, ImageArray};
use super::taxonomy::{discover_taxonomies, list_images};

/// Channels every stored image must have.
pub const CHANNELS: usize = 3;

// ---------------------------------------------------------------------------
// Single image
// ---------------------------------------------------------------------------

/// Decode one image and map its bytes into `[0, 1]`.
///
/// Only 3-channel sources are accepted. With `resize` set the image is
/// resampled (bicubic) to exactly that size first, and the result must
/// have shape `(height, width, 3)`.
pub fn load_and_normalize(
    path: &Path,
    resize: Option<ImageSize>,
) -> Result<ImageArray, ImportError> {
    let img = decode(path)?;

    let channels = img.color().channel_count();
    if channels as usize != CHANNELS {
        return Err(ImportError::UnsupportedChannels {
            path: path.to_path_buf(),
            channels,
        });
    }

    let img = match resize {
        Some(size) => img.resize_exact(size.width, size.height, FilterType::CatmullRom),
        None => img,
    };

    let rgb = img.to_rgb8();
    let (width, height) = rgb.dimensions();
    let array = ImageArray {
        height: height as usize,
        width: width as usize,
        channels: CHANNELS,
        pixels: rgb.into_raw().into_iter().map(normalize).collect(),
        source: path.to_path_buf(),
    };

    if let Some(size) = resize {
        if array.shape() != size.shape() {
            return Err(ImportError::InvalidShape {
                path: path.to_path_buf(),
                expected: size.shape(),
                found: array.shape(),
            });
        }
    }
    Ok(array)
}

fn decode(path: &Path) -> Result<DynamicImage, ImportError> {
    ImageReader::open(path)
        .map_err(ImportError::io(path))?
        .with_guessed_format()
        .map_err(ImportError::io(path))?
        .decode()
        .map_err(|source| ImportError::Decode {
            path: path.to_path_buf(),
            source,
        })
}

#[inline]
fn normalize(byte: u8) -> f32 {
    byte as f32 / 255.0
}

// ---------------------------------------------------------------------------
// Whole tree
// ---------------------------------------------------------------------------

/// Walk `root`: one class per subdirectory, one sample per `*.jpg`.
///
/// Zero classes is rejected; so is a tree without a single image.
pub fn collect(
    root: &Path,
    resize: Option<ImageSize>,
    order: ListingOrder,
) -> Result<Dataset, ImportError> {
    let taxonomies = discover_taxonomies(root, order)?;
    if taxonomies.is_empty() {
        return Err(ImportError::NoTaxonomies(root.to_path_buf()));
    }

    let num_classes = taxonomies.len();
    let mut images = Vec::new();
    let mut labels = Vec::new();

    for taxonomy in &taxonomies {
        let label = label_vector_for(taxonomy.index, num_classes)?;
        let files = list_images(&taxonomy.path, order)?;
        log::info!("\t{} ({} images)", taxonomy.path.display(), files.len());

        for file in files {
            log::debug!("decoding {}", file.display());
            images.push(load_and_normalize(&file, resize)?);
            labels.push(label.clone());
        }
    }

    if images.is_empty() {
        return Err(ImportError::EmptyDataset(root.to_path_buf()));
    }

    Ok(Dataset {
        taxonomies,
        images,
        labels,
    })
}
