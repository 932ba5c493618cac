use std::path::PathBuf;

use crate::error::ImportError;

// ---------------------------------------------------------------------------
// Taxonomy – one class directory
// ---------------------------------------------------------------------------

/// One class, discovered as an immediate subdirectory of the input root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Taxonomy {
    /// Position in the listing; the hot index of this class's labels.
    pub index: usize,
    /// Directory name.
    pub name: String,
    pub path: PathBuf,
}

/// One-hot label for class `index` out of `num_classes`.
pub fn label_vector_for(index: usize, num_classes: usize) -> Result<Vec<f32>, ImportError> {
    if index >= num_classes {
        return Err(ImportError::LabelOutOfRange { index, num_classes });
    }
    let mut label = vec![0.0; num_classes];
    label[index] = 1.0;
    Ok(label)
}

// ---------------------------------------------------------------------------
// ImageArray – one decoded, normalized image
// ---------------------------------------------------------------------------

/// Pixel values in `[0, 1]`, row-major `(height, width, channels)`.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageArray {
    pub height: usize,
    pub width: usize,
    pub channels: usize,
    pub pixels: Vec<f32>,
    /// Source file, kept for error messages.
    pub source: PathBuf,
}

impl ImageArray {
    pub fn shape(&self) -> [usize; 3] {
        [self.height, self.width, self.channels]
    }
}

// ---------------------------------------------------------------------------
// Dataset – images and labels, index-aligned
// ---------------------------------------------------------------------------

/// Everything collected in one run.
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    pub taxonomies: Vec<Taxonomy>,
    pub images: Vec<ImageArray>,
    pub labels: Vec<Vec<f32>>,
}

impl Dataset {
    /// Number of samples.
    pub fn len(&self) -> usize {
        self.images.len()
    }

    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }

    pub fn num_classes(&self) -> usize {
        self.taxonomies.len()
    }

    /// Shape shared by every image, or `None` for an empty dataset.
    pub fn image_shape(&self) -> Option<[usize; 3]> {
        self.images.first().map(ImageArray::shape)
    }

    /// Count check plus uniform image shape. Must pass before persisting.
    pub fn validate(&self) -> Result<(), ImportError> {
        validate(&self.images, &self.labels)?;

        if let Some(expected) = self.image_shape() {
            if let Some(bad) = self.images.iter().find(|img| img.shape() != expected) {
                return Err(ImportError::InconsistentShape {
                    path: bad.source.clone(),
                    expected,
                    found: bad.shape(),
                });
            }
        }
        Ok(())
    }
}

/// Fails when the two sequences are not index-aligned.
pub fn validate(images: &[ImageArray], labels: &[Vec<f32>]) -> Result<(), ImportError> {
    if images.len() != labels.len() {
        return Err(ImportError::CountMismatch {
            images: images.len(),
            labels: labels.len(),
        });
    }
    Ok(())
}
