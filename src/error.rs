use std::path::PathBuf;

use thiserror::Error;

/// Every way an import can fail. None of them are recovered from: the
/// error travels up to `main` and the run aborts.
#[derive(Debug, Error)]
pub enum ImportError {
    #[error("collected {images} images but {labels} label vectors")]
    CountMismatch { images: usize, labels: usize },

    #[error("{}: expected shape {expected:?}, got {found:?}", .path.display())]
    InvalidShape {
        path: PathBuf,
        expected: [usize; 3],
        found: [usize; 3],
    },

    #[error("{}: expected 3 colour channels, got {channels}", .path.display())]
    UnsupportedChannels { path: PathBuf, channels: u8 },

    #[error(
        "{}: shape {found:?} differs from the first image's {expected:?}",
        .path.display()
    )]
    InconsistentShape {
        path: PathBuf,
        expected: [usize; 3],
        found: [usize; 3],
    },

    #[error("class index {index} out of range for {num_classes} classes")]
    LabelOutOfRange { index: usize, num_classes: usize },

    #[error("no class subdirectories found in {}", .0.display())]
    NoTaxonomies(PathBuf),

    #[error("no .jpg images found under {}", .0.display())]
    EmptyDataset(PathBuf),

    #[error("{}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{}: failed to decode image", .path.display())]
    Decode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
}

impl ImportError {
    pub(crate) fn io(path: impl Into<PathBuf>) -> impl FnOnce(std::io::Error) -> Self {
        let path = path.into();
        move |source| ImportError::Io { path, source }
    }
}
