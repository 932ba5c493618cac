use std::fs;
use std::path::{Path, PathBuf};

use crate::config::ListingOrder;
use crate::error::ImportError;

use super::model::Taxonomy;

/// Extension matched by the image listing, compared case-sensitively.
pub const IMAGE_EXTENSION: &str = "jpg";

/// List the immediate subdirectories of `root`, one class each.
///
/// Hidden entries are skipped. An empty result is not an error here; the
/// importer decides what to do with zero classes.
pub fn discover_taxonomies(root: &Path, order: ListingOrder) -> Result<Vec<Taxonomy>, ImportError> {
    let dirs = list_entries(root, order, |path| path.is_dir())?;

    Ok(dirs
        .into_iter()
        .enumerate()
        .map(|(index, path)| Taxonomy {
            index,
            name: file_name(&path),
            path,
        })
        .collect())
}

/// List the `*.jpg` files directly inside a class directory.
pub fn list_images(dir: &Path, order: ListingOrder) -> Result<Vec<PathBuf>, ImportError> {
    list_entries(dir, order, |path| {
        path.is_file() && path.extension().is_some_and(|ext| ext == IMAGE_EXTENSION)
    })
}

fn list_entries(
    dir: &Path,
    order: ListingOrder,
    keep: impl Fn(&Path) -> bool,
) -> Result<Vec<PathBuf>, ImportError> {
    let mut paths = Vec::new();
    for entry in fs::read_dir(dir).map_err(ImportError::io(dir))? {
        let entry = entry.map_err(ImportError::io(dir))?;
        if entry.file_name().to_string_lossy().starts_with('.') {
            continue;
        }
        let path = entry.path();
        if keep(&path) {
            paths.push(path);
        }
    }

    if order == ListingOrder::Sorted {
        paths.sort();
    }
    Ok(paths)
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}
