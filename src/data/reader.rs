use std::collections::HashMap;
use std::path::Path;

use anyhow::{bail, Context, Result};
use arrow::array::{Array, ArrayRef, AsArray};
use arrow::datatypes::{DataType, Float32Type};
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use serde::de::DeserializeOwned;

use super::writer::{
    CLASSIFICATIONS, CLASSIFICATIONS_SHAPE_KEY, IMAGES, IMAGES_SHAPE_KEY, TAXONOMIES_KEY,
};

// ---------------------------------------------------------------------------
// StoredDataset – a container read back into memory
// ---------------------------------------------------------------------------

/// Flat copies of both arrays plus the shape information needed to index
/// them.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredDataset {
    /// `(height, width, channels)` of every image.
    pub image_shape: [usize; 3],
    /// `N * H * W * C` values, HWC row-major per image.
    pub images: Vec<f32>,
    pub num_classes: usize,
    /// `N * num_classes` values.
    pub classifications: Vec<f32>,
    /// Class directory names, by class index.
    pub taxonomies: Vec<String>,
}

impl StoredDataset {
    /// Number of samples.
    pub fn len(&self) -> usize {
        self.classifications.len() / self.num_classes.max(1)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn image_len(&self) -> usize {
        self.image_shape.iter().product()
    }

    pub fn image(&self, i: usize) -> &[f32] {
        let n = self.image_len();
        &self.images[i * n..(i + 1) * n]
    }

    pub fn label(&self, i: usize) -> &[f32] {
        &self.classifications[i * self.num_classes..(i + 1) * self.num_classes]
    }

    /// Hot index of sample `i`'s label, if it is one-hot.
    pub fn class_of(&self, i: usize) -> Option<usize> {
        let label = self.label(i);
        let hot: Vec<usize> = (0..label.len()).filter(|&j| label[j] == 1.0).collect();
        let rest_zero = label.iter().filter(|&&v| v == 0.0).count() == label.len() - 1;
        match hot.as_slice() {
            [idx] if rest_zero => Some(*idx),
            _ => None,
        }
    }

    /// Samples per class, indexed like `taxonomies`.
    pub fn class_counts(&self) -> Vec<usize> {
        let mut counts = vec![0; self.num_classes];
        for i in 0..self.len() {
            if let Some(c) = self.class_of(i) {
                counts[c] += 1;
            }
        }
        counts
    }
}

// ---------------------------------------------------------------------------
// Parquet reader
// ---------------------------------------------------------------------------

/// Load a container written by [`super::writer::persist`].
pub fn read_container(path: &Path) -> Result<StoredDataset> {
    let file = std::fs::File::open(path)
        .with_context(|| format!("opening dataset file {}", path.display()))?;
    let builder =
        ParquetRecordBatchReaderBuilder::try_new(file).context("reading parquet metadata")?;

    let metadata = builder.schema().metadata().clone();
    let images_shape: [usize; 4] = metadata_json(&metadata, IMAGES_SHAPE_KEY)?;
    let classes_shape: [usize; 2] = metadata_json(&metadata, CLASSIFICATIONS_SHAPE_KEY)?;
    let taxonomies: Vec<String> = metadata_json(&metadata, TAXONOMIES_KEY)?;

    let [n, height, width, channels] = images_shape;
    let [n_labels, num_classes] = classes_shape;
    if n != n_labels {
        bail!("images hold {n} samples but classifications hold {n_labels}");
    }

    let reader = builder.build().context("building parquet reader")?;
    let mut images = Vec::new();
    let mut classifications = Vec::new();
    let mut rows = 0;

    for batch_result in reader {
        let batch = batch_result.context("reading parquet record batch")?;
        let images_col = batch
            .column_by_name(IMAGES)
            .with_context(|| format!("dataset file missing '{IMAGES}' column"))?;
        let classes_col = batch
            .column_by_name(CLASSIFICATIONS)
            .with_context(|| format!("dataset file missing '{CLASSIFICATIONS}' column"))?;

        extend_rows(images_col, &mut images).context("reading images")?;
        extend_rows(classes_col, &mut classifications).context("reading classifications")?;
        rows += batch.num_rows();
    }

    if rows != n {
        bail!("metadata promises {n} samples, file holds {rows}");
    }
    if images.len() != n * height * width * channels {
        bail!(
            "images column holds {} values, expected {}",
            images.len(),
            n * height * width * channels
        );
    }
    if classifications.len() != n * num_classes {
        bail!(
            "classifications column holds {} values, expected {}",
            classifications.len(),
            n * num_classes
        );
    }

    Ok(StoredDataset {
        image_shape: [height, width, channels],
        images,
        num_classes,
        classifications,
        taxonomies,
    })
}

fn metadata_json<T: DeserializeOwned>(metadata: &HashMap<String, String>, key: &str) -> Result<T> {
    let raw = metadata
        .get(key)
        .with_context(|| format!("dataset file missing '{key}' metadata"))?;
    serde_json::from_str(raw).with_context(|| format!("parsing '{key}' metadata"))
}

/// Append every row of a FixedSizeList or List column of Float32.
fn extend_rows(col: &ArrayRef, out: &mut Vec<f32>) -> Result<()> {
    match col.data_type() {
        DataType::FixedSizeList(_, _) => {
            let list = col.as_fixed_size_list();
            for row in 0..list.len() {
                extend_f32(&list.value(row), out)?;
            }
        }
        DataType::List(_) => {
            let list = col.as_list::<i32>();
            for row in 0..list.len() {
                extend_f32(&list.value(row), out)?;
            }
        }
        other => bail!("Expected FixedSizeList or List column, got {other:?}"),
    }
    Ok(())
}

fn extend_f32(values: &ArrayRef, out: &mut Vec<f32>) -> Result<()> {
    let Some(floats) = values.as_primitive_opt::<Float32Type>() else {
        bail!("list inner type is {:?}, expected Float32", values.data_type());
    };
    if floats.null_count() > 0 {
        bail!("null value in list column");
    }
    out.extend_from_slice(floats.values());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stored(classifications: Vec<f32>) -> StoredDataset {
        StoredDataset {
            image_shape: [1, 1, 3],
            images: vec![0.0; classifications.len() / 2 * 3],
            num_classes: 2,
            classifications,
            taxonomies: vec!["a".into(), "b".into()],
        }
    }

    #[test]
    fn class_of_requires_one_hot() {
        let ds = stored(vec![1.0, 0.0, 0.0, 1.0, 0.5, 0.5, 1.0, 1.0]);
        assert_eq!(ds.len(), 4);
        assert_eq!(ds.class_of(0), Some(0));
        assert_eq!(ds.class_of(1), Some(1));
        assert_eq!(ds.class_of(2), None);
        assert_eq!(ds.class_of(3), None);
        assert_eq!(ds.class_counts(), vec![1, 1]);
    }

    #[test]
    fn missing_file_is_an_error() {
        let temp = tempfile::tempdir().expect("create temp dir");
        assert!(read_container(&temp.path().join("absent.parquet")).is_err());
    }

    #[test]
    fn non_parquet_file_is_an_error() {
        let temp = tempfile::tempdir().expect("create temp dir");
        let path = temp.path().join("junk.parquet");
        std::fs::write(&path, b"not parquet at all").unwrap();
        assert!(read_container(&path).is_err());
    }
}
