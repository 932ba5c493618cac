use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use arrow::array::{Array, ArrayRef, FixedSizeListArray, Float32Array};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use parquet::arrow::ArrowWriter;
use parquet::basic::{Compression, GzipLevel};
use parquet::file::properties::WriterProperties;

use crate::config::{CompressionAlgorithm, WriterOptions};

use super::model::Dataset;

/// Column holding the `(N, H, W, 3)` image array, one image per row.
pub const IMAGES: &str = "images";
/// Column holding the `(N, num_classes)` one-hot array.
pub const CLASSIFICATIONS: &str = "classifications";

/// Schema metadata keys (values are JSON).
pub const IMAGES_SHAPE_KEY: &str = "images.shape";
pub const CLASSIFICATIONS_SHAPE_KEY: &str = "classifications.shape";
pub const TAXONOMIES_KEY: &str = "taxonomies";
pub const CONFIG_KEY: &str = "importer.config";

// ---------------------------------------------------------------------------
// Public entry-points
// ---------------------------------------------------------------------------

/// Write `dataset` to `output`, replacing whatever was there.
pub fn persist(dataset: &Dataset, output: &Path, options: &WriterOptions) -> Result<()> {
    write_container(dataset, output, options, HashMap::new())
}

/// Like [`persist`], with extra schema metadata entries.
///
/// The file is assembled next to `output` and renamed into place once the
/// Parquet footer is written, so a failed run leaves `output` untouched.
pub fn write_container(
    dataset: &Dataset,
    output: &Path,
    options: &WriterOptions,
    extra_metadata: HashMap<String, String>,
) -> Result<()> {
    if dataset.is_empty() {
        bail!("refusing to write an empty dataset to {}", output.display());
    }
    dataset.validate()?;

    let batch = build_batch(dataset, extra_metadata)?;
    let props = writer_properties(options)?;

    let dir = match output.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    let mut builder = tempfile::Builder::new();
    builder.prefix(".taxonomy-import-").suffix(".partial");
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        // Same mode File::create would give: 0o666 less the umask.
        builder.permissions(std::fs::Permissions::from_mode(0o666));
    }
    let mut tmp = builder
        .tempfile_in(dir)
        .with_context(|| format!("creating temporary file in {}", dir.display()))?;

    let mut writer = ArrowWriter::try_new(tmp.as_file_mut(), batch.schema(), Some(props))
        .context("creating parquet writer")?;
    writer.write(&batch).context("writing record batch")?;
    writer.close().context("finalizing parquet file")?;

    tmp.persist(output)
        .with_context(|| format!("moving dataset into place at {}", output.display()))?;
    Ok(())
}

// ---------------------------------------------------------------------------
// Arrow conversion
// ---------------------------------------------------------------------------

fn build_batch(dataset: &Dataset, extra_metadata: HashMap<String, String>) -> Result<RecordBatch> {
    let [height, width, channels] = dataset.image_shape().context("dataset has no images")?;
    let n = dataset.len();
    let num_classes = dataset.num_classes();

    let mut image_values = Vec::with_capacity(n * height * width * channels);
    for img in &dataset.images {
        image_values.extend_from_slice(&img.pixels);
    }
    let images = fixed_size_list(image_values, height * width * channels)?;
    let classifications = fixed_size_list(dataset.labels.concat(), num_classes)?;

    let mut metadata = extra_metadata;
    metadata.insert(
        IMAGES_SHAPE_KEY.to_string(),
        serde_json::to_string(&[n, height, width, channels])?,
    );
    metadata.insert(
        CLASSIFICATIONS_SHAPE_KEY.to_string(),
        serde_json::to_string(&[n, num_classes])?,
    );
    let names: Vec<&str> = dataset.taxonomies.iter().map(|t| t.name.as_str()).collect();
    metadata.insert(TAXONOMIES_KEY.to_string(), serde_json::to_string(&names)?);

    let schema = Schema::new(vec![
        Field::new(IMAGES, images.data_type().clone(), false),
        Field::new(CLASSIFICATIONS, classifications.data_type().clone(), false),
    ])
    .with_metadata(metadata);

    RecordBatch::try_new(
        Arc::new(schema),
        vec![
            Arc::new(images) as ArrayRef,
            Arc::new(classifications) as ArrayRef,
        ],
    )
    .context("assembling record batch")
}

/// Pack `values` into rows of exactly `width` floats.
fn fixed_size_list(values: Vec<f32>, width: usize) -> Result<FixedSizeListArray> {
    let size = i32::try_from(width).context("row too wide for a fixed-size list")?;
    let item = Arc::new(Field::new("item", DataType::Float32, false));
    FixedSizeListArray::try_new(item, size, Arc::new(Float32Array::from(values)), None)
        .context("building fixed-size list column")
}

fn writer_properties(options: &WriterOptions) -> Result<WriterProperties> {
    let compression = match options.compression_algorithm {
        CompressionAlgorithm::Gzip => {
            let level = options.compression_level;
            let level = GzipLevel::try_new(level)
                .with_context(|| format!("invalid gzip level {level}"))?;
            Compression::GZIP(level)
        }
        CompressionAlgorithm::Uncompressed => Compression::UNCOMPRESSED,
    };
    Ok(WriterProperties::builder().set_compression(compression).build())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::{ImageArray, Taxonomy};
    use crate::data::reader::read_container;
    use parquet::file::reader::{FileReader, SerializedFileReader};
    use std::path::PathBuf;

    fn tiny_dataset() -> Dataset {
        let taxonomies = ["cat", "dog"]
            .iter()
            .enumerate()
            .map(|(index, name)| Taxonomy {
                index,
                name: name.to_string(),
                path: PathBuf::from(name),
            })
            .collect();
        let images = (0..3)
            .map(|i| ImageArray {
                height: 2,
                width: 2,
                channels: 3,
                pixels: vec![i as f32 / 4.0; 12],
                source: PathBuf::from(format!("{i}.jpg")),
            })
            .collect();
        Dataset {
            taxonomies,
            images,
            labels: vec![vec![1.0, 0.0], vec![0.0, 1.0], vec![0.0, 1.0]],
        }
    }

    #[test]
    fn columns_are_gzip_compressed() {
        let temp = tempfile::tempdir().expect("create temp dir");
        let out = temp.path().join("data.parquet");
        persist(&tiny_dataset(), &out, &WriterOptions::default()).unwrap();

        let reader = SerializedFileReader::new(std::fs::File::open(&out).unwrap()).unwrap();
        let row_group = reader.metadata().row_group(0);
        assert_eq!(row_group.num_rows(), 3);
        for column in row_group.columns() {
            assert!(matches!(column.compression(), Compression::GZIP(_)));
        }
    }

    #[test]
    fn uncompressed_option_writes_plain_column_chunks() {
        let temp = tempfile::tempdir().expect("create temp dir");
        let out = temp.path().join("plain.parquet");
        let options = WriterOptions {
            compression_algorithm: CompressionAlgorithm::Uncompressed,
            ..WriterOptions::default()
        };
        let dataset = tiny_dataset();
        persist(&dataset, &out, &options).unwrap();

        let reader = SerializedFileReader::new(std::fs::File::open(&out).unwrap()).unwrap();
        for column in reader.metadata().row_group(0).columns() {
            assert_eq!(column.compression(), Compression::UNCOMPRESSED);
        }

        let stored = read_container(&out).unwrap();
        assert_eq!(stored.len(), 3);
        assert_eq!(stored.image_shape, [2, 2, 3]);
        assert_eq!(stored.taxonomies, ["cat", "dog"]);
        assert_eq!(stored.classifications, dataset.labels.concat());
        for (i, img) in dataset.images.iter().enumerate() {
            assert_eq!(stored.image(i), img.pixels.as_slice());
        }
    }

    #[cfg(unix)]
    #[test]
    fn output_mode_matches_a_plain_new_file() {
        use std::os::unix::fs::PermissionsExt;

        let temp = tempfile::tempdir().expect("create temp dir");
        let plain = temp.path().join("plain.bin");
        std::fs::write(&plain, b"x").unwrap();
        let out = temp.path().join("data.parquet");
        persist(&tiny_dataset(), &out, &WriterOptions::default()).unwrap();

        let mode = |p: &Path| std::fs::metadata(p).unwrap().permissions().mode() & 0o777;
        assert_eq!(mode(&out), mode(&plain));
    }

    #[test]
    fn overwrites_existing_output() {
        let temp = tempfile::tempdir().expect("create temp dir");
        let out = temp.path().join("data.parquet");
        std::fs::write(&out, b"stale contents that are not parquet").unwrap();

        persist(&tiny_dataset(), &out, &WriterOptions::default()).unwrap();
        let stored = read_container(&out).unwrap();
        assert_eq!(stored.len(), 3);

        let leftovers: Vec<_> = std::fs::read_dir(temp.path())
            .unwrap()
            .map(|e| e.unwrap().file_name())
            .collect();
        assert_eq!(leftovers, vec![std::ffi::OsString::from("data.parquet")]);
    }

    #[test]
    fn mismatched_dataset_leaves_existing_output_alone() {
        let temp = tempfile::tempdir().expect("create temp dir");
        let out = temp.path().join("data.parquet");
        std::fs::write(&out, b"previous run").unwrap();

        let mut dataset = tiny_dataset();
        dataset.labels.pop();
        assert!(persist(&dataset, &out, &WriterOptions::default()).is_err());
        assert_eq!(std::fs::read(&out).unwrap(), b"previous run");
    }

    #[test]
    fn rejects_empty_dataset_and_bad_level() {
        let temp = tempfile::tempdir().expect("create temp dir");
        let out = temp.path().join("data.parquet");
        assert!(persist(&Dataset::default(), &out, &WriterOptions::default()).is_err());

        let options = WriterOptions {
            compression_level: 42,
            ..WriterOptions::default()
        };
        assert!(persist(&tiny_dataset(), &out, &options).is_err());
        assert!(!out.exists());
    }
}
