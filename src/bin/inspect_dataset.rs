use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use arrow::array::{ArrayRef, Int64Array, StringArray};
use arrow::record_batch::RecordBatch;
use arrow::util::pretty::pretty_format_batches;
use clap::Parser;
use taxonomy_import::read_container;

/// Print the shapes and per-class sample counts of an imported dataset.
#[derive(Debug, Parser)]
#[command(version, about)]
struct Args {
    /// Dataset file written by taxonomy-import.
    file: PathBuf,
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let stored = read_container(&args.file)?;
    let [height, width, channels] = stored.image_shape;
    let n = stored.len();
    println!("images:          ({n}, {height}, {width}, {channels})");
    println!("classifications: ({n}, {})", stored.num_classes);

    let (lo, hi) = pixel_range(&stored.images);
    println!("pixel range:     [{lo:.4}, {hi:.4}]");

    let counts = stored.class_counts();
    let not_one_hot = n - counts.iter().sum::<usize>();
    if not_one_hot > 0 {
        log::warn!("{not_one_hot} labels are not one-hot");
    }

    let index = Int64Array::from_iter_values(0..stored.num_classes as i64);
    let taxonomy = StringArray::from(stored.taxonomies.clone());
    let samples = Int64Array::from_iter_values(counts.iter().map(|&c| c as i64));
    let table = RecordBatch::try_from_iter(vec![
        ("index", Arc::new(index) as ArrayRef),
        ("taxonomy", Arc::new(taxonomy) as ArrayRef),
        ("samples", Arc::new(samples) as ArrayRef),
    ])
    .context("building class table")?;
    println!("{}", pretty_format_batches(&[table])?);
    Ok(())
}

fn pixel_range(values: &[f32]) -> (f32, f32) {
    let mut lo = f32::INFINITY;
    let mut hi = f32::NEG_INFINITY;
    for &v in values {
        lo = lo.min(v);
        hi = hi.max(v);
    }
    (lo, hi)
}
