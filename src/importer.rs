use std::collections::HashMap;
use std::path::PathBuf;

use anyhow::{Context, Result};

use crate::config::ImportConfig;
use crate::data::{loader, writer};

/// What a finished run produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportSummary {
    pub samples: usize,
    pub classes: usize,
    /// `(height, width, channels)` shared by every stored image.
    pub image_shape: [usize; 3],
    pub output: PathBuf,
}

/// Collect, validate and persist in one pass.
pub fn run(config: &ImportConfig) -> Result<ImportSummary> {
    log::info!("Scanning {}", config.input.display());
    if let Some(size) = config.resize {
        log::info!("Resizing every image to {size}");
    }
    let dataset = loader::collect(&config.input, config.resize, config.listing_order)?;

    // Check that we imported everything equally.
    dataset.validate()?;
    let image_shape = dataset.image_shape().context("dataset has no images")?;

    let mut metadata = HashMap::new();
    metadata.insert(
        writer::CONFIG_KEY.to_string(),
        serde_json::to_string(config).context("serializing import config")?,
    );

    log::info!(
        "Saving {} samples ({} classes) to {} ...",
        dataset.len(),
        dataset.num_classes(),
        config.output.display()
    );
    writer::write_container(&dataset, &config.output, &config.writer, metadata)?;
    log::info!("... Done");

    Ok(ImportSummary {
        samples: dataset.len(),
        classes: dataset.num_classes(),
        image_shape,
        output: config.output.clone(),
    })
}
