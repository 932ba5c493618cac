use std::path::PathBuf;

use clap::Parser;
use taxonomy_import::{CompressionAlgorithm, ImageSize, ImportConfig, ListingOrder, WriterOptions};

/// Import a folder of labeled JPEG images into one compressed dataset file.
///
/// Every subdirectory of FOLDER is a class; every `*.jpg` inside it becomes
/// one sample with a one-hot label.
#[derive(Debug, Parser)]
#[command(name = "taxonomy-import", version, about)]
struct Cli {
    /// Folder holding one subdirectory per class.
    folder: PathBuf,

    /// Output dataset file.
    #[arg(
        short = 'o',
        long = "out",
        value_name = "FILE",
        default_value = "imported_data.parquet"
    )]
    out: PathBuf,

    /// Resize every image to N (square) or WxH pixels.
    #[arg(long, value_name = "SIZE")]
    resize: Option<ImageSize>,

    /// Enumeration order of classes and files.
    #[arg(long, value_enum, default_value_t = ListingOrder::Sorted)]
    listing_order: ListingOrder,

    #[arg(long, value_enum, default_value_t = CompressionAlgorithm::Gzip)]
    compression: CompressionAlgorithm,

    /// Gzip compression level.
    #[arg(long, default_value_t = 9, value_parser = clap::value_parser!(u32).range(0..=9))]
    compression_level: u32,
}

impl From<Cli> for ImportConfig {
    fn from(cli: Cli) -> Self {
        ImportConfig {
            input: cli.folder,
            output: cli.out,
            resize: cli.resize,
            listing_order: cli.listing_order,
            writer: WriterOptions {
                compression_algorithm: cli.compression,
                compression_level: cli.compression_level,
            },
        }
    }
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = ImportConfig::from(Cli::parse());
    log::debug!("{config:?}");

    let summary = taxonomy_import::run(&config)?;
    log::info!(
        "Wrote {} images of shape {:?} in {} classes to {}",
        summary.samples,
        summary.image_shape,
        summary.classes,
        summary.output.display()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_reference_importer() {
        let cli = Cli::try_parse_from(["taxonomy-import", "Images"]).unwrap();
        let config = ImportConfig::from(cli);
        assert_eq!(config.input, PathBuf::from("Images"));
        assert_eq!(config.output, PathBuf::from("imported_data.parquet"));
        assert_eq!(config.resize, None);
        assert_eq!(config.listing_order, ListingOrder::Sorted);
        assert_eq!(config.writer, WriterOptions::default());
    }

    #[test]
    fn accepts_short_and_long_output_flags() {
        for args in [
            vec!["taxonomy-import", "-o", "x.parquet", "Images"],
            vec!["taxonomy-import", "--out=x.parquet", "Images"],
        ] {
            let cli = Cli::try_parse_from(args).unwrap();
            assert_eq!(cli.out, PathBuf::from("x.parquet"));
        }
    }

    #[test]
    fn parses_resize_and_rejects_bad_level() {
        let cli = Cli::try_parse_from(["taxonomy-import", "--resize", "32", "Images"]).unwrap();
        assert_eq!(cli.resize, Some(ImageSize::square(32)));

        assert!(
            Cli::try_parse_from(["taxonomy-import", "--compression-level", "12", "Images"])
                .is_err()
        );
    }

    #[test]
    fn compression_none_disables_gzip() {
        let args = ["taxonomy-import", "--compression", "none", "Images"];
        let config = ImportConfig::from(Cli::try_parse_from(args).unwrap());
        assert_eq!(
            config.writer.compression_algorithm,
            CompressionAlgorithm::Uncompressed
        );
    }

    #[test]
    fn folder_is_required() {
        assert!(Cli::try_parse_from(["taxonomy-import"]).is_err());
    }

    #[test]
    fn cli_definition_is_consistent() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
