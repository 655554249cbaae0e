use anyhow::{anyhow, Context, Result};
use bbox::{prelude::*, HW};
use clap::Parser;
use log::info;
use noisy_float::prelude::*;
use prettytable::{cell, row, Table};
use std::{
    fs::File,
    io::BufWriter,
    path::{Path, PathBuf},
};
use tile_dl::{
    crop_to_image, AnnotationTable, Config, DetectionSource, FileDecoder, RasterDecoder,
    SampleKey, SampleProvider, WindowIndex,
};

#[derive(Debug, Clone, Parser)]
enum Opts {
    /// List the windows of a raster
    Windows {
        /// raster file
        raster_file: PathBuf,
        /// window side length in pixels
        #[clap(long, default_value = "400")]
        patch_size: usize,
        /// fraction of the window shared by neighbours
        #[clap(long, default_value = "0.05")]
        overlap: f64,
    },
    /// Write a sample key for every window of every annotated raster
    MakeKeys {
        /// configuration file
        config_file: PathBuf,
        /// output JSON file
        output_file: PathBuf,
    },
    /// Print the local boxes of a sample
    Inspect {
        /// configuration file
        config_file: PathBuf,
        /// sample index
        index: usize,
    },
    /// Save the crop of a sample as an image
    Crop {
        /// configuration file
        config_file: PathBuf,
        /// sample index
        index: usize,
        /// output image file
        output_file: PathBuf,
    },
}

fn main() -> Result<()> {
    pretty_env_logger::init();

    match Opts::parse() {
        Opts::Windows {
            raster_file,
            patch_size,
            overlap,
        } => {
            windows(raster_file, patch_size, overlap)?;
        }
        Opts::MakeKeys {
            config_file,
            output_file,
        } => {
            make_keys(config_file, output_file)?;
        }
        Opts::Inspect { config_file, index } => {
            inspect(config_file, index)?;
        }
        Opts::Crop {
            config_file,
            index,
            output_file,
        } => {
            crop(config_file, index, output_file)?;
        }
    }

    Ok(())
}

fn open_config(config_file: &Path) -> Result<Config> {
    Config::open(config_file)
        .with_context(|| format!("failed to load config file '{}'", config_file.display()))
}

fn windows(raster_file: impl AsRef<Path>, patch_size: usize, overlap: f64) -> Result<()> {
    let raster_file = raster_file.as_ref();
    let overlap = R64::try_new(overlap).ok_or_else(|| anyhow!("overlap must be finite"))?;
    let imagesize::ImageSize { width, height } = imagesize::size(raster_file)
        .map_err(|err| anyhow!("failed to read size of '{}': {:?}", raster_file.display(), err))?;
    let windows = WindowIndex::compute(HW::from_hw([height, width]), patch_size, overlap)?;

    let mut table = Table::new();
    table.add_row(row!["index", "x", "y", "width", "height"]);
    windows.windows().iter().enumerate().for_each(|(index, window)| {
        table.add_row(row![index, window.x, window.y, window.width, window.height]);
    });
    table.printstd();

    println!(
        "{} windows over a {}x{} raster",
        windows.len(),
        width,
        height
    );

    Ok(())
}

fn make_keys(config_file: impl AsRef<Path>, output_file: impl AsRef<Path>) -> Result<()> {
    let config = open_config(config_file.as_ref())?;
    let output_file = output_file.as_ref();
    let data = &config.data;

    let table = AnnotationTable::open(&data.annotations_file).with_context(|| {
        format!(
            "failed to load annotations '{}'",
            data.annotations_file.display()
        )
    })?;
    let reference = table
        .reference_image()
        .ok_or_else(|| anyhow!("no annotated images found"))?;
    let raster_size = FileDecoder::new(&data.base_dir).dimensions(reference)?;
    let windows = WindowIndex::compute(
        raster_size,
        config.tiling.patch_size.get(),
        config.tiling.patch_overlap,
    )?;

    let keys: Vec<_> = table
        .images()
        .flat_map(|image| {
            (0..windows.len()).map(move |index| SampleKey {
                image: image.to_owned(),
                windows: index,
            })
        })
        .collect();

    let writer = BufWriter::new(
        File::create(output_file)
            .with_context(|| format!("failed to create '{}'", output_file.display()))?,
    );
    serde_json::to_writer_pretty(writer, &keys)?;
    info!(
        "wrote {} sample keys to '{}'",
        keys.len(),
        output_file.display()
    );

    Ok(())
}

fn inspect(config_file: impl AsRef<Path>, index: usize) -> Result<()> {
    let config = open_config(config_file.as_ref())?;
    let mut provider = SampleProvider::from_config(&config)?;

    let key = provider
        .sample_key(index)
        .ok_or_else(|| anyhow!("sample {} does not exist", index))?
        .clone();
    let window = *provider
        .windows()
        .get(key.windows)
        .ok_or_else(|| anyhow!("window {} does not exist", key.windows))?;
    println!(
        "sample {}: '{}' window {} at ({}, {}) size {}x{}",
        index, key.image, key.windows, window.x, window.y, window.width, window.height
    );

    let boxes = provider.local_boxes(index)?;
    let mut table = Table::new();
    table.add_row(row!["xmin", "ymin", "xmax", "ymax", "class", "name"]);
    for local in &boxes {
        let name = provider.class_id_to_name(local.class)?;
        table.add_row(row![
            local.rect.l(),
            local.rect.t(),
            local.rect.r(),
            local.rect.b(),
            local.class,
            name
        ]);
    }
    table.printstd();

    Ok(())
}

fn crop(config_file: impl AsRef<Path>, index: usize, output_file: impl AsRef<Path>) -> Result<()> {
    let config = open_config(config_file.as_ref())?;
    let output_file = output_file.as_ref();
    let mut provider = SampleProvider::from_config(&config)?;

    let crop = provider.crop(index)?;
    let image = crop_to_image(&crop, config.tiling.channel_order)?;
    image
        .save(output_file)
        .with_context(|| format!("failed to save '{}'", output_file.display()))?;
    info!("saved sample {} to '{}'", index, output_file.display());

    Ok(())
}
