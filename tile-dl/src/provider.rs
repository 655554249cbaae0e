//! The sample façade consumed by training loops.

use crate::{
    annotation::AnnotationTable,
    cache::{AnnotationCache, TileCache},
    common::*,
    config::{Config, TilingConfig},
    join::{local_boxes_to_array, LocalBox, SpatialJoiner},
    raster::{crop_window, ChannelOrder, FileDecoder, RasterDecoder},
    sample::{SampleKey, SampleKeys},
    window::{Window, WindowIndex},
};

/// The capability set a detection training loop needs from a data source.
pub trait DetectionSource {
    /// The number of samples.
    fn size(&self) -> usize;

    /// The image of a sample as an `[h, w, 3]` array.
    fn crop(&mut self, index: usize) -> Result<Array3<u8>>;

    /// The boxes of a sample as an `[n, 5]` array of
    /// `xmin, ymin, xmax, ymax, class` rows.
    fn annotations(&mut self, index: usize) -> Result<Array2<f64>>;

    fn class_id_to_name(&self, id: usize) -> Result<&str>;

    fn name_to_class_id(&self, name: &str) -> Result<usize>;

    /// The number of class slots, `max(class id) + 1`.
    fn num_classes(&self) -> usize;
}

/// Serves window crops of large rasters along with their local boxes.
///
/// The window list is computed once at construction over the reference
/// raster, the first image of the annotation table. All rasters are assumed
/// to share its size and resolution.
#[derive(Debug)]
pub struct SampleProvider<D = FileDecoder> {
    windows: WindowIndex,
    joiner: SpatialJoiner,
    channel_order: ChannelOrder,
    table: AnnotationTable,
    keys: SampleKeys,
    tiles: TileCache<D>,
    annotations: AnnotationCache,
}

impl SampleProvider<FileDecoder> {
    /// Load the annotation table and sample keys named by the configuration.
    pub fn from_config(config: &Config) -> Result<Self> {
        let data = &config.data;
        let table = AnnotationTable::open(&data.annotations_file)?;
        let keys = SampleKeys::open(&data.sample_keys_file)?;
        let decoder = FileDecoder::new(&data.base_dir);
        Self::new(&config.tiling, table, keys, decoder)
    }
}

impl<D> SampleProvider<D>
where
    D: RasterDecoder,
{
    pub fn new(
        config: &TilingConfig,
        table: AnnotationTable,
        keys: SampleKeys,
        decoder: D,
    ) -> Result<Self> {
        config.validate()?;

        let reference = table
            .reference_image()
            .ok_or_else(|| Error::config("the annotation table is empty"))?;
        let raster_size = decoder.dimensions(reference)?;
        let windows = WindowIndex::compute(
            raster_size,
            config.patch_size.get(),
            config.patch_overlap,
        )?;

        if let Some((index, key)) = keys
            .iter()
            .enumerate()
            .find(|(_, key)| key.windows >= windows.len())
        {
            return Err(Error::config(format!(
                "sample {} refers to window {}, but only {} windows exist",
                index,
                key.windows,
                windows.len()
            )));
        }

        let key_space = keys.num_images() * windows.len();
        info!(
            "serving {} samples from {} windows per raster",
            keys.len(),
            windows.len()
        );

        Ok(Self {
            joiner: SpatialJoiner::from_config(config),
            channel_order: config.channel_order,
            windows,
            table,
            keys,
            tiles: TileCache::new(decoder),
            annotations: AnnotationCache::with_key_space(key_space),
        })
    }

    /// The local boxes of a sample.
    pub fn local_boxes(&mut self, index: usize) -> Result<Vec<LocalBox>> {
        let Self {
            windows,
            joiner,
            table,
            keys,
            annotations,
            ..
        } = self;

        let (key, window) = resolve(keys, windows, index)?;
        let boxes = annotations.get_or_try_compute(&key.image, key.windows, || {
            joiner.join(window, table.records_for(&key.image))
        })?;
        Ok(boxes.to_vec())
    }

    /// The width over height ratio of a sample's crop.
    pub fn image_aspect_ratio(&self, index: usize) -> Result<f64> {
        let (_, window) = resolve(&self.keys, &self.windows, index)?;
        Ok(window.size().cast::<f64>().aspect_ratio())
    }

    pub fn sample_key(&self, index: usize) -> Option<&SampleKey> {
        self.keys.get(index)
    }

    pub fn windows(&self) -> &WindowIndex {
        &self.windows
    }

    pub fn table(&self) -> &AnnotationTable {
        &self.table
    }

    pub fn tile_cache(&self) -> &TileCache<D> {
        &self.tiles
    }

    pub fn annotation_cache(&self) -> &AnnotationCache {
        &self.annotations
    }
}

impl<D> DetectionSource for SampleProvider<D>
where
    D: RasterDecoder,
{
    fn size(&self) -> usize {
        self.keys.len()
    }

    fn crop(&mut self, index: usize) -> Result<Array3<u8>> {
        let (key, window) = resolve(&self.keys, &self.windows, index)?;
        let raster = self.tiles.get(&key.image)?;
        crop_window(raster, window, self.channel_order)
    }

    fn annotations(&mut self, index: usize) -> Result<Array2<f64>> {
        let boxes = self.local_boxes(index)?;
        Ok(local_boxes_to_array(&boxes))
    }

    fn class_id_to_name(&self, id: usize) -> Result<&str> {
        self.table
            .classes()
            .name_of(id)
            .ok_or(Error::UnknownClassId(id))
    }

    fn name_to_class_id(&self, name: &str) -> Result<usize> {
        self.table
            .classes()
            .id_of(name)
            .ok_or_else(|| Error::UnknownClassName(name.to_owned()))
    }

    fn num_classes(&self) -> usize {
        self.table.classes().num_classes()
    }
}

fn resolve<'a>(
    keys: &'a SampleKeys,
    windows: &'a WindowIndex,
    index: usize,
) -> Result<(&'a SampleKey, &'a Window)> {
    let key = keys.get(index).ok_or(Error::UnknownSample(index))?;
    let window = windows.get(key.windows).ok_or_else(|| {
        Error::config(format!(
            "sample {} refers to unknown window {}",
            index, key.windows
        ))
    })?;
    Ok((key, window))
}
