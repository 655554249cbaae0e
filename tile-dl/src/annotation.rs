//! Ground truth boxes in global raster coordinates.

use crate::common::*;

/// One box of the annotation table, in the pixel frame of its source raster.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AnnotationRecord {
    /// The file name of the source raster.
    #[serde(
        rename = "rgb_path",
        alias = "source_image_filename",
        alias = "image_path"
    )]
    pub image: String,
    #[serde(rename = "origin_xmin")]
    pub xmin: R64,
    #[serde(rename = "origin_ymin")]
    pub ymin: R64,
    #[serde(rename = "origin_xmax")]
    pub xmax: R64,
    #[serde(rename = "origin_ymax")]
    pub ymax: R64,
    /// The class name.
    pub label: String,
    /// The numeric class id.
    #[serde(rename = "numeric_label")]
    pub class: usize,
}

impl AnnotationRecord {
    /// The box rectangle, failing unless `xmin < xmax` and `ymin < ymax`.
    pub fn rect(&self) -> Result<TLBR<R64>> {
        let Self {
            xmin,
            ymin,
            xmax,
            ymax,
            ..
        } = *self;

        TLBR::try_from_tlbr([ymin, xmin, ymax, xmax])
            .ok()
            .filter(|rect| rect.is_proper())
            .ok_or_else(|| {
                Error::geometry(format!(
                    "box ({}, {}, {}, {}) of '{}' must satisfy xmin < xmax and ymin < ymax",
                    xmin, ymin, xmax, ymax, self.image
                ))
            })
    }
}

/// The annotation table grouped by source raster.
#[derive(Debug, Clone, Default)]
pub struct AnnotationTable {
    by_image: IndexMap<String, Vec<AnnotationRecord>>,
    classes: ClassMap,
}

impl AnnotationTable {
    /// Load a CSV annotation table.
    ///
    /// The header must name the `rgb_path`, `origin_xmin`, `origin_ymin`,
    /// `origin_xmax`, `origin_ymax`, `label` and `numeric_label` columns.
    /// Other columns are ignored and lines starting with `#` are skipped.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        let records: Vec<AnnotationRecord> = ::csv::ReaderBuilder::new()
            .has_headers(true)
            .comment(Some(b'#'))
            .from_path(path)?
            .deserialize()
            .collect::<Result<_, _>>()?;

        let table = Self::from_records(records)?;
        info!(
            "loaded {} boxes over {} images from '{}'",
            table.num_records(),
            table.num_images(),
            path.display()
        );
        Ok(table)
    }

    /// Build the table, validating every box and the class name bindings.
    pub fn from_records(records: impl IntoIterator<Item = AnnotationRecord>) -> Result<Self> {
        let mut by_image: IndexMap<String, Vec<AnnotationRecord>> = IndexMap::new();
        let mut classes = ClassMap::new();

        for record in records {
            record.rect()?;
            classes.insert(&record.label, record.class).map_err(|conflict| {
                Error::config(format!(
                    "class '{}' and id {} conflict with an earlier binding",
                    conflict.name, conflict.id
                ))
            })?;
            by_image
                .entry(record.image.clone())
                .or_default()
                .push(record);
        }

        Ok(Self { by_image, classes })
    }

    /// The first distinct image of the table.
    pub fn reference_image(&self) -> Option<&str> {
        self.by_image.keys().next().map(String::as_str)
    }

    /// The records of one image, empty if the image has no boxes.
    pub fn records_for(&self, image: &str) -> &[AnnotationRecord] {
        self.by_image
            .get(image)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    pub fn images(&self) -> impl Iterator<Item = &str> {
        self.by_image.keys().map(String::as_str)
    }

    pub fn num_images(&self) -> usize {
        self.by_image.len()
    }

    pub fn num_records(&self) -> usize {
        self.by_image.values().map(Vec::len).sum()
    }

    pub fn classes(&self) -> &ClassMap {
        &self.classes
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write as _;

    fn record(image: &str, xyxy: [f64; 4], label: &str, class: usize) -> AnnotationRecord {
        let [xmin, ymin, xmax, ymax] = xyxy;
        AnnotationRecord {
            image: image.to_owned(),
            xmin: r64(xmin),
            ymin: r64(ymin),
            xmax: r64(xmax),
            ymax: r64(ymax),
            label: label.to_owned(),
            class,
        }
    }

    #[test]
    fn group_by_image_in_first_seen_order() {
        let table = AnnotationTable::from_records(vec![
            record("b.tif", [0.0, 0.0, 5.0, 5.0], "Tree", 0),
            record("a.tif", [1.0, 1.0, 5.0, 5.0], "Tree", 0),
            record("b.tif", [2.0, 2.0, 6.0, 6.0], "Snag", 1),
        ])
        .unwrap();

        assert_eq!(table.reference_image(), Some("b.tif"));
        assert_eq!(table.images().collect::<Vec<_>>(), vec!["b.tif", "a.tif"]);
        assert_eq!(table.records_for("b.tif").len(), 2);
        assert!(table.records_for("missing.tif").is_empty());
        assert_eq!(table.num_records(), 3);
        assert_eq!(table.classes().num_classes(), 2);
    }

    #[test]
    fn reject_degenerate_box() {
        let result =
            AnnotationTable::from_records(vec![record("a.tif", [5.0, 0.0, 5.0, 5.0], "Tree", 0)]);
        assert!(matches!(result, Err(Error::InvalidGeometry(_))));
    }

    #[test]
    fn box_rect_requires_positive_extent() {
        let rect = record("a.tif", [1.0, 2.0, 5.0, 8.0], "Tree", 0).rect().unwrap();
        assert_eq!(rect.xyxy(), [1.0, 2.0, 5.0, 8.0]);

        let inverted = record("a.tif", [1.0, 8.0, 5.0, 2.0], "Tree", 0);
        assert!(matches!(inverted.rect(), Err(Error::InvalidGeometry(_))));
        let flat = record("a.tif", [1.0, 2.0, 5.0, 2.0], "Tree", 0);
        assert!(matches!(flat.rect(), Err(Error::InvalidGeometry(_))));
    }

    #[test]
    fn reject_conflicting_class_ids() {
        let result = AnnotationTable::from_records(vec![
            record("a.tif", [0.0, 0.0, 5.0, 5.0], "Tree", 0),
            record("a.tif", [0.0, 0.0, 5.0, 5.0], "Tree", 1),
        ]);
        assert!(matches!(result, Err(Error::Configuration(_))));
    }

    #[test]
    fn load_csv_table() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            ",rgb_path,origin_xmin,origin_ymin,origin_xmax,origin_ymax,label,numeric_label,site"
        )
        .unwrap();
        writeln!(file, "# exported from the field survey").unwrap();
        writeln!(file, "0,tile_a.tif,10.5,20,30,40.25,Tree,0,SJER").unwrap();
        writeln!(file, "1,tile_a.tif,50,60,70,80,Tree,0,SJER").unwrap();
        file.flush().unwrap();

        let table = AnnotationTable::open(file.path()).unwrap();
        let records = table.records_for("tile_a.tif");
        assert_eq!(records.len(), 2);
        assert_eq!(records[0], record("tile_a.tif", [10.5, 20.0, 30.0, 40.25], "Tree", 0));
    }
}
