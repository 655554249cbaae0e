//! The caller-supplied sample index mapping.

use crate::common::*;

/// Addresses one training sample: a window of a source raster.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SampleKey {
    /// The file name of the source raster.
    pub image: String,
    /// The window index into the shared window list.
    pub windows: usize,
}

/// The ordered list of sample keys. Sample `i` is the `i`-th key.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SampleKeys {
    keys: Vec<SampleKey>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum SampleKeysRepr {
    List(Vec<SampleKey>),
    Map(IndexMap<String, SampleKey>),
}

impl SampleKeys {
    pub fn new(keys: Vec<SampleKey>) -> Self {
        Self { keys }
    }

    /// Load keys from a JSON or JSON5 file.
    ///
    /// The file holds either an array of keys, or an object whose values are
    /// keys taken in document order.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)?;
        let keys = Self::parse(&text).map_err(|err| match err {
            Error::Configuration(msg) => {
                Error::Configuration(format!("{} in '{}'", msg, path.display()))
            }
            err => err,
        })?;
        info!("loaded {} sample keys from '{}'", keys.len(), path.display());
        Ok(keys)
    }

    pub fn parse(text: &str) -> Result<Self> {
        let repr: SampleKeysRepr = json5::from_str(text)
            .map_err(|err| Error::config(format!("malformed sample keys: {}", err)))?;
        let keys = match repr {
            SampleKeysRepr::List(keys) => keys,
            SampleKeysRepr::Map(map) => map.into_values().collect(),
        };
        Ok(Self { keys })
    }

    pub fn get(&self, index: usize) -> Option<&SampleKey> {
        self.keys.get(index)
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &SampleKey> {
        self.keys.iter()
    }

    /// The number of distinct images referenced by the keys.
    pub fn num_images(&self) -> usize {
        self.keys.iter().map(|key| key.image.as_str()).unique().count()
    }
}

impl FromIterator<SampleKey> for SampleKeys {
    fn from_iter<T: IntoIterator<Item = SampleKey>>(iter: T) -> Self {
        Self::new(iter.into_iter().collect())
    }
}
