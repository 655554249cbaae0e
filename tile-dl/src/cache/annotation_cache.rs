//! Memoized spatial joins.

use crate::{common::*, join::LocalBox};

/// Stores the local boxes of every `(image, window index)` pair once joined.
///
/// Windows are fixed after setup and the join is deterministic, so entries
/// are never evicted. The key space is bounded by `#images x #windows`; the
/// cache is preallocated for it and reports if it is ever exceeded.
#[derive(Debug, Default)]
pub struct AnnotationCache {
    entries: HashMap<(String, usize), Vec<LocalBox>>,
    key_space: usize,
    overflow_reported: bool,
    miss_count: usize,
}

impl AnnotationCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a cache for at most `key_space` distinct keys.
    pub fn with_key_space(key_space: usize) -> Self {
        Self {
            entries: HashMap::with_capacity(key_space),
            key_space,
            ..Self::default()
        }
    }

    /// Get the boxes of a key, running `compute` only on the first request.
    ///
    /// A failed computation stores nothing, so a later call retries it.
    pub fn get_or_try_compute<F>(
        &mut self,
        image: &str,
        window_index: usize,
        compute: F,
    ) -> Result<&[LocalBox]>
    where
        F: FnOnce() -> Result<Vec<LocalBox>>,
    {
        let num_entries = self.entries.len();

        let boxes = match self.entries.entry((image.to_owned(), window_index)) {
            hash_map::Entry::Occupied(entry) => entry.into_mut(),
            hash_map::Entry::Vacant(entry) => {
                let boxes = compute()?;
                self.miss_count += 1;

                let overflow = self.key_space > 0 && num_entries >= self.key_space;
                if overflow && !self.overflow_reported {
                    warn!(
                        "annotation cache grows beyond its expected key space of {} entries",
                        self.key_space
                    );
                    self.overflow_reported = true;
                }

                entry.insert(boxes)
            }
        };

        Ok(boxes.as_slice())
    }

    /// The stored boxes of a key, if already computed.
    pub fn get(&self, image: &str, window_index: usize) -> Option<&[LocalBox]> {
        self.entries
            .get(&(image.to_owned(), window_index))
            .map(Vec::as_slice)
    }

    /// The number of joins computed so far.
    pub fn miss_count(&self) -> usize {
        self.miss_count
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn key_space(&self) -> usize {
        self.key_space
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn boxes(class: usize) -> Vec<LocalBox> {
        vec![LocalBox {
            rect: TLBR::from_tlbr([r64(0.0), r64(0.0), r64(10.0), r64(10.0)]),
            class,
        }]
    }

    #[test]
    fn compute_once_per_key() {
        let mut cache = AnnotationCache::with_key_space(4);
        let mut calls = 0;

        let first = cache
            .get_or_try_compute("a.tif", 0, || {
                calls += 1;
                Ok(boxes(1))
            })
            .unwrap()
            .to_vec();
        let second = cache
            .get_or_try_compute("a.tif", 0, || {
                calls += 1;
                Ok(boxes(2))
            })
            .unwrap()
            .to_vec();

        assert_eq!(first, second);
        assert_eq!(calls, 1);
        assert_eq!(cache.miss_count(), 1);

        cache
            .get_or_try_compute("a.tif", 1, || Ok(vec![]))
            .unwrap();
        assert_eq!(cache.len(), 2);
        assert_eq!(cache.get("a.tif", 1), Some(&[][..]));
        assert_eq!(cache.get("b.tif", 0), None);
    }

    #[test]
    fn report_key_space_overflow_once() {
        let mut cache = AnnotationCache::with_key_space(2);
        cache.get_or_try_compute("a.tif", 0, || Ok(boxes(0))).unwrap();
        cache.get_or_try_compute("a.tif", 1, || Ok(boxes(0))).unwrap();
        assert!(!cache.overflow_reported);

        cache.get_or_try_compute("b.tif", 0, || Ok(boxes(0))).unwrap();
        assert!(cache.overflow_reported);
        assert_eq!(cache.len(), 3);

        cache.get_or_try_compute("b.tif", 1, || Ok(boxes(0))).unwrap();
        assert!(cache.overflow_reported);
        assert_eq!(cache.len(), 4);
        assert_eq!(cache.miss_count(), 4);
    }

    #[test]
    fn unbounded_cache_never_overflows() {
        let mut cache = AnnotationCache::new();
        cache.get_or_try_compute("a.tif", 0, || Ok(vec![])).unwrap();
        assert!(!cache.overflow_reported);
    }

    #[test]
    fn errors_are_not_memoized() {
        let mut cache = AnnotationCache::new();
        let result = cache.get_or_try_compute("a.tif", 0, || {
            Err(Error::InvalidGeometry("degenerate".into()))
        });
        assert!(matches!(result, Err(Error::InvalidGeometry(_))));
        assert!(cache.is_empty());

        let retried = cache
            .get_or_try_compute("a.tif", 0, || Ok(boxes(0)))
            .unwrap();
        assert_eq!(retried.len(), 1);
    }
}
