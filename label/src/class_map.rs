use indexmap::IndexMap;
use std::collections::HashMap;

/// Bidirectional mapping between class names and numeric class ids.
///
/// Ids are assigned by the data source, so they need not be contiguous.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClassMap {
    name_to_id: IndexMap<String, usize>,
    id_to_name: HashMap<usize, String>,
}

/// A class name or id was bound to two different counterparts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassConflict {
    pub name: String,
    pub id: usize,
}

impl ClassMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a `(name, id)` pair.
    ///
    /// Registering the same pair twice is a no-op. Binding a known name to
    /// another id, or a known id to another name, is rejected.
    pub fn insert(&mut self, name: &str, id: usize) -> Result<(), ClassConflict> {
        let conflict = || ClassConflict {
            name: name.to_owned(),
            id,
        };

        match (self.name_to_id.get(name), self.id_to_name.get(&id)) {
            (Some(&known_id), _) if known_id != id => Err(conflict()),
            (_, Some(known_name)) if known_name != name => Err(conflict()),
            (Some(_), Some(_)) => Ok(()),
            _ => {
                self.name_to_id.insert(name.to_owned(), id);
                self.id_to_name.insert(id, name.to_owned());
                Ok(())
            }
        }
    }

    pub fn id_of(&self, name: &str) -> Option<usize> {
        self.name_to_id.get(name).copied()
    }

    pub fn name_of(&self, id: usize) -> Option<&str> {
        self.id_to_name.get(&id).map(String::as_str)
    }

    /// The number of class slots a classifier needs, `max(id) + 1`.
    pub fn num_classes(&self) -> usize {
        self.name_to_id
            .values()
            .max()
            .map(|&max_id| max_id + 1)
            .unwrap_or(0)
    }

    pub fn len(&self) -> usize {
        self.name_to_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.name_to_id.is_empty()
    }

    /// Iterate `(name, id)` pairs in registration order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, usize)> {
        self.name_to_id.iter().map(|(name, &id)| (name.as_str(), id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn class_map_lookup() {
        let mut classes = ClassMap::new();
        classes.insert("Tree", 0).unwrap();
        classes.insert("Snag", 2).unwrap();
        classes.insert("Tree", 0).unwrap();

        assert_eq!(classes.len(), 2);
        assert_eq!(classes.id_of("Snag"), Some(2));
        assert_eq!(classes.name_of(0), Some("Tree"));
        assert_eq!(classes.name_of(1), None);
        assert_eq!(classes.num_classes(), 3);
    }

    #[test]
    fn class_map_conflict() {
        let mut classes = ClassMap::new();
        classes.insert("Tree", 0).unwrap();
        assert!(classes.insert("Tree", 1).is_err());
        assert!(classes.insert("Snag", 0).is_err());
        assert_eq!(ClassMap::new().num_classes(), 0);
    }
}
