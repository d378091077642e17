//! Name → handle lookup tables.
//!
//! Built once while resolving; later passes carry the handles and never go
//! back to string lookup.

use std::collections::BTreeMap;

use hc_core::Id;

/// Name index for one scope (a table, or one component's sub-components).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NameIndex {
    lookup: BTreeMap<String, Id>,
}

impl NameIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Index the names of a table in declaration order, handle = position.
    ///
    /// Returns the index plus every name that appeared more than once; the
    /// first occurrence keeps the name.
    pub fn from_names<'a>(names: impl IntoIterator<Item = &'a str>) -> (Self, Vec<String>) {
        let mut index = NameIndex::new();
        let mut duplicates = Vec::new();
        for (i, name) in names.into_iter().enumerate() {
            if index.insert(name, Id::from_index(i as u32)).is_err() {
                duplicates.push(name.to_string());
            }
        }
        (index, duplicates)
    }

    /// Insert `name`; on a duplicate the existing handle is kept and returned as the error.
    pub fn insert(&mut self, name: impl Into<String>, id: Id) -> Result<(), Id> {
        use std::collections::btree_map::Entry;
        match self.lookup.entry(name.into()) {
            Entry::Occupied(existing) => Err(*existing.get()),
            Entry::Vacant(slot) => {
                slot.insert(id);
                Ok(())
            }
        }
    }

    pub fn get(&self, name: &str) -> Option<Id> {
        self.lookup.get(name).copied()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.lookup.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.lookup.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lookup.is_empty()
    }

    /// Entries sorted by name.
    pub fn iter(&self) -> impl Iterator<Item = (&str, Id)> {
        self.lookup.iter().map(|(name, id)| (name.as_str(), *id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_names_assigns_positions() {
        let (index, duplicates) = NameIndex::from_names(["a", "b", "c"]);
        assert!(duplicates.is_empty());
        assert_eq!(index.get("a").map(Id::index), Some(0));
        assert_eq!(index.get("c").map(Id::index), Some(2));
        assert_eq!(index.get("d"), None);
    }

    #[test]
    fn duplicates_keep_first_occurrence() {
        let (index, duplicates) = NameIndex::from_names(["a", "b", "a"]);
        assert_eq!(duplicates, ["a"]);
        assert_eq!(index.get("a").map(Id::index), Some(0));
        assert_eq!(index.len(), 2);
    }
}
