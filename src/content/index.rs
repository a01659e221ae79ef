//! Insertion-ordered name index

use rustc_hash::FxHashMap;

/// Ordered map from name to value.
///
/// Iteration follows insertion order; replacing a value keeps its slot.
#[derive(Debug, Clone)]
pub struct NameIndex<T> {
    /// Sequential order of entries
    entries: Vec<(String, T)>,
    /// Maps name to position in `entries`
    positions: FxHashMap<String, usize>,
}

impl<T> Default for NameIndex<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> NameIndex<T> {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            positions: FxHashMap::default(),
        }
    }

    /// Insert or replace. Returns the previous value if the name existed.
    pub fn insert(&mut self, name: &str, value: T) -> Option<T> {
        if let Some(&pos) = self.positions.get(name) {
            return Some(std::mem::replace(&mut self.entries[pos].1, value));
        }
        self.positions.insert(name.to_string(), self.entries.len());
        self.entries.push((name.to_string(), value));
        None
    }

    /// Get the value for `name`, appending `make()` if missing
    pub fn get_or_insert_with(&mut self, name: &str, make: impl FnOnce() -> T) -> &mut T {
        let pos = match self.positions.get(name) {
            Some(&pos) => pos,
            None => {
                let pos = self.entries.len();
                self.positions.insert(name.to_string(), pos);
                self.entries.push((name.to_string(), make()));
                pos
            }
        };
        &mut self.entries[pos].1
    }

    /// Remove an entry; later entries shift up by one
    pub fn remove(&mut self, name: &str) -> Option<T> {
        let pos = self.positions.remove(name)?;
        let (_, value) = self.entries.remove(pos);
        for (shifted, (entry_name, _)) in self.entries.iter().enumerate().skip(pos) {
            if let Some(slot) = self.positions.get_mut(entry_name) {
                *slot = shifted;
            }
        }
        Some(value)
    }

    pub fn get(&self, name: &str) -> Option<&T> {
        self.positions.get(name).map(|&pos| &self.entries[pos].1)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut T> {
        let pos = *self.positions.get(name)?;
        Some(&mut self.entries[pos].1)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.positions.contains_key(name)
    }

    /// Zero-based position of `name`
    pub fn position(&self, name: &str) -> Option<usize> {
        self.positions.get(name).copied()
    }

    /// Iterate in insertion order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &T)> + '_ {
        self.entries.iter().map(|(name, value)| (name.as_str(), value))
    }

    pub fn names(&self) -> impl Iterator<Item = &str> + '_ {
        self.entries.iter().map(|(name, _)| name.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_and_order() {
        let mut index = NameIndex::new();
        index.insert("b", 1);
        index.insert("a", 2);
        index.insert("c", 3);

        let names: Vec<_> = index.names().collect();
        assert_eq!(names, vec!["b", "a", "c"]);
        assert_eq!(index.position("c"), Some(2));
    }

    #[test]
    fn test_replace_keeps_slot() {
        let mut index = NameIndex::new();
        index.insert("a", 1);
        index.insert("b", 2);
        assert_eq!(index.insert("a", 10), Some(1));

        let entries: Vec<_> = index.iter().collect();
        assert_eq!(entries, vec![("a", &10), ("b", &2)]);
    }

    #[test]
    fn test_remove_shifts_positions() {
        let mut index = NameIndex::new();
        index.insert("a", 1);
        index.insert("b", 2);
        index.insert("c", 3);

        assert_eq!(index.remove("a"), Some(1));
        assert_eq!(index.position("b"), Some(0));
        assert_eq!(index.position("c"), Some(1));
        assert_eq!(index.get("c"), Some(&3));
        assert_eq!(index.remove("a"), None);
        assert_eq!(index.len(), 2);
    }

    #[test]
    fn test_get_or_insert_with() {
        let mut index: NameIndex<Vec<u8>> = NameIndex::new();
        index.get_or_insert_with("x", Vec::new).push(1);
        index.get_or_insert_with("x", Vec::new).push(2);
        assert_eq!(index.get("x"), Some(&vec![1, 2]));
        assert_eq!(index.len(), 1);
    }
}
