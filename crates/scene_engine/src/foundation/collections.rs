//! Specialized collection types

/// Sparse slot table with a free list of reclaimed indices
///
/// New items take the most recently freed index first, otherwise the next
/// index past the end. Lookups of freed or never-allocated indices return
/// `None`.
#[derive(Debug)]
pub struct FreeList<T> {
    items: Vec<Option<T>>,
    free_indices: Vec<usize>,
}

impl<T> FreeList<T> {
    /// Create a new free list
    pub fn new() -> Self {
        Self {
            items: Vec::new(),
            free_indices: Vec::new(),
        }
    }

    /// Insert an item and return its index
    pub fn insert(&mut self, item: T) -> usize {
        if let Some(index) = self.free_indices.pop() {
            self.items[index] = Some(item);
            index
        } else {
            let index = self.items.len();
            self.items.push(Some(item));
            index
        }
    }

    /// Remove an item by index
    pub fn remove(&mut self, index: usize) -> Option<T> {
        let item = self.items.get_mut(index)?.take()?;
        self.free_indices.push(index);
        Some(item)
    }

    /// Get an item by index
    pub fn get(&self, index: usize) -> Option<&T> {
        self.items.get(index)?.as_ref()
    }

    /// Get a mutable reference to an item by index
    pub fn get_mut(&mut self, index: usize) -> Option<&mut T> {
        self.items.get_mut(index)?.as_mut()
    }

    /// Number of occupied slots
    pub fn len(&self) -> usize {
        self.items.len() - self.free_indices.len()
    }

    /// Whether no slot is occupied
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Occupied slots in ascending index order
    pub fn iter(&self) -> impl Iterator<Item = (usize, &T)> {
        self.items
            .iter()
            .enumerate()
            .filter_map(|(index, item)| item.as_ref().map(|item| (index, item)))
    }

    /// Remove every item, returning them in index order
    pub fn drain(&mut self) -> Vec<T> {
        self.free_indices.clear();
        self.items.drain(..).flatten().collect()
    }
}

impl<T> Default for FreeList<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reuses_most_recent_free_index() {
        let mut list = FreeList::new();
        assert_eq!(list.insert("a"), 0);
        assert_eq!(list.insert("b"), 1);
        assert_eq!(list.insert("c"), 2);

        assert_eq!(list.remove(1), Some("b"));
        assert_eq!(list.get(1), None);
        assert_eq!(list.insert("d"), 1);
        assert_eq!(list.insert("e"), 3);
    }

    #[test]
    fn test_double_remove_does_not_duplicate_free_index() {
        let mut list = FreeList::new();
        list.insert(10);
        assert_eq!(list.remove(0), Some(10));
        assert_eq!(list.remove(0), None);
        assert_eq!(list.remove(7), None);

        assert_eq!(list.insert(11), 0);
        assert_eq!(list.insert(12), 1);
    }

    #[test]
    fn test_iter_is_ascending_and_skips_holes() {
        let mut list = FreeList::new();
        for value in 0..4 {
            list.insert(value);
        }
        list.remove(2);
        let indices: Vec<usize> = list.iter().map(|(index, _)| index).collect();
        assert_eq!(indices, vec![0, 1, 3]);
        assert_eq!(list.len(), 3);
    }
}
