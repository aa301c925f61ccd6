//! Key indices: accumulating, frozen, and encountered views.
//!
//! Each dependency level exclusively owns its mutable indices while its files
//! stream through. When the level's files are exhausted the primary key index
//! is frozen into a shared immutable view for descendant levels; it is never
//! mutated again.

use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::sync::Arc;

use keycheck_model::{CompositeKey, FileType};

/// Accumulates the primary keys of one file type across all of its files.
///
/// Keys are tracked per physical file because duplicates can occur across
/// distinct files sharing one declared type.
#[derive(Debug)]
pub struct PrimaryKeyIndex {
    file_type: FileType,
    keys_by_file: BTreeMap<String, HashSet<CompositeKey>>,
}

impl PrimaryKeyIndex {
    pub fn new(file_type: FileType) -> Self {
        Self {
            file_type,
            keys_by_file: BTreeMap::new(),
        }
    }

    pub fn file_type(&self) -> &FileType {
        &self.file_type
    }

    /// Records a key seen in `file_name`. Duplicates are kept: later levels
    /// must see every live key, not just first occurrences.
    pub fn add(&mut self, file_name: &str, key: CompositeKey) {
        self.keys_by_file
            .entry(file_name.to_string())
            .or_default()
            .insert(key);
    }

    /// True when any file of this type contained `key`.
    pub fn contains(&self, key: &CompositeKey) -> bool {
        self.keys_by_file.values().any(|keys| keys.contains(key))
    }

    pub fn file_count(&self) -> usize {
        self.keys_by_file.len()
    }

    /// All distinct keys across all files, in sorted order.
    pub fn sorted_keys(&self) -> BTreeSet<&CompositeKey> {
        self.keys_by_file.values().flatten().collect()
    }

    /// First file, in name order, that contained `key`.
    pub fn file_of(&self, key: &CompositeKey) -> Option<&str> {
        self.keys_by_file
            .iter()
            .find(|(_, keys)| keys.contains(key))
            .map(|(name, _)| name.as_str())
    }
}

/// Read-only existence view over a parent type's finalized primary keys.
///
/// Absent when the parent type had no files in the submission: building the
/// view is not an error, lookups simply never match.
#[derive(Debug, Clone)]
pub struct ReferencedKeyIndex {
    parent: FileType,
    keys: Option<Arc<PrimaryKeyIndex>>,
}

impl ReferencedKeyIndex {
    pub fn frozen(parent: FileType, keys: Arc<PrimaryKeyIndex>) -> Self {
        Self {
            parent,
            keys: Some(keys),
        }
    }

    pub fn absent(parent: FileType) -> Self {
        Self { parent, keys: None }
    }

    pub fn parent(&self) -> &FileType {
        &self.parent
    }

    pub fn is_present(&self) -> bool {
        self.keys.is_some()
    }

    pub fn contains(&self, key: &CompositeKey) -> bool {
        self.keys.as_ref().is_some_and(|index| index.contains(key))
    }
}

/// Parent keys actually referenced by the child rows of one surjective
/// relation.
#[derive(Debug)]
pub struct EncounteredForeignKeyIndex {
    child: FileType,
    parent: FileType,
    keys: HashSet<CompositeKey>,
}

impl EncounteredForeignKeyIndex {
    pub fn new(child: FileType, parent: FileType) -> Self {
        Self {
            child,
            parent,
            keys: HashSet::new(),
        }
    }

    pub fn child(&self) -> &FileType {
        &self.child
    }

    pub fn parent(&self) -> &FileType {
        &self.parent
    }

    pub fn add(&mut self, key: CompositeKey) {
        self.keys.insert(key);
    }

    pub fn contains(&self, key: &CompositeKey) -> bool {
        self.keys.contains(key)
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::{EncounteredForeignKeyIndex, PrimaryKeyIndex, ReferencedKeyIndex};
    use keycheck_model::{CompositeKey, FileType, KeyInterner};
    use std::sync::Arc;

    fn key(value: &str, interner: &mut KeyInterner) -> CompositeKey {
        CompositeKey::from_values(&[value], interner)
    }

    #[test]
    fn contains_spans_all_files_of_the_type() {
        let mut interner = KeyInterner::new();
        let mut index = PrimaryKeyIndex::new(FileType::new("SAMPLE"));
        index.add("sample_1.txt", key("M100", &mut interner));
        index.add("sample_2.txt", key("M200", &mut interner));

        assert!(index.contains(&key("M100", &mut interner)));
        assert!(index.contains(&key("M200", &mut interner)));
        assert!(!index.contains(&key("M300", &mut interner)));
        assert_eq!(index.file_count(), 2);
    }

    #[test]
    fn file_of_prefers_name_order() {
        let mut interner = KeyInterner::new();
        let mut index = PrimaryKeyIndex::new(FileType::new("SAMPLE"));
        index.add("sample_2.txt", key("M100", &mut interner));
        index.add("sample_1.txt", key("M100", &mut interner));

        assert_eq!(index.file_of(&key("M100", &mut interner)), Some("sample_1.txt"));
    }

    #[test]
    fn sorted_keys_deduplicate_across_files() {
        let mut interner = KeyInterner::new();
        let mut index = PrimaryKeyIndex::new(FileType::new("SAMPLE"));
        index.add("sample_1.txt", key("M100", &mut interner));
        index.add("sample_2.txt", key("M100", &mut interner));
        index.add("sample_2.txt", key("M050", &mut interner));

        let keys: Vec<String> = index.sorted_keys().iter().map(|k| k.to_string()).collect();
        assert_eq!(keys, vec!["M050", "M100"]);
    }

    #[test]
    fn absent_view_never_matches() {
        let mut interner = KeyInterner::new();
        let absent = ReferencedKeyIndex::absent(FileType::new("DONOR"));
        assert!(!absent.is_present());
        assert!(!absent.contains(&key("D1", &mut interner)));

        let mut index = PrimaryKeyIndex::new(FileType::new("DONOR"));
        index.add("donor.txt", key("D1", &mut interner));
        let frozen = ReferencedKeyIndex::frozen(FileType::new("DONOR"), Arc::new(index));
        assert!(frozen.is_present());
        assert!(frozen.contains(&key("D1", &mut interner)));
    }

    #[test]
    fn encountered_keys_deduplicate() {
        let mut interner = KeyInterner::new();
        let mut encountered =
            EncounteredForeignKeyIndex::new(FileType::new("SPECIMEN"), FileType::new("DONOR"));
        encountered.add(key("D1", &mut interner));
        encountered.add(key("D1", &mut interner));
        assert_eq!(encountered.len(), 1);
        assert!(encountered.contains(&key("D1", &mut interner)));
    }
}
