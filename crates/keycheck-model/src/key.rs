//! Composite keys and per-run value interning.

use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

use serde::ser::SerializeSeq;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Interns raw field values for the duration of one validation run.
///
/// Equal values share one allocation, so index memory scales with the number
/// of distinct key values rather than the number of rows. The interner is
/// owned by a single run and dropped with it; nothing is process-global.
#[derive(Debug, Default)]
pub struct KeyInterner {
    values: HashSet<Arc<str>>,
}

impl KeyInterner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a shared handle for `value`, inserting it on first sight.
    pub fn intern(&mut self, value: &str) -> Arc<str> {
        if let Some(existing) = self.values.get(value) {
            return Arc::clone(existing);
        }
        let shared: Arc<str> = Arc::from(value);
        self.values.insert(Arc::clone(&shared));
        shared
    }

    /// Number of distinct values interned so far.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// A declared key index fell outside the width of a data row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndexOutOfRange {
    pub index: usize,
    pub width: usize,
}

/// An ordered tuple of raw field values acting as a primary or foreign key.
///
/// Equality is component-wise; ordering is lexicographic over components and
/// serves deterministic diagnostics, not correctness.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CompositeKey {
    values: Box<[Arc<str>]>,
}

impl CompositeKey {
    /// Builds a key from the row values at `indices`, interning each
    /// component. Fails fast when an index exceeds the row width.
    pub fn extract(
        row: &[String],
        indices: &[usize],
        interner: &mut KeyInterner,
    ) -> Result<Self, IndexOutOfRange> {
        let mut values = Vec::with_capacity(indices.len());
        for &index in indices {
            let value = row.get(index).ok_or(IndexOutOfRange {
                index,
                width: row.len(),
            })?;
            values.push(interner.intern(value));
        }
        Ok(Self {
            values: values.into_boxed_slice(),
        })
    }

    /// Builds a key directly from values, interning each component.
    pub fn from_values<S: AsRef<str>>(values: &[S], interner: &mut KeyInterner) -> Self {
        Self {
            values: values
                .iter()
                .map(|value| interner.intern(value.as_ref()))
                .collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn components(&self) -> impl Iterator<Item = &str> {
        self.values.iter().map(|value| &**value)
    }

    /// True when every component is the empty string, i.e. the row carried no
    /// value in any of the key's fields.
    pub fn is_blank(&self) -> bool {
        self.values.iter().all(|value| value.is_empty())
    }

    /// True for a single-component key holding the empty string.
    pub fn is_empty_value(&self) -> bool {
        self.values.len() == 1 && self.values[0].is_empty()
    }

    /// True when any component equals `sentinel` (the not-applicable code).
    pub fn has_component(&self, sentinel: &str) -> bool {
        self.values.iter().any(|value| &**value == sentinel)
    }
}

impl fmt::Display for CompositeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (position, value) in self.values.iter().enumerate() {
            if position > 0 {
                f.write_str("|")?;
            }
            f.write_str(value)?;
        }
        Ok(())
    }
}

impl Serialize for CompositeKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut seq = serializer.serialize_seq(Some(self.values.len()))?;
        for value in &self.values {
            seq.serialize_element(&**value)?;
        }
        seq.end()
    }
}

impl<'de> Deserialize<'de> for CompositeKey {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let values = Vec::<String>::deserialize(deserializer)?;
        Ok(Self {
            values: values.into_iter().map(Arc::<str>::from).collect(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::{CompositeKey, KeyInterner};
    use std::sync::Arc;

    #[test]
    fn interner_deduplicates() {
        let mut interner = KeyInterner::new();
        let first = interner.intern("D1");
        let second = interner.intern("D1");
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(interner.len(), 1);
    }

    #[test]
    fn extract_respects_indices() {
        let mut interner = KeyInterner::new();
        let row = vec!["a".to_string(), "b".to_string(), "c".to_string()];
        let key = CompositeKey::extract(&row, &[2, 0], &mut interner).expect("in range");
        assert_eq!(key.components().collect::<Vec<_>>(), vec!["c", "a"]);
    }

    #[test]
    fn extract_fails_out_of_range() {
        let mut interner = KeyInterner::new();
        let row = vec!["a".to_string()];
        let error = CompositeKey::extract(&row, &[3], &mut interner).expect_err("out of range");
        assert_eq!(error.index, 3);
        assert_eq!(error.width, 1);
    }

    #[test]
    fn ordering_is_lexicographic() {
        let mut interner = KeyInterner::new();
        let ab = CompositeKey::from_values(&["a", "b"], &mut interner);
        let ac = CompositeKey::from_values(&["a", "c"], &mut interner);
        let a = CompositeKey::from_values(&["a"], &mut interner);
        assert!(ab < ac);
        assert!(a < ab);
    }

    #[test]
    fn sentinel_and_blank_predicates() {
        let mut interner = KeyInterner::new();
        let sentinel = CompositeKey::from_values(&["-888"], &mut interner);
        assert!(sentinel.has_component("-888"));
        assert!(!sentinel.is_blank());

        let blank = CompositeKey::from_values(&["", ""], &mut interner);
        assert!(blank.is_blank());
        assert!(!blank.is_empty_value());

        let single_empty = CompositeKey::from_values(&[""], &mut interner);
        assert!(single_empty.is_empty_value());
    }

    #[test]
    fn serde_round_trip() {
        let mut interner = KeyInterner::new();
        let key = CompositeKey::from_values(&["D1", "S2"], &mut interner);
        let json = serde_json::to_string(&key).expect("serialize");
        assert_eq!(json, "[\"D1\",\"S2\"]");
        let parsed: CompositeKey = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(parsed, key);
    }
}
