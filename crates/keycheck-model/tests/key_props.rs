//! Property tests for composite key ordering and interning.

use proptest::prelude::*;

use keycheck_model::{CompositeKey, KeyInterner};

proptest! {
    /// Key ordering must agree with plain lexicographic ordering of the
    /// component vectors, including the length tie-break.
    #[test]
    fn ordering_matches_components(
        a in proptest::collection::vec("[a-z0-9]{0,6}", 1..4),
        b in proptest::collection::vec("[a-z0-9]{0,6}", 1..4),
    ) {
        let mut interner = KeyInterner::new();
        let key_a = CompositeKey::from_values(&a, &mut interner);
        let key_b = CompositeKey::from_values(&b, &mut interner);
        prop_assert_eq!(key_a.cmp(&key_b), a.cmp(&b));
        prop_assert_eq!(key_a == key_b, a == b);
    }

    /// Interning never changes the observable component values.
    #[test]
    fn interning_preserves_values(values in proptest::collection::vec(".{0,8}", 1..5)) {
        let mut interner = KeyInterner::new();
        let key = CompositeKey::from_values(&values, &mut interner);
        let observed: Vec<&str> = key.components().collect();
        prop_assert_eq!(observed, values.iter().map(String::as_str).collect::<Vec<_>>());
    }

    /// Equal keys built twice share interned storage: the distinct value
    /// count is bounded by the number of distinct components.
    #[test]
    fn interner_is_bounded_by_distinct_values(values in proptest::collection::vec("[a-c]{1,2}", 1..6)) {
        let mut interner = KeyInterner::new();
        let _first = CompositeKey::from_values(&values, &mut interner);
        let _second = CompositeKey::from_values(&values, &mut interner);
        let distinct: std::collections::BTreeSet<&String> = values.iter().collect();
        prop_assert_eq!(interner.len(), distinct.len());
    }
}
