//! Property-based tests for lazyq using proptest.

use std::cell::Cell;
use std::collections::{HashMap, HashSet};

use lazyq::{Query, Value};
use lazyq_macros::Record;
use proptest::prelude::*;

#[derive(Debug, Clone, PartialEq, Record)]
struct TestItem {
    value: i64,
    name: String,
    active: bool,
}

// Strategy to generate test items
fn test_item_strategy() -> impl Strategy<Value = TestItem> {
    (any::<i64>(), "[a-z]{1,10}", any::<bool>()).prop_map(|(value, name, active)| TestItem {
        value,
        name,
        active,
    })
}

// ============================================================================
// Property tests
// ============================================================================

proptest! {
    /// Filter equals the input sub-sequence satisfying the predicate.
    #[test]
    fn filter_matches_std_filter(
        items in prop::collection::vec(any::<i64>(), 0..100),
        threshold in any::<i64>(),
    ) {
        let expected: Vec<i64> = items.iter().copied().filter(|n| *n > threshold).collect();
        let actual = Query::from_slice(&items).filter(|n| *n > threshold).to_vec().unwrap();
        prop_assert_eq!(actual, expected);
    }

    /// Distinct keeps each value at its first occurrence, in order.
    #[test]
    fn distinct_keeps_first_occurrences(
        items in prop::collection::vec(0u8..16, 0..100),
    ) {
        let mut seen = HashSet::new();
        let expected: Vec<u8> = items.iter().copied().filter(|n| seen.insert(*n)).collect();
        let actual = Query::from_slice(&items).distinct().to_vec().unwrap();
        prop_assert_eq!(actual, expected);
    }

    /// Filtering on a boolean field equals filtering on the field itself.
    #[test]
    fn filter_field_equals_closure(
        items in prop::collection::vec(test_item_strategy(), 0..50),
    ) {
        let by_name = Query::from_slice(&items).filter_field("active").to_vec().unwrap();
        let by_closure = Query::from_slice(&items).filter(|i| i.active).to_vec().unwrap();
        prop_assert_eq!(by_name, by_closure);
    }

    /// Draining the same pipeline twice yields the same result.
    #[test]
    fn pipelines_are_restartable(
        items in prop::collection::vec(test_item_strategy(), 0..50),
    ) {
        let query = Query::from_slice(&items)
            .filter(|i| i.value % 2 == 0)
            .select_field("name")
            .distinct();

        let mut first: Vec<Value> = Vec::new();
        let mut second: Vec<Value> = Vec::new();
        query.assign_to(&mut first).unwrap();
        query.assign_to(&mut second).unwrap();
        prop_assert_eq!(first, second);
    }

    /// Stopping after the first element pulls exactly one element.
    #[test]
    fn first_pulls_once(
        items in prop::collection::vec(any::<i64>(), 1..100),
    ) {
        let calls = Cell::new(0);
        let first = Query::from_slice(&items)
            .select(|n| {
                calls.set(calls.get() + 1);
                *n
            })
            .first()
            .unwrap();
        prop_assert_eq!(first, Some(Value::from(items[0])));
        prop_assert_eq!(calls.get(), 1);
    }

    /// List grouping matches a hand-built multimap, order included.
    #[test]
    fn list_grouping_matches_multimap(
        items in prop::collection::vec(test_item_strategy(), 0..50),
    ) {
        let mut expected: HashMap<bool, Vec<String>> = HashMap::new();
        for item in &items {
            expected.entry(item.active).or_default().push(item.name.clone());
        }

        let mut actual: HashMap<bool, Vec<String>> = HashMap::new();
        Query::from_slice(&items)
            .group_lists_field("name")
            .by_field("active")
            .assign_to_map(&mut actual)
            .unwrap();
        prop_assert_eq!(actual, expected);
    }

    /// Overwrite grouping keeps the last item per key.
    #[test]
    fn overwrite_grouping_keeps_last(
        items in prop::collection::vec(test_item_strategy(), 0..50),
    ) {
        let expected: HashMap<String, i64> = items
            .iter()
            .map(|item| (item.name.clone(), item.value))
            .collect();

        let mut actual: HashMap<String, i64> = HashMap::new();
        Query::from_slice(&items)
            .group_field("value")
            .by_field("name")
            .assign_to_map(&mut actual)
            .unwrap();
        prop_assert_eq!(actual, expected);
    }

    /// Count equals the length of the collected results.
    #[test]
    fn count_equals_to_vec_len(
        items in prop::collection::vec(test_item_strategy(), 0..50),
    ) {
        let query = Query::from_slice(&items).filter_field("active");
        prop_assert_eq!(query.count().unwrap(), query.to_vec().unwrap().len());
    }
}
