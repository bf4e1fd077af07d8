//! Property tests: deep copies are equal to, and independent of, their source.

use isomer_core::{Array, Dimension, Isomer, deep_clone, deep_equal};
use proptest::prelude::*;
use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;

#[derive(Debug, Clone, Isomer)]
struct Record {
    id: u64,
    name: String,
    ratio: f64,
    tags: Vec<String>,
    scores: BTreeMap<String, i32>,
}

// ---------------------------------------------------------------------------
// Strategies
// ---------------------------------------------------------------------------

fn arb_record() -> impl Strategy<Value = Record> {
    (
        any::<u64>(),
        "[a-z]{0,12}",
        any::<f64>(),
        prop::collection::vec("[a-z]{1,6}", 0..6),
        prop::collection::btree_map("[a-z]{1,4}", any::<i32>(), 0..6),
    )
        .prop_map(|(id, name, ratio, tags, scores)| Record {
            id,
            name,
            ratio,
            tags,
            scores,
        })
}

/// Shape with up to three axes and arbitrary lower bounds.
fn arb_dimensions() -> impl Strategy<Value = Vec<Dimension>> {
    prop::collection::vec((0usize..4, -5isize..5), 1..4)
        .prop_map(|axes| axes.into_iter().map(|(len, lower)| Dimension::new(len, lower)).collect())
}

// ---------------------------------------------------------------------------
// Properties
// ---------------------------------------------------------------------------

proptest! {
    /// Every record equals itself, including records holding NaN.
    #[test]
    fn equality_is_reflexive(record in arb_record()) {
        prop_assert!(deep_equal(&record, &record.clone()));
    }

    #[test]
    fn clone_equals_source(records in prop::collection::vec(arb_record(), 0..8)) {
        let copy = deep_clone(&records).unwrap();
        prop_assert!(deep_equal(&records, &copy));
    }

    /// Mutating a clone never shows through to the source.
    #[test]
    fn clone_is_isolated(record in arb_record(), suffix in "[A-Z]{1,4}") {
        let source = Rc::new(RefCell::new(record));
        let copy = deep_clone(&source).unwrap();

        copy.borrow_mut().name.push_str(&suffix);
        copy.borrow_mut().tags.push(suffix.clone());

        prop_assert!(!source.borrow().name.ends_with(&suffix));
        prop_assert!(!deep_equal(&source, &copy));
    }

    #[test]
    fn immutable_text_is_returned_as_is(text in ".*") {
        let shared: Rc<str> = Rc::from(text.as_str());
        let copy = deep_clone(&shared).unwrap();
        prop_assert!(Rc::ptr_eq(&shared, &copy));
    }

    #[test]
    fn arrays_keep_their_shape(dims in arb_dimensions()) {
        let array = Array::try_from_fn(dims, |index| {
            Ok::<_, isomer_core::IsomerError>(index.iter().map(|i| i.to_string()).collect::<Vec<_>>().join(","))
        })
        .unwrap();

        let copy = deep_clone(&array).unwrap();
        prop_assert_eq!(copy.dimensions(), array.dimensions());
        for index in array.indices() {
            prop_assert_eq!(copy.get(&index), array.get(&index));
        }
        prop_assert!(deep_equal(&array, &copy));
    }

    /// A list referencing one node many times clones to a list referencing one node.
    #[test]
    fn sharing_is_preserved(record in arb_record(), repeats in 1usize..6) {
        let node = Rc::new(RefCell::new(record));
        let list = vec![Rc::clone(&node); repeats];

        let copy = deep_clone(&list).unwrap();
        prop_assert!(copy.iter().all(|item| Rc::ptr_eq(item, &copy[0])));
        prop_assert!(!Rc::ptr_eq(&copy[0], &node));
    }
}
