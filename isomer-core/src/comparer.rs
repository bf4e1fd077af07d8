use std::any::type_name;

use rustc_hash::FxHashSet;

use crate::array::Array;
use crate::fields::{FieldComparer, FieldDescriptor, Fields};
use crate::isomer::{AnyIsomer, Isomer};
use crate::shared::Shared;

/// Traversal context for one deep-equality call.
///
/// Remembers every pair of shared nodes already entered. Meeting a pair again
/// counts as equal without descending, which terminates cycles: a pair is only
/// reported unequal by the comparison that first entered it.
#[derive(Debug, Default)]
pub struct GraphComparer {
    visited: FxHashSet<(usize, usize)>,
}

impl GraphComparer {
    pub fn new() -> Self {
        GraphComparer {
            visited: FxHashSet::default(),
        }
    }

    /// Compares two values within this traversal.
    pub fn equal<T: Isomer>(&mut self, a: &T, b: &T) -> bool {
        std::ptr::eq(a, b) || a.eq_with(b, self)
    }

    pub fn equal_records<T: Fields>(&mut self, a: &T, b: &T) -> bool {
        a.compare_fields(b, self)
    }

    /// Element-wise comparison of two sequences of equal length.
    pub fn equal_elements<'a, T: Isomer>(
        &mut self,
        a: impl ExactSizeIterator<Item = &'a T>,
        b: impl ExactSizeIterator<Item = &'a T>,
    ) -> bool {
        a.len() == b.len() && a.zip(b).all(|(x, y)| self.equal(x, y))
    }

    /// Compares rank, lengths and lower bounds, then elements.
    pub fn equal_arrays<T: Isomer>(&mut self, a: &Array<T>, b: &Array<T>) -> bool {
        a.dimensions() == b.dimensions() && self.equal_elements(a.iter(), b.iter())
    }

    /// Compares the nodes behind two shared handles.
    pub fn equal_shared<H: Shared>(&mut self, a: &H, b: &H) -> bool {
        let pair = (a.address(), b.address());
        if pair.0 == pair.1 {
            return true;
        }
        if !self.visited.insert(pair) {
            log::trace!("pair {:#x}/{:#x} already entered", pair.0, pair.1);
            return true;
        }

        match a.with_ref(|x| b.with_ref(|y| self.equal(x, y))) {
            Ok(Ok(equal)) => equal,
            Ok(Err(err)) | Err(err) => {
                log::warn!("comparing {} as unequal: {}", type_name::<H>(), err);
                false
            }
        }
    }

    /// Compares values whose concrete types are only known at runtime.
    ///
    /// Values of different concrete types are never equal.
    pub fn equal_dyn(&mut self, a: &dyn AnyIsomer, b: &dyn AnyIsomer) -> bool {
        a.as_any().type_id() == b.as_any().type_id() && a.eq_dyn(b, self)
    }
}

impl FieldComparer for GraphComparer {
    fn compare_field<T: Isomer>(&mut self, _field: &FieldDescriptor, a: &T, b: &T) -> bool {
        self.equal(a, b)
    }
}

/// Structural equality over two object graphs.
///
/// Values of immutable types use their own equality, with any two NaNs of the
/// same float type considered equal. Everything else is compared field by
/// field and element by element.
pub fn deep_equal<T: Isomer>(a: &T, b: &T) -> bool {
    log::trace!("deep_equal {}", type_name::<T>());
    GraphComparer::new().equal(a, b)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::array::Dimension;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[derive(isomer_derive::Isomer)]
    struct Node {
        label: String,
        next: Option<Rc<RefCell<Node>>>,
    }

    fn node(label: &str) -> Rc<RefCell<Node>> {
        Rc::new(RefCell::new(Node {
            label: label.to_string(),
            next: None,
        }))
    }

    #[test]
    fn identical_handles_are_equal() {
        let a = node("a");
        assert!(deep_equal(&a, &Rc::clone(&a)));
    }

    #[test]
    fn cycles_terminate() {
        let a = node("x");
        let b = node("x");
        a.borrow_mut().next = Some(Rc::clone(&a));
        b.borrow_mut().next = Some(Rc::clone(&b));

        assert!(deep_equal(&a, &b));

        a.borrow_mut().next = None;
        b.borrow_mut().next = None;
    }

    #[test]
    fn revisited_pair_counts_as_equal() {
        let a = node("a");
        let b = node("b");
        let mut comparer = GraphComparer::new();

        assert!(!comparer.equal(&a, &b));
        // Entered once already, so it is not compared again.
        assert!(comparer.equal(&a, &b));
    }

    #[test]
    fn null_against_value() {
        let a = node("a");
        assert!(!deep_equal(&Some(a), &None));
        assert!(deep_equal::<Option<Rc<RefCell<Node>>>>(&None, &None));
    }

    #[test]
    fn arrays_compare_shape_first() {
        let a = Array::new(vec![Dimension::new(2, 0)], vec![1u8, 2]).unwrap();
        let b = Array::new(vec![Dimension::new(2, 1)], vec![1u8, 2]).unwrap();
        assert!(!deep_equal(&a, &b));
        assert!(deep_equal(&a, &a.clone()));
    }

    #[test]
    fn nan_equals_nan() {
        assert!(deep_equal(&f64::NAN, &f64::NAN));
        assert!(deep_equal(&vec![1.0f32, f32::NAN], &vec![1.0, f32::NAN]));
        assert!(!deep_equal(&0.5f64, &f64::NAN));
    }

    #[test]
    fn borrowed_handle_is_unequal() {
        let a = node("a");
        let b = node("a");
        let _guard = b.borrow_mut();
        assert!(!deep_equal(&a, &b));
    }
}
