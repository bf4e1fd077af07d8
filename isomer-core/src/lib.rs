//! Isomer copies, compares and restores arbitrary in-memory object graphs.
//!
//! Core concepts:
//! - **Isomer**: a type the traversal engine knows how to walk, usually derived
//! - **Kind**: how a type is treated: immutable leaf, owned value, array or shared node
//! - **Shared handle**: `Rc<RefCell<T>>` or `Arc<RwLock<T>>`, the nodes with identity
//! - **GraphCloner** / **GraphComparer**: per-call traversal state tracking visited nodes
//!
//! # Example
//!
//! ```
//! use std::cell::RefCell;
//! use std::rc::Rc;
//! use isomer_core::{Isomer, deep_clone, deep_equal};
//!
//! #[derive(Isomer)]
//! struct Person {
//!     name: String,
//!     friend: Option<Rc<RefCell<Person>>>,
//! }
//!
//! let ada = Rc::new(RefCell::new(Person { name: "Ada".into(), friend: None }));
//! ada.borrow_mut().friend = Some(Rc::clone(&ada));
//!
//! let copy = deep_clone(&ada).unwrap();
//! assert!(!Rc::ptr_eq(&copy, &ada));
//! assert!(Rc::ptr_eq(copy.borrow().friend.as_ref().unwrap(), &copy));
//! assert!(deep_equal(&ada, &copy));
//! # ada.borrow_mut().friend = None;
//! # copy.borrow_mut().friend = None;
//! ```

// Lets derived code name this crate as `::isomer_core` from inside it too.
extern crate self as isomer_core;

mod array;
mod cloner;
mod comparer;
mod containers;
mod error;
mod fields;
mod isomer;
mod kind;
mod primitives;
mod revert;
mod shared;

pub use array::{Array, Dimension, Indices};
pub use cloner::{GraphCloner, deep_clone};
pub use comparer::{GraphComparer, deep_equal};
pub use error::IsomerError;
pub use fields::{FieldComparer, FieldDescriptor, FieldMapper, FieldWriter, Fields, fields_of};
pub use isomer::{AnyIsomer, Isomer};
pub use kind::{Kind, classify, is_immutable};
pub use revert::{revert_from, revert_optional, revert_shared};
pub use shared::Shared;

#[cfg(feature = "derive")]
pub use isomer_derive::Isomer;
