use std::any::{Any, TypeId, type_name};

use rustc_hash::FxHashMap;

use crate::array::Array;
use crate::error::IsomerError;
use crate::fields::{FieldDescriptor, FieldMapper, FieldWriter, Fields};
use crate::isomer::Isomer;
use crate::shared::Shared;

/// Traversal context for one deep-clone call.
///
/// Holds the identity map from each source node already visited to its clone,
/// so that shared references stay shared and cycles are reproduced. Only
/// shared handles are registered; owned values have no identity.
///
/// The map holds a strong handle to every cloned node. A node that the copy
/// reaches only through `Weak` back-references is kept alive by the cloner
/// alone, so callers cloning such a graph keep the cloner for as long as they
/// use the copy.
#[derive(Default)]
pub struct GraphCloner {
    visited: FxHashMap<(usize, TypeId), Box<dyn Any>>,
}

impl GraphCloner {
    pub fn new() -> Self {
        GraphCloner {
            visited: FxHashMap::default(),
        }
    }

    /// Number of shared nodes cloned so far, all of which this cloner keeps alive.
    pub fn tracked(&self) -> usize {
        self.visited.len()
    }

    /// Clones any value within this traversal.
    pub fn clone_value<T: Isomer>(&mut self, value: &T) -> Result<T, IsomerError> {
        value.clone_with(self)
    }

    /// The immutable fast path: the value is handed back as-is.
    pub fn share<T: Clone>(&self, value: &T) -> T {
        value.clone()
    }

    /// Copies a record field by field.
    pub fn clone_record<T: Fields>(&mut self, record: &T) -> Result<T, IsomerError> {
        record.map_fields(self)
    }

    /// Overwrites every field of `target` with a clone of the field in `source`.
    pub fn assign_record<T: Fields>(&mut self, target: &mut T, source: &T) -> Result<(), IsomerError> {
        target.write_fields(source, self)
    }

    /// Clones each element into a new collection.
    pub fn clone_elements<'a, T, C>(&mut self, items: impl IntoIterator<Item = &'a T>) -> Result<C, IsomerError>
    where
        T: Isomer,
        C: FromIterator<T>,
    {
        items.into_iter().map(|item| self.clone_value(item)).collect()
    }

    /// Clones an array, keeping its rank, lengths and lower bounds.
    pub fn clone_array<T: Isomer>(&mut self, source: &Array<T>) -> Result<Array<T>, IsomerError> {
        let items = self.clone_elements(source.iter())?;
        Array::new(source.dimensions().to_vec(), items)
    }

    /// Clones the node behind a shared handle, or returns the clone made
    /// earlier in this traversal.
    ///
    /// The new node is allocated blank and registered before its contents are
    /// copied, so references back to it from inside resolve to the clone.
    pub fn clone_shared<H: Shared>(&mut self, handle: &H) -> Result<H, IsomerError> {
        let key = (handle.address(), TypeId::of::<H>());

        if let Some(existing) = self.visited.get(&key) {
            log::trace!("identity map hit for {} at {:#x}", type_name::<H>(), key.0);
            return existing
                .downcast_ref::<H>()
                .cloned()
                .ok_or(IsomerError::TypeMismatch(type_name::<H>()));
        }

        let blank = H::Target::blank().inspect_err(|err| {
            log::debug!("cannot clone {}: {}", type_name::<H>(), err);
        })?;
        let clone = H::wrap(blank);
        self.visited.insert(key, Box::new(clone.clone()));

        handle.with_ref(|source| clone.with_mut(|target| target.assign_from(source, self)))???;
        Ok(clone)
    }
}

impl FieldMapper for GraphCloner {
    fn map_field<T: Isomer>(&mut self, _field: &FieldDescriptor, value: &T) -> Result<T, IsomerError> {
        self.clone_value(value)
    }
}

impl FieldWriter for GraphCloner {
    fn write_field<T: Isomer>(
        &mut self,
        _field: &FieldDescriptor,
        target: &mut T,
        source: &T,
    ) -> Result<(), IsomerError> {
        *target = self.clone_value(source)?;
        Ok(())
    }
}

/// Deep-copies `value` together with everything reachable from it.
///
/// Immutable values are returned as-is. Shared handles that appear more than
/// once in the source graph appear exactly as often in the copy, pointing to a
/// single cloned node, and cycles are reproduced.
///
/// The copy owns only what it reaches through strong handles. A `Weak` in the
/// copy whose target is not also strongly reachable from the copy is dead on
/// return; clone through a [`GraphCloner`] held by the caller to keep such
/// targets alive.
pub fn deep_clone<T: Isomer>(value: &T) -> Result<T, IsomerError> {
    log::trace!("deep_clone {}", type_name::<T>());
    GraphCloner::new().clone_value(value)
}
