//! Field enumeration and reflective field access.
//!
//! Rust has no runtime reflection, so the per-type field list is generated at
//! compile time by `#[derive(Isomer)]`. A type hierarchy is modelled by an
//! embedded parent marked `#[isomer(base)]`: each level lists only the fields
//! it declares itself, and walks continue into the parent, so a field name
//! shadowed between levels is still two distinct slots.

use std::fmt;

use crate::error::IsomerError;
use crate::isomer::{AnyIsomer, Isomer};

/// Identifies one storage slot: the level that declares it and its name.
///
/// Tuple struct fields are named by position (`"0"`, `"1"`, ...).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FieldDescriptor {
    pub declaring_type: &'static str,
    pub name: &'static str,
}

impl FieldDescriptor {
    pub const fn new(declaring_type: &'static str, name: &'static str) -> Self {
        FieldDescriptor {
            declaring_type,
            name,
        }
    }
}

impl fmt::Display for FieldDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}::{}", self.declaring_type, self.name)
    }
}

/// Produces a new value for each field when building a copy.
pub trait FieldMapper {
    fn map_field<T: Isomer>(&mut self, field: &FieldDescriptor, value: &T) -> Result<T, IsomerError>;
}

/// Writes each field of a target from the corresponding field of a source.
pub trait FieldWriter {
    fn write_field<T: Isomer>(
        &mut self,
        field: &FieldDescriptor,
        target: &mut T,
        source: &T,
    ) -> Result<(), IsomerError>;
}

/// Compares corresponding fields of two instances.
pub trait FieldComparer {
    fn compare_field<T: Isomer>(&mut self, field: &FieldDescriptor, a: &T, b: &T) -> bool;
}

/// A record type whose fields can be walked generically.
///
/// Derive this with `#[derive(Isomer)]`; implementing it by hand means keeping
/// every method in agreement with `declared_fields`.
pub trait Fields: Isomer {
    /// Fields declared at this level only, in declaration order.
    fn declared_fields() -> &'static [FieldDescriptor];

    /// Visits this level's declared fields, then each parent level up to the root.
    fn for_each_field(visitor: &mut dyn FnMut(&FieldDescriptor));

    /// Builds a new instance whose every field is produced by `mapper`.
    fn map_fields(&self, mapper: &mut impl FieldMapper) -> Result<Self, IsomerError>;

    /// Sets every field of `self` from the same field of `source`.
    fn write_fields(&mut self, source: &Self, writer: &mut impl FieldWriter) -> Result<(), IsomerError>;

    /// Compares field pairs, stopping at the first mismatch.
    fn compare_fields(&self, other: &Self, comparer: &mut impl FieldComparer) -> bool;

    /// Reads a field by descriptor, regardless of its visibility.
    fn field(&self, field: &FieldDescriptor) -> Option<&dyn AnyIsomer>;

    /// Mutable access to a field by descriptor.
    fn field_mut(&mut self, field: &FieldDescriptor) -> Option<&mut dyn AnyIsomer>;

    /// Reads a field by descriptor as a concrete type.
    fn field_as<V: Isomer>(&self, field: &FieldDescriptor) -> Option<&V> {
        self.field(field)?.downcast_ref()
    }

    /// Replaces a field's value by descriptor.
    ///
    /// Fails if no such field exists at any level or `value` has the wrong type.
    fn set_field(&mut self, field: &FieldDescriptor, value: Box<dyn AnyIsomer>) -> Result<(), IsomerError> {
        let slot = self.field_mut(field).ok_or(IsomerError::UnknownField {
            declaring_type: field.declaring_type,
            name: field.name,
        })?;
        let expected = slot.type_name();
        slot.assign_boxed(value).map_err(|rejected| IsomerError::FieldType {
            field: field.to_string(),
            expected,
            actual: (*rejected).type_name(),
        })
    }
}

/// Collects the descriptors of every field of `T`, across all levels.
pub fn fields_of<T: Fields>() -> Vec<FieldDescriptor> {
    let mut fields = Vec::new();
    T::for_each_field(&mut |field| fields.push(*field));
    fields
}
