use std::any::{Any, TypeId};

use crate::cloner::GraphCloner;
use crate::comparer::GraphComparer;
use crate::error::IsomerError;
use crate::kind::Kind;

/// A value that can take part in an object graph.
///
/// Implementations describe how the traversal engine treats the type: its
/// [`Kind`], how to allocate an uninitialized instance, and how to copy and
/// compare it with a per-call traversal context. Structs and enums usually get
/// this from `#[derive(Isomer)]`; the engine ships implementations for
/// primitives, std collections and shared handles.
///
/// Implementations recurse through [`GraphCloner::clone_value`] and
/// [`GraphComparer::equal`] rather than calling `clone_with`/`eq_with` on
/// children directly, so identity tracking sees every node.
pub trait Isomer: Sized + 'static {
    /// Returns the traversal classification of this type.
    fn kind() -> Kind;

    /// Allocates an instance without running any constructor logic.
    ///
    /// Every field holds its zero value. Types that cannot be allocated this
    /// way keep the default, which fails naming the type.
    fn blank() -> Result<Self, IsomerError> {
        Err(IsomerError::uninstantiable::<Self>())
    }

    /// Produces a deep copy, recording shared nodes in `cloner`.
    fn clone_with(&self, cloner: &mut GraphCloner) -> Result<Self, IsomerError>;

    /// Overwrites `self` with a deep copy of `source`.
    ///
    /// The default replaces the whole value. Records override this to write
    /// field by field, leaving `self` in place.
    fn assign_from(&mut self, source: &Self, cloner: &mut GraphCloner) -> Result<(), IsomerError> {
        *self = cloner.clone_value(source)?;
        Ok(())
    }

    /// Structural equality, recording visited shared pairs in `comparer`.
    fn eq_with(&self, other: &Self, comparer: &mut GraphComparer) -> bool;
}

/// Object-safe view of an [`Isomer`] value whose concrete type is only known
/// at runtime.
///
/// `Box<dyn AnyIsomer>` is the common, less specific static type: two boxes
/// holding different concrete types never compare equal. The box is itself an
/// `Isomer`, so call these methods on `*boxed`, not on the box.
pub trait AnyIsomer: Any {
    fn as_any(&self) -> &dyn Any;

    fn as_any_mut(&mut self) -> &mut dyn Any;

    fn into_any(self: Box<Self>) -> Box<dyn Any>;

    /// Name of the concrete type.
    fn type_name(&self) -> &'static str;

    /// Classification of the concrete type.
    fn dyn_kind(&self) -> Kind;

    fn clone_boxed(&self, cloner: &mut GraphCloner) -> Result<Box<dyn AnyIsomer>, IsomerError>;

    /// Compares against a value of possibly different concrete type.
    fn eq_dyn(&self, other: &dyn AnyIsomer, comparer: &mut GraphComparer) -> bool;

    /// Moves `value` into `self` if the concrete types match, handing it back otherwise.
    fn assign_boxed(&mut self, value: Box<dyn AnyIsomer>) -> Result<(), Box<dyn AnyIsomer>>;
}

impl<T: Isomer> AnyIsomer for T {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }

    fn into_any(self: Box<Self>) -> Box<dyn Any> {
        self
    }

    fn type_name(&self) -> &'static str {
        std::any::type_name::<T>()
    }

    fn dyn_kind(&self) -> Kind {
        T::kind()
    }

    fn clone_boxed(&self, cloner: &mut GraphCloner) -> Result<Box<dyn AnyIsomer>, IsomerError> {
        Ok(Box::new(cloner.clone_value(self)?))
    }

    fn eq_dyn(&self, other: &dyn AnyIsomer, comparer: &mut GraphComparer) -> bool {
        match other.as_any().downcast_ref::<T>() {
            Some(other) => comparer.equal(self, other),
            None => false,
        }
    }

    fn assign_boxed(&mut self, value: Box<dyn AnyIsomer>) -> Result<(), Box<dyn AnyIsomer>> {
        if (*value).as_any().type_id() != TypeId::of::<T>() {
            return Err(value);
        }
        if let Ok(value) = value.into_any().downcast::<T>() {
            *self = *value;
        }
        Ok(())
    }
}

impl dyn AnyIsomer {
    /// Returns the value as `T` if that is its concrete type.
    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.as_any().downcast_ref()
    }

    /// Returns the value as `T` if that is its concrete type.
    pub fn downcast_mut<T: Any>(&mut self) -> Option<&mut T> {
        self.as_any_mut().downcast_mut()
    }

    /// Returns true if the concrete type is `T`.
    pub fn is<T: Any>(&self) -> bool {
        self.as_any().is::<T>()
    }
}

impl std::fmt::Debug for dyn AnyIsomer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AnyIsomer")
            .field("type", &self.type_name())
            .finish_non_exhaustive()
    }
}

impl Isomer for Box<dyn AnyIsomer> {
    fn kind() -> Kind {
        Kind::Value
    }

    fn clone_with(&self, cloner: &mut GraphCloner) -> Result<Self, IsomerError> {
        // Deref first: the box itself is also an `AnyIsomer`.
        (**self).clone_boxed(cloner)
    }

    fn eq_with(&self, other: &Self, comparer: &mut GraphComparer) -> bool {
        comparer.equal_dyn(&**self, &**other)
    }
}
