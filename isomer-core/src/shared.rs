//! Shared handles: the nodes of a graph that have reference identity.
//!
//! Owned Rust values have no identity, so a graph with sharing or cycles is
//! built from `Rc<RefCell<T>>` (or `Arc<RwLock<T>>` across threads), with
//! `Weak` handles for back-references. Two handles are the same node when they
//! point to the same allocation.

use std::any::type_name;
use std::cell::RefCell;
use std::rc::{Rc, Weak as RcWeak};
use std::sync::{Arc, RwLock, TryLockError, Weak as ArcWeak};

use crate::cloner::GraphCloner;
use crate::comparer::GraphComparer;
use crate::error::IsomerError;
use crate::isomer::Isomer;
use crate::kind::Kind;

/// A strong handle to an interior-mutable node.
pub trait Shared: Clone + 'static {
    type Target: Isomer;

    /// Address of the allocation, identifying the node.
    fn address(&self) -> usize;

    /// Places `value` in a fresh allocation.
    fn wrap(value: Self::Target) -> Self;

    /// Runs `f` with shared access to the node.
    ///
    /// Fails if the node is exclusively held elsewhere.
    fn with_ref<R>(&self, f: impl FnOnce(&Self::Target) -> R) -> Result<R, IsomerError>;

    /// Runs `f` with exclusive access to the node.
    ///
    /// Fails if the node is held elsewhere.
    fn with_mut<R>(&self, f: impl FnOnce(&mut Self::Target) -> R) -> Result<R, IsomerError>;
}

impl<T: Isomer> Shared for Rc<RefCell<T>> {
    type Target = T;

    fn address(&self) -> usize {
        Rc::as_ptr(self) as *const () as usize
    }

    fn wrap(value: T) -> Self {
        Rc::new(RefCell::new(value))
    }

    fn with_ref<R>(&self, f: impl FnOnce(&T) -> R) -> Result<R, IsomerError> {
        let guard = self
            .try_borrow()
            .map_err(|_| IsomerError::Borrowed(type_name::<Self>()))?;
        Ok(f(&guard))
    }

    fn with_mut<R>(&self, f: impl FnOnce(&mut T) -> R) -> Result<R, IsomerError> {
        let mut guard = self
            .try_borrow_mut()
            .map_err(|_| IsomerError::Borrowed(type_name::<Self>()))?;
        Ok(f(&mut guard))
    }
}

impl<T: Isomer> Shared for Arc<RwLock<T>> {
    type Target = T;

    fn address(&self) -> usize {
        Arc::as_ptr(self) as *const () as usize
    }

    fn wrap(value: T) -> Self {
        Arc::new(RwLock::new(value))
    }

    fn with_ref<R>(&self, f: impl FnOnce(&T) -> R) -> Result<R, IsomerError> {
        match self.try_read() {
            Ok(guard) => Ok(f(&guard)),
            Err(TryLockError::Poisoned(poisoned)) => {
                log::warn!("reading poisoned {}", type_name::<Self>());
                Ok(f(&poisoned.into_inner()))
            }
            Err(TryLockError::WouldBlock) => Err(IsomerError::Borrowed(type_name::<Self>())),
        }
    }

    fn with_mut<R>(&self, f: impl FnOnce(&mut T) -> R) -> Result<R, IsomerError> {
        match self.try_write() {
            Ok(mut guard) => Ok(f(&mut guard)),
            Err(TryLockError::Poisoned(poisoned)) => {
                log::warn!("writing poisoned {}", type_name::<Self>());
                Ok(f(&mut poisoned.into_inner()))
            }
            Err(TryLockError::WouldBlock) => Err(IsomerError::Borrowed(type_name::<Self>())),
        }
    }
}

macro_rules! impl_isomer_handle {
    ($strong:ident, $cell:ident, $weak:ident) => {
        impl<T: Isomer> Isomer for $strong<$cell<T>> {
            fn kind() -> Kind {
                Kind::Reference
            }

            fn blank() -> Result<Self, IsomerError> {
                Ok(Self::wrap(T::blank()?))
            }

            fn clone_with(&self, cloner: &mut GraphCloner) -> Result<Self, IsomerError> {
                cloner.clone_shared(self)
            }

            fn eq_with(&self, other: &Self, comparer: &mut GraphComparer) -> bool {
                comparer.equal_shared(self, other)
            }
        }

        /// A back-reference is cloned to a back-reference to the cloned node.
        ///
        /// Nothing in the copy owns a node reached only through `Weak`
        /// handles: it stays alive while the [`GraphCloner`] that made it
        /// does, and dies with it after [`deep_clone`](crate::deep_clone).
        impl<T: Isomer> Isomer for $weak<$cell<T>> {
            fn kind() -> Kind {
                Kind::Reference
            }

            fn blank() -> Result<Self, IsomerError> {
                Ok($weak::new())
            }

            fn clone_with(&self, cloner: &mut GraphCloner) -> Result<Self, IsomerError> {
                match self.upgrade() {
                    Some(node) => Ok($strong::downgrade(&cloner.clone_shared(&node)?)),
                    None => Ok($weak::new()),
                }
            }

            fn eq_with(&self, other: &Self, comparer: &mut GraphComparer) -> bool {
                match (self.upgrade(), other.upgrade()) {
                    (Some(a), Some(b)) => comparer.equal_shared(&a, &b),
                    (None, None) => true,
                    _ => false,
                }
            }
        }
    };
}

impl_isomer_handle!(Rc, RefCell, RcWeak);
impl_isomer_handle!(Arc, RwLock, ArcWeak);
