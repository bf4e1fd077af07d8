//! Restoring an existing object to a previously captured state.
//!
//! A revert writes into the target where it lives instead of handing back a
//! new value, so every other holder of the target sees the restored state.

use std::any::type_name;

use crate::cloner::GraphCloner;
use crate::error::IsomerError;
use crate::isomer::Isomer;
use crate::shared::Shared;

/// Overwrites every field of `target` with a deep copy of the same field in
/// `snapshot`, private fields included.
///
/// Shared nodes reachable from the snapshot are cloned, not adopted: the
/// target never ends up pointing into the snapshot's graph.
pub fn revert_from<T: Isomer>(target: &mut T, snapshot: &T) -> Result<(), IsomerError> {
    log::trace!("revert_from {}", type_name::<T>());
    target.assign_from(snapshot, &mut GraphCloner::new())
}

/// Reverts the node behind `target` to the contents of the node behind
/// `snapshot`.
///
/// Does nothing if both handles point to the same node. Fails with
/// [`IsomerError::Borrowed`] if either node is held elsewhere, including when
/// the snapshot's graph reaches back into the target.
pub fn revert_shared<H: Shared>(target: &H, snapshot: &H) -> Result<(), IsomerError> {
    if target.address() == snapshot.address() {
        log::trace!("revert_shared {}: same node", type_name::<H>());
        return Ok(());
    }
    log::trace!("revert_shared {}", type_name::<H>());

    let mut cloner = GraphCloner::new();
    snapshot.with_ref(|source| target.with_mut(|dest| dest.assign_from(source, &mut cloner)))??
}

/// Like [`revert_shared`], but a missing target or snapshot is a no-op.
pub fn revert_optional<H: Shared>(target: Option<&H>, snapshot: Option<&H>) -> Result<(), IsomerError> {
    match (target, snapshot) {
        (Some(target), Some(snapshot)) => revert_shared(target, snapshot),
        _ => Ok(()),
    }
}
