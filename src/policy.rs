//! Object-level authorization.
//!
//! Visibility is decided earlier by the owner-scoped queries; this predicate
//! is the second, independent check applied to the concrete object before a
//! write.

use crate::ownership::{OwnerResolver, OwnershipResolvable};
use crate::types::UserId;
use anyhow::Result;

/// Kind of access being requested.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    /// Retrieve or list.
    Read,
    /// Create, update, delete or assign.
    Write,
}

/// Decide whether `user` may perform `op` on `object`.
///
/// Reads are always granted here. Writes require the resolved owner to be the
/// acting user; a broken owner chain denies.
pub fn authorize<R>(
    resolver: &R,
    user: UserId,
    object: &dyn OwnershipResolvable,
    op: Operation,
) -> Result<bool>
where
    R: OwnerResolver + ?Sized,
{
    match op {
        Operation::Read => Ok(true),
        Operation::Write => Ok(resolver.owner_of(object)? == Some(user)),
    }
}
