//! Ownership policy: a resource may only be mutated by the user who owns it.
//!
//! Every mutable row implements [`Owned`]; services load the row first (so a
//! missing row is reported as 404), then call [`authorize_mutation`], then write.

use thiserror::Error;

use crate::types::UserId;

/// A row with an owning principal, fixed at creation time.
pub trait Owned {
    fn owner_id(&self) -> UserId;
}

impl<T: Owned + ?Sized> Owned for &T {
    fn owner_id(&self) -> UserId {
        (**self).owner_id()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("user {acting} may not modify a resource owned by user {owner}")]
pub struct Forbidden {
    pub owner: UserId,
    pub acting: UserId,
}

/// `Ok` iff `acting` owns `resource`. Stateless; no side effects.
pub fn authorize_mutation<R: Owned + ?Sized>(resource: &R, acting: UserId) -> Result<(), Forbidden> {
    let owner = resource.owner_id();
    if owner == acting {
        Ok(())
    } else {
        Err(Forbidden { owner, acting })
    }
}
