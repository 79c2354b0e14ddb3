//! Consumed voucher uids.
//!
//! The set only grows. A uid enters it exactly when its redemption succeeds,
//! and nothing ever removes it.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use sigmint_protocol::types::Uid;

use crate::errors::{MinterError, MinterResult, Rejection};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReplayGuard {
    consumed: BTreeSet<Uid>,
}

impl ReplayGuard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_consumed(&self, uid: &Uid) -> bool {
        self.consumed.contains(uid)
    }

    pub fn ensure_fresh(&self, uid: &Uid) -> MinterResult<()> {
        if self.is_consumed(uid) {
            Err(MinterError::InvalidRequest(Rejection::UidConsumed))
        } else {
            Ok(())
        }
    }

    /// Marks `uid` used. Returns `false` if it already was.
    pub fn consume(&mut self, uid: Uid) -> bool {
        self.consumed.insert(uid)
    }

    pub fn len(&self) -> usize {
        self.consumed.len()
    }

    pub fn is_empty(&self) -> bool {
        self.consumed.is_empty()
    }
}
