//! The custody seam: how authorized payouts leave the engine.
//!
//! The engine never moves funds itself. After a batch is authorized and
//! its leaves reserved, the whole batch is handed to a [`Custody`]
//! implementation in one call. A failed transfer rolls the reservation
//! back.

use organizer_core::{AssetId, OrgId, Payout};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A caller-declared upper bound on the total of one asset in a batch.
///
/// Forwarded to custody untouched. Enforcing it is custody's concern.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpendCeiling {
    pub asset: AssetId,
    pub max_total: u128,
}

/// Everything custody needs to move one authorized batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferBatch {
    /// Organization paying out.
    pub org: OrgId,
    /// Authorized payouts, in submission order.
    pub payouts: Vec<Payout>,
    #[serde(default)]
    pub ceilings: Vec<SpendCeiling>,
}

impl TransferBatch {
    /// Sum of `amount` over payouts of `asset`, or `None` on overflow.
    pub fn total_for(&self, asset: &AssetId) -> Option<u128> {
        self.payouts
            .iter()
            .filter(|p| p.asset == *asset)
            .try_fold(0u128, |acc, p| acc.checked_add(p.amount))
    }
}

/// Custody rejected or failed a transfer.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("transfer rejected by custody: {reason}")]
pub struct TransferError {
    pub reason: String,
}

impl TransferError {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

/// The external collaborator that moves funds.
///
/// `transfer` is all or nothing: on `Err`, no payout in the batch may have
/// been moved.
pub trait Custody: Send + Sync {
    fn transfer(&self, batch: &TransferBatch) -> Result<(), TransferError>;
}

impl<C: Custody + ?Sized> Custody for std::sync::Arc<C> {
    fn transfer(&self, batch: &TransferBatch) -> Result<(), TransferError> {
        (**self).transfer(batch)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use organizer_core::Identity;

    fn payout(asset: u8, amount: u128) -> Payout {
        Payout {
            recipient: Identity([1; 32]),
            asset: AssetId([asset; 32]),
            amount,
            nonce: 0,
        }
    }

    #[test]
    fn test_total_for_asset() {
        let batch = TransferBatch {
            org: OrgId::new(Identity([9; 32])),
            payouts: vec![payout(1, 100), payout(2, 5), payout(1, 50)],
            ceilings: vec![],
        };
        assert_eq!(batch.total_for(&AssetId([1; 32])), Some(150));
        assert_eq!(batch.total_for(&AssetId([3; 32])), Some(0));
    }

    #[test]
    fn test_total_overflow_is_none() {
        let batch = TransferBatch {
            org: OrgId::new(Identity([9; 32])),
            payouts: vec![payout(1, u128::MAX), payout(1, 1)],
            ceilings: vec![],
        };
        assert_eq!(batch.total_for(&AssetId([1; 32])), None);
    }
}
