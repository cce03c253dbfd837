//! # Payout Leaf Encoding
//!
//! A payout commits to the Merkle trees approvers sign through its leaf:
//!
//! ```text
//! leaf = SHA256(0x00 || recipient[32] || asset[32] || amount_be[16] || nonce_be[8])
//! ```
//!
//! Every field is fixed width, so the 89-byte preimage is injective over
//! `(recipient, asset, amount, nonce)`. The `0x00` tag separates leaves
//! from interior Merkle nodes, which are hashed under `0x01`; a leaf can
//! never be confused with a node.
//!
//! Two payouts with identical fields share a leaf. The nonce is what
//! distinguishes otherwise identical transfers, and the spend ledger is
//! keyed by leaf.

use serde::{Deserialize, Serialize};

use crate::digest::Hash32;
use crate::identity::{AssetId, Identity};

/// Domain tag prefixed to every leaf preimage.
pub const LEAF_DOMAIN_TAG: u8 = 0x00;

/// A value transfer requested by an organization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Payout {
    /// Who receives the funds.
    pub recipient: Identity,
    /// Which asset is transferred.
    pub asset: AssetId,
    /// Amount in the asset's smallest unit.
    pub amount: u128,
    /// Caller-assigned nonce disambiguating identical transfers.
    pub nonce: u64,
}

impl Payout {
    /// The commitment leaf for this payout.
    pub fn leaf(&self) -> Leaf {
        encode_leaf(&self.recipient, &self.asset, self.amount, self.nonce)
    }
}

/// The commitment hash of one payout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Leaf(Hash32);

impl Leaf {
    /// Wrap a hash already known to be a leaf (e.g. read back from storage).
    pub const fn from_hash(hash: Hash32) -> Self {
        Self(hash)
    }

    /// The underlying hash.
    pub fn as_hash(&self) -> &Hash32 {
        &self.0
    }
}

impl std::fmt::Display for Leaf {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// Encode a payout into its commitment leaf. Pure and infallible.
pub fn encode_leaf(recipient: &Identity, asset: &AssetId, amount: u128, nonce: u64) -> Leaf {
    Leaf(Hash32::sha256_concat(&[
        &[LEAF_DOMAIN_TAG],
        recipient.as_bytes(),
        asset.as_bytes(),
        &amount.to_be_bytes(),
        &nonce.to_be_bytes(),
    ]))
}
