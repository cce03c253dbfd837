//! # Identity Newtypes
//!
//! Fixed-width identifiers for approvers, organizations, recipients and
//! assets. Each namespace is a distinct type so an asset identifier cannot
//! be substituted for an approver identity.
//!
//! An [`Identity`] is the 32-byte Ed25519 public key of its holder. An
//! organization is identified by the identity of its controlling multisig,
//! wrapped in [`OrgId`]; only that controller may change the organization.

use serde::{Deserialize, Serialize};

/// A cryptographic identity: the 32-byte public key of an approver,
/// controller or payout recipient.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Identity(pub [u8; 32]);

impl_hex32!(Identity);

/// Identifier of a transferable asset.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AssetId(pub [u8; 32]);

impl_hex32!(AssetId);

/// Identifier of an organization: the identity of its controlling multisig.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OrgId(Identity);

impl OrgId {
    /// The organization controlled by `controller`.
    pub const fn new(controller: Identity) -> Self {
        Self(controller)
    }

    /// The identity entitled to mutate this organization.
    pub fn controller(&self) -> &Identity {
        &self.0
    }

    /// Whether `caller` is the controlling identity.
    pub fn is_controller(&self, caller: &Identity) -> bool {
        self.0 == *caller
    }
}

impl From<Identity> for OrgId {
    fn from(controller: Identity) -> Self {
        Self::new(controller)
    }
}

impl std::fmt::Display for OrgId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "org:{}", self.0)
    }
}
