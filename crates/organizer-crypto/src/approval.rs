//! # Batch Approval Signatures
//!
//! An approver attests to a whole batch by signing its commitment root.
//! The signed message binds four things:
//!
//! ```text
//! {
//!   "domain":       { "name", "version", "chain_id", "verifying_context" },
//!   "primary_type": "PayoutBatchApproval",
//!   "organization": <org id>,
//!   "signer":       <approver identity>,
//!   "root":         <commitment root>
//! }
//! ```
//!
//! canonicalized with RFC 8785 and signed with Ed25519. Changing any field
//! invalidates the signature, so an approval cannot be replayed against
//! another organization, another deployment, or another root.

use organizer_core::{CanonicalBytes, CryptoError, Hash32, Identity, OrgId};
use serde::{Deserialize, Serialize};

use crate::ed25519::{self, ApproverKeypair, Ed25519Signature};

/// Type tag of the signed approval payload.
pub const PRIMARY_TYPE: &str = "PayoutBatchApproval";

/// The deployment a signature is valid for.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SigningDomain {
    /// Human-readable deployment name.
    pub name: String,
    /// Message format version.
    pub version: String,
    /// Network the deployment serves.
    pub chain_id: u64,
    /// Identity of the verifying deployment.
    pub verifying_context: Identity,
}

/// A signature submitted alongside a root, positionally paired with it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RootSignature {
    /// Claimed signer.
    pub signer: Identity,
    /// Signature over the approval message.
    pub signature: Ed25519Signature,
}

/// A signer, the root they signed, and the signature bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignatureRecord {
    /// Claimed signer.
    pub signer: Identity,
    /// Commitment root the signature authorizes.
    pub root: Hash32,
    /// Signature over the approval message.
    pub signature: Ed25519Signature,
}

#[derive(Serialize)]
struct DomainFields<'a> {
    name: &'a str,
    version: &'a str,
    // As a string: JCS renders numbers as IEEE doubles.
    chain_id: String,
    verifying_context: &'a Identity,
}

#[derive(Serialize)]
struct ApprovalMessage<'a> {
    domain: DomainFields<'a>,
    primary_type: &'static str,
    organization: &'a OrgId,
    signer: &'a Identity,
    root: &'a Hash32,
}

impl SigningDomain {
    /// Canonical bytes of the approval of `root` by `signer` for `org`.
    pub fn approval_message(
        &self,
        org: &OrgId,
        signer: &Identity,
        root: &Hash32,
    ) -> Result<CanonicalBytes, CryptoError> {
        let message = ApprovalMessage {
            domain: DomainFields {
                name: &self.name,
                version: &self.version,
                chain_id: self.chain_id.to_string(),
                verifying_context: &self.verifying_context,
            },
            primary_type: PRIMARY_TYPE,
            organization: org,
            signer,
            root,
        };
        Ok(CanonicalBytes::new(&message)?)
    }
}

impl SignatureRecord {
    /// Pair a submitted signature with the root at the same position.
    pub fn new(root: Hash32, submitted: RootSignature) -> Self {
        Self {
            signer: submitted.signer,
            root,
            signature: submitted.signature,
        }
    }

    /// Verify this record for `org` under `domain`.
    pub fn verify(&self, domain: &SigningDomain, org: &OrgId) -> Result<(), CryptoError> {
        let message = domain.approval_message(org, &self.signer, &self.root)?;
        ed25519::verify(&self.signer, &message, &self.signature)
    }
}

/// Sign `root` for `org` with `key`.
pub fn sign_root(
    key: &ApproverKeypair,
    domain: &SigningDomain,
    org: &OrgId,
    root: &Hash32,
) -> Result<RootSignature, CryptoError> {
    let signer = key.identity();
    let message = domain.approval_message(org, &signer, root)?;
    Ok(RootSignature {
        signer,
        signature: key.sign(&message),
    })
}
