//! # organizer-crypto — Signatures and Commitments
//!
//! - **Ed25519** approver keys. An approver's [`Identity`] is its public
//!   key, so verifying a signature also authenticates the signer.
//! - **Batch approvals**: an approver signs one commitment root for one
//!   organization under a [`SigningDomain`]. The signed message is the
//!   canonical JSON of domain, organization, signer and root.
//! - **Merkle commitments**: tree building for approvers and batch
//!   builders, and the membership verifier used by the executor. The
//!   pair-ordering rule is an explicit [`PairOrdering`] value, never an
//!   implicit default buried in the hash function.
//!
//! ## Crate Policy
//!
//! - Depends only on `organizer-core` internally.
//! - Tests use real SHA-256 and real Ed25519. Nothing is mocked.
//!
//! [`Identity`]: organizer_core::Identity

pub mod approval;
pub mod ed25519;
pub mod merkle;

pub use approval::{sign_root, RootSignature, SignatureRecord, SigningDomain};
pub use ed25519::{ApproverKeypair, Ed25519Signature};
pub use merkle::{
    verify_membership, verify_membership_hex, MerkleProof, MerkleTree, PairOrdering, Side,
    TreeError,
};
