//! # organizer-core — Foundational Types for the Payout Organizer
//!
//! Defines the primitives every other crate in the workspace builds on.
//! It depends on nothing internal.
//!
//! ## Key Design Principles
//!
//! 1. **Fixed-width newtypes.** `Identity`, `OrgId`, `AssetId`, `Hash32` and
//!    `Leaf` are distinct 32-byte types. An asset identifier cannot be
//!    passed where an approver identity is expected.
//!
//! 2. **One leaf encoding.** [`encode_leaf()`] is the only way to derive a
//!    payout commitment. Approvers building trees off-system and the
//!    executor verifying them call the same function.
//!
//! 3. **`CanonicalBytes` for signed payloads.** Approval messages are
//!    serialized through RFC 8785 canonicalization before signing, so the
//!    signer and the verifier always hash the same bytes.
//!
//! 4. **Flat error taxonomy.** [`ErrorCode`] lists every code the engine
//!    can surface. Crate-level errors map onto it so callers can report
//!    codes verbatim.
//!
//! ## Crate Policy
//!
//! - No dependencies on other `organizer-*` crates.
//! - No `unsafe` code.
//! - No `panic!()` or `.unwrap()` outside tests.

#[macro_use]
pub mod hex;

pub mod canonical;
pub mod digest;
pub mod error;
pub mod identity;
pub mod payout;
pub mod temporal;

pub use canonical::CanonicalBytes;
pub use digest::{sha256_digest, Hash32};
pub use error::{CanonicalizationError, CryptoError, ErrorCode};
pub use hex::HexError;
pub use identity::{AssetId, Identity, OrgId};
pub use payout::{encode_leaf, Leaf, Payout, LEAF_DOMAIN_TAG};
pub use temporal::Timestamp;
