//! # Error Types
//!
//! Errors shared across the workspace plus [`ErrorCode`], the flat
//! taxonomy callers surface to their own operators. Every crate-level
//! error in the registry and engine maps onto exactly one code.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::hex::HexError;

/// Error during canonical serialization.
#[derive(Error, Debug)]
pub enum CanonicalizationError {
    /// Float values are not permitted in canonical representations.
    #[error("float values are not permitted in canonical representations: {0}")]
    FloatRejected(f64),

    /// JSON serialization failed.
    #[error("serialization failed: {0}")]
    SerializationFailed(#[from] serde_json::Error),
}

/// Error in cryptographic operations.
#[derive(Error, Debug)]
pub enum CryptoError {
    /// Signature verification failed.
    #[error("signature verification failed: {0}")]
    VerificationFailed(String),

    /// Key parsing failed.
    #[error("key error: {0}")]
    KeyError(String),

    /// Hex input was malformed.
    #[error("hex error: {0}")]
    Hex(#[from] HexError),

    /// The signed payload could not be canonicalized.
    #[error("canonicalization error: {0}")]
    Canonicalization(#[from] CanonicalizationError),
}

/// Stable error codes surfaced to callers verbatim.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorCode {
    /// Onboarding an organization that is already active.
    AlreadyOnboarded,
    /// Operating on an organization that is not active.
    NotOnboarded,
    /// Querying an organization with no history.
    NotFound,
    /// Caller is not entitled to perform the operation.
    Unauthorized,
    /// Threshold outside `1..=|approvers|`, or a duplicate approver.
    InvalidThreshold,
    /// Signature from an identity that is not a current approver.
    UnauthorizedSigner,
    /// Signature bytes do not verify for the claimed signer and root.
    InvalidSignature,
    /// The same approver counted more than once.
    DuplicateSigner,
    /// Fewer distinct accepted signers than the threshold.
    InsufficientQuorum,
    /// A payout is not included in enough accepted roots.
    InvalidProof,
    /// A payout leaf was already executed.
    NonceAlreadySpent,
    /// The custody collaborator rejected the transfer.
    TransferFailed,
    /// Input arrays disagree in length or exceed limits.
    ShapeMismatch,
    /// Execution is paused by the master operator.
    Paused,
}

impl ErrorCode {
    /// The code name, e.g. `"NonceAlreadySpent"`.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::AlreadyOnboarded => "AlreadyOnboarded",
            Self::NotOnboarded => "NotOnboarded",
            Self::NotFound => "NotFound",
            Self::Unauthorized => "Unauthorized",
            Self::InvalidThreshold => "InvalidThreshold",
            Self::UnauthorizedSigner => "UnauthorizedSigner",
            Self::InvalidSignature => "InvalidSignature",
            Self::DuplicateSigner => "DuplicateSigner",
            Self::InsufficientQuorum => "InsufficientQuorum",
            Self::InvalidProof => "InvalidProof",
            Self::NonceAlreadySpent => "NonceAlreadySpent",
            Self::TransferFailed => "TransferFailed",
            Self::ShapeMismatch => "ShapeMismatch",
            Self::Paused => "Paused",
        }
    }
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
