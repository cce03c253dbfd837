//! Engine error types. Each maps onto one [`ErrorCode`].

use organizer_core::{ErrorCode, Identity, Leaf, OrgId};
use thiserror::Error;

use crate::custody::TransferError;

/// Quorum verification failed. Fatal for the whole call.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum QuorumError {
    #[error("organization {org} is not onboarded")]
    NotOnboarded { org: OrgId },

    /// `roots` and `signatures` differ in length.
    #[error("{roots} roots submitted with {signatures} signatures")]
    ShapeMismatch { roots: usize, signatures: usize },

    /// One approver counted more than once among accepted pairs.
    #[error("approver {signer} signed more than one submitted root")]
    DuplicateSigner { signer: Identity },

    #[error("quorum not met: {found} distinct approvers, {required} required")]
    InsufficientQuorum { required: u32, found: u32 },
}

impl QuorumError {
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::NotOnboarded { .. } => ErrorCode::NotOnboarded,
            Self::ShapeMismatch { .. } => ErrorCode::ShapeMismatch,
            Self::DuplicateSigner { .. } => ErrorCode::DuplicateSigner,
            Self::InsufficientQuorum { .. } => ErrorCode::InsufficientQuorum,
        }
    }
}

/// A batch execution failed. Nothing was spent and nothing transferred.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ExecutionError {
    #[error("execution is paused")]
    Paused,

    /// Caller may not perform an operator action.
    #[error("{caller} is not the master operator")]
    Unauthorized { caller: Identity },

    /// Input arrays disagree in shape or the batch is too large.
    #[error("malformed batch: {reason}")]
    ShapeMismatch { reason: String },

    #[error(transparent)]
    Quorum(#[from] QuorumError),

    /// Payout `index` is proven in fewer accepted roots than required.
    #[error("payout {index} (leaf {leaf}) proven in {proven} accepted roots, {required} required")]
    InvalidProof {
        index: usize,
        leaf: Leaf,
        proven: u32,
        required: u32,
    },

    #[error("payout {index} (leaf {leaf}) already executed")]
    NonceAlreadySpent { index: usize, leaf: Leaf },

    #[error("transfer failed: {0}")]
    TransferFailed(#[from] TransferError),
}

impl ExecutionError {
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::Paused => ErrorCode::Paused,
            Self::Unauthorized { .. } => ErrorCode::Unauthorized,
            Self::ShapeMismatch { .. } => ErrorCode::ShapeMismatch,
            Self::Quorum(e) => e.code(),
            Self::InvalidProof { .. } => ErrorCode::InvalidProof,
            Self::NonceAlreadySpent { .. } => ErrorCode::NonceAlreadySpent,
            Self::TransferFailed(_) => ErrorCode::TransferFailed,
        }
    }

    pub(crate) fn shape(reason: impl Into<String>) -> Self {
        Self::ShapeMismatch {
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use organizer_core::Hash32;

    #[test]
    fn test_quorum_codes_pass_through() {
        let err: ExecutionError = QuorumError::DuplicateSigner {
            signer: Identity([1; 32]),
        }
        .into();
        assert_eq!(err.code(), ErrorCode::DuplicateSigner);
    }

    #[test]
    fn test_invalid_proof_message() {
        let err = ExecutionError::InvalidProof {
            index: 2,
            leaf: Leaf::from_hash(Hash32::ZERO),
            proven: 1,
            required: 2,
        };
        assert_eq!(err.code(), ErrorCode::InvalidProof);
        assert!(err.to_string().starts_with("payout 2 "), "{err}");
    }

    #[test]
    fn test_transfer_error_converts() {
        let err: ExecutionError = TransferError::new("insufficient funds").into();
        assert_eq!(err.code(), ErrorCode::TransferFailed);
        assert!(err.to_string().contains("insufficient funds"));
    }
}
