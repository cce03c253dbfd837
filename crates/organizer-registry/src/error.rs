use organizer_core::{ErrorCode, Identity, OrgId};
use thiserror::Error;

/// Errors from registry mutations and queries.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    #[error("organization {org} is already onboarded")]
    AlreadyOnboarded { org: OrgId },

    #[error("organization {org} is not onboarded")]
    NotOnboarded { org: OrgId },

    /// The organization has never been onboarded.
    #[error("organization {org} not found")]
    NotFound { org: OrgId },

    /// Caller is not the organization's controlling identity.
    #[error("{caller} is not the controller of organization {org}")]
    Unauthorized { org: OrgId, caller: Identity },

    /// Threshold outside `1..=approvers`.
    #[error("threshold {threshold} invalid for {approvers} approvers")]
    InvalidThreshold { threshold: u32, approvers: usize },

    /// The approver list names the same identity twice.
    #[error("approver {approver} listed more than once")]
    DuplicateApprover { approver: Identity },
}

impl RegistryError {
    /// The caller-facing error code.
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::AlreadyOnboarded { .. } => ErrorCode::AlreadyOnboarded,
            Self::NotOnboarded { .. } => ErrorCode::NotOnboarded,
            Self::NotFound { .. } => ErrorCode::NotFound,
            Self::Unauthorized { .. } => ErrorCode::Unauthorized,
            Self::InvalidThreshold { .. } | Self::DuplicateApprover { .. } => {
                ErrorCode::InvalidThreshold
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_duplicate_approver_reports_invalid_threshold() {
        let err = RegistryError::DuplicateApprover {
            approver: Identity([1u8; 32]),
        };
        assert_eq!(err.code(), ErrorCode::InvalidThreshold);
    }

    #[test]
    fn test_message_names_organization() {
        let org = OrgId::new(Identity([0xab; 32]));
        let msg = RegistryError::NotOnboarded { org }.to_string();
        assert!(msg.contains("org:abab"), "{msg}");
    }
}
