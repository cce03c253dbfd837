//! # Quorum Validation
//!
//! Decides which submitted `(root, signature)` pairs count toward an
//! organization's threshold.
//!
//! A pair is **rejected** (excluded, not fatal) when its signer is not a
//! current approver or its signature does not verify for that signer,
//! organization and root under the deployment's [`SigningDomain`]. The
//! remaining pairs are **accepted**. The call then fails if one approver
//! appears twice among accepted pairs, or if fewer distinct approvers than
//! the threshold remain.

use organizer_core::{ErrorCode, Hash32, Identity, OrgId};
use organizer_crypto::{RootSignature, SignatureRecord, SigningDomain};
use organizer_registry::OrganizationRegistry;
use serde::Serialize;

use crate::error::QuorumError;

/// A pair that counts toward the threshold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct AcceptedRoot {
    /// Position in the submitted `roots` array.
    pub index: usize,
    pub root: Hash32,
    pub signer: Identity,
}

/// A pair excluded from the count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RejectedSignature {
    pub index: usize,
    pub signer: Identity,
    /// `UnauthorizedSigner` or `InvalidSignature`.
    pub reason: ErrorCode,
}

/// A met quorum.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Quorum {
    /// Threshold in force when the quorum was checked.
    pub threshold: u32,
    pub accepted: Vec<AcceptedRoot>,
    pub rejected: Vec<RejectedSignature>,
}

impl Quorum {
    /// Distinct approvers behind the accepted roots.
    pub fn signers(&self) -> Vec<Identity> {
        self.accepted.iter().map(|a| a.signer).collect()
    }
}

/// Checks signatures against one registry and one signing domain.
pub struct QuorumValidator<'a> {
    registry: &'a OrganizationRegistry,
    domain: &'a SigningDomain,
}

impl<'a> QuorumValidator<'a> {
    pub fn new(registry: &'a OrganizationRegistry, domain: &'a SigningDomain) -> Self {
        Self { registry, domain }
    }

    /// Verify `signatures[i]` over `roots[i]` for every `i` and check the
    /// result against `org`'s threshold.
    pub fn verify(
        &self,
        org: &OrgId,
        roots: &[Hash32],
        signatures: &[RootSignature],
    ) -> Result<Quorum, QuorumError> {
        if roots.len() != signatures.len() {
            return Err(QuorumError::ShapeMismatch {
                roots: roots.len(),
                signatures: signatures.len(),
            });
        }
        let organization = self
            .registry
            .snapshot(org)
            .filter(|o| o.is_active())
            .ok_or(QuorumError::NotOnboarded { org: *org })?;

        let mut accepted: Vec<AcceptedRoot> = Vec::with_capacity(roots.len());
        let mut rejected = Vec::new();
        for (index, (root, submitted)) in roots.iter().zip(signatures).enumerate() {
            let signer = submitted.signer;
            if !organization.is_approver(&signer) {
                tracing::warn!(org = %org, index, signer = %signer, "signature from non-approver excluded");
                rejected.push(RejectedSignature {
                    index,
                    signer,
                    reason: ErrorCode::UnauthorizedSigner,
                });
                continue;
            }
            if let Err(e) = SignatureRecord::new(*root, *submitted).verify(self.domain, org) {
                tracing::warn!(org = %org, index, signer = %signer, error = %e, "invalid signature excluded");
                rejected.push(RejectedSignature {
                    index,
                    signer,
                    reason: ErrorCode::InvalidSignature,
                });
                continue;
            }
            if accepted.iter().any(|a| a.signer == signer) {
                return Err(QuorumError::DuplicateSigner { signer });
            }
            tracing::debug!(org = %org, index, signer = %signer, "signature accepted");
            accepted.push(AcceptedRoot {
                index,
                root: *root,
                signer,
            });
        }

        let found = accepted.len() as u32;
        if found < organization.threshold {
            return Err(QuorumError::InsufficientQuorum {
                required: organization.threshold,
                found,
            });
        }
        Ok(Quorum {
            threshold: organization.threshold,
            accepted,
            rejected,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use organizer_crypto::{sign_root, ApproverKeypair};

    struct Fixture {
        registry: OrganizationRegistry,
        domain: SigningDomain,
        org: OrgId,
        keys: Vec<ApproverKeypair>,
    }

    fn fixture(threshold: u32) -> Fixture {
        let keys: Vec<_> = (1..=3u8).map(|b| ApproverKeypair::from_seed(&[b; 32])).collect();
        let org = OrgId::new(Identity([0xc0; 32]));
        let registry = OrganizationRegistry::new();
        registry
            .onboard(org, keys.iter().map(|k| k.identity()).collect(), threshold)
            .unwrap();
        let domain = SigningDomain {
            name: "organizer".to_string(),
            version: "1".to_string(),
            chain_id: 1,
            verifying_context: Identity([0xcc; 32]),
        };
        Fixture {
            registry,
            domain,
            org,
            keys,
        }
    }

    impl Fixture {
        fn sign(&self, key: &ApproverKeypair, root: Hash32) -> RootSignature {
            sign_root(key, &self.domain, &self.org, &root).unwrap()
        }

        fn verify(&self, roots: &[Hash32], sigs: &[RootSignature]) -> Result<Quorum, QuorumError> {
            QuorumValidator::new(&self.registry, &self.domain).verify(&self.org, roots, sigs)
        }
    }

    #[test]
    fn test_two_of_three_accepted() {
        let f = fixture(2);
        let roots = [Hash32([1; 32]), Hash32([2; 32])];
        let sigs = [f.sign(&f.keys[0], roots[0]), f.sign(&f.keys[1], roots[1])];
        let q = f.verify(&roots, &sigs).unwrap();
        assert_eq!(q.threshold, 2);
        assert_eq!(q.signers(), vec![f.keys[0].identity(), f.keys[1].identity()]);
        assert!(q.rejected.is_empty());
    }

    #[test]
    fn test_same_signer_twice_is_duplicate() {
        let f = fixture(2);
        let roots = [Hash32([1; 32]), Hash32([2; 32])];
        let sigs = [f.sign(&f.keys[0], roots[0]), f.sign(&f.keys[0], roots[1])];
        assert_eq!(
            f.verify(&roots, &sigs).unwrap_err(),
            QuorumError::DuplicateSigner {
                signer: f.keys[0].identity()
            }
        );
    }

    #[test]
    fn test_outsider_excluded_from_count() {
        let f = fixture(2);
        let outsider = ApproverKeypair::from_seed(&[9; 32]);
        let roots = [Hash32([1; 32]), Hash32([2; 32])];
        let sigs = [f.sign(&f.keys[0], roots[0]), f.sign(&outsider, roots[1])];
        assert_eq!(
            f.verify(&roots, &sigs).unwrap_err(),
            QuorumError::InsufficientQuorum {
                required: 2,
                found: 1
            }
        );
    }

    #[test]
    fn test_outsider_reported_when_quorum_met() {
        let f = fixture(1);
        let outsider = ApproverKeypair::from_seed(&[9; 32]);
        let roots = [Hash32([1; 32]), Hash32([2; 32])];
        let sigs = [f.sign(&outsider, roots[0]), f.sign(&f.keys[2], roots[1])];
        let q = f.verify(&roots, &sigs).unwrap();
        assert_eq!(q.accepted.len(), 1);
        assert_eq!(q.accepted[0].index, 1);
        assert_eq!(q.rejected[0].reason, ErrorCode::UnauthorizedSigner);
    }

    #[test]
    fn test_signature_for_other_root_rejected() {
        let f = fixture(1);
        let roots = [Hash32([1; 32])];
        let sigs = [f.sign(&f.keys[0], Hash32([7; 32]))];
        assert!(matches!(
            f.verify(&roots, &sigs),
            Err(QuorumError::InsufficientQuorum { found: 0, .. })
        ));
    }

    #[test]
    fn test_invalid_signature_does_not_trigger_duplicate() {
        let f = fixture(1);
        let roots = [Hash32([1; 32]), Hash32([2; 32])];
        let mut forged = f.sign(&f.keys[0], roots[1]);
        forged.signature.0[0] ^= 0xff;
        let sigs = [f.sign(&f.keys[0], roots[0]), forged];
        let q = f.verify(&roots, &sigs).unwrap();
        assert_eq!(q.accepted.len(), 1);
        assert_eq!(q.rejected[0].reason, ErrorCode::InvalidSignature);
    }

    #[test]
    fn test_length_mismatch() {
        let f = fixture(1);
        let err = f.verify(&[Hash32([1; 32])], &[]).unwrap_err();
        assert_eq!(err.code(), ErrorCode::ShapeMismatch);
    }

    #[test]
    fn test_offboarded_org_not_onboarded() {
        let f = fixture(1);
        f.registry.offboard(&Identity([0xc0; 32]), &f.org).unwrap();
        let roots = [Hash32([1; 32])];
        let sigs = [f.sign(&f.keys[0], roots[0])];
        assert_eq!(f.verify(&roots, &sigs).unwrap_err().code(), ErrorCode::NotOnboarded);
    }
}
