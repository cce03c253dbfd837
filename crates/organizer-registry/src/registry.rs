//! # Organization Registry
//!
//! A keyed store of [`Organization`]s behind a `parking_lot::RwLock`.
//! Mutations take the write lock for their whole validate-then-apply
//! sequence, so each is atomic. Reads take the read lock and observe a
//! consistent snapshot of one organization.

use std::collections::HashMap;

use organizer_core::{Identity, OrgId};
use parking_lot::RwLock;

use crate::error::RegistryError;
use crate::organization::{OrgStatus, Organization, RegistryRecord};

/// Keyed store of every organization ever onboarded.
#[derive(Debug, Default)]
pub struct OrganizationRegistry {
    orgs: RwLock<HashMap<OrgId, Organization>>,
}

impl OrganizationRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Onboard `org` with `approvers` and `threshold`.
    ///
    /// Fails `AlreadyOnboarded` if the organization is active. An
    /// offboarded organization is onboarded afresh.
    pub fn onboard(
        &self,
        org: OrgId,
        approvers: Vec<Identity>,
        threshold: u32,
    ) -> Result<(), RegistryError> {
        let mut orgs = self.orgs.write();
        let count = approvers.len();
        match orgs.get_mut(&org) {
            Some(existing) => existing.reonboard(approvers, threshold)?,
            None => {
                orgs.insert(org, Organization::onboard(org, approvers, threshold)?);
            }
        }
        tracing::info!(org = %org, approvers = count, threshold, "organization onboarded");
        Ok(())
    }

    /// Apply `(current ∪ to_add) \ to_remove` and `new_threshold` to `org`.
    pub fn modify_approvers(
        &self,
        caller: &Identity,
        org: &OrgId,
        to_add: &[Identity],
        to_remove: &[Identity],
        new_threshold: u32,
    ) -> Result<(), RegistryError> {
        let mut orgs = self.orgs.write();
        let entry = orgs
            .get_mut(org)
            .ok_or(RegistryError::NotOnboarded { org: *org })?;
        entry.modify_approvers(caller, to_add, to_remove, new_threshold)?;
        tracing::info!(
            org = %org,
            approvers = entry.approvers.len(),
            threshold = entry.threshold,
            "approver set modified"
        );
        Ok(())
    }

    /// Offboard `org`. Its history is kept.
    pub fn offboard(&self, caller: &Identity, org: &OrgId) -> Result<(), RegistryError> {
        let mut orgs = self.orgs.write();
        orgs.get_mut(org)
            .ok_or(RegistryError::NotOnboarded { org: *org })?
            .offboard(caller)?;
        tracing::info!(org = %org, "organization offboarded");
        Ok(())
    }

    /// Current approvers in insertion order. Empty once offboarded.
    pub fn approvers(&self, org: &OrgId) -> Result<Vec<Identity>, RegistryError> {
        self.read(org, |o| o.approvers.clone())
    }

    pub fn approver_count(&self, org: &OrgId) -> Result<usize, RegistryError> {
        self.read(org, |o| o.approvers.len())
    }

    pub fn threshold(&self, org: &OrgId) -> Result<u32, RegistryError> {
        self.read(org, |o| o.threshold)
    }

    /// Whether `identity` is a current approver of `org`.
    pub fn is_approver(&self, org: &OrgId, identity: &Identity) -> bool {
        self.read(org, |o| o.is_approver(identity)).unwrap_or(false)
    }

    /// Whether `org` is active.
    pub fn is_onboarded(&self, org: &OrgId) -> bool {
        self.read(org, |o| o.status == OrgStatus::Active)
            .unwrap_or(false)
    }

    /// History of state changes, oldest first.
    pub fn history(&self, org: &OrgId) -> Result<Vec<RegistryRecord>, RegistryError> {
        self.read(org, |o| o.history.clone())
    }

    /// A copy of the organization as of now.
    pub fn snapshot(&self, org: &OrgId) -> Option<Organization> {
        self.orgs.read().get(org).cloned()
    }

    /// Number of organizations with any history.
    pub fn len(&self) -> usize {
        self.orgs.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.orgs.read().is_empty()
    }

    fn read<R>(&self, org: &OrgId, f: impl FnOnce(&Organization) -> R) -> Result<R, RegistryError> {
        self.orgs
            .read()
            .get(org)
            .map(f)
            .ok_or(RegistryError::NotFound { org: *org })
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use organizer_core::ErrorCode;
    use proptest::prelude::*;

    /// Distinct approver sets of size 1..8 with a threshold in bounds.
    fn approvers_and_threshold() -> impl Strategy<Value = (Vec<Identity>, u32)> {
        prop::collection::btree_set(any::<[u8; 32]>(), 1..8).prop_flat_map(|set| {
            let approvers: Vec<Identity> = set.into_iter().map(Identity).collect();
            let n = approvers.len() as u32;
            (Just(approvers), 1..=n)
        })
    }

    proptest! {
        /// Onboarding then reading returns exactly what was onboarded.
        #[test]
        fn onboard_roundtrip((approvers, threshold) in approvers_and_threshold()) {
            let r = OrganizationRegistry::new();
            let org = OrgId::new(Identity([0xc0; 32]));
            r.onboard(org, approvers.clone(), threshold).unwrap();
            prop_assert_eq!(r.approvers(&org).unwrap(), approvers.clone());
            prop_assert_eq!(r.approver_count(&org).unwrap(), approvers.len());
            prop_assert_eq!(r.threshold(&org).unwrap(), threshold);
        }

        /// Out-of-range thresholds are rejected and leave no trace.
        #[test]
        fn onboard_out_of_range_threshold(
            (approvers, _) in approvers_and_threshold(),
            over in 1u32..4,
            zero in any::<bool>(),
        ) {
            let threshold = if zero { 0 } else { approvers.len() as u32 + over };
            let r = OrganizationRegistry::new();
            let org = OrgId::new(Identity([0xc0; 32]));
            let err = r.onboard(org, approvers, threshold).unwrap_err();
            prop_assert_eq!(err.code(), ErrorCode::InvalidThreshold);
            prop_assert!(r.snapshot(&org).is_none());
        }

        /// Non-controller modifications fail and change nothing.
        #[test]
        fn modify_by_stranger_is_unauthorized(
            (approvers, threshold) in approvers_and_threshold(),
            stranger in any::<[u8; 32]>(),
        ) {
            let controller = Identity([0xc0; 32]);
            prop_assume!(stranger != controller.0);
            let r = OrganizationRegistry::new();
            let org = OrgId::new(controller);
            r.onboard(org, approvers, threshold).unwrap();
            let before = r.snapshot(&org);
            let err = r
                .modify_approvers(&Identity(stranger), &org, &[Identity(stranger)], &[], 1)
                .unwrap_err();
            prop_assert_eq!(err.code(), ErrorCode::Unauthorized);
            prop_assert_eq!(r.snapshot(&org), before);
        }
    }
}
