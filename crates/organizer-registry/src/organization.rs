//! # Organization State Machine
//!
//! An [`Organization`] validates and applies its own transitions. The
//! registry wraps it with storage and locking; every rule about approver
//! sets and thresholds lives here.

use organizer_core::{Identity, OrgId, Timestamp};
use serde::{Deserialize, Serialize};

use crate::error::RegistryError;

/// Lifecycle status of a registered organization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OrgStatus {
    Active,
    Offboarded,
}

impl std::fmt::Display for OrgStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Active => f.write_str("ACTIVE"),
            Self::Offboarded => f.write_str("OFFBOARDED"),
        }
    }
}

/// A state change recorded in an organization's history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum RegistryEvent {
    OrgOnboarded {
        approvers: Vec<Identity>,
        threshold: u32,
    },
    ApproverAdded {
        approver: Identity,
    },
    ApproverRemoved {
        approver: Identity,
    },
    ThresholdChanged {
        from: u32,
        to: u32,
    },
    OrgOffboarded,
}

/// A history entry: what happened and when.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistryRecord {
    pub event: RegistryEvent,
    pub at: Timestamp,
}

/// An organization, its approvers, and its history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Organization {
    /// Identifier; also names the controlling identity.
    pub id: OrgId,
    /// Current approvers in insertion order, no duplicates.
    pub approvers: Vec<Identity>,
    /// Distinct approvals required. Zero once offboarded.
    pub threshold: u32,
    pub status: OrgStatus,
    /// Every state change since first onboarding.
    pub history: Vec<RegistryRecord>,
}

/// Check `1 <= threshold <= |approvers|` and that `approvers` is a set.
pub fn validate_approver_set(approvers: &[Identity], threshold: u32) -> Result<(), RegistryError> {
    for (i, approver) in approvers.iter().enumerate() {
        if approvers[..i].contains(approver) {
            return Err(RegistryError::DuplicateApprover {
                approver: *approver,
            });
        }
    }
    if threshold < 1 || threshold as usize > approvers.len() {
        return Err(RegistryError::InvalidThreshold {
            threshold,
            approvers: approvers.len(),
        });
    }
    Ok(())
}

impl Organization {
    /// A newly onboarded organization.
    pub fn onboard(
        id: OrgId,
        approvers: Vec<Identity>,
        threshold: u32,
    ) -> Result<Self, RegistryError> {
        validate_approver_set(&approvers, threshold)?;
        let mut org = Self {
            id,
            approvers: Vec::new(),
            threshold: 0,
            status: OrgStatus::Offboarded,
            history: Vec::new(),
        };
        org.activate(approvers, threshold);
        Ok(org)
    }

    /// Onboard again after offboarding. History is kept.
    pub fn reonboard(&mut self, approvers: Vec<Identity>, threshold: u32) -> Result<(), RegistryError> {
        if self.is_active() {
            return Err(RegistryError::AlreadyOnboarded { org: self.id });
        }
        validate_approver_set(&approvers, threshold)?;
        self.activate(approvers, threshold);
        Ok(())
    }

    fn activate(&mut self, approvers: Vec<Identity>, threshold: u32) {
        self.record(RegistryEvent::OrgOnboarded {
            approvers: approvers.clone(),
            threshold,
        });
        self.approvers = approvers;
        self.threshold = threshold;
        self.status = OrgStatus::Active;
    }

    /// Replace the approver set with `(current ∪ to_add) \ to_remove` and
    /// set the threshold, all or nothing.
    ///
    /// Identities in `to_add` that are already approvers, and identities in
    /// `to_remove` that are not, are ignored.
    pub fn modify_approvers(
        &mut self,
        caller: &Identity,
        to_add: &[Identity],
        to_remove: &[Identity],
        new_threshold: u32,
    ) -> Result<(), RegistryError> {
        self.require_controller(caller)?;

        let mut next = self.approvers.clone();
        for approver in to_add {
            if !next.contains(approver) {
                next.push(*approver);
            }
        }
        next.retain(|a| !to_remove.contains(a));
        validate_approver_set(&next, new_threshold)?;

        let added: Vec<Identity> = next
            .iter()
            .filter(|a| !self.approvers.contains(a))
            .copied()
            .collect();
        let removed: Vec<Identity> = self
            .approvers
            .iter()
            .filter(|a| !next.contains(a))
            .copied()
            .collect();
        for approver in added {
            self.record(RegistryEvent::ApproverAdded { approver });
        }
        for approver in removed {
            self.record(RegistryEvent::ApproverRemoved { approver });
        }
        if new_threshold != self.threshold {
            self.record(RegistryEvent::ThresholdChanged {
                from: self.threshold,
                to: new_threshold,
            });
        }
        self.approvers = next;
        self.threshold = new_threshold;
        Ok(())
    }

    /// Clear approvers, zero the threshold, and mark offboarded.
    pub fn offboard(&mut self, caller: &Identity) -> Result<(), RegistryError> {
        self.require_controller(caller)?;
        self.record(RegistryEvent::OrgOffboarded);
        self.approvers.clear();
        self.threshold = 0;
        self.status = OrgStatus::Offboarded;
        Ok(())
    }

    pub fn is_active(&self) -> bool {
        self.status == OrgStatus::Active
    }

    pub fn is_approver(&self, identity: &Identity) -> bool {
        self.approvers.contains(identity)
    }

    // Not active is reported before a wrong caller.
    fn require_controller(&self, caller: &Identity) -> Result<(), RegistryError> {
        if !self.is_active() {
            return Err(RegistryError::NotOnboarded { org: self.id });
        }
        if !self.id.is_controller(caller) {
            return Err(RegistryError::Unauthorized {
                org: self.id,
                caller: *caller,
            });
        }
        Ok(())
    }

    fn record(&mut self, event: RegistryEvent) {
        self.history.push(RegistryRecord {
            event,
            at: Timestamp::now(),
        });
    }
}
