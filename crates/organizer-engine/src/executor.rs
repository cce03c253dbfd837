//! # Batch Executor
//!
//! [`Organizer`] owns the registry, the spend ledger and the custody
//! collaborator. Every mutating call (onboarding, approver changes,
//! offboarding, pausing, execution) runs under one lock, so those calls
//! are linearizable with respect to each other. Read queries go straight
//! to the registry and see a consistent snapshot.
//!
//! ## Execution order
//!
//! 1. Reject if paused.
//! 2. Validate batch shape: payout count within `max_batch_size`, one
//!    proof row per payout, one proof per submitted root in each row.
//! 3. Verify quorum over `(roots, signatures)`.
//! 4. For each payout, count accepted roots its leaf is proven in; fewer
//!    than the threshold rejects the batch with `InvalidProof`.
//! 5. Reserve every leaf at once; any spent leaf, or a leaf repeating an
//!    earlier payout of the batch, rejects it with `NonceAlreadySpent` at
//!    that payout's index.
//! 6. Hand the batch to custody. On failure release the reservation and
//!    report `TransferFailed`; on success commit it. A panicking custody
//!    releases the reservation while unwinding.
//!
//! Any error leaves the ledger exactly as it was and issues no transfer.

use std::sync::atomic::{AtomicBool, Ordering};

use organizer_core::{encode_leaf, AssetId, Hash32, Identity, Leaf, OrgId, Payout};
use organizer_crypto::{verify_membership, MerkleProof, RootSignature, SigningDomain};
use organizer_registry::{Organization, OrganizationRegistry, RegistryError, RegistryRecord};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

use crate::config::EngineConfig;
use crate::custody::{Custody, SpendCeiling, TransferBatch};
use crate::error::{ExecutionError, QuorumError};
use crate::ledger::{LedgerError, ReservationGuard, SpendLedger};
use crate::quorum::{Quorum, QuorumValidator};

/// Inclusion proofs indexed `[payout][root]`.
///
/// Row `i` holds one proof per submitted root, in the order the roots
/// were submitted. A proof for a root whose signature was rejected is
/// ignored.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProofMatrix(Vec<Vec<MerkleProof>>);

impl ProofMatrix {
    pub fn new(rows: Vec<Vec<MerkleProof>>) -> Self {
        Self(rows)
    }

    pub fn rows(&self) -> &[Vec<MerkleProof>] {
        &self.0
    }

    /// Proof of payout `payout` against root `root`.
    pub fn get(&self, payout: usize, root: usize) -> Option<&MerkleProof> {
        self.0.get(payout)?.get(root)
    }

    /// Check the matrix is `payouts × roots`.
    pub fn check_shape(&self, payouts: usize, roots: usize) -> Result<(), ExecutionError> {
        if self.0.len() != payouts {
            return Err(ExecutionError::shape(format!(
                "{} proof rows for {payouts} payouts",
                self.0.len()
            )));
        }
        if let Some((i, row)) = self.0.iter().enumerate().find(|(_, r)| r.len() != roots) {
            return Err(ExecutionError::shape(format!(
                "payout {i} has {} proofs for {roots} roots",
                row.len()
            )));
        }
        Ok(())
    }
}

/// A batch submitted for execution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchRequest {
    pub org: OrgId,
    pub payouts: Vec<Payout>,
    pub proofs: ProofMatrix,
    pub roots: Vec<Hash32>,
    /// `signatures[i]` signs `roots[i]`.
    pub signatures: Vec<RootSignature>,
    /// Forwarded to custody untouched.
    #[serde(default)]
    pub ceilings: Vec<SpendCeiling>,
}

/// Outcome of one executed payout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutionReceipt {
    /// Position in the submitted batch.
    pub index: usize,
    pub leaf: Leaf,
    pub payout: Payout,
    /// Indices of the accepted roots the leaf was proven in.
    pub proven_in: Vec<usize>,
}

/// The payout organizer.
pub struct Organizer<L, C> {
    config: EngineConfig,
    domain: SigningDomain,
    registry: OrganizationRegistry,
    ledger: L,
    custody: C,
    paused: AtomicBool,
    exec_lock: Mutex<()>,
}

impl<L: SpendLedger, C: Custody> Organizer<L, C> {
    pub fn new(config: EngineConfig, ledger: L, custody: C) -> Self {
        let domain = config.signing_domain();
        Self {
            config,
            domain,
            registry: OrganizationRegistry::new(),
            ledger,
            custody,
            paused: AtomicBool::new(false),
            exec_lock: Mutex::new(()),
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn signing_domain(&self) -> &SigningDomain {
        &self.domain
    }

    pub fn ledger(&self) -> &L {
        &self.ledger
    }

    pub fn custody(&self) -> &C {
        &self.custody
    }

    // ── Registry ────────────────────────────────────────────────────

    pub fn onboard(
        &self,
        org: OrgId,
        approvers: Vec<Identity>,
        threshold: u32,
    ) -> Result<(), RegistryError> {
        let _guard = self.exec_lock.lock();
        self.registry.onboard(org, approvers, threshold)
    }

    pub fn modify_approvers(
        &self,
        caller: &Identity,
        org: &OrgId,
        to_add: &[Identity],
        to_remove: &[Identity],
        new_threshold: u32,
    ) -> Result<(), RegistryError> {
        let _guard = self.exec_lock.lock();
        self.registry
            .modify_approvers(caller, org, to_add, to_remove, new_threshold)
    }

    pub fn offboard(&self, caller: &Identity, org: &OrgId) -> Result<(), RegistryError> {
        let _guard = self.exec_lock.lock();
        self.registry.offboard(caller, org)
    }

    pub fn approvers(&self, org: &OrgId) -> Result<Vec<Identity>, RegistryError> {
        self.registry.approvers(org)
    }

    pub fn approver_count(&self, org: &OrgId) -> Result<usize, RegistryError> {
        self.registry.approver_count(org)
    }

    pub fn threshold(&self, org: &OrgId) -> Result<u32, RegistryError> {
        self.registry.threshold(org)
    }

    pub fn is_approver(&self, org: &OrgId, identity: &Identity) -> bool {
        self.registry.is_approver(org, identity)
    }

    pub fn is_onboarded(&self, org: &OrgId) -> bool {
        self.registry.is_onboarded(org)
    }

    pub fn organization(&self, org: &OrgId) -> Option<Organization> {
        self.registry.snapshot(org)
    }

    pub fn history(&self, org: &OrgId) -> Result<Vec<RegistryRecord>, RegistryError> {
        self.registry.history(org)
    }

    // ── Operator ────────────────────────────────────────────────────

    /// Stop all execution. Master operator only.
    pub fn pause(&self, caller: &Identity) -> Result<(), ExecutionError> {
        self.set_paused(caller, true)
    }

    /// Resume execution. Master operator only.
    pub fn unpause(&self, caller: &Identity) -> Result<(), ExecutionError> {
        self.set_paused(caller, false)
    }

    pub fn is_paused(&self) -> bool {
        self.paused.load(Ordering::SeqCst)
    }

    fn set_paused(&self, caller: &Identity, paused: bool) -> Result<(), ExecutionError> {
        let _guard = self.exec_lock.lock();
        if self.config.master_operator.as_ref() != Some(caller) {
            return Err(ExecutionError::Unauthorized { caller: *caller });
        }
        self.paused.store(paused, Ordering::SeqCst);
        tracing::info!(paused, operator = %caller, "execution pause toggled");
        Ok(())
    }

    // ── Execution ───────────────────────────────────────────────────

    /// The commitment leaf of a payout.
    pub fn encode_leaf(&self, recipient: &Identity, asset: &AssetId, amount: u128, nonce: u64) -> Leaf {
        encode_leaf(recipient, asset, amount, nonce)
    }

    /// Whether `leaf` has executed.
    pub fn is_spent(&self, leaf: &Leaf) -> bool {
        self.ledger.is_spent(leaf)
    }

    /// Check signatures without touching the ledger.
    pub fn validate_payouts(
        &self,
        org: &OrgId,
        roots: &[Hash32],
        signatures: &[RootSignature],
    ) -> Result<Quorum, QuorumError> {
        QuorumValidator::new(&self.registry, &self.domain).verify(org, roots, signatures)
    }

    /// Execute one payout. Same rules as [`Organizer::execute_batch`].
    pub fn execute_single(
        &self,
        org: OrgId,
        payout: Payout,
        proofs: Vec<MerkleProof>,
        roots: Vec<Hash32>,
        signatures: Vec<RootSignature>,
    ) -> Result<ExecutionReceipt, ExecutionError> {
        let request = BatchRequest {
            org,
            payouts: vec![payout],
            proofs: ProofMatrix::new(vec![proofs]),
            roots,
            signatures,
            ceilings: Vec::new(),
        };
        let mut receipts = self.execute_batch(&request)?;
        receipts
            .pop()
            .ok_or_else(|| ExecutionError::shape("single payout produced no receipt"))
    }

    /// Execute a batch: every payout or none.
    pub fn execute_batch(
        &self,
        request: &BatchRequest,
    ) -> Result<Vec<ExecutionReceipt>, ExecutionError> {
        let _guard = self.exec_lock.lock();
        if self.is_paused() {
            return Err(ExecutionError::Paused);
        }

        let org = &request.org;
        let payouts = &request.payouts;
        if payouts.is_empty() {
            return Err(ExecutionError::shape("batch contains no payouts"));
        }
        if payouts.len() > self.config.max_batch_size {
            return Err(ExecutionError::shape(format!(
                "{} payouts exceed the batch limit of {}",
                payouts.len(),
                self.config.max_batch_size
            )));
        }
        request.proofs.check_shape(payouts.len(), request.roots.len())?;

        let quorum = self.validate_payouts(org, &request.roots, &request.signatures)?;

        let mut receipts = Vec::with_capacity(payouts.len());
        for (index, payout) in payouts.iter().enumerate() {
            let leaf = payout.leaf();
            let proven_in: Vec<usize> = quorum
                .accepted
                .iter()
                .filter(|a| {
                    request.proofs.get(index, a.index).is_some_and(|proof| {
                        verify_membership(self.config.pair_ordering, &leaf, proof, &a.root)
                    })
                })
                .map(|a| a.index)
                .collect();
            let proven = proven_in.len() as u32;
            if proven < quorum.threshold {
                tracing::warn!(org = %org, index, leaf = %leaf, proven, "payout not proven in enough roots");
                return Err(ExecutionError::InvalidProof {
                    index,
                    leaf,
                    proven,
                    required: quorum.threshold,
                });
            }
            tracing::debug!(org = %org, index, leaf = %leaf, proven, "payout proven");
            receipts.push(ExecutionReceipt {
                index,
                leaf,
                payout: *payout,
                proven_in,
            });
        }

        let leaves: Vec<Leaf> = receipts.iter().map(|r| r.leaf).collect();
        let reservation = ReservationGuard::reserve(&self.ledger, &leaves).map_err(|e| match e {
            LedgerError::AlreadySpent { index, leaf } => {
                ExecutionError::NonceAlreadySpent { index, leaf }
            }
        })?;

        let batch = TransferBatch {
            org: *org,
            payouts: payouts.clone(),
            ceilings: request.ceilings.clone(),
        };
        if let Err(e) = self.custody.transfer(&batch) {
            reservation.release();
            tracing::warn!(org = %org, payouts = payouts.len(), error = %e, "transfer failed, reservation released");
            return Err(ExecutionError::TransferFailed(e));
        }
        reservation.commit();

        tracing::info!(
            org = %org,
            payouts = payouts.len(),
            signers = quorum.accepted.len(),
            "batch executed"
        );
        Ok(receipts)
    }
}
