//! # organizer-engine — Batch Payout Authorization
//!
//! Turns signed commitment roots and per-payout inclusion proofs into
//! authorized transfers, each payout at most once.
//!
//! ```text
//! roots + signatures ──▶ QuorumValidator ──▶ accepted roots
//!                                                 │
//! payouts + proofs ──────────────────────────────▶│ membership ≥ threshold
//!                                                 ▼
//!                                        SpendLedger::reserve
//!                                                 │
//!                                                 ▼
//!                               Custody::transfer ──ok──▶ commit
//!                                                 └─err─▶ release
//! ```
//!
//! [`Organizer`] is the façade. It owns the registry, the ledger and the
//! custody collaborator, and serializes every mutating call through one
//! lock.

pub mod config;
pub mod custody;
pub mod error;
pub mod executor;
pub mod ledger;
pub mod quorum;

pub use config::{ConfigError, EngineConfig};
pub use custody::{Custody, SpendCeiling, TransferBatch, TransferError};
pub use error::{ExecutionError, QuorumError};
pub use executor::{BatchRequest, ExecutionReceipt, Organizer, ProofMatrix};
pub use ledger::{InMemoryLedger, LedgerError, Reservation, ReservationGuard, SpendLedger};
pub use quorum::{AcceptedRoot, Quorum, QuorumValidator, RejectedSignature};
