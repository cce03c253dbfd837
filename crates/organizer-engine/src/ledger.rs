//! # Spend Ledger
//!
//! Records which payout leaves have executed. A leaf moves
//! `unspent → reserved → spent`, or back from `reserved` to `unspent`
//! when custody fails. `spent` is final.
//!
//! Reservation is all or nothing over a batch: if any leaf is already
//! reserved or spent, or appears twice in the batch, nothing is reserved.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

use organizer_core::Leaf;
use parking_lot::Mutex;
use thiserror::Error;

/// Handle for one batch's reserved leaves.
#[derive(Debug, PartialEq, Eq)]
#[must_use = "a reservation must be committed or released"]
pub struct Reservation {
    id: u64,
    leaves: Vec<Leaf>,
}

impl Reservation {
    pub fn leaves(&self) -> &[Leaf] {
        &self.leaves
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LedgerError {
    /// The leaf at `index` is spent, reserved by another batch, or repeats
    /// an earlier leaf of this one.
    #[error("leaf {leaf} at position {index} already spent")]
    AlreadySpent { index: usize, leaf: Leaf },
}

/// Durable map from leaf to spent flag, with batch reservations.
///
/// Implementations must make `reserve` atomic over the whole slice.
pub trait SpendLedger: Send + Sync {
    /// Reserve every leaf in `leaves`, or none.
    fn reserve(&self, leaves: &[Leaf]) -> Result<Reservation, LedgerError>;

    /// Mark a reservation's leaves spent. Irreversible.
    fn commit(&self, reservation: Reservation);

    /// Return a reservation's leaves to unspent.
    fn release(&self, reservation: Reservation);

    /// Whether `leaf` has been committed.
    fn is_spent(&self, leaf: &Leaf) -> bool;
}

/// Scoped reservation: released on drop unless committed or released
/// explicitly. A panic between reserve and commit returns the leaves to
/// unspent instead of leaving them reserved forever.
pub struct ReservationGuard<'a, L: SpendLedger + ?Sized> {
    ledger: &'a L,
    reservation: Option<Reservation>,
}

impl<'a, L: SpendLedger + ?Sized> ReservationGuard<'a, L> {
    /// Reserve `leaves` in `ledger`, all or none.
    pub fn reserve(ledger: &'a L, leaves: &[Leaf]) -> Result<Self, LedgerError> {
        let reservation = ledger.reserve(leaves)?;
        Ok(Self {
            ledger,
            reservation: Some(reservation),
        })
    }

    pub fn commit(mut self) {
        if let Some(reservation) = self.reservation.take() {
            self.ledger.commit(reservation);
        }
    }

    pub fn release(mut self) {
        if let Some(reservation) = self.reservation.take() {
            self.ledger.release(reservation);
        }
    }
}

impl<L: SpendLedger + ?Sized> Drop for ReservationGuard<'_, L> {
    fn drop(&mut self) {
        if let Some(reservation) = self.reservation.take() {
            tracing::warn!(
                reservation = reservation.id,
                leaves = reservation.leaves.len(),
                "reservation dropped uncommitted, releasing"
            );
            self.ledger.release(reservation);
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Entry {
    Reserved(u64),
    Spent,
}

/// Process-local ledger.
#[derive(Debug, Default)]
pub struct InMemoryLedger {
    entries: Mutex<HashMap<Leaf, Entry>>,
    next_id: AtomicU64,
}

impl InMemoryLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of committed leaves.
    pub fn spent_count(&self) -> usize {
        self.entries
            .lock()
            .values()
            .filter(|e| **e == Entry::Spent)
            .count()
    }
}

impl SpendLedger for InMemoryLedger {
    fn reserve(&self, leaves: &[Leaf]) -> Result<Reservation, LedgerError> {
        let mut entries = self.entries.lock();
        for (i, leaf) in leaves.iter().enumerate() {
            if entries.contains_key(leaf) || leaves[..i].contains(leaf) {
                return Err(LedgerError::AlreadySpent { index: i, leaf: *leaf });
            }
        }
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        for leaf in leaves {
            entries.insert(*leaf, Entry::Reserved(id));
        }
        Ok(Reservation {
            id,
            leaves: leaves.to_vec(),
        })
    }

    fn commit(&self, reservation: Reservation) {
        let mut entries = self.entries.lock();
        for leaf in &reservation.leaves {
            match entries.get_mut(leaf) {
                Some(entry) if *entry == Entry::Reserved(reservation.id) => *entry = Entry::Spent,
                _ => tracing::warn!(
                    leaf = %leaf,
                    reservation = reservation.id,
                    "commit of leaf not held by reservation"
                ),
            }
        }
    }

    fn release(&self, reservation: Reservation) {
        let mut entries = self.entries.lock();
        for leaf in &reservation.leaves {
            if entries.get(leaf) == Some(&Entry::Reserved(reservation.id)) {
                entries.remove(leaf);
            }
        }
    }

    fn is_spent(&self, leaf: &Leaf) -> bool {
        self.entries.lock().get(leaf) == Some(&Entry::Spent)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use organizer_core::Hash32;

    fn leaf(b: u8) -> Leaf {
        Leaf::from_hash(Hash32([b; 32]))
    }

    #[test]
    fn test_reserve_commit_marks_spent() {
        let ledger = InMemoryLedger::new();
        let r = ledger.reserve(&[leaf(1), leaf(2)]).unwrap();
        assert!(!ledger.is_spent(&leaf(1)));
        ledger.commit(r);
        assert!(ledger.is_spent(&leaf(1)));
        assert!(ledger.is_spent(&leaf(2)));
        assert_eq!(ledger.spent_count(), 2);
    }

    #[test]
    fn test_spent_leaf_cannot_be_reserved() {
        let ledger = InMemoryLedger::new();
        let r = ledger.reserve(&[leaf(1)]).unwrap();
        ledger.commit(r);
        let err = ledger.reserve(&[leaf(3), leaf(1)]).unwrap_err();
        assert_eq!(err, LedgerError::AlreadySpent { index: 1, leaf: leaf(1) });
        // Nothing from the failed batch was reserved.
        let r = ledger.reserve(&[leaf(3)]).unwrap();
        ledger.release(r);
    }

    #[test]
    fn test_duplicate_within_batch_rejected() {
        let ledger = InMemoryLedger::new();
        let err = ledger.reserve(&[leaf(4), leaf(5), leaf(4)]).unwrap_err();
        assert_eq!(err, LedgerError::AlreadySpent { index: 2, leaf: leaf(4) });
        assert!(ledger.reserve(&[leaf(4), leaf(5)]).is_ok());
    }

    #[test]
    fn test_release_returns_leaves() {
        let ledger = InMemoryLedger::new();
        let r = ledger.reserve(&[leaf(6)]).unwrap();
        assert!(ledger.reserve(&[leaf(6)]).is_err());
        ledger.release(r);
        assert!(!ledger.is_spent(&leaf(6)));
        let r = ledger.reserve(&[leaf(6)]).unwrap();
        ledger.commit(r);
        assert!(ledger.is_spent(&leaf(6)));
    }

    #[test]
    fn test_guard_releases_on_drop() {
        let ledger = InMemoryLedger::new();
        {
            let _guard = ReservationGuard::reserve(&ledger, &[leaf(9)]).unwrap();
            assert!(ledger.reserve(&[leaf(9)]).is_err());
        }
        assert!(!ledger.is_spent(&leaf(9)));
        let guard = ReservationGuard::reserve(&ledger, &[leaf(9)]).unwrap();
        guard.commit();
        assert!(ledger.is_spent(&leaf(9)));
    }

    #[test]
    fn test_guard_releases_on_unwind() {
        let ledger = InMemoryLedger::new();
        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            let _guard = ReservationGuard::reserve(&ledger, &[leaf(10)]).unwrap();
            panic!("custody crashed");
        }));
        assert!(result.is_err());
        let r = ledger.reserve(&[leaf(10)]).unwrap();
        ledger.release(r);
    }

    #[test]
    fn test_foreign_reservation_has_no_effect() {
        let ledger = InMemoryLedger::new();
        let other = InMemoryLedger::new();
        let held = ledger.reserve(&[leaf(7)]).unwrap();
        other.release(other.reserve(&[leaf(8)]).unwrap());
        let foreign = other.reserve(&[leaf(7)]).unwrap();
        ledger.commit(foreign);
        assert!(!ledger.is_spent(&leaf(7)));
        ledger.release(held);
        assert!(ledger.reserve(&[leaf(7)]).is_ok());
    }
}
