//! Computed payroll records, one per (employee, month, year).

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError, RwLock};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::EngineResult;
use crate::models::{PayPeriod, PayrollRecord};

/// Identity of a payroll record.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LedgerKey {
    /// The employee.
    pub employee_id: String,
    /// The month and year.
    pub period: PayPeriod,
}

impl LedgerKey {
    /// Creates a key.
    pub fn new(employee_id: impl Into<String>, period: PayPeriod) -> Self {
        Self {
            employee_id: employee_id.into(),
            period,
        }
    }
}

/// A stored payroll record and the number of times it has been written.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerEntry {
    /// The latest record.
    pub record: PayrollRecord,
    /// Starts at 1 and increases by one on every write.
    pub revision: u64,
}

type Slot = Arc<Mutex<Option<LedgerEntry>>>;

/// Holds the current payroll record of every (employee, month, year).
///
/// Writes for the same key are serialised by a per-key lock so concurrent
/// recomputations cannot lose updates; writes for different keys do not
/// contend. A write always replaces the record, it never appends.
#[derive(Debug, Default)]
pub struct PayrollLedger {
    slots: RwLock<HashMap<LedgerKey, Slot>>,
}

impl PayrollLedger {
    /// Creates an empty ledger.
    pub fn new() -> Self {
        Self::default()
    }

    fn slot(&self, key: &LedgerKey) -> Slot {
        if let Some(slot) = self
            .slots
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
        {
            return Arc::clone(slot);
        }
        let mut slots = self.slots.write().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(slots.entry(key.clone()).or_default())
    }

    /// Rebuilds the record for `key` while holding its lock.
    ///
    /// `compute` runs with the key locked, so two recomputations of the same
    /// key never interleave. On failure the stored record is left untouched.
    pub fn recompute<F>(&self, key: &LedgerKey, compute: F) -> EngineResult<LedgerEntry>
    where
        F: FnOnce() -> EngineResult<PayrollRecord>,
    {
        let slot = self.slot(key);
        let mut guard = slot.lock().unwrap_or_else(PoisonError::into_inner);
        let record = compute()?;
        let revision = guard.as_ref().map_or(1, |entry| entry.revision + 1);
        let entry = LedgerEntry { record, revision };
        *guard = Some(entry.clone());
        debug!(
            employee_id = %key.employee_id,
            month = key.period.month,
            year = key.period.year,
            revision,
            "Payroll record stored"
        );
        Ok(entry)
    }

    /// Stores an already computed record, replacing any previous one.
    pub fn store(&self, record: PayrollRecord) -> LedgerEntry {
        let key = LedgerKey::new(record.employee_id.clone(), record.period);
        let slot = self.slot(&key);
        let mut guard = slot.lock().unwrap_or_else(PoisonError::into_inner);
        let revision = guard.as_ref().map_or(1, |entry| entry.revision + 1);
        let entry = LedgerEntry { record, revision };
        *guard = Some(entry.clone());
        entry
    }

    /// Returns the current entry for `key`.
    pub fn get(&self, key: &LedgerKey) -> Option<LedgerEntry> {
        let slot = self
            .slots
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .cloned()?;
        let guard = slot.lock().unwrap_or_else(PoisonError::into_inner);
        guard.clone()
    }

    /// Number of stored records.
    pub fn len(&self) -> usize {
        self.slots
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .values()
            .filter(|slot| {
                slot.lock()
                    .unwrap_or_else(PoisonError::into_inner)
                    .is_some()
            })
            .count()
    }

    /// True when no record is stored.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
