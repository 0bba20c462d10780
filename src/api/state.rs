//! Application state for the Payroll Computation Engine API.
//!
//! This module defines the shared application state that is available
//! to all request handlers.

use std::sync::Arc;

use crate::config::ConfigLoader;
use crate::store::{InMemoryStore, PayrollLedger};

/// Shared application state.
///
/// Holds the tenant configurations, the attendance and overtime store, and
/// the ledger of computed payroll records.
#[derive(Clone)]
pub struct AppState {
    config: Arc<ConfigLoader>,
    store: Arc<InMemoryStore>,
    ledger: Arc<PayrollLedger>,
}

impl AppState {
    /// Creates application state with an empty store and ledger.
    pub fn new(config: ConfigLoader) -> Self {
        Self::with_store(config, InMemoryStore::new())
    }

    /// Creates application state over an existing store.
    pub fn with_store(config: ConfigLoader, store: InMemoryStore) -> Self {
        Self {
            config: Arc::new(config),
            store: Arc::new(store),
            ledger: Arc::new(PayrollLedger::new()),
        }
    }

    /// Returns the tenant configurations.
    pub fn config(&self) -> &ConfigLoader {
        &self.config
    }

    /// Returns the data store.
    pub fn store(&self) -> &InMemoryStore {
        &self.store
    }

    /// Returns the payroll ledger.
    pub fn ledger(&self) -> &PayrollLedger {
        &self.ledger
    }
}
