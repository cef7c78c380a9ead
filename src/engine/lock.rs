//! Per-table mutual exclusion
//!
//! One mutex slot per table name, created on first use and dropped again
//! once no guard holds or waits on it. Different names never contend.

use parking_lot::lock_api::ArcMutexGuard;
use parking_lot::{Mutex, RawMutex};
use std::collections::HashMap;
use std::sync::Arc;

type Slot = Arc<Mutex<()>>;

#[derive(Debug, Default)]
pub struct TableLocks {
    slots: Mutex<HashMap<String, Slot>>,
}

impl TableLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Block until the critical section for `table` is free, then enter it
    pub fn lock(&self, table: &str) -> TableGuard<'_> {
        let slot = {
            let mut slots = self.slots.lock();
            slots.entry(table.to_string()).or_default().clone()
        };

        TableGuard {
            locks: self,
            table: table.to_string(),
            guard: Some(slot.lock_arc()),
        }
    }

    /// Number of live slots
    pub fn slot_count(&self) -> usize {
        self.slots.lock().len()
    }
}

/// Held for the duration of one table's critical section
pub struct TableGuard<'a> {
    locks: &'a TableLocks,
    table: String,
    guard: Option<ArcMutexGuard<RawMutex, ()>>,
}

impl TableGuard<'_> {
    pub fn table(&self) -> &str {
        &self.table
    }
}

impl Drop for TableGuard<'_> {
    fn drop(&mut self) {
        // New waiters clone the slot under the map lock, so the count check
        // below cannot race with them.
        let mut slots = self.locks.slots.lock();
        self.guard.take();
        if slots
            .get(&self.table)
            .is_some_and(|slot| Arc::strong_count(slot) == 1)
        {
            slots.remove(&self.table);
        }
    }
}
