//! # Page Store
//!
//! Explicit state for one portal page: the loaded list with its table state,
//! the selected entity and load sequencing.
//!
//! ## Load Sequencing
//! ```text
//!   begin_load() ─► ticket 1 ──────────────────────────┐ (slow)
//!   begin_load() ─► ticket 2 ───────┐                   │
//!                                    ▼                   ▼
//!                       finish_load(2) Applied   finish_load(1) Superseded
//!                                                 (response dropped)
//! ```
//!
//! Only the most recently *started* load may replace the list, regardless of
//! the order in which responses arrive.

use crate::table::{Searchable, TableState};
use crate::types::{Customer, InventoryItem, ServiceAdvisor, ServiceRecord};

/// Entities a store can select by id.
pub trait Keyed {
    fn key(&self) -> &str;
}

impl Keyed for ServiceRecord {
    fn key(&self) -> &str {
        &self.request_id
    }
}

impl Keyed for Customer {
    fn key(&self) -> &str {
        &self.customer_id
    }
}

impl Keyed for InventoryItem {
    fn key(&self) -> &str {
        &self.item_id
    }
}

impl Keyed for ServiceAdvisor {
    fn key(&self) -> &str {
        &self.advisor_id
    }
}

/// Identifies one started load.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct LoadTicket(u64);

impl LoadTicket {
    pub fn sequence(&self) -> u64 {
        self.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    Applied,
    /// A newer load was started after this one; its result was ignored.
    Superseded { ticket: LoadTicket, latest: LoadTicket },
}

#[derive(Debug, Clone)]
pub struct PageStore<T> {
    table: TableState<T>,
    latest: LoadTicket,
    loading: bool,
    selected: Option<String>,
    last_error: Option<String>,
}

impl<T: Searchable + Keyed> PageStore<T> {
    pub fn new(page_size: usize) -> Self {
        PageStore {
            table: TableState::new(Vec::new(), page_size),
            latest: LoadTicket(0),
            loading: false,
            selected: None,
            last_error: None,
        }
    }

    /// Starts a load; any earlier load still in flight is superseded.
    pub fn begin_load(&mut self) -> LoadTicket {
        self.latest = LoadTicket(self.latest.0 + 1);
        self.loading = true;
        self.latest
    }

    /// Applies a load result if `ticket` is still the latest.
    ///
    /// A selection that no longer exists in the new list is cleared.
    pub fn finish_load(&mut self, ticket: LoadTicket, items: Vec<T>) -> LoadOutcome {
        if let Some(outcome) = self.check_superseded(ticket) {
            return outcome;
        }
        self.table.replace(items);
        self.loading = false;
        self.last_error = None;
        if let Some(key) = &self.selected {
            if !self.table.items().iter().any(|item| item.key() == key) {
                self.selected = None;
            }
        }
        LoadOutcome::Applied
    }

    /// Records a failed load; the previous list stays visible.
    pub fn fail_load(&mut self, ticket: LoadTicket, message: impl Into<String>) -> LoadOutcome {
        if let Some(outcome) = self.check_superseded(ticket) {
            return outcome;
        }
        self.loading = false;
        self.last_error = Some(message.into());
        LoadOutcome::Applied
    }

    fn check_superseded(&self, ticket: LoadTicket) -> Option<LoadOutcome> {
        (ticket != self.latest).then_some(LoadOutcome::Superseded {
            ticket,
            latest: self.latest,
        })
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub fn table(&self) -> &TableState<T> {
        &self.table
    }

    pub fn table_mut(&mut self) -> &mut TableState<T> {
        &mut self.table
    }

    /// Selects the entity with `key`; returns false (and changes nothing) when
    /// no such entity is loaded.
    pub fn select(&mut self, key: &str) -> bool {
        let exists = self.table.items().iter().any(|item| item.key() == key);
        if exists {
            self.selected = Some(key.to_string());
        }
        exists
    }

    pub fn selected(&self) -> Option<&T> {
        let key = self.selected.as_deref()?;
        self.table.items().iter().find(|item| item.key() == key)
    }

    pub fn clear_selection(&mut self) {
        self.selected = None;
    }

    /// Replaces one loaded entity in place after a successful edit.
    pub fn upsert(&mut self, item: T) {
        let position = self
            .table
            .items()
            .iter()
            .position(|existing| existing.key() == item.key());
        match position {
            Some(index) => self.table.items_mut()[index] = item,
            None => self.table.push(item),
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
