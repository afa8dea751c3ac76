//! # Table View-Models
//!
//! Pagination and search over in-memory lists, plus the pre-formatted row
//! types every portal table renders.
//!
//! ## Paging
//! ```text
//! items (full list) ──search──► filtered indices ──page──► [start, end)
//!
//!   start = (page − 1) × page_size
//!   end   = min(page × page_size, filtered_len)
//!   page  ∈ [1, total_pages], total_pages = max(1, ⌈filtered_len / page_size⌉)
//! ```
//!
//! Search always runs over the full list and jumps back to page 1. An empty
//! result renders a single placeholder row instead of an empty body.

use serde::Serialize;
use ts_rs::TS;

use crate::billing::calculate_for;
use crate::error::ValidationError;
use crate::types::{
    Customer, InventoryItem, ServiceAdvisor, ServiceClass, ServiceRecord,
};
use crate::validation::validate_search_query;
use crate::{DEFAULT_PAGE_SIZE, NO_RESULTS_TEXT};

// =============================================================================
// Search
// =============================================================================

/// Types a table can filter with a free-text query.
pub trait Searchable {
    /// `needle` is already lowercased and non-empty.
    fn matches_filter(&self, needle: &str) -> bool;
}

fn any_contains(fields: &[&str], needle: &str) -> bool {
    fields.iter().any(|f| f.to_lowercase().contains(needle))
}

impl Searchable for ServiceRecord {
    fn matches_filter(&self, needle: &str) -> bool {
        let status = self.status.to_string();
        any_contains(
            &[
                self.request_id.as_str(),
                self.vehicle.brand.as_str(),
                self.vehicle.model.as_str(),
                self.vehicle.registration_number.as_str(),
                self.customer.name.as_str(),
                self.customer.email.as_str(),
                self.customer.phone.as_str(),
                self.service_type.as_deref().unwrap_or_default(),
                self.service_advisor_name.as_deref().unwrap_or_default(),
                status.as_str(),
            ],
            needle,
        )
    }
}

impl Searchable for Customer {
    fn matches_filter(&self, needle: &str) -> bool {
        let membership = self.membership.to_string();
        any_contains(
            &[
                self.name.as_str(),
                self.email.as_str(),
                self.phone.as_str(),
                self.city.as_str(),
                membership.as_str(),
            ],
            needle,
        )
    }
}

impl Searchable for InventoryItem {
    fn matches_filter(&self, needle: &str) -> bool {
        any_contains(
            &[self.item_id.as_str(), self.name.as_str(), self.category.as_str()],
            needle,
        )
    }
}

impl Searchable for ServiceAdvisor {
    fn matches_filter(&self, needle: &str) -> bool {
        any_contains(
            &[
                self.name.as_str(),
                self.email.as_str(),
                self.phone.as_str(),
                self.department.as_str(),
            ],
            needle,
        )
    }
}

// =============================================================================
// Table State
// =============================================================================

/// Paging and search state over one list.
#[derive(Debug, Clone)]
pub struct TableState<T> {
    items: Vec<T>,
    filtered: Vec<usize>,
    query: String,
    page_size: usize,
    current_page: usize,
}

impl<T: Searchable> TableState<T> {
    /// A zero page size falls back to [`DEFAULT_PAGE_SIZE`].
    pub fn new(items: Vec<T>, page_size: usize) -> Self {
        let mut state = TableState {
            items,
            filtered: Vec::new(),
            query: String::new(),
            page_size: if page_size == 0 { DEFAULT_PAGE_SIZE } else { page_size },
            current_page: 1,
        };
        state.refilter();
        state
    }

    /// Replaces the list (after a reload); the active query is re-applied and
    /// paging restarts at page 1.
    pub fn replace(&mut self, items: Vec<T>) {
        self.items = items;
        self.refilter();
    }

    /// Filters the full list. Resets to page 1.
    pub fn search(&mut self, query: &str) -> Result<(), ValidationError> {
        self.query = validate_search_query(query)?.to_lowercase();
        self.refilter();
        Ok(())
    }

    /// Appends one item; the active query is re-applied.
    pub fn push(&mut self, item: T) {
        self.items.push(item);
        self.refilter();
    }

    pub fn clear_search(&mut self) {
        self.query.clear();
        self.refilter();
    }

    fn refilter(&mut self) {
        self.filtered = if self.query.is_empty() {
            (0..self.items.len()).collect()
        } else {
            self.items
                .iter()
                .enumerate()
                .filter(|(_, item)| item.matches_filter(&self.query))
                .map(|(i, _)| i)
                .collect()
        };
        self.current_page = 1;
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn items(&self) -> &[T] {
        &self.items
    }

    pub fn items_mut(&mut self) -> &mut [T] {
        &mut self.items
    }

    pub fn total_len(&self) -> usize {
        self.items.len()
    }

    pub fn filtered_len(&self) -> usize {
        self.filtered.len()
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    pub fn current_page(&self) -> usize {
        self.current_page
    }

    /// Never less than 1, so an empty table still has a page to show.
    pub fn total_pages(&self) -> usize {
        self.filtered.len().div_ceil(self.page_size).max(1)
    }

    /// Half-open range into the filtered list for the current page.
    pub fn page_bounds(&self) -> (usize, usize) {
        let start = (self.current_page - 1) * self.page_size;
        let end = (self.current_page * self.page_size).min(self.filtered.len());
        (start.min(end), end)
    }

    pub fn page_items(&self) -> Vec<&T> {
        let (start, end) = self.page_bounds();
        self.filtered[start..end]
            .iter()
            .map(|&i| &self.items[i])
            .collect()
    }

    /// Jumps to `page`, clamped to `[1, total_pages]`. Returns the new page.
    pub fn go_to(&mut self, page: usize) -> usize {
        self.current_page = page.clamp(1, self.total_pages());
        self.current_page
    }

    pub fn next_page(&mut self) -> usize {
        self.go_to(self.current_page + 1)
    }

    pub fn prev_page(&mut self) -> usize {
        self.go_to(self.current_page.saturating_sub(1))
    }

    /// Formats the current page with `to_row`.
    pub fn view<R>(&self, to_row: impl Fn(&T) -> R) -> TableView<R> {
        let (start, end) = self.page_bounds();
        let body = if self.filtered.is_empty() {
            TableBody::Placeholder(NO_RESULTS_TEXT)
        } else {
            TableBody::Rows(self.page_items().into_iter().map(to_row).collect())
        };
        let showing = if self.filtered.is_empty() {
            "Showing 0 entries".to_string()
        } else {
            format!("Showing {}-{} of {} entries", start + 1, end, self.filtered.len())
        };
        TableView {
            body,
            current_page: self.current_page,
            total_pages: self.total_pages(),
            has_prev: self.current_page > 1,
            has_next: self.current_page < self.total_pages(),
            showing,
        }
    }
}

/// What a renderer draws for one page.
#[derive(Debug, Clone, PartialEq)]
pub struct TableView<R> {
    pub body: TableBody<R>,
    pub current_page: usize,
    pub total_pages: usize,
    pub has_prev: bool,
    pub has_next: bool,
    pub showing: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum TableBody<R> {
    Rows(Vec<R>),
    /// Exactly one row carrying this text.
    Placeholder(&'static str),
}

// =============================================================================
// Row View-Models
// =============================================================================

/// A row type with fixed column headers and already-formatted cells.
pub trait TableRow {
    const HEADERS: &'static [&'static str];

    fn cells(&self) -> Vec<String>;
}

#[derive(Debug, Clone, PartialEq, Serialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct ServiceRow {
    pub request_id: String,
    pub vehicle: String,
    pub customer: String,
    pub membership: String,
    pub service_type: String,
    pub status: String,
    pub advisor: String,
    pub amount: String,
    pub billing: String,
}

impl From<&ServiceRecord> for ServiceRow {
    fn from(record: &ServiceRecord) -> Self {
        let completed = record.classification() == ServiceClass::Completed;
        let billing = match (completed, record.has_invoice, record.is_paid, record.is_delivered) {
            (false, ..) => "-",
            (true, false, ..) => "Invoice pending",
            (true, true, false, _) => "Unpaid",
            (true, true, true, false) => "Paid",
            (true, true, true, true) => "Delivered",
        };
        ServiceRow {
            request_id: record.request_id.clone(),
            vehicle: record.vehicle.display_name(),
            customer: record.customer.name.clone(),
            membership: record.customer.membership.to_string(),
            service_type: record.service_type.clone().unwrap_or_else(|| "-".to_string()),
            status: record.status.to_string(),
            advisor: record
                .service_advisor_name
                .clone()
                .unwrap_or_else(|| "Unassigned".to_string()),
            amount: if completed {
                calculate_for(record).grand_total.to_string()
            } else {
                "-".to_string()
            },
            billing: billing.to_string(),
        }
    }
}

impl TableRow for ServiceRow {
    const HEADERS: &'static [&'static str] = &[
        "ID", "Vehicle", "Customer", "Membership", "Service", "Status", "Advisor", "Amount",
        "Billing",
    ];

    fn cells(&self) -> Vec<String> {
        vec![
            self.request_id.clone(),
            self.vehicle.clone(),
            self.customer.clone(),
            self.membership.clone(),
            self.service_type.clone(),
            self.status.clone(),
            self.advisor.clone(),
            self.amount.clone(),
            self.billing.clone(),
        ]
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct CustomerRow {
    pub customer_id: String,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub address: String,
    pub membership: String,
}

impl From<&Customer> for CustomerRow {
    fn from(customer: &Customer) -> Self {
        CustomerRow {
            customer_id: customer.customer_id.clone(),
            name: customer.name.clone(),
            email: customer.email.clone(),
            phone: customer.phone.clone(),
            address: customer.address_line(),
            membership: customer.membership.to_string(),
        }
    }
}

impl TableRow for CustomerRow {
    const HEADERS: &'static [&'static str] =
        &["ID", "Name", "Email", "Phone", "Address", "Membership"];

    fn cells(&self) -> Vec<String> {
        vec![
            self.customer_id.clone(),
            self.name.clone(),
            self.email.clone(),
            self.phone.clone(),
            self.address.clone(),
            self.membership.clone(),
        ]
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct InventoryRow {
    pub item_id: String,
    pub name: String,
    pub category: String,
    pub stock: String,
    pub unit_price: String,
    pub stock_status: String,
}

impl From<&InventoryItem> for InventoryRow {
    fn from(item: &InventoryItem) -> Self {
        InventoryRow {
            item_id: item.item_id.clone(),
            name: item.name.clone(),
            category: item.category.clone(),
            stock: format!("{} (reorder at {})", item.current_stock, item.reorder_level),
            unit_price: item.price().to_string(),
            stock_status: item.stock_status().to_string(),
        }
    }
}

impl TableRow for InventoryRow {
    const HEADERS: &'static [&'static str] =
        &["ID", "Item", "Category", "Stock", "Unit price", "Status"];

    fn cells(&self) -> Vec<String> {
        vec![
            self.item_id.clone(),
            self.name.clone(),
            self.category.clone(),
            self.stock.clone(),
            self.unit_price.clone(),
            self.stock_status.clone(),
        ]
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct AdvisorRow {
    pub advisor_id: String,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub department: String,
    pub workload: String,
    pub availability: String,
}

impl From<&ServiceAdvisor> for AdvisorRow {
    fn from(advisor: &ServiceAdvisor) -> Self {
        AdvisorRow {
            advisor_id: advisor.advisor_id.clone(),
            name: advisor.name.clone(),
            email: advisor.email.clone(),
            phone: advisor.phone.clone(),
            department: advisor.department.clone(),
            workload: format!("{} active", advisor.active_services),
            availability: if advisor.available { "Available" } else { "Busy" }.to_string(),
        }
    }
}

impl TableRow for AdvisorRow {
    const HEADERS: &'static [&'static str] =
        &["ID", "Name", "Email", "Phone", "Department", "Workload", "Availability"];

    fn cells(&self) -> Vec<String> {
        vec![
            self.advisor_id.clone(),
            self.name.clone(),
            self.email.clone(),
            self.phone.clone(),
            self.department.clone(),
            self.workload.clone(),
            self.availability.clone(),
        ]
    }
}

/// Keeps only the records of one table (due, in service or completed).
pub fn services_in(records: &[ServiceRecord], class: ServiceClass) -> Vec<ServiceRecord> {
    records
        .iter()
        .filter(|r| r.classification() == class)
        .cloned()
        .collect()
}

// =============================================================================
// Unit Tests
// =============================================================================
