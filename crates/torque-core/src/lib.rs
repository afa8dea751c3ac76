//! # torque-core: Pure Portal Logic for Torque
//!
//! This crate holds everything the admin, customer and service-advisor portals
//! compute locally: billing, payload normalization, the booking wizard and the
//! table view-models. It performs no I/O.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Torque Portal Architecture                       │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                  Portal UI (CLI / browser)                      │   │
//! │  │   Service tables ──► Invoice modal ──► Payment ──► Dispatch     │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                  torque-api (REST client)                       │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │ raw JSON                               │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ torque-core (THIS CRATE) ★                      │   │
//! │  │                                                                 │   │
//! │  │  ┌────────────┐ ┌───────────┐ ┌──────────┐ ┌─────────────────┐  │   │
//! │  │  │ normalizer │►│  billing  │►│  table   │ │     wizard      │  │   │
//! │  │  │ raw → rec  │ │ GST, 30%  │ │ invoice  │ │ 4-step booking  │  │   │
//! │  │  └────────────┘ └───────────┘ └──────────┘ └─────────────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO NETWORK • NO CLOCK • PURE FUNCTIONS               │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain records (ServiceRecord, Customer, InventoryItem, ...)
//! - [`money`] - Money type with integer minor units
//! - [`normalizer`] - Multi-shape payload reconciliation
//! - [`billing`] - Invoice totals (labor discount, GST)
//! - [`wizard`] - Booking wizard state machine
//! - [`table`] - Pagination, search and row view-models
//! - [`store`] - Page state container with load sequencing
//! - [`invoice`] - Invoice document layout
//! - [`dashboard`] - Dashboard summary counts
//! - [`forms`] - Form payloads and their validation
//! - [`validation`] - Field-level validators
//! - [`error`] - Domain error types
//!
//! ## Example Usage
//!
//! ```rust
//! use torque_core::billing::calculate;
//! use torque_core::types::{LaborLine, MaterialLine};
//!
//! let materials = vec![MaterialLine::new("Brake pad", 2.0, 500.0)];
//! let labor = vec![LaborLine::new("Pad replacement", 2.0, 300.0)];
//!
//! let totals = calculate(&materials, &labor, "Premium");
//! assert_eq!(totals.grand_total.to_string(), "₹1675.60");
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod billing;
pub mod dashboard;
pub mod error;
pub mod forms;
pub mod invoice;
pub mod money;
pub mod normalizer;
pub mod store;
pub mod table;
pub mod types;
pub mod validation;
pub mod wizard;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use billing::InvoiceTotals;
pub use error::{CoreError, CoreResult, NormalizeError, ValidationError, WizardError};
pub use money::Money;
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// GST applied to (materials + labor - discount), in basis points.
///
/// ## Business Reason
/// Fixed at 18% for vehicle servicing; not configurable per customer.
pub const GST_BPS: u32 = 1800;

/// Premium membership discount on labor, in basis points.
///
/// Materials never receive this discount.
pub const PREMIUM_LABOR_DISCOUNT_BPS: u32 = 3000;

/// Rows per page when the caller does not configure one.
pub const DEFAULT_PAGE_SIZE: usize = 10;

/// Text of the single placeholder row rendered for an empty result set.
pub const NO_RESULTS_TEXT: &str = "No results found";

/// Maximum length of a table search query.
pub const MAX_SEARCH_QUERY_LEN: usize = 100;
