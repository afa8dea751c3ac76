//! # torque-api: REST Client for the Torque Portals
//!
//! Talks to the Torque backend on behalf of the admin, customer and
//! service-advisor portals. All decoding and arithmetic is delegated to
//! `torque-core`; this crate owns the network, the token and the files.
//!
//! ## Architecture Overview
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         torque-api Architecture                         │
//! │                                                                         │
//! │  ┌──────────────────────────────────────────────────────────────────┐  │
//! │  │              Portal front-ends (CLI in apps/portal)              │  │
//! │  └────────────────────────────┬─────────────────────────────────────┘  │
//! │                               │                                         │
//! │    ┌──────────────┬───────────┼────────────┬──────────────┐            │
//! │    ▼              ▼           ▼            ▼              ▼             │
//! │  ┌──────────┐ ┌──────────┐ ┌──────────┐ ┌──────────┐ ┌──────────────┐  │
//! │  │ServiceDsk│ │Customers │ │Inventory │ │ Advisors │ │ BookingFlow  │  │
//! │  │ invoice  │ │  CRUD    │ │ CRUD +   │ │ CRUD +   │ │ 4-step       │  │
//! │  │ pay/disp │ │          │ │ low stock│ │ assign   │ │ wizard       │  │
//! │  └────┬─────┘ └────┬─────┘ └────┬─────┘ └────┬─────┘ └──────┬───────┘  │
//! │       │ EndpointChain / ActionLock          │               │          │
//! │       └────────────┴────────────┼────────────┴───────────────┘          │
//! │                                 ▼                                       │
//! │  ┌──────────────────────────────────────────────────────────────────┐  │
//! │  │           ApiTransport (HttpClient, bearer token)                │  │
//! │  │   401/403 → SessionExpired { redirect: /login?error=... }        │  │
//! │  └──────────────────────────────────────────────────────────────────┘  │
//! │                                                                         │
//! │  InvoiceExporter: local PDF (printpdf) ──fails──► server download      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`config`] - `portal.toml` loading with env overrides
//! - [`auth`] - Token resolution and storage
//! - [`http`] - `ApiTransport` trait and the reqwest client
//! - [`fallback`] - Endpoint fallback chains and fixed retries
//! - [`guard`] - Single-flight action locks
//! - [`endpoints`] - Backend paths
//! - [`services`] - Service lists, invoices, payment, dispatch
//! - [`customers`], [`inventory`], [`advisors`] - Admin CRUD screens
//! - [`booking`] - Customer booking flow
//! - [`dashboard`] - Dashboard summary loader
//! - [`pdf`] - Invoice PDF rendering and export
//! - [`pages`] - Applying loads to a page store
//! - [`error`] - Client error types
//!
//! ## Usage
//!
//! ```rust,ignore
//! use torque_api::{HttpClient, PortalConfig, ServiceDesk};
//! use torque_core::types::ServiceClass;
//!
//! let config = PortalConfig::load_or_default(None);
//! let client = HttpClient::new(&config.api)?.with_token(token);
//!
//! let due = ServiceDesk::new(&client).list(ServiceClass::Due).await?;
//! println!("{} vehicles waiting", due.len());
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod advisors;
pub mod auth;
pub mod booking;
pub mod config;
pub mod customers;
pub mod dashboard;
mod decode;
pub mod endpoints;
pub mod error;
pub mod fallback;
pub mod guard;
pub mod http;
pub mod inventory;
pub mod pages;
pub mod pdf;
pub mod services;

#[cfg(test)]
mod testing;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use advisors::AdvisorRoster;
pub use auth::{resolve_token, ResolvedToken, TokenSource};
pub use booking::{BookingFlow, BookingReceipt};
pub use config::PortalConfig;
pub use customers::CustomerDirectory;
pub use dashboard::DashboardLoader;
pub use error::{ClientError, ClientResult};
pub use guard::ActionLock;
pub use http::{ApiTransport, HttpClient};
pub use inventory::InventoryCatalog;
pub use pdf::{ExportedInvoice, InvoiceExporter, PdfSource};
pub use services::{InvoicePreview, ServiceDesk};
