//! # Domain Types
//!
//! Core domain types shared by every portal.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │  ServiceRecord  │   │    Customer     │   │  InventoryItem  │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  request_id     │   │  customer_id    │   │  item_id        │       │
//! │  │  vehicle        │   │  membership     │   │  current_stock  │       │
//! │  │  customer       │   │  address parts  │   │  reorder_level  │       │
//! │  │  status         │   └─────────────────┘   └─────────────────┘       │
//! │  │  materials[]    │                                                    │
//! │  │  labor_charges[]│   ┌─────────────────┐   ┌─────────────────┐       │
//! │  └─────────────────┘   │  ServiceStatus  │   │   Membership    │       │
//! │                        │  Received       │   │   Standard      │       │
//! │                        │  Diagnosis      │   │   Premium       │       │
//! │                        │  Repair         │   └─────────────────┘       │
//! │                        │  Completed      │                              │
//! │                        └─────────────────┘                              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The serde derives describe the canonical camelCase form these types are
//! written in. Backend payloads vary in shape and are read through
//! [`crate::normalizer`].

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use ts_rs::TS;

use crate::error::{CoreError, CoreResult};
use crate::money::Money;

// =============================================================================
// Rate
// =============================================================================

/// A percentage represented in basis points (bps).
///
/// 1 basis point = 0.01%, so 1800 bps = 18% GST and 3000 bps = 30% discount.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Rate(u32);

impl Rate {
    /// Creates a rate from basis points.
    #[inline]
    pub const fn from_bps(bps: u32) -> Self {
        Rate(bps)
    }

    /// Returns the rate in basis points.
    #[inline]
    pub const fn bps(&self) -> u32 {
        self.0
    }

    /// Returns the rate as a percentage (for display only).
    #[inline]
    pub fn percentage(&self) -> f64 {
        self.0 as f64 / 100.0
    }
}

// =============================================================================
// Membership
// =============================================================================

/// Customer membership tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
pub enum Membership {
    #[default]
    Standard,
    /// Receives the labor discount.
    Premium,
}

impl Membership {
    /// Reads a free-form membership string.
    ///
    /// Anything containing "premium" (any case) is Premium; everything else,
    /// including empty or unknown strings, is Standard.
    ///
    /// ## Example
    /// ```rust
    /// use torque_core::types::Membership;
    ///
    /// assert_eq!(Membership::from_label("PREMIUM_GOLD"), Membership::Premium);
    /// assert_eq!(Membership::from_label("basic"), Membership::Standard);
    /// ```
    pub fn from_label(label: &str) -> Self {
        if label.to_lowercase().contains("premium") {
            Membership::Premium
        } else {
            Membership::Standard
        }
    }

    pub fn is_premium(&self) -> bool {
        matches!(self, Membership::Premium)
    }
}

impl fmt::Display for Membership {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Membership::Standard => write!(f, "Standard"),
            Membership::Premium => write!(f, "Premium"),
        }
    }
}

// =============================================================================
// Service Status
// =============================================================================

/// Workflow status of a service request.
///
/// ## Transitions
/// ```text
/// Received ──► Diagnosis ──► Repair ──► Completed (terminal)
///     └────────────┴────────────┴──────────► (forward skips allowed)
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Serialize, Deserialize, TS)]
#[ts(export)]
pub enum ServiceStatus {
    #[default]
    Received,
    Diagnosis,
    Repair,
    Completed,
}

impl ServiceStatus {
    /// Position in the workflow, starting at 0.
    pub fn rank(&self) -> u8 {
        *self as u8
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, ServiceStatus::Completed)
    }

    /// True when `next` is strictly later in the workflow.
    pub fn can_advance_to(&self, next: ServiceStatus) -> bool {
        !self.is_terminal() && next > *self
    }
}

impl fmt::Display for ServiceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ServiceStatus::Received => write!(f, "Received"),
            ServiceStatus::Diagnosis => write!(f, "Diagnosis"),
            ServiceStatus::Repair => write!(f, "Repair"),
            ServiceStatus::Completed => write!(f, "Completed"),
        }
    }
}

impl FromStr for ServiceStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key: String = s
            .chars()
            .filter(|c| c.is_alphanumeric())
            .collect::<String>()
            .to_lowercase();
        match key.as_str() {
            "received" | "new" | "pending" | "requested" => Ok(ServiceStatus::Received),
            "diagnosis" | "diagnosing" | "inspection" => Ok(ServiceStatus::Diagnosis),
            "repair" | "repairing" | "inprogress" | "inservice" => Ok(ServiceStatus::Repair),
            "completed" | "complete" | "done" | "finished" => Ok(ServiceStatus::Completed),
            _ => Err(format!("Unknown service status: '{}'", s)),
        }
    }
}

/// Which admin table a service request belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum ServiceClass {
    /// No advisor assigned yet.
    Due,
    /// Advisor assigned, work not finished.
    InService,
    Completed,
}

impl fmt::Display for ServiceClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ServiceClass::Due => write!(f, "Due"),
            ServiceClass::InService => write!(f, "In Service"),
            ServiceClass::Completed => write!(f, "Completed"),
        }
    }
}

// =============================================================================
// Vehicle & Customer
// =============================================================================

/// A customer vehicle.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Vehicle {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vehicle_id: Option<String>,
    #[serde(default)]
    pub brand: String,
    #[serde(default)]
    pub model: String,
    #[serde(default)]
    pub registration_number: String,
    #[serde(default)]
    pub category: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub year: Option<i32>,
}

impl Vehicle {
    /// `Honda City (MH12AB1234)`, or just the registration when brand/model are unknown.
    pub fn display_name(&self) -> String {
        let name = format!("{} {}", self.brand, self.model).trim().to_string();
        match (name.is_empty(), self.registration_number.is_empty()) {
            (true, _) => self.registration_number.clone(),
            (false, true) => name,
            (false, false) => format!("{} ({})", name, self.registration_number),
        }
    }
}

/// The customer block embedded in a service record.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct CustomerSummary {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub customer_id: Option<String>,
    pub name: String,
    pub email: String,
    pub phone: String,
    #[serde(rename = "membershipStatus")]
    pub membership: Membership,
}

/// A customer as listed in the admin customer directory.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Customer {
    pub customer_id: String,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub street: String,
    pub city: String,
    pub state: String,
    pub postal_code: String,
    #[serde(rename = "membershipStatus")]
    pub membership: Membership,
}

impl Customer {
    /// Single-line address, skipping empty parts.
    pub fn address_line(&self) -> String {
        [&self.street, &self.city, &self.state, &self.postal_code]
            .iter()
            .filter(|part| !part.trim().is_empty())
            .map(|part| part.trim())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

// =============================================================================
// Line Items
// =============================================================================

/// A material (part) used on a service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct MaterialLine {
    pub name: String,
    pub quantity: f64,
    pub unit_price: f64,
    /// Server-supplied line total; wins over quantity × unit price.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total: Option<f64>,
}

impl MaterialLine {
    pub fn new(name: impl Into<String>, quantity: f64, unit_price: f64) -> Self {
        MaterialLine {
            name: name.into(),
            quantity,
            unit_price,
            total: None,
        }
    }

    /// Raw decimal line total before rounding.
    pub fn raw_total(&self) -> f64 {
        self.total.unwrap_or(self.quantity * self.unit_price)
    }

    pub fn line_total(&self) -> Money {
        Money::from_decimal(self.raw_total())
    }
}

/// A labor charge on a service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct LaborLine {
    pub description: String,
    pub hours: f64,
    /// Hourly rate.
    pub rate: f64,
    /// Server-supplied line total; wins over hours × rate.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total: Option<f64>,
}

impl LaborLine {
    pub fn new(description: impl Into<String>, hours: f64, rate: f64) -> Self {
        LaborLine {
            description: description.into(),
            hours,
            rate,
            total: None,
        }
    }

    pub fn raw_total(&self) -> f64 {
        self.total.unwrap_or(self.hours * self.rate)
    }

    pub fn line_total(&self) -> Money {
        Money::from_decimal(self.raw_total())
    }
}

/// Labor recorded by service tracking as minutes plus a cost.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct LaborSummary {
    pub minutes: f64,
    pub cost: f64,
}

impl LaborSummary {
    /// Expresses the summary as one labor line (hours = minutes / 60).
    pub fn as_labor_line(&self) -> LaborLine {
        let hours = self.minutes / 60.0;
        LaborLine {
            description: "Service labor".to_string(),
            hours,
            rate: if hours > 0.0 { self.cost / hours } else { 0.0 },
            total: Some(self.cost),
        }
    }
}

// =============================================================================
// Service Record
// =============================================================================

/// The canonical service request every portal table and invoice works from.
///
/// Produced by [`crate::normalizer::normalize_service`]; serializing it and
/// normalizing the result yields the same record.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct ServiceRecord {
    pub request_id: String,
    pub vehicle: Vehicle,
    pub customer: CustomerSummary,
    pub status: ServiceStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service_advisor_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service_advisor_name: Option<String>,
    #[serde(default)]
    pub materials: Vec<MaterialLine>,
    #[serde(default)]
    pub labor_charges: Vec<LaborLine>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub labor_minutes: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub labor_cost: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[ts(as = "Option<String>")]
    pub delivery_date: Option<NaiveDate>,
    #[serde(default)]
    pub has_invoice: bool,
    #[serde(default)]
    pub is_paid: bool,
    #[serde(default)]
    pub is_delivered: bool,
}

impl ServiceRecord {
    /// Which table the record belongs to.
    ///
    /// Exactly one class holds: completed wins, then advisor presence.
    pub fn classification(&self) -> ServiceClass {
        if self.status.is_terminal() {
            ServiceClass::Completed
        } else if self.has_advisor() {
            ServiceClass::InService
        } else {
            ServiceClass::Due
        }
    }

    /// An advisor id or an advisor name marks the record as assigned.
    pub fn has_advisor(&self) -> bool {
        [&self.service_advisor_id, &self.service_advisor_name]
            .iter()
            .any(|field| field.as_deref().is_some_and(|v| !v.trim().is_empty()))
    }

    /// Labor summary from service tracking, if one was found.
    pub fn labor_summary(&self) -> Option<LaborSummary> {
        match (self.labor_minutes, self.labor_cost) {
            (None, None) => None,
            (minutes, cost) => Some(LaborSummary {
                minutes: minutes.unwrap_or(0.0),
                cost: cost.unwrap_or(0.0),
            }),
        }
    }

    /// Labor lines used for billing.
    ///
    /// Explicit labor charges win; otherwise the tracking summary becomes a
    /// single line; otherwise there is no labor.
    pub fn billable_labor(&self) -> Vec<LaborLine> {
        if !self.labor_charges.is_empty() {
            return self.labor_charges.clone();
        }
        self.labor_summary()
            .map(|summary| vec![summary.as_labor_line()])
            .unwrap_or_default()
    }

    /// Moves the record forward in the workflow.
    ///
    /// ## Errors
    /// `InvalidStatusTransition` when `next` is not strictly later, or the
    /// record is already completed.
    pub fn advance_status(&mut self, next: ServiceStatus) -> CoreResult<()> {
        if !self.status.can_advance_to(next) {
            return Err(CoreError::InvalidStatusTransition {
                request_id: self.request_id.clone(),
                from: self.status.to_string(),
                to: next.to_string(),
            });
        }
        self.status = next;
        Ok(())
    }

    /// Invoice generation requires a completed service.
    pub fn ensure_invoiceable(&self) -> CoreResult<()> {
        if self.status.is_terminal() {
            Ok(())
        } else {
            Err(CoreError::ServiceNotCompleted(self.request_id.clone()))
        }
    }

    /// Payment and dispatch require an invoice.
    pub fn ensure_invoiced(&self) -> CoreResult<()> {
        if self.has_invoice {
            Ok(())
        } else {
            Err(CoreError::InvoiceMissing(self.request_id.clone()))
        }
    }
}

// =============================================================================
// Inventory
// =============================================================================

/// Stock level band shown as a badge in the inventory table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub enum StockStatus {
    Low,
    Medium,
    Good,
}

impl fmt::Display for StockStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StockStatus::Low => write!(f, "Low"),
            StockStatus::Medium => write!(f, "Medium"),
            StockStatus::Good => write!(f, "Good"),
        }
    }
}

/// An inventory item (part or consumable).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct InventoryItem {
    pub item_id: String,
    pub name: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub current_stock: i64,
    #[serde(default)]
    pub unit_price: f64,
    #[serde(default)]
    pub reorder_level: i64,
}

impl InventoryItem {
    /// Low at or below the reorder level, Medium up to twice it, Good above.
    pub fn stock_status(&self) -> StockStatus {
        if self.current_stock <= self.reorder_level {
            StockStatus::Low
        } else if self.current_stock <= self.reorder_level.saturating_mul(2) {
            StockStatus::Medium
        } else {
            StockStatus::Good
        }
    }

    pub fn price(&self) -> Money {
        Money::from_decimal(self.unit_price)
    }

    /// Value of the stock on hand.
    pub fn stock_value(&self) -> Money {
        Money::from_decimal(self.unit_price * self.current_stock.max(0) as f64)
    }
}

// =============================================================================
// Service Advisor
// =============================================================================

/// A staff member who can be assigned to service requests.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct ServiceAdvisor {
    pub advisor_id: String,
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub department: String,
    #[serde(default)]
    pub active_services: i64,
    #[serde(default = "default_available")]
    pub available: bool,
}

fn default_available() -> bool {
    true
}

// =============================================================================
// Payment & Delivery Vocabulary
// =============================================================================

/// How the customer paid an invoice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentMethod {
    Cash,
    Card,
    Upi,
    NetBanking,
    Cheque,
}

impl PaymentMethod {
    /// Cash needs no transaction reference.
    pub fn requires_reference(&self) -> bool {
        !matches!(self, PaymentMethod::Cash)
    }
}

impl FromStr for PaymentMethod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace(['-', ' '], "_").as_str() {
            "cash" => Ok(PaymentMethod::Cash),
            "card" | "credit_card" | "debit_card" => Ok(PaymentMethod::Card),
            "upi" => Ok(PaymentMethod::Upi),
            "net_banking" | "netbanking" | "bank_transfer" => Ok(PaymentMethod::NetBanking),
            "cheque" | "check" => Ok(PaymentMethod::Cheque),
            other => Err(format!(
                "Unknown payment method: '{}'. Valid options: cash, card, upi, net_banking, cheque",
                other
            )),
        }
    }
}

/// How a finished vehicle leaves the workshop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DeliveryType {
    /// Customer (or a named person) collects the vehicle.
    Pickup,
    /// Workshop drives the vehicle to an address.
    Delivery,
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn record(status: ServiceStatus, advisor: Option<&str>) -> ServiceRecord {
        ServiceRecord {
            request_id: "SR-1".to_string(),
            status,
            service_advisor_id: advisor.map(str::to_string),
            ..ServiceRecord::default()
        }
    }

    #[test]
    fn test_membership_from_label() {
        assert_eq!(Membership::from_label("Premium"), Membership::Premium);
        assert_eq!(Membership::from_label("premium member"), Membership::Premium);
        assert_eq!(Membership::from_label("Standard"), Membership::Standard);
        assert_eq!(Membership::from_label(""), Membership::Standard);
    }

    #[test]
    fn test_classification_is_exclusive() {
        assert_eq!(record(ServiceStatus::Received, None).classification(), ServiceClass::Due);
        assert_eq!(
            record(ServiceStatus::Diagnosis, Some("7")).classification(),
            ServiceClass::InService
        );
        assert_eq!(
            record(ServiceStatus::Completed, Some("7")).classification(),
            ServiceClass::Completed
        );
        // Completed without an advisor is still completed
        assert_eq!(
            record(ServiceStatus::Completed, None).classification(),
            ServiceClass::Completed
        );
        // Blank advisor id does not count as assigned
        assert_eq!(record(ServiceStatus::Repair, Some("  ")).classification(), ServiceClass::Due);
    }

    #[test]
    fn test_advisor_name_alone_counts_as_assigned() {
        let mut rec = record(ServiceStatus::Repair, None);
        rec.service_advisor_name = Some("Kiran Rao".to_string());
        assert!(rec.has_advisor());
        assert_eq!(rec.classification(), ServiceClass::InService);

        rec.service_advisor_name = Some(" ".to_string());
        assert_eq!(rec.classification(), ServiceClass::Due);
    }

    #[test]
    fn test_status_transitions_are_monotonic() {
        let mut rec = record(ServiceStatus::Received, None);
        rec.advance_status(ServiceStatus::Diagnosis).unwrap();
        rec.advance_status(ServiceStatus::Completed).unwrap();
        assert_eq!(rec.status, ServiceStatus::Completed);

        let err = rec.advance_status(ServiceStatus::Repair).unwrap_err();
        assert!(matches!(err, CoreError::InvalidStatusTransition { .. }));

        let mut rec = record(ServiceStatus::Repair, None);
        assert!(rec.advance_status(ServiceStatus::Diagnosis).is_err());
        assert!(rec.advance_status(ServiceStatus::Repair).is_err());
        assert_eq!(rec.status, ServiceStatus::Repair);
    }

    #[test]
    fn test_status_parsing() {
        assert_eq!("RECEIVED".parse::<ServiceStatus>().unwrap(), ServiceStatus::Received);
        assert_eq!("In Progress".parse::<ServiceStatus>().unwrap(), ServiceStatus::Repair);
        assert_eq!("completed".parse::<ServiceStatus>().unwrap(), ServiceStatus::Completed);
        assert!("archived".parse::<ServiceStatus>().is_err());
    }

    #[test]
    fn test_stock_status_bands() {
        let mut item = InventoryItem {
            item_id: "1".to_string(),
            name: "Oil filter".to_string(),
            category: "Filters".to_string(),
            current_stock: 5,
            unit_price: 250.0,
            reorder_level: 5,
        };
        assert_eq!(item.stock_status(), StockStatus::Low);
        item.current_stock = 10;
        assert_eq!(item.stock_status(), StockStatus::Medium);
        item.current_stock = 11;
        assert_eq!(item.stock_status(), StockStatus::Good);
        assert_eq!(item.stock_value().to_string(), "₹2750.00");
    }

    #[test]
    fn test_billable_labor_prefers_explicit_lines() {
        let mut rec = record(ServiceStatus::Completed, None);
        rec.labor_minutes = Some(90.0);
        rec.labor_cost = Some(450.0);

        let labor = rec.billable_labor();
        assert_eq!(labor.len(), 1);
        assert_eq!(labor[0].hours, 1.5);
        assert_eq!(labor[0].line_total().paise(), 45_000);

        rec.labor_charges = vec![LaborLine::new("Alignment", 1.0, 300.0)];
        assert_eq!(rec.billable_labor()[0].description, "Alignment");
    }

    #[test]
    fn test_vehicle_display_name() {
        let vehicle = Vehicle {
            brand: "Honda".to_string(),
            model: "City".to_string(),
            registration_number: "MH12AB1234".to_string(),
            ..Vehicle::default()
        };
        assert_eq!(vehicle.display_name(), "Honda City (MH12AB1234)");
    }

    #[test]
    fn test_payment_method_parsing() {
        assert_eq!("UPI".parse::<PaymentMethod>().unwrap(), PaymentMethod::Upi);
        assert_eq!("net banking".parse::<PaymentMethod>().unwrap(), PaymentMethod::NetBanking);
        assert!(!PaymentMethod::Cash.requires_reference());
        assert!("barter".parse::<PaymentMethod>().is_err());
    }
}
