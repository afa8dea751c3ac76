//! # Form Payloads
//!
//! Every write the portals perform starts as one of these forms. A form is
//! validated locally first; `validate` returns a cleaned copy (trimmed text,
//! canonical phone and registration) that is then serialized as the request
//! body. An invalid form never reaches the network.
//!
//! ```text
//! user input ──► Form ──► validate() ──► cleaned Form ──► serde_json body ──► REST
//!                              │
//!                              └── Err(ValidationError) ──► shown to user, no request
//! ```

use chrono::NaiveDate;
use serde::Serialize;
use ts_rs::TS;

use crate::billing::InvoiceTotals;
use crate::error::ValidationError;
use crate::money::Money;
use crate::types::{DeliveryType, Membership, PaymentMethod, Vehicle};
use crate::validation::{
    validate_email, validate_name, validate_payment_amount, validate_phone,
    validate_postal_code, validate_price, validate_registration_number, validate_required,
    validate_stock, validate_vehicle_year, ValidationResult,
};

fn optional_text(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

// =============================================================================
// Customer
// =============================================================================

/// Create/update body for `/admin/customers/api`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct CustomerForm {
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

impl CustomerForm {
    /// Name, email and phone are required; the address is optional but a
    /// postal code, when given, must be well formed.
    pub fn validate(&self) -> ValidationResult<Self> {
        let postal_code = match self.postal_code.trim() {
            "" => String::new(),
            code => validate_postal_code(code)?,
        };
        Ok(CustomerForm {
            name: validate_name("Name", &self.name)?,
            email: validate_email("Email", &self.email)?,
            phone: validate_phone("Phone", &self.phone)?,
            street: self.street.trim().to_string(),
            city: self.city.trim().to_string(),
            state: self.state.trim().to_string(),
            postal_code,
            membership: self.membership,
        })
    }
}

// =============================================================================
// Inventory
// =============================================================================

/// Create/update body for `/admin/inventory/api/items`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct InventoryItemForm {
    pub name: String,
    pub category: String,
    pub current_stock: i64,
    pub unit_price: f64,
    pub reorder_level: i64,
}

impl InventoryItemForm {
    pub fn validate(&self) -> ValidationResult<Self> {
        validate_stock("Current stock", self.current_stock)?;
        validate_stock("Reorder level", self.reorder_level)?;
        let price = validate_price("Unit price", self.unit_price)?;
        Ok(InventoryItemForm {
            name: validate_name("Item name", &self.name)?,
            category: validate_required("Category", &self.category)?,
            current_stock: self.current_stock,
            unit_price: price.to_decimal(),
            reorder_level: self.reorder_level,
        })
    }
}

// =============================================================================
// Service Advisor
// =============================================================================

/// Create/update body for `/admin/service-advisors/api/advisors`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct AdvisorForm {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub department: String,
}

impl AdvisorForm {
    pub fn validate(&self) -> ValidationResult<Self> {
        Ok(AdvisorForm {
            name: validate_name("Name", &self.name)?,
            email: validate_email("Email", &self.email)?,
            phone: validate_phone("Phone", &self.phone)?,
            department: self.department.trim().to_string(),
        })
    }
}

// =============================================================================
// New Vehicle (booking wizard, Step 1)
// =============================================================================

/// Body for `POST /customer/api/vehicles`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct NewVehicleForm {
    pub brand: String,
    pub model: String,
    pub registration_number: String,
    pub category: String,
    pub year: Option<i32>,
}

impl NewVehicleForm {
    /// A form counts as started once any field has content.
    pub fn is_started(&self) -> bool {
        [&self.brand, &self.model, &self.registration_number, &self.category]
            .iter()
            .any(|v| !v.trim().is_empty())
            || self.year.is_some()
    }

    /// Every field is required for a new vehicle.
    pub fn validate(&self, current_year: i32) -> ValidationResult<Self> {
        let year = self.year.ok_or_else(|| ValidationError::required("Year"))?;
        validate_vehicle_year(year, current_year)?;
        Ok(NewVehicleForm {
            brand: validate_name("Brand", &self.brand)?,
            model: validate_name("Model", &self.model)?,
            registration_number: validate_registration_number(&self.registration_number)?,
            category: validate_required("Category", &self.category)?,
            year: Some(year),
        })
    }

    /// The vehicle the form describes, before the server assigns an id.
    pub fn to_vehicle(&self) -> Vehicle {
        Vehicle {
            vehicle_id: None,
            brand: self.brand.clone(),
            model: self.model.clone(),
            registration_number: self.registration_number.clone(),
            category: self.category.clone(),
            year: self.year,
        }
    }
}

// =============================================================================
// Invoice Generation
// =============================================================================

/// Body for `POST /admin/api/invoices/service-request/{id}/generate`.
#[derive(Debug, Clone, PartialEq, Serialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct GenerateInvoiceRequest {
    pub service_id: String,
    pub email_address: String,
    pub send_email: bool,
    #[ts(type = "number")]
    pub materials_total: Money,
    #[ts(type = "number")]
    pub labor_total: Money,
    #[ts(type = "number")]
    pub discount: Money,
    #[ts(type = "number")]
    pub subtotal: Money,
    #[ts(type = "number")]
    pub tax: Money,
    #[ts(type = "number")]
    pub total: Money,
    pub membership_status: Membership,
}

impl GenerateInvoiceRequest {
    pub fn new(
        service_id: impl Into<String>,
        email_address: impl Into<String>,
        send_email: bool,
        totals: &InvoiceTotals,
        membership: Membership,
    ) -> Self {
        GenerateInvoiceRequest {
            service_id: service_id.into(),
            email_address: email_address.into(),
            send_email,
            materials_total: totals.materials_total,
            labor_total: totals.labor_total,
            discount: totals.discount,
            subtotal: totals.subtotal,
            tax: totals.tax,
            total: totals.grand_total,
            membership_status: membership,
        }
    }

    /// The email address only matters when the invoice will be emailed.
    pub fn validate(&self) -> ValidationResult<Self> {
        let mut cleaned = self.clone();
        cleaned.service_id = validate_required("Service id", &self.service_id)?;
        if self.send_email {
            cleaned.email_address = validate_email("Email", &self.email_address)?;
        }
        Ok(cleaned)
    }
}

// =============================================================================
// Payment
// =============================================================================

/// Body for the payment endpoints.
#[derive(Debug, Clone, PartialEq, Serialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct PaymentForm {
    pub service_id: String,
    pub payment_method: PaymentMethod,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transaction_id: Option<String>,
    #[ts(type = "number")]
    pub amount: Money,
    pub notes: String,
}

impl PaymentForm {
    /// Non-cash payments need a transaction reference.
    pub fn validate(&self) -> ValidationResult<Self> {
        validate_payment_amount(self.amount)?;
        let transaction_id = optional_text(&self.transaction_id);
        if self.payment_method.requires_reference() && transaction_id.is_none() {
            return Err(ValidationError::required("Transaction id"));
        }
        Ok(PaymentForm {
            service_id: validate_required("Service id", &self.service_id)?,
            payment_method: self.payment_method,
            transaction_id,
            amount: self.amount,
            notes: self.notes.trim().to_string(),
        })
    }
}

// =============================================================================
// Dispatch
// =============================================================================

/// Body for the dispatch endpoints.
///
/// Exactly one of `pickup_person` / `delivery_address` is sent, matching
/// `delivery_type`.
#[derive(Debug, Clone, PartialEq, Serialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct DispatchForm {
    pub service_id: String,
    pub delivery_type: DeliveryType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pickup_person: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delivery_address: Option<String>,
    pub notes: String,
}

impl DispatchForm {
    pub fn validate(&self) -> ValidationResult<Self> {
        let service_id = validate_required("Service id", &self.service_id)?;
        let (pickup_person, delivery_address) = match self.delivery_type {
            DeliveryType::Pickup => (
                Some(optional_text(&self.pickup_person).ok_or_else(|| {
                    ValidationError::required("Pickup person")
                })?),
                None,
            ),
            DeliveryType::Delivery => (
                None,
                Some(optional_text(&self.delivery_address).ok_or_else(|| {
                    ValidationError::required("Delivery address")
                })?),
            ),
        };
        Ok(DispatchForm {
            service_id,
            delivery_type: self.delivery_type,
            pickup_person,
            delivery_address,
            notes: self.notes.trim().to_string(),
        })
    }
}

// =============================================================================
// Booking
// =============================================================================

/// Body for `POST /customer/api/service-requests`, assembled by the wizard.
#[derive(Debug, Clone, PartialEq, Serialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct BookingSubmission {
    pub vehicle_id: String,
    pub service_type: String,
    #[ts(as = "String")]
    pub delivery_date: NaiveDate,
    pub additional_notes: String,
    pub terms_accepted: bool,
}

// =============================================================================
// Unit Tests
// =============================================================================
