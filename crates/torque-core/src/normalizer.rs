//! # Data Normalizer
//!
//! Reconciles the differently-shaped service and customer payloads returned by
//! the various backend endpoints into the canonical records in [`crate::types`].
//!
//! ## How It Works
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  raw JSON (unknown shape)                                               │
//! │      │                                                                  │
//! │      ├── fields:     ordered JSON-pointer rules, first non-empty wins     │
//! │      │               "/customer/name" → "/customerName" → ...            │
//! │      │                                                                  │
//! │      ├── labor:      ordered LaborStrategy list, first pair found wins   │
//! │      │               Direct → ServiceTracking → ServiceTrackingsFirst    │
//! │      │               → SnakeCase → DeepScan → NotFound                   │
//! │      │                                                                  │
//! │      └── membership: any "premium" text OR any premium flag              │
//! │                                                                         │
//! │      ▼                                                                  │
//! │  ServiceRecord / Customer (canonical, camelCase when serialized)        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Normalizing the serialized form of a record this module produced returns
//! the same record.

use chrono::NaiveDate;
use serde_json::{Map, Value};

use crate::error::NormalizeError;
use crate::types::{
    Customer, CustomerSummary, InventoryItem, LaborLine, LaborSummary, MaterialLine, Membership,
    ServiceAdvisor, ServiceRecord, ServiceStatus, Vehicle,
};

/// Name given to a customer whose payload carries no name at all.
pub const UNKNOWN_CUSTOMER: &str = "Unknown Customer";

/// Keys under which list endpoints wrap their arrays.
const LIST_WRAPPERS: [&str; 3] = ["content", "data", "items"];

// =============================================================================
// Value Coercion
// =============================================================================

/// Reads a value as non-empty trimmed text. Numbers become their decimal
/// representation (`41`, not `41.0`).
pub(crate) fn as_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => {
            let trimmed = s.trim();
            (!trimmed.is_empty()).then(|| trimmed.to_string())
        }
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Some(i.to_string())
            } else if let Some(u) = n.as_u64() {
                Some(u.to_string())
            } else {
                n.as_f64().map(|f| {
                    if f.fract() == 0.0 && f.abs() < 1e15 {
                        format!("{}", f as i64)
                    } else {
                        f.to_string()
                    }
                })
            }
        }
        _ => None,
    }
}

/// Reads a value as a number; numeric strings are parsed.
pub(crate) fn as_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64().filter(|f| f.is_finite()),
        Value::String(s) => s.trim().parse::<f64>().ok().filter(|f| f.is_finite()),
        _ => None,
    }
}

/// Reads a value as a boolean flag (`true`, `"true"`, `"yes"`, `1`).
pub(crate) fn as_flag(value: &Value) -> Option<bool> {
    match value {
        Value::Bool(b) => Some(*b),
        Value::Number(n) => n.as_f64().map(|f| f != 0.0),
        Value::String(s) => match s.trim().to_lowercase().as_str() {
            "true" | "yes" | "y" | "1" => Some(true),
            "false" | "no" | "n" | "0" => Some(false),
            _ => None,
        },
        _ => None,
    }
}

fn first_text(raw: &Value, pointers: &[&str]) -> Option<String> {
    pointers
        .iter()
        .find_map(|p| raw.pointer(p).and_then(as_text))
}

fn first_number(raw: &Value, pointers: &[&str]) -> Option<f64> {
    pointers
        .iter()
        .find_map(|p| raw.pointer(p).and_then(as_number))
}

fn first_whole(raw: &Value, pointers: &[&str]) -> i64 {
    first_number(raw, pointers).map(|n| n.round() as i64).unwrap_or(0)
}

fn first_flag(raw: &Value, pointers: &[&str]) -> Option<bool> {
    pointers
        .iter()
        .find_map(|p| raw.pointer(p).and_then(as_flag))
}

fn any_flag(raw: &Value, pointers: &[&str]) -> bool {
    pointers
        .iter()
        .any(|p| raw.pointer(p).and_then(as_flag).unwrap_or(false))
}

fn first_array<'a>(raw: &'a Value, pointers: &[&str]) -> Option<&'a Vec<Value>> {
    pointers
        .iter()
        .find_map(|p| raw.pointer(p).and_then(Value::as_array))
}

/// Accepts `2026-03-14` as well as a full timestamp starting with a date.
fn parse_date(text: &str) -> Option<NaiveDate> {
    let head = text.get(..10).unwrap_or(text);
    NaiveDate::parse_from_str(head, "%Y-%m-%d").ok()
}

fn ensure_object(raw: &Value, context: &str) -> Result<(), NormalizeError> {
    if raw.is_object() {
        Ok(())
    } else {
        Err(NormalizeError::NotAnObject {
            context: context.to_string(),
            actual: kind_of(raw).to_string(),
        })
    }
}

fn required_text(raw: &Value, context: &str, field: &str, pointers: &[&str]) -> Result<String, NormalizeError> {
    first_text(raw, pointers).ok_or_else(|| NormalizeError::MissingField {
        context: context.to_string(),
        field: field.to_string(),
    })
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

// =============================================================================
// Membership
// =============================================================================

const MEMBERSHIP_TEXT: [&str; 5] = [
    "/membershipStatus",
    "/membership",
    "/customer/membershipStatus",
    "/customer/membership",
    "/serviceTracking/membershipStatus",
];

const PREMIUM_FLAGS: [&str; 4] = [
    "/isPremium",
    "/premium",
    "/customer/isPremium",
    "/customer/premium",
];

/// Detects the membership tier of a raw payload.
///
/// Every text source and every flag is consulted; any one premium signal
/// makes the customer Premium, even when another source says Standard.
///
/// ## Example
/// ```rust
/// use serde_json::json;
/// use torque_core::normalizer::detect_membership;
/// use torque_core::types::Membership;
///
/// let raw = json!({"membershipStatus": "Standard", "customer": {"isPremium": true}});
/// assert_eq!(detect_membership(&raw), Membership::Premium);
/// ```
pub fn detect_membership(raw: &Value) -> Membership {
    let text_premium = MEMBERSHIP_TEXT.iter().any(|p| {
        raw.pointer(p)
            .and_then(Value::as_str)
            .is_some_and(|s| Membership::from_label(s).is_premium())
    });
    if text_premium || any_flag(raw, &PREMIUM_FLAGS) {
        Membership::Premium
    } else {
        Membership::Standard
    }
}

// =============================================================================
// Labor Summary Strategies
// =============================================================================

/// Where a labor minutes/cost pair can hide, in priority order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LaborStrategy {
    /// `laborMinutes` / `laborCost` on the record itself.
    Direct,
    /// Inside a `serviceTracking` object.
    ServiceTracking,
    /// Inside the first element of a `serviceTrackings` array.
    ServiceTrackingsFirst,
    /// `labor_minutes` / `labor_cost` on the record itself.
    SnakeCase,
    /// Any nested object one level down carrying either naming of the pair.
    DeepScan,
}

impl LaborStrategy {
    /// All strategies, tried in this order.
    pub const ORDER: [LaborStrategy; 5] = [
        LaborStrategy::Direct,
        LaborStrategy::ServiceTracking,
        LaborStrategy::ServiceTrackingsFirst,
        LaborStrategy::SnakeCase,
        LaborStrategy::DeepScan,
    ];

    fn extract(&self, raw: &Value) -> Option<LaborSummary> {
        match self {
            LaborStrategy::Direct => pair(raw, "/laborMinutes", "/laborCost"),
            LaborStrategy::ServiceTracking => pair(
                raw,
                "/serviceTracking/laborMinutes",
                "/serviceTracking/laborCost",
            ),
            LaborStrategy::ServiceTrackingsFirst => pair(
                raw,
                "/serviceTrackings/0/laborMinutes",
                "/serviceTrackings/0/laborCost",
            ),
            LaborStrategy::SnakeCase => pair(raw, "/labor_minutes", "/labor_cost"),
            LaborStrategy::DeepScan => raw.as_object()?.values().find_map(|nested| {
                if !nested.is_object() {
                    return None;
                }
                pair(nested, "/laborMinutes", "/laborCost")
                    .or_else(|| pair(nested, "/labor_minutes", "/labor_cost"))
            }),
        }
    }
}

fn pair(raw: &Value, minutes: &str, cost: &str) -> Option<LaborSummary> {
    let minutes = raw.pointer(minutes).and_then(as_number)?;
    let cost = raw.pointer(cost).and_then(as_number)?;
    Some(LaborSummary { minutes, cost })
}

/// Outcome of the labor summary search.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LaborLookup {
    Found {
        summary: LaborSummary,
        source: LaborStrategy,
    },
    NotFound,
}

impl LaborLookup {
    pub fn summary(&self) -> Option<LaborSummary> {
        match self {
            LaborLookup::Found { summary, .. } => Some(*summary),
            LaborLookup::NotFound => None,
        }
    }
}

/// Runs the labor strategies in order; the first one that finds both halves
/// of a pair wins.
pub fn find_labor(raw: &Value) -> LaborLookup {
    LaborStrategy::ORDER
        .iter()
        .find_map(|strategy| {
            strategy.extract(raw).map(|summary| LaborLookup::Found {
                summary,
                source: *strategy,
            })
        })
        .unwrap_or(LaborLookup::NotFound)
}

// =============================================================================
// Line Items
// =============================================================================

fn normalize_material(raw: &Value) -> Option<MaterialLine> {
    if !raw.is_object() {
        return None;
    }
    Some(MaterialLine {
        name: first_text(
            raw,
            &["/name", "/itemName", "/materialName", "/inventoryItem/name"],
        )
        .unwrap_or_else(|| "Unnamed material".to_string()),
        quantity: first_number(raw, &["/quantity", "/qty", "/quantityUsed"]).unwrap_or(0.0),
        unit_price: first_number(
            raw,
            &["/unitPrice", "/price", "/unit_price", "/inventoryItem/unitPrice"],
        )
        .unwrap_or(0.0),
        total: first_number(raw, &["/total", "/totalPrice", "/lineTotal", "/total_price"]),
    })
}

fn normalize_labor(raw: &Value) -> Option<LaborLine> {
    if !raw.is_object() {
        return None;
    }
    Some(LaborLine {
        description: first_text(raw, &["/description", "/name", "/task"])
            .unwrap_or_else(|| "Labor".to_string()),
        hours: first_number(raw, &["/hours", "/laborHours"]).unwrap_or(0.0),
        // `rate` wins over the legacy `ratePerHour`
        rate: first_number(raw, &["/rate", "/ratePerHour", "/hourlyRate"]).unwrap_or(0.0),
        total: first_number(raw, &["/total", "/totalCost", "/lineTotal"]),
    })
}

// =============================================================================
// Service Records
// =============================================================================

/// Normalizes one service payload; a missing status means Received.
pub fn normalize_service(raw: &Value) -> Result<ServiceRecord, NormalizeError> {
    normalize_service_with(raw, ServiceStatus::Received)
}

/// Normalizes one service payload, using `fallback_status` when the payload
/// has no readable status (the completed-services endpoint omits it).
///
/// ## Errors
/// - `NotAnObject` when `raw` is not a JSON object
/// - `MissingField` when no request id can be found under any known name
pub fn normalize_service_with(
    raw: &Value,
    fallback_status: ServiceStatus,
) -> Result<ServiceRecord, NormalizeError> {
    if !raw.is_object() {
        return Err(NormalizeError::NotAnObject {
            context: "service request".to_string(),
            actual: kind_of(raw).to_string(),
        });
    }

    let request_id = first_text(
        raw,
        &[
            "/requestId",
            "/serviceRequestId",
            "/serviceId",
            "/id",
            "/request_id",
            "/service_request_id",
        ],
    )
    .ok_or_else(|| NormalizeError::MissingField {
        context: "service request".to_string(),
        field: "requestId".to_string(),
    })?;

    let vehicle = Vehicle {
        vehicle_id: first_text(raw, &["/vehicle/vehicleId", "/vehicle/id", "/vehicleId", "/vehicle_id"]),
        brand: first_text(raw, &["/vehicle/brand", "/vehicleBrand", "/brand", "/vehicle_brand"])
            .unwrap_or_default(),
        model: first_text(raw, &["/vehicle/model", "/vehicleModel", "/model", "/vehicle_model"])
            .unwrap_or_default(),
        registration_number: first_text(
            raw,
            &[
                "/vehicle/registrationNumber",
                "/registrationNumber",
                "/vehicleRegistration",
                "/vehicle/registration",
                "/registration_number",
                "/vehicle_registration",
            ],
        )
        .unwrap_or_default(),
        category: first_text(
            raw,
            &["/vehicle/category", "/vehicleCategory", "/vehicle_category"],
        )
        .unwrap_or_default(),
        year: first_number(raw, &["/vehicle/year", "/vehicleYear", "/year"]).map(|y| y.round() as i32),
    };

    let customer = CustomerSummary {
        customer_id: first_text(raw, &["/customer/customerId", "/customer/id", "/customerId", "/customer_id"]),
        name: customer_name(raw).unwrap_or_else(|| UNKNOWN_CUSTOMER.to_string()),
        email: first_text(raw, &["/customer/email", "/customerEmail", "/customer_email"])
            .unwrap_or_default(),
        phone: first_text(
            raw,
            &["/customer/phone", "/customerPhone", "/customer/phoneNumber", "/customer_phone"],
        )
        .unwrap_or_default(),
        membership: detect_membership(raw),
    };

    let status = first_text(
        raw,
        &["/status", "/serviceStatus", "/serviceTracking/status", "/service_status"],
    )
    .and_then(|s| s.parse::<ServiceStatus>().ok())
    .unwrap_or(fallback_status);

    let materials = first_array(
        raw,
        &["/materials", "/materialsUsed", "/materialUsages", "/serviceTracking/materials", "/materials_used"],
    )
    .map(|items| items.iter().filter_map(normalize_material).collect())
    .unwrap_or_default();

    let labor_charges = first_array(raw, &["/laborCharges", "/labourCharges", "/labor", "/labor_charges"])
        .map(|items| items.iter().filter_map(normalize_labor).collect())
        .unwrap_or_default();

    let labor = find_labor(raw).summary();

    let has_invoice = any_flag(raw, &["/hasInvoice", "/invoiceGenerated", "/has_invoice"])
        || first_text(raw, &["/invoiceId", "/invoice/invoiceId", "/invoice/id"]).is_some();
    let is_paid = any_flag(raw, &["/isPaid", "/paid", "/is_paid", "/invoice/isPaid"])
        || first_text(raw, &["/paymentStatus", "/invoice/paymentStatus"])
            .is_some_and(|s| s.eq_ignore_ascii_case("paid"));
    let is_delivered = any_flag(raw, &["/isDelivered", "/delivered", "/is_delivered"])
        || first_text(raw, &["/deliveryStatus"]).is_some_and(|s| {
            s.eq_ignore_ascii_case("delivered") || s.eq_ignore_ascii_case("dispatched")
        });

    Ok(ServiceRecord {
        request_id,
        vehicle,
        customer,
        status,
        service_type: first_text(raw, &["/serviceType", "/serviceCategory", "/service_type"]),
        service_advisor_id: first_text(
            raw,
            &[
                "/serviceAdvisorId",
                "/serviceAdvisor/advisorId",
                "/serviceAdvisor/id",
                "/advisorId",
                "/service_advisor_id",
            ],
        ),
        service_advisor_name: first_text(
            raw,
            &["/serviceAdvisorName", "/serviceAdvisor/name", "/advisorName", "/service_advisor_name"],
        ),
        materials,
        labor_charges,
        labor_minutes: labor.map(|l| l.minutes),
        labor_cost: labor.map(|l| l.cost),
        delivery_date: first_text(raw, &["/deliveryDate", "/estimatedDeliveryDate", "/delivery_date"])
            .and_then(|s| parse_date(&s)),
        has_invoice,
        is_paid,
        is_delivered,
    })
}

fn customer_name(raw: &Value) -> Option<String> {
    first_text(
        raw,
        &["/customer/name", "/customerName", "/customer/fullName", "/customer_name"],
    )
    .or_else(|| joined_name(raw, "/customer/firstName", "/customer/lastName"))
}

fn joined_name(raw: &Value, first: &str, last: &str) -> Option<String> {
    let parts: Vec<String> = [first, last]
        .iter()
        .filter_map(|p| raw.pointer(p).and_then(as_text))
        .collect();
    (!parts.is_empty()).then(|| parts.join(" "))
}

/// Normalizes the invoice-details payload.
///
/// The endpoint nests the service under `service` (or `serviceRequest`) and puts
/// materials and labor next to it. Both levels are merged, inner keys winning,
/// and the result is treated as completed unless it says otherwise.
pub fn normalize_invoice_details(raw: &Value) -> Result<ServiceRecord, NormalizeError> {
    let outer = raw.as_object().ok_or_else(|| NormalizeError::NotAnObject {
        context: "invoice details".to_string(),
        actual: kind_of(raw).to_string(),
    })?;

    let wrapper = ["service", "serviceRequest"]
        .iter()
        .find(|key| outer.get(**key).is_some_and(Value::is_object));

    let merged = match wrapper {
        Some(key) => {
            let mut merged: Map<String, Value> = outer
                .get(*key)
                .and_then(Value::as_object)
                .cloned()
                .unwrap_or_default();
            for (k, v) in outer {
                if k.as_str() != *key {
                    merged.entry(k.clone()).or_insert_with(|| v.clone());
                }
            }
            Value::Object(merged)
        }
        None => raw.clone(),
    };

    normalize_service_with(&merged, ServiceStatus::Completed)
}

// =============================================================================
// Lists
// =============================================================================

/// Normalized list plus the entries that could not be used.
#[derive(Debug, Clone, PartialEq)]
pub struct ListOutcome<T> {
    pub items: Vec<T>,
    pub rejected: Vec<NormalizeError>,
}

/// Unwraps a list payload: a bare array, or an object holding the array under
/// `content`, `data` or `items`.
pub fn list_entries<'a>(raw: &'a Value, context: &str) -> Result<&'a Vec<Value>, NormalizeError> {
    if let Some(items) = raw.as_array() {
        return Ok(items);
    }
    LIST_WRAPPERS
        .iter()
        .find_map(|key| raw.get(*key).and_then(Value::as_array))
        .ok_or_else(|| NormalizeError::ExpectedArray {
            context: context.to_string(),
            actual: kind_of(raw).to_string(),
        })
}

fn normalize_list<T>(
    raw: &Value,
    context: &str,
    each: impl Fn(&Value) -> Result<T, NormalizeError>,
) -> Result<ListOutcome<T>, NormalizeError> {
    let mut outcome = ListOutcome {
        items: Vec::new(),
        rejected: Vec::new(),
    };
    for entry in list_entries(raw, context)? {
        match each(entry) {
            Ok(item) => outcome.items.push(item),
            Err(err) => outcome.rejected.push(err),
        }
    }
    Ok(outcome)
}

/// Normalizes a service list; individual unusable entries are collected in
/// `rejected` rather than failing the whole list.
pub fn normalize_service_list(
    raw: &Value,
    fallback_status: ServiceStatus,
) -> Result<ListOutcome<ServiceRecord>, NormalizeError> {
    normalize_list(raw, "service requests", |entry| {
        normalize_service_with(entry, fallback_status)
    })
}

// =============================================================================
// Customers
// =============================================================================

/// Normalizes one customer payload.
pub fn normalize_customer(raw: &Value) -> Result<Customer, NormalizeError> {
    if !raw.is_object() {
        return Err(NormalizeError::NotAnObject {
            context: "customer".to_string(),
            actual: kind_of(raw).to_string(),
        });
    }
    let customer_id = first_text(raw, &["/customerId", "/id", "/customer_id"]).ok_or_else(|| {
        NormalizeError::MissingField {
            context: "customer".to_string(),
            field: "customerId".to_string(),
        }
    })?;

    let text = |pointers: &[&str]| first_text(raw, pointers).unwrap_or_default();

    Ok(Customer {
        customer_id,
        name: first_text(raw, &["/name", "/fullName", "/customerName"])
            .or_else(|| joined_name(raw, "/firstName", "/lastName"))
            .unwrap_or_else(|| UNKNOWN_CUSTOMER.to_string()),
        email: text(&["/email", "/emailAddress"]),
        phone: text(&["/phone", "/phoneNumber", "/mobile"]),
        street: text(&["/address/street", "/street", "/streetAddress", "/address"]),
        city: text(&["/address/city", "/city"]),
        state: text(&["/address/state", "/state"]),
        postal_code: text(&["/address/postalCode", "/postalCode", "/zipCode", "/pincode", "/postal_code"]),
        membership: detect_membership(raw),
    })
}

pub fn normalize_customer_list(raw: &Value) -> Result<ListOutcome<Customer>, NormalizeError> {
    normalize_list(raw, "customers", normalize_customer)
}

/// Fills blank customer fields of a service record from the customer directory.
///
/// Present values are never overwritten; membership can only be raised to
/// Premium.
pub fn apply_customer_details(record: &mut ServiceRecord, customer: &Customer) {
    let summary = &mut record.customer;
    if summary.customer_id.is_none() {
        summary.customer_id = Some(customer.customer_id.clone());
    }
    if summary.name == UNKNOWN_CUSTOMER && !customer.name.is_empty() {
        summary.name = customer.name.clone();
    }
    if summary.email.is_empty() {
        summary.email = customer.email.clone();
    }
    if summary.phone.is_empty() {
        summary.phone = customer.phone.clone();
    }
    if customer.membership.is_premium() {
        summary.membership = Membership::Premium;
    }
}

// =============================================================================
// Inventory, Advisors & Vehicles
// =============================================================================
// Every field is read from a prioritized pointer list, so a payload carrying
// both `id` and `itemId` (or `name` and `itemName`) is read, not rejected.

/// Normalizes one inventory item; only the id is required.
pub fn normalize_inventory_item(raw: &Value) -> Result<InventoryItem, NormalizeError> {
    ensure_object(raw, "inventory item")?;
    Ok(InventoryItem {
        item_id: required_text(raw, "inventory item", "itemId", &["/itemId", "/id", "/item_id"])?,
        name: first_text(raw, &["/name", "/itemName", "/item_name"]).unwrap_or_default(),
        category: first_text(raw, &["/category", "/categoryName"]).unwrap_or_default(),
        current_stock: first_whole(raw, &["/currentStock", "/stock", "/quantity", "/current_stock"]),
        unit_price: first_number(raw, &["/unitPrice", "/price", "/unit_price"]).unwrap_or(0.0),
        reorder_level: first_whole(raw, &["/reorderLevel", "/minStockLevel", "/reorder_level"]),
    })
}

pub fn normalize_inventory_list(raw: &Value) -> Result<ListOutcome<InventoryItem>, NormalizeError> {
    normalize_list(raw, "inventory items", normalize_inventory_item)
}

/// Normalizes one service advisor. Advisors are available unless a flag
/// says otherwise.
pub fn normalize_advisor(raw: &Value) -> Result<ServiceAdvisor, NormalizeError> {
    ensure_object(raw, "service advisor")?;
    Ok(ServiceAdvisor {
        advisor_id: required_text(raw, "service advisor", "advisorId", &["/advisorId", "/id", "/advisor_id"])?,
        name: first_text(raw, &["/name", "/fullName"])
            .or_else(|| joined_name(raw, "/firstName", "/lastName"))
            .unwrap_or_default(),
        email: first_text(raw, &["/email"]).unwrap_or_default(),
        phone: first_text(raw, &["/phone", "/phoneNumber"]).unwrap_or_default(),
        department: first_text(raw, &["/department", "/specialization"]).unwrap_or_default(),
        active_services: first_whole(
            raw,
            &["/activeServices", "/workload", "/activeServiceCount", "/active_services"],
        ),
        available: first_flag(raw, &["/available", "/isAvailable"]).unwrap_or(true),
    })
}

pub fn normalize_advisor_list(raw: &Value) -> Result<ListOutcome<ServiceAdvisor>, NormalizeError> {
    normalize_list(raw, "service advisors", normalize_advisor)
}

/// Normalizes a vehicle from the customer vehicle endpoints.
pub fn normalize_vehicle(raw: &Value) -> Result<Vehicle, NormalizeError> {
    ensure_object(raw, "vehicle")?;
    Ok(Vehicle {
        vehicle_id: first_text(raw, &["/vehicleId", "/id", "/vehicle_id"]),
        brand: first_text(raw, &["/brand", "/make"]).unwrap_or_default(),
        model: first_text(raw, &["/model"]).unwrap_or_default(),
        registration_number: first_text(
            raw,
            &["/registrationNumber", "/registration", "/registration_number"],
        )
        .unwrap_or_default(),
        category: first_text(raw, &["/category", "/vehicleCategory"]).unwrap_or_default(),
        year: first_number(raw, &["/year", "/manufactureYear"]).map(|y| y.round() as i32),
    })
}

pub fn normalize_vehicle_list(raw: &Value) -> Result<ListOutcome<Vehicle>, NormalizeError> {
    normalize_list(raw, "vehicles", normalize_vehicle)
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn vehicles_due_payload() -> Value {
        json!({
            "serviceRequestId": 41,
            "vehicleBrand": "Honda",
            "vehicleModel": "City",
            "registrationNumber": "MH12AB1234",
            "vehicleCategory": "Sedan",
            "customerName": "Asha Kulkarni",
            "customerEmail": "asha@example.com",
            "membershipStatus": "PREMIUM",
            "status": "RECEIVED",
            "serviceType": "Brake Service"
        })
    }

    #[test]
    fn test_flat_payload() {
        let rec = normalize_service(&vehicles_due_payload()).unwrap();
        assert_eq!(rec.request_id, "41");
        assert_eq!(rec.vehicle.display_name(), "Honda City (MH12AB1234)");
        assert_eq!(rec.customer.name, "Asha Kulkarni");
        assert_eq!(rec.customer.membership, Membership::Premium);
        assert_eq!(rec.status, ServiceStatus::Received);
        assert!(rec.service_advisor_id.is_none());
        assert!(rec.labor_minutes.is_none());
    }

    #[test]
    fn test_nested_payload() {
        let raw = json!({
            "requestId": "SR-9",
            "vehicle": {"id": 3, "brand": "Tata", "model": "Nexon", "registrationNumber": "KA01MJ2020", "year": 2022},
            "customer": {"firstName": "Ravi", "lastName": "Shah", "phone": "9876543210", "membership": "standard"},
            "serviceAdvisor": {"advisorId": 7, "name": "Kiran Rao"},
            "status": "In Progress",
            "materials": [{"itemName": "Brake pad", "quantity": "2", "price": 500}],
            "laborCharges": [{"description": "Pad replacement", "hours": 2, "ratePerHour": 300}]
        });
        let rec = normalize_service(&raw).unwrap();
        assert_eq!(rec.vehicle.vehicle_id.as_deref(), Some("3"));
        assert_eq!(rec.vehicle.year, Some(2022));
        assert_eq!(rec.customer.name, "Ravi Shah");
        assert_eq!(rec.customer.membership, Membership::Standard);
        assert_eq!(rec.service_advisor_id.as_deref(), Some("7"));
        assert_eq!(rec.status, ServiceStatus::Repair);
        assert_eq!(rec.materials[0].quantity, 2.0);
        assert_eq!(rec.materials[0].line_total().paise(), 100_000);
        assert_eq!(rec.labor_charges[0].rate, 300.0);
    }

    #[test]
    fn test_missing_customer_name_defaults() {
        let rec = normalize_service(&json!({"id": 5})).unwrap();
        assert_eq!(rec.customer.name, UNKNOWN_CUSTOMER);
        assert_eq!(rec.vehicle.registration_number, "");
    }

    #[test]
    fn test_missing_request_id_is_rejected() {
        let err = normalize_service(&json!({"customerName": "x"})).unwrap_err();
        assert!(matches!(err, NormalizeError::MissingField { .. }));
        let err = normalize_service(&json!("41")).unwrap_err();
        assert!(matches!(err, NormalizeError::NotAnObject { .. }));
    }

    #[test]
    fn test_labor_strategy_priority() {
        let direct = json!({
            "laborMinutes": 30, "laborCost": 200,
            "serviceTracking": {"laborMinutes": 90, "laborCost": 900}
        });
        assert_eq!(
            find_labor(&direct),
            LaborLookup::Found {
                summary: LaborSummary { minutes: 30.0, cost: 200.0 },
                source: LaborStrategy::Direct,
            }
        );

        let tracking = json!({"serviceTracking": {"laborMinutes": "90", "laborCost": "900.50"}});
        assert!(matches!(
            find_labor(&tracking),
            LaborLookup::Found { source: LaborStrategy::ServiceTracking, .. }
        ));

        let trackings = json!({"serviceTrackings": [{"laborMinutes": 45, "laborCost": 300}]});
        assert!(matches!(
            find_labor(&trackings),
            LaborLookup::Found { source: LaborStrategy::ServiceTrackingsFirst, .. }
        ));

        let snake = json!({"labor_minutes": 10, "labor_cost": 50});
        assert!(matches!(
            find_labor(&snake),
            LaborLookup::Found { source: LaborStrategy::SnakeCase, .. }
        ));

        let deep = json!({"tracking": {"labor_minutes": 60, "labor_cost": 400}});
        assert_eq!(
            find_labor(&deep).summary(),
            Some(LaborSummary { minutes: 60.0, cost: 400.0 })
        );
    }

    #[test]
    fn test_labor_half_pair_is_not_found() {
        assert_eq!(find_labor(&json!({"laborMinutes": 30})), LaborLookup::NotFound);
        assert_eq!(find_labor(&json!({"laborCost": "abc", "laborMinutes": 5})), LaborLookup::NotFound);
    }

    #[test]
    fn test_membership_or_semantics() {
        assert_eq!(detect_membership(&json!({})), Membership::Standard);
        assert_eq!(
            detect_membership(&json!({"customer": {"membershipStatus": "Premium Gold"}})),
            Membership::Premium
        );
        assert_eq!(
            detect_membership(&json!({"membership": "Standard", "premium": "yes"})),
            Membership::Premium
        );
        assert_eq!(
            detect_membership(&json!({"serviceTracking": {"membershipStatus": "premium"}})),
            Membership::Premium
        );
        assert_eq!(
            detect_membership(&json!({"isPremium": false, "membershipStatus": "STANDARD"})),
            Membership::Standard
        );
    }

    #[test]
    fn test_normalize_is_idempotent() {
        let raw = json!({
            "id": 12,
            "vehicle": {"vehicleId": "V1", "brand": "Hyundai", "model": "i20", "registrationNumber": "DL3CAB1234", "category": "Hatchback", "year": 2019},
            "customer": {"id": "C4", "name": "Meera Iyer", "email": "meera@example.com", "phone": "9000000001", "isPremium": true},
            "status": "COMPLETED",
            "serviceAdvisorId": 3,
            "serviceAdvisorName": "Kiran Rao",
            "materialsUsed": [{"name": "Oil filter", "quantity": 1, "unitPrice": 250.5, "totalPrice": 250.5}],
            "serviceTracking": {"laborMinutes": 75, "laborCost": 625},
            "estimatedDeliveryDate": "2026-03-14T10:00:00",
            "invoiceId": "INV-1",
            "paymentStatus": "PAID"
        });
        let canonical = normalize_service(&raw).unwrap();
        assert!(canonical.has_invoice && canonical.is_paid && !canonical.is_delivered);
        assert_eq!(canonical.delivery_date, NaiveDate::from_ymd_opt(2026, 3, 14));

        let serialized = serde_json::to_value(&canonical).unwrap();
        assert_eq!(normalize_service(&serialized).unwrap(), canonical);
    }

    #[test]
    fn test_service_list_shapes() {
        let bare = json!([vehicles_due_payload(), {"noId": true}, 7]);
        let outcome = normalize_service_list(&bare, ServiceStatus::Received).unwrap();
        assert_eq!(outcome.items.len(), 1);
        assert_eq!(outcome.rejected.len(), 2);

        for key in ["content", "data", "items"] {
            let wrapped = json!({ key: [vehicles_due_payload()] });
            let outcome = normalize_service_list(&wrapped, ServiceStatus::Received).unwrap();
            assert_eq!(outcome.items.len(), 1, "wrapper {key}");
        }

        let err = normalize_service_list(&json!({"results": []}), ServiceStatus::Received).unwrap_err();
        assert!(matches!(err, NormalizeError::ExpectedArray { .. }));
    }

    #[test]
    fn test_completed_list_defaults_status() {
        let raw = json!([{"serviceId": 8, "customerName": "A"}]);
        let outcome = normalize_service_list(&raw, ServiceStatus::Completed).unwrap();
        assert_eq!(outcome.items[0].status, ServiceStatus::Completed);
    }

    #[test]
    fn test_invoice_details_merge() {
        let raw = json!({
            "service": {"serviceId": 41, "customerName": "Asha", "membershipStatus": "Premium"},
            "materials": [{"name": "Brake pad", "quantity": 2, "unitPrice": 500}],
            "laborCharges": [{"description": "Pad replacement", "hours": 2, "rate": 300}]
        });
        let rec = normalize_invoice_details(&raw).unwrap();
        assert_eq!(rec.request_id, "41");
        assert_eq!(rec.status, ServiceStatus::Completed);
        assert_eq!(rec.materials.len(), 1);
        assert_eq!(rec.labor_charges.len(), 1);
        assert!(rec.customer.membership.is_premium());
    }

    #[test]
    fn test_normalize_customer() {
        let raw = json!({
            "id": 4,
            "firstName": "Meera",
            "lastName": "Iyer",
            "email": "meera@example.com",
            "phoneNumber": "9000000001",
            "address": {"street": "12 MG Road", "city": "Pune", "state": "MH", "postalCode": "411001"},
            "membershipStatus": "PREMIUM"
        });
        let customer = normalize_customer(&raw).unwrap();
        assert_eq!(customer.customer_id, "4");
        assert_eq!(customer.name, "Meera Iyer");
        assert_eq!(customer.address_line(), "12 MG Road, Pune, MH, 411001");
        assert!(customer.membership.is_premium());

        let again = normalize_customer(&serde_json::to_value(&customer).unwrap()).unwrap();
        assert_eq!(again, customer);
    }

    #[test]
    fn test_apply_customer_details_fills_blanks_only() {
        let mut rec = normalize_service(&json!({"id": 1, "customerEmail": "keep@example.com"})).unwrap();
        let customer = Customer {
            customer_id: "C1".to_string(),
            name: "Asha".to_string(),
            email: "other@example.com".to_string(),
            phone: "9876543210".to_string(),
            membership: Membership::Premium,
            ..Customer::default()
        };
        apply_customer_details(&mut rec, &customer);
        assert_eq!(rec.customer.name, "Asha");
        assert_eq!(rec.customer.email, "keep@example.com");
        assert_eq!(rec.customer.phone, "9876543210");
        assert_eq!(rec.customer.membership, Membership::Premium);
    }

    #[test]
    fn test_inventory_item_field_variants() {
        let item = normalize_inventory_item(&json!({
            "id": 17,
            "itemName": "Brake pad",
            "stock": "12",
            "price": "899.50",
            "minStockLevel": 4
        }))
        .unwrap();
        assert_eq!(item.item_id, "17");
        assert_eq!(item.name, "Brake pad");
        assert_eq!(item.current_stock, 12);
        assert_eq!(item.price().paise(), 89_950);
        assert_eq!(item.reorder_level, 4);
    }

    #[test]
    fn test_inventory_item_with_id_and_item_id() {
        let item = normalize_inventory_item(&json!({
            "id": 17, "itemId": 17, "name": "Brake pad", "itemName": "Brake pad",
            "currentStock": 3, "stock": 3, "unitPrice": 899.5, "reorderLevel": 4
        }))
        .unwrap();
        assert_eq!(item.item_id, "17");
        assert_eq!(item.current_stock, 3);

        let again = normalize_inventory_item(&serde_json::to_value(&item).unwrap()).unwrap();
        assert_eq!(again, item);
        assert!(matches!(
            normalize_inventory_item(&json!({"name": "No id"})),
            Err(NormalizeError::MissingField { .. })
        ));
    }

    #[test]
    fn test_advisor_with_duplicate_keys() {
        let advisor = normalize_advisor(&json!({
            "id": 3, "advisorId": "3", "name": "Meera Iyer", "fullName": "Meera Iyer",
            "workload": "2", "isAvailable": "no"
        }))
        .unwrap();
        assert_eq!(advisor.advisor_id, "3");
        assert_eq!(advisor.name, "Meera Iyer");
        assert_eq!(advisor.active_services, 2);
        assert!(!advisor.available);

        let fresh = normalize_advisor(&json!({"advisorId": "A-3", "name": "Kiran Rao"})).unwrap();
        assert!(fresh.available);
        assert_eq!(fresh.active_services, 0);
    }

    #[test]
    fn test_vehicle_with_id_and_vehicle_id() {
        let vehicle = normalize_vehicle(&json!({
            "id": 9, "vehicleId": 9, "brand": "Honda", "model": "City",
            "registrationNumber": "MH12AB1234", "year": "2020"
        }))
        .unwrap();
        assert_eq!(vehicle.vehicle_id.as_deref(), Some("9"));
        assert_eq!(vehicle.year, Some(2020));
        assert_eq!(normalize_vehicle(&serde_json::to_value(&vehicle).unwrap()).unwrap(), vehicle);
    }

    #[test]
    fn test_value_coercion() {
        assert_eq!(as_text(&json!(41.0)).as_deref(), Some("41"));
        assert_eq!(as_text(&json!("  ")), None);
        assert_eq!(as_number(&json!(" 12.5 ")), Some(12.5));
        assert_eq!(as_number(&json!("n/a")), None);
        assert_eq!(as_flag(&json!("Yes")), Some(true));
        assert_eq!(as_flag(&json!(null)), None);
    }
}
