//! Backend paths, in one place.
//!
//! Ids are percent-encoded before they are placed in a path segment.

use std::borrow::Cow;

use crate::fallback::EndpointChain;

fn segment(id: &str) -> Cow<'_, str> {
    urlencoding::encode(id)
}

// =============================================================================
// Admin: service requests
// =============================================================================

pub const VEHICLES_DUE: &str = "/admin/api/vehicles-due";
pub const VEHICLES_IN_SERVICE: &str = "/admin/api/vehicles-in-service";
pub const COMPLETED_SERVICES: &str = "/admin/api/completed-services";

pub fn invoice_details(request_id: &str) -> String {
    format!("{}/{}/invoice-details", COMPLETED_SERVICES, segment(request_id))
}

pub fn generate_invoice(request_id: &str) -> String {
    format!("/admin/api/invoices/service-request/{}/generate", segment(request_id))
}

pub fn download_invoice(request_id: &str) -> String {
    format!("/admin/api/invoices/service-request/{}/download", segment(request_id))
}

pub fn assign_advisor(request_id: &str) -> String {
    format!("/admin/api/service-requests/{}/assign-advisor", segment(request_id))
}

pub fn update_status(request_id: &str) -> String {
    format!("/admin/api/service-requests/{}/status", segment(request_id))
}

/// Payment endpoints, tried in order.
pub fn payment_chain(request_id: &str) -> EndpointChain {
    let id = segment(request_id);
    EndpointChain::new(
        "Payment",
        vec![
            "/admin/api/vehicle-tracking/process-payment".to_string(),
            format!("/admin/api/invoices/service-request/{}/payment", id),
            format!("{}/{}/payment", COMPLETED_SERVICES, id),
        ],
    )
}

/// Dispatch endpoints, tried in order.
pub fn dispatch_chain(request_id: &str) -> EndpointChain {
    let id = segment(request_id);
    EndpointChain::new(
        "Dispatch",
        vec![
            "/admin/api/vehicle-tracking/dispatch".to_string(),
            format!("{}/{}/dispatch", COMPLETED_SERVICES, id),
            "/admin/api/delivery/dispatch".to_string(),
        ],
    )
}

// =============================================================================
// Admin: directories
// =============================================================================

pub const CUSTOMERS: &str = "/admin/customers/api";
pub const INVENTORY_ITEMS: &str = "/admin/inventory/api/items";
pub const ADVISORS: &str = "/admin/service-advisors/api/advisors";

pub fn entity(collection: &str, id: &str) -> String {
    format!("{}/{}", collection, segment(id))
}

// =============================================================================
// Customer portal
// =============================================================================

pub const CUSTOMER_VEHICLES: &str = "/customer/api/vehicles";
pub const SERVICE_REQUESTS: &str = "/customer/api/service-requests";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fallback_order() {
        assert_eq!(
            payment_chain("41").endpoints(),
            &[
                "/admin/api/vehicle-tracking/process-payment",
                "/admin/api/invoices/service-request/41/payment",
                "/admin/api/completed-services/41/payment",
            ]
        );
        assert_eq!(dispatch_chain("41").endpoints()[2], "/admin/api/delivery/dispatch");
        assert_eq!(entity(CUSTOMERS, "7"), "/admin/customers/api/7");
    }

    #[test]
    fn test_ids_are_encoded_as_one_segment() {
        assert_eq!(entity(INVENTORY_ITEMS, "BP/12"), "/admin/inventory/api/items/BP%2F12");
        assert_eq!(
            update_status("41?x=1"),
            "/admin/api/service-requests/41%3Fx%3D1/status"
        );
        assert_eq!(
            payment_chain("SR 9#2").endpoints()[2],
            "/admin/api/completed-services/SR%209%232/payment"
        );
    }
}
