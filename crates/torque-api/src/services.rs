//! # Service Desk
//!
//! The admin workflow around one service request, from the vehicle arriving to
//! it leaving the workshop.
//!
//! ## Workflow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Service Request Lifecycle                       │
//! │                                                                         │
//! │  vehicles-due ──assign advisor──► vehicles-in-service ──status──►        │
//! │                                                                         │
//! │  completed-services ──► invoice details ──► generate invoice            │
//! │                              │                    │                     │
//! │                    (best-effort customer          ▼                     │
//! │                     enrichment)            record payment  (3 paths)    │
//! │                                                   │                     │
//! │                                                   ▼                     │
//! │                                            dispatch        (3 paths)    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Invoice generation, payment and dispatch each refuse a second trigger while
//! the first is in flight.

use reqwest::Method;
use serde_json::{json, Value};
use torque_core::billing::{calculate_for, InvoiceTotals};
use torque_core::error::ValidationError;
use torque_core::forms::{DispatchForm, GenerateInvoiceRequest, PaymentForm};
use torque_core::normalizer::{
    apply_customer_details, normalize_customer, normalize_invoice_details, normalize_service_list,
    UNKNOWN_CUSTOMER,
};
use torque_core::table::services_in;
use torque_core::types::{ServiceClass, ServiceRecord, ServiceStatus};
use torque_core::validation::validate_required;
use tracing::{debug, info, warn};

use crate::decode::report_rejected;
use crate::endpoints;
use crate::error::{ClientError, ClientResult};
use crate::fallback::ChainSuccess;
use crate::guard::ActionLock;
use crate::http::ApiTransport;

/// Invoice details with the totals the invoice will carry.
#[derive(Debug, Clone, PartialEq)]
pub struct InvoicePreview {
    pub record: ServiceRecord,
    pub totals: InvoiceTotals,
}

pub struct ServiceDesk<'a> {
    transport: &'a dyn ApiTransport,
    invoice_lock: ActionLock,
    payment_lock: ActionLock,
    dispatch_lock: ActionLock,
}

impl<'a> ServiceDesk<'a> {
    pub fn new(transport: &'a dyn ApiTransport) -> Self {
        ServiceDesk {
            transport,
            invoice_lock: ActionLock::new("Invoice generation"),
            payment_lock: ActionLock::new("Payment"),
            dispatch_lock: ActionLock::new("Dispatch"),
        }
    }

    // =========================================================================
    // Lists
    // =========================================================================

    /// Loads one of the three service lists.
    ///
    /// Records that classify into a different list (e.g. a "due" record that
    /// already has an advisor) are left out.
    pub async fn list(&self, class: ServiceClass) -> ClientResult<Vec<ServiceRecord>> {
        let (path, fallback_status) = match class {
            ServiceClass::Due => (endpoints::VEHICLES_DUE, ServiceStatus::Received),
            ServiceClass::InService => (endpoints::VEHICLES_IN_SERVICE, ServiceStatus::Repair),
            ServiceClass::Completed => (endpoints::COMPLETED_SERVICES, ServiceStatus::Completed),
        };

        let raw = self.transport.get_json(path).await?;
        let records = report_rejected(normalize_service_list(&raw, fallback_status)?, path);
        let loaded = records.len();
        let records = services_in(&records, class);
        if records.len() != loaded {
            debug!(%class, dropped = loaded - records.len(), "Records belong to another list");
        }

        info!(%class, count = records.len(), "Service list loaded");
        Ok(records)
    }

    /// All three lists, due first.
    pub async fn all(&self) -> ClientResult<Vec<ServiceRecord>> {
        let mut records = self.list(ServiceClass::Due).await?;
        records.extend(self.list(ServiceClass::InService).await?);
        records.extend(self.list(ServiceClass::Completed).await?);
        Ok(records)
    }

    // =========================================================================
    // Invoice
    // =========================================================================

    /// Loads the invoice details of a completed service and fills in missing
    /// customer details from the customer directory.
    pub async fn invoice_details(&self, request_id: &str) -> ClientResult<ServiceRecord> {
        let raw = self
            .transport
            .get_json(&endpoints::invoice_details(request_id))
            .await?;
        let mut record = normalize_invoice_details(&raw)?;
        self.enrich_customer(&mut record).await;
        Ok(record)
    }

    pub async fn prepare_invoice(&self, request_id: &str) -> ClientResult<InvoicePreview> {
        let record = self.invoice_details(request_id).await?;
        record.ensure_invoiceable()?;
        let totals = calculate_for(&record);
        Ok(InvoicePreview { record, totals })
    }

    /// Best effort: a failed lookup is logged and the record kept as is.
    async fn enrich_customer(&self, record: &mut ServiceRecord) {
        let customer = &record.customer;
        let incomplete = customer.email.is_empty() || customer.phone.is_empty() || customer.name == UNKNOWN_CUSTOMER;
        let Some(customer_id) = customer.customer_id.clone().filter(|_| incomplete) else {
            return;
        };

        let path = endpoints::entity(endpoints::CUSTOMERS, &customer_id);
        let lookup = match self.transport.get_json(&path).await {
            Ok(raw) => normalize_customer(crate::decode::unwrap_data(&raw)).map_err(ClientError::from),
            Err(err) => Err(err),
        };
        match lookup {
            Ok(details) => {
                debug!(request_id = %record.request_id, %customer_id, "Customer details filled in");
                apply_customer_details(record, &details);
            }
            Err(err) => {
                warn!(request_id = %record.request_id, %customer_id, error = %err, "Customer lookup failed, keeping invoice details");
            }
        }
    }

    /// Generates the invoice for a completed service.
    ///
    /// ## Errors
    /// - `ServiceNotCompleted` before any request is made
    /// - `Validation` when `send_email` is set and the customer has no valid email
    /// - `Busy` while a previous generation is still running
    pub async fn generate_invoice(&self, record: &ServiceRecord, send_email: bool) -> ClientResult<InvoiceTotals> {
        self.invoice_lock
            .run(async {
                record.ensure_invoiceable()?;
                let totals = calculate_for(record);
                let request = GenerateInvoiceRequest::new(
                    &record.request_id,
                    &record.customer.email,
                    send_email,
                    &totals,
                    record.customer.membership,
                )
                .validate()?;

                let body = serde_json::to_value(&request)?;
                self.transport
                    .send_json(Method::POST, &endpoints::generate_invoice(&record.request_id), &body)
                    .await?;

                info!(request_id = %record.request_id, total = %totals.grand_total, send_email, "Invoice generated");
                Ok::<_, ClientError>(totals)
            })
            .await
    }

    // =========================================================================
    // Payment & Dispatch
    // =========================================================================

    /// Records a payment against an invoiced service.
    pub async fn record_payment(&self, record: &ServiceRecord, form: &PaymentForm) -> ClientResult<ChainSuccess<Value>> {
        self.payment_lock
            .run(async {
                record.ensure_invoiced()?;
                let form = form.validate()?;
                ensure_same_service(record, &form.service_id)?;

                let body = serde_json::to_value(&form)?;
                let result = endpoints::payment_chain(&record.request_id)
                    .send(self.transport, Method::POST, &body)
                    .await?;

                info!(
                    request_id = %record.request_id,
                    amount = %form.amount,
                    method = ?form.payment_method,
                    endpoint = %result.endpoint,
                    "Payment recorded"
                );
                Ok::<_, ClientError>(result)
            })
            .await
    }

    /// Hands the vehicle over (pickup or delivery).
    pub async fn dispatch(&self, record: &ServiceRecord, form: &DispatchForm) -> ClientResult<ChainSuccess<Value>> {
        self.dispatch_lock
            .run(async {
                record.ensure_invoiced()?;
                let form = form.validate()?;
                ensure_same_service(record, &form.service_id)?;

                let body = serde_json::to_value(&form)?;
                let result = endpoints::dispatch_chain(&record.request_id)
                    .send(self.transport, Method::POST, &body)
                    .await?;

                info!(
                    request_id = %record.request_id,
                    delivery_type = ?form.delivery_type,
                    endpoint = %result.endpoint,
                    "Vehicle dispatched"
                );
                Ok::<_, ClientError>(result)
            })
            .await
    }

    // =========================================================================
    // Assignment & Status
    // =========================================================================

    /// Assigns a service advisor, moving a due record into service.
    pub async fn assign_advisor(&self, record: &mut ServiceRecord, advisor_id: &str) -> ClientResult<()> {
        let advisor_id = validate_required("Service advisor", advisor_id)?;
        if record.status.is_terminal() {
            return Err(ValidationError::InvalidFormat {
                field: "Service advisor".to_string(),
                reason: format!("service {} is already completed", record.request_id),
            }
            .into());
        }

        let body = json!({ "advisorId": advisor_id });
        self.transport
            .send_json(Method::PUT, &endpoints::assign_advisor(&record.request_id), &body)
            .await?;

        info!(request_id = %record.request_id, %advisor_id, "Advisor assigned");
        record.service_advisor_id = Some(advisor_id);
        Ok(())
    }

    /// Moves a record forward in the workflow. Backward moves are rejected
    /// locally and never reach the backend.
    pub async fn update_status(&self, record: &mut ServiceRecord, next: ServiceStatus) -> ClientResult<()> {
        let mut updated = record.clone();
        updated.advance_status(next)?;

        let body = json!({ "status": next.to_string().to_uppercase() });
        self.transport
            .send_json(Method::PUT, &endpoints::update_status(&record.request_id), &body)
            .await?;

        info!(request_id = %record.request_id, from = %record.status, to = %next, "Status updated");
        *record = updated;
        Ok(())
    }
}

fn ensure_same_service(record: &ServiceRecord, service_id: &str) -> ClientResult<()> {
    if record.request_id != service_id {
        return Err(ValidationError::InvalidFormat {
            field: "Service id".to_string(),
            reason: format!("form is for {}, not {}", service_id, record.request_id),
        }
        .into());
    }
    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================
