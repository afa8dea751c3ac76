//! # Booking Flow
//!
//! Drives the four-step [`BookingWizard`] against the customer portal API.
//!
//! ```text
//!   Step 1 ──next──► new vehicle? ──POST /customer/api/vehicles──► Step 2
//!      │                  │ no
//!      │                  └──────────────────────────────────────► Step 2
//!   Step 2 ──next──► Step 3 ──next──► Step 4
//!   Step 4 ──submit──► POST /customer/api/service-requests
//!                          ok   → wizard reset, receipt returned
//!                          fail → wizard stays on Step 4, error returned
//! ```

use chrono::NaiveDate;
use reqwest::Method;
use serde_json::Value;
use torque_core::error::ValidationError;
use torque_core::normalizer::{normalize_vehicle, normalize_vehicle_list};
use torque_core::types::Vehicle;
use torque_core::wizard::{Advance, BookingWizard, WizardStep};
use tracing::{info, warn};
use uuid::Uuid;

use crate::decode::{report_rejected, unwrap_data};
use crate::endpoints::{CUSTOMER_VEHICLES, SERVICE_REQUESTS};
use crate::error::{ClientError, ClientResult};
use crate::http::ApiTransport;

/// What the customer gets back after booking.
#[derive(Debug, Clone, PartialEq)]
pub struct BookingReceipt {
    /// Client-side reference sent with the booking.
    pub reference: Uuid,
    /// Id the backend assigned, when it returned one.
    pub request_id: Option<String>,
}

pub struct BookingFlow<'a> {
    transport: &'a dyn ApiTransport,
    wizard: BookingWizard,
    vehicles: Vec<Vehicle>,
}

impl<'a> BookingFlow<'a> {
    pub fn new(transport: &'a dyn ApiTransport) -> Self {
        BookingFlow {
            transport,
            wizard: BookingWizard::new(),
            vehicles: Vec::new(),
        }
    }

    pub fn wizard(&self) -> &BookingWizard {
        &self.wizard
    }

    pub fn wizard_mut(&mut self) -> &mut BookingWizard {
        &mut self.wizard
    }

    pub fn vehicles(&self) -> &[Vehicle] {
        &self.vehicles
    }

    /// Loads the customer's saved vehicles for Step 1.
    pub async fn load_vehicles(&mut self) -> ClientResult<&[Vehicle]> {
        let raw = self.transport.get_json(CUSTOMER_VEHICLES).await?;
        self.vehicles = report_rejected(normalize_vehicle_list(&raw)?, "vehicles");
        info!(count = self.vehicles.len(), "Customer vehicles loaded");
        Ok(self.vehicles.as_slice())
    }

    /// Picks a loaded vehicle by id or registration number.
    pub fn choose_vehicle(&mut self, key: &str) -> ClientResult<()> {
        let wanted = key.trim();
        let vehicle = self
            .vehicles
            .iter()
            .find(|v| {
                v.vehicle_id.as_deref() == Some(wanted)
                    || v.registration_number.eq_ignore_ascii_case(wanted)
            })
            .cloned()
            .ok_or_else(|| {
                ClientError::Validation(ValidationError::InvalidFormat {
                    field: "Vehicle".to_string(),
                    reason: format!("'{}' is not one of your vehicles", wanted),
                })
            })?;
        self.wizard.select_vehicle(vehicle);
        Ok(())
    }

    /// Advances the wizard, saving a new vehicle first when Step 1 holds one.
    ///
    /// A failed save leaves the wizard on Step 1 with the form intact.
    pub async fn next(&mut self, today: NaiveDate) -> ClientResult<WizardStep> {
        match self.wizard.next(today)? {
            Advance::Moved(step) => Ok(step),
            Advance::PersistVehicle(form) => {
                let body = serde_json::to_value(&form)?;
                let raw = self
                    .transport
                    .send_json(Method::POST, CUSTOMER_VEHICLES, &body)
                    .await?;

                let mut vehicle = normalize_vehicle(unwrap_data(&raw))?;
                if vehicle.vehicle_id.is_none() {
                    return Err(ClientError::InvalidResponse(
                        "saved vehicle has no id".to_string(),
                    ));
                }
                if vehicle.registration_number.is_empty() {
                    vehicle.registration_number = form.registration_number.clone();
                }

                info!(vehicle = %vehicle.display_name(), "Vehicle saved");
                self.vehicles.push(vehicle.clone());
                Ok(self.wizard.vehicle_persisted(vehicle)?)
            }
        }
    }

    pub fn back(&mut self) -> WizardStep {
        self.wizard.back()
    }

    /// Submits the booking from Step 4.
    pub async fn submit(&mut self, today: NaiveDate) -> ClientResult<BookingReceipt> {
        let submission = self.wizard.submission(today)?;
        let reference = Uuid::new_v4();

        let mut body = serde_json::to_value(&submission)?;
        if let Value::Object(fields) = &mut body {
            fields.insert("clientReference".to_string(), Value::String(reference.to_string()));
        }

        match self.transport.send_json(Method::POST, SERVICE_REQUESTS, &body).await {
            Ok(raw) => {
                let request_id = response_id(&raw);
                info!(%reference, request_id = ?request_id, service_type = %submission.service_type, "Service booked");
                self.wizard.complete();
                Ok(BookingReceipt { reference, request_id })
            }
            Err(err) => {
                warn!(%reference, error = %err, "Booking failed, keeping selections");
                Err(err)
            }
        }
    }
}

fn response_id(raw: &Value) -> Option<String> {
    let source = match raw.get("data") {
        Some(inner) if inner.is_object() => inner,
        _ => raw,
    };
    ["requestId", "serviceRequestId", "id"]
        .iter()
        .find_map(|key| match source.get(*key) {
            Some(Value::String(s)) if !s.trim().is_empty() => Some(s.trim().to_string()),
            Some(Value::Number(n)) => Some(n.to_string()),
            _ => None,
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{MockTransport, Reply};
    use serde_json::json;
    use torque_core::forms::NewVehicleForm;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 3, 10).unwrap()
    }

    fn vehicles_reply() -> Reply {
        Reply::Json(json!([
            {"vehicleId": 5, "brand": "Honda", "model": "City", "registrationNumber": "MH12AB1234"}
        ]))
    }

    async fn at_confirm(flow: &mut BookingFlow<'_>) {
        flow.load_vehicles().await.unwrap();
        flow.choose_vehicle("mh12ab1234").unwrap();
        assert_eq!(flow.next(today()).await.unwrap(), WizardStep::SelectServiceType);
        flow.wizard_mut().select_service_type("oil change").unwrap();
        flow.next(today()).await.unwrap();
        flow.wizard_mut()
            .set_delivery_date(NaiveDate::from_ymd_opt(2026, 3, 12).unwrap());
        assert_eq!(flow.next(today()).await.unwrap(), WizardStep::ConfirmSummary);
        flow.wizard_mut().set_terms_accepted(true);
    }

    #[tokio::test]
    async fn test_successful_booking_resets_wizard() {
        let transport = MockTransport::new()
            .on(Method::GET, CUSTOMER_VEHICLES, vehicles_reply())
            .on(Method::POST, SERVICE_REQUESTS, Reply::Json(json!({"requestId": 88})));
        let mut flow = BookingFlow::new(&transport);
        at_confirm(&mut flow).await;

        let receipt = flow.submit(today()).await.unwrap();
        assert_eq!(receipt.request_id.as_deref(), Some("88"));
        assert_eq!(flow.wizard().step(), WizardStep::SelectVehicle);

        let body = transport.last_body(SERVICE_REQUESTS).unwrap();
        assert_eq!(body["vehicleId"], "5");
        assert_eq!(body["deliveryDate"], "2026-03-12");
        assert_eq!(body["clientReference"], receipt.reference.to_string());
    }

    #[tokio::test]
    async fn test_failed_booking_stays_on_confirm() {
        let transport = MockTransport::new()
            .on(Method::GET, CUSTOMER_VEHICLES, vehicles_reply())
            .on(Method::POST, SERVICE_REQUESTS, Reply::Status(500, "Internal Server Error"));
        let mut flow = BookingFlow::new(&transport);
        at_confirm(&mut flow).await;

        assert!(flow.submit(today()).await.is_err());
        assert_eq!(flow.wizard().step(), WizardStep::ConfirmSummary);
        assert_eq!(flow.wizard().service_type(), Some("Oil Change"));
    }

    #[tokio::test]
    async fn test_new_vehicle_is_saved_before_step_two() {
        let transport = MockTransport::new().on(
            Method::POST,
            CUSTOMER_VEHICLES,
            Reply::Json(json!({"id": 9, "brand": "Maruti", "model": "Swift", "registrationNumber": "MH14CD5678"})),
        );
        let mut flow = BookingFlow::new(&transport);
        flow.wizard_mut().fill_new_vehicle(NewVehicleForm {
            brand: "Maruti".to_string(),
            model: "Swift".to_string(),
            registration_number: "mh-14-cd-5678".to_string(),
            category: "Hatchback".to_string(),
            year: Some(2021),
        });

        assert_eq!(flow.next(today()).await.unwrap(), WizardStep::SelectServiceType);
        assert_eq!(
            transport.last_body(CUSTOMER_VEHICLES).unwrap()["registrationNumber"],
            "MH14CD5678"
        );
        assert_eq!(flow.vehicles().len(), 1);
    }

    #[tokio::test]
    async fn test_saved_vehicle_answer_with_both_ids() {
        let transport = MockTransport::new().on(
            Method::POST,
            CUSTOMER_VEHICLES,
            Reply::Json(json!({"data": {"id": 9, "vehicleId": 9, "brand": "Maruti", "model": "Swift"}})),
        );
        let mut flow = BookingFlow::new(&transport);
        flow.wizard_mut().fill_new_vehicle(NewVehicleForm {
            brand: "Maruti".to_string(),
            model: "Swift".to_string(),
            registration_number: "MH14CD5678".to_string(),
            category: "Hatchback".to_string(),
            year: Some(2021),
        });

        assert_eq!(flow.next(today()).await.unwrap(), WizardStep::SelectServiceType);
        let saved = &flow.vehicles()[0];
        assert_eq!(saved.vehicle_id.as_deref(), Some("9"));
        assert_eq!(saved.registration_number, "MH14CD5678");
    }

    #[tokio::test]
    async fn test_vehicle_save_failure_keeps_step_one() {
        let transport = MockTransport::new().on(Method::POST, CUSTOMER_VEHICLES, Reply::Offline);
        let mut flow = BookingFlow::new(&transport);
        flow.wizard_mut().fill_new_vehicle(NewVehicleForm {
            brand: "Maruti".to_string(),
            model: "Swift".to_string(),
            registration_number: "MH14CD5678".to_string(),
            category: "Hatchback".to_string(),
            year: Some(2021),
        });

        assert!(flow.next(today()).await.is_err());
        assert_eq!(flow.wizard().step(), WizardStep::SelectVehicle);
    }

    #[tokio::test]
    async fn test_step_one_without_vehicle() {
        let transport = MockTransport::new();
        let mut flow = BookingFlow::new(&transport);
        let err = flow.next(today()).await.unwrap_err();
        assert!(err.is_validation_error());
        assert_eq!(flow.wizard().step(), WizardStep::SelectVehicle);
        assert!(transport.calls().is_empty());
    }
}
