//! # Booking Wizard
//!
//! The four-step booking state machine used by the customer portal.
//!
//! ## State Machine
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  ┌──────────────┐ next ┌──────────────┐ next ┌──────────────┐ next     │
//! │  │ 1 Vehicle    │─────►│ 2 Service    │─────►│ 3 Schedule   │─────►    │
//! │  │              │◄─────│   type       │◄─────│   details    │◄─────    │
//! │  └──────┬───────┘ back └──────────────┘ back └──────────────┘ back     │
//! │         │                                                  ┌────────┐  │
//! │         │ new vehicle form?                                │4 Confirm│ │
//! │         ▼                                                  └───┬────┘  │
//! │  Advance::PersistVehicle ──► caller POSTs ──► vehicle_persisted  │       │
//! │                                                                  ▼       │
//! │                             submission() ──► caller POSTs ──► complete()│
//! │                                                                         │
//! │  A failed predicate returns WizardError::Validation and the step       │
//! │  does not change.                                                       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The machine never performs I/O. When a new vehicle must be saved, `next`
//! hands the cleaned form back as [`Advance::PersistVehicle`] and the step only
//! moves once the caller reports the saved vehicle.

use chrono::{Datelike, NaiveDate};
use serde::Serialize;
use ts_rs::TS;

use crate::error::{ValidationError, WizardError};
use crate::forms::{BookingSubmission, NewVehicleForm};
use crate::types::Vehicle;
use crate::validation::validate_delivery_date;

/// The fixed service menu offered in Step 2.
pub const SERVICE_TYPES: [&str; 8] = [
    "General Service",
    "Oil Change",
    "Brake Service",
    "Engine Repair",
    "Tire Service",
    "Electrical",
    "AC Service",
    "Body Work",
];

// =============================================================================
// Steps
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, TS)]
#[ts(export)]
pub enum WizardStep {
    SelectVehicle,
    SelectServiceType,
    ScheduleDetails,
    ConfirmSummary,
}

impl WizardStep {
    /// Step number as shown in the progress indicator (1-4).
    pub fn number(&self) -> u8 {
        match self {
            WizardStep::SelectVehicle => 1,
            WizardStep::SelectServiceType => 2,
            WizardStep::ScheduleDetails => 3,
            WizardStep::ConfirmSummary => 4,
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            WizardStep::SelectVehicle => "Select Vehicle",
            WizardStep::SelectServiceType => "Select Service Type",
            WizardStep::ScheduleDetails => "Schedule Details",
            WizardStep::ConfirmSummary => "Confirm Booking",
        }
    }

    fn following(&self) -> Option<WizardStep> {
        match self {
            WizardStep::SelectVehicle => Some(WizardStep::SelectServiceType),
            WizardStep::SelectServiceType => Some(WizardStep::ScheduleDetails),
            WizardStep::ScheduleDetails => Some(WizardStep::ConfirmSummary),
            WizardStep::ConfirmSummary => None,
        }
    }

    fn preceding(&self) -> Option<WizardStep> {
        match self {
            WizardStep::SelectVehicle => None,
            WizardStep::SelectServiceType => Some(WizardStep::SelectVehicle),
            WizardStep::ScheduleDetails => Some(WizardStep::SelectServiceType),
            WizardStep::ConfirmSummary => Some(WizardStep::ScheduleDetails),
        }
    }
}

// =============================================================================
// Selections
// =============================================================================

/// The Step 1 selection. Picking an existing vehicle and filling the new
/// vehicle form are mutually exclusive.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum VehicleChoice {
    #[default]
    None,
    Existing(Vehicle),
    New(NewVehicleForm),
}

/// What a successful `next` asks of the caller.
#[derive(Debug, Clone, PartialEq)]
pub enum Advance {
    /// The wizard moved to this step.
    Moved(WizardStep),
    /// Save this vehicle, then call [`BookingWizard::vehicle_persisted`].
    PersistVehicle(NewVehicleForm),
}

/// Read-only view of the accumulated selections, shown on Step 4.
#[derive(Debug, Clone, PartialEq, Serialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct BookingSummary {
    pub vehicle: String,
    pub service_type: String,
    pub delivery_date: String,
    pub notes: String,
}

// =============================================================================
// Wizard
// =============================================================================

#[derive(Debug, Clone, PartialEq)]
pub struct BookingWizard {
    step: WizardStep,
    vehicle: VehicleChoice,
    service_type: Option<String>,
    delivery_date: Option<NaiveDate>,
    notes: String,
    terms_accepted: bool,
}

impl Default for BookingWizard {
    fn default() -> Self {
        Self::new()
    }
}

impl BookingWizard {
    pub fn new() -> Self {
        BookingWizard {
            step: WizardStep::SelectVehicle,
            vehicle: VehicleChoice::None,
            service_type: None,
            delivery_date: None,
            notes: String::new(),
            terms_accepted: false,
        }
    }

    pub fn step(&self) -> WizardStep {
        self.step
    }

    pub fn vehicle(&self) -> &VehicleChoice {
        &self.vehicle
    }

    pub fn service_type(&self) -> Option<&str> {
        self.service_type.as_deref()
    }

    pub fn delivery_date(&self) -> Option<NaiveDate> {
        self.delivery_date
    }

    pub fn terms_accepted(&self) -> bool {
        self.terms_accepted
    }

    // -------------------------------------------------------------------------
    // Input
    // -------------------------------------------------------------------------

    /// Picks one of the customer's saved vehicles (replaces any new-vehicle form).
    pub fn select_vehicle(&mut self, vehicle: Vehicle) {
        self.vehicle = VehicleChoice::Existing(vehicle);
    }

    /// Switches Step 1 to the "add new vehicle" form.
    pub fn fill_new_vehicle(&mut self, form: NewVehicleForm) {
        self.vehicle = VehicleChoice::New(form);
    }

    /// Picks a service type from [`SERVICE_TYPES`], matched case-insensitively.
    pub fn select_service_type(&mut self, service_type: &str) -> Result<(), WizardError> {
        let wanted = service_type.trim();
        let label = SERVICE_TYPES
            .iter()
            .find(|label| label.eq_ignore_ascii_case(wanted))
            .ok_or_else(|| ValidationError::InvalidFormat {
                field: "Service type".to_string(),
                reason: format!("'{}' is not on the service menu", wanted),
            })?;
        self.service_type = Some(label.to_string());
        Ok(())
    }

    pub fn set_delivery_date(&mut self, date: NaiveDate) {
        self.delivery_date = Some(date);
    }

    pub fn set_notes(&mut self, notes: impl Into<String>) {
        self.notes = notes.into();
    }

    pub fn set_terms_accepted(&mut self, accepted: bool) {
        self.terms_accepted = accepted;
    }

    // -------------------------------------------------------------------------
    // Transitions
    // -------------------------------------------------------------------------

    /// Tries to move forward one step.
    ///
    /// ## Errors
    /// - `Validation` when the current step's predicate fails (step unchanged)
    /// - `AlreadyAtEnd` on Step 4, where [`Self::submission`] applies instead
    pub fn next(&mut self, today: NaiveDate) -> Result<Advance, WizardError> {
        match self.step {
            WizardStep::SelectVehicle => {
                let unsaved = match &self.vehicle {
                    VehicleChoice::None => return Err(ValidationError::required("Vehicle").into()),
                    VehicleChoice::Existing(_) => None,
                    VehicleChoice::New(form) => Some(form.validate(today.year())?),
                };
                match unsaved {
                    Some(cleaned) => Ok(Advance::PersistVehicle(cleaned)),
                    None => Ok(self.advance()),
                }
            }
            WizardStep::SelectServiceType => {
                if self.service_type.is_none() {
                    return Err(ValidationError::required("Service type").into());
                }
                Ok(self.advance())
            }
            WizardStep::ScheduleDetails => {
                validate_delivery_date(self.delivery_date, today)?;
                Ok(self.advance())
            }
            WizardStep::ConfirmSummary => Err(WizardError::AlreadyAtEnd),
        }
    }

    fn advance(&mut self) -> Advance {
        if let Some(next) = self.step.following() {
            self.step = next;
        }
        Advance::Moved(self.step)
    }

    /// Records the vehicle the server saved for a new-vehicle form and moves to
    /// Step 2.
    pub fn vehicle_persisted(&mut self, vehicle: Vehicle) -> Result<WizardStep, WizardError> {
        self.require_step(WizardStep::SelectVehicle)?;
        self.vehicle = VehicleChoice::Existing(vehicle);
        self.step = WizardStep::SelectServiceType;
        Ok(self.step)
    }

    /// Moves back one step; a no-op on Step 1. Selections are kept.
    pub fn back(&mut self) -> WizardStep {
        if let Some(previous) = self.step.preceding() {
            self.step = previous;
        }
        self.step
    }

    /// Builds the booking request from the accumulated selections.
    ///
    /// Only valid on Step 4 with the terms accepted. Every earlier predicate is
    /// checked again so a stale date cannot slip through.
    pub fn submission(&self, today: NaiveDate) -> Result<BookingSubmission, WizardError> {
        self.require_step(WizardStep::ConfirmSummary)?;
        if !self.terms_accepted {
            return Err(ValidationError::required("Acceptance of terms and conditions").into());
        }
        let vehicle_id = match &self.vehicle {
            VehicleChoice::Existing(vehicle) => vehicle.vehicle_id.clone(),
            _ => None,
        }
        .ok_or_else(|| ValidationError::required("Vehicle"))?;
        let service_type = self
            .service_type
            .clone()
            .ok_or_else(|| ValidationError::required("Service type"))?;
        let delivery_date = validate_delivery_date(self.delivery_date, today)?;

        Ok(BookingSubmission {
            vehicle_id,
            service_type,
            delivery_date,
            additional_notes: self.notes.trim().to_string(),
            terms_accepted: true,
        })
    }

    /// Clears everything after a successful booking.
    pub fn complete(&mut self) {
        *self = Self::new();
    }

    pub fn summary(&self) -> BookingSummary {
        let vehicle = match &self.vehicle {
            VehicleChoice::None => String::new(),
            VehicleChoice::Existing(vehicle) => vehicle.display_name(),
            VehicleChoice::New(form) => form.to_vehicle().display_name(),
        };
        BookingSummary {
            vehicle,
            service_type: self.service_type.clone().unwrap_or_default(),
            delivery_date: self
                .delivery_date
                .map(|d| d.format("%d %b %Y").to_string())
                .unwrap_or_default(),
            notes: self.notes.clone(),
        }
    }

    fn require_step(&self, expected: WizardStep) -> Result<(), WizardError> {
        if self.step != expected {
            return Err(WizardError::WrongStep {
                expected: expected.number(),
                actual: self.step.number(),
            });
        }
        Ok(())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 3, 10).unwrap()
    }

    fn saved_vehicle() -> Vehicle {
        Vehicle {
            vehicle_id: Some("V7".to_string()),
            brand: "Honda".to_string(),
            model: "City".to_string(),
            registration_number: "MH12AB1234".to_string(),
            category: "Sedan".to_string(),
            year: Some(2020),
        }
    }

    fn at_confirm() -> BookingWizard {
        let mut wizard = BookingWizard::new();
        wizard.select_vehicle(saved_vehicle());
        wizard.next(today()).unwrap();
        wizard.select_service_type("oil change").unwrap();
        wizard.next(today()).unwrap();
        wizard.set_delivery_date(today());
        wizard.next(today()).unwrap();
        wizard
    }

    #[test]
    fn test_step1_without_vehicle_stays() {
        let mut wizard = BookingWizard::new();
        let err = wizard.next(today()).unwrap_err();
        assert_eq!(err, WizardError::Validation(ValidationError::required("Vehicle")));
        assert_eq!(wizard.step(), WizardStep::SelectVehicle);
    }

    #[test]
    fn test_new_vehicle_must_be_persisted_first() {
        let mut wizard = BookingWizard::new();
        wizard.fill_new_vehicle(NewVehicleForm {
            brand: "Tata".to_string(),
            model: "Nexon".to_string(),
            registration_number: "ka01 mj 2020".to_string(),
            category: "SUV".to_string(),
            year: Some(2022),
        });

        match wizard.next(today()).unwrap() {
            Advance::PersistVehicle(form) => assert_eq!(form.registration_number, "KA01MJ2020"),
            other => panic!("expected PersistVehicle, got {:?}", other),
        }
        assert_eq!(wizard.step(), WizardStep::SelectVehicle);

        let mut saved = saved_vehicle();
        saved.vehicle_id = Some("V9".to_string());
        assert_eq!(wizard.vehicle_persisted(saved).unwrap(), WizardStep::SelectServiceType);
    }

    #[test]
    fn test_incomplete_new_vehicle_form_blocks() {
        let mut wizard = BookingWizard::new();
        wizard.fill_new_vehicle(NewVehicleForm {
            brand: "Tata".to_string(),
            ..NewVehicleForm::default()
        });
        assert!(matches!(wizard.next(today()), Err(WizardError::Validation(_))));
        assert_eq!(wizard.step(), WizardStep::SelectVehicle);
    }

    #[test]
    fn test_service_type_must_come_from_menu() {
        let mut wizard = BookingWizard::new();
        wizard.select_vehicle(saved_vehicle());
        wizard.next(today()).unwrap();

        assert!(wizard.next(today()).is_err());
        assert!(wizard.select_service_type("Teleportation").is_err());
        wizard.select_service_type("  BRAKE SERVICE ").unwrap();
        assert_eq!(wizard.service_type(), Some("Brake Service"));
        assert_eq!(
            wizard.next(today()).unwrap(),
            Advance::Moved(WizardStep::ScheduleDetails)
        );
    }

    #[test]
    fn test_past_delivery_date_blocks() {
        let mut wizard = BookingWizard::new();
        wizard.select_vehicle(saved_vehicle());
        wizard.next(today()).unwrap();
        wizard.select_service_type("Electrical").unwrap();
        wizard.next(today()).unwrap();

        wizard.set_delivery_date(today().pred_opt().unwrap());
        let err = wizard.next(today()).unwrap_err();
        assert!(matches!(
            err,
            WizardError::Validation(ValidationError::DateInPast { .. })
        ));
        assert_eq!(wizard.step(), WizardStep::ScheduleDetails);
    }

    #[test]
    fn test_submission_requires_terms() {
        let mut wizard = at_confirm();
        assert_eq!(wizard.step(), WizardStep::ConfirmSummary);
        assert!(wizard.submission(today()).is_err());
        assert_eq!(wizard.next(today()), Err(WizardError::AlreadyAtEnd));

        wizard.set_terms_accepted(true);
        wizard.set_notes("  Squeaking front left  ");
        let submission = wizard.submission(today()).unwrap();
        assert_eq!(submission.vehicle_id, "V7");
        assert_eq!(submission.service_type, "Oil Change");
        assert_eq!(submission.additional_notes, "Squeaking front left");

        wizard.complete();
        assert_eq!(wizard, BookingWizard::new());
    }

    #[test]
    fn test_submission_on_wrong_step() {
        let wizard = BookingWizard::new();
        assert_eq!(
            wizard.submission(today()),
            Err(WizardError::WrongStep { expected: 4, actual: 1 })
        );
    }

    #[test]
    fn test_back_keeps_selections() {
        let mut wizard = at_confirm();
        assert_eq!(wizard.back(), WizardStep::ScheduleDetails);
        assert_eq!(wizard.back(), WizardStep::SelectServiceType);
        assert_eq!(wizard.back(), WizardStep::SelectVehicle);
        assert_eq!(wizard.back(), WizardStep::SelectVehicle);
        assert_eq!(wizard.service_type(), Some("Oil Change"));

        let summary = wizard.summary();
        assert_eq!(summary.vehicle, "Honda City (MH12AB1234)");
        assert_eq!(summary.delivery_date, "10 Mar 2026");
    }
}
