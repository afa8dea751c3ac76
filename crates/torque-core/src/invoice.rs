//! # Invoice Layout
//!
//! Assembles the fixed invoice template from a completed service record.
//! Rendering to PDF happens in `torque-api`; this module only decides what
//! goes where.
//!
//! ## Template
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  HEADER        company name, address, GSTIN        INVOICE INV-41       │
//! │                                                    Date 10 Mar 2026     │
//! ├──────────────────────────────────┬──────────────────────────────────────┤
//! │  BILL TO (customer box)          │  VEHICLE (vehicle box)               │
//! ├──────────────────────────────────┴──────────────────────────────────────┤
//! │  MATERIALS   item │ qty │ unit price │ total                            │
//! │  LABOR       task │ hrs │ rate       │ total                            │
//! ├─────────────────────────────────────────────────────────────────────────┤
//! │                                      TOTALS  materials … grand total    │
//! │  TERMS                                                                   │
//! │  FOOTER                                                                  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::billing::{calculate_for, InvoiceTotals};
use crate::error::CoreResult;
use crate::money::Money;
use crate::types::ServiceRecord;

/// Terms printed on every invoice.
pub const INVOICE_TERMS: [&str; 3] = [
    "Payment is due on delivery of the vehicle.",
    "Parts replaced carry the manufacturer's warranty only.",
    "Vehicles not collected within 7 days of completion may incur parking charges.",
];

/// Workshop details printed in the header.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompanyProfile {
    pub name: String,
    pub address_lines: Vec<String>,
    pub phone: String,
    pub email: String,
    pub gstin: String,
}

impl Default for CompanyProfile {
    fn default() -> Self {
        CompanyProfile {
            name: "Torque Auto Care".to_string(),
            address_lines: vec![
                "Plot 14, MIDC Industrial Area".to_string(),
                "Pune, Maharashtra 411019".to_string(),
            ],
            phone: "+91 20 4000 1234".to_string(),
            email: "billing@torque.example".to_string(),
            gstin: String::new(),
        }
    }
}

/// One row of the materials or labor table.
#[derive(Debug, Clone, PartialEq)]
pub struct InvoiceLine {
    pub description: String,
    /// Quantity for materials, hours for labor, already formatted.
    pub quantity: String,
    pub unit_price: Money,
    pub total: Money,
}

/// Everything the renderer needs, in template order.
#[derive(Debug, Clone, PartialEq)]
pub struct InvoiceDocument {
    pub invoice_number: String,
    pub request_id: String,
    pub issue_date: NaiveDate,
    pub company: CompanyProfile,
    pub customer_lines: Vec<String>,
    pub vehicle_lines: Vec<String>,
    pub materials: Vec<InvoiceLine>,
    pub labor: Vec<InvoiceLine>,
    pub totals: InvoiceTotals,
    pub terms: Vec<String>,
    pub footer: String,
}

fn format_quantity(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{}", value as i64)
    } else {
        format!("{:.2}", value)
    }
}

impl InvoiceDocument {
    /// Lays out the invoice for a completed service.
    ///
    /// ## Errors
    /// `ServiceNotCompleted` when the record is not in the Completed state.
    pub fn assemble(
        record: &ServiceRecord,
        company: &CompanyProfile,
        issue_date: NaiveDate,
    ) -> CoreResult<Self> {
        record.ensure_invoiceable()?;

        let customer = &record.customer;
        let mut customer_lines = vec![customer.name.clone()];
        customer_lines.extend(
            [&customer.email, &customer.phone]
                .into_iter()
                .filter(|v| !v.is_empty())
                .cloned(),
        );
        customer_lines.push(format!("Membership: {}", customer.membership));

        let vehicle = &record.vehicle;
        let mut vehicle_lines = vec![
            format!("{} {}", vehicle.brand, vehicle.model).trim().to_string(),
            format!("Registration: {}", vehicle.registration_number),
        ];
        if let Some(year) = vehicle.year {
            vehicle_lines.push(format!("Year: {}", year));
        }
        if let Some(service) = &record.service_type {
            vehicle_lines.push(format!("Service: {}", service));
        }

        let materials = record
            .materials
            .iter()
            .map(|m| InvoiceLine {
                description: m.name.clone(),
                quantity: format_quantity(m.quantity),
                unit_price: Money::from_decimal(m.unit_price),
                total: m.line_total(),
            })
            .collect();
        let labor = record
            .billable_labor()
            .iter()
            .map(|l| InvoiceLine {
                description: l.description.clone(),
                quantity: format!("{} h", format_quantity(l.hours)),
                unit_price: Money::from_decimal(l.rate),
                total: l.line_total(),
            })
            .collect();

        Ok(InvoiceDocument {
            invoice_number: format!("INV-{}", record.request_id),
            request_id: record.request_id.clone(),
            issue_date,
            company: company.clone(),
            customer_lines,
            vehicle_lines,
            materials,
            labor,
            totals: calculate_for(record),
            terms: INVOICE_TERMS.iter().map(|t| t.to_string()).collect(),
            footer: format!("Thank you for choosing {}.", company.name),
        })
    }

    /// Download file name, e.g. `INV-41-Asha Kulkarni.pdf`.
    pub fn file_name(&self) -> String {
        let customer = self.customer_lines.first().map(String::as_str).unwrap_or("");
        sanitize_filename(&format!("{}-{}.pdf", self.invoice_number, customer))
    }

    /// Label/amount pairs of the totals block, without the rupee glyph (the
    /// built-in PDF fonts cannot draw it).
    pub fn totals_block(&self) -> Vec<(String, String)> {
        self.totals
            .rows()
            .into_iter()
            .map(|(label, amount)| (label.to_string(), format!("Rs. {}", amount.to_plain_string())))
            .collect()
    }
}

/// Keeps letters, digits, `-`, `_`, `.` and spaces; everything else becomes `_`.
pub fn sanitize_filename(input: &str) -> String {
    let cleaned: String = input
        .chars()
        .map(|ch| {
            if ch.is_ascii_alphanumeric() || matches!(ch, '-' | '_' | '.' | ' ') {
                ch
            } else {
                '_'
            }
        })
        .collect();
    let trimmed = cleaned.trim();
    if trimmed.is_empty() {
        "invoice.pdf".to_string()
    } else {
        trimmed.to_string()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CoreError;
    use crate::types::{LaborLine, MaterialLine, Membership, ServiceStatus};

    fn completed() -> ServiceRecord {
        let mut record = ServiceRecord {
            request_id: "41".to_string(),
            status: ServiceStatus::Completed,
            service_type: Some("Brake Service".to_string()),
            materials: vec![MaterialLine::new("Brake pad", 2.0, 500.0)],
            labor_charges: vec![LaborLine::new("Pad replacement", 2.0, 300.0)],
            ..ServiceRecord::default()
        };
        record.customer.name = "Asha Kulkarni".to_string();
        record.customer.email = "asha@example.com".to_string();
        record.customer.membership = Membership::Premium;
        record.vehicle.brand = "Honda".to_string();
        record.vehicle.model = "City".to_string();
        record.vehicle.registration_number = "MH12AB1234".to_string();
        record
    }

    fn issued() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 3, 10).unwrap()
    }

    #[test]
    fn test_assemble_layout() {
        let doc = InvoiceDocument::assemble(&completed(), &CompanyProfile::default(), issued()).unwrap();
        assert_eq!(doc.invoice_number, "INV-41");
        assert_eq!(
            doc.customer_lines,
            vec!["Asha Kulkarni", "asha@example.com", "Membership: Premium"]
        );
        assert_eq!(doc.vehicle_lines[0], "Honda City");
        assert_eq!(doc.materials[0].quantity, "2");
        assert_eq!(doc.labor[0].quantity, "2 h");
        assert_eq!(doc.totals.grand_total.paise(), 167_560);
        assert_eq!(doc.terms.len(), INVOICE_TERMS.len());

        let block = doc.totals_block();
        assert_eq!(block.last().unwrap(), &("Grand total".to_string(), "Rs. 1675.60".to_string()));
    }

    #[test]
    fn test_assemble_requires_completed_service() {
        let mut record = completed();
        record.status = ServiceStatus::Repair;
        let err = InvoiceDocument::assemble(&record, &CompanyProfile::default(), issued()).unwrap_err();
        assert_eq!(err, CoreError::ServiceNotCompleted("41".to_string()));
    }

    #[test]
    fn test_file_name_is_sanitized() {
        let mut record = completed();
        record.customer.name = "R/K: Motors?".to_string();
        let doc = InvoiceDocument::assemble(&record, &CompanyProfile::default(), issued()).unwrap();
        assert_eq!(doc.file_name(), "INV-41-R_K_ Motors_.pdf");
        assert_eq!(sanitize_filename("///"), "___");
        assert_eq!(sanitize_filename("  "), "invoice.pdf");
    }
}
