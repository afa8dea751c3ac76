//! # Billing Calculator
//!
//! Computes invoice totals from material and labor lines.
//!
//! ## Formula
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  materials_total = Σ material line totals                              │
//! │  labor_total     = Σ labor line totals                                 │
//! │  discount        = labor_total × 30%     (Premium only, labor only)    │
//! │  subtotal        = materials_total + labor_total − discount            │
//! │  tax             = subtotal × 18%        (GST, always)                 │
//! │  grand_total     = subtotal + tax                                      │
//! │                                                                         │
//! │  Example (Premium):                                                     │
//! │    materials 2 × 500      = ₹1000.00                                   │
//! │    labor     2h × 300     =  ₹600.00                                   │
//! │    discount  600 × 30%    =  ₹180.00                                   │
//! │    subtotal               = ₹1420.00                                   │
//! │    GST       1420 × 18%   =  ₹255.60                                   │
//! │    grand total            = ₹1675.60                                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Line totals are summed as decimals and rounded to paise once per total;
//! every later step is integer paise with half-up rounding.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::money::Money;
use crate::types::{LaborLine, MaterialLine, Membership, Rate, ServiceRecord};
use crate::{GST_BPS, PREMIUM_LABOR_DISCOUNT_BPS};

/// Finalized totals of one invoice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct InvoiceTotals {
    pub materials_total: Money,
    pub labor_total: Money,
    pub discount: Money,
    pub subtotal: Money,
    pub tax: Money,
    pub grand_total: Money,
}

impl InvoiceTotals {
    /// Labelled rows in display order; the discount row is omitted when zero.
    pub fn rows(&self) -> Vec<(&'static str, Money)> {
        let mut rows = vec![("Materials", self.materials_total), ("Labor", self.labor_total)];
        if !self.discount.is_zero() {
            rows.push(("Premium discount (30% on labor)", self.discount));
        }
        rows.push(("Subtotal", self.subtotal));
        rows.push(("GST (18%)", self.tax));
        rows.push(("Grand total", self.grand_total));
        rows
    }
}

/// Computes totals for a membership given as free text.
///
/// Any membership string containing "premium" (any case) gets the labor
/// discount.
///
/// ## Example
/// ```rust
/// use torque_core::billing::calculate;
///
/// let totals = calculate(&[], &[], "Standard");
/// assert!(totals.grand_total.is_zero());
/// ```
pub fn calculate(materials: &[MaterialLine], labor: &[LaborLine], membership: &str) -> InvoiceTotals {
    calculate_with(materials, labor, Membership::from_label(membership))
}

/// Computes totals for a known membership tier.
pub fn calculate_with(
    materials: &[MaterialLine],
    labor: &[LaborLine],
    membership: Membership,
) -> InvoiceTotals {
    let materials_total = Money::from_decimal(materials.iter().map(MaterialLine::raw_total).sum());
    let labor_total = Money::from_decimal(labor.iter().map(LaborLine::raw_total).sum());
    from_totals(materials_total, labor_total, membership)
}

/// Computes totals for a service record.
///
/// Uses the record's labor lines, or the service-tracking labor summary when
/// there are none.
pub fn calculate_for(record: &ServiceRecord) -> InvoiceTotals {
    calculate_with(
        &record.materials,
        &record.billable_labor(),
        record.customer.membership,
    )
}

/// Derives discount, tax and grand total from already-summed totals.
pub fn from_totals(materials_total: Money, labor_total: Money, membership: Membership) -> InvoiceTotals {
    let discount = if membership.is_premium() {
        labor_total.apply_rate(Rate::from_bps(PREMIUM_LABOR_DISCOUNT_BPS))
    } else {
        Money::zero()
    };
    let subtotal = materials_total + labor_total - discount;
    let tax = subtotal.apply_rate(Rate::from_bps(GST_BPS));

    InvoiceTotals {
        materials_total,
        labor_total,
        discount,
        subtotal,
        tax,
        grand_total: subtotal + tax,
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ServiceStatus;

    #[test]
    fn test_premium_scenario() {
        let materials = vec![MaterialLine::new("Brake pad", 2.0, 500.0)];
        let labor = vec![LaborLine::new("Pad replacement", 2.0, 300.0)];

        let totals = calculate(&materials, &labor, "Premium");
        assert_eq!(totals.materials_total.to_string(), "₹1000.00");
        assert_eq!(totals.labor_total.to_string(), "₹600.00");
        assert_eq!(totals.discount.to_string(), "₹180.00");
        assert_eq!(totals.subtotal.to_string(), "₹1420.00");
        assert_eq!(totals.tax.to_string(), "₹255.60");
        assert_eq!(totals.grand_total.to_string(), "₹1675.60");
    }

    #[test]
    fn test_standard_scenario() {
        let materials = vec![MaterialLine::new("Brake pad", 2.0, 500.0)];
        let labor = vec![LaborLine::new("Pad replacement", 2.0, 300.0)];

        let totals = calculate(&materials, &labor, "standard");
        assert!(totals.discount.is_zero());
        assert_eq!(totals.subtotal.paise(), 160_000);
        assert_eq!(totals.tax.paise(), 28_800);
        assert_eq!(totals.grand_total.paise(), 188_800);
    }

    #[test]
    fn test_empty_lines_are_all_zero() {
        let totals = calculate(&[], &[], "Standard");
        assert_eq!(totals, InvoiceTotals::default());
        assert_eq!(totals.grand_total.to_string(), "₹0.00");
    }

    #[test]
    fn test_discount_applies_to_labor_only() {
        let materials = vec![MaterialLine::new("Tyre", 4.0, 3500.0)];
        let totals = calculate(&materials, &[], "PREMIUM");
        assert!(totals.discount.is_zero());
        assert_eq!(totals.subtotal.paise(), 1_400_000);
    }

    #[test]
    fn test_server_line_total_wins() {
        let mut line = MaterialLine::new("Coolant", 3.0, 100.0);
        line.total = Some(250.0);
        let totals = calculate(&[line], &[], "Standard");
        assert_eq!(totals.materials_total.paise(), 25_000);
    }

    #[test]
    fn test_sum_is_rounded_once() {
        let lines: Vec<MaterialLine> = (0..3).map(|_| MaterialLine::new("Washer", 1.0, 0.1)).collect();
        let totals = calculate(&lines, &[], "Standard");
        assert_eq!(totals.materials_total.paise(), 30);
    }

    #[test]
    fn test_formula_holds_across_inputs() {
        let samples = [0, 1, 5, 99, 12_345, 60_000, 1_000_001];
        for &m in &samples {
            for &l in &samples {
                for membership in [Membership::Standard, Membership::Premium] {
                    let totals = from_totals(Money::from_paise(m), Money::from_paise(l), membership);
                    assert!(totals.discount.paise() <= l);
                    assert_eq!(
                        totals.subtotal,
                        totals.materials_total + totals.labor_total - totals.discount
                    );
                    assert_eq!(totals.grand_total, totals.subtotal + totals.tax);
                    assert_eq!(
                        totals.tax,
                        totals.subtotal.apply_rate(Rate::from_bps(GST_BPS))
                    );
                    if membership == Membership::Standard {
                        assert!(totals.discount.is_zero());
                    }
                    // Idempotent
                    assert_eq!(
                        totals,
                        from_totals(Money::from_paise(m), Money::from_paise(l), membership)
                    );
                }
            }
        }
    }

    #[test]
    fn test_calculate_for_uses_labor_summary() {
        let mut record = ServiceRecord {
            request_id: "41".to_string(),
            status: ServiceStatus::Completed,
            materials: vec![MaterialLine::new("Brake pad", 2.0, 500.0)],
            labor_minutes: Some(120.0),
            labor_cost: Some(600.0),
            ..ServiceRecord::default()
        };
        record.customer.membership = Membership::Premium;

        let totals = calculate_for(&record);
        assert_eq!(totals.labor_total.paise(), 60_000);
        assert_eq!(totals.grand_total.paise(), 167_560);
    }

    #[test]
    fn test_rows_skip_zero_discount() {
        let totals = calculate(&[], &[LaborLine::new("Wash", 1.0, 100.0)], "Standard");
        let labels: Vec<&str> = totals.rows().iter().map(|(label, _)| *label).collect();
        assert_eq!(
            labels,
            vec!["Materials", "Labor", "Subtotal", "GST (18%)", "Grand total"]
        );
    }
}
