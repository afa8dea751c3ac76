//! Dashboard summary cards for the admin portal.

use serde::Serialize;
use ts_rs::TS;

use crate::billing::calculate_for;
use crate::money::Money;
use crate::types::{InventoryItem, ServiceClass, ServiceRecord, StockStatus};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct DashboardSummary {
    pub due: usize,
    pub in_service: usize,
    pub completed: usize,
    /// Completed, no invoice yet.
    pub pending_invoices: usize,
    /// Invoiced, not paid.
    pub unpaid_invoices: usize,
    /// Paid, not yet handed over.
    pub awaiting_delivery: usize,
    pub low_stock_items: usize,
    /// Grand totals of paid services.
    pub revenue: Money,
}

impl DashboardSummary {
    pub fn from_lists(services: &[ServiceRecord], inventory: &[InventoryItem]) -> Self {
        let mut summary = DashboardSummary::default();
        for record in services {
            match record.classification() {
                ServiceClass::Due => summary.due += 1,
                ServiceClass::InService => summary.in_service += 1,
                ServiceClass::Completed => {
                    summary.completed += 1;
                    if !record.has_invoice {
                        summary.pending_invoices += 1;
                    } else if !record.is_paid {
                        summary.unpaid_invoices += 1;
                    } else {
                        summary.revenue += calculate_for(record).grand_total;
                        if !record.is_delivered {
                            summary.awaiting_delivery += 1;
                        }
                    }
                }
            }
        }
        summary.low_stock_items = inventory
            .iter()
            .filter(|item| item.stock_status() == StockStatus::Low)
            .count();
        summary
    }

    /// Card title and value, in display order.
    pub fn cards(&self) -> Vec<(&'static str, String)> {
        vec![
            ("Vehicles due", self.due.to_string()),
            ("In service", self.in_service.to_string()),
            ("Completed", self.completed.to_string()),
            ("Pending invoices", self.pending_invoices.to_string()),
            ("Unpaid invoices", self.unpaid_invoices.to_string()),
            ("Awaiting delivery", self.awaiting_delivery.to_string()),
            ("Low stock items", self.low_stock_items.to_string()),
            ("Revenue", self.revenue.to_string()),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{LaborLine, ServiceStatus};

    fn service(id: &str, status: ServiceStatus, advisor: bool) -> ServiceRecord {
        ServiceRecord {
            request_id: id.to_string(),
            status,
            service_advisor_id: advisor.then(|| "7".to_string()),
            labor_charges: vec![LaborLine::new("Wash", 1.0, 100.0)],
            ..ServiceRecord::default()
        }
    }

    #[test]
    fn test_summary_counts() {
        let mut paid = service("4", ServiceStatus::Completed, true);
        paid.has_invoice = true;
        paid.is_paid = true;
        let mut unpaid = service("5", ServiceStatus::Completed, true);
        unpaid.has_invoice = true;

        let services = vec![
            service("1", ServiceStatus::Received, false),
            service("2", ServiceStatus::Diagnosis, true),
            service("3", ServiceStatus::Completed, true),
            paid,
            unpaid,
        ];
        let inventory = vec![InventoryItem {
            item_id: "9".to_string(),
            name: "Coolant".to_string(),
            category: "Fluids".to_string(),
            current_stock: 1,
            unit_price: 320.0,
            reorder_level: 5,
        }];

        let summary = DashboardSummary::from_lists(&services, &inventory);
        assert_eq!(summary.due, 1);
        assert_eq!(summary.in_service, 1);
        assert_eq!(summary.completed, 3);
        assert_eq!(summary.pending_invoices, 1);
        assert_eq!(summary.unpaid_invoices, 1);
        assert_eq!(summary.awaiting_delivery, 1);
        assert_eq!(summary.low_stock_items, 1);
        // ₹100 labor + 18% GST
        assert_eq!(summary.revenue.to_string(), "₹118.00");
        assert_eq!(summary.cards().len(), 8);
    }
}
