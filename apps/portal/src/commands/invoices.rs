//! # Invoice Commands
//!
//! ```text
//!   preview ──► generate ──► pay ──► dispatch
//!                  │
//!                  └──► pdf (local render, server copy on failure)
//! ```
//!
//! Every command starts from the invoice details of a completed service, so a
//! service that is not completed fails before anything is sent.

use std::str::FromStr;
use torque_api::{InvoiceExporter, InvoicePreview, PdfSource, ServiceDesk};
use torque_core::forms::{DispatchForm, PaymentForm};
use torque_core::invoice::InvoiceDocument;
use torque_core::types::{DeliveryType, PaymentMethod};
use torque_core::Money;
use tracing::info;

use super::{print_json, Context};
use crate::error::{PortalError, PortalResult};
use crate::render::render_pairs;
use crate::{DispatchArgs, InvoiceAction, PayArgs};

pub async fn run(ctx: &Context, action: InvoiceAction) -> PortalResult<()> {
    let desk = ServiceDesk::new(ctx.transport());
    match action {
        InvoiceAction::Preview { request_id } => {
            let preview = desk.prepare_invoice(&request_id).await?;
            if ctx.json {
                return print_json(&preview.totals);
            }
            println!("{}", render_preview(&preview));
            Ok(())
        }
        InvoiceAction::Generate { request_id, no_email } => {
            let preview = desk.prepare_invoice(&request_id).await?;
            let send_email = ctx.config.invoices.send_email && !no_email;
            let totals = desk.generate_invoice(&preview.record, send_email).await?;
            println!("Invoice generated for service #{}: {}", request_id, totals.grand_total);
            if send_email {
                println!("Emailed to {}", preview.record.customer.email);
            }
            Ok(())
        }
        InvoiceAction::Pdf { request_id, out } => {
            let preview = desk.prepare_invoice(&request_id).await?;
            let document =
                InvoiceDocument::assemble(&preview.record, &ctx.config.invoices.company, ctx.today())?;
            let output_dir = out.unwrap_or_else(|| ctx.config.invoices.output_dir());
            let exported = InvoiceExporter::new(ctx.transport(), output_dir)
                .export(&document)
                .await?;

            let origin = match exported.source {
                PdfSource::Local => "",
                PdfSource::Server => " (server copy)",
            };
            println!("Invoice saved to {}{}", exported.path.display(), origin);
            Ok(())
        }
        InvoiceAction::Pay(args) => {
            let preview = desk.prepare_invoice(&args.request_id).await?;
            let form = payment_form(&args, &preview)?;
            let done = desk.record_payment(&preview.record, &form).await?;
            info!(request_id = %args.request_id, endpoint = %done.endpoint, "Payment recorded");
            println!("Payment of {} recorded for service #{}", form.amount, args.request_id);
            Ok(())
        }
        InvoiceAction::Dispatch(args) => {
            let form = dispatch_form(&args)?;
            let preview = desk.prepare_invoice(&args.request_id).await?;
            let done = desk.dispatch(&preview.record, &form).await?;
            info!(request_id = %args.request_id, endpoint = %done.endpoint, "Vehicle dispatched");
            println!("Service #{} dispatched", args.request_id);
            Ok(())
        }
    }
}

fn render_preview(preview: &InvoicePreview) -> String {
    let record = &preview.record;
    let details = vec![
        ("Service".to_string(), format!("#{}", record.request_id)),
        ("Customer".to_string(), record.customer.name.clone()),
        ("Membership".to_string(), record.customer.membership.to_string()),
        ("Vehicle".to_string(), record.vehicle.display_name()),
        ("Materials".to_string(), record.materials.len().to_string()),
        ("Labor lines".to_string(), record.labor_charges.len().to_string()),
    ];
    let totals: Vec<(String, String)> = preview
        .totals
        .rows()
        .into_iter()
        .map(|(label, amount)| (label.to_string(), amount.to_string()))
        .collect();

    format!("{}\n{}", render_pairs("Invoice", &details), render_pairs("Totals", &totals))
}

/// Builds the payment body; the amount defaults to the invoice grand total.
fn payment_form(args: &PayArgs, preview: &InvoicePreview) -> PortalResult<PaymentForm> {
    let payment_method = PaymentMethod::from_str(&args.method).map_err(PortalError::validation)?;
    Ok(PaymentForm {
        service_id: preview.record.request_id.clone(),
        payment_method,
        transaction_id: args.reference.clone(),
        amount: args
            .amount
            .map(Money::from_decimal)
            .unwrap_or(preview.totals.grand_total),
        notes: args.notes.clone(),
    })
}

fn dispatch_form(args: &DispatchArgs) -> PortalResult<DispatchForm> {
    let (delivery_type, pickup_person, delivery_address) = match (&args.pickup, &args.deliver_to) {
        (Some(person), None) => (DeliveryType::Pickup, Some(person.clone()), None),
        (None, Some(address)) => (DeliveryType::Delivery, None, Some(address.clone())),
        _ => return Err(PortalError::validation("Choose either --pickup or --deliver-to")),
    };
    Ok(DispatchForm {
        service_id: args.request_id.trim().to_string(),
        delivery_type,
        pickup_person,
        delivery_address,
        notes: args.notes.clone(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;
    use torque_core::billing::calculate;
    use torque_core::types::{LaborLine, MaterialLine, ServiceRecord};

    fn preview() -> InvoicePreview {
        let materials = vec![MaterialLine::new("Brake pad", 2.0, 500.0)];
        let labor = vec![LaborLine::new("Pad replacement", 2.0, 300.0)];
        let totals = calculate(&materials, &labor, "Premium");
        InvoicePreview {
            record: ServiceRecord {
                request_id: "42".to_string(),
                ..ServiceRecord::default()
            },
            totals,
        }
    }

    fn pay_args(amount: Option<f64>) -> PayArgs {
        PayArgs {
            request_id: "42".to_string(),
            method: "UPI".to_string(),
            reference: Some("UTR123".to_string()),
            amount,
            notes: String::new(),
        }
    }

    #[test]
    fn test_payment_defaults_to_grand_total() {
        let form = payment_form(&pay_args(None), &preview()).unwrap();
        assert_eq!(form.amount.to_string(), "₹1675.60");
        assert_eq!(form.payment_method, PaymentMethod::Upi);
        assert_eq!(form.service_id, "42");
    }

    #[test]
    fn test_json_totals_are_rupees() {
        let json = serde_json::to_value(preview().totals).unwrap();
        assert_eq!(json["grandTotal"], 1675.6);
        assert_eq!(json["tax"], 255.6);
    }

    #[test]
    fn test_payment_amount_override() {
        let form = payment_form(&pay_args(Some(1000.0)), &preview()).unwrap();
        assert_eq!(form.amount, Money::from_decimal(1000.0));
    }

    #[test]
    fn test_unknown_payment_method() {
        let mut args = pay_args(None);
        args.method = "barter".to_string();
        let err = payment_form(&args, &preview()).unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);
    }

    #[test]
    fn test_dispatch_requires_a_mode() {
        let args = DispatchArgs {
            request_id: "42".to_string(),
            pickup: None,
            deliver_to: None,
            notes: String::new(),
        };
        assert_eq!(dispatch_form(&args).unwrap_err().code, ErrorCode::ValidationError);
    }

    #[test]
    fn test_dispatch_delivery() {
        let args = DispatchArgs {
            request_id: " 42 ".to_string(),
            pickup: None,
            deliver_to: Some("12 MG Road, Pune".to_string()),
            notes: String::new(),
        };
        let form = dispatch_form(&args).unwrap();
        assert_eq!(form.delivery_type, DeliveryType::Delivery);
        assert_eq!(form.delivery_address.as_deref(), Some("12 MG Road, Pune"));
        assert!(form.pickup_person.is_none());
        assert_eq!(form.service_id, "42");
    }
}
