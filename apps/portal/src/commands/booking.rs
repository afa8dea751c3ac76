//! Customer booking: walks the four wizard steps from the command line.

use torque_api::BookingFlow;
use torque_core::forms::NewVehicleForm;

use super::{print_json, Context};
use crate::error::PortalResult;
use crate::render::render_pairs;
use crate::BookArgs;

pub async fn run(ctx: &Context, args: BookArgs) -> PortalResult<()> {
    let today = ctx.today();
    let mut flow = BookingFlow::new(ctx.transport());

    // Step 1
    if let Some(key) = args.vehicle.as_deref() {
        flow.load_vehicles().await?;
        flow.choose_vehicle(key)?;
    } else if let Some(form) = new_vehicle(&args) {
        flow.wizard_mut().fill_new_vehicle(form);
    }
    flow.next(today).await?;

    // Step 2
    flow.wizard_mut().select_service_type(&args.service)?;
    flow.next(today).await?;

    // Step 3
    flow.wizard_mut().set_delivery_date(args.date);
    flow.wizard_mut().set_notes(args.notes.clone());
    flow.next(today).await?;

    // Step 4
    flow.wizard_mut().set_terms_accepted(args.accept_terms);
    let summary = flow.wizard().summary();
    let receipt = flow.submit(today).await?;

    if ctx.json {
        return print_json(&summary);
    }
    let mut pairs = vec![
        ("Vehicle", summary.vehicle),
        ("Service", summary.service_type),
        ("Delivery date", summary.delivery_date),
        ("Reference", receipt.reference.to_string()),
    ];
    if let Some(id) = receipt.request_id {
        pairs.push(("Request", format!("#{}", id)));
    }
    if !summary.notes.is_empty() {
        pairs.push(("Notes", summary.notes));
    }
    println!("{}", render_pairs("Service booked", &pairs));
    Ok(())
}

fn new_vehicle(args: &BookArgs) -> Option<NewVehicleForm> {
    let brand = args.brand.clone()?;
    Some(NewVehicleForm {
        brand,
        model: args.model.clone().unwrap_or_default(),
        registration_number: args.registration.clone().unwrap_or_default(),
        category: args.category.clone(),
        year: args.year,
    })
}
