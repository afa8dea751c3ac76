use torque_api::AdvisorRoster;
use torque_core::forms::AdvisorForm;
use torque_core::table::AdvisorRow;
use torque_core::types::ServiceAdvisor;

use super::{print_json, show_table, Context};
use crate::error::PortalResult;
use crate::render::render_pairs;
use crate::{AdvisorAction, AdvisorArgs, ListArgs};

pub async fn run(ctx: &Context, action: AdvisorAction) -> PortalResult<()> {
    let roster = AdvisorRoster::new(ctx.transport());
    match action {
        AdvisorAction::List(args) => {
            show_table(ctx, &args, roster.list(), |advisor| AdvisorRow::from(advisor)).await
        }
        AdvisorAction::Available => {
            show_table(ctx, &ListArgs::default(), roster.assignable(), |advisor| AdvisorRow::from(advisor)).await
        }
        AdvisorAction::Show { advisor_id } => show(ctx, &roster.get(&advisor_id).await?),
        AdvisorAction::Add(fields) => {
            let advisor = roster.create(&advisor_form(fields)).await?;
            println!("Advisor {} created", advisor.advisor_id);
            show(ctx, &advisor)
        }
        AdvisorAction::Edit { advisor_id, fields } => {
            let advisor = roster.update(&advisor_id, &advisor_form(fields)).await?;
            println!("Advisor {} updated", advisor.advisor_id);
            show(ctx, &advisor)
        }
    }
}

fn advisor_form(fields: AdvisorArgs) -> AdvisorForm {
    AdvisorForm {
        name: fields.name,
        email: fields.email,
        phone: fields.phone,
        department: fields.department,
    }
}

fn show(ctx: &Context, advisor: &ServiceAdvisor) -> PortalResult<()> {
    if ctx.json {
        return print_json(advisor);
    }
    let row = AdvisorRow::from(advisor);
    let pairs = [
        ("Id", row.advisor_id),
        ("Name", row.name),
        ("Email", row.email),
        ("Phone", row.phone),
        ("Department", row.department),
        ("Workload", row.workload),
        ("Availability", row.availability),
    ];
    println!("{}", render_pairs("Service advisor", &pairs));
    Ok(())
}
