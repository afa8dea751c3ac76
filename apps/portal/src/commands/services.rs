//! Service tables, advisor assignment and status updates.

use std::str::FromStr;
use torque_api::ServiceDesk;
use torque_core::table::ServiceRow;
use torque_core::types::{ServiceRecord, ServiceStatus};
use tracing::info;

use super::{show_table, Context};
use crate::error::{PortalError, PortalResult};
use crate::ServiceAction;

pub async fn run(ctx: &Context, action: ServiceAction) -> PortalResult<()> {
    let desk = ServiceDesk::new(ctx.transport());
    match action {
        ServiceAction::List { list, args } => {
            show_table(ctx, &args, desk.list(list.into()), |record| ServiceRow::from(record)).await
        }
        ServiceAction::Assign { request_id, advisor_id } => {
            let mut record = find_record(&desk, &request_id).await?;
            desk.assign_advisor(&mut record, &advisor_id).await?;
            info!(%request_id, %advisor_id, "Advisor assigned");
            println!(
                "Service #{} assigned to {}",
                record.request_id,
                record.service_advisor_name.as_deref().unwrap_or(&advisor_id)
            );
            Ok(())
        }
        ServiceAction::Status { request_id, status } => {
            let next = ServiceStatus::from_str(&status).map_err(PortalError::validation)?;
            let mut record = find_record(&desk, &request_id).await?;
            desk.update_status(&mut record, next).await?;
            println!("Service #{} is now {}", record.request_id, record.status);
            Ok(())
        }
    }
}

/// Looks a service up across the three lists.
pub(crate) async fn find_record(desk: &ServiceDesk<'_>, request_id: &str) -> PortalResult<ServiceRecord> {
    let wanted = request_id.trim().trim_start_matches('#');
    desk.all()
        .await?
        .into_iter()
        .find(|record| record.request_id == wanted)
        .ok_or_else(|| PortalError::not_found("Service request", wanted))
}
