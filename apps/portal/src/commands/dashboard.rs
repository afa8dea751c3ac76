use torque_api::DashboardLoader;

use super::{print_json, Context};
use crate::error::PortalResult;
use crate::render::render_pairs;

pub async fn run(ctx: &Context) -> PortalResult<()> {
    let summary = DashboardLoader::new(ctx.transport())
        .with_attempts(ctx.config.dashboard.retry_attempts)
        .load()
        .await?;

    if ctx.json {
        return print_json(&summary);
    }
    println!("{}", render_pairs("Dashboard", &summary.cards()));
    Ok(())
}
