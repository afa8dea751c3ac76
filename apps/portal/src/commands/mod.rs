//! # Portal Commands
//!
//! One module per portal screen. Every command receives the shared
//! [`Context`] and returns [`PortalResult`].
//!
//! ## Table Commands
//! ```text
//!   PageStore::begin_load ──► REST list ──► apply_load ──► search ──► go_to(page)
//!                                                                      │
//!                                          --json ◄── page items ──────┤
//!                                          table  ◄── TableView ◄──────┘
//! ```

pub mod advisors;
pub mod auth;
pub mod booking;
pub mod customers;
pub mod dashboard;
pub mod inventory;
pub mod invoices;
pub mod services;

use chrono::{Local, NaiveDate};
use serde::Serialize;
use std::future::Future;
use torque_api::pages::apply_load;
use torque_api::{ApiTransport, ClientResult, HttpClient, PortalConfig};
use torque_core::store::{Keyed, PageStore};
use torque_core::table::{Searchable, TableRow};

use crate::error::PortalResult;
use crate::render::render_page;
use crate::{Command, ListArgs};

/// Everything a networked command needs.
pub struct Context {
    pub config: PortalConfig,
    client: HttpClient,
    pub json: bool,
}

impl Context {
    pub fn new(config: PortalConfig, client: HttpClient, json: bool) -> Self {
        Context { config, client, json }
    }

    pub fn transport(&self) -> &dyn ApiTransport {
        &self.client
    }

    pub fn today(&self) -> NaiveDate {
        Local::now().date_naive()
    }
}

pub async fn dispatch(ctx: &Context, command: Command) -> PortalResult<()> {
    match command {
        Command::Dashboard => dashboard::run(ctx).await,
        Command::Services { action } => services::run(ctx, action).await,
        Command::Invoice { action } => invoices::run(ctx, action).await,
        Command::Customers { action } => customers::run(ctx, action).await,
        Command::Inventory { action } => inventory::run(ctx, action).await,
        Command::Advisors { action } => advisors::run(ctx, action).await,
        Command::Book(args) => booking::run(ctx, args).await,
        offline @ (Command::Login { .. } | Command::Logout | Command::Config { .. }) => {
            auth::run_offline(&offline, &ctx.config, None)
        }
    }
}

/// Loads a list into a page store and prints the requested page.
pub(crate) async fn show_table<T, R, Fut>(
    ctx: &Context,
    args: &ListArgs,
    load: Fut,
    to_row: impl Fn(&T) -> R,
) -> PortalResult<()>
where
    T: Searchable + Keyed + Serialize,
    R: TableRow,
    Fut: Future<Output = ClientResult<Vec<T>>>,
{
    let mut store = PageStore::new(ctx.config.page_size());
    let ticket = store.begin_load();
    apply_load(&mut store, ticket, load.await)?;

    if let Some(query) = args.search.as_deref() {
        store.table_mut().search(query)?;
    }
    store.table_mut().go_to(args.page);

    if ctx.json {
        print_json(&store.table().page_items())
    } else {
        println!("{}", render_page(&store.table().view(to_row)));
        Ok(())
    }
}

pub(crate) fn print_json<T: Serialize + ?Sized>(value: &T) -> PortalResult<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
