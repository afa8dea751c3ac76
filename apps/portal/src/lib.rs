//! # Torque Portal Library
//!
//! Command-line front-end for the Torque admin, customer and service-advisor
//! portals.
//!
//! ## Module Organization
//! ```text
//! torque_portal/
//! ├── lib.rs          ◄─── You are here (CLI definition & startup)
//! ├── commands/
//! │   ├── mod.rs      ◄─── Context + shared listing helper
//! │   ├── auth.rs     ◄─── login / logout / config
//! │   ├── services.rs ◄─── service tables, advisor assignment, status
//! │   ├── invoices.rs ◄─── preview, generate, pdf, pay, dispatch
//! │   ├── customers.rs, inventory.rs, advisors.rs ◄─── admin CRUD
//! │   ├── booking.rs  ◄─── customer booking wizard
//! │   └── dashboard.rs
//! ├── render.rs       ◄─── comfy-table renderer for TableView
//! └── error.rs        ◄─── PortalError for commands
//! ```
//!
//! ## Startup Sequence
//! 1. Initialize tracing (logging)
//! 2. Parse the command line
//! 3. Load `portal.toml` (falls back to defaults with a warning)
//! 4. Resolve the bearer token (unless the command works offline)
//! 5. Build the HTTP client and run the command

pub mod commands;
pub mod error;
pub mod render;

use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use tracing::{debug, error, info};
use tracing_subscriber::EnvFilter;

use commands::Context;
use error::PortalResult;
use torque_api::auth::{self, ResolvedToken, TokenSource};
use torque_api::{HttpClient, PortalConfig};
use torque_core::types::ServiceClass;

// =============================================================================
// Command Line
// =============================================================================

#[derive(Debug, Parser)]
#[command(name = "torque-portal", version, about = "Torque Service Portal")]
pub struct Cli {
    /// Path to portal.toml (defaults to the platform config dir)
    #[arg(long, global = true, env = "TORQUE_CONFIG")]
    pub config: Option<PathBuf>,

    /// Bearer token; takes precedence over every other source
    #[arg(long, global = true)]
    pub token: Option<String>,

    /// Portal URL as opened in the browser; its `token` parameter is used
    #[arg(long, global = true)]
    pub portal_url: Option<String>,

    /// Print JSON instead of tables
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Save a token for later runs
    Login {
        #[arg(value_name = "TOKEN")]
        access_token: String,
    },
    /// Remove the saved token
    Logout,
    /// Show or write the configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
    /// Summary counts for the admin dashboard
    Dashboard,
    /// Service request tables and workflow
    Services {
        #[command(subcommand)]
        action: ServiceAction,
    },
    /// Invoices for completed services
    Invoice {
        #[command(subcommand)]
        action: InvoiceAction,
    },
    /// Customer directory
    Customers {
        #[command(subcommand)]
        action: CustomerAction,
    },
    /// Inventory catalog
    Inventory {
        #[command(subcommand)]
        action: InventoryAction,
    },
    /// Service advisor roster
    Advisors {
        #[command(subcommand)]
        action: AdvisorAction,
    },
    /// Book a service (customer portal)
    Book(BookArgs),
}

impl Command {
    /// Commands that never call the backend.
    fn is_offline(&self) -> bool {
        matches!(self, Command::Login { .. } | Command::Logout | Command::Config { .. })
    }
}

#[derive(Debug, Subcommand)]
pub enum ConfigAction {
    Show,
    /// Write the effective configuration to portal.toml
    Init,
}

/// Search and paging options shared by every table.
#[derive(Debug, Clone, Default, Args)]
pub struct ListArgs {
    /// Case-insensitive substring filter
    #[arg(long, short)]
    pub search: Option<String>,

    /// Page to show (clamped to the available pages)
    #[arg(long, short, default_value_t = 1)]
    pub page: usize,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum ServiceList {
    Due,
    InService,
    Completed,
}

impl From<ServiceList> for ServiceClass {
    fn from(list: ServiceList) -> Self {
        match list {
            ServiceList::Due => ServiceClass::Due,
            ServiceList::InService => ServiceClass::InService,
            ServiceList::Completed => ServiceClass::Completed,
        }
    }
}

#[derive(Debug, Subcommand)]
pub enum ServiceAction {
    /// Show one of the service tables
    List {
        #[arg(value_enum)]
        list: ServiceList,
        #[command(flatten)]
        args: ListArgs,
    },
    /// Assign a service advisor to a due service
    Assign { request_id: String, advisor_id: String },
    /// Move a service to a later status
    Status { request_id: String, status: String },
}

#[derive(Debug, Subcommand)]
pub enum InvoiceAction {
    /// Show the invoice details and totals
    Preview { request_id: String },
    /// Generate the invoice on the server
    Generate {
        request_id: String,
        /// Do not email the invoice to the customer
        #[arg(long)]
        no_email: bool,
    },
    /// Write the invoice PDF
    Pdf {
        request_id: String,
        /// Output directory (defaults to the configured one)
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Record a payment for an invoiced service
    Pay(PayArgs),
    /// Dispatch an invoiced vehicle
    Dispatch(DispatchArgs),
}

#[derive(Debug, Args)]
pub struct PayArgs {
    pub request_id: String,
    /// cash, card, upi, net_banking or cheque
    #[arg(long)]
    pub method: String,
    /// Transaction reference (required except for cash)
    #[arg(long)]
    pub reference: Option<String>,
    /// Amount received; defaults to the invoice grand total
    #[arg(long)]
    pub amount: Option<f64>,
    #[arg(long, default_value = "")]
    pub notes: String,
}

#[derive(Debug, Args)]
pub struct DispatchArgs {
    pub request_id: String,
    /// Person collecting the vehicle
    #[arg(long, conflicts_with = "deliver_to")]
    pub pickup: Option<String>,
    /// Address to deliver the vehicle to
    #[arg(long)]
    pub deliver_to: Option<String>,
    #[arg(long, default_value = "")]
    pub notes: String,
}

#[derive(Debug, Args)]
pub struct CustomerArgs {
    #[arg(long)]
    pub name: String,
    #[arg(long)]
    pub email: String,
    #[arg(long)]
    pub phone: String,
    #[arg(long, default_value = "")]
    pub street: String,
    #[arg(long, default_value = "")]
    pub city: String,
    #[arg(long, default_value = "")]
    pub state: String,
    #[arg(long, default_value = "")]
    pub postal_code: String,
    /// Membership label; anything containing "premium" is Premium
    #[arg(long, default_value = "Standard")]
    pub membership: String,
}

#[derive(Debug, Subcommand)]
pub enum CustomerAction {
    List(ListArgs),
    Show { customer_id: String },
    Add(CustomerArgs),
    Edit {
        customer_id: String,
        #[command(flatten)]
        fields: CustomerArgs,
    },
}

#[derive(Debug, Args)]
pub struct ItemArgs {
    #[arg(long)]
    pub name: String,
    #[arg(long)]
    pub category: String,
    #[arg(long)]
    pub stock: i64,
    #[arg(long)]
    pub unit_price: f64,
    #[arg(long)]
    pub reorder_level: i64,
}

#[derive(Debug, Subcommand)]
pub enum InventoryAction {
    List(ListArgs),
    /// Items at or below their reorder level
    LowStock,
    Show { item_id: String },
    Add(ItemArgs),
    Edit {
        item_id: String,
        #[command(flatten)]
        fields: ItemArgs,
    },
}

#[derive(Debug, Args)]
pub struct AdvisorArgs {
    #[arg(long)]
    pub name: String,
    #[arg(long)]
    pub email: String,
    #[arg(long)]
    pub phone: String,
    #[arg(long)]
    pub department: String,
}

#[derive(Debug, Subcommand)]
pub enum AdvisorAction {
    List(ListArgs),
    /// Available advisors, least busy first
    Available,
    Show { advisor_id: String },
    Add(AdvisorArgs),
    Edit {
        advisor_id: String,
        #[command(flatten)]
        fields: AdvisorArgs,
    },
}

#[derive(Debug, Args)]
pub struct BookArgs {
    /// Saved vehicle, by id or registration number
    #[arg(long, conflicts_with = "brand")]
    pub vehicle: Option<String>,
    /// New vehicle brand (registers the vehicle first)
    #[arg(long, requires_all = ["model", "registration"])]
    pub brand: Option<String>,
    #[arg(long)]
    pub model: Option<String>,
    #[arg(long)]
    pub registration: Option<String>,
    #[arg(long, default_value = "")]
    pub category: String,
    #[arg(long)]
    pub year: Option<i32>,
    /// Service type, e.g. "Oil Change"
    #[arg(long)]
    pub service: String,
    /// Delivery date (YYYY-MM-DD), today or later
    #[arg(long)]
    pub date: chrono::NaiveDate,
    #[arg(long, default_value = "")]
    pub notes: String,
    /// Accept the service terms
    #[arg(long)]
    pub accept_terms: bool,
}

// =============================================================================
// Startup
// =============================================================================

/// Parses the command line, runs the command and returns the exit code.
pub async fn run() -> i32 {
    init_tracing();
    let cli = Cli::parse();
    let json = cli.json;

    match execute(cli).await {
        Ok(()) => 0,
        Err(err) => {
            error!(code = ?err.code, "{}", err.message);
            if json {
                match serde_json::to_string_pretty(&err) {
                    Ok(body) => eprintln!("{}", body),
                    Err(_) => eprintln!("{}", err),
                }
            } else {
                eprintln!("Error: {}", err.message);
            }
            err.code.exit_code()
        }
    }
}

async fn execute(cli: Cli) -> PortalResult<()> {
    let config = PortalConfig::load_or_default(cli.config.clone());
    debug!(base_url = %config.base_url(), "Configuration loaded");

    if cli.command.is_offline() {
        return commands::auth::run_offline(&cli.command, &config, cli.config.clone());
    }

    let resolved = resolve(&cli, &config)?;
    info!(source = %resolved.source, "Using access token");
    let client = HttpClient::new(&config.api)?.with_token(resolved.token);

    let ctx = Context::new(config, client, cli.json);
    commands::dispatch(&ctx, cli.command).await
}

fn resolve(cli: &Cli, config: &PortalConfig) -> PortalResult<ResolvedToken> {
    if let Some(token) = cli.token.as_deref().map(str::trim).filter(|t| !t.is_empty()) {
        return Ok(ResolvedToken {
            token: token.to_string(),
            source: TokenSource::Explicit,
        });
    }

    let token_file = token_path(config);
    let resolved = auth::resolve_token(cli.portal_url.as_deref(), token_file.as_deref())?;

    // A token handed over in the portal URL becomes the local token for later runs.
    if resolved.source == TokenSource::UrlQuery {
        if let Some(path) = &token_file {
            auth::store_token(path, &resolved.token)?;
        }
    }
    Ok(resolved)
}

pub(crate) fn token_path(config: &PortalConfig) -> Option<PathBuf> {
    config.auth.token_file.clone().or_else(auth::default_token_path)
}

/// Initializes the tracing subscriber for structured logging.
///
/// ## Log Levels
/// - `RUST_LOG=debug` - Show debug messages
/// - `RUST_LOG=torque=trace` - Show trace for torque crates only
/// - Default: `info,torque=debug`
///
/// Logs go to stderr so tables and JSON on stdout stay clean.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,torque=debug"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
