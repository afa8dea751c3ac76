//! Offline commands: token storage and configuration.

use std::path::PathBuf;
use torque_api::auth::{clear_token, store_token};
use torque_api::PortalConfig;
use tracing::info;

use crate::error::{ErrorCode, PortalError, PortalResult};
use crate::{token_path, Command, ConfigAction};

pub fn run_offline(command: &Command, config: &PortalConfig, config_path: Option<PathBuf>) -> PortalResult<()> {
    match command {
        Command::Login { access_token } => {
            let path = require_token_path(config)?;
            if access_token.trim().is_empty() {
                return Err(PortalError::validation("Token is required"));
            }
            store_token(&path, access_token)?;
            println!("Token saved to {}", path.display());
            Ok(())
        }
        Command::Logout => {
            let path = require_token_path(config)?;
            if clear_token(&path)? {
                println!("Signed out");
            } else {
                println!("No saved token");
            }
            Ok(())
        }
        Command::Config { action: ConfigAction::Show } => {
            println!("{}", serde_json::to_string_pretty(config)?);
            Ok(())
        }
        Command::Config { action: ConfigAction::Init } => {
            let path = config.save(config_path)?;
            info!(?path, "Configuration written");
            println!("Configuration written to {}", path.display());
            Ok(())
        }
        _ => Err(PortalError::new(ErrorCode::Internal, "Command needs the backend")),
    }
}

fn require_token_path(config: &PortalConfig) -> PortalResult<PathBuf> {
    token_path(config).ok_or_else(|| {
        PortalError::new(
            ErrorCode::ConfigError,
            "Could not determine the data directory; set auth.token_file or TORQUE_TOKEN_FILE",
        )
    })
}
