//! # Portal Configuration
//!
//! Configuration for the portal client.
//!
//! ## Configuration Sources
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Configuration Priority                               │
//! │                                                                         │
//! │  1. Environment Variables (highest priority)                           │
//! │     TORQUE_API_URL=https://portal.torque.example                       │
//! │     TORQUE_PAGE_SIZE=25                                                │
//! │                                                                         │
//! │  2. TOML Config File                                                   │
//! │     ~/.config/portal/portal.toml (Linux)                               │
//! │     ~/Library/Application Support/com.torque.portal/portal.toml        │
//! │                                                                         │
//! │  3. Default Values (lowest priority)                                   │
//! │     http://localhost:8080, 30 s timeout, 10 rows per page              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration File Format
//! ```toml
//! # portal.toml
//! [api]
//! base_url = "https://portal.torque.example"
//! timeout_secs = 30
//!
//! [auth]
//! token_file = "/home/asha/.local/share/portal/token"
//!
//! [tables]
//! page_size = 10
//!
//! [invoices]
//! output_dir = "/home/asha/Invoices"
//! send_email = true
//!
//! [invoices.company]
//! name = "Torque Auto Care"
//! gstin = "27AABCT1234F1Z5"
//!
//! [dashboard]
//! retry_attempts = 3
//! ```

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use torque_core::invoice::CompanyProfile;
use torque_core::DEFAULT_PAGE_SIZE;
use tracing::{debug, info, warn};
use url::Url;

use crate::error::{ClientError, ClientResult};

// =============================================================================
// API Settings
// =============================================================================

/// Where the portal backend lives.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiSettings {
    /// Base URL of the backend; every endpoint path is joined onto it.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Request timeout (seconds). The only timeout the client applies.
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

fn default_base_url() -> String {
    "http://localhost:8080".to_string()
}

fn default_timeout() -> u64 {
    30
}

impl Default for ApiSettings {
    fn default() -> Self {
        ApiSettings {
            base_url: default_base_url(),
            timeout_secs: default_timeout(),
        }
    }
}

// =============================================================================
// Auth Settings
// =============================================================================

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AuthSettings {
    /// Token file. Defaults to `token` in the platform data dir.
    #[serde(default)]
    pub token_file: Option<PathBuf>,
}

// =============================================================================
// Table Settings
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableSettings {
    #[serde(default = "default_page_size")]
    pub page_size: usize,
}

fn default_page_size() -> usize {
    DEFAULT_PAGE_SIZE
}

impl Default for TableSettings {
    fn default() -> Self {
        TableSettings {
            page_size: default_page_size(),
        }
    }
}

// =============================================================================
// Invoice Settings
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InvoiceSettings {
    /// Where exported PDFs are written. Defaults to the current directory.
    #[serde(default)]
    pub output_dir: Option<PathBuf>,

    /// Whether generated invoices are emailed to the customer by default.
    #[serde(default = "default_send_email")]
    pub send_email: bool,

    #[serde(default)]
    pub company: CompanyProfile,
}

fn default_send_email() -> bool {
    true
}

impl Default for InvoiceSettings {
    fn default() -> Self {
        InvoiceSettings {
            output_dir: None,
            send_email: default_send_email(),
            company: CompanyProfile::default(),
        }
    }
}

impl InvoiceSettings {
    pub fn output_dir(&self) -> PathBuf {
        self.output_dir.clone().unwrap_or_else(|| PathBuf::from("."))
    }
}

// =============================================================================
// Dashboard Settings
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardSettings {
    /// Attempts per dashboard load, with no delay between them.
    #[serde(default = "default_retry_attempts")]
    pub retry_attempts: u32,
}

fn default_retry_attempts() -> u32 {
    3
}

impl Default for DashboardSettings {
    fn default() -> Self {
        DashboardSettings {
            retry_attempts: default_retry_attempts(),
        }
    }
}

// =============================================================================
// Main Config
// =============================================================================

/// Complete portal configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PortalConfig {
    #[serde(default)]
    pub api: ApiSettings,

    #[serde(default)]
    pub auth: AuthSettings,

    #[serde(default)]
    pub tables: TableSettings,

    #[serde(default)]
    pub invoices: InvoiceSettings,

    #[serde(default)]
    pub dashboard: DashboardSettings,
}

impl PortalConfig {
    /// Loads configuration from file, then applies environment overrides.
    ///
    /// ## Loading Order
    /// 1. Defaults
    /// 2. `portal.toml` (explicit path, else the platform config dir)
    /// 3. `TORQUE_*` environment variables
    pub fn load(config_path: Option<PathBuf>) -> ClientResult<Self> {
        let mut config = Self::default();

        if let Some(path) = config_path.or_else(Self::default_config_path) {
            if path.exists() {
                info!(?path, "Loading portal config from file");
                let contents = std::fs::read_to_string(&path)?;
                config = toml::from_str(&contents)?;
            } else {
                debug!(?path, "Config file not found, using defaults");
            }
        }

        config.apply_env_overrides();
        config.validate()?;

        Ok(config)
    }

    /// Loads config or returns default if load fails.
    pub fn load_or_default(config_path: Option<PathBuf>) -> Self {
        Self::load(config_path).unwrap_or_else(|e| {
            warn!("Failed to load portal config: {}. Using defaults.", e);
            Self::default()
        })
    }

    /// Saves configuration to file.
    pub fn save(&self, config_path: Option<PathBuf>) -> ClientResult<PathBuf> {
        let path = config_path
            .or_else(Self::default_config_path)
            .ok_or_else(|| ClientError::Config("No config path available".into()))?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self)?;
        std::fs::write(&path, contents)?;

        info!(?path, "Portal config saved");
        Ok(path)
    }

    pub fn validate(&self) -> ClientResult<()> {
        let url = Url::parse(&self.api.base_url)?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(ClientError::Config(format!(
                "API URL must start with http:// or https://, got: {}",
                self.api.base_url
            )));
        }

        if self.api.timeout_secs == 0 {
            return Err(ClientError::Config(
                "timeout_secs must be greater than 0".into(),
            ));
        }

        if self.tables.page_size == 0 {
            return Err(ClientError::Config(
                "page_size must be greater than 0".into(),
            ));
        }

        if self.dashboard.retry_attempts == 0 {
            return Err(ClientError::Config(
                "retry_attempts must be at least 1".into(),
            ));
        }

        Ok(())
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(url) = std::env::var("TORQUE_API_URL") {
            debug!(url = %url, "Overriding API URL from environment");
            self.api.base_url = url;
        }

        if let Ok(timeout) = std::env::var("TORQUE_TIMEOUT_SECS") {
            if let Ok(secs) = timeout.parse::<u64>() {
                self.api.timeout_secs = secs;
            }
        }

        if let Ok(size) = std::env::var("TORQUE_PAGE_SIZE") {
            if let Ok(n) = size.parse::<usize>() {
                debug!(page_size = n, "Overriding page size from environment");
                self.tables.page_size = n;
            }
        }

        if let Ok(path) = std::env::var("TORQUE_TOKEN_FILE") {
            self.auth.token_file = Some(PathBuf::from(path));
        }

        if let Ok(dir) = std::env::var("TORQUE_INVOICE_DIR") {
            debug!(dir = %dir, "Overriding invoice output dir from environment");
            self.invoices.output_dir = Some(PathBuf::from(dir));
        }
    }

    pub fn default_config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("com", "torque", "portal")
            .map(|dirs| dirs.config_dir().join("portal.toml"))
    }

    // =========================================================================
    // Convenience Methods
    // =========================================================================

    pub fn base_url(&self) -> &str {
        &self.api.base_url
    }

    pub fn page_size(&self) -> usize {
        self.tables.page_size
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = PortalConfig::default();
        assert_eq!(config.base_url(), "http://localhost:8080");
        assert_eq!(config.page_size(), 10);
        assert_eq!(config.dashboard.retry_attempts, 3);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_validation() {
        let mut config = PortalConfig::default();

        config.api.base_url = "ftp://portal".to_string();
        assert!(config.validate().is_err());

        config.api.base_url = "not a url".to_string();
        assert!(config.validate().is_err());

        config.api.base_url = "https://portal.torque.example".to_string();
        config.tables.page_size = 0;
        assert!(config.validate().is_err());

        config.tables.page_size = 25;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let config: PortalConfig = toml::from_str(
            r#"
            [api]
            base_url = "https://portal.torque.example"

            [invoices.company]
            name = "Torque Pune"
            "#,
        )
        .unwrap();
        assert_eq!(config.api.timeout_secs, 30);
        assert_eq!(config.tables.page_size, 10);
        assert_eq!(config.invoices.company.name, "Torque Pune");
        assert!(config.invoices.send_email);
    }

    #[test]
    fn test_save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("portal.toml");

        let mut config = PortalConfig::default();
        config.tables.page_size = 20;
        config.save(Some(path.clone())).unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        assert!(contents.contains("[api]"));
        assert!(contents.contains("[tables]"));

        let loaded: PortalConfig = toml::from_str(&contents).unwrap();
        assert_eq!(loaded.tables.page_size, 20);
    }
}
