//! # Bearer Token Resolution
//!
//! The portal backend authenticates every call with a bearer JWT. The token
//! can arrive three ways, checked in order:
//!
//! ```text
//!   portal URL ?token=…   ──► found? use it (and persist it to the token file)
//!        │ no
//!   TORQUE_TOKEN env      ──► found? use it
//!        │ no
//!   token file            ──► found? use it
//!        │ no
//!   ClientError::MissingToken
//! ```

use std::fmt;
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use url::Url;

use crate::error::{ClientError, ClientResult};

/// Environment variable holding the session token.
pub const TOKEN_ENV: &str = "TORQUE_TOKEN";

/// Where a resolved token came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenSource {
    /// Passed directly (e.g. `--token`).
    Explicit,
    /// `token` query parameter of a portal URL.
    UrlQuery,
    /// The session environment variable.
    Session,
    /// A token file on disk.
    LocalFile(PathBuf),
}

impl fmt::Display for TokenSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenSource::Explicit => write!(f, "command line"),
            TokenSource::UrlQuery => write!(f, "portal URL"),
            TokenSource::Session => write!(f, "{}", TOKEN_ENV),
            TokenSource::LocalFile(path) => write!(f, "{}", path.display()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedToken {
    pub token: String,
    pub source: TokenSource,
}

/// Extracts the `token` query parameter from a portal URL.
pub fn token_from_url(portal_url: &str) -> Option<String> {
    let url = Url::parse(portal_url).ok()?;
    url.query_pairs()
        .find(|(key, _)| key == "token")
        .map(|(_, value)| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

/// Resolves the token from the URL, then `TORQUE_TOKEN`, then the token file.
pub fn resolve_token(portal_url: Option<&str>, token_file: Option<&Path>) -> ClientResult<ResolvedToken> {
    let session = std::env::var(TOKEN_ENV).ok();
    resolve_token_from(portal_url, session, token_file)
}

/// [`resolve_token`] with the session value supplied by the caller.
pub fn resolve_token_from(
    portal_url: Option<&str>,
    session: Option<String>,
    token_file: Option<&Path>,
) -> ClientResult<ResolvedToken> {
    if let Some(token) = portal_url.and_then(token_from_url) {
        debug!("Using token from portal URL");
        return Ok(ResolvedToken {
            token,
            source: TokenSource::UrlQuery,
        });
    }

    if let Some(token) = session.map(|t| t.trim().to_string()).filter(|t| !t.is_empty()) {
        debug!("Using token from {}", TOKEN_ENV);
        return Ok(ResolvedToken {
            token,
            source: TokenSource::Session,
        });
    }

    if let Some(path) = token_file {
        if path.exists() {
            let token = std::fs::read_to_string(path)?.trim().to_string();
            if !token.is_empty() {
                debug!(?path, "Using token from file");
                return Ok(ResolvedToken {
                    token,
                    source: TokenSource::LocalFile(path.to_path_buf()),
                });
            }
        }
    }

    Err(ClientError::MissingToken)
}

/// Writes the token so later runs pick it up from the local source.
pub fn store_token(path: &Path, token: &str) -> ClientResult<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, token.trim())?;
    info!(?path, "Token saved");
    Ok(())
}

pub fn clear_token(path: &Path) -> ClientResult<bool> {
    if path.exists() {
        std::fs::remove_file(path)?;
        info!(?path, "Token removed");
        return Ok(true);
    }
    Ok(false)
}

pub fn default_token_path() -> Option<PathBuf> {
    directories::ProjectDirs::from("com", "torque", "portal").map(|dirs| dirs.data_dir().join("token"))
}

/// Login page the user is sent to after a 401/403.
pub fn login_redirect(base_url: &Url) -> String {
    match base_url.join("login?error=session_expired") {
        Ok(url) => url.to_string(),
        Err(_) => format!(
            "{}/login?error=session_expired",
            base_url.as_str().trim_end_matches('/')
        ),
    }
}
