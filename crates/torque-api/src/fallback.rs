//! # Fallback Chains and Fixed Retry
//!
//! Some backend actions live at different paths depending on the deployment.
//! An [`EndpointChain`] tries each path in order:
//!
//! ```text
//!   endpoint A ──fail──► endpoint B ──fail──► endpoint C ──fail──► Err(C's error)
//!       │ ok                 │ ok                 │ ok
//!       ▼                    ▼                    ▼
//!     done                 done                 done
//! ```
//!
//! ## Rules
//! - The first success wins; later endpoints are not called.
//! - When every endpoint fails, the *last* failure is returned.
//! - A session-expired error stops the chain immediately.
//! - No delay between attempts.

use reqwest::Method;
use serde_json::Value;
use std::future::Future;
use tracing::{debug, info, warn};

use crate::error::{ClientError, ClientResult};
use crate::http::ApiTransport;

/// Number of attempts for loads that retry without backoff.
pub const DEFAULT_RETRY_ATTEMPTS: u32 = 3;

/// Result of a chain that found a working endpoint.
#[derive(Debug, Clone, PartialEq)]
pub struct ChainSuccess<T> {
    pub value: T,
    pub endpoint: String,
    /// 1 when the first endpoint answered.
    pub attempts: usize,
}

/// Ordered list of endpoints for one action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EndpointChain {
    action: String,
    endpoints: Vec<String>,
}

impl EndpointChain {
    pub fn new(action: impl Into<String>, endpoints: Vec<String>) -> Self {
        EndpointChain {
            action: action.into(),
            endpoints,
        }
    }

    pub fn action(&self) -> &str {
        &self.action
    }

    pub fn endpoints(&self) -> &[String] {
        &self.endpoints
    }

    /// Calls `call` with each endpoint until one succeeds.
    ///
    /// ## Errors
    /// - `NoEndpoints` when the chain is empty
    /// - the last endpoint's error when all fail
    pub async fn first_success<T, F, Fut>(&self, mut call: F) -> ClientResult<ChainSuccess<T>>
    where
        F: FnMut(String) -> Fut,
        Fut: Future<Output = ClientResult<T>>,
    {
        let mut last_error = None;

        for (index, endpoint) in self.endpoints.iter().enumerate() {
            debug!(action = %self.action, endpoint = %endpoint, "Trying endpoint");
            match call(endpoint.clone()).await {
                Ok(value) => {
                    if index > 0 {
                        info!(action = %self.action, endpoint = %endpoint, "Fallback endpoint succeeded");
                    }
                    return Ok(ChainSuccess {
                        value,
                        endpoint: endpoint.clone(),
                        attempts: index + 1,
                    });
                }
                Err(err) if err.is_session_expired() => return Err(err),
                Err(err) => {
                    warn!(action = %self.action, endpoint = %endpoint, error = %err, "Endpoint failed");
                    last_error = Some(err);
                }
            }
        }

        Err(last_error.unwrap_or_else(|| ClientError::NoEndpoints(self.action.clone())))
    }

    /// Sends the same JSON body to each endpoint in turn.
    pub async fn send(
        &self,
        transport: &dyn ApiTransport,
        method: Method,
        body: &Value,
    ) -> ClientResult<ChainSuccess<Value>> {
        self.first_success(|path| {
            let method = method.clone();
            async move { transport.send_json(method, &path, body).await }
        })
        .await
    }
}

/// Runs `op` up to `attempts` times back to back, returning the first success
/// or the last error. Session errors are not retried.
pub async fn retry_fixed<T, F, Fut>(label: &str, attempts: u32, mut op: F) -> ClientResult<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = ClientResult<T>>,
{
    let attempts = attempts.max(1);
    let mut attempt = 1;
    loop {
        match op().await {
            Ok(value) => return Ok(value),
            Err(err) if attempt < attempts && !err.is_session_expired() => {
                warn!(%label, attempt, attempts, error = %err, "Attempt failed, retrying");
                attempt += 1;
            }
            Err(err) => return Err(err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chain(paths: &[&str]) -> EndpointChain {
        EndpointChain::new("Payment", paths.iter().map(|p| p.to_string()).collect())
    }

    #[tokio::test]
    async fn test_first_success_wins() {
        let mut seen = Vec::new();
        let result = chain(&["/a", "/b", "/c"])
            .first_success(|path| {
                seen.push(path.clone());
                async move {
                    if path == "/b" {
                        Ok(path)
                    } else {
                        Err(ClientError::Network(format!("{} unreachable", path)))
                    }
                }
            })
            .await
            .unwrap();

        assert_eq!(result.value, "/b");
        assert_eq!(result.attempts, 2);
        assert_eq!(seen, vec!["/a", "/b"]);
    }

    #[tokio::test]
    async fn test_last_failure_surfaces() {
        let err = chain(&["/a", "/b", "/c"])
            .first_success(|path| async move {
                Err::<(), _>(ClientError::Http {
                    status: 404,
                    message: format!("{} not found", path),
                })
            })
            .await
            .unwrap_err();

        match err {
            ClientError::Http { message, .. } => assert_eq!(message, "/c not found"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_empty_chain() {
        let err = chain(&[])
            .first_success(|_| async { Ok(()) })
            .await
            .unwrap_err();
        assert!(matches!(err, ClientError::NoEndpoints(action) if action == "Payment"));
    }

    #[tokio::test]
    async fn test_session_expiry_stops_chain() {
        let mut calls = 0;
        let err = chain(&["/a", "/b"])
            .first_success(|_| {
                calls += 1;
                async {
                    Err::<(), _>(ClientError::SessionExpired {
                        redirect: "/login?error=session_expired".into(),
                    })
                }
            })
            .await
            .unwrap_err();
        assert!(err.is_session_expired());
        assert_eq!(calls, 1);
    }

    #[tokio::test]
    async fn test_retry_fixed() {
        let mut calls = 0;
        let value = retry_fixed("dashboard", 3, || {
            calls += 1;
            let n = calls;
            async move {
                if n < 3 {
                    Err(ClientError::Network("flaky".into()))
                } else {
                    Ok(n)
                }
            }
        })
        .await
        .unwrap();
        assert_eq!(value, 3);

        let mut calls = 0;
        let err = retry_fixed("dashboard", 3, || {
            calls += 1;
            async { Err::<(), _>(ClientError::Network("down".into())) }
        })
        .await
        .unwrap_err();
        assert!(matches!(err, ClientError::Network(_)));
        assert_eq!(calls, 3);
    }
}
