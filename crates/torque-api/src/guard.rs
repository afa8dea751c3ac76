//! In-flight guard for user-triggered actions.
//!
//! A second trigger while the first run is still pending is refused with
//! [`ClientError::Busy`] instead of being queued.

use std::future::Future;
use tokio::sync::Mutex;
use tracing::debug;

use crate::error::{ClientError, ClientResult};

#[derive(Debug)]
pub struct ActionLock {
    name: &'static str,
    running: Mutex<()>,
}

impl ActionLock {
    pub fn new(name: &'static str) -> Self {
        ActionLock {
            name,
            running: Mutex::new(()),
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn is_running(&self) -> bool {
        self.running.try_lock().is_err()
    }

    /// Runs `action` unless another run of this action is in flight.
    pub async fn run<T, F>(&self, action: F) -> ClientResult<T>
    where
        F: Future<Output = ClientResult<T>>,
    {
        let _running = self.running.try_lock().map_err(|_| {
            debug!(action = self.name, "Refusing duplicate trigger");
            ClientError::Busy(self.name.to_string())
        })?;
        action.await
    }
}
