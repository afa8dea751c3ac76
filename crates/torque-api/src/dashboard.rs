//! Dashboard loader: every service list plus inventory, summarized.

use torque_core::dashboard::DashboardSummary;
use tracing::info;

use crate::error::{ClientError, ClientResult};
use crate::fallback::{retry_fixed, DEFAULT_RETRY_ATTEMPTS};
use crate::http::ApiTransport;
use crate::inventory::InventoryCatalog;
use crate::services::ServiceDesk;

pub struct DashboardLoader<'a> {
    transport: &'a dyn ApiTransport,
    attempts: u32,
}

impl<'a> DashboardLoader<'a> {
    pub fn new(transport: &'a dyn ApiTransport) -> Self {
        DashboardLoader {
            transport,
            attempts: DEFAULT_RETRY_ATTEMPTS,
        }
    }

    pub fn with_attempts(mut self, attempts: u32) -> Self {
        self.attempts = attempts;
        self
    }

    /// Loads the summary, retrying the whole load back to back on failure.
    pub async fn load(&self) -> ClientResult<DashboardSummary> {
        let transport = self.transport;
        let summary = retry_fixed("dashboard", self.attempts, || async move {
            let services = ServiceDesk::new(transport).all().await?;
            let inventory = InventoryCatalog::new(transport).list().await?;
            Ok::<_, ClientError>(DashboardSummary::from_lists(&services, &inventory))
        })
        .await?;

        info!(
            due = summary.due,
            in_service = summary.in_service,
            completed = summary.completed,
            revenue = %summary.revenue,
            "Dashboard loaded"
        );
        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::endpoints;
    use crate::testing::{MockTransport, Reply};
    use reqwest::Method;
    use serde_json::json;

    fn transport(first_due_reply: Reply) -> MockTransport {
        MockTransport::new()
            .on(Method::GET, endpoints::VEHICLES_DUE, first_due_reply)
            .on(Method::GET, endpoints::VEHICLES_DUE, Reply::Json(json!([{"requestId": 1}])))
            .on(
                Method::GET,
                endpoints::VEHICLES_IN_SERVICE,
                Reply::Json(json!([{"requestId": 2, "status": "REPAIR", "serviceAdvisorId": 4}])),
            )
            .on(Method::GET, endpoints::COMPLETED_SERVICES, Reply::Json(json!({"content": []})))
            .on(Method::GET, endpoints::INVENTORY_ITEMS, Reply::Json(json!([])))
    }

    #[tokio::test]
    async fn test_retries_after_transient_failure() {
        let transport = transport(Reply::Offline);
        let summary = DashboardLoader::new(&transport).load().await.unwrap();
        assert_eq!(summary.due, 1);
        assert_eq!(summary.in_service, 1);
        assert_eq!(transport.calls_to(endpoints::VEHICLES_DUE), 2);
    }

    #[tokio::test]
    async fn test_gives_up_after_attempts() {
        let transport = MockTransport::new().on(Method::GET, endpoints::VEHICLES_DUE, Reply::Status(502, "Bad Gateway"));
        let err = DashboardLoader::new(&transport).load().await.unwrap_err();
        assert!(err.is_retryable());
        assert_eq!(transport.calls_to(endpoints::VEHICLES_DUE), 3);
    }
}
