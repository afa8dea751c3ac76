//! Service advisor roster (`/admin/service-advisors/api/advisors`).

use reqwest::Method;
use torque_core::forms::AdvisorForm;
use torque_core::normalizer::{normalize_advisor, normalize_advisor_list};
use torque_core::types::ServiceAdvisor;
use tracing::info;

use crate::decode::{report_rejected, unwrap_data};
use crate::endpoints::{self, ADVISORS};
use crate::error::ClientResult;
use crate::http::ApiTransport;

pub struct AdvisorRoster<'a> {
    transport: &'a dyn ApiTransport,
}

impl<'a> AdvisorRoster<'a> {
    pub fn new(transport: &'a dyn ApiTransport) -> Self {
        AdvisorRoster { transport }
    }

    pub async fn list(&self) -> ClientResult<Vec<ServiceAdvisor>> {
        let raw = self.transport.get_json(ADVISORS).await?;
        let advisors = report_rejected(normalize_advisor_list(&raw)?, "service advisors");
        info!(count = advisors.len(), "Service advisors loaded");
        Ok(advisors)
    }

    pub async fn get(&self, advisor_id: &str) -> ClientResult<ServiceAdvisor> {
        let raw = self
            .transport
            .get_json(&endpoints::entity(ADVISORS, advisor_id))
            .await?;
        Ok(normalize_advisor(unwrap_data(&raw))?)
    }

    /// Available advisors, least busy first.
    pub async fn assignable(&self) -> ClientResult<Vec<ServiceAdvisor>> {
        let mut advisors: Vec<ServiceAdvisor> = self
            .list()
            .await?
            .into_iter()
            .filter(|advisor| advisor.available)
            .collect();
        advisors.sort_by(|a, b| {
            a.active_services
                .cmp(&b.active_services)
                .then_with(|| a.name.cmp(&b.name))
        });
        Ok(advisors)
    }

    pub async fn create(&self, form: &AdvisorForm) -> ClientResult<ServiceAdvisor> {
        let form = form.validate()?;
        let body = serde_json::to_value(&form)?;
        let raw = self.transport.send_json(Method::POST, ADVISORS, &body).await?;

        let advisor = normalize_advisor(unwrap_data(&raw))?;
        info!(advisor_id = %advisor.advisor_id, "Service advisor created");
        Ok(advisor)
    }

    pub async fn update(&self, advisor_id: &str, form: &AdvisorForm) -> ClientResult<ServiceAdvisor> {
        let form = form.validate()?;
        let body = serde_json::to_value(&form)?;
        let raw = self
            .transport
            .send_json(Method::PUT, &endpoints::entity(ADVISORS, advisor_id), &body)
            .await?;

        info!(%advisor_id, "Service advisor updated");
        Ok(normalize_advisor(unwrap_data(&raw)).unwrap_or_else(|_| ServiceAdvisor {
            advisor_id: advisor_id.to_string(),
            name: form.name.clone(),
            email: form.email.clone(),
            phone: form.phone.clone(),
            department: form.department.clone(),
            active_services: 0,
            available: true,
        }))
    }
}
