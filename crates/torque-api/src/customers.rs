//! Customer directory (`/admin/customers/api`).

use reqwest::Method;
use serde_json::Value;
use torque_core::forms::CustomerForm;
use torque_core::normalizer::{normalize_customer, normalize_customer_list};
use torque_core::types::Customer;
use tracing::info;

use crate::decode::{report_rejected, unwrap_data};
use crate::endpoints::{self, CUSTOMERS};
use crate::error::ClientResult;
use crate::http::ApiTransport;

pub struct CustomerDirectory<'a> {
    transport: &'a dyn ApiTransport,
}

impl<'a> CustomerDirectory<'a> {
    pub fn new(transport: &'a dyn ApiTransport) -> Self {
        CustomerDirectory { transport }
    }

    pub async fn list(&self) -> ClientResult<Vec<Customer>> {
        let raw = self.transport.get_json(CUSTOMERS).await?;
        let customers = report_rejected(normalize_customer_list(&raw)?, "customers");
        info!(count = customers.len(), "Customers loaded");
        Ok(customers)
    }

    pub async fn get(&self, customer_id: &str) -> ClientResult<Customer> {
        let raw = self
            .transport
            .get_json(&endpoints::entity(CUSTOMERS, customer_id))
            .await?;
        Ok(normalize_customer(unwrap_data(&raw))?)
    }

    /// Validates and creates a customer. The backend must echo the new id.
    pub async fn create(&self, form: &CustomerForm) -> ClientResult<Customer> {
        let form = form.validate()?;
        let body = serde_json::to_value(&form)?;
        let raw = self.transport.send_json(Method::POST, CUSTOMERS, &body).await?;

        let customer = normalize_customer(unwrap_data(&raw))?;
        info!(customer_id = %customer.customer_id, "Customer created");
        Ok(customer)
    }

    /// Validates and updates a customer. An empty answer is fine: the saved
    /// customer is then rebuilt from the form.
    pub async fn update(&self, customer_id: &str, form: &CustomerForm) -> ClientResult<Customer> {
        let form = form.validate()?;
        let body = serde_json::to_value(&form)?;
        let raw = self
            .transport
            .send_json(Method::PUT, &endpoints::entity(CUSTOMERS, customer_id), &body)
            .await?;

        info!(%customer_id, "Customer updated");
        Ok(saved_customer(&raw, customer_id, &form))
    }
}

fn saved_customer(raw: &Value, customer_id: &str, form: &CustomerForm) -> Customer {
    normalize_customer(unwrap_data(raw)).unwrap_or_else(|_| Customer {
        customer_id: customer_id.to_string(),
        name: form.name.clone(),
        email: form.email.clone(),
        phone: form.phone.clone(),
        street: form.street.clone(),
        city: form.city.clone(),
        state: form.state.clone(),
        postal_code: form.postal_code.clone(),
        membership: form.membership,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ClientError;
    use crate::testing::{MockTransport, Reply};
    use serde_json::json;
    use torque_core::types::Membership;

    fn form() -> CustomerForm {
        CustomerForm {
            name: "Asha Kulkarni".to_string(),
            email: "asha@example.com".to_string(),
            phone: "98765 43210".to_string(),
            city: "Pune".to_string(),
            membership: Membership::Premium,
            ..CustomerForm::default()
        }
    }

    #[tokio::test]
    async fn test_list_skips_unusable_entries() {
        let transport = MockTransport::new().on(
            Method::GET,
            CUSTOMERS,
            Reply::Json(json!({"content": [
                {"customerId": 1, "firstName": "Ravi", "lastName": "Menon", "isPremium": true},
                {"name": "No id"}
            ]})),
        );
        let customers = CustomerDirectory::new(&transport).list().await.unwrap();
        assert_eq!(customers.len(), 1);
        assert_eq!(customers[0].name, "Ravi Menon");
        assert_eq!(customers[0].membership, Membership::Premium);
    }

    #[tokio::test]
    async fn test_create_sends_cleaned_form() {
        let transport = MockTransport::new().on(
            Method::POST,
            CUSTOMERS,
            Reply::Json(json!({"data": {"id": 12, "name": "Asha Kulkarni"}})),
        );
        let customer = CustomerDirectory::new(&transport).create(&form()).await.unwrap();
        assert_eq!(customer.customer_id, "12");

        let body = transport.last_body(CUSTOMERS).unwrap();
        assert_eq!(body["phone"], "9876543210");
        assert_eq!(body["membershipStatus"], "Premium");
    }

    #[tokio::test]
    async fn test_invalid_form_is_not_sent() {
        let transport = MockTransport::new();
        let mut bad = form();
        bad.email = "not-an-email".to_string();
        let err = CustomerDirectory::new(&transport).create(&bad).await.unwrap_err();
        assert!(matches!(err, ClientError::Validation(_)));
        assert!(transport.calls().is_empty());
    }

    #[tokio::test]
    async fn test_update_with_empty_answer() {
        let transport = MockTransport::new().on(
            Method::PUT,
            "/admin/customers/api/12",
            Reply::Json(Value::Null),
        );
        let customer = CustomerDirectory::new(&transport)
            .update("12", &form())
            .await
            .unwrap();
        assert_eq!(customer.customer_id, "12");
        assert_eq!(customer.city, "Pune");
    }
}
