//! Stripe checkout client (subscription mode).

use reqwest::Client;
use serde::Deserialize;

use crate::error::{AppError, Result};

#[derive(Debug, Clone, Deserialize)]
pub struct CheckoutSession {
    pub id: String,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub payment_status: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub customer_details: Option<CustomerDetails>,
    #[serde(default)]
    pub subscription: Option<Subscription>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CustomerDetails {
    #[serde(default)]
    pub email: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Subscription {
    #[serde(default)]
    pub items: Option<SubscriptionItems>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SubscriptionItems {
    #[serde(default)]
    pub data: Vec<SubscriptionItem>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SubscriptionItem {
    pub price: Price,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Price {
    pub id: String,
}

impl CheckoutSession {
    /// Stripe reports completion as either `payment_status = paid` or
    /// `status = complete` depending on mode.
    pub fn is_complete(&self) -> bool {
        self.payment_status.as_deref() == Some("paid")
            || self.status.as_deref() == Some("complete")
    }

    /// Price id of the first subscription item, when expanded.
    pub fn subscription_price_id(&self) -> Option<&str> {
        self.subscription
            .as_ref()?
            .items
            .as_ref()?
            .data
            .first()
            .map(|item| item.price.id.as_str())
    }

    pub fn customer_email(&self) -> Option<&str> {
        self.customer_details.as_ref()?.email.as_deref()
    }
}

#[derive(Debug, Clone)]
pub struct StripeClient {
    client: Client,
    api_url: String,
    secret_key: String,
}

impl StripeClient {
    /// `api_url` is the API base (e.g. `https://api.stripe.com/v1`);
    /// overridable so tests can point at a local mock.
    pub fn new(secret_key: &str, api_url: &str) -> Self {
        Self {
            client: Client::new(),
            api_url: api_url.trim_end_matches('/').to_string(),
            secret_key: secret_key.to_string(),
        }
    }

    pub async fn create_checkout_session(
        &self,
        price_id: &str,
        success_url: &str,
        cancel_url: &str,
    ) -> Result<CheckoutSession> {
        let form = [
            ("mode", "subscription"),
            ("line_items[0][price]", price_id),
            ("line_items[0][quantity]", "1"),
            ("success_url", success_url),
            ("cancel_url", cancel_url),
        ];

        let response = self
            .client
            .post(format!("{}/checkout/sessions", self.api_url))
            .header("Authorization", format!("Bearer {}", self.secret_key))
            .form(&form)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::Upstream(format!(
                "Stripe API error: {} {}",
                status, body
            )));
        }

        response.json().await.map_err(|e| {
            AppError::Upstream(format!("Failed to parse Stripe response: {}", e))
        })
    }

    /// Fetch a checkout session with its subscription expanded, so the plan
    /// can be read off the subscription's price id.
    pub async fn retrieve_session(&self, session_id: &str) -> Result<CheckoutSession> {
        let response = self
            .client
            .get(format!("{}/checkout/sessions/{}", self.api_url, session_id))
            .query(&[("expand[]", "subscription")])
            .header("Authorization", format!("Bearer {}", self.secret_key))
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::Upstream(format!(
                "Stripe API error: {} {}",
                status, body
            )));
        }

        response.json().await.map_err(|e| {
            AppError::Upstream(format!("Failed to parse Stripe response: {}", e))
        })
    }
}
