//! Payment provider client.
//!
//! Only payment intent creation is modelled. The client confirms the charge
//! with the provider directly and then posts the payment record itself.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use reqwest::Client;
use serde::Deserialize;

use crate::resp::problem::{problems, Problem};

const STRIPE_API_BASE: &str = "https://api.stripe.com/v1";
pub const PAYMENT_CURRENCY: &str = "usd";

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PaymentIntent {
    pub id: String,
    pub client_secret: String,
}

#[rocket::async_trait]
pub trait PaymentProvider: Send + Sync + std::fmt::Debug {
    /// `amount` is in minor units of `currency`.
    async fn create_payment_intent(
        &self,
        amount: i64,
        currency: &str,
    ) -> Result<PaymentIntent, Problem>;
}

pub type Payments = Arc<dyn PaymentProvider>;

#[derive(Clone)]
pub struct StripeClient {
    client: Client,
    base_url: String,
}

impl std::fmt::Debug for StripeClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StripeClient")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

impl StripeClient {
    pub fn new(secret_key: &str) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .default_headers({
                let mut headers = reqwest::header::HeaderMap::new();
                headers.insert(
                    reqwest::header::AUTHORIZATION,
                    format!("Bearer {}", secret_key)
                        .parse()
                        .context("Invalid payment secret key")?,
                );
                headers
            })
            .build()
            .context("Failed to build StripeClient")?;

        Ok(Self {
            client,
            base_url: STRIPE_API_BASE.to_string(),
        })
    }

    #[inline]
    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn request_intent(&self, amount: i64, currency: &str) -> Result<PaymentIntent> {
        let amount = amount.to_string();
        let form = [
            ("amount", amount.as_str()),
            ("currency", currency),
            ("payment_method_types[]", "card"),
        ];

        let response = self
            .client
            .post(self.url("/payment_intents"))
            .form(&form)
            .send()
            .await
            .context("Payment intent request failed")?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            bail!("payment provider answered {}: {}", status, body);
        }

        response
            .json::<PaymentIntent>()
            .await
            .context("Unexpected payment intent response")
    }
}

#[rocket::async_trait]
impl PaymentProvider for StripeClient {
    async fn create_payment_intent(
        &self,
        amount: i64,
        currency: &str,
    ) -> Result<PaymentIntent, Problem> {
        tracing::info!("creating payment intent for {} {}", amount, currency);
        self.request_intent(amount, currency).await.map_err(|e| {
            tracing::error!("payment intent failed: {:#}", e);
            problems::payment_problem("Unable to create payment intent.")
        })
    }
}

/// Stand-in used when no provider secret is configured.
#[derive(Debug, Clone, Copy, Default)]
pub struct Unconfigured;

#[rocket::async_trait]
impl PaymentProvider for Unconfigured {
    async fn create_payment_intent(&self, _: i64, _: &str) -> Result<PaymentIntent, Problem> {
        Err(problems::payment_problem("Payment provider not configured."))
    }
}
