use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use zeroize::Zeroizing;

use crate::{
    entities::email::{DeliveryReceipt, OutboundEmail},
    errors::DeliveryError,
    repositories::mailer::Mailer,
};

pub const API_KEY_PREFIX: &str = "re_";

/// Resend transactional email client.
#[derive(Clone)]
pub struct ResendMailer {
    client: Client,
    endpoint: String,
    api_key: Option<Zeroizing<String>>,
}

impl ResendMailer {
    pub fn new(endpoint: impl Into<String>, api_key: Option<String>, timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            client,
            endpoint: endpoint.into(),
            api_key: api_key.filter(|k| !k.is_empty()).map(Zeroizing::new),
        })
    }

    fn key(&self) -> Result<&str, DeliveryError> {
        let key: &str = self.api_key
            .as_ref()
            .map(|k| k.as_str())
            .ok_or(DeliveryError::MissingApiKey)?;
        if !key.starts_with(API_KEY_PREFIX) {
            let shown: String = key.chars().take(10).collect();
            return Err(DeliveryError::MalformedApiKey(format!("{}...", shown)));
        }
        Ok(key)
    }
}

#[async_trait]
impl Mailer for ResendMailer {
    fn check_credentials(&self) -> Result<(), DeliveryError> {
        self.key().map(|_| ())
    }

    async fn send(&self, email: &OutboundEmail) -> Result<DeliveryReceipt, DeliveryError> {
        let key = self.key()?;

        let response = self.client
            .post(&self.endpoint)
            .bearer_auth(key)
            .json(email)
            .send()
            .await
            .map_err(|e| DeliveryError::Transport(e.to_string()))?;

        let status = response.status();
        if status.is_success() {
            // A 2xx with an odd body still means the mail went out
            let receipt = response
                .json::<DeliveryReceipt>()
                .await
                .unwrap_or(DeliveryReceipt { id: None });
            Ok(receipt)
        } else {
            let body = response.text().await.unwrap_or_default();
            Err(DeliveryError::Rejected { status: status.as_u16(), body })
        }
    }
}
