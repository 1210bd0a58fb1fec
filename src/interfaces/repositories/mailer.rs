use async_trait::async_trait;

use crate::{entities::email::{DeliveryReceipt, OutboundEmail}, errors::DeliveryError};

#[async_trait]
pub trait Mailer: Send + Sync {
    /// Pre-flight credential check, no network involved.
    fn check_credentials(&self) -> Result<(), DeliveryError>;

    /// Exactly one POST to the provider; no retries.
    async fn send(&self, email: &OutboundEmail) -> Result<DeliveryReceipt, DeliveryError>;
}
