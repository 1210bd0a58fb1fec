use serde::{Deserialize, Serialize};

/// One send request, in the shape the transactional provider accepts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutboundEmail {
    pub from: String,
    pub to: Vec<String>,
    pub subject: String,
    pub html: String,
    pub text: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DeliveryReceipt {
    #[serde(default)]
    pub id: Option<String>,
}

/// Sender/recipient pair resolved from configuration.
#[derive(Debug, Clone)]
pub struct MailRouting {
    pub from: String,
    pub to: String,
}
