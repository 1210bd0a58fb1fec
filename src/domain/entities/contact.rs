use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::domain::validation::{contains_at_sign, contact_consent_given};
use crate::entities::submission::{is_checked, non_empty, SpamSignals};
use crate::utils::lenient;

/// Raw contact form body. Missing keys default to the empty string.
#[derive(Debug, Default, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactPayload {
    #[serde(default, deserialize_with = "lenient::text")]
    pub first_name: String,

    #[serde(default, deserialize_with = "lenient::text")]
    pub last_name: String,

    #[serde(default, deserialize_with = "lenient::text")]
    pub email: String,

    #[serde(default, deserialize_with = "lenient::text")]
    pub message: String,

    #[serde(default, deserialize_with = "lenient::text")]
    pub phone: String,

    #[serde(default, deserialize_with = "lenient::text")]
    pub subject: String,

    #[serde(default, deserialize_with = "lenient::text")]
    pub gdpr_consent: String,

    #[serde(default, deserialize_with = "lenient::text")]
    pub website: String,

    #[serde(default, deserialize_with = "lenient::text")]
    pub started_at: String,
}

#[derive(Debug, Clone, Validate)]
pub struct ContactSubmission {
    #[validate(length(min = 2, message = "Meno musí mať aspoň 2 znaky"))]
    pub first_name: String,

    #[validate(length(min = 2, message = "Priezvisko musí mať aspoň 2 znaky"))]
    pub last_name: String,

    #[validate(custom(function = "contains_at_sign"))]
    pub email: String,

    #[validate(length(min = 10, message = "Správa musí mať aspoň 10 znakov"))]
    pub message: String,

    #[validate(length(min = 6, message = "Telefónne číslo musí mať aspoň 6 znakov"))]
    pub phone: Option<String>,

    pub subject: Option<String>,

    #[validate(custom(function = "contact_consent_given"))]
    pub gdpr_consent: bool,

    pub honeypot: String,
    pub started_at: String,
}

impl From<ContactPayload> for ContactSubmission {
    fn from(payload: ContactPayload) -> Self {
        ContactSubmission {
            first_name: payload.first_name.trim().to_string(),
            last_name: payload.last_name.trim().to_string(),
            email: payload.email.trim().to_string(),
            message: payload.message.trim().to_string(),
            phone: non_empty(&payload.phone),
            subject: non_empty(&payload.subject),
            gdpr_consent: is_checked(&payload.gdpr_consent),
            honeypot: payload.website.trim().to_string(),
            started_at: payload.started_at.trim().to_string(),
        }
    }
}

impl ContactSubmission {
    pub fn spam_signals(&self) -> SpamSignals {
        SpamSignals {
            email: self.email.clone(),
            message: self.message.clone(),
            subject: self.subject.clone().unwrap_or_default(),
            honeypot: self.honeypot.clone(),
            started_at: self.started_at.clone(),
        }
    }

    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}
