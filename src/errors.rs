use std::collections::BTreeMap;
use std::fmt;

use actix_multipart::MultipartError;
use actix_web::{
    error::ResponseError,
    http::{header::ContentType, StatusCode},
    HttpResponse
};
use derive_more::Display;
use serde::Serialize;
use validator::ValidationErrors;

pub const VALIDATION_SUMMARY: &str = "Prosím opravte chyby vo formulári";
pub const CONFIGURATION_MESSAGE: &str = "Konfiguračná chyba servera. Kontaktujte administrátora.";
pub const TRANSPORT_MESSAGE: &str =
    "Chyba pripojenia k emailovej službe. Skontrolujte internetové pripojenie a skúste to znovu.";
pub const UNEXPECTED_MESSAGE: &str =
    "Nastala neočakávaná chyba. Skúste to prosím znovu alebo nás kontaktujte priamo.";
pub const PAYLOAD_TOO_LARGE_MESSAGE: &str = "Odoslané údaje sú príliš veľké.";

/// Field name (camelCase, as sent by the browser) to localized message.
pub type FieldErrors = BTreeMap<String, String>;

/// The one response contract every form endpoint speaks.
#[derive(Debug, Serialize)]
pub struct SubmissionResponse {
    pub success: bool,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub errors: Option<FieldErrors>,
}

impl SubmissionResponse {
    pub fn accepted(message: impl Into<String>) -> Self {
        SubmissionResponse { success: true, message: Some(message.into()), errors: None }
    }

    /// The bare `{success: true}` handed to filtered submissions.
    pub fn silent() -> Self {
        SubmissionResponse { success: true, message: None, errors: None }
    }
}

#[derive(Debug)]
pub enum AppError {
    ValidationError(FieldErrors),
    ConfigurationError,
    ProviderError { status: u16, message: String },
    TransportError,
    PayloadTooLarge,
    MethodNotAllowed(&'static str),
    NotFound(String),
    InternalError(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::ValidationError(errors) => {
                let messages = errors.iter()
                    .map(|(field, message)| format!("{}:{}", field, message))
                    .collect::<Vec<_>>()
                    .join(", ");
                write!(f, "validation error: {}", messages)
            }
            AppError::ConfigurationError => write!(f, "Mail provider is not configured"),
            AppError::ProviderError { status, message } => {
                write!(f, "Mail provider rejected the request ({}): {}", status, message)
            }
            AppError::TransportError => write!(f, "Mail provider unreachable"),
            AppError::PayloadTooLarge => write!(f, "Payload too large"),
            AppError::MethodNotAllowed(endpoint) => write!(f, "Method not allowed on {}", endpoint),
            AppError::NotFound(msg) => write!(f, "Not found: {}", msg),
            AppError::InternalError(msg) => write!(f, "Internal server error: {}", msg)
        }
    }
}

impl AppError {
    /// What the browser gets to see; internals stay in the logs.
    pub fn public_message(&self) -> String {
        match self {
            AppError::ValidationError(_) => VALIDATION_SUMMARY.to_string(),
            AppError::ConfigurationError => CONFIGURATION_MESSAGE.to_string(),
            AppError::ProviderError { message, .. } => message.clone(),
            AppError::TransportError => TRANSPORT_MESSAGE.to_string(),
            AppError::PayloadTooLarge => PAYLOAD_TOO_LARGE_MESSAGE.to_string(),
            AppError::MethodNotAllowed(endpoint) => format!("Method Not Allowed. Use POST {}.", endpoint),
            AppError::NotFound(msg) => msg.clone(),
            AppError::InternalError(_) => UNEXPECTED_MESSAGE.to_string(),
        }
    }

    pub fn to_http_response(&self) -> HttpResponse {
        self.error_response()
    }
}

impl ResponseError for AppError {
    fn error_response(&self) -> HttpResponse {
        let body = SubmissionResponse {
            success: false,
            message: Some(self.public_message()),
            errors: match self {
                AppError::ValidationError(errors) => Some(errors.clone()),
                _ => None,
            },
        };
        HttpResponse::build(self.status_code())
            .insert_header(ContentType::json())
            .json(body)
    }

    fn status_code(&self) -> StatusCode {
        match self {
            AppError::ValidationError(_) => StatusCode::BAD_REQUEST,
            AppError::ConfigurationError => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::ProviderError { status, .. } => {
                StatusCode::from_u16(*status).unwrap_or(StatusCode::BAD_GATEWAY)
            }
            AppError::TransportError => StatusCode::BAD_GATEWAY,
            AppError::PayloadTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
            AppError::MethodNotAllowed(_) => StatusCode::METHOD_NOT_ALLOWED,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::InternalError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<ValidationErrors> for AppError {
    fn from(errors: ValidationErrors) -> Self {
        AppError::ValidationError(collect_field_errors(&errors))
    }
}

/// Flattens derive-produced errors into the wire map, first message per field.
pub fn collect_field_errors(errors: &ValidationErrors) -> FieldErrors {
    errors
        .field_errors()
        .iter()
        .filter_map(|(field, errors)| {
            errors.first().map(|e| {
                let message = e
                    .message
                    .as_ref()
                    .map(|s| s.to_string())
                    .unwrap_or_else(|| "Neplatná hodnota".to_string());
                (to_camel_case(field), message)
            })
        })
        .collect()
}

fn to_camel_case(field: &str) -> String {
    let mut out = String::with_capacity(field.len());
    let mut upper_next = false;
    for c in field.chars() {
        if c == '_' {
            upper_next = true;
        } else if upper_next {
            out.extend(c.to_uppercase());
            upper_next = false;
        } else {
            out.push(c);
        }
    }
    out
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        AppError::InternalError(err.to_string())
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::InternalError(format!("Undecodable payload: {}", err))
    }
}

impl From<MultipartError> for AppError {
    fn from(err: MultipartError) -> Self {
        AppError::InternalError(format!("Multipart error: {}", err))
    }
}

impl From<actix_web::error::PayloadError> for AppError {
    fn from(err: actix_web::error::PayloadError) -> Self {
        match err {
            actix_web::error::PayloadError::Overflow => AppError::PayloadTooLarge,
            _ => AppError::InternalError(format!("Payload error: {}", err)),
        }
    }
}

#[derive(Debug, Display)]
pub enum DeliveryError {
    #[display("API key is not set")]
    MissingApiKey,

    #[display("API key has invalid format: {_0}")]
    MalformedApiKey(String),

    #[display("Provider answered {status}: {body}")]
    Rejected { status: u16, body: String },

    #[display("Transport failure: {_0}")]
    Transport(String),
}

#[derive(Debug, Display)]
pub enum RateLimitError {
    #[display("Rate limit store unavailable: {_0}")]
    Unavailable(String),

    #[display("Rate limit store operation failed: {_0}")]
    Operation(String),
}

impl From<deadpool_redis::PoolError> for RateLimitError {
    fn from(err: deadpool_redis::PoolError) -> Self {
        RateLimitError::Unavailable(err.to_string())
    }
}

impl From<redis::RedisError> for RateLimitError {
    fn from(err: redis::RedisError) -> Self {
        RateLimitError::Operation(err.to_string())
    }
}

#[derive(Debug, Display)]
pub enum CatalogError {
    #[display("Catalog request failed: {_0}")]
    Transport(String),

    #[display("GraphQL errors: {_0}")]
    Graphql(String),

    #[display("Invalid GraphQL response structure")]
    InvalidResponse,
}

impl From<reqwest::Error> for CatalogError {
    fn from(err: reqwest::Error) -> Self {
        CatalogError::Transport(err.to_string())
    }
}
