use chrono::Utc;
use tracing::{error, info};
use validator::Validate;

use crate::{
    email::templates,
    entities::{
        contact::{ContactPayload, ContactSubmission},
        email::{MailRouting, OutboundEmail},
        reservation::{ReservationPayload, ReservationSubmission},
        submission::{FormKind, SpamSignals},
    },
    errors::{collect_field_errors, AppError, DeliveryError, FieldErrors, SubmissionResponse},
    repositories::mailer::Mailer,
    use_cases::spam::SpamGuard,
};

/// User-facing text for a provider rejection.
pub fn provider_failure_message(status: u16, kind: FormKind) -> &'static str {
    match status {
        401 => "Chyba autentifikácie emailovej služby. Kontaktujte administrátora.",
        403 => "Emailová služba je v testovacom režime. Kontaktujte administrátora.",
        422 => "Neplatné údaje v emaili. Skúste to prosím znovu.",
        429 => "Príliš veľa požiadaviek. Skúste to prosím za chvíľu.",
        s if s >= 500 => "Dočasná chyba emailovej služby. Skúste to prosím za chvíľu.",
        _ => kind.delivery_failed_message(),
    }
}

/// Operator-facing hint logged next to a provider rejection.
fn provider_hint(status: u16) -> Option<&'static str> {
    match status {
        401 => Some("API key issue - check if key is valid and has correct permissions"),
        403 => Some("Domain verification needed - check the provider dashboard"),
        422 => Some("Validation error - check email format and content"),
        429 => Some("Provider rate limit exceeded"),
        s if s >= 500 => Some("Server error on the provider side"),
        _ => None,
    }
}

/// Intake pipeline shared by the contact and reservation forms:
/// spam heuristics, validation, then a single delivery attempt.
pub struct SubmissionHandler<M>
where
    M: Mailer,
{
    pub mailer: M,
    pub spam_guard: SpamGuard,
    pub routing: MailRouting,
}

impl<M> SubmissionHandler<M>
where
    M: Mailer,
{
    pub fn new(mailer: M, spam_guard: SpamGuard, routing: MailRouting) -> Self {
        SubmissionHandler { mailer, spam_guard, routing }
    }

    pub fn check_mailer(&self) -> Result<(), DeliveryError> {
        self.mailer.check_credentials()
    }

    pub async fn submit_contact(
        &self,
        client_ip: &str,
        payload: ContactPayload,
    ) -> Result<SubmissionResponse, AppError> {
        let submission = ContactSubmission::from(payload);

        if self.is_spam(FormKind::Contact, client_ip, &submission.spam_signals()).await {
            return Ok(SubmissionResponse::silent());
        }

        submission.validate()?;

        let email = templates::contact_email(&submission, &self.routing, Utc::now());
        self.deliver(FormKind::Contact, &submission.full_name(), &submission.email, &email).await
    }

    pub async fn submit_reservation(
        &self,
        client_ip: &str,
        payload: ReservationPayload,
    ) -> Result<SubmissionResponse, AppError> {
        let submission = ReservationSubmission::from(payload);

        if self.is_spam(FormKind::Reservation, client_ip, &submission.spam_signals()).await {
            return Ok(SubmissionResponse::silent());
        }

        let errors = validate_reservation(&submission);
        if !errors.is_empty() {
            return Err(AppError::ValidationError(errors));
        }

        let email = templates::reservation_email(&submission, &self.routing, Utc::now());
        self.deliver(FormKind::Reservation, &submission.full_name(), &submission.email, &email).await
    }

    async fn is_spam(&self, kind: FormKind, client_ip: &str, signals: &SpamSignals) -> bool {
        let now_ms = Utc::now().timestamp_millis();
        match self.spam_guard.inspect(client_ip, signals, now_ms).await {
            Some(verdict) => {
                info!(form = %kind, ip = %client_ip, reason = %verdict, "Submission silently dropped");
                true
            }
            None => false,
        }
    }

    async fn deliver(
        &self,
        kind: FormKind,
        sender_name: &str,
        sender_email: &str,
        email: &OutboundEmail,
    ) -> Result<SubmissionResponse, AppError> {
        if let Err(e) = self.mailer.check_credentials() {
            error!(form = %kind, "Mail provider misconfigured: {}", e);
            return Err(AppError::ConfigurationError);
        }

        info!(form = %kind, sender = %sender_name, reply_to = %sender_email, "Attempting to send email");

        match self.mailer.send(email).await {
            Ok(receipt) => {
                info!(
                    form = %kind,
                    email_id = receipt.id.as_deref().unwrap_or("unknown"),
                    "Email successfully sent"
                );
                Ok(SubmissionResponse::accepted(kind.success_message()))
            }
            Err(DeliveryError::Rejected { status, body }) => {
                error!(form = %kind, status, response = %body, "Mail provider rejected the email");
                if let Some(hint) = provider_hint(status) {
                    error!(form = %kind, status, "{}", hint);
                }
                Err(AppError::ProviderError {
                    status,
                    message: provider_failure_message(status, kind).to_string(),
                })
            }
            Err(DeliveryError::Transport(e)) => {
                error!(form = %kind, "Network error talking to the mail provider: {}", e);
                Err(AppError::TransportError)
            }
            Err(e) => {
                error!(form = %kind, "Mail provider misconfigured: {}", e);
                Err(AppError::ConfigurationError)
            }
        }
    }
}

/// Runs every rule and collects every violation; never stops at the first.
pub fn validate_reservation(submission: &ReservationSubmission) -> FieldErrors {
    let mut errors = match submission.validate() {
        Ok(()) => FieldErrors::new(),
        Err(e) => collect_field_errors(&e),
    };

    for (field, message) in submission.conditional_errors() {
        errors
            .entry(field.to_string())
            .or_insert_with(|| message.to_string());
    }

    errors
}

pub fn validate_contact(submission: &ContactSubmission) -> FieldErrors {
    match submission.validate() {
        Ok(()) => FieldErrors::new(),
        Err(e) => collect_field_errors(&e),
    }
}
