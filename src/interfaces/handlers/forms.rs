use actix_web::{web, HttpRequest, HttpResponse, Responder};
use tracing::info;

use crate::{
    entities::{contact::ContactPayload, reservation::ReservationPayload, submission::FormKind},
    errors::{AppError, SubmissionResponse},
    use_cases::extractors::{FormBody, FormOrJsonBody},
    utils::get_client_ip::get_client_ip,
    AppState,
};

pub async fn submit_contact(
    req: HttpRequest,
    state: web::Data<AppState>,
    form: Result<FormBody<ContactPayload>, AppError>,
) -> impl Responder {
    let client_ip = get_client_ip(&req, state.trust_proxy_headers);
    let payload = match form {
        Ok(FormBody(payload)) => payload,
        Err(e) => return unreadable_submission(FormKind::Contact, &client_ip, e),
    };

    match state.submission_handler.submit_contact(&client_ip, payload).await {
        Ok(response) => HttpResponse::Ok().json(response),
        Err(e) => e.to_http_response(),
    }
}

pub async fn submit_reservation(
    req: HttpRequest,
    state: web::Data<AppState>,
    form: Result<FormOrJsonBody<ReservationPayload>, AppError>,
) -> impl Responder {
    let client_ip = get_client_ip(&req, state.trust_proxy_headers);
    let payload = match form {
        Ok(FormOrJsonBody(payload)) => payload,
        Err(e) => return unreadable_submission(FormKind::Reservation, &client_ip, e),
    };

    match state.submission_handler.submit_reservation(&client_ip, payload).await {
        Ok(response) => HttpResponse::Ok().json(response),
        Err(e) => e.to_http_response(),
    }
}

/// An oversized body is treated like any other spam signal.
fn unreadable_submission(kind: FormKind, client_ip: &str, error: AppError) -> HttpResponse {
    match error {
        AppError::PayloadTooLarge => {
            info!(form = %kind, ip = %client_ip, reason = "payload too large", "Submission silently dropped");
            HttpResponse::Ok().json(SubmissionResponse::silent())
        }
        e => e.to_http_response(),
    }
}

/// Bare CORS preflight answer; the CORS middleware adds the headers.
pub async fn preflight() -> HttpResponse {
    HttpResponse::NoContent().finish()
}

pub async fn contact_method_not_allowed() -> HttpResponse {
    AppError::MethodNotAllowed(FormKind::Contact.endpoint()).to_http_response()
}

pub async fn reservation_method_not_allowed() -> HttpResponse {
    AppError::MethodNotAllowed(FormKind::Reservation.endpoint()).to_http_response()
}
