use actix_web::{http::Method, web};

use crate::handlers::forms;

/// POST submits, OPTIONS is a bare 204, anything else gets a JSON 405.
pub fn config_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::resource("/contact")
            .route(web::post().to(forms::submit_contact))
            .route(web::method(Method::OPTIONS).to(forms::preflight))
            .default_service(web::to(forms::contact_method_not_allowed))
    )
    .service(
        web::resource("/reservation")
            .route(web::post().to(forms::submit_reservation))
            .route(web::method(Method::OPTIONS).to(forms::preflight))
            .default_service(web::to(forms::reservation_method_not_allowed))
    );
}
