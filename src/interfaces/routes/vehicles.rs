use actix_web::web;

use crate::handlers::vehicles;

pub fn config_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/vehicles")
            .service(
                web::resource("")
                    .route(web::get().to(vehicles::list_vehicles))
            )
            .service(
                web::resource("/{slug}")
                    .route(web::get().to(vehicles::get_vehicle))
            )
    );
}
