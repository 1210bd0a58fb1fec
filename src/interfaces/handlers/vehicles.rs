use actix_web::{web, HttpResponse, Responder};
use serde::Deserialize;

use crate::{entities::vehicle::VehicleKind, errors::AppError, AppState};

pub const VEHICLE_NOT_FOUND: &str = "Vozidlo sa nenašlo";

#[derive(Debug, Deserialize)]
pub struct VehicleQuery {
    #[serde(rename = "type")]
    pub kind: Option<VehicleKind>,
}

pub async fn list_vehicles(
    state: web::Data<AppState>,
    query: web::Query<VehicleQuery>,
) -> impl Responder {
    let vehicles = state.catalog_handler.list(query.kind).await;
    HttpResponse::Ok().json(vehicles)
}

pub async fn get_vehicle(
    state: web::Data<AppState>,
    slug: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let slug = slug.into_inner();

    state.catalog_handler
        .detail(&slug)
        .await
        .map(|vehicle| HttpResponse::Ok().json(vehicle))
        .ok_or_else(|| AppError::NotFound(VEHICLE_NOT_FOUND.to_string()))
}
