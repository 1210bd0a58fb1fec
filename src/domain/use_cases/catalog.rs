use tracing::error;

use crate::{
    entities::vehicle::{
        is_rental_vehicle, is_transfer_vehicle, sort_by_price, Vehicle, VehicleDetail, VehicleKind,
        VehicleSummary,
    },
    repositories::vehicle::VehicleRepository,
};

pub struct CatalogHandler<R>
where
    R: VehicleRepository,
{
    pub vehicle_repo: R,
}

impl<R> CatalogHandler<R>
where
    R: VehicleRepository,
{
    pub fn new(vehicle_repo: R) -> Self {
        CatalogHandler { vehicle_repo }
    }

    /// Every vehicle the CMS knows; an unreachable CMS yields an empty list.
    pub async fn vehicles(&self) -> Vec<Vehicle> {
        match self.vehicle_repo.fetch_vehicles().await {
            Ok(vehicles) => vehicles,
            Err(e) => {
                error!("Error fetching vehicles: {}", e);
                Vec::new()
            }
        }
    }

    pub async fn vehicle_by_slug(&self, slug: &str) -> Option<Vehicle> {
        self.vehicles().await.into_iter().find(|v| v.slug == slug)
    }

    /// Summaries, optionally restricted to one kind, cheapest first.
    pub async fn list(&self, kind: Option<VehicleKind>) -> Vec<VehicleSummary> {
        let mut vehicles: Vec<Vehicle> = self
            .vehicles()
            .await
            .into_iter()
            .filter(|v| match kind {
                Some(VehicleKind::Rental) => is_rental_vehicle(v),
                Some(VehicleKind::Transfer) => is_transfer_vehicle(v),
                None => true,
            })
            .collect();

        sort_by_price(&mut vehicles);
        vehicles.iter().map(VehicleSummary::from).collect()
    }

    pub async fn detail(&self, slug: &str) -> Option<VehicleDetail> {
        self.vehicle_by_slug(slug).await.as_ref().map(VehicleDetail::from)
    }
}
