use async_trait::async_trait;

use crate::{entities::vehicle::Vehicle, errors::CatalogError};

#[async_trait]
pub trait VehicleRepository: Send + Sync {
    async fn fetch_vehicles(&self) -> Result<Vec<Vehicle>, CatalogError>;
}
