use std::fmt;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::{error, info, warn};

use crate::{entities::vehicle::Vehicle, errors::CatalogError, repositories::vehicle::VehicleRepository};

const IMAGES: &str = r#"
        nahlad { node { sourceUrl } }
        lightbox1 { node { sourceUrl } }
        lightbox2 { node { sourceUrl } }
        lightbox3 { node { sourceUrl } }"#;

const BASE_FIELDS: &str = r#"
        nazov
        kategoria
        cena
        osoby
        batozina
        prevodovka
        palivo
        typ
        popis"#;

/// One shape of the vehicles query. Richer variants come first.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueryVariant {
    pub mode: &'static str,
    extra_fields: &'static [&'static str],
}

pub const QUERY_VARIANTS: [QueryVariant; 3] = [
    QueryVariant { mode: "FULL", extra_fields: &["motorizacia", "komfort", "technologie", "sluzbyVCene"] },
    QueryVariant { mode: "PARTIAL", extra_fields: &["komfort", "technologie", "sluzbyVCene"] },
    QueryVariant { mode: "FALLBACK", extra_fields: &[] },
];

impl QueryVariant {
    pub fn query(&self) -> String {
        let extra: String = self.extra_fields
            .iter()
            .map(|f| format!("\n        {}", f))
            .collect();
        format!(
            "{{\n  vozidla {{\n    nodes {{\n      title\n      slug\n      popisVozidla {{{}{}{}\n      }}\n    }}\n  }}\n}}",
            BASE_FIELDS, extra, IMAGES
        )
    }
}

impl fmt::Display for QueryVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.mode)
    }
}

#[derive(Debug, Deserialize)]
struct GraphqlError {
    #[serde(default)]
    message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct VehicleNodes {
    #[serde(default)]
    nodes: Vec<Vehicle>,
}

#[derive(Debug, Deserialize)]
struct VehiclesData {
    vozidla: Option<VehicleNodes>,
}

#[derive(Debug, Deserialize)]
struct GraphqlResponse {
    data: Option<VehiclesData>,
    #[serde(default)]
    errors: Vec<GraphqlError>,
}

#[derive(Clone)]
pub struct GraphqlVehicleRepository {
    client: Client,
    endpoint: String,
}

impl GraphqlVehicleRepository {
    pub fn new(client: Client, endpoint: impl Into<String>) -> Self {
        Self { client, endpoint: endpoint.into() }
    }

    async fn run(&self, variant: &QueryVariant) -> Result<Vec<Vehicle>, CatalogError> {
        let response: GraphqlResponse = self.client
            .post(&self.endpoint)
            .json(&serde_json::json!({ "query": variant.query() }))
            .send()
            .await?
            .json()
            .await?;

        // GraphQL reports schema mismatches with a 200 and an `errors` list
        if !response.errors.is_empty() {
            let messages = response.errors
                .iter()
                .map(|e| e.message.as_deref().unwrap_or("unknown error"))
                .collect::<Vec<_>>()
                .join("; ");
            return Err(CatalogError::Graphql(messages));
        }

        response
            .data
            .and_then(|d| d.vozidla)
            .map(|v| v.nodes)
            .ok_or(CatalogError::InvalidResponse)
    }
}

#[async_trait]
impl VehicleRepository for GraphqlVehicleRepository {
    async fn fetch_vehicles(&self) -> Result<Vec<Vehicle>, CatalogError> {
        let mut last_error = CatalogError::InvalidResponse;

        for variant in QUERY_VARIANTS.iter() {
            match self.run(variant).await {
                Ok(vehicles) => {
                    info!(mode = %variant, count = vehicles.len(), "Vehicles loaded");
                    return Ok(vehicles);
                }
                Err(CatalogError::Graphql(messages)) => {
                    warn!(mode = %variant, errors = %messages, "Vehicle query rejected, degrading");
                    last_error = CatalogError::Graphql(messages);
                }
                Err(e) => {
                    error!(mode = %variant, "Vehicle query failed: {}", e);
                    return Err(e);
                }
            }
        }

        Err(last_error)
    }
}
