use serde::{Deserialize, Serialize};

use crate::utils::lenient;

pub const PRICE_ON_REQUEST: &str = "Cena na vyžiadanie";
pub const PLACEHOLDER_IMAGE: &str = "/placeholder.svg?height=300&width=400";

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ImageNode {
    #[serde(rename = "sourceUrl", default)]
    pub source_url: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct VehicleImage {
    #[serde(default)]
    pub node: Option<ImageNode>,
}

/// The ACF field group attached to a vehicle post. The CMS names are Slovak.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct VehicleDescription {
    #[serde(rename = "nazov", default, deserialize_with = "lenient::optional_text")]
    pub name: Option<String>,

    #[serde(rename = "kategoria", default, deserialize_with = "lenient::optional_text")]
    pub category: Option<String>,

    #[serde(rename = "cena", default, deserialize_with = "lenient::optional_text")]
    pub price: Option<String>,

    #[serde(rename = "osoby", default, deserialize_with = "lenient::optional_text")]
    pub passengers: Option<String>,

    #[serde(rename = "batozina", default, deserialize_with = "lenient::optional_text")]
    pub luggage: Option<String>,

    #[serde(rename = "prevodovka", default, deserialize_with = "lenient::optional_text")]
    pub transmission: Option<String>,

    #[serde(rename = "palivo", default, deserialize_with = "lenient::optional_text")]
    pub fuel: Option<String>,

    /// `prenajom` or `transfer`; checkbox fields arrive as lists.
    #[serde(rename = "typ", default, deserialize_with = "lenient::optional_text")]
    pub kind: Option<String>,

    #[serde(rename = "popis", default, deserialize_with = "lenient::optional_text")]
    pub summary: Option<String>,

    #[serde(rename = "motorizacia", default, deserialize_with = "lenient::optional_text")]
    pub engine: Option<String>,

    #[serde(rename = "komfort", default, deserialize_with = "lenient::optional_text")]
    pub comfort: Option<String>,

    #[serde(rename = "technologie", default, deserialize_with = "lenient::optional_text")]
    pub technology: Option<String>,

    #[serde(rename = "sluzbyVCene", default, deserialize_with = "lenient::optional_text")]
    pub included_services: Option<String>,

    #[serde(rename = "nahlad", default)]
    pub thumbnail: Option<VehicleImage>,

    #[serde(default)]
    pub lightbox1: Option<VehicleImage>,

    #[serde(default)]
    pub lightbox2: Option<VehicleImage>,

    #[serde(default)]
    pub lightbox3: Option<VehicleImage>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Vehicle {
    #[serde(default)]
    pub title: String,

    #[serde(default)]
    pub slug: String,

    #[serde(rename = "popisVozidla", default)]
    pub description: Option<VehicleDescription>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum VehicleKind {
    Rental,
    Transfer,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VehicleSpecs {
    pub transmission: String,
    pub fuel: String,
    pub passengers: String,
    pub kind: String,
    pub luggage: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VehicleSummary {
    pub title: String,
    pub slug: String,
    pub name: String,
    pub category: String,
    pub transfer_category: String,
    pub kind: Option<VehicleKind>,
    pub price: String,
    pub image: String,
    pub specs: VehicleSpecs,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VehicleDetail {
    #[serde(flatten)]
    pub summary: VehicleSummary,
    pub description: Option<String>,
    pub engine: Option<String>,
    pub comfort: Option<String>,
    pub technology: Option<String>,
    pub included_services: Option<String>,
    pub gallery: Vec<String>,
}

fn normalized_kind(vehicle: &Vehicle) -> Option<String> {
    vehicle
        .description
        .as_ref()
        .and_then(|d| d.kind.as_deref())
        .map(|k| k.trim().to_lowercase())
}

pub fn is_rental_vehicle(vehicle: &Vehicle) -> bool {
    normalized_kind(vehicle).as_deref() == Some("prenajom")
}

pub fn is_transfer_vehicle(vehicle: &Vehicle) -> bool {
    normalized_kind(vehicle).as_deref() == Some("transfer")
}

pub fn vehicle_kind(vehicle: &Vehicle) -> Option<VehicleKind> {
    if is_rental_vehicle(vehicle) {
        Some(VehicleKind::Rental)
    } else if is_transfer_vehicle(vehicle) {
        Some(VehicleKind::Transfer)
    } else {
        None
    }
}

/// Maps the free-text CMS category onto the three transfer classes offered.
pub fn transfer_category(vehicle: &Vehicle) -> String {
    let category = vehicle
        .description
        .as_ref()
        .and_then(|d| d.category.clone())
        .unwrap_or_default();
    let lowered = category.to_lowercase();

    if lowered.contains("business") {
        "Business Class".to_string()
    } else if lowered.contains("first") {
        "First Class".to_string()
    } else if lowered.contains("van") {
        "Business Van".to_string()
    } else if category.is_empty() {
        "Transfer".to_string()
    } else {
        category
    }
}

pub fn format_price(price: Option<&str>) -> String {
    match price {
        None | Some("") | Some("0") => PRICE_ON_REQUEST.to_string(),
        Some(p) if p.contains('€') || p.contains("EUR") => p.to_string(),
        Some(p) => format!("{} €", p),
    }
}

pub fn image_url(image: Option<&VehicleImage>, fallback: &str) -> String {
    image
        .and_then(|i| i.node.as_ref())
        .and_then(|n| n.source_url.as_deref())
        .filter(|url| !url.is_empty())
        .unwrap_or(fallback)
        .to_string()
}

pub fn vehicle_specs(vehicle: &Vehicle) -> VehicleSpecs {
    let desc = vehicle.description.clone().unwrap_or_default();
    let or = |value: Option<String>, default: &str| {
        value.filter(|v| !v.is_empty()).unwrap_or_else(|| default.to_string())
    };

    VehicleSpecs {
        transmission: or(desc.transmission, "Automat"),
        fuel: or(desc.fuel, "Diesel"),
        passengers: or(desc.passengers, "7 osôb"),
        kind: or(desc.kind, "Van"),
        luggage: or(desc.luggage, "3"),
    }
}

/// Digits of the price glued together ("od 1 200 €/deň" -> 1200); `None` sorts last.
pub fn price_sort_key(vehicle: &Vehicle) -> Option<u64> {
    let raw = vehicle.description.as_ref()?.price.as_deref()?;
    let digits: String = raw.chars().filter(char::is_ascii_digit).collect();
    digits.parse().ok().filter(|n| *n > 0)
}

pub fn sort_by_price(vehicles: &mut [Vehicle]) {
    vehicles.sort_by_key(|v| price_sort_key(v).unwrap_or(u64::MAX));
}

impl From<&Vehicle> for VehicleSummary {
    fn from(vehicle: &Vehicle) -> Self {
        let desc = vehicle.description.clone().unwrap_or_default();

        VehicleSummary {
            title: vehicle.title.clone(),
            slug: vehicle.slug.clone(),
            name: desc.name.clone().unwrap_or_else(|| vehicle.title.clone()),
            category: desc.category.clone().unwrap_or_default(),
            transfer_category: transfer_category(vehicle),
            kind: vehicle_kind(vehicle),
            price: format_price(desc.price.as_deref()),
            image: image_url(desc.thumbnail.as_ref(), PLACEHOLDER_IMAGE),
            specs: vehicle_specs(vehicle),
        }
    }
}

impl From<&Vehicle> for VehicleDetail {
    fn from(vehicle: &Vehicle) -> Self {
        let desc = vehicle.description.clone().unwrap_or_default();
        let gallery = [&desc.lightbox1, &desc.lightbox2, &desc.lightbox3]
            .into_iter()
            .map(|img| image_url(img.as_ref(), ""))
            .filter(|url| !url.is_empty())
            .collect();

        VehicleDetail {
            summary: VehicleSummary::from(vehicle),
            description: desc.summary,
            engine: desc.engine,
            comfort: desc.comfort,
            technology: desc.technology,
            included_services: desc.included_services,
            gallery,
        }
    }
}
