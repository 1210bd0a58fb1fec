use std::fmt;

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::domain::validation::{
    contains_at_sign, known_payment_method, known_vehicle_category, reservation_consent_given,
    valid_passenger_count,
};
use crate::entities::submission::{is_checked, non_empty, SpamSignals};
use crate::utils::lenient;

pub const VEHICLE_CATEGORIES: [&str; 4] = ["Business Van", "Business Class", "First Class", "Nezáleží"];
pub const PAYMENT_METHODS: [&str; 3] = ["Faktúra", "Hotovosť na mieste", "Platobnou kartou"];

pub const MIN_PASSENGERS: i64 = 1;
pub const MAX_PASSENGERS: i64 = 20;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PersonType {
    Individual,
    Company,
}

impl PersonType {
    /// Anything but the literal `company` is a private person.
    pub fn parse(raw: &str) -> Self {
        match raw.trim() {
            "company" => PersonType::Company,
            _ => PersonType::Individual,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            PersonType::Individual => "Fyzická osoba",
            PersonType::Company => "Firma",
        }
    }
}

impl fmt::Display for PersonType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PersonType::Individual => write!(f, "individual"),
            PersonType::Company => write!(f, "company"),
        }
    }
}

/// Raw reservation body, shared by the form and JSON adapters.
#[derive(Debug, Default, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReservationPayload {
    #[serde(default, deserialize_with = "lenient::text")]
    pub person_type: String,

    #[serde(default, deserialize_with = "lenient::text")]
    pub first_name: String,

    #[serde(default, deserialize_with = "lenient::text")]
    pub last_name: String,

    #[serde(default, deserialize_with = "lenient::text")]
    pub company_name: String,

    #[serde(default, deserialize_with = "lenient::text")]
    pub email: String,

    #[serde(default, deserialize_with = "lenient::text")]
    pub phone: String,

    #[serde(default, deserialize_with = "lenient::text")]
    pub pickup_address: String,

    #[serde(default, deserialize_with = "lenient::text")]
    pub destination_address: String,

    #[serde(default, deserialize_with = "lenient::text")]
    pub date: String,

    #[serde(default, deserialize_with = "lenient::text")]
    pub time: String,

    #[serde(default, deserialize_with = "lenient::text")]
    pub passengers: String,

    #[serde(default, deserialize_with = "lenient::text")]
    pub return_trip: String,

    #[serde(default, deserialize_with = "lenient::text")]
    pub vehicle_category: String,

    #[serde(default, deserialize_with = "lenient::text")]
    pub same_as_main_passenger: String,

    #[serde(default, deserialize_with = "lenient::text")]
    pub main_passenger_first_name: String,

    #[serde(default, deserialize_with = "lenient::text")]
    pub main_passenger_last_name: String,

    #[serde(default, deserialize_with = "lenient::text")]
    pub flight_number: String,

    #[serde(default, deserialize_with = "lenient::text")]
    pub payment_method: String,

    #[serde(default, deserialize_with = "lenient::text")]
    pub notes: String,

    #[serde(default, deserialize_with = "lenient::text")]
    pub gdpr_consent: String,

    #[serde(default, deserialize_with = "lenient::text")]
    pub marketing_consent: String,

    #[serde(default, deserialize_with = "lenient::text")]
    pub website: String,

    #[serde(default, deserialize_with = "lenient::text")]
    pub started_at: String,
}

/// Fields whose rules depend on other fields (company name, main passenger)
/// are checked in `ReservationSubmission::conditional_errors`.
#[derive(Debug, Clone, Validate)]
pub struct ReservationSubmission {
    pub person_type: PersonType,

    #[validate(length(min = 2, message = "Meno musí mať aspoň 2 znaky"))]
    pub first_name: String,

    #[validate(length(min = 2, message = "Priezvisko musí mať aspoň 2 znaky"))]
    pub last_name: String,

    pub company_name: Option<String>,

    #[validate(custom(function = "contains_at_sign"))]
    pub email: String,

    #[validate(length(min = 6, message = "Telefónne číslo musí mať aspoň 6 znakov"))]
    pub phone: String,

    #[validate(length(min = 5, message = "Vyzdvihnutie musí mať aspoň 5 znakov"))]
    pub pickup_address: String,

    #[validate(length(min = 5, message = "Cieľ musí mať aspoň 5 znakov"))]
    pub destination_address: String,

    #[validate(length(min = 1, message = "Dátum je povinný"))]
    pub date: String,

    #[validate(length(min = 1, message = "Čas je povinný"))]
    pub time: String,

    #[validate(custom(function = "valid_passenger_count"))]
    pub passengers: String,

    pub return_trip: bool,

    #[validate(custom(function = "known_vehicle_category"))]
    pub vehicle_category: String,

    pub same_as_main_passenger: bool,
    pub main_passenger_first_name: String,
    pub main_passenger_last_name: String,

    pub flight_number: Option<String>,

    #[validate(custom(function = "known_payment_method"))]
    pub payment_method: String,

    pub notes: Option<String>,

    #[validate(custom(function = "reservation_consent_given"))]
    pub gdpr_consent: bool,

    pub marketing_consent: bool,

    pub honeypot: String,
    pub started_at: String,
}

impl From<ReservationPayload> for ReservationSubmission {
    fn from(payload: ReservationPayload) -> Self {
        ReservationSubmission {
            person_type: PersonType::parse(&payload.person_type),
            first_name: payload.first_name.trim().to_string(),
            last_name: payload.last_name.trim().to_string(),
            company_name: non_empty(&payload.company_name),
            email: payload.email.trim().to_string(),
            phone: payload.phone.trim().to_string(),
            pickup_address: payload.pickup_address.trim().to_string(),
            destination_address: payload.destination_address.trim().to_string(),
            date: payload.date.trim().to_string(),
            time: payload.time.trim().to_string(),
            passengers: payload.passengers.trim().to_string(),
            return_trip: is_checked(&payload.return_trip),
            vehicle_category: payload.vehicle_category.trim().to_string(),
            same_as_main_passenger: payload.same_as_main_passenger.trim() != "false",
            main_passenger_first_name: payload.main_passenger_first_name.trim().to_string(),
            main_passenger_last_name: payload.main_passenger_last_name.trim().to_string(),
            flight_number: non_empty(&payload.flight_number),
            payment_method: payload.payment_method.trim().to_string(),
            notes: non_empty(&payload.notes),
            gdpr_consent: is_checked(&payload.gdpr_consent),
            marketing_consent: is_checked(&payload.marketing_consent),
            honeypot: payload.website.trim().to_string(),
            started_at: payload.started_at.trim().to_string(),
        }
    }
}

impl ReservationSubmission {
    pub fn spam_signals(&self) -> SpamSignals {
        SpamSignals {
            email: self.email.clone(),
            message: self.notes.clone().unwrap_or_default(),
            subject: String::new(),
            honeypot: self.honeypot.clone(),
            started_at: self.started_at.clone(),
        }
    }

    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }

    /// Passenger count; only meaningful once validation passed.
    pub fn passenger_count(&self) -> Option<i64> {
        self.passengers.parse().ok()
    }

    pub fn main_passenger(&self) -> Option<String> {
        if self.same_as_main_passenger {
            None
        } else {
            Some(format!("{} {}", self.main_passenger_first_name, self.main_passenger_last_name))
        }
    }

    pub fn conditional_errors(&self) -> Vec<(&'static str, &'static str)> {
        let mut errors = Vec::new();

        if self.person_type == PersonType::Company
            && self.company_name.as_deref().map_or(0, |n| n.chars().count()) < 2
        {
            errors.push(("companyName", "Názov firmy musí mať aspoň 2 znaky"));
        }

        if !self.same_as_main_passenger {
            if self.main_passenger_first_name.chars().count() < 2 {
                errors.push(("mainPassengerFirstName", "Meno hlavného pasažiera musí mať aspoň 2 znaky"));
            }
            if self.main_passenger_last_name.chars().count() < 2 {
                errors.push(("mainPassengerLastName", "Priezvisko hlavného pasažiera musí mať aspoň 2 znaky"));
            }
        }

        errors
    }
}
